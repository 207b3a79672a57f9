use std::sync::Mutex;

use super::error_code::ErrorCode;
use crate::reflection::ElementId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticCategory {
    Error,
    Warning,
}

/// A compilation-time message attached to a program element. These are
/// surfaced through the host compiler's diagnostic channel rather than
/// thrown; resolution continues after reporting one.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub code: ErrorCode,
    pub category: DiagnosticCategory,
    /// The element the message is attached to, when one is known.
    pub element: Option<ElementId>,
    pub message: String,
}

impl Diagnostic {
    pub fn error(code: ErrorCode, element: ElementId, message: impl Into<String>) -> Self {
        Self {
            code,
            category: DiagnosticCategory::Error,
            element: Some(element),
            message: message.into(),
        }
    }

    pub fn warning(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            category: DiagnosticCategory::Warning,
            element: None,
            message: message.into(),
        }
    }
}

/// Receives diagnostics produced during resolution. Implemented by the
/// embedding frontend; the collecting implementation below is used in tests
/// and simple embeddings.
pub trait DiagnosticSink: Send + Sync {
    fn report(&self, diagnostic: Diagnostic);
}

/// Accumulates diagnostics in memory.
#[derive(Debug, Default)]
pub struct CollectingDiagnostics {
    collected: Mutex<Vec<Diagnostic>>,
}

impl CollectingDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        match self.collected.lock() {
            Ok(collected) => collected.clone(),
            Err(_) => Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self.collected.lock() {
            Ok(collected) => collected.is_empty(),
            Err(_) => true,
        }
    }
}

impl DiagnosticSink for CollectingDiagnostics {
    fn report(&self, diagnostic: Diagnostic) {
        if let Ok(mut collected) = self.collected.lock() {
            collected.push(diagnostic);
        }
    }
}
