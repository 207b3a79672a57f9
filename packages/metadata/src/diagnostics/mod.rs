//! Diagnostics for the annotation resolution engine.
//!
//! Resolution distinguishes failures that abort a build request
//! ([`MetadataError`]) from per-member problems that are attached to the
//! originating element and reported through the host compiler's channel
//! ([`Diagnostic`] via a [`DiagnosticSink`]).

pub mod src;

pub use src::error::MetadataError;
pub use src::error_code::ErrorCode;
pub use src::sink::{CollectingDiagnostics, Diagnostic, DiagnosticCategory, DiagnosticSink};
