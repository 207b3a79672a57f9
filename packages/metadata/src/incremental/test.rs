// Session Cache Tests

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use indexmap::IndexMap;

    use crate::incremental::*;
    use crate::metadata::{AnnotationMetadata, AnnotationValue, MemberValue};

    #[test]
    fn test_recorded_empty_defaults_are_a_hit() {
        let session = MetadataSession::new();
        assert!(session.defaults_of("app.Q").is_none());
        session.record_defaults("app.Q", IndexMap::new());
        // an empty mapping is a resolved state, not a miss
        assert_eq!(session.defaults_of("app.Q").map(|d| d.len()), Some(0));
    }

    #[test]
    fn test_first_recorded_defaults_win() {
        let session = MetadataSession::new();
        session.record_defaults("app.Q", IndexMap::new());
        let mut late = IndexMap::new();
        late.insert("value".to_owned(), MemberValue::Int(1));
        let winner = session.record_defaults("app.Q", late);
        assert!(winner.is_empty());
        assert_eq!(session.defaults_of("app.Q").map(|d| d.len()), Some(0));
    }

    #[test]
    fn test_insert_if_absent_keeps_first_entry() {
        let session = MetadataSession::new();
        let key = MetadataKey::element("app.A");
        let first = Arc::new(AnnotationMetadata::default());
        let winner = session.insert_if_absent(key.clone(), first.clone());
        assert!(Arc::ptr_eq(&winner, &first));
        let loser = session.insert_if_absent(key.clone(), AnnotationMetadata::empty());
        assert!(Arc::ptr_eq(&loser, &first));
        assert!(!session.is_mutated(&key));
    }

    #[test]
    fn test_update_marks_entry_mutated() {
        let session = MetadataSession::new();
        let key = MetadataKey::element("app.A");
        session.insert_if_absent(key.clone(), AnnotationMetadata::empty());
        session.update(&key, Arc::new(AnnotationMetadata::default()));
        assert!(session.is_mutated(&key));
        session.clear_mutated_key(&key);
        assert!(session.lookup(&key).is_none());
    }

    #[test]
    fn test_begin_cycle_drops_stale_metadata_but_keeps_defaults() {
        let session = MetadataSession::new();
        let key = MetadataKey::composite("app.A", "app.A::run()");
        session.insert_if_absent(key.clone(), AnnotationMetadata::empty());
        session.record_defaults("app.Q", IndexMap::new());
        session.begin_cycle();
        assert!(session.lookup(&key).is_none());
        assert!(session.defaults_of("app.Q").is_some());
    }

    #[test]
    fn test_end_cycle_clears_everything() {
        let session = MetadataSession::new();
        session.record_defaults("app.Q", IndexMap::new());
        session.record_added_stereotype("app.Q", AnnotationValue::new("app.Added"));
        session.end_cycle();
        assert!(session.defaults_of("app.Q").is_none());
        assert!(session.added_stereotypes_of("app.Q").is_empty());
    }
}
