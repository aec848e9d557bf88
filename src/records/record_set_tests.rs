// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for the record set model.

#[cfg(test)]
mod tests {
    use crate::dns_errors::ConfigError;
    use crate::records::{
        group_into_record_sets, merge_identity, prefix_for, values_equal, RawRecord, RecordSet,
        RecordType, TxtEncoding,
    };

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(ToString::to_string).collect()
    }

    // =====================================================
    // Grouping
    // =====================================================

    #[test]
    fn test_group_collapses_name_and_type() {
        let records = vec![
            RawRecord::new("www", RecordType::A, Some(60), "1.1.1.1").with_id("1"),
            RawRecord::new("", RecordType::MX, Some(60), "10  mx.foo.com.").with_id("2"),
            RawRecord::new("WWW", RecordType::A, Some(60), "2.2.2.2").with_id("3"),
            RawRecord::new("www", RecordType::AAAA, Some(60), "::1").with_id("4"),
        ];

        let sets = group_into_record_sets(&records, "foo.com", false, TxtEncoding::Quoted);
        assert_eq!(sets.len(), 3);

        assert_eq!(sets[0].name, "www.foo.com");
        assert_eq!(sets[0].record_type, RecordType::A);
        assert_eq!(sets[0].values, strings(&["1.1.1.1", "2.2.2.2"]));
        assert_eq!(sets[0].ids(), vec!["1", "3"]);

        assert_eq!(sets[1].name, "foo.com");
        assert_eq!(sets[1].values, strings(&["10 mx.foo.com."]));

        assert_eq!(sets[2].record_type, RecordType::AAAA);
    }

    #[test]
    fn test_group_mixed_ttl_is_none() {
        let records = vec![
            RawRecord::new("www", RecordType::A, Some(60), "1.1.1.1"),
            RawRecord::new("www", RecordType::A, Some(300), "2.2.2.2"),
        ];

        let merged = group_into_record_sets(&records, "foo.com", false, TxtEncoding::Quoted);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].ttl, None);

        let split = group_into_record_sets(&records, "foo.com", true, TxtEncoding::Quoted);
        assert_eq!(split.len(), 2);
        assert_eq!(split[0].ttl, Some(60));
        assert_eq!(split[1].ttl, Some(300));
    }

    #[test]
    fn test_group_takes_first_notes() {
        let records = vec![
            RawRecord::new("www", RecordType::A, None, "1.1.1.1"),
            RawRecord::new("www", RecordType::A, None, "2.2.2.2").with_notes(Some("web".into())),
        ];
        let sets = group_into_record_sets(&records, "foo.com", false, TxtEncoding::Quoted);
        assert_eq!(sets[0].notes.as_deref(), Some("web"));
    }

    #[test]
    fn test_group_decodes_txt_per_wire_encoding() {
        let records = vec![RawRecord::new("x", RecordType::TXT, None, "\"a\"")];

        let quoted = group_into_record_sets(&records, "foo.com", false, TxtEncoding::Quoted);
        assert_eq!(quoted[0].values, strings(&["a"]));

        let unquoted = group_into_record_sets(&records, "foo.com", false, TxtEncoding::Unquoted);
        assert_eq!(unquoted[0].values, strings(&[r#"\"a\""#]));
        assert_ne!(unquoted[0].values, strings(&["a"]));
    }

    // =====================================================
    // Equality
    // =====================================================

    #[test]
    fn test_values_compared_as_multisets() {
        assert!(values_equal(&strings(&["a", "b"]), &strings(&["b", "a"])));
        assert!(!values_equal(&strings(&["a", "a"]), &strings(&["a"])));
        assert!(!values_equal(&strings(&["a", "a", "b"]), &strings(&["a", "b", "b"])));
    }

    #[test]
    fn test_new_normalizes() {
        let set = RecordSet::new("WWW.Foo.com.", RecordType::TXT, None, strings(&["\"x\""]));
        assert_eq!(set.name, "www.foo.com");
        assert_eq!(set.values, strings(&["x"]));
        assert!(set.members().is_empty());
        assert!(set.with_notes(Some(String::new())).notes.is_none());
    }

    #[test]
    fn test_satisfies_ignores_unspecified_ttl() {
        let existing = RecordSet::new("a.foo.com", RecordType::A, Some(60), strings(&["1.1.1.1"]));
        let no_ttl = RecordSet::new("a.foo.com", RecordType::A, None, strings(&["1.1.1.1"]));
        let other_ttl = RecordSet::new("a.foo.com", RecordType::A, Some(61), strings(&["1.1.1.1"]));

        assert!(existing.satisfies(&no_ttl, false));
        assert!(!existing.satisfies(&other_ttl, false));
        assert_ne!(existing, no_ttl);
    }

    #[test]
    fn test_mixed_ttl_never_satisfies_a_ttl() {
        let records = vec![
            RawRecord::new("www", RecordType::A, Some(60), "1.1.1.1"),
            RawRecord::new("www", RecordType::A, Some(300), "2.2.2.2"),
        ];
        let sets = group_into_record_sets(&records, "foo.com", false, TxtEncoding::Quoted);
        let existing = &sets[0];
        let desired = RecordSet::new(
            "www.foo.com",
            RecordType::A,
            Some(60),
            strings(&["1.1.1.1", "2.2.2.2"]),
        );
        assert!(!existing.satisfies(&desired, false));
    }

    #[test]
    fn test_satisfies_notes_only_when_compared_and_given() {
        let existing = RecordSet::new("a.foo.com", RecordType::A, None, strings(&["1.1.1.1"]))
            .with_notes(Some("old".into()));
        let new_notes = RecordSet::new("a.foo.com", RecordType::A, None, strings(&["1.1.1.1"]))
            .with_notes(Some("new".into()));
        let no_notes = RecordSet::new("a.foo.com", RecordType::A, None, strings(&["1.1.1.1"]));

        assert!(existing.satisfies(&new_notes, false));
        assert!(!existing.satisfies(&new_notes, true));
        assert!(existing.satisfies(&no_notes, true));
    }

    // =====================================================
    // Names
    // =====================================================

    #[test]
    fn test_merge_identity_from_prefix() {
        assert_eq!(merge_identity(Some("www"), None, "foo.com").unwrap(), "www.foo.com");
        assert_eq!(merge_identity(Some(""), None, "Foo.com.").unwrap(), "foo.com");
        assert_eq!(merge_identity(Some("@"), None, "foo.com").unwrap(), "foo.com");
    }

    #[test]
    fn test_merge_identity_from_record() {
        assert_eq!(
            merge_identity(None, Some("New.Foo.com."), "foo.com").unwrap(),
            "new.foo.com"
        );
        assert_eq!(merge_identity(None, Some("foo.com"), "foo.com").unwrap(), "foo.com");
    }

    #[test]
    fn test_merge_identity_errors() {
        assert!(matches!(
            merge_identity(Some("www"), Some("www.foo.com"), "foo.com"),
            Err(ConfigError::InvalidIdentity { .. })
        ));
        assert!(matches!(
            merge_identity(None, None, "foo.com"),
            Err(ConfigError::InvalidIdentity { .. })
        ));
        assert_eq!(
            merge_identity(None, Some("www.notfoo.com"), "foo.com"),
            Err(ConfigError::RecordOutsideZone {
                record: "www.notfoo.com".to_string(),
                zone: "foo.com".to_string(),
            })
        );
    }

    #[test]
    fn test_prefix_for() {
        assert_eq!(prefix_for("foo.com", "foo.com").as_deref(), Some(""));
        assert_eq!(prefix_for("a.b.foo.com.", "foo.com").as_deref(), Some("a.b"));
        assert_eq!(prefix_for("barfoo.com", "foo.com"), None);
        assert_eq!(prefix_for("bar.com", "foo.com"), None);
    }
}
