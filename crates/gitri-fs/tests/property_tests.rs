use gitri_fs::{NormalizedPath, confine_relative};
use proptest::prelude::*;

proptest! {
    #[test]
    fn confined_paths_never_escape(segments in prop::collection::vec("(\\.\\.|\\.|[a-z]{1,4})", 1..8)) {
        let input = segments.join("/");
        if let Ok(confined) = confine_relative(&input) {
            // Relative, with no traversal or empty segments left
            prop_assert!(!confined.starts_with('/'));
            prop_assert!(confined.split('/').all(|s| s != ".." && s != "." && !s.is_empty()));

            // Joining under a root never leaves it
            let root = NormalizedPath::new("/project");
            let joined = root.join(&confined);
            prop_assert!(joined.as_str().starts_with("/project/"));
        }
    }

    #[test]
    fn normalization_removes_backslashes(s in "\\PC*") {
        let path = NormalizedPath::new(&s);
        prop_assert!(!path.as_str().contains('\\'));
    }
}
