use propsync_core::PropertyPath;
use proptest::prelude::*;

fn segments() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec("[a-z_]{1,8}", 1..6)
}

proptest! {
    #[test]
    fn dotted_form_parses_back(segs in segments()) {
        let path = PropertyPath::from_segments(segs.clone()).unwrap();
        let reparsed = PropertyPath::parse(&path.to_dotted()).unwrap();
        prop_assert_eq!(reparsed.segments(), &segs[..]);
        prop_assert_eq!(reparsed, path);
    }

    #[test]
    fn ancestors_are_proper_prefixes_coarse_to_fine(segs in segments()) {
        let path = PropertyPath::from_segments(segs.clone()).unwrap();
        let ancestors: Vec<PropertyPath> = path.ancestors().collect();
        prop_assert_eq!(ancestors.len(), segs.len() - 1);
        for (depth, ancestor) in ancestors.iter().enumerate() {
            prop_assert_eq!(ancestor.len(), depth + 1);
            prop_assert!(ancestor.is_ancestor_of(&path));
            prop_assert!(!path.is_ancestor_of(ancestor));
        }
    }

    #[test]
    fn doubled_dot_never_parses(a in "[a-z]{1,5}", b in "[a-z]{1,5}") {
        let raw = format!("{a}..{b}");
        prop_assert!(PropertyPath::parse(&raw).is_err());
    }
}
