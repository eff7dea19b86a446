use super::*;

#[test]
fn exact_match_is_trusted() {
    let set = TrustedPathSet::seeded("/a/b");
    assert!(set.is_trusted(Path::new("/a/b")));
}

#[test]
fn descendant_is_trusted() {
    let set = TrustedPathSet::seeded("/a/b");
    assert!(set.is_trusted(Path::new("/a/b/c")));
}

#[test]
fn sibling_with_shared_prefix_is_not_trusted() {
    let set = TrustedPathSet::seeded("/a/b");
    assert!(!set.is_trusted(Path::new("/a/bc")));
}

#[test]
fn unrelated_path_is_not_trusted() {
    let set = TrustedPathSet::seeded("/a/b");
    assert!(!set.is_trusted(Path::new("/etc/passwd")));
}

#[test]
fn insert_is_idempotent() {
    let mut set = TrustedPathSet::new();
    set.insert(PathBuf::from("/x"));
    set.insert(PathBuf::from("/x"));
    assert_eq!(set.len(), 1);
}

#[test]
fn untrusted_filters_down_to_the_gap() {
    let set = TrustedPathSet::seeded("/work");
    let paths = vec![PathBuf::from("/work/a.rs"), PathBuf::from("/etc/shadow")];
    let untrusted = set.untrusted(&paths);
    assert_eq!(untrusted, vec![&PathBuf::from("/etc/shadow")]);
}
