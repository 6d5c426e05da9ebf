use super::*;

fn temp_dir(name: &str) -> PathBuf {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let dir = std::env::temp_dir().join(format!(
        "catalog_collage_own_{name}_{}_{nanos}",
        std::process::id()
    ));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
fn toggle_flips_membership() {
    let mut set = OwnershipSet::new();
    assert!(set.toggle("p1"));
    assert!(set.contains("p1"));
    assert!(!set.toggle("p1"));
    assert!(set.is_empty());
}

#[test]
fn count_owned_only_counts_members() {
    let set: OwnershipSet = ["a", "c"].into_iter().collect();
    assert_eq!(set.count_owned(["a", "b", "c", "d"]), 2);
}

#[test]
fn missing_file_loads_empty() {
    let store = OwnershipStore::in_dir(temp_dir("missing"));
    assert!(store.load().is_empty());
}

#[test]
fn save_then_load_round_trip() {
    let dir = temp_dir("round_trip");
    let store = OwnershipStore::in_dir(&dir);
    let mut set = OwnershipSet::new();
    store.toggle(&mut set, "b").unwrap();
    store.toggle(&mut set, "a").unwrap();

    let raw = std::fs::read_to_string(dir.join(DEFAULT_OWNERSHIP_FILE)).unwrap();
    assert_eq!(raw, r#"["a","b"]"#);
    assert_eq!(store.load(), set);

    store.clear().unwrap();
    assert!(!store.path().exists());
    store.clear().unwrap();
}

#[test]
fn corrupt_file_is_ignored() {
    let dir = temp_dir("corrupt");
    std::fs::write(dir.join(DEFAULT_OWNERSHIP_FILE), b"{not json").unwrap();
    let store = OwnershipStore::in_dir(&dir);
    assert!(store.load().is_empty());
}
