use dirc::errors::IndexError;
use dirc::index::IndexStore;
use dirc::index::entry::{ExtendedFlags, Stage};
use pretty_assertions::assert_eq;

mod common;
use common::RawIndexBuilder;

#[test]
fn parse_single_entry_and_lookup_by_path() -> anyhow::Result<()> {
    let bytes = RawIndexBuilder::new(2, 1)
        .entry_raw(b"a/b", &[0u8; 20], 0o100644, 3, None)
        .finish();

    let store = IndexStore::parse(&bytes)?;

    assert_eq!(store.entry_count(), 1);
    assert_eq!(store.version(), 2);

    let entries = store.lookup("a/b").expect("entry must be present");
    assert_eq!(entries.len(), 1);
    assert_eq!(&entries[0].path[..], b"a/b");
    assert!(entries[0].oid.is_zero());
    assert_eq!(entries[0].stage(), Stage::Normal);

    assert!(store.lookup("a/c").is_none());

    Ok(())
}

#[test]
fn entry_count_matches_declared_header_count() -> anyhow::Result<()> {
    let bytes = RawIndexBuilder::new(2, 3)
        .entry(b"a")
        .entry(b"b/c")
        .entry(b"b/d")
        .finish();

    let store = IndexStore::parse(&bytes)?;

    assert_eq!(store.entry_count(), 3);
    let paths: Vec<_> = store.entries().map(|e| e.path.to_vec()).collect();
    assert_eq!(paths, vec![b"a".to_vec(), b"b/c".to_vec(), b"b/d".to_vec()]);

    Ok(())
}

#[test]
fn rejects_bad_magic_signature() {
    let mut bytes = RawIndexBuilder::new(2, 0).finish();
    bytes[0..4].copy_from_slice(b"XXXX");

    assert!(matches!(
        IndexStore::parse(&bytes),
        Err(IndexError::Format(_))
    ));
}

#[test]
fn rejects_unsupported_versions() {
    for version in [0u32, 1, 4] {
        let bytes = RawIndexBuilder::new(version, 0).finish();
        assert_eq!(
            IndexStore::parse(&bytes),
            Err(IndexError::UnsupportedVersion(version))
        );
    }
}

#[test]
fn truncation_mid_entry_is_reported_as_such() {
    let bytes = RawIndexBuilder::new(2, 1).entry(b"a/b").finish();

    // Cut inside the fixed block of the first entry
    assert!(matches!(
        IndexStore::parse(&bytes[..12 + 30]),
        Err(IndexError::TruncatedData { .. })
    ));
}

#[test]
fn header_declaring_more_entries_than_present_is_truncation() {
    let bytes = RawIndexBuilder::new(2, 2).entry(b"only-one").finish();

    assert!(matches!(
        IndexStore::parse(&bytes),
        Err(IndexError::TruncatedData { .. })
    ));
}

#[test]
fn corrupted_checksum_trailer_never_yields_a_store() {
    let mut bytes = RawIndexBuilder::new(2, 1).entry(b"a/b").finish();
    let last = bytes.len() - 1;
    bytes[last] ^= 0xFF;

    assert!(matches!(
        IndexStore::parse(&bytes),
        Err(IndexError::ChecksumMismatch { .. })
    ));
}

#[test]
fn missing_checksum_trailer_is_truncation() {
    let bytes = RawIndexBuilder::new(2, 1)
        .entry(b"a/b")
        .finish_without_checksum();

    assert!(matches!(
        IndexStore::parse(&bytes),
        Err(IndexError::TruncatedData { .. })
    ));
}

#[test]
fn entries_out_of_path_order_are_rejected() {
    let bytes = RawIndexBuilder::new(2, 2).entry(b"b").entry(b"a").finish();

    assert_eq!(
        IndexStore::parse(&bytes),
        Err(IndexError::OrderingViolation {
            prev: String::from("b"),
            next: String::from("a"),
        })
    );
}

#[test]
fn duplicate_path_and_stage_is_an_ordering_violation() {
    let bytes = RawIndexBuilder::new(2, 2)
        .entry(b"same")
        .entry(b"same")
        .finish();

    assert!(matches!(
        IndexStore::parse(&bytes),
        Err(IndexError::OrderingViolation { .. })
    ));
}

#[test]
fn conflict_stages_are_all_retained_and_retrievable() -> anyhow::Result<()> {
    let bytes = RawIndexBuilder::new(2, 4)
        .entry(b"clean")
        .entry_at_stage(b"conflicted", 1)
        .entry_at_stage(b"conflicted", 2)
        .entry_at_stage(b"conflicted", 3)
        .finish();

    let store = IndexStore::parse(&bytes)?;
    assert!(store.has_conflicts());

    let sides = store.lookup("conflicted").expect("path must be present");
    assert_eq!(sides.len(), 3);
    assert_eq!(
        sides.iter().map(|e| e.stage()).collect::<Vec<_>>(),
        vec![Stage::Base, Stage::Ours, Stage::Theirs]
    );

    assert!(store.entry("conflicted", Stage::Ours).is_some());
    assert!(store.entry("conflicted", Stage::Normal).is_none());
    assert_eq!(store.lookup("clean").map(<[_]>::len), Some(1));

    Ok(())
}

#[test]
fn same_path_stages_must_ascend() {
    let bytes = RawIndexBuilder::new(2, 2)
        .entry_at_stage(b"conflicted", 2)
        .entry_at_stage(b"conflicted", 1)
        .finish();

    assert!(matches!(
        IndexStore::parse(&bytes),
        Err(IndexError::OrderingViolation { .. })
    ));
}

#[test]
fn extended_flag_bit_is_malformed_in_version_two() {
    let flags = (1u16 << 14) | 3;
    let bytes = RawIndexBuilder::new(2, 1)
        .entry_raw(b"a/b", &common::oid_for(b"a/b"), 0o100644, flags, Some(0))
        .finish();

    assert!(matches!(
        IndexStore::parse(&bytes),
        Err(IndexError::Format(_))
    ));
}

#[test]
fn version_three_extended_flags_are_decoded() {
    let flags = (1u16 << 14) | 9;
    let intent_to_add = 1u16 << 13;
    let bytes = RawIndexBuilder::new(3, 1)
        .entry_raw(
            b"new-thing",
            &common::oid_for(b"new-thing"),
            0o100644,
            flags,
            Some(intent_to_add),
        )
        .finish();

    let store = IndexStore::parse(&bytes).unwrap();
    let entry = &store.lookup("new-thing").unwrap()[0];
    assert_eq!(entry.flags.extended, ExtendedFlags::INTENT_TO_ADD);
}

#[test]
fn reserved_extended_flag_bits_are_malformed() {
    let flags = (1u16 << 14) | 1;
    let bytes = RawIndexBuilder::new(3, 1)
        .entry_raw(b"x", &common::oid_for(b"x"), 0o100644, flags, Some(0x0001))
        .finish();

    assert!(matches!(
        IndexStore::parse(&bytes),
        Err(IndexError::Format(_))
    ));
}

#[test]
fn unknown_mode_word_is_malformed() {
    let bytes = RawIndexBuilder::new(2, 1)
        .entry_raw(b"dir", &common::oid_for(b"dir"), 0o40000, 3, None)
        .finish();

    assert!(matches!(
        IndexStore::parse(&bytes),
        Err(IndexError::Format(_))
    ));
}

#[test]
fn extension_blocks_are_carried_opaquely() {
    let payload = b"tree cache bytes";
    let bytes = RawIndexBuilder::new(2, 1)
        .entry(b"a")
        .extension(b"TREE", payload)
        .finish();

    let store = IndexStore::parse(&bytes).unwrap();
    assert_eq!(store.extensions().len(), 1);
    assert_eq!(store.extensions()[0].signature(), b"TREE");
    assert_eq!(&store.extensions()[0].payload()[..], payload);
    assert!(store.extensions()[0].is_optional());
}

#[test]
fn extension_payload_running_into_checksum_is_truncation() {
    let mut block = b"TREE".to_vec();
    block.extend_from_slice(&64u32.to_be_bytes());
    block.extend_from_slice(&[0u8; 8]);

    let bytes = RawIndexBuilder::new(2, 0).raw(&block).finish();

    assert!(matches!(
        IndexStore::parse(&bytes),
        Err(IndexError::TruncatedData { .. })
    ));
}

#[test]
fn long_path_is_read_to_its_null_terminator() {
    let long_path = [b"deep/".to_vec(), vec![b'p'; 0xFFF + 5]].concat();
    let flags = 0xFFFu16;
    let bytes = RawIndexBuilder::new(2, 1)
        .entry_raw(&long_path, &common::oid_for(&long_path), 0o100644, flags, None)
        .finish();

    let store = IndexStore::parse(&bytes).unwrap();
    let entries = store.lookup(&long_path).unwrap();
    assert_eq!(entries[0].path.len(), long_path.len());
}

#[test]
fn empty_index_parses_to_empty_store() {
    let bytes = RawIndexBuilder::new(2, 0).finish();

    let store = IndexStore::parse(&bytes).unwrap();
    assert_eq!(store.entry_count(), 0);
    assert!(store.lookup("anything").is_none());
    assert!(!store.has_conflicts());
}
