//! End-to-end tests of the public table API in both operating modes.

use densetable::{CacheOutcome, Config, ConfigError, DenseTable, SetOutcome, TableError};

fn key(n: u32) -> [u8; 4] {
    n.to_le_bytes()
}

#[test]
fn insert_update_unset_round_trip() {
    let mut table = DenseTable::new(Config::new(4, 4).elements_min(8)).unwrap();
    let k = [0x01, 0x00, 0x00, 0x00];

    assert_eq!(table.set(&k, &[0xAA; 4]).unwrap(), SetOutcome::Inserted);
    assert_eq!(table.len(), 1);
    let mut out = [0u8; 4];
    assert!(table.get(&k, &mut out));
    assert_eq!(out, [0xAA; 4]);

    assert_eq!(table.set(&k, &[0xBB; 4]).unwrap(), SetOutcome::Updated);
    assert_eq!(table.len(), 1);
    assert!(table.get(&k, &mut out));
    assert_eq!(out, [0xBB; 4]);

    assert!(table.unset(&k));
    assert_eq!(table.len(), 0);
    assert!(!table.exist(&k));
    assert!(!table.get(&k, &mut out));
}

#[test]
fn absent_keys_miss() {
    let mut table = DenseTable::new(Config::new(4, 4).elements_min(8)).unwrap();
    table.set(&key(1), &[1; 4]).unwrap();
    table.set(&key(2), &[2; 4]).unwrap();
    assert!(table.unset(&key(2)));

    let mut out = [0u8; 4];
    assert!(!table.exist(&key(3)));
    assert!(!table.get(&key(3), &mut out));
    assert!(!table.exist(&key(2)));
    assert!(!table.unset(&key(3)));
}

#[test]
fn zero_size_values_accept_missing_buffers() {
    let mut table = DenseTable::new(Config::new(4, 0).elements_min(8)).unwrap();
    assert_eq!(table.set_opt(&key(7), None).unwrap(), SetOutcome::Inserted);
    assert!(table.get_opt(&key(7), None));
    assert!(table.exist(&key(7)));
    // Empty slices are equivalent to the missing buffer.
    assert_eq!(table.set(&key(8), &[]).unwrap(), SetOutcome::Inserted);
    assert!(table.get(&key(8), &mut []));
    assert_eq!(table.len(), 2);
}

#[test]
fn grows_through_many_resizes() {
    let mut table = DenseTable::new(
        Config::new(4, 4).elements_min(2).elements_max(4096),
    )
    .unwrap();
    for n in 0..4096u32 {
        assert_eq!(
            table.set(&key(n), &n.to_le_bytes()).unwrap(),
            SetOutcome::Inserted,
            "key {n} should be new"
        );
    }
    assert_eq!(table.len(), 4096);
    assert!(table.capacity() >= 4096);

    let mut out = [0u8; 4];
    for n in 0..4096u32 {
        assert!(table.get(&key(n), &mut out), "key {n} lost");
        assert_eq!(out, n.to_le_bytes());
    }
}

#[test]
fn modes_are_mutually_exclusive() {
    let mut table = DenseTable::new(Config::new(4, 4)).unwrap();
    table.cache(&key(1), &[0; 4]).unwrap();
    let err = table.set(&key(2), &[0; 4]).unwrap_err();
    assert_eq!(err, TableError::ModeConflict);
    assert_eq!(
        err.to_string(),
        "cache() and set() methods are mutually exclusive"
    );

    let mut table = DenseTable::new(Config::new(4, 4)).unwrap();
    table.set(&key(1), &[0; 4]).unwrap();
    assert_eq!(
        table.cache(&key(2), &[0; 4]).unwrap_err(),
        TableError::ModeConflict
    );
}

#[test]
fn cache_stays_within_initial_capacity_and_evicts() {
    let mut table = DenseTable::new(Config::new(4, 4)).unwrap();
    let capacity = table.capacity();
    assert_eq!(capacity, 1024);

    let total = capacity as u32 * 8;
    let mut evictions = 0u32;
    for n in 0..total {
        match table.cache(&key(n), &n.to_le_bytes()).unwrap() {
            CacheOutcome::Evicted => evictions += 1,
            CacheOutcome::Inserted => {}
            CacheOutcome::Updated => panic!("keys are distinct"),
        }
        assert!(table.len() <= capacity);
        // Capacity is frozen in cache mode.
        assert_eq!(table.capacity(), capacity);
    }
    assert!(evictions > 0, "8x oversubscription must evict");

    // Every still-retrievable key is live; evicted keys are gone for good.
    let survivors = (0..total).filter(|&n| table.exist(&key(n))).count() as u64;
    assert_eq!(survivors, table.len());
    assert!(survivors <= capacity);
}

#[test]
fn growth_stops_at_the_bucket_ceiling() {
    // One shard whose bucket count may double all the way to 65536. Filling
    // it past the point where displacement and two growth attempts give up
    // must surface a capacity error, not corrupt the shard.
    let mut table = DenseTable::new(
        Config::new(4, 4).elements_min(0).elements_max(16),
    )
    .unwrap();
    assert_eq!(table.capacity(), 16);

    let mut err = None;
    let mut inserted = 0u32;
    for n in 0..600_000u32 {
        match table.set(&key(n), &n.to_le_bytes()) {
            Ok(SetOutcome::Inserted) => inserted += 1,
            Ok(SetOutcome::Updated) => panic!("keys are distinct"),
            Err(e) => {
                err = Some(e);
                break;
            }
        }
    }
    assert_eq!(
        err.expect("a shard at the bucket ceiling must refuse inserts"),
        TableError::CapacityExceeded
    );
    // 65536 buckets hold 524288 slots; the cuckoo layout fills most of them
    // before giving up.
    assert_eq!(table.capacity(), 65_536 * 8);
    assert_eq!(u64::from(inserted), table.len());
    assert!(table.len() > 300_000, "gave up unreasonably early: {inserted}");

    // The failed call left the table consistent and usable.
    let mut out = [0u8; 4];
    for n in (0..inserted).step_by(4097) {
        assert!(table.get(&key(n), &mut out), "key {n} lost");
        assert_eq!(out, n.to_le_bytes());
    }
    assert!(table.unset(&key(0)));
    assert_eq!(table.set(&key(0), &[9; 4]).unwrap(), SetOutcome::Inserted);
}

#[test]
fn boundary_key_and_value_sizes() {
    // Largest key, no value.
    let mut table = DenseTable::new(Config::new(64, 0).elements_min(8)).unwrap();
    let mut big_key = [0u8; 64];
    big_key[0] = 1;
    big_key[63] = 2;
    assert_eq!(table.set(&big_key, &[]).unwrap(), SetOutcome::Inserted);
    assert!(table.exist(&big_key));
    big_key[32] ^= 0xFF;
    assert!(!table.exist(&big_key));

    // Largest value: a megabyte per element, two elements.
    let mut table = DenseTable::new(
        Config::new(4, 1 << 20).elements_min(0).elements_max(16),
    )
    .unwrap();
    let a = vec![0x5A; 1 << 20];
    let b = vec![0xA5; 1 << 20];
    table.set(&key(1), &a).unwrap();
    table.set(&key(2), &b).unwrap();
    let mut out = vec![0u8; 1 << 20];
    assert!(table.get(&key(1), &mut out));
    assert_eq!(out, a);
    assert!(table.get(&key(2), &mut out));
    assert_eq!(out, b);
}

#[test]
fn construction_rejects_bad_arguments() {
    assert_eq!(
        DenseTable::new(Config::new(3, 4)).unwrap_err(),
        ConfigError::KeySize { given: 3 }
    );
    assert!(DenseTable::new(Config::new(12, 4)).is_ok());
    assert!(matches!(
        DenseTable::new(Config::new(4, (1 << 20) + 1)).unwrap_err(),
        ConfigError::ValueSize { .. }
    ));
    assert_eq!(
        DenseTable::new(Config::new(64, 1 << 20).elements_max(1 << 32)).unwrap_err(),
        ConfigError::CapacityExceeded
    );
}

#[test]
fn attributes_are_consistent() {
    let table = DenseTable::new(Config::new(4, 4)).unwrap();
    assert_eq!(table.key_size(), 4);
    assert_eq!(table.value_size(), 4);
    assert_eq!(table.capacity(), 1024);
    assert_eq!(table.size(), 1024 / 8 * 128);
    assert!(table.is_empty());
    let printed = format!("{table:?}");
    assert!(printed.contains("DenseTable"));
}
