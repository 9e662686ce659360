// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::clock::FakeClock;
use proptest::prelude::*;
use std::time::Duration;

#[test]
fn sha256_matches_known_digest() {
    let hex = Sha256Hasher.hash(b"abc").unwrap();
    assert_eq!(hex, "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad");
}

#[test]
fn job_id_is_truncated_hex() {
    let clock = FakeClock::new();
    let id = job_id_for(&Sha256Hasher, &clock, "echo hi").unwrap();
    assert_eq!(id.len(), JOB_ID_LEN);
    assert!(id.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
}

#[test]
fn job_id_hashes_timestamp_salted_script() {
    let clock = FakeClock::new();
    clock.set_epoch_ms(1_700_000_000_000);
    let id = job_id_for(&Sha256Hasher, &clock, "echo hi").unwrap();
    let expected = Sha256Hasher.hash(b"1700000000_echo hi").unwrap();
    assert_eq!(id.as_str(), &expected[..JOB_ID_LEN]);
}

#[test]
fn identical_scripts_at_different_times_get_different_ids() {
    let clock = FakeClock::new();
    let first = job_id_for(&Sha256Hasher, &clock, "uptime").unwrap();
    clock.advance(Duration::from_secs(1));
    let second = job_id_for(&Sha256Hasher, &clock, "uptime").unwrap();
    assert_ne!(first, second);
}

#[test]
fn identical_scripts_in_same_second_collide() {
    let clock = FakeClock::new();
    let first = job_id_for(&Sha256Hasher, &clock, "uptime").unwrap();
    clock.advance(Duration::from_millis(10));
    let second = job_id_for(&Sha256Hasher, &clock, "uptime").unwrap();
    assert_eq!(first, second);
}

#[test]
fn failing_hasher_propagates_error() {
    let clock = FakeClock::new();
    let err = job_id_for(&FailingHasher, &clock, "echo hi").unwrap_err();
    assert!(err.to_string().contains("hash computation failed"));
}

proptest! {
    #[test]
    fn distinct_seconds_yield_distinct_ids(script in ".{0,64}", a in 0u64..1_000_000, b in 0u64..1_000_000) {
        prop_assume!(a != b);
        let clock = FakeClock::new();
        clock.set_epoch_ms(a * 1000);
        let first = job_id_for(&Sha256Hasher, &clock, &script).unwrap();
        clock.set_epoch_ms(b * 1000);
        let second = job_id_for(&Sha256Hasher, &clock, &script).unwrap();
        prop_assert_ne!(first, second);
    }
}
