// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::time::Duration;

#[test]
fn system_clock_returns_increasing_time() {
    let clock = SystemClock;
    let t1 = clock.now();
    std::thread::sleep(Duration::from_millis(1));
    let t2 = clock.now();
    assert!(t2 > t1);
}

#[test]
fn system_clock_epoch_is_after_2020() {
    // 2020-01-01T00:00:00Z
    assert!(SystemClock.epoch_secs() > 1_577_836_800);
}

#[test]
fn fake_clock_can_be_advanced() {
    let clock = FakeClock::new();
    let t1 = clock.now();
    let s1 = clock.epoch_secs();
    clock.advance(Duration::from_secs(60));
    assert!(clock.now().duration_since(t1) >= Duration::from_secs(60));
    assert_eq!(clock.epoch_secs(), s1 + 60);
}

#[test]
fn fake_clock_clones_share_time() {
    let clock = FakeClock::new();
    let other = clock.clone();
    clock.set_epoch_ms(5_000);
    assert_eq!(other.epoch_secs(), 5);
}

#[test]
fn epoch_secs_truncates_milliseconds() {
    let clock = FakeClock::new();
    clock.set_epoch_ms(1_999);
    assert_eq!(clock.epoch_secs(), 1);
}
