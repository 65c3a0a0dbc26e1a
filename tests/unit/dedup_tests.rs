/*!
 * Tests for duplicate suppression
 */

use chatwatch::dedup::{BoundedSeenSet, DEFAULT_CAPACITY, DedupEngine};
use chrono::Utc;

use crate::common;

#[test]
fn test_observe_withSameIdTwice_shouldBeIdempotent() {
    let mut dedup = DedupEngine::default();
    let post = common::post(Some("p1"), "chan-1", "hello", Utc::now());

    assert!(dedup.observe(&post));
    for _ in 0..3 {
        assert!(!dedup.observe(&post));
    }
    assert_eq!(dedup.len(), 1);
}

#[test]
fn test_observe_withSameContentWithoutId_shouldBeIdempotent() {
    let mut dedup = DedupEngine::default();
    let first = common::post(None, "chan-1", "hello", Utc::now());
    let replay = common::post(None, "chan-1", "hello", Utc::now());

    assert!(dedup.observe(&first));
    assert!(!dedup.observe(&replay));
}

#[test]
fn test_observe_withSameTextInOtherChannel_shouldPass() {
    let mut dedup = DedupEngine::default();
    assert!(dedup.observe(&common::post(None, "chan-1", "hello", Utc::now())));
    assert!(dedup.observe(&common::post(None, "chan-2", "hello", Utc::now())));
}

#[test]
fn test_observe_idAndContentRegistries_shouldBeIndependent() {
    let mut dedup = DedupEngine::default();
    assert!(dedup.observe(&common::post(Some("p1"), "chan-1", "hello", Utc::now())));
    // same content but no id: looked up in the content registry only
    assert!(dedup.observe(&common::post(None, "chan-1", "hello", Utc::now())));
}

#[test]
fn test_observe_beyondCapacity_shouldForgetOldestId() {
    let mut dedup = DedupEngine::default();
    assert_eq!(dedup.capacity(), DEFAULT_CAPACITY);

    for i in 0..=DEFAULT_CAPACITY {
        let id = format!("p{}", i);
        assert!(dedup.observe(&common::post(Some(&id), "chan-1", "x", Utc::now())));
    }

    // p0 was evicted, p1 is still remembered
    assert!(dedup.observe(&common::post(Some("p0"), "chan-1", "x", Utc::now())));
    assert!(!dedup.observe(&common::post(Some("p2"), "chan-1", "x", Utc::now())));
}

#[test]
fn test_boundedSeenSet_withRepeat_shouldNotRefreshPosition() {
    let mut seen = BoundedSeenSet::new(3);
    seen.insert("a");
    seen.insert("b");
    seen.insert("c");
    assert!(!seen.insert("a"));

    seen.insert("d");

    // "a" was oldest despite being seen again
    assert!(!seen.contains(&"a"));
    assert!(seen.contains(&"b"));
}
