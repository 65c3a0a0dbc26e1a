/*!
 * Tests for frame filtering and the hot-swappable watch list
 */

use chatwatch::events::EventBus;
use chatwatch::stream::{ConnectionManager, WatchSet};

use crate::common::{self, RecordingHandler};

fn manager(channels: &[&str]) -> ConnectionManager {
    ConnectionManager::new(
        common::test_config().server,
        WatchSet::new(channels.iter().copied()),
        EventBus::default(),
    )
}

#[tokio::test]
async fn test_handleFrame_withNonPostedEvents_shouldDropSilently() {
    let manager = manager(&["chan-1"]);
    let mut handler = RecordingHandler::default();

    for frame in [
        "",
        "garbage",
        r#"{"event":"typing","data":{"parent_id":""},"broadcast":{"channel_id":"chan-1"}}"#,
        r#"{"status":"OK","seq_reply":1}"#,
        r#"{"event":"posted","data":{"post":"not json"}}"#,
        r#"{"event":"posted","data":{"post":42}}"#,
    ] {
        assert!(!manager.handle_frame(frame, &mut handler).await, "frame {:?}", frame);
    }
    assert!(handler.posts.is_empty());
}

#[tokio::test]
async fn test_handleFrame_withWatchedChannel_shouldNormalizePost() {
    let manager = manager(&["chan-1"]);
    let mut handler = RecordingHandler::default();
    let frame = common::posted_frame(None, "chan-1", "user-1", "  spaced out \n", 1_700_000_000_000);

    assert!(manager.handle_frame(&frame, &mut handler).await);

    let post = &handler.posts[0];
    assert_eq!(post.id, None);
    assert_eq!(post.text, "spaced out");
    assert_eq!(post.created_at.timestamp_millis(), 1_700_000_000_000);
}

#[tokio::test]
async fn test_handleFrame_withNonPositiveTimestamp_shouldUseNow() {
    let manager = manager(&["chan-1"]);
    let mut handler = RecordingHandler::default();
    let before = chrono::Utc::now();

    manager
        .handle_frame(&common::posted_frame(Some("p"), "chan-1", "u", "x", -5), &mut handler)
        .await;

    assert!(handler.posts[0].created_at >= before);
}

#[tokio::test]
async fn test_setWatchChannels_shouldTakeEffectOnNextFrame() {
    let manager = manager(&["chan-1"]);
    let mut handler = RecordingHandler::default();

    assert!(manager.handle_frame(&common::fresh_frame("p1", "chan-1", "a"), &mut handler).await);
    assert!(!manager.handle_frame(&common::fresh_frame("p2", "chan-2", "b"), &mut handler).await);

    manager.set_watch_channels(vec!["chan-2".to_string()]);

    assert!(!manager.handle_frame(&common::fresh_frame("p3", "chan-1", "c"), &mut handler).await);
    assert!(manager.handle_frame(&common::fresh_frame("p4", "chan-2", "d"), &mut handler).await);

    let ids: Vec<_> = handler.posts.iter().filter_map(|p| p.id.clone()).collect();
    assert_eq!(ids, vec!["p1", "p4"]);
}

#[tokio::test]
async fn test_watchSet_replacedFromAnotherTask_shouldBeVisible() {
    let watch = WatchSet::new(["chan-1"]);
    let manager = ConnectionManager::new(common::test_config().server, watch.clone(), EventBus::default());
    let mut handler = RecordingHandler::default();

    tokio::spawn(async move { watch.replace(["chan-9"]) }).await.unwrap();

    assert!(manager.handle_frame(&common::fresh_frame("p1", "chan-9", "x"), &mut handler).await);
}

#[test]
fn test_connectionState_beforeConnect_shouldBeDisconnected() {
    let state = manager(&[]).state();
    assert!(!state.is_connected());
    assert_eq!(state.connected_at(), None);
}
