/*!
 * End-to-end pipeline tests: frames in, events out
 */

use chatwatch::app_controller::Controller;
use chatwatch::language_utils::TargetLanguage;
use chatwatch::providers::mock::MockProvider;
use chatwatch::providers::ProviderTier;
use tokio::sync::broadcast::error::TryRecvError;

use crate::common;

fn controller() -> Controller {
    common::init_logging();
    Controller::with_cascade(
        common::test_config(),
        common::mock_cascade(vec![
            MockProvider::failing(ProviderTier::Primary),
            MockProvider::working(ProviderTier::Secondary),
        ]),
    )
}

#[tokio::test]
async fn test_frame_fromWatchedChannel_shouldEmitMessageAndCounter() {
    let mut controller = controller();
    let mut messages = controller.events().subscribe_messages();
    let mut counter = controller.events().subscribe_counter();
    let manager = controller.connection_manager();

    assert!(manager.handle_frame(&common::fresh_frame("p1", "chan-1", "good morning"), &mut controller).await);

    let message = messages.try_recv().unwrap();
    assert_eq!(message.post_id, "p1");
    assert_eq!(message.sender, "Bob");
    assert_eq!(message.channel, "town-square");
    assert_eq!(message.original_text, "good morning");
    assert_eq!(message.translated_text, "🌐 [vi] good morning");
    assert_eq!(message.provider, Some(ProviderTier::Secondary));
    assert_eq!(counter.try_recv().unwrap(), 1);
}

#[tokio::test]
async fn test_frame_withUnknownNames_shouldFallBackToIds() {
    let mut controller = controller();
    let mut messages = controller.events().subscribe_messages();
    let manager = controller.connection_manager();
    manager.set_watch_channels(["chan-7"]);

    let frame = common::posted_frame(Some("p1"), "chan-7", "user-7", "hi", chrono::Utc::now().timestamp_millis());
    manager.handle_frame(&frame, &mut controller).await;

    let message = messages.try_recv().unwrap();
    assert_eq!(message.sender, "user-7");
    assert_eq!(message.channel, "chan-7");
}

#[tokio::test]
async fn test_frame_deliveredTwice_shouldBeProcessedOnce() {
    let mut controller = controller();
    let mut messages = controller.events().subscribe_messages();
    let handle = controller.handle();
    let manager = controller.connection_manager();
    let frame = common::fresh_frame("p1", "chan-1", "hello");

    manager.handle_frame(&frame, &mut controller).await;
    manager.handle_frame(&frame, &mut controller).await;

    assert!(messages.try_recv().is_ok());
    assert!(matches!(messages.try_recv(), Err(TryRecvError::Empty)));
    assert_eq!(handle.counter(), 1);
}

#[tokio::test]
async fn test_frame_withoutIdReplayed_shouldBeProcessedOnce() {
    let mut controller = controller();
    let handle = controller.handle();
    let manager = controller.connection_manager();
    let now = chrono::Utc::now().timestamp_millis();

    for create_at in [now, now + 1, now + 2] {
        let frame = common::posted_frame(None, "chan-1", "user-1", "same text", create_at);
        manager.handle_frame(&frame, &mut controller).await;
    }

    assert_eq!(handle.counter(), 1);
}

#[tokio::test]
async fn test_frame_withPersonalMention_shouldRaiseOneAlert() {
    let mut controller = controller();
    let mut alerts = controller.events().subscribe_alerts();
    let manager = controller.connection_manager();

    manager
        .handle_frame(&common::fresh_frame("p1", "chan-1", "@alice can you review?"), &mut controller)
        .await;
    manager
        .handle_frame(&common::fresh_frame("p2", "chan-1", "@alice ping"), &mut controller)
        .await;

    let alert = alerts.try_recv().unwrap();
    assert_eq!(alert.title, "Mention from Bob in #town-square");
    assert_eq!(alert.body, "@alice can you review?");
    // same title inside the dedup window
    assert!(matches!(alerts.try_recv(), Err(TryRecvError::Empty)));
}

#[tokio::test]
async fn test_frame_withOldMention_shouldStillEmitMessageButNoAlert() {
    let mut controller = controller();
    let mut messages = controller.events().subscribe_messages();
    let mut alerts = controller.events().subscribe_alerts();
    let manager = controller.connection_manager();
    let an_hour_ago = chrono::Utc::now().timestamp_millis() - 3_600_000;

    let frame = common::posted_frame(Some("p1"), "chan-1", "user-1", "@here standup", an_hour_ago);
    manager.handle_frame(&frame, &mut controller).await;

    assert!(messages.try_recv().is_ok());
    assert!(matches!(alerts.try_recv(), Err(TryRecvError::Empty)));
}

#[tokio::test]
async fn test_alertClicked_shouldMuteFollowingAlerts() {
    let mut controller = controller();
    let mut alerts = controller.events().subscribe_alerts();
    let handle = controller.handle();
    let manager = controller.connection_manager();

    handle.alert_clicked();
    let frame = common::posted_frame(
        Some("p1"),
        "chan-1",
        "user-1",
        "@channel deploy",
        chrono::Utc::now().timestamp_millis() + 1_000,
    );
    manager.handle_frame(&frame, &mut controller).await;

    assert!(matches!(alerts.try_recv(), Err(TryRecvError::Empty)));
}

#[tokio::test]
async fn test_monitorHandle_commands_shouldApplyToNextPost() {
    let mut controller = controller();
    let mut messages = controller.events().subscribe_messages();
    let mut counter = controller.events().subscribe_counter();
    let handle = controller.handle();
    let manager = controller.connection_manager();

    manager.handle_frame(&common::fresh_frame("p1", "chan-1", "one"), &mut controller).await;
    handle.reset_counter();
    handle.set_target_language(TargetLanguage::Japanese);
    handle.set_watch_channels(["chan-2"]);

    assert!(!manager.handle_frame(&common::fresh_frame("p2", "chan-1", "two"), &mut controller).await);
    assert!(manager.handle_frame(&common::fresh_frame("p3", "chan-2", "three"), &mut controller).await);

    let translated: Vec<String> = std::iter::from_fn(|| messages.try_recv().ok())
        .map(|m| m.translated_text)
        .collect();
    assert_eq!(translated, vec!["🌐 [vi] one", "🌐 [ja] three"]);

    let counts: Vec<u64> = std::iter::from_fn(|| counter.try_recv().ok()).collect();
    assert_eq!(counts, vec![1, 0, 1]);
    assert_eq!(handle.target_language(), TargetLanguage::Japanese);
}

#[tokio::test]
async fn test_translateText_withNoProviders_shouldStillEmitMessage() {
    let mut controller = Controller::with_cascade(common::test_config(), common::mock_cascade(vec![]));
    let mut messages = controller.events().subscribe_messages();

    let message = controller
        .process_post(common::post(Some("p1"), "chan-1", "hello", chrono::Utc::now()))
        .await
        .unwrap();

    assert_eq!(message.translated_text, "");
    assert_eq!(message.provider, None);
    assert_eq!(messages.try_recv().unwrap(), message);
}
