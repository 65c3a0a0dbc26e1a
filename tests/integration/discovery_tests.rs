/*!
 * Channel discovery against a mocked REST API, written back to a config file
 */

use chatwatch::app_config::Config;
use chatwatch::discovery::{self, ChannelDirectory};
use chatwatch::DiscoveryError;

use crate::common;

async fn mock_server() -> mockito::ServerGuard {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/api/v4/users/me/teams")
        .match_header("authorization", "Bearer test-token")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"[{"id":"t1","name":"eng","display_name":"Engineering"}]"#)
        .create_async()
        .await;
    server
        .mock("GET", "/api/v4/users/me/teams/t1/channels")
        .match_header("authorization", "Bearer test-token")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"[{"id":"c1","name":"town-square","display_name":"Town Square"},
                {"id":"c2","name":"dev","display_name":"Dev"},
                {"id":"c3","name":"random","display_name":"Random"}]"#,
        )
        .create_async()
        .await;
    server
}

#[tokio::test]
async fn test_discover_thenSaveSelection_shouldPersistWatchList() {
    common::init_logging();
    let server = mock_server().await;
    let dir = common::create_temp_dir().unwrap();
    let path = dir.path().join("conf.json");

    let mut config = common::test_config();
    config.server.base_url = server.url();
    config.save(&path).unwrap();

    let channels = ChannelDirectory::from_config(&config.server).discover().await.unwrap();
    let chosen: Vec<_> = discovery::parse_selection("3,1", channels.len())
        .into_iter()
        .map(|i| channels[i].clone())
        .collect();

    let mut stored = Config::load_or_create(&path).unwrap();
    discovery::apply_to_config(&mut stored, &chosen);
    stored.save(&path).unwrap();

    let reloaded = Config::load_or_create(&path).unwrap();
    assert_eq!(reloaded.watch_channels, vec!["c3", "c1"]);
    assert_eq!(reloaded.channel_display_name("c3"), "Random");
    assert_eq!(reloaded.channel_display_name("c1"), "Town Square");
    assert_eq!(reloaded.server.token, "test-token");
}

#[tokio::test]
async fn test_discover_withWrongToken_shouldNotMatchAndFail() {
    let server = mock_server().await;
    let mut config = common::test_config();
    config.server.base_url = server.url();
    config.server.token = "other".to_string();

    let result = ChannelDirectory::from_config(&config.server).discover().await;

    // mockito answers unmatched requests with 501
    assert!(matches!(result, Err(DiscoveryError::ApiError { status_code: 501, .. })));
}
