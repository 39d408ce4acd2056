use serde_json::json;
use urltitel::Pipeline;
use urltitel::links::IncomingMessage;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::recording_host::RecordingHost;
use crate::test_config;

const BANNER_PAGE: &str = "<html><head><title>The Pirate Bay - The galaxy's most resilient \
                           bittorrent site</title></head></html>";

async fn torrent_site() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/description.php"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(BANNER_PAGE.as_bytes().to_vec(), "text/html"),
        )
        .mount(&server)
        .await;
    server
}

#[tokio::test]
async fn description_page_title_comes_from_metadata_api() {
    let server = torrent_site().await;
    Mock::given(method("GET"))
        .and(path("/t.php"))
        .and(query_param("id", "42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "42",
            "name": "Ubuntu 24.04 Desktop amd64",
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut config = test_config();
    config.torrent_api = format!("{}/t.php", server.uri());
    let pipeline = Pipeline::new(&config).unwrap();
    let host = RecordingHost::new(Some("me"));
    let message = IncomingMessage::new(
        "net1",
        "#chan",
        "alice",
        format!("{}/description.php?id=42", server.uri()),
    );

    pipeline.handle(&host, &config, &message).await;

    assert_eq!(
        host.printed(),
        vec!["1:\tTPB torrent: Ubuntu 24.04 Desktop amd64"]
    );
}

#[tokio::test]
async fn failed_metadata_lookup_keeps_banner_title() {
    let server = torrent_site().await;
    Mock::given(method("GET"))
        .and(path("/t.php"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let mut config = test_config();
    config.torrent_api = format!("{}/t.php", server.uri());
    let pipeline = Pipeline::new(&config).unwrap();
    let host = RecordingHost::new(Some("me"));
    let message = IncomingMessage::new(
        "net1",
        "#chan",
        "alice",
        format!("{}/description.php?id=42", server.uri()),
    );

    pipeline.handle(&host, &config, &message).await;

    assert_eq!(
        host.printed(),
        vec!["1:\tThe Pirate Bay - The galaxy's most resilient bittorrent site"]
    );
}

#[tokio::test]
async fn banner_without_torrent_id_is_left_alone() {
    let server = torrent_site().await;
    Mock::given(method("GET"))
        .and(path("/t.php"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mut config = test_config();
    config.torrent_api = format!("{}/t.php", server.uri());
    let pipeline = Pipeline::new(&config).unwrap();
    let host = RecordingHost::new(Some("me"));
    let message = IncomingMessage::new(
        "net1",
        "#chan",
        "alice",
        format!("{}/description.php?q=ubuntu", server.uri()),
    );

    pipeline.handle(&host, &config, &message).await;

    assert_eq!(host.printed().len(), 1);
}
