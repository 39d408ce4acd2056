use urltitel::error::ConfigError;
use urltitel::{Pipeline, UrltitelError};
use urltitel::links::{IncomingMessage, echo_line};
use urltitel::pipeline::display_line;
use wiremock::MockServer;
use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

use crate::recording_host::{Output, RecordingHost};
use crate::{mount_page, test_config};

const PERDU: &str = "<html><head><title>Vous Etes Perdu ?</title></head><body></body></html>";

#[tokio::test]
async fn unlisted_reply_channel_displays_locally() {
    let server = MockServer::start().await;
    mount_page(&server, "/", PERDU).await;

    let config = test_config();
    let pipeline = Pipeline::new(&config).unwrap();
    let host = RecordingHost::new(Some("me"));
    let message = IncomingMessage::new(
        "net1",
        "#chan",
        "alice",
        format!("check {}", server.uri()),
    );

    let titles = pipeline.handle(&host, &config, &message).await;

    assert_eq!(titles, vec![Some("Vous Etes Perdu ?".to_string())]);
    assert_eq!(host.printed(), vec!["1:\tVous Etes Perdu ?"]);
    assert!(host.sent().is_empty());
}

#[tokio::test]
async fn listed_reply_channel_sends_to_channel() {
    let server = MockServer::start().await;
    mount_page(&server, "/", PERDU).await;

    let mut config = test_config();
    config.options.set("replyto", "net1,#chan").unwrap();
    let pipeline = Pipeline::new(&config).unwrap();
    let host = RecordingHost::new(Some("me"));
    let message = IncomingMessage::new(
        "net1",
        "#chan",
        "alice",
        format!("check {}", server.uri()),
    );

    pipeline.handle(&host, &config, &message).await;

    let outputs = host.outputs();
    assert_eq!(outputs.len(), 1);
    match &outputs[0] {
        Output::Sent { target, text } => {
            assert_eq!(target.server, "net1");
            assert_eq!(target.channel, "#chan");
            assert_eq!(text, "url|1): Vous Etes Perdu ?");
        }
        other => panic!("expected a send, got {other:?}"),
    }
}

#[tokio::test]
async fn unlisted_server_channel_is_ignored() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mut config = test_config();
    config.options.set("serverchans", "net2,*").unwrap();
    let pipeline = Pipeline::new(&config).unwrap();
    let host = RecordingHost::new(Some("me"));
    let message = IncomingMessage::new("net1", "#chan", "alice", server.uri());

    assert!(pipeline.handle(&host, &config, &message).await.is_empty());
    assert!(host.outputs().is_empty());
}

#[tokio::test]
async fn missing_titles_keep_their_index() {
    let server = MockServer::start().await;
    mount_page(&server, "/first", "<title>First</title>").await;
    mount_page(&server, "/untitled", "<p>nothing here</p>").await;
    mount_page(&server, "/third", "<title>Third</title>").await;

    let config = test_config();
    let pipeline = Pipeline::new(&config).unwrap();
    let host = RecordingHost::new(Some("me"));
    let uri = server.uri();
    let message = IncomingMessage::new(
        "net1",
        "#chan",
        "alice",
        format!("{uri}/first {uri}/untitled and {uri}/third"),
    );

    let titles = pipeline.handle(&host, &config, &message).await;

    assert_eq!(titles.len(), 3);
    assert!(titles[1].is_none());
    assert_eq!(host.printed(), vec!["1:\tFirst", "3:\tThird"]);
}

#[tokio::test]
async fn parallel_fetches_preserve_url_order() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(b"<title>Slow</title>".to_vec(), "text/html")
                .set_delay(std::time::Duration::from_millis(300)),
        )
        .mount(&server)
        .await;
    mount_page(&server, "/fast", "<title>Fast</title>").await;

    let mut config = test_config();
    config.parallel_fetches = 4;
    let pipeline = Pipeline::new(&config).unwrap();
    let host = RecordingHost::new(Some("me"));
    let uri = server.uri();
    let message = IncomingMessage::new("net1", "#chan", "alice", format!("{uri}/slow {uri}/fast"));

    pipeline.handle(&host, &config, &message).await;

    assert_eq!(host.printed(), vec!["1:\tSlow", "2:\tFast"]);
}

#[tokio::test]
async fn long_titles_are_truncated() {
    let server = MockServer::start().await;
    mount_page(&server, "/", "<title>  A   very\n long &amp; winding title </title>").await;

    let mut config = test_config();
    config.options.maxlength = 10;
    let pipeline = Pipeline::new(&config).unwrap();
    let host = RecordingHost::new(Some("me"));
    let message = IncomingMessage::new("net1", "#chan", "alice", server.uri());

    pipeline.handle(&host, &config, &message).await;

    assert_eq!(host.printed(), vec![display_line(1, "A very lon…")]);
}

#[tokio::test]
async fn own_messages_are_sent_when_sendfromme_is_on() {
    let server = MockServer::start().await;
    mount_page(&server, "/", PERDU).await;

    let mut config = test_config();
    config.options.sendfromme = true;
    let pipeline = Pipeline::new(&config).unwrap();
    let host = RecordingHost::new(Some("me"));
    let message = IncomingMessage::outbound("net1", "#chan", format!("look {}", server.uri()));

    pipeline.handle(&host, &config, &message).await;

    assert_eq!(host.sent(), vec![echo_line(1, "Vous Etes Perdu ?")]);
}

#[tokio::test]
async fn own_messages_are_displayed_when_sendfromme_is_off() {
    let server = MockServer::start().await;
    mount_page(&server, "/", PERDU).await;

    let config = test_config();
    let pipeline = Pipeline::new(&config).unwrap();
    let host = RecordingHost::new(Some("me"));
    let message = IncomingMessage::outbound("net1", "#chan", format!("look {}", server.uri()));

    pipeline.handle(&host, &config, &message).await;

    assert!(host.sent().is_empty());
    assert_eq!(host.printed(), vec!["1:\tVous Etes Perdu ?"]);
}

#[tokio::test]
async fn echoed_title_lines_are_not_processed_again() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mut config = test_config();
    config.options.sendfromme = true;
    let pipeline = Pipeline::new(&config).unwrap();
    let host = RecordingHost::new(Some("me"));
    let echoed = echo_line(1, &format!("see {}/loop", server.uri()));
    let message = IncomingMessage::outbound("net1", "#chan", echoed);

    assert!(pipeline.handle(&host, &config, &message).await.is_empty());
    assert!(host.outputs().is_empty());
}

#[tokio::test]
async fn non_html_documents_produce_no_output() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(b"%PDF-1.7".to_vec(), "application/pdf"),
        )
        .mount(&server)
        .await;

    let config = test_config();
    let pipeline = Pipeline::new(&config).unwrap();
    let host = RecordingHost::new(Some("me"));
    let message = IncomingMessage::new("net1", "#chan", "alice", format!("{}/doc.pdf", server.uri()));

    assert_eq!(pipeline.handle(&host, &config, &message).await, vec![None]);
    assert!(host.outputs().is_empty());
}

#[test]
fn pipeline_refuses_invalid_config() {
    let mut config = test_config();
    config.parallel_fetches = 0;

    let err = Pipeline::new(&config).err().unwrap();
    assert!(matches!(
        err,
        UrltitelError::Config(ConfigError::Validation(_))
    ));
}

#[tokio::test]
async fn blank_title_prints_nothing() {
    let server = MockServer::start().await;
    mount_page(&server, "/", "<title> \n\t </title>").await;

    let config = test_config();
    let pipeline = Pipeline::new(&config).unwrap();
    let host = RecordingHost::new(Some("me"));
    let message = IncomingMessage::new("net1", "#chan", "alice", server.uri());

    assert_eq!(pipeline.handle(&host, &config, &message).await, vec![None]);
    assert!(host.outputs().is_empty());
}
