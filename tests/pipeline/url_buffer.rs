use urltitel::Pipeline;
use urltitel::links::IncomingMessage;

use crate::recording_host::RecordingHost;
use crate::{mount_page, test_config};

#[tokio::test]
async fn buffer_collects_speaker_line_and_titles() {
    let server = wiremock::MockServer::start().await;
    mount_page(&server, "/", "<title>Example Domain</title>").await;

    let mut config = test_config();
    config.options.urlbuffer = true;
    let pipeline = Pipeline::new(&config).unwrap();
    let host = RecordingHost::new(Some("me"));
    let text = format!("have a look: {}", server.uri());
    let message = IncomingMessage::new("net1", "#chan", "alice", text.clone());

    pipeline.handle(&host, &config, &message).await;

    assert_eq!(
        host.buffer_lines(),
        vec![
            format!("<alice@net1/#chan>\t{text}"),
            "1:\tExample Domain".to_string(),
        ]
    );
    assert_eq!(host.printed(), vec!["1:\tExample Domain"]);
}

#[tokio::test]
async fn own_lines_use_host_nick_or_placeholder() {
    let server = wiremock::MockServer::start().await;
    mount_page(&server, "/", "<title>Example Domain</title>").await;

    let mut config = test_config();
    config.options.urlbuffer = true;
    let text = server.uri();

    let named = RecordingHost::new(Some("me"));
    let pipeline = Pipeline::new(&config).unwrap();
    pipeline
        .handle(&named, &config, &IncomingMessage::outbound("net1", "#chan", text.clone()))
        .await;
    assert_eq!(named.buffer_lines()[0], format!("<me@net1/#chan>\t{text}"));

    let anonymous = RecordingHost::new(None);
    let pipeline = Pipeline::new(&config).unwrap();
    pipeline
        .handle(&anonymous, &config, &IncomingMessage::outbound("net1", "#chan", text.clone()))
        .await;
    assert_eq!(anonymous.buffer_lines()[0], format!("<*@net1/#chan>\t{text}"));
}

#[tokio::test]
async fn buffer_stays_quiet_when_disabled() {
    let server = wiremock::MockServer::start().await;
    mount_page(&server, "/", "<title>Example Domain</title>").await;

    let config = test_config();
    let pipeline = Pipeline::new(&config).unwrap();
    let host = RecordingHost::new(Some("me"));
    let message = IncomingMessage::new("net1", "#chan", "alice", server.uri());

    pipeline.handle(&host, &config, &message).await;

    assert!(host.buffer_lines().is_empty());
}
