//! 默认传输层对接真实 HTTP 服务（wiremock）。

use std::io::Cursor;

use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::internal::client::structs::WebDavClient;
use crate::internal::error::WebDavError;
use crate::internal::settings::structs::{WebDavOptions, WebDavSettings};
use crate::internal::transfer::structs::TransferOptions;
use crate::internal::transport::structs::ReqwestTransport;
use crate::internal::webdav::enums::Depth;
use crate::tests::{
    dir_props, file_props, multistatus_xml, payload, response_xml, RecordingSink, OK,
};

fn options(server: &MockServer) -> WebDavOptions {
    WebDavOptions::new(server.uri())
        .login("alice")
        .password("secret")
        .disable_check(true)
}

#[tokio::test]
async fn propfind_sends_basic_auth_and_depth() {
    let server = MockServer::start().await;
    let xml = multistatus_xml(&[
        response_xml("/docs/", &[(OK, dir_props().as_str())]),
        response_xml("/docs/a.txt", &[(OK, file_props(3).as_str())]),
    ]);
    Mock::given(method("PROPFIND"))
        .and(path("/docs/"))
        .and(header("depth", "1"))
        .and(header("authorization", "Basic YWxpY2U6c2VjcmV0"))
        .respond_with(ResponseTemplate::new(207).set_body_string(xml))
        .expect(1)
        .mount(&server)
        .await;

    let client = WebDavClient::new(options(&server)).unwrap();
    let entries = client.list("/docs", Depth::One).await.unwrap();

    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].path.as_str(), "/docs/a.txt");
    assert_eq!(entries[0].size, Some(3));
}

#[tokio::test]
async fn token_takes_precedence_over_login() {
    let server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .and(header("authorization", "Bearer abc123"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let options = options(&server).token("abc123").disable_check(false);
    let client = WebDavClient::new(options).unwrap();
    client.verify().await.unwrap();
}

#[tokio::test]
async fn streamed_upload_reaches_server_intact() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/up/data.bin"))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let client = WebDavClient::new(options(&server).chunk_size(1024)).unwrap();
    let data = payload(10_000);
    let sent = client
        .upload_from(Cursor::new(data.clone()), "/up/data.bin", Some(10_000), TransferOptions::new())
        .await
        .unwrap();
    assert_eq!(sent, 10_000);

    let received = server.received_requests().await.unwrap();
    assert_eq!(received[0].body, data);
}

#[tokio::test]
async fn ranged_download_from_server() {
    let server = MockServer::start().await;
    let data = payload(4_000);
    Mock::given(method("GET"))
        .and(path("/a.bin"))
        .and(header("range", "bytes=1000-"))
        .respond_with(ResponseTemplate::new(206).set_body_bytes(data[1_000..].to_vec()))
        .expect(1)
        .mount(&server)
        .await;

    let client = WebDavClient::new(options(&server).chunk_size(512)).unwrap();
    let mut sink = RecordingSink::new();
    let done = client
        .download_to("/a.bin", &mut sink, TransferOptions::new().resume_from(1_000))
        .await
        .unwrap();

    assert_eq!(done, 4_000);
    assert_eq!(sink.data, &data[1_000..]);
}

#[tokio::test]
async fn server_errors_are_classified() {
    let server = MockServer::start().await;
    Mock::given(method("MKCOL"))
        .respond_with(ResponseTemplate::new(409))
        .mount(&server)
        .await;

    let client = WebDavClient::new(options(&server)).unwrap();
    let err = client.mkdir("/a/b").await.unwrap_err();
    assert!(matches!(err, WebDavError::Conflict { .. }));
}

#[test]
fn debug_hides_credentials() {
    let settings = WebDavSettings::new(
        WebDavOptions::new("https://dav.example.com")
            .login("alice")
            .password("secret-password"),
    )
    .unwrap();
    let transport = ReqwestTransport::new(&settings).unwrap();
    let other = ReqwestTransport::new(&settings).unwrap();

    assert!(!format!("{transport:?}").contains("secret-password"));
    assert!(transport.eq_only_credential(&other));
}
