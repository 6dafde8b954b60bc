//! 客户端门面：状态码映射、多资源结果、目录递归传输。

use std::sync::Arc;

use tempfile::tempdir;

use crate::internal::client::structs::WebDavClient;
use crate::internal::error::WebDavError;
use crate::internal::settings::structs::WebDavSettings;
use crate::internal::transfer::structs::TransferOptions;
use crate::internal::urn::structs::RemotePath;
use crate::internal::webdav::enums::Depth;
use crate::internal::webdav::structs::{OutcomeStatus, PropertyName};
use crate::tests::{
    dir_props, file_props, mock_client, multistatus_xml, response_xml,
    status_response_xml, test_options, MockTransport, NOT_FOUND, OK,
};

// ═══════════════════════════ 查询 ═══════════════════════════

#[tokio::test]
async fn list_excludes_the_collection_itself() {
    let (client, transport, _clock) = mock_client(test_options());
    transport.reply(
        207,
        multistatus_xml(&[
            response_xml("/docs/", &[(OK, dir_props().as_str())]),
            response_xml("/docs/b.txt", &[(OK, file_props(2).as_str())]),
            response_xml("/docs/a.txt", &[(OK, file_props(1).as_str())]),
        ]),
    );

    let entries = client.list("docs", Depth::One).await.unwrap();
    let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, ["b.txt", "a.txt"]);

    let request = transport.request(0);
    assert_eq!(request.method.as_str(), "PROPFIND");
    assert_eq!(request.url.as_str(), "https://dav.example.com/docs/");
    assert_eq!(request.header("depth"), Some("1"));
}

#[tokio::test]
async fn info_of_resource_without_success_is_not_found() {
    let (client, transport, _clock) = mock_client(test_options());
    transport.reply(
        207,
        multistatus_xml(&[response_xml("/gone.txt", &[(NOT_FOUND, "<d:getetag/>")])]),
    );

    let err = client.info("/gone.txt").await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn info_returns_metadata() {
    let (client, transport, _clock) = mock_client(test_options());
    transport.reply(
        207,
        multistatus_xml(&[response_xml("/a.txt", &[(OK, file_props(7).as_str())])]),
    );

    let info = client.info("a.txt").await.unwrap();
    assert_eq!(info.path, RemotePath::normalize("/a.txt"));
    assert_eq!(info.size, Some(7));
    assert_eq!(transport.request(0).header("depth"), Some("0"));
}

#[tokio::test]
async fn parse_failures_are_not_hidden() {
    let (client, transport, _clock) = mock_client(test_options());
    transport.reply(207, "<d:multistatus xmlns:d=\"DAV:\"><d:response>");

    let err = client.list("/", Depth::One).await.unwrap_err();
    assert!(matches!(err, WebDavError::ParseError { .. }));
}

#[tokio::test]
async fn exists_uses_head_and_falls_back_to_propfind() {
    let (client, transport, _clock) = mock_client(test_options());
    transport.reply(200, "");
    transport.reply(404, "");
    transport.reply(405, "");
    transport.reply(
        207,
        multistatus_xml(&[response_xml("/x", &[(OK, dir_props().as_str())])]),
    );

    assert!(client.exists("/a.txt").await.unwrap());
    assert!(!client.exists("/b.txt").await.unwrap());
    assert!(client.exists("/x").await.unwrap());

    let methods: Vec<String> = transport
        .requests()
        .iter()
        .map(|r| r.method.to_string())
        .collect();
    assert_eq!(methods, ["HEAD", "HEAD", "HEAD", "PROPFIND"]);
}

#[tokio::test]
async fn check_skips_request_when_disabled() {
    let (client, transport, _clock) = mock_client(test_options());
    assert!(client.check("/anything").await.unwrap());
    assert!(transport.requests().is_empty());
}

#[tokio::test]
async fn connect_probes_root_unless_disabled() {
    let transport = Arc::new(MockTransport::new());
    transport.reply(404, "");
    let settings = WebDavSettings::new(test_options().disable_check(false)).unwrap();
    let err = WebDavClient::connect(settings, transport.clone()).await.unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(transport.request(0).method.as_str(), "HEAD");

    let transport = Arc::new(MockTransport::new());
    let settings = WebDavSettings::new(test_options()).unwrap();
    WebDavClient::connect(settings, transport.clone()).await.unwrap();
    assert!(transport.requests().is_empty());
}

#[tokio::test]
async fn unauthorized_status_is_mapped() {
    let (client, transport, _clock) = mock_client(test_options());
    transport.reply(401, "");

    let err = client.info("/secret").await.unwrap_err();
    assert!(matches!(err, WebDavError::Unauthorized { .. }));
}

#[tokio::test]
async fn transport_errors_carry_operation_and_path() {
    let (client, transport, _clock) = mock_client(test_options());
    transport.fail("connection refused");

    match client.delete("/a.txt").await.unwrap_err() {
        WebDavError::Transport { operation, path, .. } => {
            assert_eq!(operation, "delete");
            assert_eq!(path, "/a.txt");
        }
        other => panic!("期望 Transport，实际为 {other:?}"),
    }
}

// ═══════════════════════════ 集合操作 ═══════════════════════════

#[tokio::test]
async fn mkdir_maps_statuses() {
    let (client, transport, _clock) = mock_client(test_options());
    transport.reply(201, "");
    transport.reply(409, "");
    transport.reply(405, "");

    client.mkdir("/new").await.unwrap();
    assert!(matches!(
        client.mkdir("/missing/parent").await.unwrap_err(),
        WebDavError::Conflict { .. }
    ));
    assert!(matches!(
        client.mkdir("/new").await.unwrap_err(),
        WebDavError::RemoteResourceError { .. }
    ));
    assert_eq!(transport.request(0).url.as_str(), "https://dav.example.com/new/");
}

#[tokio::test]
async fn mkdir_all_tolerates_existing_levels() {
    let (client, transport, _clock) = mock_client(test_options());
    transport.reply(405, "");
    transport.reply(201, "");
    transport.reply(201, "");

    client.mkdir_all("/a/b/c").await.unwrap();

    let urls: Vec<String> = transport
        .requests()
        .iter()
        .map(|r| r.url.path().to_string())
        .collect();
    assert_eq!(urls, ["/a/", "/a/b/", "/a/b/c/"]);
}

#[tokio::test]
async fn copy_without_overwrite_onto_existing_target_fails() {
    let (client, transport, _clock) = mock_client(test_options());
    transport.reply(412, "");

    let err = client.copy("/a.txt", "/b.txt", false).await.unwrap_err();
    assert!(matches!(err, WebDavError::RemoteResourceError { .. }));

    let request = transport.request(0);
    assert_eq!(request.method.as_str(), "COPY");
    assert_eq!(request.header("overwrite"), Some("F"));
    assert_eq!(request.header("destination"), Some("https://dav.example.com/b.txt"));
}

#[tokio::test]
async fn copy_and_move_success() {
    let (client, transport, _clock) = mock_client(test_options());
    transport.reply(201, "");
    transport.reply(204, "");

    let outcome = client.copy("/a.txt", "/b.txt", true).await.unwrap();
    assert!(outcome.is_success());
    assert_eq!(outcome.target, RemotePath::normalize("/b.txt"));

    let outcome = client.move_to("/b.txt", "/c.txt", true).await.unwrap();
    assert!(outcome.is_success());
    assert_eq!(transport.request(1).method.as_str(), "MOVE");
}

#[tokio::test]
async fn move_of_missing_source_is_not_found() {
    let (client, transport, _clock) = mock_client(test_options());
    transport.reply(404, "");

    let err = client.move_to("/nope", "/dest", true).await.unwrap_err();
    match err {
        WebDavError::NotFound { path } => assert_eq!(path, "/nope"),
        other => panic!("期望 NotFound，实际为 {other:?}"),
    }
}

#[tokio::test]
async fn delete_with_locked_child_partially_succeeds() {
    let (client, transport, _clock) = mock_client(test_options());
    transport.reply(
        207,
        multistatus_xml(&[status_response_xml("/dir/locked.txt", "HTTP/1.1 423 Locked")]),
    );

    let outcome = client.delete("/dir").await.unwrap();
    assert_eq!(outcome.status, OutcomeStatus::PartiallySucceeded);

    let failures: Vec<&str> = outcome.failures().map(|(p, _)| p.as_str()).collect();
    assert_eq!(failures, ["/dir/locked.txt"]);
}

#[tokio::test]
async fn delete_maps_whole_request_statuses() {
    let (client, transport, _clock) = mock_client(test_options());
    transport.reply(204, "");
    transport.reply(423, "");
    transport.reply(500, "");

    assert!(client.delete("/a").await.unwrap().is_success());
    assert!(matches!(
        client.delete("/b").await.unwrap_err(),
        WebDavError::Locked { .. }
    ));
    assert!(matches!(
        client.delete("/c").await.unwrap_err(),
        WebDavError::ServerError { .. }
    ));
}

// ═══════════════════════════ 属性 ═══════════════════════════

#[tokio::test]
async fn get_and_set_property() {
    let (client, transport, _clock) = mock_client(test_options());
    let name = PropertyName::new("urn:example", "note");
    transport.reply(
        207,
        multistatus_xml(&[response_xml(
            "/a.txt",
            &[(OK, "<x:note xmlns:x=\"urn:example\">hello</x:note>")],
        )]),
    );
    transport.reply(
        207,
        multistatus_xml(&[response_xml("/a.txt", &[(OK, "<x:note xmlns:x=\"urn:example\"/>")])]),
    );
    transport.reply(
        207,
        multistatus_xml(&[response_xml(
            "/a.txt",
            &[("HTTP/1.1 403 Forbidden", "<x:note xmlns:x=\"urn:example\"/>")],
        )]),
    );

    let value = client.get_property("/a.txt", &name).await.unwrap();
    assert_eq!(value.as_deref(), Some("hello"));

    client.set_property("/a.txt", &name, "world").await.unwrap();
    assert!(transport.request(1).body_text().contains(">world<"));

    let err = client.set_property("/a.txt", &name, "nope").await.unwrap_err();
    assert!(matches!(err, WebDavError::RemoteResourceError { .. }));
}

#[tokio::test]
async fn free_reads_quota() {
    let (client, transport, _clock) = mock_client(test_options());
    transport.reply(
        207,
        multistatus_xml(&[response_xml(
            "/",
            &[(
                OK,
                "<d:quota-available-bytes>1048576</d:quota-available-bytes><d:quota-used-bytes>10</d:quota-used-bytes>",
            )],
        )]),
    );

    assert_eq!(client.free().await.unwrap(), Some(1_048_576));
    assert!(transport.request(0).body_text().contains("quota-available-bytes"));
}

// ═══════════════════════════ 本地文件与目录 ═══════════════════════════

#[tokio::test]
async fn download_collection_recurses_per_file() {
    let (client, transport, _clock) = mock_client(test_options());
    transport.reply(
        207,
        multistatus_xml(&[response_xml("/docs/", &[(OK, dir_props().as_str())])]),
    );
    transport.reply(
        207,
        multistatus_xml(&[
            response_xml("/docs/", &[(OK, dir_props().as_str())]),
            response_xml("/docs/a.txt", &[(OK, file_props(5).as_str())]),
            response_xml("/docs/sub/", &[(OK, dir_props().as_str())]),
        ]),
    );
    transport.reply(200, "hello");
    transport.reply(
        207,
        multistatus_xml(&[
            response_xml("/docs/sub/", &[(OK, dir_props().as_str())]),
            response_xml("/docs/sub/b.txt", &[(OK, file_props(5).as_str())]),
        ]),
    );
    transport.reply(200, "world");

    let dir = tempdir().unwrap();
    let target = dir.path().join("docs");
    let total = client
        .download("/docs", &target, TransferOptions::new())
        .await
        .unwrap();

    assert_eq!(total, 10);
    assert_eq!(std::fs::read_to_string(target.join("a.txt")).unwrap(), "hello");
    assert_eq!(
        std::fs::read_to_string(target.join("sub").join("b.txt")).unwrap(),
        "world"
    );
}

#[tokio::test]
async fn download_single_file_to_disk() {
    let (client, transport, _clock) = mock_client(test_options());
    transport.reply(
        207,
        multistatus_xml(&[response_xml("/a.txt", &[(OK, file_props(3).as_str())])]),
    );
    transport.reply(200, "abc");

    let dir = tempdir().unwrap();
    let local = dir.path().join("a.txt");
    let total = client
        .download("/a.txt", &local, TransferOptions::new())
        .await
        .unwrap();

    assert_eq!(total, 3);
    assert_eq!(std::fs::read(&local).unwrap(), b"abc");
}

#[tokio::test]
async fn upload_directory_creates_collections() {
    let (client, transport, _clock) = mock_client(test_options());
    for _ in 0..4 {
        transport.reply(201, "");
    }

    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join("x.txt"), b"12345").unwrap();
    std::fs::create_dir(dir.path().join("y")).unwrap();
    std::fs::write(dir.path().join("y").join("z.txt"), b"678").unwrap();

    let total = client
        .upload(dir.path(), "/up", TransferOptions::new())
        .await
        .unwrap();
    assert_eq!(total, 8);

    let mut calls: Vec<(String, String)> = transport
        .requests()
        .iter()
        .map(|r| (r.method.to_string(), r.url.path().to_string()))
        .collect();
    calls.sort();
    assert_eq!(
        calls,
        [
            ("MKCOL".to_string(), "/up/".to_string()),
            ("MKCOL".to_string(), "/up/y/".to_string()),
            ("PUT".to_string(), "/up/x.txt".to_string()),
            ("PUT".to_string(), "/up/y/z.txt".to_string()),
        ]
    );
}

#[tokio::test]
async fn upload_directory_keeps_percent_in_file_names() {
    let (client, transport, _clock) = mock_client(test_options());
    transport.reply(201, "").reply(201, "");

    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join("50%20off.txt"), b"sale").unwrap();

    let total = client
        .upload(dir.path(), "/up", TransferOptions::new())
        .await
        .unwrap();
    assert_eq!(total, 4);

    let put = transport.request(1);
    assert_eq!(put.method.as_str(), "PUT");
    assert_eq!(put.url.path(), "/up/50%2520off.txt");
}

#[tokio::test]
async fn resumed_file_download_returns_end_offset() {
    let (client, transport, _clock) = mock_client(test_options());
    transport.reply(
        207,
        multistatus_xml(&[response_xml("/a.txt", &[(OK, file_props(5).as_str())])]),
    );
    transport.reply_chunks(206, &[("content-length", "2")], vec!["de".into()]);

    let dir = tempdir().unwrap();
    let local = dir.path().join("a.txt");
    std::fs::write(&local, b"abc").unwrap();

    let end = client
        .download("/a.txt", &local, TransferOptions::new().resume_from(3))
        .await
        .unwrap();

    assert_eq!(end, 5);
    assert_eq!(std::fs::read(&local).unwrap(), b"abcde");
    assert_eq!(transport.request(1).header("range"), Some("bytes=3-"));
}
