//! 分块传输：重新分块、限速、取消、续传、上传请求体。

use std::io::{self, Cursor};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::{stream, StreamExt};

use crate::internal::client::structs::WebDavClient;
use crate::internal::error::WebDavError;
use crate::internal::settings::structs::WebDavSettings;
use crate::internal::transfer::functions::download_body;
use crate::internal::transfer::structs::{
    CancelHandle, ChunkReader, ProgressHandle, Throttle, TransferOptions,
    TransferSession,
};
use crate::internal::transfer::traits::TransferSource;
use crate::internal::transport::traits::transport::{
    BodyStream, Transport, TransportError, TransportResponse,
};
use crate::internal::webdav::request::{RequestBody, WebDavRequest};
use crate::internal::urn::structs::RemotePath;
use crate::tests::{
    mock_client, payload, test_options, ManualClock, RecordingSink,
};

fn body_of(chunks: Vec<Bytes>) -> BodyStream {
    Box::pin(stream::iter(chunks.into_iter().map(Ok::<_, TransportError>)))
}

/// 把数据按给定大小切成响应体分块，模拟网络上不规则的到达
fn split(data: &[u8], size: usize) -> Vec<Bytes> {
    data.chunks(size).map(Bytes::copy_from_slice).collect()
}

// ═══════════════════════════ 基础组件 ═══════════════════════════

#[test]
fn throttle_delay_is_floored_at_zero() {
    let throttle = Throttle::new(std::num::NonZeroU64::new(1000));
    assert_eq!(
        throttle.delay_for(1000, Duration::from_millis(300)),
        Duration::from_millis(700)
    );
    assert_eq!(throttle.delay_for(1000, Duration::from_secs(2)), Duration::ZERO);
    assert_eq!(
        Throttle::unlimited().delay_for(1_000_000, Duration::ZERO),
        Duration::ZERO
    );
}

#[tokio::test]
async fn chunk_reader_rechunks_and_skips() {
    let data = payload(10_000);
    let mut reader = ChunkReader::new(body_of(split(&data, 3_333)), 4_096).skip(1_000);

    let mut sizes = Vec::new();
    let mut received = Vec::new();
    while let Some(chunk) = reader.next_chunk().await.unwrap() {
        sizes.push(chunk.len());
        received.extend_from_slice(&chunk);
    }

    assert_eq!(sizes, [4_096, 4_096, 808]);
    assert_eq!(received, &data[1_000..]);
}

#[tokio::test]
async fn async_read_source_fills_whole_chunks() {
    let mut source = Cursor::new(payload(2_500));
    let mut sizes = Vec::new();
    while let Some(chunk) = source.read_chunk(1_000).await.unwrap() {
        sizes.push(chunk.len());
    }
    assert_eq!(sizes, [1_000, 1_000, 500]);
}

#[tokio::test]
async fn download_body_throttles_between_chunks() {
    let clock = ManualClock::new();
    let data = payload(5_000);
    let reader = ChunkReader::new(body_of(split(&data, 5_000)), 1_000);
    let mut session = TransferSession::new(
        RemotePath::normalize("/a.bin"),
        1_000,
        Throttle::new(std::num::NonZeroU64::new(1_000)),
        TransferOptions::new(),
    );
    let mut sink = RecordingSink::new();

    let done = download_body(reader, &mut sink, &mut session, &clock).await.unwrap();

    assert_eq!(done, 5_000);
    assert_eq!(sink.writes, [1_000; 5]);
    assert_eq!(clock.sleeps(), [Duration::from_secs(1); 4]);
    assert!(clock.elapsed() >= Duration::from_secs(4));
}

// ═══════════════════════════ 下载 ═══════════════════════════

#[tokio::test]
async fn download_writes_exact_chunks() {
    let (client, transport, clock) = mock_client(test_options().chunk_size(8192));
    let data = payload(100_000);
    transport.reply_chunks(200, &[("content-length", "100000")], split(&data, 33_333));

    let progress = ProgressHandle::new();
    let mut sink = RecordingSink::new();
    let done = client
        .download_to("/big.bin", &mut sink, TransferOptions::new().progress(progress.clone()))
        .await
        .unwrap();

    assert_eq!(done, 100_000);
    assert_eq!(sink.writes.len(), 13);
    assert!(sink.writes[..12].iter().all(|len| *len == 8192));
    assert_eq!(sink.writes[12], 100_000 - 12 * 8192);
    assert_eq!(sink.data, data);
    assert!(sink.finished);
    assert!(clock.sleeps().is_empty());

    let last = progress.current();
    assert_eq!(last.bytes_done, 100_000);
    assert_eq!(last.total, Some(100_000));
    assert_eq!(transport.request(0).header("range"), None);
}

#[tokio::test]
async fn download_respects_receive_limit() {
    let (client, transport, clock) =
        mock_client(test_options().chunk_size(1000).recv_speed(1000));
    transport.reply(200, payload(5_000));

    let mut sink = RecordingSink::new();
    client
        .download_to("/a.bin", &mut sink, TransferOptions::new())
        .await
        .unwrap();

    assert_eq!(sink.writes.len(), 5);
    assert_eq!(clock.sleeps().len(), 4);
    assert!(clock.elapsed() >= Duration::from_secs(4));
}

#[tokio::test]
async fn cancel_between_chunks_stops_download() {
    let (client, transport, _clock) = mock_client(test_options().chunk_size(1000));
    transport.reply(200, payload(10_000));

    let cancel = CancelHandle::new();
    let mut sink = RecordingSink::cancel_after(3, cancel.clone());
    let err = client
        .download_to("/a.bin", &mut sink, TransferOptions::new().cancel_handle(cancel))
        .await
        .unwrap_err();

    match err {
        WebDavError::TransferCancelled { path, bytes_transferred } => {
            assert_eq!(path, "/a.bin");
            assert_eq!(bytes_transferred, 3_000);
        }
        other => panic!("期望 TransferCancelled，实际为 {other:?}"),
    }
    assert_eq!(sink.writes, [1_000; 3]);
    assert!(!sink.finished);
}

#[tokio::test]
async fn resume_uses_range_header() {
    let (client, transport, _clock) = mock_client(test_options().chunk_size(1000));
    let data = payload(5_000);
    transport.reply_chunks(206, &[("content-length", "3000")], vec![Bytes::copy_from_slice(&data[2_000..])]);

    let mut sink = RecordingSink::new();
    let done = client
        .download_to("/a.bin", &mut sink, TransferOptions::new().resume_from(2_000))
        .await
        .unwrap();

    assert_eq!(done, 5_000);
    assert_eq!(sink.data, &data[2_000..]);
    assert_eq!(transport.request(0).header("range"), Some("bytes=2000-"));
}

#[tokio::test]
async fn resume_skips_prefix_when_range_is_ignored() {
    let (client, transport, _clock) = mock_client(test_options().chunk_size(1000));
    let data = payload(5_000);
    transport.reply(200, data.clone());

    let mut sink = RecordingSink::new();
    let done = client
        .download_to("/a.bin", &mut sink, TransferOptions::new().resume_from(2_000))
        .await
        .unwrap();

    assert_eq!(done, 5_000);
    assert_eq!(sink.data, &data[2_000..]);
}

#[tokio::test]
async fn resume_past_end_is_a_no_op() {
    let (client, transport, _clock) = mock_client(test_options());
    transport.reply(416, "");

    let mut sink = RecordingSink::new();
    let done = client
        .download_to("/a.bin", &mut sink, TransferOptions::new().resume_from(5_000))
        .await
        .unwrap();

    assert_eq!(done, 5_000);
    assert!(sink.writes.is_empty());
}

#[tokio::test]
async fn download_of_missing_file_is_not_found() {
    let (client, transport, _clock) = mock_client(test_options());
    transport.reply(404, "");

    let mut sink = RecordingSink::new();
    let err = client
        .download_to("/missing.bin", &mut sink, TransferOptions::new())
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

// ═══════════════════════════ 上传 ═══════════════════════════

#[tokio::test]
async fn upload_respects_send_limit() {
    let (client, transport, clock) =
        mock_client(test_options().chunk_size(1000).send_speed(1000));
    transport.reply(201, "");

    let data = payload(5_000);
    let sent = client
        .upload_from(Cursor::new(data.clone()), "/up.bin", Some(5_000), TransferOptions::new())
        .await
        .unwrap();

    assert_eq!(sent, 5_000);
    assert_eq!(clock.sleeps(), [Duration::from_secs(1); 4]);
    assert!(clock.elapsed() >= Duration::from_secs(4));

    let request = transport.request(0);
    assert_eq!(request.method.as_str(), "PUT");
    assert!(request.streamed);
    assert_eq!(request.header("content-length"), Some("5000"));
    assert_eq!(request.body.as_ref(), data.as_slice());
}

#[tokio::test]
async fn upload_of_unknown_length_is_chunked() {
    let (client, transport, _clock) = mock_client(test_options().chunk_size(1000));
    transport.reply(204, "");

    let sent = client
        .upload_from(Cursor::new(payload(2_500)), "/up.bin", None, TransferOptions::new())
        .await
        .unwrap();

    assert_eq!(sent, 2_500);
    assert_eq!(transport.request(0).header("content-length"), None);
}

#[tokio::test]
async fn upload_transport_failure_is_not_retried() {
    let (client, transport, _clock) = mock_client(test_options());
    transport.fail("connection reset");

    let err = client
        .upload_from(Cursor::new(payload(100)), "/up.bin", Some(100), TransferOptions::new())
        .await
        .unwrap_err();

    assert!(matches!(err, WebDavError::TransferFailed { .. }));
    assert_eq!(transport.requests().len(), 1);
}

#[tokio::test]
async fn cancelled_upload_reports_cancellation() {
    let (client, transport, _clock) = mock_client(test_options());
    transport.reply(201, "");

    let cancel = CancelHandle::new();
    cancel.cancel();
    let err = client
        .upload_from(
            Cursor::new(payload(100)),
            "/up.bin",
            Some(100),
            TransferOptions::new().cancel_handle(cancel),
        )
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        WebDavError::TransferCancelled { bytes_transferred: 0, .. }
    ));
}

#[tokio::test]
async fn upload_progress_reaches_total() {
    let (client, transport, _clock) = mock_client(test_options().chunk_size(64));
    transport.reply(201, "");

    let progress = ProgressHandle::new();
    client
        .upload_from(
            Cursor::new(payload(1_000)),
            "/up.bin",
            Some(1_000),
            TransferOptions::new().progress(progress.clone()),
        )
        .await
        .unwrap();

    let last = progress.current();
    assert_eq!(last.bytes_done, 1_000);
    assert_eq!(last.total, Some(1_000));
    assert_eq!(last.pct(), 100.0);
}

/// 读完请求体后永远不返回响应
struct SilentTransport;

#[async_trait]
impl Transport for SilentTransport {
    async fn send(
        &self,
        request: WebDavRequest,
    ) -> Result<TransportResponse, TransportError> {
        if let RequestBody::Stream { mut stream, .. } = request.body {
            while let Some(chunk) = stream.next().await {
                chunk?;
            }
        }
        std::future::pending().await
    }
}

#[tokio::test]
async fn upload_waiting_for_response_times_out() {
    let settings = WebDavSettings::new(test_options().timeout_secs(1)).unwrap();
    let client = WebDavClient::with_transport(settings, Arc::new(SilentTransport));

    let result = tokio::time::timeout(
        Duration::from_secs(5),
        client.upload_from(
            Cursor::new(payload(3_000)),
            "/up.bin",
            Some(3_000),
            TransferOptions::new(),
        ),
    )
    .await
    .expect("上传应在单次请求超时后返回");

    match result {
        Err(WebDavError::TransferFailed { path, .. }) => assert_eq!(path, "/up.bin"),
        other => panic!("期望 TransferFailed，实际为 {other:?}"),
    }
}

/// 读到末尾时触发取消的数据源
struct CancelAtEnd {
    data: Cursor<Vec<u8>>,
    cancel: CancelHandle,
}

#[async_trait]
impl TransferSource for CancelAtEnd {
    async fn read_chunk(&mut self, max: usize) -> io::Result<Option<Bytes>> {
        let chunk = self.data.read_chunk(max).await?;
        if chunk.is_none() {
            self.cancel.cancel();
        }
        Ok(chunk)
    }
}

#[tokio::test]
async fn cancel_after_last_chunk_keeps_successful_upload() {
    let (client, transport, _clock) = mock_client(test_options().chunk_size(100));
    transport.reply(201, "");

    let cancel = CancelHandle::new();
    let source = CancelAtEnd {
        data: Cursor::new(payload(250)),
        cancel: cancel.clone(),
    };
    let sent = client
        .upload_from(source, "/up.bin", Some(250), TransferOptions::new().cancel_handle(cancel.clone()))
        .await
        .unwrap();

    assert!(cancel.is_cancelled());
    assert_eq!(sent, 250);
    assert_eq!(transport.request(0).body.len(), 250);
}

#[test]
fn client_is_shareable_across_tasks() {
    fn is_send_sync<T: Send + Sync + Clone>() {}
    is_send_sync::<crate::internal::client::structs::WebDavClient>();
}
