//! Integration tests for the download methods.
//!
//! These tests verify the full download flow with mock HTTP servers.

mod support;
use support::blocking;
use support::socket_guard::start_mock_server_or_skip;

use std::io::{Read, Write};
use std::net::TcpListener;
use std::thread;

use tempfile::TempDir;
use webfetch_core::{ClientConfig, DownloadOptions, DownloadProgress, HttpClient, HttpError};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client() -> HttpClient {
    HttpClient::new(ClientConfig::new().with_cookies(false)).unwrap()
}

async fn mount_file(server: &MockServer, path_str: &str, content: Vec<u8>) {
    Mock::given(method("GET"))
        .and(path(path_str))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(content))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_download_below_min_size_fails_and_writes_nothing() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    mount_file(&server, "/small.bin", vec![7; 50]).await;
    let temp_dir = TempDir::new().unwrap();
    let target = temp_dir.path().join("small.bin");

    let url = format!("{}/small.bin", server.uri());
    let dest = target.clone();
    let result = blocking(move || client().download_file(&url, &dest)).await;

    match result {
        Err(HttpError::SizeRange {
            min, max, actual, ..
        }) => {
            assert_eq!(min, 100);
            assert_eq!(max, 50 * 1024 * 1024);
            assert_eq!(actual, Some(50));
        }
        other => panic!("expected size range error, got {other:?}"),
    }
    assert!(!target.exists(), "nothing may be written");
}

#[tokio::test]
async fn test_download_above_max_size_fails() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    mount_file(&server, "/big.bin", vec![1; 300]).await;
    let temp_dir = TempDir::new().unwrap();
    let target = temp_dir.path().join("big.bin");

    let url = format!("{}/big.bin", server.uri());
    let dest = target.clone();
    let result = blocking(move || {
        let config = ClientConfig::new()
            .with_cookies(false)
            .with_download_min_size(0)
            .with_download_max_size(200);
        HttpClient::new(config).unwrap().download_file(&url, &dest)
    })
    .await;

    assert!(
        matches!(result, Err(HttpError::SizeRange { actual: Some(300), .. })),
        "got {result:?}"
    );
    assert!(!target.exists());
}

#[tokio::test]
async fn test_download_within_bounds_writes_exact_length() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    let content: Vec<u8> = (0..10_000_u32).map(|i| (i % 251) as u8).collect();
    mount_file(&server, "/data.bin", content.clone()).await;
    let temp_dir = TempDir::new().unwrap();
    let target = temp_dir.path().join("nested").join("data.bin");

    let url = format!("{}/data.bin", server.uri());
    let dest = target.clone();
    let (result, seen) = blocking(move || {
        let mut seen: Vec<DownloadProgress> = Vec::new();
        let mut observer = |progress: DownloadProgress| seen.push(progress);
        let result = client().download_file_with_progress(&url, &dest, Some(&mut observer));
        (result, seen)
    })
    .await;

    let result = result.unwrap();
    assert_eq!(result.path, target);
    assert_eq!(result.bytes_downloaded, 10_000);
    assert_eq!(result.content_length, 10_000);
    assert_eq!(std::fs::read(&target).unwrap(), content);

    assert!(!seen.is_empty());
    assert!(seen.windows(2).all(|pair| pair[0].written < pair[1].written));
    let last = seen.last().unwrap();
    assert_eq!(last.written, 10_000);
    assert_eq!(last.total, 10_000);
    assert!((last.percent() - 100.0).abs() < f64::EPSILON);
}

#[tokio::test]
async fn test_download_to_existing_path_fails_without_request() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    mount_file(&server, "/report.pdf", vec![0; 500]).await;
    let temp_dir = TempDir::new().unwrap();
    let target = temp_dir.path().join("report.pdf");
    std::fs::write(&target, b"keep me").unwrap();

    let url = format!("{}/report.pdf", server.uri());
    let dest = target.clone();
    let result = blocking(move || client().download_file(&url, &dest)).await;

    assert!(
        matches!(result, Err(HttpError::FileExists { .. })),
        "got {result:?}"
    );
    assert_eq!(std::fs::read(&target).unwrap(), b"keep me");
    let requests = server.received_requests().await.unwrap();
    assert!(requests.is_empty(), "no connection may be opened");
}

#[tokio::test]
async fn test_download_http_error_status() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    Mock::given(method("GET"))
        .and(path("/missing.pdf"))
        .respond_with(ResponseTemplate::new(404).set_body_bytes(vec![b'x'; 500]))
        .mount(&server)
        .await;
    let temp_dir = TempDir::new().unwrap();
    let target = temp_dir.path().join("missing.pdf");

    let url = format!("{}/missing.pdf", server.uri());
    let dest = target.clone();
    let result = blocking(move || client().download_file(&url, &dest)).await;

    assert!(
        matches!(result, Err(HttpError::HttpStatus { status: 404, .. })),
        "got {result:?}"
    );
    assert!(!target.exists());
}

#[tokio::test]
async fn test_download_uses_date_folder_and_url_suffix() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    mount_file(&server, "/papers/paper.pdf", vec![3; 256]).await;
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path().to_path_buf();

    let url = format!("{}/papers/paper.pdf", server.uri());
    let download_root = root.clone();
    let saved = blocking(move || client().download(&url, &download_root))
        .await
        .unwrap();

    let relative = saved.strip_prefix(&root).unwrap();
    let parts: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    assert_eq!(parts.len(), 3, "expected yyyy/MMdd/name, got {relative:?}");
    assert_eq!(parts[0].len(), 4);
    assert_eq!(parts[1].len(), 4);
    assert!(parts[2].ends_with(".pdf"), "got {}", parts[2]);
    assert_ne!(parts[2], "paper.pdf", "generated names ignore the URL name");
    assert_eq!(std::fs::metadata(&saved).unwrap().len(), 256);
}

#[tokio::test]
async fn test_download_by_original_keeps_url_name() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    mount_file(&server, "/files/slides.pptx", vec![9; 128]).await;
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path().to_path_buf();

    let url = format!("{}/files/slides.pptx", server.uri());
    let download_root = root.clone();
    let saved = blocking(move || client().download_by_original(&url, &download_root, false))
        .await
        .unwrap();

    assert_eq!(saved, root.join("slides.pptx"));
}

#[tokio::test]
async fn test_download_with_explicit_name_and_suffix() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    mount_file(&server, "/stream", vec![5; 200]).await;
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path().to_path_buf();

    let url = format!("{}/stream", server.uri());
    let options = DownloadOptions::new(&root)
        .with_name("capture")
        .with_suffix(".dat");
    let saved = blocking(move || client().download_with(&url, &options))
        .await
        .unwrap();

    assert_eq!(saved, root.join("capture.dat"));
}

#[tokio::test]
async fn test_download_without_url_suffix_falls_back_to_tmp() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    mount_file(&server, "/blob", vec![5; 200]).await;
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path().to_path_buf();

    let url = format!("{}/blob", server.uri());
    let download_root = root.clone();
    let saved = blocking(move || client().download_into(&url, &download_root, false))
        .await
        .unwrap();

    assert_eq!(saved.parent(), Some(root.as_path()));
    assert_eq!(saved.extension().and_then(|e| e.to_str()), Some("tmp"));
}

#[test]
fn test_download_truncated_body_is_connection_error() {
    let Ok(listener) = TcpListener::bind("127.0.0.1:0") else {
        return;
    };
    let port = listener.local_addr().unwrap().port();
    let server = thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let mut request = Vec::new();
        let mut chunk = [0_u8; 1024];
        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
            let read = stream.read(&mut chunk).unwrap();
            if read == 0 {
                break;
            }
            request.extend_from_slice(&chunk[..read]);
        }
        stream
            .write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 500\r\nConnection: close\r\n\r\n")
            .unwrap();
        stream.write_all(&[6_u8; 150]).unwrap();
        stream.flush().unwrap();
    });

    let temp_dir = TempDir::new().unwrap();
    let target = temp_dir.path().join("cut.bin");
    let url = format!("http://127.0.0.1:{port}/cut.bin");
    let result = client().download_file(&url, &target);
    server.join().unwrap();

    match result {
        Err(HttpError::Network { url: failed, .. }) => assert_eq!(failed, url),
        other => panic!("expected network error, got {other:?}"),
    }
    assert!(!target.exists(), "partial file must be removed");
}
