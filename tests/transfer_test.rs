// tests/transfer_test.rs

use std::sync::Arc;
use tempfile::tempdir;
use tokio_util::sync::CancellationToken;
use yadisk_dl::{
    client::DiskClient, config::AppConfig, constants::CHUNK_SIZE, downloader::transfer,
    error::LinkError,
};

fn test_client() -> DiskClient {
    DiskClient::new(Arc::new(AppConfig::default())).expect("Failed to create client")
}

#[tokio::test]
async fn test_download_writes_whole_body() {
    let mut server = mockito::Server::new_async().await;
    let body: Vec<u8> = (0..(CHUNK_SIZE * 2 + 123)).map(|i| (i % 251) as u8).collect();
    let file_mock = server
        .mock("GET", "/files/data.bin")
        .with_status(200)
        .with_body(&body)
        .create_async()
        .await;

    let tmp = tempdir().unwrap();
    let dest = tmp.path().join("data.bin");
    let mut reported = Vec::new();
    let written = transfer::download(
        &test_client(),
        &format!("{}/files/data.bin", server.url()),
        &dest,
        &CancellationToken::new(),
        |n| reported.push(n),
    )
    .await
    .unwrap();

    file_mock.assert_async().await;
    assert_eq!(written, body.len() as u64);
    assert_eq!(std::fs::read(&dest).unwrap(), body);
    assert_eq!(
        reported,
        vec![CHUNK_SIZE as u64, (CHUNK_SIZE * 2) as u64, body.len() as u64]
    );
}

#[tokio::test]
async fn test_cancel_mid_transfer_removes_partial_file() {
    let mut server = mockito::Server::new_async().await;
    let body = vec![7u8; CHUNK_SIZE * 10];
    let _file_mock = server
        .mock("GET", "/files/big.iso")
        .with_status(200)
        .with_body(&body)
        .create_async()
        .await;

    let tmp = tempdir().unwrap();
    let dest = tmp.path().join("big.iso");
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();

    let result = transfer::download(
        &test_client(),
        &format!("{}/files/big.iso", server.url()),
        &dest,
        &cancel,
        |written| {
            // 写完第 3 块后请求取消
            if written >= (CHUNK_SIZE * 3) as u64 {
                trigger.cancel();
            }
        },
    )
    .await;

    assert!(matches!(result, Err(LinkError::Cancelled)), "{:?}", result);
    assert!(!dest.exists(), "partial file must be removed");
}

#[tokio::test]
async fn test_error_status_creates_no_file() {
    let mut server = mockito::Server::new_async().await;
    let _file_mock = server
        .mock("GET", "/files/gone.zip")
        .with_status(500)
        .with_body("internal error")
        .create_async()
        .await;

    let tmp = tempdir().unwrap();
    let dest = tmp.path().join("gone.zip");
    let result = transfer::download(
        &test_client(),
        &format!("{}/files/gone.zip", server.url()),
        &dest,
        &CancellationToken::new(),
        |_| {},
    )
    .await;

    match result {
        Err(LinkError::DownloadStatus(status)) => assert_eq!(status.as_u16(), 500),
        other => panic!("unexpected result: {:?}", other),
    }
    assert!(!dest.exists());
}

#[tokio::test]
async fn test_already_cancelled_sends_no_request() {
    let mut server = mockito::Server::new_async().await;
    let file_mock = server
        .mock("GET", "/files/never.txt")
        .with_status(200)
        .with_body("never")
        .expect(0)
        .create_async()
        .await;

    let tmp = tempdir().unwrap();
    let dest = tmp.path().join("never.txt");
    let cancel = CancellationToken::new();
    cancel.cancel();

    let result = transfer::download(
        &test_client(),
        &format!("{}/files/never.txt", server.url()),
        &dest,
        &cancel,
        |_| {},
    )
    .await;

    assert!(matches!(result, Err(LinkError::Cancelled)));
    assert!(!dest.exists());
    file_mock.assert_async().await;
}

#[tokio::test]
async fn test_empty_body_creates_empty_file() {
    let mut server = mockito::Server::new_async().await;
    let _file_mock = server
        .mock("GET", "/files/empty.txt")
        .with_status(200)
        .with_body("")
        .create_async()
        .await;

    let tmp = tempdir().unwrap();
    let dest = tmp.path().join("empty.txt");
    let written = transfer::download(
        &test_client(),
        &format!("{}/files/empty.txt", server.url()),
        &dest,
        &CancellationToken::new(),
        |_| {},
    )
    .await
    .unwrap();

    assert_eq!(written, 0);
    assert_eq!(std::fs::metadata(&dest).unwrap().len(), 0);
}
