// src/downloader/transfer.rs

use crate::{client::DiskClient, constants, error::LinkError};
use futures::StreamExt;
use log::{debug, warn};
use std::{io, path::Path, time::Duration};
use tokio::{
    fs::{self, File},
    io::{AsyncRead, AsyncReadExt, AsyncWriteExt},
    time::timeout,
};
use tokio_util::{io::StreamReader, sync::CancellationToken};

/// 以 8 KiB 为单位流式下载 `url` 到 `dest`，返回写入的字节数。
///
/// 每写入一块前检查 `cancel`。取消或传输中途出错时会关闭并删除已写入的
/// 部分文件，磁盘上不会留下不完整的文件。`on_chunk` 在每块写入后收到
/// 累计字节数。
pub async fn download<F>(
    client: &DiskClient,
    url: &str,
    dest: &Path,
    cancel: &CancellationToken,
    mut on_chunk: F,
) -> Result<u64, LinkError>
where
    F: FnMut(u64) + Send,
{
    if cancel.is_cancelled() {
        return Err(LinkError::Cancelled);
    }
    let limit = client.config().download_timeout;

    let res = match timeout(limit, client.stream_get(url).send()).await {
        Ok(res) => res?,
        Err(_) => return Err(LinkError::Timeout),
    };
    let status = res.status();
    if !status.is_success() {
        warn!("下载请求返回 HTTP {}: {}", status, url);
        return Err(LinkError::DownloadStatus(status));
    }
    debug!(
        "开始写入 {:?} (Content-Length: {:?})",
        dest,
        res.content_length()
    );

    let mut file = File::create(dest).await?;
    let stream = res.bytes_stream().map(|chunk| chunk.map_err(io::Error::other));
    let reader = StreamReader::new(stream);
    tokio::pin!(reader);

    let result: Result<u64, LinkError> = async {
        let mut buf = vec![0u8; constants::CHUNK_SIZE];
        let mut written = 0u64;
        loop {
            let n = read_chunk_with_timeout(&mut reader, &mut buf, limit).await?;
            if n == 0 {
                break;
            }
            if cancel.is_cancelled() {
                return Err(LinkError::Cancelled);
            }
            file.write_all(&buf[..n]).await?;
            written += n as u64;
            on_chunk(written);
        }
        file.flush().await?;
        Ok(written)
    }
    .await;

    drop(file);
    if let Err(e) = &result {
        debug!("传输中断 ({}), 删除不完整的文件 {:?}", e, dest);
        remove_partial(dest).await;
    }
    result
}

async fn read_chunk_with_timeout<R>(
    reader: &mut R,
    buf: &mut [u8],
    limit: Duration,
) -> Result<usize, LinkError>
where
    R: AsyncRead + Unpin,
{
    match timeout(limit, read_chunk(reader, buf)).await {
        Ok(Ok(n)) => Ok(n),
        Ok(Err(e)) => Err(classify_read_error(e)),
        Err(_) => Err(LinkError::Timeout),
    }
}

/// 读满一块或读到流结束
async fn read_chunk<R>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize>
where
    R: AsyncRead + Unpin,
{
    let mut filled = 0;
    while filled < buf.len() {
        let n = reader.read(&mut buf[filled..]).await?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    Ok(filled)
}

/// 响应流的错误被包装在 io::Error 里，这里还原出网络错误以便正确分类。
fn classify_read_error(err: io::Error) -> LinkError {
    if !err
        .get_ref()
        .is_some_and(|inner| inner.is::<reqwest::Error>())
    {
        return LinkError::Io(err);
    }
    match err.into_inner().map(|inner| inner.downcast::<reqwest::Error>()) {
        Some(Ok(req_err)) => LinkError::from(*req_err),
        _ => LinkError::Io(io::Error::other("读取响应流失败")),
    }
}

async fn remove_partial(path: &Path) {
    if let Err(e) = fs::remove_file(path).await
        && e.kind() != io::ErrorKind::NotFound
    {
        warn!("无法删除不完整的文件 {:?}: {}", path, e);
    }
}
