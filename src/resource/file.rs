//! Static file capability.

use std::path::Path;

use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncWrite};

use crate::resource::Length;

pub async fn length(path: &Path) -> Length {
    match tokio::fs::metadata(path).await {
        Ok(meta) => Length::Known(meta.len()),
        Err(_) => Length::NotFound,
    }
}

/// Opens the file and reports its length from the open handle, so the
/// length sent in the header is the length of what gets streamed.
pub async fn open(path: &Path) -> std::io::Result<(File, u64)> {
    let file = File::open(path).await?;
    let len = file.metadata().await?.len();
    Ok((file, len))
}

/// Copies at most `len` bytes of `file` to `out`.
pub async fn stream<W>(file: File, len: u64, out: &mut W) -> std::io::Result<u64>
where
    W: AsyncWrite + Unpin,
{
    let mut body = file.take(len);
    tokio::io::copy(&mut body, out).await
}
