use std::future::Future;
use std::io::ErrorKind;
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::{Error, Result};

/// Largest frame either side may announce (100MB)
pub const MAX_FRAME_LEN: usize = 100 * 1024 * 1024;

/// Write one frame: 4-byte big-endian length prefix, then the payload
pub(crate) async fn write_frame<W>(stream: &mut W, bytes: &[u8]) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    if bytes.len() > MAX_FRAME_LEN {
        return Err(Error::InvalidFrame(format!(
            "Message too large: {} bytes",
            bytes.len()
        )));
    }

    stream.write_u32(bytes.len() as u32).await?;
    stream.write_all(bytes).await?;
    stream.flush().await?;
    Ok(())
}

/// Read one frame written by [`write_frame`]
pub(crate) async fn read_frame<R>(stream: &mut R) -> Result<Vec<u8>>
where
    R: AsyncRead + Unpin,
{
    let len = stream.read_u32().await.map_err(closed_on_eof)? as usize;

    if len > MAX_FRAME_LEN {
        return Err(Error::InvalidFrame(format!(
            "Message too large: {} bytes",
            len
        )));
    }

    let mut buf = vec![0u8; len];
    stream.read_exact(&mut buf).await.map_err(closed_on_eof)?;
    Ok(buf)
}

/// Run `op`, failing with [`Error::Timeout`] once `limit` elapses
pub(crate) async fn with_timeout<T, F>(
    limit: Option<Duration>,
    what: &'static str,
    op: F,
) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match limit {
        Some(limit) => tokio::time::timeout(limit, op)
            .await
            .map_err(|_| Error::Timeout(what))?,
        None => op.await,
    }
}

fn closed_on_eof(e: std::io::Error) -> Error {
    if e.kind() == ErrorKind::UnexpectedEof {
        Error::ConnectionClosed
    } else {
        e.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn frames_keep_their_boundaries() {
        let (mut client, mut server) = tokio::io::duplex(1024);

        write_frame(&mut client, b"first").await.unwrap();
        write_frame(&mut client, b"").await.unwrap();
        write_frame(&mut client, b"third").await.unwrap();

        assert_eq!(read_frame(&mut server).await.unwrap(), b"first");
        assert_eq!(read_frame(&mut server).await.unwrap(), b"");
        assert_eq!(read_frame(&mut server).await.unwrap(), b"third");
    }

    #[tokio::test]
    async fn truncated_frame_reports_closed_connection() {
        let (mut client, mut server) = tokio::io::duplex(1024);
        client.write_u32(10).await.unwrap();
        client.write_all(b"abc").await.unwrap();
        drop(client);

        assert!(matches!(
            read_frame(&mut server).await,
            Err(Error::ConnectionClosed)
        ));
    }

    #[tokio::test]
    async fn timeout_names_the_operation() {
        let (_client, mut server) = tokio::io::duplex(64);
        let result = with_timeout(
            Some(Duration::from_millis(20)),
            "Receive",
            read_frame(&mut server),
        )
        .await;

        match result {
            Err(Error::Timeout(what)) => assert_eq!(what, "Receive"),
            other => panic!("expected timeout, got {:?}", other),
        }
    }
}
