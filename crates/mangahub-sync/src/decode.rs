use serde::de::DeserializeOwned;
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::error::{Result, SyncError};

const READ_CHUNK: usize = 1024;

/// Read from `reader` until one complete JSON value is buffered and decode it.
///
/// Stops at the first complete value, so anything the peer sends after it is
/// never read. Leading whitespace is skipped; a newline terminator is
/// optional. EOF in the middle of a value is a decode error, EOF before any
/// byte is [`SyncError::Empty`].
pub async fn read_one<T, R>(reader: &mut R, max_bytes: usize) -> Result<T>
where
    T: DeserializeOwned,
    R: AsyncRead + Unpin,
{
    let mut buf: Vec<u8> = Vec::with_capacity(READ_CHUNK);
    let mut chunk = [0u8; READ_CHUNK];

    loop {
        let n = reader.read(&mut chunk).await?;
        if n == 0 {
            if buf.iter().all(u8::is_ascii_whitespace) {
                return Err(SyncError::Empty);
            }
            return Ok(serde_json::from_slice(&buf)?);
        }

        buf.extend_from_slice(&chunk[..n]);

        // Only the first value counts against the cap; trailing bytes do not.
        let mut values = serde_json::Deserializer::from_slice(&buf).into_iter::<T>();
        match values.next() {
            Some(Ok(value)) if values.byte_offset() <= max_bytes => return Ok(value),
            Some(Ok(_)) => return Err(SyncError::FrameTooLarge { max: max_bytes }),
            Some(Err(e)) if !e.is_eof() => return Err(SyncError::Decode(e)),
            _ if buf.len() > max_bytes => return Err(SyncError::FrameTooLarge { max: max_bytes }),
            _ => continue,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mangahub_core::types::ProgressUpdate;

    #[tokio::test]
    async fn decodes_value_without_trailing_newline() {
        let mut input: &[u8] = br#"{"username":"bob","manga_id":"1","chapter":"5"}"#;
        let up: ProgressUpdate = read_one(&mut input, 1024).await.unwrap();
        assert_eq!(up.username, "bob");
        assert_eq!(up.chapter, "5");
    }

    #[tokio::test]
    async fn stops_after_first_value() {
        let mut input: &[u8] =
            b"{\"username\":\"a\",\"chapter\":\"1\"}\n{\"username\":\"b\",\"chapter\":\"2\"}\n";
        let up: ProgressUpdate = read_one(&mut input, 1024).await.unwrap();
        assert_eq!(up.username, "a");
    }

    #[tokio::test]
    async fn trailing_bytes_past_cap_do_not_reject_first_value() {
        let mut frame = br#"{"username":"bob","manga_id":"1","chapter":"5"}"#.to_vec();
        assert_eq!(frame.len(), 47);
        frame.extend_from_slice(&[b' '; 100]);
        let mut input: &[u8] = &frame;
        let up: ProgressUpdate = read_one(&mut input, 64).await.unwrap();
        assert_eq!(up.username, "bob");
    }

    #[tokio::test]
    async fn complete_value_over_cap_rejected() {
        let big = format!(r#"{{"username":"{}"}}"#, "x".repeat(100));
        let mut input: &[u8] = big.as_bytes();
        let err = read_one::<ProgressUpdate, _>(&mut input, 64).await.unwrap_err();
        assert!(matches!(err, SyncError::FrameTooLarge { max: 64 }));
    }

    #[tokio::test]
    async fn value_split_across_reads() {
        let (mut tx, mut rx) = tokio::io::duplex(8);
        let writer = tokio::spawn(async move {
            use tokio::io::AsyncWriteExt;
            tx.write_all(br#"  {"username":"slow","manga_id":"42","chapter":"9"}"#)
                .await
                .unwrap();
        });
        let up: ProgressUpdate = read_one(&mut rx, 1024).await.unwrap();
        writer.await.unwrap();
        assert_eq!(up.manga_id, "42");
    }

    #[tokio::test]
    async fn garbage_is_decode_error() {
        let mut input: &[u8] = b"hello there";
        let err = read_one::<ProgressUpdate, _>(&mut input, 1024).await.unwrap_err();
        assert!(matches!(err, SyncError::Decode(_)));
    }

    #[tokio::test]
    async fn truncated_value_is_decode_error() {
        let mut input: &[u8] = br#"{"username":"bo"#;
        let err = read_one::<ProgressUpdate, _>(&mut input, 1024).await.unwrap_err();
        assert!(matches!(err, SyncError::Decode(_)));
    }

    #[tokio::test]
    async fn empty_connection() {
        let mut input: &[u8] = b"  \n";
        let err = read_one::<ProgressUpdate, _>(&mut input, 1024).await.unwrap_err();
        assert!(matches!(err, SyncError::Empty));
    }

    #[tokio::test]
    async fn oversized_frame_rejected() {
        let big = format!(r#"{{"username":"{}"}}"#, "x".repeat(4096));
        let mut input: &[u8] = big.as_bytes();
        let err = read_one::<ProgressUpdate, _>(&mut input, 512).await.unwrap_err();
        assert!(matches!(err, SyncError::FrameTooLarge { max: 512 }));
    }
}
