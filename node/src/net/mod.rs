//! The wire: newline-delimited JSON framing, outbound RPC with timeouts,
//! and the inbound listener/dispatch loop.

pub mod client;
pub mod listener;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt};

use crate::errors::NodeError;

/// Reads one `\n`-terminated JSON frame and deserializes it as `T`. Returns
/// `Ok(None)` if the peer closed the connection before sending a frame (EOF
/// on an empty read), which callers treat as a clean disconnect rather than
/// a protocol error.
pub async fn read_frame<R, T>(reader: &mut R) -> Result<Option<T>, NodeError>
where
    R: AsyncBufReadExt + Unpin,
    T: serde::de::DeserializeOwned,
{
    let mut line = String::new();
    let bytes_read = reader.read_line(&mut line).await?;
    if bytes_read == 0 {
        return Ok(None);
    }
    let trimmed = line.trim_end_matches('\n');
    let value = serde_json::from_str(trimmed)?;
    Ok(Some(value))
}

/// Serializes `value` as one JSON frame terminated by `0x0A` and writes it,
/// flushing so the peer sees it immediately.
pub async fn write_frame<W, T>(writer: &mut W, value: &T) -> Result<(), NodeError>
where
    W: tokio::io::AsyncWrite + Unpin,
    T: serde::Serialize,
{
    let mut payload = serde_json::to_vec(value)?;
    payload.push(b'\n');
    writer.write_all(&payload).await?;
    writer.flush().await?;
    Ok(())
}

/// Reads one frame and decodes it as a [`types::Message`], distinguishing
/// "unknown `type`" from "known type, malformed body": a raw JSON value is
/// read first so the `type` tag can be checked against
/// [`types::Message::known_types`] before the full typed decode, which
/// would otherwise report both cases as the same serde error.
pub async fn read_message<R>(reader: &mut R) -> Result<Option<types::Message>, NodeError>
where
    R: AsyncBufReadExt + Unpin,
{
    let raw: Option<serde_json::Value> = read_frame(reader).await?;
    let Some(raw) = raw else {
        return Ok(None);
    };
    let type_name = raw.get("type").and_then(serde_json::Value::as_str);
    match type_name {
        Some(name) if types::Message::known_types().contains(&name) => {
            let msg = serde_json::from_value(raw)?;
            Ok(Some(msg))
        }
        _ => Err(NodeError::UnknownMessageType),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::BufReader;
    use types::{Message, Response};

    #[tokio::test]
    async fn round_trips_a_message_through_one_frame() {
        let msg = Message::Lookup {
            key: "apple".into(),
        };
        let mut buf = Vec::new();
        write_frame(&mut buf, &msg).await.unwrap();
        assert_eq!(buf.last(), Some(&b'\n'));

        let mut reader = BufReader::new(buf.as_slice());
        let decoded: Message = read_frame(&mut reader).await.unwrap().unwrap();
        match decoded {
            Message::Lookup { key } => assert_eq!(key, "apple"),
            _ => panic!("expected Lookup"),
        }
    }

    #[tokio::test]
    async fn read_frame_reports_clean_eof_as_none() {
        let mut reader = BufReader::new(&b""[..]);
        let decoded: Option<Response> = read_frame(&mut reader).await.unwrap();
        assert!(decoded.is_none());
    }

    #[tokio::test]
    async fn malformed_json_surfaces_as_protocol_error() {
        let mut reader = BufReader::new(&b"not json\n"[..]);
        let decoded: Result<Option<Message>, NodeError> = read_frame(&mut reader).await;
        assert!(matches!(decoded, Err(NodeError::Protocol(_))));
    }

    #[tokio::test]
    async fn read_message_rejects_an_unknown_type_distinctly() {
        let mut reader = BufReader::new(&br#"{"type":"PING"}"#[..]);
        let decoded = read_message(&mut reader).await;
        assert!(matches!(decoded, Err(NodeError::UnknownMessageType)));
    }

    #[tokio::test]
    async fn read_message_decodes_a_known_type() {
        let mut reader = BufReader::new(&br#"{"type":"LOOKUP","key":"apple"}"#[..]);
        let decoded = read_message(&mut reader).await.unwrap().unwrap();
        match decoded {
            Message::Lookup { key } => assert_eq!(key, "apple"),
            _ => panic!("expected Lookup"),
        }
    }
}
