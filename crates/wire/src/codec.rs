// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Line framing and the Windows-1250 code page.

use encoding_rs::WINDOWS_1250;
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

/// Errors from framing and parsing PLCComS lines
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("connection closed by peer")]
    ConnectionClosed,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("frame contains a line break: {0:?}")]
    EmbeddedNewline(String),

    #[error("frame has characters outside Windows-1250: {0:?}")]
    Unencodable(String),

    #[error("malformed {kind} frame: {line:?}")]
    Malformed { kind: &'static str, line: String },
}

/// Encode a frame for the wire: Windows-1250 bytes plus the `\n` terminator.
///
/// Fails with [`ProtocolError::Unencodable`] when `text` has characters
/// outside the code page.
pub fn encode_line(text: &str) -> Result<Vec<u8>, ProtocolError> {
    let (bytes, _, had_errors) = WINDOWS_1250.encode(text);
    if had_errors {
        return Err(ProtocolError::Unencodable(text.to_string()));
    }
    let mut out = Vec::with_capacity(bytes.len() + 1);
    out.extend_from_slice(&bytes);
    out.push(b'\n');
    Ok(out)
}

/// Decode one raw frame into text.
///
/// Decoding is lossy: undecodable bytes become U+FFFD so the rest of the
/// line is still usable. Surrounding whitespace (including `\r\n`) is trimmed.
pub fn decode_line(raw: &[u8]) -> String {
    let (text, _) = WINDOWS_1250.decode_without_bom_handling(raw);
    text.trim().to_string()
}

/// Read one frame.
///
/// Returns [`ProtocolError::ConnectionClosed`] when the peer closed the
/// stream before sending any byte of a new frame. A final unterminated frame
/// is returned as-is.
pub async fn read_line<R>(reader: &mut R) -> Result<String, ProtocolError>
where
    R: AsyncBufRead + Unpin,
{
    let mut raw = Vec::new();
    let n = reader.read_until(b'\n', &mut raw).await?;
    if n == 0 {
        return Err(ProtocolError::ConnectionClosed);
    }
    Ok(decode_line(&raw))
}

/// Write one frame and flush it.
pub async fn write_line<W>(writer: &mut W, text: &str) -> Result<(), ProtocolError>
where
    W: AsyncWrite + Unpin,
{
    if text.contains(['\n', '\r']) {
        return Err(ProtocolError::EmbeddedNewline(text.to_string()));
    }
    let frame = encode_line(text)?;
    writer.write_all(&frame).await?;
    writer.flush().await?;
    Ok(())
}

#[cfg(test)]
#[path = "codec_tests.rs"]
mod tests;
