//! Frame pack/unpack for the length-prefixed request/response protocol (§4.1).
//!
//! A request frame is `<action:i32 LE><length:i32 LE><body>`; a response frame is
//! `<status:i32 LE><length:i32 LE><body>`. `length` may be zero. Reads always consume exactly
//! `length` bytes even if the underlying socket hands them back in several chunks.

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::CodecError;

/// Action codes, per §4.1/§6.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum Action {
    Login = 1,
    Logout = 2,
    Move = 3,
    Upgrade = 4,
    Turn = 5,
    Player = 6,
    Games = 7,
    Map = 10,
}

impl Action {
    pub fn code(self) -> i32 {
        self as i32
    }
}

/// Response status codes, per §4.1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Ok,
    BadCommand,
    ResourceNotFound,
    AccessDenied,
    NotReady,
    Timeout,
    InternalServerError,
    Other(i32),
}

impl Status {
    pub fn from_code(code: i32) -> Self {
        match code {
            0 => Self::Ok,
            1 => Self::BadCommand,
            2 => Self::ResourceNotFound,
            3 => Self::AccessDenied,
            4 => Self::NotReady,
            5 => Self::Timeout,
            500 => Self::InternalServerError,
            other => Self::Other(other),
        }
    }

    pub fn is_ok(self) -> bool {
        matches!(self, Self::Ok)
    }

    pub fn code(self) -> i32 {
        match self {
            Self::Ok => 0,
            Self::BadCommand => 1,
            Self::ResourceNotFound => 2,
            Self::AccessDenied => 3,
            Self::NotReady => 4,
            Self::Timeout => 5,
            Self::InternalServerError => 500,
            Self::Other(code) => code,
        }
    }
}

/// Encodes a request frame: action, then length, then body bytes.
pub fn encode_request(action: Action, body: &[u8]) -> Vec<u8> {
    let mut framed = Vec::with_capacity(8 + body.len());
    framed.extend_from_slice(&action.code().to_le_bytes());
    framed.extend_from_slice(&(body.len() as i32).to_le_bytes());
    framed.extend_from_slice(body);
    framed
}

/// Writes a request frame to `stream`.
pub async fn write_request<W: AsyncWrite + Unpin>(
    stream: &mut W,
    action: Action,
    body: &[u8],
) -> Result<(), CodecError> {
    let framed = encode_request(action, body);
    stream.write_all(&framed).await?;
    Ok(())
}

/// Reads one complete response frame from `stream`: the 8-byte header, then exactly `length`
/// body bytes, however many reads that takes.
pub async fn read_response<R: AsyncRead + Unpin>(
    stream: &mut R,
) -> Result<(Status, Vec<u8>), CodecError> {
    let mut header = [0u8; 8];
    stream.read_exact(&mut header).await?;
    let status = i32::from_le_bytes(header[0..4].try_into().unwrap());
    let length = i32::from_le_bytes(header[4..8].try_into().unwrap());
    if length < 0 {
        return Err(CodecError::NegativeLength(length));
    }

    let mut body = vec![0u8; length as usize];
    stream.read_exact(&mut body).await?;

    Ok((Status::from_code(status), body))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn move_request_round_trips() {
        let body = serde_json::to_vec(&serde_json::json!({
            "line_idx": 7,
            "speed": -1,
            "train_idx": 2,
        }))
        .unwrap();
        let framed = encode_request(Action::Move, &body);

        assert_eq!(&framed[0..4], &3i32.to_le_bytes());
        assert_eq!(&framed[4..8], &(body.len() as i32).to_le_bytes());

        let mut cursor = std::io::Cursor::new({
            // Frame a status-0 response around the same body so read_response can decode it.
            let mut bytes = 0i32.to_le_bytes().to_vec();
            bytes.extend_from_slice(&(body.len() as i32).to_le_bytes());
            bytes.extend_from_slice(&body);
            bytes
        });
        let (status, decoded_body) = read_response(&mut cursor).await.unwrap();
        assert!(status.is_ok());
        let decoded: serde_json::Value = serde_json::from_slice(&decoded_body).unwrap();
        assert_eq!(decoded["line_idx"], 7);
        assert_eq!(decoded["speed"], -1);
        assert_eq!(decoded["train_idx"], 2);
    }

    #[tokio::test]
    async fn read_response_waits_for_a_split_body() {
        // Simulate the body arriving across several short reads, which read_exact must
        // transparently absorb.
        struct Trickle {
            chunks: Vec<Vec<u8>>,
        }

        impl AsyncRead for Trickle {
            fn poll_read(
                mut self: std::pin::Pin<&mut Self>,
                _cx: &mut std::task::Context<'_>,
                buf: &mut tokio::io::ReadBuf<'_>,
            ) -> std::task::Poll<std::io::Result<()>> {
                if let Some(chunk) = self.chunks.first().cloned() {
                    let n = chunk.len().min(buf.remaining());
                    buf.put_slice(&chunk[..n]);
                    if n == chunk.len() {
                        self.chunks.remove(0);
                    } else {
                        self.chunks[0] = chunk[n..].to_vec();
                    }
                }
                std::task::Poll::Ready(Ok(()))
            }
        }

        let body = b"{\"ok\":true}".to_vec();
        let mut header = 0i32.to_le_bytes().to_vec();
        header.extend_from_slice(&(body.len() as i32).to_le_bytes());

        let mut trickle = Trickle {
            chunks: header
                .iter()
                .chain(body.iter())
                .map(|&b| vec![b])
                .collect(),
        };

        let (status, decoded_body) = read_response(&mut trickle).await.unwrap();
        assert!(status.is_ok());
        assert_eq!(decoded_body, body);
    }
}
