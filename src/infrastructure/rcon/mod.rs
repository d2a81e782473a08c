//! Source RCON client
//!
//! Packet layout, all integers little-endian:
//!
//! ```text
//! i32 size | i32 id | i32 type | body bytes | 0x00 0x00
//! ```
//!
//! `size` counts everything after itself.
//!
//! Long command output arrives split over several RESPONSE_VALUE packets.
//! Every command is followed by an empty RESPONSE_VALUE with its own id; the
//! server answers that one only after the command output, so the first packet
//! carrying the marker id ends the response.

use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::Instrument;

use crate::application::errors::BackendError;
use crate::domain::traits::{RconConnection, RconConnector};

const SERVERDATA_AUTH: i32 = 3;
const SERVERDATA_AUTH_RESPONSE: i32 = 2;
const SERVERDATA_EXECCOMMAND: i32 = 2;
const SERVERDATA_RESPONSE_VALUE: i32 = 0;

/// id + type + two terminating nulls
const HEADER_LEN: usize = 10;
const MAX_BODY_LEN: usize = 4096;

/// Auth packets drained before giving up on an AUTH_RESPONSE
const MAX_AUTH_PACKETS: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq)]
struct Packet {
    id: i32,
    kind: i32,
    body: String,
}

impl Packet {
    fn new(id: i32, kind: i32, body: impl Into<String>) -> Self {
        Self {
            id,
            kind,
            body: body.into(),
        }
    }

    fn encode(&self) -> Result<Vec<u8>, BackendError> {
        let body = self.body.as_bytes();
        if body.contains(&0) {
            return Err(BackendError::Protocol("body contains a NUL byte".to_string()));
        }
        if body.len() > MAX_BODY_LEN {
            return Err(BackendError::Protocol(format!(
                "body of {} bytes exceeds {}",
                body.len(),
                MAX_BODY_LEN
            )));
        }

        let size = (HEADER_LEN + body.len()) as i32;
        let mut buf = Vec::with_capacity(4 + HEADER_LEN + body.len());
        buf.extend_from_slice(&size.to_le_bytes());
        buf.extend_from_slice(&self.id.to_le_bytes());
        buf.extend_from_slice(&self.kind.to_le_bytes());
        buf.extend_from_slice(body);
        buf.extend_from_slice(&[0, 0]);
        Ok(buf)
    }

    async fn read_from<R: AsyncRead + Unpin>(reader: &mut R) -> Result<Self, BackendError> {
        let size = reader.read_i32_le().await?;
        if size < HEADER_LEN as i32 || size as usize > HEADER_LEN + MAX_BODY_LEN {
            return Err(BackendError::Protocol(format!("invalid packet size {}", size)));
        }

        let mut payload = vec![0u8; size as usize];
        reader.read_exact(&mut payload).await?;

        let id = i32::from_le_bytes([payload[0], payload[1], payload[2], payload[3]]);
        let kind = i32::from_le_bytes([payload[4], payload[5], payload[6], payload[7]]);
        let body = &payload[8..payload.len() - 2];
        let body = String::from_utf8_lossy(body).trim_end_matches('\0').to_string();

        Ok(Self { id, kind, body })
    }

    async fn write_to<W: AsyncWrite + Unpin>(&self, writer: &mut W) -> Result<(), BackendError> {
        writer.write_all(&self.encode()?).await?;
        writer.flush().await?;
        Ok(())
    }
}

/// Opens a TCP connection and authenticates per call
pub struct TcpRconConnector {
    timeout: Duration,
}

impl TcpRconConnector {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Default for TcpRconConnector {
    fn default() -> Self {
        Self::new(Duration::from_secs(10))
    }
}

#[async_trait]
impl RconConnector for TcpRconConnector {
    async fn connect(
        &self,
        address: &str,
        password: &str,
    ) -> Result<Box<dyn RconConnection>, BackendError> {
        let span = tracing::info_span!("connect_minecraft", mc.server.address = %address);
        async {
            let stream = timeout(self.timeout, TcpStream::connect(address)).await??;
            let mut conn = TcpRconConnection {
                stream,
                next_id: 1,
                timeout: self.timeout,
            };
            timeout(self.timeout, conn.authenticate(password)).await??;
            tracing::debug!("RCON session opened to {}", address);
            Ok::<Box<dyn RconConnection>, BackendError>(Box::new(conn))
        }
        .instrument(span)
        .await
    }
}

/// An authenticated RCON session over TCP
pub struct TcpRconConnection {
    stream: TcpStream,
    next_id: i32,
    timeout: Duration,
}

impl TcpRconConnection {
    fn take_id(&mut self) -> i32 {
        let id = self.next_id;
        self.next_id = self.next_id.checked_add(1).unwrap_or(1);
        id
    }

    async fn authenticate(&mut self, password: &str) -> Result<(), BackendError> {
        let id = self.take_id();
        Packet::new(id, SERVERDATA_AUTH, password)
            .write_to(&mut self.stream)
            .await?;

        // Some servers send an empty RESPONSE_VALUE ahead of the auth response
        for _ in 0..MAX_AUTH_PACKETS {
            let packet = Packet::read_from(&mut self.stream).await?;
            match packet.kind {
                SERVERDATA_AUTH_RESPONSE if packet.id == -1 => return Err(BackendError::AuthFailed),
                SERVERDATA_AUTH_RESPONSE if packet.id == id => return Ok(()),
                SERVERDATA_AUTH_RESPONSE => {
                    return Err(BackendError::Protocol(format!(
                        "auth response for unknown id {}",
                        packet.id
                    )))
                }
                _ => continue,
            }
        }

        Err(BackendError::Protocol("no auth response".to_string()))
    }

    async fn exec(&mut self, command: &str) -> Result<String, BackendError> {
        let id = self.take_id();
        let marker = self.take_id();
        Packet::new(id, SERVERDATA_EXECCOMMAND, command)
            .write_to(&mut self.stream)
            .await?;
        Packet::new(marker, SERVERDATA_RESPONSE_VALUE, "")
            .write_to(&mut self.stream)
            .await?;

        let mut output = String::new();
        loop {
            let packet = Packet::read_from(&mut self.stream).await?;
            if packet.id == marker {
                return Ok(output);
            }
            if packet.id == id && packet.kind == SERVERDATA_RESPONSE_VALUE {
                output.push_str(&packet.body);
                continue;
            }
            tracing::debug!("Skipping RCON packet id={} type={}", packet.id, packet.kind);
        }
    }
}

#[async_trait]
impl RconConnection for TcpRconConnection {
    async fn send_command(&mut self, command: &str) -> Result<String, BackendError> {
        let limit = self.timeout;
        timeout(limit, self.exec(command)).await?
    }
}
