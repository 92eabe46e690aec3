use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;

use crate::game::messages::{ClientMessage, ServerMessage};

#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("connection closed by peer")]
    Closed,
}

/// Newline-delimited JSON framing over TCP: one message per line in each
/// direction. Deliberately thin; any transport with the same per-connection
/// ordering could stand in for it.
pub struct Connection {
    reader: Lines<BufReader<OwnedReadHalf>>,
    writer: OwnedWriteHalf,
}

impl Connection {
    pub fn new(stream: TcpStream) -> Self {
        let (read_half, write_half) = stream.into_split();
        Self {
            reader: BufReader::new(read_half).lines(),
            writer: write_half,
        }
    }

    /// Blank lines are ignored; a malformed frame is a broken client and
    /// errors the connection out.
    pub async fn read_message(&mut self) -> Result<ClientMessage, anyhow::Error> {
        loop {
            let Some(line) = self.reader.next_line().await? else {
                return Err(ConnectionError::Closed.into());
            };
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            return Ok(serde_json::from_str(line)?);
        }
    }

    pub async fn write_message(&mut self, message: &ServerMessage) -> Result<(), anyhow::Error> {
        let mut json = serde_json::to_string(message)?;
        json.push('\n');
        self.writer.write_all(json.as_bytes()).await?;
        Ok(())
    }

    pub async fn shutdown(&mut self) {
        self.writer.shutdown().await.ok();
    }
}
