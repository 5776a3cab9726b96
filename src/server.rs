// MIT License - Copyright (c) 2026 Peter Wright
// TCP connection server for panel and receiver links

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::time::{sleep, timeout, Duration};
use tracing::{debug, error, info, warn};

use crate::config::ServerConfig;
use crate::constants::ACK;
use crate::error::{ReceiverError, Result};
use crate::service::AlarmReceiverService;

/// Accepts panel connections and feeds their lines to the receiver service.
///
/// Each connection runs in its own task: `ACCEPTED → READING →
/// (PROCESSING → READING)* → CLOSED`. Lines on one connection are handled
/// strictly in order, and every line is answered with a single ACK byte
/// once it has been processed.
pub struct AlarmServer {
    listener: TcpListener,
    config: ServerConfig,
    service: Arc<AlarmReceiverService>,
}

impl AlarmServer {
    /// Bind the listening socket.
    pub async fn bind(config: ServerConfig, service: Arc<AlarmReceiverService>) -> Result<Self> {
        let listener = TcpListener::bind(config.bind_addr()).await.map_err(|e| {
            error!("Failed to bind {}: {}", config.bind_addr(), e);
            ReceiverError::Io(e)
        })?;
        info!("Alarm receiver listening on {}", listener.local_addr()?);
        Ok(Self {
            listener,
            config,
            service,
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Accept connections forever.
    pub async fn run(self) -> Result<()> {
        self.run_until(std::future::pending()).await
    }

    /// Accept connections until `shutdown` resolves.
    ///
    /// Open connections are not interrupted; they end on their own through
    /// peer close or idle timeout.
    pub async fn run_until<F>(self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("No longer accepting connections");
                    return Ok(());
                }
                accepted = self.listener.accept() => match accepted {
                    Ok((stream, peer)) => self.spawn_connection(stream, peer),
                    Err(e) => {
                        // e.g. out of file descriptors; keep serving
                        error!("Accept failed: {}", e);
                        sleep(Duration::from_millis(100)).await;
                    }
                },
            }
        }
    }

    fn spawn_connection(&self, stream: TcpStream, peer: SocketAddr) {
        info!("Connection from {}", peer);
        let service = self.service.clone();
        let config = self.config.clone();
        tokio::spawn(async move {
            match handle_connection(stream, peer, &service, &config).await {
                Ok(count) => info!("Connection from {} closed after {} messages", peer, count),
                Err(ReceiverError::IdleTimeout { secs }) => {
                    info!("Connection from {} idle for {}s, closing", peer, secs)
                }
                Err(e) if e.is_storage() => {
                    error!("Connection from {} dropped, alert not stored: {}", peer, e)
                }
                Err(e) => warn!("Connection from {} ended with error: {}", peer, e),
            }
        });
    }
}

/// Read-process-acknowledge loop for one connection.
///
/// Returns the number of lines handled when the peer closes.
async fn handle_connection(
    stream: TcpStream,
    peer: SocketAddr,
    service: &AlarmReceiverService,
    config: &ServerConfig,
) -> Result<usize> {
    let peer_ip = peer.ip();
    let (reader, mut writer) = stream.into_split();
    let mut reader = BufReader::new(reader);
    let mut line = Vec::with_capacity(256);
    let mut count = 0;

    loop {
        line.clear();
        let read = timeout(
            config.idle_timeout,
            read_line_capped(&mut reader, &mut line, config.max_line_len),
        )
        .await;
        let n = match read {
            Ok(result) => result?,
            Err(_) => {
                return Err(ReceiverError::IdleTimeout {
                    secs: config.idle_timeout.as_secs(),
                });
            }
        };
        if n == 0 {
            return Ok(count);
        }

        let message = ascii_lossy(&line);
        let message = message.trim();
        if !message.is_empty() {
            debug!("{} -> {:?}", peer, message);
            service.process(message, None, Some(peer_ip)).await?;
        }
        writer.write_all(&[ACK]).await?;
        count += 1;
    }
}

/// Read up to and including the next `\n`, keeping at most `max_len` bytes.
///
/// Bytes past the cap are consumed and dropped. Returns the number of bytes
/// consumed from the stream (0 at end of stream).
async fn read_line_capped<R>(
    reader: &mut R,
    buf: &mut Vec<u8>,
    max_len: usize,
) -> std::io::Result<usize>
where
    R: AsyncBufRead + Unpin,
{
    let mut consumed = 0;
    loop {
        let available = reader.fill_buf().await?;
        if available.is_empty() {
            return Ok(consumed);
        }
        let (chunk, done) = match available.iter().position(|&b| b == b'\n') {
            Some(i) => (&available[..=i], true),
            None => (available, false),
        };
        let room = max_len.saturating_sub(buf.len());
        buf.extend_from_slice(&chunk[..chunk.len().min(room)]);
        let used = chunk.len();
        reader.consume(used);
        consumed += used;
        if done {
            return Ok(consumed);
        }
    }
}

/// Decode as ASCII, dropping any non-ASCII byte.
fn ascii_lossy(bytes: &[u8]) -> String {
    bytes
        .iter()
        .filter(|b| b.is_ascii())
        .map(|&b| char::from(b))
        .collect()
}
