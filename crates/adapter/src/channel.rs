//! TCP line channel to the multiplayer server
//!
//! Owns one client connection: encoded [`Command`]s go out, parsed
//! [`ServerMessage`]s come back to the session loop as [`LoopEvent`]s.

use std::net::SocketAddr;

use anyhow::Context;
use serde::Serialize;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, oneshot};

use crate::protocol::{parse_line, Command};
use crate::runtime::LoopEvent;

/// Smallest prefetch that still lets a game start (current + following)
pub const MIN_PREFETCH: usize = 2;

/// Channel configuration
#[derive(Debug, Clone)]
pub struct ChannelConfig {
    pub host: String,
    pub port: u16,
    /// `PIECE` requests sent before the match starts
    pub prefetch: usize,
    /// Append every wire line as JSON to this file
    pub log_path: Option<String>,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 9700,
            prefetch: 3,
            log_path: None,
        }
    }
}

impl ChannelConfig {
    /// Create from `TETRECS_*` environment variables
    pub fn from_env() -> Self {
        use std::env;

        let defaults = Self::default();

        let host = env::var("TETRECS_HOST").unwrap_or(defaults.host);
        let port = env::var("TETRECS_PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.port);

        let prefetch = env::var("TETRECS_PREFETCH")
            .ok()
            .and_then(|s| s.parse::<usize>().ok())
            .unwrap_or(defaults.prefetch)
            .max(MIN_PREFETCH);

        let log_path = env::var("TETRECS_WIRE_LOG")
            .ok()
            .map(|s| s.trim().to_string())
            .and_then(|s| if s.is_empty() { None } else { Some(s) });

        Self {
            host,
            port,
            prefetch,
            log_path,
        }
    }

    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid server address {}:{}", self.host, self.port))
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "lowercase")]
enum Direction {
    In,
    Out,
}

#[derive(Debug, Clone, Serialize)]
struct WireRecord {
    dir: Direction,
    line: String,
}

fn spawn_wire_log(path: String) -> mpsc::UnboundedSender<WireRecord> {
    let (tx, mut rx) = mpsc::unbounded_channel::<WireRecord>();
    tokio::spawn(async move {
        use tokio::fs::OpenOptions;

        let mut file = match OpenOptions::new().create(true).append(true).open(&path).await {
            Ok(f) => f,
            Err(e) => {
                eprintln!("[Channel] Cannot open wire log {}: {}", path, e);
                return;
            }
        };

        let mut buf: Vec<u8> = Vec::with_capacity(256);
        while let Some(rec) = rx.recv().await {
            buf.clear();
            if serde_json::to_writer(&mut buf, &rec).is_err() {
                continue;
            }
            buf.push(b'\n');
            if file.write_all(&buf).await.is_err() {
                break;
            }
        }

        let _ = file.flush().await;
    });
    tx
}

/// Connect to the server and pump lines until either side closes.
///
/// `ready_tx` receives the server address once connected. A
/// [`LoopEvent::ChannelClosed`] is sent when the connection ends.
pub async fn run_channel(
    config: ChannelConfig,
    inbound_tx: mpsc::UnboundedSender<LoopEvent>,
    mut out_rx: mpsc::UnboundedReceiver<Command>,
    ready_tx: Option<oneshot::Sender<SocketAddr>>,
) -> anyhow::Result<()> {
    let wire_log_tx = config.log_path.clone().map(spawn_wire_log);

    let addr = config.socket_addr()?;
    let stream = TcpStream::connect(addr)
        .await
        .with_context(|| format!("cannot connect to {}", addr))?;
    stream.set_nodelay(true)?;
    println!("[Channel] Connected to {}", addr);

    if let Some(tx) = ready_tx {
        let _ = tx.send(addr);
    }

    let (reader, mut writer) = stream.into_split();
    let mut reader = BufReader::new(reader);

    let wire_log_tx_out = wire_log_tx.clone();
    let write_task = tokio::spawn(async move {
        while let Some(cmd) = out_rx.recv().await {
            let mut line = cmd.encode();
            if let Some(tx) = wire_log_tx_out.as_ref() {
                let _ = tx.send(WireRecord {
                    dir: Direction::Out,
                    line: line.clone(),
                });
            }
            line.push('\n');
            if writer.write_all(line.as_bytes()).await.is_err() {
                break;
            }
            if writer.flush().await.is_err() {
                break;
            }
        }
    });

    let mut line = String::new();
    let result = loop {
        line.clear();
        let bytes_read = match reader.read_line(&mut line).await {
            Ok(n) => n,
            Err(e) => break Err(anyhow::Error::new(e).context("read from server")),
        };
        if bytes_read == 0 {
            break Ok(());
        }

        let raw_line = line.trim_end_matches(['\n', '\r']);
        if raw_line.trim().is_empty() {
            continue;
        }

        if let Some(tx) = wire_log_tx.as_ref() {
            let _ = tx.send(WireRecord {
                dir: Direction::In,
                line: raw_line.to_string(),
            });
        }

        match parse_line(raw_line) {
            Ok(msg) => {
                if inbound_tx.send(LoopEvent::Server(msg)).is_err() {
                    // session dropped
                    break Ok(());
                }
            }
            Err(e) => eprintln!("[Channel] Ignoring {:?}: {}", raw_line, e),
        }
    };

    write_task.abort();
    println!("[Channel] Disconnected from {}", addr);
    let _ = inbound_tx.send(LoopEvent::ChannelClosed);
    result
}
