//! # craft-mcp-client
//!
//! Game-link side of the bridge: connects to the in-game automation socket
//! and exposes it as a [`HostSession`] the server core can drive.
//!
//! The link is a newline-delimited JSON protocol (see [`protocol`]). A
//! background reader task owns the read half: push feedback lines go to the
//! shared [`FeedbackCapture`], everything else answers the oldest pending
//! request (replies arrive in request order).

pub mod protocol;

use crate::protocol::{HostReply, HostRequest};
use async_trait::async_trait;
use craft_mcp_core::{ClientConfig, LabeledBlock, McpError, Result, VoxelPos};
use craft_mcp_server::feedback::FeedbackCapture;
use craft_mcp_server::host::{HostSession, ScreenshotParams};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::sync::oneshot;
use tracing::{debug, error, info, warn};

/// Connection attempts before giving up on the game socket
pub const CONNECT_ATTEMPTS: u32 = 10;
/// Fixed delay between connection attempts
pub const CONNECT_BACKOFF: Duration = Duration::from_secs(1);

type PendingReply = oneshot::Sender<Result<HostReply>>;

#[derive(Default)]
struct Shared {
    connected: AtomicBool,
    pending: Mutex<VecDeque<PendingReply>>,
    capture: FeedbackCapture,
}

impl Shared {
    fn pending(&self) -> std::sync::MutexGuard<'_, VecDeque<PendingReply>> {
        self.pending
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Mark the link down and fail everything still waiting for a reply
    fn disconnect(&self, reason: &str) {
        self.connected.store(false, Ordering::Release);
        for tx in self.pending().drain(..) {
            let _ = tx.send(Err(McpError::HostUnavailable(reason.to_string())));
        }
    }
}

/// A game client reached over the automation socket
pub struct RemoteHost {
    shared: Arc<Shared>,
    writer: tokio::sync::Mutex<OwnedWriteHalf>,
}

impl RemoteHost {
    /// Connect to the game socket, retrying with a fixed backoff. The game
    /// client may still be loading when the bridge starts.
    pub async fn connect(config: &ClientConfig) -> Result<Self> {
        let addr = format!("{}:{}", config.game_host, config.game_port);
        let mut last_error = String::new();

        for attempt in 1..=CONNECT_ATTEMPTS {
            match TcpStream::connect(&addr).await {
                Ok(stream) => {
                    info!("Connected to game at {}", addr);
                    return Ok(Self::from_stream(stream));
                }
                Err(e) => {
                    warn!(
                        "Connection attempt {}/{} to {} failed: {}",
                        attempt, CONNECT_ATTEMPTS, addr, e
                    );
                    last_error = e.to_string();
                    if attempt < CONNECT_ATTEMPTS {
                        tokio::time::sleep(CONNECT_BACKOFF).await;
                    }
                }
            }
        }

        Err(McpError::HostUnavailable(format!(
            "Could not reach game at {}: {}",
            addr, last_error
        )))
    }

    /// Wrap an already established connection
    pub fn from_stream(stream: TcpStream) -> Self {
        let (read_half, write_half) = stream.into_split();
        let shared = Arc::new(Shared::default());
        shared.connected.store(true, Ordering::Release);

        tokio::spawn(reader_task(read_half, shared.clone()));

        Self {
            shared,
            writer: tokio::sync::Mutex::new(write_half),
        }
    }

    /// Send one request and wait for its reply
    async fn request(&self, request: HostRequest) -> Result<HostReply> {
        if !self.shared.connected.load(Ordering::Acquire) {
            return Err(McpError::HostUnavailable("Not connected to game".into()));
        }

        let line = protocol::encode(&request)
            .map_err(|e| McpError::SerializationError(e.to_string()))?;

        let (tx, rx) = oneshot::channel();

        {
            // Enqueue under the writer lock so pending order always matches
            // write order when callers race
            let mut writer = self.writer.lock().await;
            self.shared.pending().push_back(tx);
            let write = async {
                writer.write_all(line.as_bytes()).await?;
                writer.write_all(b"\n").await?;
                writer.flush().await
            };
            if let Err(e) = write.await {
                self.shared.disconnect("Connection lost");
                return Err(McpError::TransportError(format!(
                    "Failed to write to game socket: {}",
                    e
                )));
            }
        }
        debug!("[Bridge->Game] {}", line);

        rx.await
            .map_err(|_| McpError::HostUnavailable("Connection lost".into()))?
    }

    /// Send one request and unwrap the success payload
    async fn request_data(&self, request: HostRequest) -> Result<serde_json::Value> {
        match self.request(request).await? {
            HostReply::Ok { data } => Ok(data),
            HostReply::Error { message } => Err(McpError::DispatchError(message)),
            HostReply::Feedback { .. } => Err(McpError::ProtocolError(
                "Feedback message delivered as a reply".into(),
            )),
        }
    }
}

#[async_trait]
impl HostSession for RemoteHost {
    fn is_available(&self) -> bool {
        self.shared.connected.load(Ordering::Acquire)
    }

    fn feedback(&self) -> FeedbackCapture {
        self.shared.capture.clone()
    }

    async fn send_command(&self, command: &str) -> Result<()> {
        self.request_data(HostRequest::Command {
            command: command.to_string(),
        })
        .await
        .map(|_| ())
    }

    async fn player_info(&self) -> Result<serde_json::Value> {
        self.request_data(HostRequest::PlayerInfo).await
    }

    async fn blocks_in_area(&self, from: VoxelPos, to: VoxelPos) -> Result<Vec<LabeledBlock>> {
        let data = self
            .request_data(HostRequest::BlocksInArea { from, to })
            .await?;
        serde_json::from_value(data)
            .map_err(|e| McpError::ProtocolError(format!("Invalid block list from game: {}", e)))
    }

    async fn take_screenshot(&self, params: ScreenshotParams) -> Result<serde_json::Value> {
        self.request_data(HostRequest::Screenshot {
            x: params.x,
            y: params.y,
            z: params.z,
            yaw: params.yaw,
            pitch: params.pitch,
        })
        .await
    }
}

/// Owns the read half: routes feedback pushes to the capture queue and
/// replies to the oldest pending request.
async fn reader_task(read_half: OwnedReadHalf, shared: Arc<Shared>) {
    let mut reader = BufReader::new(read_half);
    let mut line = String::new();

    loop {
        line.clear();
        match reader.read_line(&mut line).await {
            Ok(0) => {
                info!("Game closed the link");
                break;
            }
            Ok(_) => {}
            Err(e) => {
                error!("Game link read failed: {}", e);
                break;
            }
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        debug!("[Game->Bridge] {}", trimmed);

        match protocol::decode(trimmed) {
            Ok(HostReply::Feedback { message }) => {
                shared.capture.push(message);
            }
            Ok(reply) => {
                if let Some(tx) = shared.pending().pop_front() {
                    let _ = tx.send(Ok(reply));
                } else {
                    warn!("Reply with no pending request: {}", trimmed);
                }
            }
            Err(e) => {
                error!("Undecodable line from game: {}", e);
                if let Some(tx) = shared.pending().pop_front() {
                    let _ = tx.send(Err(McpError::SerializationError(e.to_string())));
                }
            }
        }
    }

    shared.disconnect("Connection lost");
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    /// Fake game that answers each request line with a canned reply. The
    /// push lines go out between the first request and its reply, so a test
    /// can open the capture window before they arrive.
    async fn fake_game(listener: TcpListener, replies: Vec<String>, pushes: Vec<String>) {
        let (stream, _) = listener.accept().await.unwrap();
        let (read_half, mut write_half) = stream.into_split();
        let mut reader = BufReader::new(read_half);
        let mut line = String::new();

        for (i, reply) in replies.iter().enumerate() {
            line.clear();
            if reader.read_line(&mut line).await.unwrap() == 0 {
                return;
            }
            if i == 0 {
                for push in &pushes {
                    write_half.write_all(push.as_bytes()).await.unwrap();
                    write_half.write_all(b"\n").await.unwrap();
                }
            }
            write_half.write_all(reply.as_bytes()).await.unwrap();
            write_half.write_all(b"\n").await.unwrap();
            write_half.flush().await.unwrap();
        }
    }

    async fn connect_to_fake(
        replies: Vec<&str>,
        pushes: Vec<&str>,
    ) -> RemoteHost {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(fake_game(
            listener,
            replies.into_iter().map(String::from).collect(),
            pushes.into_iter().map(String::from).collect(),
        ));
        let stream = TcpStream::connect(addr).await.unwrap();
        RemoteHost::from_stream(stream)
    }

    #[tokio::test]
    async fn test_send_command_roundtrip() {
        let host = connect_to_fake(vec![r#"{"type":"ok"}"#], vec![]).await;
        assert!(host.is_available());
        host.send_command("say hi").await.unwrap();
    }

    #[tokio::test]
    async fn test_error_reply_surfaces_message() {
        let host =
            connect_to_fake(vec![r#"{"type":"error","message":"no player"}"#], vec![]).await;
        let err = host.player_info().await.unwrap_err();
        assert!(err.to_string().contains("no player"));
    }

    #[tokio::test]
    async fn test_feedback_pushes_reach_capture() {
        let host = connect_to_fake(
            vec![r#"{"type":"ok"}"#],
            vec![r#"{"type":"feedback","message":"Successfully filled"}"#],
        )
        .await;
        let capture = host.feedback();
        capture.start_capturing();

        // Feedback line precedes the reply, so the reply confirms delivery
        host.send_command("fill 0 0 0 1 1 1 stone").await.unwrap();
        let message = capture.wait_for_message(Duration::from_millis(500)).await;
        assert_eq!(message.as_deref(), Some("Successfully filled"));
    }

    #[tokio::test]
    async fn test_blocks_decode() {
        let host = connect_to_fake(
            vec![r#"{"type":"ok","data":[{"x":1,"y":2,"z":3,"type":"stone"}]}"#],
            vec![],
        )
        .await;
        let blocks = host
            .blocks_in_area(VoxelPos { x: 0, y: 0, z: 0 }, VoxelPos { x: 4, y: 4, z: 4 })
            .await
            .unwrap();
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].block_type, "stone");
    }

    /// Fake game that replies to each request with an echo of its type tag
    async fn echo_game(listener: TcpListener) {
        let (stream, _) = listener.accept().await.unwrap();
        let (read_half, mut write_half) = stream.into_split();
        let mut reader = BufReader::new(read_half);
        let mut line = String::new();

        loop {
            line.clear();
            if reader.read_line(&mut line).await.unwrap() == 0 {
                return;
            }
            let request: serde_json::Value = serde_json::from_str(line.trim()).unwrap();
            let reply = serde_json::json!({
                "type": "ok",
                "data": { "echo": request["type"] }
            });
            write_half.write_all(reply.to_string().as_bytes()).await.unwrap();
            write_half.write_all(b"\n").await.unwrap();
            write_half.flush().await.unwrap();
        }
    }

    #[tokio::test]
    async fn test_concurrent_requests_correlate_in_write_order() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(echo_game(listener));
        let stream = TcpStream::connect(addr).await.unwrap();
        let host = Arc::new(RemoteHost::from_stream(stream));

        // Two racing callers must each get the reply to their own request
        let info = {
            let host = host.clone();
            tokio::spawn(async move { host.player_info().await.unwrap() })
        };
        let shot = {
            let host = host.clone();
            tokio::spawn(async move {
                host.take_screenshot(ScreenshotParams::default()).await.unwrap()
            })
        };

        assert_eq!(info.await.unwrap()["echo"], "player_info");
        assert_eq!(shot.await.unwrap()["echo"], "screenshot");
    }

    #[tokio::test]
    async fn test_disconnect_fails_pending_and_flags_unavailable() {
        // Fake game answers nothing and hangs up immediately
        let host = connect_to_fake(vec![], vec![]).await;
        let err = host.send_command("say hi").await.unwrap_err();
        // Either the write or the reply wait observes the dead link first
        assert!(matches!(
            err,
            McpError::HostUnavailable(_) | McpError::TransportError(_)
        ));

        // Link is down from here on
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!host.is_available());
        let err = host.send_command("say hi").await.unwrap_err();
        assert!(matches!(err, McpError::HostUnavailable(_)));
    }
}
