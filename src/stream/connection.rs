/*!
 * Reconnecting websocket client for the chat server's event stream.
 *
 * One session is: open the socket with bearer and cookie credentials, send
 * the authentication challenge, then read frames until the server closes or
 * the transport fails. Sessions are restarted forever after a fixed delay.
 * Frames are filtered by the watch set before anything else sees them.
 */

use async_trait::async_trait;
use chrono::Utc;
use futures::{SinkExt, StreamExt};
use log::{debug, info, trace, warn};
use parking_lot::RwLock;
use std::sync::Arc;
use std::time::Instant;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::handshake::client::Request;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::{self, Message};

use crate::app_config::ServerConfig;
use crate::errors::StreamError;
use crate::events::EventBus;

use super::protocol::{AuthChallenge, IncomingPost, parse_posted_frame};
use super::watch_set::WatchSet;

/// Receiver of posts that passed the watch-set filter
#[async_trait]
pub trait PostHandler: Send {
    async fn handle_post(&mut self, post: IncomingPost);
}

/// Point-in-time view of the connection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConnectionSnapshot {
    pub connected: bool,
    /// Monotonic time of the latest successful connect
    pub connected_at: Option<Instant>,
}

/// Shared connection state; written only by the connection manager
#[derive(Debug, Clone, Default)]
pub struct ConnectionState {
    inner: Arc<RwLock<ConnectionSnapshot>>,
}

impl ConnectionState {
    pub fn snapshot(&self) -> ConnectionSnapshot {
        *self.inner.read()
    }

    pub fn is_connected(&self) -> bool {
        self.inner.read().connected
    }

    pub fn connected_at(&self) -> Option<Instant> {
        self.inner.read().connected_at
    }

    pub(crate) fn mark_connected(&self, at: Instant) {
        let mut state = self.inner.write();
        state.connected = true;
        state.connected_at = Some(at);
    }

    pub(crate) fn mark_disconnected(&self) {
        self.inner.write().connected = false;
    }
}

/// Websocket stream client with fixed-delay reconnect
#[derive(Debug)]
pub struct ConnectionManager {
    server: ServerConfig,
    watch: WatchSet,
    state: ConnectionState,
    events: EventBus,
    /// Sequence number of the last authentication message
    seq: u64,
}

impl ConnectionManager {
    pub fn new(server: ServerConfig, watch: WatchSet, events: EventBus) -> Self {
        Self {
            server,
            watch,
            state: ConnectionState::default(),
            events,
            seq: 0,
        }
    }

    pub fn watch_set(&self) -> &WatchSet {
        &self.watch
    }

    /// Replace the watched channels; applies from the next frame on
    pub fn set_watch_channels<I, S>(&self, channels: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.watch.replace(channels);
    }

    /// Handle to the connection state for readers
    pub fn state(&self) -> ConnectionState {
        self.state.clone()
    }

    /// Parse a raw frame and keep it only if it is a post in a watched channel
    pub fn accept_frame(&self, raw: &str) -> Option<IncomingPost> {
        let post = parse_posted_frame(raw)?;
        if !self.watch.contains(&post.channel_id) {
            trace!("Dropping post in unwatched channel {}", post.channel_id);
            return None;
        }
        Some(IncomingPost::from_raw(post, Utc::now()))
    }

    /// Feed one raw frame through the filter into `handler`.
    ///
    /// Returns whether the frame produced a post.
    pub async fn handle_frame<H: PostHandler + ?Sized>(&self, raw: &str, handler: &mut H) -> bool {
        match self.accept_frame(raw) {
            Some(post) => {
                handler.handle_post(post).await;
                true
            }
            None => false,
        }
    }

    /// Run sessions forever, reconnecting after the configured delay
    pub async fn run<H: PostHandler + ?Sized>(mut self, handler: &mut H) {
        let delay = self.server.reconnect_delay();

        loop {
            info!("Connecting to {}", self.server.ws_url);

            match self.connect_and_run(handler).await {
                Ok(()) => info!("Stream closed by server"),
                Err(e) => warn!("Stream error: {}", e),
            }

            self.state.mark_disconnected();
            self.events.emit_connection(false);

            debug!("Reconnecting in {} ms", delay.as_millis());
            tokio::time::sleep(delay).await;
        }
    }

    /// Upgrade request with bearer and cookie credentials
    pub fn build_request(&self) -> Result<Request, StreamError> {
        let mut request = self
            .server
            .ws_url
            .as_str()
            .into_client_request()
            .map_err(|e| StreamError::Url(format!("{}: {}", self.server.ws_url, e)))?;

        let bearer = HeaderValue::from_str(&format!("Bearer {}", self.server.token))
            .map_err(|e| StreamError::Header(e.to_string()))?;
        let cookie = HeaderValue::from_str(&format!(
            "MMUSERID={}; MMAUTHTOKEN={}",
            self.server.user_id, self.server.token
        ))
        .map_err(|e| StreamError::Header(e.to_string()))?;

        let headers = request.headers_mut();
        headers.insert("Authorization", bearer);
        headers.insert("Cookie", cookie);

        Ok(request)
    }

    /// One session: connect, authenticate, read until close or error
    async fn connect_and_run<H: PostHandler + ?Sized>(&mut self, handler: &mut H) -> Result<(), StreamError> {
        let request = self.build_request()?;
        let limit = self.server.connect_timeout();
        let (ws_stream, _response) = tokio::time::timeout(limit, connect_async(request))
            .await
            .map_err(|_| StreamError::Timeout(limit.as_millis() as u64))?
            .map_err(|e| match e {
                tungstenite::Error::Http(response) => {
                    StreamError::Handshake(format!("server answered {}", response.status()))
                }
                other => StreamError::WebSocket(other),
            })?;
        let (mut sink, mut reader) = ws_stream.split();

        self.seq += 1;
        match serde_json::to_string(&AuthChallenge::new(self.seq, &self.server.token)) {
            Ok(auth) => {
                if let Err(e) = sink.send(Message::Text(auth.into())).await {
                    warn!("Failed to send authentication challenge: {}", e);
                }
            }
            Err(e) => warn!("Failed to encode authentication challenge: {}", e),
        }

        self.state.mark_connected(Instant::now());
        self.events.emit_connection(true);
        info!("Connected to stream");

        while let Some(message) = reader.next().await {
            match message? {
                Message::Text(text) => {
                    self.handle_frame(text.as_str(), handler).await;
                }
                Message::Ping(data) => sink.send(Message::Pong(data)).await?,
                Message::Close(frame) => {
                    debug!("Close frame received: {:?}", frame);
                    break;
                }
                _ => {}
            }
        }

        Ok(())
    }
}
