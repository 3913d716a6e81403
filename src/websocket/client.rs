//! WebSocket client for Ascendex streams
//!
//! Handles the authenticated handshake, subscriptions, the read loop and the
//! keepalive loop. Writes from every task go through one mutex-guarded sink.

use std::sync::Arc;
use std::time::Duration;

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{Sink, SinkExt, Stream, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio::time::{interval_at, timeout, Instant};
use tokio_tungstenite::{
    connect_async,
    tungstenite::{client::IntoClientRequest, protocol::Message, Error as WsError},
    MaybeTlsStream, WebSocketStream,
};
use tokio_util::sync::CancellationToken;

use crate::auth::{Credentials, HandshakeHeaders};
use crate::config::{Config, Endpoint};
use crate::delivery::BookSender;
use crate::error::{ClientError, Result};
use crate::logger::Logger;
use crate::parser::{build_subscribe, classify, PING_PAYLOAD};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type WsSink = SplitSink<WsStream, Message>;
type WsSource = SplitStream<WsStream>;

/// Lifecycle of the single connection owned by a client
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Unconnected,
    Connected,
    Closed,
}

enum Link {
    Unconnected,
    Connected(WsSink),
    Closed,
}

impl Link {
    fn state(&self) -> ConnectionState {
        match self {
            Link::Unconnected => ConnectionState::Unconnected,
            Link::Connected(_) => ConnectionState::Connected,
            Link::Closed => ConnectionState::Closed,
        }
    }
}

/// WebSocket client for a single authenticated connection
pub struct WebSocketClient {
    endpoint: Endpoint,
    credentials: Credentials,
    ping_interval: Duration,
    ping_deadline: Duration,
    logger: Arc<dyn Logger>,
    writer: Arc<Mutex<Link>>,
    reader: Mutex<Option<WsSource>>,
    cancel: CancellationToken,
}

impl WebSocketClient {
    /// Create a new WebSocket client
    pub fn new(config: &Config, logger: Arc<dyn Logger>) -> Self {
        Self {
            endpoint: config.endpoint.clone(),
            credentials: config.credentials.clone(),
            ping_interval: config.ping_interval,
            ping_deadline: config.ping_deadline,
            logger,
            writer: Arc::new(Mutex::new(Link::Unconnected)),
            reader: Mutex::new(None),
            cancel: CancellationToken::new(),
        }
    }

    pub async fn state(&self) -> ConnectionState {
        self.writer.lock().await.state()
    }

    /// Open the authenticated connection
    pub async fn connect(&self) -> Result<()> {
        let mut link = self.writer.lock().await;
        if !matches!(*link, Link::Unconnected) {
            return Err(ClientError::Connection(format!(
                "Connection already {:?}",
                link.state()
            )));
        }

        let url = self.endpoint.url();
        self.logger.info("connecting...", &[("to", &url)]);

        let mut request = url
            .as_str()
            .into_client_request()
            .map_err(|e| ClientError::Connection(format!("Invalid url {}: {}", url, e)))?;
        HandshakeHeaders::now(&self.credentials, self.endpoint.path())
            .apply(request.headers_mut())?;

        let (ws_stream, response) = match connect_async(request).await {
            Ok(ok) => ok,
            Err(e) => {
                self.logger.error("dial failed", &e, &[("url", &url)]);
                return Err(ClientError::Connection(format!("Failed to connect: {}", e)));
            }
        };

        let status = response.status();
        self.logger.info("connected", &[("status", &status)]);

        let (sink, source) = ws_stream.split();
        *self.reader.lock().await = Some(source);
        *link = Link::Connected(sink);

        Ok(())
    }

    /// Close the connection and stop both loops. Later calls are no-ops.
    pub async fn disconnect(&self) {
        let mut link = self.writer.lock().await;
        self.cancel.cancel();

        if let Link::Connected(mut sink) = std::mem::replace(&mut *link, Link::Closed) {
            self.logger.info("disconnect", &[]);
            if let Err(e) = close_within(&mut sink, self.ping_deadline).await {
                self.logger.error("close failed", &e, &[]);
            }
        }
        self.reader.lock().await.take();
    }

    /// Send a best bid/offer subscription for `symbol`
    pub async fn subscribe(&self, symbol: &str) -> Result<()> {
        let request = build_subscribe(symbol);
        let channel = request.ch.as_str();

        let result = match request.to_json() {
            Ok(payload) => self
                .send(Message::Text(payload))
                .await
                .map_err(|e| ClientError::Subscribe(e.to_string())),
            Err(e) => Err(e),
        };
        if let Err(err) = result {
            self.logger.error("subscribe failed", &err, &[("channel", &channel)]);
            return Err(err);
        }

        self.logger.info("subscribed to channel", &[("channel", &channel)]);
        Ok(())
    }

    /// Spawn the read loop feeding `sink`; returns without waiting for frames
    pub async fn read_messages(&self, sink: BookSender) -> Result<()> {
        let source = self
            .reader
            .lock()
            .await
            .take()
            .ok_or(ClientError::NotConnected)?;

        self.logger.info("read loop started", &[]);
        tokio::spawn(pump_frames(
            source,
            sink,
            self.logger.clone(),
            self.cancel.clone(),
        ));
        Ok(())
    }

    /// Send keepalive pings until a write fails or the client disconnects
    pub async fn keep_alive(&self) -> Result<()> {
        if self.ping_interval.is_zero() {
            let err = ClientError::Config("ping interval must be greater than zero".to_string());
            self.logger.error("ping failed", &err, &[]);
            return Err(err);
        }
        let mut ticker = interval_at(Instant::now() + self.ping_interval, self.ping_interval);

        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => {
                    self.logger.info("ping loop stopped", &[]);
                    return Ok(());
                }
                _ = ticker.tick() => {}
            }

            let at = chrono::Utc::now().to_rfc3339();
            self.logger.info("ping", &[("at", &at)]);

            let ping = Message::Ping(PING_PAYLOAD.to_vec());
            let result = match timeout(self.ping_deadline, self.send(ping)).await {
                Ok(result) => result,
                Err(_) => Err(ClientError::LivenessWrite(format!(
                    "Ping not written within {:?}",
                    self.ping_deadline
                ))),
            };

            if let Err(e) = result {
                let err = match e {
                    ClientError::LivenessWrite(_) => e,
                    other => ClientError::LivenessWrite(other.to_string()),
                };
                self.logger.error("ping failed", &err, &[]);
                return Err(err);
            }
        }
    }

    /// Write a single frame while holding the writer lock
    async fn send(&self, message: Message) -> Result<()> {
        let mut link = self.writer.lock().await;
        match &mut *link {
            Link::Connected(sink) => sink
                .send(message)
                .await
                .map_err(|e| ClientError::Connection(e.to_string())),
            _ => Err(ClientError::NotConnected),
        }
    }
}

/// Close `sink`, giving up after `deadline` if the peer stops reading
async fn close_within<S>(sink: &mut S, deadline: Duration) -> Result<()>
where
    S: Sink<Message, Error = WsError> + Unpin,
{
    match timeout(deadline, sink.close()).await {
        Ok(result) => result.map_err(|e| ClientError::Connection(e.to_string())),
        Err(_) => Err(ClientError::Connection(format!(
            "Close not completed within {:?}",
            deadline
        ))),
    }
}

/// Decode frames from `source` and forward best bid/offer updates to `sink`.
///
/// Stops on the first transport error, close frame, end of stream, or
/// undecodable frame. Returning drops `sink`, which ends the consumer stream.
pub async fn pump_frames<S>(
    mut source: S,
    sink: BookSender,
    logger: Arc<dyn Logger>,
    cancel: CancellationToken,
) where
    S: Stream<Item = std::result::Result<Message, WsError>> + Unpin,
{
    loop {
        let frame = tokio::select! {
            _ = cancel.cancelled() => {
                logger.info("read loop stopped", &[]);
                return;
            }
            frame = source.next() => frame,
        };

        let payload = match frame {
            Some(Ok(Message::Text(text))) => text.into_bytes(),
            Some(Ok(Message::Binary(data))) => data,
            Some(Ok(Message::Ping(_))) | Some(Ok(Message::Pong(_))) | Some(Ok(Message::Frame(_))) => {
                continue
            }
            Some(Ok(Message::Close(frame))) => {
                let err = ClientError::TransportRead(format!("Connection closed: {:?}", frame));
                logger.error("read:", &err, &[]);
                return;
            }
            Some(Err(e)) => {
                let err = ClientError::TransportRead(e.to_string());
                logger.error("read:", &err, &[]);
                return;
            }
            None => {
                let err = ClientError::TransportRead("Stream ended".to_string());
                logger.error("read:", &err, &[]);
                return;
            }
        };

        let raw = String::from_utf8_lossy(&payload);
        let message = match classify(&payload) {
            Ok(message) => message,
            Err(e) => {
                logger.error("unmarshal message failed", &e, &[("message", &raw)]);
                return;
            }
        };

        logger.info("received", &[("message", &raw)]);

        if message.is_bbo() && !sink.send(message.to_best_order_book()).await {
            logger.info("consumer gone, read loop stopped", &[]);
            return;
        }
    }
}
