//! Client facade
//!
//! [`ApiClient`] is the only surface callers program against. Everything
//! behind it (signing, codec, socket tasks) stays private to the crate.

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::Config;
use crate::delivery::BookSender;
use crate::error::Result;
use crate::logger::Logger;
use crate::websocket::{ConnectionState, WebSocketClient};

/// Streaming market data capabilities
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ApiClient: Send + Sync {
    /// Open the authenticated connection
    async fn connect(&self) -> Result<()>;

    /// Close the connection and stop the background loops
    async fn disconnect(&self);

    /// Subscribe to best bid/offer updates for a symbol such as `BTC_USDT`
    async fn subscribe(&self, symbol: &str) -> Result<()>;

    /// Start forwarding decoded updates to `sink`; returns immediately
    async fn read_messages(&self, sink: BookSender) -> Result<()>;

    /// Run the keepalive loop until it fails or the client disconnects
    async fn keep_alive(&self) -> Result<()>;
}

/// Ascendex implementation of [`ApiClient`]
pub struct AscendexClient {
    config: Config,
    connection: WebSocketClient,
}

impl AscendexClient {
    pub fn new(config: Config, logger: Arc<dyn Logger>) -> Self {
        let connection = WebSocketClient::new(&config, logger);
        Self { config, connection }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub async fn state(&self) -> ConnectionState {
        self.connection.state().await
    }
}

#[async_trait]
impl ApiClient for AscendexClient {
    async fn connect(&self) -> Result<()> {
        self.connection.connect().await
    }

    async fn disconnect(&self) {
        self.connection.disconnect().await
    }

    async fn subscribe(&self, symbol: &str) -> Result<()> {
        self.connection.subscribe(symbol).await
    }

    async fn read_messages(&self, sink: BookSender) -> Result<()> {
        self.connection.read_messages(sink).await
    }

    async fn keep_alive(&self) -> Result<()> {
        self.connection.keep_alive().await
    }
}

/// Subscribe to every symbol, logging failures and moving on.
///
/// Returns the number of successful subscriptions.
pub async fn subscribe_all<C>(client: &C, symbols: &[String], logger: &dyn Logger) -> usize
where
    C: ApiClient + ?Sized,
{
    let mut subscribed = 0;
    for symbol in symbols {
        match client.subscribe(symbol).await {
            Ok(()) => subscribed += 1,
            Err(e) => logger.error("subscribe to channel failed", &e, &[("symbol", symbol)]),
        }
    }
    subscribed
}
