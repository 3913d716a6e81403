//! Ascendex market data client
//!
//! Connects to the Ascendex WebSocket API with a signed handshake, subscribes
//! to best bid/offer channels and streams normalized [`BestOrderBook`] updates.

pub mod auth;
pub mod client;
pub mod config;
pub mod delivery;
pub mod error;
pub mod logger;
pub mod orderbook;
pub mod parser;
pub mod websocket;

pub use auth::{sign, Credentials, HandshakeHeaders};
pub use client::{subscribe_all, ApiClient, AscendexClient};
pub use config::{Config, Endpoint};
pub use delivery::{BookSender, BookStream};
pub use error::{ClientError, Result};
pub use logger::{Logger, TracingLogger};
pub use orderbook::{BestOrderBook, Order};
pub use parser::{InboundMessage, SubscribeRequest};
pub use websocket::{ConnectionState, WebSocketClient};
