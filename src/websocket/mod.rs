//! WebSocket module for Ascendex connection management

mod client;

pub use client::{pump_frames, ConnectionState, WebSocketClient};
