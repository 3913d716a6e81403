//! Ascendex market data client
//!
//! Streams best bid/offer updates for the configured symbols and logs each one.

use std::sync::Arc;

use ascendex_market_data::{
    delivery, subscribe_all, ApiClient, AscendexClient, BookStream, Config, Logger, TracingLogger,
};
use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer().json())
        .with(EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .init();

    info!("Starting Ascendex market data client");

    let logger: Arc<dyn Logger> = Arc::new(TracingLogger);

    let config = Config::load()?;
    info!(config = ?config, "Configuration loaded");

    let client = Arc::new(AscendexClient::new(config, logger.clone()));
    client.connect().await?;

    let result = stream(&client, logger.as_ref()).await;
    client.disconnect().await;
    result
}

async fn stream(client: &Arc<AscendexClient>, logger: &dyn Logger) -> anyhow::Result<()> {
    let (sink, books) = delivery::channel(client.config().channel_capacity);
    client.read_messages(sink).await?;

    let symbols = client.config().symbols.clone();
    let subscribed = subscribe_all(client.as_ref(), &symbols, logger).await;
    info!(subscribed, total = symbols.len(), "Subscriptions sent");

    let pinger = client.clone();
    tokio::spawn(async move {
        // Failures are logged inside the loop
        let _ = pinger.keep_alive().await;
    });

    tokio::select! {
        _ = drain(books, logger) => info!("Stream closed"),
        _ = tokio::signal::ctrl_c() => info!("Interrupted, shutting down"),
    }

    Ok(())
}

async fn drain(mut books: BookStream, logger: &dyn Logger) {
    while let Some(book) = books.recv().await {
        logger.info("book", &[("book", &book)]);
    }
}
