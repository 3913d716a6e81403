//! Delivery channel between the read loop and the consumer
//!
//! Bounded so a slow consumer applies backpressure to frame processing.
//! Dropping the [`BookSender`] ends the stream.

use std::pin::Pin;
use std::task::{Context, Poll};

use futures_util::Stream;
use tokio::sync::mpsc;

use crate::orderbook::BestOrderBook;

/// Default capacity; one slot behaves like a hand-off
pub const DEFAULT_CAPACITY: usize = 1;

/// Create a delivery channel holding at most `capacity` undelivered books
pub fn channel(capacity: usize) -> (BookSender, BookStream) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (BookSender { tx }, BookStream { rx })
}

/// Producer half, owned by the read loop
#[derive(Debug)]
pub struct BookSender {
    tx: mpsc::Sender<BestOrderBook>,
}

impl BookSender {
    /// Wait for capacity and enqueue a book.
    ///
    /// Returns `false` once the consumer has gone away.
    pub async fn send(&self, book: BestOrderBook) -> bool {
        self.tx.send(book).await.is_ok()
    }
}

/// Consumer half
#[derive(Debug)]
pub struct BookStream {
    rx: mpsc::Receiver<BestOrderBook>,
}

impl BookStream {
    /// Next book, or `None` after the producer is dropped and the queue drained
    pub async fn recv(&mut self) -> Option<BestOrderBook> {
        self.rx.recv().await
    }
}

impl Stream for BookStream {
    type Item = BestOrderBook;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.rx.poll_recv(cx)
    }
}
