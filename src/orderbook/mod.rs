//! Best bid/offer domain types
//!
//! Amounts and prices are `f64`. A zero value can mean either an actual zero
//! or that the venue sent too few levels or unparseable numbers.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One side of the top of book
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub amount: f64,
    pub price: f64,
}

impl Order {
    pub fn new(amount: f64, price: f64) -> Self {
        Self { amount, price }
    }
}

/// Best bid and offer for a symbol
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BestOrderBook {
    pub ask: Order,
    pub bid: Order,
}

impl BestOrderBook {
    /// True when both sides are zeroed, i.e. the degraded "no data" book
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Ask minus bid price, `None` for the empty book
    pub fn spread(&self) -> Option<f64> {
        if self.is_empty() {
            None
        } else {
            Some(self.ask.price - self.bid.price)
        }
    }
}

impl fmt::Display for BestOrderBook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ask={}@{} bid={}@{}",
            self.ask.amount, self.ask.price, self.bid.amount, self.bid.price
        )
    }
}
