pub mod zerox_orderbook; // Resting limit orders from the 0x relayer API

pub use zerox_orderbook::{OrderbookProvider, ZeroExOrderbook};
