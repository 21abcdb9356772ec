//! Shared building blocks for the Paystable checkout widget.
//!
//! - [`fiat`]: fixed-point fiat amounts and their display formatting.
//! - [`objects`]: wire types exchanged with the merchant backend.
//! - [`client`]: typed HTTP client for the merchant backend (behind the
//!   `client` feature).

pub mod fiat;
pub mod objects;

#[cfg(feature = "client")]
pub mod client;

pub use fiat::{FiatAmount, NumberLocale};
