#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used, clippy::panic))]
#![forbid(unsafe_code)]

pub mod backend;
pub mod config;
pub mod error;
pub mod events;
pub mod flow;
pub mod processors;
pub mod utils;
