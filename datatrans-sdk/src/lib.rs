#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![forbid(unsafe_code)]

//! Datatrans integration for Rust services.
//!
//! * [`signature`] parses and verifies the `Datatrans-Signature` header.
//! * [`webhook`] (feature `webhook`) is a tower layer that rejects unsigned
//!   or tampered webhook deliveries before they reach a handler.
//! * [`client`] (feature `client`) calls the Datatrans transaction API.
//! * [`objects`] holds the JSON payloads shared by both directions.

pub mod objects;
pub mod signature;

#[cfg(feature = "webhook")]
pub mod webhook;

#[cfg(feature = "client")]
pub mod client;
