//! CTA web call library
//!
//! Calls the CTA Bus Tracker web service through a reusable transport handle
//! and returns the raw response text, with optional saving and offline replay
//! of responses keyed by route and stop.

pub mod cache;
pub mod cli;
pub mod params;
pub mod transport;
pub mod web;

pub use transport::{HttpTransport, Transport, TransportError};
pub use web::{CallError, CallMode, WebCaller};
