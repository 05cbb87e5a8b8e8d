//! Infrastructure implementations.
//!
//! Port traits, their in-memory adapters, the clock and random sources, and
//! environment configuration.

pub mod clock;
pub mod config;
pub mod memory;
pub mod ports;
