//! Data access adapters for the courier engine.
//!
//! Responsibilities:
//! - Provide network-backed implementations of the core traits.
//! - Encapsulate third-party wire formats.
//!
//! Boundaries:
//! - Do not encode domain rules (live in `courier-core`).
//! - Keep blocking I/O off async executors; prefer async-capable clients.
#![forbid(unsafe_code)]

pub mod routing;
