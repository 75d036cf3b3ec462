//! Gatekeeper library.
//!
//! Dual-gate parking access control: each lane pairs a camera plate read
//! with an RFID swipe, and the reconciliation engine admits or releases
//! vehicles against a fixed-capacity session registry.
//!
//! Exposes every module for integration testing; the binary in
//! `main.rs` only wires adapters together.

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod config;
pub mod debounce;
pub mod dispatch;
pub mod error;
pub mod evidence;
pub mod model;
pub mod recognition;
pub mod registry;
pub mod scheduler;
pub mod serial;
