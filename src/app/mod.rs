//! Application core — pure domain logic, zero I/O.
//!
//! This module contains the reconciliation rules for the gate controller:
//! per-lane signal pairing, debouncing, and registry commits.  All
//! interaction with devices happens through **port traits** defined in
//! [`ports`], keeping this layer fully testable without cameras or
//! serial links.

pub mod commands;
pub mod events;
pub mod ports;
pub mod service;
