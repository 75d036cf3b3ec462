//! Integration test driver for `tests/integration/` submodule.
//!
//! Each `mod` below maps to a file that exercises a specific subsystem
//! against mock adapters.  All tests run on the host with no cameras or
//! gate controllers attached.

mod engine_tests;
mod mock_hw;
mod serial_tests;
