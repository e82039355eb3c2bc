//! End-to-end scenarios for the Snapper kernel live in `tests/`.
//!
//! This crate intentionally exports nothing.

#![deny(unsafe_code)]
#![deny(clippy::all)]
