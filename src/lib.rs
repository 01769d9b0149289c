//! MEMESCAN: cross-exchange market signal and arbitrage opportunity scanner
//!
//! Library crate exposing all modules for use by integration tests
//! and the binary entry point.

pub mod config;
pub mod types;
pub mod feeds;
pub mod strategy;
pub mod engine;
pub mod dashboard;
