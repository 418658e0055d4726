//! Strategy layer integration tests
//!
//! Exercises the strategies through the `tessera` facade the way a graph
//! walker would: object streams, chunk entries, JSON bridging and
//! configured strategy chains.

mod common;

mod config_chain;
mod failures;
mod native_scenarios;
mod properties;
