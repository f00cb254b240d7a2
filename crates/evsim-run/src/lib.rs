//! Running seeded simulations on top of [`evsim_core`].
//!
//! This crate turns a [`SimConfig`] into one or more independent runs of an
//! [`EventQueue`](evsim_core::EventQueue), each with its own generator
//! derived from the configured master seed.

pub mod config;
pub mod runner;
pub mod seed;

pub use config::{ConfigError, SimConfig};
pub use runner::{run_simulation, run_simulations, RunSummary};
pub use seed::PositionalSeed;
