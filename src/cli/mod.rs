//! Command Line Interface (CLI) layer for DEMGRID.
//!
//! This module defines argument parsing (`args`), error types (`errors`),
//! and the orchestration logic (`runner`) for single-region and batch
//! processing flows. It wires user-provided options to the underlying
//! library functionality exposed via `demgrid::api`.
//!
//! If you are embedding DEMGRID into another application, prefer using
//! the high-level `demgrid::api` module instead of calling the CLI code.
pub mod args;
pub mod errors;
pub mod runner;

pub use args::CliArgs;
pub use runner::run;
