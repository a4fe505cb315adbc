//! # Command-Line Interface
//!
//! Reads a request document, runs intake and the engine, and prints the
//! result.
//!
//! | Command | Purpose |
//! |---------|---------|
//! | `plan [FILE]` | Order, project and explain a task set |
//! | `check [FILE]` | Validate a task set and print its order |
//! | `config` | Show the effective configuration |
//!
//! `FILE` defaults to `-` (stdin). Files ending in `.yaml`/`.yml` are read
//! as YAML, everything else (stdin included) as JSON; `--input-format`
//! overrides the guess.
//!
//! ## Output Formats
//!
//! All commands support `--format`:
//! - `text` (default) - Human-readable output
//! - `json` - Machine-parseable JSON
//!
//! ## Verbose Mode
//!
//! `--verbose` (or `-v`) enables debug logging on stderr. `RUST_LOG`
//! overrides the filter.

mod app;
mod output;
mod plan;

pub use app::{run, Cli, Commands};
pub use output::Output;
