//! Headless game runner for autoplay, batch runs and CI verification.
//!
//! This crate drives [`civ_core`] without a presentation layer:
//!
//! - **Autoplay**: the human seat is played by a simple seeded heuristic
//! - **Batch runs**: many seeds in parallel, summarized as JSON
//! - **Determinism checks**: the same seed twice must hash the same
//! - **Map dumps**: generated maps rendered as ASCII
//!
//! # Example
//!
//! ```bash
//! # Play 100 turns and print a JSON summary
//! cargo run -p civ_headless -- run --seed 7 --turns 100
//!
//! # Show a generated map
//! cargo run -p civ_headless -- map --seed 7 --size medium
//!
//! # Run 200 seeds in parallel
//! cargo run -p civ_headless -- batch --count 200 --output results/batch.json
//!
//! # Verify determinism
//! cargo run -p civ_headless -- verify --seed 7 --turns 150
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod ascii;
pub mod autoplay;
pub mod batch;
pub mod runner;

pub use ascii::{render_map, render_state, AsciiConfig};
pub use autoplay::Autopilot;
pub use batch::{run_batch, BatchConfig, BatchResults, BatchSummary};
pub use runner::{run_game, verify_seed, GameSummary, PlayerSummary, RunConfig, RunnerError};
