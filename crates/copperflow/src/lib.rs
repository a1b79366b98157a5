//! Copperflow - a procedural placement and routing engine for synthetic
//! circuit boards.
//!
//! The engine turns a configuration bundle and a footprint catalog into a
//! plausible board: a coherent-noise density field decides where the action
//! is, an adaptive grid partitions the board accordingly, a greedy packer
//! drops footprints into the grid under collision and zone constraints,
//! and synthetic nets are routed into copper trace geometry.
//!
//! The engine is pure in-memory computation: no files, no subprocesses,
//! no scene graphs. Its outputs ([`BoardLayout`]) are plain records handed
//! to external collaborators for serialization and rendering.
//!
//! # Pipeline
//!
//! ```text
//! NoiseField → AdaptiveGrid → Packer → NetSynthesizer → Router
//!                              │                         │
//!                              └── placements            └── tracks, pour
//! ```
//!
//! # Example
//!
//! ```
//! use copperflow::{Engine, config::EngineConfig};
//!
//! let mut config = EngineConfig::default();
//! config.board.width = 80.0;
//! config.board.height = 80.0;
//!
//! let engine = Engine::with_default_catalog(config).expect("valid config");
//!
//! // One seed per sample: identical seeds reproduce identical boards.
//! let layout = engine.generate_with_seed(42);
//! assert_eq!(layout, engine.generate_with_seed(42));
//! ```

pub mod config;
pub mod field;
pub mod grid;
pub mod nets;
pub mod pack;
pub mod route;
pub mod session;

mod engine;
mod error;

pub use copperflow_core::{board, footprint, geometry};

pub use engine::{BoardLayout, Engine};
pub use error::ConfigError;
