//! Error types for engine construction.
//!
//! Configuration problems are the only fatal errors the engine produces:
//! they are detected up front by [`crate::Engine::new`] before any placement
//! work starts. Everything that can go wrong during generation (a component
//! that finds no spot, a net that cannot be routed) degrades gracefully and
//! is surfaced through the report structs instead.

use thiserror::Error;

use copperflow_core::footprint::Category;

/// A fatal configuration error, reported before generation begins.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("board dimensions must be positive, got {width}mm x {height}mm")]
    BoardDimensions { width: f32, height: f32 },

    #[error("spacing for {category} components must be positive, got {spacing}mm")]
    Spacing { category: Category, spacing: f32 },

    #[error("footprint catalog has no entries for requested category \"{category}\"")]
    EmptyCatalog { category: Category },

    #[error("grid tier sizes must be a non-empty descending list of positive values")]
    TierSizes,

    #[error("noise scale must be positive, got {0}")]
    NoiseScale(f32),

    #[error("noise octaves must be at least 1")]
    NoiseOctaves,

    #[error("edge margin fraction must lie in (0, 0.5), got {0}")]
    EdgeMarginFraction(f32),

    #[error("fan-out probability must lie in [0, 1], got {0}")]
    FanOutProbability(f32),

    #[error("signal track widths and weights must be non-empty lists of equal length")]
    SignalTrackWidths,
}
