//! Configuration bundle for the layout engine.
//!
//! All types implement [`serde::Deserialize`] with per-struct defaults, so a
//! partial configuration loaded from an external source fills the gaps with
//! the built-in values. The defaults describe a realistic 100x100mm board
//! and were tuned against the built-in footprint catalog.
//!
//! # Example
//!
//! ```
//! # use copperflow::config::EngineConfig;
//! let config = EngineConfig::default();
//! assert_eq!(config.board.width, 100.0);
//! assert_eq!(config.grid.tier_sizes.len(), 5);
//! ```

use serde::Deserialize;

use copperflow_core::footprint::{Catalog, Category};

use crate::error::ConfigError;

/// Top-level engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Board dimensions.
    pub board: BoardConfig,
    /// Density field parameters, including the base seed.
    pub noise: NoiseConfig,
    /// Adaptive grid parameters.
    pub grid: GridConfig,
    /// Per-category component counts and spacings.
    pub components: ComponentConfig,
    /// Net synthesis parameters.
    pub nets: NetConfig,
    /// Trace routing parameters.
    pub routing: RoutingConfig,
}

impl EngineConfig {
    /// Validates the configuration against a catalog, failing fast on
    /// anything that would make generation meaningless.
    pub fn validate(&self, catalog: &Catalog) -> Result<(), ConfigError> {
        if self.board.width <= 0.0 || self.board.height <= 0.0 {
            return Err(ConfigError::BoardDimensions {
                width: self.board.width,
                height: self.board.height,
            });
        }

        if self.noise.scale <= 0.0 {
            return Err(ConfigError::NoiseScale(self.noise.scale));
        }
        if self.noise.octaves == 0 {
            return Err(ConfigError::NoiseOctaves);
        }

        let tiers = &self.grid.tier_sizes;
        let descending = tiers.windows(2).all(|pair| pair[0] >= pair[1]);
        if tiers.is_empty() || !descending || tiers.iter().any(|&t| t <= 0.0) {
            return Err(ConfigError::TierSizes);
        }

        let fraction = self.board.edge_margin_fraction;
        if fraction <= 0.0 || fraction >= 0.5 {
            return Err(ConfigError::EdgeMarginFraction(fraction));
        }

        for (category, params) in [
            (Category::Large, &self.components.large),
            (Category::Medium, &self.components.medium),
            (Category::SmallMedium, &self.components.small_medium),
            (Category::Small, &self.components.small),
        ] {
            if params.count == 0 {
                continue;
            }
            if params.spacing <= 0.0 {
                return Err(ConfigError::Spacing {
                    category,
                    spacing: params.spacing,
                });
            }
            if catalog.for_category(category).is_empty() {
                return Err(ConfigError::EmptyCatalog { category });
            }
        }
        for (category, count) in [
            (Category::Connector, self.components.connectors.count),
            (Category::TestPoint, self.components.testpoints.count),
        ] {
            if count > 0 && catalog.for_category(category).is_empty() {
                return Err(ConfigError::EmptyCatalog { category });
            }
        }

        let probability = self.nets.fanout_probability;
        if !(0.0..=1.0).contains(&probability) {
            return Err(ConfigError::FanOutProbability(probability));
        }

        let widths = &self.routing.signal_track_widths;
        let weights = &self.routing.signal_width_weights;
        if widths.is_empty() || widths.len() != weights.len() {
            return Err(ConfigError::SignalTrackWidths);
        }

        Ok(())
    }
}

/// Board outline dimensions and the edge-margin band.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    /// Board width in millimeters.
    pub width: f32,
    /// Board height in millimeters.
    pub height: f32,
    /// Fraction of each board dimension reserved as the connector band
    /// along every edge.
    pub edge_margin_fraction: f32,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            width: 100.0,
            height: 100.0,
            edge_margin_fraction: 0.1,
        }
    }
}

/// Density field parameters.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct NoiseConfig {
    /// Zoom level of the noise; lower values zoom in.
    pub scale: f32,
    /// Number of fractal layers to sum.
    pub octaves: u32,
    /// Amplitude multiplier per octave.
    pub persistence: f32,
    /// Frequency multiplier per octave.
    pub lacunarity: f32,
    /// Strength of the radial center bias, 0 (none) to 1 (strong).
    pub vignette_strength: f32,
    /// Base seed; callers typically add a sample index for batch runs.
    pub seed: u64,
}

impl Default for NoiseConfig {
    fn default() -> Self {
        Self {
            scale: 343.8,
            octaves: 8,
            persistence: 0.2055,
            lacunarity: 3.276,
            vignette_strength: 0.882,
            seed: 114,
        }
    }
}

/// Adaptive grid parameters.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Discrete cell sizes in millimeters, ordered largest to smallest.
    pub tier_sizes: Vec<f32>,
    /// Gap carved between neighboring cells, per side.
    pub padding: f32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            tier_sizes: vec![24.4, 14.6, 13.5, 3.6, 1.5],
            padding: 0.3,
        }
    }
}

/// Count and candidate-point spacing for one ordinary category.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct CategoryParams {
    /// How many components of this category to attempt.
    pub count: usize,
    /// Spacing of the candidate sub-grid inside each cell, in millimeters.
    pub spacing: f32,
}

impl Default for CategoryParams {
    fn default() -> Self {
        Self {
            count: 0,
            spacing: 1.0,
        }
    }
}

/// Count for categories placed without a cell sub-grid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct CountParams {
    /// How many components of this category to attempt.
    pub count: usize,
}

/// Per-category component demands.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ComponentConfig {
    pub large: CategoryParams,
    pub medium: CategoryParams,
    pub small_medium: CategoryParams,
    pub small: CategoryParams,
    pub connectors: CountParams,
    pub testpoints: CountParams,
}

impl Default for ComponentConfig {
    fn default() -> Self {
        Self {
            large: CategoryParams {
                count: 1,
                spacing: 7.8,
            },
            medium: CategoryParams {
                count: 24,
                spacing: 2.1,
            },
            small_medium: CategoryParams {
                count: 89,
                spacing: 1.4,
            },
            small: CategoryParams {
                count: 186,
                spacing: 1.0,
            },
            connectors: CountParams { count: 10 },
            testpoints: CountParams { count: 15 },
        }
    }
}

/// Net synthesis parameters.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct NetConfig {
    /// Probability that a placement joins the power and ground fan-out.
    pub fanout_probability: f32,
    /// Upper bound on signal-net creation attempts.
    pub max_signal_nets: usize,
}

impl Default for NetConfig {
    fn default() -> Self {
        Self {
            fanout_probability: 0.4,
            max_signal_nets: 30,
        }
    }
}

/// Trace routing parameters.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RoutingConfig {
    /// Track width for the power net, in millimeters.
    pub power_track_width: f32,
    /// Track width for the ground net, in millimeters.
    pub ground_track_width: f32,
    /// Candidate widths for signal nets.
    pub signal_track_widths: Vec<f32>,
    /// Selection weights matching `signal_track_widths`.
    pub signal_width_weights: Vec<f32>,
    /// Whether to emit the ground pour polygon.
    pub ground_pour: bool,
    /// Inset of the pour outline from the board edge, in millimeters.
    pub pour_margin: f32,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            power_track_width: 0.5,
            ground_track_width: 0.5,
            signal_track_widths: vec![0.2, 0.25, 0.3],
            signal_width_weights: vec![0.5, 0.3, 0.2],
            ground_pour: true,
            pour_margin: 2.0,
        }
    }
}
