//! Engine orchestration: field → grid → placement → nets → routing.

use log::{debug, info};
use serde::Serialize;

use copperflow_core::board::{Net, Placement, PourPolygon, TrackSegment};
use copperflow_core::footprint::Catalog;
use copperflow_core::geometry::Size;

use crate::config::EngineConfig;
use crate::error::ConfigError;
use crate::field::NoiseField;
use crate::grid;
use crate::nets;
use crate::pack::{Packer, PlacementReport};
use crate::route::{Router, RoutingReport};
use crate::session::PlacementSession;

/// Everything one engine invocation produces.
///
/// The placements and tracks (plus the optional pour) are the records the
/// surrounding pipeline serializes; the nets are included so consumers and
/// tests can trace tracks back to the connectivity they implement, and the
/// reports carry the shortfall statistics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoardLayout {
    pub placements: Vec<Placement>,
    pub nets: Vec<Net>,
    pub tracks: Vec<TrackSegment>,
    pub pour: Option<PourPolygon>,
    pub placement_report: PlacementReport,
    pub routing_report: RoutingReport,
}

/// The procedural layout and routing engine.
///
/// Construction validates the configuration against the catalog and fails
/// fast on anything unusable; generation itself never fails. Difficult
/// boards come back sparser, with the difference recorded in the reports.
///
/// # Examples
///
/// ```
/// use copperflow::{Engine, config::EngineConfig};
///
/// let engine = Engine::with_default_catalog(EngineConfig::default())
///     .expect("default config must validate");
///
/// let layout = engine.generate_with_seed(7);
/// assert!(!layout.placements.is_empty());
/// ```
pub struct Engine {
    config: EngineConfig,
    catalog: Catalog,
}

impl Engine {
    /// Creates an engine after validating the configuration against the
    /// catalog.
    pub fn new(config: EngineConfig, catalog: Catalog) -> Result<Self, ConfigError> {
        config.validate(&catalog)?;
        Ok(Self { config, catalog })
    }

    /// Creates an engine backed by the built-in footprint catalog.
    pub fn with_default_catalog(config: EngineConfig) -> Result<Self, ConfigError> {
        Self::new(config, Catalog::default())
    }

    /// Returns the validated configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Returns the footprint catalog.
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Generates one board using the configuration's base seed.
    pub fn generate(&self) -> BoardLayout {
        self.generate_with_seed(self.config.noise.seed)
    }

    /// Generates one board with an explicit seed.
    ///
    /// Batch producers typically call this with `base_seed + sample_index`
    /// to get reproducible-but-distinct boards. Identical seed, config, and
    /// catalog produce an identical [`BoardLayout`].
    pub fn generate_with_seed(&self, seed: u64) -> BoardLayout {
        let board = &self.config.board;
        info!(seed = seed, width = board.width, height = board.height; "generating board layout");

        let field = NoiseField::generate(board.width, board.height, &self.config.noise, seed);
        let cells = grid::build(&field, &self.config.grid.tier_sizes, self.config.grid.padding);
        debug!(cells = cells.len(); "adaptive grid built");

        let mut session = PlacementSession::new(seed);

        let packer = Packer::new(&self.config, &self.catalog, &field, &cells);
        let (placements, placement_report) = packer.pack(&mut session);

        let nets = nets::synthesize(&placements, &self.config.nets, &mut session);

        let router = Router::new(
            &placements,
            &self.config.routing,
            Size::new(board.width, board.height),
        );
        let (tracks, pour, routing_report) = router.route(&nets, &mut session);

        info!(
            placements = placements.len(),
            nets = nets.len(),
            tracks = tracks.len();
            "board layout complete"
        );

        BoardLayout {
            placements,
            nets,
            tracks,
            pour,
            placement_report,
            routing_report,
        }
    }
}
