//! Greedy randomized component placement.
//!
//! Components are placed per category, best-effort: each one draws a random
//! footprint, tries a bounded number of shuffled candidate cells and
//! candidate points, and is silently dropped if nothing sticks. Shortfalls
//! are reported through [`PlacementReport`], never as errors: a crowded
//! configuration produces a sparser board, not a failure.
//!
//! Connectors and test points use their own placement routines: connectors
//! go to uniformly random spots inside the edge band, test points cluster
//! around existing components at a random polar offset.

use log::{debug, warn};
use rand::Rng;
use rand::seq::SliceRandom;
use serde::Serialize;

use copperflow_core::board::{Placement, Rotation};
use copperflow_core::footprint::{Catalog, Category, FootprintSpec};
use copperflow_core::geometry::{Bounds, Point, Size};

use crate::config::EngineConfig;
use crate::field::NoiseField;
use crate::grid::{self, GridCell};
use crate::session::PlacementSession;

/// Candidate cells examined per component after shuffling.
const MAX_CELL_ATTEMPTS: usize = 50;
/// Placement attempts per connector.
const MAX_CONNECTOR_ATTEMPTS: usize = 100;
/// Placement attempts per test point.
const MAX_TESTPOINT_ATTEMPTS: usize = 50;
/// Fraction of the cell's reference density a candidate point must reach.
const DENSITY_THRESHOLD_FACTOR: f32 = 0.8;
/// Gap between a large package edge and its decoupling companions.
const COMPANION_GAP: f32 = 3.0;
/// Radial offset range for test points around their anchor, in millimeters.
const TESTPOINT_RADIUS: (f32, f32) = (5.0, 15.0);
/// Share of the small-component budget aimed at the larger small-cell band.
const SMALL_UPPER_BAND_SHARE: f32 = 0.4;

/// Requested vs. achieved count for one category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CategoryTally {
    pub requested: usize,
    pub placed: usize,
}

impl CategoryTally {
    /// Components that were requested but found no spot.
    pub fn shortfall(&self) -> usize {
        self.requested.saturating_sub(self.placed)
    }
}

/// Aggregated placement statistics for one engine invocation.
///
/// This is the user-visible signal for crowded configurations: per-item
/// placement failures never raise errors, they show up here as shortfall.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PlacementReport {
    pub large: CategoryTally,
    pub medium: CategoryTally,
    pub small_medium: CategoryTally,
    pub small: CategoryTally,
    pub connectors: CategoryTally,
    pub testpoints: CategoryTally,
    /// Decoupling companions placed next to large packages, on top of the
    /// per-category requests.
    pub companions: usize,
}

impl PlacementReport {
    fn tallies(&self) -> [&CategoryTally; 6] {
        [
            &self.large,
            &self.medium,
            &self.small_medium,
            &self.small,
            &self.connectors,
            &self.testpoints,
        ]
    }

    /// Total components requested across all categories.
    pub fn total_requested(&self) -> usize {
        self.tallies().iter().map(|t| t.requested).sum()
    }

    /// Total components placed, companions included.
    pub fn total_placed(&self) -> usize {
        self.tallies().iter().map(|t| t.placed).sum::<usize>() + self.companions
    }

    /// Total requested-but-dropped components.
    pub fn total_shortfall(&self) -> usize {
        self.tallies().iter().map(|t| t.shortfall()).sum()
    }
}

/// Greedy placer for one engine invocation.
pub struct Packer<'a> {
    config: &'a EngineConfig,
    catalog: &'a Catalog,
    field: &'a NoiseField,
    cells: &'a [GridCell],
    /// Cell indices per width band, largest band first.
    bands: Vec<Vec<usize>>,
    board: Size,
    interior: Bounds,
    margin_x: f32,
    margin_y: f32,
}

impl<'a> Packer<'a> {
    pub fn new(
        config: &'a EngineConfig,
        catalog: &'a Catalog,
        field: &'a NoiseField,
        cells: &'a [GridCell],
    ) -> Self {
        let tiers = &config.grid.tier_sizes;
        let mut bands = vec![Vec::new(); tiers.len()];
        for (i, cell) in cells.iter().enumerate() {
            bands[grid::band_index(cell.bounds.width(), tiers)].push(i);
        }

        let board = Size::new(config.board.width, config.board.height);
        let margin_x = board.width() * config.board.edge_margin_fraction;
        let margin_y = board.height() * config.board.edge_margin_fraction;
        let interior = Bounds::from_top_left(
            Point::new(margin_x, margin_y),
            Size::new(
                board.width() - 2.0 * margin_x,
                board.height() - 2.0 * margin_y,
            ),
        );

        Self {
            config,
            catalog,
            field,
            cells,
            bands,
            board,
            interior,
            margin_x,
            margin_y,
        }
    }

    /// Places all requested components and returns them in placement order
    /// together with the shortfall report.
    pub fn pack(&self, session: &mut PlacementSession) -> (Vec<Placement>, PlacementReport) {
        let mut placements = Vec::new();
        let mut report = PlacementReport::default();
        let components = &self.config.components;

        report.large.requested = components.large.count;
        for _ in 0..components.large.count {
            let Some(placement) = self.try_place(
                session,
                &placements,
                self.catalog.for_category(Category::Large),
                0,
                components.large.spacing,
                Category::Large,
                false,
            ) else {
                continue;
            };
            let anchor = placement.clone();
            placements.push(placement);
            report.large.placed += 1;
            report.companions += self.place_companions(session, &mut placements, &anchor);
        }

        // The small budget splits across the two small-cell bands.
        let small_total = components.small.count;
        let small_upper = (small_total as f32 * SMALL_UPPER_BAND_SHARE) as usize;
        report.small.requested = small_total;
        for _ in 0..small_upper {
            if let Some(placement) = self.try_place(
                session,
                &placements,
                self.catalog.for_category(Category::Small),
                1,
                components.small.spacing,
                Category::Small,
                true,
            ) {
                placements.push(placement);
                report.small.placed += 1;
            }
        }

        report.medium.requested = components.medium.count;
        for _ in 0..components.medium.count {
            if let Some(placement) = self.try_place(
                session,
                &placements,
                self.catalog.for_category(Category::Medium),
                2,
                components.medium.spacing,
                Category::Medium,
                true,
            ) {
                placements.push(placement);
                report.medium.placed += 1;
            }
        }

        report.small_medium.requested = components.small_medium.count;
        for _ in 0..components.small_medium.count {
            if let Some(placement) = self.try_place(
                session,
                &placements,
                self.catalog.for_category(Category::SmallMedium),
                3,
                components.small_medium.spacing,
                Category::SmallMedium,
                true,
            ) {
                placements.push(placement);
                report.small_medium.placed += 1;
            }
        }

        for _ in 0..small_total.saturating_sub(small_upper) {
            if let Some(placement) = self.try_place(
                session,
                &placements,
                self.catalog.for_category(Category::Small),
                4,
                components.small.spacing,
                Category::Small,
                true,
            ) {
                placements.push(placement);
                report.small.placed += 1;
            }
        }

        report.connectors.requested = components.connectors.count;
        for _ in 0..components.connectors.count {
            if let Some(connector) = self.place_connector(session, &placements) {
                placements.push(connector);
                report.connectors.placed += 1;
            }
        }

        report.testpoints.requested = components.testpoints.count;
        for _ in 0..components.testpoints.count {
            if let Some(testpoint) = self.place_testpoint(session, &placements) {
                placements.push(testpoint);
                report.testpoints.placed += 1;
            }
        }

        debug!(
            placed = placements.len(),
            companions = report.companions;
            "placement pass complete"
        );
        if report.total_shortfall() > 0 {
            warn!(
                requested = report.total_requested(),
                shortfall = report.total_shortfall();
                "placement shortfall"
            );
        }

        (placements, report)
    }

    /// One placement attempt: random footprint, shuffled candidate cells,
    /// shuffled candidate points. Returns the accepted placement or `None`
    /// once the attempt budget runs out; the caller decides what appending
    /// means.
    fn try_place(
        &self,
        session: &mut PlacementSession,
        placed: &[Placement],
        footprints: &[FootprintSpec],
        band: usize,
        spacing: f32,
        category: Category,
        allow_rotation: bool,
    ) -> Option<Placement> {
        if footprints.is_empty() || self.cells.is_empty() {
            return None;
        }

        let spec = footprints[session.rng.random_range(0..footprints.len())].clone();
        let rotation = if allow_rotation && !spec.size().is_square() && session.rng.random_bool(0.5)
        {
            Rotation::ALL[session.rng.random_range(0..4)]
        } else {
            Rotation::R0
        };

        let band = band.min(self.bands.len() - 1);
        let mut pool = if self.bands[band].is_empty() {
            (0..self.cells.len()).collect::<Vec<_>>()
        } else {
            self.bands[band].clone()
        };
        pool.shuffle(&mut session.rng);
        pool.truncate(MAX_CELL_ATTEMPTS);

        for cell_index in pool {
            let cell = &self.cells[cell_index];
            let mut points = candidate_points(cell.bounds, spacing);
            points.shuffle(&mut session.rng);

            for point in points {
                if session.is_claimed(point) {
                    continue;
                }
                let placement = Placement::new(point, rotation, category, spec.clone());
                let bounds = placement.bounds();
                if !self.interior.contains(bounds) {
                    continue;
                }
                if self.field.sample(point.x(), point.y())
                    < cell.density * DENSITY_THRESHOLD_FACTOR
                {
                    continue;
                }
                if collides(bounds.inflate(placement.clearance()), placed) {
                    continue;
                }

                session.claim(point);
                return Some(placement);
            }
        }

        None
    }

    /// Attempts 2-4 decoupling companions at fixed radial offsets around a
    /// freshly placed large package. Offsets that leave the interior zone
    /// or collide (other companions included) are skipped.
    fn place_companions(
        &self,
        session: &mut PlacementSession,
        placements: &mut Vec<Placement>,
        anchor: &Placement,
    ) -> usize {
        let Some(spec) = self.catalog.decoupling_companion() else {
            return 0;
        };
        let spec = spec.clone();

        let offset = anchor.rotated_size().max_dimension() / 2.0 + COMPANION_GAP;
        let offsets = [
            (offset, 0.0),
            (-offset, 0.0),
            (0.0, offset),
            (0.0, -offset),
        ];
        let count = session.rng.random_range(2..=4);

        let mut added = 0;
        for &(dx, dy) in offsets.iter().take(count) {
            let center = anchor.position().offset(dx, dy);
            let companion = Placement::new(center, Rotation::R0, Category::Small, spec.clone());
            let bounds = companion.bounds();
            if !self.interior.contains(bounds) {
                continue;
            }
            if collides(bounds.inflate(companion.clearance()), placements) {
                continue;
            }
            session.claim(center);
            placements.push(companion);
            added += 1;
        }
        added
    }

    /// Attempts one connector: random footprint, random rotation, random
    /// edge, uniform position along that edge at half the band depth.
    fn place_connector(
        &self,
        session: &mut PlacementSession,
        placed: &[Placement],
    ) -> Option<Placement> {
        let footprints = self.catalog.for_category(Category::Connector);
        if footprints.is_empty() {
            return None;
        }

        let width = self.board.width();
        let height = self.board.height();

        for _ in 0..MAX_CONNECTOR_ATTEMPTS {
            let spec = footprints[session.rng.random_range(0..footprints.len())].clone();
            let rotation = Rotation::ALL[session.rng.random_range(0..4)];
            let size = if rotation.swaps_axes() {
                spec.size().swapped()
            } else {
                spec.size()
            };

            // Along-edge travel keeps the connector clear of the corners.
            let edge = session.rng.random_range(0..4u8);
            let position = if edge < 2 {
                let low = self.margin_y + size.height() / 2.0;
                let high = height - self.margin_y - size.height() / 2.0;
                if low >= high {
                    continue;
                }
                let x = if edge == 0 {
                    self.margin_x / 2.0
                } else {
                    width - self.margin_x / 2.0
                };
                Point::new(x, session.rng.random_range(low..high))
            } else {
                let low = self.margin_x + size.width() / 2.0;
                let high = width - self.margin_x - size.width() / 2.0;
                if low >= high {
                    continue;
                }
                let y = if edge == 2 {
                    self.margin_y / 2.0
                } else {
                    height - self.margin_y / 2.0
                };
                Point::new(session.rng.random_range(low..high), y)
            };

            let connector = Placement::new(position, rotation, Category::Connector, spec);
            let bounds = connector.bounds();
            if !self.in_edge_band(bounds) {
                continue;
            }
            if collides(bounds.inflate(connector.clearance()), placed) {
                continue;
            }
            return Some(connector);
        }

        None
    }

    /// Attempts one test point near an existing component.
    ///
    /// Anchors prefer non-connector placements; with nothing placed yet the
    /// position falls back to a uniform interior draw. The candidate is
    /// clamped into the interior zone before the collision check.
    fn place_testpoint(
        &self,
        session: &mut PlacementSession,
        placed: &[Placement],
    ) -> Option<Placement> {
        let footprints = self.catalog.for_category(Category::TestPoint);
        if footprints.is_empty() {
            return None;
        }

        for _ in 0..MAX_TESTPOINT_ATTEMPTS {
            let spec = footprints[session.rng.random_range(0..footprints.len())].clone();
            let half_w = spec.size().width() / 2.0;
            let half_h = spec.size().height() / 2.0;

            let low_x = self.interior.min_x() + half_w;
            let high_x = self.interior.max_x() - half_w;
            let low_y = self.interior.min_y() + half_h;
            let high_y = self.interior.max_y() - half_h;
            if low_x > high_x || low_y > high_y {
                continue;
            }

            let raw = if placed.is_empty() {
                if low_x == high_x || low_y == high_y {
                    continue;
                }
                Point::new(
                    session.rng.random_range(low_x..high_x),
                    session.rng.random_range(low_y..high_y),
                )
            } else {
                let non_connectors: Vec<&Placement> = placed
                    .iter()
                    .filter(|p| p.category() != Category::Connector)
                    .collect();
                let anchor = if non_connectors.is_empty() {
                    &placed[session.rng.random_range(0..placed.len())]
                } else {
                    non_connectors[session.rng.random_range(0..non_connectors.len())]
                };
                let dist = session
                    .rng
                    .random_range(TESTPOINT_RADIUS.0..TESTPOINT_RADIUS.1);
                let angle = session.rng.random_range(0.0..std::f32::consts::TAU);
                anchor
                    .position()
                    .offset(dist * angle.cos(), dist * angle.sin())
            };

            let position = Point::new(raw.x().clamp(low_x, high_x), raw.y().clamp(low_y, high_y));
            let testpoint = Placement::new(position, Rotation::R0, Category::TestPoint, spec);
            let bounds = testpoint.bounds();
            if !self.interior.contains(bounds) {
                continue;
            }
            if collides(bounds.inflate(testpoint.clearance()), placed) {
                continue;
            }
            return Some(testpoint);
        }

        None
    }

    fn in_edge_band(&self, bounds: Bounds) -> bool {
        let board = Bounds::from_top_left(Point::new(0.0, 0.0), self.board);
        board.contains(bounds)
            && (bounds.max_x() <= self.margin_x
                || bounds.min_x() >= self.board.width() - self.margin_x
                || bounds.max_y() <= self.margin_y
                || bounds.min_y() >= self.board.height() - self.margin_y)
    }
}

/// Evenly spaced candidate points inside a cell, centered by distributing
/// the remainder of the division into the outer margins.
fn candidate_points(cell: Bounds, spacing: f32) -> Vec<Point> {
    let count_x = ((cell.width() / spacing) as usize).max(1);
    let count_y = ((cell.height() / spacing) as usize).max(1);
    let step_x = cell.width() / count_x as f32;
    let step_y = cell.height() / count_y as f32;

    let mut points = Vec::with_capacity(count_x * count_y);
    for i in 0..count_x {
        for j in 0..count_y {
            points.push(Point::new(
                cell.min_x() + step_x * (i as f32 + 0.5),
                cell.min_y() + step_y * (j as f32 + 0.5),
            ));
        }
    }
    points
}

fn collides(inflated: Bounds, placed: &[Placement]) -> bool {
    placed.iter().any(|p| inflated.intersects(p.bounds()))
}

#[cfg(test)]
mod tests {
    use super::*;

    use copperflow_core::footprint::FootprintSpec;

    use crate::config::EngineConfig;
    use crate::field::NoiseField;

    fn small_config() -> EngineConfig {
        let mut config = EngineConfig::default();
        config.board.width = 60.0;
        config.board.height = 60.0;
        config.components.large.count = 1;
        config.components.medium.count = 4;
        config.components.small_medium.count = 6;
        config.components.small.count = 10;
        config.components.connectors.count = 3;
        config.components.testpoints.count = 4;
        config
    }

    fn run_pack(config: &EngineConfig, catalog: &Catalog, seed: u64) -> (Vec<Placement>, PlacementReport) {
        let field = NoiseField::generate(config.board.width, config.board.height, &config.noise, seed);
        let cells = grid::build(&field, &config.grid.tier_sizes, config.grid.padding);
        let packer = Packer::new(config, catalog, &field, &cells);
        let mut session = PlacementSession::new(seed);
        packer.pack(&mut session)
    }

    #[test]
    fn candidate_points_are_centered() {
        let cell = Bounds::from_top_left(Point::new(10.0, 10.0), Size::new(4.0, 2.0));
        let points = candidate_points(cell, 2.0);
        assert_eq!(points.len(), 2);
        assert_eq!(points[0], Point::new(11.0, 11.0));
        assert_eq!(points[1], Point::new(13.0, 11.0));

        // Spacing wider than the cell still yields the single center point.
        let single = candidate_points(cell, 50.0);
        assert_eq!(single, vec![cell.center()]);
    }

    #[test]
    fn zone_rules_hold_for_every_placement() {
        let config = small_config();
        let catalog = Catalog::default();
        let (placements, _) = run_pack(&config, &catalog, 42);
        assert!(!placements.is_empty());

        let margin = 6.0; // 10% of 60mm
        let interior = Bounds::from_top_left(
            Point::new(margin, margin),
            Size::new(60.0 - 2.0 * margin, 60.0 - 2.0 * margin),
        );
        for placement in &placements {
            match placement.category() {
                Category::Connector => {
                    assert!(
                        !interior.intersects(placement.bounds()),
                        "connector {placement:?} left the edge band"
                    );
                }
                _ => {
                    assert!(
                        interior.contains(placement.bounds()),
                        "{placement:?} left the interior zone"
                    );
                }
            }
        }
    }

    #[test]
    fn clearance_holds_against_earlier_placements() {
        let config = small_config();
        let catalog = Catalog::default();
        let (placements, _) = run_pack(&config, &catalog, 7);

        for (later_index, later) in placements.iter().enumerate() {
            let inflated = later.bounds().inflate(later.clearance());
            for earlier in &placements[..later_index] {
                assert!(
                    !inflated.intersects(earlier.bounds()),
                    "{later:?} violates clearance against {earlier:?}"
                );
            }
        }
    }

    #[test]
    fn overfull_board_reports_shortfall_without_failing() {
        let mut config = small_config();
        config.board.width = 10.0;
        config.board.height = 10.0;
        config.components.medium.count = 50;
        config.components.small.count = 0;
        config.components.small_medium.count = 0;
        config.components.large.count = 0;
        config.components.connectors.count = 0;
        config.components.testpoints.count = 0;

        let (placements, report) = run_pack(&config, &Catalog::default(), 1);
        assert!(placements.len() < 50);
        assert_eq!(report.medium.requested, 50);
        assert_eq!(report.medium.placed, placements.len());
        assert_eq!(report.total_shortfall(), 50 - placements.len());
    }

    #[test]
    fn companions_require_a_small_catalog_entry() {
        let mut config = small_config();
        config.components.medium.count = 0;
        config.components.small_medium.count = 0;
        config.components.small.count = 0;
        config.components.connectors.count = 0;
        config.components.testpoints.count = 0;

        let mut catalog = Catalog::empty();
        catalog.large.push(FootprintSpec::new("qfp100", 14.0, 14.0, 100));

        let (placements, report) = run_pack(&config, &catalog, 3);
        assert_eq!(report.companions, 0);
        assert!(placements.iter().all(|p| p.category() == Category::Large));
    }

    #[test]
    fn packing_is_deterministic() {
        let config = small_config();
        let catalog = Catalog::default();
        let (a, report_a) = run_pack(&config, &catalog, 42);
        let (b, report_b) = run_pack(&config, &catalog, 42);
        assert_eq!(a, b);
        assert_eq!(report_a, report_b);
    }
}
