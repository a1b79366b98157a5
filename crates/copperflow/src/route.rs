//! Copper trace synthesis.
//!
//! Each net is routed by greedy fragment growth: starting from its first
//! pad, the closest (routed, unrouted) pad pair is connected until every
//! pad has joined, a Prim-style spanning construction rather than a linear
//! chain. The path between a pair is picked by distance band: short hops
//! are straight lines or doglegs, long hauls become jittered multi-segment
//! Manhattan walks. Everything lands on the front copper layer; the
//! optional ground pour is the only back-layer artifact.

use log::{debug, warn};
use rand::Rng;
use serde::Serialize;
use thiserror::Error;

use copperflow_core::board::{Layer, Net, NetClass, Placement, PourPolygon, TrackSegment};
use copperflow_core::geometry::{Bounds, Point, Size};

use crate::config::RoutingConfig;
use crate::nets::GROUND_NET;
use crate::session::PlacementSession;

/// Distance under which a pad pair is a "short hop".
const SHORT_HOP: f32 = 5.0;
/// Distance under which a pad pair is a "medium run".
const MEDIUM_RUN: f32 = 20.0;
/// Jitter applied to intermediate Manhattan waypoints, as a fraction of the
/// remaining delta.
const MANHATTAN_JITTER: f32 = 0.4;

/// A per-net routing failure. Other nets keep routing.
#[derive(Debug, Error)]
pub enum RouteError {
    #[error("net {net} references pad {placement}/{pin} outside the placement list")]
    PadOutOfRange {
        net: String,
        placement: usize,
        pin: u32,
    },
    #[error("net {net} produced a non-finite pad position")]
    PathologicalGeometry { net: String },
}

/// Counters summarizing one routing pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RoutingReport {
    pub nets_total: usize,
    pub nets_routed: usize,
    pub nets_failed: usize,
    pub power_nets: usize,
    pub ground_nets: usize,
    pub signal_nets: usize,
    pub tracks: usize,
}

/// Router for one engine invocation.
pub struct Router<'a> {
    placements: &'a [Placement],
    config: &'a RoutingConfig,
    board: Size,
}

impl<'a> Router<'a> {
    pub fn new(placements: &'a [Placement], config: &'a RoutingConfig, board: Size) -> Self {
        Self {
            placements,
            config,
            board,
        }
    }

    /// Routes every net, isolating per-net failures, and emits the optional
    /// ground pour.
    pub fn route(
        &self,
        nets: &[Net],
        session: &mut PlacementSession,
    ) -> (Vec<TrackSegment>, Option<PourPolygon>, RoutingReport) {
        let mut tracks = Vec::new();
        let mut report = RoutingReport {
            nets_total: nets.len(),
            ..RoutingReport::default()
        };

        for net in nets {
            match net.class() {
                NetClass::Power => report.power_nets += 1,
                NetClass::Ground => report.ground_nets += 1,
                NetClass::Signal => report.signal_nets += 1,
            }

            match self.route_net(net, session) {
                Ok(segments) => {
                    report.nets_routed += 1;
                    tracks.extend(segments);
                }
                Err(err) => {
                    report.nets_failed += 1;
                    warn!(net = net.name(), err:% = err; "failed to route net, skipping");
                }
            }
        }

        report.tracks = tracks.len();
        let pour = self.ground_pour();
        debug!(
            tracks = report.tracks,
            routed = report.nets_routed,
            failed = report.nets_failed;
            "routing pass complete"
        );

        (tracks, pour, report)
    }

    /// Routes one net into track segments.
    fn route_net(
        &self,
        net: &Net,
        session: &mut PlacementSession,
    ) -> Result<Vec<TrackSegment>, RouteError> {
        if net.pads().len() < 2 {
            return Ok(Vec::new());
        }

        let positions = self.pad_positions(net)?;
        let width = self.track_width(net.class(), session);

        let mut routed = vec![0usize];
        let mut unrouted: Vec<usize> = (1..positions.len()).collect();
        let mut segments = Vec::new();

        while !unrouted.is_empty() {
            // Closest unrouted pad to any routed pad joins next.
            let mut best = (f32::INFINITY, 0usize, 0usize);
            for &routed_index in &routed {
                for (slot, &unrouted_index) in unrouted.iter().enumerate() {
                    let dist = positions[routed_index].distance_to(positions[unrouted_index]);
                    if dist < best.0 {
                        best = (dist, routed_index, slot);
                    }
                }
            }

            let (distance, from, slot) = best;
            let to = unrouted.remove(slot);
            routed.push(to);

            let waypoints = self.pick_path(positions[from], positions[to], distance, session);
            for pair in waypoints.windows(2) {
                if pair[0] == pair[1] {
                    continue;
                }
                segments.push(TrackSegment {
                    start: pair[0],
                    end: pair[1],
                    width,
                    layer: Layer::FrontCu,
                    net: net.name().to_string(),
                });
            }
        }

        Ok(segments)
    }

    fn pad_positions(&self, net: &Net) -> Result<Vec<Point>, RouteError> {
        net.pads()
            .iter()
            .map(|pad| {
                let placement = self.placements.get(pad.placement).ok_or_else(|| {
                    RouteError::PadOutOfRange {
                        net: net.name().to_string(),
                        placement: pad.placement,
                        pin: pad.pin,
                    }
                })?;
                let position = placement.pad_position(pad.pin);
                if !position.is_finite() {
                    return Err(RouteError::PathologicalGeometry {
                        net: net.name().to_string(),
                    });
                }
                Ok(position)
            })
            .collect()
    }

    fn track_width(&self, class: NetClass, session: &mut PlacementSession) -> f32 {
        match class {
            NetClass::Power => self.config.power_track_width,
            NetClass::Ground => self.config.ground_track_width,
            NetClass::Signal => {
                let widths = &self.config.signal_track_widths;
                let weights = &self.config.signal_width_weights;
                let total: f32 = weights.iter().sum();
                let mut draw = session.rng.random::<f32>() * total;
                for (&width, &weight) in widths.iter().zip(weights) {
                    if draw < weight {
                        return width;
                    }
                    draw -= weight;
                }
                *widths.last().expect("validated non-empty")
            }
        }
    }

    /// Chooses a path style for one pad pair by distance band.
    fn pick_path(
        &self,
        start: Point,
        end: Point,
        distance: f32,
        session: &mut PlacementSession,
    ) -> Vec<Point> {
        let draw = session.rng.random::<f32>();
        if distance < SHORT_HOP {
            if draw < 0.5 {
                vec![start, end]
            } else {
                dogleg(start, end, session)
            }
        } else if distance < MEDIUM_RUN {
            if draw < 0.3 {
                vec![start, end]
            } else if draw < 0.6 {
                dogleg(start, end, session)
            } else {
                let segments = session.rng.random_range(2..4);
                manhattan(start, end, segments, session)
            }
        } else if draw < 0.4 {
            dogleg(start, end, session)
        } else {
            let segments = session.rng.random_range(3..6);
            manhattan(start, end, segments, session)
        }
    }

    /// The optional ground pour: a rectangle inset from the board edge on
    /// the back copper layer, left unfilled for the downstream CAD engine.
    fn ground_pour(&self) -> Option<PourPolygon> {
        if !self.config.ground_pour {
            return None;
        }
        let margin = self.config.pour_margin;
        if 2.0 * margin >= self.board.width() || 2.0 * margin >= self.board.height() {
            warn!(margin = margin; "board too small for ground pour, skipping");
            return None;
        }
        Some(PourPolygon {
            bounds: Bounds::from_top_left(
                Point::new(margin, margin),
                Size::new(
                    self.board.width() - 2.0 * margin,
                    self.board.height() - 2.0 * margin,
                ),
            ),
            net: GROUND_NET.to_string(),
            layer: Layer::BackCu,
            filled: false,
        })
    }
}

/// Two-segment path with one 90-degree bend, orientation chosen at random.
fn dogleg(start: Point, end: Point, session: &mut PlacementSession) -> Vec<Point> {
    let horizontal_first = session.rng.random_bool(0.5);
    let mid = if horizontal_first {
        Point::new(end.x(), start.y())
    } else {
        Point::new(start.x(), end.y())
    };
    vec![start, mid, end]
}

/// Multi-segment Manhattan path alternating horizontal and vertical
/// advances toward the target, with random jitter per intermediate
/// waypoint. Always terminates exactly on `end`.
fn manhattan(start: Point, end: Point, segments: u32, session: &mut PlacementSession) -> Vec<Point> {
    let mut waypoints = vec![start];
    let mut current = start;
    let mut horizontal = session.rng.random_bool(0.5);

    for i in 0..segments.saturating_sub(1) {
        let progress = (i + 1) as f32 / segments as f32;
        if horizontal {
            let jitter = (end.x() - start.x())
                * MANHATTAN_JITTER
                * (session.rng.random::<f32>() - 0.5);
            let target = start.x() + (end.x() - start.x()) * progress + jitter;
            let clamped = target.clamp(start.x().min(end.x()), start.x().max(end.x()));
            current = Point::new(clamped, current.y());
        } else {
            let jitter = (end.y() - start.y())
                * MANHATTAN_JITTER
                * (session.rng.random::<f32>() - 0.5);
            let target = start.y() + (end.y() - start.y()) * progress + jitter;
            let clamped = target.clamp(start.y().min(end.y()), start.y().max(end.y()));
            current = Point::new(current.x(), clamped);
        }
        waypoints.push(current);
        horizontal = !horizontal;
    }

    waypoints.push(end);
    waypoints
}

#[cfg(test)]
mod tests {
    use super::*;

    use copperflow_core::board::Rotation;
    use copperflow_core::footprint::{Category, FootprintSpec};

    fn placement(x: f32, y: f32) -> Placement {
        Placement::new(
            Point::new(x, y),
            Rotation::R0,
            Category::Small,
            FootprintSpec::new("resistor_0402", 1.0, 0.5, 2),
        )
    }

    fn signal_net(pads: &[(usize, u32)]) -> Net {
        let mut net = Net::new("NET_1", NetClass::Signal);
        for &(placement, pin) in pads {
            net.add_pad(placement, pin);
        }
        net
    }

    #[test]
    fn short_hops_never_grow_past_a_dogleg() {
        // Pads roughly 2.8mm apart and not axis-aligned.
        let placements = vec![placement(10.0, 10.0), placement(12.0, 12.0)];
        let net = signal_net(&[(0, 2), (1, 2)]);
        let config = RoutingConfig::default();
        let router = Router::new(&placements, &config, Size::new(100.0, 100.0));

        for seed in 0..32 {
            let mut session = PlacementSession::new(seed);
            let tracks = router.route_net(&net, &mut session).unwrap();
            assert!(
                (1..=2).contains(&tracks.len()),
                "seed {seed} produced {} segments",
                tracks.len()
            );
            if tracks.len() == 2 {
                assert!(tracks.iter().all(TrackSegment::is_axis_aligned));
            }
        }
    }

    #[test]
    fn path_endpoints_are_the_pad_positions() {
        let placements = vec![placement(10.0, 10.0), placement(60.0, 45.0)];
        let net = signal_net(&[(0, 2), (1, 3)]);
        let config = RoutingConfig::default();
        let router = Router::new(&placements, &config, Size::new(100.0, 100.0));

        let start = placements[0].pad_position(2);
        let end = placements[1].pad_position(3);

        for seed in 0..16 {
            let mut session = PlacementSession::new(seed);
            let tracks = router.route_net(&net, &mut session).unwrap();
            assert!(!tracks.is_empty());
            assert_eq!(tracks.first().unwrap().start, start);
            assert_eq!(tracks.last().unwrap().end, end);
            // Consecutive segments chain without gaps.
            for pair in tracks.windows(2) {
                assert_eq!(pair[0].end, pair[1].start);
            }
        }
    }

    #[test]
    fn spanning_growth_touches_every_pad() {
        let placements = vec![
            placement(20.0, 20.0),
            placement(70.0, 25.0),
            placement(40.0, 70.0),
            placement(75.0, 75.0),
        ];
        let net = signal_net(&[(0, 2), (1, 2), (2, 2), (3, 2)]);
        let config = RoutingConfig::default();
        let router = Router::new(&placements, &config, Size::new(100.0, 100.0));
        let mut session = PlacementSession::new(4);
        let tracks = router.route_net(&net, &mut session).unwrap();

        for pad in net.pads() {
            let pos = placements[pad.placement].pad_position(pad.pin);
            let touched = tracks.iter().any(|t| t.start == pos || t.end == pos);
            assert!(touched, "pad {pad:?} untouched by any track");
        }
    }

    #[test]
    fn manhattan_paths_are_axis_aligned_and_terminate() {
        let start = Point::new(5.0, 5.0);
        let end = Point::new(55.0, 40.0);
        for seed in 0..16 {
            let mut session = PlacementSession::new(seed);
            let waypoints = manhattan(start, end, 4, &mut session);
            assert_eq!(waypoints.first(), Some(&start));
            assert_eq!(waypoints.last(), Some(&end));
            for pair in waypoints.windows(2) {
                let dx = (pair[0].x() - pair[1].x()).abs();
                let dy = (pair[0].y() - pair[1].y()).abs();
                // Interior legs are axis-aligned; the final leg may be
                // diagonal only if both axes still had remaining delta.
                assert!(dx == 0.0 || dy == 0.0 || pair[1] == end);
            }
        }
    }

    #[test]
    fn dogleg_bends_once() {
        let mut session = PlacementSession::new(3);
        let waypoints = dogleg(Point::new(0.0, 0.0), Point::new(10.0, 8.0), &mut session);
        assert_eq!(waypoints.len(), 3);
        let mid = waypoints[1];
        assert!(mid == Point::new(10.0, 0.0) || mid == Point::new(0.0, 8.0));
    }

    #[test]
    fn track_widths_follow_net_class() {
        let placements = vec![placement(10.0, 10.0), placement(40.0, 40.0)];
        let config = RoutingConfig::default();
        let router = Router::new(&placements, &config, Size::new(100.0, 100.0));

        let mut power = Net::new("VCC", NetClass::Power);
        power.add_pad(0, 0);
        power.add_pad(1, 0);
        let mut session = PlacementSession::new(8);
        let tracks = router.route_net(&power, &mut session).unwrap();
        assert!(tracks.iter().all(|t| t.width == 0.5));

        let signal = signal_net(&[(0, 2), (1, 2)]);
        let tracks = router.route_net(&signal, &mut session).unwrap();
        assert!(tracks.iter().all(|t| [0.2, 0.25, 0.3].contains(&t.width)));
    }

    #[test]
    fn all_tracks_use_the_front_layer() {
        let placements = vec![placement(10.0, 10.0), placement(80.0, 70.0)];
        let net = signal_net(&[(0, 2), (1, 2)]);
        let config = RoutingConfig::default();
        let router = Router::new(&placements, &config, Size::new(100.0, 100.0));
        let mut session = PlacementSession::new(12);
        let (tracks, pour, _) = router.route(std::slice::from_ref(&net), &mut session);
        assert!(tracks.iter().all(|t| t.layer == Layer::FrontCu));
        assert_eq!(pour.unwrap().layer, Layer::BackCu);
    }

    #[test]
    fn ground_pour_is_inset_and_unfilled() {
        let config = RoutingConfig::default();
        let router = Router::new(&[], &config, Size::new(100.0, 80.0));
        let mut session = PlacementSession::new(1);
        let (_, pour, _) = router.route(&[], &mut session);
        let pour = pour.unwrap();
        assert_eq!(pour.net, GROUND_NET);
        assert!(!pour.filled);
        assert_eq!(pour.bounds.min_x(), 2.0);
        assert_eq!(pour.bounds.max_x(), 98.0);
        assert_eq!(pour.bounds.max_y(), 78.0);

        let disabled = RoutingConfig {
            ground_pour: false,
            ..RoutingConfig::default()
        };
        let router = Router::new(&[], &disabled, Size::new(100.0, 80.0));
        let (_, pour, _) = router.route(&[], &mut session);
        assert!(pour.is_none());
    }

    #[test]
    fn bad_pad_reference_fails_only_that_net(){
        let placements = vec![placement(10.0, 10.0), placement(40.0, 40.0)];
        let bad = signal_net(&[(0, 2), (9, 2)]);
        let good = signal_net(&[(0, 3), (1, 3)]);
        let config = RoutingConfig::default();
        let router = Router::new(&placements, &config, Size::new(100.0, 100.0));
        let mut session = PlacementSession::new(2);
        let (tracks, _, report) = router.route(&[bad, good], &mut session);

        assert_eq!(report.nets_failed, 1);
        assert_eq!(report.nets_routed, 1);
        assert!(!tracks.is_empty());
        assert!(tracks.iter().all(|t| t.net == "NET_1"));
    }

    #[test]
    fn routing_is_deterministic() {
        let placements = vec![
            placement(20.0, 20.0),
            placement(70.0, 25.0),
            placement(40.0, 70.0),
        ];
        let nets = vec![signal_net(&[(0, 2), (1, 2), (2, 2)])];
        let config = RoutingConfig::default();
        let router = Router::new(&placements, &config, Size::new(100.0, 100.0));

        let mut a = PlacementSession::new(77);
        let mut b = PlacementSession::new(77);
        assert_eq!(router.route(&nets, &mut a), router.route(&nets, &mut b));
    }
}
