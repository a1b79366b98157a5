//! Synthetic net generation.
//!
//! Nets here are plausible rather than electrically meaningful: a power and
//! a ground net fan out to a random subset of placements, and a bounded
//! number of signal nets pair random source pads with one of their nearest
//! neighbors. Pin 0 is reserved for power, pin 1 for ground; signal nets
//! draw from pins 2 and up. No `(placement, pin)` pair ever appears in two
//! nets.

use std::collections::HashSet;

use log::{debug, warn};
use rand::Rng;

use copperflow_core::board::{Net, NetClass, Placement};

use crate::config::NetConfig;
use crate::session::PlacementSession;

/// Name of the synthesized power net.
pub const POWER_NET: &str = "VCC";
/// Name of the synthesized ground net.
pub const GROUND_NET: &str = "GND";

/// Pin index reserved for the power fan-out.
const POWER_PIN: u32 = 0;
/// Pin index reserved for the ground fan-out.
const GROUND_PIN: u32 = 1;
/// Signal pins are drawn from this half-open range.
const SIGNAL_PIN_RANGE: std::ops::Range<u32> = 2..8;
/// A signal net connects to one of this many nearest candidates.
const NEAREST_CANDIDATES: usize = 5;

/// Builds power, ground, and signal nets over the placements.
///
/// Nets that end up with fewer than two pads are discarded, including a
/// power or ground net whose fan-out captured at most one placement.
pub fn synthesize(
    placements: &[Placement],
    config: &NetConfig,
    session: &mut PlacementSession,
) -> Vec<Net> {
    if placements.is_empty() {
        warn!("no placements to synthesize nets over");
        return Vec::new();
    }

    let mut power = Net::new(POWER_NET, NetClass::Power);
    let mut ground = Net::new(GROUND_NET, NetClass::Ground);
    for index in 0..placements.len() {
        if session.rng.random::<f32>() < config.fanout_probability {
            power.add_pad(index, POWER_PIN);
            ground.add_pad(index, GROUND_PIN);
        }
    }

    let mut nets = Vec::new();
    let mut discarded = 0;
    for net in [power, ground] {
        if net.pads().len() >= 2 {
            nets.push(net);
        } else {
            debug!(net = net.name(); "dropping fan-out net with fewer than two pads");
            discarded += 1;
        }
    }

    let mut used: HashSet<(usize, u32)> = HashSet::new();
    let mut net_counter = 1;
    for _ in 0..config.max_signal_nets {
        let source = session.rng.random_range(0..placements.len());
        let source_pin = session.rng.random_range(SIGNAL_PIN_RANGE);
        if used.contains(&(source, source_pin)) {
            continue;
        }

        let mut net = Net::new(format!("NET_{net_counter}"), NetClass::Signal);
        net_counter += 1;
        net.add_pad(source, source_pin);
        used.insert((source, source_pin));

        let source_pos = placements[source].pad_position(source_pin);

        // Each other placement contributes its nearest unused pad.
        let mut candidates: Vec<(f32, usize, u32)> = Vec::new();
        for (target, placement) in placements.iter().enumerate() {
            if target == source {
                continue;
            }
            let nearest = SIGNAL_PIN_RANGE
                .filter(|&pin| !used.contains(&(target, pin)))
                .map(|pin| {
                    let dist = source_pos.distance_to(placement.pad_position(pin));
                    (dist, pin)
                })
                .min_by(|a, b| a.0.total_cmp(&b.0));
            if let Some((dist, pin)) = nearest {
                candidates.push((dist, target, pin));
            }
        }

        if candidates.is_empty() {
            discarded += 1;
            continue;
        }

        candidates.sort_by(|a, b| a.0.total_cmp(&b.0));
        let pick = session
            .rng
            .random_range(0..NEAREST_CANDIDATES)
            .min(candidates.len() - 1);
        let (_, target, target_pin) = candidates[pick];

        net.add_pad(target, target_pin);
        used.insert((target, target_pin));
        nets.push(net);
    }

    debug!(nets = nets.len(), discarded = discarded; "net synthesis complete");
    nets
}

#[cfg(test)]
mod tests {
    use super::*;

    use copperflow_core::board::Rotation;
    use copperflow_core::footprint::{Category, FootprintSpec};
    use copperflow_core::geometry::Point;

    fn placements(count: usize) -> Vec<Placement> {
        (0..count)
            .map(|i| {
                Placement::new(
                    Point::new(20.0 + 12.0 * i as f32, 50.0),
                    Rotation::R0,
                    Category::Medium,
                    FootprintSpec::new("soic8", 3.9, 4.9, 8),
                )
            })
            .collect()
    }

    #[test]
    fn full_fanout_captures_every_placement() {
        let placements = placements(5);
        let config = NetConfig {
            fanout_probability: 1.0,
            max_signal_nets: 0,
        };
        let mut session = PlacementSession::new(1);
        let nets = synthesize(&placements, &config, &mut session);

        assert_eq!(nets.len(), 2);
        let power = nets.iter().find(|n| n.class() == NetClass::Power).unwrap();
        let ground = nets.iter().find(|n| n.class() == NetClass::Ground).unwrap();
        assert_eq!(power.name(), POWER_NET);
        assert_eq!(ground.name(), GROUND_NET);
        assert_eq!(power.pads().len(), 5);
        assert_eq!(ground.pads().len(), 5);
        assert!(power.pads().iter().all(|p| p.pin == POWER_PIN));
        assert!(ground.pads().iter().all(|p| p.pin == GROUND_PIN));
    }

    #[test]
    fn zero_fanout_drops_the_supply_nets() {
        let placements = placements(5);
        let config = NetConfig {
            fanout_probability: 0.0,
            max_signal_nets: 10,
        };
        let mut session = PlacementSession::new(1);
        let nets = synthesize(&placements, &config, &mut session);
        assert!(nets.iter().all(|n| n.class() == NetClass::Signal));
    }

    #[test]
    fn every_retained_net_has_at_least_two_pads() {
        let placements = placements(8);
        let config = NetConfig {
            fanout_probability: 0.4,
            max_signal_nets: 40,
        };
        let mut session = PlacementSession::new(33);
        let nets = synthesize(&placements, &config, &mut session);
        assert!(nets.iter().all(|n| n.pads().len() >= 2));
    }

    #[test]
    fn no_pad_belongs_to_two_nets() {
        let placements = placements(8);
        let config = NetConfig {
            fanout_probability: 0.6,
            max_signal_nets: 60,
        };
        let mut session = PlacementSession::new(5);
        let nets = synthesize(&placements, &config, &mut session);

        let mut seen = HashSet::new();
        for net in &nets {
            for pad in net.pads() {
                assert!(
                    seen.insert((pad.placement, pad.pin)),
                    "pad {pad:?} appears twice"
                );
            }
        }
    }

    #[test]
    fn signal_nets_avoid_reserved_pins() {
        let placements = placements(6);
        let config = NetConfig {
            fanout_probability: 1.0,
            max_signal_nets: 30,
        };
        let mut session = PlacementSession::new(9);
        let nets = synthesize(&placements, &config, &mut session);
        for net in nets.iter().filter(|n| n.class() == NetClass::Signal) {
            assert!(net.pads().iter().all(|p| p.pin >= 2));
        }
    }

    #[test]
    fn no_placements_means_no_nets() {
        let config = NetConfig::default();
        let mut session = PlacementSession::new(1);
        assert!(synthesize(&[], &config, &mut session).is_empty());
    }

    #[test]
    fn synthesis_is_deterministic() {
        let placements = placements(10);
        let config = NetConfig::default();
        let mut a = PlacementSession::new(42);
        let mut b = PlacementSession::new(42);
        assert_eq!(
            synthesize(&placements, &config, &mut a),
            synthesize(&placements, &config, &mut b)
        );
    }
}
