//! Component footprint specifications, size categories, and the catalog.
//!
//! A [`FootprintSpec`] describes one placeable component type: a rectangular
//! outline plus a pin count. Footprints are grouped into a closed set of
//! [`Category`] variants; each category owns its clearance policy and its
//! zone rule, so callers dispatch on the enum rather than on string tags.
//!
//! The [`Catalog`] maps categories to footprint lists. Its [`Default`]
//! implementation carries a fixed library of common surface-mount parts,
//! pin headers, and test pads; consumers with their own component libraries
//! can construct a catalog from scratch instead.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::geometry::Size;

/// Size category of a component footprint.
///
/// The category decides which grid cells a component may occupy, how much
/// clearance it demands from its neighbors, and which board zone it is
/// allowed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Small,
    SmallMedium,
    Medium,
    Large,
    Connector,
    TestPoint,
}

/// Board zone a category is confined to.
///
/// Ordinary components keep clear of the edge-margin band; connectors live
/// inside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoneRule {
    /// The footprint must lie entirely inside the interior region
    /// (outside the edge-margin band).
    Interior,
    /// The footprint must lie entirely within the edge-margin band.
    EdgeBand,
}

impl Category {
    /// All categories, in placement-priority order.
    pub const ALL: [Category; 6] = [
        Category::Large,
        Category::Medium,
        Category::SmallMedium,
        Category::Small,
        Category::Connector,
        Category::TestPoint,
    ];

    /// Minimum clearance in millimeters demanded by a footprint of this
    /// category with the given pin count.
    ///
    /// High-pin-count parts fan out wide and need room for escape routing,
    /// so clearance grows with pin count for the ordinary categories.
    /// Connectors and test points carry their own fixed clearances.
    pub fn clearance_for(self, pins: u32) -> f32 {
        match self {
            Category::Connector => 3.0,
            Category::TestPoint => 2.0,
            _ => {
                if pins > 64 {
                    3.0
                } else if pins > 16 {
                    2.0
                } else {
                    1.5
                }
            }
        }
    }

    /// The board zone this category is confined to.
    pub fn zone_rule(self) -> ZoneRule {
        match self {
            Category::Connector => ZoneRule::EdgeBand,
            _ => ZoneRule::Interior,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Category::Small => "small",
            Category::SmallMedium => "small_medium",
            Category::Medium => "medium",
            Category::Large => "large",
            Category::Connector => "connector",
            Category::TestPoint => "testpoint",
        };
        f.write_str(name)
    }
}

/// One placeable component type: identifier, body outline, and pin count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FootprintSpec {
    id: String,
    size: Size,
    pins: u32,
}

impl FootprintSpec {
    /// Creates a new footprint spec.
    pub fn new(id: impl Into<String>, width: f32, height: f32, pins: u32) -> Self {
        Self {
            id: id.into(),
            size: Size::new(width, height),
            pins,
        }
    }

    /// Returns the footprint identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the unrotated body outline.
    pub fn size(&self) -> Size {
        self.size
    }

    /// Returns the pin count.
    pub fn pins(&self) -> u32 {
        self.pins
    }
}

/// Footprint lists per category.
///
/// Every category a configuration requests components from must have at
/// least one entry; the engine rejects empty catalogs for requested
/// categories up front.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    pub large: Vec<FootprintSpec>,
    pub medium: Vec<FootprintSpec>,
    pub small_medium: Vec<FootprintSpec>,
    pub small: Vec<FootprintSpec>,
    pub connector: Vec<FootprintSpec>,
    pub testpoint: Vec<FootprintSpec>,
}

impl Catalog {
    /// An entirely empty catalog, as a starting point for custom libraries.
    pub fn empty() -> Self {
        Self {
            large: Vec::new(),
            medium: Vec::new(),
            small_medium: Vec::new(),
            small: Vec::new(),
            connector: Vec::new(),
            testpoint: Vec::new(),
        }
    }

    /// Returns the footprint list for a category.
    pub fn for_category(&self, category: Category) -> &[FootprintSpec] {
        match category {
            Category::Small => &self.small,
            Category::SmallMedium => &self.small_medium,
            Category::Medium => &self.medium,
            Category::Large => &self.large,
            Category::Connector => &self.connector,
            Category::TestPoint => &self.testpoint,
        }
    }

    /// Preferred footprint for decoupling companions placed around large
    /// parts: a small capacitor if the library has one, otherwise the first
    /// small entry, otherwise nothing.
    pub fn decoupling_companion(&self) -> Option<&FootprintSpec> {
        self.small
            .iter()
            .find(|f| f.id().contains("capacitor"))
            .or_else(|| self.small.first())
    }
}

impl Default for Catalog {
    /// The built-in component library: common QFP/BGA packages, SOIC and
    /// TSSOP bodies, chip passives, radial capacitors, pin headers, JST
    /// shrouds, and round test pads. Dimensions are body outlines in
    /// millimeters.
    fn default() -> Self {
        Self {
            large: vec![
                FootprintSpec::new("qfp100", 14.0, 14.0, 100),
                FootprintSpec::new("qfp144", 20.0, 20.0, 144),
                FootprintSpec::new("bga100", 11.0, 11.0, 100),
                FootprintSpec::new("bga144", 13.0, 13.0, 144),
                FootprintSpec::new("bga256", 17.0, 17.0, 256),
                FootprintSpec::new("cap_radial_10mm", 10.0, 10.0, 2),
            ],
            medium: vec![
                FootprintSpec::new("soic8", 3.9, 4.9, 8),
                FootprintSpec::new("soic14", 3.9, 8.7, 14),
                FootprintSpec::new("soic16", 3.9, 9.9, 16),
                FootprintSpec::new("tssop14", 4.4, 5.0, 14),
                FootprintSpec::new("tssop16", 4.4, 5.0, 16),
                FootprintSpec::new("tssop20", 4.4, 6.5, 20),
                FootprintSpec::new("qfp32", 7.0, 7.0, 32),
                FootprintSpec::new("qfp44", 10.0, 10.0, 44),
                FootprintSpec::new("qfp48", 7.0, 7.0, 48),
                FootprintSpec::new("qfp64", 10.0, 10.0, 64),
                FootprintSpec::new("cap_radial_5mm", 5.0, 5.0, 2),
                FootprintSpec::new("cap_radial_6mm", 6.3, 6.3, 2),
                FootprintSpec::new("cap_radial_8mm", 8.0, 8.0, 2),
            ],
            small_medium: vec![
                FootprintSpec::new("resistor_0805", 2.0, 1.25, 2),
                FootprintSpec::new("resistor_1206", 3.2, 1.6, 2),
                FootprintSpec::new("capacitor_0805", 2.0, 1.25, 2),
                FootprintSpec::new("capacitor_1206", 3.2, 1.6, 2),
                FootprintSpec::new("inductor_0805", 2.0, 1.25, 2),
                FootprintSpec::new("diode_sod123", 2.7, 1.6, 2),
                FootprintSpec::new("led_0805", 2.0, 1.25, 2),
            ],
            small: vec![
                FootprintSpec::new("resistor_0402", 1.0, 0.5, 2),
                FootprintSpec::new("resistor_0603", 1.6, 0.8, 2),
                FootprintSpec::new("capacitor_0402", 1.0, 0.5, 2),
                FootprintSpec::new("capacitor_0603", 1.6, 0.8, 2),
                FootprintSpec::new("led_0603", 1.6, 0.8, 2),
            ],
            connector: vec![
                FootprintSpec::new("connector_2pin", 2.54, 5.08, 2),
                FootprintSpec::new("connector_4pin", 2.54, 10.16, 4),
                FootprintSpec::new("connector_6pin", 2.54, 15.24, 6),
                FootprintSpec::new("connector_8pin", 2.54, 20.32, 8),
                FootprintSpec::new("connector_10pin", 2.54, 25.4, 10),
                FootprintSpec::new("connector_2x5", 5.08, 12.7, 10),
                FootprintSpec::new("connector_2x8", 5.08, 20.32, 16),
                FootprintSpec::new("jst_2pin", 4.0, 7.0, 2),
                FootprintSpec::new("jst_4pin", 8.0, 7.0, 4),
                FootprintSpec::new("jst_6pin", 12.0, 7.0, 6),
                FootprintSpec::new("jst_8pin", 16.0, 7.0, 8),
            ],
            testpoint: vec![
                FootprintSpec::new("testpoint_1mm", 1.0, 1.0, 1),
                FootprintSpec::new("testpoint_1_5mm", 1.5, 1.5, 1),
                FootprintSpec::new("testpoint_2mm", 2.0, 2.0, 1),
            ],
        }
    }
}
