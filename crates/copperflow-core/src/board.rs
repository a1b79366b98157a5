//! Board entities: placements, nets, track segments, and copper pours.
//!
//! These are the records the layout engine produces and the surrounding
//! pipeline consumes. All of them are plain immutable data; writing them
//! into a board-description file is the job of an external serializer.

use serde::{Deserialize, Serialize};

use crate::footprint::{Category, FootprintSpec};
use crate::geometry::{Bounds, Point, Size};

/// Orthogonal rotation of a placed footprint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Rotation {
    #[default]
    R0,
    R90,
    R180,
    R270,
}

impl Rotation {
    /// All four orthogonal rotations.
    pub const ALL: [Rotation; 4] = [Rotation::R0, Rotation::R90, Rotation::R180, Rotation::R270];

    /// Rotation angle in degrees.
    pub fn degrees(self) -> f32 {
        match self {
            Rotation::R0 => 0.0,
            Rotation::R90 => 90.0,
            Rotation::R180 => 180.0,
            Rotation::R270 => 270.0,
        }
    }

    /// Returns true for quarter-turn rotations that exchange a footprint's
    /// width and height.
    pub fn swaps_axes(self) -> bool {
        matches!(self, Rotation::R90 | Rotation::R270)
    }
}

/// A footprint instance positioned and rotated on the board.
///
/// The full [`FootprintSpec`] rides along rather than just its identifier:
/// collision checks need the outline and pad estimation needs the outline
/// and pin count, and placements are cheap to clone at board scale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    position: Point,
    rotation: Rotation,
    category: Category,
    footprint: FootprintSpec,
}

impl Placement {
    /// Creates a placement centered at `position`.
    pub fn new(
        position: Point,
        rotation: Rotation,
        category: Category,
        footprint: FootprintSpec,
    ) -> Self {
        Self {
            position,
            rotation,
            category,
            footprint,
        }
    }

    /// Returns the center position in millimeters.
    pub fn position(&self) -> Point {
        self.position
    }

    /// Returns the orthogonal rotation.
    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    /// Returns the size category.
    pub fn category(&self) -> Category {
        self.category
    }

    /// Returns the footprint spec this placement instantiates.
    pub fn footprint(&self) -> &FootprintSpec {
        &self.footprint
    }

    /// Returns the footprint outline with rotation applied.
    pub fn rotated_size(&self) -> Size {
        if self.rotation.swaps_axes() {
            self.footprint.size().swapped()
        } else {
            self.footprint.size()
        }
    }

    /// Returns the axis-aligned bounding box of the rotated outline.
    pub fn bounds(&self) -> Bounds {
        Bounds::from_center(self.position, self.rotated_size())
    }

    /// Minimum clearance this placement demands from its neighbors.
    pub fn clearance(&self) -> f32 {
        self.category.clearance_for(self.footprint.pins())
    }

    /// Estimated position of pad `pin`.
    ///
    /// Real pad geometry lives in the footprint library, which is outside
    /// this engine; this approximation maps pins 0-3 to the midpoints of
    /// the rotated outline's left/right/top/bottom edges and spaces higher
    /// pins around a circle of radius `max(w, h) / 2` at angle
    /// `(pin / 8) * 2π`.
    pub fn pad_position(&self, pin: u32) -> Point {
        let center = self.position;
        let size = self.rotated_size();
        let half_w = size.width() / 2.0;
        let half_h = size.height() / 2.0;

        match pin {
            0 => center.offset(-half_w, 0.0),
            1 => center.offset(half_w, 0.0),
            2 => center.offset(0.0, -half_h),
            3 => center.offset(0.0, half_h),
            _ => {
                let angle = (pin as f32 / 8.0) * std::f32::consts::TAU;
                let radius = size.max_dimension() / 2.0;
                center.offset(radius * angle.cos(), radius * angle.sin())
            }
        }
    }
}

/// Electrical class of a net.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NetClass {
    Power,
    Ground,
    Signal,
}

/// Reference to one pad: a placement index plus a pin index on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PadRef {
    pub placement: usize,
    pub pin: u32,
}

/// A named group of pads that routing connects together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Net {
    name: String,
    class: NetClass,
    pads: Vec<PadRef>,
}

impl Net {
    /// Creates an empty net.
    pub fn new(name: impl Into<String>, class: NetClass) -> Self {
        Self {
            name: name.into(),
            class,
            pads: Vec::new(),
        }
    }

    /// Returns the net name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the electrical class.
    pub fn class(&self) -> NetClass {
        self.class
    }

    /// Returns the pads in insertion order.
    pub fn pads(&self) -> &[PadRef] {
        &self.pads
    }

    /// Appends a pad reference.
    pub fn add_pad(&mut self, placement: usize, pin: u32) {
        self.pads.push(PadRef { placement, pin });
    }
}

/// Copper layer a track or pour lives on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Layer {
    FrontCu,
    BackCu,
}

impl Layer {
    /// Canonical layer name as board-description formats spell it.
    pub fn as_str(self) -> &'static str {
        match self {
            Layer::FrontCu => "F.Cu",
            Layer::BackCu => "B.Cu",
        }
    }
}

/// One straight piece of copper trace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackSegment {
    pub start: Point,
    pub end: Point,
    pub width: f32,
    pub layer: Layer,
    pub net: String,
}

impl TrackSegment {
    /// Length of the segment in millimeters.
    pub fn length(&self) -> f32 {
        self.start.distance_to(self.end)
    }

    /// Returns true if the segment is horizontal or vertical.
    pub fn is_axis_aligned(&self) -> bool {
        self.start.x() == self.end.x() || self.start.y() == self.end.y()
    }
}

/// A rectangular copper pour, emitted unfilled.
///
/// Fill computation is deferred to the downstream CAD engine; the record
/// only carries the outline, the owning net, and the layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PourPolygon {
    pub bounds: Bounds,
    pub net: String,
    pub layer: Layer,
    pub filled: bool,
}
