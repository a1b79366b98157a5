//! Copperflow Core Types
//!
//! This crate provides the foundational types for the Copperflow board
//! layout engine. It includes:
//!
//! - **Geometry**: Millimeter-space geometric primitives ([`geometry`] module)
//! - **Footprints**: Component footprint specs, categories, and the built-in
//!   catalog ([`footprint`] module)
//! - **Board entities**: Placements, nets, track segments, and copper pours
//!   ([`board`] module)

pub mod board;
pub mod footprint;
pub mod geometry;
