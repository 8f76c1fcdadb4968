//! Layout calculation for card sheets
//!
//! This module handles the geometry of a sheet:
//! - The paper/card-size catalog (slot coordinates at baseline PPI)
//! - Slot grids, skipped positions and duplex mirroring
//! - Maximum safe bleed between neighbouring slots

mod catalog;
mod grid;
mod types;

pub use catalog::*;
pub use grid::*;
pub use types::*;
