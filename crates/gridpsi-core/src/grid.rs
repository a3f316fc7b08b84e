// Copyright (c) 2026 Halcyon Interactive
// Gridpsi: Floor-Grid Private Set Intersection
// Licensed under the MIT License

use crate::types::Unit;

/// Discretises a coordinate pair to its grid-cell key, `"{floor(x)} {floor(y)}"`.
///
/// Floor is toward negative infinity, so `(-1.2, -3.1)` maps to `"-2 -4"`.
pub fn grid_key(x: f64, y: f64) -> String {
    format!("{} {}", x.floor() as i64, y.floor() as i64)
}

/// Grid keys for a unit list, preserving input order.
pub fn floored_positions(units: &[Unit]) -> Vec<String> {
    units.iter().map(|unit| grid_key(unit.x, unit.y)).collect()
}
