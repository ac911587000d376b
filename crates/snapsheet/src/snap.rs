#![forbid(unsafe_code)]

//! Snap point resolution: fractions of container height to panel offsets.
//!
//! An *offset* is the distance from the top of the container to the top of
//! the panel. Smaller offsets mean a taller, more open panel; an offset equal
//! to the container height means fully offscreen.
//!
//! # Invariants
//!
//! 1. Output has the same length as the input and is sorted ascending.
//! 2. Every fraction is clamped into [`MIN_SNAP_FRACTION`, `MAX_SNAP_FRACTION`]
//!    before use, so every offset lies in `[0, 0.95 * container_height]`.
//! 3. Duplicates are kept; nearest-snap ties resolve to the lowest index.
//!
//! # Failure Modes
//!
//! - Empty input: [`SheetError::InvalidConfiguration`]. There is nowhere to
//!   rest.
//! - NaN / infinite fraction: [`SheetError::InvalidConfiguration`].
//! - Non-finite or non-positive container height:
//!   [`SheetError::InvalidContainerHeight`].

use crate::error::{Result, SheetError};

/// Smallest visible fraction a snap point may request.
pub const MIN_SNAP_FRACTION: f64 = 0.05;

/// Largest visible fraction a snap point may request.
pub const MAX_SNAP_FRACTION: f64 = 1.0;

/// Snap offsets resolved against one container height.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedOffsets {
    offsets: Vec<f64>,
    fractions: Vec<f64>,
    container_height: f64,
}

/// Resolve `snap_points` (visible fractions) against `container_height`.
///
/// Pure function of its inputs.
pub fn resolve(snap_points: &[f64], container_height: f64) -> Result<ResolvedOffsets> {
    if !container_height.is_finite() || container_height <= 0.0 {
        return Err(SheetError::InvalidContainerHeight {
            height: container_height,
        });
    }
    if snap_points.is_empty() {
        return Err(SheetError::invalid_configuration(
            "snap points must contain at least one fraction",
        ));
    }
    if let Some(bad) = snap_points.iter().find(|p| !p.is_finite()) {
        return Err(SheetError::invalid_configuration(format!(
            "snap point {bad} is not a finite fraction"
        )));
    }

    let mut fractions: Vec<f64> = snap_points
        .iter()
        .map(|p| p.clamp(MIN_SNAP_FRACTION, MAX_SNAP_FRACTION))
        .collect();
    fractions.sort_by(f64::total_cmp);

    // Largest fraction → smallest offset, so walk fractions backwards.
    let offsets = fractions
        .iter()
        .rev()
        .map(|f| container_height - f * container_height)
        .collect();

    Ok(ResolvedOffsets {
        offsets,
        fractions,
        container_height,
    })
}

impl ResolvedOffsets {
    /// Offsets, ascending (most open first).
    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.offsets
    }

    /// Clamped fractions, ascending.
    #[inline]
    #[must_use]
    pub fn fractions(&self) -> &[f64] {
        &self.fractions
    }

    /// Number of snap positions. Never zero.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    /// Always false; kept for API symmetry with `len`.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    /// Offset at `index`, if in range.
    #[inline]
    #[must_use]
    pub fn get(&self, index: usize) -> Option<f64> {
        self.offsets.get(index).copied()
    }

    /// The fully-dismissed (offscreen) offset.
    #[inline]
    #[must_use]
    pub fn container_height(&self) -> f64 {
        self.container_height
    }

    /// Most open snap offset.
    #[must_use]
    pub fn min_offset(&self) -> f64 {
        self.offsets[0]
    }

    /// Least open snap offset.
    #[must_use]
    pub fn max_offset(&self) -> f64 {
        self.offsets[self.offsets.len() - 1]
    }

    /// Height the panel renders at: the tallest snap.
    #[must_use]
    pub fn panel_height(&self) -> f64 {
        self.container_height - self.min_offset()
    }

    /// Clamp an arbitrary (possibly negative) index into range.
    #[must_use]
    pub fn clamp_index(&self, index: i64) -> usize {
        let last = self.offsets.len() - 1;
        usize::try_from(index.max(0)).map_or(last, |i| i.min(last))
    }

    /// Offset at a clamped index.
    #[must_use]
    pub fn offset_at(&self, index: i64) -> f64 {
        self.offsets[self.clamp_index(index)]
    }

    /// Nearest snap to `projected` by absolute distance, linear scan.
    ///
    /// Equal distances resolve to the lower index.
    #[must_use]
    pub fn find_nearest(&self, projected: f64) -> (usize, f64) {
        let mut best = (0, self.offsets[0]);
        let mut best_distance = (projected - self.offsets[0]).abs();
        for (index, &candidate) in self.offsets.iter().enumerate().skip(1) {
            let distance = (projected - candidate).abs();
            if distance < best_distance {
                best_distance = distance;
                best = (index, candidate);
            }
        }
        best
    }

    /// Index of the snap closest to `offset`, with no projection applied.
    #[must_use]
    pub fn index_of_nearest(&self, offset: f64) -> usize {
        self.find_nearest(offset).0
    }

    /// Backdrop openness for a panel at `offset`: 1.0 at the most open snap,
    /// 0.0 fully offscreen, linear between, clamped to [0, 1].
    #[must_use]
    pub fn openness(&self, offset: f64) -> f64 {
        let min = self.min_offset();
        let span = self.container_height - min;
        (1.0 - (offset - min) / span).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_points_resolve_ascending() {
        let offsets = resolve(&[0.25, 0.6, 0.9], 1000.0).expect("valid");
        let expected = [100.0, 400.0, 750.0];
        for (got, want) in offsets.as_slice().iter().zip(expected) {
            assert!((got - want).abs() < 1e-9, "{got} != {want}");
        }
        assert!((offsets.min_offset() - 100.0).abs() < 1e-9);
        assert!((offsets.max_offset() - 750.0).abs() < 1e-9);
        assert_eq!(offsets.container_height(), 1000.0);
    }

    #[test]
    fn unordered_and_out_of_range_are_clamped_and_sorted() {
        let offsets = resolve(&[1.7, 0.5, -3.0], 1000.0).expect("valid");
        assert_eq!(offsets.fractions(), &[0.05, 0.5, 1.0]);
        for (got, want) in offsets.as_slice().iter().zip([0.0, 500.0, 950.0]) {
            assert!((got - want).abs() < 1e-9, "{got} != {want}");
        }
    }

    #[test]
    fn empty_is_invalid_configuration() {
        let err = resolve(&[], 1000.0).expect_err("empty must fail");
        assert!(matches!(err, SheetError::InvalidConfiguration { .. }));
    }

    #[test]
    fn nan_is_invalid_configuration() {
        let err = resolve(&[0.5, f64::NAN], 1000.0).expect_err("NaN must fail");
        assert!(matches!(err, SheetError::InvalidConfiguration { .. }));
    }

    #[test]
    fn bad_container_height_rejected() {
        for height in [0.0, -10.0, f64::INFINITY, f64::NAN] {
            let err = resolve(&[0.5], height).expect_err("height must fail");
            assert!(matches!(err, SheetError::InvalidContainerHeight { .. }));
        }
    }

    #[test]
    fn duplicates_kept_and_ties_pick_lower_index() {
        let offsets = resolve(&[0.5, 0.5], 1000.0).expect("valid");
        assert_eq!(offsets.len(), 2);
        assert_eq!(offsets.find_nearest(500.0), (0, 500.0));

        let offsets = resolve(&[0.2, 0.8], 1000.0).expect("valid");
        // 200 and 800: 500 is equidistant.
        let (index, offset) = offsets.find_nearest(500.0);
        assert_eq!(index, 0);
        assert!((offset - 200.0).abs() < 1e-9);
    }

    #[test]
    fn nearest_picks_closest() {
        let offsets = resolve(&[0.25, 0.6, 0.9], 1000.0).expect("valid");
        assert_eq!(offsets.find_nearest(450.0).0, 1);
        assert_eq!(offsets.find_nearest(-500.0).0, 0);
        assert_eq!(offsets.find_nearest(5000.0).0, 2);
        assert_eq!(offsets.index_of_nearest(700.0), 2);
    }

    #[test]
    fn clamp_index_bounds() {
        let offsets = resolve(&[0.25, 0.6, 0.9], 1000.0).expect("valid");
        assert_eq!(offsets.clamp_index(-4), 0);
        assert_eq!(offsets.clamp_index(1), 1);
        assert_eq!(offsets.clamp_index(99), 2);
        assert_eq!(offsets.clamp_index(i64::MAX), 2);
    }

    #[test]
    fn openness_endpoints() {
        let offsets = resolve(&[0.25, 0.6, 0.9], 1000.0).expect("valid");
        assert!((offsets.openness(100.0) - 1.0).abs() < 1e-9);
        assert_eq!(offsets.openness(1000.0), 0.0);
        assert_eq!(offsets.openness(-50.0), 1.0);
        assert!((offsets.openness(550.0) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn panel_height_is_tallest_snap() {
        let offsets = resolve(&[0.25, 0.6, 0.9], 1000.0).expect("valid");
        assert!((offsets.panel_height() - 900.0).abs() < 1e-9);
    }
}
