//! Axis remapping and clamping
//!
//! Region axes are configured in *logical* order: axis 0 is image X,
//! axis 1 is image Y and axis 2 is the color channel. For pixel- and
//! row-interleaved RGB frames the channel is stored on a different
//! physical axis, so before reduction each logical axis is
//!
//! 1. clamped against the extent of the physical axis it maps to, and
//! 2. moved into the slot of that physical axis, so the reducer can walk
//!    the windows in storage order.
//!
//! Clamping never fails; out-of-range values are silently corrected so
//! that regions configured for a previous frame geometry stay usable.
//!
//! | Color mode | logical 0 | logical 1 | logical 2 |
//! |---|---|---|---|
//! | `Rgb1` `[3, nx, ny]` | physical 1 | physical 2 | physical 0 |
//! | `Rgb2` `[nx, 3, ny]` | physical 0 | physical 2 | physical 1 |
//! | others | physical 0 | physical 1 | physical 2 |

use crate::frame::{ColorMode, Frame};
use crate::region::{MAX_ROI_DIMS, Region, RoiDim};
use log::trace;

/// Logical-to-physical axis permutation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AxisMap {
    physical: [usize; MAX_ROI_DIMS],
}

impl AxisMap {
    /// Logical axis `i` is physical axis `i`.
    pub const IDENTITY: AxisMap = AxisMap {
        physical: [0, 1, 2],
    };

    /// Permutation for a frame of the given color mode and rank.
    ///
    /// Interleaved layouts only apply to 3-axis frames; any other rank
    /// uses the identity permutation.
    pub fn new(color_mode: ColorMode, rank: usize) -> Self {
        if rank != 3 {
            return Self::IDENTITY;
        }
        match color_mode {
            ColorMode::Rgb1 => AxisMap {
                physical: [1, 2, 0],
            },
            ColorMode::Rgb2 => AxisMap {
                physical: [0, 2, 1],
            },
            _ => Self::IDENTITY,
        }
    }

    /// Permutation for a frame.
    pub fn for_frame(frame: &Frame) -> Self {
        Self::new(frame.color_mode(), frame.rank())
    }

    /// Physical axis that logical axis `logical` maps to.
    #[inline]
    pub fn physical(&self, logical: usize) -> usize {
        self.physical[logical]
    }

    #[inline]
    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }
}

/// Clamped window of one logical axis, for publication
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AxisReport {
    pub offset: i32,
    pub size: i32,
    /// Extent of the physical axis the logical axis maps to
    pub max_size: usize,
}

/// Clamp a window into `[0, extent)`.
///
/// `offset` is pulled into `[0, extent - 1]`, then `size` into
/// `[1, extent - offset]`.
///
/// # Examples
///
/// ```
/// use roistat_core::{RoiDim, remap::clamp_dim};
///
/// assert_eq!(clamp_dim(RoiDim::new(15, 5), 10), RoiDim::new(9, 1));
/// assert_eq!(clamp_dim(RoiDim::new(-3, 0), 10), RoiDim::new(0, 1));
/// ```
pub fn clamp_dim(dim: RoiDim, extent: usize) -> RoiDim {
    let extent = i64::try_from(extent).unwrap_or(i64::MAX).max(1);
    let offset = i64::from(dim.offset).max(0).min(extent - 1);
    let size = i64::from(dim.size).max(1).min(extent - offset);
    // Neither value can exceed max(input, 1), so both fit back in i32.
    RoiDim {
        offset: i32::try_from(offset).unwrap_or(i32::MAX),
        size: i32::try_from(size).unwrap_or(i32::MAX),
    }
}

/// Clamp every logical axis below the frame rank against the extent of
/// its physical axis.
///
/// Windows at or beyond the frame rank are left untouched. Returns one
/// [`AxisReport`] per clamped axis, in logical order.
pub fn clamp_region(region: &mut Region, frame: &Frame, map: &AxisMap) -> Vec<AxisReport> {
    let rank = frame.rank().min(MAX_ROI_DIMS);
    let mut reports = Vec::with_capacity(rank);

    for axis in 0..rank {
        let Some(extent) = frame.dim(map.physical(axis)) else {
            break;
        };
        let configured = region.dims[axis];
        let clamped = clamp_dim(configured, extent);
        if clamped != configured {
            trace!(
                "clamped ROI axis {axis}: offset {} -> {}, size {} -> {} (extent {extent})",
                configured.offset, clamped.offset, configured.size, clamped.size
            );
        }
        region.dims[axis] = clamped;
        reports.push(AxisReport {
            offset: clamped.offset,
            size: clamped.size,
            max_size: extent,
        });
    }

    reports
}

/// Move logical windows into storage order and record the two leading
/// physical axis sizes.
///
/// After this call `region.dims[p]` is the window along physical axis `p`
/// and `region.array_size_x` is the row stride used by the reducer.
pub fn reorder_for_storage(region: &mut Region, frame: &Frame, map: &AxisMap) {
    if !map.is_identity() {
        let logical = region.dims;
        for (axis, dim) in logical.into_iter().enumerate() {
            region.dims[map.physical(axis)] = dim;
        }
    }
    region.array_size_x = frame.dim(map.physical(0)).unwrap_or(0);
    region.array_size_y = frame.dim(map.physical(1)).unwrap_or(0);
}

/// Clamp and reorder in one step.
///
/// Equivalent to [`clamp_region`] followed by [`reorder_for_storage`]
/// with the frame's own [`AxisMap`].
pub fn remap(region: &mut Region, frame: &Frame) -> Vec<AxisReport> {
    let map = AxisMap::for_frame(frame);
    let reports = clamp_region(region, frame, &map);
    reorder_for_storage(region, frame, &map);
    reports
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::FrameData;

    fn frame(dims: Vec<usize>, color_mode: ColorMode) -> Frame {
        let len = dims.iter().product();
        Frame::new(dims, color_mode, FrameData::UInt8(vec![0; len])).unwrap()
    }

    #[test]
    fn test_clamp_dim_out_of_range() {
        assert_eq!(clamp_dim(RoiDim::new(15, 5), 10), RoiDim::new(9, 1));
        assert_eq!(clamp_dim(RoiDim::new(4, 100), 10), RoiDim::new(4, 6));
        assert_eq!(clamp_dim(RoiDim::new(-5, -5), 10), RoiDim::new(0, 1));
    }

    #[test]
    fn test_clamp_dim_idempotent() {
        for (offset, size) in [(0, 1), (0, 10), (3, 4), (9, 1)] {
            let dim = RoiDim::new(offset, size);
            assert_eq!(clamp_dim(dim, 10), dim);
            assert_eq!(clamp_dim(clamp_dim(dim, 10), 10), dim);
        }
    }

    #[test]
    fn test_axis_map_permutations() {
        assert_eq!(AxisMap::new(ColorMode::Rgb1, 3).physical, [1, 2, 0]);
        assert_eq!(AxisMap::new(ColorMode::Rgb2, 3).physical, [0, 2, 1]);
        assert!(AxisMap::new(ColorMode::Rgb3, 3).is_identity());
        assert!(AxisMap::new(ColorMode::Mono, 3).is_identity());
        // Interleaving only applies to 3-axis frames
        assert!(AxisMap::new(ColorMode::Rgb1, 2).is_identity());
    }

    #[test]
    fn test_clamp_region_leaves_axes_beyond_rank() {
        let frame = frame(vec![8, 6], ColorMode::Mono);
        let mut region = Region::with_dims([
            RoiDim::new(6, 10),
            RoiDim::new(-1, 3),
            RoiDim::new(-7, -7),
        ]);
        let reports = clamp_region(&mut region, &frame, &AxisMap::IDENTITY);

        assert_eq!(reports.len(), 2);
        assert_eq!(region.dims[0], RoiDim::new(6, 2));
        assert_eq!(region.dims[1], RoiDim::new(0, 3));
        assert_eq!(region.dims[2], RoiDim::new(-7, -7));
        assert_eq!(reports[0].max_size, 8);
        assert_eq!(reports[1].max_size, 6);
    }

    #[test]
    fn test_reorder_rgb1() {
        // [3, nx, ny]: logical (x, y, c) -> storage (c, x, y)
        let frame = frame(vec![3, 5, 4], ColorMode::Rgb1);
        let x = RoiDim::new(1, 2);
        let y = RoiDim::new(0, 3);
        let c = RoiDim::new(0, 3);
        let mut region = Region::with_dims([x, y, c]);
        let reports = remap(&mut region, &frame);

        assert_eq!(region.dims, [c, x, y]);
        assert_eq!(region.array_size_x, 5);
        assert_eq!(region.array_size_y, 4);
        assert_eq!(reports[0].max_size, 5);
        assert_eq!(reports[1].max_size, 4);
        assert_eq!(reports[2].max_size, 3);
    }

    #[test]
    fn test_reorder_rgb2() {
        // [nx, 3, ny]: logical (x, y, c) -> storage (x, c, y)
        let frame = frame(vec![5, 3, 4], ColorMode::Rgb2);
        let x = RoiDim::new(1, 2);
        let y = RoiDim::new(2, 2);
        let c = RoiDim::new(1, 1);
        let mut region = Region::with_dims([x, y, c]);
        remap(&mut region, &frame);

        assert_eq!(region.dims, [x, c, y]);
        assert_eq!(region.array_size_x, 5);
        assert_eq!(region.array_size_y, 4);
    }

    #[test]
    fn test_rank_one_array_sizes() {
        let frame = frame(vec![7], ColorMode::Mono);
        let mut region = Region::with_dims([RoiDim::new(2, 3), RoiDim::default(), RoiDim::default()]);
        let reports = remap(&mut region, &frame);
        assert_eq!(reports.len(), 1);
        assert_eq!(region.array_size_x, 7);
        assert_eq!(region.array_size_y, 0);
    }
}
