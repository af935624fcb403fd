//! Region - one configured region of interest and its last statistics
//!
//! A `Region` holds up to [`MAX_ROI_DIMS`] axis windows (`offset`/`size`)
//! exactly as configured, the physical sizes of the two leading storage
//! axes recorded by the axis remapper, and the statistics of the most
//! recent reduction.

/// Maximum number of axes a region describes.
pub const MAX_ROI_DIMS: usize = 3;

/// Window along one axis
///
/// Values are kept as configured integers; the remapper clamps them into
/// `offset >= 0`, `size >= 1`, `offset + size <= extent` each frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct RoiDim {
    /// First element along the axis
    pub offset: i32,
    /// Number of elements along the axis
    pub size: i32,
}

impl RoiDim {
    pub const fn new(offset: i32, size: i32) -> Self {
        Self { offset, size }
    }
}

/// Result of one reduction
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RoiStatistics {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    /// Sum of all visited elements
    pub total: f64,
    /// Number of visited elements
    pub num_elements: usize,
}

/// A region of interest
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Region {
    /// Per-axis windows. Logical order until reordered for storage.
    pub dims: [RoiDim; MAX_ROI_DIMS],
    /// Physical size of the leading storage axis (row stride)
    pub array_size_x: usize,
    /// Physical size of the second storage axis
    pub array_size_y: usize,
    stats: RoiStatistics,
}

impl Region {
    /// Create a region with zeroed windows and statistics.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a region from per-axis windows.
    pub fn with_dims(dims: [RoiDim; MAX_ROI_DIMS]) -> Self {
        Self {
            dims,
            ..Self::default()
        }
    }

    /// Last computed statistics.
    #[inline]
    pub fn statistics(&self) -> &RoiStatistics {
        &self.stats
    }

    /// Replace the stored statistics.
    pub fn set_statistics(&mut self, stats: RoiStatistics) {
        self.stats = stats;
    }

    /// Zero min/max/mean/total without touching the configured windows.
    pub fn reset_statistics(&mut self) {
        self.stats = RoiStatistics::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reset_keeps_windows() {
        let dims = [RoiDim::new(2, 5), RoiDim::new(1, 3), RoiDim::new(0, 1)];
        let mut region = Region::with_dims(dims);
        region.set_statistics(RoiStatistics {
            min: 1.0,
            max: 9.0,
            mean: 4.0,
            total: 60.0,
            num_elements: 15,
        });

        region.reset_statistics();

        assert_eq!(region.dims, dims);
        let stats = region.statistics();
        assert_eq!(stats.min, 0.0);
        assert_eq!(stats.max, 0.0);
        assert_eq!(stats.mean, 0.0);
        assert_eq!(stats.total, 0.0);
    }
}
