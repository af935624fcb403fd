//! Region statistics reduction
//!
//! Walks the window of a [`Region`] over a [`Frame`] buffer and computes
//! minimum, maximum, sum and mean, promoting every element to `f64`.
//!
//! - Rank 1 frames visit `dims[0]`.
//! - Rank 2 frames visit `dims[1]` rows of `dims[0]` elements; the
//!   element `(x, y)` is at `x + y * array_size_x`.
//! - Any other rank performs no reduction and yields all-zero statistics,
//!   even for 3-axis color frames.
//!
//! The region must already be clamped and in storage order (see
//! [`crate::remap`]). The reducer touches nothing but the buffer and the
//! region passed in, so it can run without any lock held.

use crate::error::{Error, Result};
use crate::frame::{Frame, FrameData};
use crate::region::{Region, RoiDim, RoiStatistics};

/// Running min/max/sum over visited elements.
///
/// The first pushed value seeds both `min` and `max`.
#[derive(Debug, Default)]
struct Accumulator {
    min: f64,
    max: f64,
    total: f64,
    count: usize,
}

impl Accumulator {
    #[inline]
    fn push(&mut self, value: f64) {
        if self.count == 0 {
            self.min = value;
            self.max = value;
        }
        if value < self.min {
            self.min = value;
        }
        if value > self.max {
            self.max = value;
        }
        self.total += value;
        self.count += 1;
    }

    fn finish(self) -> RoiStatistics {
        let mean = if self.count > 0 {
            self.total / self.count as f64
        } else {
            0.0
        };
        RoiStatistics {
            min: self.min,
            max: self.max,
            mean,
            total: self.total,
            num_elements: self.count,
        }
    }
}

/// Convert a clamped window into a `usize` range.
fn window(dim: &RoiDim, axis: usize) -> Result<std::ops::Range<usize>> {
    let (Ok(start), Ok(len)) = (usize::try_from(dim.offset), usize::try_from(dim.size)) else {
        return Err(Error::InvalidParameter(format!(
            "negative window on axis {axis}: offset={}, size={}",
            dim.offset, dim.size
        )));
    };
    Ok(start..start + len)
}

fn reduce<T: Copy + Into<f64>>(data: &[T], rank: usize, region: &Region) -> Result<RoiStatistics> {
    let mut acc = Accumulator::default();
    let fetch = |index: usize| -> Result<f64> {
        data.get(index)
            .map(|&v| v.into())
            .ok_or(Error::IndexOutOfBounds {
                index,
                len: data.len(),
            })
    };

    match rank {
        1 => {
            for x in window(&region.dims[0], 0)? {
                acc.push(fetch(x)?);
            }
        }
        2 => {
            let xs = window(&region.dims[0], 0)?;
            for y in window(&region.dims[1], 1)? {
                let row = y * region.array_size_x;
                for x in xs.clone() {
                    acc.push(fetch(x + row)?);
                }
            }
        }
        _ => return Ok(RoiStatistics::default()),
    }

    Ok(acc.finish())
}

/// Compute statistics of `region` over `frame`.
///
/// Dispatches on the frame's element type and runs the reduction over
/// the concrete buffer.
///
/// # Errors
///
/// - [`Error::InvalidParameter`] if a visited window is negative
///   (the region was not clamped).
/// - [`Error::IndexOutOfBounds`] if the window reaches past the buffer.
///
/// # Examples
///
/// ```
/// use roistat_core::{ColorMode, Frame, FrameData, Region, RoiDim, compute_statistics};
///
/// let frame = Frame::new(vec![5], ColorMode::Mono, FrameData::UInt8(vec![1, 2, 3, 4, 5])).unwrap();
/// let region = Region::with_dims([RoiDim::new(1, 3), RoiDim::default(), RoiDim::default()]);
/// let stats = compute_statistics(&frame, &region).unwrap();
/// assert_eq!((stats.min, stats.max, stats.total, stats.mean), (2.0, 4.0, 9.0, 3.0));
/// ```
pub fn compute_statistics(frame: &Frame, region: &Region) -> Result<RoiStatistics> {
    let rank = frame.rank();
    match frame.data() {
        FrameData::Int8(v) => reduce(v, rank, region),
        FrameData::UInt8(v) => reduce(v, rank, region),
        FrameData::Int16(v) => reduce(v, rank, region),
        FrameData::UInt16(v) => reduce(v, rank, region),
        FrameData::Int32(v) => reduce(v, rank, region),
        FrameData::UInt32(v) => reduce(v, rank, region),
        FrameData::Float32(v) => reduce(v, rank, region),
        FrameData::Float64(v) => reduce(v, rank, region),
    }
}

impl Region {
    /// Reduce this region over `frame` and store the result.
    ///
    /// On error the previously stored statistics are kept.
    pub fn compute_statistics(&mut self, frame: &Frame) -> Result<&RoiStatistics> {
        let stats = compute_statistics(frame, self)?;
        self.set_statistics(stats);
        Ok(self.statistics())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::ColorMode;

    fn region_2d(x: RoiDim, y: RoiDim, array_size_x: usize) -> Region {
        let mut region = Region::with_dims([x, y, RoiDim::default()]);
        region.array_size_x = array_size_x;
        region
    }

    #[test]
    fn test_rank1_window() {
        let frame = Frame::new(
            vec![5],
            ColorMode::Mono,
            FrameData::UInt8(vec![1, 2, 3, 4, 5]),
        )
        .unwrap();
        let region = Region::with_dims([RoiDim::new(1, 3), RoiDim::default(), RoiDim::default()]);
        let stats = compute_statistics(&frame, &region).unwrap();
        assert_eq!(stats.min, 2.0);
        assert_eq!(stats.max, 4.0);
        assert_eq!(stats.total, 9.0);
        assert_eq!(stats.mean, 3.0);
        assert_eq!(stats.num_elements, 3);
    }

    #[test]
    fn test_rank2_window() {
        let data: Vec<i32> = (1..=12).collect();
        let frame = Frame::new(vec![4, 3], ColorMode::Mono, FrameData::Int32(data)).unwrap();
        let region = region_2d(RoiDim::new(1, 2), RoiDim::new(0, 2), 4);
        let stats = compute_statistics(&frame, &region).unwrap();
        assert_eq!(stats.min, 2.0);
        assert_eq!(stats.max, 7.0);
        assert_eq!(stats.total, 18.0);
        assert_eq!(stats.mean, 4.5);
        assert_eq!(stats.num_elements, 4);
    }

    #[test]
    fn test_min_seeded_from_first_value() {
        // All values negative: a zero-initialized max would be wrong
        let frame = Frame::new(
            vec![3],
            ColorMode::Mono,
            FrameData::Float64(vec![-5.0, -2.5, -9.0]),
        )
        .unwrap();
        let region = Region::with_dims([RoiDim::new(0, 3), RoiDim::default(), RoiDim::default()]);
        let stats = compute_statistics(&frame, &region).unwrap();
        assert_eq!(stats.max, -2.5);
        assert_eq!(stats.min, -9.0);
    }

    #[test]
    fn test_rank3_yields_zero() {
        let frame = Frame::new(
            vec![3, 2, 2],
            ColorMode::Rgb1,
            FrameData::UInt16(vec![100; 12]),
        )
        .unwrap();
        let region = region_2d(RoiDim::new(0, 2), RoiDim::new(0, 2), 2);
        let stats = compute_statistics(&frame, &region).unwrap();
        assert_eq!(stats, RoiStatistics::default());
    }

    #[test]
    fn test_out_of_bounds_and_negative_windows() {
        let frame = Frame::new(vec![4], ColorMode::Mono, FrameData::Int8(vec![1, 2, 3, 4])).unwrap();
        let region = Region::with_dims([RoiDim::new(2, 5), RoiDim::default(), RoiDim::default()]);
        assert!(matches!(
            compute_statistics(&frame, &region),
            Err(Error::IndexOutOfBounds { index: 4, len: 4 })
        ));

        let region = Region::with_dims([RoiDim::new(-1, 2), RoiDim::default(), RoiDim::default()]);
        assert!(matches!(
            compute_statistics(&frame, &region),
            Err(Error::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_failed_reduction_keeps_previous() {
        let frame = Frame::new(vec![2], ColorMode::Mono, FrameData::UInt32(vec![8, 10])).unwrap();
        let mut region = Region::with_dims([RoiDim::new(0, 2), RoiDim::default(), RoiDim::default()]);
        region.compute_statistics(&frame).unwrap();
        let before = *region.statistics();
        assert_eq!(before.mean, 9.0);

        region.dims[0] = RoiDim::new(1, 4);
        assert!(region.compute_statistics(&frame).is_err());
        assert_eq!(*region.statistics(), before);
    }

    #[test]
    fn test_every_element_type() {
        let frames = [
            FrameData::Int8(vec![-1, 3]),
            FrameData::UInt8(vec![1, 3]),
            FrameData::Int16(vec![-1, 3]),
            FrameData::UInt16(vec![1, 3]),
            FrameData::Int32(vec![-1, 3]),
            FrameData::UInt32(vec![1, 3]),
            FrameData::Float32(vec![-1.0, 3.0]),
            FrameData::Float64(vec![1.0, 3.0]),
        ];
        let region = Region::with_dims([RoiDim::new(0, 2), RoiDim::default(), RoiDim::default()]);
        for data in frames {
            let frame = Frame::new(vec![2], ColorMode::Mono, data).unwrap();
            let stats = compute_statistics(&frame, &region).unwrap();
            assert_eq!(stats.max, 3.0);
            assert_eq!(stats.num_elements, 2);
            assert!(stats.min <= stats.mean && stats.mean <= stats.max);
        }
    }
}
