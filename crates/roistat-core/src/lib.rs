//! roistat Core - Frames, regions and the statistics engine
//!
//! This crate provides the data structures and numeric kernels the
//! region-of-interest statistics plugin is built from:
//!
//! - [`Frame`] / [`FrameData`] - Typed n-dimensional array with color mode
//! - [`Region`] / [`RoiDim`] - Region of interest and its last statistics
//! - [`remap`] - Logical-to-physical axis mapping and bounds clamping
//! - [`compute_statistics`] - Min/max/sum/mean reduction over a region
//!
//! # Example
//!
//! ```
//! use roistat_core::{ColorMode, Frame, FrameData, Region, RoiDim, remap};
//!
//! let frame = Frame::new(vec![4, 3], ColorMode::Mono, FrameData::UInt16((1..=12).collect())).unwrap();
//! let mut region = Region::with_dims([RoiDim::new(1, 2), RoiDim::new(0, 2), RoiDim::default()]);
//! remap::remap(&mut region, &frame);
//! let stats = region.compute_statistics(&frame).unwrap();
//! assert_eq!(stats.total, 18.0);
//! ```

pub mod error;
pub mod frame;
pub mod region;
pub mod remap;
pub mod statistics;

pub use error::{Error, Result};
pub use frame::{ColorMode, ElementType, Frame, FrameData, MAX_FRAME_DIMS};
pub use region::{MAX_ROI_DIMS, Region, RoiDim, RoiStatistics};
pub use remap::{AxisMap, AxisReport};
pub use statistics::compute_statistics;
