//! roistat-test - Regression test framework for roistat
//!
//! Tracks indexed value checks across one regression run and reports all
//! failures at the end instead of stopping at the first one.
//!
//! - **Compare**: check values against expectations (default)
//! - **Display**: print every checked value without failing
//!
//! # Usage
//!
//! ```ignore
//! use roistat_test::RegParams;
//!
//! let mut rp = RegParams::new("roistat");
//! rp.compare_values(4.5, stats.mean, 1e-12);
//! assert!(rp.cleanup());
//! ```
//!
//! # Environment Variables
//!
//! - `REGTEST_MODE`: Set to "compare" or "display"

mod error;
mod params;

pub use error::{TestError, TestResult};
pub use params::{RegParams, RegTestMode};

use roistat_core::{ColorMode, Frame, FrameData};

/// Build a frame, mapping construction errors into [`TestError`].
pub fn make_frame(dims: Vec<usize>, color_mode: ColorMode, data: FrameData) -> TestResult<Frame> {
    Frame::new(dims.clone(), color_mode, data).map_err(|e| TestError::FrameBuild {
        dims,
        message: e.to_string(),
    })
}

/// Build a monochrome `u16` frame whose element at `(x, y)` is `f(x, y)`.
///
/// Axis 0 is `width`, axis 1 is `height`.
pub fn ramp_frame_2d(width: usize, height: usize, f: impl Fn(usize, usize) -> u16) -> TestResult<Frame> {
    let data = (0..height)
        .flat_map(|y| (0..width).map(move |x| (x, y)))
        .map(|(x, y)| f(x, y))
        .collect();
    make_frame(vec![width, height], ColorMode::Mono, FrameData::UInt16(data))
}

/// Build a `[3, width, height]` pixel-interleaved RGB `u8` frame whose
/// element at channel `c` of `(x, y)` is `f(c, x, y)`.
pub fn rgb1_frame(
    width: usize,
    height: usize,
    f: impl Fn(usize, usize, usize) -> u8,
) -> TestResult<Frame> {
    let mut data = Vec::with_capacity(3 * width * height);
    for y in 0..height {
        for x in 0..width {
            for c in 0..3 {
                data.push(f(c, x, y));
            }
        }
    }
    make_frame(vec![3, width, height], ColorMode::Rgb1, FrameData::UInt8(data))
}
