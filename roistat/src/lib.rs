//! roistat - Region-of-interest statistics for detector frames
//!
//! Computes min, max, mean and total over a fixed set of configurable
//! regions of every frame delivered to a plugin port, and publishes the
//! results through an addressed parameter store.
//!
//! # Overview
//!
//! - Typed 1-, 2- and 3-axis frames with 8 element types
//! - Windows clamped against each frame's geometry, with interleaved RGB
//!   layouts mapped back onto image X/Y
//! - Blocking or queued frame dispatch with dropped-frame accounting
//! - Optional forwarding of pooled frame copies to downstream consumers
//! - `NDROIStatConfigure` shell command
//!
//! # Example
//!
//! ```
//! use roistat::{ColorMode, Frame, FrameData, Param, PluginDriver, RoiStatConfig};
//!
//! let driver = PluginDriver::new(RoiStatConfig {
//!     blocking_callbacks: true,
//!     max_rois: 2,
//!     ..Default::default()
//! })
//! .unwrap();
//! driver.write_int32(1, Param::Use, 1).unwrap();
//! driver.write_int32(1, Param::Dim0Size, 2).unwrap();
//! driver.write_int32(1, Param::Dim1Size, 2).unwrap();
//!
//! let frame = Frame::new(vec![2, 2], ColorMode::Mono, FrameData::Float32(vec![1.0, 2.0, 3.0, 4.0])).unwrap();
//! driver.push_frame(frame).unwrap();
//! assert_eq!(driver.read_float64(1, Param::Total).unwrap(), 10.0);
//! ```

mod log_setup;

pub use log_setup::setup_logging;

// Re-export core types (frames, regions, reduction)
pub use roistat_core::*;

// Plugin layer as a module, with its main types at the top level
pub use roistat_plugin as plugin;
pub use roistat_plugin::{
    CommandRegistry, FramePlugin, FramePool, Param, ParamLibrary, ParamStore, PluginDriver,
    PluginError, PluginResult, RoiStat, RoiStatConfig, register_roistat_commands,
};
