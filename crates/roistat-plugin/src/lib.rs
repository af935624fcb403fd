//! roistat-plugin - Region-of-interest statistics plugin
//!
//! Runs a fixed set of regions of interest over a stream of frames and
//! publishes per-region min/max/mean/total through a parameter store.
//!
//! - [`ParamLibrary`] / [`ParamStore`] - addressed key/value store with
//!   change notification
//! - [`RoiStat`] - region set controller ([`FramePlugin`] hooks)
//! - [`FramePool`] / [`ArrayCallbacks`] - copies forwarded downstream
//! - [`PluginDriver`] - blocking or queued frame dispatch
//! - [`CommandRegistry`] - `NDROIStatConfigure` shell entry point
//!
//! # Example
//!
//! ```
//! use roistat_core::{ColorMode, Frame, FrameData};
//! use roistat_plugin::{Param, PluginDriver, RoiStatConfig};
//!
//! let driver = PluginDriver::new(RoiStatConfig {
//!     blocking_callbacks: true,
//!     ..Default::default()
//! })
//! .unwrap();
//! driver.write_int32(0, Param::Use, 1).unwrap();
//! driver.write_int32(0, Param::Dim0Size, 3).unwrap();
//!
//! let frame = Frame::new(vec![3], ColorMode::Mono, FrameData::UInt8(vec![2, 4, 6])).unwrap();
//! driver.push_frame(frame).unwrap();
//! assert_eq!(driver.read_float64(0, Param::MeanValue).unwrap(), 4.0);
//! ```

pub mod callbacks;
pub mod config;
pub mod driver;
pub mod error;
pub mod params;
pub mod pool;
pub mod roistat;
pub mod shell;

pub use callbacks::{ArrayCallback, ArrayCallbacks};
pub use config::RoiStatConfig;
pub use driver::PluginDriver;
pub use error::{PluginError, PluginResult};
pub use params::{Param, ParamEvent, ParamKind, ParamLibrary, ParamStore, ParamValue};
pub use pool::{FramePool, PoolUsage, PooledFrame};
pub use roistat::{FramePlugin, PLUGIN_TYPE, RoiStat, clear, reset_all, write_int32};
pub use shell::{CommandRegistry, PortRegistry, register_roistat_commands};
