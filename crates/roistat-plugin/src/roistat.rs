//! Region set controller
//!
//! [`RoiStat`] owns the fixed set of regions and runs them over every
//! delivered frame. It is driven through the [`FramePlugin`] interface and
//! expects the parameter store lock to be held on entry. Per enabled
//! region it:
//!
//! 1. reads the configured window under the lock,
//! 2. clamps it and publishes the corrected window,
//! 3. releases the lock, reorders the window into storage order and runs
//!    the reduction,
//! 4. re-acquires the lock and publishes min/max/mean/total,
//! 5. optionally forwards a pooled copy of the frame with the lock
//!    released again,
//! 6. notifies the region address.
//!
//! Between the release and the re-acquire only the frame and the
//! controller's private region copy are touched.

use crate::callbacks::ArrayCallbacks;
use crate::error::{PluginError, PluginResult};
use crate::params::{Param, ParamStore};
use crate::pool::FramePool;
use log::{debug, error, info, trace, warn};
use parking_lot::MutexGuard;
use roistat_core::remap::{self, AxisMap, AxisReport};
use roistat_core::{Frame, MAX_ROI_DIMS, Region, RoiDim, RoiStatistics};

/// Value published under [`Param::PluginType`]
pub const PLUGIN_TYPE: &str = "NDPluginROIStat";

/// Hooks the plugin driver invokes
pub trait FramePlugin {
    /// Process one frame. `params` is locked on entry and on return.
    fn on_frame<S: ParamStore>(&mut self, frame: &Frame, params: &mut MutexGuard<'_, S>);

    /// Handle an integer write from a client.
    ///
    /// # Errors
    ///
    /// Returns the first hard failure, or an aggregated
    /// [`PluginError::ParamWrite`] if any step failed.
    fn on_int_write<S: ParamStore>(
        &self,
        params: &mut S,
        addr: usize,
        param: Param,
        value: i32,
    ) -> PluginResult<()>;
}

/// Collects failures of a sequence of writes that must all be attempted.
#[derive(Debug, Default)]
struct WriteStatus {
    failures: Vec<PluginError>,
}

impl WriteStatus {
    fn check(&mut self, result: PluginResult<()>) {
        if let Err(e) = result {
            self.failures.push(e);
        }
    }

    fn is_ok(&self) -> bool {
        self.failures.is_empty()
    }

    fn into_result(self, function: &'static str, addr: usize, value: i32) -> PluginResult<()> {
        if self.is_ok() {
            return Ok(());
        }
        for failure in &self.failures {
            warn!("{function}: addr={addr}: {failure}");
        }
        Err(PluginError::ParamWrite {
            function,
            addr,
            value,
            failures: self.failures.len(),
        })
    }
}

/// Zero the published statistics of region `roi` and notify its address.
///
/// The caller holds the store lock.
///
/// # Errors
///
/// [`PluginError::ParamWrite`] if any of the writes failed; all of them
/// are attempted.
pub fn clear<S: ParamStore + ?Sized>(params: &mut S, roi: usize) -> PluginResult<()> {
    debug!("clearing statistics, roi={roi}");
    let mut status = WriteStatus::default();
    for param in [Param::MinValue, Param::MaxValue, Param::MeanValue, Param::Total] {
        status.check(params.set_double(roi, param, 0.0));
    }
    status.check(params.call_param_callbacks(roi));
    if !status.is_ok() {
        error!("error clearing statistics, roi={roi}");
    }
    status.into_result("clear", roi, 0)
}

/// [`clear`] every region in `0..max_rois`.
pub fn reset_all<S: ParamStore + ?Sized>(params: &mut S, max_rois: usize) -> PluginResult<()> {
    let mut status = WriteStatus::default();
    for roi in 0..max_rois {
        status.check(clear(params, roi));
    }
    status.into_result("reset_all", 0, 0)
}

/// Store a client integer write and run its side effects.
///
/// `ROISTAT_RESET` clears region `addr`, `ROISTAT_RESETALL` clears every
/// region in `0..max_rois`. The address and the global scope are notified
/// afterwards. Needs only the store lock, never the controller.
///
/// # Errors
///
/// [`PluginError::AddressOutOfRange`] for a bad address, otherwise an
/// aggregated [`PluginError::ParamWrite`] if any step failed. Every step
/// is attempted.
pub fn write_int32<S: ParamStore + ?Sized>(
    params: &mut S,
    max_rois: usize,
    addr: usize,
    param: Param,
    value: i32,
) -> PluginResult<()> {
    let max_addr = params.max_addr();
    if addr >= max_addr {
        return Err(PluginError::AddressOutOfRange { addr, max_addr });
    }

    let mut status = WriteStatus::default();
    status.check(params.set_int(addr, param, value));
    match param {
        Param::Reset => status.check(clear(params, addr)),
        Param::ResetAll => status.check(reset_all(params, max_rois)),
        _ => {}
    }
    status.check(params.call_param_callbacks(addr));
    status.check(params.call_global_callbacks());

    let function = param.name();
    status.into_result(function, addr, value)?;
    trace!("write_int32: function={function}, roi={addr}, value={value}");
    Ok(())
}

/// Region-of-interest statistics controller
#[derive(Debug)]
pub struct RoiStat {
    regions: Vec<Region>,
    pool: FramePool,
    callbacks: ArrayCallbacks,
}

impl RoiStat {
    /// Create a controller with `max_rois` regions.
    ///
    /// At least one region is always allocated.
    pub fn new(max_rois: usize, pool: FramePool) -> Self {
        if max_rois < 1 {
            warn!("max_rois must be at least 1, using 1");
        }
        let max_rois = max_rois.max(1);
        info!("created {PLUGIN_TYPE} controller with {max_rois} regions");
        Self {
            regions: vec![Region::new(); max_rois],
            pool,
            callbacks: ArrayCallbacks::new(),
        }
    }

    #[inline]
    pub fn max_rois(&self) -> usize {
        self.regions.len()
    }

    /// Private state of region `roi` after the last processed frame
    pub fn region(&self, roi: usize) -> Option<&Region> {
        self.regions.get(roi)
    }

    #[inline]
    pub fn pool(&self) -> &FramePool {
        &self.pool
    }

    /// Add a consumer of forwarded frame copies.
    pub fn register_array_callback<F>(&mut self, consumer: F)
    where
        F: Fn(&Frame) + Send + Sync + 'static,
    {
        self.callbacks.register(consumer);
    }

    /// Write the initial value of every plugin key at every region address.
    ///
    /// # Errors
    ///
    /// Fails if `params` has fewer addresses than regions.
    pub fn init_params<S: ParamStore + ?Sized>(&self, params: &mut S) -> PluginResult<()> {
        params.set_string(0, Param::PluginType, PLUGIN_TYPE)?;
        params.set_int(0, Param::ArrayCallbacks, 0)?;
        for roi in 0..self.max_rois() {
            params.set_string(roi, Param::Name, "")?;
            for param in [Param::Use, Param::Reset, Param::ResetAll] {
                params.set_int(roi, param, 0)?;
            }
            for axis in 0..MAX_ROI_DIMS {
                for key in [
                    Param::dim_min(axis),
                    Param::dim_size(axis),
                    Param::dim_max_size(axis),
                ]
                .into_iter()
                .flatten()
                {
                    params.set_int(roi, key, 0)?;
                }
            }
            for param in [Param::MinValue, Param::MaxValue, Param::MeanValue, Param::Total] {
                params.set_double(roi, param, 0.0)?;
            }
        }
        Ok(())
    }

    /// Read the configured logical window of region `roi`.
    fn read_window<S: ParamStore + ?Sized>(
        params: &S,
        roi: usize,
    ) -> PluginResult<[RoiDim; MAX_ROI_DIMS]> {
        let mut dims = [RoiDim::default(); MAX_ROI_DIMS];
        for (axis, dim) in dims.iter_mut().enumerate() {
            if let (Some(min), Some(size)) = (Param::dim_min(axis), Param::dim_size(axis)) {
                *dim = RoiDim::new(params.get_int(roi, min)?, params.get_int(roi, size)?);
            }
        }
        Ok(dims)
    }
}

fn publish_frame_size<S: ParamStore + ?Sized>(params: &mut S, frame: &Frame) {
    for (axis, &extent) in frame.dims().iter().enumerate() {
        let Some(key) = Param::array_size(axis) else {
            break;
        };
        let value = i32::try_from(extent).unwrap_or(i32::MAX);
        if let Err(e) = params.set_global_int(key, value) {
            warn!("failed to publish {key}: {e}");
        }
    }
}

fn publish_window<S: ParamStore + ?Sized>(
    params: &mut S,
    roi: usize,
    reports: &[AxisReport],
) -> PluginResult<()> {
    let mut status = WriteStatus::default();
    for axis in 0..MAX_ROI_DIMS {
        let (Some(max_size), Some(min), Some(size)) = (
            Param::dim_max_size(axis),
            Param::dim_min(axis),
            Param::dim_size(axis),
        ) else {
            break;
        };
        // Axes beyond the frame rank report a maximum size of 0
        let Some(report) = reports.get(axis) else {
            status.check(params.set_int(roi, max_size, 0));
            continue;
        };
        let extent = i32::try_from(report.max_size).unwrap_or(i32::MAX);
        status.check(params.set_int(roi, max_size, extent));
        status.check(params.set_int(roi, min, report.offset));
        status.check(params.set_int(roi, size, report.size));
    }
    status.into_result("publish_window", roi, 0)
}

fn publish_statistics<S: ParamStore + ?Sized>(
    params: &mut S,
    roi: usize,
    stats: &RoiStatistics,
) -> PluginResult<()> {
    let mut status = WriteStatus::default();
    status.check(params.set_double(roi, Param::MinValue, stats.min));
    status.check(params.set_double(roi, Param::MaxValue, stats.max));
    status.check(params.set_double(roi, Param::MeanValue, stats.mean));
    status.check(params.set_double(roi, Param::Total, stats.total));
    status.into_result("publish_statistics", roi, 0)
}

impl FramePlugin for RoiStat {
    fn on_frame<S: ParamStore>(&mut self, frame: &Frame, params: &mut MutexGuard<'_, S>) {
        publish_frame_size(&mut **params, frame);
        let map = AxisMap::for_frame(frame);

        for roi in 0..self.max_rois() {
            match params.get_int(roi, Param::Use) {
                Ok(0) => continue,
                Ok(_) => {}
                Err(e) => {
                    warn!("roi={roi}: cannot read {}: {e}", Param::Use);
                    continue;
                }
            }

            let Some(region) = self.regions.get_mut(roi) else {
                error!("roi={roi}: region missing, abandoning frame");
                return;
            };

            match Self::read_window(&**params, roi) {
                Ok(dims) => region.dims = dims,
                Err(e) => {
                    warn!("roi={roi}: cannot read window: {e}");
                    continue;
                }
            }

            let reports = remap::clamp_region(region, frame, &map);
            if let Err(e) = publish_window(&mut **params, roi, &reports) {
                warn!("roi={roi}: {e}");
            }

            let reduced = MutexGuard::unlocked(params, || {
                remap::reorder_for_storage(region, frame, &map);
                region.compute_statistics(frame).map(|stats| *stats)
            });
            if let Err(e) = reduced {
                error!("roi={roi}: statistics failed: {e}");
            }

            let stats = *region.statistics();
            if let Err(e) = publish_statistics(&mut **params, roi, &stats) {
                warn!("roi={roi}: {e}");
            }
            trace!(
                "roi={roi}, min={}, max={}, mean={}, total={}",
                stats.min, stats.max, stats.mean, stats.total
            );

            if params.get_global_int(Param::ArrayCallbacks).unwrap_or(0) == 1 {
                match self.pool.duplicate(frame) {
                    Some(copy) => {
                        MutexGuard::unlocked(params, || self.callbacks.call(&copy));
                        self.pool.release(copy);
                    }
                    None => error!("roi={roi}: couldn't allocate output array, callbacks failed"),
                }
            }

            if let Err(e) = params.call_param_callbacks(roi) {
                warn!("roi={roi}: notification failed: {e}");
            }
        }

        if let Err(e) = params.call_global_callbacks() {
            warn!("global notification failed: {e}");
        }
    }

    fn on_int_write<S: ParamStore>(
        &self,
        params: &mut S,
        addr: usize,
        param: Param,
        value: i32,
    ) -> PluginResult<()> {
        write_int32(params, self.max_rois(), addr, param, value)
    }
}
