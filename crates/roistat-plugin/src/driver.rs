//! Plugin driver
//!
//! [`PluginDriver`] ties a [`RoiStat`] controller to its parameter store
//! and frame pool and decides where frames are processed: in the caller's
//! thread when `BLOCKING_CALLBACKS` is set, otherwise on a dedicated
//! thread fed by a bounded queue.
//!
//! Frame processing locks the controller first and the parameter store
//! second. Client writes take only the parameter store, so they proceed
//! while a frame is in its unlocked sections, including from downstream
//! consumers.

use crate::config::RoiStatConfig;
use crate::error::{PluginError, PluginResult};
use crate::params::{Param, ParamLibrary, ParamStore};
use crate::pool::FramePool;
use crate::roistat::{self, FramePlugin, RoiStat};
use log::{debug, error, info, warn};
use parking_lot::Mutex;
use roistat_core::Frame;
use std::sync::Arc;
use std::sync::mpsc::{Receiver, SyncSender, TrySendError, sync_channel};
use std::thread::{self, JoinHandle};

/// Running statistics plugin port
#[derive(Debug)]
pub struct PluginDriver {
    config: RoiStatConfig,
    params: Arc<Mutex<ParamLibrary>>,
    plugin: Arc<Mutex<RoiStat>>,
    max_rois: usize,
    queue: Option<SyncSender<Frame>>,
    worker: Option<JoinHandle<()>>,
}

fn process(frame: &Frame, plugin: &Mutex<RoiStat>, params: &Mutex<ParamLibrary>) {
    let mut plugin = plugin.lock();
    let mut params = params.lock();
    let counter = params.get_global_int(Param::ArrayCounter).unwrap_or(0);
    if let Err(e) = params.set_global_int(Param::ArrayCounter, counter.wrapping_add(1)) {
        warn!("failed to update {}: {e}", Param::ArrayCounter);
    }
    plugin.on_frame(frame, &mut params);
}

fn run_queue(
    port_name: String,
    frames: Receiver<Frame>,
    plugin: Arc<Mutex<RoiStat>>,
    params: Arc<Mutex<ParamLibrary>>,
) {
    debug!("{port_name}: processing thread started");
    for frame in frames {
        process(&frame, &plugin, &params);
    }
    debug!("{port_name}: processing thread stopped");
}

fn record_config(params: &mut ParamLibrary, config: &RoiStatConfig) -> PluginResult<()> {
    params.set_string(0, Param::PortName, &config.port_name)?;
    params.set_string(0, Param::ArrayPort, &config.array_port)?;
    params.set_int(0, Param::ArrayAddr, config.array_addr)?;
    let queue_size = i32::try_from(config.effective_queue_size()).unwrap_or(i32::MAX);
    params.set_int(0, Param::QueueSize, queue_size)?;
    params.set_int(0, Param::BlockingCallbacks, i32::from(config.blocking_callbacks))?;
    params.set_int(0, Param::EnableCallbacks, 1)?;
    params.set_int(0, Param::Priority, config.priority)?;
    params.set_int(0, Param::ArrayCounter, 0)?;
    params.set_int(0, Param::DroppedArrays, 0)?;
    Ok(())
}

impl PluginDriver {
    /// Build the store, controller and pool described by `config` and
    /// start the processing thread.
    ///
    /// # Errors
    ///
    /// Fails if the parameters cannot be initialised or the thread cannot
    /// be spawned.
    pub fn new(config: RoiStatConfig) -> PluginResult<Self> {
        let max_rois = config.effective_max_rois();
        let pool = FramePool::new(config.max_buffers, config.max_memory);
        let plugin = RoiStat::new(max_rois, pool);
        let max_rois = plugin.max_rois();

        let mut params = ParamLibrary::new(plugin.max_rois());
        plugin.init_params(&mut params)?;
        record_config(&mut params, &config)?;
        params.call_global_callbacks()?;

        let params = Arc::new(Mutex::new(params));
        let plugin = Arc::new(Mutex::new(plugin));

        let (queue, frames) = sync_channel(config.effective_queue_size());
        let mut builder = thread::Builder::new().name(format!("{}_plugin", config.port_name));
        if config.stack_size > 0 {
            builder = builder.stack_size(config.stack_size);
        }
        let worker = {
            let port_name = config.port_name.clone();
            let plugin = Arc::clone(&plugin);
            let params = Arc::clone(&params);
            builder.spawn(move || run_queue(port_name, frames, plugin, params))?
        };

        info!(
            "{}: {max_rois} regions, queue size {}, blocking={}",
            config.port_name,
            config.effective_queue_size(),
            config.blocking_callbacks
        );

        Ok(Self {
            config,
            params,
            plugin,
            max_rois,
            queue: Some(queue),
            worker: Some(worker),
        })
    }

    #[inline]
    pub fn port_name(&self) -> &str {
        &self.config.port_name
    }

    #[inline]
    pub fn config(&self) -> &RoiStatConfig {
        &self.config
    }

    /// Shared handle to the parameter store
    pub fn params(&self) -> Arc<Mutex<ParamLibrary>> {
        Arc::clone(&self.params)
    }

    /// Shared handle to the controller
    pub fn plugin(&self) -> Arc<Mutex<RoiStat>> {
        Arc::clone(&self.plugin)
    }

    /// Add a consumer of forwarded frame copies.
    pub fn register_array_callback<F>(&self, consumer: F)
    where
        F: Fn(&Frame) + Send + Sync + 'static,
    {
        self.plugin.lock().register_array_callback(consumer);
    }

    /// Deliver a frame.
    ///
    /// Ignored while `ENABLE_CALLBACKS` is 0. With `BLOCKING_CALLBACKS`
    /// set the frame is processed before this returns; otherwise it is
    /// queued, or dropped and counted if the queue is full.
    ///
    /// # Errors
    ///
    /// [`PluginError::QueueClosed`] after [`PluginDriver::shutdown`].
    pub fn push_frame(&self, frame: Frame) -> PluginResult<()> {
        let (enabled, blocking) = {
            let params = self.params.lock();
            (
                params.get_global_int(Param::EnableCallbacks)?,
                params.get_global_int(Param::BlockingCallbacks)?,
            )
        };
        if enabled == 0 {
            return Ok(());
        }
        if blocking != 0 {
            process(&frame, &self.plugin, &self.params);
            return Ok(());
        }

        let queue = self
            .queue
            .as_ref()
            .ok_or_else(|| PluginError::QueueClosed(self.port_name().to_string()))?;
        match queue.try_send(frame) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => {
                let mut params = self.params.lock();
                let dropped = params.get_global_int(Param::DroppedArrays)?.wrapping_add(1);
                params.set_global_int(Param::DroppedArrays, dropped)?;
                params.call_global_callbacks()?;
                warn!("{}: queue full, dropped frame ({dropped} total)", self.port_name());
                Ok(())
            }
            Err(TrySendError::Disconnected(_)) => {
                error!("{}: processing thread is gone", self.port_name());
                Err(PluginError::QueueClosed(self.port_name().to_string()))
            }
        }
    }

    /// Client integer write on `param` at address `addr`.
    ///
    /// Does not wait for a frame in progress.
    pub fn write_int32(&self, addr: usize, param: Param, value: i32) -> PluginResult<()> {
        let mut params = self.params.lock();
        roistat::write_int32(&mut *params, self.max_rois, addr, param, value)
    }

    /// Client floating-point write.
    pub fn write_float64(&self, addr: usize, param: Param, value: f64) -> PluginResult<()> {
        let mut params = self.params.lock();
        params.set_double(addr, param, value)?;
        params.call_param_callbacks(addr)
    }

    /// Client string write.
    pub fn write_octet(&self, addr: usize, param: Param, value: &str) -> PluginResult<()> {
        let mut params = self.params.lock();
        params.set_string(addr, param, value)?;
        params.call_param_callbacks(addr)
    }

    pub fn read_int32(&self, addr: usize, param: Param) -> PluginResult<i32> {
        self.params.lock().get_int(addr, param)
    }

    pub fn read_float64(&self, addr: usize, param: Param) -> PluginResult<f64> {
        self.params.lock().get_double(addr, param)
    }

    pub fn read_octet(&self, addr: usize, param: Param) -> PluginResult<String> {
        self.params.lock().get_string(addr, param)
    }

    /// Close the queue and wait for queued frames to finish.
    pub fn shutdown(&mut self) {
        self.queue = None;
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                error!("{}: processing thread panicked", self.port_name());
            }
        }
    }
}

impl Drop for PluginDriver {
    fn drop(&mut self) {
        self.shutdown();
    }
}
