//! Parameter store
//!
//! Every configuration and result value of the plugin lives in a
//! [`ParamStore`], addressed by region index. Global keys (frame size,
//! counters, plugin identity) live at address 0.
//!
//! [`ParamLibrary`] is the in-memory store: one typed table per address,
//! change tracking, and subscribers that see every changed value when its
//! address is notified.

use crate::error::{PluginError, PluginResult};
use std::collections::HashMap;
use std::fmt;
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString, IntoStaticStr};

/// Value kind of a parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum ParamKind {
    #[strum(serialize = "int")]
    Int,
    #[strum(serialize = "double")]
    Double,
    #[strum(serialize = "string")]
    String,
}

/// Parameter keys
///
/// The wire name of each key is its `Display` form and parses back with
/// [`std::str::FromStr`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, EnumString, IntoStaticStr,
)]
pub enum Param {
    // Driver keys
    #[strum(serialize = "ARRAY_SIZE_X")]
    ArraySizeX,
    #[strum(serialize = "ARRAY_SIZE_Y")]
    ArraySizeY,
    #[strum(serialize = "ARRAY_SIZE_Z")]
    ArraySizeZ,
    #[strum(serialize = "ARRAY_COUNTER")]
    ArrayCounter,
    #[strum(serialize = "DROPPED_ARRAYS")]
    DroppedArrays,
    #[strum(serialize = "PLUGIN_TYPE")]
    PluginType,
    #[strum(serialize = "PORT_NAME")]
    PortName,
    #[strum(serialize = "NDARRAY_PORT")]
    ArrayPort,
    #[strum(serialize = "NDARRAY_ADDR")]
    ArrayAddr,
    #[strum(serialize = "ENABLE_CALLBACKS")]
    EnableCallbacks,
    #[strum(serialize = "BLOCKING_CALLBACKS")]
    BlockingCallbacks,
    #[strum(serialize = "QUEUE_SIZE")]
    QueueSize,
    #[strum(serialize = "PRIORITY")]
    Priority,

    // Region keys
    #[strum(serialize = "ROISTAT_NAME")]
    Name,
    #[strum(serialize = "ROISTAT_USE")]
    Use,
    #[strum(serialize = "ROISTAT_RESET")]
    Reset,
    #[strum(serialize = "ROISTAT_RESETALL")]
    ResetAll,
    /// Forward a copy of each frame downstream; read from address 0
    #[strum(serialize = "ROISTAT_NDARRAY_CALLBACKS")]
    ArrayCallbacks,
    #[strum(serialize = "ROISTAT_DIM0_MIN")]
    Dim0Min,
    #[strum(serialize = "ROISTAT_DIM0_SIZE")]
    Dim0Size,
    #[strum(serialize = "ROISTAT_DIM0_MAX_SIZE")]
    Dim0MaxSize,
    #[strum(serialize = "ROISTAT_DIM1_MIN")]
    Dim1Min,
    #[strum(serialize = "ROISTAT_DIM1_SIZE")]
    Dim1Size,
    #[strum(serialize = "ROISTAT_DIM1_MAX_SIZE")]
    Dim1MaxSize,
    #[strum(serialize = "ROISTAT_DIM2_MIN")]
    Dim2Min,
    #[strum(serialize = "ROISTAT_DIM2_SIZE")]
    Dim2Size,
    #[strum(serialize = "ROISTAT_DIM2_MAX_SIZE")]
    Dim2MaxSize,
    #[strum(serialize = "ROISTAT_MIN_VALUE")]
    MinValue,
    #[strum(serialize = "ROISTAT_MAX_VALUE")]
    MaxValue,
    #[strum(serialize = "ROISTAT_MEAN_VALUE")]
    MeanValue,
    #[strum(serialize = "ROISTAT_TOTAL")]
    Total,
}

impl Param {
    /// Value kind stored under this key
    pub fn kind(self) -> ParamKind {
        match self {
            Param::PluginType | Param::PortName | Param::ArrayPort | Param::Name => {
                ParamKind::String
            }
            Param::MinValue | Param::MaxValue | Param::MeanValue | Param::Total => {
                ParamKind::Double
            }
            _ => ParamKind::Int,
        }
    }

    /// Wire name
    #[inline]
    pub fn name(self) -> &'static str {
        self.into()
    }

    /// Offset key of logical axis `axis`
    pub fn dim_min(axis: usize) -> Option<Param> {
        [Param::Dim0Min, Param::Dim1Min, Param::Dim2Min]
            .get(axis)
            .copied()
    }

    /// Size key of logical axis `axis`
    pub fn dim_size(axis: usize) -> Option<Param> {
        [Param::Dim0Size, Param::Dim1Size, Param::Dim2Size]
            .get(axis)
            .copied()
    }

    /// Maximum-size key of logical axis `axis`
    pub fn dim_max_size(axis: usize) -> Option<Param> {
        [Param::Dim0MaxSize, Param::Dim1MaxSize, Param::Dim2MaxSize]
            .get(axis)
            .copied()
    }

    /// Frame-size key of physical axis `axis`
    pub fn array_size(axis: usize) -> Option<Param> {
        [Param::ArraySizeX, Param::ArraySizeY, Param::ArraySizeZ]
            .get(axis)
            .copied()
    }

    /// Look a key up by wire name.
    pub fn from_name(name: &str) -> PluginResult<Param> {
        name.parse()
            .map_err(|_| PluginError::UnknownParam(name.to_string()))
    }
}

/// Typed parameter value
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Int(i32),
    Double(f64),
    String(String),
}

impl ParamValue {
    /// Zero value of a kind
    pub fn default_for(kind: ParamKind) -> Self {
        match kind {
            ParamKind::Int => ParamValue::Int(0),
            ParamKind::Double => ParamValue::Double(0.0),
            ParamKind::String => ParamValue::String(String::new()),
        }
    }

    pub fn kind(&self) -> ParamKind {
        match self {
            ParamValue::Int(_) => ParamKind::Int,
            ParamValue::Double(_) => ParamKind::Double,
            ParamValue::String(_) => ParamKind::String,
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Int(v) => write!(f, "{v}"),
            ParamValue::Double(v) => write!(f, "{v}"),
            ParamValue::String(v) => write!(f, "\"{v}\""),
        }
    }
}

/// A changed value delivered to subscribers
#[derive(Debug, Clone, PartialEq)]
pub struct ParamEvent {
    pub addr: usize,
    pub param: Param,
    pub value: ParamValue,
}

/// Key/value store addressed by region index
///
/// Setters only record values; subscribers see them once the address is
/// notified with [`ParamStore::call_param_callbacks`].
pub trait ParamStore {
    /// Number of addresses
    fn max_addr(&self) -> usize;

    fn get_int(&self, addr: usize, param: Param) -> PluginResult<i32>;
    fn get_double(&self, addr: usize, param: Param) -> PluginResult<f64>;
    fn get_string(&self, addr: usize, param: Param) -> PluginResult<String>;

    fn set_int(&mut self, addr: usize, param: Param, value: i32) -> PluginResult<()>;
    fn set_double(&mut self, addr: usize, param: Param, value: f64) -> PluginResult<()>;
    fn set_string(&mut self, addr: usize, param: Param, value: &str) -> PluginResult<()>;

    /// Deliver every value changed at `addr` since its last notification.
    fn call_param_callbacks(&mut self, addr: usize) -> PluginResult<()>;

    /// Notify the global scope (address 0).
    fn call_global_callbacks(&mut self) -> PluginResult<()> {
        self.call_param_callbacks(0)
    }

    fn get_global_int(&self, param: Param) -> PluginResult<i32> {
        self.get_int(0, param)
    }

    fn set_global_int(&mut self, param: Param, value: i32) -> PluginResult<()> {
        self.set_int(0, param, value)
    }
}

/// Subscriber callback
pub type ParamListener = dyn FnMut(&ParamEvent) + Send;

#[derive(Debug)]
struct ParamList {
    values: HashMap<Param, ParamValue>,
    changed: Vec<Param>,
}

impl ParamList {
    fn new() -> Self {
        let values = Param::iter()
            .map(|p| (p, ParamValue::default_for(p.kind())))
            .collect();
        Self {
            values,
            changed: Vec::new(),
        }
    }
}

/// In-memory [`ParamStore`]
pub struct ParamLibrary {
    lists: Vec<ParamList>,
    listeners: Vec<Box<ParamListener>>,
}

impl ParamLibrary {
    /// Create a store with `max_addr` addresses (at least one).
    ///
    /// Every key starts at the zero value of its kind.
    pub fn new(max_addr: usize) -> Self {
        let lists = (0..max_addr.max(1)).map(|_| ParamList::new()).collect();
        Self {
            lists,
            listeners: Vec::new(),
        }
    }

    /// Register a subscriber for changed values.
    pub fn subscribe<F>(&mut self, listener: F)
    where
        F: FnMut(&ParamEvent) + Send + 'static,
    {
        self.listeners.push(Box::new(listener));
    }

    /// Look up a value regardless of kind.
    pub fn get(&self, addr: usize, param: Param) -> PluginResult<&ParamValue> {
        self.list(addr)?
            .values
            .get(&param)
            .ok_or_else(|| PluginError::UnknownParam(param.name().to_string()))
    }

    /// Keys changed at `addr` and not yet notified
    pub fn pending(&self, addr: usize) -> PluginResult<&[Param]> {
        Ok(&self.list(addr)?.changed)
    }

    fn list(&self, addr: usize) -> PluginResult<&ParamList> {
        let max_addr = self.lists.len();
        self.lists
            .get(addr)
            .ok_or(PluginError::AddressOutOfRange { addr, max_addr })
    }

    fn store(&mut self, addr: usize, param: Param, value: ParamValue) -> PluginResult<()> {
        let expected = param.kind();
        if value.kind() != expected {
            return Err(PluginError::KindMismatch {
                param,
                expected,
                actual: value.kind(),
            });
        }
        let max_addr = self.lists.len();
        let list = self
            .lists
            .get_mut(addr)
            .ok_or(PluginError::AddressOutOfRange { addr, max_addr })?;
        if list.values.get(&param) != Some(&value) {
            list.values.insert(param, value);
            if !list.changed.contains(&param) {
                list.changed.push(param);
            }
        }
        Ok(())
    }
}

fn mismatch(param: Param, stored: &ParamValue, requested: ParamKind) -> PluginError {
    PluginError::KindMismatch {
        param,
        expected: stored.kind(),
        actual: requested,
    }
}

impl ParamStore for ParamLibrary {
    fn max_addr(&self) -> usize {
        self.lists.len()
    }

    fn get_int(&self, addr: usize, param: Param) -> PluginResult<i32> {
        match self.get(addr, param)? {
            ParamValue::Int(v) => Ok(*v),
            other => Err(mismatch(param, other, ParamKind::Int)),
        }
    }

    fn get_double(&self, addr: usize, param: Param) -> PluginResult<f64> {
        match self.get(addr, param)? {
            ParamValue::Double(v) => Ok(*v),
            other => Err(mismatch(param, other, ParamKind::Double)),
        }
    }

    fn get_string(&self, addr: usize, param: Param) -> PluginResult<String> {
        match self.get(addr, param)? {
            ParamValue::String(v) => Ok(v.clone()),
            other => Err(mismatch(param, other, ParamKind::String)),
        }
    }

    fn set_int(&mut self, addr: usize, param: Param, value: i32) -> PluginResult<()> {
        self.store(addr, param, ParamValue::Int(value))
    }

    fn set_double(&mut self, addr: usize, param: Param, value: f64) -> PluginResult<()> {
        self.store(addr, param, ParamValue::Double(value))
    }

    fn set_string(&mut self, addr: usize, param: Param, value: &str) -> PluginResult<()> {
        self.store(addr, param, ParamValue::String(value.to_string()))
    }

    fn call_param_callbacks(&mut self, addr: usize) -> PluginResult<()> {
        let max_addr = self.lists.len();
        let list = self
            .lists
            .get_mut(addr)
            .ok_or(PluginError::AddressOutOfRange { addr, max_addr })?;
        let changed = std::mem::take(&mut list.changed);
        for param in changed {
            let Some(value) = list.values.get(&param) else {
                continue;
            };
            let event = ParamEvent {
                addr,
                param,
                value: value.clone(),
            };
            for listener in &mut self.listeners {
                listener(&event);
            }
        }
        Ok(())
    }
}

impl fmt::Debug for ParamLibrary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParamLibrary")
            .field("max_addr", &self.lists.len())
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
