//! Error types for roistat-plugin

use crate::params::{Param, ParamKind};
use thiserror::Error;

/// Errors that can occur in the plugin layer
#[derive(Debug, Error)]
pub enum PluginError {
    /// Core library error
    #[error("core error: {0}")]
    Core(#[from] roistat_core::Error),

    /// Parameter name not known to the store
    #[error("unknown parameter: {0}")]
    UnknownParam(String),

    /// Parameter accessed with the wrong value kind
    #[error("parameter {param} holds {expected} values, not {actual}")]
    KindMismatch {
        param: Param,
        expected: ParamKind,
        actual: ParamKind,
    },

    /// Address outside `[0, max_addr)`
    #[error("address {addr} out of range (max {max_addr})")]
    AddressOutOfRange { addr: usize, max_addr: usize },

    /// One or more parameter writes of an operation failed
    #[error("{function}: {failures} parameter write(s) failed, addr={addr}, value={value}")]
    ParamWrite {
        function: &'static str,
        addr: usize,
        value: i32,
        failures: usize,
    },

    /// Shell command not registered
    #[error("unknown command: {0}")]
    UnknownCommand(String),

    /// Too many arguments for a shell command
    #[error("{command}: expected at most {expected} arguments, got {actual}")]
    ArgumentCount {
        command: String,
        expected: usize,
        actual: usize,
    },

    /// Shell argument could not be parsed
    #[error("{command}: bad value for argument '{arg}': {message}")]
    BadArgument {
        command: String,
        arg: &'static str,
        message: String,
    },

    /// A driver with this port name already exists
    #[error("port already exists: {0}")]
    DuplicatePort(String),

    /// Configuration could not be parsed
    #[error("configuration error: {0}")]
    Config(#[from] serde_yml::Error),

    /// Processing thread is gone
    #[error("frame queue closed for port {0}")]
    QueueClosed(String),

    /// I/O error (thread spawn, configuration file)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for plugin operations
pub type PluginResult<T> = Result<T, PluginError>;
