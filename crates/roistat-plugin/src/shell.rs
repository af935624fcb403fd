//! Shell command registration
//!
//! A [`CommandRegistry`] maps command names to typed argument lists and a
//! handler. Arguments arrive as text; each is parsed by the kind its
//! definition declares, and missing trailing arguments take the zero
//! value of their kind. Drivers created by commands are kept in the
//! registry's [`PortRegistry`] under their port name.

use crate::config::RoiStatConfig;
use crate::driver::PluginDriver;
use crate::error::{PluginError, PluginResult};
use log::info;
use std::collections::HashMap;

/// Kind of a command argument
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgKind {
    String,
    Int,
}

/// Parsed command argument
#[derive(Debug, Clone, PartialEq)]
pub enum ArgValue {
    String(String),
    Int(i64),
}

impl ArgValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ArgValue::String(s) => Some(s),
            ArgValue::Int(_) => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            ArgValue::Int(v) => Some(*v),
            ArgValue::String(_) => None,
        }
    }
}

/// Definition of one argument
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArgDef {
    pub name: &'static str,
    pub kind: ArgKind,
}

impl ArgDef {
    pub const fn string(name: &'static str) -> Self {
        Self {
            name,
            kind: ArgKind::String,
        }
    }

    pub const fn int(name: &'static str) -> Self {
        Self {
            name,
            kind: ArgKind::Int,
        }
    }

    fn parse(&self, command: &str, text: Option<&str>) -> PluginResult<ArgValue> {
        let text = text.unwrap_or_default().trim();
        match self.kind {
            ArgKind::String => Ok(ArgValue::String(text.to_string())),
            ArgKind::Int if text.is_empty() => Ok(ArgValue::Int(0)),
            ArgKind::Int => text
                .parse()
                .map(ArgValue::Int)
                .map_err(|e: std::num::ParseIntError| PluginError::BadArgument {
                    command: command.to_string(),
                    arg: self.name,
                    message: e.to_string(),
                }),
        }
    }
}

/// Command handler
pub type CommandFn = fn(&mut PortRegistry, &[ArgValue]) -> PluginResult<()>;

/// A registered command
#[derive(Debug, Clone, Copy)]
pub struct CommandDef {
    pub name: &'static str,
    pub args: &'static [ArgDef],
    pub func: CommandFn,
}

/// Drivers created by shell commands, keyed by port name
#[derive(Debug, Default)]
pub struct PortRegistry {
    drivers: HashMap<String, PluginDriver>,
}

impl PortRegistry {
    /// Add a driver under its port name.
    ///
    /// # Errors
    ///
    /// [`PluginError::DuplicatePort`] if the name is taken.
    pub fn insert(&mut self, driver: PluginDriver) -> PluginResult<()> {
        let name = driver.port_name().to_string();
        if self.drivers.contains_key(&name) {
            return Err(PluginError::DuplicatePort(name));
        }
        self.drivers.insert(name, driver);
        Ok(())
    }

    pub fn get(&self, port_name: &str) -> Option<&PluginDriver> {
        self.drivers.get(port_name)
    }

    pub fn contains(&self, port_name: &str) -> bool {
        self.drivers.contains_key(port_name)
    }

    /// Sorted port names
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.drivers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.drivers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.drivers.is_empty()
    }
}

/// Named shell commands and the ports they created
#[derive(Debug, Default)]
pub struct CommandRegistry {
    commands: HashMap<&'static str, CommandDef>,
    ports: PortRegistry,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a command, replacing any command of the same name.
    pub fn register(&mut self, def: CommandDef) {
        self.commands.insert(def.name, def);
    }

    pub fn command(&self, name: &str) -> Option<&CommandDef> {
        self.commands.get(name)
    }

    pub fn ports(&self) -> &PortRegistry {
        &self.ports
    }

    pub fn ports_mut(&mut self) -> &mut PortRegistry {
        &mut self.ports
    }

    /// Parse `args` against the definition of `name` and run it.
    ///
    /// # Errors
    ///
    /// - [`PluginError::UnknownCommand`] if `name` is not registered.
    /// - [`PluginError::ArgumentCount`] for too many arguments.
    /// - [`PluginError::BadArgument`] if an argument does not parse.
    /// - Any error of the handler.
    pub fn invoke(&mut self, name: &str, args: &[&str]) -> PluginResult<()> {
        let def = *self
            .commands
            .get(name)
            .ok_or_else(|| PluginError::UnknownCommand(name.to_string()))?;
        if args.len() > def.args.len() {
            return Err(PluginError::ArgumentCount {
                command: name.to_string(),
                expected: def.args.len(),
                actual: args.len(),
            });
        }
        let values = def
            .args
            .iter()
            .enumerate()
            .map(|(i, arg)| arg.parse(name, args.get(i).copied()))
            .collect::<PluginResult<Vec<_>>>()?;
        (def.func)(&mut self.ports, &values)
    }

    /// Parse and run one shell line, `Name arg, arg, ...` or
    /// `Name("arg", arg, ...)`.
    pub fn run_line(&mut self, line: &str) -> PluginResult<()> {
        let line = line.trim();
        let (name, rest) = line
            .split_once(|c: char| c == '(' || c.is_whitespace())
            .unwrap_or((line, ""));
        let rest = rest.trim().trim_end_matches(')');
        let args: Vec<&str> = if rest.trim().is_empty() {
            Vec::new()
        } else {
            rest.split(',').map(|a| a.trim().trim_matches('"')).collect()
        };
        self.invoke(name.trim(), &args)
    }
}

/// Name of the configure command
pub const CONFIGURE_COMMAND: &str = "NDROIStatConfigure";

/// Arguments of [`CONFIGURE_COMMAND`], in order
pub const CONFIGURE_ARGS: [ArgDef; 10] = [
    ArgDef::string("portName"),
    ArgDef::int("frame queue size"),
    ArgDef::int("blocking callbacks"),
    ArgDef::string("NDArrayPort"),
    ArgDef::int("NDArrayAddr"),
    ArgDef::int("maxROIs"),
    ArgDef::int("maxBuffers"),
    ArgDef::int("maxMemory"),
    ArgDef::int("priority"),
    ArgDef::int("stackSize"),
];

fn int_arg<T: TryFrom<i64>>(args: &[ArgValue], index: usize) -> PluginResult<T> {
    let value = args.get(index).and_then(ArgValue::as_int).unwrap_or(0);
    T::try_from(value).map_err(|_| PluginError::BadArgument {
        command: CONFIGURE_COMMAND.to_string(),
        arg: CONFIGURE_ARGS[index].name,
        message: format!("{value} out of range"),
    })
}

fn str_arg(args: &[ArgValue], index: usize) -> String {
    args.get(index)
        .and_then(ArgValue::as_str)
        .unwrap_or_default()
        .to_string()
}

/// Build a [`RoiStatConfig`] from parsed configure arguments.
pub fn configure_args_to_config(args: &[ArgValue]) -> PluginResult<RoiStatConfig> {
    Ok(RoiStatConfig {
        port_name: str_arg(args, 0),
        queue_size: int_arg(args, 1)?,
        blocking_callbacks: int_arg::<i64>(args, 2)? != 0,
        array_port: str_arg(args, 3),
        array_addr: int_arg(args, 4)?,
        max_rois: int_arg(args, 5)?,
        max_buffers: int_arg(args, 6)?,
        max_memory: int_arg(args, 7)?,
        priority: int_arg(args, 8)?,
        stack_size: int_arg::<i64>(args, 9)?.max(0).try_into().unwrap_or(0),
    })
}

/// Handler of [`CONFIGURE_COMMAND`]: create and register a driver.
pub fn ndroistat_configure(ports: &mut PortRegistry, args: &[ArgValue]) -> PluginResult<()> {
    let config = configure_args_to_config(args)?;
    if ports.contains(&config.port_name) {
        return Err(PluginError::DuplicatePort(config.port_name));
    }
    let driver = PluginDriver::new(config)?;
    info!("{CONFIGURE_COMMAND}: created port {}", driver.port_name());
    ports.insert(driver)
}

/// Register the statistics plugin commands.
pub fn register_roistat_commands(registry: &mut CommandRegistry) {
    registry.register(CommandDef {
        name: CONFIGURE_COMMAND,
        args: &CONFIGURE_ARGS,
        func: ndroistat_configure,
    });
}
