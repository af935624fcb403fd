//! Plugin configuration

use crate::error::PluginResult;
use log::warn;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Construction arguments of a statistics plugin port
///
/// Missing YAML fields take their [`Default`] values.
///
/// # Examples
///
/// ```
/// use roistat_plugin::RoiStatConfig;
///
/// let config = RoiStatConfig::from_yaml("port_name: ROI1\nmax_rois: 4\n").unwrap();
/// assert_eq!(config.port_name, "ROI1");
/// assert_eq!(config.effective_max_rois(), 4);
/// assert!(!config.blocking_callbacks);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoiStatConfig {
    /// Name of this port
    pub port_name: String,
    /// Frames the processing queue holds in queued mode
    pub queue_size: i32,
    /// Process frames in the caller's thread
    pub blocking_callbacks: bool,
    /// Upstream port frames come from
    pub array_port: String,
    /// Upstream address
    pub array_addr: i32,
    /// Number of regions
    pub max_rois: i32,
    /// Pool buffer ceiling; negative is unlimited
    pub max_buffers: i32,
    /// Pool byte ceiling; negative is unlimited
    pub max_memory: i64,
    /// Processing thread priority (advisory)
    pub priority: i32,
    /// Processing thread stack size in bytes; 0 for the platform default
    pub stack_size: usize,
}

impl Default for RoiStatConfig {
    fn default() -> Self {
        Self {
            port_name: "ROISTAT1".to_string(),
            queue_size: 20,
            blocking_callbacks: false,
            array_port: String::new(),
            array_addr: 0,
            max_rois: 8,
            max_buffers: -1,
            max_memory: -1,
            priority: 0,
            stack_size: 0,
        }
    }
}

impl RoiStatConfig {
    /// Parse a YAML document.
    ///
    /// # Errors
    ///
    /// [`crate::PluginError::Config`] if the document is malformed.
    pub fn from_yaml(yaml: &str) -> PluginResult<Self> {
        Ok(serde_yml::from_str(yaml)?)
    }

    /// Read and parse a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> PluginResult<Self> {
        let yaml = std::fs::read_to_string(path)?;
        Self::from_yaml(&yaml)
    }

    /// Serialize to YAML.
    pub fn to_yaml(&self) -> PluginResult<String> {
        Ok(serde_yml::to_string(self)?)
    }

    /// Number of regions to allocate (at least 1).
    pub fn effective_max_rois(&self) -> usize {
        if self.max_rois < 1 {
            warn!(
                "{}: max_rois={} is below 1, using 1",
                self.port_name, self.max_rois
            );
            return 1;
        }
        usize::try_from(self.max_rois).unwrap_or(1)
    }

    /// Capacity of the processing queue (at least 1).
    pub fn effective_queue_size(&self) -> usize {
        usize::try_from(self.queue_size).unwrap_or(0).max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_fill_missing_fields() {
        let config = RoiStatConfig::from_yaml("queue_size: 3\n").unwrap();
        assert_eq!(config.queue_size, 3);
        assert_eq!(config.port_name, RoiStatConfig::default().port_name);
        assert_eq!(config.max_memory, -1);
    }

    #[test]
    fn test_yaml_round_trip() {
        let config = RoiStatConfig {
            port_name: "ROI2".into(),
            blocking_callbacks: true,
            stack_size: 65536,
            ..Default::default()
        };
        let yaml = config.to_yaml().unwrap();
        assert_eq!(RoiStatConfig::from_yaml(&yaml).unwrap(), config);
    }

    #[test]
    fn test_effective_limits() {
        let config = RoiStatConfig {
            max_rois: 0,
            queue_size: -4,
            ..Default::default()
        };
        assert_eq!(config.effective_max_rois(), 1);
        assert_eq!(config.effective_queue_size(), 1);
    }

    #[test]
    fn test_malformed_yaml() {
        assert!(RoiStatConfig::from_yaml("max_rois: [1, 2").is_err());
        assert!(RoiStatConfig::from_yaml("max_rois: many\n").is_err());
    }
}
