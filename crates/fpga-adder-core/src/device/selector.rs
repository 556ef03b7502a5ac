//! Device selection among enumerated accelerators.

use super::DeviceInfo;
use crate::config::AdderConfig;
use crate::core::error::{HostError, Result};
use tracing::info;

/// Picks one device out of those a backend enumerated.
///
/// A name filter narrows the list first (case-insensitive substring); the
/// index then selects within what is left.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceSelector {
    index: usize,
    name_filter: Option<String>,
}

impl DeviceSelector {
    /// Creates a selector taking the first device.
    pub fn new() -> Self {
        Self::default()
    }

    /// Selector matching the device fields of `config`.
    pub fn from_config(config: &AdderConfig) -> Self {
        Self {
            index: config.device_index,
            name_filter: config.device_name.clone(),
        }
    }

    /// Sets the device index.
    pub fn with_index(mut self, index: usize) -> Self {
        self.index = index;
        self
    }

    /// Requires the device name to contain `filter`.
    pub fn with_name_filter<S: Into<String>>(mut self, filter: S) -> Self {
        self.name_filter = Some(filter.into());
        self
    }

    fn matches(&self, device: &DeviceInfo) -> bool {
        self.name_filter.as_ref().map_or(true, |filter| {
            device
                .name
                .to_lowercase()
                .contains(&filter.to_lowercase())
        })
    }

    /// Position in `devices` of the selected device.
    pub fn select(&self, devices: &[DeviceInfo]) -> Result<usize> {
        if devices.is_empty() {
            return Err(HostError::no_device("device list is empty"));
        }

        let (position, device) = devices
            .iter()
            .enumerate()
            .filter(|(_, d)| self.matches(d))
            .nth(self.index)
            .ok_or_else(|| {
                let eligible = devices.iter().filter(|d| self.matches(d)).count();
                match &self.name_filter {
                    Some(filter) => HostError::no_device(format!(
                        "device index {} out of range: {eligible} device(s) match '{filter}'",
                        self.index
                    )),
                    None => HostError::no_device(format!(
                        "device index {} out of range: {eligible} device(s) found",
                        self.index
                    )),
                }
            })?;

        info!("Selected {} device {}: {}", device.backend, position, device.name);
        Ok(position)
    }
}
