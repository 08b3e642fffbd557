use crate::errors::{HlsError, HlsResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::Path;

/// Read-window granularity when `alignment` is enabled
pub const WINDOW_ALIGNMENT: u64 = 4096;

/// Settings shared by every request against a file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HlsConfig {
    /// Target segment length in seconds
    pub length: u32,
    /// Segment URIs in the playlist are relative to it
    pub relative: bool,
    /// Minimum window fetched from the backing file
    pub buffer_size: usize,
    /// Largest single read or box accepted
    pub max_buffer_size: usize,
    /// Base URL prefixed to segment URIs
    pub hls_proxy: Option<String>,
    /// Align window reads on 4 KiB boundaries
    pub alignment: bool,
}

impl Default for HlsConfig {
    fn default() -> Self {
        Self {
            length: 8,
            relative: true,
            buffer_size: 512 * 1024,
            max_buffer_size: 10 * 1024 * 1024,
            hls_proxy: None,
            alignment: false,
        }
    }
}

impl HlsConfig {
    pub fn validate(&self) -> HlsResult<()> {
        if self.length < 1 {
            return Err(invalid("length must be at least 1 second"));
        }
        if self.buffer_size == 0 {
            return Err(invalid("buffer_size must not be 0"));
        }
        if self.max_buffer_size < self.buffer_size {
            return Err(invalid(format!(
                "max_buffer_size {} is smaller than buffer_size {}",
                self.max_buffer_size, self.buffer_size
            )));
        }
        Ok(())
    }

    /// Parse a JSON document; absent fields keep their defaults.
    pub fn from_json(text: &str) -> HlsResult<Self> {
        let config: HlsConfig = serde_json::from_str(text).map_err(|e| {
            HlsError::Other(io::Error::new(io::ErrorKind::InvalidData, e.to_string()))
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> HlsResult<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_json(&text)
    }
}

fn invalid(message: impl Into<String>) -> HlsError {
    HlsError::Other(io::Error::new(io::ErrorKind::InvalidInput, message.into()))
}
