use super::r#box::{check_truncated, read_version_flags};
use crate::bits::reader::ByteReader;
use crate::errors::HlsResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SttsEntry {
    pub sample_count: u32,
    pub sample_duration: u32,
}

/// Decoding time-to-sample table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Stts {
    pub version: u8,
    pub flags: u32,
    pub entries: Vec<SttsEntry>,
}

impl Stts {
    pub fn parse(data: &[u8]) -> HlsResult<Self> {
        ensure_size!("stts", data, 8);
        let mut r = ByteReader::new(data);
        let (version, flags) = read_version_flags(&mut r);
        let count = r.read_u32();
        ensure_entries!("stts", r, count, 8);

        let entries = (0..count)
            .map(|_| SttsEntry {
                sample_count: r.read_u32(),
                sample_duration: r.read_u32(),
            })
            .collect();
        check_truncated(&r, "stts")?;

        Ok(Stts {
            version,
            flags,
            entries,
        })
    }

    /// Number of samples the table describes.
    pub fn sample_count(&self) -> u64 {
        self.entries.iter().map(|e| e.sample_count as u64).sum()
    }

    /// Sum of all sample durations, saturating at `u64::MAX`.
    pub fn total_duration(&self) -> u64 {
        self.entries.iter().fold(0u64, |total, e| {
            total.saturating_add(e.sample_count as u64 * e.sample_duration as u64)
        })
    }
}
