use super::r#box::{check_truncated, read_version_flags};
use crate::bits::reader::ByteReader;
use crate::errors::HlsResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CttsEntry {
    pub sample_count: u32,
    pub sample_offset: u32,
}

/// Composition time offsets.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Ctts {
    pub version: u8,
    pub flags: u32,
    pub entries: Vec<CttsEntry>,
}

impl Ctts {
    pub fn parse(data: &[u8]) -> HlsResult<Self> {
        ensure_size!("ctts", data, 8);
        let mut r = ByteReader::new(data);
        let (version, flags) = read_version_flags(&mut r);
        let count = r.read_u32();
        ensure_entries!("ctts", r, count, 8);
        let entries = (0..count)
            .map(|_| CttsEntry {
                sample_count: r.read_u32(),
                sample_offset: r.read_u32(),
            })
            .collect();
        check_truncated(&r, "ctts")?;
        Ok(Ctts {
            version,
            flags,
            entries,
        })
    }

    pub fn sample_count(&self) -> u64 {
        self.entries.iter().map(|e| e.sample_count as u64).sum()
    }
}
