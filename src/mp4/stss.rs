use super::r#box::{check_truncated, read_version_flags};
use crate::bits::reader::ByteReader;
use crate::errors::HlsResult;

/// Sync sample table. Sample numbers are 1-based.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Stss {
    pub version: u8,
    pub flags: u32,
    pub sample_numbers: Vec<u32>,
}

impl Stss {
    pub fn parse(data: &[u8]) -> HlsResult<Self> {
        ensure_size!("stss", data, 8);
        let mut r = ByteReader::new(data);
        let (version, flags) = read_version_flags(&mut r);
        let count = r.read_u32();
        ensure_entries!("stss", r, count, 4);
        let sample_numbers = (0..count).map(|_| r.read_u32()).collect();
        check_truncated(&r, "stss")?;
        Ok(Stss {
            version,
            flags,
            sample_numbers,
        })
    }
}
