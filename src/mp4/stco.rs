use super::r#box::{check_truncated, read_version_flags};
use crate::bits::reader::ByteReader;
use crate::errors::HlsResult;

/// Chunk offsets from either `stco` (32-bit) or `co64` (64-bit).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Stco {
    pub version: u8,
    pub flags: u32,
    pub chunk_offsets: Vec<u64>,
}

impl Stco {
    /// Parse stco (32-bit offsets)
    pub fn parse(data: &[u8]) -> HlsResult<Self> {
        Self::parse_sized(data, "stco", 4)
    }

    /// Parse co64 (64-bit offsets)
    pub fn parse_co64(data: &[u8]) -> HlsResult<Self> {
        Self::parse_sized(data, "co64", 8)
    }

    fn parse_sized(data: &[u8], kind: &str, width: usize) -> HlsResult<Self> {
        ensure_size!(kind, data, 8);
        let mut r = ByteReader::new(data);
        let (version, flags) = read_version_flags(&mut r);
        let count = r.read_u32();
        ensure_entries!(kind, r, count, width);

        let chunk_offsets = (0..count)
            .map(|_| {
                if width == 8 {
                    r.read_u64()
                } else {
                    r.read_u32() as u64
                }
            })
            .collect();
        check_truncated(&r, kind)?;

        Ok(Stco {
            version,
            flags,
            chunk_offsets,
        })
    }
}
