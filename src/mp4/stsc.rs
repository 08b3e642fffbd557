use super::r#box::{check_truncated, read_version_flags};
use crate::bits::reader::ByteReader;
use crate::errors::HlsResult;

/// One sample-to-chunk run. `chunk` is zero-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StscEntry {
    pub chunk: u32,
    pub samples: u32,
    pub id: u32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Stsc {
    pub version: u8,
    pub flags: u32,
    pub entries: Vec<StscEntry>,
}

impl Stsc {
    pub fn parse(data: &[u8]) -> HlsResult<Self> {
        ensure_size!("stsc", data, 8);
        let mut r = ByteReader::new(data);
        let (version, flags) = read_version_flags(&mut r);
        let count = r.read_u32();
        ensure_entries!("stsc", r, count, 12);

        let entries = (0..count)
            .map(|_| StscEntry {
                chunk: r.read_u32().wrapping_sub(1),
                samples: r.read_u32(),
                id: r.read_u32(),
            })
            .collect();
        check_truncated(&r, "stsc")?;

        Ok(Stsc {
            version,
            flags,
            entries,
        })
    }
}
