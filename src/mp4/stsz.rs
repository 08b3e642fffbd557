use super::r#box::{check_truncated, read_version_flags};
use crate::bits::reader::ByteReader;
use crate::errors::HlsResult;

/// Sample size table. When `sample_size` is non-zero every sample has that
/// size and `sample_sizes` is empty.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Stsz {
    pub version: u8,
    pub flags: u32,
    pub sample_size: u32,
    pub entries: u32,
    pub sample_sizes: Vec<u32>,
}

impl Stsz {
    pub fn parse(data: &[u8]) -> HlsResult<Self> {
        ensure_size!("stsz", data, 12);
        let mut r = ByteReader::new(data);
        let (version, flags) = read_version_flags(&mut r);
        let sample_size = r.read_u32();
        let entries = r.read_u32();

        let mut sample_sizes = Vec::new();
        if sample_size == 0 {
            ensure_entries!("stsz", r, entries, 4);
            sample_sizes = (0..entries).map(|_| r.read_u32()).collect();
        }
        check_truncated(&r, "stsz")?;

        Ok(Stsz {
            version,
            flags,
            sample_size,
            entries,
            sample_sizes,
        })
    }
}
