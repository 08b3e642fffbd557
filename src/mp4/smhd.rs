use super::r#box::{check_truncated, read_version_flags};
use crate::bits::reader::ByteReader;
use crate::errors::HlsResult;

/// Sound media header
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Smhd {
    pub version: u8,
    pub flags: u32,
    /// 8.8 fixed point
    pub balance: u16,
}

impl Smhd {
    pub fn parse(data: &[u8]) -> HlsResult<Self> {
        ensure_size!("smhd", data, 8);
        let mut r = ByteReader::new(data);
        let (version, flags) = read_version_flags(&mut r);
        let balance = r.read_u16();
        check_truncated(&r, "smhd")?;
        Ok(Smhd {
            version,
            flags,
            balance,
        })
    }
}
