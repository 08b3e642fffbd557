use super::r#box::{check_truncated, read_version_flags};
use crate::bits::reader::ByteReader;
use crate::errors::HlsResult;

/// Video media header
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Vmhd {
    pub version: u8,
    pub flags: u32,
    pub graphics_mode: u16,
    pub opcolor: [u16; 3],
}

impl Vmhd {
    pub fn parse(data: &[u8]) -> HlsResult<Self> {
        ensure_size!("vmhd", data, 12);
        let mut r = ByteReader::new(data);
        let (version, flags) = read_version_flags(&mut r);
        let graphics_mode = r.read_u16();
        let opcolor = [r.read_u16(), r.read_u16(), r.read_u16()];
        check_truncated(&r, "vmhd")?;
        Ok(Vmhd {
            version,
            flags,
            graphics_mode,
            opcolor,
        })
    }
}
