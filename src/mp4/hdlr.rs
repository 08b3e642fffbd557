use super::r#box::{check_truncated, read_version_flags};
use crate::bits::reader::ByteReader;
use crate::errors::HlsResult;

pub const HANDLER_VIDEO: [u8; 4] = *b"vide";
pub const HANDLER_SOUND: [u8; 4] = *b"soun";

/// Handler reference
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Hdlr {
    pub version: u8,
    pub flags: u32,
    pub predefined: [u8; 4],
    pub handler_type: [u8; 4],
    pub name: String,
}

impl Hdlr {
    pub fn parse(data: &[u8]) -> HlsResult<Self> {
        ensure_size!("hdlr", data, 24);
        let mut r = ByteReader::new(data);
        let (version, flags) = read_version_flags(&mut r);
        let predefined = r.read_u32().to_be_bytes();
        let handler_type = r.read_u32().to_be_bytes();
        r.skip(12);

        // QuickTime media handlers store the name as a pascal string
        let mut name = r.read_remaining();
        if &predefined == b"mhlr" && !name.is_empty() {
            let len = (name[0] as usize).min(name.len() - 1);
            name = &name[1..1 + len];
        }
        check_truncated(&r, "hdlr")?;

        Ok(Hdlr {
            version,
            flags,
            predefined,
            handler_type,
            name: String::from_utf8_lossy(name)
                .trim_end_matches('\0')
                .to_string(),
        })
    }

    pub fn is_video(&self) -> bool {
        self.handler_type == HANDLER_VIDEO
    }

    pub fn is_sound(&self) -> bool {
        self.handler_type == HANDLER_SOUND
    }
}
