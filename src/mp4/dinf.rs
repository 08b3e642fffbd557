use super::r#box::{check_truncated, read_children, read_version_flags, BoxType, Container, UnknownBox};
use crate::bits::reader::ByteReader;
use crate::errors::{HlsResult, Mp4Error};

/// Data reference entry. Flag 1 means the media data lives in this file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrefEntry {
    pub kind: [u8; 4],
    pub flags: u32,
    pub location: Vec<u8>,
}

impl DrefEntry {
    pub fn is_self_contained(&self) -> bool {
        self.flags & 1 == 1
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dref {
    pub version: u8,
    pub flags: u32,
    pub entries: Vec<DrefEntry>,
}

impl Dref {
    pub fn parse(data: &[u8]) -> HlsResult<Self> {
        ensure_size!("dref", data, 8);
        let mut r = ByteReader::new(data);
        let (version, flags) = read_version_flags(&mut r);
        let count = r.read_u32();
        ensure_entries!("dref", r, count, 12);

        let mut entries = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let size = r.read_u32() as usize;
            let kind = r.read_u32().to_be_bytes();
            let entry_flags = r.read_u32();
            if size < 12 {
                return Err(Mp4Error::InvalidSize {
                    kind: "dref entry".to_string(),
                    size: size as u64,
                }
                .into());
            }
            let location = r.read_bytes(size - 12).to_vec();
            entries.push(DrefEntry {
                kind,
                flags: entry_flags,
                location,
            });
        }
        check_truncated(&r, "dref")?;

        Ok(Dref {
            version,
            flags,
            entries,
        })
    }
}

/// Data information box
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dinf {
    pub dref: Option<Dref>,
    pub unknown: Vec<UnknownBox>,
}

impl Container for Dinf {
    const NAME: &'static str = "dinf";

    fn read_child(&mut self, kind: BoxType, payload: &[u8]) -> HlsResult<bool> {
        match kind {
            BoxType::Dref => self.dref = Some(Dref::parse(payload)?),
            _ => return Ok(false),
        }
        Ok(true)
    }

    fn add_unknown(&mut self, unknown: UnknownBox) {
        self.unknown.push(unknown);
    }
}

impl Dinf {
    pub fn parse(data: &[u8]) -> HlsResult<Self> {
        let mut dinf = Dinf::default();
        read_children(&mut dinf, data)?;
        if dinf.dref.is_none() {
            return Err(Mp4Error::missing("dinf", "dref").into());
        }
        Ok(dinf)
    }
}
