use super::r#box::{check_truncated, read_children, read_version_flags, BoxType, Container, UnknownBox};
use crate::bits::reader::ByteReader;
use crate::errors::HlsResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElstEntry {
    pub segment_duration: u64,
    pub media_time: i64,
    pub media_rate_integer: u16,
    pub media_rate_fraction: u16,
}

/// Edit list
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Elst {
    pub version: u8,
    pub flags: u32,
    pub entries: Vec<ElstEntry>,
}

impl Elst {
    pub fn parse(data: &[u8]) -> HlsResult<Self> {
        ensure_size!("elst", data, 8);
        let mut r = ByteReader::new(data);
        let (version, flags) = read_version_flags(&mut r);
        let count = r.read_u32();
        let entry_size = if version == 0 { 12 } else { 20 };
        ensure_entries!("elst", r, count, entry_size);

        let entries = (0..count)
            .map(|_| {
                let (segment_duration, media_time) = if version == 0 {
                    (r.read_u32() as u64, r.read_u32() as i32 as i64)
                } else {
                    (r.read_u64(), r.read_u64() as i64)
                };
                ElstEntry {
                    segment_duration,
                    media_time,
                    media_rate_integer: r.read_u16(),
                    media_rate_fraction: r.read_u16(),
                }
            })
            .collect();
        check_truncated(&r, "elst")?;

        Ok(Elst {
            version,
            flags,
            entries,
        })
    }
}

/// Edit box
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Edts {
    pub elst: Option<Elst>,
    pub unknown: Vec<UnknownBox>,
}

impl Container for Edts {
    const NAME: &'static str = "edts";

    fn read_child(&mut self, kind: BoxType, payload: &[u8]) -> HlsResult<bool> {
        match kind {
            BoxType::Elst => self.elst = Some(Elst::parse(payload)?),
            _ => return Ok(false),
        }
        Ok(true)
    }

    fn add_unknown(&mut self, unknown: UnknownBox) {
        self.unknown.push(unknown);
    }
}

impl Edts {
    pub fn parse(data: &[u8]) -> HlsResult<Self> {
        let mut edts = Edts::default();
        read_children(&mut edts, data)?;
        Ok(edts)
    }
}
