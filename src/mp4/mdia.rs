use super::hdlr::Hdlr;
use super::mdhd::Mdhd;
use super::minf::Minf;
use super::r#box::{read_children, BoxType, Container, UnknownBox};
use crate::errors::{HlsResult, Mp4Error};

/// Media box
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mdia {
    pub mdhd: Mdhd,
    pub hdlr: Hdlr,
    pub minf: Minf,
    pub unknown: Vec<UnknownBox>,
}

#[derive(Default)]
struct MdiaBuilder {
    mdhd: Option<Mdhd>,
    hdlr: Option<Hdlr>,
    minf: Option<Minf>,
    unknown: Vec<UnknownBox>,
}

impl Container for MdiaBuilder {
    const NAME: &'static str = "mdia";

    fn read_child(&mut self, kind: BoxType, payload: &[u8]) -> HlsResult<bool> {
        match kind {
            BoxType::Mdhd => self.mdhd = Some(Mdhd::parse(payload)?),
            BoxType::Hdlr => self.hdlr = Some(Hdlr::parse(payload)?),
            BoxType::Minf => self.minf = Some(Minf::parse(payload)?),
            _ => return Ok(false),
        }
        Ok(true)
    }

    fn add_unknown(&mut self, unknown: UnknownBox) {
        self.unknown.push(unknown);
    }
}

impl Mdia {
    pub fn parse(data: &[u8]) -> HlsResult<Self> {
        let mut b = MdiaBuilder::default();
        read_children(&mut b, data)?;
        Ok(Mdia {
            mdhd: b.mdhd.ok_or_else(|| Mp4Error::missing("mdia", "mdhd"))?,
            hdlr: b.hdlr.ok_or_else(|| Mp4Error::missing("mdia", "hdlr"))?,
            minf: b.minf.ok_or_else(|| Mp4Error::missing("mdia", "minf"))?,
            unknown: b.unknown,
        })
    }
}
