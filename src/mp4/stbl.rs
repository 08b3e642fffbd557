use super::ctts::Ctts;
use super::r#box::{read_children, BoxType, Container, UnknownBox};
use super::stco::Stco;
use super::stsc::Stsc;
use super::stsd::Stsd;
use super::stss::Stss;
use super::stsz::Stsz;
use super::stts::Stts;
use crate::errors::{HlsResult, Mp4Error};

/// Sample table box
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Stbl {
    pub stsd: Stsd,
    pub stts: Stts,
    pub stss: Option<Stss>,
    pub stsc: Option<Stsc>,
    pub stsz: Option<Stsz>,
    pub stco: Option<Stco>,
    pub ctts: Option<Ctts>,
    pub unknown: Vec<UnknownBox>,
}

#[derive(Default)]
struct StblBuilder {
    stsd: Option<Stsd>,
    stts: Option<Stts>,
    stss: Option<Stss>,
    stsc: Option<Stsc>,
    stsz: Option<Stsz>,
    stco: Option<Stco>,
    ctts: Option<Ctts>,
    unknown: Vec<UnknownBox>,
}

impl Container for StblBuilder {
    const NAME: &'static str = "stbl";

    fn read_child(&mut self, kind: BoxType, payload: &[u8]) -> HlsResult<bool> {
        match kind {
            BoxType::Stsd => self.stsd = Some(Stsd::parse(payload)?),
            BoxType::Stts => self.stts = Some(Stts::parse(payload)?),
            BoxType::Stss => self.stss = Some(Stss::parse(payload)?),
            BoxType::Stsc => self.stsc = Some(Stsc::parse(payload)?),
            BoxType::Stsz => self.stsz = Some(Stsz::parse(payload)?),
            BoxType::Stco => self.stco = Some(Stco::parse(payload)?),
            BoxType::Co64 => self.stco = Some(Stco::parse_co64(payload)?),
            BoxType::Ctts => self.ctts = Some(Ctts::parse(payload)?),
            _ => return Ok(false),
        }
        Ok(true)
    }

    fn add_unknown(&mut self, unknown: UnknownBox) {
        self.unknown.push(unknown);
    }
}

impl Stbl {
    pub fn parse(data: &[u8]) -> HlsResult<Self> {
        let mut b = StblBuilder::default();
        read_children(&mut b, data)?;

        let stsd = b.stsd.ok_or_else(|| Mp4Error::missing("stbl", "stsd"))?;
        let stts = b.stts.ok_or_else(|| Mp4Error::missing("stbl", "stts"))?;
        // some encoders leave these out of tracks whose samples live in fragments
        if b.stsc.is_none() {
            log::warn!("stbl: missing mandatory stsc");
        }
        if b.stsz.is_none() {
            log::warn!("stbl: missing mandatory stsz");
        }
        if b.stco.is_none() {
            log::warn!("stbl: missing mandatory stco");
        }

        Ok(Stbl {
            stsd,
            stts,
            stss: b.stss,
            stsc: b.stsc,
            stsz: b.stsz,
            stco: b.stco,
            ctts: b.ctts,
            unknown: b.unknown,
        })
    }
}
