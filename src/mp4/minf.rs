use super::dinf::Dinf;
use super::r#box::{read_children, BoxType, Container, UnknownBox};
use super::smhd::Smhd;
use super::stbl::Stbl;
use super::vmhd::Vmhd;
use crate::errors::{HlsResult, Mp4Error};

/// Media information box
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Minf {
    pub vmhd: Option<Vmhd>,
    pub smhd: Option<Smhd>,
    pub dinf: Option<Dinf>,
    pub stbl: Stbl,
    pub unknown: Vec<UnknownBox>,
}

#[derive(Default)]
struct MinfBuilder {
    vmhd: Option<Vmhd>,
    smhd: Option<Smhd>,
    dinf: Option<Dinf>,
    stbl: Option<Stbl>,
    unknown: Vec<UnknownBox>,
}

impl Container for MinfBuilder {
    const NAME: &'static str = "minf";

    fn read_child(&mut self, kind: BoxType, payload: &[u8]) -> HlsResult<bool> {
        match kind {
            BoxType::Vmhd => self.vmhd = Some(Vmhd::parse(payload)?),
            BoxType::Smhd => self.smhd = Some(Smhd::parse(payload)?),
            BoxType::Dinf => self.dinf = Some(Dinf::parse(payload)?),
            BoxType::Stbl => self.stbl = Some(Stbl::parse(payload)?),
            _ => return Ok(false),
        }
        Ok(true)
    }

    fn add_unknown(&mut self, unknown: UnknownBox) {
        self.unknown.push(unknown);
    }
}

impl Minf {
    pub fn parse(data: &[u8]) -> HlsResult<Self> {
        let mut b = MinfBuilder::default();
        read_children(&mut b, data)?;
        let stbl = b.stbl.ok_or_else(|| Mp4Error::missing("minf", "stbl"))?;
        Ok(Minf {
            vmhd: b.vmhd,
            smhd: b.smhd,
            dinf: b.dinf,
            stbl,
            unknown: b.unknown,
        })
    }
}
