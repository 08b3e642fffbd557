use super::edts::Edts;
use super::hdlr::{HANDLER_SOUND, HANDLER_VIDEO};
use super::index::{Chunk, Sample};
use super::mdia::Mdia;
use super::r#box::{fourcc_to_string, read_children, BoxType, Container, UnknownBox};
use super::stbl::Stbl;
use super::tkhd::Tkhd;
use crate::errors::{HlsResult, Mp4Error};

/// Track box plus the sample index derived from its tables.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Trak {
    pub tkhd: Tkhd,
    pub mdia: Mdia,
    pub edts: Option<Edts>,
    pub unknown: Vec<UnknownBox>,
    /// Real samples followed by one sentinel; empty until indexed.
    pub samples: Vec<Sample>,
    pub chunks: Vec<Chunk>,
}

#[derive(Default)]
struct TrakBuilder {
    tkhd: Option<Tkhd>,
    mdia: Option<Mdia>,
    edts: Option<Edts>,
    unknown: Vec<UnknownBox>,
}

impl Container for TrakBuilder {
    const NAME: &'static str = "trak";

    fn read_child(&mut self, kind: BoxType, payload: &[u8]) -> HlsResult<bool> {
        match kind {
            BoxType::Tkhd => self.tkhd = Some(Tkhd::parse(payload)?),
            BoxType::Mdia => self.mdia = Some(Mdia::parse(payload)?),
            BoxType::Edts => self.edts = Some(Edts::parse(payload)?),
            _ => return Ok(false),
        }
        Ok(true)
    }

    fn add_unknown(&mut self, unknown: UnknownBox) {
        self.unknown.push(unknown);
    }
}

impl Trak {
    pub fn parse(data: &[u8]) -> HlsResult<Self> {
        let mut b = TrakBuilder::default();
        read_children(&mut b, data)?;
        let tkhd = b.tkhd.ok_or_else(|| Mp4Error::missing("trak", "tkhd"))?;
        let mut mdia = b.mdia.ok_or_else(|| Mp4Error::missing("trak", "mdia"))?;

        let handler = mdia.hdlr.handler_type;
        mdia.minf.stbl.stsd.parse_entries(handler).map_err(|e| {
            Mp4Error::new(format!(
                "trak {}: invalid sample description: {}",
                tkhd.track_id, e
            ))
        })?;

        Ok(Trak {
            tkhd,
            mdia,
            edts: b.edts,
            unknown: b.unknown,
            samples: Vec::new(),
            chunks: Vec::new(),
        })
    }

    pub fn handler(&self) -> [u8; 4] {
        self.mdia.hdlr.handler_type
    }

    pub fn handler_name(&self) -> String {
        fourcc_to_string(&self.handler())
    }

    pub fn is_video(&self) -> bool {
        self.handler() == HANDLER_VIDEO
    }

    pub fn is_audio(&self) -> bool {
        self.handler() == HANDLER_SOUND
    }

    pub fn timescale(&self) -> u32 {
        self.mdia.mdhd.timescale
    }

    pub fn stbl(&self) -> &Stbl {
        &self.mdia.minf.stbl
    }

    /// Number of real samples, the sentinel excluded.
    pub fn samples_size(&self) -> usize {
        self.samples.len().saturating_sub(1)
    }

    /// Indices of keyframe samples. With `with_sentinel` the trailing
    /// sentinel is included.
    pub fn keyframes(&self, with_sentinel: bool) -> impl Iterator<Item = usize> + '_ {
        let end = if with_sentinel {
            self.samples.len()
        } else {
            self.samples_size()
        };
        self.samples[..end]
            .iter()
            .enumerate()
            .filter(|(_, s)| s.is_keyframe)
            .map(|(i, _)| i)
    }
}
