use super::mvex::Mvex;
use super::mvhd::Mvhd;
use super::r#box::{read_children, BoxType, Container, UnknownBox};
use super::trak::Trak;
use crate::errors::{HlsResult, Mp4Error};

/// Upper bound on retained tracks (and trex/traf entries).
pub const MAX_TRACKS: usize = 8;

/// Movie box
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Moov {
    pub mvhd: Mvhd,
    pub traks: Vec<Trak>,
    pub mvex: Option<Mvex>,
    pub unknown: Vec<UnknownBox>,
    pub is_indexed: bool,
}

#[derive(Default)]
struct MoovBuilder {
    mvhd: Option<Mvhd>,
    traks: Vec<Trak>,
    mvex: Option<Mvex>,
    unknown: Vec<UnknownBox>,
}

impl MoovBuilder {
    fn add_trak(&mut self, mut trak: Trak) -> HlsResult<()> {
        if self.traks.len() == MAX_TRACKS {
            return Err(Mp4Error::new(format!("moov: more than {} tracks", MAX_TRACKS)).into());
        }

        if !trak.is_video() && !trak.is_audio() {
            log::info!(
                "trak ignored (handler_type={}, name={})",
                trak.handler_name(),
                trak.mdia.hdlr.name
            );
            return Ok(());
        }

        // tracks with a duration but no chunks, as written by some fragmenting encoders
        let stbl = &trak.mdia.minf.stbl;
        let no_chunks = match &stbl.stco {
            None => true,
            Some(stco) => stco.chunk_offsets.is_empty() && trak.mdia.mdhd.duration != 0,
        };
        if no_chunks {
            trak.mdia.mdhd.duration = 0;
        }

        self.traks.push(trak);
        Ok(())
    }
}

impl Container for MoovBuilder {
    const NAME: &'static str = "moov";

    fn read_child(&mut self, kind: BoxType, payload: &[u8]) -> HlsResult<bool> {
        match kind {
            BoxType::Mvhd => self.mvhd = Some(Mvhd::parse(payload)?),
            BoxType::Trak => self.add_trak(Trak::parse(payload)?)?,
            BoxType::Mvex => self.mvex = Some(Mvex::parse(payload)?),
            _ => return Ok(false),
        }
        Ok(true)
    }

    fn add_unknown(&mut self, unknown: UnknownBox) {
        self.unknown.push(unknown);
    }
}

impl Moov {
    /// Decode the payload of a moov box.
    pub fn parse(data: &[u8]) -> HlsResult<Self> {
        let mut b = MoovBuilder::default();
        read_children(&mut b, data)?;
        let mvhd = b.mvhd.ok_or_else(|| Mp4Error::missing("moov", "mvhd"))?;
        if b.traks.is_empty() {
            return Err(Mp4Error::missing("moov", "trak").into());
        }
        Ok(Moov {
            mvhd,
            traks: b.traks,
            mvex: b.mvex,
            unknown: b.unknown,
            is_indexed: false,
        })
    }

    pub fn timescale(&self) -> u32 {
        self.mvhd.timescale
    }
}
