use super::r#box::{check_truncated, read_children, read_version_flags, BoxType, Container, UnknownBox};
use super::moov::MAX_TRACKS;
use crate::bits::reader::ByteReader;
use crate::errors::{HlsResult, Mp4Error};

const TFHD_BASE_DATA_OFFSET: u32 = 0x01;
const TFHD_SAMPLE_DESCRIPTION_INDEX: u32 = 0x02;
const TFHD_DEFAULT_SAMPLE_DURATION: u32 = 0x08;
const TFHD_DEFAULT_SAMPLE_SIZE: u32 = 0x10;
const TFHD_DEFAULT_SAMPLE_FLAGS: u32 = 0x20;

const TRUN_DATA_OFFSET: u32 = 0x01;
const TRUN_FIRST_SAMPLE_FLAGS: u32 = 0x04;
const TRUN_SAMPLE_DURATION: u32 = 0x100;
const TRUN_SAMPLE_SIZE: u32 = 0x200;
const TRUN_SAMPLE_FLAGS: u32 = 0x400;
const TRUN_SAMPLE_CTO: u32 = 0x800;

/// Movie fragment header
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mfhd {
    pub version: u8,
    pub flags: u32,
    pub sequence_number: u32,
}

impl Mfhd {
    pub fn parse(data: &[u8]) -> HlsResult<Self> {
        ensure_size!("mfhd", data, 8);
        let mut r = ByteReader::new(data);
        let (version, flags) = read_version_flags(&mut r);
        let sequence_number = r.read_u32();
        check_truncated(&r, "mfhd")?;
        Ok(Mfhd {
            version,
            flags,
            sequence_number,
        })
    }
}

/// Track fragment header. Optional fields are present per `flags`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Tfhd {
    pub version: u8,
    pub flags: u32,
    pub track_id: u32,
    pub base_data_offset: Option<u64>,
    pub sample_description_index: Option<u32>,
    pub default_sample_duration: Option<u32>,
    pub default_sample_size: Option<u32>,
    pub default_sample_flags: Option<u32>,
}

impl Tfhd {
    pub fn parse(data: &[u8]) -> HlsResult<Self> {
        ensure_size!("tfhd", data, 8);
        let mut r = ByteReader::new(data);
        let (version, flags) = read_version_flags(&mut r);
        let track_id = r.read_u32();
        let has = |bit: u32| flags & bit != 0;

        let base_data_offset = has(TFHD_BASE_DATA_OFFSET).then(|| r.read_u64());
        let sample_description_index = has(TFHD_SAMPLE_DESCRIPTION_INDEX).then(|| r.read_u32());
        let default_sample_duration = has(TFHD_DEFAULT_SAMPLE_DURATION).then(|| r.read_u32());
        let default_sample_size = has(TFHD_DEFAULT_SAMPLE_SIZE).then(|| r.read_u32());
        let default_sample_flags = has(TFHD_DEFAULT_SAMPLE_FLAGS).then(|| r.read_u32());
        check_truncated(&r, "tfhd")?;

        Ok(Tfhd {
            version,
            flags,
            track_id,
            base_data_offset,
            sample_description_index,
            default_sample_duration,
            default_sample_size,
            default_sample_flags,
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TrunSample {
    pub duration: Option<u32>,
    pub size: Option<u32>,
    pub flags: Option<u32>,
    pub composition_offset: Option<u32>,
}

/// Track fragment run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Trun {
    pub version: u8,
    pub flags: u32,
    pub data_offset: Option<i32>,
    pub first_sample_flags: Option<u32>,
    pub samples: Vec<TrunSample>,
}

impl Trun {
    pub fn parse(data: &[u8]) -> HlsResult<Self> {
        ensure_size!("trun", data, 8);
        let mut r = ByteReader::new(data);
        let (version, flags) = read_version_flags(&mut r);
        let count = r.read_u32();
        let has = |bit: u32| flags & bit != 0;

        let data_offset = has(TRUN_DATA_OFFSET).then(|| r.read_u32() as i32);
        let first_sample_flags = has(TRUN_FIRST_SAMPLE_FLAGS).then(|| r.read_u32());

        let per_sample = [
            TRUN_SAMPLE_DURATION,
            TRUN_SAMPLE_SIZE,
            TRUN_SAMPLE_FLAGS,
            TRUN_SAMPLE_CTO,
        ]
        .iter()
        .filter(|&&bit| has(bit))
        .count()
            * 4;
        ensure_entries!("trun", r, count, per_sample);

        let samples = (0..count)
            .map(|_| TrunSample {
                duration: has(TRUN_SAMPLE_DURATION).then(|| r.read_u32()),
                size: has(TRUN_SAMPLE_SIZE).then(|| r.read_u32()),
                flags: has(TRUN_SAMPLE_FLAGS).then(|| r.read_u32()),
                composition_offset: has(TRUN_SAMPLE_CTO).then(|| r.read_u32()),
            })
            .collect();
        check_truncated(&r, "trun")?;

        Ok(Trun {
            version,
            flags,
            data_offset,
            first_sample_flags,
            samples,
        })
    }
}

/// Track fragment
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Traf {
    pub tfhd: Option<Tfhd>,
    pub truns: Vec<Trun>,
    pub unknown: Vec<UnknownBox>,
}

impl Container for Traf {
    const NAME: &'static str = "traf";

    fn read_child(&mut self, kind: BoxType, payload: &[u8]) -> HlsResult<bool> {
        match kind {
            BoxType::Tfhd => self.tfhd = Some(Tfhd::parse(payload)?),
            BoxType::Trun => self.truns.push(Trun::parse(payload)?),
            _ => return Ok(false),
        }
        Ok(true)
    }

    fn add_unknown(&mut self, unknown: UnknownBox) {
        self.unknown.push(unknown);
    }
}

impl Traf {
    pub fn parse(data: &[u8]) -> HlsResult<Self> {
        let mut traf = Traf::default();
        read_children(&mut traf, data)?;
        if traf.tfhd.is_none() {
            return Err(Mp4Error::missing("traf", "tfhd").into());
        }
        Ok(traf)
    }
}

/// Movie fragment
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Moof {
    pub mfhd: Option<Mfhd>,
    pub trafs: Vec<Traf>,
    pub unknown: Vec<UnknownBox>,
}

impl Container for Moof {
    const NAME: &'static str = "moof";

    fn read_child(&mut self, kind: BoxType, payload: &[u8]) -> HlsResult<bool> {
        match kind {
            BoxType::Mfhd => self.mfhd = Some(Mfhd::parse(payload)?),
            BoxType::Traf => {
                if self.trafs.len() == MAX_TRACKS {
                    return Err(Mp4Error::new(format!(
                        "moof: more than {} traf boxes",
                        MAX_TRACKS
                    ))
                    .into());
                }
                self.trafs.push(Traf::parse(payload)?);
            }
            _ => return Ok(false),
        }
        Ok(true)
    }

    fn add_unknown(&mut self, unknown: UnknownBox) {
        self.unknown.push(unknown);
    }
}

impl Moof {
    pub fn parse(data: &[u8]) -> HlsResult<Self> {
        let mut moof = Moof::default();
        read_children(&mut moof, data)?;
        if moof.mfhd.is_none() {
            return Err(Mp4Error::missing("moof", "mfhd").into());
        }
        Ok(moof)
    }
}
