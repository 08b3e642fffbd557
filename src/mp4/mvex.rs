use super::r#box::{check_truncated, read_children, read_version_flags, BoxType, Container, UnknownBox};
use super::moov::MAX_TRACKS;
use crate::bits::reader::ByteReader;
use crate::errors::{HlsResult, Mp4Error};

/// Track extends: defaults for movie fragments
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Trex {
    pub version: u8,
    pub flags: u32,
    pub track_id: u32,
    pub default_sample_description_index: u32,
    pub default_sample_duration: u32,
    pub default_sample_size: u32,
    pub default_sample_flags: u32,
}

impl Trex {
    pub fn parse(data: &[u8]) -> HlsResult<Self> {
        ensure_size!("trex", data, 24);
        let mut r = ByteReader::new(data);
        let (version, flags) = read_version_flags(&mut r);
        let trex = Trex {
            version,
            flags,
            track_id: r.read_u32(),
            default_sample_description_index: r.read_u32(),
            default_sample_duration: r.read_u32(),
            default_sample_size: r.read_u32(),
            default_sample_flags: r.read_u32(),
        };
        check_truncated(&r, "trex")?;
        Ok(trex)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mvex {
    pub trexs: Vec<Trex>,
    pub unknown: Vec<UnknownBox>,
}

impl Container for Mvex {
    const NAME: &'static str = "mvex";

    fn read_child(&mut self, kind: BoxType, payload: &[u8]) -> HlsResult<bool> {
        match kind {
            BoxType::Trex => {
                if self.trexs.len() == MAX_TRACKS {
                    return Err(Mp4Error::new(format!(
                        "mvex: more than {} trex boxes",
                        MAX_TRACKS
                    ))
                    .into());
                }
                self.trexs.push(Trex::parse(payload)?);
            }
            _ => return Ok(false),
        }
        Ok(true)
    }

    fn add_unknown(&mut self, unknown: UnknownBox) {
        self.unknown.push(unknown);
    }
}

impl Mvex {
    pub fn parse(data: &[u8]) -> HlsResult<Self> {
        let mut mvex = Mvex::default();
        read_children(&mut mvex, data)?;
        if mvex.trexs.is_empty() {
            return Err(Mp4Error::missing("mvex", "trex").into());
        }
        Ok(mvex)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mp4::test_util::make_box;

    fn trex_box(track_id: u32) -> Vec<u8> {
        let mut payload = vec![0, 0, 0, 0];
        for v in [track_id, 1, 1024, 0, 0x0101_0000] {
            payload.extend_from_slice(&v.to_be_bytes());
        }
        make_box("trex", &payload)
    }

    #[test]
    fn test_parse_trex() {
        let mvex = Mvex::parse(&[trex_box(1), trex_box(2)].concat()).unwrap();
        assert_eq!(mvex.trexs.len(), 2);
        assert_eq!(mvex.trexs[1].track_id, 2);
        assert_eq!(mvex.trexs[0].default_sample_duration, 1024);
    }

    #[test]
    fn test_trex_required_and_bounded() {
        assert!(Mvex::parse(&[]).is_err());
        let many: Vec<u8> = (0..=MAX_TRACKS as u32).flat_map(trex_box).collect();
        assert!(Mvex::parse(&many).is_err());
    }
}
