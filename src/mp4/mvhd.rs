use super::r#box::{check_truncated, read_version_flags};
use crate::bits::reader::ByteReader;
use crate::errors::HlsResult;

/// Movie header
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mvhd {
    pub version: u8,
    pub flags: u32,
    pub creation_time: u64,
    pub modification_time: u64,
    pub timescale: u32,
    pub duration: u64,
    /// 16.16 fixed point
    pub rate: u32,
    /// 8.8 fixed point
    pub volume: u16,
    pub matrix: [u32; 9],
    pub predefined: [u32; 6],
    pub next_track_id: u32,
}

impl Mvhd {
    pub fn parse(data: &[u8]) -> HlsResult<Self> {
        ensure_size!("mvhd", data, 4);
        let mut r = ByteReader::new(data);
        let (version, flags) = read_version_flags(&mut r);
        let mut mvhd = Mvhd {
            version,
            flags,
            ..Default::default()
        };

        if version == 0 {
            ensure_size!("mvhd", data, 100);
            mvhd.creation_time = r.read_u32() as u64;
            mvhd.modification_time = r.read_u32() as u64;
            mvhd.timescale = r.read_u32();
            mvhd.duration = r.read_u32() as u64;
        } else {
            ensure_size!("mvhd", data, 112);
            mvhd.creation_time = r.read_u64();
            mvhd.modification_time = r.read_u64();
            mvhd.timescale = r.read_u32();
            mvhd.duration = r.read_u64();
        }

        mvhd.rate = r.read_u32();
        mvhd.volume = r.read_u16();
        r.skip(10); // reserved
        for m in mvhd.matrix.iter_mut() {
            *m = r.read_u32();
        }
        for p in mvhd.predefined.iter_mut() {
            *p = r.read_u32();
        }
        mvhd.next_track_id = r.read_u32();
        check_truncated(&r, "mvhd")?;

        Ok(mvhd)
    }
}
