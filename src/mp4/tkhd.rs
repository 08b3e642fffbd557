use super::r#box::{check_truncated, read_version_flags};
use crate::bits::reader::ByteReader;
use crate::errors::HlsResult;

/// Track header
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Tkhd {
    pub version: u8,
    pub flags: u32,
    pub creation_time: u64,
    pub modification_time: u64,
    pub track_id: u32,
    pub duration: u64,
    pub layer: u16,
    pub predefined: u16,
    pub volume: u16,
    pub matrix: [u32; 9],
    /// 16.16 fixed point
    pub width: u32,
    /// 16.16 fixed point
    pub height: u32,
}

impl Tkhd {
    pub fn parse(data: &[u8]) -> HlsResult<Self> {
        ensure_size!("tkhd", data, 4);
        let mut r = ByteReader::new(data);
        let (version, flags) = read_version_flags(&mut r);
        let mut tkhd = Tkhd {
            version,
            flags,
            ..Default::default()
        };

        if version == 0 {
            ensure_size!("tkhd", data, 84);
            tkhd.creation_time = r.read_u32() as u64;
            tkhd.modification_time = r.read_u32() as u64;
            tkhd.track_id = r.read_u32();
            r.skip(4);
            tkhd.duration = r.read_u32() as u64;
        } else {
            ensure_size!("tkhd", data, 96);
            tkhd.creation_time = r.read_u64();
            tkhd.modification_time = r.read_u64();
            tkhd.track_id = r.read_u32();
            r.skip(4);
            tkhd.duration = r.read_u64();
        }

        r.skip(8); // reserved
        tkhd.layer = r.read_u16();
        tkhd.predefined = r.read_u16();
        tkhd.volume = r.read_u16();
        r.skip(2);
        for m in tkhd.matrix.iter_mut() {
            *m = r.read_u32();
        }
        tkhd.width = r.read_u32();
        tkhd.height = r.read_u32();
        check_truncated(&r, "tkhd")?;

        Ok(tkhd)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mp4::test_util::tkhd_payload;

    #[test]
    fn test_parse_v0() {
        let tkhd = Tkhd::parse(&tkhd_payload(2, 12000, 640, 480)).unwrap();
        assert_eq!(tkhd.track_id, 2);
        assert_eq!(tkhd.duration, 12000);
        assert_eq!(tkhd.width >> 16, 640);
        assert_eq!(tkhd.height >> 16, 480);
        assert_eq!(tkhd.matrix[0], 0x0001_0000);
    }

    #[test]
    fn test_short_rejected() {
        assert!(Tkhd::parse(&tkhd_payload(1, 0, 0, 0)[..83]).is_err());
        let mut v1 = vec![1, 0, 0, 0];
        v1.resize(95, 0);
        assert!(Tkhd::parse(&v1).is_err());
        v1.push(0);
        assert!(Tkhd::parse(&v1).is_ok());
    }
}
