use super::r#box::{check_truncated, read_version_flags};
use crate::bits::reader::ByteReader;
use crate::errors::HlsResult;

/// Media header
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mdhd {
    pub version: u8,
    pub flags: u32,
    pub creation_time: u64,
    pub modification_time: u64,
    pub timescale: u32,
    pub duration: u64,
    /// ISO 639-2/T code, each char stored in 5 bits offset by 0x60
    pub language: [u8; 3],
    pub predefined: u16,
}

impl Mdhd {
    pub fn parse(data: &[u8]) -> HlsResult<Self> {
        ensure_size!("mdhd", data, 4);
        let mut r = ByteReader::new(data);
        let (version, flags) = read_version_flags(&mut r);
        let mut mdhd = Mdhd {
            version,
            flags,
            ..Default::default()
        };

        if version == 0 {
            ensure_size!("mdhd", data, 24);
            mdhd.creation_time = r.read_u32() as u64;
            mdhd.modification_time = r.read_u32() as u64;
            mdhd.timescale = r.read_u32();
            mdhd.duration = r.read_u32() as u64;
        } else {
            ensure_size!("mdhd", data, 36);
            mdhd.creation_time = r.read_u64();
            mdhd.modification_time = r.read_u64();
            mdhd.timescale = r.read_u32();
            mdhd.duration = r.read_u64();
        }

        let packed = r.read_u16();
        for (i, c) in mdhd.language.iter_mut().enumerate() {
            *c = ((packed >> ((2 - i) * 5)) & 0x1f) as u8 + 0x60;
        }
        mdhd.predefined = r.read_u16();
        check_truncated(&r, "mdhd")?;

        Ok(mdhd)
    }

    pub fn language_code(&self) -> String {
        String::from_utf8_lossy(&self.language).into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mp4::test_util::mdhd_payload;

    #[test]
    fn test_parse_v0_language() {
        let mdhd = Mdhd::parse(&mdhd_payload(90000, 1_080_000)).unwrap();
        assert_eq!(mdhd.timescale, 90000);
        assert_eq!(mdhd.duration, 1_080_000);
        assert_eq!(mdhd.language_code(), "eng");
    }

    #[test]
    fn test_parse_v1() {
        let mut data = vec![1, 0, 0, 0];
        data.extend_from_slice(&[0; 16]);
        data.extend_from_slice(&48000u32.to_be_bytes());
        data.extend_from_slice(&96000u64.to_be_bytes());
        data.extend_from_slice(&[0x15, 0xc7, 0, 0]);
        let mdhd = Mdhd::parse(&data).unwrap();
        assert_eq!(mdhd.timescale, 48000);
        assert_eq!(mdhd.duration, 96000);
        assert!(Mdhd::parse(&data[..35]).is_err());
    }
}
