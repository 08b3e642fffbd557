use super::r#box::fourcc_to_string;
use crate::bits::reader::ByteReader;
use crate::errors::HlsResult;

/// File type box
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ftyp {
    pub major_brand: [u8; 4],
    pub minor_version: u32,
    pub compatible_brands: Vec<[u8; 4]>,
}

impl Ftyp {
    pub fn parse(data: &[u8]) -> HlsResult<Self> {
        ensure_size!("ftyp", data, 8);
        let mut r = ByteReader::new(data);
        let major_brand = r.read_u32().to_be_bytes();
        let minor_version = r.read_u32();
        let compatible_brands = (0..r.remaining() / 4)
            .map(|_| r.read_u32().to_be_bytes())
            .collect();
        Ok(Ftyp {
            major_brand,
            minor_version,
            compatible_brands,
        })
    }

    /// Human readable family of the major brand.
    pub fn describe(&self) -> String {
        let brand = fourcc_to_string(&self.major_brand);
        let family = match &self.major_brand {
            b"isom" | b"mp41" | b"mp42" | b"iso2" | b"iso4" | b"iso5" | b"iso6" | b"avc1" => {
                "MP4 (ISO Base Media)"
            }
            b"M4V " | b"M4VH" | b"M4VP" => "M4V (iTunes Video)",
            b"3gp4" | b"3gp5" | b"3gp6" | b"3gp7" | b"3ge6" | b"3ge7" | b"3gg6" => "3GP",
            b"3g2a" | b"3g2b" | b"3g2c" => "3G2",
            b"qt  " => "QuickTime",
            _ => "unknown",
        };
        format!("{} ({})", brand, family)
    }
}

#[cfg(test)]
mod tests {
    use super::Ftyp;

    #[test]
    fn test_parse_ftyp() {
        let ftyp = Ftyp::parse(b"isom\0\0\x02\0isomavc1").unwrap();
        assert_eq!(&ftyp.major_brand, b"isom");
        assert_eq!(ftyp.minor_version, 0x200);
        assert_eq!(ftyp.compatible_brands, vec![*b"isom", *b"avc1"]);
        assert_eq!(ftyp.describe(), "isom (MP4 (ISO Base Media))");
    }

    #[test]
    fn test_short_ftyp() {
        assert!(Ftyp::parse(b"qt  ").is_err());
    }
}
