//! A module for parsing AVCConfigurationBox (avcC) data.
//! Parses SPS and PPS NAL units for H.264 streams in AVCC format.

use super::r#box::check_truncated;
use crate::bits::reader::ByteReader;
use crate::errors::HlsResult;

/// Represents the parsed AVCDecoderConfigurationRecord (avcC) configuration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AvccConfig {
    /// configurationVersion
    pub configuration_version: u8,
    /// AVCProfileIndication
    pub profile: u8,
    /// profileCompatibility
    pub compatibility: u8,
    /// AVCLevelIndication
    pub level: u8,
    /// lengthSizeMinusOne
    pub length_size_minus_one: u8,
    /// Sequence Parameter Sets
    pub sps: Vec<Vec<u8>>,
    /// Picture Parameter Sets
    pub pps: Vec<Vec<u8>>,
}

impl AvccConfig {
    /// Parse AVCDecoderConfigurationRecord as defined in ISO/IEC 14496-15.
    ///
    /// data: full contents of the avcC box (excluding header).
    pub fn parse(data: &[u8]) -> HlsResult<Self> {
        ensure_size!("avcC", data, 7);
        let mut r = ByteReader::new(data);
        let configuration_version = r.read_u8();
        let profile = r.read_u8();
        let compatibility = r.read_u8();
        let level = r.read_u8();
        // 6 bits reserved + 2 bits
        let length_size_minus_one = r.read_u8() & 0x03;
        // 3 bits reserved + 5 bits count
        let num_sps = r.read_u8() & 0x1f;
        let sps = (0..num_sps)
            .map(|_| {
                let len = r.read_u16() as usize;
                r.read_bytes(len).to_vec()
            })
            .collect();
        let num_pps = r.read_u8();
        let pps = (0..num_pps)
            .map(|_| {
                let len = r.read_u16() as usize;
                r.read_bytes(len).to_vec()
            })
            .collect();
        check_truncated(&r, "avcC")?;

        Ok(AvccConfig {
            configuration_version,
            profile,
            compatibility,
            level,
            length_size_minus_one,
            sps,
            pps,
        })
    }

    /// Size in bytes of the length prefix before each NAL unit in a sample.
    pub fn nal_unit_length(&self) -> u8 {
        self.length_size_minus_one + 1
    }

    /// The SPS written ahead of the first video packet; the last one listed wins.
    pub fn last_sps(&self) -> Option<&[u8]> {
        self.sps.last().map(|sps| sps.as_slice())
    }

    pub fn last_pps(&self) -> Option<&[u8]> {
        self.pps.last().map(|pps| pps.as_slice())
    }

    /// Check if configuration is valid
    pub fn is_valid(&self) -> bool {
        !self.sps.is_empty() && !self.pps.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mp4::test_util::avcc_payload;

    #[test]
    fn test_parse_avcc() {
        let config = AvccConfig::parse(&avcc_payload()).unwrap();
        assert_eq!(config.profile, 0x64);
        assert_eq!(config.nal_unit_length(), 4);
        assert_eq!(config.sps.len(), 1);
        assert_eq!(config.last_sps().unwrap()[0], 0x67);
        assert_eq!(config.last_pps().unwrap()[0], 0x68);
        assert!(config.is_valid());
    }

    #[test]
    fn test_keeps_last_parameter_set() {
        let data = [
            1, 0x42, 0, 0x1e, 0xfd, 0xe2, 0, 1, 0x67, 0, 2, 0x67, 0x01, 1, 0, 1, 0x68,
        ];
        let config = AvccConfig::parse(&data).unwrap();
        assert_eq!(config.nal_unit_length(), 2);
        assert_eq!(config.last_sps(), Some(&[0x67, 0x01][..]));
        assert_eq!(config.last_pps(), Some(&[0x68][..]));
    }

    #[test]
    fn test_truncated_sps() {
        let data = [1, 0x42, 0, 0x1e, 0xff, 0xe1, 0, 9, 0x67];
        assert!(AvccConfig::parse(&data).is_err());
    }
}
