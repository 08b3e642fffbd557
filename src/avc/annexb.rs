use super::avc_type::NaluType;
use crate::errors::{HlsResult, Mp4Error};

pub const START_CODE: [u8; 4] = [0x00, 0x00, 0x00, 0x01];
/// Access unit delimiter NAL with its start code, any slice type allowed
pub const ACCESS_UNIT_DELIMITER: [u8; 6] = [0x00, 0x00, 0x00, 0x01, 0x09, 0xe0];

fn read_length(sample: &[u8], pos: usize, length_size: usize) -> Option<usize> {
    let bytes = sample.get(pos..pos + length_size)?;
    Some(bytes.iter().fold(0usize, |acc, &b| (acc << 8) | b as usize))
}

/// Append `sample` to `out` with every length prefix of `nal_unit_length`
/// bytes replaced by a 4 byte start code.
///
/// A sample that already starts with a start code is copied as is. On a
/// length running past the end of the sample nothing is appended.
pub fn convert_to_annexb(sample: &[u8], nal_unit_length: u8, out: &mut Vec<u8>) -> HlsResult<()> {
    if sample.starts_with(&START_CODE) {
        out.extend_from_slice(sample);
        return Ok(());
    }

    let length_size = nal_unit_length.clamp(1, 4) as usize;
    let mut converted = Vec::with_capacity(sample.len() + 16);
    let mut pos = 0usize;
    while pos < sample.len() {
        let len = read_length(sample, pos, length_size).ok_or_else(|| {
            Mp4Error::truncated("nal length", pos + length_size, sample.len())
        })?;
        pos += length_size;
        let nal = sample
            .get(pos..pos + len)
            .ok_or_else(|| Mp4Error::truncated("nal unit", pos + len, sample.len()))?;
        converted.extend_from_slice(&START_CODE);
        converted.extend_from_slice(nal);
        pos += len;
    }

    out.extend_from_slice(&converted);
    Ok(())
}

/// Types of the length prefixed NAL units in `sample`, for diagnostics.
pub fn nalu_types(sample: &[u8], nal_unit_length: u8) -> Vec<NaluType> {
    let length_size = nal_unit_length.clamp(1, 4) as usize;
    let mut types = Vec::new();
    let mut pos = 0usize;
    while let Some(len) = read_length(sample, pos, length_size) {
        pos += length_size;
        let Some(&header) = sample.get(pos) else {
            break;
        };
        types.push(NaluType::from_header_byte(header));
        pos += len;
    }
    types
}
