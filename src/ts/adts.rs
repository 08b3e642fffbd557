use crate::mp4::stsd::AudioSampleEntry;

pub const ADTS_HEADER_SIZE: usize = 7;

/// Sampling frequencies in ADTS index order
pub const AAC_SAMPLE_RATES: [u32; 13] = [
    96000, 88200, 64000, 48000, 44100, 32000, 24000, 22050, 16000, 12000, 11025, 8000, 7350,
];

/// Index of `rate` in [`AAC_SAMPLE_RATES`], 44.1 kHz when not listed.
pub fn sample_rate_index(rate: u32) -> u8 {
    AAC_SAMPLE_RATES
        .iter()
        .position(|&r| r == rate)
        .map_or(4, |i| i as u8)
}

/// ADTS profile from the AAC object type, LC when unknown or out of range.
fn profile(entry: &AudioSampleEntry) -> u64 {
    match entry.audio_specific_config.as_ref().map(|asc| asc.object_type) {
        Some(aot @ 1..=4) => (aot - 1) as u64,
        _ => 1,
    }
}

/// Build the ADTS header preceding an AAC frame of `frame_size` bytes.
pub fn adts_header(entry: &AudioSampleEntry, frame_size: usize) -> [u8; ADTS_HEADER_SIZE] {
    let mut adts: u64 = 0xfff;
    adts <<= 1; // MPEG-4
    adts <<= 2; // layer
    adts = (adts << 1) | 1; // no CRC
    adts = (adts << 2) | profile(entry);
    adts = (adts << 4) | sample_rate_index(entry.sample_rate) as u64;
    adts <<= 1; // private
    adts = (adts << 3) | (entry.channels as u64 & 0x07);
    adts <<= 4; // original, home, copyright bits
    adts = (adts << 13) | ((ADTS_HEADER_SIZE + frame_size) as u64 & 0x1fff);
    adts = (adts << 11) | 0x7ff;
    adts <<= 2; // one raw data block

    let bytes = adts.to_be_bytes();
    let mut header = [0u8; ADTS_HEADER_SIZE];
    header.copy_from_slice(&bytes[1..]);
    header
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mp4::esds::AudioSpecificConfig;

    fn entry(rate: u32, channels: u16) -> AudioSampleEntry {
        AudioSampleEntry {
            channels,
            sample_rate: rate,
            ..Default::default()
        }
    }

    #[test]
    fn test_lc_stereo_44100() {
        let header = adts_header(&entry(44100, 2), 100);
        assert_eq!(header, [0xff, 0xf1, 0x50, 0x80, 0x0d, 0x7f, 0xfc]);
    }

    #[test]
    fn test_sample_rate_index() {
        assert_eq!(sample_rate_index(48000), 3);
        assert_eq!(sample_rate_index(7350), 12);
        assert_eq!(sample_rate_index(12345), 4);
    }

    #[test]
    fn test_profile_from_object_type() {
        let mut e = entry(48000, 1);
        e.audio_specific_config = Some(AudioSpecificConfig {
            object_type: 1,
            sampling_frequency_index: 3,
            sampling_frequency: None,
            channel_configuration: 1,
        });
        let header = adts_header(&e, 10);
        // main profile, index 3, mono
        assert_eq!(header[2], 0x0c);
        assert_eq!(header[3] >> 6, 1);

        if let Some(asc) = e.audio_specific_config.as_mut() {
            asc.object_type = 5;
        }
        assert_eq!(adts_header(&e, 10)[2] >> 6, 1);
    }

    #[test]
    fn test_frame_length_field() {
        let header = adts_header(&entry(48000, 2), 0x1000);
        let len = ((header[3] as u32 & 0x03) << 11) | ((header[4] as u32) << 3) | (header[5] as u32 >> 5);
        assert_eq!(len, 0x1007);
    }
}
