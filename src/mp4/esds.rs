use super::r#box::check_truncated;
use crate::bits::reader::{BitReader, ByteReader};
use crate::errors::{HlsResult, Mp4Error};

const ES_DESCRIPTOR_TAG: u8 = 3;
const DECODER_CONFIG_DESCRIPTOR_TAG: u8 = 4;
const DECODER_SPECIFIC_DESCRIPTOR_TAG: u8 = 5;

/// WAVE format tag for raw AAC
pub const FORMAT_TAG_AAC: u16 = 0x00ff;
/// WAVE format tag for MPEG layer 3
pub const FORMAT_TAG_MP3: u16 = 0x0055;

/// Elementary stream descriptor
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Esds {
    pub object_type_id: u8,
    pub stream_type: u8,
    pub buffer_size_db: u32,
    pub max_bitrate: u32,
    pub avg_bitrate: u32,
    /// DecoderSpecificInfo, the AudioSpecificConfig for AAC
    pub decoder_specific_info: Vec<u8>,
}

/// Descriptor length: 7 bits per byte, high bit continues, at most 4 bytes.
fn read_descriptor_length(r: &mut ByteReader<'_>) -> u32 {
    let mut len = 0u32;
    for _ in 0..4 {
        let c = r.read_u8();
        len = (len << 7) | (c & 0x7f) as u32;
        if c & 0x80 == 0 {
            break;
        }
    }
    len
}

impl Esds {
    pub fn parse(data: &[u8]) -> HlsResult<Self> {
        ensure_size!("esds", data, 9);
        let mut r = ByteReader::new(data);
        r.skip(4); // version and flags

        if r.read_u8() == ES_DESCRIPTOR_TAG {
            let len = read_descriptor_length(&mut r);
            log::debug!("esds: elementary stream descriptor len={}", len);
            r.skip(3);
        } else {
            r.skip(2);
        }

        let tag = r.read_u8();
        let len = read_descriptor_length(&mut r);
        if tag != DECODER_CONFIG_DESCRIPTOR_TAG {
            return Err(Mp4Error::new(format!(
                "esds: expected decoder config descriptor, got tag {} (len {})",
                tag, len
            ))
            .into());
        }

        let mut esds = Esds {
            object_type_id: r.read_u8(),
            stream_type: r.read_u8(),
            buffer_size_db: r.read_u24(),
            max_bitrate: r.read_u32(),
            avg_bitrate: r.read_u32(),
            ..Default::default()
        };
        check_truncated(&r, "esds")?;
        log::debug!(
            "esds: object_type_id=0x{:02x} stream_type={} max_bitrate={} avg_bitrate={}",
            esds.object_type_id,
            esds.stream_type,
            esds.max_bitrate,
            esds.avg_bitrate
        );

        if r.remaining() > 0 {
            let tag = r.read_u8();
            let len = read_descriptor_length(&mut r) as usize;
            if tag == DECODER_SPECIFIC_DESCRIPTOR_TAG {
                let len = len.min(r.remaining());
                esds.decoder_specific_info = r.read_bytes(len).to_vec();
            }
        }

        Ok(esds)
    }

    /// WAVE format tag implied by the object type, if any.
    pub fn format_tag(&self) -> Option<u16> {
        match self.object_type_id {
            0x40 | 0x66 | 0x67 | 0x68 => Some(FORMAT_TAG_AAC),
            0x69 | 0x6b => Some(FORMAT_TAG_MP3),
            _ => None,
        }
    }

    /// Average bytes per second from the advertised bitrates.
    pub fn avg_bytes_per_sec(&self) -> u32 {
        let bitrate = if self.avg_bitrate != 0 {
            self.avg_bitrate
        } else {
            self.max_bitrate
        };
        bitrate / 8
    }
}

/// The leading fields of an MPEG-4 AudioSpecificConfig.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioSpecificConfig {
    pub object_type: u8,
    pub sampling_frequency_index: u8,
    pub sampling_frequency: Option<u32>,
    pub channel_configuration: u8,
}

impl AudioSpecificConfig {
    pub fn parse(data: &[u8]) -> HlsResult<Self> {
        let mut br = BitReader::new(data);
        let mut object_type = br.read(5) as u8;
        if object_type == 31 {
            object_type = 32 + br.read(6) as u8;
        }
        let sampling_frequency_index = br.read(4) as u8;
        let sampling_frequency = (sampling_frequency_index == 0x0f).then(|| br.read(24));
        let channel_configuration = br.read(4) as u8;
        if let Some(err) = br.acc_error() {
            return Err(Mp4Error::new(format!("AudioSpecificConfig: {}", err)).into());
        }
        Ok(AudioSpecificConfig {
            object_type,
            sampling_frequency_index,
            sampling_frequency,
            channel_configuration,
        })
    }
}
