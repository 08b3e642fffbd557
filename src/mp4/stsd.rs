use super::avcc::AvccConfig;
use super::esds::{AudioSpecificConfig, Esds};
use super::hdlr::{HANDLER_SOUND, HANDLER_VIDEO};
use super::r#box::{check_truncated, fourcc_to_string, parse_box_header, read_version_flags};
use crate::bits::reader::ByteReader;
use crate::errors::{HlsResult, Mp4Error};

/// Offset of the first sub-box in a visual sample entry
const VIDEO_ENTRY_SIZE: usize = 78;
/// Codec private data offset inside an `ovc1` entry
const OVC1_PRIVATE_DATA_OFFSET: usize = 190;
const AUDIO_ENTRY_SIZE: usize = 28;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct VideoSampleEntry {
    pub width: u16,
    pub height: u16,
    pub avcc: Option<AvccConfig>,
    pub esds: Option<Esds>,
    pub codec_private_data: Vec<u8>,
}

impl VideoSampleEntry {
    /// Length prefix size of NAL units in samples, 4 when no avcC is present.
    pub fn nal_unit_length(&self) -> u8 {
        self.avcc.as_ref().map_or(4, |c| c.nal_unit_length())
    }

    pub fn sps(&self) -> Option<&[u8]> {
        self.avcc.as_ref().and_then(|c| c.last_sps())
    }

    pub fn pps(&self) -> Option<&[u8]> {
        self.avcc.as_ref().and_then(|c| c.last_pps())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AudioSampleEntry {
    pub version: u16,
    pub channels: u16,
    pub bits_per_sample: u16,
    pub compression_id: u16,
    pub packet_size: u16,
    pub sample_rate: u32,
    pub sample_rate_lo: u16,
    pub format_tag: u16,
    pub avg_bytes_per_sec: u32,
    pub block_align: u16,
    pub max_bitrate: u32,
    pub avg_bitrate: u32,
    pub codec_private_data: Vec<u8>,
    pub audio_specific_config: Option<AudioSpecificConfig>,
}

impl AudioSampleEntry {
    fn apply_esds(&mut self, esds: Esds) {
        if let Some(tag) = esds.format_tag() {
            self.format_tag = tag;
        }
        self.max_bitrate = esds.max_bitrate;
        self.avg_bitrate = esds.avg_bitrate;
        if self.avg_bytes_per_sec == 0 {
            self.avg_bytes_per_sec = esds.avg_bytes_per_sec();
        }
        if !esds.decoder_specific_info.is_empty() {
            match AudioSpecificConfig::parse(&esds.decoder_specific_info) {
                Ok(asc) => self.audio_specific_config = Some(asc),
                Err(e) => log::warn!("ignoring audio specific config: {}", e),
            }
            self.codec_private_data = esds.decoder_specific_info;
        }
    }
}

/// One sample description: fourcc, raw payload and the handler-specific decode.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SampleEntry {
    pub fourcc: [u8; 4],
    pub data: Vec<u8>,
    pub video: Option<VideoSampleEntry>,
    pub audio: Option<AudioSampleEntry>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Stsd {
    pub version: u8,
    pub flags: u32,
    pub entries: Vec<SampleEntry>,
}

impl Stsd {
    /// Split the sample descriptions; type-specific parsing happens in
    /// [`Stsd::parse_entries`] once the handler is known.
    pub fn parse(data: &[u8]) -> HlsResult<Self> {
        ensure_size!("stsd", data, 8);
        let mut r = ByteReader::new(data);
        let (version, flags) = read_version_flags(&mut r);
        let count = r.read_u32();
        ensure_entries!("stsd", r, count, 8);

        let mut entries = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let size = r.read_u32();
            let fourcc = r.read_u32().to_be_bytes();
            if size < 8 {
                return Err(Mp4Error::InvalidSize {
                    kind: fourcc_to_string(&fourcc),
                    size: size as u64,
                }
                .into());
            }
            let payload = r.read_bytes(size as usize - 8);
            check_truncated(&r, "stsd")?;
            entries.push(SampleEntry {
                fourcc,
                data: payload.to_vec(),
                ..Default::default()
            });
        }

        Ok(Stsd {
            version,
            flags,
            entries,
        })
    }

    /// Decode every entry according to the track handler. Entries of other
    /// handlers are left raw.
    pub fn parse_entries(&mut self, handler: [u8; 4]) -> HlsResult<()> {
        for entry in self.entries.iter_mut() {
            match handler {
                HANDLER_VIDEO => entry.video = Some(parse_video_entry(entry)?),
                HANDLER_SOUND => entry.audio = Some(parse_audio_entry(entry)?),
                _ => return Ok(()),
            }
        }
        Ok(())
    }

    pub fn first_video(&self) -> Option<&VideoSampleEntry> {
        self.entries.first().and_then(|e| e.video.as_ref())
    }

    pub fn first_audio(&self) -> Option<&AudioSampleEntry> {
        self.entries.first().and_then(|e| e.audio.as_ref())
    }
}

/// Visit the boxes nested in a sample entry that start in `[start, limit)`.
fn for_each_sub_box<F>(data: &[u8], start: usize, limit: usize, mut f: F) -> HlsResult<()>
where
    F: FnMut([u8; 4], &[u8]) -> HlsResult<()>,
{
    let mut pos = start;
    while pos < limit {
        let box_start = pos;
        let header = parse_box_header(data, &mut pos)
            .ok_or_else(|| Mp4Error::truncated("sample entry", pos + 8, data.len()))?;
        let end = box_start as u64 + header.size;
        if header.size < header.header_size || end > data.len() as u64 {
            return Err(Mp4Error::InvalidSize {
                kind: header.kind.name(),
                size: header.size,
            }
            .into());
        }
        f(header.kind.fourcc(), &data[pos..end as usize])?;
        pos = end as usize;
    }
    Ok(())
}

fn parse_video_entry(entry: &SampleEntry) -> HlsResult<VideoSampleEntry> {
    let data = &entry.data;
    if data.len() < VIDEO_ENTRY_SIZE {
        return Err(Mp4Error::truncated(
            &fourcc_to_string(&entry.fourcc),
            VIDEO_ENTRY_SIZE,
            data.len(),
        )
        .into());
    }

    let mut video = VideoSampleEntry {
        width: u16::from_be_bytes([data[24], data[25]]),
        height: u16::from_be_bytes([data[26], data[27]]),
        ..Default::default()
    };

    // ovc1 ends with its codec private data instead of boxes
    if &entry.fourcc == b"ovc1" {
        video.codec_private_data = data.get(OVC1_PRIVATE_DATA_OFFSET..).unwrap_or(&[]).to_vec();
        return Ok(video);
    }

    let limit = data.len().saturating_sub(8);
    for_each_sub_box(data, VIDEO_ENTRY_SIZE, limit, |fourcc, payload| {
        match &fourcc {
            b"avcC" => {
                let config = AvccConfig::parse(payload)?;
                video.codec_private_data = payload.to_vec();
                video.avcc = Some(config);
            }
            b"esds" => video.esds = Some(Esds::parse(payload)?),
            _ => {}
        }
        Ok(())
    })?;

    log::debug!(
        "video entry {} {}x{}",
        fourcc_to_string(&entry.fourcc),
        video.width,
        video.height
    );
    Ok(video)
}

fn parse_audio_entry(entry: &SampleEntry) -> HlsResult<AudioSampleEntry> {
    let data = &entry.data;
    let kind = fourcc_to_string(&entry.fourcc);
    if data.len() < AUDIO_ENTRY_SIZE {
        return Err(Mp4Error::truncated(&kind, AUDIO_ENTRY_SIZE, data.len()).into());
    }

    let mut r = ByteReader::new(data);
    r.skip(8); // reserved + data reference index
    let mut audio = AudioSampleEntry {
        version: r.read_u16(),
        ..Default::default()
    };
    r.skip(6); // revision + vendor
    audio.channels = r.read_u16();
    if audio.channels == 3 {
        audio.channels = 6;
    }
    audio.bits_per_sample = r.read_u16();
    audio.compression_id = r.read_u16();
    audio.packet_size = r.read_u16();
    audio.sample_rate = r.read_u16() as u32;
    audio.sample_rate_lo = r.read_u16();

    // owma is followed by its codec private data instead of boxes
    if &entry.fourcc == b"owma" {
        audio.codec_private_data = r.read_remaining().to_vec();
        return Ok(audio);
    }

    if audio.version >= 1 {
        let extension = match audio.version {
            1 => 16,
            2 => 36,
            v => {
                return Err(
                    Mp4Error::new(format!("{}: unsupported sound entry version {}", kind, v))
                        .into(),
                )
            }
        };
        ensure_size!(&kind, data, AUDIO_ENTRY_SIZE + extension);

        let samples_per_packet = r.read_u32();
        let bytes_per_packet = r.read_u32();
        let bytes_per_frame = r.read_u32();
        let _bytes_per_sample = r.read_u32();
        let channels = audio.channels as u64;
        let rate = audio.sample_rate as u64;
        if samples_per_packet > 0 {
            let spp = samples_per_packet as u64;
            audio.avg_bytes_per_sec =
                ((channels * rate * bytes_per_packet as u64 + spp / 2) / spp) as u32;
            audio.block_align = bytes_per_frame as u16;
        } else {
            audio.avg_bytes_per_sec = (channels * rate * audio.bits_per_sample as u64 / 8) as u32;
        }
        r.skip(extension - 16);
    }
    check_truncated(&r, &kind)?;

    let limit = data.len().saturating_sub(8);
    for_each_sub_box(data, r.position(), limit, |fourcc, payload| {
        match &fourcc {
            b"wave" => {
                // QuickTime wraps esds in a wave box
                for_each_sub_box(payload, 0, payload.len(), |inner, inner_payload| {
                    if &inner == b"esds" {
                        audio.apply_esds(Esds::parse(inner_payload)?);
                    }
                    Ok(())
                })?;
            }
            b"esds" => audio.apply_esds(Esds::parse(payload)?),
            _ => {}
        }
        Ok(())
    })?;

    log::debug!(
        "audio entry {} channels={} rate={} bits={}",
        kind,
        audio.channels,
        audio.sample_rate,
        audio.bits_per_sample
    );
    Ok(audio)
}
