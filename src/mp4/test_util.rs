//! Builders for box payloads and small synthetic movies used by unit tests.

use super::stco::Stco;
use super::stsc::{Stsc, StscEntry};
use super::stsz::Stsz;
use super::stts::{Stts, SttsEntry};
use super::trak::Trak;

pub fn make_box(kind: &str, payload: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(payload.len() + 8);
    out.extend_from_slice(&(payload.len() as u32 + 8).to_be_bytes());
    out.extend_from_slice(kind.as_bytes());
    out.extend_from_slice(payload);
    out
}

fn full_box_header(out: &mut Vec<u8>, version: u8, flags: u32) {
    out.push(version);
    out.extend_from_slice(&flags.to_be_bytes()[1..]);
}

/// Full box with an entry count followed by fixed-width rows.
pub fn table_payload<const N: usize>(rows: &[[u32; N]]) -> Vec<u8> {
    let mut out = vec![0, 0, 0, 0];
    out.extend_from_slice(&(rows.len() as u32).to_be_bytes());
    for row in rows {
        for v in row {
            out.extend_from_slice(&v.to_be_bytes());
        }
    }
    out
}

pub fn list_payload(values: &[u32]) -> Vec<u8> {
    let rows: Vec<[u32; 1]> = values.iter().map(|&v| [v]).collect();
    table_payload(&rows)
}

const IDENTITY_MATRIX: [u32; 9] = [0x10000, 0, 0, 0, 0x10000, 0, 0, 0, 0x4000_0000];

pub fn mvhd_payload(timescale: u32, duration: u32) -> Vec<u8> {
    let mut out = Vec::new();
    full_box_header(&mut out, 0, 0);
    out.extend_from_slice(&[0; 8]);
    out.extend_from_slice(&timescale.to_be_bytes());
    out.extend_from_slice(&duration.to_be_bytes());
    out.extend_from_slice(&0x0001_0000u32.to_be_bytes());
    out.extend_from_slice(&0x0100u16.to_be_bytes());
    out.extend_from_slice(&[0; 10]);
    for m in IDENTITY_MATRIX {
        out.extend_from_slice(&m.to_be_bytes());
    }
    out.extend_from_slice(&[0; 24]);
    out.extend_from_slice(&3u32.to_be_bytes());
    out
}

pub fn tkhd_payload(track_id: u32, duration: u32, width: u16, height: u16) -> Vec<u8> {
    let mut out = Vec::new();
    full_box_header(&mut out, 0, 3);
    out.extend_from_slice(&[0; 8]);
    out.extend_from_slice(&track_id.to_be_bytes());
    out.extend_from_slice(&[0; 4]);
    out.extend_from_slice(&duration.to_be_bytes());
    out.extend_from_slice(&[0; 16]);
    for m in IDENTITY_MATRIX {
        out.extend_from_slice(&m.to_be_bytes());
    }
    out.extend_from_slice(&((width as u32) << 16).to_be_bytes());
    out.extend_from_slice(&((height as u32) << 16).to_be_bytes());
    out
}

pub fn mdhd_payload(timescale: u32, duration: u32) -> Vec<u8> {
    let mut out = Vec::new();
    full_box_header(&mut out, 0, 0);
    out.extend_from_slice(&[0; 8]);
    out.extend_from_slice(&timescale.to_be_bytes());
    out.extend_from_slice(&duration.to_be_bytes());
    // "eng"
    out.extend_from_slice(&[0x15, 0xc7, 0, 0]);
    out
}

pub fn hdlr_payload(handler: &[u8; 4], name: &str) -> Vec<u8> {
    let mut out = Vec::new();
    full_box_header(&mut out, 0, 0);
    out.extend_from_slice(&[0; 4]);
    out.extend_from_slice(handler);
    out.extend_from_slice(&[0; 12]);
    out.extend_from_slice(name.as_bytes());
    out.push(0);
    out
}

pub fn dinf_payload() -> Vec<u8> {
    let mut dref = Vec::new();
    full_box_header(&mut dref, 0, 0);
    dref.extend_from_slice(&1u32.to_be_bytes());
    dref.extend_from_slice(&12u32.to_be_bytes());
    dref.extend_from_slice(b"url ");
    dref.extend_from_slice(&1u32.to_be_bytes());
    make_box("dref", &dref)
}

pub const TEST_SPS: [u8; 8] = [0x67, 0x64, 0x00, 0x1f, 0xac, 0xd9, 0x40, 0x50];
pub const TEST_PPS: [u8; 4] = [0x68, 0xeb, 0xe3, 0xcb];

pub fn avcc_payload() -> Vec<u8> {
    let mut out = vec![1, 0x64, 0x00, 0x1f, 0xff, 0xe1];
    out.extend_from_slice(&(TEST_SPS.len() as u16).to_be_bytes());
    out.extend_from_slice(&TEST_SPS);
    out.push(1);
    out.extend_from_slice(&(TEST_PPS.len() as u16).to_be_bytes());
    out.extend_from_slice(&TEST_PPS);
    out
}

pub fn esds_payload(dsi: &[u8]) -> Vec<u8> {
    let mut decoder_config = vec![0x40, 0x15, 0, 0x18, 0];
    decoder_config.extend_from_slice(&128_000u32.to_be_bytes());
    decoder_config.extend_from_slice(&0u32.to_be_bytes());
    decoder_config.push(5);
    decoder_config.push(dsi.len() as u8);
    decoder_config.extend_from_slice(dsi);

    let mut out = vec![0, 0, 0, 0, 3];
    out.push((3 + 2 + decoder_config.len()) as u8);
    out.extend_from_slice(&[0, 1, 0]);
    out.push(4);
    out.push(decoder_config.len() as u8);
    out.extend_from_slice(&decoder_config);
    out
}

/// Sample description holding one opaque entry.
pub fn stsd_raw_payload() -> Vec<u8> {
    stsd_payload(&[make_box("mp4a", &[0; 8])])
}

pub fn stsd_payload(entries: &[Vec<u8>]) -> Vec<u8> {
    let mut out = vec![0, 0, 0, 0];
    out.extend_from_slice(&(entries.len() as u32).to_be_bytes());
    for entry in entries {
        out.extend_from_slice(entry);
    }
    out
}

pub fn avc1_entry(width: u16, height: u16) -> Vec<u8> {
    let mut data = vec![0u8; 78];
    data[7] = 1; // data reference index
    data[24..26].copy_from_slice(&width.to_be_bytes());
    data[26..28].copy_from_slice(&height.to_be_bytes());
    data[28..30].copy_from_slice(&0x48u16.to_be_bytes());
    data[74..76].copy_from_slice(&0x18u16.to_be_bytes());
    data[76..78].copy_from_slice(&0xffffu16.to_be_bytes());
    data.extend_from_slice(&make_box("avcC", &avcc_payload()));
    make_box("avc1", &data)
}

/// AAC LC entry, `dsi` being the AudioSpecificConfig.
pub fn mp4a_entry(channels: u16, sample_rate: u16, dsi: &[u8]) -> Vec<u8> {
    let mut data = vec![0u8; 28];
    data[7] = 1;
    data[16..18].copy_from_slice(&channels.to_be_bytes());
    data[18..20].copy_from_slice(&16u16.to_be_bytes());
    data[24..26].copy_from_slice(&sample_rate.to_be_bytes());
    data.extend_from_slice(&make_box("esds", &esds_payload(dsi)));
    make_box("mp4a", &data)
}

/// One track of a synthetic movie. All samples go into a single chunk.
pub struct TrackSpec {
    pub handler: [u8; 4],
    pub timescale: u32,
    pub sample_duration: u32,
    pub samples: Vec<Vec<u8>>,
    /// 1-based sync sample numbers; `None` writes no stss
    pub sync_samples: Option<Vec<u32>>,
}

impl TrackSpec {
    /// H.264 track at 25 fps with a keyframe every `gop` samples.
    pub fn video(sample_count: usize, gop: usize) -> Self {
        let samples = (0..sample_count)
            .map(|i| video_sample(i % gop == 0, 60 + i % 13))
            .collect();
        let sync = (0..sample_count)
            .step_by(gop)
            .map(|i| i as u32 + 1)
            .collect();
        TrackSpec {
            handler: *b"vide",
            timescale: 1000,
            sample_duration: 40,
            samples,
            sync_samples: Some(sync),
        }
    }

    /// AAC track at 48 kHz, 1024 samples per frame, no stss.
    pub fn audio(sample_count: usize) -> Self {
        TrackSpec {
            handler: *b"soun",
            timescale: 48000,
            sample_duration: 1024,
            samples: (0..sample_count)
                .map(|i| vec![0x21, (i & 0xff) as u8, 0x5a, 0xa5, 0x11, 0x22])
                .collect(),
            sync_samples: None,
        }
    }

    fn duration(&self) -> u32 {
        self.sample_duration * self.samples.len() as u32
    }
}

/// One length-prefixed NAL unit of `size` bytes in total.
pub fn video_sample(keyframe: bool, size: usize) -> Vec<u8> {
    let mut out = ((size - 4) as u32).to_be_bytes().to_vec();
    out.push(if keyframe { 0x65 } else { 0x41 });
    out.extend((5..size).map(|i| (i * 7) as u8 | 1));
    out
}

fn trak_box(track_id: u32, movie_timescale: u32, track: &TrackSpec, chunk_offset: u32) -> Vec<u8> {
    let video = &track.handler == b"vide";
    let entry = if video {
        avc1_entry(320, 240)
    } else {
        mp4a_entry(2, 48000, &[0x11, 0x90])
    };

    let sizes: Vec<u32> = track.samples.iter().map(|s| s.len() as u32).collect();
    let mut stsz = vec![0u8; 8];
    stsz.extend_from_slice(&(sizes.len() as u32).to_be_bytes());
    for size in &sizes {
        stsz.extend_from_slice(&size.to_be_bytes());
    }

    let mut stbl = [
        make_box("stsd", &stsd_payload(&[entry])),
        make_box(
            "stts",
            &table_payload(&[[track.samples.len() as u32, track.sample_duration]]),
        ),
    ]
    .concat();
    if let Some(sync) = &track.sync_samples {
        stbl.extend_from_slice(&make_box("stss", &list_payload(sync)));
    }
    stbl.extend_from_slice(&make_box(
        "stsc",
        &table_payload(&[[1, track.samples.len() as u32, 1]]),
    ));
    stbl.extend_from_slice(&make_box("stsz", &stsz));
    stbl.extend_from_slice(&make_box("stco", &list_payload(&[chunk_offset])));

    let media_header = if video {
        make_box("vmhd", &[0, 0, 0, 1, 0, 0, 0, 0, 0, 0, 0, 0])
    } else {
        make_box("smhd", &[0; 8])
    };
    let minf = [
        media_header,
        make_box("dinf", &dinf_payload()),
        make_box("stbl", &stbl),
    ]
    .concat();
    let name = if video { "VideoHandler" } else { "SoundHandler" };
    let mdia = [
        make_box("mdhd", &mdhd_payload(track.timescale, track.duration())),
        make_box("hdlr", &hdlr_payload(&track.handler, name)),
        make_box("minf", &minf),
    ]
    .concat();

    let movie_duration =
        (track.duration() as u64 * movie_timescale as u64 / track.timescale as u64) as u32;
    let (width, height) = if video { (320, 240) } else { (0, 0) };
    let trak = [
        make_box("tkhd", &tkhd_payload(track_id, movie_duration, width, height)),
        make_box("mdia", &mdia),
    ]
    .concat();
    make_box("trak", &trak)
}

fn moov_box(movie_timescale: u32, tracks: &[TrackSpec], offsets: &[u32]) -> Vec<u8> {
    let duration = tracks
        .iter()
        .map(|t| (t.duration() as u64 * movie_timescale as u64 / t.timescale as u64) as u32)
        .max()
        .unwrap_or(0);
    let mut moov = make_box("mvhd", &mvhd_payload(movie_timescale, duration));
    for (i, (track, &offset)) in tracks.iter().zip(offsets).enumerate() {
        moov.extend_from_slice(&trak_box(i as u32 + 1, movie_timescale, track, offset));
    }
    make_box("moov", &moov)
}

/// Complete `ftyp`, `moov`, `mdat` file; each track's samples are stored
/// back to back in the mdat in track order.
pub fn movie_file(movie_timescale: u32, tracks: &[TrackSpec]) -> Vec<u8> {
    let ftyp = make_box("ftyp", b"isom\0\0\x02\0isomavc1");
    let placeholder = vec![0u32; tracks.len()];
    let moov_len = moov_box(movie_timescale, tracks, &placeholder).len();

    let mut offsets = Vec::with_capacity(tracks.len());
    let mut pos = (ftyp.len() + moov_len + 8) as u32;
    let mut mdat = Vec::new();
    for track in tracks {
        offsets.push(pos);
        for sample in &track.samples {
            mdat.extend_from_slice(sample);
            pos += sample.len() as u32;
        }
    }

    [
        ftyp,
        moov_box(movie_timescale, tracks, &offsets),
        make_box("mdat", &mdat),
    ]
    .concat()
}

/// Track built straight from sample table rows, bypassing box decoding.
/// `stsc` rows are (zero-based first chunk, samples per chunk), `stts`
/// rows are (count, duration).
pub fn table_trak(
    handler: [u8; 4],
    timescale: u32,
    offsets: Vec<u64>,
    stsc: Vec<(u32, u32)>,
    sizes: Vec<u32>,
    stts: Vec<(u32, u32)>,
) -> Trak {
    let mut trak = Trak::default();
    trak.mdia.hdlr.handler_type = handler;
    trak.mdia.mdhd.timescale = timescale;
    let stbl = &mut trak.mdia.minf.stbl;
    stbl.stco = Some(Stco {
        chunk_offsets: offsets,
        ..Default::default()
    });
    stbl.stsc = Some(Stsc {
        entries: stsc
            .into_iter()
            .map(|(chunk, samples)| StscEntry {
                chunk,
                samples,
                id: 1,
            })
            .collect(),
        ..Default::default()
    });
    stbl.stsz = Some(Stsz {
        entries: sizes.len() as u32,
        sample_sizes: sizes,
        ..Default::default()
    });
    stbl.stts = Stts {
        entries: stts
            .into_iter()
            .map(|(sample_count, sample_duration)| SttsEntry {
                sample_count,
                sample_duration,
            })
            .collect(),
        ..Default::default()
    };
    trak
}
