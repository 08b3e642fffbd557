//! Synthetic progressive MP4 files for the integration tests.
#![allow(dead_code)]

use std::io::Write;
use tempfile::NamedTempFile;

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn mp4_box(kind: &[u8; 4], payload: &[u8]) -> Vec<u8> {
    let mut out = (payload.len() as u32 + 8).to_be_bytes().to_vec();
    out.extend_from_slice(kind);
    out.extend_from_slice(payload);
    out
}

fn be(values: &[u32]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_be_bytes()).collect()
}

/// Full box header plus entry count followed by the flattened rows.
fn table(count: usize, values: &[u32]) -> Vec<u8> {
    let mut out = vec![0, 0, 0, 0];
    out.extend_from_slice(&(count as u32).to_be_bytes());
    out.extend_from_slice(&be(values));
    out
}

#[derive(Clone)]
pub struct Track {
    pub video: bool,
    pub timescale: u32,
    pub sample_duration: u32,
    pub samples: Vec<Vec<u8>>,
    pub sync: Option<Vec<u32>>,
}

impl Track {
    /// 25 fps H.264 with one IDR every `gop` frames.
    pub fn video(count: usize, gop: usize) -> Self {
        let samples = (0..count)
            .map(|i| {
                let size = 80 + i % 17;
                let mut s = ((size - 4) as u32).to_be_bytes().to_vec();
                s.push(if i % gop == 0 { 0x65 } else { 0x41 });
                s.extend((5..size).map(|b| (b as u8).wrapping_mul(3) | 1));
                s
            })
            .collect();
        Track {
            video: true,
            timescale: 1000,
            sample_duration: 40,
            samples,
            sync: Some((0..count).step_by(gop).map(|i| i as u32 + 1).collect()),
        }
    }

    /// 48 kHz AAC, 1024 samples per frame.
    pub fn audio(count: usize) -> Self {
        Track {
            video: false,
            timescale: 48000,
            sample_duration: 1024,
            samples: (0..count).map(|i| vec![0x21, i as u8, 0x40, 0x07]).collect(),
            sync: None,
        }
    }

    fn duration(&self) -> u32 {
        self.sample_duration * self.samples.len() as u32
    }
}

fn sample_entry(video: bool) -> Vec<u8> {
    if video {
        let mut data = vec![0u8; 78];
        data[7] = 1;
        data[24..28].copy_from_slice(&[0x01, 0x40, 0x00, 0xf0]);
        data[74..78].copy_from_slice(&[0x00, 0x18, 0xff, 0xff]);
        let avcc = [
            1, 0x42, 0xc0, 0x1e, 0xff, 0xe1, 0, 4, 0x67, 0x42, 0xc0, 0x1e, 1, 0, 2, 0x68, 0xce,
        ];
        data.extend_from_slice(&mp4_box(b"avcC", &avcc));
        mp4_box(b"avc1", &data)
    } else {
        let mut data = vec![0u8; 28];
        data[7] = 1;
        data[17] = 2;
        data[19] = 16;
        data[24..26].copy_from_slice(&48000u16.to_be_bytes());
        let esds = [
            0, 0, 0, 0, 3, 22, 0, 1, 0, 4, 17, 0x40, 0x15, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 5, 2,
            0x11, 0x90,
        ];
        data.extend_from_slice(&mp4_box(b"esds", &esds));
        mp4_box(b"mp4a", &data)
    }
}

fn trak(id: u32, track: &Track, offset: u32, omit: Option<&[u8; 4]>) -> Vec<u8> {
    let count = track.samples.len();
    let mut stbl = Vec::new();
    let mut push = |kind: &[u8; 4], payload: Vec<u8>| {
        if omit != Some(kind) {
            stbl.extend_from_slice(&mp4_box(kind, &payload));
        }
    };
    push(b"stsd", table(1, &[]).into_iter().chain(sample_entry(track.video)).collect());
    push(b"stts", table(1, &[count as u32, track.sample_duration]));
    if let Some(sync) = &track.sync {
        push(b"stss", table(sync.len(), sync));
    }
    push(b"stsc", table(1, &[1, count as u32, 1]));
    let sizes: Vec<u32> = track.samples.iter().map(|s| s.len() as u32).collect();
    push(b"stsz", [vec![0; 8], table(count, &sizes)[4..].to_vec()].concat());
    push(b"stco", table(1, &[offset]));

    let handler: &[u8; 4] = if track.video { b"vide" } else { b"soun" };
    let mut hdlr = vec![0u8; 8];
    hdlr.extend_from_slice(handler);
    hdlr.extend_from_slice(&[0; 13]);
    let mdhd = [vec![0u8; 12], be(&[track.timescale, track.duration()]), vec![0x55, 0xc4, 0, 0]].concat();
    let minf = [mp4_box(b"stbl", &stbl)].concat();
    let mdia = [mp4_box(b"mdhd", &mdhd), mp4_box(b"hdlr", &hdlr), mp4_box(b"minf", &minf)].concat();

    let mut tkhd = vec![0, 0, 0, 3];
    tkhd.extend_from_slice(&[0; 8]);
    tkhd.extend_from_slice(&be(&[id, 0, track.duration() * 1000 / track.timescale]));
    tkhd.extend_from_slice(&[0; 16]);
    tkhd.extend_from_slice(&be(&[0x10000, 0, 0, 0, 0x10000, 0, 0, 0, 0x4000_0000, 0, 0]));
    mp4_box(b"trak", &[mp4_box(b"tkhd", &tkhd), mp4_box(b"mdia", &mdia)].concat())
}

fn moov(tracks: &[Track], offsets: &[u32], omit: Option<&[u8; 4]>) -> Vec<u8> {
    let duration = tracks
        .iter()
        .map(|t| t.duration() * 1000 / t.timescale)
        .max()
        .unwrap_or(0);
    let mut mvhd = vec![0u8; 12];
    mvhd.extend_from_slice(&be(&[1000, duration, 0x10000]));
    mvhd.extend_from_slice(&[1, 0]);
    mvhd.extend_from_slice(&[0; 10]);
    mvhd.extend_from_slice(&be(&[0x10000, 0, 0, 0, 0x10000, 0, 0, 0, 0x4000_0000]));
    mvhd.extend_from_slice(&[0; 24]);
    mvhd.extend_from_slice(&be(&[tracks.len() as u32 + 1]));

    let mut payload = mp4_box(b"mvhd", &mvhd);
    for (i, (track, &offset)) in tracks.iter().zip(offsets).enumerate() {
        payload.extend_from_slice(&trak(i as u32 + 1, track, offset, omit));
    }
    mp4_box(b"moov", &payload)
}

/// `ftyp`, `moov`, `mdat` with each track's samples contiguous in one chunk;
/// `omit` drops that sample table box from every track.
pub fn movie(tracks: &[Track], omit: Option<&[u8; 4]>) -> Vec<u8> {
    let ftyp = mp4_box(b"ftyp", b"isom\0\0\x02\0isomavc1");
    let moov_len = moov(tracks, &vec![0; tracks.len()], omit).len();

    let mut pos = (ftyp.len() + moov_len + 8) as u32;
    let mut offsets = Vec::new();
    let mut mdat = Vec::new();
    for track in tracks {
        offsets.push(pos);
        for sample in &track.samples {
            mdat.extend_from_slice(sample);
            pos += sample.len() as u32;
        }
    }
    [ftyp, moov(tracks, &offsets, omit), mp4_box(b"mdat", &mdat)].concat()
}

/// 14 s of video with a 2 s GOP plus matching AAC audio.
pub fn av_movie() -> Vec<u8> {
    movie(&[Track::video(350, 50), Track::audio(656)], None)
}

pub fn write_temp(data: &[u8]) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .prefix("movie")
        .suffix(".mp4")
        .tempfile()
        .expect("tempfile");
    file.write_all(data).expect("write");
    file.flush().expect("flush");
    file
}
