mod common;

use common::{av_movie, init_logger, movie, write_temp, Track};
use mp4hls::ts::{PMT_PID, START_PID, TS_PACKET_SIZE};
use mp4hls::{
    open_file, playlist_for_file, segment_for_file, HlsConfig, HlsError, LocalSeekableStream,
    Mp4Context, Mp4Error, SplitOptions,
};
use regex::Regex;
use std::io::Cursor;

fn pid(packet: &[u8]) -> u16 {
    (((packet[1] & 0x1f) as u16) << 8) | packet[2] as u16
}

/// Payload-unit-start packets per PID.
fn pes_starts(ts: &[u8], wanted: u16) -> usize {
    ts.chunks(TS_PACKET_SIZE)
        .filter(|p| pid(p) == wanted && p[1] & 0x40 != 0)
        .count()
}

fn config(length: u32) -> HlsConfig {
    HlsConfig {
        length,
        ..Default::default()
    }
}

#[test]
fn test_playlist_from_file() {
    init_logger();
    let file = write_temp(&av_movie());
    let text = playlist_for_file(file.path(), &config(6), &SplitOptions::default(), "").unwrap();

    let name = file.path().file_stem().unwrap().to_string_lossy().into_owned();
    assert!(text.starts_with("#EXTM3U\n#EXT-X-TARGETDURATION:9\n"));
    assert!(text.ends_with("#EXT-X-ENDLIST\n"));

    let entry = Regex::new(r"#EXTINF:(\d+\.\d{3}),\n(\d+)/(\S+)\.ts\n").unwrap();
    let entries: Vec<(String, String, String)> = entry
        .captures_iter(&text)
        .map(|c| (c[1].to_string(), c[2].to_string(), c[3].to_string()))
        .collect();
    assert_eq!(entries.len(), 3);
    assert_eq!(entries[0], ("6.000".to_string(), "0".to_string(), name.clone()));
    assert_eq!(entries[1].1, "3");
    assert_eq!(entries[2], ("2.000".to_string(), "6".to_string(), name));
}

#[test]
fn test_fragment_segment_from_file() {
    init_logger();
    let file = write_temp(&av_movie());
    let options = SplitOptions::from_query("video=3");
    let ts = segment_for_file(file.path(), &config(6), &options).unwrap();

    assert_eq!(ts.len() % TS_PACKET_SIZE, 0);
    assert!(ts.chunks(TS_PACKET_SIZE).all(|p| p[0] == 0x47));
    assert_eq!(pid(&ts[..TS_PACKET_SIZE]), 0);
    assert_eq!(pid(&ts[TS_PACKET_SIZE..2 * TS_PACKET_SIZE]), PMT_PID);

    // 6 s of 25 fps video, one PES per frame
    assert_eq!(pes_starts(&ts, START_PID), 150);
    // audio is flushed each time a video frame interleaves
    let audio = pes_starts(&ts, START_PID + 1);
    assert!((140..=160).contains(&audio), "{} audio PES", audio);
}

#[test]
fn test_range_segment_from_file() {
    init_logger();
    let file = write_temp(&av_movie());
    let options = SplitOptions::from_query("start=2.5&end=7");
    let ts = segment_for_file(file.path(), &config(6), &options).unwrap();

    assert_eq!(ts.len() % TS_PACKET_SIZE, 0);
    // both ends snap back to keyframes, at 2 s and 6 s
    assert_eq!(pes_starts(&ts, START_PID), 100);
}

#[test]
fn test_segment_past_the_end() {
    let file = write_temp(&av_movie());
    let options = SplitOptions::from_query("video=40");
    match segment_for_file(file.path(), &config(6), &options) {
        Err(HlsError::NoSegment(_)) => {}
        other => panic!("unexpected {:?}", other.map(|ts| ts.len())),
    }
}

#[test]
fn test_open_file_lists_tracks() {
    let file = write_temp(&av_movie());
    let mut ctx = open_file(file.path(), &HlsConfig::default()).unwrap();
    ctx.build_index().unwrap();

    assert_eq!(ctx.boxes.len(), 3);
    assert_eq!(ctx.moov.traks.len(), 2);
    assert!(ctx.moov.traks[0].is_video());
    assert!(ctx.moov.traks[1].is_audio());
    assert_eq!(ctx.moov.traks[0].samples_size(), 350);
    assert_eq!(ctx.moov.traks[1].samples_size(), 656);
}

#[test]
fn test_missing_stts_fails_to_open() {
    let data = movie(&[Track::video(50, 25)], Some(b"stts"));
    let result = Mp4Context::open(Cursor::new(data), &HlsConfig::default());
    match result {
        Err(HlsError::Mp4(Mp4Error::MissingChild { parent, child })) => {
            assert_eq!((parent.as_str(), child.as_str()), ("stbl", "stts"));
        }
        Err(e) => panic!("unexpected error {}", e),
        Ok(_) => panic!("opened a movie without stts"),
    }
}

#[test]
fn test_missing_stsz_degrades_track() {
    init_logger();
    let data = movie(&[Track::video(50, 25)], Some(b"stsz"));
    let mut ctx = Mp4Context::open(Cursor::new(data), &HlsConfig::default()).unwrap();
    ctx.build_index().unwrap();
    assert_eq!(ctx.moov.traks[0].samples_size(), 0);

    let ts = mp4hls::output_range(&mut ctx, &SplitOptions::default());
    assert!(matches!(ts, Err(HlsError::NoSegment(_))));
}

#[test]
fn test_small_window_reads_still_mux() {
    let file = write_temp(&av_movie());
    let config = HlsConfig {
        length: 6,
        buffer_size: 1024,
        max_buffer_size: 64 * 1024,
        alignment: true,
        ..Default::default()
    };
    let stream = LocalSeekableStream::open(file.path()).unwrap();
    let mut ctx = Mp4Context::open(stream, &config).unwrap();
    let ts = mp4hls::output_ts(&mut ctx, &SplitOptions::from_query("video=0"), &config).unwrap();

    assert_eq!(pes_starts(&ts, START_PID), 150);
    assert!(ctx.reader.fetch_count() >= 2);
}

#[test]
fn test_config_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    std::io::Write::write_all(&mut file, br#"{"length": 4, "hls_proxy": "http://edge/vod"}"#)
        .unwrap();
    let config = HlsConfig::load(file.path()).unwrap();
    assert_eq!(config.length, 4);
    assert_eq!(config.hls_proxy.as_deref(), Some("http://edge/vod"));
    assert!(config.relative);
}
