use crate::errors::{HlsResult, SegmentError};
use crate::hls::options::SplitOptions;
use crate::mp4::moov::Moov;
use crate::mp4::trak::Trak;
use log::debug;

/// Streams muxed into one transport stream segment.
pub const MAX_FRAGMENT_STREAMS: usize = 2;

/// Samples `[first, last)` of one track. `last` may be the sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fragment {
    pub track: usize,
    pub first: usize,
    pub last: usize,
}

/// One playlist entry: the keyframe ordinal it starts at and its length.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentBoundary {
    pub ordinal: u64,
    pub first: usize,
    pub last: usize,
    /// Seconds
    pub duration: f64,
}

fn seconds_between(trak: &Trak, from: usize, to: usize) -> f64 {
    let ticks = trak.samples[to].pts.saturating_sub(trak.samples[from].pts);
    ticks as f64 / trak.timescale().max(1) as f64
}

/// End of the fragment starting at keyframe `first`.
///
/// The first call stops at the first keyframe at least `length` seconds
/// away and records in `span` how many keyframes were stepped over; later
/// calls stop after the same number of keyframes.
fn fragment_end(trak: &Trak, first: usize, length: u32, span: &mut Option<usize>) -> usize {
    let last = trak.samples_size();
    if first == last {
        return first;
    }

    let mut next = first + 1;
    let mut stepped = 0usize;
    while next != last {
        if !trak.samples[next].is_keyframe {
            next += 1;
            continue;
        }
        let duration = seconds_between(trak, first, next) + 0.0005;
        match *span {
            None if duration >= length as f64 => break,
            Some(n) if n == stepped => break,
            _ => {}
        }
        next += 1;
        stepped += 1;
    }
    if span.is_none() {
        *span = Some(stepped);
    }
    next
}

/// Pick the fragment starting at keyframe ordinal `options.fragment_start`
/// in each video track and in the selected audio track.
pub fn select_fragments(
    moov: &Moov,
    options: &SplitOptions,
    length: u32,
) -> HlsResult<Vec<Fragment>> {
    let audio = options.audio_track();
    let ordinal = options.fragment_start;
    let mut fragments: Vec<Fragment> = Vec::with_capacity(MAX_FRAGMENT_STREAMS);
    let mut audio_tracks = 0usize;
    let mut span = None;

    for (index, trak) in moov.traks.iter().enumerate() {
        if trak.is_audio() && index != audio {
            continue;
        }
        let Some(first) = trak.keyframes(false).nth(ordinal as usize) else {
            continue;
        };
        if trak.is_audio() {
            audio_tracks += 1;
        }
        if fragments.len() < MAX_FRAGMENT_STREAMS {
            let last = fragment_end(trak, first, length, &mut span);
            debug!(
                "trak {}: fragment {} covers samples [{}, {})",
                trak.tkhd.track_id, ordinal, first, last
            );
            fragments.push(Fragment {
                track: index,
                first,
                last,
            });
        }
    }

    if fragments.is_empty() {
        return Err(SegmentError::new(format!("no fragment {} in any track", ordinal)).into());
    }
    fragments.truncate((1 + audio_tracks).min(MAX_FRAGMENT_STREAMS));
    Ok(fragments)
}

/// Walk the keyframes of `trak`, sentinel included, cutting a segment
/// whenever `length` seconds have accumulated and at the end of the track.
pub fn segment_boundaries(trak: &Trak, length: u32) -> Vec<SegmentBoundary> {
    let mut segments = Vec::new();
    let end = trak.samples.len();
    let mut prev = 0usize;
    let mut prev_ordinal = 0u64;

    for (ordinal, cur) in trak.keyframes(true).enumerate() {
        if cur == prev {
            continue;
        }
        let duration = seconds_between(trak, prev, cur);
        if duration + 0.0005 >= length as f64 || cur + 1 == end {
            segments.push(SegmentBoundary {
                ordinal: prev_ordinal,
                first: prev,
                last: cur,
                duration,
            });
            prev = cur;
            prev_ordinal = ordinal as u64;
        }
    }
    segments
}
