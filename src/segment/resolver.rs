use super::time::{
    moov_time_to_trak_time, seconds_to_moov_time, stts_get_sample, stts_get_time,
    trak_time_to_moov_time,
};
use crate::errors::{HlsResult, SegmentError};
use crate::hls::options::SplitOptions;
use crate::mp4::moov::Moov;
use crate::mp4::stbl::Stbl;
use crate::mp4::trak::Trak;
use log::debug;
use std::ops::Range;

/// Keyframe-aligned boundaries of a request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AlignedRange {
    /// Aligned start in movie time
    pub start: u64,
    /// Aligned end in movie time, 0 when open
    pub end: u64,
    /// Sample range selected in each track, by track index
    pub samples: Vec<Range<usize>>,
}

/// Sync sample at or before the 1-based `sample`. Without an stss every
/// sample is a sync sample.
pub fn nearest_keyframe(stbl: &Stbl, sample: u64) -> u64 {
    let numbers = match &stbl.stss {
        Some(stss) if !stss.sample_numbers.is_empty() => &stss.sample_numbers,
        _ => return sample,
    };
    match numbers.iter().position(|&n| n as u64 >= sample) {
        Some(i) if numbers[i] as u64 == sample => sample,
        Some(0) => numbers[0] as u64,
        Some(i) => numbers[i - 1] as u64,
        None => numbers[numbers.len() - 1] as u64,
    }
}

/// One track snapped onto its keyframes: the sample range and the movie
/// time boundaries it settled on.
fn align_track(trak: &Trak, moov_scale: u32, start: u64, end: u64) -> (Range<usize>, u64, u64) {
    let stbl = trak.stbl();
    let trak_scale = trak.timescale();
    let samples_size = trak.samples_size() as u64;

    let (first, aligned_start) = if start == 0 {
        (0, 0)
    } else {
        let s = stts_get_sample(&stbl.stts, moov_time_to_trak_time(start, moov_scale, trak_scale));
        let s = nearest_keyframe(stbl, s + 1).saturating_sub(1);
        let t = trak_time_to_moov_time(stts_get_time(&stbl.stts, s), moov_scale, trak_scale);
        (s, t)
    };

    let (last, aligned_end) = if end == 0 {
        (samples_size, 0)
    } else {
        let mut e = stts_get_sample(&stbl.stts, moov_time_to_trak_time(end, moov_scale, trak_scale));
        if e >= samples_size {
            e = samples_size;
        } else {
            e = nearest_keyframe(stbl, e + 1).saturating_sub(1);
        }
        let t = trak_time_to_moov_time(stts_get_time(&stbl.stts, e), moov_scale, trak_scale);
        (e, t)
    };

    debug!(
        "trak {}: samples [{}, {}) start={} end={} (moov time)",
        trak.tkhd.track_id, first, last, aligned_start, aligned_end
    );
    let range = first.min(samples_size) as usize..last.min(samples_size) as usize;
    (range, aligned_start, aligned_end)
}

/// Snap `start` and `end` (movie time, 0 meaning open) onto keyframes.
///
/// Tracks with sync samples are aligned first against the request. The
/// boundary the first of them settles on is then used for every track
/// without sync samples, so audio cuts where video does. Without such a
/// track the first remaining track sets the boundary.
pub fn get_aligned_start_and_end(moov: &Moov, start: u64, end: u64) -> HlsResult<AlignedRange> {
    let moov_scale = moov.timescale();
    let mut samples = vec![0..0; moov.traks.len()];

    let mut boundary: Option<(u64, u64)> = None;
    for (i, trak) in moov.traks.iter().enumerate() {
        if trak.stbl().stss.is_none() {
            continue;
        }
        let (range, s, e) = align_track(trak, moov_scale, start, end);
        samples[i] = range;
        boundary.get_or_insert((s, e));
    }

    let (pass_start, pass_end) = boundary.unwrap_or((start, end));
    for (i, trak) in moov.traks.iter().enumerate() {
        if trak.stbl().stss.is_some() {
            continue;
        }
        let (range, s, e) = align_track(trak, moov_scale, pass_start, pass_end);
        samples[i] = range;
        boundary.get_or_insert((s, e));
    }

    let (start, end) = boundary.unwrap_or((start, end));
    if end != 0 && start >= end {
        return Err(SegmentError::new(format!(
            "aligned start {} is not before aligned end {}",
            start, end
        ))
        .into());
    }

    Ok(AlignedRange {
        start,
        end,
        samples,
    })
}

/// Index the movie and resolve the time range of `options`.
pub fn split(moov: &mut Moov, options: &SplitOptions) -> HlsResult<AlignedRange> {
    moov.build_index()?;
    let scale = moov.timescale();
    let start = seconds_to_moov_time(options.start, scale);
    let end = seconds_to_moov_time(options.end, scale);
    get_aligned_start_and_end(moov, start, end)
}
