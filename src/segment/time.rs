/*
# Timescale conversions

 Times travel between three clocks: the movie timescale (mvhd), each track's
 media timescale (mdhd) and the 90 kHz transport stream clock.
*/

use crate::mp4::stts::Stts;

/// MPEG-TS system clock
pub const TS_TIMESCALE: u32 = 90_000;

fn rescale(t: u64, to: u32, from: u32) -> u64 {
    if from == 0 {
        return 0;
    }
    (t as u128 * to as u128 / from as u128).min(u64::MAX as u128) as u64
}

pub fn moov_time_to_trak_time(t: u64, moov_timescale: u32, trak_timescale: u32) -> u64 {
    rescale(t, trak_timescale, moov_timescale)
}

pub fn trak_time_to_moov_time(t: u64, moov_timescale: u32, trak_timescale: u32) -> u64 {
    rescale(t, moov_timescale, trak_timescale)
}

/// Track time to the 90 kHz clock.
pub fn to_90khz(t: u64, trak_timescale: u32) -> u64 {
    rescale(t, TS_TIMESCALE, trak_timescale)
}

/// Seconds to movie time, rounded to the nearest tick.
pub fn seconds_to_moov_time(seconds: f32, moov_timescale: u32) -> u64 {
    if seconds <= 0.0 {
        return 0;
    }
    (seconds as f64 * moov_timescale as f64 + 0.5) as u64
}

/// First sample whose cumulative decode time reaches `time`.
pub fn stts_get_sample(stts: &Stts, time: u64) -> u64 {
    let mut sample = 0u64;
    let mut elapsed = 0u64;
    for entry in &stts.entries {
        let count = entry.sample_count as u64;
        let duration = entry.sample_duration as u64;
        if duration == 0 {
            sample = sample.saturating_add(count);
            continue;
        }
        let run = duration * count;
        if elapsed.saturating_add(run) >= time {
            return sample + (time - elapsed).div_ceil(duration);
        }
        elapsed += run;
        sample += count;
    }
    sample
}

/// Decode time of `sample`, the total duration when past the last sample.
pub fn stts_get_time(stts: &Stts, sample: u64) -> u64 {
    let mut time = 0u64;
    let mut remaining = sample;
    for entry in &stts.entries {
        let count = entry.sample_count as u64;
        let duration = entry.sample_duration as u64;
        if remaining < count {
            return time.saturating_add(remaining * duration);
        }
        time = time.saturating_add(count * duration);
        remaining -= count;
    }
    time
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mp4::stts::SttsEntry;

    fn stts(entries: &[(u32, u32)]) -> Stts {
        Stts {
            entries: entries
                .iter()
                .map(|&(sample_count, sample_duration)| SttsEntry {
                    sample_count,
                    sample_duration,
                })
                .collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_rescale() {
        assert_eq!(moov_time_to_trak_time(600, 600, 90000), 90000);
        assert_eq!(trak_time_to_moov_time(48000, 1000, 48000), 1000);
        assert_eq!(to_90khz(1024, 44100), 2089);
        assert_eq!(to_90khz(5, 0), 0);
        assert_eq!(seconds_to_moov_time(1.5, 1000), 1500);
        assert_eq!(seconds_to_moov_time(0.0, 1000), 0);
    }

    #[test]
    fn test_stts_get_sample() {
        let t = stts(&[(10, 100), (5, 50)]);
        assert_eq!(stts_get_sample(&t, 0), 0);
        assert_eq!(stts_get_sample(&t, 100), 1);
        assert_eq!(stts_get_sample(&t, 101), 2);
        assert_eq!(stts_get_sample(&t, 1000), 10);
        assert_eq!(stts_get_sample(&t, 1010), 11);
        assert_eq!(stts_get_sample(&t, 5000), 15);
    }

    #[test]
    fn test_stts_get_time() {
        let t = stts(&[(10, 100), (5, 50)]);
        assert_eq!(stts_get_time(&t, 0), 0);
        assert_eq!(stts_get_time(&t, 3), 300);
        assert_eq!(stts_get_time(&t, 12), 1100);
        assert_eq!(stts_get_time(&t, 99), 1250);
    }

    #[test]
    fn test_huge_tables_saturate() {
        let t = stts(&[(u32::MAX, u32::MAX), (u32::MAX, u32::MAX), (1, 1)]);
        assert_eq!(stts_get_time(&t, 3 * u32::MAX as u64), u64::MAX);
        assert_eq!(stts_get_sample(&t, u64::MAX), u32::MAX as u64 + 2);
        assert_eq!(t.total_duration(), u64::MAX);
    }

    #[test]
    fn test_zero_duration_run_is_skipped() {
        let t = stts(&[(2, 0), (4, 10)]);
        assert_eq!(stts_get_sample(&t, 15), 4);
        assert_eq!(stts_get_time(&t, 4), 20);
    }
}
