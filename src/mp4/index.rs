use super::moov::Moov;
use super::trak::Trak;
use crate::errors::{HlsResult, ResourceError};
use crate::segment::time::trak_time_to_moov_time;

/// Indexing refuses tracks with more samples than this.
pub const MAX_INDEX_SAMPLES: usize = 1 << 26;

/// One entry of the flat per-track sample index.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Sample {
    /// Decode timestamp in the track timescale
    pub pts: u64,
    pub size: u32,
    /// Absolute file offset
    pub pos: u64,
    /// Composition offset
    pub cto: u32,
    pub is_keyframe: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Chunk {
    /// Index of the first sample in the chunk
    pub sample: usize,
    /// Number of samples in the chunk
    pub size: u32,
    pub pos: u64,
    /// Sample description index
    pub id: u32,
}

impl Trak {
    /// Derive `chunks` and `samples` from the sample tables.
    ///
    /// A track without usable chunk tables is indexed as empty: only the
    /// sentinel, which is a keyframe.
    pub fn build_index(&mut self) -> HlsResult<()> {
        let track_id = self.tkhd.track_id;
        let stbl = &self.mdia.minf.stbl;
        let (stco, stsc, stsz) = match (&stbl.stco, &stbl.stsc, &stbl.stsz) {
            (Some(stco), Some(stsc), Some(stsz)) if !stco.chunk_offsets.is_empty() => {
                (stco, stsc, stsz)
            }
            _ => {
                log::warn!("trak {}: no chunk tables, indexed as empty", track_id);
                self.chunks.clear();
                self.samples = vec![Sample {
                    is_keyframe: true,
                    ..Default::default()
                }];
                return Ok(());
            }
        };

        let mut chunks: Vec<Chunk> = stco
            .chunk_offsets
            .iter()
            .map(|&pos| Chunk {
                pos,
                ..Default::default()
            })
            .collect();

        // each stsc run covers its first chunk up to the next run's first chunk
        let mut last = chunks.len();
        for entry in stsc.entries.iter().rev() {
            let first = (entry.chunk as usize).min(last);
            for chunk in &mut chunks[first..last] {
                chunk.id = entry.id;
                chunk.size = entry.samples;
            }
            last = first;
        }

        let mut stco_samples = 0usize;
        for chunk in chunks.iter_mut() {
            chunk.sample = stco_samples;
            stco_samples = stco_samples.saturating_add(chunk.size as usize);
        }

        let samples_size = if stsz.sample_size == 0 {
            stsz.entries as usize
        } else {
            stco_samples
        };
        if samples_size > MAX_INDEX_SAMPLES {
            return Err(ResourceError::new(format!(
                "trak {}: {} samples exceeds the index limit of {}",
                track_id, samples_size, MAX_INDEX_SAMPLES
            ))
            .into());
        }

        // one extra entry for the end pts, cto and pos
        let mut samples = vec![Sample::default(); samples_size + 1];
        if stsz.sample_size == 0 {
            for (sample, &size) in samples.iter_mut().zip(stsz.sample_sizes.iter()) {
                sample.size = size;
            }
        } else {
            for sample in samples[..samples_size].iter_mut() {
                sample.size = stsz.sample_size;
            }
        }

        // pts
        let mut s = 0usize;
        let mut pts = 0u64;
        for entry in &stbl.stts.entries {
            let take = (entry.sample_count as usize).min(samples_size - s);
            for sample in samples[s..s + take].iter_mut() {
                sample.pts = pts;
                pts = pts
                    .checked_add(entry.sample_duration as u64)
                    .ok_or_else(|| overflow(track_id, "stts"))?;
            }
            s += take;
            let skipped = (entry.sample_count as u64 - take as u64) * entry.sample_duration as u64;
            pts = pts
                .checked_add(skipped)
                .ok_or_else(|| overflow(track_id, "stts"))?;
        }
        for sample in samples[s..].iter_mut() {
            sample.pts = pts;
        }

        // composition offsets
        if let Some(ctts) = &stbl.ctts {
            let mut s = 0usize;
            let mut sample_offset = 0u32;
            for entry in &ctts.entries {
                sample_offset = entry.sample_offset;
                let take = (entry.sample_count as usize).min(samples_size - s);
                for sample in samples[s..s + take].iter_mut() {
                    sample.cto = sample_offset;
                }
                s += take;
            }
            if ctts.sample_count() > samples_size as u64 {
                log::warn!(
                    "trak {}: ctts describes {} samples, should be {}",
                    track_id,
                    ctts.sample_count(),
                    samples_size
                );
            }
            samples[samples_size].cto = sample_offset;
        }

        // file offsets
        let mut s = 0usize;
        let mut pos = 0u64;
        'chunks: for chunk in &chunks {
            pos = chunk.pos;
            for _ in 0..chunk.size {
                if s == samples_size {
                    log::warn!(
                        "trak {}: stco describes {} samples, should be {}",
                        track_id,
                        stco_samples,
                        samples_size
                    );
                    break 'chunks;
                }
                samples[s].pos = pos;
                pos = pos
                    .checked_add(samples[s].size as u64)
                    .ok_or_else(|| overflow(track_id, "stco"))?;
                s += 1;
            }
        }
        samples[s].pos = pos;

        if let Some(stss) = &stbl.stss {
            for &number in &stss.sample_numbers {
                match (number as usize).checked_sub(1) {
                    Some(i) if i < samples_size => samples[i].is_keyframe = true,
                    _ => log::warn!(
                        "trak {}: sync sample {} outside 1..={}",
                        track_id,
                        number,
                        samples_size
                    ),
                }
            }
        }
        samples[samples_size].is_keyframe = true;

        log::debug!(
            "trak {}: indexed {} samples in {} chunks",
            track_id,
            samples_size,
            chunks.len()
        );
        self.chunks = chunks;
        self.samples = samples;
        Ok(())
    }
}

fn overflow(track_id: u32, table: &str) -> ResourceError {
    ResourceError::new(format!("trak {}: {} offsets overflow 64 bits", track_id, table))
}

impl Moov {
    /// Index every track once. Audio tracks without sync samples borrow the
    /// video track's keyframes unless the movie is fragmented.
    pub fn build_index(&mut self) -> HlsResult<()> {
        if self.is_indexed {
            return Ok(());
        }

        let mut video = None;
        for (i, trak) in self.traks.iter_mut().enumerate() {
            if trak.is_video() {
                video = Some(i);
            }
            trak.build_index()?;
        }

        if self.mvex.is_none() {
            for i in 0..self.traks.len() {
                if self.traks[i].is_audio() && self.traks[i].stbl().stss.is_none() {
                    self.copy_sync_samples_to_audio_track(video, i);
                }
            }
        }

        self.is_indexed = true;
        Ok(())
    }

    fn copy_sync_samples_to_audio_track(&mut self, video: Option<usize>, audio: usize) {
        let audio_scale = self.traks[audio].timescale();
        match video {
            Some(video) => {
                let video_trak = &self.traks[video];
                let video_scale = video_trak.timescale();
                let keyframe_pts: Vec<u64> = video_trak
                    .keyframes(false)
                    .map(|i| {
                        trak_time_to_moov_time(video_trak.samples[i].pts, audio_scale, video_scale)
                    })
                    .collect();

                let audio_trak = &mut self.traks[audio];
                let end = audio_trak.samples_size();
                let mut cursor = 0usize;
                for pts in keyframe_pts {
                    while cursor != end {
                        let sample = &mut audio_trak.samples[cursor];
                        if sample.pts >= pts {
                            sample.is_keyframe = true;
                            break;
                        }
                        cursor += 1;
                    }
                }
            }
            None => {
                let audio_trak = &mut self.traks[audio];
                let end = audio_trak.samples_size();
                let increment = 2 * audio_scale as u64;
                let mut pts = 0u64;
                for sample in audio_trak.samples[..end].iter_mut() {
                    if sample.pts >= pts {
                        sample.is_keyframe = true;
                        pts += increment;
                    }
                }
            }
        }
    }
}
