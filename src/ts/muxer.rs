use super::adts::adts_header;
use super::pes::{write_pes, PesStream, MAX_DELAY};
use super::psi::{write_pat, write_pmt, PmtEntry};
use super::{NULL_PID, START_PID, STREAM_TYPE_AUDIO_AAC, STREAM_TYPE_VIDEO_H264};
use crate::avc::{convert_to_annexb, nalu_types, ACCESS_UNIT_DELIMITER, START_CODE};
use crate::errors::{HlsResult, ResourceError, SegmentError, StreamError};
use crate::hls::config::HlsConfig;
use crate::hls::options::SplitOptions;
use crate::mp4::context::Mp4Context;
use crate::mp4::moov::Moov;
use crate::mp4::stsd::{AudioSampleEntry, VideoSampleEntry};
use crate::segment::time::to_90khz;
use crate::segment::{select_fragments, split, Fragment, MAX_FRAGMENT_STREAMS};
use crate::streams::{SeekableStream, WindowReader};
use log::{debug, info, warn};

/// Largest audio PES payload: 31 full packets plus the first one
pub const MAX_PES_PAYLOAD_SIZE: usize = 31 * 184 + 170;
/// Audio is flushed once the buffered data spans 500 ms
pub const AUDIO_DELTA: u64 = 45_000;
/// PAT and PMT are repeated every 60 s
pub const PAT_DELTA: u64 = 5_400_000;

pub const AUDIO_FRAGMENT_LIMIT: u64 = 10 * 1024 * 1024;
pub const VIDEO_FRAGMENT_LIMIT: u64 = 50 * 1024 * 1024;

/// Samples whose access unit (delimiter included) is smaller than this are dropped.
const MIN_VIDEO_PACKET_SIZE: usize = 50;

#[derive(Debug, Clone)]
enum StreamEntry {
    Video(VideoSampleEntry),
    Audio(AudioSampleEntry),
}

#[derive(Debug, Clone)]
struct MuxStream {
    pes: PesStream,
    entry: StreamEntry,
    /// Pending audio PES payload
    payload: Vec<u8>,
    payload_dts: Option<u64>,
    payload_pts: Option<u64>,
}

/// Transport stream writer for up to [`MAX_FRAGMENT_STREAMS`] elementary
/// streams. Timestamps passed in are 90 kHz.
#[derive(Debug)]
pub struct TsMuxer {
    streams: Vec<MuxStream>,
    pcr_pid: u16,
    pat_cc: u8,
    pmt_cc: u8,
    next_pat: Option<u64>,
    out: Vec<u8>,
}

impl TsMuxer {
    /// One stream per fragment, PIDs assigned from [`START_PID`] in order.
    pub fn new(moov: &Moov, fragments: &[Fragment]) -> HlsResult<Self> {
        let mut streams = Vec::with_capacity(fragments.len());
        for (i, fragment) in fragments.iter().enumerate() {
            let trak = moov.traks.get(fragment.track).ok_or_else(|| {
                SegmentError::new(format!("fragment refers to missing track {}", fragment.track))
            })?;
            let stsd = &trak.stbl().stsd;
            let entry = if trak.is_video() {
                StreamEntry::Video(stsd.first_video().cloned().unwrap_or_default())
            } else {
                StreamEntry::Audio(stsd.first_audio().cloned().unwrap_or_default())
            };
            let pid = START_PID + i as u16;
            streams.push(MuxStream {
                pes: PesStream::new(pid, trak.is_video()),
                entry,
                payload: Vec::with_capacity(MAX_PES_PAYLOAD_SIZE),
                payload_dts: None,
                payload_pts: None,
            });
        }

        let mut muxer = TsMuxer {
            streams,
            pcr_pid: NULL_PID,
            pat_cc: 0,
            pmt_cc: 0,
            next_pat: None,
            out: Vec::new(),
        };
        muxer.write_header();
        Ok(muxer)
    }

    /// The first video stream carries the PCR.
    fn write_header(&mut self) {
        if let Some(stream) = self.streams.iter().find(|s| s.pes.is_video()) {
            self.pcr_pid = stream.pes.pid;
        }
    }

    pub fn pcr_pid(&self) -> u16 {
        self.pcr_pid
    }

    pub fn is_audio(&self, stream: usize) -> bool {
        matches!(self.streams[stream].entry, StreamEntry::Audio(_))
    }

    fn pmt_entries(&self) -> Vec<PmtEntry> {
        self.streams
            .iter()
            .map(|s| PmtEntry {
                stream_type: if s.pes.is_video() {
                    STREAM_TYPE_VIDEO_H264
                } else {
                    STREAM_TYPE_AUDIO_AAC
                },
                pid: s.pes.pid,
            })
            .collect()
    }

    /// Packetize one PES, announcing PAT and PMT first when they are due.
    fn write_packet(&mut self, stream: usize, dts: Option<u64>, pts: Option<u64>, payload: &[u8]) {
        let dts = dts.map(|t| t.saturating_add(MAX_DELAY));
        let pts = pts.map(|t| t.saturating_add(MAX_DELAY));

        let due = match (self.next_pat, dts) {
            (None, _) => true,
            (Some(next), Some(dts)) => dts >= next,
            (Some(_), None) => false,
        };
        if due {
            write_pat(&mut self.out, self.pat_cc);
            self.pat_cc = (self.pat_cc + 1) & 0x0f;
            let entries = self.pmt_entries();
            write_pmt(&mut self.out, self.pmt_cc, self.pcr_pid, &entries);
            self.pmt_cc = (self.pmt_cc + 1) & 0x0f;
            self.next_pat = match dts {
                Some(dts) => Some(dts.saturating_add(PAT_DELTA)),
                // untimed: announce again with the first timed packet only
                None => self.next_pat.or(Some(0)),
            };
        }

        write_pes(
            &mut self.out,
            &mut self.streams[stream].pes,
            self.pcr_pid,
            dts,
            pts,
            payload,
        );
    }

    /// Write out whatever audio is buffered for `stream`.
    pub fn flush_audio(&mut self, stream: usize) {
        let s = &mut self.streams[stream];
        if s.payload.is_empty() {
            return;
        }
        let payload = std::mem::take(&mut s.payload);
        let (dts, pts) = (s.payload_dts.take(), s.payload_pts.take());
        self.write_packet(stream, dts, pts, &payload);

        let s = &mut self.streams[stream];
        s.payload = payload;
        s.payload.clear();
    }

    fn write_audio_bytes(&mut self, stream: usize, dts: Option<u64>, mut data: &[u8]) {
        while !data.is_empty() {
            let s = &mut self.streams[stream];
            let n = (MAX_PES_PAYLOAD_SIZE - s.payload.len()).min(data.len());
            s.payload.extend_from_slice(&data[..n]);
            data = &data[n..];

            let full = s.payload.len() == MAX_PES_PAYLOAD_SIZE;
            let stale = match (s.payload_dts, dts) {
                (Some(first), Some(dts)) => dts.saturating_sub(first) >= AUDIO_DELTA,
                _ => false,
            };
            if full || stale {
                self.flush_audio(stream);
            }
        }
    }

    /// Buffer one AAC frame behind its ADTS header. `last` flushes the
    /// buffer after the frame.
    pub fn write_audio_sample(&mut self, stream: usize, dts: u64, pts: u64, data: &[u8], last: bool) {
        let header = match &self.streams[stream].entry {
            StreamEntry::Audio(entry) => adts_header(entry, data.len()),
            StreamEntry::Video(_) => return,
        };
        let s = &mut self.streams[stream];
        if s.payload_dts.is_none() {
            s.payload_dts = Some(dts);
            s.payload_pts = Some(pts);
        }

        self.write_audio_bytes(stream, None, &header);
        self.write_audio_bytes(stream, Some(dts), data);
        if last {
            self.flush_audio(stream);
        }
    }

    /// Write one H.264 access unit as a PES of its own. The first one of a
    /// stream is preceded by the parameter sets.
    pub fn write_video_sample(&mut self, stream: usize, dts: u64, pts: u64, data: &[u8]) {
        let s = &self.streams[stream];
        let StreamEntry::Video(entry) = &s.entry else {
            return;
        };
        if data.len() + ACCESS_UNIT_DELIMITER.len() < MIN_VIDEO_PACKET_SIZE {
            debug!("pid {}: skipping {} byte video sample", s.pes.pid, data.len());
            return;
        }

        let mut buf = Vec::with_capacity(data.len() + 64);
        buf.extend_from_slice(&ACCESS_UNIT_DELIMITER);
        if s.pes.packets == 0 {
            for parameter_set in [entry.sps(), entry.pps()].into_iter().flatten() {
                buf.extend_from_slice(&START_CODE);
                buf.extend_from_slice(parameter_set);
            }
        }
        if let Err(e) = convert_to_annexb(data, entry.nal_unit_length(), &mut buf) {
            warn!("pid {}: dropping video sample at dts {}: {}", s.pes.pid, dts, e);
            return;
        }
        if log::log_enabled!(log::Level::Trace) {
            let types: Vec<String> = nalu_types(data, entry.nal_unit_length())
                .iter()
                .map(|t| t.to_string())
                .collect();
            log::trace!("pid {}: dts {} pts {} nalus {}", s.pes.pid, dts, pts, types.join(","));
        }

        self.write_packet(stream, Some(dts), Some(pts), &buf);
    }

    /// Finished transport stream.
    pub fn into_bytes(self) -> Vec<u8> {
        self.out
    }
}

/// Mux `fragments` of `moov` into one transport stream, reading the sample
/// data through `reader` in a single window.
pub fn output_fragments<S: SeekableStream>(
    reader: &mut WindowReader<S>,
    moov: &Moov,
    fragments: &[Fragment],
) -> HlsResult<Vec<u8>> {
    let mut offset = u64::MAX;
    let mut window_end = 0u64;
    for (i, fragment) in fragments.iter().enumerate() {
        let trak = moov.traks.get(fragment.track).ok_or_else(|| {
            SegmentError::new(format!("fragment refers to missing track {}", fragment.track))
        })?;
        if fragment.first > fragment.last || fragment.last >= trak.samples.len() {
            return Err(SegmentError::new(format!(
                "fragment {} samples [{}, {}) outside track {}",
                i, fragment.first, fragment.last, trak.tkhd.track_id
            ))
            .into());
        }
        // stco need not be monotonic: bound the window by every sample
        let mut low = u64::MAX;
        let mut high = 0u64;
        for sample in &trak.samples[fragment.first..fragment.last] {
            let end = sample.pos.checked_add(sample.size as u64).ok_or_else(|| {
                StreamError::new(format!(
                    "sample at {} ({} bytes) ends past 64 bits",
                    sample.pos, sample.size
                ))
            })?;
            low = low.min(sample.pos);
            high = high.max(end);
        }
        let limit = if trak.is_video() {
            VIDEO_FRAGMENT_LIMIT
        } else {
            AUDIO_FRAGMENT_LIMIT
        };
        if high.saturating_sub(low) > limit {
            return Err(ResourceError::new(format!(
                "fragment {} is too big: {} - {}",
                i, low, high
            ))
            .into());
        }
        offset = offset.min(low);
        window_end = window_end.max(high);
    }
    if offset >= window_end {
        return Err(SegmentError::new("fragments contain no sample data").into());
    }

    let data = reader.read((window_end - offset) as usize, offset)?;
    let mut muxer = TsMuxer::new(moov, fragments)?;
    let mut cursors: Vec<usize> = fragments.iter().map(|f| f.first).collect();
    let mut order: Option<usize> = None;

    loop {
        let mut next: Option<(usize, u64)> = None;
        for (i, fragment) in fragments.iter().enumerate() {
            if cursors[i] == fragment.last {
                continue;
            }
            let trak = &moov.traks[fragment.track];
            let dts = to_90khz(trak.samples[cursors[i]].pts, trak.timescale());
            if next.map_or(true, |(_, min)| dts < min) {
                next = Some((i, dts));
            }
        }
        let Some((current, dts)) = next else {
            break;
        };

        if let Some(previous) = order {
            if previous != current && muxer.is_audio(previous) {
                muxer.flush_audio(previous);
            }
        }
        order = Some(current);

        let fragment = &fragments[current];
        let trak = &moov.traks[fragment.track];
        let sample = &trak.samples[cursors[current]];
        let pts = dts.saturating_add(to_90khz(sample.cto as u64, trak.timescale()));
        let start = (sample.pos - offset) as usize;
        let bytes = data.get(start..start.saturating_add(sample.size as usize)).ok_or_else(|| {
            StreamError::new(format!(
                "sample at {} ({} bytes) outside the read window",
                sample.pos, sample.size
            ))
        })?;

        if muxer.is_audio(current) {
            let last = cursors[current] + 1 == fragment.last;
            muxer.write_audio_sample(current, dts, pts, bytes, last);
        } else {
            muxer.write_video_sample(current, dts, pts, bytes);
        }
        cursors[current] += 1;
    }

    let out = muxer.into_bytes();
    info!(
        "muxed {} fragments into {} bytes ({} packets)",
        fragments.len(),
        out.len(),
        out.len() / super::TS_PACKET_SIZE
    );
    Ok(out)
}

/// Transport stream segment for the fragment ordinal in `options`.
pub fn output_ts<S: SeekableStream>(
    ctx: &mut Mp4Context<S>,
    options: &SplitOptions,
    config: &HlsConfig,
) -> HlsResult<Vec<u8>> {
    ctx.moov.build_index()?;
    let length = options.segment_length(config.length);
    let fragments = select_fragments(&ctx.moov, options, length)?;
    output_fragments(&mut ctx.reader, &ctx.moov, &fragments)
}

/// Transport stream for the keyframe-aligned time range in `options`,
/// covering the video tracks and the selected audio track.
pub fn output_range<S: SeekableStream>(
    ctx: &mut Mp4Context<S>,
    options: &SplitOptions,
) -> HlsResult<Vec<u8>> {
    let range = split(&mut ctx.moov, options)?;
    let audio = options.audio_track();

    let mut fragments: Vec<Fragment> = ctx
        .moov
        .traks
        .iter()
        .zip(range.samples.iter())
        .enumerate()
        .filter(|(i, (trak, samples))| {
            !samples.is_empty() && (trak.is_video() || (trak.is_audio() && *i == audio))
        })
        .map(|(track, (_, samples))| Fragment {
            track,
            first: samples.start,
            last: samples.end,
        })
        .collect();
    fragments.truncate(MAX_FRAGMENT_STREAMS);
    if fragments.is_empty() {
        return Err(SegmentError::new(format!(
            "no samples between {}s and {}s",
            options.start, options.end
        ))
        .into());
    }

    debug!("range {}..{} resolved to {:?}", range.start, range.end, fragments);
    output_fragments(&mut ctx.reader, &ctx.moov, &fragments)
}
