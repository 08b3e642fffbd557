use super::{TS_PACKET_SIZE, TS_PAYLOAD_SIZE};

/// Offset added to every timestamp so the first PCR does not underflow
pub const MAX_DELAY: u64 = 90_000;

pub const STREAM_ID_VIDEO: u8 = 0xe0;
pub const STREAM_ID_AUDIO: u8 = 0xc0;

/// Per elementary stream packetizer state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PesStream {
    pub pid: u16,
    pub stream_id: u8,
    pub cc: u8,
    /// Transport packets written so far
    pub packets: u64,
}

impl PesStream {
    pub fn new(pid: u16, is_video: bool) -> Self {
        PesStream {
            pid,
            stream_id: if is_video {
                STREAM_ID_VIDEO
            } else {
                STREAM_ID_AUDIO
            },
            cc: 0,
            packets: 0,
        }
    }

    pub fn is_video(&self) -> bool {
        self.stream_id == STREAM_ID_VIDEO
    }
}

/// Write a 33 bit timestamp with its 4 bit prefix and marker bits.
pub fn write_pts(out: &mut Vec<u8>, prefix: u8, ts: u64) {
    out.push((prefix << 4) | ((((ts >> 30) & 0x07) as u8) << 1) | 1);
    out.extend_from_slice(&((((ts >> 15) & 0x7fff) << 1 | 1) as u16).to_be_bytes());
    out.extend_from_slice(&((((ts & 0x7fff) << 1) | 1) as u16).to_be_bytes());
}

/// Number of transport packets [`write_pes`] emits for a payload.
pub fn packetized_packets(
    stream: &PesStream,
    pcr_pid: u16,
    dts: Option<u64>,
    pts: Option<u64>,
    payload_size: usize,
) -> usize {
    let mut once = 0;
    if stream.pid == pcr_pid {
        once += 8;
    } else if stream.packets == 0 {
        once += 2;
    }
    // start code and stream id
    once += 4;
    if let Some(pts) = pts {
        once += 5;
        if dts.is_some_and(|dts| dts != pts) {
            once += 5;
        }
    }
    // length, marker, flags, header length
    once += 5;

    let first = TS_PAYLOAD_SIZE - once;
    if payload_size <= first {
        1
    } else {
        1 + (payload_size - first).div_ceil(TS_PAYLOAD_SIZE)
    }
}

/// Packetize one PES payload into `out`. Timestamps are expected in 90 kHz
/// with the muxer delay already applied.
pub fn write_pes(
    out: &mut Vec<u8>,
    stream: &mut PesStream,
    pcr_pid: u16,
    dts: Option<u64>,
    pts: Option<u64>,
    payload: &[u8],
) {
    let mut discontinuity = stream.packets == 0;
    let mut is_start = true;
    let mut remaining = payload;
    out.reserve(packetized_packets(stream, pcr_pid, dts, pts, payload.len()) * TS_PACKET_SIZE);

    while !remaining.is_empty() {
        let write_pcr = is_start && stream.pid == pcr_pid;
        let mut buf: Vec<u8> = Vec::with_capacity(TS_PACKET_SIZE);

        buf.push(0x47);
        buf.push((stream.pid >> 8) as u8 | if is_start { 0x40 } else { 0 });
        buf.push(stream.pid as u8);
        buf.push(0x10 | stream.cc | if write_pcr || discontinuity { 0x20 } else { 0 });
        stream.cc = (stream.cc + 1) & 0x0f;

        if write_pcr {
            let pcr = dts.unwrap_or(0).wrapping_sub(MAX_DELAY).wrapping_add(1);
            buf.push(7);
            buf.push(0x10);
            buf.push((pcr >> 25) as u8);
            buf.push((pcr >> 17) as u8);
            buf.push((pcr >> 9) as u8);
            buf.push((pcr >> 1) as u8);
            buf.push(((pcr & 1) << 7) as u8);
            buf.push(0);
        } else if discontinuity {
            buf.push(1);
            buf.push(0x80);
            discontinuity = false;
        }

        if discontinuity {
            buf[5] |= 0x80;
            discontinuity = false;
        }
        // random access
        if stream.packets == 0 {
            buf[5] |= 0x40;
        }

        if is_start {
            buf.extend_from_slice(&[0x00, 0x00, 0x01, stream.stream_id]);

            let mut header_len = 0u8;
            let mut flags = 0u8;
            if let Some(pts) = pts {
                header_len += 5;
                flags |= 0x80;
                if dts.is_some_and(|dts| dts != pts) {
                    header_len += 5;
                    flags |= 0x40;
                }
            }

            let len = payload.len() + header_len as usize + 3;
            let len = if len > 0xffff { 0 } else { len as u16 };
            buf.extend_from_slice(&len.to_be_bytes());
            buf.extend_from_slice(&[0x80, flags, header_len]);

            if let Some(pts) = pts {
                write_pts(&mut buf, flags >> 6, pts);
            }
            if flags & 0x40 != 0 {
                write_pts(&mut buf, 1, dts.unwrap_or(0));
            }
            is_start = false;
        }

        let header_len = buf.len();
        let len = (TS_PACKET_SIZE - header_len).min(remaining.len());
        let stuffing = TS_PACKET_SIZE - header_len - len;
        if stuffing > 0 {
            add_stuffing(&mut buf, stuffing);
        }

        buf.extend_from_slice(&remaining[..len]);
        remaining = &remaining[len..];
        stream.packets += 1;

        out.extend_from_slice(&buf);
    }
}

/// Grow or insert the adaptation field so the packet payload ends exactly
/// at the packet boundary.
fn add_stuffing(buf: &mut Vec<u8>, stuffing: usize) {
    if buf[3] & 0x20 != 0 {
        let afc_end = 4 + buf[4] as usize + 1;
        buf.splice(afc_end..afc_end, std::iter::repeat(0xff).take(stuffing));
        buf[4] += stuffing as u8;
    } else {
        buf[3] |= 0x20;
        let mut field = vec![(stuffing - 1) as u8];
        if stuffing >= 2 {
            field.push(0x00);
            field.resize(stuffing, 0xff);
        }
        buf.splice(4..4, field);
    }
}
