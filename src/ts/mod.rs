/*
# Transport Stream Module

 MPEG-2 transport stream writer for HLS segments: PSI tables, PES
 packetization with PCR and stuffing, ADTS framing for AAC and Annex-B
 framing for H.264.
*/

pub mod adts;
pub mod crc;
pub mod muxer;
pub mod pes;
pub mod psi;

pub use muxer::{output_fragments, output_range, output_ts, TsMuxer};

/// Size of every transport stream packet
pub const TS_PACKET_SIZE: usize = 188;
/// Payload bytes of a packet without adaptation field
pub const TS_PAYLOAD_SIZE: usize = 184;
/// PID of the first elementary stream, the next ones follow
pub const START_PID: u16 = 0x0064;
pub const PMT_PID: u16 = 0x1000;
/// PCR PID announced until a video stream claims it
pub const NULL_PID: u16 = 0x1fff;
pub const SERVICE_ID: u16 = 0x0001;
pub const TRANSPORT_STREAM_ID: u16 = 0x0001;

pub const STREAM_TYPE_AUDIO_AAC: u8 = 0x0f;
pub const STREAM_TYPE_VIDEO_H264: u8 = 0x1b;
