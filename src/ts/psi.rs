use super::crc::crc32_mpeg;
use super::{PMT_PID, SERVICE_ID, TRANSPORT_STREAM_ID, TS_PACKET_SIZE};

const PAT_PID: u16 = 0x0000;
const PAT_TABLE_ID: u8 = 0x00;
const PMT_TABLE_ID: u8 = 0x02;

/// An elementary stream announced in the PMT.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PmtEntry {
    pub stream_type: u8,
    pub pid: u16,
}

/// Header of a PSI packet: payload start, an empty adaptation field carrying
/// the discontinuity flag, and the pointer field.
fn psi_header(packet: &mut Vec<u8>, pid: u16, cc: u8) {
    packet.push(0x47);
    packet.extend_from_slice(&(0x4000 | pid).to_be_bytes());
    packet.push(0x30 | (cc & 0x0f));
    packet.push(0x01);
    packet.push(0x80);
    packet.push(0x00);
}

fn finish_section(packet: &mut Vec<u8>, section_start: usize) {
    let crc = crc32_mpeg(&packet[section_start..]);
    packet.extend_from_slice(&crc.to_be_bytes());
    packet.resize(TS_PACKET_SIZE, 0xff);
}

/// Program association table pointing service 1 at the PMT.
pub fn write_pat(out: &mut Vec<u8>, cc: u8) {
    let mut packet = Vec::with_capacity(TS_PACKET_SIZE);
    psi_header(&mut packet, PAT_PID, cc);

    let section_start = packet.len();
    packet.push(PAT_TABLE_ID);
    // 5 byte header + one 4 byte program entry + 4 byte CRC
    packet.extend_from_slice(&(0xb000u16 | (4 + 5 + 4)).to_be_bytes());
    packet.extend_from_slice(&TRANSPORT_STREAM_ID.to_be_bytes());
    packet.extend_from_slice(&[0xc1, 0x00, 0x00]);
    packet.extend_from_slice(&SERVICE_ID.to_be_bytes());
    packet.extend_from_slice(&(0xe000 | PMT_PID).to_be_bytes());
    finish_section(&mut packet, section_start);

    out.extend_from_slice(&packet);
}

/// Program map table listing `streams`, PCR carried on `pcr_pid`.
pub fn write_pmt(out: &mut Vec<u8>, cc: u8, pcr_pid: u16, streams: &[PmtEntry]) {
    let mut packet = Vec::with_capacity(TS_PACKET_SIZE);
    psi_header(&mut packet, PMT_PID, cc);

    let section_start = packet.len();
    let section_length = 4 + streams.len() * 5 + 5 + 4;
    packet.push(PMT_TABLE_ID);
    packet.extend_from_slice(&(0xb000u16 | section_length as u16).to_be_bytes());
    packet.extend_from_slice(&SERVICE_ID.to_be_bytes());
    packet.extend_from_slice(&[0xc1, 0x00, 0x00]);
    packet.extend_from_slice(&(0xe000 | pcr_pid).to_be_bytes());
    // no program descriptors
    packet.extend_from_slice(&0xf000u16.to_be_bytes());
    for stream in streams {
        packet.push(stream.stream_type);
        packet.extend_from_slice(&(0xe000 | stream.pid).to_be_bytes());
        packet.extend_from_slice(&0xf000u16.to_be_bytes());
    }
    finish_section(&mut packet, section_start);

    out.extend_from_slice(&packet);
}
