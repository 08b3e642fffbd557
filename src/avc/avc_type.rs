#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum NaluType {
    NonIDR = 1,
    IDR = 5,
    SEI = 6,
    SPS = 7,
    PPS = 8,
    AUD = 9,
    EOSeq = 10,
    EOStream = 11,
    Fill = 12,
    Other(u8),
}

impl std::fmt::Display for NaluType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            NaluType::NonIDR => "NonIDR_1",
            NaluType::IDR => "IDR_5",
            NaluType::SEI => "SEI_6",
            NaluType::SPS => "SPS_7",
            NaluType::PPS => "PPS_8",
            NaluType::AUD => "AUD_9",
            NaluType::EOSeq => "EndOfSequence_10",
            NaluType::EOStream => "EndOfStream_11",
            NaluType::Fill => "FILL_12",
            NaluType::Other(v) => return write!(f, "Other_{v}"),
        };
        f.write_str(s)
    }
}

impl NaluType {
    pub fn from_header_byte(b: u8) -> Self {
        match b & 0x1f {
            1 => NaluType::NonIDR,
            5 => NaluType::IDR,
            6 => NaluType::SEI,
            7 => NaluType::SPS,
            8 => NaluType::PPS,
            9 => NaluType::AUD,
            10 => NaluType::EOSeq,
            11 => NaluType::EOStream,
            12 => NaluType::Fill,
            v => NaluType::Other(v),
        }
    }
}
