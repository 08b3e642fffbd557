use crate::bits::reader::{read_u32, read_u64, ByteReader};
use crate::errors::{HlsResult, Mp4Error};

/// Size of a compact box header (u32 size + fourcc).
pub const BOX_HEADER_SIZE: u64 = 8;

/// Unknown boxes larger than this are refused instead of copied.
pub const MAX_UNKNOWN_BOX_SIZE: u64 = 1024 * 1024;

/// Box header information
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoxHeader {
    pub kind: BoxType,
    pub size: u64,
    pub header_size: u64,
}

impl BoxHeader {
    pub fn payload_size(&self) -> u64 {
        self.size - self.header_size
    }
}

/// Every box type the container model knows how to decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoxType {
    Ftyp,
    Moov,
    Mdat,
    Mvhd,
    Trak,
    Tkhd,
    Edts,
    Elst,
    Mdia,
    Mdhd,
    Hdlr,
    Minf,
    Vmhd,
    Smhd,
    Dinf,
    Dref,
    Stbl,
    Stsd,
    Stts,
    Stss,
    Stsc,
    Stsz,
    Stco,
    Co64,
    Ctts,
    Mvex,
    Trex,
    Moof,
    Mfhd,
    Traf,
    Tfhd,
    Trun,
    Other([u8; 4]),
}

impl BoxType {
    pub fn from_fourcc(fourcc: [u8; 4]) -> Self {
        match &fourcc {
            b"ftyp" => BoxType::Ftyp,
            b"moov" => BoxType::Moov,
            b"mdat" => BoxType::Mdat,
            b"mvhd" => BoxType::Mvhd,
            b"trak" => BoxType::Trak,
            b"tkhd" => BoxType::Tkhd,
            b"edts" => BoxType::Edts,
            b"elst" => BoxType::Elst,
            b"mdia" => BoxType::Mdia,
            b"mdhd" => BoxType::Mdhd,
            b"hdlr" => BoxType::Hdlr,
            b"minf" => BoxType::Minf,
            b"vmhd" => BoxType::Vmhd,
            b"smhd" => BoxType::Smhd,
            b"dinf" => BoxType::Dinf,
            b"dref" => BoxType::Dref,
            b"stbl" => BoxType::Stbl,
            b"stsd" => BoxType::Stsd,
            b"stts" => BoxType::Stts,
            b"stss" => BoxType::Stss,
            b"stsc" => BoxType::Stsc,
            b"stsz" => BoxType::Stsz,
            b"stco" => BoxType::Stco,
            b"co64" => BoxType::Co64,
            b"ctts" => BoxType::Ctts,
            b"mvex" => BoxType::Mvex,
            b"trex" => BoxType::Trex,
            b"moof" => BoxType::Moof,
            b"mfhd" => BoxType::Mfhd,
            b"traf" => BoxType::Traf,
            b"tfhd" => BoxType::Tfhd,
            b"trun" => BoxType::Trun,
            _ => BoxType::Other(fourcc),
        }
    }

    pub fn fourcc(&self) -> [u8; 4] {
        match self {
            BoxType::Ftyp => *b"ftyp",
            BoxType::Moov => *b"moov",
            BoxType::Mdat => *b"mdat",
            BoxType::Mvhd => *b"mvhd",
            BoxType::Trak => *b"trak",
            BoxType::Tkhd => *b"tkhd",
            BoxType::Edts => *b"edts",
            BoxType::Elst => *b"elst",
            BoxType::Mdia => *b"mdia",
            BoxType::Mdhd => *b"mdhd",
            BoxType::Hdlr => *b"hdlr",
            BoxType::Minf => *b"minf",
            BoxType::Vmhd => *b"vmhd",
            BoxType::Smhd => *b"smhd",
            BoxType::Dinf => *b"dinf",
            BoxType::Dref => *b"dref",
            BoxType::Stbl => *b"stbl",
            BoxType::Stsd => *b"stsd",
            BoxType::Stts => *b"stts",
            BoxType::Stss => *b"stss",
            BoxType::Stsc => *b"stsc",
            BoxType::Stsz => *b"stsz",
            BoxType::Stco => *b"stco",
            BoxType::Co64 => *b"co64",
            BoxType::Ctts => *b"ctts",
            BoxType::Mvex => *b"mvex",
            BoxType::Trex => *b"trex",
            BoxType::Moof => *b"moof",
            BoxType::Mfhd => *b"mfhd",
            BoxType::Traf => *b"traf",
            BoxType::Tfhd => *b"tfhd",
            BoxType::Trun => *b"trun",
            BoxType::Other(fourcc) => *fourcc,
        }
    }

    pub fn name(&self) -> String {
        fourcc_to_string(&self.fourcc())
    }
}

/// Render a fourcc for logs and errors, replacing non-printable bytes.
pub fn fourcc_to_string(fourcc: &[u8; 4]) -> String {
    fourcc
        .iter()
        .map(|&b| if b.is_ascii_graphic() || b == b' ' { b as char } else { '.' })
        .collect()
}

/// A child box the parent does not decode, kept verbatim (header included).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownBox {
    pub kind: [u8; 4],
    pub data: Vec<u8>,
}

/// Parse a box header from a byte slice advancing the cursor.
/// Returns `None` when the slice is too short to hold the header.
pub fn parse_box_header(data: &[u8], pos: &mut usize) -> Option<BoxHeader> {
    let start = *pos;
    let size32 = read_u32(data, pos)?;
    let fourcc: [u8; 4] = data.get(*pos..*pos + 4)?.try_into().ok()?;
    *pos += 4;
    let mut size = size32 as u64;
    if size32 == 1 {
        size = read_u64(data, pos)?;
    }
    Some(BoxHeader {
        kind: BoxType::from_fourcc(fourcc),
        size,
        header_size: (*pos - start) as u64,
    })
}

/// A box whose payload is a sequence of child boxes.
pub trait Container {
    /// Name used in errors and logs.
    const NAME: &'static str;

    /// Decode and attach a child. Returns `Ok(false)` when `kind` is not a
    /// child this container decodes, in which case the box is kept as unknown.
    fn read_child(&mut self, kind: BoxType, payload: &[u8]) -> HlsResult<bool>;

    fn add_unknown(&mut self, unknown: UnknownBox);
}

/// Walk the child boxes in `data` and hand each to `parent`.
///
/// The whole buffer must be consumed by whole boxes. A child decoder or
/// attach failure aborts the walk.
pub fn read_children<C: Container>(parent: &mut C, data: &[u8]) -> HlsResult<()> {
    let mut pos = 0usize;
    while pos < data.len() {
        let start = pos;
        let header = parse_box_header(data, &mut pos).ok_or_else(|| {
            Mp4Error::truncated(C::NAME, start + BOX_HEADER_SIZE as usize, data.len())
        })?;
        if header.size < header.header_size {
            return Err(Mp4Error::InvalidSize {
                kind: header.kind.name(),
                size: header.size,
            }
            .into());
        }
        let remaining = (data.len() - start) as u64;
        if header.size > remaining {
            return Err(Mp4Error::truncated(
                &header.kind.name(),
                header.size as usize,
                remaining as usize,
            )
            .into());
        }
        let end = start + header.size as usize;
        let payload = &data[pos..end];

        if !parent.read_child(header.kind, payload)? {
            if header.size > MAX_UNKNOWN_BOX_SIZE {
                return Err(Mp4Error::InvalidSize {
                    kind: header.kind.name(),
                    size: header.size,
                }
                .into());
            }
            log::debug!("{}: keeping unknown box {}", C::NAME, header.kind.name());
            parent.add_unknown(UnknownBox {
                kind: header.kind.fourcc(),
                data: data[start..end].to_vec(),
            });
        }
        pos = end;
    }
    Ok(())
}

/// Turn a reader shortfall into a truncation error for `kind`.
pub fn check_truncated(reader: &ByteReader<'_>, kind: &str) -> HlsResult<()> {
    match reader.shortfall() {
        Some((needed, available)) => Err(Mp4Error::truncated(kind, needed, available).into()),
        None => Ok(()),
    }
}

/// Version and flags of a full box.
pub fn read_version_flags(reader: &mut ByteReader<'_>) -> (u8, u32) {
    (reader.read_u8(), reader.read_u24())
}
