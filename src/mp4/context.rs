use super::ftyp::Ftyp;
use super::moof::Moof;
use super::moov::Moov;
use super::r#box::{parse_box_header, BoxType};
use crate::errors::{HlsResult, Mp4Error, ResourceError};
use crate::hls::config::HlsConfig;
use crate::streams::{SeekableStream, WindowReader};
use log::{debug, info, warn};

/// Largest top-level header: 32-bit size, fourcc, 64-bit size.
const LARGE_HEADER_SIZE: u64 = 16;

/// Position of a top-level box in the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TopLevelBox {
    pub kind: BoxType,
    pub pos: u64,
    pub size: u64,
    pub header_size: u64,
}

/// An opened MP4 file: the decoded movie plus the reader its samples come from.
pub struct Mp4Context<S: SeekableStream> {
    pub reader: WindowReader<S>,
    pub ftyp: Option<Ftyp>,
    pub moov: Moov,
    pub moofs: Vec<Moof>,
    pub mdat: Option<TopLevelBox>,
    /// Every top-level box in file order
    pub boxes: Vec<TopLevelBox>,
}

impl<S: SeekableStream> Mp4Context<S> {
    /// Scan the top-level boxes of `stream` and decode `ftyp`, `moov` and
    /// any `moof`. Sample tables are not indexed yet.
    pub fn open(stream: S, config: &HlsConfig) -> HlsResult<Self> {
        config.validate()?;
        let mut reader = WindowReader::new(stream, config)?;
        let length = reader.length();

        let mut ftyp = None;
        let mut moov = None;
        let mut moofs = Vec::new();
        let mut mdat = None;
        let mut boxes = Vec::new();

        let mut pos = 0u64;
        while pos < length {
            let available = (length - pos).min(LARGE_HEADER_SIZE) as usize;
            let bytes = reader.read(available, pos)?;
            let mut cursor = 0usize;
            let Some(header) = parse_box_header(bytes, &mut cursor) else {
                warn!("{} trailing bytes at {} ignored", length - pos, pos);
                break;
            };

            // size 0 runs to the end of the file
            let size = if header.size == 0 {
                length - pos
            } else {
                header.size
            };
            if size < header.header_size {
                return Err(Mp4Error::InvalidSize {
                    kind: header.kind.name(),
                    size,
                }
                .into());
            }
            let entry = TopLevelBox {
                kind: header.kind,
                pos,
                size,
                header_size: header.header_size,
            };
            let end = pos.saturating_add(size);
            if end > length {
                if matches!(header.kind, BoxType::Moov | BoxType::Moof | BoxType::Ftyp) {
                    return Err(Mp4Error::truncated(
                        &header.kind.name(),
                        size as usize,
                        (length - pos) as usize,
                    )
                    .into());
                }
                warn!(
                    "{} at {} claims {} bytes, file ends after {}",
                    header.kind.name(),
                    pos,
                    size,
                    length - pos
                );
            }
            debug!("top-level {} at {} ({} bytes)", header.kind.name(), pos, size);
            boxes.push(entry);

            match header.kind {
                BoxType::Ftyp => ftyp = Some(Ftyp::parse(read_payload(&mut reader, &entry)?)?),
                BoxType::Moov => {
                    if moov.is_some() {
                        warn!("second moov at {} ignored", pos);
                    } else {
                        moov = Some(Moov::parse(read_payload(&mut reader, &entry)?)?);
                    }
                }
                BoxType::Moof => moofs.push(Moof::parse(read_payload(&mut reader, &entry)?)?),
                BoxType::Mdat => {
                    if mdat.is_none() {
                        mdat = Some(entry);
                    }
                }
                _ => {}
            }
            pos = end;
        }

        let moov = moov.ok_or_else(|| Mp4Error::missing("file", "moov"))?;
        info!(
            "opened {} bytes: {} tracks, {} fragments",
            length,
            moov.traks.len(),
            moofs.len()
        );
        Ok(Mp4Context {
            reader,
            ftyp,
            moov,
            moofs,
            mdat,
            boxes,
        })
    }

    /// Build the sample index of every track, once.
    pub fn build_index(&mut self) -> HlsResult<()> {
        self.moov.build_index()
    }
}

fn read_payload<'a, S: SeekableStream>(
    reader: &'a mut WindowReader<S>,
    entry: &TopLevelBox,
) -> HlsResult<&'a [u8]> {
    let payload_size = entry.size - entry.header_size;
    if payload_size > reader.max_buffer_size() as u64 {
        return Err(ResourceError::new(format!(
            "{} box of {} bytes exceeds max_buffer_size {}",
            entry.kind.name(),
            entry.size,
            reader.max_buffer_size()
        ))
        .into());
    }
    reader.read(payload_size as usize, entry.pos + entry.header_size)
}
