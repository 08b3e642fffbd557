#[macro_use]
mod macros;
pub mod r#box;
pub use r#box::{BoxHeader, BoxType, Container, UnknownBox};

pub mod context;
pub use context::{Mp4Context, TopLevelBox};

pub mod ftyp;
pub mod moof;
pub mod moov;
pub mod mvex;
pub mod mvhd;
pub use moov::{Moov, MAX_TRACKS};

pub mod edts;
pub mod tkhd;
pub mod trak;
pub use trak::Trak;

pub mod dinf;
pub mod hdlr;
pub mod mdhd;
pub mod mdia;
pub mod minf;
pub mod smhd;
pub mod vmhd;

pub mod avcc;
pub mod ctts;
pub mod esds;
pub mod stbl;
pub mod stco;
pub mod stsc;
pub mod stsd;
pub mod stss;
pub mod stsz;
pub mod stts;
pub use avcc::AvccConfig;
pub use stsd::{AudioSampleEntry, SampleEntry, VideoSampleEntry};

pub mod index;
pub use index::{Chunk, Sample, MAX_INDEX_SAMPLES};

#[cfg(test)]
pub(crate) mod test_util;
