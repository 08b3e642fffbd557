pub mod bits;
pub use bits::reader::{mask, BitReader, ByteReader};

pub mod errors;
pub use errors::{HlsError, HlsResult, Mp4Error, ResourceError, SegmentError, StreamError};

pub mod mp4;
pub use mp4::{Moov, Mp4Context, Trak};

pub mod avc;
pub use avc::NaluType;

pub mod streams;
pub use streams::{LocalSeekableStream, SeekableStream, WindowReader};

pub mod segment;
pub use segment::{Fragment, AlignedRange};

pub mod ts;
pub use ts::{output_fragments, output_range, output_ts, TsMuxer};

pub mod hls;
pub use hls::{build_playlist, HlsConfig, SplitOptions};

use std::path::Path;

/// Open a local MP4 file for HLS output.
pub fn open_file(path: &Path, config: &HlsConfig) -> HlsResult<Mp4Context<LocalSeekableStream>> {
    let stream = LocalSeekableStream::open(path)?;
    Mp4Context::open(stream, config)
}

/// Media playlist for the file at `path`.
pub fn playlist_for_file(
    path: &Path,
    config: &HlsConfig,
    options: &SplitOptions,
    query: &str,
) -> HlsResult<String> {
    let mut ctx = open_file(path, config)?;
    let name = hls::segment_name(path, config, None);
    build_playlist(&mut ctx.moov, config, options, &name, query)
}

/// Transport stream segment selected by `options` for the file at `path`:
/// the fragment ordinal when `options.fragments` is set, else the time range.
pub fn segment_for_file(path: &Path, config: &HlsConfig, options: &SplitOptions) -> HlsResult<Vec<u8>> {
    let mut ctx = open_file(path, config)?;
    let ts = if options.fragments {
        output_ts(&mut ctx, options, config)?
    } else {
        output_range(&mut ctx, options)?
    };
    ctx.reader.print_stats();
    Ok(ts)
}
