use super::config::HlsConfig;
use super::options::SplitOptions;
use crate::errors::{HlsResult, SegmentError};
use crate::mp4::moov::Moov;
use crate::segment::fragment::{segment_boundaries, SegmentBoundary};
use std::fmt::Write;
use std::path::Path;

/// Segments beyond the target duration are tolerated up to this many seconds.
const TARGET_DURATION_SLACK: u32 = 3;

/// One `#EXTINF` entry of a media playlist.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaylistSegment {
    pub ordinal: u64,
    pub duration: f64,
    pub uri: String,
}

/// Query string appended to segment URIs: empty, or starting with `?`.
pub fn normalize_query(query: &str) -> String {
    let query = query.trim_start_matches('?');
    if query.is_empty() {
        String::new()
    } else {
        format!("?{}", query)
    }
}

/// Segment base name for `path`: its file stem, or with `relative` off the
/// stem under `base_url`.
pub fn segment_name(path: &Path, config: &HlsConfig, base_url: Option<&str>) -> String {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    match base_url {
        Some(base) if !config.relative => format!("{}/{}", base.trim_end_matches('/'), stem),
        _ => stem,
    }
}

/// Segments of the first track cut every `length` seconds on keyframes.
pub fn playlist_segments(
    moov: &mut Moov,
    config: &HlsConfig,
    options: &SplitOptions,
    name: &str,
    query: &str,
) -> HlsResult<Vec<PlaylistSegment>> {
    moov.build_index()?;
    let trak = moov
        .traks
        .first()
        .ok_or_else(|| SegmentError::new("movie has no tracks"))?;
    let length = options.segment_length(config.length);
    let query = normalize_query(query);

    let segments = segment_boundaries(trak, length)
        .into_iter()
        .map(|SegmentBoundary { ordinal, duration, .. }| {
            let uri = match &config.hls_proxy {
                Some(proxy) => format!(
                    "{}/{}/{}.ts{}",
                    proxy.trim_end_matches('/'),
                    ordinal,
                    name,
                    query
                ),
                None => format!("{}/{}.ts{}", ordinal, name, query),
            };
            PlaylistSegment {
                ordinal,
                duration,
                uri,
            }
        })
        .collect();
    Ok(segments)
}

/// Render the media playlist for `moov`; segment URIs point at
/// `{ordinal}/{name}.ts`.
pub fn build_playlist(
    moov: &mut Moov,
    config: &HlsConfig,
    options: &SplitOptions,
    name: &str,
    query: &str,
) -> HlsResult<String> {
    let segments = playlist_segments(moov, config, options, name, query)?;
    let length = options.segment_length(config.length);

    let mut out = String::new();
    out.push_str("#EXTM3U\n");
    // writing into a String cannot fail
    let _ = writeln!(out, "#EXT-X-TARGETDURATION:{}", length + TARGET_DURATION_SLACK);
    out.push_str("#EXT-X-MEDIA-SEQUENCE:0\n");
    out.push_str("#EXT-X-VERSION:4\n");
    for segment in &segments {
        let _ = writeln!(out, "#EXTINF:{:.3},", segment.duration);
        out.push_str(&segment.uri);
        out.push('\n');
    }
    out.push_str("#EXT-X-ENDLIST\n");

    log::debug!("playlist {}: {} segments", name, segments.len());
    Ok(out)
}
