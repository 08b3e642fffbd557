/*
# HLS Module

 Request-facing pieces of the crate: the per-file configuration, the options
 parsed from a request query string and the media playlist writer.
*/

pub mod config;
pub mod options;
pub mod playlist;

pub use config::HlsConfig;
pub use options::SplitOptions;
pub use playlist::{build_playlist, normalize_query, segment_name, PlaylistSegment};
