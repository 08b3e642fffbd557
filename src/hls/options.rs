/// Per-request options parsed from the query string of a playlist or
/// segment request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SplitOptions {
    /// Range start in seconds, 0 for the beginning
    pub start: f32,
    /// Range end in seconds, 0 for the end
    pub end: f32,
    pub bitrate: u32,
    /// A single fragment is requested by ordinal
    pub fragments: bool,
    /// Keyframe ordinal of the requested fragment
    pub fragment_start: u64,
    /// Index of the audio track to mux, 0 when unset
    pub fragment_track_id: u32,
    /// Segment length override in seconds
    pub length: Option<u32>,
}

impl SplitOptions {
    /// Parse `key=value&...` pairs, with or without a leading `?`.
    ///
    /// Unknown keys and pairs without a value are ignored, numbers that do
    /// not parse read as 0.
    pub fn from_query(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        let mut options = SplitOptions::default();

        for pair in query.split('&') {
            let Some((key, value)) = pair.split_once('=') else {
                continue;
            };
            match key {
                "start" => options.start = value.parse().unwrap_or_default(),
                "end" => options.end = value.parse().unwrap_or_default(),
                "bitrate" => options.bitrate = value.parse().unwrap_or_default(),
                "video" => {
                    options.fragments = true;
                    options.fragment_start = value.parse().unwrap_or_default();
                }
                "audio" => options.fragment_track_id = value.parse().unwrap_or_default(),
                "length" => options.length = Some(value.parse().unwrap_or_default()),
                _ => log::debug!("ignoring request option {}", key),
            }
        }
        options
    }

    /// Audio track index to mux, track 1 unless overridden.
    pub fn audio_track(&self) -> usize {
        if self.fragment_track_id == 0 {
            1
        } else {
            self.fragment_track_id as usize
        }
    }

    /// Segment length to use, the request override winning over `default`.
    pub fn segment_length(&self, default: u32) -> u32 {
        self.length.unwrap_or(default)
    }
}
