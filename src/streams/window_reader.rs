use super::SeekableStream;
use crate::errors::{HlsResult, ResourceError, StreamError};
use crate::hls::config::{HlsConfig, WINDOW_ALIGNMENT};
use log::{debug, info};
use std::io::SeekFrom;

/// Serves byte ranges of a stream out of one retained window, refetching
/// only when a request falls outside it.
pub struct WindowReader<S: SeekableStream> {
    stream: S,
    length: u64,
    window: Vec<u8>,
    window_start: u64,
    buffer_size: usize,
    max_buffer_size: usize,
    alignment: bool,
    fetch_count: u64,
    bytes_fetched: u64,
}

impl<S: SeekableStream> WindowReader<S> {
    pub fn new(mut stream: S, config: &HlsConfig) -> HlsResult<Self> {
        let length = stream.length()?;
        Ok(Self {
            stream,
            length,
            window: Vec::new(),
            window_start: 0,
            buffer_size: config.buffer_size.max(1),
            max_buffer_size: config.max_buffer_size,
            alignment: config.alignment,
            fetch_count: 0,
            bytes_fetched: 0,
        })
    }

    /// Total length of the underlying stream.
    pub fn length(&self) -> u64 {
        self.length
    }

    pub fn max_buffer_size(&self) -> usize {
        self.max_buffer_size
    }

    /// Number of reads issued against the stream so far.
    pub fn fetch_count(&self) -> u64 {
        self.fetch_count
    }

    pub fn bytes_fetched(&self) -> u64 {
        self.bytes_fetched
    }

    pub fn print_stats(&self) {
        info!(
            "window reader: {} fetches, {} bytes ({:.2} MB) of {}",
            self.fetch_count,
            self.bytes_fetched,
            self.bytes_fetched as f64 / 1024.0 / 1024.0,
            self.length
        );
    }

    /// Borrow `size` bytes starting at `pos`.
    pub fn read(&mut self, size: usize, pos: u64) -> HlsResult<&[u8]> {
        if size > self.max_buffer_size {
            return Err(ResourceError::new(format!(
                "read of {} bytes at {} exceeds max_buffer_size {}",
                size, pos, self.max_buffer_size
            ))
            .into());
        }
        let end = pos.checked_add(size as u64).unwrap_or(u64::MAX);
        if end > self.length {
            return Err(StreamError::new(format!(
                "read of {} bytes at {} past end of stream ({})",
                size, pos, self.length
            ))
            .into());
        }

        let window_end = self.window_start + self.window.len() as u64;
        if self.window.is_empty() || pos < self.window_start || end > window_end {
            self.fetch(size, pos)?;
        }

        let offset = (pos - self.window_start) as usize;
        Ok(&self.window[offset..offset + size])
    }

    fn fetch(&mut self, size: usize, pos: u64) -> HlsResult<()> {
        let start = if self.alignment {
            pos / WINDOW_ALIGNMENT * WINDOW_ALIGNMENT
        } else {
            pos
        };
        let lead = (pos - start) as usize;
        let mut want = (size + lead).max(self.buffer_size) as u64;
        if self.alignment {
            want = want.div_ceil(WINDOW_ALIGNMENT) * WINDOW_ALIGNMENT;
        }
        let want = want.min(self.length - start) as usize;

        debug!("window fetch: {} bytes at {}", want, start);
        self.window.clear();
        self.window.resize(want, 0);
        self.stream.seek(SeekFrom::Start(start))?;
        self.stream.read_exact(&mut self.window)?;
        self.window_start = start;
        self.fetch_count += 1;
        self.bytes_fetched += want as u64;
        Ok(())
    }
}
