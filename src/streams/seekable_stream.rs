use std::fs::File;
use std::io::{self, Cursor, Read, Seek, SeekFrom};
use std::path::Path;

/// A seekable byte source with a known length
pub trait SeekableStream: Read + Seek {
    /// Total length in bytes.
    fn length(&mut self) -> io::Result<u64> {
        let current = self.stream_position()?;
        let end = self.seek(SeekFrom::End(0))?;
        self.seek(SeekFrom::Start(current))?;
        Ok(end)
    }
}

/// Local file wrapper
pub struct LocalSeekableStream {
    file: File,
    length: u64,
}

impl LocalSeekableStream {
    pub fn open<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let file = File::open(path)?;
        let length = file.metadata()?.len();
        Ok(LocalSeekableStream { file, length })
    }
}

impl Read for LocalSeekableStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.file.read(buf)
    }
}

impl Seek for LocalSeekableStream {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.file.seek(pos)
    }
}

impl SeekableStream for LocalSeekableStream {
    fn length(&mut self) -> io::Result<u64> {
        Ok(self.length)
    }
}

// In-memory sources, mostly for tests and piped input
impl<T: AsRef<[u8]>> SeekableStream for Cursor<T> {
    fn length(&mut self) -> io::Result<u64> {
        Ok(self.get_ref().as_ref().len() as u64)
    }
}
