pub mod seekable_stream;
pub mod window_reader;

pub use seekable_stream::{LocalSeekableStream, SeekableStream};
pub use window_reader::WindowReader;
