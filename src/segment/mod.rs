pub mod fragment;
pub mod resolver;
pub mod time;

pub use fragment::{segment_boundaries, select_fragments, Fragment, MAX_FRAGMENT_STREAMS};
pub use resolver::{get_aligned_start_and_end, nearest_keyframe, split, AlignedRange};
