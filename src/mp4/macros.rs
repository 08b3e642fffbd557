/// Fail with a truncation error when `$data` is shorter than `$min` bytes.
macro_rules! ensure_size {
    ($kind:expr, $data:expr, $min:expr) => {
        if ($data.len() as u64) < ($min as u64) {
            return Err($crate::errors::Mp4Error::truncated(
                $kind,
                $min as usize,
                $data.len(),
            )
            .into());
        }
    };
}

/// Fail when a declared table of `$count` entries of `$entry_size` bytes
/// does not fit in what is left of the reader.
macro_rules! ensure_entries {
    ($kind:expr, $reader:expr, $count:expr, $entry_size:expr) => {
        let needed = ($count as u64) * ($entry_size as u64);
        if needed > $reader.remaining() as u64 {
            return Err($crate::errors::Mp4Error::Truncated {
                kind: $kind.to_string(),
                needed: ($reader.position() as u64).saturating_add(needed) as usize,
                available: $reader.position() + $reader.remaining(),
            }
            .into());
        }
    };
}
