pub mod annexb;
pub mod avc_type;

pub use annexb::{convert_to_annexb, nalu_types, ACCESS_UNIT_DELIMITER, START_CODE};
pub use avc_type::NaluType;
