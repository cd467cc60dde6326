pub mod blob;
pub mod commit;
pub mod object;
pub mod object_id;
pub mod object_type;
pub mod tree;

/// Length of an object id in raw bytes
pub const OBJECT_ID_RAW_LENGTH: usize = 20;

/// Length of an object id in hex characters
pub const OBJECT_ID_HEX_LENGTH: usize = 40;
