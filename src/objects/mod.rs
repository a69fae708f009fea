pub mod object_id;

/// Size of a binary SHA-1 object identifier in bytes
pub const OBJECT_ID_SIZE: usize = 20;

/// Length of the hexadecimal rendering of an object identifier
pub const OBJECT_ID_HEX_LENGTH: usize = 40;
