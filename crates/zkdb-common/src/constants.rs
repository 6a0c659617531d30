//! System-wide constants.
//!
//! Values in this module are part of the persisted wire format or of the
//! membership-proof encoding. Changing them breaks compatibility with
//! previously written chunks and previously issued proofs.

/// Sequence address meaning "no sequence has been written yet".
pub const SEQUENCE_SENTINEL: &str = "0x0";

/// Fixed-point multiplier used when encoding `Float64` cells (8 decimal digits).
pub const FLOAT_FIXED_POINT_SCALE: f64 = 1e8;

/// Wire name of the `Int64` column type.
pub const TYPE_NAME_INT: &str = "int";

/// Wire name of the `Float64` column type.
pub const TYPE_NAME_FLOAT: &str = "float";

/// Wire name of the `Bool` column type.
pub const TYPE_NAME_BOOL: &str = "bool";

/// Wire name of the `Utf8String` column type.
pub const TYPE_NAME_STRING: &str = "string";

/// Wire name of the `Timestamp` column type.
pub const TYPE_NAME_DATETIME: &str = "datetime";

/// Wire name of the `FloatVector` column type.
pub const TYPE_NAME_FLOAT_LIST: &str = "list[float]";
