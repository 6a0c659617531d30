//! Error codes shared across zkdb components.
//!
//! Each crate defines its own error enum; every variant maps onto one of the
//! stable codes defined here so that API and CLI callers see a single
//! taxonomy regardless of which layer failed.

mod code;

pub use code::ErrorCode;
