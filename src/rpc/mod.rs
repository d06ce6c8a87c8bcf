//! RPC method classification and parameter validation.

pub mod method;
pub mod validation;

pub use method::Method;
