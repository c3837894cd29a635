//! Value model core for the tern runtime: the canonical in-memory
//! representation of runtime values with persistent update, deep structural
//! equality, and memoized structural hashing.
//!
//! Published values are immutable; the only sanctioned mutations are
//! idempotent hash-cache population and the [`atom::AtomHandle`] value slot.

pub mod atom;
pub mod edn;
pub mod equal;
pub mod error;
pub mod hash;
pub mod json;
pub mod list;
pub mod map;
pub mod ops;
pub mod set;
pub mod symbols;
pub mod value;
pub mod value_format;

pub use atom::AtomHandle;
pub use error::TernError;
pub use list::ListValue;
pub use map::MapValue;
pub use set::SetValue;
pub use symbols::{Keyword, Symbol};
pub use value::{FnHandle, Value};
