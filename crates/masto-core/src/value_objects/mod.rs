//! Value objects - immutable types that represent domain concepts

mod id_space;
mod native_id;

pub use id_space::{ForeignId, IdSpace};
pub use native_id::{NativeId, NativeIdGenerator, NativeIdParseError};
