//! Address and SCALE decoding primitives.

pub mod scale;
pub mod ss58;

pub use scale::{ScaleError, ScaleInput, decode_byte_vector, decode_compact_uint};
pub use ss58::Ss58Error;
