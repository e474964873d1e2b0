//! Error detection and correction
//!
//! Binary BCH codes over GF(2^m), `2 <= m <= 8`, correcting up to 16
//! bit errors per codeword. The public surface is [`BchDecoder`],
//! which owns the field tables and generator polynomial for one code
//! and encodes or decodes [`Codeword`] buffers in place.
//!
//! [`Codeword`]: crate::Codeword

mod decoder;
mod galois;
mod gfpoly;
mod locator;
mod roots;

pub use decoder::{BchDecoder, CorrectionStatus};
pub use galois::default_primitive_poly;
