//! Endian-aware binary stream codec.
//!
//! The aerodynamic solver writes its database as a flat sequence of native
//! `i32`, `f32`, `f64` and `char` values. Files produced on a machine of the
//! other byte order are read by flipping a swap flag: every element passing
//! through the codec is then byte-reversed, transparently to the caller.
//!
//! - [`BinaryReader`] - typed reads over any [`std::io::Read`]
//! - [`BinaryWriter`] - typed writes over any [`std::io::Write`]
//! - [`Element`] - the closed set of primitive types the format uses
//!
//! Read and write swapping are independent flags.
//!
//! # Short I/O
//!
//! Bulk reads ([`BinaryReader::read_into`]) report how many whole elements
//! arrived; callers check that count. Scalar helpers turn a short read into
//! [`CodecError::ShortRead`].
//!
//! # Example
//!
//! ```
//! use aero_codec::{BinaryReader, BinaryWriter};
//!
//! let mut writer = BinaryWriter::new(Vec::new());
//! writer.set_swap(true);
//! writer.write(-123_789_456_i32).unwrap();
//! writer.write(1.5_f32).unwrap();
//! let bytes = writer.into_inner();
//!
//! let mut reader = BinaryReader::new(bytes.as_slice());
//! reader.set_swap(true);
//! assert_eq!(reader.read::<i32>().unwrap(), -123_789_456);
//! assert_eq!(reader.read::<f32>().unwrap(), 1.5);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

mod element;
mod error;
mod reader;
mod writer;

pub use element::Element;
pub use error::{CodecError, CodecResult};
pub use reader::{BinaryReader, CHUNK_BYTES};
pub use writer::BinaryWriter;
