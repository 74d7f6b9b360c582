//! This module provides the `ValueWriterBlob` struct for writing values to an in-memory [`Blob`].
//!
//! # Examples
//!
//! ```rust
//! use geoexport_core::io::{ValueWriter, ValueWriterBlob};
//! use anyhow::Result;
//!
//! fn main() -> Result<()> {
//!     let mut writer = ValueWriterBlob::new_le();
//!     writer.write_u32(1025)?;
//!     assert_eq!(writer.into_blob().into_vec(), vec![0x01, 0x04, 0x00, 0x00]);
//!     Ok(())
//! }
//! ```

use super::ValueWriter;
use crate::types::Blob;
use anyhow::Result;
use byteorder::{ByteOrder, LittleEndian};
use std::io::{Cursor, Write};
use std::marker::PhantomData;

/// Writes values into a growing in-memory buffer using the byte order `E`.
pub struct ValueWriterBlob<E: ByteOrder> {
	_phantom: PhantomData<E>,
	cursor: Cursor<Vec<u8>>,
}

impl<E: ByteOrder> ValueWriterBlob<E> {
	pub fn new() -> ValueWriterBlob<E> {
		ValueWriterBlob {
			_phantom: PhantomData,
			cursor: Cursor::new(Vec::new()),
		}
	}

	/// Preallocates `capacity` bytes, useful when the final size is roughly known.
	pub fn with_capacity(capacity: usize) -> ValueWriterBlob<E> {
		ValueWriterBlob {
			_phantom: PhantomData,
			cursor: Cursor::new(Vec::with_capacity(capacity)),
		}
	}

	/// Converts the written data into a `Blob`.
	pub fn into_blob(self) -> Blob {
		Blob::from(self.cursor.into_inner())
	}
}

impl ValueWriterBlob<LittleEndian> {
	/// Creates a new writer with little-endian byte order.
	pub fn new_le() -> ValueWriterBlob<LittleEndian> {
		ValueWriterBlob::new()
	}
}

impl<E: ByteOrder> ValueWriter<E> for ValueWriterBlob<E> {
	fn get_writer(&mut self) -> &mut dyn Write {
		&mut self.cursor
	}

	fn position(&mut self) -> Result<u64> {
		Ok(self.cursor.position())
	}
}

impl<E: ByteOrder> Default for ValueWriterBlob<E> {
	fn default() -> Self {
		Self::new()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_write_u8_and_u16() -> Result<()> {
		let mut writer = ValueWriterBlob::new_le();
		writer.write_u8(255)?;
		writer.write_u16(1)?;
		assert_eq!(writer.into_blob().into_vec(), vec![0xFF, 0x01, 0x00]);
		Ok(())
	}

	#[test]
	fn test_write_u64() -> Result<()> {
		let mut writer = ValueWriterBlob::new_le();
		writer.write_u64(u64::MAX)?;
		assert_eq!(writer.into_blob().into_vec(), vec![0xFF; 8]);
		Ok(())
	}

	#[test]
	fn test_with_capacity_starts_empty() -> Result<()> {
		let mut writer = ValueWriterBlob::<LittleEndian>::with_capacity(64);
		assert!(writer.is_empty()?);
		writer.write_slice(&[1, 2])?;
		writer.write_string("ok")?;
		assert_eq!(writer.position()?, 4);
		assert_eq!(writer.into_blob().into_vec(), vec![1, 2, b'o', b'k']);
		Ok(())
	}
}
