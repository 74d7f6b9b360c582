//! This module defines the `ValueReader` trait for reading primitive values from a source.
//!
//! It is the reading counterpart of [`super::ValueWriter`]: every `write_*` method has a
//! matching `read_*` method, so a block written with one can be walked with the other.
//!
//! # Examples
//!
//! ```rust
//! use geoexport_core::io::{ValueReader, ValueReaderSlice};
//! use anyhow::Result;
//!
//! fn main() -> Result<()> {
//!     let data = &[0x02, 0x00, 0x00, 0x00, b'o', b'k'];
//!     let mut reader = ValueReaderSlice::new_le(data);
//!     assert_eq!(reader.read_sized_string()?, "ok");
//!     assert!(!reader.has_remaining());
//!     Ok(())
//! }
//! ```

use crate::Blob;
use anyhow::{Context, Result, ensure};
use byteorder::{ByteOrder, ReadBytesExt};
use std::io::{Read, Seek};

pub trait SeekRead: Seek + Read {}

/// A trait for reading values with a fixed byte order.
pub trait ValueReader<'a, E: ByteOrder + 'a> {
	fn get_reader(&mut self) -> &mut dyn SeekRead;

	/// Total length of the source in bytes.
	fn len(&self) -> u64;

	fn position(&mut self) -> u64;

	fn is_empty(&self) -> bool {
		self.len() == 0
	}

	fn remaining(&mut self) -> u64 {
		self.len() - self.position()
	}

	fn has_remaining(&mut self) -> bool {
		self.remaining() > 0
	}

	fn read_u8(&mut self) -> Result<u8> {
		Ok(self.get_reader().read_u8()?)
	}

	fn read_i8(&mut self) -> Result<i8> {
		Ok(self.get_reader().read_i8()?)
	}

	fn read_i16(&mut self) -> Result<i16> {
		Ok(self.get_reader().read_i16::<E>()?)
	}

	fn read_u16(&mut self) -> Result<u16> {
		Ok(self.get_reader().read_u16::<E>()?)
	}

	fn read_i32(&mut self) -> Result<i32> {
		Ok(self.get_reader().read_i32::<E>()?)
	}

	fn read_u32(&mut self) -> Result<u32> {
		Ok(self.get_reader().read_u32::<E>()?)
	}

	fn read_i64(&mut self) -> Result<i64> {
		Ok(self.get_reader().read_i64::<E>()?)
	}

	fn read_u64(&mut self) -> Result<u64> {
		Ok(self.get_reader().read_u64::<E>()?)
	}

	fn read_f32(&mut self) -> Result<f32> {
		Ok(self.get_reader().read_f32::<E>()?)
	}

	fn read_f64(&mut self) -> Result<f64> {
		Ok(self.get_reader().read_f64::<E>()?)
	}

	fn read_blob(&mut self, length: u64) -> Result<Blob> {
		ensure!(
			length <= self.remaining(),
			"cannot read {length} bytes, only {} remaining",
			self.remaining()
		);
		let mut buffer = vec![0u8; length as usize];
		self.get_reader().read_exact(&mut buffer)?;
		Ok(Blob::from(buffer))
	}

	fn read_string(&mut self, length: u64) -> Result<String> {
		let blob = self.read_blob(length)?;
		Ok(String::from_utf8(blob.into_vec())?)
	}

	/// Reads a `u32` byte length followed by that many UTF-8 bytes.
	fn read_sized_string(&mut self) -> Result<String> {
		let length = self.read_u32().context("Failed to read string length")?;
		self.read_string(u64::from(length)).context("Failed to read string bytes")
	}

	/// Reads a `u32` byte length followed by that many bytes.
	fn read_sized_blob(&mut self) -> Result<Blob> {
		let length = self.read_u32().context("Failed to read blob length")?;
		self.read_blob(u64::from(length)).context("Failed to read blob bytes")
	}
}
