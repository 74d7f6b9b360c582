//! This module defines the `ValueWriter` trait for writing primitive values to a destination.
//!
//! # Examples
//!
//! ```rust
//! use geoexport_core::io::{ValueWriter, ValueWriterBlob};
//! use anyhow::Result;
//!
//! fn main() -> Result<()> {
//!     let mut writer = ValueWriterBlob::new_le();
//!     writer.write_u16(3)?;
//!     writer.write_sized_string("ab")?;
//!     assert_eq!(writer.into_blob().into_vec(), vec![3, 0, 2, 0, 0, 0, b'a', b'b']);
//!     Ok(())
//! }
//! ```

use anyhow::{Context, Result};
use byteorder::{ByteOrder, WriteBytesExt};
use std::io::Write;

/// A trait for writing values with a fixed byte order.
pub trait ValueWriter<E: ByteOrder> {
	/// Returns a mutable reference to the underlying writer.
	fn get_writer(&mut self) -> &mut dyn Write;

	/// Returns the current write position, as an offset from the start.
	fn position(&mut self) -> Result<u64>;

	/// Returns `true` if nothing has been written yet.
	fn is_empty(&mut self) -> Result<bool> {
		Ok(self.position()? == 0)
	}

	fn write_u8(&mut self, value: u8) -> Result<()> {
		Ok(self.get_writer().write_u8(value)?)
	}

	fn write_i8(&mut self, value: i8) -> Result<()> {
		Ok(self.get_writer().write_i8(value)?)
	}

	fn write_i16(&mut self, value: i16) -> Result<()> {
		Ok(self.get_writer().write_i16::<E>(value)?)
	}

	fn write_u16(&mut self, value: u16) -> Result<()> {
		Ok(self.get_writer().write_u16::<E>(value)?)
	}

	fn write_i32(&mut self, value: i32) -> Result<()> {
		Ok(self.get_writer().write_i32::<E>(value)?)
	}

	fn write_u32(&mut self, value: u32) -> Result<()> {
		Ok(self.get_writer().write_u32::<E>(value)?)
	}

	fn write_i64(&mut self, value: i64) -> Result<()> {
		Ok(self.get_writer().write_i64::<E>(value)?)
	}

	fn write_u64(&mut self, value: u64) -> Result<()> {
		Ok(self.get_writer().write_u64::<E>(value)?)
	}

	fn write_f32(&mut self, value: f32) -> Result<()> {
		Ok(self.get_writer().write_f32::<E>(value)?)
	}

	fn write_f64(&mut self, value: f64) -> Result<()> {
		Ok(self.get_writer().write_f64::<E>(value)?)
	}

	/// Writes a slice of bytes without any prefix.
	fn write_slice(&mut self, buf: &[u8]) -> Result<()> {
		self.get_writer().write_all(buf)?;
		Ok(())
	}

	/// Writes a UTF-8 string as raw bytes, without length or terminator.
	fn write_string(&mut self, text: &str) -> Result<()> {
		self.get_writer().write_all(text.as_bytes())?;
		Ok(())
	}

	/// Writes a `u32` byte length followed by the UTF-8 bytes of `text`.
	fn write_sized_string(&mut self, text: &str) -> Result<()> {
		let length = u32::try_from(text.len()).context("string is longer than u32::MAX bytes")?;
		self.write_u32(length).context("Failed to write string length")?;
		self.write_string(text).context("Failed to write string bytes")
	}
}
