//! This module provides the [`Blob`] struct, an owned byte buffer holding encoded container data.
//!
//! # Examples
//!
//! ```rust
//! use geoexport_core::Blob;
//!
//! let blob = Blob::from(vec![0x66, 0x67, 0x62, 0x03]);
//! assert_eq!(blob.len(), 4);
//! assert!(blob.starts_with(b"fgb"));
//! assert_eq!(blob.range(1..3), &[0x67, 0x62]);
//! ```

use anyhow::{Context, Result, ensure};
use std::{fmt::Debug, ops::Range, path::Path};

/// Number of bytes shown by the `Debug` representation before it is abbreviated.
const DEBUG_PREVIEW: usize = 32;

/// An owned sequence of bytes, typically a complete container or one encoded block of it.
#[derive(Clone, PartialEq, Eq)]
pub struct Blob(Vec<u8>);

impl Blob {
	/// Creates an empty `Blob`.
	#[must_use]
	pub fn new_empty() -> Blob {
		Blob(Vec::new())
	}

	/// Returns the bytes in `range`.
	///
	/// # Panics
	///
	/// Panics if the range is out of bounds.
	#[must_use]
	pub fn range(&self, range: Range<usize>) -> &[u8] {
		&self.0[range]
	}

	/// Returns the bytes in `range`, or an error if the range exceeds the blob.
	pub fn read_range(&self, range: Range<usize>) -> Result<&[u8]> {
		ensure!(
			range.start <= range.end && range.end <= self.0.len(),
			"range {}..{} is outside of blob with length {}",
			range.start,
			range.end,
			self.0.len()
		);
		Ok(&self.0[range])
	}

	#[must_use]
	pub fn as_slice(&self) -> &[u8] {
		self.0.as_ref()
	}

	#[must_use]
	pub fn into_vec(self) -> Vec<u8> {
		self.0
	}

	#[must_use]
	pub fn starts_with(&self, prefix: &[u8]) -> bool {
		self.0.starts_with(prefix)
	}

	/// Hex dump with bytes separated by spaces.
	#[must_use]
	pub fn as_hex(&self) -> String {
		self
			.0
			.iter()
			.map(|byte| format!("{byte:02x}"))
			.collect::<Vec<_>>()
			.join(" ")
	}

	#[must_use]
	pub fn len(&self) -> u64 {
		self.0.len() as u64
	}

	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	pub fn save_to_file(&self, path: &Path) -> Result<()> {
		std::fs::write(path, &self.0).with_context(|| format!("failed to write {path:?}"))
	}

	pub fn load_from_file(path: &Path) -> Result<Self> {
		let data = std::fs::read(path).with_context(|| format!("failed to read {path:?}"))?;
		Ok(Blob::from(data))
	}
}

impl From<Vec<u8>> for Blob {
	fn from(item: Vec<u8>) -> Self {
		Blob(item)
	}
}

impl From<&[u8]> for Blob {
	fn from(item: &[u8]) -> Self {
		Blob(item.to_vec())
	}
}

impl<const N: usize> From<&[u8; N]> for Blob {
	fn from(item: &[u8; N]) -> Self {
		Blob(item.to_vec())
	}
}

impl From<&str> for Blob {
	fn from(item: &str) -> Self {
		Blob(item.as_bytes().to_vec())
	}
}

impl Debug for Blob {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		if self.0.len() <= DEBUG_PREVIEW {
			write!(f, "Blob({}): {}", self.0.len(), self.as_hex())
		} else {
			let head = Blob::from(&self.0[..DEBUG_PREVIEW]);
			write!(f, "Blob({}): {} ...", self.0.len(), head.as_hex())
		}
	}
}

impl Default for Blob {
	fn default() -> Self {
		Self::new_empty()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn basic_tests() {
		let vec = vec![0, 1, 2, 3, 4, 5, 6, 7];
		let blob = Blob::from(vec.clone());
		assert_eq!(blob.len(), 8);
		assert_eq!(blob.range(2..5), &[2, 3, 4]);
		assert_eq!(blob.into_vec(), vec);
	}

	#[test]
	fn test_new_empty() {
		let empty = Blob::new_empty();
		assert!(empty.is_empty());
		assert_eq!(Blob::default(), empty);
		assert_eq!(empty.as_slice(), &[] as &[u8]);
	}

	#[test]
	fn test_read_range() -> Result<()> {
		let blob = Blob::from("abcdef");
		assert_eq!(blob.read_range(2..5)?, b"cde");
		assert!(blob.read_range(4..14).is_err());
		Ok(())
	}

	#[test]
	fn test_starts_with() {
		let blob = Blob::from(&[0x66, 0x67, 0x62, 0x03]);
		assert!(blob.starts_with(b"fgb"));
		assert!(!blob.starts_with(b"fgbx"));
	}

	#[test]
	fn test_debug_representation() {
		assert_eq!(format!("{:?}", Blob::from(&[0xAB, 0xCD, 0xEF])), "Blob(3): ab cd ef");

		let long = Blob::from(vec![0u8; 40]);
		let debug = format!("{long:?}");
		assert!(debug.starts_with("Blob(40): 00 00"));
		assert!(debug.ends_with(" ..."));
	}

	#[test]
	fn test_save_and_load() -> Result<()> {
		let dir = tempfile::tempdir()?;
		let path = dir.path().join("blob.bin");
		let blob = Blob::from(&[1, 2, 3, 4]);
		blob.save_to_file(&path)?;
		assert_eq!(Blob::load_from_file(&path)?, blob);
		Ok(())
	}
}
