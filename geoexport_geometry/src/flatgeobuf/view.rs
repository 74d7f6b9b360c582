//! Read-only views of the tables inside a verified FlatGeobuf buffer.
//!
//! Views are only handed out by [`flatbuffers::size_prefixed_root`], which verifies every
//! field named in the view's [`flatbuffers::Verifiable`] impl before the first access.

use flatbuffers::{Follow, Table, VOffsetT};

/// Declares a view over one table kind.
macro_rules! table_view {
	($name:ident) => {
		#[derive(Clone, Copy)]
		pub(crate) struct $name<'a> {
			table: flatbuffers::Table<'a>,
		}

		impl<'a> flatbuffers::Follow<'a> for $name<'a> {
			type Inner = $name<'a>;

			unsafe fn follow(buf: &'a [u8], loc: usize) -> Self::Inner {
				$name {
					// SAFETY: the caller guarantees that `loc` points at a table of this kind.
					table: unsafe { flatbuffers::Table::new(buf, loc) },
				}
			}
		}
	};
}

pub(crate) use table_view;

/// Reads the field at vtable offset `slot`, or `default` if the table leaves it out.
pub(crate) fn field<'a, T: Follow<'a> + 'a>(
	table: &Table<'a>,
	slot: VOffsetT,
	default: Option<T::Inner>,
) -> Option<T::Inner> {
	// SAFETY: the buffer passed verification, including this field's offset and alignment.
	unsafe { table.get::<T>(slot, default) }
}
