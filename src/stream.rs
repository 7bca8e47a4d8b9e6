use std::io::Read;

use byteorder::{BigEndian, LittleEndian, ReadBytesExt};

use crate::{TgaError, TgaResult};
#[cfg(doc)] use crate::TgaError::*;


/// Byte order of a multi-byte integer in a stream
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endianness {
	/// Least significant byte first; the byte order of every TGA field.
	#[default]
	Little,
	/// Most significant byte first.
	Big,
}


/// Fixed-width reads on top of [`std::io::Read`], with errors mapped to
/// [`TgaError`]
pub trait ReadExt: Read {
	/// Read exactly `len` bytes into a new buffer.
	///
	/// # Errors
	/// - [`OutOfMemory`]: The buffer could not be allocated.
	/// - [`UnexpectedEof`]: Fewer than `len` bytes were available.
	/// - [`ReadError`]: Any other read error.
	fn read_exact_buffered(&mut self, len: usize) -> TgaResult<Vec<u8>> {
		let mut data: Vec<u8> = Vec::new();
		data.try_reserve_exact(len).map_err(|_| TgaError::OutOfMemory(len))?;
		data.resize(len, 0);
		self.read_exact(&mut data).map_err(TgaError::from_read)?;
		Ok(data)
	}


	/// Read a 16-bit unsigned integer in the given byte order.
	///
	/// # Errors
	/// - [`UnexpectedEof`]: Fewer than 2 bytes were available.
	/// - [`ReadError`]: Any other read error.
	fn read_u16_endian(&mut self, endianness: Endianness) -> TgaResult<u16> {
		match endianness {
			Endianness::Little => self.read_u16::<LittleEndian>(),
			Endianness::Big => self.read_u16::<BigEndian>(),
		}
		.map_err(TgaError::from_read)
	}


	/// Read a 32-bit unsigned integer in the given byte order.
	///
	/// # Errors
	/// - [`UnexpectedEof`]: Fewer than 4 bytes were available.
	/// - [`ReadError`]: Any other read error.
	fn read_u32_endian(&mut self, endianness: Endianness) -> TgaResult<u32> {
		match endianness {
			Endianness::Little => self.read_u32::<LittleEndian>(),
			Endianness::Big => self.read_u32::<BigEndian>(),
		}
		.map_err(TgaError::from_read)
	}


	/// Read a 64-bit unsigned integer in the given byte order.
	///
	/// # Errors
	/// - [`UnexpectedEof`]: Fewer than 8 bytes were available.
	/// - [`ReadError`]: Any other read error.
	fn read_u64_endian(&mut self, endianness: Endianness) -> TgaResult<u64> {
		match endianness {
			Endianness::Little => self.read_u64::<LittleEndian>(),
			Endianness::Big => self.read_u64::<BigEndian>(),
		}
		.map_err(TgaError::from_read)
	}
}


impl<T> ReadExt for T where T: Read + ?Sized {}


#[test]
fn test_read_exact_buffered() {
	let mut input = std::io::Cursor::new(vec![0x41u8, 0x42, 0x43, 0x44, 0x45, 0x46]);
	assert_eq!(input.read_exact_buffered(1).unwrap(), vec![0x41u8]);
	assert_eq!(input.read_exact_buffered(2).unwrap(), vec![0x42u8, 0x43]);
	assert!(input.read_exact_buffered(0).unwrap().is_empty());
	assert_eq!(input.read_exact_buffered(4), Err(TgaError::UnexpectedEof));
}


#[test]
fn test_read_endian() {
	let bytes = [0x01u8, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08];

	let mut input = std::io::Cursor::new(&bytes[..]);
	assert_eq!(input.read_u16_endian(Endianness::Little).unwrap(), 0x0201);
	assert_eq!(input.read_u16_endian(Endianness::Big).unwrap(), 0x0304);
	assert_eq!(input.read_u32_endian(Endianness::default()).unwrap(), 0x0807_0605);

	let mut input = std::io::Cursor::new(&bytes[..]);
	assert_eq!(input.read_u64_endian(Endianness::Big).unwrap(), 0x0102_0304_0506_0708);

	let mut input = std::io::Cursor::new(&bytes[..3]);
	assert_eq!(input.read_u32_endian(Endianness::Little), Err(TgaError::UnexpectedEof));
}
