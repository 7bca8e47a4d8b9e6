#![warn(missing_docs, unreachable_pub, clippy::all)]
#![allow(clippy::wildcard_imports, clippy::enum_glob_use)]
#![warn(clippy::missing_errors_doc, clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]


#![doc = include_str!("../README.md")]


mod macros;
mod stream;
mod format;
mod pixel;
mod header;
mod tga;
mod decode;
mod access;
mod encode;
mod convert;

pub use stream::{Endianness, ReadExt};
pub use format::*;
pub use pixel::PixelValue;
pub use header::*;
pub use tga::*;
pub use encode::*;


use derive_more::{Display, Error};
#[cfg(test)] use static_assertions::assert_impl_all;

use TgaError::*;


/// [`std::result::Result`] parameterized with [`TgaError`]
pub type TgaResult<T> = Result<T, TgaError>;


/// `tga`'s [`std::error::Error`]
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum TgaError {
	/// A function that reads from [`std::io::Read`] encountered early EOF.
	#[display(fmt = "Unexpected end of input file")]
	UnexpectedEof,

	/// Unexpected I/O error outside of reading or writing image data, e.g.
	/// while seeking.
	#[display(fmt = "Unexpected I/O error: {}", _0)]
	UnexpectedIoError(#[error(ignore)] std::io::ErrorKind),

	/// Reading image data failed with something other than early EOF.
	#[display(fmt = "Read error: {}", _0)]
	ReadError(#[error(ignore)] std::io::ErrorKind),

	/// A function that writes to [`std::io::Write`] encountered an I/O error.
	#[display(fmt = "Write error: {}", _0)]
	WriteError(#[error(ignore)] std::io::ErrorKind),

	/// Could not allocate a buffer of the given size.
	#[display(fmt = "Out of memory while allocating {} bytes", _0)]
	OutOfMemory(#[error(ignore)] usize),

	/// [`TgaImage::save`] was given an empty path.
	#[display(fmt = "Invalid file name")]
	InvalidFilename,

	/// The 18-byte header could not be decoded.
	#[display(fmt = "Invalid TGA header: {}", _0)]
	InvalidHeader(#[error(ignore)] String),

	/// A color-mapped image declared a color map of zero bytes.
	#[display(fmt = "Color-mapped image has an empty color map")]
	EmptyColorMap,

	/// A run-length packet would write past the end of the pixel buffer.
	#[display(fmt = "Run-length packet overruns the pixel buffer at scan line {}", line)]
	CorruptRleData {
		/// Scan line the offending packet starts on.
		line: usize,
	},

	/// The image has no pixel buffer where one is required.
	#[display(fmt = "Image has no pixel data")]
	MissingPixelData,

	/// The pixel buffer does not match `width * height * bytes_per_pixel`.
	#[display(fmt = "Pixel data is {} bytes long, expected {}", actual, expected)]
	PixelDataSizeMismatch {
		/// Size computed from the header.
		expected: usize,
		/// Size of the buffer.
		actual: usize,
	},

	/// The operation is valid TGA but is not implemented by this crate.
	#[display(fmt = "Unsupported: {}", _0)]
	Unsupported(#[error(ignore)] String),

	/// Accessed a channel the image's pixel layout does not have.
	#[display(fmt = "No {} channel in {}-bit {} images", channel, pixel_depth, image_type)]
	TypeMismatch {
		/// Requested channel.
		channel: Channel,
		/// Type of the accessed image.
		image_type: ImageType,
		/// Bits per pixel of the accessed image.
		pixel_depth: u8,
	},

	/// Pixel coordinates (or a rectangle) outside of the image.
	#[display(fmt = "Pixel ({}, {}) is outside of a {}x{} image", x, y, width, height)]
	OutOfBounds {
		/// Requested column.
		x: u32,
		/// Requested row.
		y: u32,
		/// Image width.
		width: u16,
		/// Image height.
		height: u16,
	},

	/// An argument other than a coordinate was rejected.
	#[display(fmt = "Invalid argument: {}", _0)]
	InvalidArgument(#[error(ignore)] String),

	/// A state which should not be reachable; please report it.
	#[display(fmt = "Internal error: {}", _0)]
	Internal(#[error(ignore)] String),
}


/// Broad classification of a [`TgaError`]
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TgaErrorKind {
	/// The image lacks data or has inconsistent sizes.
	#[display(fmt = "invalid image")]
	InvalidImage,
	/// An allocation failed.
	#[display(fmt = "out of memory")]
	OutOfMemory,
	/// Generic I/O failure.
	#[display(fmt = "I/O error")]
	Io,
	/// Reading failed.
	#[display(fmt = "read error")]
	Read,
	/// Writing failed.
	#[display(fmt = "write error")]
	Write,
	/// Bad output path.
	#[display(fmt = "invalid file name")]
	InvalidFilename,
	/// Not implemented.
	#[display(fmt = "unsupported")]
	Unsupported,
	/// Channel access on the wrong kind of image.
	#[display(fmt = "type mismatch")]
	TypeMismatch,
	/// Rejected argument.
	#[display(fmt = "invalid argument")]
	InvalidArgument,
	/// Malformed file contents.
	#[display(fmt = "invalid data")]
	InvalidData,
	/// Broken internal invariant.
	#[display(fmt = "internal error")]
	Internal,
}


impl TgaError {
	/// Classify this error.
	pub fn kind(&self) -> TgaErrorKind {
		match self {
			MissingPixelData | PixelDataSizeMismatch { .. } => TgaErrorKind::InvalidImage,
			OutOfMemory(_) => TgaErrorKind::OutOfMemory,
			UnexpectedIoError(_) => TgaErrorKind::Io,
			UnexpectedEof | ReadError(_) => TgaErrorKind::Read,
			WriteError(_) => TgaErrorKind::Write,
			InvalidFilename => TgaErrorKind::InvalidFilename,
			Unsupported(_) => TgaErrorKind::Unsupported,
			TypeMismatch { .. } => TgaErrorKind::TypeMismatch,
			OutOfBounds { .. } | InvalidArgument(_) => TgaErrorKind::InvalidArgument,
			InvalidHeader(_) | EmptyColorMap | CorruptRleData { .. } => TgaErrorKind::InvalidData,
			Internal(_) => TgaErrorKind::Internal,
		}
	}


	/// Whether the input was valid but uses a feature this crate does not
	/// implement, as opposed to being corrupt or unreadable.
	pub fn is_unsupported(&self) -> bool {
		self.kind() == TgaErrorKind::Unsupported
	}


	pub(crate) fn from_read(error: std::io::Error) -> Self {
		match error.kind() {
			std::io::ErrorKind::UnexpectedEof => UnexpectedEof,
			kind => ReadError(kind),
		}
	}


	pub(crate) fn from_write(error: std::io::Error) -> Self {
		WriteError(error.kind())
	}
}


impl From<std::io::Error> for TgaError {
	fn from(error: std::io::Error) -> Self {
		match error.kind() {
			std::io::ErrorKind::UnexpectedEof => UnexpectedEof,
			kind => UnexpectedIoError(kind),
		}
	}
}


#[test]
fn io_error_mapping() {
	use std::io::{Error, ErrorKind};

	assert_eq!(TgaError::from(Error::from(ErrorKind::UnexpectedEof)), UnexpectedEof);
	assert_eq!(TgaError::from(Error::from(ErrorKind::NotFound)), UnexpectedIoError(ErrorKind::NotFound));
	assert_eq!(TgaError::from_read(Error::from(ErrorKind::UnexpectedEof)), UnexpectedEof);
	assert_eq!(TgaError::from_read(Error::from(ErrorKind::Interrupted)), ReadError(ErrorKind::Interrupted));
	assert_eq!(TgaError::from_write(Error::from(ErrorKind::WriteZero)), WriteError(ErrorKind::WriteZero));
}


#[test]
fn error_kinds() {
	assert_eq!(UnexpectedEof.kind(), TgaErrorKind::Read);
	assert_eq!(EmptyColorMap.kind(), TgaErrorKind::InvalidData);
	assert_eq!(OutOfBounds { x: 8, y: 0, width: 8, height: 8 }.kind(), TgaErrorKind::InvalidArgument);
	assert!(Unsupported("RLE color-mapped images".into()).is_unsupported());
	assert!(!ReadError(std::io::ErrorKind::Other).is_unsupported());
}


#[test]
fn assert_traits() {
	use std::fmt::{Debug, Display};
	use std::error::Error;
	use std::panic::{UnwindSafe, RefUnwindSafe};

	assert_impl_all!(TgaError: Debug, Display, Error, Send, Sync, UnwindSafe, RefUnwindSafe);
	assert_impl_all!(TgaImage: Debug, Clone, Send, Sync);
}
