use std::io::{Read, Seek, SeekFrom};

#[cfg(feature = "arbitrary")] use arbitrary::Arbitrary;
use deku::prelude::*;
use derive_more::Display;
use static_assertions::const_assert_eq;

use crate::{TgaResult, TgaError, ReadExt, Endianness};
use crate::format::bytes_per_pixel;
use crate::macros;
#[cfg(doc)] use crate::TgaError::*;


/// Size of the fixed TGA header in bytes.
pub const HEADER_SIZE: usize = 18;

/// Size of the version 2 footer in bytes.
pub const FOOTER_SIZE: usize = 26;

/// The meaningful part of the version 2 footer signature; it is followed by a
/// NUL byte in the file.
pub const FOOTER_SIGNATURE: &[u8; 17] = b"TRUEVISION-XFILE.";

const_assert_eq!(FOOTER_SIZE, 4 + 4 + FOOTER_SIGNATURE.len() + 1);


/// TGA image type, as stored in header byte 2
#[derive(Debug, Display, Default, Clone, Copy, PartialEq, Eq, Hash, DekuRead, DekuWrite)]
#[cfg_attr(feature = "arbitrary", derive(Arbitrary))]
#[deku(type = "u8")]
pub enum ImageType {
	/// No image data present.
	#[default]
	#[display(fmt = "no-data")]
	#[deku(id = "0")]
	NoData,
	/// Uncompressed, color-mapped (palette indices).
	#[display(fmt = "color-mapped")]
	#[deku(id = "1")]
	ColorMapped,
	/// Uncompressed, true-color.
	#[display(fmt = "truecolor")]
	#[deku(id = "2")]
	Truecolor,
	/// Uncompressed, black and white.
	#[display(fmt = "monochrome")]
	#[deku(id = "3")]
	Monochrome,
	/// Run-length encoded, color-mapped.
	#[display(fmt = "RLE color-mapped")]
	#[deku(id = "9")]
	EncodedColorMapped,
	/// Run-length encoded, true-color.
	#[display(fmt = "RLE truecolor")]
	#[deku(id = "10")]
	EncodedTruecolor,
	/// Run-length encoded, black and white.
	#[display(fmt = "RLE monochrome")]
	#[deku(id = "11")]
	EncodedMonochrome,
	/// Any other value; the raw byte is kept.
	#[display(fmt = "unknown type {}", _0)]
	#[deku(id_pat = "_")]
	Unknown(u8),
}


impl From<u8> for ImageType {
	fn from(id: u8) -> Self {
		use ImageType::*;

		match id {
			0 => NoData,
			1 => ColorMapped,
			2 => Truecolor,
			3 => Monochrome,
			9 => EncodedColorMapped,
			10 => EncodedTruecolor,
			11 => EncodedMonochrome,
			other => Unknown(other),
		}
	}
}


impl ImageType {
	/// The header byte for this type.
	pub const fn id(self) -> u8 {
		use ImageType::*;

		match self {
			NoData => 0,
			ColorMapped => 1,
			Truecolor => 2,
			Monochrome => 3,
			EncodedColorMapped => 9,
			EncodedTruecolor => 10,
			EncodedMonochrome => 11,
			Unknown(id) => id,
		}
	}


	/// Pixel data is run-length encoded.
	pub const fn is_encoded(self) -> bool {
		matches!(self, Self::EncodedColorMapped | Self::EncodedTruecolor | Self::EncodedMonochrome)
	}


	/// Pixels are palette indices.
	pub const fn is_color_mapped(self) -> bool {
		matches!(self, Self::ColorMapped | Self::EncodedColorMapped)
	}


	/// Pixels carry color channels directly.
	pub const fn is_truecolor(self) -> bool {
		matches!(self, Self::Truecolor | Self::EncodedTruecolor)
	}


	/// Pixels are grayscale intensities.
	pub const fn is_monochrome(self) -> bool {
		matches!(self, Self::Monochrome | Self::EncodedMonochrome)
	}


	/// The unencoded counterpart of this type; unencoded types map to
	/// themselves.
	pub const fn decoded(self) -> Self {
		match self {
			Self::EncodedColorMapped => Self::ColorMapped,
			Self::EncodedTruecolor => Self::Truecolor,
			Self::EncodedMonochrome => Self::Monochrome,
			other => other,
		}
	}


	/// The run-length encoded counterpart of this type, if there is one.
	pub const fn encoded(self) -> Option<Self> {
		match self {
			Self::ColorMapped | Self::EncodedColorMapped => Some(Self::EncodedColorMapped),
			Self::Truecolor | Self::EncodedTruecolor => Some(Self::EncodedTruecolor),
			Self::Monochrome | Self::EncodedMonochrome => Some(Self::EncodedMonochrome),
			Self::NoData | Self::Unknown(_) => None,
		}
	}
}


/// File format revision, detected from the footer signature
#[derive(Debug, Display, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TgaVersion {
	/// TGA 1.0; no footer.
	#[default]
	#[display(fmt = "1")]
	V1,
	/// TGA 2.0; the file ends with a signed footer.
	#[display(fmt = "2")]
	V2,
}


/// Corner of the screen pixel `(0, 0)` is displayed at, from image
/// descriptor bits 4 and 5
///
/// Stored pixel data is never reordered based on this value.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ImageOrigin {
	/// Bit 4: pixels run right to left.
	pub right_to_left: bool,
	/// Bit 5: scan lines run top to bottom.
	pub top_to_bottom: bool,
}


impl ImageOrigin {
	/// Mask of the origin bits in the image descriptor.
	pub const DESCRIPTOR_MASK: u8 = 0x30;
	const RIGHT_TO_LEFT: u8 = 0x10;
	const TOP_TO_BOTTOM: u8 = 0x20;


	/// Extract the origin from an image descriptor byte.
	pub const fn from_descriptor(descriptor: u8) -> Self {
		Self {
			right_to_left: descriptor & Self::RIGHT_TO_LEFT != 0,
			top_to_bottom: descriptor & Self::TOP_TO_BOTTOM != 0,
		}
	}


	/// The descriptor bits for this origin.
	pub const fn to_descriptor_bits(self) -> u8 {
		let mut bits = 0;
		if self.right_to_left {
			bits |= Self::RIGHT_TO_LEFT;
		};
		if self.top_to_bottom {
			bits |= Self::TOP_TO_BOTTOM;
		};
		bits
	}
}


/// The fixed 18-byte TGA header; multi-byte fields are little-endian
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, DekuRead, DekuWrite)]
#[cfg_attr(feature = "arbitrary", derive(Arbitrary))]
pub struct TgaHeader {
	/// Length of the ID field following the header.
	pub id_length: u8,
	/// 1 if a color map is included.
	pub color_map_type: u8,
	/// Kind of pixel data.
	pub image_type: ImageType,
	/// Offset of the color map, added to the end of the ID field.
	#[deku(endian = "little")]
	pub color_map_start: u16,
	/// Number of color map entries.
	#[deku(endian = "little")]
	pub color_map_length: u16,
	/// Bits per color map entry.
	pub color_map_depth: u8,
	/// Horizontal screen position of the lower left corner.
	#[deku(endian = "little")]
	pub x_offset: u16,
	/// Vertical screen position of the lower left corner.
	#[deku(endian = "little")]
	pub y_offset: u16,
	/// Width in pixels.
	#[deku(endian = "little")]
	pub width: u16,
	/// Height in pixels.
	#[deku(endian = "little")]
	pub height: u16,
	/// Bits per pixel.
	pub pixel_depth: u8,
	/// Attribute bit count (bits 0-3) and origin (bits 4-5).
	pub image_descriptor: u8,
}


impl TgaHeader {
	/// Mask of the attribute (alpha) bit count in the image descriptor.
	pub const ATTRIBUTE_BITS_MASK: u8 = 0x0F;


	/// Seek to the start of `input` and decode the header.
	///
	/// # Errors
	/// - [`UnexpectedIoError`]: Seeking failed.
	/// - [`UnexpectedEof`]: The stream is shorter than [`HEADER_SIZE`].
	/// - [`ReadError`]: Any other read error.
	/// - [`InvalidHeader`]: deku rejected the header bytes.
	pub fn read_from<R: Read + Seek>(input: &mut R) -> TgaResult<Self> {
		input.seek(SeekFrom::Start(0))?;
		let bytes = input.read_exact_buffered(HEADER_SIZE)?;
		let (_, header) = <Self as DekuContainerRead>::from_bytes((&bytes[..], 0))
			.map_err(|e| TgaError::InvalidHeader(e.to_string()))?;

		macros::log!(trace, "TgaHeader::read_from: {:?}", header);

		Ok(header)
	}


	/// Serialize into the 18-byte on-disk layout.
	///
	/// # Errors
	/// - [`Internal`]: deku failed to serialize the header.
	pub fn to_header_bytes(&self) -> TgaResult<Vec<u8>> {
		let bytes = <Self as DekuContainerWrite>::to_bytes(self)
			.map_err(|e| TgaError::Internal(format!("Could not serialize TGA header: {}", e)))?;
		debug_assert_eq!(bytes.len(), HEADER_SIZE);
		Ok(bytes)
	}


	/// Number of bytes per color map entry, `ceil(color_map_depth / 8)`.
	pub const fn color_map_entry_size(&self) -> usize {
		bytes_per_pixel(self.color_map_depth)
	}


	/// Size in bytes of the color map.
	pub const fn color_map_size(&self) -> usize {
		self.color_map_entry_size() * self.color_map_length as usize
	}


	/// Absolute stream offset of the color map.
	pub const fn color_map_offset(&self) -> u64 {
		HEADER_SIZE as u64 + self.id_length as u64 + self.color_map_start as u64
	}


	/// Absolute stream offset of the pixel data.
	pub const fn pixel_data_offset(&self) -> u64 {
		self.color_map_offset() + self.color_map_size() as u64
	}


	/// Number of attribute (alpha) bits per pixel.
	pub const fn attribute_bits(&self) -> u8 {
		self.image_descriptor & Self::ATTRIBUTE_BITS_MASK
	}


	/// Display origin of the first stored pixel.
	pub const fn origin(&self) -> ImageOrigin {
		ImageOrigin::from_descriptor(self.image_descriptor)
	}
}


/// Offsets stored in the TGA 2.0 footer
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TgaFooter {
	/// Absolute offset of the extension area, 0 if absent.
	pub extension_offset: u32,
	/// Absolute offset of the developer directory, 0 if absent.
	pub developer_offset: u32,
}


impl TgaFooter {
	/// Look for a signed footer in the last [`FOOTER_SIZE`] bytes of `input`.
	///
	/// Returns `Ok(None)` for version 1 files, including files too short to
	/// hold a footer.
	///
	/// # Errors
	/// - [`UnexpectedIoError`]: Seeking failed.
	/// - [`UnexpectedEof`], [`ReadError`]: Reading the footer failed.
	pub fn read_from<R: Read + Seek>(input: &mut R) -> TgaResult<Option<Self>> {
		let length = input.seek(SeekFrom::End(0))?;

		if length < FOOTER_SIZE as u64 {
			macros::log!(trace, "TgaFooter::read_from: {} byte stream has no room for a footer", length);
			return Ok(None);
		};

		input.seek(SeekFrom::Start(length - FOOTER_SIZE as u64))?;
		let extension_offset = input.read_u32_endian(Endianness::Little)?;
		let developer_offset = input.read_u32_endian(Endianness::Little)?;
		let signature = input.read_exact_buffered(FOOTER_SIZE - 8)?;

		if signature[..FOOTER_SIGNATURE.len()] != FOOTER_SIGNATURE[..] {
			macros::log!(trace, "TgaFooter::read_from: no signature, version 1");
			return Ok(None);
		};

		let footer = Self { extension_offset, developer_offset };
		macros::log!(trace, "TgaFooter::read_from: {:?}", footer);

		Ok(Some(footer))
	}
}


#[cfg(test)]
const RGB_HEADER: [u8; HEADER_SIZE] = [
	0x05, 0x00, 0x02,
	0x00, 0x00, 0x00, 0x00, 0x00,
	0x10, 0x00, 0x20, 0x00,
	0x40, 0x01, 0xC8, 0x00,
	0x18, 0x20,
];


#[test]
fn header_fields() {
	let (_, header) = TgaHeader::from_bytes((&RGB_HEADER, 0)).unwrap();

	assert_eq!(header.id_length, 5);
	assert_eq!(header.image_type, ImageType::Truecolor);
	assert_eq!(header.x_offset, 16);
	assert_eq!(header.y_offset, 32);
	assert_eq!(header.width, 320);
	assert_eq!(header.height, 200);
	assert_eq!(header.pixel_depth, 24);
	assert_eq!(header.attribute_bits(), 0);
	assert_eq!(header.origin(), ImageOrigin { right_to_left: false, top_to_bottom: true });
	assert_eq!(header.pixel_data_offset(), 23);
	assert_eq!(header.to_header_bytes().unwrap(), RGB_HEADER.to_vec());
}


#[test]
fn header_color_map_offsets() {
	let header = TgaHeader {
		id_length: 3,
		color_map_type: 1,
		image_type: ImageType::ColorMapped,
		color_map_start: 2,
		color_map_length: 16,
		color_map_depth: 15,
		pixel_depth: 8,
		..TgaHeader::default()
	};

	assert_eq!(header.color_map_entry_size(), 2);
	assert_eq!(header.color_map_size(), 32);
	assert_eq!(header.color_map_offset(), 23);
	assert_eq!(header.pixel_data_offset(), 55);
}


#[test]
fn unknown_image_type_is_kept() {
	let mut bytes = RGB_HEADER;
	bytes[2] = 0x2A;
	let (_, header) = TgaHeader::from_bytes((&bytes, 0)).unwrap();
	assert_eq!(header.image_type, ImageType::Unknown(0x2A));
	assert_eq!(header.to_header_bytes().unwrap(), bytes.to_vec());
}


#[test]
fn image_type_ids() {
	for id in 0..=u8::MAX {
		assert_eq!(ImageType::from(id).id(), id);
	};

	assert_eq!(ImageType::EncodedTruecolor.decoded(), ImageType::Truecolor);
	assert_eq!(ImageType::Monochrome.encoded(), Some(ImageType::EncodedMonochrome));
	assert_eq!(ImageType::NoData.encoded(), None);
}


#[test]
fn footer_detection() {
	let mut file = RGB_HEADER.to_vec();
	file.extend([0x78, 0x56, 0x34, 0x12, 0x01, 0x00, 0x00, 0x00]);
	file.extend(FOOTER_SIGNATURE);
	file.push(0);

	let footer = TgaFooter::read_from(&mut std::io::Cursor::new(&file)).unwrap();
	assert_eq!(footer, Some(TgaFooter { extension_offset: 0x1234_5678, developer_offset: 1 }));

	let last = file.len() - 2;
	file[last] = b',';
	assert_eq!(TgaFooter::read_from(&mut std::io::Cursor::new(&file)).unwrap(), None);

	assert_eq!(TgaFooter::read_from(&mut std::io::Cursor::new(&RGB_HEADER)).unwrap(), None);
}
