use crate::{TgaResult, TgaError, Channel};

use deku::{prelude::*, DekuContainerRead, DekuContainerWrite};
use tap::prelude::*;


/// Pixel with up to four bit-packed channels, laid out as in a TGA file.
#[allow(clippy::cast_possible_truncation)]
pub(crate) trait PackedPixel: for<'a> DekuContainerRead<'a> + DekuContainerWrite + Sized {
	const ALPHA_WIDTH: u8;
	const COLOR_WIDTH: u8;
	/// deku reads bit fields MSB-first; little-endian packed words are
	/// reversed before and after.
	const NEEDS_LE_BYTES: bool;

	fn a(&self) -> u8;
	fn r(&self) -> u8;
	fn g(&self) -> u8;
	fn b(&self) -> u8;
	/// Channels must already fit their widths.
	fn from_rgba(rgba: [u8; 4]) -> Self;


	const PIXEL_WIDTH: usize = Self::ALPHA_WIDTH as usize + (Self::COLOR_WIDTH as usize) * 3;
	const PIXEL_WIDTH_BYTES: usize = (Self::PIXEL_WIDTH + 7) / 8;


	fn uint_range(width: u8) -> u8 { (2u16.pow(width.into()) - 1) as u8 }
	fn alpha_range() -> u8 { Self::uint_range(Self::ALPHA_WIDTH) }
	fn color_range() -> u8 { Self::uint_range(Self::COLOR_WIDTH) }


	fn from_data(data: &[u8]) -> TgaResult<Self> {
		let data = data.get(0..Self::PIXEL_WIDTH_BYTES)
			.ok_or_else(|| TgaError::Internal(format!("Pixel needs {} bytes, got {}", Self::PIXEL_WIDTH_BYTES, data.len())))?
			.to_owned()
			.tap_mut(|d| if Self::NEEDS_LE_BYTES { d.reverse() });

		let (_, result) = <Self as DekuContainerRead>::from_bytes((&data[..], 0))
			.map_err(|e| TgaError::Internal(format!("Could not unpack pixel: {}", e)))?;
		Ok(result)
	}


	fn to_data(&self) -> TgaResult<Vec<u8>> {
		let result = <Self as DekuContainerWrite>::to_bytes(self)
			.map_err(|e| TgaError::Internal(format!("Could not pack pixel: {}", e)))?
			.tap_mut(|d| if Self::NEEDS_LE_BYTES { d.reverse() });

		Ok(result)
	}


	/// Clamp 8-bit inputs into the channel widths: colors saturate, a 1-bit
	/// alpha is set by any nonzero input.
	fn from_rgba_clamped(rgba: [u8; 4]) -> Self {
		let [r, g, b, a] = rgba;
		let clamp_color = |v: u8| v.min(Self::color_range());
		let a = match Self::ALPHA_WIDTH {
			0 => 0,
			1 => u8::from(a != 0),
			_ => a.min(Self::alpha_range()),
		};
		Self::from_rgba([clamp_color(r), clamp_color(g), clamp_color(b), a])
	}


	fn channel(&self, channel: Channel) -> Option<u8> {
		match channel {
			Channel::Red => Some(self.r()),
			Channel::Green => Some(self.g()),
			Channel::Blue => Some(self.b()),
			Channel::Alpha => Some(self.a()),
			Channel::Mono => None,
		}
	}


	/// `None` if the channel does not exist in this layout.
	fn with_channel(&self, channel: Channel, value: u8) -> Option<Self> {
		let mut rgba = [self.r(), self.g(), self.b(), self.a()];

		match channel {
			Channel::Red => rgba[0] = value,
			Channel::Green => rgba[1] = value,
			Channel::Blue => rgba[2] = value,
			Channel::Alpha if Self::ALPHA_WIDTH > 0 => rgba[3] = value,
			Channel::Alpha | Channel::Mono => return None,
		};

		Some(Self::from_rgba_clamped(rgba))
	}


	fn convert_u8(value: u8, from_width: u8, into_width: u8) -> u8 {
		if from_width == 0 {
			return Self::uint_range(into_width);
		};

		let range_from = Self::uint_range(from_width) as u16;
		let range_into = Self::uint_range(into_width) as u16;
		let bias = range_from / 2; // needed for symmetry
		(((value as u16) * range_into + bias) / range_from) as u8
	}


	/// Widen to 8 bits per channel; a missing alpha channel is opaque.
	fn into_rgba8(self) -> image::Rgba<u8> {
		let r = Self::convert_u8(self.r(), Self::COLOR_WIDTH, 8);
		let g = Self::convert_u8(self.g(), Self::COLOR_WIDTH, 8);
		let b = Self::convert_u8(self.b(), Self::COLOR_WIDTH, 8);
		let a = Self::convert_u8(self.a(), Self::ALPHA_WIDTH, 8);
		image::Rgba::<u8>([r, g, b, a])
	}


	/// Narrow from 8 bits per channel.
	fn from_rgba8(rgba8: &image::Rgba<u8>) -> Self {
		let r = Self::convert_u8(rgba8.0[0], 8, Self::COLOR_WIDTH);
		let g = Self::convert_u8(rgba8.0[1], 8, Self::COLOR_WIDTH);
		let b = Self::convert_u8(rgba8.0[2], 8, Self::COLOR_WIDTH);
		let a = if Self::ALPHA_WIDTH == 0 { 0 } else { Self::convert_u8(rgba8.0[3], 8, Self::ALPHA_WIDTH) };
		Self::from_rgba([r, g, b, a])
	}
}


/// 16-bit pixel: `byte0 = GGGBBBBB`, `byte1 = ARRRRRGG`
#[derive(Debug, Clone, Copy, PartialEq, Eq, DekuRead, DekuWrite)]
pub(crate) struct Argb1555Pixel {
	#[deku(bits = "1")]
	a: u8,
	#[deku(bits = "5")]
	r: u8,
	#[deku(bits = "5")]
	g: u8,
	#[deku(bits = "5")]
	b: u8,
}


impl PackedPixel for Argb1555Pixel {
	const ALPHA_WIDTH: u8 = 1;
	const COLOR_WIDTH: u8 = 5;
	const NEEDS_LE_BYTES: bool = true;

	fn a(&self) -> u8 { self.a }
	fn r(&self) -> u8 { self.r }
	fn g(&self) -> u8 { self.g }
	fn b(&self) -> u8 { self.b }


	fn from_rgba(rgba: [u8; 4]) -> Self {
		let [r, g, b, a] = rgba;
		Self { a, r, g, b }
	}
}


/// 24-bit pixel stored as `[B, G, R]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, DekuRead, DekuWrite)]
pub(crate) struct Bgr888Pixel {
	b: u8,
	g: u8,
	r: u8,
}


impl PackedPixel for Bgr888Pixel {
	const ALPHA_WIDTH: u8 = 0;
	const COLOR_WIDTH: u8 = 8;
	const NEEDS_LE_BYTES: bool = false;

	fn a(&self) -> u8 { 0 }
	fn r(&self) -> u8 { self.r }
	fn g(&self) -> u8 { self.g }
	fn b(&self) -> u8 { self.b }


	fn from_rgba(rgba: [u8; 4]) -> Self {
		let [r, g, b, _] = rgba;
		Self { b, g, r }
	}
}


/// 32-bit pixel stored as `[B, G, R, A]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, DekuRead, DekuWrite)]
pub(crate) struct Bgra8888Pixel {
	b: u8,
	g: u8,
	r: u8,
	a: u8,
}


impl PackedPixel for Bgra8888Pixel {
	const ALPHA_WIDTH: u8 = 8;
	const COLOR_WIDTH: u8 = 8;
	const NEEDS_LE_BYTES: bool = false;

	fn a(&self) -> u8 { self.a }
	fn r(&self) -> u8 { self.r }
	fn g(&self) -> u8 { self.g }
	fn b(&self) -> u8 { self.b }


	fn from_rgba(rgba: [u8; 4]) -> Self {
		let [r, g, b, a] = rgba;
		Self { b, g, r, a }
	}
}


/// A packed pixel of 1 to 4 bytes, as built by
/// [`TgaImage::make_pixel`][crate::TgaImage::make_pixel]
///
/// Dereferences to the packed bytes, ready for
/// [`TgaImage::set_pixel`][crate::TgaImage::set_pixel] or
/// [`TgaImage::set_pixel_block`][crate::TgaImage::set_pixel_block].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PixelValue {
	bytes: [u8; 4],
	len: usize,
}


impl PixelValue {
	pub(crate) fn from_slice(data: &[u8]) -> TgaResult<Self> {
		let mut bytes = [0u8; 4];
		bytes.get_mut(..data.len())
			.ok_or_else(|| TgaError::Internal(format!("{}-byte pixel does not fit a PixelValue", data.len())))?
			.copy_from_slice(data);
		Ok(Self { bytes, len: data.len() })
	}


	/// The packed bytes.
	pub fn as_bytes(&self) -> &[u8] {
		&self.bytes[..self.len]
	}
}


impl std::ops::Deref for PixelValue {
	type Target = [u8];

	fn deref(&self) -> &[u8] {
		self.as_bytes()
	}
}


impl AsRef<[u8]> for PixelValue {
	fn as_ref(&self) -> &[u8] {
		self.as_bytes()
	}
}


#[test]
fn argb1555pixel_bytes() {
	let pixel = Argb1555Pixel::from_data(&[0x12, 0xB4]).unwrap();
	assert_eq!((pixel.a(), pixel.r(), pixel.g(), pixel.b()), (1, 0x0D, 0x00, 0x12));
	assert_eq!(pixel.to_data().unwrap(), vec![0x12, 0xB4]);

	// byte0 = GGGBBBBB, byte1 = ARRRRRGG
	let green = Argb1555Pixel::from_rgba([0, 0b11001, 0, 0]);
	assert_eq!(green.to_data().unwrap(), vec![0b0010_0000, 0b0000_0011]);

	let purple_rgba = image::Rgba([0x6B, 0x00, 0x94, 0xFF]);
	assert_eq!(Argb1555Pixel::from_rgba8(&purple_rgba).to_data().unwrap(), vec![0x12, 0xB4]);
	assert_eq!(pixel.into_rgba8(), purple_rgba);
}


#[test]
fn argb1555pixel_clamping() {
	let pixel = Argb1555Pixel::from_rgba_clamped([200, 31, 32, 7]);
	assert_eq!((pixel.r(), pixel.g(), pixel.b(), pixel.a()), (31, 31, 31, 1));

	let pixel = pixel.with_channel(Channel::Alpha, 0).unwrap();
	assert_eq!(pixel.a(), 0);
	assert_eq!(pixel.with_channel(Channel::Mono, 1), None);
}


#[test]
fn bgr888pixel_has_no_alpha() {
	let pixel = Bgr888Pixel::from_data(&[0x10, 0x20, 0x30]).unwrap();
	assert_eq!(pixel.channel(Channel::Red), Some(0x30));
	assert_eq!(pixel.channel(Channel::Blue), Some(0x10));
	assert_eq!(pixel.channel(Channel::Alpha), Some(0));
	assert_eq!(pixel.with_channel(Channel::Alpha, 0xFF), None);
	assert_eq!(pixel.into_rgba8(), image::Rgba([0x30, 0x20, 0x10, 0xFF]));
}


#[test]
fn bgra8888pixel_bytes() {
	let pixel = Bgra8888Pixel::from_rgba([1, 2, 3, 4]);
	assert_eq!(pixel.to_data().unwrap(), vec![3, 2, 1, 4]);
	assert_eq!(Bgra8888Pixel::from_data(&[3, 2, 1, 4, 0xAA]).unwrap(), pixel);
}


#[test]
fn pixel_value_bytes() {
	let value = PixelValue::from_slice(&[1, 2, 3]).unwrap();
	assert_eq!(&*value, &[1, 2, 3]);
	assert!(PixelValue::from_slice(&[0; 5]).is_err());
}
