use derive_more::Display;
use static_assertions::const_assert;

use crate::ImageType;


/// Number of bytes occupied by a pixel of `pixel_depth` bits,
/// `ceil(pixel_depth / 8)`.
pub const fn bytes_per_pixel(pixel_depth: u8) -> usize {
	(pixel_depth as usize + 7) / 8
}


/// Size in bytes of a `width`x`height` pixel buffer, or `None` if it does not
/// fit in a `usize`.
pub const fn pixel_buffer_len(width: u16, height: u16, pixel_depth: u8) -> Option<usize> {
	let pixels = match (width as usize).checked_mul(height as usize) {
		Some(p) => p,
		None => return None,
	};

	pixels.checked_mul(bytes_per_pixel(pixel_depth))
}

// 65535 * 65535 pixels must at least be countable.
const_assert!(usize::BITS >= 32);


/// A logical pixel channel
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
	/// Red.
	#[display(fmt = "red")]
	Red,
	/// Green.
	#[display(fmt = "green")]
	Green,
	/// Blue.
	#[display(fmt = "blue")]
	Blue,
	/// Alpha (attribute bits).
	#[display(fmt = "alpha")]
	Alpha,
	/// Monochrome intensity.
	#[display(fmt = "mono")]
	Mono,
}


/// Channel packing of a pixel, as determined by image type and pixel depth
///
/// | Layout | Depth | Bytes |
/// |---|---|---|
/// | [`Mono8`][Self::Mono8] | 8 | `[I]` |
/// | [`Argb1555`][Self::Argb1555] | 15, 16 | `[GGGBBBBB, ARRRRRGG]` |
/// | [`Bgr888`][Self::Bgr888] | 24 | `[B, G, R]` |
/// | [`Bgra8888`][Self::Bgra8888] | 32 | `[B, G, R, A]` |
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelLayout {
	/// 8-bit monochrome intensity.
	#[display(fmt = "8-bit monochrome")]
	Mono8,
	/// 16-bit, 5 bits per color and a 1-bit alpha.
	#[display(fmt = "16-bit ARGB1555")]
	Argb1555,
	/// 24-bit, no alpha.
	#[display(fmt = "24-bit BGR")]
	Bgr888,
	/// 32-bit with an 8-bit alpha.
	#[display(fmt = "32-bit BGRA")]
	Bgra8888,
}


impl PixelLayout {
	/// Look up the layout of pixels with the given depth and image type.
	///
	/// Returns `None` for pairs without channel access, e.g. color-mapped
	/// images or unusual depths.
	pub const fn lookup(pixel_depth: u8, image_type: ImageType) -> Option<Self> {
		if image_type.is_monochrome() {
			return match pixel_depth {
				8 => Some(Self::Mono8),
				_ => None,
			};
		};

		if image_type.is_truecolor() {
			return match pixel_depth {
				15 | 16 => Some(Self::Argb1555),
				24 => Some(Self::Bgr888),
				32 => Some(Self::Bgra8888),
				_ => None,
			};
		};

		None
	}


	/// Bits per pixel written to the header for this layout.
	pub const fn pixel_depth(self) -> u8 {
		match self {
			Self::Mono8 => 8,
			Self::Argb1555 => 16,
			Self::Bgr888 => 24,
			Self::Bgra8888 => 32,
		}
	}


	/// Bytes per pixel.
	pub const fn bytes_per_pixel(self) -> usize {
		bytes_per_pixel(self.pixel_depth())
	}


	/// Uncompressed image type for this layout.
	pub const fn image_type(self) -> ImageType {
		match self {
			Self::Mono8 => ImageType::Monochrome,
			_ => ImageType::Truecolor,
		}
	}


	/// Number of alpha bits, stored in the image descriptor.
	pub const fn attribute_bits(self) -> u8 {
		match self {
			Self::Mono8 | Self::Bgr888 => 0,
			Self::Argb1555 => 1,
			Self::Bgra8888 => 8,
		}
	}


	/// Whether `channel` can be read from pixels of this layout.
	pub const fn has_channel(self, channel: Channel) -> bool {
		match self {
			Self::Mono8 => matches!(channel, Channel::Mono),
			_ => !matches!(channel, Channel::Mono),
		}
	}


	/// [`image::ColorType`] of the generic image this layout converts into.
	pub const fn color_type(self) -> image::ColorType {
		match self {
			Self::Mono8 => image::ColorType::L8,
			Self::Bgr888 => image::ColorType::Rgb8,
			Self::Argb1555 | Self::Bgra8888 => image::ColorType::Rgba8,
		}
	}
}


#[test]
fn buffer_sizes() {
	assert_eq!(bytes_per_pixel(0), 0);
	assert_eq!(bytes_per_pixel(8), 1);
	assert_eq!(bytes_per_pixel(15), 2);
	assert_eq!(bytes_per_pixel(16), 2);
	assert_eq!(bytes_per_pixel(24), 3);
	assert_eq!(bytes_per_pixel(32), 4);
	assert_eq!(pixel_buffer_len(8, 8, 24), Some(192));
	assert_eq!(pixel_buffer_len(0, 100, 32), Some(0));
	assert_eq!(pixel_buffer_len(u16::MAX, u16::MAX, 32), (u16::MAX as usize).checked_pow(2).and_then(|p| p.checked_mul(4)));
}


#[test]
fn layout_lookup() {
	use ImageType::*;

	assert_eq!(PixelLayout::lookup(8, Monochrome), Some(PixelLayout::Mono8));
	assert_eq!(PixelLayout::lookup(8, EncodedMonochrome), Some(PixelLayout::Mono8));
	assert_eq!(PixelLayout::lookup(16, Monochrome), None);
	assert_eq!(PixelLayout::lookup(8, Truecolor), None);
	assert_eq!(PixelLayout::lookup(15, Truecolor), Some(PixelLayout::Argb1555));
	assert_eq!(PixelLayout::lookup(24, EncodedTruecolor), Some(PixelLayout::Bgr888));
	assert_eq!(PixelLayout::lookup(32, Truecolor), Some(PixelLayout::Bgra8888));
	assert_eq!(PixelLayout::lookup(8, ColorMapped), None);
	assert_eq!(PixelLayout::lookup(24, Unknown(42)), None);

	assert!(PixelLayout::Mono8.has_channel(Channel::Mono));
	assert!(!PixelLayout::Mono8.has_channel(Channel::Red));
	assert!(PixelLayout::Bgr888.has_channel(Channel::Alpha));
	assert!(!PixelLayout::Bgra8888.has_channel(Channel::Mono));
}
