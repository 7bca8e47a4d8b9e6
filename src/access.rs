use std::ops::Range;

use crate::{TgaResult, TgaImage, PixelLayout, Channel};
use crate::TgaError::*;
use crate::pixel::{PackedPixel, PixelValue, Argb1555Pixel, Bgr888Pixel, Bgra8888Pixel};
use crate::macros::bail;


impl TgaImage {
	/// Byte range of pixel `(x, y)` in the pixel buffer,
	/// `(y * width + x) * bytes_per_pixel` onwards.
	///
	/// # Errors
	/// - [`OutOfBounds`]: `x >= width` or `y >= height`.
	/// - [`MissingPixelData`]: The image has no pixel buffer.
	pub fn pixel_range(&self, x: u16, y: u16) -> TgaResult<Range<usize>> {
		let (width, height) = (self.header.width, self.header.height);

		if x >= width || y >= height {
			bail!(OutOfBounds { x: x.into(), y: y.into(), width, height });
		};

		let data_len = self.data.as_ref().map(Vec::len).ok_or(MissingPixelData)?;
		let bpp = self.bytes_per_pixel();
		let start = (usize::from(y) * usize::from(width) + usize::from(x)) * bpp;
		let range = start..start + bpp;

		if range.end > data_len {
			bail!(PixelDataSizeMismatch { expected: self.expected_data_len()?, actual: data_len });
		};

		Ok(range)
	}


	/// Raw bytes of pixel `(x, y)`.
	///
	/// # Errors
	/// See [`pixel_range`][Self::pixel_range].
	pub fn pixel(&self, x: u16, y: u16) -> TgaResult<&[u8]> {
		let range = self.pixel_range(x, y)?;
		let data = self.data.as_deref().ok_or(MissingPixelData)?;
		Ok(&data[range])
	}


	/// Overwrite pixel `(x, y)` with already packed bytes.
	///
	/// # Errors
	/// - [`InvalidArgument`]: `pixel` is not [`bytes_per_pixel`][Self::bytes_per_pixel] long.
	/// - see [`pixel_range`][Self::pixel_range].
	pub fn set_pixel(&mut self, x: u16, y: u16, pixel: &[u8]) -> TgaResult<()> {
		let range = self.pixel_range(x, y)?;
		self.check_pixel_len(pixel)?;
		let data = self.data.as_deref_mut().ok_or(MissingPixelData)?;
		data[range].copy_from_slice(pixel);
		Ok(())
	}


	/// Read one channel of pixel `(x, y)`.
	///
	/// Channels are returned at their stored width: 5 bits for 16-bit
	/// images, 8 bits otherwise.  Alpha of 24-bit pixels reads as 0.
	///
	/// # Errors
	/// - [`OutOfBounds`], [`MissingPixelData`]: see [`pixel_range`][Self::pixel_range].
	/// - [`TypeMismatch`]: The image has no such channel, e.g. red on a
	///   monochrome image or mono on a color image.
	pub fn channel(&self, x: u16, y: u16, channel: Channel) -> TgaResult<u8> {
		let range = self.pixel_range(x, y)?;
		let layout = self.channel_layout(channel)?;
		let data = self.data.as_deref().ok_or(MissingPixelData)?;
		let bytes = &data[range];

		match layout {
			PixelLayout::Mono8 => Ok(bytes[0]),
			PixelLayout::Argb1555 => read_packed::<Argb1555Pixel>(bytes, channel),
			PixelLayout::Bgr888 => read_packed::<Bgr888Pixel>(bytes, channel),
			PixelLayout::Bgra8888 => read_packed::<Bgra8888Pixel>(bytes, channel),
		}
	}


	/// Write one channel of pixel `(x, y)`, leaving the others untouched.
	///
	/// 16-bit colors are clamped to 31 and any nonzero alpha sets the alpha
	/// bit.
	///
	/// # Errors
	/// - [`OutOfBounds`], [`MissingPixelData`]: see [`pixel_range`][Self::pixel_range].
	/// - [`TypeMismatch`]: The image has no such channel.
	/// - [`Unsupported`]: Writing alpha to a 24-bit image.
	pub fn set_channel(&mut self, x: u16, y: u16, channel: Channel, value: u8) -> TgaResult<()> {
		let range = self.pixel_range(x, y)?;
		let layout = self.channel_layout(channel)?;
		let data = self.data.as_deref_mut().ok_or(MissingPixelData)?;
		let bytes = &mut data[range];

		let packed = match layout {
			PixelLayout::Mono8 => PixelValue::from_slice(&[value])?,
			PixelLayout::Argb1555 => write_packed::<Argb1555Pixel>(bytes, layout, channel, value)?,
			PixelLayout::Bgr888 => write_packed::<Bgr888Pixel>(bytes, layout, channel, value)?,
			PixelLayout::Bgra8888 => write_packed::<Bgra8888Pixel>(bytes, layout, channel, value)?,
		};

		bytes.copy_from_slice(&packed);
		Ok(())
	}


	/// Red channel of pixel `(x, y)`, see [`channel`][Self::channel].
	///
	/// # Errors
	/// See [`channel`][Self::channel].
	pub fn red(&self, x: u16, y: u16) -> TgaResult<u8> { self.channel(x, y, Channel::Red) }

	/// Green channel of pixel `(x, y)`, see [`channel`][Self::channel].
	///
	/// # Errors
	/// See [`channel`][Self::channel].
	pub fn green(&self, x: u16, y: u16) -> TgaResult<u8> { self.channel(x, y, Channel::Green) }

	/// Blue channel of pixel `(x, y)`, see [`channel`][Self::channel].
	///
	/// # Errors
	/// See [`channel`][Self::channel].
	pub fn blue(&self, x: u16, y: u16) -> TgaResult<u8> { self.channel(x, y, Channel::Blue) }

	/// Alpha channel of pixel `(x, y)`, see [`channel`][Self::channel].
	///
	/// # Errors
	/// See [`channel`][Self::channel].
	pub fn alpha(&self, x: u16, y: u16) -> TgaResult<u8> { self.channel(x, y, Channel::Alpha) }

	/// Intensity of pixel `(x, y)` of an 8-bit monochrome image.
	///
	/// # Errors
	/// See [`channel`][Self::channel].
	pub fn mono(&self, x: u16, y: u16) -> TgaResult<u8> { self.channel(x, y, Channel::Mono) }

	/// # Errors
	/// See [`set_channel`][Self::set_channel].
	pub fn set_red(&mut self, x: u16, y: u16, value: u8) -> TgaResult<()> { self.set_channel(x, y, Channel::Red, value) }

	/// # Errors
	/// See [`set_channel`][Self::set_channel].
	pub fn set_green(&mut self, x: u16, y: u16, value: u8) -> TgaResult<()> { self.set_channel(x, y, Channel::Green, value) }

	/// # Errors
	/// See [`set_channel`][Self::set_channel].
	pub fn set_blue(&mut self, x: u16, y: u16, value: u8) -> TgaResult<()> { self.set_channel(x, y, Channel::Blue, value) }

	/// # Errors
	/// See [`set_channel`][Self::set_channel].
	pub fn set_alpha(&mut self, x: u16, y: u16, value: u8) -> TgaResult<()> { self.set_channel(x, y, Channel::Alpha, value) }

	/// # Errors
	/// See [`set_channel`][Self::set_channel].
	pub fn set_mono(&mut self, x: u16, y: u16, value: u8) -> TgaResult<()> { self.set_channel(x, y, Channel::Mono, value) }


	/// Fill the rectangle `[x, x + width) × [y, y + height)` with `pixel`, row
	/// by row.  An empty rectangle is a no-op.
	///
	/// # Errors
	/// - [`OutOfBounds`]: The rectangle extends past the image.
	/// - [`InvalidArgument`]: `pixel` is not [`bytes_per_pixel`][Self::bytes_per_pixel] long.
	/// - [`MissingPixelData`]: The image has no pixel buffer.
	pub fn set_pixel_block(&mut self, x: u16, y: u16, width: u16, height: u16, pixel: &[u8]) -> TgaResult<()> {
		if width == 0 || height == 0 {
			return Ok(());
		};

		let x_end = u32::from(x) + u32::from(width);
		let y_end = u32::from(y) + u32::from(height);

		if x_end > self.header.width.into() || y_end > self.header.height.into() {
			bail!(OutOfBounds { x: x_end - 1, y: y_end - 1, width: self.header.width, height: self.header.height });
		};

		self.check_pixel_len(pixel)?;

		// Validates the buffer against the far corner.
		let last = self.pixel_range((x_end - 1) as u16, (y_end - 1) as u16)?;
		let bpp = pixel.len();
		let stride = usize::from(self.header.width) * bpp;
		let row_len = usize::from(width) * bpp;
		let data = self.data.as_deref_mut().ok_or(MissingPixelData)?;

		for row in usize::from(y)..y_end as usize {
			let start = row * stride + usize::from(x) * bpp;
			for p in data[start..start + row_len].chunks_exact_mut(bpp) {
				p.copy_from_slice(pixel);
			};
		};

		debug_assert_eq!(&data[last], pixel);
		Ok(())
	}


	/// Pack 8-bit channel values into a pixel of this image's layout.
	///
	/// The same rules as [`set_channel`][Self::set_channel] apply: 16-bit
	/// colors are clamped to 31 and alpha becomes one bit.  24-bit pixels
	/// drop alpha; monochrome pixels take `r` as their intensity.
	///
	/// # Errors
	/// - [`Unsupported`]: The image has no channel layout, e.g. it is color-mapped.
	pub fn make_pixel(&self, r: u8, g: u8, b: u8, a: u8) -> TgaResult<PixelValue> {
		let rgba = [r, g, b, a];

		match self.layout() {
			Some(PixelLayout::Mono8) => PixelValue::from_slice(&[r]),
			Some(PixelLayout::Argb1555) => pack::<Argb1555Pixel>(rgba),
			Some(PixelLayout::Bgr888) => pack::<Bgr888Pixel>(rgba),
			Some(PixelLayout::Bgra8888) => pack::<Bgra8888Pixel>(rgba),
			None => bail!(Unsupported(format!("no channel layout for {}-bit {} images", self.header.pixel_depth, self.header.image_type))),
		}
	}


	fn channel_layout(&self, channel: Channel) -> TgaResult<PixelLayout> {
		match self.layout() {
			Some(layout) if layout.has_channel(channel) => Ok(layout),
			_ => bail!(TypeMismatch { channel, image_type: self.header.image_type, pixel_depth: self.header.pixel_depth }),
		}
	}


	fn check_pixel_len(&self, pixel: &[u8]) -> TgaResult<()> {
		let bpp = self.bytes_per_pixel();

		if bpp == 0 || pixel.len() != bpp {
			bail!(InvalidArgument(format!("{}-byte pixel written to a {}-bit image", pixel.len(), self.header.pixel_depth)));
		};

		Ok(())
	}
}


fn read_packed<P: PackedPixel>(bytes: &[u8], channel: Channel) -> TgaResult<u8> {
	P::from_data(bytes)?
		.channel(channel)
		.ok_or_else(|| Internal(format!("{} channel read from a packed pixel", channel)))
}


fn write_packed<P: PackedPixel>(bytes: &[u8], layout: PixelLayout, channel: Channel, value: u8) -> TgaResult<PixelValue> {
	let pixel = match P::from_data(bytes)?.with_channel(channel, value) {
		Some(p) => p,
		None => bail!(Unsupported(format!("writing the {} channel of {} pixels", channel, layout))),
	};

	PixelValue::from_slice(&pixel.to_data()?)
}


fn pack<P: PackedPixel>(rgba: [u8; 4]) -> TgaResult<PixelValue> {
	PixelValue::from_slice(&P::from_rgba_clamped(rgba).to_data()?)
}


#[cfg(test)]
use crate::{TgaErrorKind, ImageType};


#[test]
fn rgb_channels() {
	let mut image = TgaImage::new(PixelLayout::Bgr888, 2, 2).unwrap();

	image.set_red(1, 0, 0x30).unwrap();
	image.set_green(1, 0, 0x20).unwrap();
	image.set_blue(1, 0, 0x10).unwrap();

	assert_eq!(image.pixel(1, 0).unwrap(), &[0x10, 0x20, 0x30]);
	assert_eq!(image.red(1, 0).unwrap(), 0x30);
	assert_eq!(image.alpha(1, 0).unwrap(), 0);
	assert!(image.set_alpha(1, 0, 0xFF).unwrap_err().is_unsupported());
	assert_eq!(image.mono(1, 0).unwrap_err().kind(), TgaErrorKind::TypeMismatch);
	assert_eq!(image.pixel_range(1, 1).unwrap(), 9..12);
}


#[test]
fn rgba_channels() {
	let mut image = TgaImage::new(PixelLayout::Bgra8888, 3, 1).unwrap();

	let pixel = image.make_pixel(1, 2, 3, 4).unwrap();
	assert_eq!(&*pixel, &[3, 2, 1, 4]);

	image.set_pixel(2, 0, &pixel).unwrap();
	image.set_alpha(2, 0, 0x80).unwrap();
	assert_eq!(image.pixel(2, 0).unwrap(), &[3, 2, 1, 0x80]);
	assert_eq!(image.data().unwrap()[..8], [0; 8]);
}


#[test]
fn argb1555_layout() {
	let mut image = TgaImage::new(PixelLayout::Argb1555, 1, 1).unwrap();

	image.set_green(0, 0, 0b11001).unwrap();
	assert_eq!(image.pixel(0, 0).unwrap(), &[0b0010_0000, 0b0000_0011]);

	image.set_red(0, 0, 0xFF).unwrap();
	image.set_alpha(0, 0, 0x02).unwrap();
	assert_eq!(image.red(0, 0).unwrap(), 31);
	assert_eq!(image.alpha(0, 0).unwrap(), 1);
	assert_eq!(image.pixel(0, 0).unwrap(), &[0b0010_0000, 0b1111_1111]);

	assert_eq!(&*image.make_pixel(40, 0, 5, 9).unwrap(), &[0b0000_0101, 0b1111_1100]);
}


#[test]
fn mono_channel() {
	let mut image = TgaImage::new(PixelLayout::Mono8, 2, 1).unwrap();

	image.set_mono(1, 0, 0x7E).unwrap();
	assert_eq!(image.mono(1, 0).unwrap(), 0x7E);
	assert_eq!(&*image.make_pixel(0x42, 1, 2, 3).unwrap(), &[0x42]);
	assert_eq!(image.red(1, 0).unwrap_err(), TypeMismatch { channel: Channel::Red, image_type: ImageType::Monochrome, pixel_depth: 8 });
}


#[test]
fn color_mapped_has_no_channels() {
	let mut header = TgaImage::default().header;
	header.image_type = ImageType::ColorMapped;
	header.width = 1;
	header.height = 1;
	header.pixel_depth = 8;
	let image = TgaImage { header, data: Some(vec![3]), ..TgaImage::default() };

	assert_eq!(image.pixel(0, 0).unwrap(), &[3]);
	assert_eq!(image.red(0, 0).unwrap_err().kind(), TgaErrorKind::TypeMismatch);
	assert_eq!(image.mono(0, 0).unwrap_err().kind(), TgaErrorKind::TypeMismatch);
	assert!(image.make_pixel(0, 0, 0, 0).unwrap_err().is_unsupported());
}


#[test]
fn missing_pixel_data() {
	let mut header = TgaImage::default().header;
	header.width = 2;
	header.height = 2;
	let image = TgaImage { header, ..TgaImage::default() };

	assert_eq!(image.pixel(0, 0), Err(MissingPixelData));
	assert_eq!(image.pixel(2, 0).unwrap_err().kind(), TgaErrorKind::InvalidArgument);
}


#[test]
fn block_bounds() {
	let mut image = TgaImage::new(PixelLayout::Bgr888, 4, 4).unwrap();
	let pixel = image.make_pixel(1, 2, 3, 0).unwrap();

	assert_eq!(image.set_pixel_block(2, 2, 3, 1, &pixel).unwrap_err().kind(), TgaErrorKind::InvalidArgument);
	assert_eq!(image.set_pixel_block(0, 0, 1, 1, &[1, 2]).unwrap_err().kind(), TgaErrorKind::InvalidArgument);
	assert!(image.set_pixel_block(4, 4, 0, 0, &pixel).is_ok());
	assert!(image.data().unwrap().iter().all(|&b| b == 0));

	image.set_pixel_block(0, 3, 4, 1, &pixel).unwrap();
	assert_eq!(image.data().unwrap()[36..], [3, 2, 1].repeat(4)[..]);
}
