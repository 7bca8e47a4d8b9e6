use image::{DynamicImage, GrayImage, RgbImage, RgbaImage, Pixel};

use crate::{TgaResult, TgaImage, PixelLayout};
use crate::TgaError::*;
use crate::pixel::{PackedPixel, Argb1555Pixel, Bgr888Pixel, Bgra8888Pixel};
use crate::macros::{self, bail};


impl TgaImage {
	/// Convert the pixel data into an [`image::DynamicImage`].
	///
	/// 8-bit monochrome becomes `ImageLuma8`, 24-bit becomes `ImageRgb8`, and
	/// 16- and 32-bit become `ImageRgba8` (see [`PixelLayout::color_type`]).
	/// 5-bit channels are widened to 8 bits.  Images declaring no attribute
	/// bits have no alpha, so their pixels come out opaque whatever the top
	/// bits hold.  Rows are copied in storage order; the origin bits are not
	/// applied.
	///
	/// # Errors
	/// - [`Unsupported`]: The image has no channel layout, e.g. it is color-mapped.
	/// - [`MissingPixelData`], [`PixelDataSizeMismatch`]: The pixel buffer is
	///   missing or has the wrong size.
	/// - [`OutOfMemory`]: The converted buffer could not be allocated.
	pub fn to_dynamic_image(&self) -> TgaResult<DynamicImage> {
		let layout = match self.layout() {
			Some(l) => l,
			None => bail!(Unsupported(format!("converting {}-bit {} images", self.header.pixel_depth, self.header.image_type))),
		};

		let data = self.data.as_deref().ok_or(MissingPixelData)?;
		let expected = self.expected_data_len()?;

		if data.len() != expected {
			bail!(PixelDataSizeMismatch { expected, actual: data.len() });
		};

		let (width, height) = (u32::from(self.header.width), u32::from(self.header.height));
		let opaque = self.attribute_bits() == 0;

		macros::log!(trace, "TgaImage::to_dynamic_image: {} into {:?}", layout, layout.color_type());

		let image = match layout {
			PixelLayout::Mono8 => GrayImage::from_raw(width, height, data.to_vec())
				.map(DynamicImage::ImageLuma8),
			PixelLayout::Argb1555 => RgbaImage::from_raw(width, height, unpack::<Argb1555Pixel, 4>(data, opaque)?)
				.map(DynamicImage::ImageRgba8),
			PixelLayout::Bgr888 => RgbImage::from_raw(width, height, unpack::<Bgr888Pixel, 3>(data, opaque)?)
				.map(DynamicImage::ImageRgb8),
			PixelLayout::Bgra8888 => RgbaImage::from_raw(width, height, unpack::<Bgra8888Pixel, 4>(data, opaque)?)
				.map(DynamicImage::ImageRgba8),
		};

		image.ok_or_else(|| Internal(format!("converted buffer does not fit {}x{}", width, height)))
	}


	/// Build an image of the given layout from an [`image::RgbaImage`].
	///
	/// Channels are narrowed to the layout's widths; monochrome takes the
	/// luminance and 24-bit drops alpha.  The result has a top-to-bottom
	/// origin, matching the row order of `image`.
	///
	/// # Errors
	/// - [`InvalidArgument`]: A dimension exceeds 65535.
	/// - [`OutOfMemory`]: The pixel buffer could not be allocated.
	pub fn from_rgba_image(image: &RgbaImage, layout: PixelLayout) -> TgaResult<Self> {
		let (width, height) = match (u16::try_from(image.width()), u16::try_from(image.height())) {
			(Ok(w), Ok(h)) => (w, h),
			_ => bail!(InvalidArgument(format!("{}x{} image exceeds the TGA size limit", image.width(), image.height()))),
		};

		let mut result = Self::new(layout, width, height)?;
		let bpp = layout.bytes_per_pixel();
		let data = result.data.as_deref_mut().ok_or(MissingPixelData)?;

		for (dst, src) in data.chunks_exact_mut(bpp).zip(image.pixels()) {
			match layout {
				PixelLayout::Mono8 => dst[0] = src.to_luma().0[0],
				PixelLayout::Argb1555 => dst.copy_from_slice(&Argb1555Pixel::from_rgba8(src).to_data()?),
				PixelLayout::Bgr888 => dst.copy_from_slice(&Bgr888Pixel::from_rgba8(src).to_data()?),
				PixelLayout::Bgra8888 => dst.copy_from_slice(&Bgra8888Pixel::from_rgba8(src).to_data()?),
			};
		};

		Ok(result)
	}
}


/// Widen packed pixels into `N`-channel 8-bit RGB(A) samples; `opaque`
/// replaces stored alpha with 255.
fn unpack<P: PackedPixel, const N: usize>(data: &[u8], opaque: bool) -> TgaResult<Vec<u8>> {
	let len = data.len() / P::PIXEL_WIDTH_BYTES * N;
	let mut result: Vec<u8> = Vec::new();
	result.try_reserve_exact(len).map_err(|_| OutOfMemory(len))?;

	for p in data.chunks_exact(P::PIXEL_WIDTH_BYTES) {
		let mut rgba = P::from_data(p)?.into_rgba8();
		if opaque {
			rgba.0[3] = u8::MAX;
		};
		result.extend_from_slice(&rgba.0[..N]);
	};

	Ok(result)
}


#[test]
fn convert_truecolor() {
	let mut image = TgaImage::new(PixelLayout::Bgr888, 2, 1).unwrap();
	image.data_mut().unwrap().copy_from_slice(&[0x10, 0x20, 0x30, 0xFF, 0x00, 0x80]);

	let dynamic = image.to_dynamic_image().unwrap();
	assert_eq!(dynamic.color(), PixelLayout::Bgr888.color_type());
	assert_eq!(dynamic.as_bytes(), &[0x30, 0x20, 0x10, 0x80, 0x00, 0xFF]);

	let mut image = TgaImage::new(PixelLayout::Bgra8888, 1, 1).unwrap();
	image.data_mut().unwrap().copy_from_slice(&[1, 2, 3, 4]);
	assert_eq!(image.to_dynamic_image().unwrap().as_bytes(), &[3, 2, 1, 4]);
}


#[test]
fn convert_argb1555() {
	let mut image = TgaImage::new(PixelLayout::Argb1555, 2, 1).unwrap();
	image.set_pixel(0, 0, &image.make_pixel(31, 0, 16, 1).unwrap()).unwrap();

	let dynamic = image.to_dynamic_image().unwrap();
	assert_eq!(dynamic.color(), image::ColorType::Rgba8);
	assert_eq!(dynamic.as_bytes(), &[255, 0, 132, 255, 0, 0, 0, 0]);
}


#[test]
fn convert_without_attribute_bits_is_opaque() {
	// 15-bit blue pixel, descriptor declares no alpha
	let mut header = TgaImage::default().header;
	header.image_type = crate::ImageType::Truecolor;
	header.width = 1;
	header.height = 1;
	header.pixel_depth = 15;
	let image = TgaImage { header, data: Some(vec![0x1F, 0x00]), ..TgaImage::default() };
	assert_eq!(image.attribute_bits(), 0);
	assert_eq!(image.to_dynamic_image().unwrap().into_rgba8().get_pixel(0, 0), &image::Rgba([0, 0, 255, 255]));

	let mut image = TgaImage::new(PixelLayout::Argb1555, 1, 1).unwrap();
	image.set_image_descriptor(0x20);
	assert_eq!(image.to_dynamic_image().unwrap().as_bytes(), &[0, 0, 0, 255]);

	let mut image = TgaImage::new(PixelLayout::Bgra8888, 1, 1).unwrap();
	image.data_mut().unwrap().copy_from_slice(&[1, 2, 3, 0]);
	image.set_image_descriptor(0x20);
	assert_eq!(image.to_dynamic_image().unwrap().as_bytes(), &[3, 2, 1, 255]);
}


#[test]
fn convert_mono() {
	let mut image = TgaImage::new(PixelLayout::Mono8, 1, 2).unwrap();
	image.data_mut().unwrap().copy_from_slice(&[7, 200]);

	let dynamic = image.to_dynamic_image().unwrap();
	assert_eq!(dynamic.color(), image::ColorType::L8);
	assert_eq!((dynamic.width(), dynamic.height()), (1, 2));
	assert_eq!(dynamic.as_bytes(), &[7, 200]);

	let gray = RgbaImage::from_pixel(1, 1, image::Rgba([90, 90, 90, 0]));
	let image = TgaImage::from_rgba_image(&gray, PixelLayout::Mono8).unwrap();
	assert_eq!(image.mono(0, 0).unwrap(), 90);
}


#[test]
fn convert_from_rgba() {
	let mut rgba = RgbaImage::new(2, 2);
	rgba.put_pixel(1, 0, image::Rgba([0xFF, 0x80, 0x00, 0x40]));

	let image = TgaImage::from_rgba_image(&rgba, PixelLayout::Bgra8888).unwrap();
	assert_eq!(image.pixel(1, 0).unwrap(), &[0x00, 0x80, 0xFF, 0x40]);
	assert!(image.origin().top_to_bottom);
	assert_eq!(image.to_dynamic_image().unwrap().into_rgba8(), rgba);

	let image = TgaImage::from_rgba_image(&rgba, PixelLayout::Argb1555).unwrap();
	assert_eq!((image.red(1, 0).unwrap(), image.green(1, 0).unwrap(), image.alpha(1, 0).unwrap()), (31, 16, 0));

	let wide = RgbaImage::new(70_000, 1);
	assert_eq!(TgaImage::from_rgba_image(&wide, PixelLayout::Bgr888).unwrap_err().kind(), crate::TgaErrorKind::InvalidArgument);
}


#[test]
fn convert_requires_layout() {
	let mut image = TgaImage::new(PixelLayout::Mono8, 1, 1).unwrap();
	image.header.image_type = crate::ImageType::ColorMapped;
	assert!(image.to_dynamic_image().unwrap_err().is_unsupported());
}
