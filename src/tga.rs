use crate::{TgaResult, TgaError, PixelLayout, ImageType, TgaHeader, TgaFooter, TgaVersion, ImageOrigin};
use crate::format::{bytes_per_pixel, pixel_buffer_len};
use crate::macros;
#[cfg(doc)] use crate::TgaError::*;


/// A single TGA image: header, optional footer, ID field, color map and
/// pixel data
///
/// Pixel data is stored exactly as in the file: row-major, without padding,
/// in the order given by the origin bits (which are never acted upon).
///
/// Once present, the pixel buffer is always
/// `width * height * ceil(pixel_depth / 8)` bytes long.
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct TgaImage {
	pub(crate) header: TgaHeader,
	pub(crate) footer: Option<TgaFooter>,
	pub(crate) id_field: Option<Vec<u8>>,
	pub(crate) color_map: Option<Vec<u8>>,
	pub(crate) data: Option<Vec<u8>>,
}


impl TgaImage {
	/// Maximum length of the ID field.
	pub const MAX_ID_LENGTH: usize = u8::MAX as usize;


	/// Allocate a zero-filled `width`x`height` image with the given pixel
	/// layout.
	///
	/// The image descriptor gets the layout's alpha bit count and a
	/// top-to-bottom origin, matching the order pixels are addressed in.
	///
	/// # Errors
	/// - [`OutOfMemory`]: The pixel buffer could not be allocated.
	pub fn new(layout: PixelLayout, width: u16, height: u16) -> TgaResult<Self> {
		let origin = ImageOrigin { right_to_left: false, top_to_bottom: true };

		let header = TgaHeader {
			image_type: layout.image_type(),
			width,
			height,
			pixel_depth: layout.pixel_depth(),
			image_descriptor: layout.attribute_bits() | origin.to_descriptor_bits(),
			..TgaHeader::default()
		};

		let len = pixel_buffer_len(width, height, header.pixel_depth)
			.ok_or(TgaError::OutOfMemory(usize::MAX))?;
		let data = alloc_pixel_buffer(len)?;

		macros::log!(trace, "TgaImage::new: {} {}x{}, {} bytes", layout, width, height, len);

		Ok(Self { header, data: Some(data), ..Self::default() })
	}


	/// The decoded 18-byte header.
	pub fn header(&self) -> &TgaHeader { &self.header }

	/// The footer, present for version 2 files.
	pub fn footer(&self) -> Option<&TgaFooter> { self.footer.as_ref() }

	/// [`TgaVersion::V2`] if a signed footer was found while decoding.
	pub fn version(&self) -> TgaVersion {
		match self.footer {
			Some(_) => TgaVersion::V2,
			None => TgaVersion::V1,
		}
	}

	/// Extension area offset; 0 for version 1 images.
	pub fn extension_offset(&self) -> u32 {
		self.footer.map_or(0, |f| f.extension_offset)
	}

	/// Developer directory offset; 0 for version 1 images.
	pub fn developer_offset(&self) -> u32 {
		self.footer.map_or(0, |f| f.developer_offset)
	}

	/// Length of the ID field.
	pub fn id_length(&self) -> u8 { self.header.id_length }
	/// 1 if the file declares a color map.
	pub fn color_map_type(&self) -> u8 { self.header.color_map_type }
	/// Kind of pixel data; encoded types are normalized after decoding.
	pub fn image_type(&self) -> ImageType { self.header.image_type }
	/// Color map offset past the ID field.
	pub fn color_map_start(&self) -> u16 { self.header.color_map_start }
	/// Number of color map entries.
	pub fn color_map_length(&self) -> u16 { self.header.color_map_length }
	/// Bits per color map entry.
	pub fn color_map_depth(&self) -> u8 { self.header.color_map_depth }
	/// Horizontal screen position.
	pub fn x_offset(&self) -> u16 { self.header.x_offset }
	/// Vertical screen position.
	pub fn y_offset(&self) -> u16 { self.header.y_offset }
	/// Width in pixels.
	pub fn width(&self) -> u16 { self.header.width }
	/// Height in pixels.
	pub fn height(&self) -> u16 { self.header.height }
	/// Bits per pixel.
	pub fn pixel_depth(&self) -> u8 { self.header.pixel_depth }
	/// Raw image descriptor byte.
	pub fn image_descriptor(&self) -> u8 { self.header.image_descriptor }

	/// Number of attribute (alpha) bits per pixel, descriptor bits 0-3.
	pub fn attribute_bits(&self) -> u8 { self.header.attribute_bits() }

	/// Display origin, descriptor bits 4-5.
	pub fn origin(&self) -> ImageOrigin { self.header.origin() }

	/// Bytes per pixel, `ceil(pixel_depth / 8)`.
	pub fn bytes_per_pixel(&self) -> usize { bytes_per_pixel(self.header.pixel_depth) }

	/// Channel layout of the pixels, if they support channel access.
	pub fn layout(&self) -> Option<PixelLayout> {
		PixelLayout::lookup(self.header.pixel_depth, self.header.image_type)
	}

	/// An 8-bit monochrome image.
	pub fn is_monochrome(&self) -> bool {
		self.layout() == Some(PixelLayout::Mono8)
	}

	/// Raw ID field, `None` if `id_length` is 0.
	pub fn id_field(&self) -> Option<&[u8]> { self.id_field.as_deref() }

	/// Raw color map entries of color-mapped images.
	pub fn color_map(&self) -> Option<&[u8]> { self.color_map.as_deref() }

	/// Raw pixel data.
	pub fn data(&self) -> Option<&[u8]> { self.data.as_deref() }

	/// Raw pixel data, mutably; its length cannot change.
	pub fn data_mut(&mut self) -> Option<&mut [u8]> { self.data.as_deref_mut() }

	/// Take the pixel buffer out of the image.
	pub fn into_data(self) -> Option<Vec<u8>> { self.data }


	/// Replace the ID field, updating `id_length`.  An empty field is stored as
	/// `None`.
	///
	/// # Errors
	/// - [`InvalidArgument`]: The field is longer than [`Self::MAX_ID_LENGTH`].
	pub fn set_id_field(&mut self, id_field: Option<Vec<u8>>) -> TgaResult<()> {
		let id_field = id_field.filter(|f| !f.is_empty());
		let len = id_field.as_ref().map_or(0, Vec::len);

		let id_length = u8::try_from(len)
			.map_err(|_| TgaError::InvalidArgument(format!("ID field is {} bytes long, at most {} allowed", len, Self::MAX_ID_LENGTH)))?;

		self.header.id_length = id_length;
		self.id_field = id_field;
		Ok(())
	}


	/// Set the screen position of the image.
	pub fn set_offsets(&mut self, x_offset: u16, y_offset: u16) {
		self.header.x_offset = x_offset;
		self.header.y_offset = y_offset;
	}


	/// Set the display origin, keeping the attribute bits.
	pub fn set_origin(&mut self, origin: ImageOrigin) {
		let keep = self.header.image_descriptor & !ImageOrigin::DESCRIPTOR_MASK;
		self.header.image_descriptor = keep | origin.to_descriptor_bits();
	}


	/// Set the raw image descriptor byte.
	pub fn set_image_descriptor(&mut self, image_descriptor: u8) {
		self.header.image_descriptor = image_descriptor;
	}


	/// Expected pixel buffer size according to the header.
	pub(crate) fn expected_data_len(&self) -> TgaResult<usize> {
		pixel_buffer_len(self.header.width, self.header.height, self.header.pixel_depth)
			.ok_or_else(|| TgaError::Unsupported(format!("{}x{} image does not fit in memory", self.header.width, self.header.height)))
	}
}


/// Allocate a zeroed buffer, reporting allocation failure instead of
/// aborting.
pub(crate) fn alloc_pixel_buffer(len: usize) -> TgaResult<Vec<u8>> {
	let mut data: Vec<u8> = Vec::new();
	data.try_reserve_exact(len).map_err(|_| TgaError::OutOfMemory(len))?;
	data.resize(len, 0);
	Ok(data)
}


#[test]
fn new_image() {
	let image = TgaImage::new(PixelLayout::Bgra8888, 4, 3).unwrap();

	assert_eq!(image.image_type(), ImageType::Truecolor);
	assert_eq!(image.pixel_depth(), 32);
	assert_eq!(image.attribute_bits(), 8);
	assert!(image.origin().top_to_bottom);
	assert_eq!(image.version(), TgaVersion::V1);
	assert_eq!(image.extension_offset(), 0);
	assert_eq!(image.data().map(<[u8]>::len), Some(48));
	assert!(image.data().unwrap().iter().all(|&b| b == 0));
	assert_eq!(image.id_field(), None);

	let mono = TgaImage::new(PixelLayout::Mono8, 2, 2).unwrap();
	assert!(mono.is_monochrome());
	assert_eq!(mono.image_type(), ImageType::Monochrome);
	assert_eq!(mono.data().map(<[u8]>::len), Some(4));
}


#[test]
fn empty_image() {
	let image = TgaImage::default();
	assert_eq!(image.image_type(), ImageType::NoData);
	assert_eq!(image.data(), None);
	assert_eq!(image.layout(), None);
}


#[test]
fn id_field() {
	let mut image = TgaImage::new(PixelLayout::Bgr888, 1, 1).unwrap();

	image.set_id_field(Some(b"hello".to_vec())).unwrap();
	assert_eq!(image.id_length(), 5);
	assert_eq!(image.id_field(), Some(&b"hello"[..]));

	image.set_id_field(Some(vec![])).unwrap();
	assert_eq!(image.id_length(), 0);
	assert_eq!(image.id_field(), None);

	let err = image.set_id_field(Some(vec![0; 256])).unwrap_err();
	assert_eq!(err.kind(), crate::TgaErrorKind::InvalidArgument);
}


#[test]
fn origin_bits() {
	let mut image = TgaImage::new(PixelLayout::Argb1555, 1, 1).unwrap();
	assert_eq!(image.image_descriptor(), 0x21);

	image.set_origin(ImageOrigin { right_to_left: true, top_to_bottom: false });
	assert_eq!(image.image_descriptor(), 0x11);
	assert_eq!(image.attribute_bits(), 1);
}
