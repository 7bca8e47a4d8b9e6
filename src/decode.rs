use std::io::{Read, Seek, SeekFrom, Cursor, BufReader};
use std::path::Path;

use byteorder::ReadBytesExt;

use crate::{TgaResult, TgaError, TgaImage, TgaHeader, TgaFooter, ImageType, ReadExt, HEADER_SIZE};
use crate::TgaError::*;
use crate::format::{bytes_per_pixel, pixel_buffer_len};
use crate::tga::alloc_pixel_buffer;
use crate::macros::{self, bail};


/// Packet header bit marking a run-length packet.
pub(crate) const RLE_RUN_FLAG: u8 = 0x80;

/// Maximum number of pixels in one packet.
pub(crate) const RLE_MAX_PACKET_PIXELS: usize = 128;


impl TgaImage {
	/// Read a [`TgaImage`][Self] from a seekable stream.
	///
	/// The stream may be positioned anywhere; the footer is looked up relative
	/// to its end and everything else relative to its start.  Run-length
	/// encoded images are expanded and their type is normalized to the
	/// unencoded counterpart.
	///
	/// # Errors
	/// - [`UnexpectedEof`]: The stream ends before the header, ID field,
	///   color map or pixel data does.
	/// - [`ReadError`]: Unexpected read error.
	/// - [`UnexpectedIoError`]: Seeking failed.
	/// - [`InvalidHeader`]: The header could not be decoded.
	/// - [`EmptyColorMap`]: A color-mapped image has a zero-sized color map.
	/// - [`CorruptRleData`]: A run-length packet overruns the image.
	/// - [`Unsupported`]: RLE color-mapped images, unknown image types and
	///   pixel depths of 0 or over 32 bits.
	/// - [`OutOfMemory`]: The pixel buffer could not be allocated.
	pub fn read_from<R: Read + Seek>(input: &mut R) -> TgaResult<Self> {
		let footer = TgaFooter::read_from(input)?;
		let stream_len = input.seek(SeekFrom::End(0))?;
		let mut header = TgaHeader::read_from(input)?;
		let id_field = read_id_field(input, &header)?;

		match header.image_type {
			ImageType::EncodedColorMapped => bail!(Unsupported("run-length encoded color-mapped images".into())),
			ImageType::Unknown(id) => bail!(Unsupported(format!("image type {}", id))),
			_ => {},
		};

		let color_map = read_color_map(input, &header)?;
		let data = read_pixel_data(input, &header, stream_len)?;

		header.image_type = header.image_type.decoded();

		macros::log!(debug, "TgaImage::read_from: version {} {} {}x{}x{}",
			if footer.is_some() { 2 } else { 1 },
			header.image_type,
			header.width,
			header.height,
			header.pixel_depth);

		Ok(Self { header, footer, id_field, color_map, data })
	}


	/// Wrap `input` with a [`Cursor`][std::io::Cursor] and
	/// [`read_from`][`Self::read_from`] from it.
	///
	/// # Errors
	/// See [`read_from`][`Self::read_from`].
	pub fn from_bytes(input: &[u8]) -> TgaResult<Self> {
		let mut cursor = Cursor::new(input);
		Self::read_from(&mut cursor)
	}


	/// Open the file at `path` and [`read_from`][`Self::read_from`] it.
	///
	/// # Errors
	/// - [`ReadError`]: The file could not be opened.
	/// - see [`read_from`][`Self::read_from`].
	pub fn open<P: AsRef<Path>>(path: P) -> TgaResult<Self> {
		let file = std::fs::File::open(path.as_ref()).map_err(TgaError::from_read)?;
		let mut reader = BufReader::new(file);
		Self::read_from(&mut reader)
	}
}


fn read_id_field<R: Read + Seek>(input: &mut R, header: &TgaHeader) -> TgaResult<Option<Vec<u8>>> {
	if header.id_length == 0 {
		return Ok(None);
	};

	input.seek(SeekFrom::Start(HEADER_SIZE as u64))?;
	let id_field = input.read_exact_buffered(header.id_length.into())?;
	macros::log!(trace, "read_id_field: {} bytes", id_field.len());

	Ok(Some(id_field))
}


fn read_color_map<R: Read + Seek>(input: &mut R, header: &TgaHeader) -> TgaResult<Option<Vec<u8>>> {
	if !header.image_type.is_color_mapped() {
		return Ok(None);
	};

	let size = header.color_map_size();

	if size == 0 {
		bail!(EmptyColorMap);
	};

	input.seek(SeekFrom::Start(header.color_map_offset()))?;
	let color_map = input.read_exact_buffered(size)?;
	macros::log!(trace, "read_color_map: {} entries, {} bytes", header.color_map_length, size);

	Ok(Some(color_map))
}


fn read_pixel_data<R: Read + Seek>(input: &mut R, header: &TgaHeader, stream_len: u64) -> TgaResult<Option<Vec<u8>>> {
	if header.image_type == ImageType::NoData {
		return Ok(None);
	};

	if header.pixel_depth == 0 || header.pixel_depth > 32 {
		bail!(Unsupported(format!("{}-bit pixels", header.pixel_depth)));
	};

	let bpp = bytes_per_pixel(header.pixel_depth);
	let len = pixel_buffer_len(header.width, header.height, header.pixel_depth)
		.ok_or_else(|| Unsupported(format!("{}x{} image does not fit in memory", header.width, header.height)))?;
	let offset = header.pixel_data_offset();
	let available = stream_len.saturating_sub(offset);

	input.seek(SeekFrom::Start(offset))?;

	if header.image_type.is_encoded() {
		// Each packet holds at least one pixel value for at most 128 pixels.
		let packets = (len / bpp + RLE_MAX_PACKET_PIXELS - 1) / RLE_MAX_PACKET_PIXELS;
		if available < (packets as u64) * (1 + bpp as u64) {
			bail!(UnexpectedEof);
		};

		let mut data = alloc_pixel_buffer(len)?;
		decode_rle(input, &mut data, header.width.into(), header.height.into(), bpp)?;
		Ok(Some(data))
	}
	else {
		if available < len as u64 {
			bail!(UnexpectedEof);
		};

		input.read_exact_buffered(len).map(Some)
	}
}


/// Expand run-length packets into `data`, one scan line at a time.
///
/// A packet may carry over into the next scan line, but never past the end
/// of `data`.
fn decode_rle<R: Read>(input: &mut R, data: &mut [u8], width: usize, height: usize, bpp: usize) -> TgaResult<()> {
	let mut pixel = 0usize;
	let mut value = [0u8; 4];

	for line in 0..height {
		let line_end = (line + 1) * width;

		while pixel < line_end {
			let packet = input.read_u8().map_err(TgaError::from_read)?;
			let count = usize::from(packet & !RLE_RUN_FLAG) + 1;

			let target = match data.get_mut(pixel * bpp..(pixel + count) * bpp) {
				Some(t) => t,
				None => bail!(CorruptRleData { line }),
			};

			if packet & RLE_RUN_FLAG != 0 {
				let value = &mut value[..bpp];
				input.read_exact(value).map_err(TgaError::from_read)?;

				for p in target.chunks_exact_mut(bpp) {
					p.copy_from_slice(value);
				};
			}
			else {
				input.read_exact(target).map_err(TgaError::from_read)?;
			};

			pixel += count;
		};

		macros::log!(trace, "decode_rle: line {} done, cursor at pixel {}", line, pixel);
	};

	Ok(())
}


#[cfg(test)]
fn tga_file(header: TgaHeader, body: &[u8]) -> Vec<u8> {
	let mut file = header.to_header_bytes().unwrap();
	file.extend(body);
	file
}


#[cfg(test)]
fn rgb_header(image_type: ImageType, width: u16, height: u16) -> TgaHeader {
	TgaHeader { image_type, width, height, pixel_depth: 24, ..TgaHeader::default() }
}


#[test]
fn rle_run_packet() {
	let mut input = Cursor::new(vec![0x83, 0x10, 0x20, 0x30, 0xFF]);
	let mut data = vec![0u8; 12];

	decode_rle(&mut input, &mut data, 4, 1, 3).unwrap();

	assert_eq!(data, [0x10, 0x20, 0x30].repeat(4));
	assert_eq!(input.position(), 4);
}


#[test]
fn rle_mixed_packets_and_line_carry() {
	// 3x2 mono: raw 2, run 3 (crosses into line 1), raw 1
	let mut input = Cursor::new(vec![0x01, 0xA0, 0xA1, 0x82, 0x55, 0x00, 0x7F]);
	let mut data = vec![0u8; 6];

	decode_rle(&mut input, &mut data, 3, 2, 1).unwrap();

	assert_eq!(data, vec![0xA0, 0xA1, 0x55, 0x55, 0x55, 0x7F]);
	assert_eq!(input.position(), 7);
}


#[test]
fn rle_overrun_is_corrupt() {
	let mut input = Cursor::new(vec![0x81, 0x10, 0x02, 0x01, 0x02, 0x03]);
	let mut data = vec![0u8; 4];

	let err = decode_rle(&mut input, &mut data, 2, 2, 1).unwrap_err();
	assert_eq!(err, CorruptRleData { line: 1 });
}


#[test]
fn rle_truncated() {
	let mut input = Cursor::new(vec![0x83, 0x10, 0x20]);
	let mut data = vec![0u8; 12];
	assert_eq!(decode_rle(&mut input, &mut data, 4, 1, 3), Err(UnexpectedEof));
}


#[test]
fn read_encoded_truecolor() {
	let header = rgb_header(ImageType::EncodedTruecolor, 4, 2);
	let file = tga_file(header, &[
		0x83, 0x10, 0x20, 0x30,
		0x01, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06,
		0x81, 0xAA, 0xBB, 0xCC,
	]);

	let image = TgaImage::from_bytes(&file).unwrap();

	assert_eq!(image.image_type(), ImageType::Truecolor);
	let mut expected = [0x10, 0x20, 0x30].repeat(4);
	expected.extend([0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0xAA, 0xBB, 0xCC, 0xAA, 0xBB, 0xCC]);
	assert_eq!(image.data(), Some(&expected[..]));
}


#[test]
fn read_encoded_color_mapped_is_unsupported() {
	let header = TgaHeader {
		color_map_type: 1,
		image_type: ImageType::EncodedColorMapped,
		color_map_length: 2,
		color_map_depth: 24,
		width: 1,
		height: 1,
		pixel_depth: 8,
		..TgaHeader::default()
	};
	let file = tga_file(header, &[0, 0, 0, 0xFF, 0xFF, 0xFF, 0x80, 0x01]);

	let err = TgaImage::from_bytes(&file).unwrap_err();
	assert!(err.is_unsupported());
}


#[test]
fn read_color_mapped() {
	let header = TgaHeader {
		id_length: 2,
		color_map_type: 1,
		image_type: ImageType::ColorMapped,
		color_map_length: 2,
		color_map_depth: 24,
		width: 2,
		height: 1,
		pixel_depth: 8,
		..TgaHeader::default()
	};
	let file = tga_file(header, &[b'h', b'i', 0, 0, 0, 0xFF, 0xFF, 0xFF, 0x01, 0x00]);

	let image = TgaImage::from_bytes(&file).unwrap();

	assert_eq!(image.id_field(), Some(&b"hi"[..]));
	assert_eq!(image.color_map(), Some(&[0, 0, 0, 0xFF, 0xFF, 0xFF][..]));
	assert_eq!(image.data(), Some(&[0x01, 0x00][..]));
	assert_eq!(image.layout(), None);

	let empty = TgaHeader { color_map_length: 0, ..header };
	let file = tga_file(empty, &[b'h', b'i', 0x01, 0x00]);
	assert_eq!(TgaImage::from_bytes(&file), Err(EmptyColorMap));
}


#[test]
fn read_truncated_pixel_data() {
	let file = tga_file(rgb_header(ImageType::Truecolor, 2, 2), &[0; 11]);
	assert_eq!(TgaImage::from_bytes(&file), Err(UnexpectedEof));

	let file = tga_file(rgb_header(ImageType::Truecolor, 2, 2), &[0; 12]);
	assert!(TgaImage::from_bytes(&file).is_ok());

	assert_eq!(TgaImage::from_bytes(&file[..10]), Err(UnexpectedEof));
}


#[test]
fn read_no_data_and_unknown() {
	let image = TgaImage::from_bytes(&tga_file(TgaHeader::default(), &[])).unwrap();
	assert_eq!(image.image_type(), ImageType::NoData);
	assert_eq!(image.data(), None);

	let file = tga_file(rgb_header(ImageType::Unknown(42), 1, 1), &[0; 3]);
	assert!(TgaImage::from_bytes(&file).unwrap_err().is_unsupported());

	let mut header = rgb_header(ImageType::Truecolor, 1, 1);
	header.pixel_depth = 0;
	assert!(TgaImage::from_bytes(&tga_file(header, &[])).unwrap_err().is_unsupported());
}
