use std::io::{Write, BufWriter};
use std::fs::File;
use std::path::Path;

use crate::{TgaResult, TgaError, TgaImage, TgaHeader, HEADER_SIZE};
use crate::TgaError::*;
use crate::decode::{RLE_RUN_FLAG, RLE_MAX_PACKET_PIXELS};
use crate::macros::{self, bail};


/// Serializes a [`TgaImage`] according to [`EncodingSettings`]
///
/// Only truecolor and monochrome images can be written.  The color map
/// fields of the written header are zero and no footer is emitted, so the
/// output is always a version 1 file.
#[derive(Debug, Clone, Copy)]
pub struct TgaEncoder<'a> {
	image: &'a TgaImage,
	settings: EncodingSettings,
}


impl<'a> TgaEncoder<'a> {
	/// Encoder with default settings: uncompressed pixel data.
	pub fn new(image: &'a TgaImage) -> Self {
		Self::with_settings(image, EncodingSettings::default())
	}


	/// Encoder with explicit settings.
	pub fn with_settings(image: &'a TgaImage, settings: EncodingSettings) -> Self {
		Self { image, settings }
	}


	/// Produce the complete file: header, ID field and pixel data.
	///
	/// Everything is validated before any output is produced.
	///
	/// # Errors
	/// - [`Unsupported`]: The image is not truecolor or monochrome, or its pixel
	///   depth is 0 or over 32 bits.
	/// - [`MissingPixelData`]: The image has no pixel buffer.
	/// - [`PixelDataSizeMismatch`]: The buffer size disagrees with the header.
	/// - [`Internal`]: `id_length` disagrees with the ID field.
	/// - [`OutOfMemory`]: The output buffer could not be allocated.
	pub fn encode(&self) -> TgaResult<Vec<u8>> {
		let header = self.header()?;
		let data = self.image.data.as_deref().ok_or(MissingPixelData)?;
		let expected = self.image.expected_data_len()?;

		if data.len() != expected {
			bail!(PixelDataSizeMismatch { expected, actual: data.len() });
		};

		let id_field = self.image.id_field.as_deref().unwrap_or_default();

		if id_field.len() != usize::from(header.id_length) {
			bail!(Internal(format!("id_length is {} but the ID field is {} bytes long", header.id_length, id_field.len())));
		};

		let capacity = HEADER_SIZE + id_field.len() + data.len();
		let mut buf: Vec<u8> = Vec::new();
		buf.try_reserve_exact(capacity).map_err(|_| OutOfMemory(capacity))?;

		buf.extend(header.to_header_bytes()?);
		buf.extend_from_slice(id_field);

		if self.settings.rle {
			encode_rle(data, header.width.into(), self.image.bytes_per_pixel(), &mut buf);
		}
		else {
			buf.extend_from_slice(data);
		};

		macros::log!(debug, "TgaEncoder::encode: {} {}x{}x{}, {} bytes",
			header.image_type,
			header.width,
			header.height,
			header.pixel_depth,
			buf.len());

		Ok(buf)
	}


	fn header(&self) -> TgaResult<TgaHeader> {
		let source = &self.image.header;
		let image_type = source.image_type.decoded();

		if !(image_type.is_truecolor() || image_type.is_monochrome()) {
			bail!(Unsupported(format!("writing {} images", image_type)));
		};

		if source.pixel_depth == 0 || source.pixel_depth > 32 {
			bail!(Unsupported(format!("writing {}-bit pixels", source.pixel_depth)));
		};

		let image_type = match image_type.encoded() {
			Some(encoded) if self.settings.rle => encoded,
			_ => image_type,
		};

		Ok(TgaHeader {
			color_map_type: 0,
			image_type,
			color_map_start: 0,
			color_map_length: 0,
			color_map_depth: 0,
			..*source
		})
	}
}


/// How [`TgaEncoder`] writes pixel data
#[derive(Default, Debug, PartialEq, Eq, Clone, Copy)]
pub struct EncodingSettings {
	/// Run-length encode the pixel data, writing the encoded image type.
	pub rle: bool,
}


impl std::fmt::Display for EncodingSettings {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		match self.rle {
			true => write!(f, "<rle>"),
			false => write!(f, "<raw>"),
		}
	}
}


impl TgaImage {
	/// Encode with default [`EncodingSettings`].
	///
	/// # Errors
	/// See [`TgaEncoder::encode`].
	pub fn to_bytes(&self) -> TgaResult<Vec<u8>> {
		TgaEncoder::new(self).encode()
	}


	/// Encode with default [`EncodingSettings`] and write the result to
	/// `output`.
	///
	/// # Errors
	/// - [`WriteError`]: Writing to `output` failed.
	/// - see [`TgaEncoder::encode`].
	pub fn write_to<W: Write>(&self, output: &mut W) -> TgaResult<()> {
		let bytes = self.to_bytes()?;
		output.write_all(&bytes).map_err(TgaError::from_write)
	}


	/// Encode the image and write it to a new file at `path`.
	///
	/// An existing file is truncated, but only after encoding succeeded.
	///
	/// # Errors
	/// - [`InvalidFilename`]: `path` is empty.
	/// - [`WriteError`]: The file could not be created or written.
	/// - see [`TgaEncoder::encode`].
	pub fn save<P: AsRef<Path>>(&self, path: P) -> TgaResult<()> {
		self.save_with_settings(path, EncodingSettings::default())
	}


	/// [`save`][Self::save] with explicit [`EncodingSettings`].
	///
	/// # Errors
	/// See [`save`][Self::save].
	pub fn save_with_settings<P: AsRef<Path>>(&self, path: P, settings: EncodingSettings) -> TgaResult<()> {
		let path = path.as_ref();

		if path.as_os_str().is_empty() {
			bail!(InvalidFilename);
		};

		let bytes = TgaEncoder::with_settings(self, settings).encode()?;

		macros::log!(trace, "TgaImage::save: {} bytes to {:?}", bytes.len(), path);

		let file = File::create(path).map_err(TgaError::from_write)?;
		let mut writer = BufWriter::new(file);
		writer.write_all(&bytes).map_err(TgaError::from_write)?;
		writer.flush().map_err(TgaError::from_write)
	}
}


/// Append run-length packets for `data`, one scan line at a time.
fn encode_rle(data: &[u8], width: usize, bpp: usize, output: &mut Vec<u8>) {
	if width == 0 || bpp == 0 {
		return;
	};

	for line in data.chunks_exact(width * bpp) {
		let mut i = 0;

		while i < width {
			let run = run_length(line, i, width, bpp);

			if run >= 2 {
				output.push(RLE_RUN_FLAG | (run - 1) as u8);
				output.extend_from_slice(&line[i * bpp..(i + 1) * bpp]);
				i += run;
				continue;
			};

			let start = i;

			while i < width && i - start < RLE_MAX_PACKET_PIXELS && run_length(line, i, width, bpp) < 2 {
				i += 1;
			};

			output.push((i - start - 1) as u8);
			output.extend_from_slice(&line[start * bpp..i * bpp]);
		};
	};
}


/// Number of pixels from `start` equal to the pixel at `start`, capped at one
/// packet.
fn run_length(line: &[u8], start: usize, width: usize, bpp: usize) -> usize {
	let first = &line[start * bpp..(start + 1) * bpp];

	line[start * bpp..width * bpp]
		.chunks_exact(bpp)
		.take(RLE_MAX_PACKET_PIXELS)
		.take_while(|p| *p == first)
		.count()
}


#[cfg(test)]
use crate::{PixelLayout, ImageType, TgaErrorKind};


#[test]
fn rle_packets() {
	let mut out = Vec::new();

	// One line of 1-byte pixels: run of 3, two literals, run of 2
	encode_rle(&[7, 7, 7, 1, 2, 9, 9], 7, 1, &mut out);
	assert_eq!(out, vec![0x82, 7, 0x01, 1, 2, 0x81, 9]);

	// Packets never cross scan lines
	out.clear();
	encode_rle(&[5, 5, 5, 5], 2, 1, &mut out);
	assert_eq!(out, vec![0x81, 5, 0x81, 5]);

	out.clear();
	encode_rle(&[1, 2, 3, 1, 2, 3, 4, 5, 6], 3, 3, &mut out);
	assert_eq!(out, vec![0x81, 1, 2, 3, 0x00, 4, 5, 6]);
}


#[test]
fn rle_packet_limit() {
	let mut out = Vec::new();
	encode_rle(&[3; 300], 300, 1, &mut out);
	assert_eq!(out, vec![0xFF, 3, 0xFF, 3, 0xAB, 3]);

	let literal: Vec<u8> = (0..200).map(|i| (i % 2) as u8).collect();
	out.clear();
	encode_rle(&literal, 200, 1, &mut out);
	assert_eq!(out.len(), 1 + 128 + 1 + 72);
	assert_eq!(out[0], 0x7F);
	assert_eq!(out[129], 71);
}


#[test]
fn encode_header() {
	let mut image = TgaImage::new(PixelLayout::Bgr888, 2, 1).unwrap();
	image.set_id_field(Some(b"id".to_vec())).unwrap();
	image.data_mut().unwrap().copy_from_slice(&[1, 2, 3, 1, 2, 3]);

	let raw = image.to_bytes().unwrap();
	assert_eq!(raw.len(), 18 + 2 + 6);
	assert_eq!(raw[..3], [2, 0, ImageType::Truecolor.id()]);
	assert_eq!(raw[16..18], [24, 0x20]);
	assert_eq!(&raw[18..20], b"id");

	let settings = EncodingSettings { rle: true };
	let rle = TgaEncoder::with_settings(&image, settings).encode().unwrap();
	assert_eq!(rle[2], ImageType::EncodedTruecolor.id());
	assert_eq!(rle[20..], [0x81, 1, 2, 3]);
	assert_eq!(settings.to_string(), "<rle>");
}


#[test]
fn encode_rejects() {
	let mut image = TgaImage::new(PixelLayout::Mono8, 2, 2).unwrap();
	image.header.id_length = 3;
	assert_eq!(image.to_bytes().unwrap_err().kind(), TgaErrorKind::Internal);

	image.header.id_length = 0;
	image.data.as_mut().unwrap().pop();
	assert_eq!(image.to_bytes(), Err(PixelDataSizeMismatch { expected: 4, actual: 3 }));

	image.data = None;
	assert_eq!(image.to_bytes(), Err(MissingPixelData));

	image.header.image_type = ImageType::ColorMapped;
	assert!(image.to_bytes().unwrap_err().is_unsupported());

	assert!(TgaImage::default().to_bytes().unwrap_err().is_unsupported());
	assert_eq!(TgaImage::default().save(""), Err(InvalidFilename));
}
