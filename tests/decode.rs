mod common;

use anyhow::Result;
use tga::{TgaImage, TgaError, TgaVersion, ImageType, PixelLayout};


#[test]
fn version_from_footer() -> Result<()> {
	common::init_logger();

	let mut file = common::header(3, 2, 1, 8, 0);
	file.extend([0x11, 0x22]);

	let image = TgaImage::from_bytes(&file)?;
	assert_eq!(image.version(), TgaVersion::V1);
	assert_eq!(image.footer(), None);

	file.extend(common::footer(0x1234, 0x5678));

	let image = TgaImage::from_bytes(&file)?;
	assert_eq!(image.version(), TgaVersion::V2);
	assert_eq!(image.extension_offset(), 0x1234);
	assert_eq!(image.developer_offset(), 0x5678);
	assert_eq!(image.data(), Some(&[0x11, 0x22][..]));

	let len = file.len();
	file[len - 3] = b'Y';
	assert_eq!(TgaImage::from_bytes(&file)?.version(), TgaVersion::V1);

	Ok(())
}


#[test]
fn rle_argb1555_with_footer() -> Result<()> {
	common::init_logger();

	// 3x2, 16-bit; line 0: run of 3 red, line 1: two raw pixels then one run
	let red = [0x00, 0xFC];
	let blue = [0x1F, 0x00];
	let green = [0xE0, 0x03];

	let mut file = common::header(10, 3, 2, 16, 0x01);
	file.push(0x82);
	file.extend(red);
	file.push(0x01);
	file.extend(blue);
	file.extend(green);
	file.push(0x80);
	file.extend(blue);
	file.extend(common::footer(0, 0));

	let image = TgaImage::from_bytes(&file)?;
	assert_eq!(image.version(), TgaVersion::V2);
	assert_eq!(image.image_type(), ImageType::Truecolor);
	assert_eq!(image.layout(), Some(PixelLayout::Argb1555));
	assert_eq!(image.attribute_bits(), 1);
	assert!(!image.origin().top_to_bottom);

	assert_eq!((image.red(2, 0)?, image.green(2, 0)?, image.blue(2, 0)?, image.alpha(2, 0)?), (31, 0, 0, 1));
	assert_eq!(image.blue(0, 1)?, 31);
	assert_eq!(image.green(1, 1)?, 31);
	assert_eq!(image.pixel(2, 1)?, &blue);
	assert_eq!(image.alpha(1, 1)?, 0);

	Ok(())
}


#[test]
fn fifteen_bit_pixels_use_argb1555() -> Result<()> {
	let mut file = common::header(2, 1, 1, 15, 0);
	file.extend([0x1F, 0x80]);

	let image = TgaImage::from_bytes(&file)?;
	assert_eq!(image.pixel_depth(), 15);
	assert_eq!(image.bytes_per_pixel(), 2);
	assert_eq!((image.blue(0, 0)?, image.alpha(0, 0)?), (31, 1));

	Ok(())
}


#[test]
fn rows_are_not_flipped() -> Result<()> {
	let mut file = common::header(3, 1, 3, 8, 0x10);
	file.extend([1, 2, 3]);

	let image = TgaImage::from_bytes(&file)?;
	assert!(image.origin().right_to_left);
	assert!(!image.origin().top_to_bottom);
	assert_eq!(image.mono(0, 0)?, 1);
	assert_eq!(image.mono(0, 2)?, 3);

	Ok(())
}


#[test]
fn id_field_and_offsets() -> Result<()> {
	let mut file = common::header(3, 1, 1, 8, 0);
	file[0] = 4;
	file[8..12].copy_from_slice(&[0x0A, 0x00, 0x0B, 0x00]);
	file.extend(b"name");
	file.push(0xEE);

	let image = TgaImage::from_bytes(&file)?;
	assert_eq!(image.id_field(), Some(&b"name"[..]));
	assert_eq!((image.x_offset(), image.y_offset()), (10, 11));
	assert_eq!(image.mono(0, 0)?, 0xEE);

	Ok(())
}


#[test]
fn corrupt_and_short_files() {
	common::init_logger();

	assert_eq!(TgaImage::from_bytes(&[]), Err(TgaError::UnexpectedEof));

	let mut file = common::header(11, 4, 1, 8, 0);
	file.extend([0x84, 0x55]);
	file.extend([0x00, 0x66]);
	assert_eq!(TgaImage::from_bytes(&file), Err(TgaError::CorruptRleData { line: 0 }));

	let file = common::header(1, 4, 1, 8, 0);
	assert_eq!(TgaImage::from_bytes(&file), Err(TgaError::EmptyColorMap));

	let file = common::header(2, 1, 1, 0, 0);
	assert!(TgaImage::from_bytes(&file).unwrap_err().is_unsupported());

	let file = common::header(2, 1, 1, 40, 0);
	assert!(TgaImage::from_bytes(&file).unwrap_err().is_unsupported());
}


#[test]
fn open_missing_file() {
	let result = TgaImage::open(common::temp_path("does-not-exist"));
	assert_eq!(result, Err(TgaError::ReadError(std::io::ErrorKind::NotFound)));
}
