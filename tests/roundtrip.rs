mod common;

use anyhow::Result;
use tga::{TgaImage, TgaEncoder, EncodingSettings, TgaError, TgaVersion, ImageType, PixelLayout};


fn gradient(layout: PixelLayout, width: u16, height: u16) -> Result<TgaImage> {
	let mut image = TgaImage::new(layout, width, height)?;

	for y in 0..height {
		for x in 0..width {
			let pixel = image.make_pixel((x * 8) as u8, (y * 8) as u8, 0x40, (x + y) as u8)?;
			image.set_pixel(x, y, &pixel)?;
		};
	};

	Ok(image)
}


#[test]
fn truecolor_through_file() -> Result<()> {
	common::init_logger();

	for layout in [PixelLayout::Bgr888, PixelLayout::Bgra8888] {
		let mut image = gradient(layout, 5, 4)?;
		image.set_id_field(Some(b"roundtrip".to_vec()))?;
		image.set_offsets(3, 7);

		let path = common::temp_path(&format!("truecolor-{}", layout.pixel_depth()));
		image.save(&path)?;
		let read = TgaImage::open(&path);
		std::fs::remove_file(&path)?;

		assert_eq!(read?, image);
	};

	Ok(())
}


#[test]
fn rle_round_trip() -> Result<()> {
	common::init_logger();

	let settings = EncodingSettings { rle: true };

	for layout in [PixelLayout::Mono8, PixelLayout::Argb1555, PixelLayout::Bgr888, PixelLayout::Bgra8888] {
		let mut image = gradient(layout, 9, 3)?;
		let fill = image.make_pixel(1, 1, 1, 1)?;
		image.set_pixel_block(0, 1, 9, 1, &fill)?;

		let raw = image.to_bytes()?;
		let rle = TgaEncoder::with_settings(&image, settings).encode()?;
		assert_eq!(rle[2], image.image_type().encoded().map(ImageType::id).unwrap());
		assert!(rle.len() < raw.len());

		let decoded = TgaImage::from_bytes(&rle)?;
		assert_eq!(decoded.image_type(), image.image_type());
		assert_eq!(decoded, image);
	};

	Ok(())
}


#[test]
fn version_2_files_are_written_as_version_1() -> Result<()> {
	let mut file = common::header(2, 1, 1, 24, 0x20);
	file.extend([1, 2, 3]);
	file.extend(common::footer(0, 0));

	let image = TgaImage::from_bytes(&file)?;
	assert_eq!(image.version(), TgaVersion::V2);

	let written = image.to_bytes()?;
	assert_eq!(written, &file[..21]);
	assert_eq!(TgaImage::from_bytes(&written)?.version(), TgaVersion::V1);

	Ok(())
}


#[test]
fn converted_image_round_trip() -> Result<()> {
	let image = gradient(PixelLayout::Bgra8888, 4, 4)?;
	let rgba = image.to_dynamic_image()?.into_rgba8();
	let back = TgaImage::from_rgba_image(&rgba, PixelLayout::Bgra8888)?;

	assert_eq!(back.data(), image.data());

	Ok(())
}


struct FailingWriter;


impl std::io::Write for FailingWriter {
	fn write(&mut self, _: &[u8]) -> std::io::Result<usize> {
		Err(std::io::ErrorKind::BrokenPipe.into())
	}

	fn flush(&mut self) -> std::io::Result<()> {
		Ok(())
	}
}


#[test]
fn write_failures() -> Result<()> {
	let image = gradient(PixelLayout::Mono8, 2, 2)?;

	assert_eq!(image.write_to(&mut FailingWriter), Err(TgaError::WriteError(std::io::ErrorKind::BrokenPipe)));
	assert_eq!(image.save(""), Err(TgaError::InvalidFilename));

	let dir = std::env::temp_dir();
	assert_eq!(image.save(&dir).unwrap_err().kind(), tga::TgaErrorKind::Write);

	let mut sink = Vec::new();
	image.write_to(&mut sink)?;
	assert_eq!(sink.len(), 18 + 4);

	Ok(())
}
