mod common;

use anyhow::Result;
use tga::{TgaImage, TgaErrorKind, PixelLayout, Channel};


const ALL_LAYOUTS: [PixelLayout; 4] = [
	PixelLayout::Mono8,
	PixelLayout::Argb1555,
	PixelLayout::Bgr888,
	PixelLayout::Bgra8888,
];

const ALL_CHANNELS: [Channel; 5] = [Channel::Red, Channel::Green, Channel::Blue, Channel::Alpha, Channel::Mono];


#[test]
fn out_of_bounds_is_invalid_argument() -> Result<()> {
	common::init_logger();

	for layout in ALL_LAYOUTS {
		let mut image = TgaImage::new(layout, 8, 8)?;

		for (x, y) in [(8, 0), (0, 8), (8, 8), (u16::MAX, 3)] {
			assert_eq!(image.pixel(x, y).unwrap_err().kind(), TgaErrorKind::InvalidArgument);

			for channel in ALL_CHANNELS {
				assert_eq!(image.channel(x, y, channel).unwrap_err().kind(), TgaErrorKind::InvalidArgument);
				assert_eq!(image.set_channel(x, y, channel, 1).unwrap_err().kind(), TgaErrorKind::InvalidArgument);
			};
		};

		assert!(image.data().unwrap().iter().all(|&b| b == 0));
	};

	Ok(())
}


#[test]
fn mono_channel_is_exclusive() -> Result<()> {
	let mut mono = TgaImage::new(PixelLayout::Mono8, 2, 2)?;
	let mut color = TgaImage::new(PixelLayout::Bgra8888, 2, 2)?;

	for channel in [Channel::Red, Channel::Green, Channel::Blue, Channel::Alpha] {
		assert_eq!(mono.channel(1, 1, channel).unwrap_err().kind(), TgaErrorKind::TypeMismatch);
		assert_eq!(mono.set_channel(1, 1, channel, 9).unwrap_err().kind(), TgaErrorKind::TypeMismatch);
	};

	assert_eq!(color.mono(1, 1).unwrap_err().kind(), TgaErrorKind::TypeMismatch);
	assert_eq!(color.set_mono(1, 1, 9).unwrap_err().kind(), TgaErrorKind::TypeMismatch);

	mono.set_mono(1, 1, 9)?;
	color.set_red(1, 1, 9)?;
	assert_eq!(mono.mono(1, 1)?, 9);
	assert_eq!(color.red(1, 1)?, 9);

	Ok(())
}


#[test]
fn argb1555_channels_are_invertible() -> Result<()> {
	let mut image = TgaImage::new(PixelLayout::Argb1555, 1, 1)?;

	// Every color through make_pixel, checked against the packed layout
	for r in 0..=31u8 {
		for g in 0..=31u8 {
			for b in 0..=31u8 {
				let a = (r ^ g ^ b) & 1;
				let packed = [(g << 5) | b, (a << 7) | (r << 2) | (g >> 3)];
				assert_eq!(&*image.make_pixel(r, g, b, a)?, &packed, "rgba ({}, {}, {}, {})", r, g, b, a);
			};
		};
	};

	// Each channel through its own setter, the others held at odd values
	image.set_pixel(0, 0, &image.make_pixel(5, 10, 21, 1)?)?;

	for v in 0..=31 {
		image.set_red(0, 0, v)?;
		assert_eq!((image.red(0, 0)?, image.green(0, 0)?, image.blue(0, 0)?, image.alpha(0, 0)?), (v, 10, 21, 1));
	};

	for v in 0..=31 {
		image.set_green(0, 0, v)?;
		assert_eq!((image.red(0, 0)?, image.green(0, 0)?, image.blue(0, 0)?, image.alpha(0, 0)?), (31, v, 21, 1));
	};

	for v in 0..=31 {
		image.set_blue(0, 0, v)?;
		assert_eq!((image.red(0, 0)?, image.green(0, 0)?, image.blue(0, 0)?, image.alpha(0, 0)?), (31, 31, v, 1));
	};

	for a in [0, 1, 0] {
		image.set_alpha(0, 0, a)?;
		assert_eq!((image.red(0, 0)?, image.green(0, 0)?, image.blue(0, 0)?, image.alpha(0, 0)?), (31, 31, 31, a));
	};

	Ok(())
}


#[test]
fn bgr888_alpha() -> Result<()> {
	let mut image = TgaImage::new(PixelLayout::Bgr888, 1, 1)?;
	image.set_pixel(0, 0, &[1, 2, 3])?;

	assert_eq!(image.alpha(0, 0)?, 0);
	assert!(image.set_alpha(0, 0, 0x80).unwrap_err().is_unsupported());
	assert_eq!(image.pixel(0, 0)?, &[1, 2, 3]);
	assert_eq!(&*image.make_pixel(3, 2, 1, 0xFF)?, &[1, 2, 3]);

	Ok(())
}


#[test]
fn pixel_block_fills_rectangle() -> Result<()> {
	let mut image = TgaImage::new(PixelLayout::Bgr888, 8, 8)?;
	let pixel = image.make_pixel(0xAA, 0xBB, 0xCC, 0)?;

	image.set_pixel_block(2, 2, 3, 2, &pixel)?;

	let mut written = 0;

	for y in 0..8 {
		for x in 0..8 {
			let inside = (2..5).contains(&x) && (2..4).contains(&y);
			let expected: &[u8] = if inside { &pixel[..] } else { &[0, 0, 0] };
			assert_eq!(image.pixel(x, y)?, expected, "pixel ({}, {})", x, y);
			written += usize::from(inside);
		};
	};

	assert_eq!(written, 6);

	assert_eq!(image.set_pixel_block(6, 0, 3, 1, &pixel).unwrap_err().kind(), TgaErrorKind::InvalidArgument);
	assert_eq!(image.set_pixel_block(0, 7, 1, 2, &pixel).unwrap_err().kind(), TgaErrorKind::InvalidArgument);
	image.set_pixel_block(7, 7, 1, 1, &pixel)?;
	assert_eq!(image.pixel(7, 7)?, &*pixel);

	Ok(())
}


#[test]
fn clamped_writes() -> Result<()> {
	let mut image = TgaImage::new(PixelLayout::Argb1555, 1, 1)?;

	image.set_red(0, 0, 200)?;
	image.set_alpha(0, 0, 77)?;
	assert_eq!(image.red(0, 0)?, 31);
	assert_eq!(image.alpha(0, 0)?, 1);

	image.set_alpha(0, 0, 0)?;
	assert_eq!(image.alpha(0, 0)?, 0);
	assert_eq!(image.red(0, 0)?, 31);

	Ok(())
}
