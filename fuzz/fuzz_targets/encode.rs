#![no_main]
use libfuzzer_sys::fuzz_target;

use tga::{TgaImage, TgaHeader, TgaEncoder, EncodingSettings};

fuzz_target!(|input: (TgaHeader, bool, Vec<u8>)| {
	let (header, rle, body) = input;

	let mut file = match header.to_header_bytes() {
		Ok(bytes) => bytes,
		Err(_) => return,
	};
	file.extend(body);

	if let Ok(image) = TgaImage::from_bytes(&file) {
		let settings = EncodingSettings { rle };

		if let Ok(bytes) = TgaEncoder::with_settings(&image, settings).encode() {
			let again = TgaImage::from_bytes(&bytes).expect("re-reading an encoded image failed");
			assert_eq!(again.data(), image.data());
		};
	};
});
