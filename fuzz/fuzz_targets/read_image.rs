#![no_main]
use libfuzzer_sys::fuzz_target;

use std::io::Cursor;

use tga::TgaImage;

fuzz_target!(|data: &[u8]| {
	let mut cursor = Cursor::new(data);
	let image = TgaImage::read_from(&mut cursor);

	if let Ok(image) = image {
		let _ = image.to_dynamic_image();

		if let Ok(bytes) = image.to_bytes() {
			let again = TgaImage::from_bytes(&bytes).expect("re-reading an encoded image failed");
			assert_eq!(again.data(), image.data());
		};
	};
});
