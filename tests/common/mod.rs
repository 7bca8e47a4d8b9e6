#![allow(dead_code)]

use std::sync::Once;


static LOGGER: Once = Once::new();


/// Send library logs to stderr; `cargo test -- --nocapture` shows them.
pub fn init_logger() {
	LOGGER.call_once(|| {
		let _ = fern::Dispatch::new()
			.format(|out, message, record| {
				out.finish(format_args!(
					"[{}] [{}] {}",
					record.target(),
					record.level(),
					message
				))
			})
			.level(log::LevelFilter::Trace)
			.chain(std::io::stderr())
			.apply();
	});
}


/// 18-byte header of a `width`x`height` image without ID field or color map.
pub fn header(image_type: u8, width: u16, height: u16, pixel_depth: u8, descriptor: u8) -> Vec<u8> {
	let mut header = vec![0, 0, image_type, 0, 0, 0, 0, 0, 0, 0, 0, 0];
	header.extend(width.to_le_bytes());
	header.extend(height.to_le_bytes());
	header.extend([pixel_depth, descriptor]);
	header
}


/// Version 2 footer with the given offsets.
pub fn footer(extension_offset: u32, developer_offset: u32) -> Vec<u8> {
	let mut footer = Vec::new();
	footer.extend(extension_offset.to_le_bytes());
	footer.extend(developer_offset.to_le_bytes());
	footer.extend(b"TRUEVISION-XFILE.\0");
	footer
}


/// Unique path in the system temporary directory.
pub fn temp_path(name: &str) -> std::path::PathBuf {
	std::env::temp_dir().join(format!("tga-codec-{}-{}.tga", std::process::id(), name))
}
