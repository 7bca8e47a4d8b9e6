macro_rules! log {
	($fn:ident, $($arg:tt)*) => {
		#[cfg(feature = "log")]
		log::$fn!($($arg)*);
	}
}


/// Log an error at debug level and return it from the enclosing function.
macro_rules! bail {
	($err:expr) => {{
		let error: $crate::TgaError = $err;
		$crate::macros::log!(debug, "{}", error);
		return Err(error);
	}};
}


pub(crate) use log;
pub(crate) use bail;
