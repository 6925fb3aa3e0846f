#[macro_export]
macro_rules! dbg_print {
	($($arg:tt)*) => ({
		if cfg!(debug_assertions) {
			eprintln!("[{}:{}] {}", file!(), line!(), format_args!($($arg)*));
		}
	})
}

#[macro_export]
macro_rules! dbg_assert {
	($($arg:tt)*) => ({
		debug_assert!($($arg)*)
	})
}

#[macro_export]
macro_rules! dbg_assert_eq {
	($($arg:tt)*) => ({
		debug_assert_eq!($($arg)*)
	})
}
