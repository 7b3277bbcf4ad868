// A simple logging macro. This is a no-op unless the 'logging' feature is
// enabled. Only compilation logs; matching never does.
macro_rules! trace {
    ($($tt:tt)*) => {
        #[cfg(feature = "logging")]
        {
            log::trace!($($tt)*);
        }
    }
}
