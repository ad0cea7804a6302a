pub mod fetch;
pub mod io;
pub mod locator;
pub mod repackage;
pub mod reporter;
pub mod wheel;

pub use fetch::{BuildError, BuildOptions, BuiltWheel, fetch_and_write_wheels};
pub use locator::{LocateError, Locator, find_x13_bin};
pub use reporter::{NullReporter, Reporter};

/// User Agent string for core operations
pub const USER_AGENT: &str = concat!("x13-core/", env!("CARGO_PKG_VERSION"));
