//! Type system utilities and aliases.
//!
//! ## Modules
//!
//! - [`aliases`]: Type aliases for `Arc<Mutex<_>>` shared maps and the
//!   lock sets used to track pages with a save in flight.

pub mod aliases;

pub use aliases::*;
