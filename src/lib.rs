//! # InkStamp
//!
//! Places freehand signatures on scanned document pages and bakes them into
//! the page pixels.
//!
//! ## Architecture
//!
//! InkStamp is organized as a workspace with multiple crates:
//!
//! 1. **inkstamp-core** - Geometry primitives, ink vocabulary, errors, shared-state aliases
//! 2. **inkstamp-editor** - Placement model, undo/redo, gestures, compositor, bake coordination
//! 3. **inkstamp-settings** - Editor configuration and its persistence
//! 4. **inkstamp** - Headless host: logging, settings, JSON bake jobs
//!
//! The engine itself never touches the disk for pages; the host binary plugs
//! in a [`FilePageSink`] to write baked pages out.

pub mod cli;
pub mod job;

pub use inkstamp_core::{
    BakeError, BlendMode, Error, InkColor, MetadataError, PlacementError, Point, Result, Size,
};
pub use inkstamp_editor::{
    BakeOutcome, EditingSession, EditorOptions, GestureController, PageRef, PageSink,
    PageTransform, Placement, PlacementRecord, SignatureImage,
};
pub use inkstamp_settings::{Config, SettingsError};
pub use cli::Cli;
pub use job::{editor_options, run_job, BakeJob, FilePageSink, JobPlacement};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Initialize logging with the default configuration
///
/// Sets up structured logging with:
/// - Console output with pretty formatting
/// - RUST_LOG environment variable support
pub fn init_logging() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into());

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .with_thread_ids(true)
        .with_thread_names(true)
        .with_line_number(true)
        .pretty();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}
