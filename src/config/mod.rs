//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → DumpConfig (validated)
//!     → CLI flags applied on top (main.rs)
//!
//! With `watch = true`:
//!     watcher.rs detects change
//!     → loader.rs loads and validates the new file
//!     → `[render]` swapped into the presenter's settings
//! ```
//!
//! # Design Decisions
//! - All fields have defaults so an empty file is valid
//! - Only render settings are reloadable; sockets stay as bound at startup

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{DumpConfig, ObservabilityConfig, OutputConfig, RenderConfig, TapConfig};
pub use validation::{validate_config, ValidationError};
pub use watcher::ConfigWatcher;
