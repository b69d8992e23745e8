//! Firmware metadata extraction.
//!
//! The firmware source declares its identity as two string constants:
//!
//! ```c
//! const char* firmwareVersion = "1.2.2";
//! const char* deviceModel = "hoRelay2";
//! ```
//!
//! [`MetadataReader`] pulls both out by pattern and produces a
//! [`FirmwareInfo`](fwpub_types::FirmwareInfo). Nothing else in the source is
//! interpreted.

pub mod error;
pub mod reader;

pub use error::{SourceError, SourceResult};
pub use reader::{extract_constant, MetadataReader, MODEL_CONSTANT, VERSION_CONSTANT};
