//! CrateGen converters
//!
//! Bidirectional conversion between the GA4GH TES/WES vocabularies and
//! Workflow Run RO-Crate (WRROC). Every conversion is a pure function of its
//! input and an immutable [`Config`].
//!
//! # Example
//!
//! ```rust
//! use crategen_convert::{ConverterManager, Direction};
//! use serde_json::json;
//!
//! let task = json!({
//!     "id": "t1",
//!     "name": "n",
//!     "executors": [{"image": "img", "command": []}],
//!     "inputs": [{"url": "http://e/i", "path": "/in/i"}],
//!     "outputs": [{"url": "http://e/o", "path": "/out/o"}]
//! });
//!
//! let converted = ConverterManager::default()
//!     .convert(Direction::TesToWrroc, &task)
//!     .unwrap();
//! assert_eq!(converted.data["instrument"], "img");
//! ```

mod config;
mod converter;
mod error;
mod manager;
mod notice;
mod tes;
mod wes;

// Re-export main types
pub use config::Config;
pub use converter::{Converted, Converter, Direction, ParseDirectionError};
pub use error::ConvertError;
pub use manager::{
    convert_tes_to_wrroc, convert_wes_to_wrroc, convert_wrroc_to_tes, convert_wrroc_to_wes,
    ConverterManager,
};
pub use notice::Notice;
pub use tes::TesConverter;
pub use wes::{
    WesConverter, WORKFLOW_TYPE_PLACEHOLDER, WORKFLOW_URL_PLACEHOLDER, WORKFLOW_VERSION_PLACEHOLDER,
};
