//! Converter facade and boundary functions.

use serde_json::Value;
use tracing::{debug, warn};

use crate::config::Config;
use crate::converter::{Converted, Converter, Direction};
use crate::error::ConvertError;
use crate::tes::TesConverter;
use crate::wes::WesConverter;

/// Groups the TES and WES converters behind one entry point.
///
/// Holds no mutable state; one instance can be shared across threads.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConverterManager {
    tes: TesConverter,
    wes: WesConverter,
}

impl ConverterManager {
    pub fn new(config: Config) -> Self {
        Self {
            tes: TesConverter::new(config),
            wes: WesConverter::new(config),
        }
    }

    /// Run the conversion named by `direction`.
    pub fn convert(&self, direction: Direction, data: &Value) -> Result<Converted, ConvertError> {
        debug!(
            source = %direction.source(),
            target = %direction.target(),
            "Dispatching conversion"
        );
        match direction {
            Direction::TesToWrroc => self.tes.to_wrroc(data),
            Direction::WrrocToTes => self.tes.from_wrroc(data),
            Direction::WesToWrroc => self.wes.to_wrroc(data),
            Direction::WrrocToWes => self.wes.from_wrroc(data),
        }
    }

    pub fn convert_tes_to_wrroc(&self, data: &Value) -> Result<Converted, ConvertError> {
        self.convert(Direction::TesToWrroc, data)
    }

    pub fn convert_wrroc_to_tes(&self, data: &Value) -> Result<Converted, ConvertError> {
        self.convert(Direction::WrrocToTes, data)
    }

    pub fn convert_wes_to_wrroc(&self, data: &Value) -> Result<Converted, ConvertError> {
        self.convert(Direction::WesToWrroc, data)
    }

    pub fn convert_wrroc_to_wes(&self, data: &Value) -> Result<Converted, ConvertError> {
        self.convert(Direction::WrrocToWes, data)
    }
}

/// Log the notices of a conversion and keep only its payload.
fn into_data(direction: Direction, converted: Converted) -> Value {
    for notice in &converted.notices {
        warn!(%direction, field = notice.field(), "{}", notice);
    }
    converted.data
}

fn convert_default(direction: Direction, data: &Value) -> Result<Value, ConvertError> {
    let converted = ConverterManager::default().convert(direction, data)?;
    Ok(into_data(direction, converted))
}

/// Convert a TES task into WRROC with the default configuration.
pub fn convert_tes_to_wrroc(data: &Value) -> Result<Value, ConvertError> {
    convert_default(Direction::TesToWrroc, data)
}

/// Convert a WRROC entity into a TES task with the default configuration.
pub fn convert_wrroc_to_tes(data: &Value) -> Result<Value, ConvertError> {
    convert_default(Direction::WrrocToTes, data)
}

/// Convert a WES run into WRROC with the default configuration.
pub fn convert_wes_to_wrroc(data: &Value) -> Result<Value, ConvertError> {
    convert_default(Direction::WesToWrroc, data)
}

/// Convert a WRROC entity into a WES run with the default configuration.
pub fn convert_wrroc_to_wes(data: &Value) -> Result<Value, ConvertError> {
    convert_default(Direction::WrrocToWes, data)
}
