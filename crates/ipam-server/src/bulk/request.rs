use ipam_range::RangeSpec;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use super::{RangeRequest, ValidationError};

const DEFAULT_NAME_PREFIX: &str = "Device";
const DEFAULT_DESCRIPTION: &str = "Bulk inserted IP";

/// A reference id given either as a JSON number or a numeric string
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum ReferenceId {
    Number(i64),
    Text(String),
}

impl ReferenceId {
    fn is_blank(&self) -> bool {
        matches!(self, Self::Text(text) if text.trim().is_empty())
    }

    fn resolve(self, name: &'static str) -> Result<i64, ValidationError> {
        match self {
            Self::Number(id) => Ok(id),
            Self::Text(text) => {
                let text = text.trim();
                if text.is_empty() {
                    return Err(ValidationError::MissingField { name });
                }
                text.parse()
                    .map_err(|_| ValidationError::NotNumeric { name })
            }
        }
    }
}

impl From<i64> for ReferenceId {
    fn from(id: i64) -> Self {
        Self::Number(id)
    }
}

/// Body of the bulk insertion endpoints.
///
/// The range is given either as `start_ip`/`end_ip` or as
/// `network_prefix` with `start_octet`/`end_octet`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct BulkInsertPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_ip: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_ip: Option<String>,

    /// First three octets, e.g. "192.168.1"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network_prefix: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_octet: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_octet: Option<u32>,

    pub subnet_id: Option<ReferenceId>,
    pub device_type_id: Option<ReferenceId>,
    pub branch_id: Option<ReferenceId>,

    /// Defaults to "Device"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_name_prefix: Option<String>,

    /// Defaults to "Bulk inserted IP"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Only a JSON `true` enables skipping
    #[serde(default, deserialize_with = "lenient_flag")]
    pub skip_existing: bool,

    /// Numbers, numeric strings and booleans are accepted as integers
    #[serde(
        default,
        deserialize_with = "lenient_integer",
        skip_serializing_if = "Option::is_none"
    )]
    pub batch_size: Option<i64>,
}

fn lenient_flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    Ok(matches!(Value::deserialize(deserializer)?, Value::Bool(true)))
}

fn lenient_integer<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(text) => Some(leading_integer(&text)),
        Value::Bool(flag) => Some(i64::from(flag)),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    })
}

/// Integer prefix of `text` ("250 rows" is 250), or 0 when there is none
fn leading_integer(text: &str) -> i64 {
    let text = text.trim_start();
    let end = text
        .char_indices()
        .find(|&(i, c)| !(c.is_ascii_digit() || (i == 0 && (c == '-' || c == '+'))))
        .map_or(text.len(), |(i, _)| i);
    text[..end].parse().unwrap_or(0)
}

fn has_text(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|text| !text.trim().is_empty())
}

fn required_text(value: Option<String>, name: &'static str) -> Result<String, ValidationError> {
    match value {
        Some(text) if !text.trim().is_empty() => Ok(text),
        _ => Err(ValidationError::MissingField { name }),
    }
}

fn required_octet(value: Option<u32>, name: &'static str) -> Result<u8, ValidationError> {
    let value = value.ok_or(ValidationError::MissingField { name })?;
    u8::try_from(value).map_err(|_| ValidationError::InvalidAddress(value.to_string()))
}

fn required_id(value: Option<ReferenceId>, name: &'static str) -> Result<i64, ValidationError> {
    value
        .ok_or(ValidationError::MissingField { name })?
        .resolve(name)
}

impl BulkInsertPayload {
    fn uses_prefix(&self) -> bool {
        has_text(&self.network_prefix)
    }

    /// Report the first missing required field, range fields first
    fn check_required(&self) -> Result<(), ValidationError> {
        let range_fields = if self.uses_prefix() {
            [
                ("start_octet", self.start_octet.is_some()),
                ("end_octet", self.end_octet.is_some()),
            ]
        } else {
            [
                ("start_ip", has_text(&self.start_ip)),
                ("end_ip", has_text(&self.end_ip)),
            ]
        };
        let id_fields = [
            ("subnet_id", &self.subnet_id),
            ("device_type_id", &self.device_type_id),
            ("branch_id", &self.branch_id),
        ]
        .map(|(name, id)| (name, id.as_ref().is_some_and(|id| !id.is_blank())));

        match range_fields.into_iter().chain(id_fields).find(|(_, present)| !present) {
            Some((name, _)) => Err(ValidationError::MissingField { name }),
            None => Ok(()),
        }
    }

    fn range(&mut self) -> Result<RangeSpec, ValidationError> {
        match self.network_prefix.take() {
            Some(prefix) if !prefix.trim().is_empty() => {
                let start = required_octet(self.start_octet, "start_octet")?;
                let end = required_octet(self.end_octet, "end_octet")?;
                Ok(RangeSpec::from_octets(&prefix, start, end)?)
            }
            _ => {
                let start = required_text(self.start_ip.take(), "start_ip")?;
                let end = required_text(self.end_ip.take(), "end_ip")?;
                Ok(RangeSpec::from_addresses(&start, &end)?)
            }
        }
    }
}

impl TryFrom<BulkInsertPayload> for RangeRequest {
    type Error = ValidationError;

    fn try_from(mut payload: BulkInsertPayload) -> Result<Self, Self::Error> {
        payload.check_required()?;
        let range = payload.range()?;

        Ok(RangeRequest {
            range,
            subnet_id: required_id(payload.subnet_id, "subnet_id")?,
            device_type_id: required_id(payload.device_type_id, "device_type_id")?,
            branch_id: required_id(payload.branch_id, "branch_id")?,
            device_name_prefix: payload
                .device_name_prefix
                .unwrap_or_else(|| DEFAULT_NAME_PREFIX.to_string()),
            description: payload
                .description
                .unwrap_or_else(|| DEFAULT_DESCRIPTION.to_string()),
            skip_existing: payload.skip_existing,
            batch_size: payload.batch_size.map(|n| n.max(1) as usize),
        })
    }
}
