//! Site settings: a `(type, key) -> value` store for SEO and email options.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use validator::Validate;

/// Well-known setting groups and keys.
pub mod keys {
    pub const SEO: &str = "seo";
    pub const SEO_TITLE: &str = "title";
    pub const SEO_DESCRIPTION: &str = "description";
    pub const SEO_KEYWORDS: &str = "keywords";
    pub const SEO_OG_IMAGE: &str = "ogImage";
    pub const SEO_OG_TITLE: &str = "ogTitle";
    pub const SEO_OG_DESCRIPTION: &str = "ogDescription";

    pub const EMAIL: &str = "email";
    /// JSON array or comma-separated list of notification recipients.
    pub const EMAIL_RECEIVERS: &str = "receivers";
    /// Body template with `{{name}}`-style placeholders.
    pub const EMAIL_NOTIFICATION_TEMPLATE: &str = "notificationTemplate";
}

/// A stored setting. The value is text; structured values are JSON-encoded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteSetting {
    #[serde(rename = "type")]
    pub setting_type: String,
    pub key: String,
    pub value: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SiteSetting {
    /// The value parsed as JSON, or as a plain string when it is not JSON.
    pub fn decoded_value(&self) -> Value {
        decode_setting_value(&self.value)
    }
}

/// Insert-or-replace input keyed by `(setting_type, key)`.
#[derive(Debug, Clone, PartialEq)]
pub struct SettingUpsert {
    pub setting_type: String,
    pub key: String,
    pub value: String,
    pub description: Option<String>,
}

/// Strings are stored verbatim; every other JSON value as its JSON text.
pub fn encode_setting_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Inverse of [`encode_setting_value`] for reading.
pub fn decode_setting_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

/// Groups settings as `{type: {key: decoded value}}`.
pub fn group_settings(settings: &[SiteSetting]) -> BTreeMap<String, BTreeMap<String, Value>> {
    let mut grouped: BTreeMap<String, BTreeMap<String, Value>> = BTreeMap::new();
    for s in settings {
        grouped
            .entry(s.setting_type.clone())
            .or_default()
            .insert(s.key.clone(), s.decoded_value());
    }
    grouped
}

fn validate_present(value: &Value) -> Result<(), validator::ValidationError> {
    if value.is_null() {
        let mut err = validator::ValidationError::new("required");
        err.message = Some("Value is required".into());
        Err(err)
    } else {
        Ok(())
    }
}

/// Request payload for writing one setting.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpsertSettingRequest {
    #[serde(rename = "type", default)]
    #[validate(custom(function = "shared::validation::validate_identifier"))]
    pub setting_type: String,

    #[serde(default)]
    #[validate(custom(function = "shared::validation::validate_identifier"))]
    pub key: String,

    #[serde(default)]
    #[validate(custom(function = "validate_present"))]
    pub value: Value,

    #[validate(length(max = 500, message = "Description must be at most 500 characters"))]
    pub description: Option<String>,
}

impl From<UpsertSettingRequest> for SettingUpsert {
    fn from(r: UpsertSettingRequest) -> Self {
        Self {
            value: encode_setting_value(&r.value),
            setting_type: r.setting_type,
            key: r.key,
            description: r.description,
        }
    }
}

/// Request payload for writing several settings in one transaction.
#[derive(Debug, Clone, Deserialize)]
pub struct BatchUpsertSettingsRequest {
    #[serde(default)]
    pub settings: Vec<UpsertSettingRequest>,
}

/// Query for reading settings, optionally restricted to one group.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SettingsQuery {
    #[serde(rename = "type")]
    pub setting_type: Option<String>,
}

/// Query identifying one setting for deletion.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SettingKeyQuery {
    #[serde(rename = "type")]
    pub setting_type: Option<String>,
    pub key: Option<String>,
}

/// Settings listing: grouped view plus the raw rows.
#[derive(Debug, Clone, Serialize)]
pub struct SettingsResponse {
    pub settings: BTreeMap<String, BTreeMap<String, Value>>,
    pub raw: Vec<SiteSetting>,
}

impl From<Vec<SiteSetting>> for SettingsResponse {
    fn from(raw: Vec<SiteSetting>) -> Self {
        Self {
            settings: group_settings(&raw),
            raw,
        }
    }
}
