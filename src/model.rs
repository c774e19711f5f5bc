//! Core data model for certificate generation.
//!
//! All types derive `Serialize + Deserialize` so the same structs work for
//! Rust API construction, JSON schema export/import, and the HTTP surface.
//! Wire field names are camelCase to stay round-trippable with the
//! JSON-shaped exports described in the external interface contract.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Page orientation of a certificate template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Orientation {
    #[serde(rename = "landscape-A4")]
    LandscapeA4,
    #[serde(rename = "portrait-A4")]
    PortraitA4,
}

/// Source format tag of the uploaded template artwork.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TemplateFormat {
    Png,
    Pdf,
    Ai,
}

/// A named, coded background design for a certificate.
///
/// `code` is the stable key recipients reference; it is uppercase-normalized
/// on registration and never changes afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    pub id: String,
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub orientation: Orientation,
    pub format: TemplateFormat,
    /// Background artwork reference: an `http(s)` URL or a filesystem path.
    pub background_image: String,
}

/// Horizontal text alignment within a placeholder box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}

/// A named text field with position, size, and style, defined against a
/// template's layout schema. Geometry is in design units (800×566 canvas).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Placeholder {
    pub id: String,
    /// Binding key, unique within its schema (e.g. `recipient_name`).
    pub key: String,
    pub label: String,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub font_size: f32,
    /// `#rrggbb` hex color.
    pub color: String,
    pub align: Align,
}

/// A per-recipient partial replacement of a placeholder's style/geometry.
///
/// Identity fields (`id`, `key`, `label`) are not representable here, so an
/// override can never rename or re-key a placeholder. Absent fields keep the
/// base value at resolve time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceholderOverride {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub align: Option<Align>,
}

impl PlaceholderOverride {
    /// True when no field is set (the override changes nothing).
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// Generation status of a recipient's certificate image.
///
/// Only ever advances `Pending → Generated`; nothing in the core reverts it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CertificateStatus {
    #[default]
    Pending,
    Generated,
}

fn default_enabled() -> bool {
    true
}

/// An awardee record: the data merged into a certificate template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipient {
    pub id: String,
    pub name: String,
    pub phone: String,
    pub award_title: String,
    pub award_rank: String,
    /// Award date, `YYYY-MM-DD`.
    pub date: String,
    pub cert_number: String,
    pub org_id: String,
    pub template_code: String,
    /// Per-placeholder-key layout/style adjustments for this recipient.
    #[serde(default, rename = "placeholderOverrides")]
    pub overrides: HashMap<String, PlaceholderOverride>,
    #[serde(default)]
    pub status: CertificateStatus,
    /// Gates visibility to the public query interface only; administrative
    /// listing always sees the record.
    #[serde(default = "default_enabled", rename = "isEnabled")]
    pub enabled: bool,
}

/// An issuing organization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Organization {
    pub id: String,
    pub name: String,
}

/// Which input row a validation error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowRef {
    /// The header row of the tabular input.
    Header,
    /// A 1-based data row number.
    Data(u32),
}

impl Serialize for RowRef {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            RowRef::Header => serializer.serialize_str("header"),
            RowRef::Data(n) => serializer.serialize_u32(*n),
        }
    }
}

impl<'de> Deserialize<'de> for RowRef {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Num(u32),
            Text(String),
        }
        match Raw::deserialize(deserializer)? {
            Raw::Num(n) => Ok(RowRef::Data(n)),
            Raw::Text(s) if s == "header" => Ok(RowRef::Header),
            Raw::Text(s) => Err(serde::de::Error::custom(format!(
                "expected row number or \"header\", got {:?}",
                s
            ))),
        }
    }
}

/// A single import validation finding, attributable to a row and optionally
/// a column. Collected, never thrown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationError {
    pub row: RowRef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<String>,
    pub message: String,
}

impl ValidationError {
    pub fn row(row: RowRef, message: impl Into<String>) -> Self {
        Self {
            row,
            column: None,
            message: message.into(),
        }
    }

    pub fn column(row: RowRef, column: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            row,
            column: Some(column.into()),
            message: message.into(),
        }
    }
}
