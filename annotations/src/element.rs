//! Canvas elements: the shared skeleton and the closed set of variants.
//!
//! Every element carries the same geometry/style skeleton plus the fields of
//! exactly one variant, selected by the immutable `type` tag. Elements are
//! built and patched from JSON field maps; the per-variant field tables in
//! [`ElementKind`] decide which keys are legal before serde sees them.
//!
//! `outgoingArrowIds` / `incomingArrowIds` are a cache owned by the anchor
//! graph and are never accepted from callers.

#[cfg(test)]
#[path = "element_test.rs"]
mod element_test;

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::consts::{
    DEFAULT_FILL, DEFAULT_FONT_FAMILY, DEFAULT_FONT_SIZE, DEFAULT_HACHURE_ANGLE, DEFAULT_HACHURE_GAP,
    DEFAULT_OPACITY, DEFAULT_ROUGHNESS, DEFAULT_STROKE_COLOR, DEFAULT_STROKE_WIDTH,
};
use crate::curve::FillStyle;
use crate::error::DocError;
use crate::view::Point;

/// Unique identifier for an element or curve within a document.
pub type ElementId = String;

/// Wire key of the discriminator tag.
pub const TYPE_FIELD: &str = "type";

/// Index fields written only by the anchor graph.
pub const INDEX_FIELDS: [&str; 2] = ["outgoingArrowIds", "incomingArrowIds"];

const SKELETON_REQUIRED: &[&str] = &["id", "x", "y", "width", "height"];
const SKELETON_OPTIONAL: &[&str] = &["fill", "strokeColor", "strokeWidth", "opacity", "rotation", "points"];

const TEXT_REQUIRED: &[&str] = &["text"];
const TEXT_OPTIONAL: &[&str] = &["fontFamily", "fontSize"];
const CIRCLE_REQUIRED: &[&str] = &["radius"];
const SHAPE_OPTIONAL: &[&str] = &["fillStyle", "roughness", "seed", "hachureGap", "hachureAngle"];

/// The discriminator of an element variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElementKind {
    #[serde(rename = "text")]
    Text,
    #[serde(rename = "rect")]
    Rect,
    #[serde(rename = "circle")]
    Circle,
    #[serde(rename = "bookText")]
    BookText,
}

impl ElementKind {
    pub const ALL: [Self; 4] = [Self::Text, Self::Rect, Self::Circle, Self::BookText];

    /// The wire value of the `type` tag.
    #[must_use]
    pub fn tag(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Rect => "rect",
            Self::Circle => "circle",
            Self::BookText => "bookText",
        }
    }

    #[must_use]
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.tag() == tag)
    }

    fn variant_required(self) -> &'static [&'static str] {
        match self {
            Self::Text | Self::BookText => TEXT_REQUIRED,
            Self::Rect => &[],
            Self::Circle => CIRCLE_REQUIRED,
        }
    }

    fn variant_optional(self) -> &'static [&'static str] {
        match self {
            Self::Text | Self::BookText => TEXT_OPTIONAL,
            Self::Rect | Self::Circle => SHAPE_OPTIONAL,
        }
    }

    /// Fields that must be present when creating this variant.
    pub fn required_fields(self) -> impl Iterator<Item = &'static str> {
        SKELETON_REQUIRED.iter().chain(self.variant_required()).copied()
    }

    /// Fields that may be present; omitted ones take their defaults.
    pub fn optional_fields(self) -> impl Iterator<Item = &'static str> {
        SKELETON_OPTIONAL.iter().chain(self.variant_optional()).copied()
    }

    #[must_use]
    pub fn is_required(self, field: &str) -> bool {
        self.required_fields().any(|f| f == field)
    }

    /// Whether `field` belongs to this variant's field set.
    #[must_use]
    pub fn allows(self, field: &str) -> bool {
        self.is_required(field) || self.optional_fields().any(|f| f == field)
    }
}

/// Geometry and style shared by every element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementSkeleton {
    pub id: ElementId,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    #[serde(default = "default_fill")]
    pub fill: String,
    #[serde(default = "default_stroke_color")]
    pub stroke_color: String,
    #[serde(default = "default_stroke_width")]
    pub stroke_width: f64,
    #[serde(default = "default_opacity")]
    pub opacity: f64,
    /// Degrees, clockwise.
    #[serde(default)]
    pub rotation: f64,
    /// Ids of arrows whose `startId` is this element.
    #[serde(default)]
    pub outgoing_arrow_ids: BTreeSet<String>,
    /// Ids of arrows whose `endId` is this element.
    #[serde(default)]
    pub incoming_arrow_ids: BTreeSet<String>,
    /// Shape-specific control points.
    #[serde(default)]
    pub points: Vec<Point>,
}

/// Free text, or a reflowed fragment of book content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextFields {
    pub text: String,
    #[serde(default = "default_font_family")]
    pub font_family: String,
    #[serde(default = "default_font_size")]
    pub font_size: f64,
}

/// Rough-fill texture of a rectangle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShapeFields {
    #[serde(default)]
    pub fill_style: FillStyle,
    #[serde(default = "default_roughness")]
    pub roughness: f64,
    #[serde(default)]
    pub seed: u64,
    #[serde(default = "default_hachure_gap")]
    pub hachure_gap: f64,
    #[serde(default = "default_hachure_angle")]
    pub hachure_angle: f64,
}

/// Rough-fill texture of a circle plus its radius.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CircleFields {
    pub radius: f64,
    #[serde(default)]
    pub fill_style: FillStyle,
    #[serde(default = "default_roughness")]
    pub roughness: f64,
    #[serde(default)]
    pub seed: u64,
    #[serde(default = "default_hachure_gap")]
    pub hachure_gap: f64,
    #[serde(default = "default_hachure_angle")]
    pub hachure_angle: f64,
}

/// Variant-specific fields, tagged by `type` on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ElementVariant {
    #[serde(rename = "text")]
    Text(TextFields),
    #[serde(rename = "rect")]
    Rect(ShapeFields),
    #[serde(rename = "circle")]
    Circle(CircleFields),
    /// Content derived from the layout engine rather than typed by the user.
    #[serde(rename = "bookText")]
    BookText(TextFields),
}

/// A persisted canvas drawable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    #[serde(flatten)]
    pub skeleton: ElementSkeleton,
    #[serde(flatten)]
    pub variant: ElementVariant,
}

impl Element {
    /// Build an element of `kind` from a JSON field map.
    ///
    /// `fields` must hold every required field of the variant and nothing
    /// outside its field set. A `type` entry is tolerated only when it names
    /// `kind`.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for missing, foreign, index or ill-typed fields.
    pub fn from_fields(kind: ElementKind, fields: &Map<String, Value>) -> Result<Self, DocError> {
        for (key, value) in fields {
            if key == TYPE_FIELD {
                check_tag(kind, value)?;
                continue;
            }
            check_writable(kind, key)?;
        }
        for required in kind.required_fields() {
            if fields.get(required).is_none_or(Value::is_null) {
                return Err(DocError::validation(format!("{} requires field `{required}`", kind.tag())));
            }
        }

        let mut record = fields.clone();
        record.insert(TYPE_FIELD.into(), Value::String(kind.tag().into()));
        let element = decode(record)?;
        if element.id().is_empty() {
            return Err(DocError::validation("element id must not be empty"));
        }
        Ok(element)
    }

    /// Rebuild an element from its persisted record.
    ///
    /// Unlike [`Element::from_fields`] the record carries its own `type` and
    /// may hold the anchor index fields. Any other key outside the variant's
    /// field set is rejected rather than dropped.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for a missing or unknown `type`, a foreign field,
    /// an empty id or an ill-typed value.
    pub fn from_record(record: Map<String, Value>) -> Result<Self, DocError> {
        let Some(tag) = record.get(TYPE_FIELD).and_then(Value::as_str) else {
            return Err(DocError::validation("element record has no `type`"));
        };
        let kind = ElementKind::from_tag(tag)
            .ok_or_else(|| DocError::validation(format!("unknown element type `{tag}`")))?;
        for key in record.keys() {
            if key == TYPE_FIELD || INDEX_FIELDS.contains(&key.as_str()) {
                continue;
            }
            if !kind.allows(key) {
                return Err(DocError::validation(format!("field `{key}` is not legal for {}", kind.tag())));
            }
        }
        let element = decode(record)?;
        if element.id().is_empty() {
            return Err(DocError::validation("element id must not be empty"));
        }
        Ok(element)
    }

    /// Apply a sparse patch. `null` resets an optional field to its default.
    ///
    /// The element is left untouched if any part of the patch is rejected.
    ///
    /// # Errors
    ///
    /// Returns `Validation` on a type change, an id change, an index field, a
    /// foreign field, a null required field or an ill-typed value.
    pub fn apply_patch(&mut self, patch: &Map<String, Value>) -> Result<(), DocError> {
        let kind = self.kind();
        for (key, value) in patch {
            match key.as_str() {
                TYPE_FIELD => check_tag(kind, value)?,
                "id" if value.as_str() == Some(self.id()) => {}
                "id" => return Err(DocError::validation("element id is immutable")),
                _ => {
                    check_writable(kind, key)?;
                    if value.is_null() && kind.is_required(key) {
                        return Err(DocError::validation(format!("field `{key}` cannot be cleared")));
                    }
                }
            }
        }

        let mut record = encode(self)?;
        for (key, value) in patch {
            if key == TYPE_FIELD || key == "id" {
                continue;
            }
            if value.is_null() {
                record.remove(key);
            } else {
                record.insert(key.clone(), value.clone());
            }
        }
        *self = decode(record)?;
        Ok(())
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.skeleton.id
    }

    #[must_use]
    pub fn kind(&self) -> ElementKind {
        match self.variant {
            ElementVariant::Text(_) => ElementKind::Text,
            ElementVariant::Rect(_) => ElementKind::Rect,
            ElementVariant::Circle(_) => ElementKind::Circle,
            ElementVariant::BookText(_) => ElementKind::BookText,
        }
    }

    /// Text content for the text-bearing variants.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        match &self.variant {
            ElementVariant::Text(t) | ElementVariant::BookText(t) => Some(&t.text),
            ElementVariant::Rect(_) | ElementVariant::Circle(_) => None,
        }
    }
}

fn check_tag(kind: ElementKind, value: &Value) -> Result<(), DocError> {
    if value.as_str() == Some(kind.tag()) {
        Ok(())
    } else {
        Err(DocError::validation(format!("type is immutable: element is `{}`, got {value}", kind.tag())))
    }
}

fn check_writable(kind: ElementKind, key: &str) -> Result<(), DocError> {
    if INDEX_FIELDS.contains(&key) {
        return Err(DocError::validation(format!("`{key}` is maintained by the anchor graph")));
    }
    if !kind.allows(key) {
        return Err(DocError::validation(format!("field `{key}` is not legal for {}", kind.tag())));
    }
    Ok(())
}

fn encode(element: &Element) -> Result<Map<String, Value>, DocError> {
    match serde_json::to_value(element) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(DocError::validation(format!("element encoded as non-object: {other}"))),
        Err(e) => Err(DocError::validation(e.to_string())),
    }
}

fn decode(record: Map<String, Value>) -> Result<Element, DocError> {
    serde_json::from_value(Value::Object(record)).map_err(|e| DocError::validation(e.to_string()))
}

fn default_fill() -> String {
    DEFAULT_FILL.to_string()
}

fn default_stroke_color() -> String {
    DEFAULT_STROKE_COLOR.to_string()
}

fn default_stroke_width() -> f64 {
    DEFAULT_STROKE_WIDTH
}

fn default_opacity() -> f64 {
    DEFAULT_OPACITY
}

fn default_font_family() -> String {
    DEFAULT_FONT_FAMILY.to_string()
}

fn default_font_size() -> f64 {
    DEFAULT_FONT_SIZE
}

pub(crate) fn default_roughness() -> f64 {
    DEFAULT_ROUGHNESS
}

pub(crate) fn default_hachure_gap() -> f64 {
    DEFAULT_HACHURE_GAP
}

pub(crate) fn default_hachure_angle() -> f64 {
    DEFAULT_HACHURE_ANGLE
}
