//! Curves and arrows: freeform or point-to-point strokes.
//!
//! Curves live in their own collection, separate from elements. Every curve
//! is stored as an [`ArrowElement`]; one with both ends null is a free curve.
//! The anchor fields are weak references into the element collection and are
//! only ever written by the anchor graph.

#[cfg(test)]
#[path = "curve_test.rs"]
mod curve_test;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::consts::{DEFAULT_BOWING, DEFAULT_FILL, DEFAULT_FILL_WEIGHT, DEFAULT_STROKE_COLOR, DEFAULT_STROKE_WIDTH};
use crate::doc::Document;
use crate::element::{ElementId, ElementKind, default_hachure_angle, default_hachure_gap, default_roughness};
use crate::error::{DocError, EntityKind};

/// Wire keys of the anchor fields.
pub const ANCHOR_FIELDS: [&str; 4] = ["startId", "endId", "startType", "endType"];

const CURVE_FIELDS: &[&str] = &[
    "fill",
    "points",
    "stroke",
    "strokeStyle",
    "strokeWidth",
    "fillStyle",
    "fillWeight",
    "roughness",
    "bowing",
    "seed",
    "hachureAngle",
    "hachureGap",
    "text",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrokeStyle {
    #[default]
    Solid,
    Dashed,
    Dotted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FillStyle {
    Solid,
    #[default]
    Hachure,
    CrossHatch,
    Zigzag,
    Dots,
    Dashed,
    ZigzagLine,
}

/// Variant-kind hint recorded next to an anchor id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnchorKind {
    #[serde(rename = "bookText")]
    BookText,
    #[serde(rename = "text")]
    Text,
}

impl AnchorKind {
    /// The hint matching an element variant, if that variant has one.
    #[must_use]
    pub fn for_element(kind: ElementKind) -> Option<Self> {
        match kind {
            ElementKind::BookText => Some(Self::BookText),
            ElementKind::Text => Some(Self::Text),
            ElementKind::Rect | ElementKind::Circle => None,
        }
    }
}

/// Which end of an arrow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrowEnd {
    Start,
    End,
}

/// A weak reference from an arrow end to an element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Anchor {
    pub target: ElementId,
    pub kind: Option<AnchorKind>,
}

impl Anchor {
    #[must_use]
    pub fn new(target: impl Into<ElementId>, kind: Option<AnchorKind>) -> Self {
        Self { target: target.into(), kind }
    }
}

/// Geometry and rough-stroke style of a curve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurveSkeleton {
    pub id: ElementId,
    #[serde(default = "default_fill")]
    pub fill: String,
    /// Flattened x,y pairs.
    #[serde(default)]
    pub points: Vec<f64>,
    #[serde(default = "default_stroke")]
    pub stroke: String,
    #[serde(default)]
    pub stroke_style: StrokeStyle,
    #[serde(default = "default_stroke_width")]
    pub stroke_width: f64,
    #[serde(default)]
    pub fill_style: FillStyle,
    #[serde(default = "default_fill_weight")]
    pub fill_weight: f64,
    #[serde(default = "default_roughness")]
    pub roughness: f64,
    #[serde(default = "default_bowing")]
    pub bowing: f64,
    #[serde(default)]
    pub seed: u64,
    #[serde(default = "default_hachure_angle")]
    pub hachure_angle: f64,
    #[serde(default = "default_hachure_gap")]
    pub hachure_gap: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl CurveSkeleton {
    /// A curve with default style through the given flattened points.
    #[must_use]
    pub fn new(id: impl Into<ElementId>, points: Vec<f64>) -> Self {
        Self {
            id: id.into(),
            fill: default_fill(),
            points,
            stroke: default_stroke(),
            stroke_style: StrokeStyle::default(),
            stroke_width: DEFAULT_STROKE_WIDTH,
            fill_style: FillStyle::default(),
            fill_weight: DEFAULT_FILL_WEIGHT,
            roughness: default_roughness(),
            bowing: DEFAULT_BOWING,
            seed: 0,
            hachure_angle: default_hachure_angle(),
            hachure_gap: default_hachure_gap(),
            text: None,
        }
    }

    /// Check the id is present and `points` holds whole finite x,y pairs.
    ///
    /// # Errors
    ///
    /// Returns `Validation` describing the first problem found.
    pub fn validate(&self) -> Result<(), DocError> {
        if self.id.is_empty() {
            return Err(DocError::validation("curve id must not be empty"));
        }
        if self.points.len() % 2 != 0 {
            return Err(DocError::validation(format!(
                "curve {} has {} point coordinates; expected x,y pairs",
                self.id,
                self.points.len()
            )));
        }
        if self.points.iter().any(|p| !p.is_finite()) {
            return Err(DocError::validation(format!("curve {} has a non-finite point", self.id)));
        }
        Ok(())
    }
}

/// A curve optionally anchored at each end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArrowElement {
    #[serde(flatten)]
    pub curve: CurveSkeleton,
    #[serde(default)]
    pub start_id: Option<ElementId>,
    #[serde(default)]
    pub end_id: Option<ElementId>,
    #[serde(default)]
    pub start_type: Option<AnchorKind>,
    #[serde(default)]
    pub end_type: Option<AnchorKind>,
}

impl ArrowElement {
    #[must_use]
    pub fn new(curve: CurveSkeleton, start: Option<Anchor>, end: Option<Anchor>) -> Self {
        let mut arrow = Self { curve, start_id: None, end_id: None, start_type: None, end_type: None };
        arrow.set_end(ArrowEnd::Start, start);
        arrow.set_end(ArrowEnd::End, end);
        arrow
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.curve.id
    }

    /// The element id anchored at `end`, if any.
    #[must_use]
    pub fn end_id(&self, end: ArrowEnd) -> Option<&str> {
        match end {
            ArrowEnd::Start => self.start_id.as_deref(),
            ArrowEnd::End => self.end_id.as_deref(),
        }
    }

    /// The type hint recorded at `end`.
    #[must_use]
    pub fn end_type(&self, end: ArrowEnd) -> Option<AnchorKind> {
        match end {
            ArrowEnd::Start => self.start_type,
            ArrowEnd::End => self.end_type,
        }
    }

    pub(crate) fn set_end(&mut self, end: ArrowEnd, anchor: Option<Anchor>) {
        let (id, kind) = match anchor {
            Some(a) => (Some(a.target), a.kind),
            None => (None, None),
        };
        match end {
            ArrowEnd::Start => {
                self.start_id = id;
                self.start_type = kind;
            }
            ArrowEnd::End => {
                self.end_id = id;
                self.end_type = kind;
            }
        }
    }

    /// True when neither end is anchored.
    #[must_use]
    pub fn is_free(&self) -> bool {
        self.start_id.is_none() && self.end_id.is_none()
    }

    /// Structural checks that need no document: curve geometry, and no type
    /// hint on a null end.
    ///
    /// # Errors
    ///
    /// Returns `Validation` describing the first problem found.
    pub fn validate(&self) -> Result<(), DocError> {
        self.curve.validate()?;
        if (self.start_id.is_none() && self.start_type.is_some()) || (self.end_id.is_none() && self.end_type.is_some()) {
            return Err(DocError::validation(format!("arrow {} has an anchor type on a null end", self.id())));
        }
        Ok(())
    }
}

impl Document {
    /// Patch the style or geometry of a curve. Anchor fields go through
    /// [`Document::retarget_arrow_end`].
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown arrow and `Validation` for an id
    /// change, an anchor field, a foreign field or an ill-typed value.
    pub fn update_curve(&mut self, id: &str, patch: &Map<String, Value>) -> Result<ArrowElement, DocError> {
        let arrow = self.curves.get(id).ok_or_else(|| DocError::not_found(EntityKind::Arrow, id))?;

        for (key, value) in patch {
            if key == "id" {
                if value.as_str() == Some(id) {
                    continue;
                }
                return Err(DocError::validation("curve id is immutable"));
            }
            if ANCHOR_FIELDS.contains(&key.as_str()) {
                return Err(DocError::validation(format!("`{key}` must be changed by retargeting the arrow")));
            }
            if !CURVE_FIELDS.contains(&key.as_str()) {
                return Err(DocError::validation(format!("field `{key}` is not legal for a curve")));
            }
        }

        let mut record = match serde_json::to_value(&arrow.curve) {
            Ok(Value::Object(map)) => map,
            Ok(other) => return Err(DocError::validation(format!("curve encoded as non-object: {other}"))),
            Err(e) => return Err(DocError::validation(e.to_string())),
        };
        for (key, value) in patch {
            if key == "id" {
                continue;
            }
            if value.is_null() {
                record.remove(key);
            } else {
                record.insert(key.clone(), value.clone());
            }
        }
        let curve: CurveSkeleton =
            serde_json::from_value(Value::Object(record)).map_err(|e| DocError::validation(e.to_string()))?;
        curve.validate()?;

        let Some(arrow) = self.curves.get_mut(id) else {
            return Err(DocError::not_found(EntityKind::Arrow, id));
        };
        arrow.curve = curve;
        tracing::debug!(arrow_id = %id, "curve updated");
        Ok(arrow.clone())
    }
}

fn default_fill() -> String {
    DEFAULT_FILL.to_string()
}

fn default_stroke() -> String {
    DEFAULT_STROKE_COLOR.to_string()
}

fn default_stroke_width() -> f64 {
    DEFAULT_STROKE_WIDTH
}

fn default_fill_weight() -> f64 {
    DEFAULT_FILL_WEIGHT
}

fn default_bowing() -> f64 {
    DEFAULT_BOWING
}
