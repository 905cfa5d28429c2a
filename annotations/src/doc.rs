//! Document session: the element map, curve map, highlights and view of one
//! open document, plus the snapshot it is persisted as.
//!
//! A `Document` is the unit of editing. Every mutation takes `&mut self`, so
//! a host that shares a document across threads must put it behind a single
//! lock, which serializes anchor-graph mutations in issue order. Persistence
//! is whole-document and last-write-wins; there is no merge.

#[cfg(test)]
#[path = "doc_test.rs"]
mod doc_test;

use std::collections::HashMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::anchor;
use crate::curve::{ArrowElement, ArrowEnd};
use crate::element::{Element, ElementId, ElementKind};
use crate::error::{DocError, EntityKind};
use crate::highlight::Highlight;
use crate::view::{Point, ViewTransform, check_scale};

/// The persisted form of a document, loaded and saved as one unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentSnapshot {
    /// Each record is checked against its variant's field table on decode.
    #[serde(default, deserialize_with = "deserialize_elements")]
    pub elements: Vec<Element>,
    #[serde(default)]
    pub curve_elements: Vec<ArrowElement>,
    #[serde(default)]
    pub highlights: Vec<Highlight>,
    #[serde(default)]
    pub offset_position: Point,
    #[serde(default = "default_scale")]
    pub scale: f64,
}

impl Default for DocumentSnapshot {
    fn default() -> Self {
        Self {
            elements: Vec::new(),
            curve_elements: Vec::new(),
            highlights: Vec::new(),
            offset_position: Point::default(),
            scale: default_scale(),
        }
    }
}

impl DocumentSnapshot {
    /// Whether the index sets persisted on the elements equal the ones the
    /// arrows imply.
    #[must_use]
    pub fn anchor_index_matches(&self) -> bool {
        anchor::index_matches(self.elements.iter(), self.curve_elements.iter())
    }
}

/// One open document.
#[derive(Debug, Clone, Default)]
pub struct Document {
    pub(crate) elements: HashMap<ElementId, Element>,
    pub(crate) curves: HashMap<ElementId, ArrowElement>,
    pub(crate) highlights: Vec<Highlight>,
    view: ViewTransform,
}

impl Document {
    /// Create an empty document with an identity view.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a persisted snapshot.
    ///
    /// The anchor index stored on the elements is discarded and rebuilt from
    /// the arrows.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for an illegal scale, an empty element id, a
    /// malformed curve or an anchor type that does not match its element,
    /// `Conflict` for a repeated id and `NotFound` for an arrow anchored to a
    /// missing element.
    pub fn from_snapshot(snapshot: DocumentSnapshot) -> Result<Self, DocError> {
        check_scale(snapshot.scale)?;
        let stale_index = !snapshot.anchor_index_matches();

        let mut doc = Self {
            view: ViewTransform { offset_position: snapshot.offset_position, scale: snapshot.scale },
            ..Self::default()
        };

        for element in snapshot.elements {
            if element.id().is_empty() {
                return Err(DocError::validation("element id must not be empty"));
            }
            doc.ensure_id_free(element.id())?;
            doc.elements.insert(element.id().to_string(), element);
        }
        for arrow in snapshot.curve_elements {
            arrow.validate()?;
            doc.ensure_id_free(arrow.id())?;
            for end in [ArrowEnd::Start, ArrowEnd::End] {
                if let Some(target) = arrow.end_id(end) {
                    doc.check_anchor(target, arrow.end_type(end))?;
                }
            }
            doc.curves.insert(arrow.id().to_string(), arrow);
        }
        for highlight in snapshot.highlights {
            highlight.validate()?;
            if doc.highlights.iter().any(|h| h.id == highlight.id) {
                return Err(DocError::Conflict(highlight.id));
            }
            doc.highlights.push(highlight);
        }

        if stale_index {
            tracing::warn!("snapshot anchor index diverged from arrows; rebuilt");
        }
        doc.rebuild_anchor_index();
        tracing::debug!(
            elements = doc.elements.len(),
            curves = doc.curves.len(),
            highlights = doc.highlights.len(),
            "document loaded"
        );
        Ok(doc)
    }

    /// Capture the document for persistence. Elements and curves are sorted
    /// by id; highlights keep insertion order.
    #[must_use]
    pub fn snapshot(&self) -> DocumentSnapshot {
        DocumentSnapshot {
            elements: self.elements().into_iter().cloned().collect(),
            curve_elements: self.arrows().into_iter().cloned().collect(),
            highlights: self.highlights.clone(),
            offset_position: self.view.offset_position,
            scale: self.view.scale,
        }
    }

    // --- Elements ---

    /// Create an element of `kind` from a JSON field map. The id is chosen
    /// by the caller.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for an illegal field set and `Conflict` when the
    /// id is already used by an element or curve.
    pub fn create_element(&mut self, kind: ElementKind, fields: &Map<String, Value>) -> Result<Element, DocError> {
        let element = Element::from_fields(kind, fields)?;
        self.ensure_id_free(element.id())?;
        self.elements.insert(element.id().to_string(), element.clone());
        tracing::debug!(element_id = %element.id(), kind = kind.tag(), "element created");
        Ok(element)
    }

    /// Patch an existing element. See [`Element::apply_patch`].
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown id and `Validation` for an illegal
    /// patch, including any attempt to change `type`.
    pub fn update_element(&mut self, id: &str, patch: &Map<String, Value>) -> Result<Element, DocError> {
        let element = self.elements.get_mut(id).ok_or_else(|| DocError::not_found(EntityKind::Element, id))?;
        element.apply_patch(patch)?;
        tracing::debug!(element_id = %id, "element updated");
        Ok(element.clone())
    }

    #[must_use]
    pub fn element(&self, id: &str) -> Option<&Element> {
        self.elements.get(id)
    }

    /// All elements, sorted by id.
    #[must_use]
    pub fn elements(&self) -> Vec<&Element> {
        let mut out: Vec<&Element> = self.elements.values().collect();
        out.sort_by(|a, b| a.id().cmp(b.id()));
        out
    }

    // --- Curves ---

    #[must_use]
    pub fn arrow(&self, id: &str) -> Option<&ArrowElement> {
        self.curves.get(id)
    }

    /// All curves and arrows, sorted by id.
    #[must_use]
    pub fn arrows(&self) -> Vec<&ArrowElement> {
        let mut out: Vec<&ArrowElement> = self.curves.values().collect();
        out.sort_by(|a, b| a.id().cmp(b.id()));
        out
    }

    // --- View ---

    #[must_use]
    pub fn view(&self) -> ViewTransform {
        self.view
    }

    /// Pan the view by a viewport-space delta.
    pub fn pan(&mut self, dx: f64, dy: f64) {
        self.view.pan(dx, dy);
    }

    /// Zoom the view around a viewport-space pivot.
    ///
    /// # Errors
    ///
    /// Returns `Validation` if the resulting scale would be non-positive.
    pub fn zoom(&mut self, factor: f64, pivot: Point) -> Result<(), DocError> {
        self.view.zoom(factor, pivot)
    }

    // --- Shared checks ---

    pub(crate) fn ensure_id_free(&self, id: &str) -> Result<(), DocError> {
        if self.elements.contains_key(id) || self.curves.contains_key(id) {
            return Err(DocError::Conflict(id.to_string()));
        }
        Ok(())
    }

    pub(crate) fn require_element(&self, id: &str) -> Result<&Element, DocError> {
        self.elements.get(id).ok_or_else(|| DocError::not_found(EntityKind::Element, id))
    }
}

fn deserialize_elements<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<Element>, D::Error> {
    let records = Vec::<Map<String, Value>>::deserialize(deserializer)?;
    records
        .into_iter()
        .map(|record| Element::from_record(record).map_err(serde::de::Error::custom))
        .collect()
}

fn default_scale() -> f64 {
    1.0
}
