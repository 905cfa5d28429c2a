#[cfg(test)]
#[path = "view_test.rs"]
mod view_test;

use serde::{Deserialize, Serialize};

use crate::error::DocError;

/// A point in either viewport or document space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Pan/zoom mapping from document space to viewport space.
///
/// `viewport = document * scale + offset_position`. One per document; it
/// knows nothing about elements.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewTransform {
    pub offset_position: Point,
    pub scale: f64,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self { offset_position: Point::default(), scale: 1.0 }
    }
}

impl ViewTransform {
    /// Build a transform, rejecting a non-positive or non-finite scale.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for an illegal scale.
    pub fn new(offset_position: Point, scale: f64) -> Result<Self, DocError> {
        check_scale(scale)?;
        Ok(Self { offset_position, scale })
    }

    /// Shift the pan offset by `(dx, dy)` viewport units.
    pub fn pan(&mut self, dx: f64, dy: f64) {
        self.offset_position.x += dx;
        self.offset_position.y += dy;
        tracing::debug!(x = self.offset_position.x, y = self.offset_position.y, "view panned");
    }

    /// Multiply the scale by `factor`, keeping the viewport point `pivot`
    /// over the same document point.
    ///
    /// # Errors
    ///
    /// Returns `Validation` if the resulting scale would be non-positive or
    /// non-finite. The transform is left untouched on error.
    pub fn zoom(&mut self, factor: f64, pivot: Point) -> Result<(), DocError> {
        let next = self.scale * factor;
        check_scale(next)?;
        let anchor = self.to_document(pivot);
        self.scale = next;
        self.offset_position = Point {
            x: pivot.x - anchor.x * next,
            y: pivot.y - anchor.y * next,
        };
        tracing::debug!(scale = next, "view zoomed");
        Ok(())
    }

    /// Convert a document-space point to viewport coordinates.
    #[must_use]
    pub fn to_viewport(&self, doc: Point) -> Point {
        Point {
            x: doc.x * self.scale + self.offset_position.x,
            y: doc.y * self.scale + self.offset_position.y,
        }
    }

    /// Convert a viewport point to document coordinates.
    #[must_use]
    pub fn to_document(&self, viewport: Point) -> Point {
        Point {
            x: (viewport.x - self.offset_position.x) / self.scale,
            y: (viewport.y - self.offset_position.y) / self.scale,
        }
    }

    /// Convert a viewport distance to a document distance.
    #[must_use]
    pub fn viewport_dist_to_document(&self, dist: f64) -> f64 {
        dist / self.scale
    }
}

pub(crate) fn check_scale(scale: f64) -> Result<(), DocError> {
    if scale.is_finite() && scale > 0.0 {
        Ok(())
    } else {
        Err(DocError::validation(format!("scale must be positive and finite, got {scale}")))
    }
}
