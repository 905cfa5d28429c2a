//! Highlights: independent overlay regions in document space.
//!
//! A highlight is only a pair of corners. It has no link to elements or
//! arrows, and the lines it covers are recomputed from the current layout on
//! every call because layout can change independently of highlights.

#[cfg(test)]
#[path = "highlight_test.rs"]
mod highlight_test;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::doc::Document;
use crate::error::{DocError, EntityKind};
use crate::layout::ProcessedLine;

/// A rectangular or linear region of interest.
///
/// Corners are stored as dragged: `end_x < starting_x` is legal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Highlight {
    pub id: String,
    pub starting_x: f64,
    pub starting_y: f64,
    pub end_x: f64,
    pub end_y: f64,
}

impl Highlight {
    /// The vertical extent as `(top, bottom)`, whichever way it was dragged.
    #[must_use]
    pub fn vertical_span(&self) -> (f64, f64) {
        (self.starting_y.min(self.end_y), self.starting_y.max(self.end_y))
    }

    pub(crate) fn validate(&self) -> Result<(), DocError> {
        let coords = [self.starting_x, self.starting_y, self.end_x, self.end_y];
        if coords.iter().all(|c| c.is_finite()) {
            Ok(())
        } else {
            Err(DocError::validation(format!("highlight {} has a non-finite coordinate", self.id)))
        }
    }
}

/// `line_y` of every line whose row band intersects the highlight's
/// vertical span. Row `n` occupies `[n * line_height, (n + 1) * line_height)`.
///
/// # Errors
///
/// Returns `Validation` if `line_height` is not positive and finite.
pub fn lines_under_highlight(
    highlight: &Highlight,
    lines: &[ProcessedLine],
    line_height: f64,
) -> Result<Vec<usize>, DocError> {
    if !(line_height.is_finite() && line_height > 0.0) {
        return Err(DocError::validation(format!("line height must be positive, got {line_height}")));
    }
    let (top, bottom) = highlight.vertical_span();
    Ok(lines
        .iter()
        .filter(|line| {
            #[allow(clippy::cast_precision_loss)]
            let row_top = line.line_y as f64 * line_height;
            top < row_top + line_height && bottom >= row_top
        })
        .map(|line| line.line_y)
        .collect())
}

impl Document {
    /// Add a highlight with a generated id.
    ///
    /// # Errors
    ///
    /// Returns `Validation` if any coordinate is not finite.
    pub fn add_highlight(
        &mut self,
        starting_x: f64,
        starting_y: f64,
        end_x: f64,
        end_y: f64,
    ) -> Result<Highlight, DocError> {
        let highlight = Highlight { id: Uuid::new_v4().to_string(), starting_x, starting_y, end_x, end_y };
        highlight.validate()?;
        self.highlights.push(highlight.clone());
        tracing::debug!(highlight_id = %highlight.id, "highlight added");
        Ok(highlight)
    }

    /// Remove a highlight by id.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no highlight has this id.
    pub fn remove_highlight(&mut self, id: &str) -> Result<Highlight, DocError> {
        let pos = self
            .highlights
            .iter()
            .position(|h| h.id == id)
            .ok_or_else(|| DocError::not_found(EntityKind::Highlight, id))?;
        let removed = self.highlights.remove(pos);
        tracing::debug!(highlight_id = %id, "highlight removed");
        Ok(removed)
    }

    #[must_use]
    pub fn highlight(&self, id: &str) -> Option<&Highlight> {
        self.highlights.iter().find(|h| h.id == id)
    }

    /// All highlights in insertion order.
    #[must_use]
    pub fn highlights(&self) -> &[Highlight] {
        &self.highlights
    }
}
