//! Anchor graph: arrow ends anchored to elements, and the reverse index.
//!
//! DESIGN
//! ======
//! An arrow's `startId` / `endId` are weak ids into the element map. Each
//! element caches the arrows pointing away from it (`outgoingArrowIds`, by
//! `startId`) and into it (`incomingArrowIds`, by `endId`). The cache is
//! derived entirely from the arrow set: every mutation here keeps it in step,
//! and [`Document::rebuild_anchor_index`] recomputes it from scratch.
//!
//! Each operation validates everything it needs before touching the index,
//! so a failed call leaves the document unchanged.

#[cfg(test)]
#[path = "anchor_test.rs"]
mod anchor_test;

use std::collections::{BTreeSet, HashMap};

use crate::curve::{Anchor, AnchorKind, ArrowElement, ArrowEnd, CurveSkeleton};
use crate::doc::Document;
use crate::element::{Element, ElementId};
use crate::error::{DocError, EntityKind};

/// The index sets one element should hold.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnchorSets {
    pub outgoing: BTreeSet<ElementId>,
    pub incoming: BTreeSet<ElementId>,
}

/// Result of deleting an element.
#[derive(Debug, Clone)]
pub struct ElementRemoval {
    pub element: Element,
    /// Arrows that had an end cleared, sorted by id. Whether any of them
    /// should now be removed is left to the caller.
    pub detached_arrows: Vec<ElementId>,
}

/// Compute the index sets implied by `arrows`, keyed by element id.
pub fn derive_index<'a>(arrows: impl Iterator<Item = &'a ArrowElement>) -> HashMap<ElementId, AnchorSets> {
    let mut index: HashMap<ElementId, AnchorSets> = HashMap::new();
    for arrow in arrows {
        if let Some(start) = &arrow.start_id {
            index.entry(start.clone()).or_default().outgoing.insert(arrow.id().to_string());
        }
        if let Some(end) = &arrow.end_id {
            index.entry(end.clone()).or_default().incoming.insert(arrow.id().to_string());
        }
    }
    index
}

pub(crate) fn index_matches<'a>(
    elements: impl Iterator<Item = &'a Element>,
    arrows: impl Iterator<Item = &'a ArrowElement>,
) -> bool {
    let mut expected = derive_index(arrows);
    let empty = AnchorSets::default();
    for element in elements {
        let sets = expected.remove(element.id());
        let sets = sets.as_ref().unwrap_or(&empty);
        if element.skeleton.outgoing_arrow_ids != sets.outgoing || element.skeleton.incoming_arrow_ids != sets.incoming {
            return false;
        }
    }
    // anything left names an element that does not exist
    expected.is_empty()
}

impl Document {
    /// Create a curve, anchoring each given end to an existing element.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for malformed curve geometry or an anchor type
    /// that does not match its target, `Conflict` for a used id and
    /// `NotFound` if an anchor target does not exist. Nothing is indexed on
    /// failure.
    pub fn create_arrow(
        &mut self,
        curve: CurveSkeleton,
        start: Option<Anchor>,
        end: Option<Anchor>,
    ) -> Result<ArrowElement, DocError> {
        curve.validate()?;
        self.ensure_id_free(&curve.id)?;
        for anchor in [&start, &end].into_iter().flatten() {
            self.check_anchor(&anchor.target, anchor.kind)?;
        }

        let arrow = ArrowElement::new(curve, start, end);
        for end in [ArrowEnd::Start, ArrowEnd::End] {
            if let Some(target) = arrow.end_id(end) {
                self.link(target, end, arrow.id());
            }
        }
        self.curves.insert(arrow.id().to_string(), arrow.clone());
        tracing::debug!(
            arrow_id = %arrow.id(),
            start = ?arrow.start_id,
            end = ?arrow.end_id,
            "arrow created"
        );
        Ok(arrow)
    }

    /// Point one end of an arrow at a new element, or detach it with `None`.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown arrow or target and `Validation` for
    /// an anchor type that does not match the target. The arrow and the index
    /// are unchanged on failure.
    pub fn retarget_arrow_end(
        &mut self,
        arrow_id: &str,
        end: ArrowEnd,
        target: Option<Anchor>,
    ) -> Result<ArrowElement, DocError> {
        if !self.curves.contains_key(arrow_id) {
            return Err(DocError::not_found(EntityKind::Arrow, arrow_id));
        }
        if let Some(anchor) = &target {
            self.check_anchor(&anchor.target, anchor.kind)?;
        }

        let new_target = target.as_ref().map(|a| a.target.clone());
        let Some(arrow) = self.curves.get_mut(arrow_id) else {
            return Err(DocError::not_found(EntityKind::Arrow, arrow_id));
        };
        let old_target = arrow.end_id(end).map(str::to_owned);
        arrow.set_end(end, target);
        let updated = arrow.clone();

        if let Some(old) = &old_target {
            self.unlink(old, end, arrow_id);
        }
        if let Some(new) = &new_target {
            self.link(new, end, arrow_id);
        }
        tracing::debug!(%arrow_id, ?end, from = ?old_target, to = ?new_target, "arrow retargeted");
        Ok(updated)
    }

    /// Remove an arrow and its entries in both endpoints' index sets.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown arrow.
    pub fn delete_arrow(&mut self, arrow_id: &str) -> Result<ArrowElement, DocError> {
        let arrow = self
            .curves
            .remove(arrow_id)
            .ok_or_else(|| DocError::not_found(EntityKind::Arrow, arrow_id))?;
        for end in [ArrowEnd::Start, ArrowEnd::End] {
            if let Some(target) = arrow.end_id(end) {
                self.unlink(target, end, arrow_id);
            }
        }
        tracing::debug!(%arrow_id, "arrow deleted");
        Ok(arrow)
    }

    /// Remove an element, clearing every arrow end that referenced it.
    ///
    /// Arrows left with both ends null are kept as free curves.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown element.
    pub fn delete_element(&mut self, id: &str) -> Result<ElementRemoval, DocError> {
        let element = self
            .elements
            .remove(id)
            .ok_or_else(|| DocError::not_found(EntityKind::Element, id))?;

        let mut detached = BTreeSet::new();
        let ends = [
            (ArrowEnd::Start, &element.skeleton.outgoing_arrow_ids),
            (ArrowEnd::End, &element.skeleton.incoming_arrow_ids),
        ];
        for (end, arrow_ids) in ends {
            for arrow_id in arrow_ids {
                if let Some(arrow) = self.curves.get_mut(arrow_id) {
                    if arrow.end_id(end) == Some(id) {
                        arrow.set_end(end, None);
                        detached.insert(arrow_id.clone());
                    }
                }
            }
        }

        let detached_arrows: Vec<ElementId> = detached.into_iter().collect();
        if detached_arrows.is_empty() {
            tracing::debug!(element_id = %id, "element deleted");
        } else {
            tracing::warn!(element_id = %id, arrows = ?detached_arrows, "element deleted; arrows detached");
        }
        Ok(ElementRemoval { element, detached_arrows })
    }

    /// Arrows with neither end anchored, sorted by id.
    #[must_use]
    pub fn free_curves(&self) -> Vec<&ArrowElement> {
        self.arrows().into_iter().filter(|a| a.is_free()).collect()
    }

    /// Recompute every element's index sets from the arrow set.
    pub fn rebuild_anchor_index(&mut self) {
        let mut index = derive_index(self.curves.values());
        for (id, element) in &mut self.elements {
            let sets = index.remove(id).unwrap_or_default();
            element.skeleton.outgoing_arrow_ids = sets.outgoing;
            element.skeleton.incoming_arrow_ids = sets.incoming;
        }
    }

    /// Whether the cached index sets equal the ones the arrows imply.
    #[must_use]
    pub fn anchor_index_is_consistent(&self) -> bool {
        index_matches(self.elements.values(), self.curves.values())
    }

    /// The target must exist, and a type hint must name the target's variant.
    pub(crate) fn check_anchor(&self, target: &str, kind: Option<AnchorKind>) -> Result<(), DocError> {
        let element = self.require_element(target)?;
        let Some(kind) = kind else {
            return Ok(());
        };
        if AnchorKind::for_element(element.kind()) == Some(kind) {
            return Ok(());
        }
        Err(DocError::validation(format!(
            "anchor type {kind:?} does not match element {target} of type `{}`",
            element.kind().tag()
        )))
    }

    fn link(&mut self, element_id: &str, end: ArrowEnd, arrow_id: &str) {
        if let Some(set) = self.index_set(element_id, end) {
            set.insert(arrow_id.to_string());
        }
    }

    fn unlink(&mut self, element_id: &str, end: ArrowEnd, arrow_id: &str) {
        if let Some(set) = self.index_set(element_id, end) {
            set.remove(arrow_id);
        }
    }

    fn index_set(&mut self, element_id: &str, end: ArrowEnd) -> Option<&mut BTreeSet<ElementId>> {
        let skeleton = &mut self.elements.get_mut(element_id)?.skeleton;
        Some(match end {
            ArrowEnd::Start => &mut skeleton.outgoing_arrow_ids,
            ArrowEnd::End => &mut skeleton.incoming_arrow_ids,
        })
    }
}
