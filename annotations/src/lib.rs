//! Annotation document model and text layout engine for the folio e-book
//! reader.
//!
//! This crate owns everything about an annotated page that has invariants:
//! the polymorphic canvas elements drawn over book text, the arrows that
//! anchor to them by id, the highlight overlays, the pan/zoom view, and the
//! deterministic layout that turns extracted book text into addressable
//! lines. Rendering, persistence transport and text extraction are external
//! collaborators; they exchange [`doc::DocumentSnapshot`] JSON and
//! [`layout::ProcessedLine`] sequences with this crate.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`doc`] | Per-document session object and its persisted snapshot |
//! | [`element`] | Element skeleton, variant registry and field tables |
//! | [`curve`] | Curve/arrow records and curve restyling |
//! | [`anchor`] | Arrow anchoring and the derived reverse index |
//! | [`highlight`] | Highlight overlays and highlight-to-line mapping |
//! | [`layout`] | Fixed-advance text layout engine |
//! | [`view`] | Pan/zoom view transform and coordinate conversions |
//! | [`config`] | Layout configuration from the environment |
//! | [`error`] | Error kinds and stable error codes |
//! | [`consts`] | Shared defaults |

pub mod anchor;
pub mod config;
pub mod consts;
pub mod curve;
pub mod doc;
pub mod element;
pub mod error;
pub mod highlight;
pub mod layout;
pub mod view;

pub use anchor::ElementRemoval;
pub use curve::{Anchor, AnchorKind, ArrowElement, ArrowEnd, CurveSkeleton};
pub use doc::{Document, DocumentSnapshot};
pub use element::{Element, ElementKind};
pub use error::{DocError, ErrorCode};
pub use highlight::Highlight;
pub use layout::{ProcessedLine, TextBlock, layout};
pub use view::{Point, ViewTransform};
