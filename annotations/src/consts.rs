//! Shared constants for the annotation model.

// ── Layout ──────────────────────────────────────────────────────

/// Default line width budget in document units.
pub const DEFAULT_LINE_WIDTH: f64 = 1200.0;

/// Default fixed per-character advance in document units.
pub const DEFAULT_CHAR_ADVANCE: f64 = 24.0;

/// Default height of one laid-out row in document units.
pub const DEFAULT_LINE_HEIGHT: f64 = 36.0;

// ── Element defaults ────────────────────────────────────────────

pub const DEFAULT_FILL: &str = "transparent";
pub const DEFAULT_STROKE_COLOR: &str = "#1e1e1e";
pub const DEFAULT_STROKE_WIDTH: f64 = 1.0;
pub const DEFAULT_OPACITY: f64 = 1.0;
pub const DEFAULT_FONT_FAMILY: &str = "serif";
pub const DEFAULT_FONT_SIZE: f64 = 20.0;

// ── Rough fill defaults ─────────────────────────────────────────

pub const DEFAULT_ROUGHNESS: f64 = 1.0;
pub const DEFAULT_BOWING: f64 = 1.0;
pub const DEFAULT_HACHURE_GAP: f64 = 4.0;
/// Hachure angle in degrees.
pub const DEFAULT_HACHURE_ANGLE: f64 = -41.0;
/// Negative means "derive from stroke width" at render time.
pub const DEFAULT_FILL_WEIGHT: f64 = -1.0;
