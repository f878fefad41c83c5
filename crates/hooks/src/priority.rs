//! Standard callback priorities
//!
//! Lower values run first. Every registration that does not name a priority
//! uses [`DEFAULT`], so extensions can place themselves before or after the
//! built-in callbacks without reading their source.

/// Run before default-priority callbacks
pub const HIGH: i32 = 5;

/// Priority of every registration that does not specify one
pub const DEFAULT: i32 = 10;

/// Run after default-priority callbacks
pub const LOW: i32 = 50;
