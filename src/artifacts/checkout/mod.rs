//! Branch-switch planning
//!
//! Switching branches is planned completely before any file, index or ref
//! mutation: every path is sorted into a delta bucket, and a non-empty
//! conflict bucket aborts the whole operation with nothing touched.

pub mod switch_plan;
