//! Pipeline stages between upload and the pandoc invocation.
//!
//! Each submodule implements exactly one decision or transformation.
//! Keeping the stages separate makes each independently testable and lets
//! the orchestrator compose them without any stage knowing about the
//! others.
//!
//! ## Data Flow
//!
//! ```text
//! bytes ──▶ formats ──▶ scan ──▶ classify ──▶ extract / materialize
//! (upload)  (capability  (markup   (remote vs   (must-supply set /
//!            lookup)      refs)     local)       fetched rewrites)
//! ```
//!
//! 1. [`formats`]     — static capability table: legal outputs per media type
//! 2. [`scan`]        — find `![..](..)` / `[..](..)` references in markup text
//! 3. [`classify`]    — decide Remote / Local / Opaque per reference target
//! 4. [`extract`]     — the set of local files the caller must supply
//! 5. [`materialize`] — fetch remote images and rewrite them to local copies

pub mod classify;
pub mod extract;
pub mod formats;
pub mod materialize;
pub mod scan;
