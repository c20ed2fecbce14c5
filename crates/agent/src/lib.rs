//! Extraction and reconciliation engine.
//!
//! This crate turns raw meeting-transcript fragments into structured meeting
//! intelligence:
//!
//! 1. **Primary extraction** (`primary`) - adapt a generative model's JSON
//!    output into validated canonical items
//! 2. **Deterministic extraction** (`patterns`) - rule-based pass that always
//!    runs, as fallback and supplement to the model
//! 3. **Reconciliation** (`reconciler`) - merge both sources against known
//!    state, suppressing near-duplicate facts via containment matching
//!
//! # Degradation principle
//!
//! The generative model is best-effort. When it is unreachable or returns
//! garbage, the fragment silently narrows to the deterministic pass; the
//! caller never sees an error for a single fragment.

pub mod llm;
pub mod patterns;
pub mod primary;
pub mod reconciler;
pub mod speaker;
pub mod tone;

pub use llm::LlmClient;
pub use patterns::{PatternError, PatternExtractor};
pub use primary::PrimaryExtractor;
pub use reconciler::{ReconcileOutcome, Reconciler};
