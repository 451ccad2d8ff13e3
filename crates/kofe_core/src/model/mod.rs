//! Domain model for the localized content tree.
//!
//! # Responsibility
//! - Define the three persisted entities: `Language`, `Node`, `Descriptor`.
//! - Define request shapes accepted by the services.
//! - Define `Outcome`, the per-call success/refusal envelope.
//!
//! # Invariants
//! - Every entity is identified by a stable UUID that is never reused.
//! - Entities are plain values; per-call status lives in `Outcome`, never on
//!   the entity itself.

pub mod descriptor;
pub mod language;
pub mod node;
pub mod outcome;
