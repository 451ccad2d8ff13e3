//! Core of the Kofe content engine.
//!
//! A hierarchical content tree whose nodes carry one localized descriptor
//! per supported language. This crate is the single source of truth for the
//! tree, language and descriptor-matrix invariants.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
mod repo;
pub mod service;
pub mod view;

pub use config::{ConfigError, EngineConfig, InitialLanguage};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::descriptor::{Descriptor, DescriptorEdit, DescriptorId};
pub use model::language::{Language, LanguageId, LanguageRequest};
pub use model::node::{NewNode, Node, NodeId, NodeUpdate};
pub use model::outcome::{Outcome, Refusal};
pub use repo::descriptor_repo::PairCoverage;
pub use repo::{RepoError, RepoResult};
pub use service::descriptor_matrix::MatrixAudit;
pub use service::descriptor_service::DescriptorService;
pub use service::error::{ErrorKind, ServiceError, ServiceResult, ValidationError};
pub use service::language_service::{LanguageDeletion, LanguageService};
pub use service::node_service::{NodeDeletion, NodeService};
pub use view::{DescriptorView, NodeView};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
