//! Language domain model.
//!
//! # Responsibility
//! - Define the registry record for one supported localization.
//! - Provide request normalization shared by create/update paths.
//!
//! # Invariants
//! - At most one language has `bydefault = true`.
//! - A language with `bydefault = true` is always `active`.
//! - `initial` is set exactly once, on the first language ever created.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable language identifier.
pub type LanguageId = Uuid;

/// One supported localization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Language {
    pub id: LanguageId,
    /// Short code, e.g. `ENG`.
    pub code: String,
    pub name: String,
    pub note: String,
    /// First language ever created. Cannot be deleted.
    pub initial: bool,
    /// System default language.
    pub bydefault: bool,
    /// Whether content in this language is currently offered.
    pub active: bool,
}

impl Language {
    /// Creates a plain (non-initial, non-default) language with a fresh id.
    pub fn new(
        code: impl Into<String>,
        name: impl Into<String>,
        note: impl Into<String>,
        active: bool,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            code: code.into(),
            name: name.into(),
            note: note.into(),
            initial: false,
            bydefault: false,
            active,
        }
    }

    /// Creates the initial language: `initial`, `bydefault` and `active`.
    pub fn first(
        code: impl Into<String>,
        name: impl Into<String>,
        note: impl Into<String>,
    ) -> Self {
        let mut language = Self::new(code, name, note, true);
        language.initial = true;
        language.bydefault = true;
        language
    }
}

/// Caller-supplied language fields for init/create/update use-cases.
///
/// `id` is only consulted by update paths; `active` only by create.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LanguageRequest {
    pub id: Option<LanguageId>,
    pub code: Option<String>,
    pub name: String,
    pub note: String,
    pub active: bool,
}

impl Default for LanguageRequest {
    fn default() -> Self {
        Self {
            id: None,
            code: None,
            name: String::new(),
            note: String::new(),
            active: true,
        }
    }
}

impl LanguageRequest {
    /// Builds a request carrying the given code and name.
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            code: Some(code.into()),
            name: name.into(),
            ..Self::default()
        }
    }

    /// Sets the note.
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = note.into();
        self
    }

    /// Sets the requested active flag.
    pub fn with_active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }

    /// Targets an existing language (update paths).
    pub fn with_id(mut self, id: LanguageId) -> Self {
        self.id = Some(id);
        self
    }

    /// Returns the trimmed code, or `None` when absent or blank.
    pub fn normalized_code(&self) -> Option<String> {
        normalize_code(self.code.as_deref())
    }
}

pub(crate) fn normalize_code(value: Option<&str>) -> Option<String> {
    let trimmed = value?.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.to_string())
}
