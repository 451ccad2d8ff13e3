//! Language registry use-case service.
//!
//! # Responsibility
//! - Create, initialize, update and delete languages.
//! - Run the active/default state machine.
//! - Expand the descriptor matrix whenever a language is added.
//!
//! # Invariants
//! - At most one language is `bydefault`, and it is always `active`.
//! - The registry always keeps at least one active language.
//! - The lone language of the registry never changes activity.
//! - The initial language and the default language are never deleted.

use crate::config::EngineConfig;
use crate::model::descriptor::DescriptorId;
use crate::model::language::{Language, LanguageId, LanguageRequest};
use crate::model::outcome::{Outcome, Refusal};
use crate::repo::descriptor_repo::DescriptorRepository;
use crate::repo::language_repo::LanguageRepository;
use crate::service::error::{ServiceError, ServiceResult, ValidationError};
use crate::service::{begin_write, Repos};
use log::{info, warn};
use rusqlite::Connection;

/// Ids removed by one language deletion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageDeletion {
    pub language_id: LanguageId,
    pub descriptor_ids: Vec<DescriptorId>,
}

/// Language registry service facade.
pub struct LanguageService<'conn> {
    conn: &'conn Connection,
    config: EngineConfig,
}

impl<'conn> LanguageService<'conn> {
    /// Creates service over a migrated connection.
    pub fn try_new(conn: &'conn Connection, config: EngineConfig) -> ServiceResult<Self> {
        Repos::try_new(conn)?;
        Ok(Self { conn, config })
    }

    /// Creates the first language if the registry is empty.
    ///
    /// Without a seed the configured default triple is used. On a non-empty
    /// registry the earliest-created language comes back as a refusal.
    ///
    /// # Errors
    /// - `Validation(MissingCode)` when a seed is given without a code.
    pub fn initialize_first(
        &self,
        seed: Option<&LanguageRequest>,
    ) -> ServiceResult<Outcome<Language>> {
        let seed = match seed {
            Some(request) => Some((
                request
                    .normalized_code()
                    .ok_or(ValidationError::MissingCode)?,
                request,
            )),
            None => None,
        };

        let tx = begin_write(self.conn)?;
        let outcome = {
            let repos = Repos::try_new(&tx)?;
            match repos.languages.first_language()? {
                Some(existing) => {
                    info!(
                        "event=language_init module=language status=noop language={}",
                        existing.id
                    );
                    Outcome::refused(existing, Refusal::AlreadyInitialized)
                }
                None => {
                    let (language, created) = match seed {
                        Some((code, request)) => (
                            Language::first(code, request.name.as_str(), request.note.as_str()),
                            "Language has been created",
                        ),
                        None => {
                            let defaults = &self.config.initial_language;
                            (
                                Language::first(
                                    defaults.code.trim(),
                                    defaults.name.as_str(),
                                    defaults.note.as_str(),
                                ),
                                "Language has been created using a default pattern",
                            )
                        }
                    };
                    repos.languages.insert_language(&language)?;
                    let covered = repos.matrix().expand_for_new_language(&language)?;
                    info!(
                        "event=language_init module=language status=ok language={} nodes={covered}",
                        language.id
                    );
                    Outcome::done(
                        language,
                        format!("{created}. Descriptors have been cloned for {covered} nodes"),
                    )
                }
            }
        };
        tx.commit()?;
        Ok(outcome)
    }

    /// Adds a non-initial, non-default language and clones descriptors for
    /// every existing node.
    pub fn create(&self, request: &LanguageRequest) -> ServiceResult<Outcome<Language>> {
        let code = request
            .normalized_code()
            .ok_or(ValidationError::MissingCode)?;
        let language = Language::new(
            code,
            request.name.as_str(),
            request.note.as_str(),
            request.active,
        );

        let tx = begin_write(self.conn)?;
        let covered = {
            let repos = Repos::try_new(&tx)?;
            repos.languages.insert_language(&language)?;
            repos.matrix().expand_for_new_language(&language)?
        };
        tx.commit()?;

        info!(
            "event=language_create module=language status=ok language={} nodes={covered}",
            language.id
        );
        let message = format!(
            "Language {} has been added. Descriptors have been cloned for {covered} nodes",
            language.code
        );
        Ok(Outcome::done(language, message))
    }

    /// Overwrites code, name and note. Flags are untouched.
    ///
    /// # Errors
    /// - `Validation(MissingId)` / `Validation(MissingCode)` before any lookup.
    /// - `LanguageNotFound` for an unknown id.
    pub fn update_basics(&self, request: &LanguageRequest) -> ServiceResult<Outcome<Language>> {
        let id = request.id.ok_or(ValidationError::MissingId)?;
        let code = request
            .normalized_code()
            .ok_or(ValidationError::MissingCode)?;

        let tx = begin_write(self.conn)?;
        let language = {
            let repos = Repos::try_new(&tx)?;
            repos.languages.update_basics(
                id,
                code.as_str(),
                request.name.as_str(),
                request.note.as_str(),
            )?;
            load_language(&repos, id)?
        };
        tx.commit()?;

        info!("event=language_update module=language status=ok language={id}");
        let message = format!("Language {} has been updated", language.code);
        Ok(Outcome::done(language, message))
    }

    /// Activates or deactivates one language.
    ///
    /// Rules, in order: the lone language never changes; activation always
    /// succeeds; the default language cannot be deactivated; the last active
    /// language cannot be deactivated.
    pub fn set_active(&self, id: LanguageId, desired: bool) -> ServiceResult<Outcome<Language>> {
        let tx = begin_write(self.conn)?;
        let outcome = {
            let repos = Repos::try_new(&tx)?;
            let mut language = load_language(&repos, id)?;

            if repos.languages.count_languages()? == 1 {
                Outcome::refused(language, Refusal::LoneLanguage)
            } else if desired {
                repos.languages.set_active(id, true)?;
                language.active = true;
                Outcome::done(language, "Language has been activated")
            } else if language.bydefault {
                Outcome::refused(language, Refusal::DefaultLanguageDeactivation)
            } else if repos.languages.count_active_languages()? < 2 {
                Outcome::refused(language, Refusal::LastActiveLanguage)
            } else {
                repos.languages.set_active(id, false)?;
                language.active = false;
                Outcome::done(language, "Language has been deactivated")
            }
        };
        tx.commit()?;

        log_transition("language_set_active", id, &outcome);
        Ok(outcome)
    }

    /// Moves the default flag to one active language.
    pub fn set_default(&self, id: LanguageId) -> ServiceResult<Outcome<Language>> {
        let tx = begin_write(self.conn)?;
        let outcome = {
            let repos = Repos::try_new(&tx)?;
            let mut language = load_language(&repos, id)?;
            if !language.active {
                Outcome::refused(language, Refusal::InactiveDefault)
            } else {
                repos.languages.clear_default()?;
                repos.languages.set_default(id)?;
                language.bydefault = true;
                let message = format!("Language {} set as default", language.code);
                Outcome::done(language, message)
            }
        };
        tx.commit()?;

        log_transition("language_set_default", id, &outcome);
        Ok(outcome)
    }

    pub fn default_language(&self) -> ServiceResult<Language> {
        let repos = Repos::try_new(self.conn)?;
        repos
            .languages
            .default_language()?
            .ok_or(ServiceError::DefaultLanguageNotFound)
    }

    pub fn active_languages(&self) -> ServiceResult<Vec<Language>> {
        let repos = Repos::try_new(self.conn)?;
        Ok(repos.languages.list_languages(true)?)
    }

    pub fn all_languages(&self) -> ServiceResult<Vec<Language>> {
        let repos = Repos::try_new(self.conn)?;
        Ok(repos.languages.list_languages(false)?)
    }

    pub fn get(&self, id: LanguageId) -> ServiceResult<Language> {
        let repos = Repos::try_new(self.conn)?;
        load_language(&repos, id)
    }

    /// Deletes one non-initial, non-default language together with its
    /// descriptors.
    ///
    /// The default is always active, so the registry keeps its default and
    /// at least one active language.
    ///
    /// # Errors
    /// - `LanguageNotFound` for an unknown id.
    /// - `Validation(InitialLanguageUndeletable)` for the initial language.
    /// - `Validation(DefaultLanguageUndeletable)` for the default language.
    pub fn delete(&self, id: LanguageId) -> ServiceResult<LanguageDeletion> {
        let tx = begin_write(self.conn)?;
        let deletion = {
            let repos = Repos::try_new(&tx)?;
            let language = load_language(&repos, id)?;
            if language.initial {
                warn!(
                    "event=language_delete module=language status=rejected language={id} reason=initial"
                );
                return Err(ValidationError::InitialLanguageUndeletable(id).into());
            }
            if language.bydefault {
                warn!(
                    "event=language_delete module=language status=rejected language={id} reason=default"
                );
                return Err(ValidationError::DefaultLanguageUndeletable(id).into());
            }
            let descriptor_ids = repos.descriptors.delete_for_language(id)?;
            repos.languages.delete_language(id)?;
            LanguageDeletion {
                language_id: id,
                descriptor_ids,
            }
        };
        tx.commit()?;

        info!(
            "event=language_delete module=language status=ok language={id} descriptors={}",
            deletion.descriptor_ids.len()
        );
        Ok(deletion)
    }
}

fn load_language(repos: &Repos<'_>, id: LanguageId) -> ServiceResult<Language> {
    repos
        .languages
        .get_language(id)?
        .ok_or(ServiceError::LanguageNotFound(id))
}

fn log_transition(event: &str, id: LanguageId, outcome: &Outcome<Language>) {
    if outcome.is_done() {
        info!("event={event} module=language status=ok language={id}");
    } else {
        warn!(
            "event={event} module=language status={} language={id} reason={}",
            outcome.status(),
            outcome.message()
        );
    }
}
