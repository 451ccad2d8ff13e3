use kofe_core::db::open_db_in_memory;
use kofe_core::{
    EngineConfig, ErrorKind, LanguageRequest, LanguageService, NewNode, NodeService, Refusal,
    ServiceError, ValidationError,
};
use rusqlite::Connection;
use uuid::Uuid;

fn setup() -> Connection {
    open_db_in_memory().unwrap()
}

fn languages(conn: &Connection) -> LanguageService<'_> {
    LanguageService::try_new(conn, EngineConfig::default()).unwrap()
}

#[test]
fn initialize_first_uses_configured_default_triple() {
    let conn = setup();
    let service = languages(&conn);

    let outcome = service.initialize_first(None).unwrap();
    assert!(outcome.is_done());
    assert!(outcome.message().contains("default pattern"));

    let language = outcome.into_value();
    assert_eq!(language.code, "ENG");
    assert_eq!(language.name, "English");
    assert!(language.initial);
    assert!(language.bydefault);
    assert!(language.active);
}

#[test]
fn second_initialize_first_is_noop_with_same_language() {
    let conn = setup();
    let service = languages(&conn);

    let first = service.initialize_first(None).unwrap().into_value();
    let second = service
        .initialize_first(Some(&LanguageRequest::new("POL", "Polish")))
        .unwrap();

    assert!(!second.is_done());
    assert_eq!(second.reasons(), &[Refusal::AlreadyInitialized]);
    assert_eq!(second.value().id, first.id);
    assert_eq!(service.all_languages().unwrap().len(), 1);
}

#[test]
fn initialize_first_returns_earliest_language_when_registry_is_not_empty() {
    let conn = setup();
    let service = languages(&conn);

    let initial = service.initialize_first(None).unwrap().into_value();
    service.create(&LanguageRequest::new("FR", "French")).unwrap();

    let again = service.initialize_first(None).unwrap();
    assert_eq!(again.value().id, initial.id);
}

#[test]
fn initialize_first_with_seed_requires_code() {
    let conn = setup();
    let service = languages(&conn);

    let seed = LanguageRequest {
        name: "Nameless".to_string(),
        ..LanguageRequest::default()
    };
    let err = service.initialize_first(Some(&seed)).unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Validation(ValidationError::MissingCode)
    ));
    assert!(service.all_languages().unwrap().is_empty());
}

#[test]
fn initialize_first_with_seed_ignores_requested_inactive_flag() {
    let conn = setup();
    let service = languages(&conn);

    let seed = LanguageRequest::new("LT", "Lithuanian")
        .with_note("seeded")
        .with_active(false);
    let language = service.initialize_first(Some(&seed)).unwrap().into_value();

    assert_eq!(language.code, "LT");
    assert_eq!(language.note, "seeded");
    assert!(language.active);
    assert!(language.bydefault);
}

#[test]
fn initialize_first_honours_custom_config() {
    let conn = setup();
    let config =
        EngineConfig::from_json_str(r#"{"initial_language": {"code": "DE", "name": "German"}}"#)
            .unwrap();
    let service = LanguageService::try_new(&conn, config).unwrap();

    let language = service.initialize_first(None).unwrap().into_value();
    assert_eq!(language.code, "DE");
    assert_eq!(language.name, "German");
}

#[test]
fn create_requires_code() {
    let conn = setup();
    let service = languages(&conn);

    let request = LanguageRequest {
        code: Some("  ".to_string()),
        ..LanguageRequest::default()
    };
    let err = service.create(&request).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
}

#[test]
fn create_adds_plain_language_and_reports_covered_nodes() {
    let conn = setup();
    let service = languages(&conn);
    let nodes = NodeService::try_new(&conn).unwrap();
    service.initialize_first(None).unwrap();
    let root = nodes.create(&NewNode::root("root")).unwrap().into_value();
    nodes.create(&NewNode::child_of(root.id, "child")).unwrap();

    let outcome = service
        .create(&LanguageRequest::new("FR", "French").with_active(false))
        .unwrap();
    assert!(outcome.is_done());
    assert!(outcome.message().contains("cloned for 2 nodes"));

    let language = outcome.into_value();
    assert!(!language.initial);
    assert!(!language.bydefault);
    assert!(!language.active);
}

#[test]
fn update_basics_validates_before_lookup() {
    let conn = setup();
    let service = languages(&conn);

    let missing_id = service
        .update_basics(&LanguageRequest::new("FR", "French"))
        .unwrap_err();
    assert!(matches!(
        missing_id,
        ServiceError::Validation(ValidationError::MissingId)
    ));

    let missing_code = service
        .update_basics(&LanguageRequest::default().with_id(Uuid::new_v4()))
        .unwrap_err();
    assert!(matches!(
        missing_code,
        ServiceError::Validation(ValidationError::MissingCode)
    ));

    let unknown = Uuid::new_v4();
    let not_found = service
        .update_basics(&LanguageRequest::new("FR", "French").with_id(unknown))
        .unwrap_err();
    assert!(matches!(not_found, ServiceError::LanguageNotFound(id) if id == unknown));
}

#[test]
fn update_basics_keeps_flags() {
    let conn = setup();
    let service = languages(&conn);
    let initial = service.initialize_first(None).unwrap().into_value();

    let updated = service
        .update_basics(
            &LanguageRequest::new("EN", "English (UK)")
                .with_note("renamed")
                .with_active(false)
                .with_id(initial.id),
        )
        .unwrap()
        .into_value();

    assert_eq!(updated.code, "EN");
    assert_eq!(updated.name, "English (UK)");
    assert_eq!(updated.note, "renamed");
    assert!(updated.initial);
    assert!(updated.bydefault);
    assert!(updated.active);
}

#[test]
fn lone_language_cannot_change_activity() {
    let conn = setup();
    let service = languages(&conn);
    let initial = service.initialize_first(None).unwrap().into_value();

    for desired in [false, true] {
        let outcome = service.set_active(initial.id, desired).unwrap();
        assert_eq!(outcome.reasons(), &[Refusal::LoneLanguage]);
        assert!(outcome.value().active);
    }
    assert!(service.get(initial.id).unwrap().active);
}

#[test]
fn set_active_unknown_language_is_not_found() {
    let conn = setup();
    let service = languages(&conn);
    service.initialize_first(None).unwrap();

    let err = service.set_active(Uuid::new_v4(), true).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[test]
fn default_rule_is_checked_before_last_active_rule() {
    let conn = setup();
    let service = languages(&conn);
    let english = service.initialize_first(None).unwrap().into_value();
    let french = service
        .create(&LanguageRequest::new("FR", "French"))
        .unwrap()
        .into_value();

    let deactivated = service.set_active(french.id, false).unwrap();
    assert!(deactivated.is_done());
    assert!(!deactivated.value().active);

    let refused = service.set_active(english.id, false).unwrap();
    assert_eq!(refused.reasons(), &[Refusal::DefaultLanguageDeactivation]);
    assert_eq!(refused.message(), "cannot deactivate the default language");
    assert!(service.get(english.id).unwrap().active);
}

#[test]
fn deactivating_inactive_language_next_to_lone_active_one_is_refused() {
    let conn = setup();
    let service = languages(&conn);
    service.initialize_first(None).unwrap();
    let french = service
        .create(&LanguageRequest::new("FR", "French").with_active(false))
        .unwrap()
        .into_value();

    let outcome = service.set_active(french.id, false).unwrap();
    assert_eq!(outcome.reasons(), &[Refusal::LastActiveLanguage]);
}

#[test]
fn activation_always_succeeds_with_more_than_one_language() {
    let conn = setup();
    let service = languages(&conn);
    service.initialize_first(None).unwrap();
    let french = service
        .create(&LanguageRequest::new("FR", "French").with_active(false))
        .unwrap()
        .into_value();

    let outcome = service.set_active(french.id, true).unwrap();
    assert!(outcome.is_done());
    assert!(service.get(french.id).unwrap().active);
    assert_eq!(service.active_languages().unwrap().len(), 2);
}

#[test]
fn inactive_language_cannot_become_default() {
    let conn = setup();
    let service = languages(&conn);
    let english = service.initialize_first(None).unwrap().into_value();
    let french = service
        .create(&LanguageRequest::new("FR", "French").with_active(false))
        .unwrap()
        .into_value();

    let outcome = service.set_default(french.id).unwrap();
    assert_eq!(outcome.reasons(), &[Refusal::InactiveDefault]);
    assert_eq!(service.default_language().unwrap().id, english.id);
}

#[test]
fn set_default_keeps_exactly_one_default() {
    let conn = setup();
    let service = languages(&conn);
    let english = service.initialize_first(None).unwrap().into_value();
    let french = service
        .create(&LanguageRequest::new("FR", "French"))
        .unwrap()
        .into_value();
    let german = service
        .create(&LanguageRequest::new("DE", "German"))
        .unwrap()
        .into_value();

    for target in [french.id, german.id, german.id, english.id, french.id] {
        let outcome = service.set_default(target).unwrap();
        assert!(outcome.is_done());
        let defaults: Vec<_> = service
            .all_languages()
            .unwrap()
            .into_iter()
            .filter(|language| language.bydefault)
            .collect();
        assert_eq!(defaults.len(), 1);
        assert_eq!(defaults[0].id, target);
    }

    let outcome = service.set_active(english.id, false).unwrap();
    assert!(outcome.is_done());
}

#[test]
fn default_language_is_not_found_on_empty_registry() {
    let conn = setup();
    let service = languages(&conn);

    let err = service.default_language().unwrap_err();
    assert!(matches!(err, ServiceError::DefaultLanguageNotFound));
}

#[test]
fn initial_language_cannot_be_deleted() {
    let conn = setup();
    let service = languages(&conn);
    let initial = service.initialize_first(None).unwrap().into_value();

    let err = service.delete(initial.id).unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Validation(ValidationError::InitialLanguageUndeletable(id)) if id == initial.id
    ));
    assert!(service.get(initial.id).is_ok());
}

#[test]
fn delete_language_cascades_to_its_descriptors() {
    let conn = setup();
    let service = languages(&conn);
    let nodes = NodeService::try_new(&conn).unwrap();
    service.initialize_first(None).unwrap();
    nodes.create(&NewNode::root("a")).unwrap();
    nodes.create(&NewNode::root("b")).unwrap();
    let french = service
        .create(&LanguageRequest::new("FR", "French"))
        .unwrap()
        .into_value();

    let deletion = service.delete(french.id).unwrap();
    assert_eq!(deletion.language_id, french.id);
    assert_eq!(deletion.descriptor_ids.len(), 2);

    let remaining: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM descriptors WHERE language_uuid = ?1;",
            [french.id.to_string()],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(remaining, 0);
    assert!(matches!(
        service.get(french.id).unwrap_err(),
        ServiceError::LanguageNotFound(_)
    ));

    let err = service.delete(french.id).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[test]
fn default_language_cannot_be_deleted() {
    let conn = setup();
    let service = languages(&conn);
    let english = service.initialize_first(None).unwrap().into_value();
    let french = service
        .create(&LanguageRequest::new("FR", "French"))
        .unwrap()
        .into_value();
    assert!(service.set_default(french.id).unwrap().is_done());
    assert!(service.set_active(english.id, false).unwrap().is_done());

    let err = service.delete(french.id).unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Validation(ValidationError::DefaultLanguageUndeletable(id)) if id == french.id
    ));
    assert_eq!(err.code(), "VALIDATION_DEFAULT_LANGUAGE");

    let active = service.active_languages().unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].id, french.id);
    assert_eq!(service.default_language().unwrap().id, french.id);
}

#[test]
fn former_default_can_be_deleted_after_default_moves() {
    let conn = setup();
    let service = languages(&conn);
    let english = service.initialize_first(None).unwrap().into_value();
    let french = service
        .create(&LanguageRequest::new("FR", "French"))
        .unwrap()
        .into_value();
    service.set_default(french.id).unwrap();
    service.set_default(english.id).unwrap();

    let deletion = service.delete(french.id).unwrap();
    assert_eq!(deletion.language_id, french.id);
    assert_eq!(service.default_language().unwrap().id, english.id);
    assert_eq!(service.active_languages().unwrap().len(), 1);
}
