//! Session-management operations through the orchestrator.

use lumen_console::{AppHelpers, AppIntrospection, ConsoleError, ConsoleService};
use lumen_core::{SessionId, StoreToken};
use lumen_settings::ConsoleSettings;
use lumen_store::{Database, ModelRegistry};

fn service() -> ConsoleService {
    let db = Database::open_in_memory().expect("in-memory database");
    ConsoleService::new(
        db,
        StoreToken::new(),
        ModelRegistry::new(["Post"]),
        AppHelpers::new(AppIntrospection::default()),
        ConsoleSettings::default(),
    )
}

#[test]
fn first_contact_synthesizes_the_default_session() {
    let console = service();
    let detail = console.current_session().unwrap();
    assert_eq!(detail.name, "Default Session");
    assert!(detail.history.is_empty());
    assert!(detail.variable_names.is_empty());

    // The listing is never empty and marks it current.
    let listing = console.session_list().unwrap();
    assert_eq!(listing.sessions.len(), 1);
    assert_eq!(listing.current_session_id, detail.id);
    assert!(listing.sessions[0].is_current);
}

#[test]
fn new_sessions_get_default_names_and_become_current() {
    let console = service();
    let _ = console.current_session().unwrap();

    let created = console.new_session(None).unwrap();
    assert_eq!(created.name, "Session 2");
    assert!(created.is_current);
    assert_eq!(
        console.current_session().unwrap().id,
        created.id
    );

    let named = console.new_session(Some("Debugging".into())).unwrap();
    assert_eq!(named.name, "Debugging");
}

#[test]
fn select_switches_and_rejects_unknown_ids() {
    let console = service();
    let first = console.current_session().unwrap();
    let _second = console.new_session(None).unwrap();

    let selected = console.select_session(&first.id).unwrap();
    assert_eq!(selected.id, first.id);
    assert!(selected.is_current);

    let err = console
        .select_session(&SessionId::from("nonexistent"))
        .unwrap_err();
    assert_eq!(err.kind().code(), "SESSION_NOT_FOUND");
    assert_eq!(err.to_string(), "Session not found");
}

#[test]
fn closing_the_sole_session_fails() {
    let console = service();
    let only = console.current_session().unwrap();
    let err = console.close_session(&only.id).unwrap_err();
    assert!(matches!(
        err,
        ConsoleError::Store(lumen_store::StoreError::LastSession)
    ));
    assert_eq!(err.kind().code(), "LAST_SESSION_CLOSE");
    assert_eq!(err.to_string(), "Cannot close the last session");

    // The store is intact.
    assert_eq!(console.current_session().unwrap().id, only.id);
}

#[test]
fn closing_the_current_session_repoints_to_the_first_remaining() {
    let console = service();
    let first = console.current_session().unwrap();
    let second = console.new_session(None).unwrap();

    let listing = console.close_session(&second.id).unwrap();
    assert_eq!(listing.sessions.len(), 1);
    assert_eq!(listing.current_session_id, first.id);
    assert!(listing.sessions[0].is_current);
}

#[test]
fn closing_a_background_session_keeps_current() {
    let console = service();
    let first = console.current_session().unwrap();
    let second = console.new_session(None).unwrap();

    let listing = console.close_session(&first.id).unwrap();
    assert_eq!(listing.current_session_id, second.id);
}

#[test]
fn summaries_carry_command_and_variable_counts() {
    let console = service();
    console.execute("x = 1").unwrap();
    console.execute("y = 2").unwrap();
    console.execute("x + y").unwrap();

    let listing = console.session_list().unwrap();
    let summary = &listing.sessions[0];
    assert_eq!(summary.command_count, 3);
    assert_eq!(summary.variable_count, 2);
}

#[test]
fn clear_history_empties_state_but_keeps_identity() {
    let console = service();
    let before = console.current_session().unwrap();
    console.execute("x = 1").unwrap();

    let cleared = console.clear_history(&before.id).unwrap();
    assert_eq!(cleared.id, before.id);
    assert!(cleared.history.is_empty());
    assert!(cleared.variable_names.is_empty());

    // The binding really is gone for evaluation too.
    let response = console.execute("x").unwrap();
    assert_eq!(response.error_kind.as_deref(), Some("UNDEFINED_REFERENCE"));
}

#[test]
fn stores_with_different_tokens_do_not_see_each_other() {
    let db = Database::open_in_memory().expect("in-memory database");
    let make = |token: StoreToken| {
        ConsoleService::new(
            db.clone(),
            token,
            ModelRegistry::new(["Post"]),
            AppHelpers::new(AppIntrospection::default()),
            ConsoleSettings::default(),
        )
    };
    let a = make(StoreToken::new());
    let b = make(StoreToken::new());

    a.execute("secret = 1").unwrap();
    let response = b.execute("secret").unwrap();
    assert_eq!(response.error_kind.as_deref(), Some("UNDEFINED_REFERENCE"));

    let sa = a.current_session().unwrap();
    let err = b.select_session(&sa.id).unwrap_err();
    assert_eq!(err.kind().code(), "SESSION_NOT_FOUND");
}
