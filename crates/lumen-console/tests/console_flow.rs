//! End-to-end command flow through the orchestrator.

use lumen_console::{AppHelpers, AppIntrospection, ConsoleError, ConsoleService};
use lumen_core::{Rendered, StoreToken};
use lumen_settings::ConsoleSettings;
use lumen_store::{Database, ModelRegistry};

fn service_with(settings: ConsoleSettings) -> ConsoleService {
    let db = Database::open_in_memory().expect("in-memory database");
    let helpers = AppHelpers::new(AppIntrospection {
        routes: vec!["GET /posts".into()],
        environment: settings.environment.clone(),
        version: "1.0.0".into(),
    });
    ConsoleService::new(
        db,
        StoreToken::new(),
        ModelRegistry::new(["Post", "User"]),
        helpers,
        settings,
    )
}

fn service() -> ConsoleService {
    service_with(ConsoleSettings::default())
}

fn result_text(response: &lumen_console::CommandResponse) -> String {
    response
        .result
        .as_ref()
        .expect("expected a result")
        .to_text()
}

#[test]
fn arithmetic_round_trip() {
    let console = service();
    let response = console.execute("2 + 3").unwrap();
    assert_eq!(response.result, Some(Rendered::Text("5".into())));
    assert!(response.error.is_none());
    assert_eq!(response.mode, "trusted");
}

#[test]
fn assignments_persist_across_commands() {
    let console = service();
    let response = console.execute("name = \"ab\"").unwrap();
    assert_eq!(result_text(&response), "ab");

    let response = console.execute("name").unwrap();
    assert_eq!(result_text(&response), "ab");

    let response = console.execute("vars").unwrap();
    assert_eq!(result_text(&response), "name = \"ab\"");

    let detail = console.current_session().unwrap();
    assert_eq!(detail.history, vec!["name = \"ab\"", "name", "vars"]);
    assert_eq!(detail.variable_names, vec!["name"]);
}

#[test]
fn blocked_commands_never_touch_history() {
    let console = service();
    let response = console.execute("System.exit").unwrap();
    assert_eq!(response.error_kind.as_deref(), Some("BLOCKED_COMMAND"));
    assert_eq!(
        response.error.as_deref(),
        Some("Command blocked for security reasons")
    );
    assert!(response.result.is_none());
    assert!(console.current_session().unwrap().history.is_empty());
}

#[test]
fn empty_commands_are_rejected_without_history() {
    let console = service();
    let response = console.execute("   ").unwrap();
    assert_eq!(response.error_kind.as_deref(), Some("EMPTY_COMMAND"));
    assert!(console.current_session().unwrap().history.is_empty());
}

#[test]
fn evaluation_errors_still_record_the_command() {
    let console = service();
    let response = console.execute("1 / 0").unwrap();
    assert_eq!(response.error.as_deref(), Some("divided by 0"));
    assert_eq!(response.error_kind.as_deref(), Some("EVALUATION_ERROR"));
    assert_eq!(console.current_session().unwrap().history, vec!["1 / 0"]);
}

#[test]
fn variables_are_isolated_between_sessions() {
    let console = service();
    let first = console.current_session().unwrap();
    console.execute("x = 41").unwrap();

    console.new_session(Some("Scratch".into())).unwrap();
    let response = console.execute("x").unwrap();
    assert_eq!(
        response.error.as_deref(),
        Some("undefined local variable or method `x`")
    );
    assert_eq!(response.error_kind.as_deref(), Some("UNDEFINED_REFERENCE"));

    console.select_session(&first.id).unwrap();
    let response = console.execute("x + 1").unwrap();
    assert_eq!(result_text(&response), "42");
}

#[test]
fn sandbox_writes_are_rolled_back() {
    let console = service();
    let response = console
        .sandbox_execute("Post.create(title: \"tmp\")")
        .unwrap();
    assert_eq!(response.mode, "sandbox");
    assert!(result_text(&response).starts_with("#<Post id: "));

    // Nothing survived the rollback, in either context.
    let response = console.execute("Post.count").unwrap();
    assert_eq!(result_text(&response), "0");
    let response = console.sandbox_execute("Post.count").unwrap();
    assert_eq!(result_text(&response), "0");
}

#[test]
fn trusted_writes_survive_and_are_visible_to_the_sandbox() {
    let console = service();
    console.execute("Post.create(title: \"keep\")").unwrap();
    let response = console.sandbox_execute("Post.count").unwrap();
    assert_eq!(result_text(&response), "1");

    // Sandbox deletion is also undone.
    console.sandbox_execute("Post.first.destroy").unwrap();
    let response = console.execute("Post.count").unwrap();
    assert_eq!(result_text(&response), "1");
}

#[test]
fn sandbox_restricted_commands_skip_history() {
    let console = service();
    let response = console.sandbox_execute("IO.read(\"/etc/passwd\")").unwrap();
    assert_eq!(response.error_kind.as_deref(), Some("SANDBOX_RESTRICTED"));
    assert_eq!(
        response.error.as_deref(),
        Some("Command contains restricted operations for sandbox mode")
    );
    assert!(console.current_session().unwrap().history.is_empty());
}

#[test]
fn sandbox_info_banner() {
    let console = service();
    let response = console.sandbox_execute("sandbox_info").unwrap();
    assert!(result_text(&response).starts_with("SANDBOX MODE:"));
    // The banner is sandbox-only.
    let response = console.execute("sandbox_info").unwrap();
    assert_eq!(response.error_kind.as_deref(), Some("UNDEFINED_REFERENCE"));
}

#[test]
fn helpers_resolve_in_the_trusted_context_only() {
    let console = service();
    let response = console.execute("env_info").unwrap();
    let text = result_text(&response);
    assert!(text.contains("environment => development"), "{text}");

    let response = console.sandbox_execute("env_info").unwrap();
    assert_eq!(response.error_kind.as_deref(), Some("UNDEFINED_REFERENCE"));
}

#[test]
fn record_set_results_are_sampled() {
    let console = service();
    for i in 0..7 {
        console
            .execute(&format!("Post.create(n: {i})"))
            .unwrap();
    }
    let response = console.execute("Post.all").unwrap();
    let Some(Rendered::Lines(lines)) = response.result else {
        panic!("expected lines");
    };
    assert_eq!(lines.len(), 6);
    assert_eq!(lines[5], "... (2 more records)");
}

#[test]
fn history_is_trimmed_to_the_limit() {
    let settings = ConsoleSettings {
        history_limit: 3,
        ..ConsoleSettings::default()
    };
    let console = service_with(settings);
    for i in 0..5 {
        console.execute(&format!("{i} + 0")).unwrap();
    }
    let history = console.current_session().unwrap().history;
    assert_eq!(history, vec!["2 + 0", "3 + 0", "4 + 0"]);
}

#[test]
fn sessions_survive_a_reopen_of_a_file_backed_store() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("console.db");
    let token = StoreToken::new();

    let build = |db: Database| {
        ConsoleService::new(
            db,
            token.clone(),
            ModelRegistry::new(["Post"]),
            AppHelpers::new(AppIntrospection::default()),
            ConsoleSettings::default(),
        )
    };

    let console = build(Database::open_file(&path).expect("open"));
    console.execute("x = 41").unwrap();
    console.execute("Post.create(title: \"kept\")").unwrap();
    drop(console);

    let console = build(Database::open_file(&path).expect("reopen"));
    let response = console.execute("x + 1").unwrap();
    assert_eq!(result_text(&response), "42");
    let response = console.execute("Post.count").unwrap();
    assert_eq!(result_text(&response), "1");
}

#[test]
fn environment_gate_refuses_unlisted_environments() {
    let settings = ConsoleSettings {
        environment: "production".to_owned(),
        ..ConsoleSettings::default()
    };
    let console = service_with(settings);
    let err = console.execute("1 + 1").unwrap_err();
    assert!(matches!(err, ConsoleError::AccessDenied));
    assert_eq!(err.kind().code(), "ACCESS_DENIED");
    assert!(err.kind().is_access_denied());
}
