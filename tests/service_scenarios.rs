//! End-to-end editor scenarios driven through the `Tester`.

mod helpers;

use helpers::{Recorder, tester};
use serde_json::json;
use xtext_web_client::editor::{Problem, RequestState, Selection};
use xtext_web_client::transport::{Method, Xhr};
use xtext_web_client::{Checked, InvokeOverrides, ServiceFailure, ServiceKind, ServiceOptions};

#[test]
fn load_applies_server_text_and_sends_nothing_else() {
    let mut tester = tester(ServiceOptions::for_resource("foo.mydsl"));
    let texts = Recorder::new();
    let sink = texts.sink();

    tester
        .check_request(|url, settings| {
            assert_eq!(url, "test://xtext-service/load");
            assert_eq!(settings.method, Method::Get);
            assert_eq!(settings.param("resource"), Some(&json!("foo.mydsl")));
        })
        .respond(json!({"fullText": "state idle", "dirty": false, "stateId": "0"}))
        .unwrap()
        .check_result(move |checked| {
            let context = checked.context().expect("no invocation was made");
            sink((context.text(), context.is_dirty()));
        })
        .check_request(|url, _| panic!("unexpected request to {}", url))
        .done();

    assert_eq!(texts.items(), vec![("state idle".to_string(), false)]);
    assert_eq!(tester.pending_requests(), 0);
}

#[test]
fn content_assist_result_reaches_checker() {
    let mut tester = tester(ServiceOptions::for_language("mydsl"));
    let outcomes = Recorder::new();
    let sink = outcomes.sink();

    tester
        .set_text("abc", Some(0..0))
        .set_caret_offset(3)
        .invoke_service(ServiceKind::ContentAssist, InvokeOverrides::default())
        .unwrap()
        .check_request(|url, settings| {
            assert_eq!(url, "test://xtext-service/assist");
            assert_eq!(settings.param("resource"), Some(&json!("text.mydsl")));
            assert_eq!(settings.param("caretOffset"), Some(&json!(3)));
            assert_eq!(settings.param("fullText"), Some(&json!("abc")));
        })
        .respond(json!([{"proposal": "abcd"}]))
        .unwrap()
        .check_result(move |checked| match checked {
            Checked::Result(outcome) => sink(outcome),
            Checked::Context(_) => panic!("expected an invocation result"),
        })
        .done();

    assert_eq!(outcomes.items(), vec![Ok(json!([{"proposal": "abcd"}]))]);
}

#[test]
fn failed_content_assist_reaches_checker_as_http_failure() {
    let mut tester = tester(ServiceOptions::for_language("mydsl"));
    let outcomes = Recorder::new();
    let sink = outcomes.sink();

    tester
        .invoke_service(ServiceKind::ContentAssist, InvokeOverrides::default())
        .unwrap()
        .check_result(move |checked| sink(checked.outcome().cloned()))
        .http_error("Internal Server Error", Xhr::with_status(500))
        .unwrap();

    let items = outcomes.items();
    assert_eq!(items.len(), 1);
    assert!(matches!(
        &items[0],
        Some(Err(ServiceFailure::Http { status: Some(500), error_thrown, .. }))
            if error_thrown == "Internal Server Error"
    ));
}

#[test]
fn content_assist_uses_caret_and_selection_over_overrides() {
    let mut tester = tester(ServiceOptions::for_language("mydsl"));
    let overrides = InvokeOverrides {
        offset: Some(99),
        selection: Some(Selection::new(0, 2)),
        ..Default::default()
    };

    tester
        .set_text("state idle", None)
        .set_caret_offset(4)
        .invoke_service(ServiceKind::ContentAssist, overrides.clone())
        .unwrap()
        .check_request(|_, settings| {
            assert_eq!(settings.param("caretOffset"), Some(&json!(4)));
            assert_eq!(settings.param("selectionStart"), None);
            assert_eq!(settings.param("selectionEnd"), None);
        })
        .setup(|context| context.set_selection(Selection::new(6, 10)))
        .invoke_service(ServiceKind::ContentAssist, overrides)
        .unwrap()
        .check_request(|_, settings| {
            assert_eq!(settings.param("caretOffset"), Some(&json!(4)));
            assert_eq!(settings.param("selectionStart"), Some(&json!(6)));
            assert_eq!(settings.param("selectionEnd"), Some(&json!(10)));
        });
}

#[test]
fn interleaved_requests_can_all_be_answered() {
    let mut tester = tester(ServiceOptions::for_language("mydsl"));

    tester
        .set_text("abcd", None)
        .invoke_service(ServiceKind::Validation, InvokeOverrides::default())
        .unwrap()
        .invoke_service(ServiceKind::ContentAssist, InvokeOverrides::default())
        .unwrap()
        .check_request(|url, _| assert_eq!(url, "test://xtext-service/validate"))
        .check_request(|url, _| assert_eq!(url, "test://xtext-service/assist"))
        .respond(json!([]))
        .unwrap()
        .respond(json!({"issues": []}))
        .unwrap();

    let context = tester.editor_context().clone();
    assert_eq!(
        context.client_service_state(ServiceKind::Validation),
        Some(RequestState::Finished)
    );

    tester
        .invoke_service(ServiceKind::Validation, InvokeOverrides::default())
        .unwrap();
    assert_eq!(tester.pending_requests(), 1);
}

#[test]
fn model_change_updates_then_validates_against_new_state() {
    let mut tester = tester(ServiceOptions::for_language("mydsl"));

    tester
        .trigger_model_change("state foo", None)
        .check_request(|url, settings| {
            assert_eq!(url, "test://xtext-service/update");
            assert_eq!(settings.param("fullText"), Some(&json!("state foo")));
        })
        .respond(json!({"stateId": "1"}))
        .unwrap()
        .check_request(|url, settings| {
            assert_eq!(url, "test://xtext-service/validate");
            assert_eq!(settings.param("requiredStateId"), Some(&json!("1")));
            assert_eq!(settings.param("fullText"), None);
        })
        .respond(json!({"issues": [
            {"description": "Unknown state", "severity": "error", "line": 1, "offset": 6, "length": 3}
        ]}))
        .unwrap();

    let problems = tester.editor_context().problems();
    assert_eq!(
        problems,
        vec![Problem {
            description: "Unknown state".to_string(),
            severity: "error".to_string(),
            line: Some(1),
            column: None,
            offset: Some(6),
            length: Some(3),
        }]
    );
    assert_eq!(tester.pending_requests(), 0);
}

#[test]
fn edits_during_update_are_coalesced_into_one_delta() {
    let mut tester = tester(ServiceOptions {
        enable_validation_service: false,
        ..ServiceOptions::for_language("mydsl")
    });

    tester
        .trigger_model_change("state", None)
        .trigger_model_change("state a", None)
        .trigger_model_change("state ab", None);
    assert_eq!(tester.pending_requests(), 1);

    tester
        .respond(json!({"stateId": "1"}))
        .unwrap()
        .check_request(|_, settings| {
            assert_eq!(settings.param("requiredStateId"), Some(&json!("1")));
            assert_eq!(settings.param("deltaText"), Some(&json!(" ab")));
            assert_eq!(settings.param("deltaOffset"), Some(&json!(5)));
        });
    assert_eq!(tester.pending_requests(), 0);
}

#[test]
fn full_text_mode_validates_directly_on_model_change() {
    let mut tester = tester(ServiceOptions {
        send_full_text: true,
        ..ServiceOptions::for_language("mydsl")
    });
    let dispatcher = tester.editor_context().dispatcher().unwrap();
    assert!(!dispatcher.has_service(ServiceKind::Update));

    tester
        .trigger_model_change("state foo", None)
        .check_request(|url, settings| {
            assert_eq!(url, "test://xtext-service/validate");
            assert_eq!(settings.param("fullText"), Some(&json!("state foo")));
        });
    assert_eq!(tester.pending_requests(), 0);
}

#[test]
fn save_after_load_sends_delta_against_loaded_state() {
    let mut tester = tester(ServiceOptions::for_resource("foo.mydsl"));

    tester
        .respond(json!({"fullText": "abc", "dirty": false, "stateId": "1"}))
        .unwrap()
        .set_text("abcd", None)
        .invoke_service(ServiceKind::Save, InvokeOverrides::default())
        .unwrap()
        .check_request(|url, settings| {
            assert_eq!(url, "test://xtext-service/save");
            assert_eq!(settings.method, Method::Post);
            assert_eq!(settings.param("requiredStateId"), Some(&json!("1")));
            assert_eq!(settings.param("deltaText"), Some(&json!("d")));
            assert_eq!(settings.param("deltaOffset"), Some(&json!(3)));
            assert_eq!(settings.param("deltaReplaceLength"), Some(&json!(0)));
        })
        .respond(json!({"stateId": "2"}))
        .unwrap();

    let context = tester.editor_context();
    assert!(!context.is_dirty());
    assert_eq!(context.server_state().state_id.as_deref(), Some("2"));
    assert_eq!(context.server_state().text.as_deref(), Some("abcd"));
}

#[test]
fn revert_replaces_text_with_server_copy() {
    let mut tester = tester(ServiceOptions::for_resource("foo.mydsl"));

    tester
        .respond(json!({"fullText": "abc", "stateId": "1"}))
        .unwrap()
        .set_text("local edits", None)
        .invoke_service(ServiceKind::Revert, InvokeOverrides::default())
        .unwrap()
        .check_request(|url, settings| {
            assert_eq!(url, "test://xtext-service/revert");
            assert_eq!(settings.method, Method::Post);
        })
        .respond(json!({"fullText": "abc", "dirty": false, "stateId": "3"}))
        .unwrap();

    let context = tester.editor_context();
    assert_eq!(context.text(), "abc");
    assert!(!context.is_dirty());
    assert_eq!(context.server_state().state_id.as_deref(), Some("3"));
}

#[test]
fn service_listeners_observe_outcomes() {
    let mut tester = tester(ServiceOptions::for_language("mydsl"));
    let successes = Recorder::new();
    let failures = Recorder::new();
    let on_success = successes.sink();
    let on_failure = failures.sink();

    tester
        .setup(|context| {
            context.add_service_success_listener(move |kind, _| on_success(kind));
            context.add_service_error_listener(move |kind, failure| {
                on_failure((kind, failure.severity()))
            });
        })
        .invoke_service(ServiceKind::Validation, InvokeOverrides::default())
        .unwrap()
        .http_error("Service Unavailable", Xhr::with_status(503))
        .unwrap()
        .invoke_service(ServiceKind::Validation, InvokeOverrides::default())
        .unwrap()
        .respond(json!({"issues": []}))
        .unwrap();

    assert_eq!(failures.items(), vec![(ServiceKind::Validation, "error")]);
    assert_eq!(successes.items(), vec![ServiceKind::Validation]);
}

#[test]
fn stale_state_conflict_resends_full_text() {
    let mut tester = tester(ServiceOptions {
        enable_validation_service: false,
        ..ServiceOptions::for_language("mydsl")
    });

    tester
        .trigger_model_change("abc", None)
        .respond(json!({"stateId": "1"}))
        .unwrap()
        .trigger_model_change("abcd", None)
        .check_request(|_, settings| {
            assert_eq!(settings.param("requiredStateId"), Some(&json!("1")));
        })
        .respond(json!({"conflict": "invalidStateId"}))
        .unwrap()
        .check_request(|_, settings| {
            assert_eq!(settings.param("fullText"), Some(&json!("abcd")));
            assert_eq!(settings.param("requiredStateId"), None);
        });
}

#[test]
fn done_callback_runs_at_end_of_scenario() {
    let finished = Recorder::new();
    let sink = finished.sink();
    let mut tester = tester(ServiceOptions::for_language("mydsl")).with_done_callback(move || sink(()));

    tester.set_text("abc", None).done();

    assert_eq!(finished.len(), 1);
}
