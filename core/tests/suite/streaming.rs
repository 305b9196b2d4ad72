use std::time::Duration;

use core_test_support::harness;
use core_test_support::settings_with_key;
use pretty_assertions::assert_eq;
use simple_translate_core::DispatchError;
use simple_translate_core::SessionStatus;
use simple_translate_core::SessionUpdate;
use simple_translate_core::StreamingTranslator;
use simple_translate_core::TranslationError;
use simple_translate_core::ValidationError;
use simple_translate_protocol::Settings;
use simple_translate_protocol::TranslationRequest;
use tracing_test::traced_test;

fn hello() -> TranslationRequest {
    TranslationRequest::new("hello", "en", "es")
}

async fn run_to_end(translator: &mut StreamingTranslator) -> Vec<SessionUpdate> {
    let mut updates = Vec::new();
    while let Some(update) = translator.process_next().await {
        let done = update.is_terminal();
        updates.push(update);
        if done {
            break;
        }
    }
    updates
}

#[tokio::test]
async fn streams_tokens_into_final_text() {
    let mut h = harness().await;

    let pending = h
        .translator
        .translate(hello(), &settings_with_key())
        .await
        .unwrap();
    assert_eq!(h.translator.status(), SessionStatus::Streaming);
    assert_eq!(h.backend.jobs()[0].session, pending.session());

    h.backend.token(None, "Hola");
    h.backend.token(None, ",");
    h.backend.token(None, " mundo");
    h.backend.complete(None, "Hola, mundo!");

    let updates = run_to_end(&mut h.translator).await;

    assert_eq!(
        updates,
        vec![
            SessionUpdate::Token("Hola".to_string()),
            SessionUpdate::Token(",".to_string()),
            SessionUpdate::Token(" mundo".to_string()),
            SessionUpdate::Completed("Hola, mundo".to_string()),
        ]
    );
    assert_eq!(h.translator.streaming_text(), "Hola, mundo");
    assert!(!h.translator.translating());
    assert_eq!(h.translator.error(), None);

    let done = pending.await.unwrap();
    assert_eq!(done.text, "Hola, mundo");
    assert_eq!(done.response.translated_text, "Hola, mundo!");
}

#[tokio::test]
async fn tokens_concatenate_in_arrival_order() {
    let mut h = harness().await;
    h.translator
        .translate(hello(), &settings_with_key())
        .await
        .unwrap();

    let tokens = ["a", "b", "b", "", " ", "a"];
    for token in tokens {
        h.backend.token(None, token);
    }
    h.translator.drain_events();

    assert_eq!(h.translator.streaming_text(), tokens.concat());
    assert_eq!(h.translator.status(), SessionStatus::Streaming);
}

#[tokio::test]
async fn error_before_any_token() {
    let mut h = harness().await;
    let pending = h
        .translator
        .translate(hello(), &settings_with_key())
        .await
        .unwrap();

    h.backend.error(None, "quota exceeded");
    run_to_end(&mut h.translator).await;

    assert!(!h.translator.translating());
    assert_eq!(h.translator.error(), Some("quota exceeded"));
    assert_eq!(h.translator.streaming_text(), "");
    assert_eq!(
        pending.await,
        Err(TranslationError::Stream("quota exceeded".to_string()))
    );
}

#[tokio::test]
async fn whitespace_never_reaches_the_backend() {
    let mut h = harness().await;

    let result = h
        .translator
        .translate(
            TranslationRequest::new("   \n\t", "en", "es"),
            &settings_with_key(),
        )
        .await;

    assert_eq!(
        result.err(),
        Some(TranslationError::Validation(ValidationError::EmptyText))
    );
    assert!(h.backend.jobs().is_empty());
    assert_eq!(h.translator.status(), SessionStatus::Idle);
}

#[tokio::test(start_paused = true)]
async fn new_session_starts_requesting_with_clean_state() {
    let mut h = harness().await;
    h.translator
        .translate(hello(), &settings_with_key())
        .await
        .unwrap();
    h.backend.token(None, "Hol");
    h.backend.error(None, "network drop");
    h.translator.drain_events();
    assert_eq!(h.translator.error(), Some("network drop"));

    // Stop the next submission from being accepted so `Requesting` is observable.
    h.backend.hold_submissions();
    let submit = tokio::time::timeout(
        Duration::from_millis(50),
        h.translator.translate(hello(), &settings_with_key()),
    )
    .await;

    assert!(submit.is_err());
    assert_eq!(h.translator.status(), SessionStatus::Requesting);
    assert!(h.translator.translating());
    assert_eq!(h.translator.streaming_text(), "");
    assert_eq!(h.translator.error(), None);
}

#[tokio::test]
async fn rejected_submission_errors_immediately() {
    let mut h = harness().await;
    h.backend
        .reject_with(DispatchError::Rejected("invalid credentials".to_string()));

    let result = h
        .translator
        .translate(hello(), &settings_with_key())
        .await;

    assert_eq!(
        result.err(),
        Some(TranslationError::Dispatch(DispatchError::Rejected(
            "invalid credentials".to_string()
        )))
    );
    assert_eq!(h.translator.status(), SessionStatus::Errored);
    assert!(!h.translator.translating());
    assert_eq!(h.translator.error(), Some("invalid credentials"));
}

#[tokio::test]
async fn missing_api_key_is_a_dispatch_error() {
    let mut h = harness().await;

    let result = h.translator.translate(hello(), &Settings::default()).await;

    assert_eq!(
        result.err(),
        Some(TranslationError::Dispatch(DispatchError::MissingApiKey))
    );
    assert!(h.backend.jobs().is_empty());
    assert_eq!(h.translator.status(), SessionStatus::Errored);
    assert_eq!(
        h.translator.error(),
        Some("API key not configured. Please set your API key in Settings.")
    );
}

#[tokio::test]
#[traced_test]
async fn stale_tagged_events_are_dropped() {
    let mut h = harness().await;
    let first = h
        .translator
        .translate(hello(), &settings_with_key())
        .await
        .unwrap();
    let first_id = first.session();
    let second = h
        .translator
        .translate(hello(), &settings_with_key())
        .await
        .unwrap();
    let second_id = second.session();
    assert!(second_id > first_id);
    assert_eq!(first.await, Err(TranslationError::Superseded));

    h.backend.token(Some(first_id), "stale");
    h.backend.complete(Some(first_id), "stale");
    h.backend.token(Some(second_id), "fresh");

    let updates = h.translator.drain_events();

    assert_eq!(
        updates,
        vec![
            SessionUpdate::Stale(first_id),
            SessionUpdate::Stale(first_id),
            SessionUpdate::Token("fresh".to_string()),
        ]
    );
    assert_eq!(h.translator.streaming_text(), "fresh");
    assert!(h.translator.translating());
    assert!(logs_contain("dropping stale event"));
}

#[tokio::test]
async fn queued_events_settle_against_the_outgoing_session() {
    let mut h = harness().await;
    let first = h
        .translator
        .translate(hello(), &settings_with_key())
        .await
        .unwrap();

    // Untagged and not yet processed when the next request starts.
    h.backend.token(None, "old");
    h.backend.complete(None, "old");

    let second = h
        .translator
        .translate(hello(), &settings_with_key())
        .await
        .unwrap();

    assert_eq!(first.await.unwrap().text, "old");
    assert_eq!(h.translator.session_id(), Some(second.session()));
    assert_eq!(h.translator.streaming_text(), "");
    assert_eq!(h.translator.status(), SessionStatus::Streaming);
}

#[tokio::test]
async fn events_after_the_terminal_event_are_ignored() {
    let mut h = harness().await;
    h.translator
        .translate(hello(), &settings_with_key())
        .await
        .unwrap();

    h.backend.token(None, "Hola");
    h.backend.complete(None, "Hola");
    h.backend.token(None, " again");
    h.backend.error(None, "late failure");

    let updates = h.translator.drain_events();

    assert_eq!(
        updates[2..].to_vec(),
        vec![SessionUpdate::Ignored, SessionUpdate::Ignored]
    );
    assert_eq!(h.translator.status(), SessionStatus::Complete);
    assert_eq!(h.translator.streaming_text(), "Hola");
    assert_eq!(h.translator.error(), None);
}

#[tokio::test]
async fn clear_text_and_clear_error() {
    let mut h = harness().await;
    h.translator
        .translate(hello(), &settings_with_key())
        .await
        .unwrap();
    h.backend.token(None, "partial");
    h.backend.error(None, "boom");
    h.translator.drain_events();

    h.translator.clear_text();
    assert_eq!(h.translator.streaming_text(), "");
    assert_eq!(h.translator.status(), SessionStatus::Errored);

    h.translator.clear_error();
    assert_eq!(h.translator.error(), None);
    assert_eq!(h.translator.status(), SessionStatus::Errored);
}

#[tokio::test]
async fn dropping_the_translator_abandons_the_session() {
    let mut h = harness().await;
    let pending = h
        .translator
        .translate(hello(), &settings_with_key())
        .await
        .unwrap();

    drop(h.translator);

    assert_eq!(pending.await, Err(TranslationError::Abandoned));
}
