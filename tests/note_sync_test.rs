mod common;

use std::sync::Arc;

use common::{FakeApi, note};
use smart_notes::error::AppError;
use smart_notes::models::{AiAction, AiResult, NewNoteRequest, NoteQuery};
use smart_notes::services::NoteSync;

async fn loaded(api: &FakeApi) -> NoteSync {
    let sync = NoteSync::new(Arc::new(api.clone()));
    sync.fetch(NoteQuery::default()).await.expect("initial fetch");
    sync
}

#[tokio::test]
async fn blank_title_or_content_never_reaches_the_server() {
    let api = FakeApi::with_notes(vec![note("n1", "First")]);
    let sync = loaded(&api).await;
    let calls_before = api.calls().len();

    let blank_title = sync.create(NewNoteRequest::new("   ", "body")).await;
    let blank_content = sync.create(NewNoteRequest::new("Title", "")).await;

    assert!(matches!(blank_title, Err(AppError::Validation(_))));
    assert!(matches!(blank_content, Err(AppError::Validation(_))));
    assert_eq!(api.calls().len(), calls_before);
    assert_eq!(sync.notes().len(), 1);
}

#[tokio::test]
async fn created_note_lands_at_index_zero_with_server_fields() {
    let api = FakeApi::with_notes(vec![note("n1", "First"), note("n2", "Second")]);
    let sync = loaded(&api).await;

    let created = sync
        .create(NewNoteRequest::new("Lecture", "Ownership and borrowing").with_tags(vec!["rust".into()]))
        .await
        .expect("create");

    assert_eq!(sync.notes().len(), 3);
    assert_eq!(sync.notes().items()[0].id, created.id);
    assert_eq!(created.summary.as_deref(), Some("server summary"));
    assert_eq!(created.tags, vec!["rust".to_string()]);
}

#[tokio::test]
async fn failed_create_leaves_collection_untouched() {
    let api = FakeApi::with_notes(vec![note("n1", "First")]);
    let sync = loaded(&api).await;
    let before = sync.notes().items().to_vec();

    api.set_failing(true);
    let result = sync.create(NewNoteRequest::new("Title", "Body")).await;

    let err = result.expect_err("server is failing");
    assert_eq!(err.user_message(), "Server exploded");
    assert_eq!(sync.notes().items(), before.as_slice());
}

#[tokio::test]
async fn failed_fetch_keeps_stale_list_and_filter() {
    let api = FakeApi::with_notes(vec![note("n1", "First")]);
    let sync = loaded(&api).await;

    api.set_failing(true);
    assert!(sync.fetch(NoteQuery::favorites()).await.is_err());

    assert_eq!(sync.notes().len(), 1);
    assert_eq!(sync.query(), NoteQuery::default());
}

#[tokio::test]
async fn delete_removes_exactly_the_matching_note() {
    let api = FakeApi::with_notes(vec![note("n1", "A"), note("n2", "B"), note("n3", "C")]);
    let sync = loaded(&api).await;

    sync.delete("n2").await.expect("delete");

    let ids: Vec<String> = sync.notes().iter().map(|n| n.id.clone()).collect();
    assert_eq!(ids, vec!["n1", "n3"]);
}

#[tokio::test]
async fn deleting_unknown_id_against_failing_server_changes_nothing() {
    let api = FakeApi::with_notes(vec![note("n1", "A"), note("n2", "B")]);
    let sync = loaded(&api).await;

    let result = sync.delete("missing").await;

    assert!(matches!(result, Err(AppError::Api { status: 404, .. })));
    assert_eq!(sync.notes().len(), 2);
}

#[tokio::test]
async fn edit_refetches_with_the_last_filter() {
    let api = FakeApi::with_notes(vec![note("n1", "A"), note("n2", "B")]);
    let sync = loaded(&api).await;
    let lists_before = api.call_count("list_notes");

    let edited = sync
        .edit("n1", "A2", "new body", vec!["edited".into()])
        .await
        .expect("edit");

    assert_eq!(api.call_count("list_notes"), lists_before + 1);
    assert_eq!(edited.title, "A2");
    assert_eq!(sync.notes().get("n1").map(|n| n.content.as_str()), Some("new body"));
}

#[tokio::test]
async fn edit_with_blank_fields_is_rejected_locally() {
    let api = FakeApi::with_notes(vec![note("n1", "A")]);
    let sync = loaded(&api).await;

    let result = sync.edit("n1", "", "body", Vec::new()).await;

    assert!(matches!(result, Err(AppError::Validation(_))));
    assert_eq!(api.call_count("update_note"), 0);
    assert_eq!(sync.notes().get("n1").map(|n| n.title.as_str()), Some("A"));
}

#[tokio::test]
async fn toggle_favorite_follows_server_state() {
    let api = FakeApi::with_notes(vec![note("n1", "A"), note("n2", "B")]);
    let sync = loaded(&api).await;

    let toggled = sync.toggle_favorite("n2").await.expect("toggle");
    assert!(toggled.is_favorite);
    assert_eq!(sync.notes().get("n2").map(|n| n.is_favorite), Some(true));
    assert_eq!(sync.notes().get("n1").map(|n| n.is_favorite), Some(false));

    sync.fetch(NoteQuery::favorites()).await.expect("favorites");
    let untoggled = sync.toggle_favorite("n2").await.expect("toggle back");
    assert!(!untoggled.is_favorite);
    // The favorites filter is reused for the refetch, so n2 drops out.
    assert!(sync.notes().is_empty());
}

#[tokio::test]
async fn summarize_action_stores_summary_on_the_note() {
    let api = FakeApi::with_notes(vec![note("n1", "A")]);
    let sync = loaded(&api).await;

    let result = sync.ai_process("n1", AiAction::Summarize).await.expect("ai");

    assert_eq!(result, AiResult::Text("fresh summary".to_string()));
    assert_eq!(
        sync.notes().get("n1").and_then(|n| n.summary.as_deref()),
        Some("fresh summary")
    );
}

#[tokio::test]
async fn suggested_tags_are_decoded_from_json_text() {
    let api = FakeApi::with_notes(vec![note("n1", "A")]);
    api.state().ai_result = Some(serde_json::Value::String(r#"["rust","notes"]"#.to_string()));
    let sync = loaded(&api).await;

    let result = sync.ai_process("n1", AiAction::SuggestTags).await.expect("ai");

    assert_eq!(result, AiResult::Tags(vec!["rust".to_string(), "notes".to_string()]));
    assert!(sync.notes().get("n1").and_then(|n| n.summary.clone()).is_none());
}

#[tokio::test]
async fn undecodable_tag_list_is_a_malformed_response() {
    let api = FakeApi::with_notes(vec![note("n1", "A")]);
    api.state().ai_result = Some(serde_json::Value::String("rust, notes".to_string()));
    let sync = loaded(&api).await;

    let result = sync.ai_process("n1", AiAction::SuggestTags).await;

    assert!(matches!(result, Err(AppError::MalformedResponse(_))));
}

#[tokio::test]
async fn tags_and_stats_come_straight_from_the_server() {
    let api = FakeApi::with_notes(vec![note("n1", "A"), note("n2", "B")]);
    let sync = loaded(&api).await;

    let tags = sync.load_tags().await.expect("tags").to_vec();
    let stats = sync.stats().await.expect("stats");

    assert_eq!(tags, vec!["seed".to_string()]);
    assert_eq!(stats.total_notes, 2);
    assert_eq!(stats.favorite_notes, 0);
}

#[tokio::test]
async fn get_refreshes_the_cached_copy() {
    let api = FakeApi::with_notes(vec![note("n1", "A"), note("n2", "B")]);
    let sync = loaded(&api).await;
    api.state().notes[1].title = "B (edited elsewhere)".to_string();

    let fetched = sync.get("n2").await.expect("get");

    assert_eq!(fetched.title, "B (edited elsewhere)");
    assert_eq!(sync.notes().get("n2").map(|n| n.title.as_str()), Some("B (edited elsewhere)"));
    assert_eq!(sync.notes().items()[0].id, "n1");
}

#[tokio::test]
async fn draft_summary_does_not_touch_the_list() {
    let api = FakeApi::with_notes(vec![note("n1", "A")]);
    let sync = loaded(&api).await;

    let summary = sync.summarize("Draft", "Some thoughts").await.expect("summarize");
    let blank = sync.summarize("Draft", " ").await;

    assert_eq!(summary.summary, "summary of Draft");
    assert!(matches!(blank, Err(AppError::Validation(_))));
    assert_eq!(api.call_count("summarize"), 1);
    assert_eq!(sync.notes().len(), 1);
}

#[tokio::test]
async fn update_keeps_the_server_copy_when_the_refetch_fails() {
    let api = FakeApi::with_notes(vec![note("n1", "A"), note("n2", "B")]);
    let sync = loaded(&api).await;
    api.fail_call("list_notes");

    let edited = sync
        .edit("n1", "A2", "rewritten", vec!["edited".into()])
        .await
        .expect("the write itself succeeded");

    assert_eq!(edited.title, "A2");
    assert_eq!(sync.note("n1").map(|n| n.title), Some("A2".to_string()));
    assert_eq!(sync.note("n2").map(|n| n.title), Some("B".to_string()));
    assert_eq!(sync.notes().items()[0].id, "n1");
}

#[tokio::test]
async fn failed_update_leaves_the_list_untouched() {
    let api = FakeApi::with_notes(vec![note("n1", "A"), note("n2", "B")]);
    let sync = loaded(&api).await;
    let before = sync.notes().items().to_vec();

    api.set_failing(true);
    let edit = sync.edit("n1", "A2", "rewritten", Vec::new()).await;
    let toggle = sync.toggle_favorite("n2").await;

    assert!(matches!(edit, Err(AppError::Api { status: 500, .. })));
    assert!(matches!(toggle, Err(AppError::Api { status: 500, .. })));
    assert_eq!(sync.notes().items(), before.as_slice());
}
