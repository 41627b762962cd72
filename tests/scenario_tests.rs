//! End-to-end flows: connect, generate, no-new-changes, revise, persist

use aria_changelog::error::ChangelogError;
use aria_changelog::notifications::LogNotifier;
use aria_changelog::services::EditLocks;
use aria_changelog::storage::{KeyValueStore, MemoryStore};
use aria_changelog::studio::{ChatRole, StudioApp, StudioEvent};
use aria_changelog::workspace::Workspace;
use std::sync::Arc;

#[path = "test_utils.rs"]
mod test_utils;
use test_utils::{
    MockLlm, REPO_ID, REPO_URL, SYNTHESIZED_JSON, ScriptedSource, TOKEN, generation_service,
    merged_pr, reviser, two_prs,
};

#[tokio::test]
async fn test_generate_then_nothing_new() {
    let source = Arc::new(ScriptedSource::new());
    source.push_batch(two_prs());
    let llm = Arc::new(MockLlm::replying(&[SYNTHESIZED_JSON]));
    let service = generation_service(&source, &llm);

    let mut workspace = Workspace::new();
    workspace.connect(REPO_URL, TOKEN).expect("connect");
    let repo = workspace.repo_mut(REPO_ID).expect("connected");

    let entry = service.generate_into(repo, None).await.expect("first generation");
    assert_eq!(entry.version, "v1.0.0");
    assert_eq!(entry.pull_request_ids, vec![2, 1]);
    assert_eq!(entry.repo_id, REPO_ID);
    assert_eq!(repo.last_sync, entry.date);

    // Second run: GitHub reports nothing merged since
    let err = service
        .generate_into(repo, None)
        .await
        .expect_err("nothing new");
    assert_eq!(err, ChangelogError::NoNewChanges);
    assert!(err.is_informational());
    assert_eq!(repo.history.len(), 1);
    assert_eq!(llm.calls(), 1);

    let requests = source.requests();
    assert_eq!(requests[0], (REPO_ID.to_string(), TOKEN.to_string(), None));
    assert_eq!(requests[1].2, Some(entry.date));
}

#[tokio::test]
async fn test_explicit_version_label_is_kept() {
    let source = Arc::new(ScriptedSource::new());
    source.push_batch(vec![merged_pr(9, "Add dark mode", None)]);
    let llm = Arc::new(MockLlm::replying(&[SYNTHESIZED_JSON]));

    let mut workspace = Workspace::new();
    workspace.connect(REPO_URL, TOKEN).expect("connect");
    let repo = workspace.repo_mut(REPO_ID).expect("connected");

    let entry = generation_service(&source, &llm)
        .generate_into(repo, Some("2024.05"))
        .await
        .expect("generation");
    assert_eq!(entry.version, "2024.05");
    assert_eq!(repo.history.next_version(), "v1.0.1");
}

#[tokio::test]
async fn test_upstream_error_leaves_history_untouched() {
    let source = Arc::new(ScriptedSource::new());
    source.push_error(ChangelogError::UpstreamFetch {
        status: Some(403),
        message: "API rate limit exceeded".to_string(),
    });
    let llm = Arc::new(MockLlm::new());

    let mut workspace = Workspace::new();
    workspace.connect(REPO_URL, TOKEN).expect("connect");
    let repo = workspace.repo_mut(REPO_ID).expect("connected");

    let err = generation_service(&source, &llm)
        .generate_into(repo, None)
        .await
        .expect_err("upstream failure");
    assert_eq!(err.to_string(), "GitHub API Error: API rate limit exceeded");
    assert!(repo.history.is_empty());
    assert_eq!(llm.calls(), 0);
}

fn studio(source: &Arc<ScriptedSource>, llm: &Arc<MockLlm>, store: Arc<MemoryStore>) -> StudioApp {
    StudioApp::new(
        Workspace::new(),
        store,
        generation_service(source, llm),
        reviser(llm),
        Arc::new(LogNotifier),
        EditLocks::new(),
    )
}

#[tokio::test]
async fn test_studio_generates_revises_and_persists() {
    let source = Arc::new(ScriptedSource::new());
    source.push_batch(two_prs());
    let llm = Arc::new(MockLlm::replying(&[
        SYNTHESIZED_JSON,
        r#"{"features":["CSV export."],"fixes":["Saving no longer crashes."],"improvements":[]}"#,
    ]));
    let store = Arc::new(MemoryStore::new());
    let mut app = studio(&source, &llm, Arc::clone(&store));

    app.dispatch(StudioEvent::Connect {
        url: REPO_URL.to_string(),
        token: TOKEN.to_string(),
    })
    .expect("connect");
    app.dispatch(StudioEvent::SelectRepository(REPO_ID.to_string()))
        .expect("select");
    app.dispatch(StudioEvent::GenerateRequested).expect("generate");
    app.settle().await.expect("settle generation");

    let entry = app.state.selected_entry().cloned().expect("entry selected");
    assert_eq!(entry.version, "v1.0.0");
    assert_eq!(app.state.version_input, "v1.0.1");

    app.dispatch(StudioEvent::ReviseRequested("Make it terse".to_string()))
        .expect("revise");
    app.settle().await.expect("settle revision");

    let revised = app.state.selected_entry().expect("entry still selected");
    assert_eq!(revised.id, entry.id);
    assert_eq!(revised.changelog.features, vec!["CSV export."]);
    let roles: Vec<ChatRole> = app.state.transcript.messages().map(|m| m.role).collect();
    assert_eq!(roles, vec![ChatRole::User, ChatRole::Model]);
    assert!(!app.locks().is_locked(REPO_ID));

    // Everything survives a reload from the store
    let reloaded = Workspace::load(store.as_ref() as &dyn KeyValueStore).expect("reload");
    let repo = reloaded.repo(REPO_ID).expect("persisted repo");
    assert_eq!(repo.token, TOKEN);
    assert_eq!(repo.history.len(), 1);
    assert_eq!(
        repo.history.most_recent().map(|e| e.changelog.features.clone()),
        Some(vec!["CSV export.".to_string()])
    );
    assert!(reloaded.notifications.len() >= 2);
}

#[tokio::test]
async fn test_studio_reports_no_new_changes() {
    let source = Arc::new(ScriptedSource::new());
    let llm = Arc::new(MockLlm::new());
    let mut app = studio(&source, &llm, Arc::new(MemoryStore::new()));

    app.dispatch(StudioEvent::Connect {
        url: REPO_URL.to_string(),
        token: TOKEN.to_string(),
    })
    .expect("connect");
    app.dispatch(StudioEvent::SelectRepository(REPO_ID.to_string()))
        .expect("select");
    app.dispatch(StudioEvent::GenerateRequested).expect("generate");
    app.settle().await.expect("settle");

    assert_eq!(app.state.last_error, Some(ChangelogError::NoNewChanges));
    assert!(app.state.selected_entry().is_none());
    assert_eq!(llm.calls(), 0);
}

#[tokio::test]
async fn test_held_lease_turns_request_into_busy() {
    let source = Arc::new(ScriptedSource::new());
    source.push_batch(two_prs());
    let llm = Arc::new(MockLlm::replying(&[SYNTHESIZED_JSON]));
    let mut app = studio(&source, &llm, Arc::new(MemoryStore::new()));

    app.dispatch(StudioEvent::Connect {
        url: REPO_URL.to_string(),
        token: TOKEN.to_string(),
    })
    .expect("connect");
    app.dispatch(StudioEvent::SelectRepository(REPO_ID.to_string()))
        .expect("select");

    // Someone else (the auto-generator) is editing this repository
    let lease = app.locks().try_acquire(REPO_ID).expect("free lock");
    app.dispatch(StudioEvent::GenerateRequested).expect("generate");
    app.settle().await.expect("settle");
    drop(lease);

    assert_eq!(
        app.state.last_error,
        Some(ChangelogError::Busy(REPO_ID.to_string()))
    );
    assert!(source.requests().is_empty());
}
