#![forbid(unsafe_code)]

use mb_core::{Author, CommitMessage, Confidence, StructuredMessage};
use mb_storage::{
    CreateProposalRequest, ErrorKind, SqliteStore, StoreError, UpdateBlockRequest,
};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn open_store() -> (TempDir, SqliteStore) {
    let dir = tempfile::tempdir().expect("temp dir");
    let store = SqliteStore::open(dir.path()).expect("open store");
    (dir, store)
}

fn update(store: &mut SqliteStore, user_id: &str, label: &str, body: &str) -> String {
    store
        .update_block(UpdateBlockRequest::new(user_id, label, body, Author::User))
        .expect("update block")
}

fn body_of(store: &SqliteStore, label: &str) -> Option<String> {
    store
        .get_block("u1", label)
        .expect("get block")
        .map(|block| block.body)
}

#[test]
fn update_then_get_round_trips() {
    let (_dir, mut store) = open_store();

    let mut request = UpdateBlockRequest::new("u1", "student", "Interested in CS", Author::User);
    request.title = Some("Student".to_string());
    request.schema_ref = Some("schema://student".to_string());
    store.update_block(request).expect("update");

    let block = store.get_block("u1", "student").unwrap().expect("block");
    assert_eq!(block.user_id, "u1");
    assert_eq!(block.label, "student");
    assert_eq!(block.body, "Interested in CS");
    assert_eq!(block.title.as_deref(), Some("Student"));
    assert_eq!(block.schema_ref.as_deref(), Some("schema://student"));
    assert!(block.updated_at_ms > 0);

    assert_eq!(store.get_block("u1", "missing").unwrap(), None);
    assert_eq!(store.get_block("u2", "student").unwrap(), None);
}

#[test]
fn partial_update_keeps_title_and_schema_ref() {
    let (_dir, mut store) = open_store();

    let mut request = UpdateBlockRequest::new("u1", "student", "v1", Author::User);
    request.title = Some("Student".to_string());
    request.schema_ref = Some("schema://student".to_string());
    store.update_block(request).expect("first");
    update(&mut store, "u1", "student", "v2");

    let block = store.get_block("u1", "student").unwrap().expect("block");
    assert_eq!(block.body, "v2");
    assert_eq!(block.title.as_deref(), Some("Student"));
    assert_eq!(block.schema_ref.as_deref(), Some("schema://student"));
}

#[test]
fn list_blocks_is_ordered_and_scoped_to_the_user() {
    let (_dir, mut store) = open_store();

    update(&mut store, "u1", "progress", "Completed module 1");
    update(&mut store, "u1", "notes", "");
    update(&mut store, "u1", "student", "Interested in CS");
    update(&mut store, "u1", "scratch", "temporary");
    update(&mut store, "u2", "notes", "someone else");
    store
        .delete_block("u1", "scratch", &Author::User)
        .expect("delete");

    let blocks = store.list_blocks("u1").expect("list");
    let labels: Vec<&str> = blocks.iter().map(|b| b.label.as_str()).collect();
    assert_eq!(labels, vec!["notes", "progress", "student"]);
    assert_eq!(blocks[0].body, "");

    assert!(store.list_blocks("nobody").unwrap().is_empty());
}

#[test]
fn delete_block_writes_a_tombstone_once() {
    let (_dir, mut store) = open_store();

    assert_eq!(
        store.delete_block("u1", "notes", &Author::User).unwrap(),
        None
    );

    update(&mut store, "u1", "notes", "draft");
    let commit = store
        .delete_block("u1", "notes", &Author::User)
        .unwrap()
        .expect("tombstone commit");
    assert_eq!(store.get_block("u1", "notes").unwrap(), None);
    assert_eq!(
        store.delete_block("u1", "notes", &Author::User).unwrap(),
        None
    );

    let history = store.get_block_history("u1", "notes", 0).unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].commit_id, commit);
    assert!(history[0].deleted);

    // The label can be reused after deletion.
    update(&mut store, "u1", "notes", "again");
    assert_eq!(
        store.get_block("u1", "notes").unwrap().expect("block").body,
        "again"
    );
}

#[test]
fn history_grows_by_one_per_update() {
    let (_dir, mut store) = open_store();

    assert!(store.get_block_history("u1", "progress", 10).unwrap().is_empty());

    let mut commits = Vec::new();
    for (index, body) in ["one", "two", "three"].into_iter().enumerate() {
        commits.push(update(&mut store, "u1", "progress", body));
        let history = store.get_block_history("u1", "progress", 10).unwrap();
        assert_eq!(history.len(), index + 1);
    }

    let history = store.get_block_history("u1", "progress", 10).unwrap();
    let ids: Vec<&str> = history.iter().map(|r| r.commit_id.as_str()).collect();
    assert_eq!(ids, vec![commits[2].as_str(), commits[1].as_str(), commits[0].as_str()]);
    assert!(history[0].is_current);
    assert!(!history[1].is_current);
    assert_eq!(history[0].author, Author::User);
    assert_eq!(history[0].message, "update progress");

    assert_eq!(store.get_block_history("u1", "progress", 1).unwrap().len(), 1);
}

#[test]
fn custom_message_and_agent_author_are_recorded() {
    let (_dir, mut store) = open_store();

    let mut request = UpdateBlockRequest::new("u1", "notes", "text", Author::agent("tutor"));
    request.message = Some("summarise session".to_string());
    store.update_block(request).expect("update");

    let history = store.get_block_history("u1", "notes", 0).unwrap();
    assert_eq!(history[0].author, Author::agent("tutor"));
    assert_eq!(history[0].author.to_string(), "agent:tutor");
    assert_eq!(history[0].message, "summarise session");
}

#[test]
fn block_at_version_reads_historical_snapshots() {
    let (_dir, mut store) = open_store();

    let before = update(&mut store, "u1", "other", "unrelated");
    let first = update(&mut store, "u1", "progress", "one");
    update(&mut store, "u1", "progress", "two");

    let old = store
        .get_block_at_version("u1", "progress", &first)
        .unwrap()
        .expect("snapshot");
    assert_eq!(old.body, "one");
    assert_eq!(
        store.get_block("u1", "progress").unwrap().expect("block").body,
        "two"
    );

    // Before the block existed, and an unknown commit id.
    assert_eq!(
        store.get_block_at_version("u1", "progress", &before).unwrap(),
        None
    );
    assert_eq!(
        store.get_block_at_version("u1", "progress", "0000").unwrap(),
        None
    );
}

#[test]
fn restore_appends_one_entry_with_the_old_snapshot() {
    let (_dir, mut store) = open_store();

    let mut request = UpdateBlockRequest::new("u1", "student", "v1", Author::User);
    request.title = Some("Student v1".to_string());
    let first = store.update_block(request).expect("v1");
    let mut request = UpdateBlockRequest::new("u1", "student", "v2", Author::User);
    request.title = Some("Student v2".to_string());
    store.update_block(request).expect("v2");
    update(&mut store, "u1", "student", "v3");

    let before = store.get_block_history("u1", "student", 0).unwrap();
    assert_eq!(before.len(), 3);

    let restored = store
        .restore_block("u1", "student", &first, &Author::User)
        .expect("restore");

    let block = store.get_block("u1", "student").unwrap().expect("block");
    assert_eq!(block.body, "v1");
    assert_eq!(block.title.as_deref(), Some("Student v1"));

    let after = store.get_block_history("u1", "student", 0).unwrap();
    assert_eq!(after.len(), before.len() + 1);
    assert_eq!(after[0].commit_id, restored);
    let earlier: Vec<&str> = after[1..].iter().map(|r| r.commit_id.as_str()).collect();
    let original: Vec<&str> = before.iter().map(|r| r.commit_id.as_str()).collect();
    assert_eq!(earlier, original);

    match CommitMessage::parse(&after[0].message) {
        CommitMessage::Structured(StructuredMessage::Restore { restored_from, .. }) => {
            assert_eq!(restored_from, first);
        }
        other => panic!("unexpected restore message: {other:?}"),
    }
}

#[test]
fn restore_rejects_unknown_and_foreign_commits() {
    let (_dir, mut store) = open_store();

    update(&mut store, "u1", "student", "v1");
    let foreign = update(&mut store, "u1", "progress", "p1");

    let err = store
        .restore_block("u1", "student", "deadbeef", &Author::User)
        .expect_err("unknown commit");
    assert!(matches!(err, StoreError::UnknownCommit));
    assert_eq!(err.kind(), ErrorKind::NotFound);

    let err = store
        .restore_block("u1", "student", &foreign, &Author::User)
        .expect_err("commit of another key");
    assert!(matches!(err, StoreError::CommitKeyMismatch));
    assert_eq!(err.kind(), ErrorKind::ValidationFailure);

    assert_eq!(store.get_block_history("u1", "student", 0).unwrap().len(), 1);
}

#[test]
fn open_proposal_commits_are_not_block_versions() {
    let (_dir, mut store) = open_store();
    update(&mut store, "u1", "student", "orig");

    store
        .create_proposal(CreateProposalRequest {
            user_id: "u1".to_string(),
            label: "student".to_string(),
            body: "agent draft".to_string(),
            agent_id: "tutor".to_string(),
            reasoning: "guess".to_string(),
            confidence: Confidence::Low,
            title: None,
            schema_ref: None,
        })
        .expect("propose");
    let trail = store.get_proposal_trail("u1", "student").unwrap();
    let draft = trail[0].commit_id.clone();

    assert_eq!(
        store.get_block_at_version("u1", "student", &draft).unwrap(),
        None
    );
    let err = store
        .restore_block("u1", "student", &draft, &Author::User)
        .expect_err("unapproved commit");
    assert!(matches!(err, StoreError::UnmergedCommit));
    assert_eq!(err.kind(), ErrorKind::ValidationFailure);
    assert_eq!(body_of(&store, "student").as_deref(), Some("orig"));
    assert_eq!(store.get_block_history("u1", "student", 0).unwrap().len(), 1);

    // Once approved, the same commit is part of main-line and restorable.
    store.approve_proposal("u1", "student").unwrap().expect("approved");
    update(&mut store, "u1", "student", "later");
    let snapshot = store
        .get_block_at_version("u1", "student", &draft)
        .unwrap()
        .expect("merged snapshot");
    assert_eq!(snapshot.body, "agent draft");
    store
        .restore_block("u1", "student", &draft, &Author::User)
        .expect("restore merged commit");
    assert_eq!(body_of(&store, "student").as_deref(), Some("agent draft"));
}

#[test]
fn restoring_a_tombstone_deletes_the_block() {
    let (_dir, mut store) = open_store();

    update(&mut store, "u1", "notes", "v1");
    let tombstone = store
        .delete_block("u1", "notes", &Author::User)
        .unwrap()
        .expect("tombstone");
    update(&mut store, "u1", "notes", "v2");

    store
        .restore_block("u1", "notes", &tombstone, &Author::User)
        .expect("restore");
    assert_eq!(store.get_block("u1", "notes").unwrap(), None);
}

#[test]
fn invalid_identifiers_are_rejected() {
    let (_dir, mut store) = open_store();

    let err = store
        .update_block(UpdateBlockRequest::new("", "notes", "x", Author::User))
        .expect_err("empty user");
    assert!(matches!(err, StoreError::InvalidInput(_)));
    assert_eq!(err.kind(), ErrorKind::ValidationFailure);

    let err = store.get_block("u1", "bad\nlabel").expect_err("control char");
    assert!(matches!(err, StoreError::InvalidInput(_)));

    let err = store.list_blocks("").expect_err("empty user");
    assert_eq!(err.code(), "INVALID_INPUT");
}
