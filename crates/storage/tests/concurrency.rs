#![forbid(unsafe_code)]

use mb_core::{Author, Confidence};
use mb_storage::{CreateProposalRequest, SqliteStore, UpdateBlockRequest};
use pretty_assertions::assert_eq;
use std::path::PathBuf;
use std::thread;

const WORKERS: usize = 4;
const ROUNDS: usize = 5;

fn spawn_workers<F>(dir: PathBuf, work: F) -> Vec<thread::JoinHandle<()>>
where
    F: Fn(&mut SqliteStore, usize, usize) + Send + Sync + Copy + 'static,
{
    (0..WORKERS)
        .map(|worker| {
            let dir = dir.clone();
            thread::spawn(move || {
                let mut store = SqliteStore::open(&dir).expect("open store in worker");
                for round in 0..ROUNDS {
                    work(&mut store, worker, round);
                }
            })
        })
        .collect()
}

#[test]
fn concurrent_proposals_share_one_branch() {
    let dir = tempfile::tempdir().expect("temp dir");
    let mut store = SqliteStore::open(dir.path()).expect("open store");
    store
        .update_block(UpdateBlockRequest::new("u1", "progress", "Started", Author::User))
        .expect("seed block");

    let handles = spawn_workers(dir.path().to_path_buf(), |store, worker, round| {
        store
            .create_proposal(CreateProposalRequest {
                user_id: "u1".to_string(),
                label: "progress".to_string(),
                body: format!("worker {worker} round {round}"),
                agent_id: format!("agent-{worker}"),
                reasoning: format!("round {round}"),
                confidence: Confidence::Medium,
                title: None,
                schema_ref: None,
            })
            .expect("create proposal");
    });
    for handle in handles {
        handle.join().expect("worker panicked");
    }

    assert_eq!(store.count_pending_proposals("u1").unwrap(), 1);
    let open = store.get_proposal("u1", "progress").unwrap().expect("open");
    assert_eq!(open.commit_count, WORKERS * ROUNDS);

    let trail = store.get_proposal_trail("u1", "progress").unwrap();
    assert_eq!(trail.len(), WORKERS * ROUNDS);
    let diff = store
        .get_proposal_diff("u1", "progress")
        .unwrap()
        .expect("diff");
    let last = trail.last().expect("last step");
    assert_eq!(diff.proposed_body, last.body);
    assert_eq!(diff.agent_id, last.agent_id);
    assert_eq!(diff.current_body.as_deref(), Some("Started"));
}

#[test]
fn concurrent_updates_are_all_recorded() {
    let dir = tempfile::tempdir().expect("temp dir");
    let store = SqliteStore::open(dir.path()).expect("open store");

    let handles = spawn_workers(dir.path().to_path_buf(), |store, worker, round| {
        store
            .update_block(UpdateBlockRequest::new(
                "u1",
                "notes",
                format!("worker {worker} round {round}"),
                Author::User,
            ))
            .expect("update block");
    });
    for handle in handles {
        handle.join().expect("worker panicked");
    }

    let history = store.get_block_history("u1", "notes", 100).unwrap();
    assert_eq!(history.len(), WORKERS * ROUNDS);

    // The first-parent chain links every write exactly once.
    for pair in history.windows(2) {
        assert_eq!(pair[0].parent_commit_id.as_deref(), Some(pair[1].commit_id.as_str()));
    }
    let current = store.get_block("u1", "notes").unwrap().expect("block");
    assert!(current.body.starts_with("worker "));
}
