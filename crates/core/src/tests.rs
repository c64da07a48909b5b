use super::ids::*;
use super::*;

#[test]
fn key_part_validation() {
    assert_eq!(UserId::try_new("").unwrap_err(), IdError::Empty);
    assert_eq!(UserId::try_new("   ").unwrap_err(), IdError::Empty);
    assert_eq!(
        BlockLabel::try_new("bad\u{0007}label").unwrap_err(),
        IdError::ContainsControl
    );
    assert_eq!(
        BlockLabel::try_new("x".repeat(257)).unwrap_err(),
        IdError::TooLong
    );
    assert!(UserId::try_new("student 42/a").is_ok());
    assert!(BlockLabel::try_new("progress").is_ok());
}

#[test]
fn agent_id_rejects_whitespace() {
    assert_eq!(
        AgentId::try_new("idle agent").unwrap_err(),
        IdError::ContainsWhitespace
    );
    assert!(AgentId::try_new("summarizer-1").is_ok());
}

#[test]
fn author_string_form() {
    assert_eq!(Author::User.to_string(), "user");
    assert_eq!(Author::agent("tutor").to_string(), "agent:tutor");
    assert_eq!(Author::parse("user"), Some(Author::User));
    assert_eq!(
        Author::parse("agent:a:b"),
        Some(Author::Agent("a:b".to_string()))
    );
    assert_eq!(Author::parse("agent:"), None);
    assert_eq!(Author::parse("robot"), None);
}

#[test]
fn confidence_parse_is_case_insensitive() {
    assert_eq!(Confidence::parse(" HIGH "), Some(Confidence::High));
    assert_eq!(Confidence::parse("medium"), Some(Confidence::Medium));
    assert_eq!(Confidence::parse("certain"), None);
    assert_eq!(Confidence::Low.as_str(), "low");
}

#[test]
fn proposal_branch_names_are_reversible() {
    let name = proposal_branch_name("user/1 x", "notes%draft");
    assert_eq!(name, "proposal/user%2F1%20x/notes%25draft");
    assert_eq!(
        parse_proposal_branch(&name),
        Some(("user/1 x".to_string(), "notes%draft".to_string()))
    );
    assert!(name.starts_with(&proposal_branch_prefix("user/1 x")));
    assert!(!proposal_branch_name("ab", "c").starts_with(&proposal_branch_prefix("a")));
}

#[test]
fn proposal_branch_parse_rejects_foreign_names() {
    assert_eq!(parse_proposal_branch("main"), None);
    assert_eq!(parse_proposal_branch("proposal/u"), None);
    assert_eq!(parse_proposal_branch("proposal/u/a/b"), None);
    assert_eq!(parse_proposal_branch("proposal/u/%zz"), None);
}

#[test]
fn longest_valid_ids_fit_the_branch_name_bound() {
    let user = "/".repeat(MAX_KEY_PART_LEN);
    let label = "\u{3000}".repeat(MAX_KEY_PART_LEN / 3) + "%";
    assert!(UserId::try_new(user.as_str()).is_ok());
    assert!(BlockLabel::try_new(label.as_str()).is_ok());

    let name = proposal_branch_name(&user, &label);
    assert_eq!(name.len(), MAX_PROPOSAL_BRANCH_LEN);
    assert_eq!(parse_proposal_branch(&name), Some((user, label)));
}

#[test]
fn escape_handles_multibyte_whitespace() {
    let escaped = escape_segment("a\u{3000}b");
    assert_eq!(escaped, "a%E3%80%80b");
    assert_eq!(unescape_segment(&escaped).as_deref(), Some("a\u{3000}b"));
}

#[test]
fn structured_messages_are_recoverable() {
    let meta = ProposalMeta {
        agent_id: "tutor".to_string(),
        reasoning: "mentioned robotics club".to_string(),
        confidence: Confidence::Medium,
        label: "student".to_string(),
        user_id: "u1".to_string(),
    };
    let raw = CommitMessage::proposal(meta.clone()).encode().unwrap();
    assert!(raw.contains("\"kind\":\"proposal\""));
    assert!(raw.contains("\"confidence\":\"medium\""));

    let parsed = CommitMessage::parse(&raw);
    assert_eq!(parsed.proposal_meta(), Some(&meta));

    let approved = CommitMessage::approved(meta.clone()).encode().unwrap();
    assert_eq!(
        CommitMessage::parse(&approved).into_proposal_meta(),
        Some(meta)
    );
}

#[test]
fn unrecognised_messages_stay_text() {
    assert_eq!(
        CommitMessage::parse("fixed a typo"),
        CommitMessage::Text("fixed a typo".to_string())
    );
    assert_eq!(
        CommitMessage::parse("{\"kind\":\"other\"}"),
        CommitMessage::Text("{\"kind\":\"other\"}".to_string())
    );
    assert_eq!(CommitMessage::parse("fixed a typo").proposal_meta(), None);
}

#[test]
fn block_row_upsert_retains_omitted_fields() {
    let previous = BlockRow {
        title: Some("Student".to_string()),
        body: "old".to_string(),
        schema_ref: Some("schema:profile".to_string()),
        updated_at_ms: 1,
    };
    let next = BlockRow::upsert(Some(&previous), "new".to_string(), None, None, 2);
    assert_eq!(next.title.as_deref(), Some("Student"));
    assert_eq!(next.schema_ref.as_deref(), Some("schema:profile"));
    assert_eq!(next.body, "new");

    let retitled = BlockRow::upsert(
        Some(&previous),
        String::new(),
        Some("Profile".to_string()),
        None,
        3,
    );
    assert_eq!(retitled.title.as_deref(), Some("Profile"));
    assert_eq!(retitled.body, "");

    let encoded = retitled.encode().unwrap();
    assert_eq!(BlockRow::decode(&encoded).unwrap(), retitled);
}
