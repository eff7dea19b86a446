use super::*;

#[tokio::test]
async fn resolve_delivers_outcome_to_receiver() {
    let (mut pending, rx) = PendingApproval::new("Write", serde_json::json!({"file_path": "/x"}), vec![PathBuf::from("/x")]);
    assert!(pending.resolve(ApprovalOutcome::allow()));
    let outcome = rx.await.unwrap();
    assert!(outcome.allow);
}

#[tokio::test]
async fn resolve_twice_is_a_no_op_on_the_second_call() {
    let (mut pending, rx) = PendingApproval::new("Bash", serde_json::json!({"command": "rm -rf /"}), vec![]);
    assert!(pending.resolve(ApprovalOutcome::deny("no")));
    assert!(!pending.resolve(ApprovalOutcome::allow()));
    let outcome = rx.await.unwrap();
    assert!(!outcome.allow);
    assert_eq!(outcome.reason.as_deref(), Some("no"));
}

#[test]
fn is_resolved_reflects_resolver_state() {
    let (mut pending, _rx) = PendingApproval::new("Read", serde_json::json!({}), vec![]);
    assert!(!pending.is_resolved());
    pending.resolve(ApprovalOutcome::allow());
    assert!(pending.is_resolved());
}
