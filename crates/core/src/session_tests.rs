use super::*;

#[test]
fn fresh_state_resumes_fresh() {
    let state = SessionState::new();
    assert_eq!(state.resume_policy(), ResumePolicy::Fresh);
}

#[test]
fn started_without_id_continues_most_recent() {
    let mut state = SessionState::new();
    state.mark_started();
    assert_eq!(state.resume_policy(), ResumePolicy::ContinueMostRecent);
}

#[test]
fn id_present_resumes_that_id_even_if_started() {
    let mut state = SessionState::new();
    state.adopt(SessionId::new("abc"));
    assert_eq!(state.resume_policy(), ResumePolicy::Resume(SessionId::new("abc")));
    assert!(state.started());
}

#[test]
fn clear_resets_to_fresh() {
    let mut state = SessionState::new();
    state.adopt(SessionId::new("abc"));
    state.clear();
    assert_eq!(state.resume_policy(), ResumePolicy::Fresh);
    assert!(state.id().is_none());
}

#[test]
fn session_id_equals_str() {
    let id = SessionId::new("xyz");
    assert_eq!(id, *"xyz");
    assert_eq!(id.as_str(), "xyz");
}

#[test]
fn session_id_json_round_trip() {
    let id = SessionId::new("abc-123");
    let json = serde_json::to_string(&id).unwrap();
    let back: SessionId = serde_json::from_str(&json).unwrap();
    assert_eq!(id, back);
}
