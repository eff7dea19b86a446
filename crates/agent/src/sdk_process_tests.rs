use super::*;
use serde_json::json;

#[test]
fn translate_event_parses_text_delta() {
    let value = json!({
        "type": "stream_event",
        "event": { "delta": { "text": "hel" } }
    });
    let event = translate_event(&value).unwrap();
    assert!(matches!(event, SdkEvent::TextDelta { text } if text == "hel"));
}

#[test]
fn translate_event_parses_tool_use_start() {
    let value = json!({
        "type": "assistant",
        "message": { "content": [ { "type": "tool_use", "id": "t1", "name": "Read", "input": {"file_path": "/x"} } ] }
    });
    let event = translate_event(&value).unwrap();
    match event {
        SdkEvent::ToolUseStart { id, name, .. } => {
            assert_eq!(id, "t1");
            assert_eq!(name, "Read");
        }
        _ => panic!("wrong variant"),
    }
}

#[test]
fn translate_event_parses_tool_result() {
    let value = json!({
        "type": "user",
        "message": { "content": [ { "type": "tool_result", "tool_use_id": "t1" } ] }
    });
    let event = translate_event(&value).unwrap();
    assert!(matches!(event, SdkEvent::ToolResult { tool_use_id } if tool_use_id == "t1"));
}

#[test]
fn translate_event_parses_success_result() {
    let value = json!({
        "type": "result",
        "subtype": "success",
        "result": "done",
        "session_id": "s1",
        "total_cost_usd": 0.02,
        "num_turns": 3,
        "usage": { "input_tokens": 10, "output_tokens": 5, "cache_read_input_tokens": 0, "cache_creation_input_tokens": 0 }
    });
    let event = translate_event(&value).unwrap();
    match event {
        SdkEvent::Result(SdkTurnResult::Success { text, session_id, cost_usd, num_turns, usage }) => {
            assert_eq!(text, "done");
            assert_eq!(session_id.as_deref(), Some("s1"));
            assert_eq!(cost_usd, Some(0.02));
            assert_eq!(num_turns, Some(3));
            assert_eq!(usage.unwrap().input_tokens, 10);
        }
        _ => panic!("wrong variant"),
    }
}

#[test]
fn translate_event_parses_error_result() {
    let value = json!({
        "type": "result",
        "subtype": "error_during_execution",
        "errors": ["session not found"],
    });
    let event = translate_event(&value).unwrap();
    match event {
        SdkEvent::Result(SdkTurnResult::Error { messages, .. }) => {
            assert_eq!(messages, vec!["session not found".to_string()]);
        }
        _ => panic!("wrong variant"),
    }
}

#[test]
fn parse_control_request_extracts_can_use_tool() {
    let value = json!({
        "type": "control_request",
        "subtype": "can_use_tool",
        "request_id": "r1",
        "tool_name": "Bash",
        "input": { "command": "ls" },
    });
    let (id, tool, input) = parse_control_request(&value).unwrap();
    assert_eq!(id, "r1");
    assert_eq!(tool, "Bash");
    assert_eq!(input["command"], "ls");
}

#[test]
fn parse_control_request_ignores_other_subtypes() {
    let value = json!({ "type": "control_request", "subtype": "something_else" });
    assert!(parse_control_request(&value).is_none());
}
