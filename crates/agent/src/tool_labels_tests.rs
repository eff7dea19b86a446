use super::*;

#[test]
fn known_tool_has_distinct_start_and_end_labels() {
    let start = label_for("Read", ToolStatusKind::Start);
    let end = label_for("Read", ToolStatusKind::End);
    assert_ne!(start, end);
    assert!(start.contains("📖"));
}

#[test]
fn unknown_tool_falls_back_to_generic_label() {
    let start = label_for("MysteryTool", ToolStatusKind::Start);
    assert!(start.starts_with("🔧"));
    assert!(start.contains("MysteryTool"));
}

#[test]
fn every_fixed_tool_produces_a_nonempty_label() {
    for tool in ["Read", "Write", "Edit", "Bash", "Glob", "Grep", "WebFetch", "WebSearch", "TodoWrite", "NotebookEdit"] {
        assert!(!label_for(tool, ToolStatusKind::Start).is_empty());
        assert!(!label_for(tool, ToolStatusKind::End).is_empty());
    }
}
