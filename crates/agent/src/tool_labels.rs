//! Fixed human-readable labels for `tool_status` messages.

use vibecheck_wire::ToolStatusKind;

/// Look up the label for `(tool, status)`. Unknown tools fall back to a
/// generic wrench-emoji label naming the tool.
pub fn label_for(tool: &str, status: ToolStatusKind) -> String {
    let table: &[(&str, &str, &str)] = &[
        ("Read", "📖 파일 읽는 중...", "📖 파일 읽기 완료"),
        ("Write", "✏️ 파일 작성 중...", "✏️ 파일 작성 완료"),
        ("Edit", "✏️ 파일 수정 중...", "✏️ 파일 수정 완료"),
        ("Bash", "💻 명령 실행 중...", "💻 명령 실행 완료"),
        ("Glob", "🔍 파일 검색 중...", "🔍 파일 검색 완료"),
        ("Grep", "🔍 내용 검색 중...", "🔍 내용 검색 완료"),
        ("WebFetch", "🌐 웹페이지 가져오는 중...", "🌐 웹페이지 가져오기 완료"),
        ("WebSearch", "🔎 웹 검색 중...", "🔎 웹 검색 완료"),
        ("TodoWrite", "📝 할 일 목록 갱신 중...", "📝 할 일 목록 갱신 완료"),
        ("NotebookEdit", "📓 노트북 수정 중...", "📓 노트북 수정 완료"),
    ];

    for (name, start, end) in table {
        if *name == tool {
            return match status {
                ToolStatusKind::Start => start.to_string(),
                ToolStatusKind::End => end.to_string(),
            };
        }
    }

    match status {
        ToolStatusKind::Start => format!("🔧 {tool} 실행 중..."),
        ToolStatusKind::End => format!("🔧 {tool} 완료"),
    }
}

#[cfg(test)]
#[path = "tool_labels_tests.rs"]
mod tests;
