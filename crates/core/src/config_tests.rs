use super::*;

#[test]
fn connect_url_appends_key_query_param() {
    let cfg = AgentConfig::new("abc123", PathBuf::from("/work"), "wss://example.test/ws/agent", false);
    assert_eq!(cfg.connect_url(), "wss://example.test/ws/agent?key=abc123");
}

#[test]
fn connect_url_preserves_existing_query_string() {
    let cfg = AgentConfig::new("abc123", PathBuf::from("/work"), "wss://example.test/ws/agent?region=us", false);
    assert_eq!(cfg.connect_url(), "wss://example.test/ws/agent?region=us&key=abc123");
}
