use super::*;
use serial_test::serial;

#[test]
#[serial]
fn log_filter_defaults_to_info() {
    std::env::remove_var("VIBECHECK_LOG");
    std::env::remove_var("RUST_LOG");
    assert_eq!(log_filter(), "info");
}

#[test]
#[serial]
fn log_filter_prefers_vibecheck_log_over_rust_log() {
    std::env::set_var("RUST_LOG", "warn");
    std::env::set_var("VIBECHECK_LOG", "debug");
    assert_eq!(log_filter(), "debug");
    std::env::remove_var("RUST_LOG");
    std::env::remove_var("VIBECHECK_LOG");
}

#[test]
#[serial]
fn ping_interval_override_is_honored() {
    std::env::set_var("VIBECHECK_PING_INTERVAL_MS", "1234");
    assert_eq!(ping_interval(), Duration::from_millis(1234));
    std::env::remove_var("VIBECHECK_PING_INTERVAL_MS");
}

#[test]
#[serial]
fn ping_interval_defaults_when_unset() {
    std::env::remove_var("VIBECHECK_PING_INTERVAL_MS");
    assert_eq!(ping_interval(), PING_INTERVAL);
}
