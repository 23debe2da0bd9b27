use rust_decimal_macros::dec;

use crate::config::{AppConfig, LeaveConfig};

#[test]
fn test_defaults_without_any_source() {
    temp_env::with_vars_unset(
        vec![
            "LEAVEDESK__LEAVE__HR_APPROVAL_THRESHOLD_DAYS",
            "LEAVEDESK__LEAVE__ALLOW_BACKDATED",
            "LEAVEDESK__LOGGING__FILTER",
            "LEAVEDESK__LOGGING__JSON",
        ],
        || {
            let config = AppConfig::load().unwrap();
            assert_eq!(config.leave.hr_approval_threshold_days, dec!(5));
            assert!(!config.leave.allow_backdated);
            assert_eq!(config.logging.filter, "leavedesk=debug");
            assert!(!config.logging.json);
        },
    );
}

#[test]
fn test_environment_overrides() {
    temp_env::with_vars(
        vec![
            ("LEAVEDESK__LEAVE__HR_APPROVAL_THRESHOLD_DAYS", Some("3")),
            ("LEAVEDESK__LEAVE__ALLOW_BACKDATED", Some("true")),
            ("LEAVEDESK__LOGGING__JSON", Some("true")),
        ],
        || {
            let config = AppConfig::load().unwrap();
            assert_eq!(config.leave.hr_approval_threshold_days, dec!(3));
            assert!(config.leave.allow_backdated);
            assert!(config.logging.json);
        },
    );
}

#[test]
fn test_leave_config_deserializes_partial_json() {
    let config: LeaveConfig = serde_json::from_str(r#"{"allow_backdated": true}"#).unwrap();
    assert_eq!(config.hr_approval_threshold_days, dec!(5));
    assert!(config.allow_backdated);
}
