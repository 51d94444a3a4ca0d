use crate::config::{parse_port, ConfigError, HostConfig};
use rstest::rstest;
use serial_test::serial;
use std::env;

const HOST_VARS: [&str; 7] = [
    "PORT",
    "HOST",
    "CORS_ORIGIN",
    "DATABASE_URL",
    "KV_ENABLED",
    "CF_ACCOUNT_ID",
    "CF_API_TOKEN",
];

fn clear_host_vars() {
    for name in HOST_VARS {
        env::remove_var(name);
    }
}

#[test]
#[serial]
fn test_config_from_env_defaults() {
    clear_host_vars();

    let config = HostConfig::from_env().unwrap();

    assert_eq!(config.port, 8787);
    assert_eq!(config.host.to_string(), "127.0.0.1");
    assert_eq!(config.cors_origin, "*");
    assert!(config.database_url.is_none());
    assert!(config.kv_enabled);
    assert!(config.cf_account_id.is_none());
    assert!(config.cf_api_token.is_none());
    assert_eq!(config.socket_addr().to_string(), "127.0.0.1:8787");
}

#[test]
#[serial]
fn test_config_from_env_with_all_custom() {
    clear_host_vars();
    env::set_var("PORT", "3000");
    env::set_var("HOST", "0.0.0.0");
    env::set_var("CORS_ORIGIN", "https://app.example.com");
    env::set_var("DATABASE_URL", "sqlite::memory:");
    env::set_var("KV_ENABLED", "false");
    env::set_var("CF_ACCOUNT_ID", "acct");
    env::set_var("CF_API_TOKEN", "cf-token");

    let config = HostConfig::from_env().unwrap();

    assert_eq!(config.port, 3000);
    assert_eq!(config.host.to_string(), "0.0.0.0");
    assert_eq!(config.cors_origin, "https://app.example.com");
    assert_eq!(config.database_url.as_deref(), Some("sqlite::memory:"));
    assert!(!config.kv_enabled);
    assert_eq!(config.cf_account_id.as_deref(), Some("acct"));
    assert_eq!(config.cf_api_token.as_ref().map(|t| t.expose()), Some("cf-token"));

    clear_host_vars();
}

#[test]
#[serial]
fn test_config_debug_hides_token() {
    clear_host_vars();
    env::set_var("CF_API_TOKEN", "cf-token-value");

    let config = HostConfig::from_env().unwrap();
    assert!(!format!("{:?}", config).contains("cf-token-value"));

    clear_host_vars();
}

#[test]
#[serial]
fn test_config_blank_optional_values_are_unset() {
    clear_host_vars();
    env::set_var("DATABASE_URL", "   ");
    env::set_var("CF_ACCOUNT_ID", "");

    let config = HostConfig::from_env().unwrap();
    assert!(config.database_url.is_none());
    assert!(config.cf_account_id.is_none());

    clear_host_vars();
}

#[test]
#[serial]
fn test_config_unparseable_kv_flag_defaults_to_enabled() {
    clear_host_vars();
    env::set_var("KV_ENABLED", "maybe");

    assert!(HostConfig::from_env().unwrap().kv_enabled);

    clear_host_vars();
}

#[test]
#[serial]
fn test_config_invalid_port() {
    clear_host_vars();
    env::set_var("PORT", "not-a-number");

    let result = HostConfig::from_env();

    assert!(result.is_err());
    assert!(matches!(result.unwrap_err(), ConfigError::InvalidPort(_)));

    clear_host_vars();
}

#[test]
#[serial]
fn test_config_port_zero() {
    clear_host_vars();
    env::set_var("PORT", "0");

    let result = HostConfig::from_env();

    assert!(result.is_err());
    assert!(matches!(result.unwrap_err(), ConfigError::PortOutOfRange(0)));

    clear_host_vars();
}

#[test]
#[serial]
fn test_config_invalid_host() {
    clear_host_vars();
    env::set_var("HOST", "not-an-ip");

    assert!(matches!(
        HostConfig::from_env().unwrap_err(),
        ConfigError::InvalidHost(_)
    ));

    clear_host_vars();
}

#[rstest]
#[case("1", true)]
#[case("80", true)]
#[case("8787", true)]
#[case("65535", true)]
#[case("0", false)]
#[case("65536", false)]
#[case("-1", false)]
#[case("", false)]
fn test_parse_port_ranges(#[case] value: &str, #[case] valid: bool) {
    assert_eq!(parse_port(value).is_ok(), valid);
}
