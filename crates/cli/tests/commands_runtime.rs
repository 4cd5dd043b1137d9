use std::env;
use std::sync::{Mutex, OnceLock};

use mailduet_cli::commands::{config, doctor, migrate};
use serde_json::Value;

#[test]
fn migrate_returns_success_with_valid_env() {
    with_env(
        &[
            ("MAILDUET_MAIL_API_KEY", "ir-test-key"),
            ("MAILDUET_DATABASE_URL", "sqlite::memory:"),
        ],
        || {
            let result = migrate::run();
            assert_eq!(result.exit_code, 0, "expected successful migrate run");

            let payload = parse_payload(&result.output);
            assert_eq!(payload["command"], "migrate");
            assert_eq!(payload["status"], "ok");
        },
    );
}

#[test]
fn migrate_returns_config_failure_without_mail_credentials() {
    with_env(&[], || {
        let result = migrate::run();
        assert_eq!(result.exit_code, 2, "expected config validation failure code");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "migrate");
        assert_eq!(payload["status"], "error");
        assert_eq!(payload["error_class"], "config_validation");
    });
}

#[test]
fn doctor_reports_all_checks_in_json_mode() {
    with_env(
        &[
            ("MAILDUET_MAIL_API_KEY", "ir-test-key"),
            ("MAILDUET_DATABASE_URL", "sqlite::memory:"),
        ],
        || {
            let output = doctor::run(true);
            let payload: Value = serde_json::from_str(&output).expect("doctor json output");

            assert_eq!(payload["overall_status"], "pass");
            let checks = payload["checks"].as_array().expect("checks array");
            let names: Vec<&str> =
                checks.iter().filter_map(|check| check["name"].as_str()).collect();
            assert!(names.contains(&"config_validation"));
            assert!(names.contains(&"mail_provider_readiness"));
            assert!(names.contains(&"database_connectivity"));
        },
    );
}

#[test]
fn doctor_fails_and_skips_downstream_checks_on_bad_config() {
    with_env(&[("MAILDUET_DATABASE_URL", "postgres://not-sqlite")], || {
        let output = doctor::run(true);
        let payload: Value = serde_json::from_str(&output).expect("doctor json output");

        assert_eq!(payload["overall_status"], "fail");
        let checks = payload["checks"].as_array().expect("checks array");
        assert_eq!(checks[0]["name"], "config_validation");
        assert_eq!(checks[0]["status"], "fail");
        assert!(checks[1..].iter().all(|check| check["status"] == "skipped"));
    });
}

#[test]
fn config_output_redacts_secrets() {
    with_env(
        &[
            ("MAILDUET_MAIL_API_KEY", "ir-super-secret-key"),
            ("MAILDUET_DATABASE_URL", "sqlite::memory:"),
        ],
        || {
            let output = config::run();
            assert!(output.contains("mail.api_key"));
            assert!(!output.contains("ir-super-secret-key"));
            assert!(output.contains("demo.max_exchanges = 6"));
        },
    );
}

fn parse_payload(output: &str) -> Value {
    serde_json::from_str(output).expect("command output should be JSON")
}

static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

const MANAGED_VARS: &[&str] = &[
    "MAILDUET_MAIL_API_KEY",
    "MAILDUET_DATABASE_URL",
];

fn with_env(vars: &[(&str, &str)], test: impl FnOnce()) {
    let _guard = ENV_LOCK.get_or_init(|| Mutex::new(())).lock().expect("env lock");

    for var in MANAGED_VARS {
        env::remove_var(var);
    }
    for (key, value) in vars {
        env::set_var(key, value);
    }

    test();

    for var in MANAGED_VARS {
        env::remove_var(var);
    }
}
