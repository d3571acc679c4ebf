//! The "hiya" self-test.
//!
//! Lifts (11, 22) and calls `foo()`, both directly and through a freshly
//! bootstrapped namespace, and reports a single named pass/fail result.
//! A failing check produces `passed: false`; nothing panics.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::bootstrap::Bootstrap;
use crate::config::HelloConfig;
use crate::functions::foo;
use crate::point::{dummy_2_to_3, Point2, Point3};
use crate::value::Value;

/// Name the report is filed under.
pub const TEST_NAME: &str = "hiya";

/// Reference input for the lift check.
pub const INPUT: Point2<f64> = Point2 { x: 11.0, y: 22.0 };

/// Expected lift of [`INPUT`].
pub const EXPECTED: Point3<f64> = Point3 {
    x: 11.0,
    y: 22.0,
    z: 1.0,
};

/// Outcome of one check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Check {
    pub name: String,
    pub passed: bool,
}

/// Result of a self-test run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestReport {
    pub name: String,
    pub passed: bool,
    pub checks: Vec<Check>,
    pub ran_at: DateTime<Utc>,
}

impl TestReport {
    /// Compact `{"hiya": true}` form.
    pub fn summary(&self) -> serde_json::Value {
        let mut map = serde_json::Map::new();
        map.insert(self.name.clone(), serde_json::Value::Bool(self.passed));
        serde_json::Value::Object(map)
    }

    pub fn failed_checks(&self) -> impl Iterator<Item = &Check> {
        self.checks.iter().filter(|c| !c.passed)
    }
}

/// Run the self-test against the default namespace layout, stamped with
/// the current time.
pub fn run() -> TestReport {
    run_with(&HelloConfig::default())
}

/// Run the self-test against the namespace `config` describes.
pub fn run_with(config: &HelloConfig) -> TestReport {
    run_with_at(config, Utc::now())
}

/// Run the self-test with an explicit timestamp, for reproducible reports.
pub fn run_at(ran_at: DateTime<Utc>) -> TestReport {
    run_with_at(&HelloConfig::default(), ran_at)
}

pub fn run_with_at(config: &HelloConfig, ran_at: DateTime<Utc>) -> TestReport {
    let checks = vec![
        check("lift", dummy_2_to_3(INPUT) == EXPECTED),
        check("foo", foo() == 1),
        check("namespace", namespace_checks(config)),
    ];
    let passed = checks.iter().all(|c| c.passed);
    if !passed {
        tracing::warn!(test = TEST_NAME, "Self-test failed");
    }
    TestReport {
        name: TEST_NAME.to_string(),
        passed,
        checks,
        ran_at,
    }
}

fn check(name: &str, passed: bool) -> Check {
    Check {
        name: name.to_string(),
        passed,
    }
}

fn namespace_checks(config: &HelloConfig) -> bool {
    let bootstrap = Bootstrap::new(config.clone());
    let namespace = match bootstrap.namespace() {
        Ok(ns) => ns,
        Err(e) => {
            tracing::warn!(error = %e, "Self-test could not build namespace");
            return false;
        }
    };
    let hello = &bootstrap.config().submodule;
    let foo_ok = namespace.call(&format!("{}.foo", hello), &[]) == Ok(Value::Int(1));
    let lift_ok = namespace.call(&format!("{}.dummy_2_to_3", hello), &[INPUT.into()])
        == Ok(Value::Point3(EXPECTED));
    foo_ok && lift_ok
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_hiya_passes() {
        let report = run();
        assert!(report.passed);
        assert_eq!(report.name, "hiya");
        assert_eq!(report.checks.len(), 3);
        assert_eq!(report.failed_checks().count(), 0);
    }

    #[test]
    fn test_summary_shape() {
        let report = run();
        assert_eq!(report.summary().to_string(), r#"{"hiya":true}"#);
    }

    #[test]
    fn test_run_at_is_deterministic() {
        let at = Utc.with_ymd_and_hms(2019, 6, 1, 12, 0, 0).unwrap();
        let a = serde_json::to_string(&run_at(at)).unwrap();
        let b = serde_json::to_string(&run_at(at)).unwrap();
        assert_eq!(a, b);
        assert!(a.contains("2019-06-01T12:00:00Z"));
    }

    #[test]
    fn test_run_with_custom_layout() {
        let config = HelloConfig {
            module: "core3d".to_string(),
            submodule: "proj".to_string(),
            ..Default::default()
        };
        let report = run_with(&config);
        assert!(report.passed);
        assert_eq!(report.failed_checks().count(), 0);
    }

    #[test]
    fn test_run_with_overwrite_policy() {
        let config = HelloConfig {
            duplicate_policy: crate::DuplicatePolicy::Overwrite,
            ..Default::default()
        };
        assert!(run_with(&config).passed);
    }

    #[test]
    fn test_failed_report_summary() {
        let report = TestReport {
            name: TEST_NAME.to_string(),
            passed: false,
            checks: vec![check("lift", false)],
            ran_at: Utc::now(),
        };
        assert_eq!(report.summary()["hiya"], serde_json::Value::Bool(false));
        assert_eq!(report.failed_checks().next().map(|c| c.name.as_str()), Some("lift"));
    }
}
