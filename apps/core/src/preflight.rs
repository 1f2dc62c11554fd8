//! Preflight Check System
//!
//! Verifies the environment the pipeline depends on before any analysis is
//! attempted: the analyze endpoint must be up and the OCR binary is nice to
//! have. No assumptions - everything is probed.

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{info, warn};

use crate::config::CoreConfig;

// --- Constants ---
const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Result of a single check
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckResult {
    pub name: String,
    pub passed: bool,
    pub message: String,
    pub details: Option<String>,
}

impl CheckResult {
    fn pass(name: &str, message: &str) -> Self {
        Self {
            name: name.to_string(),
            passed: true,
            message: message.to_string(),
            details: None,
        }
    }

    fn fail(name: &str, message: &str, details: Option<String>) -> Self {
        Self {
            name: name.to_string(),
            passed: false,
            message: message.to_string(),
            details,
        }
    }
}

/// Complete preflight check report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreflightReport {
    pub all_passed: bool,
    /// Analyses can run: the analyze endpoint answered as expected.
    pub ready: bool,
    /// Screenshot input is available; typed input works without it.
    pub ocr_available: bool,
    pub checks: Vec<CheckResult>,
    pub summary: String,
}

/// Performs all preflight checks and returns a comprehensive report
pub async fn run_preflight_checks(config: &CoreConfig) -> PreflightReport {
    info!("--- Running preflight checks ---");

    let mut checks = Vec::new();

    // 1. Check the configured endpoint shape
    let config_check = check_endpoint_config(config);
    let config_ok = config_check.passed;
    checks.push(config_check);

    // 2. Probe the analyze endpoint (only if the config looks sane)
    let probe_check = if config_ok {
        check_endpoint_reachable(config).await
    } else {
        CheckResult::fail(
            "analyze_endpoint_reachable",
            "Skipped - endpoint misconfigured",
            None,
        )
    };
    let endpoint_ok = probe_check.passed;
    checks.push(probe_check);

    // 3. Check the tesseract binary (non-fatal)
    let ocr_check = check_ocr_binary();
    let ocr_available = ocr_check.passed;
    checks.push(ocr_check);

    let all_passed = checks.iter().all(|c| c.passed);
    let ready = config_ok && endpoint_ok;

    let summary = if all_passed {
        "All checks passed. Ready to analyze.".to_string()
    } else if ready {
        "Ready to analyze typed messages. Screenshot input unavailable.".to_string()
    } else {
        "The analyze endpoint is not reachable. Start the proxy first.".to_string()
    };

    for check in &checks {
        if check.passed {
            info!("  [ok] {}: {}", check.name, check.message);
        } else {
            warn!("  [!!] {}: {}", check.name, check.message);
            if let Some(details) = &check.details {
                warn!("       Details: {}", details);
            }
        }
    }

    info!("Summary: {}", summary);

    PreflightReport {
        all_passed,
        ready,
        ocr_available,
        checks,
        summary,
    }
}

// --- Individual Checks ---

fn check_endpoint_config(config: &CoreConfig) -> CheckResult {
    match config.analyze_url.scheme() {
        "http" | "https" => CheckResult::pass(
            "analyze_endpoint_config",
            &format!("Analyze endpoint: {}", config.analyze_url),
        ),
        other => CheckResult::fail(
            "analyze_endpoint_config",
            "Analyze endpoint must be http or https",
            Some(format!("Got scheme: {}", other)),
        ),
    }
}

/// Probes the analyze route with a deliberately wrong verb. The route is
/// POST-only, so a healthy proxy answers 405; that proves it is up without
/// spending a model call.
async fn check_endpoint_reachable(config: &CoreConfig) -> CheckResult {
    let client = reqwest::Client::new();
    let probe = client
        .get(config.analyze_url.clone())
        .timeout(PROBE_TIMEOUT)
        .send()
        .await;

    match probe {
        Ok(res) if res.status() == StatusCode::METHOD_NOT_ALLOWED => CheckResult::pass(
            "analyze_endpoint_reachable",
            "Analyze endpoint is up (answered 405 to a GET probe)",
        ),
        Ok(res) => CheckResult::fail(
            "analyze_endpoint_reachable",
            "Something answered, but not like the analyze proxy",
            Some(format!("GET probe got status {}", res.status())),
        ),
        Err(e) => CheckResult::fail(
            "analyze_endpoint_reachable",
            "Analyze endpoint is unreachable",
            Some(e.to_string()),
        ),
    }
}

fn check_ocr_binary() -> CheckResult {
    match which::which("tesseract") {
        Ok(path) => CheckResult::pass("ocr_binary", &format!("Found tesseract at {:?}", path)),
        Err(_) => CheckResult::fail(
            "ocr_binary",
            "tesseract not found in PATH; --image input will not work",
            None,
        ),
    }
}
