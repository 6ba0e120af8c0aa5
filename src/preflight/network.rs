//! Network connectivity check.
//!
//! Verifies that the app's mirror answers before a download is attempted.

use super::CheckResult;
use crate::sources::Mirror;

/// curl exit code for an HTTP response of 400 or above under `--fail`.
const CURL_HTTP_ERROR: i32 = 22;

/// Check that the host behind `url` is reachable.
///
/// Performs a HEAD request through curl. An HTTP error status fails the check.
pub async fn check_network(url: &str) -> CheckResult {
    let host = mirror_host(url);
    let result = tokio::process::Command::new("curl")
        .args(curl_args(url))
        .output()
        .await;

    match result {
        Ok(output) if output.status.success() => {
            CheckResult::pass("Network", format!("Mirror reachable ({})", host))
        }
        Ok(output) => failed_check(&host, output.status.code()),
        Err(e) => CheckResult::fail(
            "Network",
            format!("Failed to check network: {}", e),
            "Ensure curl is installed and you have network access",
        ),
    }
}

fn curl_args(url: &str) -> [&str; 9] {
    [
        "--head",           // HEAD request only
        "--silent",         // No progress output
        "--fail",           // Fail on HTTP errors
        "--location",       // Mirrors redirect to CDN hosts
        "--max-time", "10", // 10 second timeout
        "--output", "/dev/null",
        url,
    ]
}

/// Failed check for a curl exit `code`.
fn failed_check(host: &str, code: Option<i32>) -> CheckResult {
    if code == Some(CURL_HTTP_ERROR) {
        CheckResult::fail(
            "Network",
            format!("Mirror answered with an HTTP error ({})", host),
            "Check the source URL or its APKPATCH_<APP>_URL override",
        )
    } else {
        CheckResult::fail(
            "Network",
            format!("Mirror unreachable ({})", host),
            "Check your internet connection or override the source URL",
        )
    }
}

/// Host name of the mirror behind `url`, for display.
fn mirror_host(url: &str) -> String {
    if let Some(host) = Mirror::from_url(url).host() {
        return host.to_string();
    }
    url.split("://")
        .nth(1)
        .and_then(|rest| rest.split('/').next())
        .unwrap_or(url)
        .to_string()
}
