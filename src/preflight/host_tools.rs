//! Host tool validation.
//!
//! Checks that the runtime used to launch the engine jar is installed.

use super::CheckResult;

/// Check that the engine runtime is installed.
pub fn check_host_tools(java: &str) -> Vec<CheckResult> {
    vec![check_tool(
        java,
        "Run the patch engine jar",
        "Install a JDK 17+ or set APKPATCH_JAVA",
    )]
}

fn check_tool(tool: &str, purpose: &str, install_hint: &str) -> CheckResult {
    match which::which(tool) {
        Ok(path) => CheckResult::pass(
            format!("{} tool", tool),
            format!("Found at {} ({})", path.display(), purpose),
        ),
        Err(_) => CheckResult::fail(
            format!("{} tool", tool),
            format!("Not found (needed for: {})", purpose),
            install_hint,
        ),
    }
}

/// Check if a specific tool is available (returns bool for quick checks).
pub fn has_tool(tool: &str) -> bool {
    which::which(tool).is_ok()
}
