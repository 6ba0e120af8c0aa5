//! Working directory validation.
//!
//! The engine reads its jars, keystore and options from the working directory.
//! Nothing here creates them; missing files are reported.

use super::CheckResult;
use crate::app::ApplicationManifest;
use crate::config::PatcherConfig;

/// Check that every file the engine reads exists under `config.work_dir`.
///
/// Without a manifest only the options file is checked.
pub fn check_workspace_files(
    config: &PatcherConfig,
    manifest: Option<&ApplicationManifest>,
) -> Vec<CheckResult> {
    let mut required: Vec<(&str, &str)> = vec![("Options file", config.options_file.as_str())];

    if let Some(m) = manifest {
        required.extend([
            ("Engine jar", m.resources.cli.as_str()),
            ("Patch bundle", m.resources.patches.as_str()),
            ("Integrations", m.resources.integrations.as_str()),
            ("Keystore", m.keystore.as_str()),
            ("Input APK", m.package_file.as_str()),
        ]);
    }

    required
        .into_iter()
        .map(|(name, file)| {
            let path = config.work_dir.join(file);
            if path.is_file() {
                CheckResult::pass(name, format!("Found at {}", path.display()))
            } else {
                CheckResult::fail(
                    name,
                    format!("Missing: {}", path.display()),
                    format!("Place {} in {}", file, config.work_dir.display()),
                )
            }
        })
        .collect()
}
