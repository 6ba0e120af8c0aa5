//! Application manifests.
//!
//! A manifest describes one build job: which APK to patch, which engine,
//! patch bundle and integrations to use, and where the result goes.
//!
//! ```json
//! {
//!   "app": "youtube",
//!   "version": "19.16.39",
//!   "package_file": "youtube.apk",
//!   "resources": {
//!     "cli": "revanced-cli.jar",
//!     "patches": "revanced-patches.jar",
//!     "integrations": "revanced-integrations.apk"
//!   },
//!   "output_file": "Re-youtube-output.apk",
//!   "keystore": "revanced.keystore",
//!   "experimental": false,
//!   "archs": ["arm64-v8a"],
//!   "exclude_patches": ["hide-shorts-button"]
//! }
//! ```

use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::config::PatcherConfig;
use crate::error::Result;
use crate::patches::PatchSet;

/// Jars and APKs the engine consumes.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Resources {
    /// Engine CLI jar.
    pub cli: String,
    /// Patch bundle jar.
    pub patches: String,
    /// Integrations APK.
    pub integrations: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ApplicationManifest {
    /// Application key, e.g. `youtube`.
    pub app: String,
    #[serde(default)]
    pub version: Option<String>,
    /// Downloaded input APK.
    pub package_file: String,
    pub resources: Resources,
    /// Name of the patched APK. Derived from the app key when absent.
    #[serde(default)]
    pub output_file: Option<String>,
    pub keystore: String,
    #[serde(default)]
    pub experimental: bool,
    /// Architectures to keep. Empty means all of them.
    #[serde(default)]
    pub archs: Vec<String>,
    /// Strip native libraries for architectures not in `archs`.
    #[serde(default)]
    pub rip_libs: bool,
    #[serde(default)]
    pub include_patches: Vec<String>,
    #[serde(default)]
    pub exclude_patches: Vec<String>,
}

impl ApplicationManifest {
    /// Parse a manifest from JSON text.
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Load a manifest file and apply configuration-wide settings to it.
    pub fn load(path: &Path, config: &PatcherConfig) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        let mut manifest = Self::from_json(&text)?;
        if config.rips_libs(&manifest.app) {
            manifest.rip_libs = true;
        }
        tracing::debug!(app = %manifest.app, path = %path.display(), "loaded manifest");
        Ok(manifest)
    }

    /// Name of the patched APK written by the engine.
    pub fn output_file_name(&self) -> String {
        match &self.output_file {
            Some(name) => name.clone(),
            None => match &self.version {
                Some(version) => format!("Re-{}-{}-output.apk", self.app, version),
                None => format!("Re-{}-output.apk", self.app),
            },
        }
    }

    /// Whether `--rip-lib` flags are emitted for this app.
    pub fn strips_libraries(&self) -> bool {
        self.rip_libs && !self.archs.is_empty()
    }

    /// Initial patch selection declared by the manifest.
    pub fn patch_set(&self) -> PatchSet {
        let mut set = PatchSet::new();
        for name in &self.include_patches {
            set.include(name.as_str());
        }
        for name in &self.exclude_patches {
            set.exclude(name.as_str());
        }
        set
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::patches::PatchToken;
    use tempfile::tempdir;

    pub(crate) fn sample() -> ApplicationManifest {
        ApplicationManifest {
            app: "youtube".into(),
            version: None,
            package_file: "youtube.apk".into(),
            resources: Resources {
                cli: "cli.jar".into(),
                patches: "patches.jar".into(),
                integrations: "integrations.apk".into(),
            },
            output_file: None,
            keystore: "revanced.keystore".into(),
            experimental: false,
            archs: Vec::new(),
            rip_libs: false,
            include_patches: Vec::new(),
            exclude_patches: Vec::new(),
        }
    }

    const MINIMAL: &str = r#"{
        "app": "reddit",
        "package_file": "reddit.apk",
        "resources": { "cli": "cli.jar", "patches": "p.jar", "integrations": "i.apk" },
        "keystore": "ks"
    }"#;

    #[test]
    fn test_minimal_manifest_defaults() {
        let manifest = ApplicationManifest::from_json(MINIMAL).unwrap();
        assert_eq!(manifest.app, "reddit");
        assert!(!manifest.experimental);
        assert!(!manifest.rip_libs);
        assert!(manifest.archs.is_empty());
        assert_eq!(manifest.output_file_name(), "Re-reddit-output.apk");
    }

    #[test]
    fn test_output_name_with_version() {
        let mut manifest = sample();
        manifest.version = Some("19.16.39".into());
        assert_eq!(manifest.output_file_name(), "Re-youtube-19.16.39-output.apk");

        manifest.output_file = Some("custom.apk".into());
        assert_eq!(manifest.output_file_name(), "custom.apk");
    }

    #[test]
    fn test_load_applies_rip_libs_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("reddit.json");
        fs::write(&path, MINIMAL).unwrap();

        let config = PatcherConfig {
            rip_libs_apps: vec!["reddit".into()],
            ..Default::default()
        };
        let manifest = ApplicationManifest::load(&path, &config).unwrap();
        assert!(manifest.rip_libs);
    }

    #[test]
    fn test_load_rejects_bad_json() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, "{ not json").unwrap();

        let err = ApplicationManifest::load(&path, &PatcherConfig::default()).unwrap_err();
        assert!(matches!(err, crate::error::PatchError::Manifest(_)));
    }

    #[test]
    fn test_strips_libraries_requires_targets() {
        let mut manifest = sample();
        manifest.rip_libs = true;
        assert!(!manifest.strips_libraries());

        manifest.archs = vec!["arm64-v8a".into()];
        assert!(manifest.strips_libraries());
    }

    #[test]
    fn test_patch_set_from_manifest() {
        let mut manifest = sample();
        manifest.include_patches = vec!["a".into()];
        manifest.exclude_patches = vec!["b".into()];

        let set = manifest.patch_set();
        assert_eq!(set.tokens(), [PatchToken::include("a"), PatchToken::exclude("b")]);
        assert_eq!(set.excluded_names(), ["b"]);
    }
}
