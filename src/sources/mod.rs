//! Download source resolution.
//!
//! Maps an application key to the URL template its unpatched APK is fetched
//! from. Resolution follows two tiers:
//!
//! 1. **Environment variable**: `APKPATCH_<APP>_URL` overrides everything
//! 2. **Built-in table**: the mirror table in [`table`]
//!
//! Templates come in three shapes (see [`SourceTemplate`]): a bare URL, a
//! single-slot pattern filled with the package name, or a slot pattern with a
//! version query.
//!
//! # Usage
//!
//! ```rust
//! use apkpatch::sources::{Mirror, MirrorTable, SourceRegistry, SourceTemplate};
//!
//! let url = MirrorTable.resolve("youtube").unwrap();
//! assert_eq!(Mirror::from_url(&url), Mirror::ApkMirror);
//!
//! let pure = SourceTemplate::parse(&MirrorTable.resolve("hex-editor").unwrap());
//! assert_eq!(
//!     pure.render("com.myprog.hexedit", None),
//!     "https://d.apkpure.com/b/APK/com.myprog.hexedit?version=latest"
//! );
//! ```

pub mod table;

use std::env;

use crate::error::{PatchError, Result};

pub use table::{
    APK_MIRROR_BASE_URL, APK_PURE_BASE_URL, APK_SOS_BASE_URL, GITHUB_BASE_URL,
};

/// Looks up the download URL template for an app.
pub trait SourceRegistry {
    fn resolve(&self, app_key: &str) -> Option<String>;

    /// Like [`resolve`](Self::resolve), failing on unknown apps.
    fn require(&self, app_key: &str) -> Result<String> {
        self.resolve(app_key)
            .ok_or_else(|| PatchError::UnknownSource(app_key.to_string()))
    }
}

/// The built-in mirror table.
#[derive(Debug, Default, Clone, Copy)]
pub struct MirrorTable;

impl SourceRegistry for MirrorTable {
    fn resolve(&self, app_key: &str) -> Option<String> {
        table::lookup(app_key).map(|entry| entry.url())
    }
}

/// Name of the environment variable that overrides the source for `app_key`.
pub fn override_var(app_key: &str) -> String {
    format!(
        "APKPATCH_{}_URL",
        app_key.to_ascii_uppercase().replace('-', "_")
    )
}

/// Registry that consults the environment before falling back to `inner`.
#[derive(Debug, Clone)]
pub struct EnvOverride<R> {
    inner: R,
}

impl<R: SourceRegistry> EnvOverride<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }

    /// Resolve through an explicit variable lookup.
    pub fn resolve_with(
        &self,
        app_key: &str,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Option<String> {
        // Tier 1: Environment variable
        if let Some(url) = lookup(&override_var(app_key)).filter(|u| !u.trim().is_empty()) {
            tracing::debug!(app = app_key, url = %url, "source overridden by environment");
            return Some(url);
        }

        // Tier 2: Wrapped registry
        self.inner.resolve(app_key)
    }
}

impl<R: SourceRegistry> SourceRegistry for EnvOverride<R> {
    fn resolve(&self, app_key: &str) -> Option<String> {
        self.resolve_with(app_key, |key| env::var(key).ok())
    }
}

/// Default registry: environment overrides on top of the mirror table.
pub fn default_registry() -> EnvOverride<MirrorTable> {
    EnvOverride::new(MirrorTable)
}

/// Shape of a resolved URL template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceTemplate {
    /// Usable as is.
    Direct(String),
    /// Contains one `{}` slot for the package name.
    Slot(String),
    /// Slot pattern ending in a `?version=` query.
    Versioned(String),
}

impl SourceTemplate {
    pub fn parse(template: &str) -> Self {
        if !template.contains("{}") {
            SourceTemplate::Direct(template.to_string())
        } else if template.contains("?version=") {
            SourceTemplate::Versioned(template.to_string())
        } else {
            SourceTemplate::Slot(template.to_string())
        }
    }

    /// Fill in the template for `package`, optionally pinning a version.
    pub fn render(&self, package: &str, version: Option<&str>) -> String {
        match self {
            SourceTemplate::Direct(url) => url.clone(),
            SourceTemplate::Slot(pattern) => pattern.replacen("{}", package, 1),
            SourceTemplate::Versioned(pattern) => {
                let url = pattern.replacen("{}", package, 1);
                match (version, url.split_once("?version=")) {
                    (Some(v), Some((base, _))) => format!("{}?version={}", base, v),
                    _ => url,
                }
            }
        }
    }
}

/// Third-party site a URL points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mirror {
    ApkMirror,
    Uptodown,
    ApkPure,
    ApkSos,
    GitHub,
    Other,
}

impl Mirror {
    pub fn from_url(url: &str) -> Self {
        if url.starts_with(APK_MIRROR_BASE_URL) {
            Mirror::ApkMirror
        } else if url.starts_with(APK_PURE_BASE_URL) {
            Mirror::ApkPure
        } else if url.starts_with(APK_SOS_BASE_URL) {
            Mirror::ApkSos
        } else if url.starts_with(GITHUB_BASE_URL) {
            Mirror::GitHub
        } else if url.contains(".en.uptodown.com/android") {
            Mirror::Uptodown
        } else {
            Mirror::Other
        }
    }

    /// Host name, used for reachability checks.
    pub fn host(self) -> Option<&'static str> {
        match self {
            Mirror::ApkMirror => Some("www.apkmirror.com"),
            Mirror::Uptodown => Some("en.uptodown.com"),
            Mirror::ApkPure => Some("d.apkpure.com"),
            Mirror::ApkSos => Some("apksos.com"),
            Mirror::GitHub => Some("github.com"),
            Mirror::Other => None,
        }
    }
}
