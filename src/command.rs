//! Engine argument assembly.
//!
//! Renders the full argument vector for one patch run:
//!
//! ```text
//! -jar <cli> -a <apk> -b <patches> -m <integrations> -o <output>
//!     --keystore <keystore> --options <options.json>
//!     [--experimental] [-i|-e <patch>]* [--rip-lib <arch>]*
//! ```
//!
//! Every value in the fixed block is joined onto the working directory.

use std::path::PathBuf;

use crate::app::ApplicationManifest;
use crate::arch;
use crate::config::DEFAULT_OPTIONS_FILE;
use crate::patches::{self, PatchSet};

pub const CLI_JAR_ARG: &str = "-jar";
pub const APK_ARG: &str = "-a";
pub const PATCHES_ARG: &str = "-b";
pub const INTEGRATIONS_ARG: &str = "-m";
pub const OUTPUT_ARG: &str = "-o";
pub const KEYSTORE_ARG: &str = "--keystore";
pub const OPTIONS_ARG: &str = "--options";
pub const EXPERIMENTAL_ARG: &str = "--experimental";
pub const RIP_LIB_ARG: &str = "--rip-lib";

/// Builder for engine argument vectors.
#[derive(Debug, Clone)]
pub struct BuildCommand<'a> {
    manifest: &'a ApplicationManifest,
    work_dir: PathBuf,
    options_file: String,
    ci_mode: bool,
}

impl<'a> BuildCommand<'a> {
    pub fn new(manifest: &'a ApplicationManifest, work_dir: impl Into<PathBuf>) -> Self {
        Self {
            manifest,
            work_dir: work_dir.into(),
            options_file: DEFAULT_OPTIONS_FILE.to_string(),
            ci_mode: false,
        }
    }

    /// Send every patch as excluded.
    pub fn ci_mode(mut self, enabled: bool) -> Self {
        self.ci_mode = enabled;
        self
    }

    pub fn options_file(mut self, name: impl Into<String>) -> Self {
        self.options_file = name.into();
        self
    }

    /// The fixed (flag, value) block, values not yet resolved.
    fn required_pairs(&self) -> [(&'static str, String); 7] {
        let m = self.manifest;
        [
            (CLI_JAR_ARG, m.resources.cli.clone()),
            (APK_ARG, m.package_file.clone()),
            (PATCHES_ARG, m.resources.patches.clone()),
            (INTEGRATIONS_ARG, m.resources.integrations.clone()),
            (OUTPUT_ARG, m.output_file_name()),
            (KEYSTORE_ARG, m.keystore.clone()),
            (OPTIONS_ARG, self.options_file.clone()),
        ]
    }

    fn resolve(&self, value: &str) -> String {
        self.work_dir.join(value).to_string_lossy().into_owned()
    }

    /// Render the argument vector. `patches` is not modified.
    pub fn render(&self, patches: &PatchSet) -> Vec<String> {
        let mut args = Vec::new();

        for (flag, value) in self.required_pairs() {
            args.push(flag.to_string());
            args.push(self.resolve(&value));
        }

        if self.manifest.experimental {
            tracing::debug!(app = %self.manifest.app, "using experimental features");
            args.push(EXPERIMENTAL_ARG.to_string());
        }

        let tokens = patches.rendered(self.ci_mode);
        if self.ci_mode {
            tracing::debug!(
                app = %self.manifest.app,
                count = tokens.len(),
                "CI mode: excluding every patch"
            );
        }
        args.extend(patches::to_args(&tokens));

        if self.manifest.strips_libraries() {
            for arch in arch::strip_targets(&self.manifest.archs) {
                args.push(RIP_LIB_ARG.to_string());
                args.push(arch.to_string());
            }
        }

        args
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::tests::sample;

    fn work() -> PathBuf {
        PathBuf::from("/work")
    }

    #[test]
    fn test_required_block_order() {
        let manifest = sample();
        let args = BuildCommand::new(&manifest, work()).render(&PatchSet::new());

        assert_eq!(
            args,
            [
                "-jar",
                "/work/cli.jar",
                "-a",
                "/work/youtube.apk",
                "-b",
                "/work/patches.jar",
                "-m",
                "/work/integrations.apk",
                "-o",
                "/work/Re-youtube-output.apk",
                "--keystore",
                "/work/revanced.keystore",
                "--options",
                "/work/options.json",
            ]
        );
    }

    #[test]
    fn test_flags_never_resolved() {
        let manifest = sample();
        let args = BuildCommand::new(&manifest, work()).render(&PatchSet::new());
        for flag in args.iter().step_by(2) {
            assert!(flag.starts_with('-'), "flag slot was resolved: {}", flag);
        }
    }

    #[test]
    fn test_experimental_ci_tail() {
        let mut manifest = sample();
        manifest.experimental = true;
        let mut set = PatchSet::new();
        set.include("x");
        set.exclude("y");

        let args = BuildCommand::new(&manifest, work())
            .ci_mode(true)
            .render(&set);

        assert_eq!(&args[args.len() - 4..], ["-e", "x", "-e", "y"]);
        let experimental: Vec<_> = args
            .iter()
            .enumerate()
            .filter(|(_, a)| *a == EXPERIMENTAL_ARG)
            .map(|(i, _)| i)
            .collect();
        assert_eq!(experimental, [14]);
        assert_eq!(args.len(), 19);

        // The caller's set keeps its own dispositions.
        assert_eq!(set.tokens()[0], crate::patches::PatchToken::include("x"));
    }

    #[test]
    fn test_patch_tokens_follow_required_block() {
        let manifest = sample();
        let mut set = PatchSet::new();
        set.include("a");
        set.include("a");

        let args = BuildCommand::new(&manifest, work()).render(&set);
        assert_eq!(&args[14..], ["-i", "a", "-i", "a"]);
    }

    #[test]
    fn test_rip_lib_flags() {
        let mut manifest = sample();
        manifest.rip_libs = true;
        manifest.archs = vec!["arm64-v8a".into()];

        let args = BuildCommand::new(&manifest, work()).render(&PatchSet::new());
        let tail = &args[14..];
        let mut stripped: Vec<_> = tail
            .chunks(2)
            .map(|pair| {
                assert_eq!(pair[0], RIP_LIB_ARG);
                pair[1].as_str()
            })
            .collect();
        stripped.sort();
        assert_eq!(stripped, ["armeabi-v7a", "x86", "x86_64"]);
    }

    #[test]
    fn test_no_rip_lib_when_not_flagged() {
        let mut manifest = sample();
        manifest.archs = vec!["arm64-v8a".into()];
        let args = BuildCommand::new(&manifest, work()).render(&PatchSet::new());
        assert!(!args.iter().any(|a| a == RIP_LIB_ARG));
    }

    #[test]
    fn test_custom_options_file() {
        let manifest = sample();
        let args = BuildCommand::new(&manifest, work())
            .options_file("opts.json")
            .render(&PatchSet::new());
        assert_eq!(args[13], "/work/opts.json");
    }
}
