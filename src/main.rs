//! apkpatch CLI
//!
//! Patches Android apps with an external patch engine jar. Each build reads an
//! app manifest (JSON), selects patches, and runs
//! `java -jar <cli> ... [-i|-e <patch>]* [--rip-lib <arch>]*`.
//!
//! # Usage
//!
//! ```bash
//! # Check java, workspace files and mirror reachability
//! apkpatch preflight apps/youtube.json
//!
//! # Show where the APK comes from
//! apkpatch source youtube
//!
//! # Print the engine arguments without running anything
//! apkpatch args apps/youtube.json --exclude hide-shorts-button
//!
//! # Patch the app
//! apkpatch build apps/youtube.json --toggle "Custom Branding"
//!
//! # Dry run: every patch excluded
//! apkpatch build apps/youtube.json --ci
//! ```
//!
//! Logging is controlled with `RUST_LOG`. Engine output is logged at `debug`
//! on the `engine` target, which the default filter shows.

use anyhow::{bail, Context, Result};
use clap::{ArgMatches, Args, CommandFactory, FromArgMatches, Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use apkpatch::app::ApplicationManifest;
use apkpatch::command::BuildCommand;
use apkpatch::config::PatcherConfig;
use apkpatch::patches::{Disposition, PatchSet, PatchToken};
use apkpatch::preflight::PreflightChecker;
use apkpatch::runner::ProcessRunner;
use apkpatch::sources::{self, Mirror, SourceRegistry, SourceTemplate};
use apkpatch::Timer;

#[derive(Parser)]
#[command(name = "apkpatch")]
#[command(author, version, about = "APK patch builder", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Patch one app described by a manifest
    Build {
        /// Path to the app manifest (JSON)
        manifest: PathBuf,
        #[command(flatten)]
        opts: BuildOpts,
    },

    /// Print the engine argument vector without running it
    Args {
        /// Path to the app manifest (JSON)
        manifest: PathBuf,
        #[command(flatten)]
        opts: BuildOpts,
    },

    /// Show the download source for an app
    Source {
        /// App key, e.g. youtube
        app: String,
        /// Package name to fill into slot templates
        #[arg(long)]
        package: Option<String>,
        /// Version to request from versioned templates
        #[arg(long)]
        version: Option<String>,
    },

    /// Check build prerequisites
    Preflight {
        /// App manifest whose files and mirror should be checked
        manifest: Option<PathBuf>,
        /// Skip the mirror reachability check
        #[arg(long)]
        offline: bool,
    },
}

/// Engine output plus library messages at `info`.
const DEFAULT_LOG_FILTER: &str = "info,engine=debug";

#[derive(Args)]
struct BuildOpts {
    /// Include a patch (repeatable, applied in command-line order)
    #[arg(short = 'i', long = "include")]
    include: Vec<String>,

    /// Exclude a patch (repeatable, applied in command-line order)
    #[arg(short = 'e', long = "exclude")]
    exclude: Vec<String>,

    /// Flip the disposition of a patch already selected (repeatable)
    #[arg(short = 't', long = "toggle")]
    toggle: Vec<String>,

    /// Dry run: send every patch as excluded
    #[arg(long)]
    ci: bool,

    /// Working directory holding jars, keystore and APKs
    #[arg(long)]
    work_dir: Option<PathBuf>,

    /// Runtime used to launch the engine jar
    #[arg(long)]
    java: Option<String>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .with_target(false)
        .init();

    let matches = Cli::command().get_matches();
    let cli = Cli::from_arg_matches(&matches).unwrap_or_else(|e| e.exit());
    let args = subcommand_args(&matches);

    let result = match cli.command {
        Commands::Build { manifest, opts } => {
            let selection = ordered_patches(&opts, args);
            cmd_build(&manifest, &opts, &selection)
        }
        Commands::Args { manifest, opts } => {
            let selection = ordered_patches(&opts, args);
            cmd_args(&manifest, &opts, &selection)
        }
        Commands::Source {
            app,
            package,
            version,
        } => cmd_source(&app, package.as_deref(), version.as_deref()),
        Commands::Preflight { manifest, offline } => cmd_preflight(manifest, offline),
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn subcommand_args(matches: &ArgMatches) -> &ArgMatches {
    matches.subcommand().map_or(matches, |(_, sub)| sub)
}

/// `--include` and `--exclude` values merged back into command-line order.
fn ordered_patches(opts: &BuildOpts, matches: &ArgMatches) -> Vec<PatchToken> {
    let includes = positions(matches, "include")
        .zip(&opts.include)
        .map(|(at, name)| (at, PatchToken::include(name.as_str())));
    let excludes = positions(matches, "exclude")
        .zip(&opts.exclude)
        .map(|(at, name)| (at, PatchToken::exclude(name.as_str())));

    let mut tokens: Vec<_> = includes.chain(excludes).collect();
    tokens.sort_by_key(|(at, _)| *at);
    tokens.into_iter().map(|(_, token)| token).collect()
}

fn positions<'a>(matches: &'a ArgMatches, id: &str) -> impl Iterator<Item = usize> + 'a {
    matches.indices_of(id).into_iter().flatten()
}

/// Load config from the environment and apply CLI overrides.
fn load_config(opts: &BuildOpts) -> Result<PatcherConfig> {
    let config = PatcherConfig::from_env().context("Invalid environment configuration")?;
    Ok(apply_overrides(config, opts))
}

fn apply_overrides(mut config: PatcherConfig, opts: &BuildOpts) -> PatcherConfig {
    if let Some(dir) = &opts.work_dir {
        config.work_dir = dir.clone();
    }
    if let Some(java) = &opts.java {
        config.java = java.clone();
    }
    if opts.ci {
        config.ci_test = true;
    }
    config
}

/// Manifest patches first, then the CLI selection, then toggles.
fn select_patches(
    manifest: &ApplicationManifest,
    selection: &[PatchToken],
    toggles: &[String],
) -> PatchSet {
    let mut patches = manifest.patch_set();
    for token in selection {
        match token.disposition {
            Disposition::Include => patches.include(token.name.as_str()),
            Disposition::Exclude => patches.exclude(token.name.as_str()),
        }
    }
    for name in toggles {
        if !patches.invert(name) {
            tracing::warn!(patch = %name, "cannot toggle patch that was never selected");
        }
    }
    patches
}

fn selection_summary(patches: &PatchSet) -> String {
    let included = patches
        .tokens()
        .iter()
        .filter(|t| t.disposition == Disposition::Include)
        .count();
    format!("{} included, {} excluded", included, patches.len() - included)
}

fn prepare(
    manifest_path: &Path,
    opts: &BuildOpts,
    selection: &[PatchToken],
) -> Result<(PatcherConfig, ApplicationManifest, PatchSet)> {
    let config = load_config(opts)?;
    let manifest = ApplicationManifest::load(manifest_path, &config)
        .with_context(|| format!("Failed to load manifest {}", manifest_path.display()))?;
    let patches = select_patches(&manifest, selection, &opts.toggle);
    Ok((config, manifest, patches))
}

fn render(
    config: &PatcherConfig,
    manifest: &ApplicationManifest,
    patches: &PatchSet,
) -> Vec<String> {
    BuildCommand::new(manifest, &config.work_dir)
        .options_file(config.options_file.as_str())
        .ci_mode(config.ci_test)
        .render(patches)
}

fn cmd_build(manifest_path: &Path, opts: &BuildOpts, selection: &[PatchToken]) -> Result<()> {
    let (config, manifest, patches) = prepare(manifest_path, opts, selection)?;

    println!("=== Patching {} ===\n", manifest.app);
    println!("  Work dir: {}", config.work_dir.display());
    println!("  Patches:  {}", selection_summary(&patches));
    if !patches.excluded_names().is_empty() {
        println!("  Excluded: {}", patches.excluded_names().join(", "));
    }
    if config.ci_test {
        println!("  Mode:     CI (all patches excluded)");
    }
    println!();

    let t = Timer::start("Build");
    let args = render(&config, &manifest, &patches);
    let runner = ProcessRunner::new(config.java.as_str());
    let report = runner
        .run(&manifest.app, &args)
        .with_context(|| format!("Patching {} failed", manifest.app))?;
    t.finish();

    println!("\n=== Patch Complete ({:.1}s) ===", report.elapsed.as_secs_f64());
    println!(
        "  Output: {}",
        config.work_dir.join(manifest.output_file_name()).display()
    );

    Ok(())
}

fn cmd_args(manifest_path: &Path, opts: &BuildOpts, selection: &[PatchToken]) -> Result<()> {
    let (config, manifest, patches) = prepare(manifest_path, opts, selection)?;
    let args = render(&config, &manifest, &patches);

    println!("{} {}", config.java, args.join(" "));
    Ok(())
}

fn cmd_source(app: &str, package: Option<&str>, version: Option<&str>) -> Result<()> {
    let registry = sources::default_registry();
    let template = registry.require(app)?;
    let mirror = Mirror::from_url(&template);

    let url = match (SourceTemplate::parse(&template), package) {
        (SourceTemplate::Direct(url), _) => url,
        (shape, Some(package)) => shape.render(package, version),
        (_, None) => bail!(
            "Source for '{}' needs a package name: {}\n\
             Pass --package <name>",
            app,
            template
        ),
    };

    println!("{}", url);
    tracing::debug!(app, ?mirror, "resolved source");
    Ok(())
}

fn cmd_preflight(manifest_path: Option<PathBuf>, offline: bool) -> Result<()> {
    let config = PatcherConfig::from_env().context("Invalid environment configuration")?;
    let manifest = manifest_path
        .map(|path| {
            ApplicationManifest::load(&path, &config)
                .with_context(|| format!("Failed to load manifest {}", path.display()))
        })
        .transpose()?;

    let mut checker = PreflightChecker::new(&config);
    if let Some(manifest) = &manifest {
        checker = checker.manifest(manifest);
    }
    if offline {
        checker = checker.offline();
    }

    let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;
    let report = runtime.block_on(checker.run_all());
    report.print_summary();

    if !report.is_ok() {
        bail!("{} preflight check(s) failed", report.errors().len());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use apkpatch::config::{JAVA_ENV, WORK_DIR_ENV};
    use std::io::{self, Write};
    use std::sync::{Arc, Mutex};

    const MANIFEST: &str = r#"{
        "app": "youtube",
        "package_file": "youtube.apk",
        "resources": { "cli": "cli.jar", "patches": "patches.jar", "integrations": "integrations.apk" },
        "keystore": "revanced.keystore",
        "include_patches": ["custom-branding"]
    }"#;

    fn parse_build(argv: &[&str]) -> (BuildOpts, ArgMatches) {
        let matches = Cli::command().try_get_matches_from(argv).unwrap();
        let cli = Cli::from_arg_matches(&matches).unwrap();
        let sub = subcommand_args(&matches).clone();
        match cli.command {
            Commands::Build { opts, .. } | Commands::Args { opts, .. } => (opts, sub),
            _ => panic!("not a build command: {:?}", argv),
        }
    }

    #[test]
    fn test_patch_options_keep_command_line_order() {
        let (opts, matches) = parse_build(&[
            "apkpatch", "args", "m.json", "--exclude", "foo", "--include", "foo", "-e", "bar",
        ]);
        assert_eq!(
            ordered_patches(&opts, &matches),
            [
                PatchToken::exclude("foo"),
                PatchToken::include("foo"),
                PatchToken::exclude("bar"),
            ]
        );

        let (opts, matches) = parse_build(&["apkpatch", "args", "m.json", "-i", "foo", "-e", "foo"]);
        assert_eq!(
            ordered_patches(&opts, &matches),
            [PatchToken::include("foo"), PatchToken::exclude("foo")]
        );
    }

    #[test]
    fn test_rendered_tokens_follow_options() {
        let (opts, matches) = parse_build(&[
            "apkpatch", "args", "m.json", "--exclude", "foo", "--include", "foo", "--work-dir", "/w",
        ]);
        let config = apply_overrides(PatcherConfig::default(), &opts);
        let manifest = ApplicationManifest::from_json(MANIFEST).unwrap();
        let patches = select_patches(&manifest, &ordered_patches(&opts, &matches), &opts.toggle);

        let args = render(&config, &manifest, &patches);
        assert_eq!(args[1], "/w/cli.jar");
        assert_eq!(
            &args[args.len() - 6..],
            ["-i", "custom-branding", "-e", "foo", "-i", "foo"]
        );
    }

    #[test]
    fn test_cli_flags_override_environment() {
        let env = PatcherConfig::from_lookup(|key| match key {
            WORK_DIR_ENV => Some("/env/work".to_string()),
            JAVA_ENV => Some("/env/java".to_string()),
            _ => None,
        })
        .unwrap();

        let (opts, _) = parse_build(&[
            "apkpatch", "build", "m.json", "--work-dir", "/cli/work", "--ci",
        ]);
        let config = apply_overrides(env.clone(), &opts);
        assert_eq!(config.work_dir, PathBuf::from("/cli/work"));
        assert_eq!(config.java, "/env/java");
        assert!(config.ci_test);

        let (opts, _) = parse_build(&["apkpatch", "build", "m.json"]);
        assert_eq!(apply_overrides(env.clone(), &opts), env);
    }

    #[test]
    fn test_summary_counts_dispositions() {
        let mut patches = PatchSet::new();
        patches.include("a");
        patches.include("b");
        patches.exclude("c");
        assert_eq!(selection_summary(&patches), "2 included, 1 excluded");
    }

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_default_filter_shows_engine_output() {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::new(DEFAULT_LOG_FILTER))
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            apkpatch::runner::log_line("Executing patch 1 of 3");
            tracing::debug!(target: "apkpatch::sources", "resolver detail");
        });

        let output = String::from_utf8(captured.0.lock().unwrap().clone()).unwrap();
        assert!(output.contains("Executing patch 1 of 3"));
        assert!(!output.contains("resolver detail"));
    }
}
