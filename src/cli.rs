//! Command-line interface for stylelearn.

use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::config::{self, LearningConfig};
use crate::error::LearnError;
use crate::integrator::{IntegratedLearningResult, PatternLearningIntegrator};
use crate::learning::{LearningEngine, LearningResult, Snapshot, SnapshotStore};
use crate::report::{self, Format};

/// Exit codes.
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_ERROR: i32 = 2;

/// Learn a codebase's conventions and derive confidence-scored lint rules.
///
/// Stylelearn reads a source tree, infers the naming, layout, formatting and
/// documentation conventions it already follows, and maps them onto linter
/// settings at a strictness matched to the project's maturity.
#[derive(Parser)]
#[command(name = "stylelearn")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Log progress and skipped files
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Learn the primary language's conventions
    Learn(LearnArgs),
    /// Learn every language and reconcile them
    Integrate(LearnArgs),
    /// Print the saved results for a project
    Show(ShowArgs),
    /// Write a default configuration file
    Init(InitArgs),
}

/// Arguments shared by `learn` and `integrate`.
#[derive(Args)]
pub struct LearnArgs {
    /// Project root
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Path to configuration YAML file (default: auto-discover)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Directory name to skip (repeatable; replaces the default list)
    #[arg(long = "exclude-dir", value_name = "DIR")]
    pub exclude_dirs: Vec<String>,

    /// Restrict analysis to a language (repeatable)
    #[arg(short, long = "language", value_name = "ID")]
    pub languages: Vec<String>,

    /// Output format: pretty or json
    #[arg(short, long, default_value = "pretty")]
    pub format: String,

    /// Save the result under the project's state directory
    #[arg(long)]
    pub save: bool,

    /// Blend strictness with the previously saved result
    #[arg(long)]
    pub adapt: bool,
}

/// Arguments for the show command.
#[derive(Args)]
pub struct ShowArgs {
    /// Project root
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Path to configuration YAML file (default: auto-discover)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Output format: pretty or json
    #[arg(short, long, default_value = "pretty")]
    pub format: String,
}

/// Arguments for the init command.
#[derive(Args)]
pub struct InitArgs {
    /// Output file path
    #[arg(short, long, default_value = "stylelearn.yaml")]
    pub output: PathBuf,
}

/// Resolve the configuration for a run: file (explicit or discovered),
/// then command-line overrides, then validation.
pub fn resolve_config(args: &LearnArgs) -> anyhow::Result<LearningConfig> {
    let mut config = LearningConfig::load_for(&args.path, args.config.as_deref())?;
    if !args.exclude_dirs.is_empty() {
        config.excluded_dirs = args.exclude_dirs.clone();
    }
    if !args.languages.is_empty() {
        config.languages = args.languages.clone();
        if config.primary_language.is_none() && args.languages.len() == 1 {
            config.primary_language = Some(args.languages[0].clone());
        }
    }
    config::validate(&config)?;
    Ok(config)
}

fn spinner(msg: &str, format: Format) -> ProgressBar {
    if format == Format::Json {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner} {msg}") {
        pb.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ "));
    }
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

fn parse_format(format: &str) -> Option<Format> {
    match format.parse::<Format>() {
        Ok(f) => Some(f),
        Err(e) => {
            eprintln!("Error: {}", e);
            None
        }
    }
}

/// The saved result to adapt from. Only a missing snapshot yields `None`;
/// an unreadable one is an error.
fn previous_result(
    engine: &LearningEngine,
    root: &Path,
) -> Result<Option<LearningResult>, LearnError> {
    match engine.load(root) {
        Ok(previous) => Ok(Some(previous)),
        Err(LearnError::SnapshotNotFound(_)) => {
            log::info!("no previous result to adapt from");
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

/// Run the learn command.
pub fn run_learn(args: &LearnArgs) -> anyhow::Result<i32> {
    let Some(format) = parse_format(&args.format) else {
        return Ok(EXIT_ERROR);
    };
    let config = match resolve_config(args) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: invalid configuration: {:#}", e);
            return Ok(EXIT_ERROR);
        }
    };
    let engine = LearningEngine::new(config);

    let pb = spinner("Learning conventions...", format);
    let learned = engine.learn(&args.path);
    pb.finish_and_clear();

    let mut result = match learned {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Error: {}", e);
            return Ok(EXIT_ERROR);
        }
    };

    if args.adapt {
        match previous_result(&engine, &args.path) {
            Ok(Some(previous)) => result = engine.adapt(&previous, result),
            Ok(None) => {}
            Err(e) => {
                eprintln!("Error: {}", e);
                return Ok(EXIT_ERROR);
            }
        }
    }

    if args.save {
        let saved = engine.save(&args.path, &result)?;
        log::info!("saved {}", saved.display());
    }

    match format {
        Format::Json => report::write_json(&result)?,
        Format::Pretty => report::write_pretty_learning(&args.path.to_string_lossy(), &result),
    }
    Ok(EXIT_SUCCESS)
}

/// Run the integrate command.
pub fn run_integrate(args: &LearnArgs) -> anyhow::Result<i32> {
    let Some(format) = parse_format(&args.format) else {
        return Ok(EXIT_ERROR);
    };
    let config = match resolve_config(args) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: invalid configuration: {:#}", e);
            return Ok(EXIT_ERROR);
        }
    };
    let engine = LearningEngine::new(config.clone());
    let integrator = PatternLearningIntegrator::new(config);

    let pb = spinner("Learning conventions across languages...", format);
    let integrated = integrator.run(&args.path);
    pb.finish_and_clear();

    let mut result = match integrated {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Error: {}", e);
            return Ok(EXIT_ERROR);
        }
    };

    if args.adapt {
        match previous_result(&engine, &args.path) {
            Ok(Some(previous)) => {
                if let Some(fresh) = result.primary_result.take() {
                    result.primary_result = Some(engine.adapt(&previous, fresh));
                }
            }
            Ok(None) => {}
            Err(e) => {
                eprintln!("Error: {}", e);
                return Ok(EXIT_ERROR);
            }
        }
    }

    if args.save {
        if let Some(primary) = &result.primary_result {
            engine.save(&args.path, primary)?;
        }
        let saved = integrator.save(&args.path, &result)?;
        log::info!("saved {}", saved.display());
    }

    match format {
        Format::Json => report::write_json(&result)?,
        Format::Pretty => report::write_pretty_integrated(&args.path.to_string_lossy(), &result),
    }
    Ok(EXIT_SUCCESS)
}

/// Load one snapshot kind. `Ok(None)` when none was saved.
fn load_optional<S: Snapshot>(store: &SnapshotStore) -> Result<Option<S>, LearnError> {
    match store.load::<S>() {
        Ok(value) => Ok(Some(value)),
        Err(LearnError::SnapshotNotFound(_)) => Ok(None),
        Err(e) => Err(e),
    }
}

/// Run the show command.
pub fn run_show(args: &ShowArgs) -> anyhow::Result<i32> {
    let Some(format) = parse_format(&args.format) else {
        return Ok(EXIT_ERROR);
    };
    let config = match LearningConfig::load_for(&args.path, args.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: invalid configuration: {:#}", e);
            return Ok(EXIT_ERROR);
        }
    };
    let store = SnapshotStore::new(config.state_dir_for(&args.path));

    let learned = load_optional::<LearningResult>(&store);
    let integrated = load_optional::<IntegratedLearningResult>(&store);
    let (learned, integrated) = match (learned, integrated) {
        (Ok(l), Ok(i)) => (l, i),
        (Err(e), _) | (_, Err(e)) => {
            eprintln!("Error: {}", e);
            return Ok(EXIT_ERROR);
        }
    };

    if learned.is_none() && integrated.is_none() {
        eprintln!("Error: no saved results in {}", store.dir().display());
        eprintln!("Run 'stylelearn learn --save' to create one");
        return Ok(EXIT_ERROR);
    }

    let path = args.path.to_string_lossy();
    match format {
        Format::Json => {
            if let Some(r) = &integrated {
                report::write_json(r)?;
            } else if let Some(r) = &learned {
                report::write_json(r)?;
            }
        }
        Format::Pretty => {
            if let Some(r) = &learned {
                report::write_pretty_learning(&path, r);
            }
            if let Some(r) = &integrated {
                report::write_pretty_integrated(&path, r);
            }
        }
    }
    Ok(EXIT_SUCCESS)
}

/// Run the init command.
pub fn run_init(args: &InitArgs) -> anyhow::Result<i32> {
    if args.output.exists() {
        eprintln!("Error: file already exists: {}", args.output.display());
        eprintln!("Remove it or use --output to specify a different path");
        return Ok(EXIT_ERROR);
    }

    if let Some(parent) = args.output.parent() {
        if !parent.as_os_str().is_empty() && parent != Path::new(".") {
            if let Err(e) = std::fs::create_dir_all(parent) {
                eprintln!("Error: failed to create directory: {}", e);
                return Ok(EXIT_ERROR);
            }
        }
    }

    let content = format!(
        "# stylelearn configuration\n{}",
        LearningConfig::default().to_yaml()?
    );
    if let Err(e) = std::fs::write(&args.output, content) {
        eprintln!("Error: failed to write config: {}", e);
        return Ok(EXIT_ERROR);
    }

    println!("Created {}", args.output.display());
    println!();
    println!("Next steps:");
    println!("  1. Edit {} to tune thresholds and exclusions", args.output.display());
    println!("  2. Run: stylelearn learn . --save");

    Ok(EXIT_SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn learn_args(path: &Path) -> LearnArgs {
        LearnArgs {
            path: path.to_path_buf(),
            config: None,
            exclude_dirs: Vec::new(),
            languages: Vec::new(),
            format: "json".into(),
            save: false,
            adapt: false,
        }
    }

    #[test]
    fn test_cli_parses_learn_flags() {
        let cli = Cli::try_parse_from([
            "stylelearn",
            "learn",
            "proj",
            "--exclude-dir",
            "build",
            "--language",
            "go",
            "--save",
            "-v",
        ])
        .unwrap();
        assert!(cli.verbose);
        match cli.command {
            Commands::Learn(args) => {
                assert_eq!(args.path, PathBuf::from("proj"));
                assert_eq!(args.exclude_dirs, vec!["build"]);
                assert_eq!(args.languages, vec!["go"]);
                assert!(args.save);
                assert!(!args.adapt);
            }
            _ => panic!("expected learn"),
        }
    }

    #[test]
    fn test_resolve_config_applies_overrides() {
        let temp = TempDir::new().unwrap();
        let mut args = learn_args(temp.path());
        args.exclude_dirs = vec!["generated".into()];
        args.languages = vec!["rust".into()];

        let config = resolve_config(&args).unwrap();
        assert_eq!(config.excluded_dirs, vec!["generated"]);
        assert_eq!(config.primary_language.as_deref(), Some("rust"));
    }

    #[test]
    fn test_resolve_config_rejects_unknown_language() {
        let temp = TempDir::new().unwrap();
        let mut args = learn_args(temp.path());
        args.languages = vec!["cobol".into()];
        assert!(resolve_config(&args).is_err());
    }

    #[test]
    fn test_init_refuses_to_overwrite() {
        let temp = TempDir::new().unwrap();
        let output = temp.path().join("stylelearn.yaml");

        let args = InitArgs {
            output: output.clone(),
        };
        assert_eq!(run_init(&args).unwrap(), EXIT_SUCCESS);
        let written = LearningConfig::parse_file(&output).unwrap();
        assert_eq!(written, LearningConfig::default());

        assert_eq!(run_init(&args).unwrap(), EXIT_ERROR);
    }

    fn project_with_snapshot(snapshot: Option<&str>) -> TempDir {
        let temp = TempDir::new().unwrap();
        std::fs::write(
            temp.path().join("app.py"),
            "def load_user(user_id):\n    return user_id\n",
        )
        .unwrap();
        if let Some(content) = snapshot {
            let state = temp.path().join(".analysis-state");
            std::fs::create_dir_all(&state).unwrap();
            std::fs::write(state.join("learning_result.json"), content).unwrap();
        }
        temp
    }

    #[test]
    fn test_adapt_rejects_malformed_snapshot() {
        let temp = project_with_snapshot(Some("{\"project_maturity\": 7}"));
        let mut args = learn_args(temp.path());
        args.adapt = true;

        assert_eq!(run_learn(&args).unwrap(), EXIT_ERROR);
        assert_eq!(run_integrate(&args).unwrap(), EXIT_ERROR);
    }

    #[test]
    fn test_adapt_without_snapshot_succeeds() {
        let temp = project_with_snapshot(None);
        let mut args = learn_args(temp.path());
        args.adapt = true;

        assert_eq!(run_learn(&args).unwrap(), EXIT_SUCCESS);
        assert_eq!(run_integrate(&args).unwrap(), EXIT_SUCCESS);
    }

    #[test]
    fn test_show_without_snapshot_is_error() {
        let temp = TempDir::new().unwrap();
        let args = ShowArgs {
            path: temp.path().to_path_buf(),
            config: None,
            format: "json".into(),
        };
        assert_eq!(run_show(&args).unwrap(), EXIT_ERROR);
    }
}
