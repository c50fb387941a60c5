use anyhow::Result;
use clap::{Parser, ValueEnum};
use std::ffi::OsString;
use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Instant;
use tracing::error;
use tracing_subscriber::EnvFilter;

use head_require::config::{Settings, DEFAULT_PACKAGE_MANAGER};
use head_require::core::{Progress, RequirementsAnalyzer};
use head_require::formatters::RequirementsFormatter;
use head_require::parsers::ParseMode;

#[derive(Debug, Clone, Parser)]
#[command(
    name = "head-require",
    version,
    about = "Generate requirements.txt based on imported packages in Python files"
)]
struct Cli {
    /// Path to the directory of your project or the root path of the project
    #[arg(
        long = "directory_project",
        visible_alias = "directory-project",
        value_name = "PATH",
        default_value = "."
    )]
    directory_project: PathBuf,

    /// Environment directory holding site-packages (default: where the package manager lives)
    #[arg(long = "directory_env", visible_alias = "directory-env", value_name = "PATH")]
    directory_env: Option<PathBuf>,

    /// Package manager used to list installed packages
    #[arg(long, value_name = "PROGRAM", env = "HEAD_REQUIRE_PIP", default_value = DEFAULT_PACKAGE_MANAGER)]
    pip: String,

    /// Import extraction strategy
    #[arg(long, value_enum, default_value_t = ParserKind::Pattern)]
    parser: ParserKind,

    /// Write the manifest here instead of <project>/requirements.txt
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Print the manifest instead of writing it
    #[arg(long)]
    dry_run: bool,

    /// Show debug diagnostics
    #[arg(short, long, conflicts_with = "quiet")]
    verbose: bool,

    /// Only report errors
    #[arg(short, long)]
    quiet: bool,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, ValueEnum)]
enum ParserKind {
    Pattern,
    Syntax,
}

impl From<ParserKind> for ParseMode {
    fn from(kind: ParserKind) -> Self {
        match kind {
            ParserKind::Pattern => ParseMode::Pattern,
            ParserKind::Syntax => ParseMode::Syntax,
        }
    }
}

/// `-dp` and `-de` are two-letter short flags, which clap cannot express.
fn expand_short_flags<I>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = OsString>,
{
    args.into_iter()
        .map(|arg| {
            let Some(text) = arg.to_str() else {
                return arg;
            };
            for (short, long) in [("-dp", "--directory_project"), ("-de", "--directory_env")] {
                if text == short {
                    return OsString::from(long);
                }
                if let Some(value) = text.strip_prefix(short).and_then(|v| v.strip_prefix('=')) {
                    return OsString::from(format!("{long}={value}"));
                }
            }
            arg
        })
        .collect()
}

fn init_tracing(verbose: bool, quiet: bool) {
    let default_level = if verbose {
        "debug"
    } else if quiet {
        "error"
    } else {
        "warn"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse_from(expand_short_flags(std::env::args_os()));
    init_tracing(cli.verbose, cli.quiet);
    run(cli, &mut io::stdout().lock())
}

/// Status lines never share stdout with a dry-run manifest.
fn progress_for(quiet: bool, dry_run: bool) -> Progress {
    if quiet {
        Progress::Silent
    } else if dry_run {
        Progress::Stderr
    } else {
        Progress::Stdout
    }
}

fn run(cli: Cli, out: &mut dyn Write) -> Result<()> {
    let start_time = Instant::now();
    let progress = progress_for(cli.quiet, cli.dry_run);

    let settings = Settings {
        project_dir: cli.directory_project,
        environment_dir: cli.directory_env,
        package_manager: cli.pip,
        parse_mode: cli.parser.into(),
        output_file: cli.output,
        dry_run: cli.dry_run,
    };
    settings.validate()?;

    let analyzer = RequirementsAnalyzer::from_settings(&settings)?.with_progress(progress);
    let output_path = settings.output_path();

    progress.report("HEAD-REQUIRE");
    progress.report(format_args!("Project: {}", settings.project_dir.display()));
    progress.report(format_args!(
        "Environment: {}",
        analyzer.environment_dir().display()
    ));
    progress.report(format_args!("Parser: {}", settings.parse_mode.as_str()));

    let analysis = analyzer.analyze(&settings.project_dir);
    progress.report(format_args!(
        "{} import statements, {} distinct modules, {} installed packages",
        analysis.statements,
        analysis.modules.len(),
        analysis.installed
    ));

    let formatter = RequirementsFormatter::new();
    if settings.dry_run {
        out.write_all(formatter.format(&analysis.requirements).as_bytes())?;
        out.flush()?;
        return Ok(());
    }

    match formatter.format_to_file(&analysis.requirements, &output_path) {
        Ok(()) => progress.report(format_args!(
            "Wrote {} packages to {} in {:.2}s",
            analysis.requirements.len(),
            output_path.display(),
            start_time.elapsed().as_secs_f64()
        )),
        // An explicit --output is a user request; the default target degrades.
        Err(err) if settings.output_file.is_some() => return Err(err),
        Err(err) => error!(error = %err, "Writing requirements failed"),
    }

    Ok(())
}
