use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::{Args, CommandFactory, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "overaudit",
    version,
    about = "Checks whether pnpm dependency overrides are still necessary by stripping them and diffing audit results"
)]
pub struct Cli {
    /// Project root containing package.json (defaults to the current directory)
    #[arg(long, default_value = ".", global = true)]
    pub dir: PathBuf,
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    #[arg(long, global = true)]
    pub quiet: bool,
    #[arg(long, global = true)]
    pub verbose: bool,
    /// Timeout in seconds for external commands (git)
    #[arg(long, default_value_t = 30, global = true)]
    pub timeout: u64,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Remove the overrides key from package.json and pnpm-workspace.yaml
    Strip(StripArgs),
    /// Diff the with/without-overrides audit snapshots and emit the decision
    Diff(DiffArgs),
    /// Render the markdown summary of removed overrides and changed files
    Summary(SummaryArgs),
    Completion(CompletionArgs),
    Config(ConfigArgs),
}

#[derive(Debug, Args)]
pub struct StripArgs {}

#[derive(Debug, Args)]
pub struct DiffArgs {
    /// Decision channel file; defaults to the GITHUB_OUTPUT environment variable
    #[arg(long)]
    pub github_output: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct SummaryArgs {
    /// Print the rendered markdown to stdout as well
    #[arg(long)]
    pub stdout: bool,
}

#[derive(Debug, Args)]
pub struct CompletionArgs {
    pub shell: String,
}

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[arg(long)]
    pub show: bool,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    let root = cli.dir.clone();
    let env_config_path = std::env::var_os("OVERAUDIT_CONFIG").map(PathBuf::from);
    let cfg = crate::config::load(
        cli.config.as_deref().or(env_config_path.as_deref()),
        &root,
    )
    .map_err(crate::exit::invalid_args_err)?;

    let timeout = Duration::from_secs(cli.timeout);

    match cli.command {
        Commands::Strip(_args) => {
            crate::strip::run(&root, &cfg.paths, cli.quiet, cli.verbose)?;
        }
        Commands::Diff(args) => {
            let output_channel = match args.github_output {
                Some(path) => path,
                None => std::env::var_os("GITHUB_OUTPUT")
                    .map(PathBuf::from)
                    .ok_or_else(|| {
                        crate::exit::invalid_args(
                            "no decision channel: set GITHUB_OUTPUT or pass --github-output",
                        )
                    })?,
            };
            crate::audit::run(&root, &cfg.paths, &output_channel, cli.quiet)?;
        }
        Commands::Summary(args) => {
            crate::summary::run(&root, &cfg, timeout, cli.quiet, cli.verbose)?;
            if args.stdout {
                let summary_path = root.join(&cfg.paths.summary);
                let text = std::fs::read_to_string(&summary_path)
                    .map_err(|e| crate::exit::file_failed_err(e.into()))?;
                print!("{text}");
            }
        }
        Commands::Completion(args) => {
            let shell = parse_shell(&args.shell)?;
            let mut cmd = Cli::command();
            let mut out = std::io::stdout().lock();
            clap_complete::generate(shell, &mut cmd, "overaudit", &mut out);
        }
        Commands::Config(args) => {
            if args.show {
                println!("{}", toml::to_string_pretty(&cfg)?);
            } else if !cli.quiet {
                eprintln!("config: use `overaudit config --show`");
            }
        }
    }

    Ok(())
}

fn parse_shell(s: &str) -> Result<clap_complete::Shell> {
    let s = s.trim().to_ascii_lowercase();
    match s.as_str() {
        "bash" => Ok(clap_complete::Shell::Bash),
        "zsh" => Ok(clap_complete::Shell::Zsh),
        "fish" => Ok(clap_complete::Shell::Fish),
        other => Err(crate::exit::invalid_args(format!(
            "unsupported shell: {other} (expected bash|zsh|fish)"
        ))),
    }
}
