use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use prerelease::config::{self, Config};
use prerelease::git::{Git2Repository, SshAuth};
use prerelease::{report, ui};

#[derive(clap::Parser)]
#[command(
    name = "prerelease",
    version,
    about = "Generate a release changelog and schema script since the latest tag"
)]
struct Args {
    #[arg(help = "Path to the repository", default_value = ".")]
    path: PathBuf,

    #[arg(
        long,
        value_name = "HOST/ORG/REPO",
        help = "Clone this remote over SSH instead of using PATH"
    )]
    remote: Option<String>,

    #[arg(long, requires = "remote", help = "SSH private key used to clone --remote")]
    ssh_key: Option<PathBuf>,

    #[arg(long, requires = "remote", help = "Passphrase for --ssh-key")]
    ssh_passphrase: Option<String>,

    #[arg(short, long, help = "Custom configuration file path")]
    config: Option<String>,

    #[arg(long, help = "Only report changelog entries with this scope")]
    scope: Option<String>,

    #[arg(long, help = "Issue tracker base URL for ticket links")]
    ticket_url: Option<String>,

    #[arg(long, help = "File suffix of schema files, e.g. .sql")]
    suffix: Option<String>,

    #[arg(long, help = "Trunk branch compared against the latest tag")]
    trunk: Option<String>,

    #[arg(short, long, help = "Output file (default: CHANGELOG-<timestamp>.md)")]
    output: Option<PathBuf>,

    #[arg(long, conflicts_with = "output", help = "Print the report instead of writing a file")]
    stdout: bool,
}

fn main() {
    init_tracing();

    let args = Args::parse();
    let start = Instant::now();

    if let Err(e) = run(args, start) {
        ui::display_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

fn run(args: Args, start: Instant) -> Result<()> {
    let mut config = config::load_config(args.config.as_deref())?;
    apply_overrides(&mut config, &args);

    let (repo, service_name) = match args.remote.as_deref() {
        Some(remote) => {
            let private_key = args
                .ssh_key
                .clone()
                .context("--ssh-key is required when cloning a remote")?;
            let auth = SshAuth {
                private_key,
                passphrase: args.ssh_passphrase.clone(),
            };
            if !args.stdout {
                ui::display_status(&format!("Cloning {}...", remote));
            }
            let (repo, _path) = Git2Repository::clone_remote(remote, &auth)
                .with_context(|| format!("clone remote {}", remote))?;
            (repo, service_name_from_remote(remote))
        }
        None => {
            let repo = Git2Repository::open(&args.path)
                .with_context(|| format!("open repository {}", args.path.display()))?;
            let root = repo.workdir().unwrap_or(args.path.as_path()).to_path_buf();
            (repo, service_name_from_path(&root))
        }
    };

    let report = report::build_release_report(&repo, &config, &service_name)
        .context("build release report")?;
    let markdown = report.to_markdown();
    if args.stdout {
        print!("{}", markdown);
        info!(elapsed = ?start.elapsed(), "generated report");
        return Ok(());
    }

    let output = args.output.clone().unwrap_or_else(|| {
        PathBuf::from(format!("CHANGELOG-{}.md", chrono::Utc::now().timestamp()))
    });
    std::fs::write(&output, markdown)
        .with_context(|| format!("write {}", output.display()))?;

    ui::display_latest_tag(report.latest_tag.as_ref());
    ui::display_status(&ui::summarize(&report));
    ui::display_generated(&output, start.elapsed());
    Ok(())
}

fn apply_overrides(config: &mut Config, args: &Args) {
    if let Some(scope) = &args.scope {
        config.changelog.scope = scope.clone();
    }
    if let Some(url) = &args.ticket_url {
        config.changelog.ticket_base_url = url.clone();
    }
    if let Some(suffix) = &args.suffix {
        config.schema.suffix = suffix.clone();
    }
    if let Some(trunk) = &args.trunk {
        config.repository.trunk_branch = trunk.clone();
    }
}

fn service_name_from_path(path: &Path) -> String {
    let path = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn service_name_from_remote(remote: &str) -> String {
    remote
        .trim_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or(remote)
        .to_string()
}

/// Console logging controlled by RUST_LOG (default: warn)
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
