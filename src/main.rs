use anyhow::{Context, Result};
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use git_changelog::config;
use git_changelog::orchestration::{generate_github_changelog, GenerateChangelogRequest};
use git_changelog::remote::ClientMode;
use git_changelog::ui;

#[derive(clap::Parser)]
#[command(
    name = "git-changelog",
    version,
    about = "Compute the next release version and changelog from conventional commits"
)]
struct Args {
    #[arg(help = "Repository as owner/repo or a GitHub URL")]
    repository: String,

    #[arg(short, long, help = "Branch to walk (default: the repository's default branch)")]
    branch: Option<String>,

    #[arg(short, long, help = "Release tag or commit sha to start from")]
    sha: Option<String>,

    #[arg(short, long, help = "Custom configuration file path")]
    config: Option<String>,

    #[arg(long, help = "Continue the pre-release chain of the latest tag")]
    prerelease: bool,

    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true, help = "GitHub API token")]
    token: Option<String>,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("git_changelog=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    // Load configuration
    let mut config = match config::load_config(args.config.as_deref()) {
        Ok(cfg) => cfg,
        Err(e) => {
            ui::display_error(&format!("Error loading config: {}", e));
            std::process::exit(1);
        }
    };
    if args.prerelease {
        config.versioning.prerelease = true;
    }

    let token = args.token.or_else(|| config.github.token());
    if token.is_none() {
        ui::display_status("No GitHub token found, using unauthenticated requests");
    }
    let mode = ClientMode::Standalone {
        token,
        proxy_key: config.github.proxy_key.clone(),
    };

    let cancellation = CancellationToken::new();
    let on_interrupt = cancellation.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_interrupt.cancel();
        }
    });

    let request = GenerateChangelogRequest {
        repository: args.repository,
        branch: args.branch,
        sha_or_ref: args.sha,
    };

    ui::display_status(&format!("Reading history of {}...", request.repository));
    let response = generate_github_changelog(&request, &config, mode, Some(cancellation))
        .await
        .with_context(|| format!("failed to generate changelog for {}", request.repository))?;

    for warning in &response.warnings {
        ui::display_boundary_warning(warning);
    }
    println!("{}", response.markdown);
    ui::display_candidate_summary(&response.candidate, response.commit_count);
    Ok(())
}
