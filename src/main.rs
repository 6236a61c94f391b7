//! packgen CLI entrypoint
//! Resolves settings and pack layout, then runs generation over the working directory.
#![deny(unsafe_code)]

// Internal imports (std, crate)
use packgen::{
    application::{GenerateArtifactsRequest, GenerateArtifactsResponse, GenerateArtifactsUseCase},
    generation::GenerationOrchestrator,
    infrastructure::{
        FileSystemOutputService, GlobTemplateDiscovery,
        config::{GenerationSettings, PackLayout, SettingsInput},
        sandbox::SandboxRuntime,
    },
};
use std::path::PathBuf;
use std::sync::Arc;

// External imports (alphabetized)
use anyhow::Context;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "packgen")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Settings as a JSON object, e.g. '{"include": "BP/**/*.ts", "pretty": false}'
    settings: Option<String>,

    /// Project root containing config.json
    #[arg(long, env = "ROOT_DIR")]
    root_dir: Option<PathBuf>,

    /// Directory to scan for templates and write artifacts into
    /// (defaults to the current directory)
    #[arg(long)]
    working_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging; RUST_LOG overrides the INFO default
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(response) => {
            if response.files_processed > 0 {
                info!("✨ Generated {} JSON file(s).", response.artifacts_written);
            }
            Ok(())
        }
        Err(e) => {
            error!("❌ Generation failed: {e:#}");
            std::process::exit(1);
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<GenerateArtifactsResponse> {
    let root_dir = cli
        .root_dir
        .filter(|dir| !dir.as_os_str().is_empty())
        .context("ROOT_DIR environment variable not set")?;
    let working_dir = match cli.working_dir {
        Some(dir) => dir,
        None => std::env::current_dir().context("Failed to resolve the working directory")?,
    };

    info!("🛠️ packgen");
    info!("📂 Project root: {}", root_dir.display());
    info!("📂 Working directory: {}", working_dir.display());

    let input = SettingsInput::from_json(cli.settings.as_deref())?;
    let layout = PackLayout::from_project_root(&root_dir);
    let settings = GenerationSettings::resolve(input, &layout);
    info!(
        behavior_pack = %layout.behavior_pack_dir,
        resource_pack = %layout.resource_pack_dir,
        "📦 Packs"
    );

    let discovery = Arc::new(GlobTemplateDiscovery::new(&working_dir));
    let output = Arc::new(FileSystemOutputService::new(&working_dir));
    let orchestrator = GenerationOrchestrator::new(Arc::new(SandboxRuntime), output);
    let use_case = GenerateArtifactsUseCase::new(discovery, Arc::new(orchestrator));

    let response = use_case
        .execute(GenerateArtifactsRequest { settings })
        .await?;
    Ok(response)
}
