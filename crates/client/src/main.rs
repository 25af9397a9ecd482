//! `sentinai` command-line client.
//!
//! Each invocation is one session: the credential lives only in this process,
//! so every command signs in first with the supplied GitHub token.

use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use sentinai_client::config::DEFAULT_API_URL;
use sentinai_client::dashboard;
use sentinai_client::{
    AccessGate, ApiClient, CancellationToken, ClientConfig, GateView, LoggingNavigator,
    SessionController, TokenStore,
};
use sentinai_core::{NewProject, ProjectId};
use serde::Serialize;

#[derive(Debug, Parser)]
#[command(name = "sentinai", about = "Sentinai dashboard client")]
struct Cli {
    /// API base URL.
    #[arg(long, env = "SENTINAI_API_URL", default_value = DEFAULT_API_URL)]
    api_url: String,

    /// GitHub access token exchanged for a session on every run.
    #[arg(long, env = "SENTINAI_GITHUB_TOKEN", global = true, hide_env_values = true)]
    github_token: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Check that the API is reachable.
    Health,
    /// Sign in and print the resolved identity.
    Login,
    /// List projects.
    Projects,
    /// Register a repository as a project.
    CreateProject {
        name: String,
        repository_url: String,
    },
    /// Delete a project.
    DeleteProject { id: ProjectId },
    /// Show a project and its pipelines.
    Project { id: ProjectId },
    /// List a project's pipelines, newest first.
    Pipelines { id: ProjectId },
    /// Generate a CI pipeline for a project.
    GenerateCi { id: ProjectId },
    /// Show security findings, newest first.
    Security {
        /// Limit to one project.
        #[arg(long)]
        project: Option<ProjectId>,
    },
    /// Run a security scan on a project.
    Scan { id: ProjectId },
    /// Headline counts.
    Dashboard,
}

#[tokio::main]
async fn main() -> Result<()> {
    sentinai_observability::init_pretty();

    let cli = Cli::parse();

    let config = ClientConfig::new(cli.api_url).context("invalid --api-url")?;
    let api = ApiClient::new(config, TokenStore::new(), Arc::new(LoggingNavigator));

    if let Command::Health = cli.command {
        if api.health().await {
            println!("ok");
            return Ok(());
        }
        bail!("API at {} is unreachable", api.config().api_url());
    }

    let session = SessionController::new(api.clone());
    let Some(github_token) = cli.github_token else {
        bail!("a GitHub token is required (--github-token or SENTINAI_GITHUB_TOKEN)");
    };
    session
        .sign_in_with_github(&github_token)
        .await
        .map_err(|e| anyhow::anyhow!("sign-in failed: {}", e.message()))?;

    let gate = AccessGate::new(session);
    let user = match gate.guard(|user| user.clone()).await {
        GateView::Render(user) => user,
        GateView::Redirected | GateView::Waiting => bail!("not signed in"),
    };
    tracing::info!(username = %user.username, "signed in");

    match cli.command {
        // Answered before sign-in.
        Command::Health => {}
        Command::Login => print_json(&user)?,
        Command::Projects => print_json(&api.list_projects().await?)?,
        Command::CreateProject {
            name,
            repository_url,
        } => {
            let created = api
                .create_project(&NewProject::new(name, repository_url))
                .await?;
            match created {
                Some(project) => print_json(&project)?,
                None => print_json(&api.list_projects().await?)?,
            }
        }
        Command::DeleteProject { id } => {
            api.delete_project(id).await?;
            println!("deleted {id}");
        }
        Command::Project { id } => print_json(&dashboard::project_detail(&api, id).await?)?,
        Command::Pipelines { id } => {
            let mut pipelines = api.list_pipelines(id).await?;
            sentinai_core::sort_newest_first(&mut pipelines);
            print_json(&pipelines)?;
        }
        Command::GenerateCi { id } => match api.generate_ci(id).await? {
            Some(pipeline) => print_json(&pipeline)?,
            None => print_json(&api.list_pipelines(id).await?)?,
        },
        Command::Security { project: Some(id) } => {
            let mut findings = api.list_project_findings(id).await?;
            sentinai_core::sort_newest_first(&mut findings);
            print_json(&findings)?;
        }
        Command::Security { project: None } => {
            let cancel = CancellationToken::new();
            let on_interrupt = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    on_interrupt.cancel();
                }
            });
            print_json(&dashboard::security_overview(&api, &cancel).await?)?;
        }
        Command::Scan { id } => print_json(&api.run_security_scan(id).await?)?,
        Command::Dashboard => print_json(&dashboard::dashboard_summary(&api).await?)?,
    }

    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
