// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use clap::{Parser, Subcommand};

use cao::client::{Client, ClientError};
use cao::Config;

/// Orchestrator for multiple interactive AI developer agents.
#[derive(Parser)]
#[command(name = "cao", version, about)]
struct Cli {
    #[command(flatten)]
    config: Config,

    #[command(subcommand)]
    subcommand: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Host the control plane (the default when no subcommand is given).
    Serve,
    /// Launch a new agent terminal and print its id.
    Launch {
        agent: String,
        #[arg(long)]
        provider: Option<String>,
        #[arg(long)]
        cwd: Option<String>,
        #[arg(long, default_value = "http://127.0.0.1:9889")]
        server: String,
    },
    /// List every managed terminal ("the team").
    Team {
        #[arg(long, default_value = "http://127.0.0.1:9889")]
        server: String,
    },
    /// Kill one terminal, or every terminal with `--all`.
    Shutdown {
        id: Option<String>,
        #[arg(long)]
        all: bool,
        #[arg(long, default_value = "http://127.0.0.1:9889")]
        server: String,
    },
    /// Install an agent profile markdown file into the profiles directory.
    Install {
        path: std::path::PathBuf,
        #[command(flatten)]
        config: Config,
    },
    /// Flow management subcommands.
    Flow {
        #[command(subcommand)]
        action: FlowAction,
        #[arg(long, default_value = "http://127.0.0.1:9889", global = true)]
        server: String,
    },
}

#[derive(Subcommand)]
enum FlowAction {
    /// Create or replace a flow from a flow file on disk.
    Create { path: std::path::PathBuf },
    /// List known flows.
    List,
    /// Trigger an immediate off-schedule run.
    Run { name: String },
    Enable { name: String },
    Disable { name: String },
    Rm { name: String },
}

/// Exit codes for CLI front-ends: 0 success, 1 generic failure,
/// 2 invalid usage, 3 server unreachable, 4 resource not found.
fn exit_code_for(err: &ClientError) -> i32 {
    match err {
        ClientError::Unreachable(_) => 3,
        ClientError::Api(e) if e.kind == cao::error::ErrorCode::NotFound => 4,
        ClientError::Api(_) => 1,
    }
}

fn fail(err: ClientError) -> ! {
    eprintln!("error: {err}");
    std::process::exit(exit_code_for(&err));
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    match cli.subcommand {
        None | Some(Commands::Serve) => {
            if let Err(e) = cli.config.validate() {
                eprintln!("error: {e}");
                std::process::exit(2);
            }
            if let Err(e) = cao::serve(cli.config).await {
                eprintln!("fatal: {e:#}");
                std::process::exit(1);
            }
        }
        Some(Commands::Launch { agent, provider, cwd, server }) => {
            let client = Client::new(server);
            match client.launch(&agent, provider.as_deref(), cwd.as_deref()).await {
                Ok(resp) => println!("{} {} {}", resp.id, resp.session_name, resp.status),
                Err(e) => fail(e),
            }
        }
        Some(Commands::Team { server }) => {
            let client = Client::new(server);
            match client.list_terminals().await {
                Ok(terminals) => {
                    for t in terminals {
                        println!("{} {} {}", t["id"].as_str().unwrap_or("?"), t["agent_profile"].as_str().unwrap_or("?"), t["status"].as_str().unwrap_or("?"));
                    }
                }
                Err(e) => fail(e),
            }
        }
        Some(Commands::Shutdown { id, all, server }) => {
            let client = Client::new(server);
            let result = match (id, all) {
                (Some(id), false) => client.shutdown_one(&id).await,
                (None, true) => client.shutdown_all().await,
                _ => {
                    eprintln!("error: specify exactly one of <ID> or --all");
                    std::process::exit(2);
                }
            };
            if let Err(e) = result {
                fail(e);
            }
        }
        Some(Commands::Install { path, config }) => {
            let profiles_dir = config.profiles_dir();
            if let Err(e) = std::fs::create_dir_all(&profiles_dir) {
                eprintln!("error: {e}");
                std::process::exit(1);
            }
            let Some(name) = path.file_name() else {
                eprintln!("error: profile path has no file name");
                std::process::exit(2);
            };
            if let Err(e) = std::fs::copy(&path, profiles_dir.join(name)) {
                eprintln!("error: {e}");
                std::process::exit(1);
            }
        }
        Some(Commands::Flow { action, server }) => {
            let client = Client::new(server);
            let result: Result<(), ClientError> = async {
                match action {
                    FlowAction::Create { path } => {
                        let contents = std::fs::read_to_string(&path).map_err(|e| {
                            eprintln!("error: {e}");
                            std::process::exit(1)
                        })?;
                        let resp = client.create_flow(&contents).await?;
                        println!("{}", resp["name"].as_str().unwrap_or("?"));
                        Ok(())
                    }
                    FlowAction::List => {
                        for f in client.list_flows().await? {
                            println!(
                                "{} {} {}",
                                f["name"].as_str().unwrap_or("?"),
                                f["schedule"].as_str().unwrap_or("?"),
                                f["enabled"]
                            );
                        }
                        Ok(())
                    }
                    FlowAction::Run { name } => {
                        let resp = client.run_flow(&name).await?;
                        println!("{}", resp["terminal_id"].as_str().unwrap_or("?"));
                        Ok(())
                    }
                    FlowAction::Enable { name } => client.set_flow_enabled(&name, true).await,
                    FlowAction::Disable { name } => client.set_flow_enabled(&name, false).await,
                    FlowAction::Rm { name } => client.delete_flow(&name).await,
                }
            }
            .await;
            if let Err(e) = result {
                fail(e);
            }
        }
    }
}
