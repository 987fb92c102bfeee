//! CLI module
//!
//! This module provides the command-line interface: the HTTP server, an
//! interactive chat session, and shell completions.

use std::io::{self, Write};
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use colored::Colorize;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::{
    api::{serve, Client, ClientConfig, CoreClient, HttpClientImpl, ServerConfig},
    bridge::{Bridge, BridgeConfig, GuardPolicy},
    controller::{Controller, SubmitOutcome},
    models::{ChatTurn, Role, Task},
    provider::{
        LlmProvider, OfflineProvider, OpenAiConfig, OpenAiProvider, DEFAULT_MODEL, OPENAI_API_URL,
    },
};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// API server URL
    #[arg(
        short,
        long,
        global = true,
        env = "TODO_AGENT_SERVER",
        default_value = "http://localhost:3000"
    )]
    server: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the command bridge HTTP server
    Serve {
        /// Address to bind
        #[arg(long, default_value = "127.0.0.1")]
        host: IpAddr,

        /// Port to listen on
        #[arg(short, long, default_value_t = 3000)]
        port: u16,

        #[command(flatten)]
        provider: ProviderArgs,
    },

    /// Start an interactive task-list session
    Chat {
        /// Run the bridge in-process instead of calling --server
        #[arg(long)]
        local: bool,

        #[command(flatten)]
        provider: ProviderArgs,
    },

    /// Generate shell completions
    Completions {
        /// The shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum ProviderKind {
    /// OpenAI Chat Completions
    Openai,
    /// Deterministic rule-based stand-in for local development
    Offline,
}

#[derive(Args, Clone, Debug)]
struct ProviderArgs {
    /// Model provider
    #[arg(long, value_enum, env = "TODO_AGENT_PROVIDER", default_value_t = ProviderKind::Openai)]
    provider: ProviderKind,

    /// Model name
    #[arg(long, env = "TODO_AGENT_MODEL", default_value = DEFAULT_MODEL)]
    model: String,

    /// Provider credential
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Chat Completions endpoint
    #[arg(long, default_value = OPENAI_API_URL)]
    api_url: String,

    /// Upper bound for one provider call, in seconds
    #[arg(long, default_value_t = 60)]
    timeout_secs: u64,

    /// Whether to reject lists that drop tasks the user did not ask to remove
    #[arg(long, value_enum, default_value_t = GuardArg::Strict)]
    guard: GuardArg,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum GuardArg {
    /// Reject lists that drop tasks without a removal request
    Strict,
    /// Accept any well-formed list
    Trust,
}

impl From<GuardArg> for GuardPolicy {
    fn from(arg: GuardArg) -> Self {
        match arg {
            GuardArg::Strict => GuardPolicy::Strict,
            GuardArg::Trust => GuardPolicy::Trust,
        }
    }
}

/// Run the CLI application
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match &cli.command {
        Commands::Serve {
            host,
            port,
            provider,
        } => {
            let bridge = build_bridge(provider)?;
            println!(
                "Starting todo agent server on {}:{} ({} / {})...",
                host,
                port,
                bridge.provider_name(),
                bridge.model()
            );

            let config = ServerConfig {
                address: SocketAddr::new(*host, *port),
            };
            serve(bridge, config).await?;
            Ok(())
        }

        Commands::Chat { local, provider } => {
            if *local {
                let bridge = build_bridge(provider)?;
                run_chat(Controller::new(CoreClient::new(bridge))).await
            } else {
                let client = HttpClientImpl::with_config(ClientConfig {
                    base_url: cli.server.clone(),
                });
                run_chat(Controller::new(client)).await
            }
        }

        Commands::Completions { shell } => {
            // Generate completions for the specified shell
            let mut cmd = Cli::command();
            let bin_name = cmd.get_name().to_string();
            generate(*shell, &mut cmd, bin_name, &mut io::stdout());
            Ok(())
        }
    }
}

fn build_bridge(args: &ProviderArgs) -> Result<Bridge, Box<dyn std::error::Error>> {
    let provider: Arc<dyn LlmProvider> = match args.provider {
        ProviderKind::Openai => {
            if args.api_key.is_none() {
                return Err("OPENAI_API_KEY is not set (use --provider offline to run without one)".into());
            }
            Arc::new(OpenAiProvider::new(OpenAiConfig {
                api_key: args.api_key.clone(),
                model: args.model.clone(),
                api_url: args.api_url.clone(),
                timeout: Duration::from_secs(args.timeout_secs),
            })?)
        }
        ProviderKind::Offline => Arc::new(OfflineProvider::new()),
    };

    Ok(Bridge::new(provider, BridgeConfig {
            guard: args.guard.into(),
        }))
}

async fn run_chat<C: Client>(mut controller: Controller<C>) -> Result<(), Box<dyn std::error::Error>> {
    for turn in controller.transcript() {
        print_turn(turn);
    }
    print_todos(controller.todos());
    println!("{}", "Type a command, /list to show tasks, /quit to leave.".dimmed());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("{} ", ">".bold());
        io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        match line.trim() {
            "/quit" | "/exit" => break,
            "/list" => {
                print_todos(controller.todos());
                continue;
            }
            _ => {}
        }

        controller.set_input(line);
        let outcome = controller.submit_input().await;
        if outcome == SubmitOutcome::Ignored {
            continue;
        }
        if let Some(turn) = controller.transcript().last() {
            print_turn(turn);
        }
        if outcome == SubmitOutcome::Updated {
            print_todos(controller.todos());
        }
    }

    Ok(())
}

fn print_turn(turn: &ChatTurn) {
    match turn.role {
        Role::User => println!("{} {}", "you:".blue().bold(), turn.content),
        Role::Assistant if turn.content.starts_with("Something went wrong") => {
            println!("{} {}", "agent:".red().bold(), turn.content.red())
        }
        Role::Assistant => println!("{} {}", "agent:".green().bold(), turn.content),
    }
}

fn print_todos(todos: &[Task]) {
    println!("\n{} ({} total)", "Current Tasks".bold(), todos.len());
    if todos.is_empty() {
        println!("  {}", "No tasks yet. Try 'add buy milk'.".dimmed());
    }
    for (i, task) in todos.iter().enumerate() {
        if task.completed {
            println!(
                "  {}. {} {}",
                i + 1,
                "✓".green(),
                task.text.strikethrough().dimmed()
            );
        } else {
            println!("  {}. {} {}", i + 1, "○".dimmed(), task.text);
        }
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider_args(args: &[&str]) -> ProviderArgs {
        let mut argv = vec!["todo-agent", "serve"];
        argv.extend_from_slice(args);
        match Cli::try_parse_from(argv).unwrap().command {
            Commands::Serve { provider, .. } => provider,
            _ => panic!("expected serve"),
        }
    }

    #[test]
    fn test_guard_flag_maps_to_policy() {
        assert_eq!(GuardPolicy::from(provider_args(&[]).guard), GuardPolicy::Strict);
        assert_eq!(
            GuardPolicy::from(provider_args(&["--guard", "trust"]).guard),
            GuardPolicy::Trust
        );
    }

    #[test]
    fn test_offline_bridge_needs_no_key() {
        let bridge = build_bridge(&provider_args(&["--provider", "offline", "--guard", "trust"])).unwrap();
        assert_eq!(bridge.provider_name(), "offline");
    }
}
