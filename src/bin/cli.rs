use std::fs;
use std::io::Read as _;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Deserialize;

use courtside_rules::{AccessRequest, Decision, Document, Identity, Operation, Role, RulesEngine};

#[derive(Parser, Debug)]
#[command(author, version, about = "courtside rules simulator", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Evaluate one access request from a JSON file (or stdin when omitted)
    Check { file: Option<PathBuf> },
    /// List the collections with a registered policy
    Collections,
}

/// JSON shape for `check`:
/// {
///   "collection": "messages",
///   "operation": "create",
///   "documentId": "m1",
///   "principal": { "uid": "alice", "role": "user" },
///   "existing": { ... },
///   "proposed": { ... }
/// }
/// Omit `principal` for an unauthenticated caller; omit `role` for a
/// caller with no user document.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CheckRequest {
    collection: String,
    operation: Operation,
    document_id: String,
    principal: Option<CliPrincipal>,
    existing: Option<Document>,
    proposed: Option<Document>,
}

#[derive(Debug, Deserialize)]
struct CliPrincipal {
    uid: String,
    role: Option<Role>,
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Check { file } => {
            let raw = match file {
                Some(path) => fs::read_to_string(&path)
                    .with_context(|| format!("failed to read {}", path.display()))?,
                None => {
                    let mut buf = String::new();
                    std::io::stdin()
                        .read_to_string(&mut buf)
                        .context("failed to read request from stdin")?;
                    buf
                }
            };
            let request: CheckRequest =
                serde_json::from_str(&raw).context("invalid access request JSON")?;

            let identity = match request.principal {
                Some(p) => Identity::with_role(p.uid, p.role),
                None => Identity::unauthenticated(),
            };
            let engine = RulesEngine::new();
            let decision = engine.evaluate(
                &AccessRequest {
                    collection: &request.collection,
                    operation: request.operation,
                    document_id: &request.document_id,
                    existing: request.existing.as_ref(),
                    proposed: request.proposed.as_ref(),
                },
                &identity,
            );

            match decision {
                Decision::Allow => println!("allow"),
                Decision::Deny => {
                    println!("deny");
                    std::process::exit(2);
                }
            }
        }
        Commands::Collections => {
            let engine = RulesEngine::new();
            let mut names: Vec<&str> = engine.collections().collect();
            names.sort_unstable();
            for name in names {
                println!("{name}");
            }
        }
    }

    Ok(())
}

fn init_tracing() {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let fmt_layer = tracing_subscriber::fmt::layer().with_target(false);
    let filter_layer = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .init();
}
