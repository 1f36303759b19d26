//! objacl command-line tool.
//!
//! Inspect and edit the access policy attached to stored objects, and run
//! access checks against them.
//! - `objacl put <object> <file>`: upload bytes (fs backend)
//! - `objacl get <object>`: print the attached policy
//! - `objacl set <object> <policy.json>`: attach/replace the policy
//! - `objacl check <object> <read|write> [--user <id>]`
//!
//! Exit codes: 0 allow/success, 1 deny, 2 error.
//! Each invocation is its own process, so the config must use the `fs`
//! backend. No group types are registered here, so group rules that get evaluated
//! fail with UNKNOWN_GROUP_TYPE.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

use objacl_core::error::{AclError, Result};
use objacl_core::policy::{decode_policy, encode_policy};
use objacl_core::Permission;
use objacl_engine::acl::GroupRegistry;
use objacl_engine::config::StorageBackend;
use objacl_engine::{app_state::AppState, config};

#[derive(Parser, Debug)]
#[command(name = "objacl", author, version, about, long_about = None)]
struct Args {
    /// Path to the YAML config
    #[arg(short, long, env = "OBJACL_CONFIG", default_value = "objacl.yaml")]
    config: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Upload a local file as an object (replaces bytes and clears its metadata)
    Put { object: String, file: PathBuf },
    /// Print the policy attached to an object
    Get { object: String },
    /// Attach a policy (JSON file) to an object, replacing any prior policy
    Set { object: String, policy: PathBuf },
    /// Check whether a user may read or write an object
    Check {
        object: String,
        permission: Permission,
        /// Requesting user id; omit for an anonymous check
        #[arg(short, long)]
        user: Option<String>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    match run(args).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(code = e.code().as_str(), error = %e, "objacl failed");
            eprintln!("{}: {e}", e.code().as_str());
            ExitCode::from(2)
        }
    }
}

async fn run(args: Args) -> Result<ExitCode> {
    let cfg = config::load_from_file(&args.config)?;
    if cfg.storage.backend == StorageBackend::Memory {
        return Err(AclError::BadRequest(format!(
            "{}: storage.backend must be fs; memory objects do not outlive one command",
            args.config
        )));
    }
    let state = AppState::new(cfg, GroupRegistry::new())?;

    match args.command {
        Command::Put { object, file } => {
            let data = tokio::fs::read(&file)
                .await
                .map_err(|e| AclError::Storage(format!("read {} failed: {e}", file.display())))?;
            let name = state.object_name(&object)?;
            state.bucket().put(&name, data).await?;
            println!("{name}");
            Ok(ExitCode::SUCCESS)
        }
        Command::Get { object } => match state.get_policy(&object).await? {
            Some(policy) => {
                println!("{}", encode_policy(&policy)?);
                Ok(ExitCode::SUCCESS)
            }
            None => {
                println!("null");
                Ok(ExitCode::SUCCESS)
            }
        },
        Command::Set { object, policy } => {
            let raw = tokio::fs::read_to_string(&policy)
                .await
                .map_err(|e| AclError::BadRequest(format!("read {} failed: {e}", policy.display())))?;
            let policy = decode_policy(&raw).map_err(|e| AclError::BadRequest(e.to_string()))?;
            state.set_policy(&object, &policy).await?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Check {
            object,
            permission,
            user,
        } => {
            let decision = state.decide(user.as_deref(), &object, permission).await?;
            println!("{} ({})", decision.outcome(), decision.reason());
            Ok(if decision.is_allowed() {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(1)
            })
        }
    }
}
