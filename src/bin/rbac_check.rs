//! rbac-check
//!
//! Evaluate one access request against a rule set from the command line

use anyhow::{bail, Context};
use clap::Parser;
use school_rbac::core::guard::action_for_method;
use school_rbac::{
    AccessConfig, MemoryRuleStore, PermissionEvaluator, RoleSet, RouteGuard, RuleStore,
};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "rbac-check")]
#[command(about = "Check a role/resource/action request against permission rules")]
struct Args {
    /// TOML access config (admin roles, mode, seed rules)
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// JSON rule file (array of {role, resource, action, is_allowed})
    #[arg(short = 'r', long)]
    rules: Option<PathBuf>,

    /// Raw role string, e.g. "GURU|WALI_KELAS"
    #[arg(long)]
    roles: String,

    /// Resource to check, e.g. "master.siswa"
    #[arg(long, conflicts_with = "path")]
    resource: Option<String>,

    /// URL path to derive the resource from, e.g. "/master/siswa"
    #[arg(long)]
    path: Option<String>,

    /// Action to check
    #[arg(short = 'a', long)]
    action: Option<String>,

    /// HTTP method used to derive the action when --action is absent
    #[arg(short = 'm', long, default_value = "GET")]
    method: String,
}

fn run(args: Args) -> anyhow::Result<bool> {
    let mut config = match &args.config {
        Some(path) => AccessConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => {
            let mut config = AccessConfig::default();
            config.apply_env_overrides()?;
            config
        }
    };

    if let Some(path) = &args.rules {
        let store = MemoryRuleStore::load_json(path)
            .with_context(|| format!("loading rules {}", path.display()))?;
        config.rules.extend(store.all()?);
    }

    let store = Arc::new(MemoryRuleStore::from_rules(config.rules.iter().cloned())?);
    let guard = RouteGuard::new(store.clone(), &config);
    let roles = RoleSet::parse_with(&args.roles, &config.admin_matcher());

    let resource = match (&args.resource, &args.path) {
        (Some(resource), _) => resource.clone(),
        (None, Some(path)) => guard.resource_for(path),
        (None, None) => bail!("either --resource or --path is required"),
    };
    let action = args
        .action
        .clone()
        .unwrap_or_else(|| action_for_method(&args.method).to_string());

    info!(
        "Checking {} on {} for [{}] (mode={})",
        action,
        resource,
        roles.names().join(", "),
        config.mode
    );

    let rules = store.rules_for_roles(&roles)?;
    let decision = PermissionEvaluator::new(config.mode).decide(&roles, &rules, &resource, &action);

    let verdict = if decision.is_allowed() { "ALLOW" } else { "DENY" };
    println!("{} {} {} ({})", verdict, action, resource, decision);

    Ok(decision.is_allowed())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(Args::parse()) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::from(2)
        }
    }
}
