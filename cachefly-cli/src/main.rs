mod config;
mod display;
mod operations;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use colored::Colorize;

use cachefly_core::diagnostics::Diagnostics;
use cachefly_core::interpreter::{ApplyOutcome, ApplyResult, Interpreter, InterpreterConfig};
use cachefly_core::provider::Provider;
use cachefly_core::resource::{ResourceId, State};
use cachefly_provider::CacheflyProvider;
use cachefly_state::{LocalBackend, LockInfo, StateBackend, StateFile};

use config::{ConfigFile, DEFAULT_CONFIG_FILE};
use display::{failure_diagnostics, format_outcome, print_diagnostics, print_plan};

#[derive(Parser)]
#[command(name = "cachefly")]
#[command(about = "Manage CacheFly origins and certificates", long_about = None)]
struct Cli {
    /// Path to the configuration file
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Path to the state file
    #[arg(long, global = true, default_value = LocalBackend::DEFAULT_STATE_FILE)]
    state: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate the configuration file against the provider schemas
    Validate,
    /// Show execution plan without applying changes
    Plan,
    /// Apply changes to reach the desired state
    Apply {
        /// Skip confirmation prompt (auto-approve)
        #[arg(long)]
        auto_approve: bool,
    },
    /// Update the state file from the remote objects
    Refresh,
    /// Bring an existing remote object under management
    Import {
        /// Resource type (e.g., cachefly_origin)
        resource_type: String,
        /// Name of the resource block
        name: String,
        /// Remote identifier
        id: String,
    },
    /// Destroy every resource in the state file
    Destroy {
        /// Skip confirmation prompt (auto-approve)
        #[arg(long)]
        auto_approve: bool,
    },
    /// Read data sources and print the results as JSON
    Data,
    /// Print the provider, resource and data source schemas as JSON
    Schema,
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::new().filter_or("CACHEFLY_LOG", "warn")).init();

    let cli = Cli::parse();
    let backend = LocalBackend::with_path(&cli.state);

    let result = match cli.command {
        Commands::Validate => run_validate(&cli.config),
        Commands::Plan => run_plan(&cli.config, &backend).await,
        Commands::Apply { auto_approve } => run_apply(&cli.config, &backend, auto_approve).await,
        Commands::Refresh => run_refresh(&cli.config, &backend).await,
        Commands::Import {
            resource_type,
            name,
            id,
        } => run_import(&cli.config, &backend, ResourceId::new(resource_type, name), &id).await,
        Commands::Destroy { auto_approve } => {
            run_destroy(&cli.config, &backend, auto_approve).await
        }
        Commands::Data => run_data(&cli.config).await,
        Commands::Schema => run_schema(),
    };

    if let Err(e) = result {
        eprintln!("{} {}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

/// Load and validate the configuration file
fn load_config(path: &Path) -> Result<ConfigFile, String> {
    let config = ConfigFile::load(path)?;
    operations::validate_config(
        &CacheflyProvider::new(),
        &config.provider_attributes()?,
        &config.resources()?,
        &config.data_sources()?,
    )?;
    Ok(config)
}

/// Provider with a client configured from the provider block
async fn configure_provider(config: &ConfigFile) -> Result<CacheflyProvider, String> {
    let mut provider = CacheflyProvider::new();
    let mut diags = Diagnostics::new();
    provider
        .configure(&mut diags, &config.provider_attributes()?)
        .await;
    print_diagnostics(&diags);
    if diags.has_error() {
        return Err("Provider configuration failed".to_string());
    }
    Ok(provider)
}

async fn read_state(backend: &LocalBackend) -> Result<StateFile, String> {
    Ok(backend
        .read_state()
        .await
        .map_err(|e| e.to_string())?
        .unwrap_or_default())
}

async fn write_state(backend: &LocalBackend, state: &mut StateFile) -> Result<(), String> {
    state.increment_serial();
    backend.write_state(state).await.map_err(|e| e.to_string())
}

async fn acquire_lock(backend: &LocalBackend, operation: &str) -> Result<LockInfo, String> {
    backend
        .acquire_lock(operation)
        .await
        .map_err(|e| format!("Failed to acquire state lock: {}", e))
}

/// Release the lock, keeping the command's own error if it already failed
async fn release_lock(
    backend: &LocalBackend,
    lock: &LockInfo,
    result: Result<(), String>,
) -> Result<(), String> {
    let released = backend
        .release_lock(lock)
        .await
        .map_err(|e| format!("Failed to release state lock {}: {}", lock.id, e));
    result.and(released)
}

/// Refresh every resource in state, failing if any read reported an error
async fn refresh_current(
    provider: &CacheflyProvider,
    state: &StateFile,
) -> Result<Vec<State>, String> {
    let mut diags = Diagnostics::new();
    let current = operations::refresh(provider, state, &mut diags).await?;
    print_diagnostics(&diags);
    if diags.has_error() {
        return Err("Failed to refresh state".to_string());
    }
    Ok(current)
}

fn confirm(question: &str, hint: &str) -> Result<bool, String> {
    println!("{}", question.yellow().bold());
    println!("  {}", hint.yellow());
    print!("\n  Enter a value: ");
    std::io::Write::flush(&mut std::io::stdout()).map_err(|e| e.to_string())?;

    let mut input = String::new();
    std::io::stdin()
        .read_line(&mut input)
        .map_err(|e| e.to_string())?;
    println!();
    Ok(input.trim() == "yes")
}

fn print_apply_result(result: &ApplyResult, verb: &str, noun: &str) {
    let mut applied = 0;
    for outcome in &result.outcomes {
        match outcome {
            Ok(ApplyOutcome::Unchanged { .. }) => {}
            Ok(outcome) => {
                println!("  {} {}", "✓".green(), format_outcome(outcome));
                applied += 1;
            }
            Err(e) => println!("  {} {}", "✗".red(), e),
        }
    }
    println!();
    print_diagnostics(&result.warnings);
    print_diagnostics(&failure_diagnostics(result));

    if result.is_success() {
        println!(
            "{}",
            format!("{} complete! {} {}.", verb, applied, noun)
                .green()
                .bold()
        );
    } else {
        println!(
            "{}",
            format!(
                "{} failed. {} succeeded, {} failed.",
                verb, applied, result.failure_count
            )
            .red()
            .bold()
        );
    }
}

fn run_validate(config_path: &Path) -> Result<(), String> {
    println!("{}", "Validating...".cyan());

    let config = load_config(config_path)?;

    println!(
        "{}",
        format!(
            "✓ {} resources and {} data sources validated successfully.",
            config.resources.len(),
            config.data.len()
        )
        .green()
        .bold()
    );
    for block in &config.resources {
        println!("  • {}.{}", block.block_type, block.name);
    }
    for block in &config.data {
        println!("  • data {}.{}", block.block_type, block.name);
    }

    Ok(())
}

async fn run_plan(config_path: &Path, backend: &LocalBackend) -> Result<(), String> {
    let config = load_config(config_path)?;
    let provider = configure_provider(&config).await?;

    let state = read_state(backend).await?;
    let current = refresh_current(&provider, &state).await?;
    let plan = operations::build_plan(&provider, &config.resources()?, &current)?;

    print_plan(&plan, &operations::resource_schemas(&provider));
    Ok(())
}

async fn run_apply(
    config_path: &Path,
    backend: &LocalBackend,
    auto_approve: bool,
) -> Result<(), String> {
    let config = load_config(config_path)?;
    let provider = configure_provider(&config).await?;

    let lock = acquire_lock(backend, "apply").await?;
    let result = apply_locked(&config, &provider, backend, auto_approve).await;
    release_lock(backend, &lock, result).await
}

async fn apply_locked(
    config: &ConfigFile,
    provider: &CacheflyProvider,
    backend: &LocalBackend,
    auto_approve: bool,
) -> Result<(), String> {
    let mut state = read_state(backend).await?;
    let current = refresh_current(provider, &state).await?;
    for refreshed in &current {
        state.record(refreshed);
    }

    let plan = operations::build_plan(provider, &config.resources()?, &current)?;
    print_plan(&plan, &operations::resource_schemas(provider));
    if plan.mutation_count() == 0 {
        return write_state(backend, &mut state).await;
    }
    println!();

    if !auto_approve
        && !confirm(
            "Do you want to perform these actions?",
            "Only 'yes' will be accepted to approve.",
        )?
    {
        println!("{}", "Apply cancelled.".yellow());
        return Ok(());
    }

    println!("{}", "Applying changes...".cyan().bold());
    println!();

    let result = Interpreter::new(provider).apply(&plan).await;
    operations::record_outcomes(&mut state, &result);
    write_state(backend, &mut state).await?;

    print_apply_result(&result, "Apply", "changes applied");
    if result.is_success() {
        Ok(())
    } else {
        Err(format!("{} changes failed", result.failure_count))
    }
}

async fn run_refresh(config_path: &Path, backend: &LocalBackend) -> Result<(), String> {
    let config = load_config(config_path)?;
    let provider = configure_provider(&config).await?;

    let lock = acquire_lock(backend, "refresh").await?;
    let result: Result<(), String> = async {
        let mut state = read_state(backend).await?;
        let current = refresh_current(&provider, &state).await?;
        let mut removed = 0;
        for refreshed in &current {
            if !refreshed.exists {
                println!("  {} {} no longer exists", "-".red(), refreshed.id);
                removed += 1;
            }
            state.record(refreshed);
        }
        write_state(backend, &mut state).await?;
        println!(
            "{}",
            format!(
                "Refresh complete! {} resources in state, {} removed.",
                state.resources.len(),
                removed
            )
            .green()
            .bold()
        );
        Ok(())
    }
    .await;
    release_lock(backend, &lock, result).await
}

async fn run_import(
    config_path: &Path,
    backend: &LocalBackend,
    id: ResourceId,
    remote_id: &str,
) -> Result<(), String> {
    let config = load_config(config_path)?;
    let provider = configure_provider(&config).await?;
    let handler = provider.resource(&id.resource_type).map_err(|e| e.to_string())?;

    let lock = acquire_lock(backend, "import").await?;
    let result: Result<(), String> = async {
        let mut state = read_state(backend).await?;
        if state.find(&id).is_some() {
            return Err(format!("Resource {} is already managed", id));
        }

        println!("{}", format!("Importing {} ({})...", id, remote_id).cyan());
        let mut diags = Diagnostics::new();
        let imported = handler.import(&mut diags, &id, remote_id).await;
        print_diagnostics(&diags);

        match imported {
            Some(imported) if imported.exists && !diags.has_error() => {
                state.record(&imported);
                write_state(backend, &mut state).await?;
                println!("{}", "Import successful!".green().bold());
                Ok(())
            }
            _ => Err(format!("Failed to import {}", id)),
        }
    }
    .await;
    release_lock(backend, &lock, result).await
}

async fn run_destroy(
    config_path: &Path,
    backend: &LocalBackend,
    auto_approve: bool,
) -> Result<(), String> {
    let config = load_config(config_path)?;
    let provider = configure_provider(&config).await?;

    let lock = acquire_lock(backend, "destroy").await?;
    let result = destroy_locked(&provider, backend, auto_approve).await;
    release_lock(backend, &lock, result).await
}

async fn destroy_locked(
    provider: &CacheflyProvider,
    backend: &LocalBackend,
    auto_approve: bool,
) -> Result<(), String> {
    let mut state = read_state(backend).await?;
    let current = refresh_current(provider, &state).await?;
    for refreshed in &current {
        state.record(refreshed);
    }

    let plan = operations::build_destroy_plan(&current);
    if plan.is_empty() {
        write_state(backend, &mut state).await?;
        println!("{}", "No resources to destroy.".green());
        return Ok(());
    }

    println!("{}", "The following resources will be destroyed:".red().bold());
    println!();
    for change in plan.changes() {
        println!("  {} {}", "-".red().bold(), change.id);
    }
    println!();
    println!("{}", plan.summary());
    println!();

    if !auto_approve
        && !confirm(
            "Do you really want to destroy all resources?",
            "This action cannot be undone. Type 'yes' to confirm.",
        )?
    {
        println!("{}", "Destroy cancelled.".yellow());
        return Ok(());
    }

    println!("{}", "Destroying resources...".red().bold());
    println!();

    let result = Interpreter::new(provider)
        .with_config(InterpreterConfig {
            continue_on_error: true,
            ..Default::default()
        })
        .apply(&plan)
        .await;
    operations::record_outcomes(&mut state, &result);
    write_state(backend, &mut state).await?;

    print_apply_result(&result, "Destroy", "resources destroyed");
    if result.is_success() {
        Ok(())
    } else {
        Err(format!("{} resources could not be destroyed", result.failure_count))
    }
}

async fn run_data(config_path: &Path) -> Result<(), String> {
    let config = load_config(config_path)?;
    let provider = configure_provider(&config).await?;

    let mut diags = Diagnostics::new();
    let result = operations::read_data_sources(&provider, &config.data_sources()?, &mut diags).await;
    print_diagnostics(&diags);

    let output = serde_json::to_string_pretty(&result?).map_err(|e| e.to_string())?;
    println!("{}", output);
    Ok(())
}

fn run_schema() -> Result<(), String> {
    let provider = CacheflyProvider::new();
    let resources: BTreeMap<String, _> = provider
        .resources()
        .iter()
        .map(|r| (r.type_name(), r.schema()))
        .collect();
    let data_sources: BTreeMap<String, _> = provider
        .data_sources()
        .iter()
        .map(|d| (d.type_name(), d.schema()))
        .collect();

    let output = serde_json::to_string_pretty(&serde_json::json!({
        "provider": provider.schema(),
        "resources": resources,
        "data_sources": data_sources,
    }))
    .map_err(|e| e.to_string())?;
    println!("{}", output);
    Ok(())
}
