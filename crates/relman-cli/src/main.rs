//! relman - release console for the job scheduler
//!
//! The `relman` command stages pending changes into a draft release package,
//! checks the package against an environment's sensitivity rules, and submits
//! it to the scheduler backend as one atomic release.
//!
//! ## Commands
//!
//! - `add`: stage a job / hierarchy / context / config-group / batch change
//! - `list`: show the staged items
//! - `remove` / `empty`: drop one staged item, or all of them
//! - `open` / `clone`: re-open a created package, or copy it into the draft
//! - `packages`: list packages created on a date
//! - `check`: run the environment sensitivity check
//! - `analyze`: dry-run the staged items against an environment
//! - `submit`: create the release package
//! - `rollback`: roll a released package back
//! - `groups`: browse the job-group hierarchy

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{warn, Level};

use relman_client::ConsoleClient;
use relman_core::{
    gate, hierarchy, package, AddOutcome, JobGroupService, PackageCreation, PackageName,
    PackageService, RecordStatus, ReferenceData, ReleaseEnvironment, ReleaseItem,
    ReleasePackageSubmitter, ReleaseWorkingSet, SensitivityGate,
};
use relman_store::{JsonFilePackageStore, MemoryPackageStore, PackageStore};

/// Console instances tagged with this channel may release production context
/// changes.
const APPROVED_CHANNEL_ENV_NAME: &str = "PREPROD-QUANT";

#[derive(Parser)]
#[command(name = "relman")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Release package console for the job scheduler", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    /// Directory holding the draft package store
    #[arg(long, global = true, env = "RELMAN_STORE_DIR", default_value = ".relman")]
    store_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Stage a change into the draft package
    Add {
        #[command(subcommand)]
        change: AddChange,
    },

    /// Show the staged items in display order
    List,

    /// Remove one staged item by the index shown by `list`
    Remove {
        /// Item index
        index: usize,
    },

    /// Drop every staged item and the draft's stored entry
    Empty,

    /// Re-open a created package and show its stored contents
    Open {
        /// Package name
        name: String,
    },

    /// Copy a created package's items into the draft
    Clone {
        /// Package name
        name: String,
    },

    /// List packages created on a date
    Packages {
        /// Creation date (default: today)
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Run the environment sensitivity check on the staged items
    Check {
        /// Target environment (Prod, PreProd, PreProdBlack, QTF, Uat)
        env: ReleaseEnvironment,
    },

    /// Dry-run the staged items against an environment
    Analyze {
        /// Target environment
        env: ReleaseEnvironment,

        /// Scope the analysis to an existing package
        #[arg(long)]
        package: Option<String>,
    },

    /// Create the release package from the staged items
    Submit {
        /// Target environment
        env: ReleaseEnvironment,

        /// Change ticket to link the package to
        #[arg(long)]
        jira: Option<String>,
    },

    /// Roll a released package back
    Rollback {
        /// Package name
        name: String,
    },

    /// Browse the job-group hierarchy
    Groups {
        /// Show only groups whose name contains this fragment
        fragment: Option<String>,
    },
}

#[derive(Subcommand)]
enum AddChange {
    /// Release a job definition into one or more hierarchy nodes
    Job {
        /// Job name
        name: String,

        /// Target hierarchy node(s)
        #[arg(short, long = "group", required = true)]
        groups: Vec<String>,

        /// Release the job into this context instead of its own
        #[arg(short, long)]
        context: Option<String>,

        /// Update job metadata only, without re-uploading the definition
        #[arg(long)]
        info_only: bool,
    },

    /// Move a job between hierarchy nodes
    MoveJob {
        /// Job name
        name: String,

        /// Hierarchy node(s) the job moves out of
        #[arg(long = "from", required = true)]
        sources: Vec<String>,

        /// Hierarchy node(s) the job moves into
        #[arg(long = "to", required = true)]
        targets: Vec<String>,
    },

    /// Remove a job from hierarchy nodes
    DeleteJob {
        /// Job name
        name: String,

        /// Hierarchy node(s) to remove the job from
        #[arg(short, long = "group", required = true)]
        groups: Vec<String>,
    },

    /// Create a hierarchy node or re-parent it
    Group {
        /// Hierarchy node name
        name: String,

        /// Parent node(s); omit to attach at the root
        #[arg(short, long = "parent")]
        parents: Vec<String>,

        /// Release the node itself without bundling its member jobs
        #[arg(long)]
        group_only: bool,

        /// Skip the hierarchy cycle check (offline use)
        #[arg(long)]
        skip_hierarchy_check: bool,
    },

    /// Move a hierarchy node under new parents
    MoveGroup {
        /// Hierarchy node name
        name: String,

        /// Parent node(s) to move under
        #[arg(short, long = "parent", required = true)]
        parents: Vec<String>,

        /// Release the node itself without bundling its member jobs
        #[arg(long)]
        group_only: bool,

        /// Skip the hierarchy cycle check (offline use)
        #[arg(long)]
        skip_hierarchy_check: bool,
    },

    /// Delete a hierarchy node
    DeleteGroup {
        /// Hierarchy node name
        name: String,
    },

    /// Release a job context definition
    Context {
        /// Context name
        name: String,
    },

    /// Release a configuration group
    ConfigGroup {
        /// Configuration group name
        name: String,

        /// Category, e.g. MARKET_DATA or AQS
        #[arg(short, long)]
        category: String,
    },

    /// Release a batch definition
    Batch {
        /// Batch name
        name: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    relman_core::init_tracing(cli.json, level);

    let draft_store = JsonFilePackageStore::new(&cli.store_dir);

    match cli.command {
        Commands::Add { change } => cmd_add(&draft_store, change).await,
        Commands::List => cmd_list(&draft_store),
        Commands::Remove { index } => cmd_remove(&draft_store, index),
        Commands::Empty => cmd_empty(&draft_store),
        Commands::Open { name } => cmd_open(&name).await,
        Commands::Clone { name } => cmd_clone(&draft_store, &name).await,
        Commands::Packages { date } => cmd_packages(date).await,
        Commands::Check { env } => cmd_check(&draft_store, env).await,
        Commands::Analyze { env, package } => {
            cmd_analyze(&draft_store, env, package.as_deref()).await
        }
        Commands::Submit { env, jira } => cmd_submit(&draft_store, env, jira.as_deref()).await,
        Commands::Rollback { name } => cmd_rollback(&name).await,
        Commands::Groups { fragment } => cmd_groups(fragment.as_deref()).await,
    }
}

fn load_draft(store: &dyn PackageStore) -> ReleaseWorkingSet {
    ReleaseWorkingSet::restore(PackageName::draft(), store)
}

/// Whether this console instance is the approved channel for production
/// context releases. An unreachable backend counts as not approved.
async fn approved_channel(client: &ConsoleClient) -> bool {
    match client.app_info().await {
        Ok(info) => info.env_name == APPROVED_CHANNEL_ENV_NAME,
        Err(err) => {
            warn!(error = %err, "app-info lookup failed; assuming unapproved channel");
            false
        }
    }
}

/// Refuse a re-parenting that would close a loop in the hierarchy snapshot.
/// A child missing from the snapshot is a new node and cannot cycle.
async fn ensure_no_cycle(client: &ConsoleClient, child: &str, parents: &[String]) -> Result<()> {
    let tree = client
        .job_group_list()
        .await
        .context("Failed to fetch the job-group tree for cycle validation")?;
    let reference = ReferenceData::new(tree, Vec::new());
    let Some(child_node) = reference.group_by_name(child) else {
        return Ok(());
    };
    for parent_name in parents {
        let parent = reference.group_by_name(parent_name);
        if hierarchy::would_create_cycle(&reference.job_groups, parent, child_node) {
            anyhow::bail!(
                "Re-parenting {} under {} would create a hierarchy cycle",
                child,
                parent_name
            );
        }
    }
    Ok(())
}

/// Stage one item, persisting the draft when the set changed.
fn stage(store: &dyn PackageStore, mut set: ReleaseWorkingSet, item: ReleaseItem) -> Result<()> {
    let summary = item.summary();
    match set.add(item) {
        AddOutcome::Added => {
            set.persist(store)?;
            println!("Added: {}", summary);
            println!("{} item(s) staged.", set.len());
        }
        AddOutcome::Merged => {
            set.persist(store)?;
            println!("Merged into existing entry.");
            println!("{} item(s) staged.", set.len());
        }
        AddOutcome::Rejected(reason) => {
            println!("Not staged: {}", reason);
        }
    }
    Ok(())
}

/// Stage a change into the draft package
async fn cmd_add(store: &JsonFilePackageStore, change: AddChange) -> Result<()> {
    let set = load_draft(store);

    let item = match change {
        AddChange::Job {
            name,
            groups,
            context,
            info_only,
        } => {
            if info_only {
                ReleaseItem::JobUpdateInfo {
                    name,
                    target_groups: groups,
                    target_context: context,
                    job_context: None,
                }
            } else {
                ReleaseItem::JobCreateOrUpdate {
                    name,
                    target_groups: groups,
                    target_context: context,
                    job_context: None,
                }
            }
        }
        AddChange::MoveJob {
            name,
            sources,
            targets,
        } => ReleaseItem::JobMove {
            name,
            source_groups: sources,
            target_groups: targets,
        },
        AddChange::DeleteJob { name, groups } => ReleaseItem::JobDelete {
            name,
            target_groups: groups,
        },
        AddChange::Group {
            name,
            parents,
            group_only,
            skip_hierarchy_check,
        } => {
            if !skip_hierarchy_check && !parents.is_empty() {
                let client = ConsoleClient::from_env();
                ensure_no_cycle(&client, &name, &parents).await?;
            }
            ReleaseItem::GroupCreateOrUpdate {
                name,
                parent_groups: parents,
                group_only,
            }
        }
        AddChange::MoveGroup {
            name,
            parents,
            group_only,
            skip_hierarchy_check,
        } => {
            if !skip_hierarchy_check {
                let client = ConsoleClient::from_env();
                ensure_no_cycle(&client, &name, &parents).await?;
            }
            ReleaseItem::GroupMove {
                name,
                target_groups: parents,
                group_only,
            }
        }
        AddChange::DeleteGroup { name } => ReleaseItem::GroupDelete { name },
        AddChange::Context { name } => ReleaseItem::ContextCreateOrUpdate { name },
        AddChange::ConfigGroup { name, category } => ReleaseItem::ConfigGroupCreateOrUpdate {
            name,
            category: category.as_str().into(),
        },
        AddChange::Batch { name } => ReleaseItem::BatchCreateOrUpdate { name },
    };

    stage(store, set, item)
}

/// Show the staged items in display order
fn cmd_list(store: &JsonFilePackageStore) -> Result<()> {
    let set = load_draft(store);
    if set.is_empty() {
        println!("No items staged. Use 'relman add' to stage changes.");
        return Ok(());
    }

    for (index, item) in set.display_order() {
        println!(
            "[{}] {} {} | {}",
            index,
            item.entity_type(),
            item.action(),
            item.summary()
        );
    }
    println!("{} item(s) staged.", set.len());
    Ok(())
}

/// Remove one staged item by index
fn cmd_remove(store: &JsonFilePackageStore, index: usize) -> Result<()> {
    let mut set = load_draft(store);
    let removed = set
        .remove_at(index)
        .with_context(|| format!("Failed to remove item {}", index))?;
    set.persist(store)?;
    println!("Removed: {}", removed.summary());
    println!("{} item(s) staged.", set.len());
    Ok(())
}

/// Drop every staged item and the draft's stored entry
fn cmd_empty(store: &JsonFilePackageStore) -> Result<()> {
    let set = load_draft(store);
    let count = set.len();
    store.remove(PackageName::DRAFT_KEY)?;
    println!("Emptied the draft package ({} item(s) dropped).", count);
    Ok(())
}

/// Re-open a created package and show its stored contents
async fn cmd_open(name: &str) -> Result<()> {
    let client = ConsoleClient::from_env();
    let session_store = MemoryPackageStore::new();
    let (set, detail) = package::open_package(&client, &session_store, name).await?;

    println!("Package:  {}", detail.name);
    if let Some(created) = &detail.create_time {
        println!("Created:  {}", created);
    }
    if let Some(owner) = &detail.owner {
        println!("Owner:    {}", owner);
    }
    if let Some(url) = &detail.cr_tool_url {
        println!("CR tool:  {}", url);
    }

    if set.is_empty() {
        println!("No re-stageable items in this package.");
        return Ok(());
    }
    println!();
    for (index, item) in set.display_order() {
        println!(
            "[{}] {} {} | {}",
            index,
            item.entity_type(),
            item.action(),
            item.summary()
        );
    }
    Ok(())
}

/// Copy a created package's items into the draft
async fn cmd_clone(store: &JsonFilePackageStore, name: &str) -> Result<()> {
    let client = ConsoleClient::from_env();
    let set = package::clone_into_draft(&client, store, name).await?;
    println!("Cloned {} into the draft ({} item(s)).", name, set.len());
    Ok(())
}

/// List packages created on a date
async fn cmd_packages(date: Option<NaiveDate>) -> Result<()> {
    let date = date.unwrap_or_else(|| chrono::Local::now().date_naive());
    let client = ConsoleClient::from_env();
    let summaries = client.list_packages(date).await?;

    if summaries.is_empty() {
        println!("No packages created on {}.", date);
        return Ok(());
    }
    for summary in summaries {
        println!(
            "{}  {}  {}",
            summary.name,
            summary.version.as_deref().unwrap_or("-"),
            summary.create_time.as_deref().unwrap_or("-"),
        );
    }
    Ok(())
}

fn print_outcome(outcome: &gate::GateOutcome) {
    if let Some(report) = &outcome.report {
        if !report.contexts.is_empty() {
            println!("Context changes: {}", report.contexts.join(", "));
        }
        for (group, parameters) in &report.config_groups {
            println!("Sensitive config group: {}", group);
            for (parameter, value) in parameters {
                println!("    {} = {}", parameter, value);
            }
        }
        for (system, uri) in &report.execution_systems {
            println!("Sensitive execution system: {} -> {}", system, uri);
        }
        if report.none_sensitive {
            println!("Backend reports nothing sensitive for {}.", report.env);
        }
    }

    if outcome.allowed() {
        println!("Submission allowed for {}.", outcome.env);
    } else {
        println!("Submission blocked for {}:", outcome.env);
        for violation in &outcome.verdict.violations {
            println!("  - {}", violation.reason);
        }
    }
}

/// Run the environment sensitivity check on the staged items
async fn cmd_check(store: &JsonFilePackageStore, env: ReleaseEnvironment) -> Result<()> {
    let set = load_draft(store);
    let client = ConsoleClient::from_env();
    let approved = approved_channel(&client).await;

    let outcome = gate::evaluate(&client, env, &set, approved).await?;
    print_outcome(&outcome);
    Ok(())
}

/// Dry-run the staged items against an environment
async fn cmd_analyze(
    store: &JsonFilePackageStore,
    env: ReleaseEnvironment,
    package_name: Option<&str>,
) -> Result<()> {
    let set = load_draft(store);
    if set.is_empty() {
        anyhow::bail!("Nothing staged to analyze.");
    }

    let client = ConsoleClient::from_env();
    let payload = relman_core::to_wire(set.items());
    let report = client.analyze(env, &payload, package_name).await?;

    for (entity, messages) in &report.errors {
        for message in messages {
            println!("ERROR  {}: {}", entity, message);
        }
    }
    for (entity, messages) in &report.warnings {
        for message in messages {
            println!("WARN   {}: {}", entity, message);
        }
    }
    for (entity, messages) in &report.infos {
        for message in messages {
            println!("INFO   {}: {}", entity, message);
        }
    }
    if report.is_clean() {
        println!("Analysis clean for {}.", env);
    }
    Ok(())
}

/// Create the release package from the staged items
async fn cmd_submit(
    store: &JsonFilePackageStore,
    env: ReleaseEnvironment,
    jira_key: Option<&str>,
) -> Result<()> {
    let set = load_draft(store);
    let client = ConsoleClient::from_env();
    let approved = approved_channel(&client).await;

    let mut gate_state = SensitivityGate::new();
    gate_state.select_environment(Some(env));
    let outcome = gate::evaluate(&client, env, &set, approved).await?;
    print_outcome(&outcome);

    if gate_state.record(outcome) != RecordStatus::Applied {
        anyhow::bail!("Sensitivity outcome went stale before submission.");
    }
    if !gate_state.outcome().map(|o| o.allowed()).unwrap_or(false) {
        anyhow::bail!("The sensitivity gate blocked this release.");
    }

    let submitter = ReleasePackageSubmitter::new(client);
    let creation = submitter
        .submit(&gate_state, env, &set, jira_key, store)
        .await?;

    match creation {
        PackageCreation::Created(created) => {
            println!("Created package version {}.", created.version);
            println!("Artifact: {}", created.artifact_version);
            if let Some(jira) = &created.jira_key {
                println!("JIRA:     {}", jira);
            }
            if let Some(url) = &created.cr_tool_url {
                println!("CR tool:  {}", url);
            }
            if set.is_draft() {
                println!("Draft package cleared.");
            }
            Ok(())
        }
        PackageCreation::Failed { message } => {
            anyhow::bail!("Package creation rejected: {}", message)
        }
    }
}

/// Roll a released package back
async fn cmd_rollback(name: &str) -> Result<()> {
    let client = ConsoleClient::from_env();
    let outcome = client.rollback(name).await?;

    for entry in &outcome.log_entries {
        println!("{}", entry);
    }
    if outcome.succeeded {
        println!("Rolled back {}.", name);
        Ok(())
    } else {
        anyhow::bail!("Rollback of {} failed.", name)
    }
}

/// Browse the job-group hierarchy
async fn cmd_groups(fragment: Option<&str>) -> Result<()> {
    let client = ConsoleClient::from_env();
    let tree = client.job_group_list().await?;
    let reference = ReferenceData::new(tree, Vec::new());

    let nodes: Vec<_> = match fragment {
        Some(fragment) => reference.suggest_groups(fragment),
        None => reference.job_groups.iter().collect(),
    };

    if nodes.is_empty() {
        println!("No matching job groups.");
        return Ok(());
    }
    for node in nodes {
        let parent = node
            .parent_id
            .and_then(|id| reference.job_groups.iter().find(|n| n.id == id))
            .map(|n| n.name.as_str())
            .unwrap_or("Root");
        println!("{:>6}  {}  (parent: {})", node.id, node.name, parent);
    }
    Ok(())
}
