use crate::infra::{load_records, load_snapshot, resolve_rules};
use chrono::{DateTime, Utc};
use clap::{Args, ValueEnum};
use curriculum_rollup::config::AppConfig;
use curriculum_rollup::error::AppError;
use curriculum_rollup::evidence::{write_csv, CohortId, EvidenceBuilder, EvidenceNode, RecordId};
use curriculum_rollup::rollup::{
    changed_ids, recompute_all, recompute_upstream, Edge, Entity, EntityId, RuleSet, Snapshot,
    StatusSummary,
};
use curriculum_rollup::telemetry;
use serde::Serialize;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Args, Debug)]
pub(crate) struct RecomputeArgs {
    /// Snapshot JSON with `entities` and `edges`
    #[arg(long)]
    pub(crate) snapshot: PathBuf,
    /// Id of the entity whose raw data changed
    #[arg(long)]
    pub(crate) changed: String,
    /// Rule set JSON (defaults to ROLLUP_RULES_PATH, then the built-in rules)
    #[arg(long)]
    pub(crate) rules: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub(crate) struct FullArgs {
    /// Snapshot JSON with `entities` and `edges`
    #[arg(long)]
    pub(crate) snapshot: PathBuf,
    /// Rule set JSON (defaults to ROLLUP_RULES_PATH, then the built-in rules)
    #[arg(long)]
    pub(crate) rules: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub(crate) enum EvidenceFormat {
    #[default]
    Json,
    Csv,
}

#[derive(Args, Debug)]
pub(crate) struct EvidenceArgs {
    /// Canonical record export (standards, courses, objectives, items, results)
    #[arg(long)]
    pub(crate) records: PathBuf,
    /// Cohort whose item results feed the tree
    #[arg(long)]
    pub(crate) cohort: String,
    /// Standard to break down
    #[arg(long)]
    pub(crate) standard: String,
    /// Output format
    #[arg(long, value_enum, default_value_t = EvidenceFormat::Json)]
    pub(crate) format: EvidenceFormat,
}

#[derive(Args, Debug, Default)]
pub(crate) struct RulesArgs {
    /// Rule set JSON to validate and print instead of the configured one
    #[arg(long)]
    pub(crate) rules: Option<PathBuf>,
}

/// Envelope printed by `recompute` and `full`.
#[derive(Debug, Serialize)]
pub(crate) struct RollupReport {
    pub(crate) generated_at: DateTime<Utc>,
    pub(crate) entities: Vec<Arc<Entity>>,
    pub(crate) edges: Vec<Edge>,
    pub(crate) changed: Vec<EntityId>,
    pub(crate) summary: StatusSummary,
}

impl RollupReport {
    fn new(before: &Snapshot, entities: Vec<Arc<Entity>>, generated_at: DateTime<Utc>) -> Self {
        let changed = changed_ids(&before.entities, &entities);
        let summary = StatusSummary::from_entities(&entities);
        Self {
            generated_at,
            entities,
            edges: before.edges.clone(),
            changed,
            summary,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct EvidenceReport {
    pub(crate) generated_at: DateTime<Utc>,
    pub(crate) cohort: CohortId,
    pub(crate) evidence: EvidenceNode,
}

fn bootstrap() -> Result<AppConfig, AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;
    Ok(config)
}

fn print_json<T: Serialize>(value: &T) -> Result<(), AppError> {
    let mut stdout = io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, value)?;
    writeln!(stdout)?;
    Ok(())
}

pub(crate) fn recompute_report(
    snapshot: &Snapshot,
    changed: &EntityId,
    rules: &RuleSet,
    generated_at: DateTime<Utc>,
) -> RollupReport {
    let entities = recompute_upstream(&snapshot.entities, &snapshot.edges, changed, rules);
    RollupReport::new(snapshot, entities, generated_at)
}

pub(crate) fn full_report(
    snapshot: &Snapshot,
    rules: &RuleSet,
    generated_at: DateTime<Utc>,
) -> RollupReport {
    let entities = recompute_all(&snapshot.entities, &snapshot.edges, rules);
    RollupReport::new(snapshot, entities, generated_at)
}

pub(crate) fn run_recompute(args: RecomputeArgs) -> Result<(), AppError> {
    let config = bootstrap()?;
    let rules = resolve_rules(&config, args.rules.as_deref())?;
    let snapshot = load_snapshot(&args.snapshot)?;
    let changed = EntityId::new(args.changed);

    if !snapshot.entities.iter().any(|entity| entity.id == changed) {
        warn!(%changed, "changed entity is not in the snapshot; nothing to recompute");
    }

    let report = recompute_report(&snapshot, &changed, &rules, Utc::now());
    info!(
        environment = ?config.environment,
        %changed,
        entities = report.entities.len(),
        updated = report.changed.len(),
        "incremental recompute finished"
    );
    print_json(&report)
}

pub(crate) fn run_full(args: FullArgs) -> Result<(), AppError> {
    let config = bootstrap()?;
    let rules = resolve_rules(&config, args.rules.as_deref())?;
    let snapshot = load_snapshot(&args.snapshot)?;

    let report = full_report(&snapshot, &rules, Utc::now());
    info!(
        environment = ?config.environment,
        entities = report.entities.len(),
        updated = report.changed.len(),
        "full recompute finished"
    );
    print_json(&report)
}

pub(crate) fn run_evidence(args: EvidenceArgs) -> Result<(), AppError> {
    let config = bootstrap()?;
    let store = load_records(&args.records)?;
    let builder = EvidenceBuilder::new(Arc::new(store));
    let cohort = CohortId::from(args.cohort.as_str());
    let standard = RecordId::from(args.standard.as_str());

    let tree = builder.build_standard_evidence(&cohort, &standard)?;
    info!(
        environment = ?config.environment,
        %standard,
        %cohort,
        mean_pct = ?tree.mean_pct,
        contributing = tree.n_children,
        "standard evidence built"
    );

    match args.format {
        EvidenceFormat::Json => print_json(&EvidenceReport {
            generated_at: Utc::now(),
            cohort,
            evidence: tree,
        }),
        EvidenceFormat::Csv => {
            write_csv(&tree, io::stdout().lock())?;
            Ok(())
        }
    }
}

pub(crate) fn run_rules(args: RulesArgs) -> Result<(), AppError> {
    let config = bootstrap()?;
    let rules = resolve_rules(&config, args.rules.as_deref())?;
    info!(rules = rules.rules.len(), "active rule set");
    print_json(&rules)
}
