//! Migration orchestrator.
//!
//! Drives the index store through an ordered sequence of idempotent steps:
//! connectivity check, existence check (with optional destructive delete),
//! index creation, optional backfill from a prior index, and optional atomic
//! alias cutover. Every step failure is terminal for the run and completed
//! steps are never rolled back: a failed backfill leaves the new index
//! created-but-not-cutover, with the alias still on the old, known-good
//! index. Automatic rollback could itself fail destructively; leaving state
//! for operator inspection is the intended behavior.

use crate::cutover::{self, CutoverReport};
use crate::mapping::MappingDocument;
use crate::naming::{AliasName, IndexName};
use crate::store::{ClusterHealth, IndexStore, ReindexStats, StoreError};
use std::fmt;
use std::time::Duration;

/// Timeout for the cluster health probe. The probe is a cheap liveness
/// check; the reindex step deliberately has no timeout at all.
pub const HEALTH_TIMEOUT: Duration = Duration::from_secs(2);

/// Where backfill documents come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceSpec {
    /// Copy from an explicitly named index (`--from`).
    Explicit(IndexName),
    /// Copy from `{prefix}-{logical}_v{version-1}` (`--from-previous`).
    PreviousVersion,
}

/// One migration invocation. Constructed once via [`MigrationRequest::new`],
/// immutable afterwards; all fields stay private so the constructor's
/// validation cannot be bypassed.
#[derive(Debug, Clone)]
pub struct MigrationRequest {
    prefix: String,
    logical_index: String,
    version: u32,
    delete_existing: bool,
    source: Option<SourceSpec>,
    cutover_alias: Option<AliasName>,
}

impl MigrationRequest {
    /// Validate and build a request.
    ///
    /// `version` must be at least 1, and `--from-previous` needs a previous
    /// version to exist in the naming scheme, so it requires version ≥ 2.
    pub fn new(
        prefix: impl Into<String>,
        logical_index: impl Into<String>,
        version: u32,
        delete_existing: bool,
        source: Option<SourceSpec>,
        cutover_alias: Option<AliasName>,
    ) -> Result<Self, MigrateError> {
        if version < 1 {
            return Err(MigrateError::InvalidRequest(
                "version must be a positive integer".to_string(),
            ));
        }
        if version < 2 && matches!(source, Some(SourceSpec::PreviousVersion)) {
            return Err(MigrateError::InvalidRequest(
                "--from-previous requires version 2 or higher (there is no v0)".to_string(),
            ));
        }
        Ok(MigrationRequest {
            prefix: prefix.into(),
            logical_index: logical_index.into(),
            version,
            delete_existing,
            source,
            cutover_alias,
        })
    }

    /// Whether an existing versioned index may be deleted first.
    pub fn delete_existing(&self) -> bool {
        self.delete_existing
    }

    /// The alias to cut over to, if a cutover was requested.
    pub fn cutover_alias(&self) -> Option<&AliasName> {
        self.cutover_alias.as_ref()
    }

    /// The versioned index this migration creates or targets.
    pub fn index_name(&self) -> IndexName {
        IndexName::versioned(&self.prefix, &self.logical_index, self.version)
    }

    /// The alias to cut over: the explicit override, or the default
    /// `{prefix}-{logical}` name.
    pub fn alias_or_default(&self) -> AliasName {
        self.cutover_alias
            .clone()
            .unwrap_or_else(|| AliasName::default_for(&self.prefix, &self.logical_index))
    }

    /// The backfill source index, if any.
    pub fn source_index(&self) -> Option<IndexName> {
        match &self.source {
            Some(SourceSpec::Explicit(index)) => Some(index.clone()),
            Some(SourceSpec::PreviousVersion) => Some(IndexName::versioned(
                &self.prefix,
                &self.logical_index,
                self.version - 1,
            )),
            None => None,
        }
    }
}

/// Result of a completed run, returned to the caller for reporting.
#[derive(Debug, Clone, Default)]
pub struct MigrationOutcome {
    pub created_index: Option<IndexName>,
    pub reindexed: Option<ReindexStats>,
    pub alias_update: Option<CutoverReport>,
}

/// Progress notifications emitted as each step completes, so the CLI can
/// render step-by-step output without the orchestrator printing anything.
#[derive(Debug, Clone)]
pub enum MigrationEvent {
    ConnectivityChecked {
        health: ClusterHealth,
    },
    ExistenceChecked {
        index: IndexName,
        exists: bool,
    },
    IndexDeleted {
        index: IndexName,
        ack: serde_json::Value,
    },
    IndexCreated {
        index: IndexName,
        ack: serde_json::Value,
    },
    ReindexStarted {
        source: IndexName,
        dest: IndexName,
    },
    ReindexCompleted {
        stats: ReindexStats,
    },
    AliasMoved {
        report: CutoverReport,
    },
}

/// Error type for migration runs.
#[derive(Debug)]
pub enum MigrateError {
    /// Request validation failure (bad version, impossible source).
    InvalidRequest(String),
    /// Store unreachable or unhealthy; nothing was mutated.
    Connectivity(String),
    /// The versioned index already exists and deletion was not requested.
    /// A deliberate safety stop: destructive behavior is opt-in only.
    IndexAlreadyExists(IndexName),
    /// The requested backfill source does not exist.
    SourceIndexMissing(IndexName),
    /// Alias-only cutover against an index that does not exist.
    TargetIndexMissing(IndexName),
    /// The store rejected an operation; its diagnostic is carried verbatim.
    Store { op: &'static str, err: StoreError },
}

impl MigrateError {
    pub(crate) fn store(op: &'static str, err: StoreError) -> Self {
        MigrateError::Store { op, err }
    }
}

impl fmt::Display for MigrateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MigrateError::InvalidRequest(msg) => write!(f, "{msg}"),
            MigrateError::Connectivity(msg) => {
                write!(f, "store unreachable or unhealthy: {msg}")
            }
            MigrateError::IndexAlreadyExists(index) => write!(
                f,
                "index '{index}' already exists; pass --delete-existing to replace it"
            ),
            MigrateError::SourceIndexMissing(index) => {
                write!(f, "reindex source index '{index}' does not exist")
            }
            MigrateError::TargetIndexMissing(index) => {
                write!(f, "target index '{index}' does not exist")
            }
            MigrateError::Store { op, err } => write!(f, "{op} failed: {err}"),
        }
    }
}

impl std::error::Error for MigrateError {}

/// Create the versioned index (optionally replacing an existing one),
/// optionally backfill it from a source index, and optionally cut the stable
/// alias over to it.
///
/// Steps 2–5 are idempotent-safe on whole-run retry; an interrupted process
/// leaves the store in the state of the last completed step and a re-run with
/// the same arguments resumes safely from there.
pub async fn run_schema_migration<S, F>(
    store: &S,
    req: &MigrationRequest,
    mapping: &MappingDocument,
    mut on_event: F,
) -> Result<MigrationOutcome, MigrateError>
where
    S: IndexStore + ?Sized,
    F: FnMut(&MigrationEvent),
{
    let index = req.index_name();
    let mut outcome = MigrationOutcome::default();

    // Step 1: connectivity. Nothing below executes on failure.
    let health = check_connectivity(store).await?;
    on_event(&MigrationEvent::ConnectivityChecked { health });

    // Step 2: existence check, with opt-in destructive delete.
    let exists = store
        .exists(&index)
        .await
        .map_err(|e| MigrateError::store("checking index existence", e))?;
    on_event(&MigrationEvent::ExistenceChecked {
        index: index.clone(),
        exists,
    });

    if exists {
        if !req.delete_existing() {
            return Err(MigrateError::IndexAlreadyExists(index));
        }
        // Deletion failure stays fatal: a half-deleted index is an ambiguous
        // state that must surface, not be masked by a create attempt.
        let ack = store
            .delete(&index)
            .await
            .map_err(|e| MigrateError::store("deleting existing index", e))?;
        on_event(&MigrationEvent::IndexDeleted {
            index: index.clone(),
            ack,
        });
    }

    // Step 3: creation.
    let ack = store
        .create(&index, mapping.body())
        .await
        .map_err(|e| MigrateError::store("creating index", e))?;
    on_event(&MigrationEvent::IndexCreated {
        index: index.clone(),
        ack,
    });
    outcome.created_index = Some(index.clone());

    // Step 4: optional backfill. A missing source is a reported error,
    // never a silent skip.
    if let Some(source) = req.source_index() {
        let source_exists = store
            .exists(&source)
            .await
            .map_err(|e| MigrateError::store("checking source index existence", e))?;
        if !source_exists {
            return Err(MigrateError::SourceIndexMissing(source));
        }

        on_event(&MigrationEvent::ReindexStarted {
            source: source.clone(),
            dest: index.clone(),
        });
        let stats = store
            .reindex_copy(&source, &index)
            .await
            .map_err(|e| MigrateError::store("reindexing", e))?;
        on_event(&MigrationEvent::ReindexCompleted {
            stats: stats.clone(),
        });
        outcome.reindexed = Some(stats);
    }

    // Step 5: optional cutover.
    if req.cutover_alias().is_some() {
        let alias = req.alias_or_default();
        let report = cutover::cutover(store, &alias, &index).await?;
        on_event(&MigrationEvent::AliasMoved {
            report: report.clone(),
        });
        outcome.alias_update = Some(report);
    }

    Ok(outcome)
}

/// Cut the stable alias over to an index assumed to already exist.
///
/// Performs only the connectivity check and the cutover; creation and
/// backfill are skipped entirely.
pub async fn run_alias_only_migration<S, F>(
    store: &S,
    req: &MigrationRequest,
    mut on_event: F,
) -> Result<MigrationOutcome, MigrateError>
where
    S: IndexStore + ?Sized,
    F: FnMut(&MigrationEvent),
{
    let index = req.index_name();
    let alias = req.alias_or_default();

    let health = check_connectivity(store).await?;
    on_event(&MigrationEvent::ConnectivityChecked { health });

    let exists = store
        .exists(&index)
        .await
        .map_err(|e| MigrateError::store("checking index existence", e))?;
    on_event(&MigrationEvent::ExistenceChecked {
        index: index.clone(),
        exists,
    });
    if !exists {
        return Err(MigrateError::TargetIndexMissing(index));
    }

    let report = cutover::cutover(store, &alias, &index).await?;
    on_event(&MigrationEvent::AliasMoved {
        report: report.clone(),
    });

    Ok(MigrationOutcome {
        created_index: None,
        reindexed: None,
        alias_update: Some(report),
    })
}

async fn check_connectivity<S: IndexStore + ?Sized>(
    store: &S,
) -> Result<ClusterHealth, MigrateError> {
    store
        .health(HEALTH_TIMEOUT)
        .await
        .map_err(|e| MigrateError::Connectivity(e.to_string()))
}
