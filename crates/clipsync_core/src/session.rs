//! A synchronization run over one base and one secondary angle.
//!
//! [`SyncSession`] carries everything a run needs: the two folders with
//! their reference clip and offset, the settings, and an optional run log.
//! Each workflow rebuilds both groups from disk, so a session can be reused
//! after the folders change.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;

use crate::config::Settings;
use crate::error::SyncResult;
use crate::group::{ClipGroup, MediaFilter};
use crate::logging::RunLogger;
use crate::materialize::{materialize, MaterializeOptions, MaterializeReport};
use crate::metadata::MetadataProvider;
use crate::models::{MatchedPair, MaterializeMode, RecutPlan};
use crate::recut::{execute_recut, plan_recut, RecutOutput, RecutReport, TrimExecutor};
use crate::sync::merge;

/// One angle folder and where its reference clip sits on the shared timeline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AngleSelection {
    /// Folder holding the angle's clips.
    pub directory: PathBuf,
    /// Scan index (file name order) of the reference clip.
    pub reference_index: usize,
    /// Whole seconds into the reference clip where the shared event happens.
    pub offset: i64,
}

impl AngleSelection {
    pub fn new(directory: impl Into<PathBuf>, reference_index: usize, offset: i64) -> Self {
        Self {
            directory: directory.into(),
            reference_index,
            offset,
        }
    }

    /// Build this angle's clip group.
    pub fn load(
        &self,
        filter: &MediaFilter,
        provider: &dyn MetadataProvider,
    ) -> SyncResult<ClipGroup> {
        ClipGroup::build(
            &self.directory,
            filter,
            provider,
            self.reference_index,
            self.offset,
        )
    }
}

/// Result of [`SyncSession::match_folders`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchReport {
    /// How the timeline was written.
    pub mode: MaterializeMode,
    /// Slot counts and target folders.
    #[serde(flatten)]
    pub materialized: MaterializeReport,
}

/// Context for one synchronization run.
pub struct SyncSession {
    base: AngleSelection,
    secondary: AngleSelection,
    settings: Settings,
    logger: Option<Arc<RunLogger>>,
}

impl SyncSession {
    pub fn new(base: AngleSelection, secondary: AngleSelection, settings: Settings) -> Self {
        Self {
            base,
            secondary,
            settings,
            logger: None,
        }
    }

    /// Mirror phases and outcomes into a run log.
    pub fn with_logger(mut self, logger: Arc<RunLogger>) -> Self {
        self.logger = Some(logger);
        self
    }

    pub fn base(&self) -> &AngleSelection {
        &self.base
    }

    pub fn secondary(&self) -> &AngleSelection {
        &self.secondary
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Build the base and secondary groups in parallel.
    pub fn load_groups(
        &self,
        provider: &dyn MetadataProvider,
    ) -> SyncResult<(ClipGroup, ClipGroup)> {
        self.phase("Load clip groups");
        let filter = self.settings.scan.media_filter();

        let (base, secondary) = rayon::join(
            || self.base.load(&filter, provider),
            || self.secondary.load(&filter, provider),
        );
        let (base, secondary) = match (base, secondary) {
            (Ok(b), Ok(s)) => (b, s),
            (Err(e), _) | (_, Err(e)) => {
                self.fail(&e.to_string());
                return Err(e);
            }
        };

        self.info(&format!(
            "Base: {} clips in {}; secondary: {} clips in {}",
            base.len(),
            base.directory().display(),
            secondary.len(),
            secondary.directory().display()
        ));
        Ok((base, secondary))
    }

    /// Merge both groups into a timeline without touching the files.
    pub fn match_pairs(&self, provider: &dyn MetadataProvider) -> SyncResult<Vec<MatchedPair>> {
        let (base, secondary) = self.load_groups(provider)?;
        self.phase("Merge timelines");
        let pairs = merge(&base, &secondary);
        self.info(&format!(
            "{} slots, {} paired",
            pairs.len(),
            pairs.iter().filter(|p| p.is_paired()).count()
        ));
        Ok(pairs)
    }

    /// Merge both angles and write them out as index-aligned sets.
    pub fn match_folders(
        &self,
        provider: &dyn MetadataProvider,
        mode: MaterializeMode,
    ) -> SyncResult<MatchReport> {
        let pairs = self.match_pairs(provider)?;

        self.phase("Write aligned folders");
        let namer = self.settings.naming.namer();
        let blank_source = self.settings.paths.blank_source_path();
        let options = MaterializeOptions {
            mode,
            namer: &namer,
            blank_source: &blank_source,
            output_subdir: &self.settings.paths.output_subdir,
        };

        let materialized = materialize(
            &pairs,
            &self.base.directory,
            &self.secondary.directory,
            &options,
        )
        .map_err(|e| {
            self.fail(&e.to_string());
            e
        })?;

        self.success(&format!(
            "{} slots written ({} paired, {} base only, {} secondary only)",
            materialized.slots,
            materialized.paired,
            materialized.base_only,
            materialized.secondary_only
        ));
        Ok(MatchReport { mode, materialized })
    }

    /// Plan secondary cuts following the base angle's clip boundaries.
    pub fn plan_recut(&self, provider: &dyn MetadataProvider) -> SyncResult<RecutPlan> {
        let (base, secondary) = self.load_groups(provider)?;
        self.phase("Plan secondary recut");
        let plan = plan_recut(&base, &secondary, &self.settings.recut.padding());
        self.info(&format!(
            "{} entries, {} blank",
            plan.len(),
            plan.blank_count()
        ));
        Ok(plan)
    }

    /// Plan and carry out the secondary recut.
    pub fn recut_secondary(
        &self,
        provider: &dyn MetadataProvider,
        executor: &dyn TrimExecutor,
    ) -> SyncResult<RecutReport> {
        let plan = self.plan_recut(provider)?;
        self.execute_plan(&plan, executor)
    }

    /// Carry out an already computed recut plan.
    pub fn execute_plan(
        &self,
        plan: &RecutPlan,
        executor: &dyn TrimExecutor,
    ) -> SyncResult<RecutReport> {
        self.phase("Recut secondary");
        let namer = self.settings.naming.namer();
        let blank_source = self.settings.paths.blank_source_path();
        let output = RecutOutput {
            namer: &namer,
            blank_source: &blank_source,
            output_subdir: &self.settings.paths.output_subdir,
        };

        let report = execute_recut(plan, &self.secondary.directory, &output, executor)
            .map_err(|e| {
                self.fail(&e.to_string());
                e
            })?;

        self.success(&format!(
            "{} segments, {} blanks in {}",
            report.extracted,
            report.blanks,
            report.target.display()
        ));
        Ok(report)
    }

    /// File the run log is written to, if any.
    pub fn log_path(&self) -> Option<&Path> {
        self.logger.as_deref().map(RunLogger::log_path)
    }

    fn phase(&self, name: &str) {
        tracing::info!("{}", name);
        if let Some(logger) = &self.logger {
            logger.phase(name);
        }
    }

    fn info(&self, message: &str) {
        tracing::info!("{}", message);
        if let Some(logger) = &self.logger {
            logger.info(message);
        }
    }

    fn success(&self, message: &str) {
        if let Some(logger) = &self.logger {
            logger.success(message);
        }
    }

    fn fail(&self, message: &str) {
        tracing::error!("{}", message);
        if let Some(logger) = &self.logger {
            logger.error(message);
        }
    }
}
