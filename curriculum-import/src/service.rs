//! Caller-facing curriculum operations
//!
//! Every entry point a front end needs: import (single workbook or a whole
//! directory), listing, detail, competency analysis and comparison, and
//! bulk reset.

use curriculum_common::config::ImportConfig;
use curriculum_common::db::{ProgramDisciplineDetail, ProgramSummary};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use std::path::Path;
use uuid::Uuid;

use crate::db::{disciplines, programs, ProgramFilter, ResetSummary};
use crate::error::{ImportError, ImportResult};
use crate::models::{BatchReport, CompetencyReport, ImportSummary};
use crate::services::competency_analyzer;
use crate::services::{DirectoryWalker, ProgramImporter, ScanError, WorkbookSource};

/// A program with its disciplines
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgramDetail {
    pub program: ProgramSummary,
    pub disciplines: Vec<ProgramDisciplineDetail>,
}

#[derive(Debug, Clone)]
pub struct CurriculumService {
    pool: SqlitePool,
    importer: ProgramImporter,
}

impl CurriculumService {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            importer: ProgramImporter::new(pool.clone()),
            pool,
        }
    }

    /// Apply `[import]` tuning from the config file
    pub fn with_import_config(mut self, config: &ImportConfig) -> Self {
        self.importer = self.importer.with_max_lock_wait_ms(config.max_lock_wait_ms);
        self
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Import one workbook
    pub async fn import_program(
        &self,
        source: WorkbookSource,
        year: Option<i32>,
    ) -> ImportResult<ImportSummary> {
        let outcome = self.importer.import(source, year).await?;
        Ok(ImportSummary::from(&outcome))
    }

    /// Import every workbook under `root`, at most `jobs` at a time
    pub async fn import_directory(&self, root: &Path, jobs: usize) -> Result<BatchReport, ScanError> {
        DirectoryWalker::new()
            .import_directory(&self.importer, root, jobs)
            .await
    }

    async fn summary(&self, program_id: Uuid) -> ImportResult<ProgramSummary> {
        programs::load_program_summary(&self.pool, program_id)
            .await?
            .ok_or_else(|| ImportError::NotFound(program_id.to_string()))
    }

    /// Competency analysis of one program with the area legend
    pub async fn get_competency_analysis(&self, program_id: Uuid) -> ImportResult<CompetencyReport> {
        let program = self.summary(program_id).await?;
        let details = disciplines::load_details(&self.pool, program_id).await?;
        let analysis = competency_analyzer::analyze(&details);
        Ok(CompetencyReport::new(program, analysis))
    }

    /// Analyses of several programs, in request order
    ///
    /// Fails on the first unknown id.
    pub async fn compare(&self, program_ids: &[Uuid]) -> ImportResult<Vec<CompetencyReport>> {
        let mut reports = Vec::with_capacity(program_ids.len());
        for id in program_ids {
            reports.push(self.get_competency_analysis(*id).await?);
        }
        Ok(reports)
    }

    pub async fn list_programs(&self, filter: &ProgramFilter) -> ImportResult<Vec<ProgramSummary>> {
        programs::list_programs(&self.pool, filter).await
    }

    pub async fn program_detail(&self, program_id: Uuid) -> ImportResult<ProgramDetail> {
        let program = self.summary(program_id).await?;
        let disciplines = disciplines::load_details(&self.pool, program_id).await?;
        Ok(ProgramDetail {
            program,
            disciplines,
        })
    }

    /// Delete all programs, disciplines and dictionaries
    pub async fn reset(&self) -> ImportResult<ResetSummary> {
        programs::reset_all(&self.pool).await
    }
}
