//! Persistent project store.
//!
//! Uses LMDB (via heed). Each analyzed archive is kept under its project id:
//! the full dependency model in one database, a small summary in another.

use anyhow::{Context, Result};
use heed::types::Str;
use heed::{Database, Env, EnvFlags, EnvOpenOptions, RoTxn};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::info;

use crate::archive::AnalysisReport;
use crate::model::{ClassRecord, DependencyModel, ExternalDependencyRecord};

pub const PROJECTS_DB: &str = "projects";
pub const SUMMARIES_DB: &str = "project_summaries";

const DEFAULT_MAP_SIZE: usize = 256 * 1024 * 1024;
const DEFAULT_MAX_DBS: u32 = 8;

type StrDb = Database<Str, Str>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectSummary {
    pub project_id: String,
    pub archive: String,
    pub namespace: String,
    pub class_count: usize,
    pub external_count: usize,
    pub skipped_count: usize,
    pub stored_at: u64,
}

#[derive(Debug, Serialize)]
pub struct StoreStats {
    pub db_path: String,
    pub projects: u64,
}

#[derive(Debug)]
pub struct ProjectStore {
    env: Arc<Env>,
    db_path: PathBuf,
    projects: StrDb,
    summaries: StrDb,
}

impl ProjectStore {
    pub fn open(db_path: PathBuf) -> Result<Self> {
        if let Some(parent) = db_path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create store directory: {}", parent.display())
            })?;
        }

        let env = Arc::new(open_env(&db_path)?);

        let mut wtxn = env.write_txn()?;
        let projects = env.create_database::<Str, Str>(&mut wtxn, Some(PROJECTS_DB))?;
        let summaries = env.create_database::<Str, Str>(&mut wtxn, Some(SUMMARIES_DB))?;
        wtxn.commit()?;

        Ok(Self {
            env,
            db_path,
            projects,
            summaries,
        })
    }

    /// Stores the report's model under its project id, replacing any earlier
    /// run of the same archive and namespace.
    pub fn save(&self, report: &AnalysisReport) -> Result<ProjectSummary> {
        let summary = ProjectSummary {
            project_id: report.project_id.clone(),
            archive: report.archive.clone(),
            namespace: report.namespace.clone(),
            class_count: report.model.class_names.len(),
            external_count: report.model.external_dependencies.len(),
            skipped_count: report.skipped.len(),
            stored_at: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap_or_default()
                .as_secs(),
        };
        let model_json = serde_json::to_string(&report.model)?;
        let summary_json = serde_json::to_string(&summary)?;

        let mut wtxn = self.env.write_txn()?;
        self.projects
            .put(&mut wtxn, summary.project_id.as_str(), model_json.as_str())?;
        self.summaries
            .put(&mut wtxn, summary.project_id.as_str(), summary_json.as_str())?;
        wtxn.commit()?;

        info!("stored project {}", summary.project_id);
        Ok(summary)
    }

    pub fn model(&self, project_id: &str) -> Result<Option<DependencyModel>> {
        let rtxn = self.env.read_txn()?;
        let Some(raw) = self.projects.get(&rtxn, project_id)? else {
            return Ok(None);
        };
        let model = serde_json::from_str(raw)
            .with_context(|| format!("Failed to parse stored model for project: {project_id}"))?;
        Ok(Some(model))
    }

    pub fn internal_dependencies(&self, project_id: &str) -> Result<Option<Vec<ClassRecord>>> {
        Ok(self.model(project_id)?.map(|m| m.classes))
    }

    pub fn external_dependencies(
        &self,
        project_id: &str,
    ) -> Result<Option<Vec<ExternalDependencyRecord>>> {
        Ok(self.model(project_id)?.map(|m| m.external_dependencies))
    }

    pub fn class_list(&self, project_id: &str) -> Result<Option<Vec<String>>> {
        Ok(self.model(project_id)?.map(|m| m.class_names))
    }

    pub fn projects(&self) -> Result<Vec<ProjectSummary>> {
        let rtxn = self.env.read_txn()?;
        let mut out = Vec::new();
        for item in self.summaries.iter(&rtxn)? {
            let (id, raw) = item?;
            let summary = serde_json::from_str(raw)
                .with_context(|| format!("Failed to parse summary for project: {id}"))?;
            out.push(summary);
        }
        Ok(out)
    }

    pub fn stats(&self) -> Result<StoreStats> {
        let rtxn = self.env.read_txn()?;
        Ok(StoreStats {
            db_path: self.db_path.to_string_lossy().to_string(),
            projects: table_len(&self.summaries, &rtxn)?,
        })
    }
}

fn open_env(db_path: &Path) -> Result<Env> {
    let mut options = EnvOpenOptions::new();
    options.map_size(DEFAULT_MAP_SIZE);
    options.max_dbs(DEFAULT_MAX_DBS);
    // SAFETY: Default LMDB locking stays on; NO_SUB_DIR keeps the store a
    // single file at the configured path.
    unsafe {
        options.flags(EnvFlags::NO_SUB_DIR);
        options
            .open(db_path)
            .with_context(|| format!("Failed to create/open store: {}", db_path.display()))
    }
}

fn table_len(db: &StrDb, rtxn: &RoTxn<'_>) -> Result<u64> {
    let mut count = 0u64;
    for item in db.iter(rtxn)? {
        let _ = item?;
        count += 1;
    }
    Ok(count)
}
