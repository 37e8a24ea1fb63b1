use anyhow::{Context, Result};
use std::env;
use std::path::{Path, PathBuf};

use crate::cli::Cli;
use crate::namespace::Namespace;

pub const DB_ENV: &str = "CLASS_DEPS_DB";
pub const NAMESPACE_ENV: &str = "CLASS_DEPS_NAMESPACE";

pub fn resolve_db_path(cli: &Cli) -> Result<PathBuf> {
    if let Some(p) = cli.db.clone() {
        return Ok(p);
    }

    if let Ok(p) = env::var(DB_ENV)
        && !p.trim().is_empty()
    {
        return Ok(PathBuf::from(p));
    }

    Ok(class_deps_home()?.join("db.lmdb"))
}

pub fn resolve_namespace(flag: Option<&str>) -> Result<Namespace> {
    if let Some(ns) = flag {
        return Ok(Namespace::new(ns));
    }

    let from_env = env::var(NAMESPACE_ENV).with_context(|| {
        format!("No user namespace given (use --namespace or set {NAMESPACE_ENV})")
    })?;
    Ok(Namespace::new(&from_env))
}

pub fn clear_db(db_path: &Path) -> Result<()> {
    remove_file_if_exists(db_path, "db")?;
    remove_file_if_exists(&lmdb_lock_path(db_path), "db lock")?;
    Ok(())
}

fn class_deps_home() -> Result<PathBuf> {
    let base = dirs::data_local_dir()
        .or_else(dirs::cache_dir)
        .or_else(dirs::home_dir)
        .ok_or_else(|| anyhow::anyhow!("Failed to resolve data directory"))?;
    Ok(base.join("class-deps"))
}

fn lmdb_lock_path(db_path: &Path) -> PathBuf {
    let mut os = db_path.as_os_str().to_os_string();
    os.push("-lock");
    PathBuf::from(os)
}

fn remove_file_if_exists(path: &Path, kind: &str) -> Result<()> {
    if path.exists() {
        std::fs::remove_file(path)
            .with_context(|| format!("Failed to remove {kind} file: {}", path.display()))?;
    }
    Ok(())
}
