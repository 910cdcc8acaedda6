//! Directory-based implementation of [`ModuleManager`].

use std::future::Future;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use dashconf_app::ports::ModuleManager;
use dashconf_domain::error::DashConfError;
use dashconf_domain::module::{self, Module};

use crate::error::ModuleFsError;

const INFO_FILE: &str = "module.info";

/// Finds modules under a list of search directories and tracks enabled
/// ones as entries of `enabled_dir`.
#[derive(Debug, Clone)]
pub struct FsModuleManager {
    search_path: Vec<PathBuf>,
    enabled_dir: PathBuf,
}

/// `(version, description)` read from a `module.info` file.
fn parse_info(content: &str) -> (Option<String>, Option<String>) {
    let mut version = None;
    let mut description = None;
    for line in content.lines() {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let value = value.trim();
        if value.is_empty() {
            continue;
        }
        match key.trim().to_ascii_lowercase().as_str() {
            "version" => version = Some(value.to_string()),
            "description" => description = Some(value.to_string()),
            _ => {}
        }
    }
    (version, description)
}

async fn exists(path: &Path) -> bool {
    tokio::fs::symlink_metadata(path).await.is_ok()
}

impl FsModuleManager {
    /// Create a manager searching `search_path` in order.
    #[must_use]
    pub fn new(search_path: Vec<PathBuf>, enabled_dir: impl Into<PathBuf>) -> Self {
        Self {
            search_path,
            enabled_dir: enabled_dir.into(),
        }
    }

    /// Split a colon-separated list of directories, as found in settings.
    #[must_use]
    pub fn parse_search_path(value: &str) -> Vec<PathBuf> {
        value
            .split(':')
            .map(str::trim)
            .filter(|dir| !dir.is_empty())
            .map(PathBuf::from)
            .collect()
    }

    fn enabled_link(&self, name: &str) -> PathBuf {
        self.enabled_dir.join(name)
    }

    async fn describe(&self, name: String, path: PathBuf) -> Module {
        let (version, description) = match tokio::fs::read_to_string(path.join(INFO_FILE)).await {
            Ok(content) => parse_info(&content),
            Err(_) => (None, None),
        };
        Module {
            enabled: exists(&self.enabled_link(&name)).await,
            name,
            path,
            version,
            description,
        }
    }

    async fn scan(&self) -> Result<Vec<Module>, ModuleFsError> {
        let mut modules: Vec<Module> = Vec::new();
        for dir in &self.search_path {
            let mut entries = match tokio::fs::read_dir(dir).await {
                Ok(entries) => entries,
                Err(err) if err.kind() == ErrorKind::NotFound => {
                    tracing::debug!(dir = %dir.display(), "module directory does not exist");
                    continue;
                }
                Err(source) => {
                    return Err(ModuleFsError::Io {
                        action: "list",
                        module: dir.display().to_string(),
                        source,
                    });
                }
            };
            while let Ok(Some(entry)) = entries.next_entry().await {
                let Ok(name) = entry.file_name().into_string() else {
                    continue;
                };
                let is_dir = entry.file_type().await.is_ok_and(|kind| kind.is_dir());
                if !is_dir
                    || module::validate_name(&name).is_err()
                    || modules.iter().any(|m| m.name == name)
                {
                    continue;
                }
                modules.push(self.describe(name, entry.path()).await);
            }
        }
        Ok(modules)
    }

    async fn find(&self, name: &str) -> Result<Option<Module>, ModuleFsError> {
        if module::validate_name(name).is_err() {
            return Ok(None);
        }
        for dir in &self.search_path {
            let path = dir.join(name);
            if tokio::fs::metadata(&path).await.is_ok_and(|meta| meta.is_dir()) {
                return Ok(Some(self.describe(name.to_string(), path).await));
            }
        }
        Ok(None)
    }

    async fn installed(&self, name: &str) -> Result<Module, ModuleFsError> {
        self.find(name)
            .await?
            .ok_or_else(|| ModuleFsError::NotInstalled(name.to_string()))
    }

    async fn activate(&self, name: &str) -> Result<(), ModuleFsError> {
        let module = self.installed(name).await?;
        if module.enabled {
            return Ok(());
        }
        let io = |source| ModuleFsError::Io {
            action: "enable",
            module: name.to_string(),
            source,
        };
        tokio::fs::create_dir_all(&self.enabled_dir)
            .await
            .map_err(io)?;
        link(&module.path, &self.enabled_link(name))
            .await
            .map_err(io)?;
        tracing::info!(module = name, "module enabled");
        Ok(())
    }

    async fn deactivate(&self, name: &str) -> Result<(), ModuleFsError> {
        self.installed(name).await?;
        match tokio::fs::remove_file(self.enabled_link(name)).await {
            Ok(()) => {
                tracing::info!(module = name, "module disabled");
                Ok(())
            }
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(source) => Err(ModuleFsError::Io {
                action: "disable",
                module: name.to_string(),
                source,
            }),
        }
    }

    async fn prepare(&self, name: &str) -> Result<(), ModuleFsError> {
        let module = self.installed(name).await?;
        if !module.enabled {
            return Err(ModuleFsError::NotEnabled(name.to_string()));
        }
        tracing::info!(module = name, path = %module.path.display(), "module loaded");
        Ok(())
    }
}

#[cfg(unix)]
async fn link(target: &Path, link: &Path) -> std::io::Result<()> {
    tokio::fs::symlink(target, link).await
}

/// Without symlinks the enabled entry is a file naming the module path.
#[cfg(not(unix))]
async fn link(target: &Path, link: &Path) -> std::io::Result<()> {
    tokio::fs::write(link, target.display().to_string()).await
}

impl ModuleManager for FsModuleManager {
    fn list(&self) -> impl Future<Output = Result<Vec<Module>, DashConfError>> + Send {
        async move { Ok(self.scan().await?) }
    }

    fn has_installed(
        &self,
        name: &str,
    ) -> impl Future<Output = Result<bool, DashConfError>> + Send {
        async move { Ok(self.find(name).await?.is_some()) }
    }

    fn get(
        &self,
        name: &str,
    ) -> impl Future<Output = Result<Option<Module>, DashConfError>> + Send {
        async move { Ok(self.find(name).await?) }
    }

    fn enable(&self, name: &str) -> impl Future<Output = Result<(), DashConfError>> + Send {
        async move { Ok(self.activate(name).await?) }
    }

    fn disable(&self, name: &str) -> impl Future<Output = Result<(), DashConfError>> + Send {
        async move { Ok(self.deactivate(name).await?) }
    }

    fn load(&self, name: &str) -> impl Future<Output = Result<(), DashConfError>> + Send {
        async move { Ok(self.prepare(name).await?) }
    }
}
