//! INI file implementation of [`ConfigStore`].

use std::future::Future;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use ini::Ini;

use dashconf_app::ports::{ConfigStore, Store};
use dashconf_domain::document::{ConfigDocument, ConfigSection};
use dashconf_domain::error::DashConfError;

use crate::error::IniStoreError;

/// Stores every configuration document as `<root>/<store name>.ini`.
#[derive(Debug, Clone)]
pub struct IniConfigStore {
    root: PathBuf,
}

impl IniConfigStore {
    /// Create a store rooted at `root`. The directory is created on first save.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Path of the file backing `store`.
    #[must_use]
    pub fn path(&self, store: Store) -> PathBuf {
        self.root.join(format!("{}.ini", store.name()))
    }
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> IniStoreError + '_ {
    move |source| IniStoreError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Parse INI text; keys outside any section are ignored.
fn parse(path: &Path, content: &str) -> Result<ConfigDocument, IniStoreError> {
    let ini = Ini::load_from_str(content).map_err(|source| IniStoreError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(ini
        .iter()
        .filter_map(|(name, properties)| {
            let name = name?;
            let mut section = ConfigSection::new(name);
            for (key, value) in properties {
                section.set(key, value);
            }
            Some(section)
        })
        .collect())
}

/// Render INI text. Sections without keys are not written.
fn render(path: &Path, document: &ConfigDocument) -> Result<Vec<u8>, IniStoreError> {
    let mut ini = Ini::new();
    for section in document.sections() {
        for (key, value) in section.iter() {
            ini.set_to(Some(section.name()), key.to_string(), value.to_string());
        }
    }
    let mut buffer = Vec::new();
    ini.write_to(&mut buffer).map_err(io_error(path))?;
    Ok(buffer)
}

async fn read(path: PathBuf) -> Result<ConfigDocument, IniStoreError> {
    match tokio::fs::read_to_string(&path).await {
        Ok(content) => parse(&path, &content),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(ConfigDocument::new()),
        Err(err) => Err(io_error(&path)(err)),
    }
}

async fn write(path: PathBuf, content: Vec<u8>) -> Result<(), IniStoreError> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(io_error(parent))?;
    }
    let tmp = path.with_extension("ini.tmp");
    tokio::fs::write(&tmp, content)
        .await
        .map_err(io_error(&tmp))?;
    tokio::fs::rename(&tmp, &path)
        .await
        .map_err(io_error(&path))?;
    Ok(())
}

impl ConfigStore for IniConfigStore {
    fn load(
        &self,
        store: Store,
    ) -> impl Future<Output = Result<ConfigDocument, DashConfError>> + Send {
        let path = self.path(store);
        async move { Ok(read(path).await?) }
    }

    fn save(
        &self,
        store: Store,
        document: &ConfigDocument,
    ) -> impl Future<Output = Result<(), DashConfError>> + Send {
        let path = self.path(store);
        let content = render(&path, document);
        async move {
            write(path.clone(), content?).await?;
            tracing::debug!(path = %path.display(), "configuration written");
            Ok(())
        }
    }
}
