//! In-memory port implementations shared by the service tests.

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use dashconf_domain::backend::AuthBackend;
use dashconf_domain::document::ConfigDocument;
use dashconf_domain::error::{DashConfError, ModuleError};
use dashconf_domain::module::Module;
use dashconf_domain::permission::PermissionSet;
use dashconf_domain::resource::Resource;

use crate::ports::{ConfigStore, ModuleManager, Store, UserBackend, UserBackendFactory};

pub(crate) fn storage_error(message: &str) -> DashConfError {
    DashConfError::Storage(Box::new(std::io::Error::other(message.to_string())))
}

pub(crate) fn perms(tokens: &[&str]) -> PermissionSet {
    tokens.iter().copied().collect()
}

pub(crate) fn doc(entries: &[(&str, &[(&str, &str)])]) -> ConfigDocument {
    let mut doc = ConfigDocument::new();
    for (section, values) in entries {
        for (key, value) in *values {
            doc.set(section, *key, *value);
        }
    }
    doc
}

#[derive(Default)]
pub(crate) struct MemoryStore {
    docs: Mutex<HashMap<Store, ConfigDocument>>,
    saves: AtomicUsize,
    fail_saves: bool,
}

impl MemoryStore {
    pub(crate) fn with(self, store: Store, doc: ConfigDocument) -> Self {
        self.docs.lock().unwrap().insert(store, doc);
        self
    }

    pub(crate) fn failing_saves(mut self) -> Self {
        self.fail_saves = true;
        self
    }

    pub(crate) fn doc(&self, store: Store) -> ConfigDocument {
        self.docs
            .lock()
            .unwrap()
            .get(&store)
            .cloned()
            .unwrap_or_default()
    }

    pub(crate) fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

impl ConfigStore for MemoryStore {
    fn load(
        &self,
        store: Store,
    ) -> impl Future<Output = Result<ConfigDocument, DashConfError>> + Send {
        let doc = self.doc(store);
        async { Ok(doc) }
    }

    fn save(
        &self,
        store: Store,
        document: &ConfigDocument,
    ) -> impl Future<Output = Result<(), DashConfError>> + Send {
        self.saves.fetch_add(1, Ordering::SeqCst);
        let result = if self.fail_saves {
            Err(storage_error("disk full"))
        } else {
            self.docs.lock().unwrap().insert(store, document.clone());
            Ok(())
        };
        async { result }
    }
}

/// Users served by [`StubFactory`]; `None` simulates an unreachable store.
#[derive(Clone, Default)]
pub(crate) struct StubFactory {
    users: Option<Vec<String>>,
    created: Arc<Mutex<Vec<(String, String)>>>,
}

impl StubFactory {
    pub(crate) fn with_users(names: &[&str]) -> Self {
        Self {
            users: Some(names.iter().map(|n| (*n).to_string()).collect()),
            created: Arc::default(),
        }
    }

    pub(crate) fn unreachable() -> Self {
        Self::default()
    }

    pub(crate) fn created(&self) -> Vec<(String, String)> {
        self.created.lock().unwrap().clone()
    }
}

pub(crate) struct StubUsers {
    users: Vec<String>,
    created: Arc<Mutex<Vec<(String, String)>>>,
}

impl UserBackend for StubUsers {
    fn list_users(&self) -> impl Future<Output = Result<Vec<String>, DashConfError>> + Send {
        let users = self.users.clone();
        async { Ok(users) }
    }

    fn count_users(&self) -> impl Future<Output = Result<usize, DashConfError>> + Send {
        let count = self.users.len();
        async move { Ok(count) }
    }

    fn create_user(
        &self,
        username: &str,
        password: &str,
    ) -> impl Future<Output = Result<(), DashConfError>> + Send {
        self.created
            .lock()
            .unwrap()
            .push((username.to_string(), password.to_string()));
        async { Ok(()) }
    }
}

impl UserBackendFactory for StubFactory {
    type Backend = StubUsers;

    fn connect(
        &self,
        _backend: &AuthBackend,
        _resource: &Resource,
    ) -> impl Future<Output = Result<StubUsers, DashConfError>> + Send {
        let result = match &self.users {
            Some(users) => Ok(StubUsers {
                users: users.clone(),
                created: Arc::clone(&self.created),
            }),
            None => Err(storage_error("connection refused")),
        };
        async { result }
    }
}

#[derive(Default)]
pub(crate) struct StubModules {
    modules: Mutex<Vec<Module>>,
    loaded: Mutex<Vec<String>>,
    broken: Option<&'static str>,
}

impl StubModules {
    pub(crate) fn with_module(self, name: &str, enabled: bool) -> Self {
        self.modules.lock().unwrap().push(Module {
            name: name.to_string(),
            enabled,
            path: format!("/usr/share/dashconf/modules/{name}").into(),
            version: None,
            description: None,
        });
        self
    }

    /// Make enable/load of `name` fail.
    pub(crate) fn broken(mut self, name: &'static str) -> Self {
        self.broken = Some(name);
        self
    }

    pub(crate) fn is_enabled(&self, name: &str) -> bool {
        self.modules
            .lock()
            .unwrap()
            .iter()
            .any(|m| m.name == name && m.enabled)
    }

    pub(crate) fn loaded(&self) -> Vec<String> {
        self.loaded.lock().unwrap().clone()
    }

    fn set_enabled(&self, name: &str, enabled: bool) -> Result<(), DashConfError> {
        if self.broken == Some(name) {
            return Err(ModuleError::new(name, format!("Cannot enable module \"{name}\"")).into());
        }
        for module in self.modules.lock().unwrap().iter_mut() {
            if module.name == name {
                module.enabled = enabled;
            }
        }
        Ok(())
    }
}

impl ModuleManager for StubModules {
    fn list(&self) -> impl Future<Output = Result<Vec<Module>, DashConfError>> + Send {
        let modules = self.modules.lock().unwrap().clone();
        async { Ok(modules) }
    }

    fn has_installed(
        &self,
        name: &str,
    ) -> impl Future<Output = Result<bool, DashConfError>> + Send {
        let found = self.modules.lock().unwrap().iter().any(|m| m.name == name);
        async move { Ok(found) }
    }

    fn get(
        &self,
        name: &str,
    ) -> impl Future<Output = Result<Option<Module>, DashConfError>> + Send {
        let found = self
            .modules
            .lock()
            .unwrap()
            .iter()
            .find(|m| m.name == name)
            .cloned();
        async { Ok(found) }
    }

    fn enable(&self, name: &str) -> impl Future<Output = Result<(), DashConfError>> + Send {
        let result = self.set_enabled(name, true);
        async { result }
    }

    fn disable(&self, name: &str) -> impl Future<Output = Result<(), DashConfError>> + Send {
        let result = self.set_enabled(name, false);
        async { result }
    }

    fn load(&self, name: &str) -> impl Future<Output = Result<(), DashConfError>> + Send {
        self.loaded.lock().unwrap().push(name.to_string());
        async { Ok(()) }
    }
}
