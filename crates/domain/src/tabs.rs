//! Tab registry rendered above every configuration page.

use crate::permission::PermissionSet;
use crate::section::allowed_sections;

/// A single navigation tab.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tab {
    pub id: &'static str,
    pub title: &'static str,
    /// Absolute path of the tab target.
    pub url: String,
    pub active: bool,
}

/// Ordered set of tabs, at most one of them active.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tabs {
    tabs: Vec<Tab>,
}

impl Tabs {
    /// One tab per section accessible with `permissions`.
    #[must_use]
    pub fn for_permissions(permissions: &PermissionSet) -> Self {
        let tabs = allowed_sections(permissions)
            .into_iter()
            .map(|section| Tab {
                id: section.id(),
                title: section.title(),
                url: format!("/{}", section.url()),
                active: false,
            })
            .collect();
        Self { tabs }
    }

    /// The standalone tab set of the module pages.
    #[must_use]
    pub fn modules() -> Self {
        Self {
            tabs: vec![Tab {
                id: "modules",
                title: "Modules",
                url: "/config/modules".to_string(),
                active: false,
            }],
        }
        .activate("modules")
    }

    /// Mark the tab with `id` active and every other tab inactive.
    #[must_use]
    pub fn activate(mut self, id: &str) -> Self {
        for tab in &mut self.tabs {
            tab.active = tab.id == id;
        }
        self
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Tab> {
        self.tabs.iter().find(|tab| tab.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Tab> {
        self.tabs.iter()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tabs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::permission::{CONFIG_APPLICATION, CONFIG_RESOURCES, CONFIG_ROLES};

    #[test]
    fn should_only_register_permitted_sections() {
        let perms: PermissionSet = [CONFIG_ROLES, CONFIG_APPLICATION].into_iter().collect();
        let tabs = Tabs::for_permissions(&perms);
        let ids: Vec<_> = tabs.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec!["application", "roles"]);
        assert_eq!(tabs.get("roles").unwrap().url, "/roles");
    }

    #[test]
    fn should_activate_exactly_one_tab() {
        let perms: PermissionSet = [CONFIG_RESOURCES, CONFIG_APPLICATION].into_iter().collect();
        let tabs = Tabs::for_permissions(&perms).activate("resource");
        let active: Vec<_> = tabs.iter().filter(|t| t.active).map(|t| t.id).collect();
        assert_eq!(active, vec!["resource"]);
    }

    #[test]
    fn should_build_empty_registry_without_permissions() {
        assert!(Tabs::for_permissions(&PermissionSet::new()).is_empty());
    }

    #[test]
    fn should_activate_modules_tab() {
        let tabs = Tabs::modules();
        assert!(tabs.get("modules").unwrap().active);
    }
}
