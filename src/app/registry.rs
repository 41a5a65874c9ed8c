//! Application object registry.
//!
//! Maps `<module>:<object>` targets to factories that build the axum
//! router served by the serving loop.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use axum::Router;
use thiserror::Error;

use crate::app::builtin;
use crate::app::target::AppTarget;

/// Builds a fresh application router.
pub type AppFactory = Arc<dyn Fn() -> Router + Send + Sync>;

/// Errors raised when the configured application cannot be resolved.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AppLoadError {
    #[error("no module named `{module}`")]
    ModuleNotFound { module: String },

    #[error("module `{module}` has no application object `{object}`")]
    ObjectNotFound { module: String, object: String },
}

/// Known application objects.
#[derive(Clone, Default)]
pub struct AppRegistry {
    apps: HashMap<AppTarget, AppFactory>,
}

impl AppRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry containing the packaged `main:app` service.
    pub fn builtin() -> Self {
        Self::new().with(AppTarget::default(), builtin::app)
    }

    /// Register `factory` under `target`, replacing any previous entry.
    pub fn register<F>(&mut self, target: AppTarget, factory: F) -> &mut Self
    where
        F: Fn() -> Router + Send + Sync + 'static,
    {
        self.apps.insert(target, Arc::new(factory));
        self
    }

    /// Builder form of [`register`](Self::register).
    pub fn with<F>(mut self, target: AppTarget, factory: F) -> Self
    where
        F: Fn() -> Router + Send + Sync + 'static,
    {
        self.register(target, factory);
        self
    }

    pub fn contains(&self, target: &AppTarget) -> bool {
        self.apps.contains_key(target)
    }

    /// Resolve `target` and build its router.
    pub fn load(&self, target: &AppTarget) -> Result<Router, AppLoadError> {
        if let Some(factory) = self.apps.get(target) {
            return Ok(factory());
        }

        let module_known = self.apps.keys().any(|t| t.module() == target.module());
        if module_known {
            Err(AppLoadError::ObjectNotFound {
                module: target.module().to_string(),
                object: target.object().to_string(),
            })
        } else {
            Err(AppLoadError::ModuleNotFound {
                module: target.module().to_string(),
            })
        }
    }
}

impl fmt::Debug for AppRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut targets: Vec<String> = self.apps.keys().map(ToString::to_string).collect();
        targets.sort();
        f.debug_struct("AppRegistry").field("apps", &targets).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_registers_main_app() {
        let registry = AppRegistry::builtin();
        assert!(registry.contains(&AppTarget::default()));
        assert!(registry.load(&AppTarget::default()).is_ok());
    }

    #[test]
    fn unknown_object_in_known_module() {
        let registry = AppRegistry::builtin();
        let err = registry.load(&"main:application".parse().unwrap()).unwrap_err();
        assert_eq!(
            err,
            AppLoadError::ObjectNotFound {
                module: "main".into(),
                object: "application".into(),
            }
        );
    }

    #[test]
    fn unknown_module() {
        let registry = AppRegistry::builtin();
        let err = registry.load(&"server:app".parse().unwrap()).unwrap_err();
        assert_eq!(err, AppLoadError::ModuleNotFound { module: "server".into() });
    }

    #[test]
    fn register_replaces_entry() {
        let mut registry = AppRegistry::new();
        let target: AppTarget = "svc:app".parse().unwrap();
        registry.register(target.clone(), Router::new);
        registry.register(target.clone(), Router::new);
        assert!(registry.load(&target).is_ok());
        assert_eq!(format!("{registry:?}"), r#"AppRegistry { apps: ["svc:app"] }"#);
    }
}
