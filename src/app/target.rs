//! `<module>:<object>` application targets.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Errors produced while parsing an [`AppTarget`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AppTargetError {
    #[error("expected `<module>:<object>`, got `{0}`")]
    MissingSeparator(String),

    #[error("`{0}` is not a valid module path")]
    InvalidModule(String),

    #[error("`{0}` is not a valid object name")]
    InvalidObject(String),
}

/// The application object to serve, addressed as `<module>:<object>`.
///
/// The module may be a dotted path (`api.main:app`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AppTarget {
    module: String,
    object: String,
}

impl AppTarget {
    pub fn module(&self) -> &str {
        &self.module
    }

    pub fn object(&self) -> &str {
        &self.object
    }
}

impl Default for AppTarget {
    fn default() -> Self {
        Self {
            module: "main".to_string(),
            object: "app".to_string(),
        }
    }
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

impl FromStr for AppTarget {
    type Err = AppTargetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (module, object) = s
            .split_once(':')
            .ok_or_else(|| AppTargetError::MissingSeparator(s.to_string()))?;

        if !module.split('.').all(is_identifier) {
            return Err(AppTargetError::InvalidModule(module.to_string()));
        }
        if !is_identifier(object) {
            return Err(AppTargetError::InvalidObject(object.to_string()));
        }

        Ok(Self {
            module: module.to_string(),
            object: object.to_string(),
        })
    }
}

impl fmt::Display for AppTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.module, self.object)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_module_and_object() {
        let target: AppTarget = "main:app".parse().unwrap();
        assert_eq!(target.module(), "main");
        assert_eq!(target.object(), "app");
        assert_eq!(target, AppTarget::default());
    }

    #[test]
    fn accepts_dotted_module() {
        let target: AppTarget = "api.v1_main:application".parse().unwrap();
        assert_eq!(target.module(), "api.v1_main");
        assert_eq!(target.to_string(), "api.v1_main:application");
    }

    #[test]
    fn rejects_malformed_targets() {
        assert_eq!(
            "main".parse::<AppTarget>(),
            Err(AppTargetError::MissingSeparator("main".into()))
        );
        assert_eq!(
            ":app".parse::<AppTarget>(),
            Err(AppTargetError::InvalidModule("".into()))
        );
        assert_eq!(
            "main..x:app".parse::<AppTarget>(),
            Err(AppTargetError::InvalidModule("main..x".into()))
        );
        assert_eq!(
            "main:".parse::<AppTarget>(),
            Err(AppTargetError::InvalidObject("".into()))
        );
        assert_eq!(
            "main:app:extra".parse::<AppTarget>(),
            Err(AppTargetError::InvalidObject("app:extra".into()))
        );
        assert_eq!(
            "main:9app".parse::<AppTarget>(),
            Err(AppTargetError::InvalidObject("9app".into()))
        );
    }
}
