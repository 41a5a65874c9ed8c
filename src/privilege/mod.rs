//! Privilege de-escalation.
//!
//! # Responsibilities
//! - Resolve the configured run account
//! - Switch the process to that account when started as root
//! - Verify the switch cannot be undone
//!
//! # Design Decisions
//! - Runs exactly once, before the listening socket exists
//! - Every failure is fatal; nothing is retried
//! - Host primitives sit behind [`IdentityOps`] so ordering is testable without root

mod system;

use thiserror::Error;

use crate::config::IdentityConfig;

pub use system::SystemIdentity;

/// Superuser id on every Unix host.
pub const ROOT_UID: u32 = 0;

/// A host account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub name: String,
    pub uid: u32,
    pub gid: u32,
}

/// Errors that can occur while dropping privileges.
#[derive(Debug, Error)]
pub enum PrivilegeError {
    #[error("failed to look up account `{name}`: {source}")]
    Lookup {
        name: String,
        #[source]
        source: nix::Error,
    },

    #[error("account `{name}` does not exist on this host")]
    UnknownAccount { name: String },

    #[error("account `{name}` has superuser uid 0")]
    PrivilegedAccount { name: String },

    #[error("cannot switch from uid {current_uid} to `{name}` (uid {target_uid}) without superuser rights")]
    CannotSwitch {
        name: String,
        current_uid: u32,
        target_uid: u32,
    },

    #[error("failed to {step} for account `{name}`: {source}")]
    Switch {
        name: String,
        step: &'static str,
        #[source]
        source: nix::Error,
    },

    #[error("effective uid is {actual} after switching to `{name}`, expected {expected}")]
    IdentityMismatch {
        name: String,
        expected: u32,
        actual: u32,
    },

    #[error("superuser ids are still held after switching to `{name}`")]
    Reescalation { name: String },
}

/// Host identity primitives.
pub trait IdentityOps: Send + Sync {
    /// Current effective uid.
    fn effective_uid(&self) -> u32;

    /// Find an account by name. `Ok(None)` when it does not exist.
    fn lookup(&self, name: &str) -> Result<Option<Account>, PrivilegeError>;

    /// Permanently become `account` (groups, gid, then uid).
    fn assume(&self, account: &Account) -> Result<(), PrivilegeError>;

    /// Whether the process could still regain superuser rights.
    fn retains_root(&self) -> bool;
}

/// Proof that the process runs as a non-privileged account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DroppedPrivileges {
    pub account: Account,
    /// `false` when the process was already running as the account.
    pub switched: bool,
}

/// Make `identity.run_user` the effective identity of the process.
pub fn deescalate(
    identity: &IdentityConfig,
    ops: &dyn IdentityOps,
) -> Result<DroppedPrivileges, PrivilegeError> {
    let name = identity.run_user.as_str();
    let account = ops
        .lookup(name)?
        .ok_or_else(|| PrivilegeError::UnknownAccount { name: name.to_string() })?;

    if account.uid == ROOT_UID {
        return Err(PrivilegeError::PrivilegedAccount { name: account.name });
    }

    let current_uid = ops.effective_uid();
    if current_uid == account.uid {
        if ops.retains_root() {
            return Err(PrivilegeError::Reescalation { name: account.name });
        }
        tracing::debug!(user = %account.name, uid = account.uid, "Already running as run user");
        return Ok(DroppedPrivileges { account, switched: false });
    }

    if current_uid != ROOT_UID {
        return Err(PrivilegeError::CannotSwitch {
            name: account.name,
            current_uid,
            target_uid: account.uid,
        });
    }

    ops.assume(&account)?;

    let actual = ops.effective_uid();
    if actual != account.uid {
        return Err(PrivilegeError::IdentityMismatch {
            name: account.name,
            expected: account.uid,
            actual,
        });
    }
    if ops.retains_root() {
        return Err(PrivilegeError::Reescalation { name: account.name });
    }

    tracing::info!(user = %account.name, uid = account.uid, gid = account.gid, "Privileges dropped");
    Ok(DroppedPrivileges { account, switched: true })
}
