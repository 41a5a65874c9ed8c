//! Host identity primitives backed by `nix`.

use nix::unistd::{self, Gid, Uid, User};

use super::{Account, IdentityOps, PrivilegeError};

/// The real host identity of this process.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemIdentity;

impl SystemIdentity {
    fn switch_err<'a>(
        account: &'a Account,
        step: &'static str,
    ) -> impl FnOnce(nix::Error) -> PrivilegeError + 'a {
        move |source| PrivilegeError::Switch {
            name: account.name.clone(),
            step,
            source,
        }
    }
}

impl IdentityOps for SystemIdentity {
    fn effective_uid(&self) -> u32 {
        unistd::geteuid().as_raw()
    }

    fn lookup(&self, name: &str) -> Result<Option<Account>, PrivilegeError> {
        let user = User::from_name(name).map_err(|source| PrivilegeError::Lookup {
            name: name.to_string(),
            source,
        })?;

        Ok(user.map(|user| Account {
            name: user.name,
            uid: user.uid.as_raw(),
            gid: user.gid.as_raw(),
        }))
    }

    fn assume(&self, account: &Account) -> Result<(), PrivilegeError> {
        let gid = Gid::from_raw(account.gid);
        let uid = Uid::from_raw(account.uid);

        // Groups and gid must change while we are still root.
        #[cfg(not(any(target_os = "macos", target_os = "ios")))]
        unistd::setgroups(&[gid]).map_err(Self::switch_err(account, "set supplementary groups"))?;
        unistd::setgid(gid).map_err(Self::switch_err(account, "set group id"))?;
        unistd::setuid(uid).map_err(Self::switch_err(account, "set user id"))?;

        Ok(())
    }

    #[cfg(any(target_os = "linux", target_os = "android", target_os = "freebsd", target_os = "openbsd"))]
    fn retains_root(&self) -> bool {
        match unistd::getresuid() {
            Ok(ids) => ids.real.is_root() || ids.effective.is_root() || ids.saved.is_root(),
            Err(_) => true,
        }
    }

    #[cfg(not(any(target_os = "linux", target_os = "android", target_os = "freebsd", target_os = "openbsd")))]
    fn retains_root(&self) -> bool {
        unistd::getuid().is_root() || unistd::geteuid().is_root()
    }
}
