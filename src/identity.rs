//! Invoking-user lookup used by the startup checks

use std::path::PathBuf;

use anyhow::Result;

/// The user the process runs as
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserIdentity {
    pub name: String,
    /// Effective uid where the platform has one
    pub uid: Option<u32>,
    pub home: Option<PathBuf>,
}

impl UserIdentity {
    pub fn is_elevated(&self) -> bool {
        self.uid == Some(0)
    }
}

/// Resolves the identity of the invoking user
pub trait IdentityProvider {
    fn current_user(&self) -> Result<UserIdentity>;
}

/// Looks the user up from the operating system
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemIdentity;

#[cfg(unix)]
impl IdentityProvider for SystemIdentity {
    fn current_user(&self) -> Result<UserIdentity> {
        use anyhow::Context;
        use nix::unistd::{Uid, User};

        let uid = Uid::effective();
        let user = User::from_uid(uid)
            .with_context(|| format!("failed to read the user database for uid {}", uid))?
            .with_context(|| format!("no user entry for uid {}", uid))?;

        Ok(UserIdentity {
            name: user.name,
            uid: Some(uid.as_raw()),
            home: Some(user.dir),
        })
    }
}

#[cfg(not(unix))]
impl IdentityProvider for SystemIdentity {
    fn current_user(&self) -> Result<UserIdentity> {
        use anyhow::Context;

        let name = std::env::var("USERNAME").context("USERNAME is not set")?;
        Ok(UserIdentity {
            name,
            uid: None,
            home: dirs::home_dir(),
        })
    }
}

/// A fixed identity, for running the bootstrap under a simulated user
#[derive(Debug, Clone)]
pub struct FixedIdentity(pub UserIdentity);

impl FixedIdentity {
    pub fn user(name: &str, uid: u32) -> Self {
        Self(UserIdentity {
            name: name.to_string(),
            uid: Some(uid),
            home: None,
        })
    }
}

impl IdentityProvider for FixedIdentity {
    fn current_user(&self) -> Result<UserIdentity> {
        Ok(self.0.clone())
    }
}

/// An identity lookup that always fails
#[derive(Debug, Clone, Copy, Default)]
pub struct UnresolvableIdentity;

impl IdentityProvider for UnresolvableIdentity {
    fn current_user(&self) -> Result<UserIdentity> {
        anyhow::bail!("user lookup is unavailable")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_is_elevated() {
        assert!(FixedIdentity::user("root", 0).0.is_elevated());
        assert!(!FixedIdentity::user("minio", 1000).0.is_elevated());
    }

    #[test]
    fn test_unresolvable_identity_fails() {
        assert!(UnresolvableIdentity.current_user().is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_system_identity_matches_effective_uid() {
        // containers may run under a uid with no passwd entry
        if let Ok(user) = SystemIdentity.current_user() {
            assert_eq!(user.uid, Some(nix::unistd::Uid::effective().as_raw()));
            assert!(!user.name.is_empty());
        }
    }
}
