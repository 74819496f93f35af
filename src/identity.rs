//! User identity resolution against the system user database.

use nix::unistd::User;

use crate::types::{Identity, LaunchError, Result};

/// Resolve a user name to its UID and primary GID.
///
/// Uses the reentrant lookup-by-name primitive (`getpwnam_r` under the hood),
/// which returns the first matching database entry and owns its own iteration
/// state, so no process-wide cursor is left behind for later lookups to trip
/// over. There is no fallback identity: an unknown user is a hard error.
pub fn resolve_user(name: &str) -> Result<Identity> {
    if name.is_empty() {
        return Err(LaunchError::Usage("user name must not be empty".to_string()));
    }

    match User::from_name(name) {
        Ok(Some(user)) => {
            log::debug!("resolved {} to uid={}, gid={}", name, user.uid, user.gid);
            Ok(Identity {
                name: user.name,
                uid: user.uid,
                gid: user.gid,
            })
        }
        Ok(None) => Err(LaunchError::UserNotFound(name.to_string())),
        Err(errno) => Err(LaunchError::Lookup {
            name: name.to_string(),
            errno,
        }),
    }
}
