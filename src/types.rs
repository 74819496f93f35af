//! Shared types for the privilege transition pipeline.

use nix::errno::Errno;
use nix::unistd::{Gid, Uid};
use thiserror::Error;

/// A user identity resolved from the system user database.
///
/// Created once by [`crate::identity::resolve_user`] and immediately consumed
/// by the transition; it has no life beyond a single invocation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Identity {
    /// User name as it appears in the user database.
    pub name: String,
    /// Primary user ID.
    pub uid: Uid,
    /// Primary group ID.
    pub gid: Gid,
}

/// The command to exec after the transition, passed through unmodified.
///
/// `argv[0]` is the program name itself; PATH search applies when it contains
/// no path separator.
#[derive(Clone, Debug)]
pub struct CommandSpec {
    argv: Vec<String>,
}

impl CommandSpec {
    /// Build a command spec from a raw argument vector.
    pub fn new(argv: &[String]) -> Result<Self> {
        if argv.is_empty() {
            return Err(LaunchError::Usage("empty command".to_string()));
        }
        Ok(CommandSpec {
            argv: argv.to_vec(),
        })
    }

    pub fn program(&self) -> &str {
        &self.argv[0]
    }

    pub fn argv(&self) -> &[String] {
        &self.argv
    }
}

/// Every failure mode of the launch pipeline.
///
/// All variants are terminal: nothing is retried, nothing degrades into a
/// partially-privileged exec. The process reports the error on stderr and
/// exits non-zero.
#[derive(Error, Debug)]
pub enum LaunchError {
    #[error("usage error: {0}")]
    Usage(String),

    #[error("user not found: {0}")]
    UserNotFound(String),

    #[error("user database lookup failed for {name}: {errno}")]
    Lookup { name: String, errno: Errno },

    #[error("couldn't set group list for {name}: {errno}")]
    GroupInit { name: String, errno: Errno },

    #[error("couldn't set gid to {gid}: {errno}")]
    SetGid { gid: Gid, errno: Errno },

    #[error("couldn't set uid to {uid}: {errno}")]
    SetUid { uid: Uid, errno: Errno },

    #[error("command contains NUL byte: {0}")]
    InvalidCommand(String),

    #[error("exec failed: {program}: {errno}")]
    ExecFailed { program: String, errno: Errno },

    #[error("exec returned without error")]
    ExecReturned,
}

pub type Result<T> = std::result::Result<T, LaunchError>;
