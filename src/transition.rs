//! Irreversible privilege transition, ordered at compile time.
//!
//! The sequence is fixed and must not drift:
//!
//! 1. install the target user's supplementary groups (still privileged)
//! 2. setresgid — GID before UID
//! 3. setresuid
//! 4. exec the payload
//!
//! CRITICAL: setresgid MUST be called BEFORE setresuid. Changing the UID
//! first discards the privilege needed to change the GID, and a process that
//! keeps its original groups past the transition is a privilege-escalation
//! vector. The type-state chain below makes any other order unrepresentable:
//! each step consumes the previous state, and only the terminal state exposes
//! exec. There is no path back; a failed step aborts the whole launch.

use std::ffi::{CStr, CString};
use std::marker::PhantomData;

use nix::unistd::{execvp, initgroups, setresgid, setresuid};

use crate::types::{CommandSpec, Identity, LaunchError, Result};

/// Identity resolved, nothing mutated yet.
pub struct Resolved;
/// Supplementary group list installed; primary IDs still the caller's.
pub struct GroupsInstalled;
/// Real, effective and saved UID/GID all belong to the target user.
pub struct CredentialsDropped;

/// One-shot privilege transition for the current process.
///
/// Mutates process-wide credential state in place; constructing a second
/// transition after the first has dropped credentials will fail at the
/// kernel, not here.
pub struct Transition<S> {
    identity: Identity,
    _state: PhantomData<S>,
}

impl Transition<Resolved> {
    pub fn new(identity: Identity) -> Self {
        Transition {
            identity,
            _state: PhantomData,
        }
    }

    /// Install the target user's full supplementary group list.
    ///
    /// Must happen while the process still holds the privilege it is about
    /// to give up. A wrong or partial group list would let the target user
    /// keep the caller's group-derived access, so any failure is fatal.
    pub fn install_groups(self) -> Result<Transition<GroupsInstalled>> {
        let name = CString::new(self.identity.name.as_str()).map_err(|_| {
            LaunchError::GroupInit {
                name: self.identity.name.clone(),
                errno: nix::errno::Errno::EINVAL,
            }
        })?;

        log::debug!("installing supplementary groups for {}", self.identity.name);
        initgroups(&name, self.identity.gid).map_err(|errno| LaunchError::GroupInit {
            name: self.identity.name.clone(),
            errno,
        })?;

        // Drop any group-database iteration state initgroups left behind so
        // stale entries cannot influence later group checks in this process.
        unsafe { libc::endgrent() };

        Ok(Transition {
            identity: self.identity,
            _state: PhantomData,
        })
    }
}

impl Transition<GroupsInstalled> {
    /// Drop real, effective and saved GID, then UID, to the target user.
    ///
    /// Setting all three IDs closes the credential-swap path a process with
    /// a privileged real or saved ID could use to climb back up. The syscall
    /// result is trusted as-is; there is no readback verification.
    pub fn drop_credentials(self) -> Result<Transition<CredentialsDropped>> {
        let Identity { uid, gid, .. } = self.identity;

        // GID before UID
        setresgid(gid, gid, gid).map_err(|errno| LaunchError::SetGid { gid, errno })?;
        setresuid(uid, uid, uid).map_err(|errno| LaunchError::SetUid { uid, errno })?;

        log::info!("transitioned to uid={}, gid={}", uid, gid);

        Ok(Transition {
            identity: self.identity,
            _state: PhantomData,
        })
    }
}

impl Transition<CredentialsDropped> {
    /// Replace the process image with the command. Does not return on
    /// success; the only legal way out of a completed transition.
    pub fn exec_command(self, spec: &CommandSpec) -> Result<()> {
        let mut cargv = Vec::with_capacity(spec.argv().len());
        for arg in spec.argv() {
            let c = CString::new(arg.as_str())
                .map_err(|_| LaunchError::InvalidCommand(arg.clone()))?;
            cargv.push(c);
        }
        let cargv_ref: Vec<&CStr> = cargv.iter().map(|c| c.as_c_str()).collect();

        log::debug!("executing payload via execvp: {:?}", spec.argv());
        execvp(cargv[0].as_c_str(), &cargv_ref).map_err(|errno| LaunchError::ExecFailed {
            program: spec.program().to_string(),
            errno,
        })?;
        Ok(())
    }
}

/// Run the whole pipeline: resolve, install groups, drop credentials, exec.
///
/// Never returns `Ok`: on success the process image is replaced. An `Ok`
/// return from exec without an error would mean the kernel handed control
/// back in violation of exec semantics, which is reported as its own error
/// rather than silently ignored.
pub fn launch(user: &str, command: &[String]) -> Result<()> {
    let identity = crate::identity::resolve_user(user)?;
    let spec = CommandSpec::new(command)?;

    Transition::new(identity)
        .install_groups()?
        .drop_credentials()?
        .exec_command(&spec)?;

    Err(LaunchError::ExecReturned)
}

#[cfg(test)]
mod tests {
    use super::*;
    use nix::unistd::{getgid, getuid, Uid, User};

    fn current_identity() -> Identity {
        let user = User::from_uid(getuid()).unwrap().unwrap();
        Identity {
            name: user.name,
            uid: user.uid,
            gid: user.gid,
        }
    }

    #[test]
    fn dropping_to_current_ids_succeeds() {
        // setres*id to the IDs we already hold is permitted at any privilege
        // level, so this exercises the real syscall path deterministically.
        let identity = current_identity();
        let transition = Transition::<GroupsInstalled> {
            identity,
            _state: PhantomData,
        };
        let dropped = transition.drop_credentials().unwrap();
        assert_eq!(dropped.identity.uid, getuid());
        assert_eq!(dropped.identity.gid, getgid());
    }

    #[test]
    fn install_groups_requires_privilege() {
        let identity = current_identity();
        let result = Transition::new(identity).install_groups();
        if Uid::effective().is_root() {
            assert!(result.is_ok());
        } else {
            // unprivileged processes may not rewrite their group list
            match result {
                Ok(_) => panic!("install_groups succeeded without privilege"),
                Err(e) => assert!(matches!(e, LaunchError::GroupInit { .. })),
            }
        }
    }

    #[test]
    fn exec_failure_reports_the_program() {
        let identity = current_identity();
        let transition = Transition::<CredentialsDropped> {
            identity,
            _state: PhantomData,
        };
        let argv = vec!["/no/such/binary".to_string()];
        let spec = CommandSpec::new(&argv).unwrap();
        match transition.exec_command(&spec).unwrap_err() {
            LaunchError::ExecFailed { program, .. } => {
                assert_eq!(program, "/no/such/binary");
            }
            other => panic!("expected ExecFailed, got {other:?}"),
        }
    }

    #[test]
    fn nul_byte_in_argv_is_rejected_before_exec() {
        let identity = current_identity();
        let transition = Transition::<CredentialsDropped> {
            identity,
            _state: PhantomData,
        };
        let argv = vec!["/bin/echo".to_string(), "a\0b".to_string()];
        let spec = CommandSpec::new(&argv).unwrap();
        assert!(matches!(
            transition.exec_command(&spec).unwrap_err(),
            LaunchError::InvalidCommand(_)
        ));
    }

    #[test]
    fn launch_fails_closed_for_unknown_user() {
        let command = vec!["/bin/true".to_string()];
        let err = launch("no-such-user-zzz", &command).unwrap_err();
        assert!(matches!(err, LaunchError::UserNotFound(_)));
    }
}
