//! execas: drop privileges to a target user and exec a command in its place.
//!
//! The trusted boundary between a privileged caller (typically a container
//! runtime or orchestration agent running as root) and an unprivileged
//! workload. One linear, irreversible pipeline per process lifetime:
//!
//! 1. [`identity`]: resolve the target user name to UID/GID
//! 2. [`transition`]: install supplementary groups, drop GID then UID,
//!    exec the payload — ordering enforced by a type-state chain
//! 3. [`cli`]: argument parsing, diagnostics, exit-code conventions
//!
//! # Design Principles
//!
//! 1. **Fail closed** - any step failure aborts the launch; nothing ever
//!    proceeds past a failed privilege drop
//! 2. **Kernel as truth** - syscall results are trusted as-is, with no
//!    readback verification and no retry
//! 3. **Types prevent errors** - the GID-before-UID-before-exec order is
//!    unrepresentable to violate

// Shared types and the closed error taxonomy
pub mod types;

// User database lookup
pub mod identity;

// The privilege transition itself
pub mod transition;

// CLI entrypoint wiring for the execas binary
pub mod cli;
