//! OS-level file utilities.
//!
//! Env files and project bindings are rewritten in place while holding an
//! exclusive advisory lock (`flock(LOCK_EX)`), so two concurrent invocations
//! never interleave their writes. Readers take no lock and may observe a
//! partially written file.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::Path;

/// Permissions for files that may hold secrets (owner read/write only).
pub const SECRET_FILE_MODE: u32 = 0o600;

/// Replace the contents of `path` while holding an exclusive lock on it.
///
/// The file is created with [`SECRET_FILE_MODE`] if it does not exist.
/// Existing files keep their permissions.
#[cfg(unix)]
pub fn write_locked(path: &Path, contents: &str) -> io::Result<()> {
    use nix::fcntl::{Flock, FlockArg};
    use std::os::unix::fs::OpenOptionsExt;

    // Truncation happens after the lock is held, never at open time.
    let file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(false)
        .mode(SECRET_FILE_MODE)
        .open(path)?;

    let mut locked = Flock::lock(file, FlockArg::LockExclusive)
        .map_err(|(_, errno)| io::Error::from(errno))?;

    locked.set_len(0)?;
    locked.write_all(contents.as_bytes())?;
    locked.sync_all()?;
    // Dropping the guard releases the lock.
    Ok(())
}

#[cfg(not(unix))]
pub fn write_locked(path: &Path, contents: &str) -> io::Result<()> {
    let mut file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)?;
    file.write_all(contents.as_bytes())?;
    file.sync_all()
}
