use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use log::debug;

/// Name of the lock file inside the data directory
pub const LOCK_FILE: &str = ".lock";

const DEFAULT_WAIT: Duration = Duration::from_secs(5);
const RETRY_EVERY: Duration = Duration::from_millis(10);

/// Exclusive advisory lock on a data directory.
///
/// Every read-modify-write of the task file happens under this lock, in the
/// TUI and the CLI alike, so two `tl` processes never interleave writes.
/// Released when dropped. The lock file itself is left in place: removing
/// it would let a waiter lock an unlinked inode while a newcomer locks a
/// fresh one.
#[derive(Debug)]
pub struct FileLock {
    _file: File,
    waited: Duration,
}

/// Error type for lock operations
#[derive(Debug, thiserror::Error)]
pub enum LockError {
    #[error("could not open lock file {path}: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("data directory {dir} is busy: another tl process held it for {waited:?}")]
    Busy { dir: PathBuf, waited: Duration },
}

impl FileLock {
    /// Lock `data_dir`, retrying until `wait` has passed
    pub fn acquire(data_dir: &Path, wait: Duration) -> Result<Self, LockError> {
        let path = data_dir.join(LOCK_FILE);
        let open_err = |e: std::io::Error| LockError::Open {
            path: path.clone(),
            source: e,
        };
        fs::create_dir_all(data_dir).map_err(open_err)?;
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(&path)
            .map_err(open_err)?;

        let start = Instant::now();
        while !try_lock(&file).map_err(open_err)? {
            if start.elapsed() >= wait {
                return Err(LockError::Busy {
                    dir: data_dir.to_path_buf(),
                    waited: start.elapsed(),
                });
            }
            std::thread::sleep(RETRY_EVERY);
        }
        let waited = start.elapsed();
        if waited >= RETRY_EVERY {
            debug!("event=lock_acquire waited_ms={}", waited.as_millis());
        }
        Ok(FileLock {
            _file: file,
            waited,
        })
    }

    /// Lock with the default five second wait
    pub fn acquire_default(data_dir: &Path) -> Result<Self, LockError> {
        Self::acquire(data_dir, DEFAULT_WAIT)
    }

    /// Time spent waiting for another holder
    pub fn waited(&self) -> Duration {
        self.waited
    }
}

/// Ok(false) when another open file description holds the lock
#[cfg(unix)]
fn try_lock(file: &File) -> Result<bool, std::io::Error> {
    use std::os::unix::io::AsRawFd;
    let result = unsafe { libc::flock(file.as_raw_fd(), libc::LOCK_EX | libc::LOCK_NB) };
    if result == 0 {
        return Ok(true);
    }
    let err = std::io::Error::last_os_error();
    if err.raw_os_error() == Some(libc::EWOULDBLOCK) {
        Ok(false)
    } else {
        Err(err)
    }
}

#[cfg(not(unix))]
fn try_lock(_file: &File) -> Result<bool, std::io::Error> {
    Ok(true)
}
