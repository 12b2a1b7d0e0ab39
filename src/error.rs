//! Error types shared by the shell's commands.
//!
//! Every variant is recoverable: the dispatcher reports it on the error stream
//! and carries on with the next segment. Only the `exit` built-in ends the process.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Failures a command can hit while resolving paths or launching programs.
#[derive(Debug, Error)]
pub enum ShellError {
    /// The home directory could not be determined (needed for `~` and bare `cd`).
    #[error("cannot determine home directory")]
    HomeDirUnavailable,

    /// `chdir` into the target failed.
    #[error("{}: {source}", path.display())]
    ChangeDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A directory listing could not be read.
    #[error("{}: {source}", path.display())]
    ListDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// No executable with this name was found.
    #[error("{name}: command not found")]
    CommandNotFound { name: String },

    /// The program exists but the process could not be started.
    #[error("{name}: {source}")]
    Spawn {
        name: String,
        #[source]
        source: io::Error,
    },
}

impl ShellError {
    /// Map a spawn failure, folding "not found" into [`ShellError::CommandNotFound`].
    pub fn spawn(name: &str, source: io::Error) -> Self {
        if source.kind() == io::ErrorKind::NotFound {
            ShellError::CommandNotFound {
                name: name.to_string(),
            }
        } else {
            ShellError::Spawn {
                name: name.to_string(),
                source,
            }
        }
    }
}
