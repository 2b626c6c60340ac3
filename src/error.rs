use std::io;

use thiserror::Error;

/// Errors that end a `git-whowhat` run.
///
/// Failures while relaying the subprocess's stderr are not represented here;
/// they are reported in place and never abort the report.
#[derive(Debug, Error)]
pub enum WhoWhatError {
    /// `git` could not be resolved on `PATH`.
    #[error("`git` not found in PATH")]
    GitNotFound,

    /// The history query subprocess could not be launched.
    #[error("failed to start `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    /// The subprocess was spawned without the named pipe attached.
    #[error("subprocess {0} was not captured")]
    MissingPipe(&'static str),

    /// Reading the history query's standard output failed.
    #[error("failed to read history output: {0}")]
    Read(#[source] io::Error),

    /// Writing to our own standard output failed.
    #[error("failed to write output: {0}")]
    Write(#[source] io::Error),

    /// A leading `-x` argument that is not one of our flags.
    #[error("unknown option `{0}`")]
    UnknownOption(String),
}

impl WhoWhatError {
    /// True when the reader on the other end of stdout went away.
    pub fn is_broken_pipe(&self) -> bool {
        matches!(self, WhoWhatError::Write(e) if e.kind() == io::ErrorKind::BrokenPipe)
    }
}
