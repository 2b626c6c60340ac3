use std::ffi::OsStr;
use std::io::{self, BufRead, BufReader, Write};
use std::path::Path;
use std::process::{Child, ChildStdout, Command, Stdio};
use std::thread;

use console::style;

use crate::error::WhoWhatError;
use crate::index::WHO;

/// Revision range used when no positional arguments are given: everything
/// since the last recorded undo point.
pub const DEFAULT_RANGE: &str = "ORIG_HEAD..";

/// Builds the argument list for `git log`.
///
/// The fixed prefix asks for one `WHO` header per commit and only the names
/// of changed files. `extra` is appended verbatim; when empty,
/// [`DEFAULT_RANGE`] is used instead.
///
/// # Examples
///
/// ```
/// use git_whowhat::git::log_args;
///
/// assert_eq!(
///     log_args(&[]),
///     vec!["log", "--format=  WHO:%an", "--name-only", "ORIG_HEAD.."]
/// );
/// assert_eq!(
///     log_args(&["v1..v2".to_string(), "--".to_string(), "src".to_string()]),
///     vec!["log", "--format=  WHO:%an", "--name-only", "v1..v2", "--", "src"]
/// );
/// ```
pub fn log_args(extra: &[String]) -> Vec<String> {
    let mut args = vec![
        String::from("log"),
        format!("--format={}%an", WHO),
        String::from("--name-only"),
    ];
    if extra.is_empty() {
        args.push(String::from(DEFAULT_RANGE));
    } else {
        args.extend(extra.iter().cloned());
    }
    args
}

/// Renders a command line the way `-d` echoes it: program and arguments
/// joined by single spaces, without quoting.
pub fn render_command(program: &str, args: &[String]) -> String {
    let mut line = String::from(program);
    for arg in args {
        line.push(' ');
        line.push_str(arg);
    }
    line
}

/// A running history query, read one line at a time.
///
/// The child's stderr is handed to a background relay thread at spawn time.
/// Nothing waits on the child or the relay; dropping the stream leaves both
/// to be reclaimed at process exit.
pub struct HistoryStream {
    _child: Child,
    stdout: BufReader<ChildStdout>,
    buf: Vec<u8>,
}

impl HistoryStream {
    /// Starts `git` with `args`, inside `work_dir` when given.
    pub fn git<S: AsRef<OsStr>>(args: &[S], work_dir: Option<&Path>) -> Result<Self, WhoWhatError> {
        let mut cmd = Command::new("git");
        cmd.args(args);
        if let Some(dir) = work_dir {
            cmd.current_dir(dir);
        }
        Self::spawn(cmd)
    }

    /// Spawns a fully configured command with piped stdout/stderr and a
    /// null stdin, and starts relaying its stderr to ours.
    pub fn spawn(cmd: Command) -> Result<Self, WhoWhatError> {
        Self::spawn_with_relay(cmd, io::stderr())
    }

    /// Like [`HistoryStream::spawn`], relaying the child's stderr into
    /// `relay_to` instead. A failing `relay_to` is reported on our stderr
    /// and stops the relay; the stdout lines keep coming.
    pub fn spawn_with_relay<W>(mut cmd: Command, mut relay_to: W) -> Result<Self, WhoWhatError>
    where
        W: Write + Send + 'static,
    {
        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        let mut child = match cmd.spawn() {
            Ok(c) => c,
            Err(e) => {
                return Err(WhoWhatError::Spawn {
                    program: cmd.get_program().to_string_lossy().into_owned(),
                    source: e,
                });
            }
        };

        let stdout = child.stdout.take().ok_or(WhoWhatError::MissingPipe("stdout"))?;
        let stderr = child.stderr.take().ok_or(WhoWhatError::MissingPipe("stderr"))?;

        thread::spawn(move || {
            if let Err(e) = relay_lines(BufReader::new(stderr), &mut relay_to) {
                eprintln!(
                    "{}",
                    style(format!("git-whowhat: relaying stderr failed: {}", e)).yellow()
                );
            }
        });

        Ok(HistoryStream {
            _child: child,
            stdout: BufReader::new(stdout),
            buf: Vec::new(),
        })
    }
}

impl Iterator for HistoryStream {
    type Item = Result<String, WhoWhatError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.buf.clear();
        match self.stdout.read_until(b'\n', &mut self.buf) {
            Ok(0) => None,
            Ok(_) => Some(Ok(decode_line(&self.buf))),
            Err(e) => Some(Err(WhoWhatError::Read(e))),
        }
    }
}

/// Strips one `\n` and then one `\r`, decoding lossily as UTF-8.
fn decode_line(raw: &[u8]) -> String {
    let line = raw.strip_suffix(b"\n").unwrap_or(raw);
    let line = line.strip_suffix(b"\r").unwrap_or(line);
    String::from_utf8_lossy(line).into_owned()
}

/// Copies `input` to `out` line by line, unmodified. Flushes after each line.
fn relay_lines<R: BufRead, W: Write>(mut input: R, out: &mut W) -> io::Result<()> {
    let mut line = Vec::new();
    loop {
        line.clear();
        if input.read_until(b'\n', &mut line)? == 0 {
            return Ok(());
        }
        out.write_all(&line)?;
        out.flush()?;
    }
}
