use crate::{error::WhoWhatError, git, groups::Groups, index};

use console::style;
use std::{
    env,
    io::{self, BufWriter, Write},
    path::Path,
};

/// What the command line asked for.
#[derive(Debug, PartialEq, Eq)]
pub enum Invocation {
    /// `-h`: print usage and stop.
    Help,
    /// `-V`: print version and stop.
    Version,
    /// Run the report.
    Report {
        /// `-d`: echo the resolved `git` command first.
        debug: bool,
        /// Passed verbatim to `git log`.
        git_args: Vec<String>,
    },
}

/// Parses arguments (without the program name).
///
/// Flags are only recognised before the first positional argument; a bare
/// `--` ends flag parsing and is dropped. Everything after that belongs to
/// `git log`, so `git whowhat -d v1..v2 -- src` keeps `-- src` intact.
pub fn parse_args<I, S>(args: I) -> Result<Invocation, WhoWhatError>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut debug = false;
    let mut iter = args.into_iter().map(Into::into).peekable();

    while let Some(arg) = iter.peek() {
        if !arg.starts_with('-') || arg == "-" {
            break;
        }
        let arg = match iter.next() {
            Some(a) => a,
            None => break,
        };
        match arg.as_str() {
            "--" => break,
            "-h" | "--help" => return Ok(Invocation::Help),
            "-V" | "--version" => return Ok(Invocation::Version),
            "-d" | "--debug" => debug = true,
            _ => return Err(WhoWhatError::UnknownOption(arg)),
        }
    }

    Ok(Invocation::Report {
        debug,
        git_args: iter.collect(),
    })
}

/// Usage text shown by `-h` and after an unknown option.
pub fn usage() -> &'static str {
    "\
NAME
\tgit-whowhat - Show authors and the files that they modified.

SYNOPSIS
\tgit whowhat [<options>] [<since>..<until> [[--] <path>...]

OPTIONS
\t-d
\t    Print debugging information

\t-h
\t    Show this help message

\t-V
\t    Print version information

\t[<since>..<until> [[--] <path>...]
\t    These are the same argument understood by git log

\t    If none is specified, \"ORIG_HEAD..\" is used as the sole argument
"
}

/// Prints a fatal diagnostic to stderr.
fn report_error(err: &WhoWhatError) {
    eprintln!(
        "{}",
        style(format!("git-whowhat: {}", err)).red().bold()
    );
}

/// Runs the history query and writes the grouped report to `out`.
///
/// When `debug` is set the resolved command is written to `out` before
/// anything else, including the check that `git` is on `PATH`. `git` runs in
/// `work_dir` when given, otherwise in the current directory.
pub fn run<W: Write>(
    debug: bool,
    git_args: &[String],
    work_dir: Option<&Path>,
    out: &mut W,
) -> Result<(), WhoWhatError> {
    let args = git::log_args(git_args);
    if debug {
        emit(out, &format!("{}\n", git::render_command("git", &args)))?;
    }

    if which::which("git").is_err() {
        return Err(WhoWhatError::GitNotFound);
    }

    let stream = git::HistoryStream::git(&args, work_dir)?;
    let file_authors = index::collect_lines(stream)?;
    let groups = Groups::from_index(&file_authors);

    groups.write_report(out).map_err(WhoWhatError::Write)?;
    out.flush().map_err(WhoWhatError::Write)
}

/// Writes `text` to `out` and flushes.
fn emit<W: Write>(out: &mut W, text: &str) -> Result<(), WhoWhatError> {
    out.write_all(text.as_bytes()).map_err(WhoWhatError::Write)?;
    out.flush().map_err(WhoWhatError::Write)
}

/// Maps the outcome of a stdout-producing step to the process result.
///
/// A reader that hung up early is not a failure.
fn finish(result: Result<(), WhoWhatError>) -> Result<i32, ()> {
    match result {
        Ok(()) => Ok(0),
        Err(e) if e.is_broken_pipe() => Ok(0),
        Err(e) => {
            report_error(&e);
            Err(())
        }
    }
}

/// Main CLI entry point for `git-whowhat`.
///
/// 1. Parses leading flags; `-h` and `-V` print and return immediately.
/// 2. Echoes the resolved command under `-d`.
/// 3. Verifies that `git` is on `PATH`.
/// 4. Streams `git log` output into a file→authors index.
/// 5. Groups files by author set and prints the report.
///
/// # Exit Codes
///
/// * `0` – Success, help, version, or stdout closed early by the reader.
/// * `2` – Unknown option.
///
/// Every other failure is reported on stderr and returned as `Err(())`.
pub fn entry() -> Result<i32, ()> {
    let invocation = match parse_args(env::args().skip(1)) {
        Ok(inv) => inv,
        Err(e) => {
            report_error(&e);
            eprint!("{}", usage());
            return Ok(2);
        }
    };

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());

    match invocation {
        Invocation::Help => finish(emit(&mut out, usage())),
        Invocation::Version => finish(emit(
            &mut out,
            &format!("git-whowhat {}\n", env!("CARGO_PKG_VERSION")),
        )),
        Invocation::Report { debug, git_args } => finish(run(debug, &git_args, None, &mut out)),
    }
}

#[cfg(test)]
mod tests {
    use super::{Invocation, emit, finish, parse_args, run, usage};
    use crate::error::WhoWhatError;
    use std::fs;
    use std::io::{self, Write};
    use std::path::Path;
    use std::process::Command;

    /// Writer whose reader has gone away.
    struct HungUp;

    impl Write for HungUp {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::from(io::ErrorKind::BrokenPipe))
        }

        fn flush(&mut self) -> io::Result<()> {
            Err(io::Error::from(io::ErrorKind::BrokenPipe))
        }
    }

    fn git_in(dir: &Path, args: &[&str]) {
        let status = Command::new("git")
            .args(["-c", "commit.gpgsign=false", "-c", "init.defaultBranch=main"])
            .args(args)
            .current_dir(dir)
            .status()
            .expect("failed to run git");
        assert!(status.success(), "git {:?} failed", args);
    }

    fn commit_as(dir: &Path, name: &str, files: &[&str]) {
        for f in files {
            fs::write(dir.join(f), format!("{} was here\n", name)).expect("failed to write file");
        }
        let mut add = vec!["add"];
        add.extend_from_slice(files);
        git_in(dir, &add);
        let user = format!("user.name={}", name);
        let email = format!("user.email={}@example.com", name);
        git_in(
            dir,
            &["-c", user.as_str(), "-c", email.as_str(), "commit", "-q", "-m", "change"],
        );
    }

    fn blocks(report: &str) -> Vec<String> {
        let mut v: Vec<String> = report
            .split("\n\n")
            .map(|b| b.trim_end_matches('\n').to_string())
            .filter(|b| !b.is_empty())
            .collect();
        v.sort();
        v
    }

    fn report(debug: bool, git_args: &[&str]) -> Invocation {
        Invocation::Report {
            debug,
            git_args: git_args.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn no_args_runs_default_report() {
        let inv = parse_args(Vec::<String>::new()).expect("empty args are valid");
        assert_eq!(inv, report(false, &[]));
    }

    #[test]
    fn help_wins_over_other_arguments() {
        assert_eq!(parse_args(["-h", "v1..v2"]).ok(), Some(Invocation::Help));
        assert_eq!(parse_args(["-d", "-h", "main.."]).ok(), Some(Invocation::Help));
        assert_eq!(parse_args(["--help"]).ok(), Some(Invocation::Help));
    }

    #[test]
    fn version_flag() {
        assert_eq!(parse_args(["-V"]).ok(), Some(Invocation::Version));
    }

    #[test]
    fn debug_flag_with_range_and_paths() {
        let inv = parse_args(["-d", "v1..v2", "--", "src/"]).expect("valid args");
        assert_eq!(inv, report(true, &["v1..v2", "--", "src/"]));
    }

    #[test]
    fn flags_after_first_positional_go_to_git() {
        let inv = parse_args(["main..", "-h", "--stat"]).expect("valid args");
        assert_eq!(inv, report(false, &["main..", "-h", "--stat"]));
    }

    #[test]
    fn double_dash_ends_flags_and_is_dropped() {
        let inv = parse_args(["-d", "--", "--all"]).expect("valid args");
        assert_eq!(inv, report(true, &["--all"]));
    }

    #[test]
    fn unknown_leading_option_is_rejected() {
        match parse_args(["--since=yesterday"]) {
            Err(WhoWhatError::UnknownOption(opt)) => assert_eq!(opt, "--since=yesterday"),
            other => panic!("unexpected parse result: {:?}", other),
        }
    }

    #[test]
    fn usage_mentions_flags_and_default_range() {
        let text = usage();
        assert!(text.starts_with("NAME\n\tgit-whowhat"));
        assert!(text.contains("\t-d\n"));
        assert!(text.contains("\t-h\n"));
        assert!(text.contains("\"ORIG_HEAD..\""));
    }

    #[test]
    fn debug_run_echoes_command_then_reports_repo() {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        git_in(dir.path(), &["init", "-q"]);
        commit_as(dir.path(), "alice", &["a.txt", "b.txt"]);
        commit_as(dir.path(), "bob", &["b.txt"]);

        let mut out = Vec::new();
        run(true, &[String::from("HEAD")], Some(dir.path()), &mut out).expect("run failed");
        let text = String::from_utf8(out).expect("output is utf-8");

        let (first, rest) = text.split_once('\n').expect("echo line present");
        assert_eq!(first, "git log --format=  WHO:%an --name-only HEAD");
        assert_eq!(
            blocks(rest),
            vec!["alice\n\ta.txt".to_string(), "alice\nbob\n\tb.txt".to_string()]
        );
    }

    #[test]
    fn debug_echo_precedes_failed_start() {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        let missing = dir.path().join("gone");

        let mut out = Vec::new();
        let result = run(true, &[], Some(&missing), &mut out);
        assert!(result.is_err());
        assert_eq!(
            String::from_utf8(out).expect("output is utf-8"),
            "git log --format=  WHO:%an --name-only ORIG_HEAD..\n"
        );
    }

    #[test]
    fn broken_pipe_on_help_exits_zero() {
        let result = emit(&mut HungUp, usage());
        assert!(result.as_ref().is_err_and(|e| e.is_broken_pipe()));
        assert_eq!(finish(result), Ok(0));
    }

    #[test]
    fn other_failures_are_errors() {
        assert_eq!(finish(Err(WhoWhatError::GitNotFound)), Err(()));
        assert_eq!(finish(Ok(())), Ok(0));
    }
}
