use std::collections::{HashMap, HashSet};

/// Prefix of the per-commit header line requested from `git log`.
///
/// Must match the `--format` argument built in [`crate::git::log_args`].
pub const WHO: &str = "  WHO:";

/// Mapping from a file path to every distinct author that touched it.
///
/// Paths and author names are compared as exact strings.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FileAuthorIndex {
    files: HashMap<String, HashSet<String>>,
}

impl FileAuthorIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that `author` touched `path`. Repeats are no-ops.
    pub fn insert(&mut self, path: &str, author: &str) {
        match self.files.get_mut(path) {
            Some(authors) => {
                if !authors.contains(author) {
                    authors.insert(author.to_string());
                }
            }
            None => {
                let mut authors = HashSet::new();
                authors.insert(author.to_string());
                self.files.insert(path.to_string(), authors);
            }
        }
    }

    /// Authors recorded for `path`, if the path was seen at all.
    pub fn authors(&self, path: &str) -> Option<&HashSet<String>> {
        self.files.get(path)
    }

    /// Iterates over `(path, authors)` pairs in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &HashSet<String>)> {
        self.files.iter()
    }

    /// Number of distinct paths.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// Returns the author name if `line` is a `WHO` header.
///
/// A line that is exactly the marker, with nothing after it, is not a header
/// and falls through to being a file path.
pub fn author_from_header(line: &str) -> Option<&str> {
    if line.len() > WHO.len() {
        line.strip_prefix(WHO)
    } else {
        None
    }
}

/// Stateful consumer of `git log --name-only` output.
///
/// Files that show up before the first header are attributed to the empty
/// author `""`.
#[derive(Debug, Default)]
pub struct LogParser {
    current_author: String,
    index: FileAuthorIndex,
}

impl LogParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds one line, without its terminator.
    pub fn feed(&mut self, line: &str) {
        if line.is_empty() {
            return;
        }

        if let Some(author) = author_from_header(line) {
            self.current_author.clear();
            self.current_author.push_str(author);
            return;
        }

        self.index.insert(line, &self.current_author);
    }

    pub fn finish(self) -> FileAuthorIndex {
        self.index
    }
}

/// Drains `lines` through a [`LogParser`], stopping at the first error.
pub fn collect_lines<I, E>(lines: I) -> Result<FileAuthorIndex, E>
where
    I: IntoIterator<Item = Result<String, E>>,
{
    let mut parser = LogParser::new();
    for line in lines {
        parser.feed(&line?);
    }
    Ok(parser.finish())
}
