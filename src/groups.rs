use std::collections::{HashMap, HashSet};
use std::fmt;
use std::io::{self, Write};

use crate::index::FileAuthorIndex;

/// Canonical name of an author set: the authors sorted and joined by `,`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GroupKey(String);

impl GroupKey {
    /// Builds the key for a set of authors, independent of iteration order.
    pub fn from_authors(authors: &HashSet<String>) -> Self {
        let mut sorted: Vec<&str> = authors.iter().map(String::as_str).collect();
        sorted.sort();
        GroupKey(sorted.join(","))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The key split back into one author per item.
    ///
    /// An author whose name itself contains a comma comes back in pieces.
    pub fn authors(&self) -> impl Iterator<Item = &str> {
        self.0.split(',')
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Files clustered by identical author set.
///
/// Each group's file list is kept sorted. Iteration order over the groups is
/// unspecified.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Groups {
    by_key: HashMap<GroupKey, Vec<String>>,
}

impl Groups {
    /// Inverts a [`FileAuthorIndex`] into author-set groups.
    pub fn from_index(index: &FileAuthorIndex) -> Self {
        let mut by_key: HashMap<GroupKey, Vec<String>> = HashMap::new();
        for (path, authors) in index.iter() {
            by_key
                .entry(GroupKey::from_authors(authors))
                .or_default()
                .push(path.clone());
        }
        for files in by_key.values_mut() {
            files.sort();
        }
        Groups { by_key }
    }

    pub fn get(&self, key: &str) -> Option<&[String]> {
        self.by_key
            .get(&GroupKey(key.to_string()))
            .map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&GroupKey, &Vec<String>)> {
        self.by_key.iter()
    }

    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }

    /// Total number of files across every group.
    pub fn file_count(&self) -> usize {
        self.by_key.values().map(Vec::len).sum()
    }

    /// Writes the report: per group, one author per line, then the files
    /// tab-indented one per line. Groups are separated by a blank line.
    ///
    /// ```text
    /// alice
    /// bob
    /// 	b.txt
    ///
    /// alice
    /// 	a.txt
    /// ```
    pub fn write_report<W: Write>(&self, out: &mut W) -> io::Result<()> {
        let total = self.by_key.len();
        for (n, (key, files)) in self.by_key.iter().enumerate() {
            let authors: Vec<&str> = key.authors().collect();
            write!(out, "{}", authors.join("\n"))?;
            write!(out, "\n\t")?;
            writeln!(out, "{}", files.join("\n\t"))?;
            if n + 1 < total {
                writeln!(out)?;
            }
        }
        Ok(())
    }
}
