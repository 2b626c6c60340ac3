//! # git-whowhat
//!
//! Show which authors touched which files over a revision range, with files
//! that share the exact same set of authors grouped together. Useful as a
//! quick "who touched what" before a merge or rebase.
//!
//! The run is one straight pass:
//! - Build a `git log --format='  WHO:%an' --name-only` invocation
//! - Stream its output line by line into a file→authors index
//! - Invert the index into author-set groups
//! - Print each group: authors, then its files tab-indented
//!
//! ## Usage
//!
//! ```bash
//! # Everything since ORIG_HEAD (e.g. right after a pull or rebase)
//! git whowhat
//!
//! # An explicit range, limited to a path
//! git whowhat v1.0..v1.1 -- src/
//! ```
//!
//! ## Modules
//!
//! - [`cli`] - Flag parsing and main entry point
//! - [`git`] - `git log` invocation and output streaming
//! - [`index`] - Line parser and file→authors index
//! - [`groups`] - Author-set grouping and report output
//! - [`error`] - Error type

pub mod cli;
pub mod error;
pub mod git;
pub mod groups;
pub mod index;
