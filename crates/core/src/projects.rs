//! Project discovery and selection.
//!
//! A project is any immediate subdirectory of the root directory. Projects
//! holding the [`IGNORE_MARKER`] file are skipped by per-project actions.

use std::cmp::Reverse;
use std::fs;
use std::path::Path;

use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;
use itertools::Itertools;
use log::debug;

use crate::config::IGNORE_MARKER;
use crate::error::{Error, Result};

/// A project as shown by `--list`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectListing {
    pub name: String,
    pub ignored: bool,
}

/// Returns the names of all immediate subdirectories of `root`, in the order
/// the file system lists them.
///
/// # Errors
///
/// Returns an error if `root` cannot be read.
pub fn discover(root: &Path) -> Result<Vec<String>> {
    let io_error =
        |e| Error::io_error("projects root".to_string(), root.display().to_string(), e);

    let mut projects = Vec::new();
    for entry in fs::read_dir(root).map_err(io_error)? {
        let entry = entry.map_err(io_error)?;

        // Follows symlinks, so a linked project directory counts too
        if !entry.path().is_dir() {
            continue;
        }

        match entry.file_name().into_string() {
            Ok(name) => projects.push(name),
            Err(name) => debug!("Skipping directory with non UTF-8 name: {name:?}"),
        }
    }

    Ok(projects)
}

/// Splits `requested` into names that exist in `all_projects` and names that
/// don't. Relative order is kept on both sides and duplicates are not removed.
#[must_use]
pub fn resolve<S: AsRef<str>>(requested: &[S], all_projects: &[String]) -> (Vec<String>, Vec<String>) {
    requested
        .iter()
        .map(|name| name.as_ref().to_string())
        .partition(|name| all_projects.contains(name))
}

/// Whether the ignore marker exists directly inside `root/project`.
#[must_use]
pub fn is_ignored(project: &str, root: &Path) -> bool {
    root.join(project).join(IGNORE_MARKER).exists()
}

/// All projects sorted by name, each flagged if ignored.
///
/// # Errors
///
/// Returns an error if `root` cannot be read.
pub fn list(root: &Path) -> Result<Vec<ProjectListing>> {
    Ok(discover(root)?
        .into_iter()
        .sorted()
        .map(|name| ProjectListing {
            ignored: is_ignored(&name, root),
            name,
        })
        .collect())
}

/// Closest known project name for a name that was not found.
#[must_use]
pub fn suggest<'a>(name: &str, all_projects: &'a [String]) -> Option<&'a str> {
    let matcher = SkimMatcherV2::default();

    all_projects
        .iter()
        .filter_map(|project| {
            matcher
                .fuzzy_match(project, name)
                .map(|score| (score, project.as_str()))
        })
        // Ties go to the first listed project
        .min_by_key(|(score, _)| Reverse(*score))
        .map(|(_, project)| project)
}
