use std::path::{Path, PathBuf};

use log::debug;

use crate::error::Result;

/// Glob matching criterion's `<group>/<benchmark>/new/raw.csv` layout under `root`.
pub fn input_pattern(root: &Path) -> String {
    let root = glob::Pattern::escape(&root.to_string_lossy());
    Path::new(&root)
        .join("*")
        .join("*")
        .join("new")
        .join("raw.csv")
        .to_string_lossy()
        .into_owned()
}

/// All `raw.csv` files under `root`, sorted by path. Hidden directories are skipped.
pub fn find_inputs(root: &Path) -> Result<Vec<PathBuf>> {
    let pattern = input_pattern(root);
    debug!("Looking for input files matching {}", pattern);

    let options = glob::MatchOptions {
        require_literal_leading_dot: true,
        ..glob::MatchOptions::new()
    };
    let mut paths =
        glob::glob_with(&pattern, options)?.collect::<std::result::Result<Vec<_>, _>>()?;
    paths.sort();
    Ok(paths)
}
