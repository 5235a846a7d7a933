pub mod countries;
pub mod init;
pub mod play;
pub mod validate;

use std::path::Path;

use anyhow::Result;

use flagmaster_core::dataset::parse_dataset;
use flagmaster_core::Dataset;

/// Load the dataset at `path`, or the built-in one.
pub(crate) fn load_dataset(path: Option<&Path>) -> Result<Dataset> {
    match path {
        Some(path) => parse_dataset(path),
        None => Dataset::builtin(),
    }
}
