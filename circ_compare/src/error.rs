use std::path::PathBuf;

use thiserror::Error;

use crate::stats::{Category, Run};

/// Failures that stop a comparison
///
/// Config errors are returned directly by the config resolver.  Input and
/// output errors are attached as context to the underlying I/O error so the
/// cause is kept in the error chain.
#[derive(Debug, Error)]
pub enum CompareError {
    #[error("{run} configuration file {} not found", .path.display())]
    ConfigNotFound { run: Run, path: PathBuf },

    #[error("Could not read {run} configuration file {}", .path.display())]
    ConfigRead {
        run: Run,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{run} configuration file {} is not valid JSON", .path.display())]
    ConfigParse {
        run: Run,
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{run} configuration file {} has no string value for params.outdir", .path.display())]
    MissingOutdir { run: Run, path: PathBuf },

    #[error("Could not read {run} {category} identifier file {}", .path.display())]
    InputFile {
        run: Run,
        category: Category,
        path: PathBuf,
    },

    #[error("Could not write statistics to {}", .path.display())]
    OutputWrite { path: PathBuf },
}
