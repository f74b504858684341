use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use serde_json::Value;

use crate::{
    error::CompareError,
    stats::{Category, Run},
};

/// Location of the circRNA count tables below the pipeline output directory
const CIRC_RNA_DIR: [&str; 2] = ["results", "circRNA"];

/// Count table paths for one run of the circRNA pipeline
#[derive(Debug)]
pub struct PipelineOutput {
    out_dir: PathBuf,
    raw: PathBuf,
    filtered: PathBuf,
}

impl PipelineOutput {
    pub fn from_outdir<P: AsRef<Path>>(out_dir: P) -> Self {
        let out_dir = out_dir.as_ref().to_owned();
        let circ_dir = CIRC_RNA_DIR.iter().fold(out_dir.clone(), |p, d| p.join(d));
        Self {
            raw: circ_dir.join(Category::Raw.file_name()),
            filtered: circ_dir.join(Category::Filtered.file_name()),
            out_dir,
        }
    }

    /// Read the pipeline JSON configuration and take the output directory
    /// from `params.outdir`.  A relative outdir is used as is.
    pub fn from_config_file<P: AsRef<Path>>(run: Run, fname: P) -> Result<Self, CompareError> {
        let path = fname.as_ref();
        debug!("Reading {} configuration from {}", run, path.display());

        let s = fs::read_to_string(path).map_err(|source| match source.kind() {
            ErrorKind::NotFound => CompareError::ConfigNotFound {
                run,
                path: path.to_owned(),
            },
            _ => CompareError::ConfigRead {
                run,
                path: path.to_owned(),
                source,
            },
        })?;
        let json: Value = serde_json::from_str(&s).map_err(|source| CompareError::ConfigParse {
            run,
            path: path.to_owned(),
            source,
        })?;
        let out_dir = get_outdir(&json).ok_or_else(|| CompareError::MissingOutdir {
            run,
            path: path.to_owned(),
        })?;
        debug!("Output directory for {} run: {}", run, out_dir);
        Ok(Self::from_outdir(out_dir))
    }

    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }

    pub fn path(&self, category: Category) -> &Path {
        match category {
            Category::Raw => &self.raw,
            Category::Filtered => &self.filtered,
        }
    }
}

fn get_outdir(json: &Value) -> Option<&str> {
    json.get("params")?
        .get("outdir")?
        .as_str()
        .filter(|s| !s.is_empty())
}
