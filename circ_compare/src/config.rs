use std::path::{Path, PathBuf};

use utils::Separator;

pub struct Config {
    poly_a_config: PathBuf,
    total_rna_config: PathBuf,
    output_dir: PathBuf,
    separator: Separator,
    decimals: Option<usize>,
}

impl Config {
    pub fn new(poly_a_config: PathBuf, total_rna_config: PathBuf, output_dir: PathBuf) -> Self {
        Self {
            poly_a_config,
            total_rna_config,
            output_dir,
            separator: Separator::default(),
            decimals: None,
        }
    }

    pub fn set_separator(&mut self, sep: Separator) {
        self.separator = sep
    }

    pub fn set_decimals(&mut self, d: usize) {
        self.decimals = Some(d)
    }

    pub fn poly_a_config(&self) -> &Path {
        &self.poly_a_config
    }

    pub fn total_rna_config(&self) -> &Path {
        &self.total_rna_config
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn separator(&self) -> Separator {
        self.separator
    }

    pub fn decimals(&self) -> Option<usize> {
        self.decimals
    }
}
