use std::path::Path;

use anyhow::Context;
use utils::Separator;

use crate::{
    config::Config,
    error::CompareError,
    io,
    pipeline::PipelineOutput,
    stats::{self, Category, Run, RunResult},
};

/// Strategy
///
/// Resolve the count table locations from the pipeline config of each run
/// and read the raw and filtered identifier sets.  All input is read before
/// anything is written, then the per category comparison is written to
/// <outdir>/stats.tsv
pub fn process_data(cfg: &Config) -> anyhow::Result<()> {
    debug!("Starting processing");

    let poly_a = read_run(Run::PolyA, cfg.poly_a_config(), cfg.separator())?;
    let total_rna = read_run(Run::TotalRna, cfg.total_rna_config(), cfg.separator())?;

    let rows = stats::compute_stats(&poly_a, &total_rna);
    for row in rows.iter().filter(|r| r.is_undefined()) {
        warn!(
            "No totalRNA circRNAs found for category {}; FP ratios are undefined (NA)",
            row.category()
        )
    }

    let out_path = io::write_stats(cfg.output_dir(), &rows, cfg.decimals())?;
    info!("Statistics written to {}", out_path.display());
    for row in rows.iter() {
        info!(
            "{}: polyA {}, totalRNA {}, overlapping {}, FP_all {}, FP_overlap {}",
            row.category(),
            row.n_poly_a(),
            row.n_total_rna(),
            row.n_overlapping(),
            row.fp_all(),
            row.fp_overlap()
        )
    }
    Ok(())
}

fn read_run(run: Run, cfg_file: &Path, sep: Separator) -> anyhow::Result<RunResult> {
    let output = PipelineOutput::from_config_file(run, cfg_file)?;
    debug!(
        "Reading {} circRNAs from {}",
        run,
        output.out_dir().display()
    );

    let read = |category: Category| {
        let p = output.path(category);
        io::read_identifiers(p, sep).with_context(|| CompareError::InputFile {
            run,
            category,
            path: p.to_owned(),
        })
    };
    let raw = read(Category::Raw)?;
    let filtered = read(Category::Filtered)?;
    debug!(
        "{} run: {} raw and {} filtered circRNAs",
        run,
        raw.len(),
        filtered.len()
    );
    Ok(RunResult::new(raw, filtered))
}
