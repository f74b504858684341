use std::{
    fs::{self, File},
    io::{BufRead, BufReader, ErrorKind, Write},
    path::{Path, PathBuf},
};

use anyhow::Context;
use compress_io::compress::CompressIo;
use flate2::read::MultiGzDecoder;
use utils::{get_next_line, Separator};

use crate::{
    error::CompareError,
    stats::{IdentifierSet, StatsRow, STATS_HEADER},
};

pub const STATS_FILE: &str = "stats.tsv";

/// Leading bytes of compressed formats
const GZIP_MAGIC: &[u8] = &[0x1f, 0x8b];
const OTHER_MAGIC: [(&str, &[u8]); 3] = [
    ("bzip2", b"BZh"),
    ("xz", &[0xfd, b'7', b'z', b'X', b'Z', 0x00]),
    ("zstd", &[0x28, 0xb5, 0x2f, 0xfd]),
];

/// Open an identifier file, decompressing gzip input
///
/// A truncated or corrupt gzip stream gives a read error rather than EOF.
/// Other compressed formats are rejected.
fn open_input(p: &Path) -> anyhow::Result<Box<dyn BufRead>> {
    let f = File::open(p).map_err(|e| match e.kind() {
        ErrorKind::NotFound => anyhow!("File {} not found", p.display()),
        _ => anyhow::Error::new(e).context(format!("Could not open {}", p.display())),
    })?;
    let mut rdr = BufReader::new(f);
    let magic = rdr
        .fill_buf()
        .with_context(|| format!("Could not read from {}", p.display()))?;
    let gzip = magic.starts_with(GZIP_MAGIC);
    let other = OTHER_MAGIC
        .iter()
        .find(|(_, m)| magic.starts_with(m))
        .map(|(fmt, _)| *fmt);

    if gzip {
        trace!("{} is gzip compressed", p.display());
        Ok(Box::new(BufReader::new(MultiGzDecoder::new(rdr))))
    } else if let Some(fmt) = other {
        Err(anyhow!(
            "{} is {} compressed; only plain text or gzip input is supported",
            p.display(),
            fmt
        ))
    } else {
        Ok(Box::new(rdr))
    }
}

/// Read the first field of each line into a set of identifiers
///
/// Lines whose first field is empty or white space (i.e., blank lines) are skipped.
pub fn read_identifiers(p: &Path, sep: Separator) -> anyhow::Result<IdentifierSet> {
    trace!("Opening identifier file {} for reading", p.display());
    let mut rdr = open_input(p)?;
    trace!("Reading from {}", p.display());
    let mut buf = String::new();
    let mut line = 0;
    let mut ids = IdentifierSet::new();

    while let Some(mut fields) = get_next_line(&mut rdr, &mut buf, sep)
        .with_context(|| format!("Error after reading {} lines from {}", line, p.display()))?
    {
        line += 1;
        match fields.next() {
            Some(id) if !id.trim().is_empty() => {
                if !ids.contains(id) {
                    ids.insert(id.to_owned());
                }
            }
            _ => trace!("{}:{} Skipping line with empty first field", p.display(), line),
        }
    }

    debug!(
        "Finished reading in {} lines from {}; found {} unique identifiers",
        line,
        p.display(),
        ids.len()
    );
    Ok(ids)
}

/// Write the statistics table to `<dir>/stats.tsv`, creating `dir` if required
///
/// The table is written to a temporary file in `dir` and renamed into place
/// so a failed run never leaves a partial table behind.
pub fn write_stats(
    dir: &Path,
    rows: &[StatsRow],
    decimals: Option<usize>,
) -> anyhow::Result<PathBuf> {
    let out_path = dir.join(STATS_FILE);
    write_stats_file(dir, &out_path, rows, decimals).with_context(|| {
        CompareError::OutputWrite {
            path: out_path.clone(),
        }
    })?;
    Ok(out_path)
}

fn write_stats_file(
    dir: &Path,
    out_path: &Path,
    rows: &[StatsRow],
    decimals: Option<usize>,
) -> anyhow::Result<()> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Could not create output directory {}", dir.display()))?;

    let tmp_path = dir.join(format!(".{}.tmp", STATS_FILE));
    let res = write_rows(&tmp_path, rows, decimals).and_then(|_| {
        fs::rename(&tmp_path, out_path).with_context(|| {
            format!(
                "Could not rename {} to {}",
                tmp_path.display(),
                out_path.display()
            )
        })
    });
    if res.is_err() && tmp_path.exists() {
        if let Err(e) = fs::remove_file(&tmp_path) {
            warn!("Could not remove {}: {}", tmp_path.display(), e)
        }
    }
    res
}

fn write_rows(p: &Path, rows: &[StatsRow], decimals: Option<usize>) -> anyhow::Result<()> {
    trace!("Opening {} for output", p.display());
    let mut wrt = CompressIo::new()
        .path(p)
        .bufwriter()
        .with_context(|| format!("Could not open {} for output", p.display()))?;

    writeln!(wrt, "{}", STATS_HEADER.join("\t"))?;
    for row in rows.iter() {
        if let Some(d) = decimals {
            writeln!(wrt, "{:.*}", d, row)?
        } else {
            writeln!(wrt, "{}", row)?
        }
    }
    wrt.flush()
        .with_context(|| format!("Error writing to {}", p.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::{compute_stats, Category, RunResult};
    use flate2::{write::GzEncoder, Compression};
    use tempfile::TempDir;

    fn write_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let p = dir.path().join(name);
        fs::write(&p, content).unwrap();
        p
    }

    fn sorted(ids: IdentifierSet) -> Vec<String> {
        let mut v: Vec<_> = ids.into_iter().collect();
        v.sort();
        v
    }

    #[test]
    fn read_first_column() {
        let dir = tempfile::tempdir().unwrap();
        let p = write_file(
            &dir,
            "counts.tsv",
            "chr1:100-200\t5\t6\nchr2:300-400\t1\t0\nchr1:100-200\t7\t7\n",
        );
        let ids = read_identifiers(&p, Separator::default()).unwrap();
        assert_eq!(sorted(ids), vec!["chr1:100-200", "chr2:300-400"]);
    }

    #[test]
    fn empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let p = write_file(&dir, "empty.tsv", "");
        assert!(read_identifiers(&p, Separator::default())
            .unwrap()
            .is_empty());
    }

    #[test]
    fn blank_lines_and_missing_delimiter() {
        let dir = tempfile::tempdir().unwrap();
        let p = write_file(&dir, "ids.tsv", "A\r\nB\tx\n\nC\n\n");
        let ids = read_identifiers(&p, Separator::default()).unwrap();
        assert!(!ids.contains(""));
        assert_eq!(sorted(ids), vec!["A", "B", "C"]);
    }

    #[test]
    fn set_size_bounded_by_line_count() {
        let dir = tempfile::tempdir().unwrap();
        let content = "a\nb\na\nc\tb\nb\n";
        let p = write_file(&dir, "ids.tsv", content);
        let ids = read_identifiers(&p, Separator::default()).unwrap();
        assert_eq!(ids.len(), 3);
        assert!(ids.len() <= content.lines().count());
    }

    #[test]
    fn custom_separator() {
        let dir = tempfile::tempdir().unwrap();
        let p = write_file(&dir, "ids.csv", "a,1\nb\t2,3\n");
        let ids = read_identifiers(&p, Separator::new(',')).unwrap();
        assert_eq!(sorted(ids), vec!["a", "b\t2"]);
    }

    #[test]
    fn missing_input_file() {
        let dir = tempfile::tempdir().unwrap();
        let e = read_identifiers(&dir.path().join("none.tsv"), Separator::default()).unwrap_err();
        assert!(e.to_string().contains("not found"));
    }

    #[test]
    fn whitespace_only_lines_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let p = write_file(&dir, "ids.tsv", "\tX\n \n  \t3\nA\n");
        let ids = read_identifiers(&p, Separator::default()).unwrap();
        assert_eq!(sorted(ids), vec!["A"]);
    }

    fn gzip(content: &str) -> Vec<u8> {
        let mut enc = GzEncoder::new(Vec::new(), Compression::default());
        enc.write_all(content.as_bytes()).unwrap();
        enc.finish().unwrap()
    }

    #[test]
    fn read_gzip_input() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("circRNA_counts_raw.tsv");
        fs::write(&p, gzip("A\t1\nB\t2\nA\t3\n")).unwrap();
        let ids = read_identifiers(&p, Separator::default()).unwrap();
        assert_eq!(sorted(ids), vec!["A", "B"]);
    }

    #[test]
    fn truncated_gzip_input_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("circRNA_counts_raw.tsv");
        let data = gzip("A\t1\nB\t2\nA\t3\n");
        fs::write(&p, &data[..data.len() / 2]).unwrap();
        assert!(read_identifiers(&p, Separator::default()).is_err());
    }

    #[test]
    fn other_compression_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("ids.tsv.bz2");
        fs::write(&p, b"BZh91AY&SY").unwrap();
        let e = read_identifiers(&p, Separator::default()).unwrap_err();
        assert!(e.to_string().contains("bzip2 compressed"));
    }

    fn set(ids: &[&str]) -> IdentifierSet {
        ids.iter().map(|s| s.to_string()).collect()
    }

    fn example_rows() -> Vec<StatsRow> {
        let poly_a = RunResult::new(set(&["A", "B", "C"]), set(&[]));
        let total_rna = RunResult::new(set(&["B", "C", "D"]), set(&["X"]));
        compute_stats(&poly_a, &total_rna)
    }

    #[test]
    fn write_stats_table() {
        let dir = tempfile::tempdir().unwrap();
        let out_dir = dir.path().join("new").join("dir");
        let p = write_stats(&out_dir, &example_rows(), None).unwrap();
        assert_eq!(p, out_dir.join(STATS_FILE));
        assert_eq!(
            fs::read_to_string(&p).unwrap(),
            "Type\tn_polyA\tn_totalRNA\tn_overlapping\tFP_all\tFP_overlap\n\
             raw\t3\t3\t2\t1.0\t0.6666666666666666\n\
             filtered\t0\t1\t0\t0.0\t0.0\n"
        );
        assert!(!out_dir.join(".stats.tsv.tmp").exists());
    }

    #[test]
    fn write_stats_with_precision() {
        let dir = tempfile::tempdir().unwrap();
        let p = write_stats(dir.path(), &example_rows(), Some(3)).unwrap();
        let s = fs::read_to_string(p).unwrap();
        assert_eq!(s.lines().nth(1), Some("raw\t3\t3\t2\t1.000\t0.667"));
    }

    #[test]
    fn repeated_writes_are_identical() {
        let dir = tempfile::tempdir().unwrap();
        let rows = example_rows();
        let p = write_stats(dir.path(), &rows, None).unwrap();
        let first = fs::read(&p).unwrap();
        write_stats(dir.path(), &rows, None).unwrap();
        assert_eq!(first, fs::read(&p).unwrap());
    }

    #[test]
    fn output_dir_is_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let p = write_file(&dir, "not_a_dir", "");
        let e = write_stats(&p, &example_rows(), None).unwrap_err();
        assert!(matches!(
            e.downcast_ref::<CompareError>(),
            Some(CompareError::OutputWrite { .. })
        ));
    }

    #[test]
    fn undefined_row_written_as_na() {
        let dir = tempfile::tempdir().unwrap();
        let rows = vec![StatsRow::new(
            Category::Raw,
            &set(&["A"]),
            &IdentifierSet::new(),
        )];
        let p = write_stats(dir.path(), &rows, Some(2)).unwrap();
        let s = fs::read_to_string(p).unwrap();
        assert_eq!(s.lines().nth(1), Some("raw\t1\t0\t0\tNA\tNA"));
    }
}
