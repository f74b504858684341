use std::{
    collections::HashSet,
    fmt::{self, Formatter},
};

/// Set of circRNA identifiers from one category of one run
pub type IdentifierSet = HashSet<String>;

/// Pipeline run being compared
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Run {
    PolyA,
    TotalRna,
}

impl fmt::Display for Run {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::PolyA => write!(f, "polyA"),
            Self::TotalRna => write!(f, "totalRNA"),
        }
    }
}

/// Filtering stage of the circRNA calls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Raw,
    Filtered,
}

impl Category {
    /// Categories in report order
    pub const ALL: [Category; 2] = [Category::Raw, Category::Filtered];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Raw => "raw",
            Self::Filtered => "filtered",
        }
    }

    /// Name of the count table written by the pipeline for this category
    pub fn file_name(&self) -> String {
        format!("circRNA_counts_{}.tsv", self.as_str())
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Raw and filtered identifier sets for a single run
#[derive(Debug, Default)]
pub struct RunResult {
    raw: IdentifierSet,
    filtered: IdentifierSet,
}

impl RunResult {
    pub fn new(raw: IdentifierSet, filtered: IdentifierSet) -> Self {
        Self { raw, filtered }
    }

    pub fn get(&self, category: Category) -> &IdentifierSet {
        match category {
            Category::Raw => &self.raw,
            Category::Filtered => &self.filtered,
        }
    }
}

/// Ratio of two counts.  Undefined if the denominator is zero
///
/// Displays as `NA` when undefined.  Without a precision the shortest
/// representation is used, always with a fractional part (`1.0`, `0.25`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ratio(Option<f64>);

impl Ratio {
    pub fn new(num: usize, den: usize) -> Self {
        if den == 0 {
            Self(None)
        } else {
            Self(Some(num as f64 / den as f64))
        }
    }

    pub fn value(&self) -> Option<f64> {
        self.0
    }

    pub fn is_undefined(&self) -> bool {
        self.value().is_none()
    }
}

impl fmt::Display for Ratio {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match (self.0, f.precision()) {
            (None, _) => write!(f, "NA"),
            (Some(x), Some(p)) => write!(f, "{:.*}", p, x),
            (Some(x), None) if x.fract() == 0.0 => write!(f, "{:.1}", x),
            (Some(x), None) => write!(f, "{}", x),
        }
    }
}

/// Comparison of the polyA and totalRNA identifier sets for one category
#[derive(Debug, Clone)]
pub struct StatsRow {
    category: Category,
    n_poly_a: usize,
    n_total_rna: usize,
    n_overlapping: usize,
    fp_all: Ratio,
    fp_overlap: Ratio,
}

impl StatsRow {
    pub fn new(category: Category, poly_a: &IdentifierSet, total_rna: &IdentifierSet) -> Self {
        let n_poly_a = poly_a.len();
        let n_total_rna = total_rna.len();
        let n_overlapping = overlap_count(poly_a, total_rna);
        Self {
            category,
            n_poly_a,
            n_total_rna,
            n_overlapping,
            fp_all: Ratio::new(n_poly_a, n_total_rna),
            fp_overlap: Ratio::new(n_overlapping, n_total_rna),
        }
    }

    pub fn category(&self) -> Category {
        self.category
    }
    pub fn n_poly_a(&self) -> usize {
        self.n_poly_a
    }
    pub fn n_total_rna(&self) -> usize {
        self.n_total_rna
    }
    pub fn n_overlapping(&self) -> usize {
        self.n_overlapping
    }
    pub fn fp_all(&self) -> Ratio {
        self.fp_all
    }
    pub fn fp_overlap(&self) -> Ratio {
        self.fp_overlap
    }

    /// True if the totalRNA set was empty so the ratios could not be calculated
    pub fn is_undefined(&self) -> bool {
        self.fp_all.is_undefined()
    }
}

/// Tab separated output row.  A precision (`{:.4}`) is applied to the ratio fields
impl fmt::Display for StatsRow {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}\t{}\t{}\t{}\t",
            self.category, self.n_poly_a, self.n_total_rna, self.n_overlapping
        )?;
        if let Some(p) = f.precision() {
            write!(f, "{:.*}\t{:.*}", p, self.fp_all, p, self.fp_overlap)
        } else {
            write!(f, "{}\t{}", self.fp_all, self.fp_overlap)
        }
    }
}

pub const STATS_HEADER: [&str; 6] = [
    "Type",
    "n_polyA",
    "n_totalRNA",
    "n_overlapping",
    "FP_all",
    "FP_overlap",
];

// Iterate over the smaller set
fn overlap_count(a: &IdentifierSet, b: &IdentifierSet) -> usize {
    let (small, large) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    small.iter().filter(|s| large.contains(*s)).count()
}

/// One row per category, in report order
pub fn compute_stats(poly_a: &RunResult, total_rna: &RunResult) -> Vec<StatsRow> {
    Category::ALL
        .iter()
        .map(|c| StatsRow::new(*c, poly_a.get(*c), total_rna.get(*c)))
        .collect()
}
