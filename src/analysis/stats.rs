use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::data::model::CellValue;

/// Descriptive statistics of one numeric column (missing values excluded).
#[derive(Debug, Clone, PartialEq)]
pub struct UnivariateStats {
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    /// Sample standard deviation (n − 1); `None` below two values.
    pub std_dev: Option<f64>,
    pub min: f64,
    pub max: f64,
    pub histogram: Histogram,
}

/// Bin counts plus a smoothed density curve for the distribution plot.
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    /// `counts.len() + 1` ascending edges.
    pub edges: Vec<f64>,
    pub counts: Vec<usize>,
    /// `[x, density]` points of a Gaussian KDE; empty when the spread is zero.
    pub density: Vec<[f64; 2]>,
}

impl Histogram {
    pub fn bin_width(&self) -> f64 {
        match self.edges.as_slice() {
            [first, .., last] if !self.counts.is_empty() => (last - first) / self.counts.len() as f64,
            _ => 0.0,
        }
    }
}

/// Five-number summary with outliers for the box plot.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxplotData {
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    /// Most extreme values inside the fences.
    pub lower_whisker: f64,
    pub upper_whisker: f64,
    /// Values outside `[q1 - k·IQR, q3 + k·IQR]`, ascending.
    pub outliers: Vec<f64>,
}

/// How the histogram and box plot are shaped.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DistributionOptions {
    pub bins: Option<usize>,
    pub kde_points: usize,
    pub outlier_iqr_factor: f64,
}

/// Arithmetic mean.
pub fn mean(data: &[f64]) -> Option<f64> {
    if data.is_empty() {
        None
    } else {
        Some(data.iter().sum::<f64>() / data.len() as f64)
    }
}

/// Sample standard deviation (Bessel-corrected).
pub fn sample_std_dev(data: &[f64]) -> Option<f64> {
    if data.len() < 2 {
        return None;
    }
    let m = mean(data)?;
    let ss: f64 = data.iter().map(|v| (v - m).powi(2)).sum();
    Some((ss / (data.len() - 1) as f64).sqrt())
}

/// `p`-th quantile of sorted data, linear interpolation between closest ranks.
pub fn quantile_sorted(sorted: &[f64], p: f64) -> Option<f64> {
    if sorted.is_empty() || !(0.0..=1.0).contains(&p) {
        return None;
    }
    let h = (sorted.len() - 1) as f64 * p;
    let lo = h.floor() as usize;
    let hi = h.ceil() as usize;
    Some(sorted[lo] + (h - lo as f64) * (sorted[hi] - sorted[lo]))
}

fn sorted(values: &[f64]) -> Vec<f64> {
    let mut v: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
    v.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    v
}

/// Statistics and box plot data for `values`; `None` if there are none.
pub fn describe(values: &[f64], opts: &DistributionOptions) -> Option<(UnivariateStats, BoxplotData)> {
    let vals = sorted(values);
    let (&min, &max) = (vals.first()?, vals.last()?);
    let median = quantile_sorted(&vals, 0.5)?;
    let stats = UnivariateStats {
        count: vals.len(),
        mean: mean(&vals)?,
        median,
        std_dev: sample_std_dev(&vals),
        min,
        max,
        histogram: histogram(&vals, opts),
    };
    Some((stats, boxplot(&vals, opts.outlier_iqr_factor)?))
}

fn boxplot(sorted: &[f64], factor: f64) -> Option<BoxplotData> {
    let q1 = quantile_sorted(sorted, 0.25)?;
    let median = quantile_sorted(sorted, 0.5)?;
    let q3 = quantile_sorted(sorted, 0.75)?;
    let iqr = q3 - q1;
    let (lo_fence, hi_fence) = (q1 - factor * iqr, q3 + factor * iqr);

    let inside = |v: &&f64| (lo_fence..=hi_fence).contains(*v);
    let lower_whisker = sorted.iter().find(inside).copied().unwrap_or(q1);
    let upper_whisker = sorted.iter().rev().find(inside).copied().unwrap_or(q3);
    let outliers = sorted
        .iter()
        .copied()
        .filter(|v| *v < lo_fence || *v > hi_fence)
        .collect();

    Some(BoxplotData {
        q1,
        median,
        q3,
        lower_whisker,
        upper_whisker,
        outliers,
    })
}

/// Upper limit on histogram bins, automatic or configured.
pub const MAX_BINS: usize = 1000;

/// Bin count for sorted data: the larger of the Sturges and
/// Freedman–Diaconis estimates (numpy's "auto"). A single outlier can push
/// Freedman–Diaconis into the millions; past [`MAX_BINS`] Sturges is used.
fn auto_bin_count(sorted: &[f64]) -> usize {
    let n = sorted.len() as f64;
    let range = sorted[sorted.len() - 1] - sorted[0];
    if range <= 0.0 {
        return 1;
    }
    let sturges = (n.log2() + 1.0).ceil();
    let iqr = quantile_sorted(sorted, 0.75).unwrap_or(0.0) - quantile_sorted(sorted, 0.25).unwrap_or(0.0);
    let fd_width = 2.0 * iqr / n.cbrt();
    let fd = if fd_width > 0.0 { (range / fd_width).ceil() } else { 0.0 };
    let bins = if fd <= MAX_BINS as f64 { fd.max(sturges) } else { sturges };
    (bins as usize).clamp(1, MAX_BINS)
}

fn histogram(sorted: &[f64], opts: &DistributionOptions) -> Histogram {
    let (min, max) = (sorted[0], sorted[sorted.len() - 1]);
    let bins = opts
        .bins
        .filter(|&b| b > 0)
        .unwrap_or_else(|| auto_bin_count(sorted))
        .min(MAX_BINS);
    let (lo, hi) = if max > min { (min, max) } else { (min - 0.5, max + 0.5) };
    let width = (hi - lo) / bins as f64;

    let edges = (0..=bins).map(|i| lo + width * i as f64).collect();
    let mut counts = vec![0usize; bins];
    for &v in sorted {
        let idx = (((v - lo) / width).floor() as usize).min(bins - 1);
        counts[idx] += 1;
    }

    Histogram {
        edges,
        counts,
        density: kde(sorted, opts.kde_points),
    }
}

/// Gaussian kernel density with Scott's bandwidth, sampled across the data range.
fn kde(sorted: &[f64], points: usize) -> Vec<[f64; 2]> {
    let n = sorted.len() as f64;
    let Some(sd) = sample_std_dev(sorted) else {
        return Vec::new();
    };
    let bw = sd * n.powf(-0.2);
    if bw <= 0.0 || points < 2 {
        return Vec::new();
    }
    let (min, max) = (sorted[0], sorted[sorted.len() - 1]);
    let norm = 1.0 / (n * bw * (2.0 * std::f64::consts::PI).sqrt());
    let step = (max - min) / (points - 1) as f64;
    (0..points)
        .map(|i| {
            let x = min + step * i as f64;
            let y = sorted
                .iter()
                .map(|xi| (-0.5 * ((x - xi) / bw).powi(2)).exp())
                .sum::<f64>()
                * norm;
            [x, y]
        })
        .collect()
}

/// Occurrences of each present value, most frequent first (ties by value).
pub fn frequencies(values: &[CellValue]) -> Vec<(CellValue, usize)> {
    let mut counts: BTreeMap<&CellValue, usize> = BTreeMap::new();
    for v in values.iter().filter(|v| !v.is_missing()) {
        *counts.entry(v).or_default() += 1;
    }
    let mut out: Vec<(CellValue, usize)> = counts.into_iter().map(|(v, n)| (v.clone(), n)).collect();
    out.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opts() -> DistributionOptions {
        DistributionOptions {
            bins: None,
            kde_points: 50,
            outlier_iqr_factor: 1.5,
        }
    }

    #[test]
    fn mean_median_std() {
        let (stats, _) = describe(&[25.0, 40.0, 25.0], &opts()).unwrap();
        assert_eq!(stats.mean, 30.0);
        assert_eq!(stats.median, 25.0);
        let sd = stats.std_dev.unwrap();
        assert!((sd - 75.0_f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn single_value_has_no_std_dev() {
        let (stats, boxplot) = describe(&[3.0], &opts()).unwrap();
        assert_eq!(stats.std_dev, None);
        assert_eq!(stats.histogram.counts, vec![1]);
        assert_eq!(stats.histogram.edges, vec![2.5, 3.5]);
        assert!(stats.histogram.density.is_empty());
        assert_eq!(boxplot.q1, 3.0);
    }

    #[test]
    fn empty_input_has_no_stats() {
        assert!(describe(&[], &opts()).is_none());
    }

    #[test]
    fn quantiles_interpolate() {
        let data = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(quantile_sorted(&data, 0.25), Some(1.75));
        assert_eq!(quantile_sorted(&data, 0.5), Some(2.5));
        assert_eq!(quantile_sorted(&data, 1.0), Some(4.0));
        assert_eq!(quantile_sorted(&data, 1.5), None);
    }

    #[test]
    fn outliers_beyond_fences() {
        let data = [1.0, 2.0, 3.0, 4.0, 5.0, 100.0];
        let (_, bp) = describe(&data, &opts()).unwrap();
        assert_eq!(bp.outliers, vec![100.0]);
        assert_eq!(bp.upper_whisker, 5.0);
        assert_eq!(bp.lower_whisker, 1.0);
    }

    #[test]
    fn histogram_counts_every_value() {
        let data: Vec<f64> = (0..100).map(|i| (i % 17) as f64).collect();
        let (stats, _) = describe(&data, &opts()).unwrap();
        let h = &stats.histogram;
        assert_eq!(h.counts.iter().sum::<usize>(), 100);
        assert_eq!(h.edges.len(), h.counts.len() + 1);
        assert_eq!(h.density.len(), 50);
    }

    #[test]
    fn outlier_does_not_explode_bin_count() {
        let mut data: Vec<f64> = (0..100).map(|i| (i % 10) as f64).collect();
        data.push(1.0e14);
        let (stats, _) = describe(&data, &opts()).unwrap();
        let h = &stats.histogram;
        assert!(h.counts.len() <= MAX_BINS, "{} bins", h.counts.len());
        assert_eq!(h.counts.iter().sum::<usize>(), 101);
        assert_eq!(*h.counts.last().unwrap(), 1);
    }

    #[test]
    fn configured_bin_count_is_capped() {
        let o = DistributionOptions { bins: Some(50_000_000), ..opts() };
        let (stats, _) = describe(&[0.0, 1.0, 2.0], &o).unwrap();
        assert_eq!(stats.histogram.counts.len(), MAX_BINS);
        assert_eq!(stats.histogram.edges.len(), MAX_BINS + 1);
    }

    #[test]
    fn fixed_bin_count_is_honoured() {
        let o = DistributionOptions { bins: Some(4), ..opts() };
        let (stats, _) = describe(&[0.0, 1.0, 2.0, 3.0, 4.0], &o).unwrap();
        assert_eq!(stats.histogram.counts, vec![1, 1, 1, 2]);
        assert_eq!(stats.histogram.bin_width(), 1.0);
    }

    #[test]
    fn density_integrates_to_about_one() {
        let data: Vec<f64> = (0..200).map(|i| i as f64 / 10.0).collect();
        let (stats, _) = describe(&data, &DistributionOptions { kde_points: 400, ..opts() }).unwrap();
        let d = &stats.histogram.density;
        let area: f64 = d.windows(2).map(|w| (w[1][0] - w[0][0]) * (w[0][1] + w[1][1]) / 2.0).sum();
        assert!(area > 0.8 && area < 1.05, "area = {area}");
    }

    #[test]
    fn frequencies_sorted_by_count() {
        let vals = vec![
            CellValue::String("LA".into()),
            CellValue::String("NY".into()),
            CellValue::String("LA".into()),
            CellValue::Null,
        ];
        let f = frequencies(&vals);
        assert_eq!(
            f,
            vec![
                (CellValue::String("LA".into()), 2),
                (CellValue::String("NY".into()), 1),
            ]
        );
    }
}
