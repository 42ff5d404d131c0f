//! Histogram equalization for visualization.

/// Default number of histogram bins.
pub const DEFAULT_BINS: usize = 256;

/// Histogram-equalize `values` into `[0, 1]`.
///
/// The histogram spans the finite data range with `nbins` equal bins; each
/// value is mapped to the normalized cumulative count, linearly interpolated
/// between bin centres. Non-finite values pass through unchanged.
///
/// A constant input maps to `0.5`.
pub fn equalize_hist(values: &[f64], nbins: usize) -> Vec<f64> {
    let nbins = nbins.max(1);
    let Some((lo, hi)) = crate::colormap::value_range(values) else {
        return values.to_vec();
    };
    let (lo, hi) = if lo == hi { (lo - 0.5, hi + 0.5) } else { (lo, hi) };
    let width = (hi - lo) / nbins as f64;

    let mut hist = vec![0u64; nbins];
    for &v in values.iter().filter(|v| v.is_finite()) {
        hist[bin_of(v, lo, width, nbins)] += 1;
    }

    let total: u64 = hist.iter().sum();
    let mut running = 0u64;
    let cdf: Vec<f64> = hist
        .iter()
        .map(|&count| {
            running += count;
            running as f64 / total as f64
        })
        .collect();
    let centers: Vec<f64> = (0..nbins).map(|i| lo + (i as f64 + 0.5) * width).collect();

    values
        .iter()
        .map(|&v| if v.is_finite() { interp(v, &centers, &cdf) } else { v })
        .collect()
}

fn bin_of(v: f64, lo: f64, width: f64, nbins: usize) -> usize {
    (((v - lo) / width).floor().max(0.0) as usize).min(nbins - 1)
}

/// Piecewise-linear interpolation with flat extrapolation at both ends.
fn interp(x: f64, xp: &[f64], fp: &[f64]) -> f64 {
    let last = xp.len() - 1;
    if x <= xp[0] {
        return fp[0];
    }
    if x >= xp[last] {
        return fp[last];
    }
    let i = xp.partition_point(|&c| c <= x) - 1;
    let t = (x - xp[i]) / (xp[i + 1] - xp[i]);
    fp[i] + t * (fp[i + 1] - fp[i])
}
