//! Descriptive statistics, histogram binning and trend fitting.

/// Summary statistics over a set of measurement values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Summary {
    pub count: usize,
    pub mean: f64,
    /// Population standard deviation (divides by n).
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
}

impl Summary {
    /// Compute the summary of `values`, or `None` when there are none.
    pub fn from_values(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }

        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;

        let (min, max) = values
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            });

        Some(Self {
            count: values.len(),
            mean,
            std_dev: variance.sqrt(),
            min,
            max,
        })
    }

    #[inline]
    pub fn range(&self) -> f64 {
        self.max - self.min
    }
}

/// Equal-width histogram.
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    /// Bin edges; one more than the number of bins.
    pub edges: Vec<f64>,
    pub counts: Vec<usize>,
}

impl Histogram {
    #[inline]
    pub fn num_bins(&self) -> usize {
        self.counts.len()
    }

    /// Iterate over `(left_edge, right_edge, count)` for each bin.
    pub fn bins(&self) -> impl Iterator<Item = (f64, f64, usize)> + '_ {
        self.edges
            .windows(2)
            .zip(self.counts.iter())
            .map(|(edge, &count)| (edge[0], edge[1], count))
    }

    /// Largest bin count.
    pub fn max_count(&self) -> usize {
        self.counts.iter().copied().max().unwrap_or(0)
    }
}

/// Bin `values` into `bins` equal-width bins spanning their range.
///
/// The last bin is closed on the right so the maximum value is counted.
/// When every value is identical the range is widened by 0.5 on each side.
pub fn histogram(values: &[f64], bins: usize) -> Option<Histogram> {
    if bins == 0 {
        return None;
    }
    let summary = Summary::from_values(values)?;

    let (lo, hi) = if summary.range() == 0.0 {
        (summary.min - 0.5, summary.max + 0.5)
    } else {
        (summary.min, summary.max)
    };
    let width = (hi - lo) / bins as f64;

    let mut edges: Vec<f64> = (0..bins).map(|i| lo + width * i as f64).collect();
    edges.push(hi);

    let mut counts = vec![0usize; bins];
    for &v in values {
        let guess = ((v - lo) / width).floor();
        let mut bin = if guess < 0.0 { 0 } else { (guess as usize).min(bins - 1) };
        // Rounding in the division can disagree with the stored edges
        if v < edges[bin] && bin > 0 {
            bin -= 1;
        } else if bin + 1 < bins && v >= edges[bin + 1] {
            bin += 1;
        }
        counts[bin] += 1;
    }

    Some(Histogram { edges, counts })
}

/// Least-squares line `y = slope * x + intercept`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrendLine {
    pub slope: f64,
    pub intercept: f64,
}

impl TrendLine {
    /// Evaluate the line at `x`.
    #[inline]
    pub fn at(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

/// Ordinary least-squares fit of a degree-1 polynomial.
///
/// Returns `None` with fewer than two points or when every x is the same,
/// since the slope is undefined.
pub fn linear_fit(points: &[(f64, f64)]) -> Option<TrendLine> {
    if points.len() < 2 {
        return None;
    }

    let n = points.len() as f64;
    let mean_x = points.iter().map(|(x, _)| x).sum::<f64>() / n;
    let mean_y = points.iter().map(|(_, y)| y).sum::<f64>() / n;

    let (sxx, sxy) = points.iter().fold((0.0, 0.0), |(sxx, sxy), (x, y)| {
        let dx = x - mean_x;
        (sxx + dx * dx, sxy + dx * (y - mean_y))
    });

    if sxx == 0.0 {
        return None;
    }

    let slope = sxy / sxx;
    Some(TrendLine {
        slope,
        intercept: mean_y - slope * mean_x,
    })
}

/// Positions of values further than `sigma` standard deviations from the mean.
pub fn outliers(values: &[f64], summary: &Summary, sigma: f64) -> Vec<usize> {
    let threshold = sigma * summary.std_dev;
    values
        .iter()
        .enumerate()
        .filter(|(_, v)| (*v - summary.mean).abs() > threshold)
        .map(|(i, _)| i)
        .collect()
}
