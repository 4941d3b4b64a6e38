use crate::data::model::Column;

/// Pairwise Pearson correlations, rows and columns in selection order.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationMatrix {
    pub columns: Vec<String>,
    /// `values[i][j]` correlates `columns[i]` with `columns[j]`.
    /// NaN where a coefficient is undefined (constant column, < 2 rows).
    pub values: Vec<Vec<f64>>,
    /// Rows used: those with a value in every selected column.
    pub rows_used: usize,
}

impl CorrelationMatrix {
    /// Correlate numeric columns over the rows complete in all of them.
    ///
    /// The matrix is symmetric with a diagonal of exactly 1.0.
    pub(crate) fn compute(columns: &[&Column]) -> Self {
        let n_rows = columns.first().map_or(0, |c| c.len());
        let complete: Vec<usize> = (0..n_rows)
            .filter(|&r| columns.iter().all(|c| c.values()[r].as_f64().is_some()))
            .collect();
        let series: Vec<Vec<f64>> = columns
            .iter()
            .map(|c| {
                complete
                    .iter()
                    .filter_map(|&r| c.values()[r].as_f64())
                    .collect()
            })
            .collect();

        let k = columns.len();
        let mut values = vec![vec![f64::NAN; k]; k];
        for i in 0..k {
            values[i][i] = 1.0;
            for j in (i + 1)..k {
                let r = pearson(&series[i], &series[j]);
                values[i][j] = r;
                values[j][i] = r;
            }
        }

        CorrelationMatrix {
            columns: columns.iter().map(|c| c.name().to_string()).collect(),
            values,
            rows_used: complete.len(),
        }
    }

    pub fn get(&self, i: usize, j: usize) -> Option<f64> {
        self.values.get(i)?.get(j).copied()
    }
}

/// Pearson's r of two equally long series.
pub fn pearson(x: &[f64], y: &[f64]) -> f64 {
    let n = x.len().min(y.len());
    if n < 2 {
        return f64::NAN;
    }
    let mx = x[..n].iter().sum::<f64>() / n as f64;
    let my = y[..n].iter().sum::<f64>() / n as f64;
    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for (a, b) in x.iter().zip(y) {
        let (dx, dy) = (a - mx, b - my);
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }
    if sxx == 0.0 || syy == 0.0 {
        return f64::NAN;
    }
    (sxy / (sxx * syy).sqrt()).clamp(-1.0, 1.0)
}
