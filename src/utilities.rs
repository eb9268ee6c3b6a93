//! Numerical helpers shared by the spectral models.

/// Linear interpolation on a linear scale.
///
/// Given arrays of x and y values, interpolate to find the y value at x_new.
/// If x_new is outside the range of x, returns the first or last y value.
pub fn interpolate_linear(x: &[f64], y: &[f64], x_new: f64) -> f64 {
    if x.is_empty() {
        return f64::NAN;
    }
    if x.len() == 1 {
        return y[0];
    }
    if x_new <= x[0] {
        return y[0];
    }
    if x_new >= x[x.len() - 1] {
        return y[y.len() - 1];
    }

    let idx = bracket(x, x_new); // x[idx] <= x_new < x[idx+1]
    let x1 = x[idx];
    let x2 = x[idx + 1];
    let y1 = y[idx];
    let y2 = y[idx + 1];
    y1 + (x_new - x1) * (y2 - y1) / (x2 - x1)
}

/// Largest `i` with `x[i] <= x_new`, for `x[0] < x_new < x[last]`.
fn bracket(x: &[f64], x_new: f64) -> usize {
    let mut low = 0usize;
    let mut high = x.len() - 1;
    while high - low > 1 {
        let mid = (low + high) >> 1;
        if x[mid] <= x_new {
            low = mid;
        } else {
            high = mid;
        }
    }
    low
}

/// Bilinear interpolation on a rectangular table, clamped at the edges.
///
/// `table[i][j]` holds the value at `(rows[i], cols[j])`. The two rows
/// bracketing `row_new` are interpolated along `cols`, then blended along
/// `rows`.
pub fn interpolate_bilinear<const C: usize>(
    rows: &[f64],
    cols: &[f64; C],
    table: &[[f64; C]],
    row_new: f64,
    col_new: f64,
) -> f64 {
    if rows.is_empty() {
        return f64::NAN;
    }
    let along_cols = |i: usize| interpolate_linear(cols, &table[i], col_new);
    let last = rows.len() - 1;
    if last == 0 || row_new <= rows[0] {
        return along_cols(0);
    }
    if row_new >= rows[last] {
        return along_cols(last);
    }
    let i = bracket(rows, row_new);
    let (v1, v2) = (along_cols(i), along_cols(i + 1));
    v1 + (row_new - rows[i]) * (v2 - v1) / (rows[i + 1] - rows[i])
}

/// Integrate `f` over `[lo, hi]` with composite Simpson's rule in `ln E`.
///
/// Steeply falling spectra are smooth in log-energy, so the nodes are spaced
/// evenly in `ln E`. `intervals` is rounded up to an even number.
pub fn integrate_log_simpson<F>(f: F, lo: f64, hi: f64, intervals: usize) -> f64
where
    F: Fn(f64) -> f64,
{
    if !(hi > lo) || lo <= 0.0 {
        return 0.0;
    }
    let n = (intervals.max(2) + 1) & !1;
    let (a, b) = (lo.ln(), hi.ln());
    let h = (b - a) / n as f64;
    // substitution E = exp(t), dE = E dt
    let g = |t: f64| {
        let e = t.exp();
        f(e) * e
    };
    let mut sum = g(a) + g(b);
    for k in 1..n {
        let weight = if k % 2 == 1 { 4.0 } else { 2.0 };
        sum += weight * g(a + k as f64 * h);
    }
    sum * h / 3.0
}
