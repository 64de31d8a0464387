//! Natural cubic spline interpolation

use msp_core::{invalid_argument, MspResult};

/// Piecewise cubic interpolant with zero curvature at both ends.
///
/// Passes exactly through every knot. Two knots degrade to a straight line,
/// one knot to a constant.
#[derive(Debug, Clone)]
pub struct CubicSpline {
    knots: Vec<f64>,
    values: Vec<f64>,
    /// Second derivative at each knot
    curvature: Vec<f64>,
}

impl CubicSpline {
    /// Spline through `(knots[i], values[i])`; knots must strictly increase
    pub fn new(knots: Vec<f64>, values: Vec<f64>) -> MspResult<Self> {
        if knots.len() != values.len() {
            return Err(invalid_argument!(
                "spline needs one value per knot ({} knots, {} values)",
                knots.len(),
                values.len()
            ));
        }
        if knots.is_empty() {
            return Err(invalid_argument!("spline needs at least one knot"));
        }
        if let Some(i) = knots.windows(2).position(|w| !(w[1] > w[0])) {
            return Err(invalid_argument!(
                "spline knots must strictly increase (knot {} = {}, knot {} = {})",
                i, knots[i], i + 1, knots[i + 1]
            ));
        }

        let curvature = natural_curvature(&knots, &values);
        Ok(CubicSpline { knots, values, curvature })
    }

    /// Cardinal spline: `values` sit on a uniform grid `t0 + i * step`
    pub fn cardinal(values: Vec<f64>, t0: f64, step: f64) -> MspResult<Self> {
        if values.len() > 1 && !(step.is_finite() && step > 0.0) {
            return Err(invalid_argument!("cardinal spline step must be positive, got {}", step));
        }
        let knots = (0..values.len()).map(|i| t0 + i as f64 * step).collect();
        Self::new(knots, values)
    }

    pub fn len(&self) -> usize {
        self.knots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.knots.is_empty()
    }

    /// Interpolated value at `x`; outside the knot range the end pieces are
    /// extended
    pub fn evaluate(&self, x: f64) -> f64 {
        let n = self.knots.len();
        if n == 1 {
            return self.values[0];
        }

        let k = self.knots.partition_point(|&t| t <= x).saturating_sub(1).min(n - 2);
        let (x0, x1) = (self.knots[k], self.knots[k + 1]);
        let h = x1 - x0;
        let a = (x1 - x) / h;
        let b = (x - x0) / h;

        a * self.values[k]
            + b * self.values[k + 1]
            + ((a * a * a - a) * self.curvature[k] + (b * b * b - b) * self.curvature[k + 1])
                * h * h / 6.0
    }
}

/// Solve the tridiagonal system for knot second derivatives with natural
/// boundary conditions (Thomas algorithm)
fn natural_curvature(x: &[f64], y: &[f64]) -> Vec<f64> {
    let n = x.len();
    let mut m = vec![0.0; n];
    if n < 3 {
        return m;
    }

    let interior = n - 2;
    let mut diag = vec![0.0; interior];
    let mut upper = vec![0.0; interior];
    let mut rhs = vec![0.0; interior];

    for j in 0..interior {
        let i = j + 1;
        let h_prev = x[i] - x[i - 1];
        let h_next = x[i + 1] - x[i];
        diag[j] = 2.0 * (h_prev + h_next);
        upper[j] = h_next;
        rhs[j] = 6.0 * ((y[i + 1] - y[i]) / h_next - (y[i] - y[i - 1]) / h_prev);
    }

    // Forward sweep; sub-diagonal entry of row j is h_prev = x[j+1] - x[j]
    for j in 1..interior {
        let lower = x[j + 1] - x[j];
        let w = lower / diag[j - 1];
        diag[j] -= w * upper[j - 1];
        rhs[j] -= w * rhs[j - 1];
    }

    m[interior] = rhs[interior - 1] / diag[interior - 1];
    for j in (0..interior - 1).rev() {
        m[j + 1] = (rhs[j] - upper[j] * m[j + 2]) / diag[j];
    }

    m
}
