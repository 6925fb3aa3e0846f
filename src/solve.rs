use crate::histogram::Histogram;
use anyhow::{anyhow, ensure, Result};

const MAX_ITER: usize = 100;
const TOL: f64 = 1e-15;

/// Solve `(L0 - I) - sum(freq * x^m) = 0` for the per-window survival
/// probability q in [0,1].
///
/// The residual is monotone decreasing on [0,1] with f(0) = L0 - I and
/// f(1) = -I, so when the caller has already handled I >= L0 the root is
/// bracketed and a bracketing solver cannot wander off like an unguarded
/// Newton iteration.
///
/// I = 0 is special-cased to q = 1 exactly, without a numeric solve.
pub fn solve_histogram_equation(hist: &Histogram, intersection: f64) -> Result<f64> {
    if intersection == 0.0 {
        return Ok(1.0);
    }
    let total = hist.distinct_kmers() as f64;
    let residual = |x: f64| {
        (total - intersection)
            - hist
                .iter()
                .map(|(m, n)| n as f64 * x.powf(m as f64))
                .sum::<f64>()
    };
    brent(residual, 0.0, 1.0)
}

/// Brent's method: bisection with inverse quadratic interpolation where
/// the interpolation step is safe. Requires a sign change on [x1, x2].
fn brent<F: Fn(f64) -> f64>(f: F, x1: f64, x2: f64) -> Result<f64> {
    let (mut a, mut b) = (x1, x2);
    let (mut fa, mut fb) = (f(a), f(b));
    ensure!(
        (fa <= 0.0 && fb >= 0.0) || (fa >= 0.0 && fb <= 0.0),
        "root is not bracketed: f({}) = {}, f({}) = {}",
        x1,
        fa,
        x2,
        fb
    );
    let mut c = b;
    let mut fc = fb;
    let (mut d, mut e) = (b - a, b - a);
    for _ in 0..MAX_ITER {
        if (fb > 0.0) == (fc > 0.0) {
            c = a;
            fc = fa;
            d = b - a;
            e = d;
        }
        if fc.abs() < fb.abs() {
            a = b;
            b = c;
            c = a;
            fa = fb;
            fb = fc;
            fc = fa;
        }
        let tol1 = 2.0 * f64::EPSILON * b.abs() + 0.5 * TOL;
        let xm = 0.5 * (c - b);
        if xm.abs() <= tol1 || fb == 0.0 {
            return Ok(b);
        }
        if e.abs() >= tol1 && fa.abs() > fb.abs() {
            // attempt inverse quadratic interpolation
            let s = fb / fa;
            let (mut p, mut q);
            if a == c {
                p = 2.0 * xm * s;
                q = 1.0 - s;
            } else {
                let t = fa / fc;
                let r = fb / fc;
                p = s * (2.0 * xm * t * (t - r) - (b - a) * (r - 1.0));
                q = (t - 1.0) * (r - 1.0) * (s - 1.0);
            }
            if p > 0.0 {
                q = -q;
            }
            p = p.abs();
            let min1 = 3.0 * xm * q - (tol1 * q).abs();
            let min2 = (e * q).abs();
            if 2.0 * p < min1.min(min2) {
                e = d;
                d = p / q;
            } else {
                d = xm;
                e = d;
            }
        } else {
            d = xm;
            e = d;
        }
        a = b;
        fa = fb;
        if d.abs() > tol1 {
            b += d;
        } else {
            b += tol1.copysign(xm);
        }
        fb = f(b);
    }
    Err(anyhow!("no convergence in {} iterations", MAX_ITER))
}
