//! Closed-form densities evaluated in the E-step.
//!
//! Both functions are total: parameters outside the support return NaN
//! instead of panicking, so a solver can detect the degenerate case and
//! report it. Callers are expected to validate parameters before the hot
//! loop rather than inspect every returned value.

/// `1 / sqrt(2π)`.
const INV_SQRT_2PI: f64 = 0.398_942_280_401_432_7;

/// Normal density `f(x; μ, σ²)`.
///
/// The second parameter is the variance, not the standard deviation.
/// Returns NaN when `var <= 0` or any argument is NaN.
pub fn normal_pdf(x: f64, mean: f64, var: f64) -> f64 {
    if x.is_nan() || mean.is_nan() || var.is_nan() || var <= 0.0 {
        return f64::NAN;
    }
    let sd = var.sqrt();
    let z = (x - mean) / sd;
    INV_SQRT_2PI / sd * (-0.5 * z * z).exp()
}

/// Exponential density parameterised by its mean: `f(x; μ) = exp(-x/μ) / μ`.
///
/// Zero for `x < 0`. `μ` is the mean, not the rate. Returns NaN when
/// `mean <= 0` or is not finite.
pub fn exponential_pdf(x: f64, mean: f64) -> f64 {
    if x.is_nan() || !mean.is_finite() || mean <= 0.0 {
        return f64::NAN;
    }
    if x < 0.0 {
        return 0.0;
    }
    (-x / mean).exp() / mean
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn approx_eq(a: f64, b: f64, tol: f64) -> bool {
        if a.is_nan() || b.is_nan() {
            return false;
        }
        (a - b).abs() <= tol
    }

    #[test]
    fn normal_pdf_standard_peak() {
        assert!(approx_eq(normal_pdf(0.0, 0.0, 1.0), INV_SQRT_2PI, 1e-15));
        assert!(approx_eq(INV_SQRT_2PI, 1.0 / (2.0 * PI).sqrt(), 1e-15));
    }

    #[test]
    fn normal_pdf_is_symmetric_and_scaled() {
        let a = normal_pdf(3.5, 2.0, 4.0);
        let b = normal_pdf(0.5, 2.0, 4.0);
        assert!(approx_eq(a, b, 1e-15));
        // sd = 2 halves the peak height
        let peak = normal_pdf(2.0, 2.0, 4.0);
        assert!(approx_eq(peak, INV_SQRT_2PI / 2.0, 1e-15));
    }

    #[test]
    fn normal_pdf_rejects_non_positive_variance() {
        assert!(normal_pdf(0.0, 0.0, 0.0).is_nan());
        assert!(normal_pdf(0.0, 0.0, -1.0).is_nan());
        assert!(normal_pdf(f64::NAN, 0.0, 1.0).is_nan());
    }

    #[test]
    fn normal_pdf_underflows_to_zero_far_out() {
        assert_eq!(normal_pdf(1000.0, 0.0, 1.0), 0.0);
        assert!(normal_pdf(30.0, 0.0, 1.0) > 0.0);
    }

    #[test]
    fn exponential_pdf_basic() {
        assert!(approx_eq(exponential_pdf(0.0, 2.0), 0.5, 1e-15));
        let at_mean = exponential_pdf(2.0, 2.0);
        assert!(approx_eq(at_mean, 0.5 * (-1.0f64).exp(), 1e-15));
    }

    #[test]
    fn exponential_pdf_negative_support_is_zero() {
        assert_eq!(exponential_pdf(-0.1, 1.0), 0.0);
    }

    #[test]
    fn exponential_pdf_degenerate_mean_is_nan() {
        assert!(exponential_pdf(1.0, 0.0).is_nan());
        assert!(exponential_pdf(1.0, -2.0).is_nan());
        assert!(exponential_pdf(1.0, f64::INFINITY).is_nan());
    }
}
