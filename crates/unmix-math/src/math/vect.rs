//! Lane-chunked arithmetic over contiguous `f64` buffers.
//!
//! Every kernel walks the input in fixed-width chunks of [`LANES`] elements
//! with independent per-lane accumulators, then finishes the remainder with
//! a scalar loop. The chunked bodies have no cross-iteration dependency
//! inside a chunk, so the compiler lowers them to packed SIMD on targets
//! that have it (AVX on x86_64, NEON on aarch64) without `unsafe`.
//!
//! Reductions combine lanes pairwise, so results can differ from a naive
//! left-to-right sum by floating-point reassociation error only.
//!
//! # Panics
//!
//! Binary kernels require equal-length operands and destination; a length
//! mismatch is a caller bug and panics, the same contract as
//! [`slice::copy_from_slice`].

/// Number of `f64` lanes processed per chunk (one 256-bit register).
pub const LANES: usize = 4;

#[inline]
fn reduce_lanes(acc: [f64; LANES]) -> f64 {
    (acc[0] + acc[2]) + (acc[1] + acc[3])
}

#[inline]
fn check_len(what: &str, a: usize, b: usize) {
    assert_eq!(a, b, "{what}: operand lengths differ ({a} != {b})");
}

/// Sum of all elements.
///
/// Returns 0.0 for an empty slice.
pub fn sum(values: &[f64]) -> f64 {
    let mut acc = [0.0f64; LANES];
    let chunks = values.chunks_exact(LANES);
    let tail = chunks.remainder();
    for chunk in chunks {
        for (lane, v) in acc.iter_mut().zip(chunk) {
            *lane += *v;
        }
    }
    let mut total = reduce_lanes(acc);
    for v in tail {
        total += *v;
    }
    total
}

/// Sum of integer counts, `None` on overflow.
pub fn sum_counts(values: &[u64]) -> Option<u64> {
    values.iter().try_fold(0u64, |acc, &v| acc.checked_add(v))
}

/// `dst[i] = a[i] * b[i]`.
pub fn mul(a: &[f64], b: &[f64], dst: &mut [f64]) {
    check_len("mul", a.len(), b.len());
    check_len("mul", a.len(), dst.len());
    let mut out = dst.chunks_exact_mut(LANES);
    let mut lhs = a.chunks_exact(LANES);
    let mut rhs = b.chunks_exact(LANES);
    for ((d, x), y) in (&mut out).zip(&mut lhs).zip(&mut rhs) {
        for l in 0..LANES {
            d[l] = x[l] * y[l];
        }
    }
    for ((d, x), y) in out
        .into_remainder()
        .iter_mut()
        .zip(lhs.remainder())
        .zip(rhs.remainder())
    {
        *d = x * y;
    }
}

/// `dst[i] = a[i] * scalar`.
pub fn mul_scalar(a: &[f64], scalar: f64, dst: &mut [f64]) {
    check_len("mul_scalar", a.len(), dst.len());
    let mut out = dst.chunks_exact_mut(LANES);
    let mut src = a.chunks_exact(LANES);
    for (d, x) in (&mut out).zip(&mut src) {
        for l in 0..LANES {
            d[l] = x[l] * scalar;
        }
    }
    for (d, x) in out.into_remainder().iter_mut().zip(src.remainder()) {
        *d = x * scalar;
    }
}

/// `dst[i] = a[i] / b[i]`.
///
/// Division by zero follows IEEE-754 (±inf or NaN); callers that cannot
/// tolerate that must check the divisor first.
pub fn div(a: &[f64], b: &[f64], dst: &mut [f64]) {
    check_len("div", a.len(), b.len());
    check_len("div", a.len(), dst.len());
    let mut out = dst.chunks_exact_mut(LANES);
    let mut lhs = a.chunks_exact(LANES);
    let mut rhs = b.chunks_exact(LANES);
    for ((d, x), y) in (&mut out).zip(&mut lhs).zip(&mut rhs) {
        for l in 0..LANES {
            d[l] = x[l] / y[l];
        }
    }
    for ((d, x), y) in out
        .into_remainder()
        .iter_mut()
        .zip(lhs.remainder())
        .zip(rhs.remainder())
    {
        *d = x / y;
    }
}

/// `dst[i] = a[i] / scalar`.
pub fn div_scalar(a: &[f64], scalar: f64, dst: &mut [f64]) {
    check_len("div_scalar", a.len(), dst.len());
    let mut out = dst.chunks_exact_mut(LANES);
    let mut src = a.chunks_exact(LANES);
    for (d, x) in (&mut out).zip(&mut src) {
        for l in 0..LANES {
            d[l] = x[l] / scalar;
        }
    }
    for (d, x) in out.into_remainder().iter_mut().zip(src.remainder()) {
        *d = x / scalar;
    }
}

/// `Σ (a[i] - b[i])²`.
pub fn squared_error_sum(a: &[f64], b: &[f64]) -> f64 {
    check_len("squared_error_sum", a.len(), b.len());
    let mut acc = [0.0f64; LANES];
    let lhs = a.chunks_exact(LANES);
    let rhs = b.chunks_exact(LANES);
    let (lt, rt) = (lhs.remainder(), rhs.remainder());
    for (x, y) in lhs.zip(rhs) {
        for l in 0..LANES {
            let d = x[l] - y[l];
            acc[l] += d * d;
        }
    }
    let mut total = reduce_lanes(acc);
    for (x, y) in lt.iter().zip(rt) {
        let d = x - y;
        total += d * d;
    }
    total
}

/// Root-mean-square difference `sqrt(mean((a[i] - b[i])²))`.
///
/// Returns 0.0 for empty operands.
pub fn rms_error(a: &[f64], b: &[f64]) -> f64 {
    if a.is_empty() {
        check_len("rms_error", a.len(), b.len());
        return 0.0;
    }
    (squared_error_sum(a, b) / a.len() as f64).sqrt()
}

/// `Σ weights[i] · (values[i] - center)²`.
///
/// The weighted second moment about `center`, used for variance updates.
pub fn weighted_squared_deviation_sum(weights: &[f64], values: &[f64], center: f64) -> f64 {
    check_len(
        "weighted_squared_deviation_sum",
        weights.len(),
        values.len(),
    );
    let mut acc = [0.0f64; LANES];
    let w = weights.chunks_exact(LANES);
    let v = values.chunks_exact(LANES);
    let (wt, vt) = (w.remainder(), v.remainder());
    for (wc, vc) in w.zip(v) {
        for l in 0..LANES {
            let d = vc[l] - center;
            acc[l] += wc[l] * d * d;
        }
    }
    let mut total = reduce_lanes(acc);
    for (wi, vi) in wt.iter().zip(vt) {
        let d = vi - center;
        total += wi * d * d;
    }
    total
}
