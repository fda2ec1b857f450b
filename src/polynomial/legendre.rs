//! Legendre polynomial evaluation.
//!
//! Legendre polynomials P_n(x) are orthogonal on [-1, 1] with weight 1:
//! ∫_{-1}^{1} P_m(x) P_n(x) dx = 2/(2n+1) δ_{mn}
//!
//! They are the modal basis behind every reference-element operator in this
//! crate: Vandermonde matrices, node generation and the basis change used for
//! over-integrated error norms.

/// Run the three-term recurrence up to degree `n`, returning (P_n, P_{n-1}).
///
/// (k+1) P_{k+1}(x) = (2k+1) x P_k(x) - k P_{k-1}(x)
#[inline]
fn recurrence(n: usize, x: f64) -> (f64, f64) {
    let mut p_prev = 1.0;
    let mut p_curr = x;
    for k in 1..n {
        let kf = k as f64;
        let p_next = ((2.0 * kf + 1.0) * x * p_curr - kf * p_prev) / (kf + 1.0);
        p_prev = p_curr;
        p_curr = p_next;
    }
    (p_curr, p_prev)
}

/// Evaluate the Legendre polynomial P_n(x).
pub fn legendre(n: usize, x: f64) -> f64 {
    match n {
        0 => 1.0,
        1 => x,
        _ => recurrence(n, x).0,
    }
}

/// Evaluate the derivative P'_n(x).
///
/// Interior points use P'_n = n (x P_n - P_{n-1}) / (x² - 1); the endpoints
/// use the closed forms P'_n(±1) = (±1)^{n+1} n(n+1)/2.
pub fn legendre_derivative(n: usize, x: f64) -> f64 {
    legendre_and_derivative(n, x).1
}

/// Evaluate P_n(x) and P'_n(x) with a single recurrence pass.
pub fn legendre_and_derivative(n: usize, x: f64) -> (f64, f64) {
    match n {
        0 => return (1.0, 0.0),
        1 => return (x, 1.0),
        _ => {}
    }

    let (p_n, p_nm1) = recurrence(n, x);
    let endpoint = (n * (n + 1)) as f64 / 2.0;

    let dp_n = if (x - 1.0).abs() < 1e-14 {
        endpoint
    } else if (x + 1.0).abs() < 1e-14 {
        if n % 2 == 0 {
            -endpoint
        } else {
            endpoint
        }
    } else {
        n as f64 * (x * p_n - p_nm1) / (x * x - 1.0)
    };

    (p_n, dp_n)
}
