//! Closed-form cubic and quartic root finding.
//!
//! The quartic is reduced through its cubic resolvent (Ferrari/Descartes
//! factorization into two quadratics); the cubic uses the trigonometric form
//! when all three roots are real and Cardano otherwise. Needed by the torus
//! primitive, whose ray equation is a degree-4 polynomial.

const EPS: f64 = 1e-12;
const TWO_PI: f64 = 2.0 * std::f64::consts::PI;

/// One root of a quartic, possibly complex.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct QuarticRoot {
    pub re: f64,
    pub im: f64,
}

impl QuarticRoot {
    fn real(re: f64) -> Self {
        Self { re, im: 0.0 }
    }

    /// True if the imaginary part is negligible.
    pub fn is_real(&self, tolerance: f64) -> bool {
        self.im.abs() < tolerance
    }
}

/// Solve `x^3 + a*x^2 + b*x + c = 0`.
///
/// Returns the real roots and their count (1, 2 or 3). With a double root
/// only the distinct values are reported.
pub fn solve_cubic(a: f64, b: f64, c: f64) -> ([f64; 3], usize) {
    let a2 = a * a;
    let q = (a2 - 3.0 * b) / 9.0;
    let r = (a * (2.0 * a2 - 9.0 * b) + 27.0 * c) / 54.0;
    let r2 = r * r;
    let q3 = q * q * q;

    if r2 < q3 {
        // Three real roots, trigonometric form.
        let t = (r / q3.sqrt()).clamp(-1.0, 1.0).acos();
        let a3 = a / 3.0;
        let m = -2.0 * q.sqrt();
        let roots = [
            m * (t / 3.0).cos() - a3,
            m * ((t + TWO_PI) / 3.0).cos() - a3,
            m * ((t - TWO_PI) / 3.0).cos() - a3,
        ];
        (roots, 3)
    } else {
        let mut big_a = -(r.abs() + (r2 - q3).sqrt()).powf(1.0 / 3.0);
        if r < 0.0 {
            big_a = -big_a;
        }
        let big_b = if big_a == 0.0 { 0.0 } else { q / big_a };

        let a3 = a / 3.0;
        let x0 = (big_a + big_b) - a3;
        let x1 = -0.5 * (big_a + big_b) - a3;
        // Imaginary part of the conjugate pair; if it vanishes the pair
        // collapses onto x1 and we have a double real root.
        let x2 = 0.5 * 3.0_f64.sqrt() * (big_a - big_b);
        if x2.abs() < EPS {
            ([x0, x1, x1], 2)
        } else {
            ([x0, x1, x2], 1)
        }
    }
}

/// Solve `x^4 + a*x^3 + b*x^2 + c*x + d = 0`.
///
/// Returns all four roots; complex ones come in conjugate pairs.
pub fn solve_quartic(a: f64, b: f64, c: f64, d: f64) -> [QuarticRoot; 4] {
    // Cubic resolvent: y^3 - b*y^2 + (ac - 4d)*y - (a^2*d + c^2 - 4bd) = 0
    let (x3, n_roots) = solve_cubic(-b, a * c - 4.0 * d, -a * a * d - c * c + 4.0 * b * d);

    // Take the resolvent root with maximal absolute value for stability.
    let mut y = x3[0];
    if n_roots != 1 {
        if x3[1].abs() > y.abs() {
            y = x3[1];
        }
        if x3[2].abs() > y.abs() {
            y = x3[2];
        }
    }

    // Split into (x^2 + p1*x + q1)(x^2 + p2*x + q2).
    let (p1, p2, q1, q2);
    let disc = y * y - 4.0 * d;
    if disc.abs() < EPS {
        q1 = y * 0.5;
        q2 = q1;
        let disc = a * a - 4.0 * (b - y);
        if disc.abs() < EPS {
            p1 = a * 0.5;
            p2 = p1;
        } else {
            let sq = disc.sqrt();
            p1 = (a + sq) * 0.5;
            p2 = (a - sq) * 0.5;
        }
    } else {
        let sq = disc.sqrt();
        q1 = (y + sq) * 0.5;
        q2 = (y - sq) * 0.5;
        p1 = (a * q1 - c) / (q1 - q2);
        p2 = (c - a * q2) / (q1 - q2);
    }

    let mut out = [QuarticRoot::default(); 4];
    solve_quadratic_into(p1, q1, &mut out[0..2]);
    solve_quadratic_into(p2, q2, &mut out[2..4]);
    out
}

/// Solve `x^2 + p*x + q = 0` into two slots, complex-aware.
fn solve_quadratic_into(p: f64, q: f64, out: &mut [QuarticRoot]) {
    let disc = p * p - 4.0 * q;
    if disc < 0.0 {
        let re = -p * 0.5;
        let im = (-disc).sqrt() * 0.5;
        out[0] = QuarticRoot { re, im };
        out[1] = QuarticRoot { re, im: -im };
    } else {
        let sq = disc.sqrt();
        out[0] = QuarticRoot::real((-p + sq) * 0.5);
        out[1] = QuarticRoot::real((-p - sq) * 0.5);
    }
}
