//! f64 approximation routines.
//!
//! Self-contained implementations: range reduction plus short polynomials,
//! no calls into the platform math library. Accuracy is approximation
//! grade (roughly 1e-6 relative over moderate ranges), which is what a
//! small runtime can afford.

const PI: f64 = 3.141592653589793238462643383279502884;
const HALF_PI: f64 = 1.570796326794896619231321691639751442;
const LN_2: f64 = 0.693147180559945309417232121458176568;
const INV_LN_2: f64 = 1.442695040888963407359924681001892137;

/// Absolute value.
pub fn abs(x: f64) -> f64 {
  if x < 0.0 { -x } else { x }
}

/// Largest integer value not above `x`. Values outside the i64 range are
/// returned unchanged.
pub fn floor(x: f64) -> f64 {
  if !x.is_finite() || abs(x) >= 9.2e18 {
    return x;
  }

  let mut t = x as i64;

  if t as f64 > x {
    t -= 1;
  }

  t as f64
}

/// Smallest integer value not below `x`.
pub fn ceil(x: f64) -> f64 {
  if !x.is_finite() || abs(x) >= 9.2e18 {
    return x;
  }

  let mut t = x as i64;

  if (t as f64) < x {
    t += 1;
  }

  t as f64
}

/// Remainder of `x / y` carrying the sign of the dividend.
pub fn rem(
  x: f64,
  y: f64,
) -> f64 {
  if y == 0.0 {
    return f64::NAN;
  }

  let q = (x / y) as i64 as f64;
  let mut r = x - q * y;

  let bound = abs(y);
  while r >= bound {
    r -= bound;
  }
  while r <= -bound {
    r += bound;
  }

  r
}

/// Square root by Newton-Raphson, seeded from an exponent-halving guess.
pub fn sqrt(x: f64) -> f64 {
  if x < 0.0 {
    return f64::NAN;
  }
  if x == 0.0 || !x.is_finite() {
    return x;
  }

  let mut g = f64::from_bits((x.to_bits() >> 1) + 0x1FF8_0000_0000_0000);

  for _ in 0..6 {
    g = 0.5 * (g + x / g);
  }

  g
}

/// e raised to `x`: reduce by multiples of ln 2, then a degree-7 Taylor
/// polynomial on the small remainder.
pub fn exp(x: f64) -> f64 {
  if x.is_nan() {
    return x;
  }
  if x > 700.0 {
    return f64::INFINITY;
  }
  if x < -700.0 {
    return 0.0;
  }

  // x = n * ln 2 + r, with r in [-ln2/2, ln2/2].
  let n = (x * INV_LN_2 + if x >= 0.0 { 0.5 } else { -0.5 }) as i32;
  let r = x - f64::from(n) * LN_2;

  let r2 = r * r;
  let r3 = r2 * r;
  let r4 = r3 * r;
  let r5 = r4 * r;
  let r6 = r5 * r;
  let r7 = r6 * r;

  let res = 1.0
    + r
    + r2 * 0.5
    + r3 * (1.0 / 6.0)
    + r4 * (1.0 / 24.0)
    + r5 * (1.0 / 120.0)
    + r6 * (1.0 / 720.0)
    + r7 * (1.0 / 5040.0);

  load_exponent(res, n)
}

/// Natural logarithm: scale into [1, 2) by powers of two, then an
/// atanh-style series.
pub fn ln(x: f64) -> f64 {
  if x.is_nan() || x <= 0.0 {
    return f64::NAN;
  }
  if !x.is_finite() {
    return x;
  }

  let mut k = 0;
  let mut m = x;

  while m >= 2.0 {
    m *= 0.5;
    k += 1;
  }
  while m < 1.0 {
    m *= 2.0;
    k -= 1;
  }

  let z = (m - 1.0) / (m + 1.0);
  let z2 = z * z;
  let z3 = z2 * z;
  let z5 = z3 * z2;
  let z7 = z5 * z2;
  let log_m = 2.0 * (z + z3 / 3.0 + z5 / 5.0 + z7 / 7.0);

  log_m + f64::from(k) * LN_2
}

/// `x` raised to `y` via exp(y ln x). A negative base is only defined for
/// integer exponents.
pub fn pow(
  x: f64,
  y: f64,
) -> f64 {
  if x == 0.0 {
    if y > 0.0 {
      return 0.0;
    }
    if y == 0.0 {
      return 1.0;
    }
    return f64::INFINITY;
  }

  if x < 0.0 {
    let yi = y as i64;

    if yi as f64 == y {
      let r = exp(y * ln(-x));
      return if yi & 1 == 1 { -r } else { r };
    }

    return f64::NAN;
  }

  exp(y * ln(x))
}

/// Sine via quadrant reduction and odd/even polynomials.
pub fn sin(x: f64) -> f64 {
  if x == 0.0 {
    return x;
  }
  if !x.is_finite() {
    return f64::NAN;
  }

  let (r, quadrant) = reduce_half_pi(x);

  match quadrant {
    0 => poly_sin(r),
    1 => poly_cos(r),
    2 => -poly_sin(r),
    _ => -poly_cos(r),
  }
}

/// Cosine via quadrant reduction and odd/even polynomials.
pub fn cos(x: f64) -> f64 {
  if x == 0.0 {
    return 1.0;
  }
  if !x.is_finite() {
    return f64::NAN;
  }

  let (r, quadrant) = reduce_half_pi(x);

  match quadrant {
    0 => poly_cos(r),
    1 => -poly_sin(r),
    2 => -poly_cos(r),
    _ => poly_sin(r),
  }
}

/// Tangent as sin/cos.
pub fn tan(x: f64) -> f64 {
  let c = cos(x);

  if c == 0.0 {
    return f64::NAN;
  }

  sin(x) / c
}

/// Scales `x` by 2^n through exponent arithmetic, saturating to infinity
/// and flushing to zero at the format's limits.
fn load_exponent(
  x: f64,
  n: i32,
) -> f64 {
  if x == 0.0 || !x.is_finite() {
    return x;
  }

  let mut x = x;
  let mut n = n;

  while n > 1023 {
    x *= f64::from_bits(0x7FE0_0000_0000_0000); // 2^1023
    n -= 1023;
  }
  while n < -1022 {
    x *= f64::from_bits(0x0010_0000_0000_0000); // 2^-1022
    n += 1022;
  }

  x * f64::from_bits(((1023 + n) as u64) << 52)
}

/// Reduces `x` by multiples of pi/2, returning the remainder and the
/// quadrant index in 0..4.
fn reduce_half_pi(x: f64) -> (f64, usize) {
  let k = (x * (2.0 / PI) + if x >= 0.0 { 0.5 } else { -0.5 }) as i64;
  let r = x - k as f64 * HALF_PI;

  (r, (k & 3) as usize)
}

// sin(z) for z near zero: z - z^3/6 + z^5/120 - z^7/5040.
fn poly_sin(z: f64) -> f64 {
  let z2 = z * z;

  z + z * z2 * (-1.0 / 6.0 + z2 * (1.0 / 120.0 + z2 * (-1.0 / 5040.0)))
}

// cos(z) for z near zero: 1 - z^2/2 + z^4/24 - z^6/720.
fn poly_cos(z: f64) -> f64 {
  let z2 = z * z;

  1.0 + z2 * (-0.5 + z2 * (1.0 / 24.0 + z2 * (-1.0 / 720.0)))
}

#[cfg(test)]
mod tests {
  use super::*;

  fn assert_close(
    actual: f64,
    expected: f64,
    tolerance: f64,
  ) {
    let scale = if expected.abs() > 1.0 { expected.abs() } else { 1.0 };

    assert!(
      (actual - expected).abs() <= tolerance * scale,
      "{actual} not within {tolerance} of {expected}"
    );
  }

  #[test]
  fn test_abs_floor_ceil() {
    assert_eq!(2.5, abs(-2.5));
    assert_eq!(2.5, abs(2.5));

    assert_eq!(2.0, floor(2.7));
    assert_eq!(-3.0, floor(-2.3));
    assert_eq!(2.0, floor(2.0));

    assert_eq!(3.0, ceil(2.3));
    assert_eq!(-2.0, ceil(-2.7));
    assert_eq!(-2.0, ceil(-2.0));
  }

  #[test]
  fn test_rem() {
    assert_close(rem(7.5, 2.0), 1.5, 1e-12);
    assert_close(rem(-7.5, 2.0), -1.5, 1e-12);
    assert!(rem(1.0, 0.0).is_nan());
  }

  #[test]
  fn test_sqrt() {
    for x in [0.25, 1.0, 2.0, 9.0, 1e6, 1e-6, 12345.678] {
      assert_close(sqrt(x), x.sqrt(), 1e-9);
    }

    assert_eq!(0.0, sqrt(0.0));
    assert!(sqrt(-1.0).is_nan());
  }

  #[test]
  fn test_exp() {
    for x in [-20.0, -1.0, -0.1, 0.0, 0.5, 1.0, 10.0, 50.0] {
      assert_close(exp(x), x.exp(), 1e-8);
    }

    assert_eq!(f64::INFINITY, exp(701.0));
    assert_eq!(0.0, exp(-701.0));
  }

  #[test]
  fn test_ln() {
    // The degree-7 series is approximation grade near the top of the
    // [1, 2) reduction range.
    for x in [0.001, 0.5, 1.0, 2.718281828, 10.0, 1e6] {
      assert_close(ln(x), x.ln(), 1e-4);
    }

    assert!(ln(0.0).is_nan());
    assert!(ln(-1.0).is_nan());
  }

  #[test]
  fn test_pow() {
    assert_close(pow(2.0, 10.0), 1024.0, 1e-8);
    assert_close(pow(9.0, 0.5), 3.0, 1e-8);
    assert_close(pow(-2.0, 3.0), -8.0, 1e-8);
    assert_close(pow(-2.0, 2.0), 4.0, 1e-8);
    assert_eq!(1.0, pow(0.0, 0.0));
    assert_eq!(0.0, pow(0.0, 2.0));
    assert!(pow(-2.0, 0.5).is_nan());
  }

  #[test]
  fn test_trig() {
    for i in -20..=20 {
      let x = f64::from(i) * 0.37;

      assert_close(sin(x), x.sin(), 1e-5);
      assert_close(cos(x), x.cos(), 1e-5);
    }

    assert_eq!(0.0, sin(0.0));
    assert_eq!(1.0, cos(0.0));
    assert_close(tan(1.0), 1.0_f64.tan(), 1e-4);
  }
}
