use crate::decimal::{BigDecimal, DecimalError};

/// Exact hit test for the three-region target.
///
/// All comparisons run on [`BigDecimal`], so boundary points ("on the
/// line") behave exactly like they would over the reals for any finitely
/// representable decimal input. The regions, for radius `r`:
///
/// - quarter disc: `x, y` in `[0, r/2]` with `x² + y² <= (r/2)²`
/// - rectangle: `x` in `[-r, 0]`, `y` in `[0, r/2]`
/// - triangle: `x` in `[-r/2, 0]`, `y <= 0`, `y >= -(2x + r)`
#[derive(Debug, Default)]
pub struct HitChecker;

impl HitChecker {
    pub fn new() -> HitChecker {
        HitChecker
    }

    /// Parse the textual coordinates and test the point.
    ///
    /// A zero radius never hits; a negative radius is normalized by
    /// negation first.
    pub fn hit_check(&self, x: &str, y: &str, r: &str) -> Result<bool, DecimalError> {
        let x: BigDecimal = x.parse()?;
        let y: BigDecimal = y.parse()?;
        let mut r: BigDecimal = r.parse()?;

        if r.is_zero() {
            return Ok(false);
        }
        if r.is_negative() {
            r = -r;
        }

        Ok(check_circle(&x, &y, &r) || check_rectangle(&x, &y, &r) || check_triangle(&x, &y, &r))
    }
}

fn check_circle(x: &BigDecimal, y: &BigDecimal, r: &BigDecimal) -> bool {
    let zero = BigDecimal::from(0);
    let half_r = r / &BigDecimal::from(2);

    let in_bounds = *x >= zero && *x <= half_r && *y >= zero && *y <= half_r;
    let in_circle = x * x + y * y <= &half_r * &half_r;

    in_bounds && in_circle
}

fn check_rectangle(x: &BigDecimal, y: &BigDecimal, r: &BigDecimal) -> bool {
    let zero = BigDecimal::from(0);
    let half_r = r / &BigDecimal::from(2);
    let minus_r = -r;

    *x <= zero && *x >= minus_r && *y >= zero && *y <= half_r
}

fn check_triangle(x: &BigDecimal, y: &BigDecimal, r: &BigDecimal) -> bool {
    let zero = BigDecimal::from(0);
    let half_r = r / &BigDecimal::from(2);
    let y_min = -(x * &BigDecimal::from(2) + r);

    *x >= -&half_r && *x <= zero && *y <= zero && *y >= y_min
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit(x: &str, y: &str, r: &str) -> bool {
        HitChecker::new().hit_check(x, y, r).unwrap()
    }

    #[test]
    fn test_zero_and_negative_radius() {
        assert!(!hit("0", "0", "0"));
        assert!(!hit("0.1", "0.1", "0"));
        // Negative radius is normalized; same verdicts as r = 2.
        assert!(hit("0.5", "0.5", "-2"));
        assert!(hit("1", "0", "-2"));
    }

    #[test]
    fn test_quarter_disc() {
        assert!(hit("0", "0", "2"));
        assert!(hit("0.5", "0.5", "2"));
        // On the arc: x² + y² == (r/2)².
        assert!(hit("1", "0", "2"));
        assert!(hit("0.6", "0.8", "2"));
        // Inside the bounding square but outside the arc.
        assert!(!hit("0.9", "0.9", "2"));
        assert!(!hit("1", "0.1", "2"));
        // Negative y belongs to the triangle's half-plane, not here.
        assert!(!hit("1", "-0.1", "2"));
    }

    #[test]
    fn test_rectangle() {
        assert!(hit("-1", "0.5", "2"));
        assert!(hit("-2", "1", "2"));
        assert!(hit("-0.001", "0.999", "2"));
        assert!(!hit("-2.001", "0.5", "2"));
        assert!(!hit("-1", "1.001", "2"));
        assert!(!hit("0.5", "-0.5", "2"));
    }

    #[test]
    fn test_triangle() {
        assert!(hit("-0.5", "-0.5", "2"));
        // Hypotenuse boundary: y == -(2x + r).
        assert!(hit("-0.5", "-1", "2"));
        assert!(hit("-1", "0", "2"));
        assert!(!hit("-0.5", "-1.001", "2"));
        assert!(!hit("-1.001", "-0.1", "2"));
        assert!(!hit("0.1", "-0.1", "2"));
    }

    #[test]
    fn test_exact_decimal_boundaries() {
        // 0.3² + 0.4² == 0.25 == 0.5² exactly in decimal; floats get
        // this wrong.
        assert!(hit("0.3", "0.4", "1"));
        assert!(!hit("0.3", "0.40000000000000001", "1"));
    }

    #[test]
    fn test_invalid_coordinates() {
        assert!(HitChecker::new().hit_check("abc", "0", "1").is_err());
        assert!(HitChecker::new().hit_check("0", "1,5", "1").is_err());
        assert!(HitChecker::new().hit_check("0", "0", "").is_err());
    }
}
