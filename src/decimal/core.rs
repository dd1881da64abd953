use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};
use std::str::FromStr;

/// Number of fractional digits produced by the `/` operator.
pub const DEFAULT_DIVISION_PRECISION: usize = 20;

/// Error produced by decimal parsing and division.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecimalError {
    /// The input text is not a valid decimal numeral.
    InvalidInput(&'static str),
    /// Division by a zero divisor.
    DivisionByZero,
}

impl fmt::Display for DecimalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecimalError::InvalidInput(reason) => write!(f, "invalid decimal: {reason}"),
            DecimalError::DivisionByZero => write!(f, "division by zero"),
        }
    }
}

impl std::error::Error for DecimalError {}

/// Arbitrary-precision signed decimal.
///
/// Stored as `(sign, digits, scale)` where `digits` holds one decimal digit
/// per element, most significant first, and `scale` counts how many of the
/// trailing digits belong to the fractional part. The represented value is
/// `±(digits as integer) * 10^(-scale)`.
///
/// Invariant: exactly one representation per numeric value after
/// normalization - no leading zeros unless the value is zero (then a single
/// `0` with scale 0 and positive sign). Trailing fractional zeros may be
/// present after arithmetic; they do not affect comparisons and are
/// suppressed by `Display`.
///
/// ```
/// use quadrant::decimal::BigDecimal;
///
/// let a: BigDecimal = "000123.4500".parse().unwrap();
/// assert_eq!(a.to_string(), "123.45");
///
/// let b = BigDecimal::from(2);
/// assert_eq!((&a * &b).to_string(), "246.9");
/// ```
#[derive(Debug, Clone)]
pub struct BigDecimal {
    negative: bool,
    digits: Vec<u8>,
    scale: usize,
}

impl Default for BigDecimal {
    fn default() -> Self {
        BigDecimal {
            negative: false,
            digits: vec![0],
            scale: 0,
        }
    }
}

impl BigDecimal {
    /// True when the value is canonical zero.
    pub fn is_zero(&self) -> bool {
        self.digits == [0]
    }

    /// True for values strictly below zero.
    pub fn is_negative(&self) -> bool {
        self.negative
    }

    /// Number of fractional digits currently stored.
    pub fn scale(&self) -> usize {
        self.scale
    }

    /// Long division producing `precision` extra fractional digits.
    ///
    /// The scales of both operands are aligned first, then discarded; the
    /// dividend is right-padded with `precision` zero digits and swept most
    /// significant digit first, keeping a running remainder. The last digit
    /// is truncated toward zero, never rounded. The result sign is the XOR
    /// of the operand signs.
    pub fn div_with_precision(
        &self,
        rhs: &BigDecimal,
        precision: usize,
    ) -> Result<BigDecimal, DecimalError> {
        if rhs.is_zero() {
            return Err(DecimalError::DivisionByZero);
        }

        let mut dividend = self.clone();
        let mut divisor = rhs.clone();
        align_scales(&mut dividend, &mut divisor);
        dividend.digits.extend(std::iter::repeat(0).take(precision));

        let mut quotient = Vec::with_capacity(dividend.digits.len());
        let mut remainder: Vec<u8> = vec![0];

        for &digit in &dividend.digits {
            if remainder == [0] {
                remainder[0] = digit;
            } else {
                remainder.push(digit);
            }
            trim_magnitude(&mut remainder);

            let mut q = 0u8;
            for candidate in (1..=9u8).rev() {
                let multiple = mul_small(&divisor.digits, candidate);
                if compare_magnitudes(&multiple, &remainder) != Ordering::Greater {
                    q = candidate;
                    remainder = sub_magnitudes(&remainder, &multiple);
                    break;
                }
            }
            quotient.push(q);
        }

        let mut result = BigDecimal {
            negative: self.negative != rhs.negative,
            digits: quotient,
            scale: precision,
        };
        result.normalize();
        Ok(result)
    }

    /// Sum or difference of `self` and `other`, in place.
    ///
    /// Scales are aligned by right-padding zeros; same-sign magnitudes add
    /// with carry, opposite signs subtract the smaller magnitude from the
    /// larger and keep the larger operand's sign.
    fn add_or_subtract(&mut self, other: &BigDecimal, is_addition: bool) {
        let mut lhs = self.clone();
        let mut rhs = other.clone();
        align_scales(&mut lhs, &mut rhs);

        if !is_addition {
            rhs.negative = !rhs.negative;
        }

        if lhs.negative == rhs.negative {
            self.digits = add_magnitudes(&lhs.digits, &rhs.digits);
            self.negative = lhs.negative;
            self.scale = lhs.scale;
        } else {
            match compare_magnitudes(&lhs.digits, &rhs.digits) {
                Ordering::Equal => {
                    self.digits = vec![0];
                    self.scale = 0;
                    self.negative = false;
                }
                Ordering::Greater => {
                    self.digits = sub_magnitudes(&lhs.digits, &rhs.digits);
                    self.negative = lhs.negative;
                    self.scale = lhs.scale;
                }
                Ordering::Less => {
                    self.digits = sub_magnitudes(&rhs.digits, &lhs.digits);
                    self.negative = rhs.negative;
                    self.scale = lhs.scale;
                }
            }
        }

        self.normalize();
    }

    fn multiply(&self, other: &BigDecimal) -> BigDecimal {
        if self.is_zero() || other.is_zero() {
            return BigDecimal::default();
        }

        let n = self.digits.len();
        let m = other.digits.len();
        let mut product = vec![0u8; n + m];

        for i in (0..n).rev() {
            let mut carry = 0u16;
            for j in (0..m).rev() {
                let idx = i + j + 1;
                let value =
                    u16::from(self.digits[i]) * u16::from(other.digits[j])
                        + u16::from(product[idx])
                        + carry;
                product[idx] = (value % 10) as u8;
                carry = value / 10;
            }
            product[i] += carry as u8;
        }

        let mut result = BigDecimal {
            negative: self.negative != other.negative,
            digits: product,
            scale: self.scale + other.scale,
        };
        result.normalize();
        result
    }

    /// Strip leading zeros and collapse all-zero values to canonical zero.
    fn normalize(&mut self) {
        match self.digits.iter().position(|&d| d != 0) {
            None => {
                self.digits.clear();
                self.digits.push(0);
                self.scale = 0;
                self.negative = false;
            }
            Some(0) => {}
            Some(first) => {
                self.digits.drain(..first);
            }
        }
    }
}

/// Right-pad the shorter operand with zero digits until scales match.
fn align_scales(a: &mut BigDecimal, b: &mut BigDecimal) {
    match a.scale.cmp(&b.scale) {
        Ordering::Equal => {}
        Ordering::Less => {
            let diff = b.scale - a.scale;
            a.digits.extend(std::iter::repeat(0).take(diff));
            a.scale = b.scale;
        }
        Ordering::Greater => {
            let diff = a.scale - b.scale;
            b.digits.extend(std::iter::repeat(0).take(diff));
            b.scale = a.scale;
        }
    }
}

/// Magnitude comparison of digit vectors without leading zeros.
fn compare_magnitudes(a: &[u8], b: &[u8]) -> Ordering {
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

fn add_magnitudes(a: &[u8], b: &[u8]) -> Vec<u8> {
    let n = a.len().max(b.len());
    let mut result = vec![0u8; n];
    let mut carry = 0u8;

    for i in 0..n {
        let da = if i < a.len() { a[a.len() - 1 - i] } else { 0 };
        let db = if i < b.len() { b[b.len() - 1 - i] } else { 0 };
        let sum = da + db + carry;
        result[n - 1 - i] = sum % 10;
        carry = sum / 10;
    }
    if carry > 0 {
        result.insert(0, carry);
    }
    result
}

/// Subtract `b` from `a`; `a` must be the larger magnitude.
fn sub_magnitudes(a: &[u8], b: &[u8]) -> Vec<u8> {
    let n = a.len();
    let mut result = vec![0u8; n];
    let mut borrow = 0i8;

    for i in 0..n {
        let da = a[n - 1 - i] as i8;
        let db = if i < b.len() { b[b.len() - 1 - i] as i8 } else { 0 };
        let mut diff = da - db - borrow;
        if diff < 0 {
            diff += 10;
            borrow = 1;
        } else {
            borrow = 0;
        }
        result[n - 1 - i] = diff as u8;
    }

    trim_magnitude(&mut result);
    result
}

/// Multiply a magnitude by a single digit.
fn mul_small(digits: &[u8], factor: u8) -> Vec<u8> {
    let mut result = vec![0u8; digits.len()];
    let mut carry = 0u8;
    for i in (0..digits.len()).rev() {
        let value = digits[i] * factor + carry;
        result[i] = value % 10;
        carry = value / 10;
    }
    if carry > 0 {
        result.insert(0, carry);
    }
    result
}

/// Drop leading zeros, keeping at least one digit.
fn trim_magnitude(digits: &mut Vec<u8>) {
    let first = digits
        .iter()
        .position(|&d| d != 0)
        .unwrap_or(digits.len() - 1);
    if first > 0 {
        digits.drain(..first);
    }
}

impl FromStr for BigDecimal {
    type Err = DecimalError;

    /// Parse a textual numeral: optional surrounding whitespace, optional
    /// `+`/`-`, one or more digits with at most one interior `.`.
    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let trimmed = input.trim_matches(|c: char| c.is_ascii_whitespace());
        if trimmed.is_empty() {
            return Err(DecimalError::InvalidInput("empty numeric string"));
        }

        let (negative, rest) = match trimmed.as_bytes()[0] {
            b'+' => (false, &trimmed[1..]),
            b'-' => (true, &trimmed[1..]),
            _ => (false, trimmed),
        };
        if rest.is_empty() {
            return Err(DecimalError::InvalidInput("empty numeric string after sign"));
        }

        let mut digits = Vec::with_capacity(rest.len());
        let mut fractional = 0usize;
        let mut seen_dot = false;

        for &byte in rest.as_bytes() {
            match byte {
                b'.' => {
                    if seen_dot {
                        return Err(DecimalError::InvalidInput("multiple decimal points"));
                    }
                    seen_dot = true;
                }
                b'0'..=b'9' => {
                    digits.push(byte - b'0');
                    if seen_dot {
                        fractional += 1;
                    }
                }
                _ => {
                    return Err(DecimalError::InvalidInput(
                        "invalid character in numeric string",
                    ))
                }
            }
        }

        if digits.is_empty() {
            return Err(DecimalError::InvalidInput("no digits in numeric string"));
        }

        let mut value = BigDecimal {
            negative,
            digits,
            scale: fractional,
        };
        value.normalize();
        Ok(value)
    }
}

impl From<i64> for BigDecimal {
    fn from(v: i64) -> Self {
        let magnitude = v.unsigned_abs();
        if magnitude == 0 {
            return BigDecimal::default();
        }
        BigDecimal {
            negative: v < 0,
            digits: magnitude.to_string().bytes().map(|b| b - b'0').collect(),
            scale: 0,
        }
    }
}

impl fmt::Display for BigDecimal {
    /// Emit sign, integer digits, then `.` and fractional digits when the
    /// scale is positive. Trailing fractional zeros are stripped, a bare
    /// trailing `.` is dropped, and `-0` collapses to `0`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_zero() {
            return f.write_str("0");
        }

        let mut out = String::with_capacity(self.digits.len() + 3);
        if self.negative {
            out.push('-');
        }

        let integer_digits = self.digits.len() as isize - self.scale as isize;
        if integer_digits <= 0 {
            out.push_str("0.");
            for _ in 0..(-integer_digits) {
                out.push('0');
            }
            for &d in &self.digits {
                out.push((b'0' + d) as char);
            }
        } else {
            let split = integer_digits as usize;
            for &d in &self.digits[..split] {
                out.push((b'0' + d) as char);
            }
            if self.scale > 0 {
                out.push('.');
                for &d in &self.digits[split..] {
                    out.push((b'0' + d) as char);
                }
            }
        }

        if self.scale > 0 {
            while out.ends_with('0') {
                out.pop();
            }
            if out.ends_with('.') {
                out.pop();
            }
        }

        if out.is_empty() || out == "-" || out == "-0" {
            return f.write_str("0");
        }
        f.write_str(&out)
    }
}

impl PartialEq for BigDecimal {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for BigDecimal {}

impl PartialOrd for BigDecimal {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for BigDecimal {
    /// Total order on the numeric value: sign first, then aligned-scale
    /// magnitude by digit count, then lexicographically.
    fn cmp(&self, other: &Self) -> Ordering {
        if self.negative != other.negative {
            return if self.negative {
                Ordering::Less
            } else {
                Ordering::Greater
            };
        }

        let mut a = self.clone();
        let mut b = other.clone();
        align_scales(&mut a, &mut b);

        let magnitude = compare_magnitudes(&a.digits, &b.digits);
        if self.negative {
            magnitude.reverse()
        } else {
            magnitude
        }
    }
}

impl AddAssign<&BigDecimal> for BigDecimal {
    fn add_assign(&mut self, rhs: &BigDecimal) {
        self.add_or_subtract(rhs, true);
    }
}

impl SubAssign<&BigDecimal> for BigDecimal {
    fn sub_assign(&mut self, rhs: &BigDecimal) {
        self.add_or_subtract(rhs, false);
    }
}

impl Add for &BigDecimal {
    type Output = BigDecimal;

    fn add(self, rhs: &BigDecimal) -> BigDecimal {
        let mut result = self.clone();
        result += rhs;
        result
    }
}

impl Sub for &BigDecimal {
    type Output = BigDecimal;

    fn sub(self, rhs: &BigDecimal) -> BigDecimal {
        let mut result = self.clone();
        result -= rhs;
        result
    }
}

impl Mul for &BigDecimal {
    type Output = BigDecimal;

    fn mul(self, rhs: &BigDecimal) -> BigDecimal {
        self.multiply(rhs)
    }
}

impl Div for &BigDecimal {
    type Output = BigDecimal;

    /// Division at [`DEFAULT_DIVISION_PRECISION`] fractional digits.
    ///
    /// # Panics
    ///
    /// Panics when `rhs` is zero. Use
    /// [`BigDecimal::div_with_precision`] for a fallible variant.
    fn div(self, rhs: &BigDecimal) -> BigDecimal {
        self.div_with_precision(rhs, DEFAULT_DIVISION_PRECISION)
            .expect("BigDecimal division by zero")
    }
}

impl Neg for &BigDecimal {
    type Output = BigDecimal;

    fn neg(self) -> BigDecimal {
        let mut result = self.clone();
        if !result.is_zero() {
            result.negative = !result.negative;
        }
        result
    }
}

macro_rules! forward_owned_binop {
    ($trait:ident, $method:ident) => {
        impl $trait for BigDecimal {
            type Output = BigDecimal;

            fn $method(self, rhs: BigDecimal) -> BigDecimal {
                (&self).$method(&rhs)
            }
        }

        impl $trait<&BigDecimal> for BigDecimal {
            type Output = BigDecimal;

            fn $method(self, rhs: &BigDecimal) -> BigDecimal {
                (&self).$method(rhs)
            }
        }

        impl $trait<BigDecimal> for &BigDecimal {
            type Output = BigDecimal;

            fn $method(self, rhs: BigDecimal) -> BigDecimal {
                self.$method(&rhs)
            }
        }
    };
}

forward_owned_binop!(Add, add);
forward_owned_binop!(Sub, sub);
forward_owned_binop!(Mul, mul);
forward_owned_binop!(Div, div);

impl Neg for BigDecimal {
    type Output = BigDecimal;

    fn neg(self) -> BigDecimal {
        -&self
    }
}

impl AddAssign for BigDecimal {
    fn add_assign(&mut self, rhs: BigDecimal) {
        *self += &rhs;
    }
}

impl SubAssign for BigDecimal {
    fn sub_assign(&mut self, rhs: BigDecimal) {
        *self -= &rhs;
    }
}
