use crate::error::{ChemError, ChemResult};
use malachite::num::arithmetic::traits::{Gcd, Lcm};
use malachite::num::basic::traits::{One, Zero};
use malachite::{Natural, Rational};


/// Smallest positive integer coefficients found by the reducer
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Reduction {
    /// Integer coefficients in the same order as the input values
    pub coefficients: Vec<u32>,
    /// False if some value had no fraction within the denominator bound and was rounded
    pub exact: bool,
}


/// Converts a real-valued null-space vector into the smallest positive integer vector
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct IntegerReducer {
    /// How close `value * denominator` must be to an integer
    tolerance: f64,
    /// Largest denominator tried, also used for rounding when no fraction is found
    max_denominator: u32,
}

impl IntegerReducer {
    /// Creates a reducer with the given fraction tolerance and denominator bound
    pub fn new(tolerance: f64, max_denominator: u32) -> Self {
        Self { tolerance, max_denominator: max_denominator.max(1) }
    }

    /// Reduces the values to the smallest integer ratio
    /// # Arguments
    /// * `values` - real-valued solution, e.g. from `LinearSolver::solve`
    /// # Returns
    /// * `Ok` - all coefficients are positive
    /// * `Err` - a value is not finite, or some coefficient ends up zero or negative
    /// # Example
    /// ```
    /// use chembalance::IntegerReducer;
    ///
    /// let reducer = IntegerReducer::new(1e-6, 1000);
    ///
    /// let reduction = reducer.reduce(&[1.0, 0.5, 1.0]).unwrap();
    /// assert_eq!(reduction.coefficients, vec![2, 1, 2]);
    /// assert!(reduction.exact);
    ///
    /// let reduction = reducer.reduce(&[-2.0, -1.5, -1.0]).unwrap();
    /// assert_eq!(reduction.coefficients, vec![4, 3, 2]);
    /// ```
    pub fn reduce(&self, values: &[f64]) -> ChemResult<Reduction> {
        if values.is_empty() {
            return Err(ChemError::NoSolution(String::from("no coefficients to reduce")));
        }

        // approximate every value as a fraction
        let mut exact = true;
        let mut fractions = Vec::with_capacity(values.len());
        for &value in values {
            if !value.is_finite() {
                return Err(ChemError::NoSolution(format!("coefficient {} is not finite", value)));
            }
            let (numerator, denominator) = match self.approximate(value) {
                Some(fraction) => fraction,
                None => {
                    tracing::warn!(value, denominator = self.max_denominator, "no exact fraction found, rounding");
                    exact = false;
                    ((value * f64::from(self.max_denominator)).round(), self.max_denominator)
                },
            };
            fractions.push(Rational::from(float_to_integer(numerator)?) / Rational::from(denominator));
        }

        // multiply by the least common multiple of denominators to get integers
        let mut lcm = Natural::ONE;
        for fraction in fractions.iter() {
            lcm = lcm.lcm(fraction.denominator_ref());
        }
        let lcm = Rational::from(&lcm);
        let integers = fractions.iter().map(|fraction| fraction * &lcm).collect::<Vec<Rational>>();

        // divide by the greatest common divisor to get the smallest integers
        let mut gcd = Natural::ZERO;
        for integer in integers.iter() {
            gcd = gcd.gcd(integer.numerator_ref());
        }
        if gcd == Natural::ZERO {
            return Err(ChemError::NoSolution(String::from("all coefficients are zero")));
        }
        let gcd = Rational::from(&gcd);
        let mut integers = integers.iter().map(|integer| integer / &gcd).collect::<Vec<Rational>>();

        // null space is only defined up to a scalar, flip the sign if nothing is positive
        if integers.iter().all(|integer| *integer <= Rational::ZERO) {
            integers = integers.into_iter().map(|integer| -integer).collect();
        }

        let mut coefficients = Vec::with_capacity(integers.len());
        for integer in integers.iter() {
            if *integer <= Rational::ZERO {
                return Err(ChemError::NoSolution(format!("coefficient {} is not positive", integer)));
            }
            let coefficient = u32::try_from(integer)
                .map_err(|_| ChemError::NoSolution(format!("coefficient {} is too large", integer)))?;
            coefficients.push(coefficient);
        }

        Ok(Reduction { coefficients, exact })
    }

    /// Finds the smallest denominator `d` such that `value * d` is an integer within tolerance
    /// Returns the rounded numerator and the denominator
    fn approximate(&self, value: f64) -> Option<(f64, u32)> {
        (1..=self.max_denominator).find_map(|denominator| {
            let numerator = value * f64::from(denominator);
            let rounded = numerator.round();
            ((numerator - rounded).abs() < self.tolerance).then_some((rounded, denominator))
        })
    }
}

impl Default for IntegerReducer {
    fn default() -> Self {
        Self::new(1e-6, 1000)
    }
}

/// Converts an already rounded float into an exact integer
fn float_to_integer(value: f64) -> ChemResult<i64> {
    if value.abs() >= i64::MAX as f64 {
        return Err(ChemError::NoSolution(format!("coefficient {} is too large", value)));
    }
    Ok(value as i64)
}

/// Greatest common divisor of all coefficients
/// # Example
/// ```
/// use chembalance::reduce::gcd_all;
///
/// assert_eq!(gcd_all(&[4, 6, 8]), 2);
/// assert_eq!(gcd_all(&[2, 1, 2]), 1);
/// ```
pub fn gcd_all(values: &[u32]) -> u32 {
    values.iter().fold(0, |acc, &value| {
        let (mut a, mut b) = (acc, value);
        while b != 0 {
            (a, b) = (b, a % b);
        }
        a
    })
}
