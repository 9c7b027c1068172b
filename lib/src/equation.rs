use crate::compound::Compound;
use crate::error::{ChemError, ChemResult, ParseError};
use crate::table::AtomicMass;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::{Display, Formatter};


/// Arrows accepted between reactants and products
pub const ARROWS: [&str; 2] = ["->", "→"];


/// A struct that represents a chemical equation (e.g. 2H2 + O2 -> 2H2O)
/// Every mutation clears the balanced flag until the balance is checked again
/// # Example
/// ```
/// use chembalance::{Equation, PeriodicTable};
///
/// let table = PeriodicTable::new();
/// let mut equation = Equation::parse("2H2 + O2 -> 2H2O", &table).unwrap();
///
/// assert!(!equation.is_balanced());
/// assert!(equation.check_balance());
/// assert_eq!(equation.coefficients(), vec![2, 1, 2]);
/// assert_eq!(equation.to_string(), "2H2 + O2 → 2H2O");
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Equation {
    /// Reactants with their stoichiometric coefficients
    reactants: Vec<(Compound, u32)>,
    /// Products with their stoichiometric coefficients
    products: Vec<(Compound, u32)>,
    /// Result of the last balance check
    balanced: bool,
}

impl Equation {
    /// Creates an empty equation
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses an equation of the form `reactants -> products` (or with `→`)
    /// Each side is a `+`-separated list of compounds with an optional leading coefficient
    /// Formulas that can't be parsed become invalid compounds, they don't fail the parsing
    /// # Arguments
    /// * `input` - equation string
    /// * `table` - reference table used to create compounds
    /// # Returns
    /// * `Ok` - equation
    /// * `Err` - there isn't exactly one arrow, a side is empty or a coefficient is invalid
    /// # Example
    /// ```
    /// use chembalance::{Equation, PeriodicTable};
    ///
    /// let table = PeriodicTable::new();
    /// let equation = Equation::parse("CH4 + 2 O2 (g) → CO2 + H2O", &table).unwrap();
    ///
    /// assert_eq!(equation.reactants().len(), 2);
    /// assert_eq!(equation.reactants()[1].0.formula(), "O2 (g)");
    /// assert_eq!(equation.reactants()[1].1, 2);
    /// assert_eq!(equation.products().len(), 2);
    /// ```
    pub fn parse<T: AtomicMass + ?Sized>(input: &str, table: &T) -> ChemResult<Self> {
        let arrow_count = ARROWS.iter().map(|arrow| input.matches(arrow).count()).sum::<usize>();
        if arrow_count != 1 {
            return Err(ChemError::Structural(format!("expected exactly one arrow, found {}", arrow_count)));
        }
        let Some((reactants_str, products_str)) = ARROWS.iter().find_map(|arrow| input.split_once(arrow)) else {
            return Err(ChemError::Structural(String::from("missing arrow")));
        };

        let mut equation = Self::new();
        for (formula, coefficient) in split_side(reactants_str, "reactant")? {
            equation.add_reactant(Compound::new(formula, table), coefficient)?;
        }
        for (formula, coefficient) in split_side(products_str, "product")? {
            equation.add_product(Compound::new(formula, table), coefficient)?;
        }

        Ok(equation)
    }

    /// Appends a reactant
    /// # Returns
    /// * `Err` - coefficient is zero
    pub fn add_reactant(&mut self, compound: Compound, coefficient: u32) -> ChemResult<()> {
        check_coefficient(coefficient)?;
        self.reactants.push((compound, coefficient));
        self.balanced = false;
        Ok(())
    }

    /// Appends a product
    /// # Returns
    /// * `Err` - coefficient is zero
    pub fn add_product(&mut self, compound: Compound, coefficient: u32) -> ChemResult<()> {
        check_coefficient(coefficient)?;
        self.products.push((compound, coefficient));
        self.balanced = false;
        Ok(())
    }

    /// Overwrites all coefficients (reactants first, then products) and checks the balance
    /// # Returns
    /// * `Ok` - whether the equation is balanced with new coefficients
    /// * `Err` - number of coefficients doesn't match number of compounds, or a coefficient is zero
    /// # Example
    /// ```
    /// use chembalance::{Equation, PeriodicTable};
    ///
    /// let table = PeriodicTable::new();
    /// let mut equation = Equation::parse("H2 + O2 -> H2O", &table).unwrap();
    ///
    /// assert!(equation.set_coefficients(&[2, 1, 2]).unwrap());
    /// assert!(equation.set_coefficients(&[2, 1]).is_err());
    /// ```
    pub fn set_coefficients(&mut self, coefficients: &[u32]) -> ChemResult<bool> {
        if coefficients.len() != self.total_compounds() {
            return Err(ChemError::Structural(format!(
                "expected {} coefficients, got {}",
                self.total_compounds(),
                coefficients.len(),
            )));
        }
        for &coefficient in coefficients {
            check_coefficient(coefficient)?;
        }

        self.balanced = false;
        for ((_, coefficient), &new) in self.reactants.iter_mut().chain(self.products.iter_mut()).zip(coefficients) {
            *coefficient = new;
        }

        Ok(self.check_balance())
    }

    /// Result of the last balance check (false after any mutation)
    pub fn is_balanced(&self) -> bool {
        self.balanced
    }

    /// Recomputes whether atoms are conserved with current coefficients and stores the result
    /// An empty equation, one with invalid compounds or one whose atom totals overflow is never balanced
    pub fn check_balance(&mut self) -> bool {
        self.balanced = self.total_compounds() > 0
            && self.compounds().all(Compound::is_valid)
            && matches!(self.atom_balance(), Ok(balance) if balance.values().all(|&difference| difference == 0));
        self.balanced
    }

    /// Atoms of each element on the reactant side minus atoms on the product side, scaled by coefficients
    /// # Returns
    /// * `Ok` - difference per element
    /// * `Err` - some total doesn't fit into `i64`
    /// # Example
    /// ```
    /// use chembalance::{Equation, PeriodicTable};
    /// use std::collections::BTreeMap;
    ///
    /// let table = PeriodicTable::new();
    /// let equation = Equation::parse("H2 + O2 -> H2O", &table).unwrap();
    ///
    /// let expected = BTreeMap::from([(String::from("H"), 0), (String::from("O"), 1)]);
    /// assert_eq!(equation.atom_balance().unwrap(), expected);
    /// ```
    pub fn atom_balance(&self) -> ChemResult<BTreeMap<String, i64>> {
        let mut balance = BTreeMap::new();
        for (side, sign) in [(&self.reactants, 1), (&self.products, -1)] {
            for (compound, coefficient) in side.iter() {
                for (symbol, count) in compound.elements() {
                    let atoms = i64::from(*count)
                        .checked_mul(i64::from(*coefficient) * sign)
                        .ok_or(ChemError::Parse(ParseError::CountOverflow))?;
                    let entry = balance.entry(symbol.clone()).or_insert(0_i64);
                    *entry = entry.checked_add(atoms).ok_or(ChemError::Parse(ParseError::CountOverflow))?;
                }
            }
        }
        Ok(balance)
    }

    /// Sorted distinct element symbols that appear anywhere in the equation
    pub fn all_elements(&self) -> Vec<String> {
        self.compounds()
            .flat_map(|compound| compound.elements().keys().cloned())
            .collect::<BTreeSet<String>>()
            .into_iter()
            .collect()
    }

    /// Returns reactants with their coefficients
    pub fn reactants(&self) -> &[(Compound, u32)] {
        &self.reactants
    }

    /// Returns products with their coefficients
    pub fn products(&self) -> &[(Compound, u32)] {
        &self.products
    }

    /// Reactants followed by products
    pub fn compounds(&self) -> impl Iterator<Item = &Compound> {
        self.reactants.iter().chain(self.products.iter()).map(|(compound, _)| compound)
    }

    /// Current coefficients, reactants followed by products
    pub fn coefficients(&self) -> Vec<u32> {
        self.reactants.iter().chain(self.products.iter()).map(|(_, coefficient)| *coefficient).collect()
    }

    /// Number of reactants plus number of products
    pub fn total_compounds(&self) -> usize {
        self.reactants.len() + self.products.len()
    }

    /// Removes all compounds
    pub fn clear(&mut self) {
        self.reactants.clear();
        self.products.clear();
        self.balanced = false;
    }

    /// Same as `to_string`, but counts in formulas are written as subscripts
    /// # Example
    /// ```
    /// use chembalance::{Equation, PeriodicTable};
    ///
    /// let table = PeriodicTable::new();
    /// let equation = Equation::parse("2H2 + O2 -> 2H2O", &table).unwrap();
    ///
    /// assert_eq!(equation.to_display_string(), "2H₂ + O₂ → 2H₂O");
    /// ```
    pub fn to_display_string(&self) -> String {
        format!(
            "{} → {}",
            join_side(&self.reactants, Compound::display_formula),
            join_side(&self.products, Compound::display_formula),
        )
    }
}

impl Display for Equation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} → {}",
            join_side(&self.reactants, |compound| compound.formula().to_string()),
            join_side(&self.products, |compound| compound.formula().to_string()),
        )
    }
}

fn check_coefficient(coefficient: u32) -> ChemResult<()> {
    if coefficient == 0 {
        return Err(ChemError::Structural(String::from("coefficients must be positive")));
    }
    Ok(())
}

/// Joins one side of the equation, coefficients of 1 are left out
fn join_side(side: &[(Compound, u32)], formula: impl Fn(&Compound) -> String) -> String {
    side.iter()
        .map(|(compound, coefficient)| {
            if *coefficient == 1 {
                formula(compound)
            } else {
                format!("{}{}", coefficient, formula(compound))
            }
        })
        .collect::<Vec<String>>()
        .join(" + ")
}

/// Splits one side into `(formula, coefficient)` pairs
/// Empty pieces between `+` signs are skipped, but the side must contain at least one compound
fn split_side<'a>(side: &'a str, kind: &str) -> ChemResult<Vec<(&'a str, u32)>> {
    let mut compounds = Vec::new();
    for token in side.split('+').map(str::trim).filter(|token| !token.is_empty()) {
        let digits = token.find(|c: char| !c.is_ascii_digit()).unwrap_or(token.len());
        let (coefficient_str, formula) = token.split_at(digits);
        let formula = formula.trim();

        let coefficient = if coefficient_str.is_empty() {
            1
        } else {
            coefficient_str
                .parse::<u32>()
                .map_err(|_| ChemError::Structural(format!("coefficient of {} '{}' is too large", kind, token)))?
        };
        if coefficient == 0 {
            return Err(ChemError::Structural(format!("coefficient of {} '{}' is zero", kind, token)));
        }
        if formula.is_empty() {
            return Err(ChemError::Structural(format!("{} '{}' has no formula", kind, token)));
        }

        compounds.push((formula, coefficient));
    }

    if compounds.is_empty() {
        return Err(ChemError::Structural(format!("no {}s", kind)));
    }

    Ok(compounds)
}
