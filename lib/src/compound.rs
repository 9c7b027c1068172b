use crate::error::ChemError;
use crate::formula::{self, ElementCounts};
use crate::table::AtomicMass;
use std::cmp::Ordering;
use std::fmt::{Display, Formatter};
use std::hash::{Hash, Hasher};


/// Unicode subscript digits, indexed by digit value
const SUBSCRIPTS: [char; 10] = ['₀', '₁', '₂', '₃', '₄', '₅', '₆', '₇', '₈', '₉'];


/// A struct that represents a chemical compound (e.g. H2O, NaCl, ...)
/// Compounds are created once from a formula and never change afterwards
/// Equality, hashing and ordering only look at the formula string
/// # Example
/// ```
/// use chembalance::{Compound, PeriodicTable};
///
/// let table = PeriodicTable::new();
/// let compound = Compound::new("H2O", &table);
///
/// assert!(compound.is_valid());
/// assert_eq!(compound.formula(), "H2O");
/// assert!((compound.molar_mass() - 18.015).abs() < 0.01);
/// ```
#[derive(Clone, Debug)]
pub struct Compound {
    /// String from which the compound was parsed
    formula: String,
    /// Elements and their quantities (empty for invalid compounds)
    elements: ElementCounts,
    /// Sum of atomic masses (0 for invalid compounds)
    molar_mass: f64,
    /// Why the compound is invalid
    error: Option<ChemError>,
}

impl Compound {
    /// Parses the formula and computes the molar mass using `table`
    /// Parsing failures and unknown elements don't fail here, they produce an invalid compound instead
    /// # Arguments
    /// * `formula` - formula string, e.g. `Ca(OH)2` or `NaCl (aq)`
    /// * `table` - reference table of atomic masses
    /// # Example
    /// ```
    /// use chembalance::{ChemError, Compound, PeriodicTable};
    ///
    /// let table = PeriodicTable::new();
    ///
    /// let compound = Compound::new("H2$O", &table);
    /// assert!(!compound.is_valid());
    /// assert!(compound.elements().is_empty());
    /// assert_eq!(compound.molar_mass(), 0.0);
    ///
    /// let compound = Compound::new("Xx2", &table);
    /// assert_eq!(compound.error(), Some(&ChemError::UnknownElement(String::from("Xx"))));
    /// ```
    pub fn new<T: AtomicMass + ?Sized>(formula: &str, table: &T) -> Self {
        let formula = formula.trim().to_string();

        match Self::resolve(&formula, table) {
            Ok((elements, molar_mass)) => Self {
                formula,
                elements,
                molar_mass,
                error: None,
            },
            Err(error) => {
                tracing::debug!(%formula, %error, "invalid compound");
                Self {
                    formula,
                    elements: ElementCounts::new(),
                    molar_mass: 0.0,
                    error: Some(error),
                }
            },
        }
    }

    fn resolve<T: AtomicMass + ?Sized>(formula: &str, table: &T) -> Result<(ElementCounts, f64), ChemError> {
        let elements = formula::parse(formula)?;

        let mut molar_mass = 0.0;
        for (symbol, count) in elements.iter() {
            let mass = table.atomic_mass(symbol).ok_or_else(|| ChemError::UnknownElement(symbol.clone()))?;
            molar_mass += mass * f64::from(*count);
        }

        Ok((elements, molar_mass))
    }

    /// Returns the formula from which the compound was created
    pub fn formula(&self) -> &str {
        &self.formula
    }

    /// Returns the elements and their quantities in the compound
    /// For example, for H2O this is {H: 2, O: 1}
    pub fn elements(&self) -> &ElementCounts {
        &self.elements
    }

    /// Number of atoms of `symbol` in the compound
    pub fn count(&self, symbol: &str) -> u32 {
        self.elements.get(symbol).copied().unwrap_or(0)
    }

    /// Returns the molar mass in g/mol
    pub fn molar_mass(&self) -> f64 {
        self.molar_mass
    }

    /// Whether the formula was parsed and all elements are known
    pub fn is_valid(&self) -> bool {
        self.error.is_none()
    }

    /// Returns the reason why the compound is invalid
    pub fn error(&self) -> Option<&ChemError> {
        self.error.as_ref()
    }

    /// Formula with counts written as subscripts
    /// # Example
    /// ```
    /// use chembalance::{Compound, PeriodicTable};
    ///
    /// let table = PeriodicTable::new();
    ///
    /// assert_eq!(Compound::new("Fe2(SO4)3", &table).display_formula(), "Fe₂(SO₄)₃");
    /// ```
    pub fn display_formula(&self) -> String {
        let mut display = String::with_capacity(self.formula.len() * 2);
        let mut subscript = false;
        for c in self.formula.chars() {
            match c.to_digit(10) {
                Some(digit) if subscript => display.push(SUBSCRIPTS[digit as usize]),
                _ => {
                    subscript = c.is_ascii_alphabetic() || c == ')';
                    display.push(c);
                },
            }
        }
        display
    }
}

impl Display for Compound {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.formula)
    }
}

impl PartialEq for Compound {
    fn eq(&self, other: &Self) -> bool {
        self.formula == other.formula
    }
}

impl Eq for Compound {}

impl Hash for Compound {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.formula.hash(state);
    }
}

impl PartialOrd for Compound {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Compound {
    fn cmp(&self, other: &Self) -> Ordering {
        self.formula.cmp(&other.formula)
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ParseError;
    use crate::table::PeriodicTable;

    #[test]
    fn valid() {
        let table = PeriodicTable::new();
        let compound = Compound::new("Ca(OH)2", &table);

        assert!(compound.is_valid());
        assert_eq!(compound.count("Ca"), 1);
        assert_eq!(compound.count("O"), 2);
        assert_eq!(compound.count("H"), 2);
        assert_eq!(compound.count("Na"), 0);
        assert!((compound.molar_mass() - 74.09).abs() < 0.01);
    }

    #[test]
    fn molar_mass_from_custom_table() {
        let table = PeriodicTable::from_masses([("H", 1.0), ("O", 16.0)]);
        assert_eq!(Compound::new("H2O", &table).molar_mass(), 18.0);
        assert_eq!(Compound::new("H2O2", &table).molar_mass(), 34.0);
    }

    #[test]
    fn parse_failure_is_inert() {
        let table = PeriodicTable::new();
        let compound = Compound::new("Ca(OH2", &table);

        assert!(!compound.is_valid());
        assert!(compound.elements().is_empty());
        assert_eq!(compound.molar_mass(), 0.0);
        assert_eq!(compound.error(), Some(&ChemError::Parse(ParseError::UnmatchedOpenParenthesis { position: 2 })));
    }

    #[test]
    fn unknown_element_is_inert() {
        let table = PeriodicTable::from_masses([("H", 1.0)]);
        let compound = Compound::new("H2O", &table);

        assert!(!compound.is_valid());
        assert!(compound.elements().is_empty());
        assert_eq!(compound.molar_mass(), 0.0);
        assert_eq!(compound.error(), Some(&ChemError::UnknownElement(String::from("O"))));
    }

    #[test]
    fn identity_is_formula() {
        let table = PeriodicTable::new();
        let valid = PeriodicTable::from_masses([("C", 12.0), ("O", 16.0)]);

        assert_eq!(Compound::new("CO2", &table), Compound::new("CO2", &valid));
        assert_ne!(Compound::new("CO2", &table), Compound::new("O2C", &table));
        assert!(Compound::new("CO", &table) < Compound::new("CO2", &table));
        assert_eq!(Compound::new("  CO2 ", &table).formula(), "CO2");
    }

    #[test]
    fn display() {
        let table = PeriodicTable::new();
        assert_eq!(Compound::new("H2O", &table).to_string(), "H2O");
        assert_eq!(Compound::new("H2O", &table).display_formula(), "H₂O");
        assert_eq!(Compound::new("(NH4)2SO4", &table).display_formula(), "(NH₄)₂SO₄");
        assert_eq!(Compound::new("C57H110O6", &table).display_formula(), "C₅₇H₁₁₀O₆");
    }
}
