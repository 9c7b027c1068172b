use mendeleev::ALL_ELEMENTS;
use std::collections::HashMap;


/// Lookup of atomic masses by element symbol
/// Implementors are read-only after construction, so they can be shared between threads
pub trait AtomicMass: Send + Sync {
    /// Atomic mass (g/mol) of the element, `None` if the symbol is unknown
    fn atomic_mass(&self, symbol: &str) -> Option<f64>;

    /// Whether the symbol is known
    fn contains(&self, symbol: &str) -> bool {
        self.atomic_mass(symbol).is_some()
    }
}


/// Reference table of element masses
/// # Example
/// ```
/// use chembalance::{AtomicMass, PeriodicTable};
///
/// let table = PeriodicTable::new();
///
/// assert!((table.atomic_mass("O").unwrap() - 15.999).abs() < 0.01);
/// assert!(table.atomic_mass("Xx").is_none());
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct PeriodicTable {
    masses: HashMap<String, f64>,
}

impl PeriodicTable {
    /// Builds the table of all elements with their conventional atomic weights
    pub fn new() -> Self {
        let masses = ALL_ELEMENTS
            .iter()
            .map(|element| (element.symbol().to_string(), f64::from(element.atomic_weight())))
            .collect::<HashMap<String, f64>>();
        tracing::debug!(elements = masses.len(), "periodic table initialized");

        Self { masses }
    }

    /// Builds a table from explicit `(symbol, mass)` pairs
    /// # Example
    /// ```
    /// use chembalance::{AtomicMass, PeriodicTable};
    ///
    /// let table = PeriodicTable::from_masses([("H", 1.0), ("O", 16.0)]);
    ///
    /// assert_eq!(table.atomic_mass("H"), Some(1.0));
    /// assert!(!table.contains("C"));
    /// ```
    pub fn from_masses<S: Into<String>>(masses: impl IntoIterator<Item = (S, f64)>) -> Self {
        Self {
            masses: masses.into_iter().map(|(symbol, mass)| (symbol.into(), mass)).collect(),
        }
    }

    /// Number of elements in the table
    pub fn len(&self) -> usize {
        self.masses.len()
    }

    /// Whether the table has no elements
    pub fn is_empty(&self) -> bool {
        self.masses.is_empty()
    }
}

impl Default for PeriodicTable {
    fn default() -> Self {
        Self::new()
    }
}

impl AtomicMass for PeriodicTable {
    fn atomic_mass(&self, symbol: &str) -> Option<f64> {
        self.masses.get(symbol).copied()
    }
}
