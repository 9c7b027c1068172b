use crate::equation::Equation;
use std::fmt::{Display, Formatter};


/// Dense matrix of signed atom counts
/// Rows are elements in sorted order, columns are reactants followed by products
/// Reactant columns are positive, product columns are negative
/// The matrix is derived from an equation and never stored as its state
#[derive(Clone, Debug, PartialEq)]
pub struct StoichiometricMatrix {
    /// Element symbol of each row
    elements: Vec<String>,
    /// Formula of each column
    compounds: Vec<String>,
    /// `rows[element][compound]`
    rows: Vec<Vec<f64>>,
}

impl StoichiometricMatrix {
    /// Builds the matrix of the equation
    /// # Example
    /// ```
    /// use chembalance::{Equation, PeriodicTable, StoichiometricMatrix};
    ///
    /// let table = PeriodicTable::new();
    /// let equation = Equation::parse("H2 + O2 -> H2O", &table).unwrap();
    /// let matrix = StoichiometricMatrix::build(&equation);
    ///
    /// assert_eq!(matrix.elements(), &["H", "O"]);
    /// assert_eq!(matrix.rows(), &[
    ///     vec![2.0, 0.0, -2.0],
    ///     vec![0.0, 2.0, -1.0],
    /// ]);
    /// ```
    pub fn build(equation: &Equation) -> Self {
        let elements = equation.all_elements();
        let compounds = equation.compounds().map(|compound| compound.formula().to_string()).collect::<Vec<String>>();

        let reactant_count = equation.reactants().len();
        let rows = elements
            .iter()
            .map(|symbol| {
                equation
                    .compounds()
                    .enumerate()
                    .map(|(col, compound)| {
                        let count = f64::from(compound.count(symbol));
                        if col < reactant_count || count == 0.0 { count } else { -count }
                    })
                    .collect::<Vec<f64>>()
            })
            .collect::<Vec<Vec<f64>>>();

        tracing::debug!(rows = elements.len(), cols = compounds.len(), "stoichiometric matrix built");

        Self { elements, compounds, rows }
    }

    /// Element symbol of each row
    pub fn elements(&self) -> &[String] {
        &self.elements
    }

    /// Formula of each column
    pub fn compounds(&self) -> &[String] {
        &self.compounds
    }

    /// Matrix entries, one vector per element
    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    /// Number of rows (distinct elements)
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of columns (compounds)
    pub fn column_count(&self) -> usize {
        self.compounds.len()
    }

    /// Whether there are no elements or no compounds
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty() || self.compounds.is_empty()
    }

    /// Splits the matrix into its entries and the element order of the rows
    pub fn into_parts(self) -> (Vec<Vec<f64>>, Vec<String>) {
        (self.rows, self.elements)
    }
}

impl Display for StoichiometricMatrix {
    /// Labelled table with one `element │ counts │ = 0` line per row
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:8}", "")?;
        for compound in self.compounds.iter() {
            write!(f, "{:>8}", compound)?;
        }
        writeln!(f)?;

        for (symbol, row) in self.elements.iter().zip(self.rows.iter()) {
            write!(f, "{:>4} │", symbol)?;
            for value in row {
                write!(f, "{:>7.0} ", value)?;
            }
            writeln!(f, "│ = 0")?;
        }

        Ok(())
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::PeriodicTable;

    fn matrix(input: &str) -> StoichiometricMatrix {
        StoichiometricMatrix::build(&Equation::parse(input, &PeriodicTable::new()).unwrap())
    }

    #[test]
    fn signs_and_order() {
        let matrix = matrix("CH4 + O2 -> CO2 + H2O");

        assert_eq!(matrix.elements(), &["C", "H", "O"]);
        assert_eq!(matrix.compounds(), &["CH4", "O2", "CO2", "H2O"]);
        assert_eq!(matrix.rows(), &[
            vec![1.0, 0.0, -1.0, 0.0],
            vec![4.0, 0.0, 0.0, -2.0],
            vec![0.0, 2.0, -2.0, -1.0],
        ]);
        assert_eq!(matrix.row_count(), 3);
        assert_eq!(matrix.column_count(), 4);
    }

    #[test]
    fn coefficients_are_ignored() {
        assert_eq!(matrix("4Fe + 3O2 -> 2Fe2O3"), matrix("Fe + O2 -> Fe2O3"));
    }

    #[test]
    fn groups_are_expanded() {
        let matrix = matrix("Ca(OH)2 + HCl -> CaCl2 + H2O");
        let (rows, elements) = matrix.into_parts();

        assert_eq!(elements, vec!["Ca", "Cl", "H", "O"]);
        assert_eq!(rows, vec![
            vec![1.0, 0.0, -1.0, 0.0],
            vec![0.0, 1.0, -2.0, 0.0],
            vec![2.0, 1.0, 0.0, -2.0],
            vec![2.0, 0.0, 0.0, -1.0],
        ]);
    }

    #[test]
    fn empty_equation() {
        let matrix = StoichiometricMatrix::build(&Equation::new());
        assert!(matrix.is_empty());
        assert_eq!(matrix.row_count(), 0);
    }

    #[test]
    fn display() {
        let text = matrix("H2 + O2 -> H2O").to_string();
        let lines = text.lines().collect::<Vec<&str>>();

        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("H2O"));
        assert!(lines[1].trim_start().starts_with("H │"));
        assert!(lines[1].ends_with("│ = 0"));
        assert!(lines[2].contains("-1"));
    }
}
