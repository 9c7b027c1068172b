use crate::error::{ChemError, ChemResult};
use std::fmt::{Display, Formatter};


/// Kind of step recorded during elimination
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq)]
pub enum StepKind {
    /// Matrix before elimination
    Initial,
    /// Two rows were swapped (partial pivoting)
    RowSwap,
    /// Multiple of the pivot row was added to a row below it
    RowAdd,
    /// Column had no usable pivot and was skipped
    SkipColumn,
    /// Matrix is in row echelon form
    ForwardDone,
    /// Homogeneous solution was computed
    BackSubstitution,
}

impl StepKind {
    /// Short machine-readable name of the step
    pub fn as_str(&self) -> &'static str {
        match self {
            StepKind::Initial => "initial",
            StepKind::RowSwap => "row_swap",
            StepKind::RowAdd => "row_add",
            StepKind::SkipColumn => "skip_column",
            StepKind::ForwardDone => "forward_done",
            StepKind::BackSubstitution => "back_substitution",
        }
    }
}

impl Display for StepKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}


/// One recorded elimination step with a snapshot of the matrix after it
#[derive(Clone, Debug, PartialEq)]
pub struct SolverStep {
    /// What kind of operation was done
    pub kind: StepKind,
    /// Human-readable description (rows are numbered from 1)
    pub description: String,
    /// Matrix after the step
    pub matrix: Vec<Vec<f64>>,
}

impl Display for SolverStep {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{}", self.description)?;
        write!(f, "{}", format_matrix(&self.matrix))
    }
}


/// Ordered log of elimination steps
/// The log is only read for explaining a solution, it never affects the result
#[derive(Clone, Debug, PartialEq)]
pub struct Trace {
    steps: Vec<SolverStep>,
    enabled: bool,
}

impl Trace {
    /// Creates an empty trace that records steps
    pub fn new() -> Self {
        Self { steps: Vec::new(), enabled: true }
    }

    /// Creates a trace that ignores everything recorded into it
    pub fn disabled() -> Self {
        Self { steps: Vec::new(), enabled: false }
    }

    /// Appends a step with a snapshot of `matrix`
    pub fn record(&mut self, kind: StepKind, description: impl Into<String>, matrix: &[Vec<f64>]) {
        if !self.enabled { return; }

        let description = description.into();
        tracing::trace!(kind = kind.as_str(), %description);
        self.steps.push(SolverStep {
            kind,
            description,
            matrix: matrix.to_vec(),
        });
    }

    /// Returns recorded steps in order
    pub fn steps(&self) -> &[SolverStep] {
        &self.steps
    }

    /// Number of recorded steps
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Whether no steps were recorded
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

impl Default for Trace {
    fn default() -> Self {
        Self::new()
    }
}


/// Gaussian elimination with partial pivoting over the homogeneous system `M·x = 0`
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct LinearSolver {
    /// Values with smaller magnitude are treated as zero
    epsilon: f64,
}

impl LinearSolver {
    /// Creates a solver with the given near-zero tolerance
    pub fn new(epsilon: f64) -> Self {
        Self { epsilon }
    }

    fn is_zero(&self, value: f64) -> bool {
        value.abs() < self.epsilon
    }

    /// Finds a nonzero vector in the null space of the matrix
    /// The last unknown is fixed to 1, so the system is expected to have exactly one degree of freedom
    /// # Arguments
    /// * `matrix` - rows of the system, all of the same length
    /// * `trace` - every elimination step is appended here
    /// # Returns
    /// * `Ok` - real-valued solution, one value per column
    /// * `Err` - matrix is empty or ragged, or only the trivial solution was found
    /// # Example
    /// ```
    /// use chembalance::{LinearSolver, Trace};
    ///
    /// // H2 + O2 -> H2O
    /// let matrix = vec![
    ///     vec![2.0, 0.0, -2.0],
    ///     vec![0.0, 2.0, -1.0],
    /// ];
    /// let mut trace = Trace::new();
    ///
    /// let solution = LinearSolver::new(1e-10).solve(&matrix, &mut trace).unwrap();
    ///
    /// assert_eq!(solution, vec![1.0, 0.5, 1.0]);
    /// assert!(!trace.is_empty());
    /// ```
    pub fn solve(&self, matrix: &[Vec<f64>], trace: &mut Trace) -> ChemResult<Vec<f64>> {
        let cols = check_dimensions(matrix)?;

        let mut echelon = matrix.to_vec();
        self.eliminate(&mut echelon, trace);
        let solution = self.back_substitute(&echelon, trace);

        if solution.iter().all(|&value| self.is_zero(value)) {
            return Err(ChemError::NoSolution(String::from("only the trivial solution exists")));
        }
        if solution.iter().any(|value| !value.is_finite()) {
            return Err(ChemError::NoSolution(String::from("solution is not finite")));
        }
        debug_assert_eq!(solution.len(), cols);

        Ok(solution)
    }

    /// Brings the matrix into row echelon form in place
    /// For every column the row with the largest magnitude is used as pivot
    /// Columns without a usable pivot are skipped
    pub fn eliminate(&self, matrix: &mut [Vec<f64>], trace: &mut Trace) {
        let rows = matrix.len();
        let cols = matrix.first().map_or(0, Vec::len);

        trace.record(StepKind::Initial, "Initial matrix", matrix);

        let mut pivot_row = 0;
        for col in 0..cols {
            if pivot_row >= rows { break; }

            let mut i_max = pivot_row;
            for (i, row) in matrix.iter().enumerate().skip(pivot_row + 1) {
                if row[col].abs() > matrix[i_max][col].abs() {
                    i_max = i;
                }
            }

            if self.is_zero(matrix[i_max][col]) {
                trace.record(StepKind::SkipColumn, format!("Column {} has no pivot", col + 1), matrix);
                continue;
            }

            swap_rows(pivot_row, i_max, matrix, trace);

            for row in (pivot_row + 1)..rows {
                if self.is_zero(matrix[row][col]) { continue; }

                let factor = -matrix[row][col] / matrix[pivot_row][col];
                add_row(pivot_row, row, col, factor, matrix, trace);
            }

            pivot_row += 1;
        }

        trace.record(StepKind::ForwardDone, "After forward elimination", matrix);
    }

    /// Solves a matrix in row echelon form with the last unknown set to 1
    /// Rows are processed from the bottom, each one determines the unknown of its leading column
    /// Zero rows are skipped, unknowns that no row determines stay 0
    pub fn back_substitute(&self, echelon: &[Vec<f64>], trace: &mut Trace) -> Vec<f64> {
        let cols = echelon.first().map_or(0, Vec::len);
        let mut solution = vec![0.0; cols];
        if cols == 0 { return solution; }

        solution[cols - 1] = 1.0;

        for row in echelon.iter().rev() {
            let Some(pivot) = row.iter().position(|&value| !self.is_zero(value)) else { continue };

            let sum = ((pivot + 1)..cols).map(|col| row[col] * solution[col]).sum::<f64>();
            solution[pivot] = -sum / row[pivot];
        }

        trace.record(StepKind::BackSubstitution, "Back substitution complete", echelon);

        solution
    }

    /// Number of linearly independent rows
    /// # Example
    /// ```
    /// use chembalance::LinearSolver;
    ///
    /// let solver = LinearSolver::new(1e-10);
    ///
    /// assert_eq!(solver.rank(&[vec![1.0, 2.0], vec![2.0, 4.0]]), 1);
    /// assert_eq!(solver.rank(&[vec![1.0, 0.0], vec![0.0, 1.0]]), 2);
    /// ```
    pub fn rank(&self, matrix: &[Vec<f64>]) -> usize {
        let mut echelon = matrix.to_vec();
        self.eliminate(&mut echelon, &mut Trace::disabled());

        echelon.iter().filter(|row| row.iter().any(|&value| !self.is_zero(value))).count()
    }

    /// Whether the null space is exactly one-dimensional (rank = columns - 1)
    pub fn has_unique_solution(&self, matrix: &[Vec<f64>]) -> bool {
        match matrix.first() {
            Some(row) if !row.is_empty() => self.rank(matrix) + 1 == row.len(),
            _ => false,
        }
    }
}

impl Default for LinearSolver {
    fn default() -> Self {
        Self::new(1e-10)
    }
}


/// Checks that the matrix has at least one row and column and that rows are of equal length
/// Returns the number of columns
fn check_dimensions(matrix: &[Vec<f64>]) -> ChemResult<usize> {
    let cols = matrix.first().map_or(0, Vec::len);
    if cols == 0 {
        return Err(ChemError::NoSolution(String::from("matrix is empty")));
    }
    if matrix.iter().any(|row| row.len() != cols) {
        return Err(ChemError::NoSolution(String::from("matrix rows have different lengths")));
    }
    Ok(cols)
}

/// Swaps two rows in a matrix and records it
#[inline(always)]
fn swap_rows(r1: usize, r2: usize, matrix: &mut [Vec<f64>], trace: &mut Trace) {
    if r1 != r2 {
        matrix.swap(r1, r2);
        trace.record(StepKind::RowSwap, format!("Swap rows {} and {}", r1 + 1, r2 + 1), matrix);
    }
}

/// Adds `factor` times row `source` to row `target` and records it
/// The entry in the eliminated column `col` is set to exactly 0
fn add_row(source: usize, target: usize, col: usize, factor: f64, matrix: &mut [Vec<f64>], trace: &mut Trace) {
    let source_row = matrix[source].clone();
    for (value, source_value) in matrix[target].iter_mut().zip(source_row) {
        *value += factor * source_value;
    }
    matrix[target][col] = 0.0;
    trace.record(StepKind::RowAdd, format!("Add {:.3} times row {} to row {}", factor, source + 1, target + 1), matrix);
}

/// Formats matrix rows with 3 decimals, one line per row
pub fn format_matrix(matrix: &[Vec<f64>]) -> String {
    let mut formatted = String::new();
    for row in matrix {
        let line = row.iter().map(|value| format!("{:8.3}", value)).collect::<Vec<String>>().join("  ");
        formatted.push_str(&line);
        formatted.push('\n');
    }
    formatted
}
