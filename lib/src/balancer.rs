use crate::config::BalancerConfig;
use crate::equation::Equation;
use crate::error::{ChemError, ChemResult};
use crate::matrix::StoichiometricMatrix;
use crate::reduce::IntegerReducer;
use crate::solver::{LinearSolver, Trace};
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};


/// Outcome of balancing an equation
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq)]
pub enum BalanceStatus {
    /// Coefficients were found and atoms are conserved
    Success,
    /// Equation was balanced with its existing coefficients, the solver wasn't run
    AlreadyBalanced,
    /// There is no single positive integer solution
    NoSolution,
    /// Solution was found, but it failed the atom conservation check
    InvalidEquation,
    /// Equation is empty or contains a compound that couldn't be parsed
    ParsingError,
}

impl Display for BalanceStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            BalanceStatus::Success => write!(f, "SUCCESS"),
            BalanceStatus::AlreadyBalanced => write!(f, "ALREADY_BALANCED"),
            BalanceStatus::NoSolution => write!(f, "NO_SOLUTION"),
            BalanceStatus::InvalidEquation => write!(f, "INVALID_EQUATION"),
            BalanceStatus::ParsingError => write!(f, "PARSING_ERROR"),
        }
    }
}


/// Result of balancing an equation
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BalanceResult {
    /// What happened
    pub status: BalanceStatus,
    /// One coefficient per compound, reactants followed by products (empty on failures before solving)
    pub coefficients: Vec<u32>,
    /// Human-readable description of the outcome
    pub message: String,
    /// Reactant atoms minus product atoms of each element with the final coefficients
    pub atom_balance: BTreeMap<String, i64>,
    /// Whether conservation was verified from the final coefficients
    pub conservation_verified: bool,
}

impl BalanceResult {
    fn failure(status: BalanceStatus, message: impl Into<String>) -> Self {
        Self {
            status,
            coefficients: Vec::new(),
            message: message.into(),
            atom_balance: BTreeMap::new(),
            conservation_verified: false,
        }
    }

    /// Whether the equation ended up balanced (`Success` or `AlreadyBalanced`)
    pub fn is_balanced(&self) -> bool {
        matches!(self.status, BalanceStatus::Success | BalanceStatus::AlreadyBalanced)
    }
}


/// Everything recorded while balancing one equation
#[derive(Clone, Debug, PartialEq)]
pub struct BalanceReport {
    /// Final outcome
    pub result: BalanceResult,
    /// Human-readable log of the balancing process
    pub steps: Vec<String>,
    /// Elimination steps of the linear solver
    pub trace: Trace,
}


/// Balances chemical equations
/// A balancer holds only configuration, so one instance can balance many equations, also from several threads
/// # Example
/// ```
/// use chembalance::{BalanceStatus, Balancer, Equation, PeriodicTable};
///
/// let table = PeriodicTable::new();
/// let mut equation = Equation::parse("CH4 + O2 -> CO2 + H2O", &table).unwrap();
///
/// let result = Balancer::new().balance(&mut equation);
///
/// assert_eq!(result.status, BalanceStatus::Success);
/// assert_eq!(result.coefficients, vec![1, 2, 1, 2]);
/// assert_eq!(equation.to_string(), "CH4 + 2O2 → CO2 + 2H2O");
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Balancer {
    config: BalancerConfig,
}

impl Balancer {
    /// Creates a balancer with default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a balancer with the given configuration
    /// # Returns
    /// * `Err` - configuration is invalid
    pub fn with_config(config: BalancerConfig) -> ChemResult<Self> {
        Ok(Self { config: config.validate()? })
    }

    /// Returns the configuration of the balancer
    pub fn config(&self) -> &BalancerConfig {
        &self.config
    }

    /// Balances the equation and writes the coefficients into it on success
    pub fn balance(&self, equation: &mut Equation) -> BalanceResult {
        self.balance_with_report(equation).result
    }

    /// Same as `balance`, but also returns the balancing log and the elimination trace
    /// # Example
    /// ```
    /// use chembalance::{Balancer, Equation, PeriodicTable};
    ///
    /// let table = PeriodicTable::new();
    /// let mut equation = Equation::parse("Fe + O2 -> Fe2O3", &table).unwrap();
    ///
    /// let report = Balancer::new().balance_with_report(&mut equation);
    ///
    /// assert_eq!(report.result.coefficients, vec![4, 3, 2]);
    /// assert_eq!(report.steps.last().unwrap(), "Atom conservation verified");
    /// assert!(!report.trace.is_empty());
    /// ```
    pub fn balance_with_report(&self, equation: &mut Equation) -> BalanceReport {
        let mut run = Run {
            steps: Vec::new(),
            trace: if self.config.record_trace { Trace::new() } else { Trace::disabled() },
            record: self.config.record_trace,
        };
        let result = self.run(equation, &mut run);

        tracing::debug!(status = %result.status, message = %result.message, "balancing finished");

        BalanceReport {
            result,
            steps: run.steps,
            trace: run.trace,
        }
    }

    fn run(&self, equation: &mut Equation, run: &mut Run) -> BalanceResult {
        run.step("Starting equation balancing process");
        run.step(format!("Original equation: {}", equation));

        if equation.total_compounds() == 0 {
            return run.fail(BalanceStatus::ParsingError, "Equation has no compounds");
        }
        if let Some(compound) = equation.compounds().find(|compound| !compound.is_valid()) {
            let reason = compound.error().map(ChemError::to_string).unwrap_or_default();
            return run.fail(BalanceStatus::ParsingError, format!("Invalid compound '{}': {}", compound.formula(), reason));
        }

        // START
        let atom_balance = match equation.atom_balance() {
            Ok(atom_balance) => atom_balance,
            Err(err) => return run.fail(BalanceStatus::ParsingError, format!("Atom totals can't be counted: {}", err)),
        };
        if equation.check_balance() {
            tracing::debug!(%equation, "already balanced");
            run.step("Equation is already balanced");
            return BalanceResult {
                status: BalanceStatus::AlreadyBalanced,
                coefficients: equation.coefficients(),
                message: String::from("Equation is already balanced"),
                atom_balance,
                conservation_verified: true,
            };
        }

        // BUILDING
        let matrix = StoichiometricMatrix::build(equation);
        if matrix.is_empty() {
            return run.fail(BalanceStatus::ParsingError, "Equation has no elements");
        }
        run.step(format!("Building stoichiometric matrix for elements: {}", matrix.elements().join(", ")));
        run.step(format!("Matrix constructed with {} equations and {} unknowns", matrix.row_count(), matrix.column_count()));
        run.step(format!("Stoichiometric matrix:\n{}", matrix));

        let solver = LinearSolver::new(self.config.pivot_epsilon);
        if !solver.has_unique_solution(matrix.rows()) {
            let free_parameters = matrix.column_count().saturating_sub(solver.rank(matrix.rows()));
            let message = if free_parameters == 0 {
                String::from("Only the trivial solution exists")
            } else {
                format!("Equation has {} independent solutions, it can't be balanced uniquely", free_parameters)
            };
            return run.fail(BalanceStatus::NoSolution, message);
        }

        // SOLVED
        run.step("Solving system of linear equations using Gaussian elimination");
        let solution = match solver.solve(matrix.rows(), &mut run.trace) {
            Ok(solution) => solution,
            Err(err) => return run.fail(BalanceStatus::NoSolution, err.to_string()),
        };
        run.step(format!(
            "Raw solution found: {}",
            solution.iter().map(|value| format!("{:.3}", value)).collect::<Vec<String>>().join(", "),
        ));

        let reducer = IntegerReducer::new(self.config.fraction_tolerance, self.config.max_denominator);
        let reduction = match reducer.reduce(&solution) {
            Ok(reduction) => reduction,
            Err(err) => return run.fail(BalanceStatus::NoSolution, err.to_string()),
        };
        if !reduction.exact {
            tracing::warn!(%equation, "coefficients were rounded, result may be imprecise");
            run.step(format!("Some coefficients needed a denominator above {} and were rounded", self.config.max_denominator));
        }
        run.step(format!(
            "Converting to smallest integer coefficients: {}",
            reduction.coefficients.iter().map(u32::to_string).collect::<Vec<String>>().join(", "),
        ));

        // VALIDATED
        if let Err(err) = equation.set_coefficients(&reduction.coefficients) {
            return run.fail(BalanceStatus::InvalidEquation, err.to_string());
        }
        let atom_balance = match equation.atom_balance() {
            Ok(atom_balance) => atom_balance,
            Err(err) => return run.fail(BalanceStatus::InvalidEquation, format!("Atom conservation can't be verified: {}", err)),
        };
        let conservation_verified = atom_balance.values().all(|&difference| difference == 0);

        if conservation_verified {
            run.step(format!("Final balanced equation: {}", equation));
            run.step("Atom conservation verified");
            BalanceResult {
                status: BalanceStatus::Success,
                coefficients: reduction.coefficients,
                message: String::from("Equation balanced successfully"),
                atom_balance,
                conservation_verified,
            }
        } else {
            tracing::warn!(%equation, ?atom_balance, "atom conservation violated");
            run.step("ERROR: Atom conservation failed");
            BalanceResult {
                status: BalanceStatus::InvalidEquation,
                coefficients: reduction.coefficients,
                message: String::from("Balancing failed - atom conservation violated"),
                atom_balance,
                conservation_verified,
            }
        }
    }
}

/// State owned by a single balancing call
struct Run {
    steps: Vec<String>,
    trace: Trace,
    record: bool,
}

impl Run {
    fn step(&mut self, step: impl Into<String>) {
        if self.record {
            self.steps.push(step.into());
        }
    }

    fn fail(&mut self, status: BalanceStatus, message: impl Into<String>) -> BalanceResult {
        let message = message.into();
        self.step(format!("ERROR: {}", message));
        BalanceResult::failure(status, message)
    }
}


/// Balances the equation with default configuration
/// # Example
/// ```
/// use chembalance::{balance, BalanceStatus, Equation, PeriodicTable};
///
/// let table = PeriodicTable::new();
/// let mut equation = Equation::parse("H2 + O2 -> H2O", &table).unwrap();
///
/// let result = balance(&mut equation);
///
/// assert_eq!(result.status, BalanceStatus::Success);
/// assert_eq!(result.coefficients, vec![2, 1, 2]);
/// assert!(result.conservation_verified);
/// ```
pub fn balance(equation: &mut Equation) -> BalanceResult {
    Balancer::new().balance(equation)
}
