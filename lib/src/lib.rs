//! Balancing of chemical equations
//!
//! Formulas are parsed into element counts, the equation is turned into a stoichiometric matrix
//! and its null space is found with Gaussian elimination.
//! The real-valued solution is then reduced to the smallest positive integer coefficients
//! and atom conservation is checked again with exact integers.
//!
//! # Example
//! ```
//! use chembalance::{balance, BalanceStatus, Equation, PeriodicTable};
//!
//! let table = PeriodicTable::new();
//! let mut equation = Equation::parse("Fe2(SO4)3 + KOH -> K2SO4 + Fe(OH)3", &table).unwrap();
//!
//! let result = balance(&mut equation);
//!
//! assert_eq!(result.status, BalanceStatus::Success);
//! assert_eq!(equation.to_string(), "Fe2(SO4)3 + 6KOH → 3K2SO4 + 2Fe(OH)3");
//! ```

pub mod balancer;
pub mod compound;
pub mod config;
pub mod equation;
pub mod error;
pub mod formula;
pub mod matrix;
pub mod reduce;
pub mod solver;
pub mod table;

pub use balancer::{balance, BalanceReport, BalanceResult, BalanceStatus, Balancer};
pub use compound::Compound;
pub use config::BalancerConfig;
pub use equation::Equation;
pub use error::{ChemError, ChemResult, ParseError};
pub use formula::{parse, ElementCounts};
pub use matrix::StoichiometricMatrix;
pub use reduce::{IntegerReducer, Reduction};
pub use solver::{LinearSolver, SolverStep, StepKind, Trace};
pub use table::{AtomicMass, PeriodicTable};
