use thiserror::Error;


/// Result type used throughout the crate
pub type ChemResult<T> = Result<T, ChemError>;


/// Errors that can occur while parsing a chemical formula
/// Positions are character offsets into the cleaned formula (whitespace and state tag removed)
#[derive(Clone, Debug, Eq, Hash, PartialEq, Error)]
pub enum ParseError {
    /// Nothing left to parse after cleaning
    #[error("Formula is empty")]
    Empty,
    /// Character outside of `[A-Za-z0-9()]`
    #[error("Invalid character '{ch}' at position {position}")]
    InvalidCharacter { ch: char, position: usize },
    /// Allowed character in a position where it can't appear (e.g. leading digit, lowercase letter)
    #[error("Unexpected '{ch}' at position {position}")]
    UnexpectedCharacter { ch: char, position: usize },
    /// `(` without matching `)`
    #[error("Unmatched '(' at position {position}")]
    UnmatchedOpenParenthesis { position: usize },
    /// `)` without matching `(`
    #[error("Unmatched ')' at position {position}")]
    UnmatchedCloseParenthesis { position: usize },
    /// `()` with nothing inside
    #[error("Empty group at position {position}")]
    EmptyGroup { position: usize },
    /// Explicit count or multiplier of zero
    #[error("Count of zero at position {position}")]
    ZeroCount { position: usize },
    /// Atom count doesn't fit into `u32`
    #[error("Atom count is too large")]
    CountOverflow,
}


/// Errors that can occur during balancing of chemical equations
#[derive(Clone, Debug, Eq, Hash, PartialEq, Error)]
pub enum ChemError {
    /// Formula is not grammatically valid
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),
    /// Element symbol is valid, but it isn't in the reference table
    #[error("Unknown element: {0}")]
    UnknownElement(String),
    /// There is no positive integer solution
    #[error("No solution: {0}")]
    NoSolution(String),
    /// Solution was calculated, but atoms are not conserved
    #[error("Invalid equation: {0}")]
    InvalidEquation(String),
    /// Equation is missing parts or coefficients don't match compounds
    #[error("Structural error: {0}")]
    Structural(String),
    /// Balancer configuration is invalid or couldn't be loaded
    #[error("Configuration error: {0}")]
    Config(String),
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_error_converts() {
        let err: ChemError = ParseError::Empty.into();
        assert_eq!(err, ChemError::Parse(ParseError::Empty));
        assert_eq!(err.to_string(), "Parse error: Formula is empty");
    }

    #[test]
    fn messages_include_position() {
        let err = ParseError::InvalidCharacter { ch: '$', position: 2 };
        assert_eq!(err.to_string(), "Invalid character '$' at position 2");
    }
}
