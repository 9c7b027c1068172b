use chembalance::{Balancer, Equation, PeriodicTable};
use std::sync::OnceLock;
use wasm_bindgen::prelude::*;


static TABLE: OnceLock<PeriodicTable> = OnceLock::new();


// Export a `balance_equation` function from Rust to JavaScript.
#[wasm_bindgen]
/// Balance input equation and return output
/// First char is 1 if the equation was balanced, 0 otherwise
pub fn balance_equation(equation: &str) -> String {
    equation_io(equation, |equation| equation.to_string())
}

#[wasm_bindgen]
/// Same as `balance_equation`, but counts in formulas are written as subscripts
pub fn balance_equation_display(equation: &str) -> String {
    equation_io(equation, Equation::to_display_string)
}

/// Parses and balances the equation, a balanced one is written with `render`
fn equation_io(input: &str, render: impl Fn(&Equation) -> String) -> String {
    let table = TABLE.get_or_init(PeriodicTable::new);

    let mut equation = match Equation::parse(input, table) {
        Ok(equation) => equation,
        Err(err) => return format!("0{}", err),
    };

    // first char is 1 if success, 0 if error
    let result = Balancer::new().balance(&mut equation);
    if result.is_balanced() {
        format!("1{}", render(&equation))
    } else {
        format!("0{}", result.message)
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn balanced() {
        assert_eq!(balance_equation("H2 + O2 -> H2O"), "12H2 + O2 → 2H2O");
        assert_eq!(balance_equation("4Fe + 3O2 -> 2Fe2O3"), "14Fe + 3O2 → 2Fe2O3");
        assert_eq!(balance_equation_display("Fe + O2 -> Fe2O3"), "14Fe + 3O₂ → 2Fe₂O₃");
    }

    #[test]
    fn errors() {
        assert!(balance_equation("H2 + O2 = H2O").starts_with("0Structural error"));
        assert!(balance_equation("H2 -> O2").starts_with('0'));
        assert!(balance_equation("H2$O -> H2O").starts_with("0Invalid compound"));
        assert_eq!(balance_equation_display("H2 -> O2"), "0Only the trivial solution exists");
        assert_eq!(balance_equation_display("2H2 + O2 -> 2H2O"), "12H₂ + O₂ → 2H₂O");
    }
}
