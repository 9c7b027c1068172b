use chembalance::reduce::gcd_all;
use chembalance::{parse, BalanceStatus, Balancer, Equation, IntegerReducer, PeriodicTable};
use proptest::prelude::*;


/// Equations with their smallest balanced coefficients
const BALANCED: [(&str, [u32; 4]); 6] = [
    ("CH4 + O2 -> CO2 + H2O", [1, 2, 1, 2]),
    ("C2H6 + O2 -> CO2 + H2O", [2, 7, 4, 6]),
    ("C7H6O2 + O2 -> CO2 + H2O", [2, 15, 14, 6]),
    ("Fe2(SO4)3 + KOH -> K2SO4 + Fe(OH)3", [1, 6, 3, 2]),
    ("SiCl4 + H2O -> H4SiO4 + HCl", [1, 4, 1, 4]),
    ("Ca3(PO4)2 + SiO2 -> P4O10 + CaSiO3", [2, 6, 1, 6]),
];

fn element() -> impl Strategy<Value = &'static str> {
    prop::sample::select(vec!["H", "C", "N", "O", "Na", "Cl", "Fe", "Ca"])
}

fn formula_part() -> impl Strategy<Value = (&'static str, u32)> {
    (element(), 1..20_u32)
}


proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]

    #[test]
    fn scaled_solution_is_already_balanced(index in 0..BALANCED.len(), factor in 1..50_u32) {
        let (input, coefficients) = BALANCED[index];
        let scaled = coefficients.iter().map(|c| c * factor).collect::<Vec<u32>>();

        let mut equation = Equation::parse(input, &PeriodicTable::new()).unwrap();
        equation.set_coefficients(&scaled).unwrap();
        let result = Balancer::new().balance(&mut equation);

        prop_assert_eq!(result.status, BalanceStatus::AlreadyBalanced);
        prop_assert_eq!(result.coefficients, scaled);
    }

    #[test]
    fn wrong_coefficients_are_replaced(index in 0..BALANCED.len(), wrong in prop::array::uniform4(1..10_u32)) {
        let (input, coefficients) = BALANCED[index];
        prop_assume!(gcd_all(&wrong) == 1 && wrong != coefficients);

        let mut equation = Equation::parse(input, &PeriodicTable::new()).unwrap();
        equation.set_coefficients(&wrong).unwrap();
        let result = Balancer::new().balance(&mut equation);

        prop_assert_eq!(result.status, BalanceStatus::Success);
        prop_assert_eq!(result.coefficients, coefficients.to_vec());
        prop_assert!(result.conservation_verified);
    }

    #[test]
    fn reducer_recovers_integer_ratios(values in prop::collection::vec(1..60_u32, 1..8)) {
        let gcd = gcd_all(&values);
        let expected = values.iter().map(|v| v / gcd).collect::<Vec<u32>>();
        let last = f64::from(*values.last().unwrap());
        let ratios = values.iter().map(|&v| f64::from(v) / last).collect::<Vec<f64>>();

        let reduction = IntegerReducer::default().reduce(&ratios).unwrap();

        prop_assert!(reduction.exact);
        prop_assert_eq!(reduction.coefficients, expected);
    }

    #[test]
    fn group_multiplies_counts(parts in prop::collection::vec(formula_part(), 1..5), multiplier in 2..10_u32) {
        let inner = parts.iter().map(|(symbol, count)| format!("{}{}", symbol, count)).collect::<String>();
        let plain = parse(&inner).unwrap();
        let grouped = parse(&format!("({}){}", inner, multiplier)).unwrap();

        prop_assert_eq!(plain.keys().collect::<Vec<_>>(), grouped.keys().collect::<Vec<_>>());
        for (symbol, count) in plain.iter() {
            prop_assert_eq!(grouped[symbol], count * multiplier);
        }
    }
}
