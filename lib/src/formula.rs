use crate::error::ParseError;
use std::collections::BTreeMap;


/// Element symbol -> atom count, ordered by symbol
pub type ElementCounts = BTreeMap<String, u32>;

/// Physical-state annotations that may trail a formula
pub const STATE_TAGS: [&str; 4] = ["(aq)", "(s)", "(l)", "(g)"];


/// Removes whitespace and one trailing physical-state tag
/// # Example
/// ```
/// use chembalance::formula::clean;
///
/// assert_eq!(clean(" H2O (l) "), "H2O");
/// assert_eq!(clean("NaCl(aq)"), "NaCl");
/// assert_eq!(clean("Ca(OH)2"), "Ca(OH)2");
/// ```
pub fn clean(text: &str) -> String {
    let cleaned = text.chars().filter(|c| !c.is_whitespace()).collect::<String>();
    for tag in STATE_TAGS {
        if let Some(stripped) = cleaned.strip_suffix(tag) {
            return stripped.to_string();
        }
    }
    cleaned
}

/// Parses a chemical formula into counts of atoms of each element
/// Groups in parentheses may be nested arbitrarily, counts of repeated elements are added up
/// Element symbols are not checked against any reference table here
/// # Arguments
/// * `text` - formula, e.g. `(NH4)2SO4` or `H2O (l)`
/// # Returns
/// * `Ok` - element counts
/// * `Err` - formula is not grammatically valid
/// # Example
/// ```
/// use chembalance::parse;
/// use std::collections::BTreeMap;
///
/// let counts = parse("(NH4)2SO4").unwrap();
///
/// let expected = BTreeMap::from([
///     (String::from("H"), 8),
///     (String::from("N"), 2),
///     (String::from("O"), 4),
///     (String::from("S"), 1),
/// ]);
/// assert_eq!(counts, expected);
/// ```
pub fn parse(text: &str) -> Result<ElementCounts, ParseError> {
    let formula = clean(text);
    if formula.is_empty() { return Err(ParseError::Empty); }

    let chars = formula.chars().collect::<Vec<char>>();
    if let Some((position, &ch)) = chars.iter().enumerate().find(|&(_, &c)| !(c.is_ascii_alphanumeric() || c == '(' || c == ')')) {
        return Err(ParseError::InvalidCharacter { ch, position });
    }

    let mut counts = ElementCounts::new();
    parse_group(&chars, 0, chars.len(), 1, &mut counts)?;

    Ok(counts)
}

/// Parses `chars[start..end]`, adding every count multiplied by `multiplier` into `counts`
fn parse_group(chars: &[char], start: usize, end: usize, multiplier: u32, counts: &mut ElementCounts) -> Result<(), ParseError> {
    let mut i = start;
    while i < end {
        match chars[i] {
            'A'..='Z' => {
                let symbol_start = i;
                i += 1;
                while i < end && chars[i].is_ascii_lowercase() {
                    i += 1;
                }
                let symbol = chars[symbol_start..i].iter().collect::<String>();

                let (count, next) = read_count(chars, i, end)?;
                i = next;

                let atoms = count.checked_mul(multiplier).ok_or(ParseError::CountOverflow)?;
                let entry = counts.entry(symbol).or_insert(0);
                *entry = entry.checked_add(atoms).ok_or(ParseError::CountOverflow)?;
            },
            '(' => {
                let close = matching_parenthesis(chars, i, end)?;
                if close == i + 1 { return Err(ParseError::EmptyGroup { position: i }); }

                let (group_multiplier, next) = read_count(chars, close + 1, end)?;
                let inner_multiplier = multiplier.checked_mul(group_multiplier).ok_or(ParseError::CountOverflow)?;
                parse_group(chars, i + 1, close, inner_multiplier, counts)?;
                i = next;
            },
            ')' => return Err(ParseError::UnmatchedCloseParenthesis { position: i }),
            ch => return Err(ParseError::UnexpectedCharacter { ch, position: i }),
        }
    }

    Ok(())
}

/// Reads the digits starting at `start` (1 if there are none)
/// Returns the count and the index after the last digit
fn read_count(chars: &[char], start: usize, end: usize) -> Result<(u32, usize), ParseError> {
    let mut i = start;
    let mut count: Option<u32> = None;
    while i < end {
        let Some(digit) = chars[i].to_digit(10) else { break };
        let current = count.unwrap_or(0);
        count = Some(
            current
                .checked_mul(10)
                .and_then(|c| c.checked_add(digit))
                .ok_or(ParseError::CountOverflow)?,
        );
        i += 1;
    }

    match count {
        Some(0) => Err(ParseError::ZeroCount { position: start }),
        Some(count) => Ok((count, i)),
        None => Ok((1, i)),
    }
}

/// Finds the `)` closing the `(` at `open`, never looking at or past `end`
fn matching_parenthesis(chars: &[char], open: usize, end: usize) -> Result<usize, ParseError> {
    let mut depth = 0_usize;
    for (i, &c) in chars.iter().enumerate().take(end).skip(open) {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 { return Ok(i); }
            },
            _ => {},
        }
    }

    Err(ParseError::UnmatchedOpenParenthesis { position: open })
}
