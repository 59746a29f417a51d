use std::cmp::Ordering;

use crate::config::VersionOrder;

/// Orders two version strings, ie. `3.9` and `3.10`
///
/// [`VersionOrder::Semantic`] compares dot separated components by their leading
/// digits as a number and then by the remaining tail, so `3.13` < `3.13t` < `3.14`.
/// Components starting with a digit sort before those that don't, a version that is
/// a prefix of another sorts first and ties are broken on the raw strings.
pub fn compare_versions(a: &str, b: &str, order: VersionOrder) -> Ordering {
    match order {
        VersionOrder::Lexical => a.cmp(b),
        VersionOrder::Semantic => a
            .split('.')
            .map(component_key)
            .cmp(b.split('.').map(component_key))
            .then_with(|| a.cmp(b)),
    }
}

/// `(no leading digits, digit count, digits, tail)` with leading zeros stripped,
/// so numbers of any length compare by value
fn component_key(component: &str) -> (bool, usize, &str, &str) {
    let split = component
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(component.len());
    let (digits, tail) = component.split_at(split);
    if digits.is_empty() {
        return (true, 0, "", tail);
    }
    let digits = digits.trim_start_matches('0');
    (false, digits.len(), digits, tail)
}

/// `import_numpy-fast` -> `Import Numpy Fast`
pub fn title_case(name: &str) -> String {
    name.split(['-', '_', ' '])
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn mean(data: &[f64]) -> Option<f64> {
    if data.is_empty() {
        return None;
    }
    Some(data.iter().sum::<f64>() / data.len() as f64)
}

/// Sample standard deviation (n - 1), zero for a single sample
pub fn stddev(data: &[f64]) -> Option<f64> {
    let mean = mean(data)?;
    if data.len() < 2 {
        return Some(0.0);
    }
    let variance =
        data.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (data.len() - 1) as f64;
    Some(variance.sqrt())
}
