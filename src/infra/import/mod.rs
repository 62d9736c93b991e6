pub mod csv;
pub mod xlsx;

use std::collections::HashSet;

/// Names header cells the way spreadsheet-to-JSON exports do: blanks become
/// `__EMPTY`, `__EMPTY_1`, ... and repeats get `_1`, `_2`, ... suffixes.
pub fn header_names<I, S>(raw: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut used = HashSet::new();
    let mut headers = Vec::new();
    for name in raw {
        let trimmed = name.as_ref().trim();
        let base = if trimmed.is_empty() { "__EMPTY" } else { trimmed };
        let mut candidate = base.to_string();
        let mut suffix = 0;
        while used.contains(&candidate) {
            suffix += 1;
            candidate = format!("{base}_{suffix}");
        }
        used.insert(candidate.clone());
        headers.push(candidate);
    }
    headers
}
