//! Filter -> search -> sort -> paginate over a full dataset snapshot.
//!
//! Every run starts from the whole dataset; nothing is carried over from an
//! earlier page. Functions here are pure and never fail.

use std::cmp::Ordering;
use std::collections::HashSet;

use crate::domain::entities::dataset::{FilterToggle, SortDirection, ViewPage, ViewState};
use crate::domain::entities::row::{CellValue, Row};

/// Union of row keys in first-seen order, minus `excluded` (compared lowercase).
pub fn compute_columns<S: AsRef<str>>(dataset: &[Row], excluded: &[S]) -> Vec<String> {
    let excluded: HashSet<String> = excluded
        .iter()
        .map(|name| name.as_ref().to_lowercase())
        .collect();
    let mut seen = HashSet::new();
    let mut columns = Vec::new();
    for row in dataset {
        for column in row.columns() {
            if excluded.contains(&column.to_lowercase()) || seen.contains(column) {
                continue;
            }
            seen.insert(column.to_string());
            columns.push(column.to_string());
        }
    }
    columns
}

pub fn matches_toggle(row: &Row, toggle: FilterToggle) -> bool {
    toggle.columns().iter().any(|column| {
        row.get_ignore_case(column)
            .is_some_and(CellValue::is_yes)
    })
}

/// `needle` must already be trimmed and lowercased.
fn matches_search(row: &Row, columns: &[String], needle: &str) -> bool {
    columns
        .iter()
        .any(|column| row.value(column).display_text().to_lowercase().contains(needle))
}

pub fn apply_view(dataset: &[Row], columns: &[String], state: &ViewState) -> ViewPage {
    let needle = state.search.trim().to_lowercase();

    let mut matched: Vec<usize> = dataset
        .iter()
        .enumerate()
        .filter(|(_, row)| {
            state
                .filters
                .iter()
                .all(|toggle| matches_toggle(row, *toggle))
        })
        .filter(|(_, row)| needle.is_empty() || matches_search(row, columns, &needle))
        .map(|(position, _)| position)
        .collect();

    let match_count = matched.len();

    if let Some((column, direction)) = state.sort.active() {
        merge_sort_by(&mut matched, |a, b| {
            compare_cells(dataset[*a].value(column), dataset[*b].value(column), direction)
        });
    }

    let positions = matched
        .into_iter()
        .skip(state.page.start())
        .take(state.page.size)
        .collect();

    ViewPage {
        positions,
        match_count,
        page_count: state.page.page_count(match_count),
    }
}

/// Bottom-up stable merge sort. Unlike `slice::sort_by` it tolerates a comparator
/// that is not a total order, which `compare_cells` is not on columns mixing numbers
/// and text.
fn merge_sort_by<T, F>(items: &mut Vec<T>, mut compare: F)
where
    T: Copy,
    F: FnMut(&T, &T) -> Ordering,
{
    let len = items.len();
    let mut buffer = Vec::with_capacity(len);
    let mut width = 1;
    while width < len {
        buffer.clear();
        for start in (0..len).step_by(2 * width) {
            let mid = (start + width).min(len);
            let end = (start + 2 * width).min(len);
            let (mut left, mut right) = (start, mid);
            while left < mid && right < end {
                // Right run wins only when strictly less, keeping ties in input order.
                if compare(&items[right], &items[left]) == Ordering::Less {
                    buffer.push(items[right]);
                    right += 1;
                } else {
                    buffer.push(items[left]);
                    left += 1;
                }
            }
            buffer.extend_from_slice(&items[left..mid]);
            buffer.extend_from_slice(&items[right..end]);
        }
        std::mem::swap(items, &mut buffer);
        width *= 2;
    }
}

/// Nulls are lowest before the direction is applied.
pub fn compare_cells(a: &CellValue, b: &CellValue, direction: SortDirection) -> Ordering {
    let ordering = match (a.is_null(), b.is_null()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (false, false) => match (a.as_number(), b.as_number()) {
            (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
            _ => locale_compare(&a.display_text(), &b.display_text()),
        },
    };
    match direction {
        SortDirection::Asc => ordering,
        SortDirection::Desc => ordering.reverse(),
    }
}

/// Letters compare case-insensitively first; on a tie lowercase sorts before uppercase.
pub fn locale_compare(a: &str, b: &str) -> Ordering {
    let folded = a
        .chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase));
    folded.then_with(|| {
        a.chars()
            .zip(b.chars())
            .find(|(x, y)| x != y)
            .map(|(x, y)| case_rank(x).cmp(&case_rank(y)).then(x.cmp(&y)))
            .unwrap_or_else(|| a.len().cmp(&b.len()))
    })
}

fn case_rank(c: char) -> u8 {
    if c.is_lowercase() {
        0
    } else if c.is_uppercase() {
        1
    } else {
        2
    }
}
