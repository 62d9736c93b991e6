use std::collections::BTreeSet;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Columns rendered as filter toggles instead of general columns.
pub const DEFAULT_EXCLUDED_COLUMNS: [&str; 9] = [
    "Crane",
    "CONTAINER",
    "FULL LOADS",
    "General freight",
    "Vehicle",
    "Refridgerated",
    "URGENT",
    "Senstive Freight",
    "CARRIER",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FilterToggle {
    Crane,
    Container,
    FullLoads,
    GeneralFreight,
    Vehicle,
    Refrigerated,
    Urgent,
    Sensitive,
}

impl FilterToggle {
    pub const ALL: [FilterToggle; 8] = [
        FilterToggle::Crane,
        FilterToggle::Container,
        FilterToggle::FullLoads,
        FilterToggle::GeneralFreight,
        FilterToggle::Vehicle,
        FilterToggle::Refrigerated,
        FilterToggle::Urgent,
        FilterToggle::Sensitive,
    ];

    pub fn name(self) -> &'static str {
        match self {
            FilterToggle::Crane => "crane",
            FilterToggle::Container => "container",
            FilterToggle::FullLoads => "full-loads",
            FilterToggle::GeneralFreight => "general-freight",
            FilterToggle::Vehicle => "vehicle",
            FilterToggle::Refrigerated => "refrigerated",
            FilterToggle::Urgent => "urgent",
            FilterToggle::Sensitive => "sensitive",
        }
    }

    /// Column spellings checked for this toggle; any one reading "yes" satisfies it.
    pub fn columns(self) -> &'static [&'static str] {
        match self {
            FilterToggle::Crane => &["CRANE"],
            FilterToggle::Container => &["CONTAINER"],
            FilterToggle::FullLoads => &["FULL LOADS"],
            FilterToggle::GeneralFreight => &["General freight"],
            FilterToggle::Vehicle => &["Vehicle"],
            FilterToggle::Refrigerated => &["Refridgerated"],
            FilterToggle::Urgent => &["URGENT"],
            FilterToggle::Sensitive => &["Senstive Freight", "Sensitive Freight"],
        }
    }
}

impl FromStr for FilterToggle {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized: String = value
            .trim()
            .to_lowercase()
            .chars()
            .filter(char::is_ascii_alphanumeric)
            .collect();
        FilterToggle::ALL
            .into_iter()
            .find(|toggle| toggle.name().replace('-', "") == normalized)
            .ok_or_else(|| format!("unknown filter toggle: {value}"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

/// Parses `asc`, `desc` or `none`; `none` (and empty) means unsorted.
pub fn parse_sort_direction(value: &str) -> Result<Option<SortDirection>, String> {
    match value.trim().to_lowercase().as_str() {
        "asc" | "ascending" => Ok(Some(SortDirection::Asc)),
        "desc" | "descending" => Ok(Some(SortDirection::Desc)),
        "" | "none" => Ok(None),
        other => Err(format!("unknown sort direction: {other}")),
    }
}

/// The column stays selected when its direction cycles back to none.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    pub column: Option<String>,
    pub direction: Option<SortDirection>,
}

impl SortSpec {
    pub fn by(column: impl Into<String>, direction: Option<SortDirection>) -> Self {
        Self {
            column: Some(column.into()),
            direction,
        }
    }

    pub fn active(&self) -> Option<(&str, SortDirection)> {
        match (&self.column, self.direction) {
            (Some(column), Some(direction)) => Some((column.as_str(), direction)),
            _ => None,
        }
    }

    /// Same column: asc -> desc -> none -> asc. Another column: asc.
    pub fn toggled(self, column: &str) -> Self {
        if self.column.as_deref() == Some(column) {
            let direction = match self.direction {
                Some(SortDirection::Asc) => Some(SortDirection::Desc),
                Some(SortDirection::Desc) => None,
                None => Some(SortDirection::Asc),
            };
            Self {
                column: self.column,
                direction,
            }
        } else {
            Self::by(column, Some(SortDirection::Asc))
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageSpec {
    pub size: usize,
    /// 1-based.
    pub current: usize,
}

impl Default for PageSpec {
    fn default() -> Self {
        Self {
            size: DEFAULT_PAGE_SIZE,
            current: 1,
        }
    }
}

impl PageSpec {
    pub fn new(size: usize, current: usize) -> Self {
        Self {
            size: if size == 0 { DEFAULT_PAGE_SIZE } else { size },
            current: current.max(1),
        }
    }

    pub fn page_count(&self, match_count: usize) -> usize {
        match_count.div_ceil(self.size.max(1)).max(1)
    }

    pub fn start(&self) -> usize {
        self.current.saturating_sub(1).saturating_mul(self.size)
    }

    pub fn clamped(self, match_count: usize) -> Self {
        Self {
            current: self.current.clamp(1, self.page_count(match_count)),
            ..self
        }
    }
}

/// Page size typed by a user; anything that is not a positive integer falls back to the default.
pub fn parse_page_size(input: &str) -> usize {
    input
        .trim()
        .parse::<usize>()
        .ok()
        .filter(|size| *size > 0)
        .unwrap_or(DEFAULT_PAGE_SIZE)
}

/// Everything the view pipeline reads besides the rows themselves.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewState {
    pub filters: BTreeSet<FilterToggle>,
    pub search: String,
    pub sort: SortSpec,
    pub page: PageSpec,
}

impl ViewState {
    pub fn with_search(self, search: impl Into<String>) -> Self {
        Self {
            search: search.into(),
            page: PageSpec::new(self.page.size, 1),
            ..self
        }
    }

    pub fn with_filter(mut self, toggle: FilterToggle, enabled: bool) -> Self {
        if enabled {
            self.filters.insert(toggle);
        } else {
            self.filters.remove(&toggle);
        }
        self.page = PageSpec::new(self.page.size, 1);
        self
    }

    pub fn with_sort_toggled(self, column: &str) -> Self {
        Self {
            sort: self.sort.toggled(column),
            ..self
        }
    }

    pub fn with_sort(self, sort: SortSpec) -> Self {
        Self { sort, ..self }
    }

    pub fn with_page_size(self, size: usize) -> Self {
        Self {
            page: PageSpec::new(size, 1),
            ..self
        }
    }

    pub fn with_page(self, current: usize) -> Self {
        Self {
            page: PageSpec::new(self.page.size, current),
            ..self
        }
    }
}

/// Output of one pipeline run. `positions` index into the dataset that was viewed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewPage {
    pub positions: Vec<usize>,
    pub match_count: usize,
    pub page_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sort_toggle_cycles_through_none() {
        let sort = SortSpec::default().toggled("n");
        assert_eq!(sort.active(), Some(("n", SortDirection::Asc)));
        let sort = sort.toggled("n");
        assert_eq!(sort.active(), Some(("n", SortDirection::Desc)));
        let sort = sort.toggled("n");
        assert_eq!(sort.active(), None);
        assert_eq!(sort.column.as_deref(), Some("n"));
        let sort = sort.toggled("n");
        assert_eq!(sort.active(), Some(("n", SortDirection::Asc)));
    }

    #[test]
    fn sort_toggle_on_other_column_restarts_ascending() {
        let sort = SortSpec::by("a", Some(SortDirection::Desc)).toggled("b");
        assert_eq!(sort.active(), Some(("b", SortDirection::Asc)));
    }

    #[test]
    fn page_count_has_floor_of_one() {
        let page = PageSpec::default();
        assert_eq!(page.page_count(0), 1);
        assert_eq!(page.page_count(10), 1);
        assert_eq!(page.page_count(25), 3);
        assert_eq!(PageSpec::new(10, 9).clamped(25).current, 3);
    }

    #[test]
    fn page_size_input_falls_back_to_default() {
        assert_eq!(parse_page_size("25"), 25);
        assert_eq!(parse_page_size("0"), DEFAULT_PAGE_SIZE);
        assert_eq!(parse_page_size("abc"), DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn filter_toggle_parses_loose_names() {
        assert_eq!("Full Loads".parse(), Ok(FilterToggle::FullLoads));
        assert_eq!("general_freight".parse(), Ok(FilterToggle::GeneralFreight));
        assert_eq!("URGENT".parse(), Ok(FilterToggle::Urgent));
        assert!("teleport".parse::<FilterToggle>().is_err());
    }

    #[test]
    fn search_and_filter_changes_reset_page() {
        let state = ViewState::default().with_page(4).with_search("perth");
        assert_eq!(state.page.current, 1);
        let state = state.with_page(3).with_filter(FilterToggle::Crane, true);
        assert_eq!(state.page.current, 1);
        assert!(state.filters.contains(&FilterToggle::Crane));
    }
}
