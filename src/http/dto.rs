use serde::{Deserialize, Serialize};

use crate::domain::entities::dataset::{
    parse_page_size, parse_sort_direction, FilterToggle, PageSpec, SortDirection, SortSpec,
    ViewState,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusBody {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthBody {
    pub status: String,
    pub time: String,
}

/// Query string of the view endpoint. Everything arrives as text and is parsed in
/// `into_state` so bad values get the same JSON error body as other failures.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ViewQuery {
    pub search: Option<String>,
    /// Comma separated toggle names.
    pub filters: Option<String>,
    pub sort: Option<String>,
    pub dir: Option<String>,
    pub page: Option<String>,
    pub page_size: Option<String>,
}

impl ViewQuery {
    pub fn into_state(self) -> Result<ViewState, String> {
        let mut state = ViewState::default();

        if let Some(search) = self.search {
            state = state.with_search(search);
        }

        for name in self
            .filters
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
        {
            state = state.with_filter(name.parse::<FilterToggle>()?, true);
        }

        let direction = match self.dir.as_deref() {
            Some(dir) => parse_sort_direction(dir)?,
            None => Some(SortDirection::Asc),
        };
        if let Some(column) = self.sort.filter(|column| !column.trim().is_empty()) {
            state = state.with_sort(SortSpec::by(column, direction));
        }

        let size = self
            .page_size
            .as_deref()
            .map(parse_page_size)
            .unwrap_or_default();
        let current = self
            .page
            .as_deref()
            .and_then(|page| page.trim().parse::<usize>().ok())
            .unwrap_or(1);
        state.page = PageSpec::new(size, current);

        Ok(state)
    }
}
