//! Headless edit shell: the loaded dataset, the current view, and the open draft.
//!
//! Every commit returns the complete dataset to persist; the session itself never
//! talks to storage except through [`EditSession::save`].

use tracing::warn;

use crate::client::RowCollectionClient;
use crate::domain::entities::dataset::{
    parse_page_size, FilterToggle, PageSpec, ViewPage, ViewState, DEFAULT_EXCLUDED_COLUMNS,
};
use crate::domain::entities::edit::{build_updated_rows, RowId, StagedEdits};
use crate::domain::entities::row::{CellValue, Dataset, Row};
use crate::domain::view::{apply_view, compute_columns};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitKind {
    Edit,
    Add,
    Delete,
    Batch,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Commit {
    pub kind: CommitKind,
    pub rows: Dataset,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveStatus {
    Saved,
    Added,
    Failed,
}

impl SaveStatus {
    pub fn for_outcome(kind: CommitKind, saved: bool) -> Self {
        match (kind, saved) {
            (_, false) => SaveStatus::Failed,
            (CommitKind::Add, true) => SaveStatus::Added,
            (_, true) => SaveStatus::Saved,
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            SaveStatus::Saved => "Record saved successfully!",
            SaveStatus::Added => "New record saved successfully!",
            SaveStatus::Failed => "Save failed. Changes may not persist.",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftTarget {
    Existing(RowId),
    New,
}

/// A row copy being edited in the modal.
#[derive(Debug, Clone, PartialEq)]
pub struct Draft {
    pub target: DraftTarget,
    pub row: Row,
}

pub struct EditSession {
    ids: Vec<RowId>,
    data: Dataset,
    next_id: u64,
    excluded: Vec<String>,
    columns: Vec<String>,
    view: ViewState,
    draft: Option<Draft>,
    staged: StagedEdits,
    status: Option<SaveStatus>,
}

impl Default for EditSession {
    fn default() -> Self {
        Self::new()
    }
}

impl EditSession {
    pub fn new() -> Self {
        Self::with_excluded(
            DEFAULT_EXCLUDED_COLUMNS
                .iter()
                .map(|name| name.to_string())
                .collect(),
        )
    }

    pub fn with_excluded(excluded: Vec<String>) -> Self {
        Self {
            ids: Vec::new(),
            data: Vec::new(),
            next_id: 1,
            excluded,
            columns: Vec::new(),
            view: ViewState::default(),
            draft: None,
            staged: StagedEdits::default(),
            status: None,
        }
    }

    /// Replaces the session rows. Ids are fresh, the page goes back to 1, and any
    /// open draft or staged edits are dropped.
    pub fn load(&mut self, rows: Dataset) {
        self.ids = (0..rows.len()).map(|_| self.allocate_id()).collect();
        self.data = rows;
        self.columns = compute_columns(&self.data, &self.excluded);
        self.view = self.view.clone().with_page(1);
        self.draft = None;
        self.staged = StagedEdits::default();
    }

    fn allocate_id(&mut self) -> RowId {
        let id = RowId(self.next_id);
        self.next_id += 1;
        id
    }

    fn position(&self, id: RowId) -> Option<usize> {
        self.ids.iter().position(|candidate| *candidate == id)
    }

    fn push_row(&mut self, row: Row) -> RowId {
        let id = self.allocate_id();
        self.ids.push(id);
        self.data.push(row);
        id
    }

    fn refresh_columns(&mut self) {
        self.columns = compute_columns(&self.data, &self.excluded);
    }

    pub fn dataset(&self) -> &Dataset {
        &self.data
    }

    pub fn row(&self, id: RowId) -> Option<&Row> {
        self.position(id).map(|position| &self.data[position])
    }

    pub fn row_ids(&self) -> &[RowId] {
        &self.ids
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn set_search(&mut self, text: impl Into<String>) {
        self.view = self.view.clone().with_search(text);
    }

    pub fn set_filter(&mut self, toggle: FilterToggle, enabled: bool) {
        self.view = self.view.clone().with_filter(toggle, enabled);
    }

    /// Takes the raw page-size input; non-positive or unparsable input means 10.
    pub fn set_page_size(&mut self, input: &str) {
        self.view = self.view.clone().with_page_size(parse_page_size(input));
    }

    pub fn toggle_sort(&mut self, column: &str) {
        self.view = self.view.clone().with_sort_toggled(column);
    }

    /// Moves by `delta` pages. Steps outside `1..=page_count` are ignored.
    pub fn change_page(&mut self, delta: i64) -> bool {
        let next = self.view.page.current as i64 + delta;
        if next < 1 || next > self.page_count() as i64 {
            return false;
        }
        self.view = self.view.clone().with_page(next as usize);
        true
    }

    pub fn visible_page(&self) -> ViewPage {
        apply_view(&self.data, &self.columns, &self.view)
    }

    pub fn page_count(&self) -> usize {
        self.visible_page().page_count
    }

    pub fn visible_rows(&self) -> Vec<(RowId, &Row)> {
        self.visible_page()
            .positions
            .into_iter()
            .map(|position| (self.ids[position], &self.data[position]))
            .collect()
    }

    pub fn draft(&self) -> Option<&Draft> {
        self.draft.as_ref()
    }

    pub fn open_edit(&mut self, id: RowId) -> bool {
        let Some(row) = self.row(id).cloned() else {
            return false;
        };
        self.draft = Some(Draft {
            target: DraftTarget::Existing(id),
            row,
        });
        true
    }

    /// Opens the first row whose `column` value equals `value`, ignoring case.
    pub fn open_edit_matching(&mut self, column: &str, value: &str) -> Option<RowId> {
        let needle = value.to_lowercase();
        let position = self.data.iter().position(|row| {
            row.get(column)
                .filter(|cell| !cell.is_null())
                .is_some_and(|cell| cell.display_text().to_lowercase() == needle)
        })?;
        let id = self.ids[position];
        self.open_edit(id);
        Some(id)
    }

    /// Template with every discovered and excluded column set to empty text.
    pub fn open_add(&mut self) {
        let mut template = Row::new();
        for column in self.columns.iter().chain(self.excluded.iter()) {
            if !template.contains_column(column) {
                template.set(column.clone(), CellValue::text(""));
            }
        }
        self.draft = Some(Draft {
            target: DraftTarget::New,
            row: template,
        });
    }

    pub fn close_draft(&mut self) {
        self.draft = None;
    }

    pub fn set_field(&mut self, column: &str, value: impl Into<CellValue>) -> bool {
        match self.draft.as_mut() {
            Some(draft) => {
                draft.row.set(column, value);
                true
            }
            None => false,
        }
    }

    pub fn checkbox_value(&self, column: &str) -> bool {
        let Some(draft) = &self.draft else {
            return false;
        };
        match draft.row.value(column) {
            CellValue::Bool(flag) => *flag,
            CellValue::Null => false,
            cell => cell.display_text().trim().eq_ignore_ascii_case("yes"),
        }
    }

    pub fn set_checkbox(&mut self, column: &str, checked: bool) -> bool {
        self.set_field(column, if checked { "YES" } else { "" })
    }

    /// Discovered columns present in the draft, then the draft's other keys.
    pub fn modal_columns(&self) -> Vec<String> {
        let Some(draft) = &self.draft else {
            return Vec::new();
        };
        let mut ordered: Vec<String> = self
            .columns
            .iter()
            .filter(|column| draft.row.contains_column(column))
            .cloned()
            .collect();
        ordered.extend(
            draft
                .row
                .columns()
                .filter(|key| !self.columns.iter().any(|column| column == key))
                .map(str::to_string),
        );
        ordered
    }

    /// Writes the draft back. An edited row that no longer exists is appended; a new
    /// row is appended and the view jumps to the last page.
    pub fn commit_draft(&mut self) -> Option<Commit> {
        let draft = self.draft.take()?;
        let kind = match draft.target {
            DraftTarget::Existing(id) => {
                match self.position(id) {
                    Some(position) => self.data[position] = draft.row,
                    None => {
                        self.push_row(draft.row);
                    }
                }
                CommitKind::Edit
            }
            DraftTarget::New => {
                self.push_row(draft.row);
                let last_page = PageSpec::new(self.view.page.size, 1).page_count(self.data.len());
                self.view = self.view.clone().with_page(last_page);
                CommitKind::Add
            }
        };
        self.refresh_columns();
        Some(Commit {
            kind,
            rows: self.data.clone(),
        })
    }

    pub fn delete_row(&mut self, id: RowId) -> Option<Commit> {
        let position = self.position(id)?;
        self.ids.remove(position);
        self.data.remove(position);
        self.refresh_columns();
        Some(Commit {
            kind: CommitKind::Delete,
            rows: self.data.clone(),
        })
    }

    pub fn staged(&self) -> &StagedEdits {
        &self.staged
    }

    pub fn stage_cell(&mut self, id: RowId, column: impl Into<String>, value: impl Into<CellValue>) {
        self.staged.stage_cell(id, column, value.into());
    }

    pub fn stage_delete(&mut self, id: RowId) {
        self.staged.deleted_rows.insert(id);
    }

    pub fn stage_add(&mut self, row: Row) {
        self.staged.added_rows.push(row);
    }

    pub fn discard_staged(&mut self) {
        self.staged = StagedEdits::default();
    }

    /// Applies every staged change at once. Surviving rows keep their ids.
    pub fn commit_staged(&mut self) -> Option<Commit> {
        if self.staged.is_empty() {
            return None;
        }
        let staged = std::mem::take(&mut self.staged);
        let rows = build_updated_rows(self.ids.iter().zip(self.data.iter()), &staged);

        let mut ids: Vec<RowId> = self
            .ids
            .iter()
            .copied()
            .filter(|id| !staged.deleted_rows.contains(id))
            .collect();
        for _ in &staged.added_rows {
            let id = self.allocate_id();
            ids.push(id);
        }
        self.ids = ids;
        self.data = rows;
        self.refresh_columns();

        Some(Commit {
            kind: CommitKind::Batch,
            rows: self.data.clone(),
        })
    }

    pub fn record_save(&mut self, kind: CommitKind, saved: bool) -> SaveStatus {
        let status = SaveStatus::for_outcome(kind, saved);
        self.status = Some(status);
        status
    }

    pub fn status(&self) -> Option<SaveStatus> {
        self.status
    }

    pub fn clear_status(&mut self) {
        self.status = None;
    }

    /// Persists a commit. Failure is reported through the status only; the session
    /// keeps its rows either way.
    pub async fn save(&mut self, client: &RowCollectionClient, commit: &Commit) -> SaveStatus {
        let saved = match client.replace_all(&commit.rows).await {
            Ok(()) => true,
            Err(err) => {
                warn!(error = %err, endpoint = client.endpoint(), "failed to persist rows");
                false
            }
        };
        self.record_save(commit.kind, saved)
    }
}

/// True for names of the yes/no toggle columns, compared on lowercase alphanumerics.
pub fn is_filter_column(name: &str) -> bool {
    const FILTER_COLUMN_KEYS: [&str; 11] = [
        "crane",
        "container",
        "fullloads",
        "full loads",
        "generalfreight",
        "vehicle",
        "refrigerated",
        "urgent",
        "sensitive freight",
        "senstive freight",
        "refridgerated",
    ];
    let key = normalize_key(name);
    !key.is_empty() && FILTER_COLUMN_KEYS.iter().any(|known| normalize_key(known) == key)
}

fn normalize_key(value: &str) -> String {
    value
        .to_lowercase()
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .collect()
}
