//! Live table state and its controller.
//!
//! [`GridController`] exclusively owns the in-memory state slices
//! (visibility, pinning, selection, filters, sorting, pagination, search)
//! and wires them to the codec: every mutation emits exactly one
//! state-change notification carrying the freshly serialized
//! [`DataQueryState`] for the host to persist. The codec never mutates
//! state; persistence (URL, storage) is the host's business.
//!
//! Free-text search is the one debounced slice: a keystroke replaces the
//! pending value and resets the deadline, and the host's event loop calls
//! [`GridController::poll_search`] to commit. Everything else propagates
//! immediately.

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use crate::codec::{self, DataQueryState};
use crate::columns::{find_column, validate_columns, ColumnDef, ColumnType};
use crate::error::{GridError, Result};
use crate::fetch::{FetchPage, FetchTicket};
use crate::filters::{normalize_model, ColumnFilter, FilterModel, FilterValue};
use crate::operators::{self, Operator};

/// Page size written to the wire only when it differs from this.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Default debounce window for free-text search.
pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(300);

/// Sorting precedence entry; list order is primary, secondary, ...
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortEntry {
    pub id: String,
    pub desc: bool,
}

impl SortEntry {
    pub fn asc(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            desc: false,
        }
    }

    pub fn desc(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            desc: true,
        }
    }
}

/// 0-based page index plus page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page_index: usize,
    pub page_size: usize,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page_index: 0,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Columns pinned to each edge. A column id must not appear on both
/// sides; [`ColumnPinning::sanitized`] enforces it, left side winning.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnPinning {
    pub left: Vec<String>,
    pub right: Vec<String>,
}

impl ColumnPinning {
    pub fn sanitized(mut self) -> Self {
        self.right.retain(|id| {
            let dup = self.left.contains(id);
            if dup {
                log::warn!("column '{id}' pinned to both sides, keeping left");
            }
            !dup
        });
        self
    }
}

/// All live state slices. `Default` is the empty state every slice
/// decodes to when its wire key is absent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableState {
    /// Column id to visible; absent means visible.
    pub visibility: BTreeMap<String, bool>,
    pub pinning: ColumnPinning,
    /// Row id to selected; absent means unselected.
    pub selection: BTreeMap<String, bool>,
    pub filters: Vec<ColumnFilter>,
    pub sorting: Vec<SortEntry>,
    pub pagination: Pagination,
    pub search: String,
}

/// Whether filtering/sorting/pagination happens locally over loaded rows
/// or at the external fetch boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchMode {
    Auto,
    Manual,
}

/// Last-keystroke-wins delay for one string value.
#[derive(Debug)]
pub struct Debouncer {
    window: Duration,
    pending: Option<String>,
    deadline: Option<Instant>,
}

impl Debouncer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            pending: None,
            deadline: None,
        }
    }

    /// Replace the pending value and restart the window.
    pub fn push(&mut self, value: String, now: Instant) {
        self.pending = Some(value);
        self.deadline = Some(now + self.window);
    }

    /// Commit the pending value once the window has elapsed.
    pub fn poll(&mut self, now: Instant) -> Option<String> {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                self.pending.take()
            }
            _ => None,
        }
    }

    pub fn cancel(&mut self) {
        self.pending = None;
        self.deadline = None;
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

type Listener = Box<dyn FnMut(&DataQueryState)>;

/// Owns the live table state and the fetched rows.
///
/// Generic over the row type `T`; the controller never inspects rows, it
/// only stores the latest accepted fetch result.
pub struct GridController<T> {
    columns: Vec<ColumnDef>,
    state: TableState,
    mode: FetchMode,
    default_page_size: usize,
    debounce: Debouncer,
    listener: Option<Listener>,
    next_ticket: u64,
    rows: Vec<T>,
    total: Option<u64>,
    facets: BTreeMap<String, u64>,
}

impl<T> GridController<T> {
    /// Build a controller over the given column set.
    ///
    /// Fails fast on duplicate column ids: a broken configuration should
    /// not make it to render time.
    pub fn new(columns: Vec<ColumnDef>, mode: FetchMode) -> Result<Self> {
        validate_columns(&columns)?;
        Ok(Self {
            columns,
            state: TableState::default(),
            mode,
            default_page_size: DEFAULT_PAGE_SIZE,
            debounce: Debouncer::new(SEARCH_DEBOUNCE),
            listener: None,
            next_ticket: 0,
            rows: Vec::new(),
            total: None,
            facets: BTreeMap::new(),
        })
    }

    pub fn with_default_page_size(mut self, size: usize) -> Self {
        self.default_page_size = size.max(1);
        self.state.pagination.page_size = self.default_page_size;
        self
    }

    pub fn with_debounce(mut self, window: Duration) -> Self {
        self.debounce = Debouncer::new(window);
        self
    }

    /// Install the state-change callback invoked with the current
    /// [`DataQueryState`] after every mutation.
    pub fn with_listener(mut self, listener: Listener) -> Self {
        self.listener = Some(listener);
        self
    }

    pub fn mode(&self) -> FetchMode {
        self.mode
    }

    pub fn columns(&self) -> &[ColumnDef] {
        &self.columns
    }

    pub fn state(&self) -> &TableState {
        &self.state
    }

    pub fn rows(&self) -> &[T] {
        &self.rows
    }

    pub fn total(&self) -> Option<u64> {
        self.total
    }

    pub fn facets(&self) -> &BTreeMap<String, u64> {
        &self.facets
    }

    /// The current state in wire form.
    pub fn query_state(&self) -> DataQueryState {
        codec::encode(&self.state, &self.columns, self.default_page_size)
    }

    // ---- slice setters -------------------------------------------------

    pub fn set_visibility(&mut self, visibility: BTreeMap<String, bool>) {
        self.state.visibility = visibility;
        self.notify();
    }

    pub fn set_column_visible(&mut self, id: impl Into<String>, visible: bool) {
        self.state.visibility.insert(id.into(), visible);
        self.notify();
    }

    pub fn set_pinning(&mut self, pinning: ColumnPinning) {
        self.state.pinning = pinning.sanitized();
        self.notify();
    }

    pub fn set_selection(&mut self, selection: BTreeMap<String, bool>) {
        self.state.selection = selection;
        self.notify();
    }

    pub fn select_row(&mut self, id: impl Into<String>, selected: bool) {
        self.state.selection.insert(id.into(), selected);
        self.notify();
    }

    /// Replace the sorting list. Entry ids are unique; duplicates keep
    /// their first position.
    pub fn set_sorting(&mut self, sorting: Vec<SortEntry>) {
        let mut seen = std::collections::HashSet::new();
        self.state.sorting = sorting
            .into_iter()
            .filter(|entry| seen.insert(entry.id.clone()))
            .collect();
        self.notify();
    }

    pub fn set_pagination(&mut self, pagination: Pagination) {
        self.state.pagination = Pagination {
            page_index: pagination.page_index,
            page_size: pagination.page_size.max(1),
        };
        self.notify();
    }

    // ---- filters -------------------------------------------------------

    /// Replace the whole filter list. Each model is normalized; models
    /// that normalize to empty are dropped.
    pub fn set_filters(&mut self, filters: Vec<ColumnFilter>) {
        self.state.filters = filters
            .into_iter()
            .filter_map(|filter| {
                normalize_model(filter.value).map(|value| ColumnFilter { id: filter.id, value })
            })
            .collect();
        self.back_to_first_page();
        self.notify();
    }

    /// Apply a value edit to one column's filter.
    ///
    /// Runs the operator transition resolver, then normalization. An edit
    /// that empties the value set removes the filter entirely. Changing
    /// the narrowed row set invalidates the page, so pagination returns to
    /// the first page.
    pub fn update_filter_values(&mut self, id: &str, new_values: FilterValue) -> Result<()> {
        let column = find_column(&self.columns, id)
            .ok_or_else(|| GridError::UnknownColumn(id.to_string()))?;
        if new_values.kind() != column.kind {
            return Err(GridError::ValueTypeMismatch {
                column: id.to_string(),
                expected: column.kind.name(),
                got: new_values.kind().name(),
            });
        }
        let kind = column.kind;
        let existing = self.state.filters.iter().find(|f| f.id == id);
        let (old_values, old_op) = match existing {
            Some(filter) => (filter.value.values.clone(), filter.value.operator),
            None => (empty_value(kind), operators::default_operator(kind)),
        };

        let new_op = operators::resolve(kind, &old_values, &new_values, old_op);
        let model = new_op
            .map(|operator| FilterModel::new(operator, new_values))
            .and_then(normalize_model);

        match model {
            Some(model) => self.upsert_filter(id, model),
            None => self.state.filters.retain(|f| f.id != id),
        }
        self.back_to_first_page();
        self.notify();
        Ok(())
    }

    /// Explicit operator change from a menu. Values are preserved,
    /// reshaped only when the new arity no longer fits.
    pub fn change_operator(&mut self, id: &str, operator: Operator) -> Result<()> {
        let position = self
            .state
            .filters
            .iter()
            .position(|f| f.id == id)
            .ok_or_else(|| GridError::UnknownColumn(id.to_string()))?;
        let model = self.state.filters[position].value.clone();
        let applied = operators::apply_operator(model, operator);
        match normalize_model(applied) {
            Some(model) => self.state.filters[position].value = model,
            None => {
                self.state.filters.remove(position);
            }
        }
        self.back_to_first_page();
        self.notify();
        Ok(())
    }

    pub fn remove_filter(&mut self, id: &str) {
        self.state.filters.retain(|f| f.id != id);
        self.back_to_first_page();
        self.notify();
    }

    // ---- search --------------------------------------------------------

    /// Record a search keystroke. Nothing propagates until the debounce
    /// window elapses; a newer keystroke replaces the pending value.
    pub fn set_search(&mut self, value: impl Into<String>, now: Instant) {
        self.debounce.push(value.into(), now);
    }

    /// Commit the pending search value once its window has elapsed.
    /// Returns true when a commit happened (and one notification fired).
    pub fn poll_search(&mut self, now: Instant) -> bool {
        let Some(value) = self.debounce.poll(now) else {
            return false;
        };
        self.state.search = value;
        self.back_to_first_page();
        self.notify();
        true
    }

    // ---- lifecycle -----------------------------------------------------

    /// Restore every slice to its default in one atomic update: exactly
    /// one notification, not one per slice.
    pub fn reset(&mut self) {
        self.debounce.cancel();
        self.state = TableState {
            pagination: Pagination {
                page_index: 0,
                page_size: self.default_page_size,
            },
            ..TableState::default()
        };
        self.notify();
    }

    /// Load state from a persisted wire record.
    ///
    /// Defensive per slice: garbage in one key leaves the others intact.
    /// Hydration does not notify: the record came *from* the persistence
    /// layer, echoing it straight back would be noise.
    pub fn hydrate(&mut self, query: &DataQueryState) {
        self.debounce.cancel();
        self.state = codec::decode(query, &self.columns, self.default_page_size);
    }

    // ---- fetch correlation ---------------------------------------------

    /// Stamp an outgoing fetch. Issuing a new ticket supersedes all older
    /// ones.
    pub fn begin_fetch(&mut self) -> FetchTicket {
        self.next_ticket += 1;
        FetchTicket(self.next_ticket)
    }

    /// Apply a fetch result if its ticket is still the newest. A stale
    /// result is dropped so it can never overwrite state derived from a
    /// newer request.
    pub fn apply_fetch(&mut self, ticket: FetchTicket, page: FetchPage<T>) -> bool {
        if ticket.0 < self.next_ticket {
            log::debug!(
                "ignoring stale fetch result (ticket {} superseded by {})",
                ticket.0,
                self.next_ticket
            );
            return false;
        }
        self.rows = page.rows;
        self.total = page.total;
        self.facets = page.facets;
        true
    }

    /// Hand the controller already-fetched rows directly (auto mode).
    pub fn set_rows(&mut self, rows: Vec<T>) {
        self.total = Some(rows.len() as u64);
        self.rows = rows;
    }

    // ---- internals -----------------------------------------------------

    fn upsert_filter(&mut self, id: &str, model: FilterModel) {
        match self.state.filters.iter_mut().find(|f| f.id == id) {
            Some(filter) => filter.value = model,
            None => self.state.filters.push(ColumnFilter::new(id, model)),
        }
    }

    fn back_to_first_page(&mut self) {
        self.state.pagination.page_index = 0;
    }

    fn notify(&mut self) {
        let snapshot = codec::encode(&self.state, &self.columns, self.default_page_size);
        if let Some(listener) = self.listener.as_mut() {
            listener(&snapshot);
        }
    }
}

fn empty_value(kind: ColumnType) -> FilterValue {
    match kind {
        ColumnType::Text => FilterValue::Text(Vec::new()),
        ColumnType::Number => FilterValue::Number(Vec::new()),
        ColumnType::Date => FilterValue::Date(Vec::new()),
        ColumnType::Option => FilterValue::Option(Vec::new()),
        ColumnType::MultiOption => FilterValue::MultiOption(Vec::new()),
    }
}
