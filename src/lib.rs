//! # Gridstate Architecture
//!
//! Gridstate is a **UI-agnostic table query-state library**: typed filter
//! models, the operator algebra over them, a compact URL-safe wire
//! encoding, and a controller that owns the live state. It renders
//! nothing; tables, dialogs, and routing are the host's business and are
//! reached only through the typed seams below.
//!
//! ## The Layers
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  Host UI (table/grid component, URL bar, storage)            │
//! │  - Renders rows, persists the wire record, drives the loop   │
//! └──────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌──────────────────────────────────────────────────────────────┐
//! │  Controller (state.rs)                                       │
//! │  - Owns every live slice, one notification per mutation      │
//! │  - Debounces search, correlates fetches by ticket            │
//! └──────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌──────────────────────────────────────────────────────────────┐
//! │  Codec (codec/)                                              │
//! │  - One parse/serialize pair per slice                        │
//! │  - Total on parse, partial on serialize                      │
//! └──────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌──────────────────────────────────────────────────────────────┐
//! │  Model (columns.rs, filters/, operators/)                    │
//! │  - Tagged value union, static operator registry,             │
//! │    value-driven operator transitions, normalization          │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Key Principles
//!
//! - **Decode never fails.** A malformed wire string degrades that slice
//!   to its default, entry by entry where possible, and the other slices
//!   are untouched. Bad user input is not an error.
//! - **Configuration fails fast.** A column claiming to be option-typed
//!   with nowhere to get options from is a developer mistake and is
//!   raised immediately, because guessing would misrepresent data.
//! - **One notification per mutation.** `reset()` restores every slice in
//!   a single update; hosts re-render and re-fetch once, not seven times.
//! - **Stale results fall on the floor.** Fetches are correlated by
//!   monotonically increasing tickets; a superseded response can never
//!   overwrite newer state.

pub mod codec;
pub mod columns;
pub mod error;
pub mod fetch;
pub mod filters;
pub mod operators;
pub mod state;

pub use codec::DataQueryState;
pub use columns::{ChoiceOption, ColumnDef, ColumnType, OptionSource};
pub use error::{GridError, Result};
pub use fetch::{DataSource, FetchPage, FetchTicket};
pub use filters::{ColumnFilter, FilterModel, FilterValue};
pub use operators::{Arity, Operator, OperatorSpec};
pub use state::{
    ColumnPinning, FetchMode, GridController, Pagination, SortEntry, TableState,
    DEFAULT_PAGE_SIZE,
};
