//! Tabular reports built from query items
//!
//! A [`Report`] owns an ordered list of column headers, one row per row key
//! and a sum row. Every item is tested against every header; each matching
//! header's cell receives the item's count. Overlapping headers therefore
//! count an item several times, and an item matching no header creates no
//! row at all.

use crate::header::TimeIntervalColumnHeader;
use crate::item::{QueryItem, QueryItemPreprocessor};
use std::collections::BTreeMap;
use tracing::trace;

/// Row key used for the sum row
pub const SUM_ROW_KEY: &str = "Total";

/// Read access shared by the row types a [`Report`] can hold
///
/// Rows only change while their report is being filled, so outside the
/// crate they are read-only:
///
/// ```compile_fail
/// use tally_core::{QueryItem, ReportRow, Row};
///
/// fn bump(row: &mut Row) {
///     row.update_total_value(&QueryItem::new("key", 0, 1));
/// }
/// ```
pub trait ReportRow: accumulate::RowAccumulator {
    /// Row key
    fn key(&self) -> &str;

    /// Cell values aligned with the report's column headers
    fn cells(&self) -> &[u64];

    /// Accumulated total of the row
    fn total_value(&self) -> u64;
}

mod accumulate {
    use crate::item::QueryItem;

    /// Mutation used by [`super::Report`] while adding items
    pub trait RowAccumulator {
        /// Create an empty row with `column_count` zeroed cells
        fn new(key: &str, column_count: usize) -> Self;

        /// Add the item's count to the cell at `index` and to the total
        fn add_item(&mut self, item: &QueryItem, index: usize);

        /// Add the item's count to the total only (reports without columns)
        fn update_total_value(&mut self, item: &QueryItem);
    }
}

use accumulate::RowAccumulator;

/// A single report row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    key: String,
    cells: Vec<u64>,
    total_value: u64,
}

impl ReportRow for Row {
    fn key(&self) -> &str {
        &self.key
    }

    fn cells(&self) -> &[u64] {
        &self.cells
    }

    fn total_value(&self) -> u64 {
        self.total_value
    }
}

impl RowAccumulator for Row {
    fn new(key: &str, column_count: usize) -> Self {
        Self {
            key: key.to_string(),
            cells: vec![0; column_count],
            total_value: 0,
        }
    }

    fn add_item(&mut self, item: &QueryItem, index: usize) {
        if let Some(cell) = self.cells.get_mut(index) {
            *cell += item.count();
            self.total_value += item.count();
        }
    }

    fn update_total_value(&mut self, item: &QueryItem) {
        self.total_value += item.count();
    }
}

/// A row with one level of nested detail rows
///
/// Items carrying a detail key are accumulated into the row itself and into
/// the nested row for that key, under the same header rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FoldableRow {
    row: Row,
    foldable_rows: BTreeMap<String, Row>,
}

impl FoldableRow {
    /// Get the nested row for a detail key
    pub fn get_foldable_row(&self, detail_key: &str) -> Option<&Row> {
        self.foldable_rows.get(detail_key)
    }

    /// Iterate over nested rows in key order
    pub fn foldable_rows(&self) -> impl Iterator<Item = &Row> {
        self.foldable_rows.values()
    }

    /// Number of nested rows
    pub fn foldable_row_count(&self) -> usize {
        self.foldable_rows.len()
    }

    fn foldable_row_mut(&mut self, detail_key: &str) -> &mut Row {
        let column_count = self.row.cells.len();
        self.foldable_rows
            .entry(detail_key.to_string())
            .or_insert_with(|| Row::new(detail_key, column_count))
    }
}

impl ReportRow for FoldableRow {
    fn key(&self) -> &str {
        self.row.key()
    }

    fn cells(&self) -> &[u64] {
        self.row.cells()
    }

    fn total_value(&self) -> u64 {
        self.row.total_value()
    }
}

impl RowAccumulator for FoldableRow {
    fn new(key: &str, column_count: usize) -> Self {
        Self {
            row: Row::new(key, column_count),
            foldable_rows: BTreeMap::new(),
        }
    }

    fn add_item(&mut self, item: &QueryItem, index: usize) {
        self.row.add_item(item, index);
        if let Some(detail_key) = item.detail_key() {
            self.foldable_row_mut(detail_key).add_item(item, index);
        }
    }

    fn update_total_value(&mut self, item: &QueryItem) {
        self.row.update_total_value(item);
        if let Some(detail_key) = item.detail_key() {
            self.foldable_row_mut(detail_key).update_total_value(item);
        }
    }
}

/// Report aggregating query items into rows keyed by the item key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report<R: ReportRow = Row> {
    column_headers: Vec<TimeIntervalColumnHeader>,
    rows: BTreeMap<String, R>,
    sum_row: R,
}

impl<R: ReportRow> Report<R> {
    /// Create an empty report for the given column headers
    pub fn new(column_headers: Vec<TimeIntervalColumnHeader>) -> Self {
        let sum_row = R::new(SUM_ROW_KEY, column_headers.len());
        Self {
            column_headers,
            rows: BTreeMap::new(),
            sum_row,
        }
    }

    /// Add one item whose age is already in the report's unit.
    pub fn add_item(&mut self, item: QueryItem) {
        let column_count = self.column_headers.len();

        if column_count == 0 {
            self.rows
                .entry(item.key().to_string())
                .or_insert_with(|| R::new(item.key(), 0))
                .update_total_value(&item);
            self.sum_row.update_total_value(&item);
            return;
        }

        for (index, header) in self.column_headers.iter().enumerate() {
            if !header.is_in_header(item.age_in_days()) {
                continue;
            }
            trace!(key = item.key(), index, count = item.count(), "Adding item to column");
            self.rows
                .entry(item.key().to_string())
                .or_insert_with(|| R::new(item.key(), column_count))
                .add_item(&item, index);
            self.sum_row.add_item(&item, index);
        }
    }

    /// Add one item after letting the preprocessor replace its count.
    pub fn add_item_with<P>(&mut self, mut item: QueryItem, preprocessor: &P)
    where
        P: QueryItemPreprocessor + ?Sized,
    {
        let count = preprocessor.apply(&item);
        item.set_count(count);
        self.add_item(item);
    }

    /// Add every item in order
    pub fn add_items(&mut self, items: impl IntoIterator<Item = QueryItem>) {
        for item in items {
            self.add_item(item);
        }
    }

    /// Add every item in order, preprocessing each one
    pub fn add_items_with<P>(&mut self, items: impl IntoIterator<Item = QueryItem>, preprocessor: &P)
    where
        P: QueryItemPreprocessor + ?Sized,
    {
        for item in items {
            self.add_item_with(item, preprocessor);
        }
    }

    /// Get the row for a key
    pub fn get_row(&self, key: &str) -> Option<&R> {
        self.rows.get(key)
    }

    /// Iterate over rows in key order
    pub fn rows(&self) -> impl Iterator<Item = &R> {
        self.rows.values()
    }

    /// Number of rows, not counting the sum row
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Check if no item has matched any column yet
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Column-wise totals across all rows
    pub fn sum_row(&self) -> &R {
        &self.sum_row
    }

    /// The report's column headers
    pub fn column_headers(&self) -> &[TimeIntervalColumnHeader] {
        &self.column_headers
    }
}
