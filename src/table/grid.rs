// src/table/grid.rs

use super::Cell;

/// The as-exported grid before any cleaning: ordered headers (possibly
/// blank, duplicated or placeholder) and ordered rows of cells. Rows may
/// be ragged; out-of-range cells read as `Empty`.
///
/// A cleaner owns its `RawTable` and fully replaces it across each
/// transformation step, then calls [`RawTable::finalize`] to obtain the
/// invariant-checked [`NormalizedTable`].
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

static EMPTY_CELL: Cell = Cell::Empty;

impl RawTable {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<Cell>>) -> Self {
        RawTable { headers, rows }
    }

    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn num_columns(&self) -> usize {
        self.headers.len()
    }

    /// Index of the first column with this exact header.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Cell at (row, col); ragged rows read as `Empty` past their end.
    pub fn cell(&self, row: usize, col: usize) -> &Cell {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(&EMPTY_CELL)
    }

    /// Keep only the rows matching the predicate. The predicate sees the
    /// whole row slice so callers can combine per-column conditions.
    pub fn retain_rows<F: FnMut(&RawTable, usize) -> bool>(&mut self, mut keep: F) {
        let mut keep_flags = Vec::with_capacity(self.rows.len());
        for i in 0..self.rows.len() {
            keep_flags.push(keep(&*self, i));
        }
        let mut it = keep_flags.into_iter();
        self.rows.retain(|_| it.next().unwrap_or(false));
    }

    /// Drop the columns whose (index, header) matches the predicate.
    pub fn drop_columns_where<F: Fn(usize, &str) -> bool>(&mut self, drop: F) {
        let dropped: Vec<usize> = self
            .headers
            .iter()
            .enumerate()
            .filter(|(i, h)| drop(*i, h))
            .map(|(i, _)| i)
            .collect();
        if dropped.is_empty() {
            return;
        }
        for &idx in dropped.iter().rev() {
            self.headers.remove(idx);
            for row in &mut self.rows {
                if idx < row.len() {
                    row.remove(idx);
                }
            }
        }
    }

    pub fn drop_column(&mut self, name: &str) {
        if let Some(idx) = self.column_index(name) {
            self.drop_columns_where(|i, _| i == idx);
        }
    }

    pub fn drop_first_column(&mut self) {
        if !self.headers.is_empty() {
            self.drop_columns_where(|i, _| i == 0);
        }
    }

    /// Drop columns whose every cell is blank.
    pub fn drop_blank_columns(&mut self) {
        let blank: Vec<bool> = (0..self.num_columns())
            .map(|c| (0..self.num_rows()).all(|r| self.cell(r, c).is_empty()))
            .collect();
        self.drop_columns_where(|i, _| blank[i]);
    }

    pub fn drop_blank_header_columns(&mut self) {
        self.drop_columns_where(|_, h| h.trim().is_empty());
    }

    pub fn drop_last_row(&mut self) {
        self.rows.pop();
    }

    /// Drop rows whose every cell is blank.
    pub fn drop_blank_rows(&mut self) {
        self.rows.retain(|row| !row.iter().all(Cell::is_empty));
    }

    pub fn rename_column(&mut self, index: usize, name: &str) {
        if let Some(h) = self.headers.get_mut(index) {
            *h = name.to_string();
        }
    }

    /// Extract a full column as owned cells, padding ragged rows.
    pub fn column_cells(&self, col: usize) -> Vec<Cell> {
        (0..self.num_rows()).map(|r| self.cell(r, col).clone()).collect()
    }

    /// Replace the named column's cells, or append a new column when the
    /// name is absent (pandas-style assignment).
    pub fn set_column(&mut self, name: &str, cells: Vec<Cell>) {
        match self.column_index(name) {
            Some(idx) => {
                for (r, cell) in cells.into_iter().enumerate() {
                    if let Some(row) = self.rows.get_mut(r) {
                        while row.len() <= idx {
                            row.push(Cell::Empty);
                        }
                        row[idx] = cell;
                    }
                }
            }
            None => {
                let idx = self.headers.len();
                self.headers.push(name.to_string());
                for (r, cell) in cells.into_iter().enumerate() {
                    if let Some(row) = self.rows.get_mut(r) {
                        while row.len() < idx {
                            row.push(Cell::Empty);
                        }
                        row.push(cell);
                    }
                }
            }
        }
    }

    /// Rewrite every cell of the named column in place. No-op when the
    /// column is absent.
    pub fn map_column<F: FnMut(usize, &Cell) -> Cell>(&mut self, name: &str, mut f: F) {
        if let Some(idx) = self.column_index(name) {
            for r in 0..self.num_rows() {
                let next = f(r, self.cell(r, idx));
                let row = &mut self.rows[r];
                while row.len() <= idx {
                    row.push(Cell::Empty);
                }
                row[idx] = next;
            }
        }
    }

    /// Rewrite every cell in the table.
    pub fn map_cells<F: FnMut(&Cell) -> Cell>(&mut self, mut f: F) {
        for row in &mut self.rows {
            for cell in row.iter_mut() {
                *cell = f(cell);
            }
        }
    }

    /// Coerce every non-empty cell to its display string. The warehouse
    /// load infers types separately, and some visually-numeric cells are
    /// semantically identifiers that must stay text.
    pub fn stringify(&mut self) {
        self.map_cells(|c| {
            if c.is_empty() {
                Cell::Empty
            } else {
                Cell::Str(c.to_display())
            }
        });
    }

    /// Reorder + project to exactly the given columns, which must exist.
    pub fn select_columns(&mut self, names: &[&str]) {
        let indices: Vec<usize> = names
            .iter()
            .filter_map(|n| self.column_index(n))
            .collect();
        debug_assert_eq!(indices.len(), names.len());
        let new_rows: Vec<Vec<Cell>> = (0..self.num_rows())
            .map(|r| indices.iter().map(|&c| self.cell(r, c).clone()).collect())
            .collect();
        self.headers = names.iter().map(|n| n.to_string()).collect();
        self.rows = new_rows;
    }

    /// Seal the working grid into a [`NormalizedTable`]: pad ragged rows
    /// to the header width and de-duplicate column names with `_2`, `_3`…
    /// suffixes so every name is unique.
    pub fn finalize(mut self) -> NormalizedTable {
        let width = self.headers.len();
        for row in &mut self.rows {
            row.resize(width, Cell::Empty);
            row.truncate(width);
        }

        let mut seen: std::collections::HashMap<String, usize> = std::collections::HashMap::new();
        let columns = self
            .headers
            .into_iter()
            .map(|name| {
                let n = seen.entry(name.clone()).or_insert(0);
                *n += 1;
                if *n == 1 {
                    name
                } else {
                    format!("{}_{}", name, n)
                }
            })
            .collect();

        NormalizedTable {
            columns,
            rows: self.rows,
        }
    }
}

/// A cleaned table: fixed, unique column names and rectangular rows,
/// ready for schema inference and the warehouse load.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedTable {
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl NormalizedTable {
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn cell(&self, row: usize, col: usize) -> &Cell {
        &self.rows[row][col]
    }

    /// Iterate one column's cells.
    pub fn column_cells(&self, col: usize) -> impl Iterator<Item = &Cell> {
        self.rows.iter().map(move |r| &r[col])
    }

    /// In-place rewrite of one column; used when a DATE override
    /// materializes string dates into real date values.
    pub fn map_column<F: FnMut(&Cell) -> Cell>(&mut self, col: usize, mut f: F) {
        for row in &mut self.rows {
            row[col] = f(&row[col]);
        }
    }
}
