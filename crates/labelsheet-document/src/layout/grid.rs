// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Grid packer — fills rows left to right, top to bottom.

use std::num::NonZeroUsize;

/// One table row. Every row but the last holds exactly `columns` cells.
pub type Row<T> = Vec<T>;

/// Rows of cells produced from one document part.
#[derive(Debug, Clone, PartialEq)]
pub struct TableBlock<T> {
    rows: Vec<Row<T>>,
    columns: NonZeroUsize,
}

impl<T> TableBlock<T> {
    pub fn rows(&self) -> &[Row<T>] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<Row<T>> {
        self.rows
    }

    pub fn columns(&self) -> NonZeroUsize {
        self.columns
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of cells across all rows.
    pub fn cell_count(&self) -> usize {
        self.rows.iter().map(Vec::len).sum()
    }
}

/// Pack `elements` into rows of `columns` cells.
///
/// The final row may be short; no padding cells are synthesised. Order is
/// preserved and nothing is dropped or duplicated.
pub fn pack<T>(elements: impl IntoIterator<Item = T>, columns: NonZeroUsize) -> TableBlock<T> {
    let per_row = columns.get();
    let mut rows = Vec::new();
    let mut row = Vec::with_capacity(per_row);

    for element in elements {
        row.push(element);
        if row.len() == per_row {
            rows.push(std::mem::replace(&mut row, Vec::with_capacity(per_row)));
        }
    }
    if !row.is_empty() {
        rows.push(row);
    }

    TableBlock { rows, columns }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cols(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).expect("non-zero")
    }

    #[test]
    fn exact_fill_has_no_short_row() {
        let table = pack(0..9, cols(3));
        assert_eq!(table.rows().len(), 3);
        assert!(table.rows().iter().all(|r| r.len() == 3));
    }

    #[test]
    fn last_row_may_be_short() {
        let table = pack(0..20, cols(3));
        assert_eq!(table.rows().len(), 7);
        assert_eq!(table.rows().last().map(Vec::len), Some(2));
    }

    #[test]
    fn fewer_elements_than_columns_is_one_short_row() {
        let table = pack(["a", "b"], cols(6));
        assert_eq!(table.rows(), &[vec!["a", "b"]]);
        assert_eq!(table.columns(), cols(6));
    }

    #[test]
    fn nothing_in_nothing_out() {
        let table = pack(Vec::<u8>::new(), cols(4));
        assert!(table.is_empty());
        assert_eq!(table.cell_count(), 0);
    }

    #[test]
    fn row_sum_and_order_invariants_hold() {
        for n in 0..40 {
            for c in 1..8 {
                let table = pack(0..n, cols(c));
                assert_eq!(table.cell_count(), n);

                let rows = table.rows();
                if let Some((_, full)) = rows.split_last() {
                    assert!(full.iter().all(|r| r.len() == c));
                }

                let flattened: Vec<usize> = table.into_rows().into_iter().flatten().collect();
                assert_eq!(flattened, (0..n).collect::<Vec<_>>());
            }
        }
    }
}
