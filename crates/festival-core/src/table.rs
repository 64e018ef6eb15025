//! Table row filters.
//!
//! Mirrors the list pages' search boxes: typing into a filter hides every
//! row whose target cell does not contain the text, ignoring case.

use std::str::FromStr;

/// Column holding the item name in every list table.
pub const NAME_COLUMN: usize = 1;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub cells: Vec<String>,
    pub visible: bool,
}

impl Row {
    pub fn new(cells: Vec<String>) -> Self {
        Self {
            cells,
            visible: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    pub rows: Vec<Row>,
}

impl Table {
    pub fn new(rows: Vec<Vec<String>>) -> Self {
        Self {
            rows: rows.into_iter().map(Row::new).collect(),
        }
    }

    /// Parse tab-separated lines. Blank lines are skipped.
    pub fn from_tsv(input: &str) -> Self {
        Self::new(
            input
                .lines()
                .filter(|line| !line.trim().is_empty())
                .map(|line| line.split('\t').map(|c| c.trim().to_string()).collect())
                .collect(),
        )
    }

    pub fn visible_rows(&self) -> impl Iterator<Item = &Row> {
        self.rows.iter().filter(|r| r.visible)
    }

    /// Show or hide every row (reply table checkbox).
    pub fn set_all_visible(&mut self, visible: bool) {
        for row in &mut self.rows {
            row.visible = visible;
        }
    }
}

/// Case-insensitive substring filter on one column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableFilter {
    pub column: usize,
}

impl Default for TableFilter {
    fn default() -> Self {
        Self {
            column: NAME_COLUMN,
        }
    }
}

impl TableFilter {
    pub fn new(column: usize) -> Self {
        Self { column }
    }

    /// Rows without the target cell keep their current visibility.
    pub fn apply(&self, table: &mut Table, query: &str) {
        let needle = query.to_uppercase();
        for row in &mut table.rows {
            if let Some(cell) = row.cells.get(self.column) {
                row.visible = cell.to_uppercase().contains(&needle);
            }
        }
    }
}

/// Filterable list pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TablePreset {
    Stock,
    Wishlist,
    Shopping,
    Utility,
}

impl TablePreset {
    pub fn filter(&self) -> TableFilter {
        match self {
            Self::Stock | Self::Wishlist | Self::Shopping | Self::Utility => {
                TableFilter::new(NAME_COLUMN)
            }
        }
    }
}

impl FromStr for TablePreset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "stock" => Ok(Self::Stock),
            "wishlist" => Ok(Self::Wishlist),
            "shopping" => Ok(Self::Shopping),
            "utility" => Ok(Self::Utility),
            other => Err(format!(
                "unknown table '{}' (stock, wishlist, shopping, utility)",
                other
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stock() -> Table {
        Table::from_tsv(
            "Id\tName\tAmount\n\
             1\tPilsner\t24\n\
             2\tApple Juice\t6\n\
             3\tpilsner light\t12\n\
             \n\
             footer\n",
        )
    }

    fn visible_names(table: &Table) -> Vec<&str> {
        table
            .visible_rows()
            .filter_map(|r| r.cells.get(1).map(String::as_str))
            .collect()
    }

    #[test]
    fn test_from_tsv() {
        let table = stock();
        assert_eq!(table.rows.len(), 5);
        assert_eq!(table.rows[2].cells, vec!["2", "Apple Juice", "6"]);
    }

    #[test]
    fn test_filter_is_case_insensitive() {
        let mut table = stock();
        TableFilter::default().apply(&mut table, "PILS");
        assert_eq!(visible_names(&table), vec!["Pilsner", "pilsner light"]);
    }

    #[test]
    fn test_header_matches_like_any_row() {
        let mut table = stock();
        TableFilter::default().apply(&mut table, "name");
        assert_eq!(visible_names(&table), vec!["Name"]);
    }

    #[test]
    fn test_rows_without_cell_untouched() {
        let mut table = stock();
        TableFilter::default().apply(&mut table, "zzz");
        assert_eq!(table.visible_rows().count(), 1);
        assert_eq!(table.rows[4].cells, vec!["footer"]);
        assert!(table.rows[4].visible);
    }

    #[test]
    fn test_empty_filter_shows_all() {
        let mut table = stock();
        TableFilter::default().apply(&mut table, "juice");
        assert_eq!(visible_names(&table), vec!["Apple Juice"]);

        TableFilter::default().apply(&mut table, "");
        assert!(table.rows.iter().all(|r| r.visible));
    }

    #[test]
    fn test_other_column() {
        let mut table = stock();
        TableFilter::new(2).apply(&mut table, "12");
        assert_eq!(visible_names(&table), vec!["pilsner light"]);
    }

    #[test]
    fn test_reply_toggle() {
        let mut table = stock();
        table.set_all_visible(false);
        assert_eq!(table.visible_rows().count(), 0);
        table.set_all_visible(true);
        assert_eq!(table.visible_rows().count(), 5);
    }

    #[test]
    fn test_presets() {
        assert_eq!("Shopping".parse::<TablePreset>(), Ok(TablePreset::Shopping));
        assert_eq!(TablePreset::Stock.filter(), TableFilter::new(1));
        assert!("inventory".parse::<TablePreset>().is_err());
    }
}
