use super::{
    a1_notation::{quote_sheet_title, A1Notation, ToA1Notation},
    cell_position::CellPosition,
    column::Column,
    row::Row,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellRange {
    pub start: CellPosition,
    pub end: CellPosition,
}

impl CellRange {
    /// A single worksheet row spanning columns `A..` up to `width` cells.
    pub fn row_span(row: Row, width: usize) -> Self {
        CellRange {
            start: CellPosition {
                col: Column::from_index(0),
                row,
            },
            end: CellPosition {
                col: Column::last_of(width),
                row,
            },
        }
    }
}

impl ToA1Notation for CellRange {
    fn to_a1_notation(&self, sheet_name: Option<&str>) -> A1Notation {
        let start = self.start.to_a1_notation(None);
        let end = self.end.to_a1_notation(None);

        match sheet_name {
            Some(sheet_name) => A1Notation(format!(
                "{}!{}:{}",
                quote_sheet_title(sheet_name),
                start,
                end
            )),
            None => A1Notation(format!("{}:{}", start, end)),
        }
    }
}
