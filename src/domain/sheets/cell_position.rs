use super::{
    a1_notation::{quote_sheet_title, A1Notation, ToA1Notation},
    column::Column,
    row::Row,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellPosition {
    pub col: Column,
    pub row: Row,
}

impl ToA1Notation for CellPosition {
    fn to_a1_notation(&self, sheet_name: Option<&str>) -> A1Notation {
        match sheet_name {
            Some(sheet_name) => A1Notation(format!(
                "{}!{}{}",
                quote_sheet_title(sheet_name),
                self.col,
                self.row
            )),
            None => A1Notation(format!("{}{}", self.col, self.row)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_a1_notation_without_sheet() {
        let position = CellPosition {
            col: Column::from_index(1),
            row: Row::from_index(2),
        };
        assert_eq!(position.to_a1_notation(None).as_ref(), "B3");
    }

    #[test]
    fn test_to_a1_notation_with_sheet() {
        let position = CellPosition {
            col: Column::from_index(0),
            row: Row::from_index(0),
        };
        assert_eq!(position.to_a1_notation(Some("Data")).as_ref(), "'Data'!A1");
    }
}
