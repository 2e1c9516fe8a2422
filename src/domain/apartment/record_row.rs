/// One worksheet row of the record table, as plain cell text.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RecordRow {
    cells: Vec<String>,
}

impl RecordRow {
    pub fn new(cells: Vec<String>) -> Self {
        Self { cells }
    }

    pub fn cell(&self, index: usize) -> Option<&str> {
        self.cells.get(index).map(String::as_str)
    }

    /// The key column, trimmed. `None` for a blank row.
    pub fn name(&self) -> Option<&str> {
        self.cell(0).map(str::trim).filter(|name| !name.is_empty())
    }

    pub fn cells(&self) -> &[String] {
        &self.cells
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn into_cells(self) -> Vec<String> {
        self.cells
    }
}

impl From<Vec<String>> for RecordRow {
    fn from(cells: Vec<String>) -> Self {
        Self::new(cells)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_is_trimmed() {
        let row = RecordRow::new(vec![" Unit A ".into(), "x".into()]);
        assert_eq!(row.name(), Some("Unit A"));
    }

    #[test]
    fn test_blank_name_is_none() {
        assert_eq!(RecordRow::new(vec!["  ".into()]).name(), None);
        assert_eq!(RecordRow::default().name(), None);
    }
}
