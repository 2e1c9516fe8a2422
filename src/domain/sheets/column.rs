use std::fmt::Formatter;

/// Zero-based worksheet column, displayed as spreadsheet letters (`A`, `B`, ..., `AA`).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Column {
    index: u32,
}

impl Column {
    pub fn from_index(index: u32) -> Self {
        Column { index }
    }

    /// The last column of a table that is `width` cells wide. A zero width still maps to `A`.
    pub fn last_of(width: usize) -> Self {
        Column::from_index(u32::try_from(width.saturating_sub(1)).unwrap_or(u32::MAX - 1))
    }

    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn letters(&self) -> String {
        number_to_letters(self.index + 1)
    }
}

impl std::fmt::Display for Column {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.letters())
    }
}

impl std::fmt::Debug for Column {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Column(index: {}, letters: {})", self.index, self)
    }
}

fn number_to_letters(number: u32) -> String {
    let mut number = number;
    let mut result = String::new();
    while number > 0 {
        let remainder = (number - 1) % 26;
        let letter = (remainder as u8 + b'A') as char;
        result.push(letter);
        number = (number - remainder) / 26;
    }
    result.chars().rev().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_display_a() {
        assert_eq!(Column::from_index(0).to_string(), "A");
    }

    #[test]
    fn test_column_display_z() {
        assert_eq!(Column::from_index(25).to_string(), "Z");
    }

    #[test]
    fn test_column_display_aa() {
        assert_eq!(Column::from_index(26).to_string(), "AA");
    }

    #[test]
    fn test_column_display_az() {
        assert_eq!(Column::from_index(51).to_string(), "AZ");
    }

    #[test]
    fn test_column_display_ba() {
        assert_eq!(Column::from_index(52).to_string(), "BA");
    }

    #[test]
    fn test_number_to_letters() {
        assert_eq!(number_to_letters(1), "A");
        assert_eq!(number_to_letters(26), "Z");
        assert_eq!(number_to_letters(27), "AA");
        assert_eq!(number_to_letters(28), "AB");
        assert_eq!(number_to_letters(53), "BA");
    }

    #[test]
    fn test_last_of_width() {
        assert_eq!(Column::last_of(1), Column::from_index(0));
        assert_eq!(Column::last_of(39).to_string(), "AM");
        assert_eq!(Column::last_of(0), Column::from_index(0));
    }

    #[test]
    fn test_column_debug() {
        assert_eq!(
            format!("{:?}", Column::from_index(27)),
            "Column(index: 27, letters: AB)"
        );
    }
}
