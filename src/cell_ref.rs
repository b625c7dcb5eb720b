//! Conversions between 0-indexed (row, col) pairs and A1-style references.

/// Column letters for a 0-indexed column: 0 → "A", 25 → "Z", 26 → "AA".
#[must_use]
pub fn col_to_letter(col: u32) -> String {
    let mut letters = Vec::new();
    let mut n = u64::from(col) + 1; // Convert to 1-based
    while n > 0 {
        n -= 1;
        let offset = u32::try_from(n % 26).unwrap_or(0);
        letters.push(char::from_u32('A' as u32 + offset).unwrap_or('A'));
        n /= 26;
    }
    letters.iter().rev().collect()
}

/// A1-style reference for a 0-indexed (row, col).
#[must_use]
pub fn cell_ref(row: u32, col: u32) -> String {
    format!("{}{}", col_to_letter(col), u64::from(row) + 1)
}

/// Parse a cell reference like "B12" into 0-indexed (col, row).
///
/// `$` anchors are ignored. Returns `None` when either part is missing.
#[must_use]
pub fn parse_cell_ref(cell_ref: &str) -> Option<(u32, u32)> {
    let trimmed = cell_ref.trim();
    let split = trimmed.find(|ch: char| ch.is_ascii_digit())?;
    let (letters, digits) = trimmed.split_at(split);

    let mut col: u32 = 0;
    let mut saw_col = false;
    for ch in letters.chars().filter(|&ch| ch != '$') {
        if !ch.is_ascii_alphabetic() {
            return None;
        }
        let value = ch.to_ascii_uppercase() as u32 - 'A' as u32 + 1;
        col = col.checked_mul(26)?.checked_add(value)?;
        saw_col = true;
    }

    let row: u32 = digits.parse().ok()?;
    if !saw_col || row == 0 {
        return None;
    }

    Some((col - 1, row - 1))
}
