//! Tag-id allocation for newly created rows.
//!
//! Ids are derived from the table every time (max of the `Tagname` column
//! plus one). Nothing is reserved, so two allocations taken before either
//! row is committed will collide.

use crate::table::Table;

/// Column holding the numeric tag id
pub const TAG_COLUMN: &str = "Tagname";

/// Index of the tag column, matched case-insensitively
pub fn tag_column(table: &Table) -> Option<usize> {
    table.find_column(TAG_COLUMN)
}

fn parse_tag(cell: &str) -> Option<u64> {
    let trimmed = cell.trim();
    if trimmed.is_empty() || !trimmed.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    trimmed.parse().ok()
}

/// Largest numeric tag in the table
pub fn max_tag_id(table: &Table) -> Option<u64> {
    let col = tag_column(table)?;
    table.rows().iter().filter_map(|row| row.get(col).and_then(|c| parse_tag(c))).max()
}

/// Next free tag id: max + 1, or 1 when there is no tag column or no numeric tag.
pub fn next_tag_id(table: &Table) -> u64 {
    max_tag_id(table).map(|max| max.saturating_add(1)).unwrap_or(1)
}

/// Hands out consecutive ids starting from `next_tag_id`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagAllocator {
    next: u64,
}

impl TagAllocator {
    pub fn from_table(table: &Table) -> Self {
        Self { next: next_tag_id(table) }
    }

    pub fn peek(&self) -> u64 {
        self.next
    }

    pub fn allocate(&mut self) -> u64 {
        let id = self.next;
        self.next = self.next.saturating_add(1);
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(header: &str, tags: &[&str]) -> Table {
        Table::new(
            vec!["Nom".into(), header.into()],
            tags.iter().map(|t| vec!["x".to_string(), t.to_string()]).collect(),
        )
    }

    #[test]
    fn test_next_tag_is_max_plus_one() {
        let t = table("Tagname", &["10", "20", "5"]);
        assert_eq!(next_tag_id(&t), 21);
    }

    #[test]
    fn test_max_is_not_last_row() {
        // Unsorted tags: last row is not the maximum
        let t = table("TAGNAME", &["70000", "3", ""]);
        assert_eq!(next_tag_id(&t), 70001);
    }

    #[test]
    fn test_non_numeric_values_ignored() {
        let t = table("tagname", &["abc", " 12 ", "-4", "7x"]);
        assert_eq!(next_tag_id(&t), 13);
    }

    #[test]
    fn test_defaults_to_one() {
        assert_eq!(next_tag_id(&table("Other", &["99"])), 1);
        assert_eq!(next_tag_id(&table("Tagname", &["", "n/a"])), 1);
    }

    #[test]
    fn test_allocator_is_monotonic() {
        let t = table("Tagname", &["4"]);
        let mut alloc = TagAllocator::from_table(&t);
        assert_eq!(alloc.allocate(), 5);
        assert_eq!(alloc.allocate(), 6);
        assert_eq!(alloc.peek(), 7);
    }
}
