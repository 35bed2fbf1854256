// src/booking/slots.rs

/// Bookable time labels for any doctor on any day, in display order.
///
/// The labels are stored verbatim in `appointment.slot`, so they must not
/// change without a migration of the `CHECK` constraint on that column.
pub const SLOT_CATALOG: [&str; 8] = [
    "10:00 AM", "10:30 AM", "11:00 AM", "11:30 AM",
    "12:00 PM", "12:30 PM", "2:00 PM", "2:30 PM",
];

pub fn list_all_slots() -> &'static [&'static str] {
    &SLOT_CATALOG
}

/// Exact match only: "10:00 am" or " 10:00 AM" are not catalog slots.
pub fn is_catalog_slot(label: &str) -> bool {
    SLOT_CATALOG.contains(&label)
}

/// Position of a slot within the day, used to order listings.
/// Unknown labels sort last.
pub fn slot_order(label: &str) -> usize {
    SLOT_CATALOG
        .iter()
        .position(|s| *s == label)
        .unwrap_or(SLOT_CATALOG.len())
}

/// Catalog minus `taken`, keeping catalog order.
pub fn available_slots<'a, I>(taken: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let taken: Vec<&str> = taken.into_iter().collect();
    SLOT_CATALOG
        .iter()
        .filter(|s| !taken.contains(*s))
        .map(|s| s.to_string())
        .collect()
}
