//! The edition downgrade ladder, newest to oldest.

const LADDER: &[(&str, &str)] = &[("2024", "2021"), ("2021", "2018"), ("2018", "2015")];

/// Next-lower edition for `edition`, or `None` when it is already the oldest
/// known value or not a recognized identifier.
pub(crate) fn next_lower(edition: &str) -> Option<&'static str> {
    LADDER
        .iter()
        .find(|(from, _)| *from == edition)
        .map(|(_, to)| *to)
}
