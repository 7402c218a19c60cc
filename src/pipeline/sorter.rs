use std::cmp::Ordering;

use crate::domain::ResultRow;

/// Total order over result rows so output never depends on file
/// enumeration or worker completion order.
///
/// Two separately-stable passes, not one composite key: the first orders by
/// swimtime descending, the second re-sorts by the grouping tuple, which
/// dominates. Within one group the descending-swimtime relative order from
/// the first pass survives as the tiebreak.
pub fn sort_rows(rows: &mut [ResultRow]) {
    rows.sort_by(|a, b| b.swimtime.total_cmp(&a.swimtime));
    rows.sort_by(group_order);
}

fn group_order(a: &ResultRow, b: &ResultRow) -> Ordering {
    a.meet
        .cmp(&b.meet)
        .then_with(|| a.city.cmp(&b.city))
        .then_with(|| a.nation.cmp(&b.nation))
        .then_with(|| a.course.cmp(&b.course))
        .then_with(|| a.event_id.cmp(&b.event_id))
        .then_with(|| a.distance.total_cmp(&b.distance))
        .then_with(|| a.stroke.cmp(&b.stroke))
        .then_with(|| a.round.cmp(&b.round))
        .then_with(|| a.gender.cmp(&b.gender))
}
