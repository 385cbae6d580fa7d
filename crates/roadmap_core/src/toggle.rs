//! crates/roadmap_core/src/toggle.rs
//!
//! Completion toggles. Each toggle works on its own copy of the tree and
//! returns it, leaving the caller's roadmap untouched. A target that cannot
//! be found yields an unchanged copy.

use tracing::debug;

use crate::domain::{Day, ItemCategory, Roadmap};

/// Addresses one day by its phase id and its week and day numbers.
///
/// Week and day numbers are only unique within their parent, so all three
/// parts are needed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayPath<'a> {
    pub phase_id: &'a str,
    pub week_number: u32,
    pub day_number: u32,
}

impl<'a> DayPath<'a> {
    pub fn new(phase_id: &'a str, week_number: u32, day_number: u32) -> Self {
        Self {
            phase_id,
            week_number,
            day_number,
        }
    }
}

fn find_day_mut<'r>(roadmap: &'r mut Roadmap, path: &DayPath<'_>) -> Option<&'r mut Day> {
    roadmap
        .phases
        .iter_mut()
        .find(|phase| phase.id == path.phase_id)?
        .weeks
        .iter_mut()
        .find(|week| week.week_number == path.week_number)?
        .days
        .iter_mut()
        .find(|day| day.day_number == path.day_number)
}

/// Flips a day's completion. Completing a day also completes every item in
/// it; un-completing leaves the items as they are.
pub fn toggle_day(roadmap: &Roadmap, path: &DayPath<'_>) -> Roadmap {
    let mut updated = roadmap.clone();
    let Some(day) = find_day_mut(&mut updated, path) else {
        debug!(?path, "toggle_day: no such day, leaving roadmap unchanged");
        return updated;
    };

    day.completed = !day.completed;
    if day.completed {
        day.items_mut().for_each(|item| item.completed = true);
    }
    updated
}

/// Flips one item, then marks the day complete exactly when it has at least
/// one item and all of them are done.
pub fn toggle_item(
    roadmap: &Roadmap,
    path: &DayPath<'_>,
    category: ItemCategory,
    item_index: usize,
) -> Roadmap {
    let mut updated = roadmap.clone();
    let Some(day) = find_day_mut(&mut updated, path) else {
        debug!(?path, "toggle_item: no such day, leaving roadmap unchanged");
        return updated;
    };
    let Some(item) = day.items_in_mut(category).get_mut(item_index) else {
        debug!(?path, ?category, item_index, "toggle_item: no such item, leaving roadmap unchanged");
        return updated;
    };

    item.completed = !item.completed;

    let complete = {
        let mut items = day.items().peekable();
        items.peek().is_some() && items.all(|item| item.completed)
    };
    day.completed = complete;
    updated
}
