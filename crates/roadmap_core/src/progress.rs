//! crates/roadmap_core/src/progress.rs
//!
//! Pure XP and completion calculators over a roadmap tree.

use crate::domain::{Day, Phase, Roadmap, Week};

/// `round(100 * part / whole)` with halves rounded up; 0 when `whole` is 0.
pub fn percentage(part: usize, whole: usize) -> u32 {
    if whole == 0 {
        return 0;
    }
    ((200 * part + whole) / (2 * whole)) as u32
}

fn days(roadmap: &Roadmap) -> impl Iterator<Item = &Day> {
    roadmap.phases.iter().flat_map(phase_days)
}

fn phase_days(phase: &Phase) -> impl Iterator<Item = &Day> {
    phase.weeks.iter().flat_map(|week| week.days.iter())
}

/// XP a single day contributes: its reward once completed, otherwise the
/// XP of its individually completed items.
pub fn day_xp(day: &Day) -> u32 {
    if day.completed {
        day.xp_reward
    } else {
        day.items()
            .filter(|item| item.completed)
            .map(|item| item.xp)
            .fold(0, u32::saturating_add)
    }
}

/// Total XP earned across the roadmap, saturating at `u32::MAX`.
pub fn earned_xp(roadmap: &Roadmap) -> u32 {
    days(roadmap).map(day_xp).fold(0, u32::saturating_add)
}

pub fn total_days(roadmap: &Roadmap) -> usize {
    days(roadmap).count()
}

pub fn completed_days(roadmap: &Roadmap) -> usize {
    days(roadmap).filter(|day| day.completed).count()
}

/// Whole-roadmap completion in percent of days.
pub fn progress(roadmap: &Roadmap) -> u32 {
    percentage(completed_days(roadmap), total_days(roadmap))
}

pub fn phase_progress(phase: &Phase) -> u32 {
    let total = phase_days(phase).count();
    let completed = phase_days(phase).filter(|day| day.completed).count();
    percentage(completed, total)
}

pub fn week_progress(week: &Week) -> u32 {
    let completed = week.days.iter().filter(|day| day.completed).count();
    percentage(completed, week.days.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Item;

    fn item(xp: u32, completed: bool) -> Item {
        Item {
            description: format!("task worth {xp}"),
            xp,
            completed,
            resource: None,
        }
    }

    fn day(day_number: u32, completed: bool, items: Vec<Item>) -> Day {
        Day {
            day_number,
            xp_reward: 50,
            completed,
            learn_items: items,
            ..Day::default()
        }
    }

    fn roadmap_with(weeks: Vec<Week>) -> Roadmap {
        Roadmap {
            phases: vec![Phase {
                id: "p1".into(),
                weeks,
                ..Phase::default()
            }],
            ..Roadmap::default()
        }
    }

    #[test]
    fn percentage_rounds_half_up_and_handles_zero() {
        assert_eq!(percentage(0, 0), 0);
        assert_eq!(percentage(1, 3), 33);
        assert_eq!(percentage(2, 3), 67);
        assert_eq!(percentage(1, 8), 13);
        assert_eq!(percentage(1, 200), 1);
        assert_eq!(percentage(4, 4), 100);
    }

    #[test]
    fn empty_roadmap_reports_zero() {
        let empty = Roadmap::default();
        assert_eq!(progress(&empty), 0);
        assert_eq!(earned_xp(&empty), 0);

        let no_days = roadmap_with(vec![Week::default()]);
        assert_eq!(progress(&no_days), 0);
        assert_eq!(earned_xp(&no_days), 0);
        assert_eq!(week_progress(&no_days.phases[0].weeks[0]), 0);
        assert_eq!(phase_progress(&no_days.phases[0]), 0);
    }

    #[test]
    fn completed_day_reward_dominates_item_xp() {
        let mut completed = day(1, true, vec![item(10, false), item(10, true)]);
        assert_eq!(day_xp(&completed), 50);

        completed.learn_items[0].completed = true;
        assert_eq!(day_xp(&completed), 50);

        let partial = day(2, false, vec![item(10, true), item(15, false)]);
        assert_eq!(day_xp(&partial), 10);
    }

    #[test]
    fn progress_counts_days_across_weeks_and_phases() {
        let week_one = Week {
            week_number: 1,
            days: vec![day(1, true, vec![]), day(2, false, vec![item(5, true)])],
            ..Week::default()
        };
        let week_two = Week {
            week_number: 2,
            days: vec![day(1, true, vec![])],
            ..Week::default()
        };
        let mut roadmap = roadmap_with(vec![week_one, week_two]);
        roadmap.phases.push(Phase {
            id: "p2".into(),
            weeks: vec![Week {
                week_number: 3,
                days: vec![day(1, false, vec![])],
                ..Week::default()
            }],
            ..Phase::default()
        });

        assert_eq!(total_days(&roadmap), 4);
        assert_eq!(completed_days(&roadmap), 2);
        assert_eq!(progress(&roadmap), 50);
        assert_eq!(earned_xp(&roadmap), 50 + 5 + 50);
        assert_eq!(phase_progress(&roadmap.phases[0]), 67);
        assert_eq!(phase_progress(&roadmap.phases[1]), 0);
        assert_eq!(week_progress(&roadmap.phases[0].weeks[0]), 50);
        assert_eq!(week_progress(&roadmap.phases[0].weeks[1]), 100);
    }

    #[test]
    fn huge_xp_values_saturate_instead_of_overflowing() {
        let mut big = day(1, true, vec![]);
        big.xp_reward = u32::MAX / 2 + 1;
        let roadmap = roadmap_with(vec![Week {
            week_number: 1,
            days: vec![big.clone(), Day { day_number: 2, ..big }],
            ..Week::default()
        }]);
        assert_eq!(earned_xp(&roadmap), u32::MAX);

        let items = day(3, false, vec![item(u32::MAX, true), item(1, true)]);
        assert_eq!(day_xp(&items), u32::MAX);
    }
}
