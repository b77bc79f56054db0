//! Sprint allocation over a year's weeks.
//!
//! A sprint claims exactly [`WEEKS_PER_SPRINT`] free weeks, walking forward
//! from its start week. Vacation and cooldown weeks stop the walk. Weeks that
//! already belong to another sprint are stepped over, so a new sprint can
//! straddle an existing one.

use thiserror::Error;

use crate::model::YearData;
use crate::sprint::{self, Sprint, SprintPatch};
use crate::storage::KvStore;
use crate::store::{StoreEvent, YearStore};
use crate::types::{CycleMode, WEEKS_PER_SPRINT};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AllocationError {
    #[error("week {week_id} is a vacation week; only {available} free week(s) available before it")]
    BlockedByVacation { week_id: String, available: usize },

    #[error("week {week_id} is a cooldown week; only {available} free week(s) available before it")]
    BlockedByCooldown { week_id: String, available: usize },

    #[error("not enough weeks left in the year: only {available} free week(s) available")]
    InsufficientSpace { available: usize },

    #[error("week not found: {0}")]
    UnknownWeek(String),
}

/// Pick the weeks a sprint starting at `start_week_id` would claim.
fn plan_weeks(data: &YearData, start_week_id: &str) -> Result<Vec<String>, AllocationError> {
    let start = data
        .week_index(start_week_id)
        .ok_or_else(|| AllocationError::UnknownWeek(start_week_id.to_string()))?;

    let mut claimed = Vec::with_capacity(WEEKS_PER_SPRINT);
    for week in &data.weeks[start..] {
        if week.is_vacation {
            return Err(AllocationError::BlockedByVacation {
                week_id: week.id.clone(),
                available: claimed.len(),
            });
        }
        if week.is_cooldown {
            return Err(AllocationError::BlockedByCooldown {
                week_id: week.id.clone(),
                available: claimed.len(),
            });
        }
        if week.sprint_id.is_some() {
            continue;
        }
        claimed.push(week.id.clone());
        if claimed.len() == WEEKS_PER_SPRINT {
            return Ok(claimed);
        }
    }
    Err(AllocationError::InsufficientSpace {
        available: claimed.len(),
    })
}

fn new_sprint(data: &YearData, title: Option<&str>, week_ids: Vec<String>) -> Sprint {
    let title = title
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| sprint::default_title(data.sprints.len()));
    Sprint {
        id: uuid::Uuid::new_v4().to_string(),
        title,
        goal_pitch: String::new(),
        color_theme: sprint::next_color(&data.sprints),
        week_ids,
        year: data.year,
        order: data.sprints.len() as u32,
    }
}

/// Register `sprint` and point each of its weeks back at it.
fn register(data: &mut YearData, sprint: Sprint) {
    for week_id in &sprint.week_ids {
        data.assign_week_to_sprint(week_id, Some(&sprint.id));
    }
    data.add_sprint(sprint);
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

/// Claim six free weeks from `start_week_id` onward and register a sprint on
/// them. On failure nothing is written or notified.
pub fn create_sprint<K: KvStore>(
    store: &mut YearStore<K>,
    start_week_id: &str,
    title: Option<&str>,
) -> Result<Sprint, AllocationError> {
    let week_ids = match plan_weeks(store.data(), start_week_id) {
        Ok(ids) => ids,
        Err(e) => {
            tracing::warn!(start_week_id, error = %e, "sprint not created");
            return Err(e);
        }
    };
    let sprint = new_sprint(store.data(), title, week_ids);
    let event = StoreEvent::SprintCreated {
        sprint_id: sprint.id.clone(),
    };
    let created = sprint.clone();
    store.transact(event, |data| register(data, sprint));
    tracing::debug!(sprint_id = %created.id, start_week_id, "sprint created");
    Ok(created)
}

pub fn update_sprint<K: KvStore>(
    store: &mut YearStore<K>,
    sprint_id: &str,
    patch: &SprintPatch,
) -> bool {
    store.update_sprint_data(sprint_id, patch)
}

/// Release a sprint's weeks and drop the sprint. Returns `false` for an
/// unknown id.
pub fn delete_sprint<K: KvStore>(store: &mut YearStore<K>, sprint_id: &str) -> bool {
    if store.data().sprint(sprint_id).is_none() {
        return false;
    }
    store.checkpoint();
    let event = StoreEvent::SprintDeleted {
        sprint_id: sprint_id.to_string(),
    };
    store.transact(event, |data| {
        let members: Vec<String> = data
            .weeks
            .iter()
            .filter(|w| w.sprint_id.as_deref() == Some(sprint_id))
            .map(|w| w.id.clone())
            .collect();
        for week_id in &members {
            data.assign_week_to_sprint(week_id, None);
        }
        data.remove_sprint(sprint_id);
    });
    tracing::debug!(sprint_id, "sprint deleted");
    true
}

/// Sprints in calendar order of their first week.
pub fn sorted_sprints(data: &YearData) -> Vec<&Sprint> {
    let mut sprints: Vec<&Sprint> = data.sprints.iter().collect();
    sprints.sort_by_key(|s| {
        s.week_ids
            .first()
            .and_then(|id| data.week(id))
            .map_or(u32::MAX, |w| w.order)
    });
    sprints
}

// ---------------------------------------------------------------------------
// Year pattern seeding
// ---------------------------------------------------------------------------

/// One cycle of the template: sprint week indices, then cooldown indices.
struct CycleSlot {
    sprint: std::ops::Range<usize>,
    cooldown: std::ops::Range<usize>,
}

fn pattern_layout(week_count: usize, mode: CycleMode) -> Vec<CycleSlot> {
    let info = mode.info();
    let mut slots = Vec::new();
    let mut cursor = 0;
    for _ in 0..info.sprints {
        if cursor + WEEKS_PER_SPRINT > week_count {
            break;
        }
        let sprint = cursor..cursor + WEEKS_PER_SPRINT;
        cursor += WEEKS_PER_SPRINT;
        let end = (cursor + info.cooldown_weeks).min(week_count);
        slots.push(CycleSlot {
            sprint,
            cooldown: cursor..end,
        });
        cursor = end;
    }
    slots
}

/// Replace every claim in the live year with the current cycle mode's
/// template, laid out from week 1. Tasks are kept. Returns how many sprints
/// were created.
pub fn seed_year_pattern<K: KvStore>(store: &mut YearStore<K>) -> usize {
    let mode = store.cycle_mode();
    let layout = pattern_layout(store.weeks().len(), mode);
    let count = layout.len();

    store.checkpoint();
    store.transact(StoreEvent::PatternSeeded { mode, sprints: count }, |data| {
        data.clear_claims();
        for slot in &layout {
            let week_ids: Vec<String> = data.weeks[slot.sprint.clone()]
                .iter()
                .map(|w| w.id.clone())
                .collect();
            let sprint = new_sprint(data, None, week_ids);
            register(data, sprint);

            let cooldown_ids: Vec<String> = data.weeks[slot.cooldown.clone()]
                .iter()
                .map(|w| w.id.clone())
                .collect();
            for week_id in &cooldown_ids {
                data.toggle_cooldown(week_id);
            }
        }
    });
    tracing::debug!(%mode, sprints = count, "seeded year pattern");
    count
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MemoryKv, Storage};
    use crate::types::SprintColor;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn store(year: i32) -> YearStore<MemoryKv> {
        YearStore::open(Storage::new(MemoryKv::new()), Some(year)).unwrap()
    }

    fn wid(n: u32) -> String {
        format!("2026-W{n:02}")
    }

    #[test]
    fn claims_six_consecutive_free_weeks() {
        let mut s = store(2026);
        let sprint = create_sprint(&mut s, &wid(3), None).unwrap();
        assert_eq!(sprint.week_ids, (3..=8).map(wid).collect::<Vec<_>>());
        assert_eq!(sprint.title, "Sprint 1");
        assert_eq!(sprint.goal_pitch, "");
        assert_eq!(sprint.color_theme, SprintColor::Crimson);
        assert_eq!(sprint.year, 2026);
        assert_eq!(sprint.order, 0);
        for id in &sprint.week_ids {
            assert_eq!(s.week(id).unwrap().sprint_id.as_deref(), Some(sprint.id.as_str()));
        }
        assert!(s.data().check_invariants().is_empty());
        let stored = s.storage().load_year(2026).unwrap();
        assert_eq!(stored.sprints.len(), 1);
    }

    #[test]
    fn explicit_title_is_trimmed() {
        let mut s = store(2026);
        let sprint = create_sprint(&mut s, &wid(1), Some("  Onboarding  ")).unwrap();
        assert_eq!(sprint.title, "Onboarding");
        let blank = create_sprint(&mut s, &wid(7), Some("   ")).unwrap();
        assert_eq!(blank.title, "Sprint 2");
    }

    #[test]
    fn vacation_is_a_wall() {
        let mut s = store(2026);
        assert!(s.toggle_vacation(&wid(10)));
        let before = s.data().clone();

        let err = create_sprint(&mut s, &wid(6), None).unwrap_err();
        assert_eq!(
            err,
            AllocationError::BlockedByVacation {
                week_id: wid(10),
                available: 4,
            }
        );
        assert_eq!(s.data(), &before);
        assert!(s.sprints().is_empty());
    }

    #[test]
    fn cooldown_is_a_wall() {
        let mut s = store(2026);
        assert!(s.toggle_cooldown(&wid(4)));
        let err = create_sprint(&mut s, &wid(2), None).unwrap_err();
        assert_eq!(
            err,
            AllocationError::BlockedByCooldown {
                week_id: wid(4),
                available: 2,
            }
        );
    }

    #[test]
    fn existing_sprint_weeks_are_skipped() {
        let mut s = store(2026);
        let first = create_sprint(&mut s, &wid(1), None).unwrap();
        let second = create_sprint(&mut s, &wid(5), None).unwrap();
        assert_eq!(second.week_ids, (7..=12).map(wid).collect::<Vec<_>>());
        assert_ne!(first.color_theme, second.color_theme);
        assert!(s.data().check_invariants().is_empty());
    }

    #[test]
    fn straddles_an_existing_sprint() {
        let mut s = store(2026);
        create_sprint(&mut s, &wid(4), None).unwrap();
        let around = create_sprint(&mut s, &wid(2), None).unwrap();
        let expected: Vec<String> = [2, 3, 10, 11, 12, 13].into_iter().map(wid).collect();
        assert_eq!(around.week_ids, expected);
    }

    #[test]
    fn end_of_year_is_insufficient_space() {
        let mut s = store(2026);
        let err = create_sprint(&mut s, &wid(50), None).unwrap_err();
        assert_eq!(err, AllocationError::InsufficientSpace { available: 3 });

        let mut leap = store(2024);
        assert_eq!(leap.weeks().len(), 53);
        assert!(create_sprint(&mut leap, "2024-W48", None).is_ok());
    }

    #[test]
    fn unknown_start_week() {
        let mut s = store(2026);
        assert_eq!(
            create_sprint(&mut s, "2025-W10", None).unwrap_err(),
            AllocationError::UnknownWeek("2025-W10".to_string())
        );
    }

    #[test]
    fn failed_creation_does_not_notify_or_persist() {
        let mut s = store(2026);
        s.toggle_vacation(&wid(3));
        let count = Rc::new(RefCell::new(0));
        let c = Rc::clone(&count);
        s.subscribe(move |_, _| *c.borrow_mut() += 1);
        let stored_before = s.storage().export_json().unwrap();

        assert!(create_sprint(&mut s, &wid(1), None).is_err());
        assert_eq!(*count.borrow(), 0);
        assert_eq!(s.storage().export_json().unwrap(), stored_before);
    }

    #[test]
    fn creation_notifies_once_with_consistent_state() {
        let mut s = store(2026);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        s.subscribe(move |event, data| {
            sink.borrow_mut().push((event.clone(), data.check_invariants().is_empty()));
        });
        let sprint = create_sprint(&mut s, &wid(20), None).unwrap();
        let seen = seen.borrow();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].0, StoreEvent::SprintCreated { sprint_id: sprint.id });
        assert!(seen[0].1);
    }

    #[test]
    fn colors_fill_palette_then_wrap() {
        let mut s = store(2024);
        let mut colors = Vec::new();
        for n in 0..8u32 {
            let start = format!("2024-W{:02}", n * 6 + 1);
            colors.push(create_sprint(&mut s, &start, None).unwrap().color_theme);
        }
        assert_eq!(colors, SprintColor::all());

        let third = s.sprints()[2].id.clone();
        assert!(delete_sprint(&mut s, &third));
        let reused = create_sprint(&mut s, "2024-W13", None).unwrap();
        assert_eq!(reused.color_theme, SprintColor::Emerald);
    }

    #[test]
    fn delete_releases_weeks_and_records_undo() {
        let mut s = store(2026);
        let sprint = create_sprint(&mut s, &wid(1), None).unwrap();
        assert!(delete_sprint(&mut s, &sprint.id));
        assert!(s.sprints().is_empty());
        assert!(s.weeks().iter().all(|w| w.sprint_id.is_none()));
        assert!(!delete_sprint(&mut s, &sprint.id));

        assert!(s.undo());
        assert_eq!(s.sprints().len(), 1);
        assert_eq!(s.weeks_by_sprint(&sprint.id).len(), 6);
    }

    #[test]
    fn update_patches_editable_fields() {
        let mut s = store(2026);
        let sprint = create_sprint(&mut s, &wid(1), None).unwrap();
        let patch = SprintPatch {
            title: Some("Billing".into()),
            goal_pitch: Some("Invoices in one click".into()),
            color_theme: Some(SprintColor::Cyan),
        };
        assert!(update_sprint(&mut s, &sprint.id, &patch));
        let updated = s.data().sprint(&sprint.id).unwrap();
        assert_eq!(updated.title, "Billing");
        assert_eq!(updated.color_theme, SprintColor::Cyan);
        assert_eq!(updated.week_ids, sprint.week_ids);
        assert!(!update_sprint(&mut s, "missing", &patch));
    }

    #[test]
    fn sorted_by_first_week() {
        let mut s = store(2026);
        let late = create_sprint(&mut s, &wid(30), None).unwrap();
        let early = create_sprint(&mut s, &wid(2), None).unwrap();
        let ids: Vec<&str> = sorted_sprints(s.data()).iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, [early.id.as_str(), late.id.as_str()]);
    }

    #[test]
    fn invariants_hold_across_mixed_operations() {
        let mut s = store(2026);
        let mut seed: u32 = 7;
        let mut next = move || {
            seed = seed.wrapping_mul(1_103_515_245).wrapping_add(12_345);
            (seed >> 16) % 52 + 1
        };
        for step in 0..300 {
            let week = wid(next());
            match step % 4 {
                0 => {
                    if let Ok(sprint) = create_sprint(&mut s, &week, None) {
                        assert_eq!(sprint.week_ids.len(), WEEKS_PER_SPRINT);
                    }
                }
                1 => {
                    s.toggle_vacation(&week);
                }
                2 => {
                    s.toggle_cooldown(&week);
                }
                _ => {
                    if let Some(id) = s.week(&week).and_then(|w| w.sprint_id.clone()) {
                        assert!(delete_sprint(&mut s, &id));
                    }
                }
            }
            let problems = s.data().check_invariants();
            assert!(problems.is_empty(), "step {step}: {problems:?}");
        }
    }

    #[test]
    fn seed_eight_cycles_is_back_to_back() {
        let mut s = store(2026);
        let task = s.add_task(&wid(9), "Keep me").unwrap();
        s.toggle_vacation(&wid(50));
        create_sprint(&mut s, &wid(20), None).unwrap();

        assert_eq!(seed_year_pattern(&mut s), 8);
        assert_eq!(s.sprints().len(), 8);
        assert_eq!(s.vacation_count(), 0);
        assert_eq!(s.cooldown_count(), 0);
        assert_eq!(s.available_weeks().len(), 52 - 48);
        assert_eq!(s.sprints()[1].week_ids[0], wid(7));
        assert_eq!(s.week(&wid(9)).unwrap().tasks[0].id, task.id);
        assert!(s.data().check_invariants().is_empty());

        assert!(s.undo());
        assert_eq!(s.sprints().len(), 1);
        assert_eq!(s.vacation_count(), 1);
    }

    #[test]
    fn seed_six_cycles_adds_cooldowns() {
        let mut s = store(2026);
        s.set_cycle_mode(CycleMode::SixCycles);
        assert_eq!(seed_year_pattern(&mut s), 6);
        assert_eq!(s.cooldown_count(), 12);
        assert_eq!(s.data().cooldown_week_ids[..2], [wid(7), wid(8)]);
        assert_eq!(s.sprints()[1].week_ids[0], wid(9));
        assert!(s.data().check_invariants().is_empty());
    }

    #[test]
    fn layout_stops_when_year_runs_out() {
        let slots = pattern_layout(20, CycleMode::SixCycles);
        assert_eq!(slots.len(), 2);
        assert_eq!(slots[1].sprint, 8..14);
        assert_eq!(slots[1].cooldown, 14..16);

        let tight = pattern_layout(13, CycleMode::SixCycles);
        assert_eq!(tight.len(), 1);
        assert_eq!(tight[0].cooldown, 6..8);
    }
}
