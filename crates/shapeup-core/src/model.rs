//! The planner's data model: one [`YearData`] aggregate per calendar year.
//!
//! Every mutation here is a plain method on `&mut YearData` that updates the
//! per-week flags and the denormalized `vacation_week_ids` /
//! `cooldown_week_ids` indices together. Persistence and change notification
//! live one level up in [`crate::store`].

use crate::sprint::{Sprint, SprintPatch};
use crate::task::{self, Task, TaskPatch};
use crate::types::{MAX_VACATION_WEEKS, WEEKS_PER_SPRINT};
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

// ---------------------------------------------------------------------------
// Week
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Week {
    pub id: String,
    pub week_number: u32,
    pub year: i32,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub is_vacation: bool,
    #[serde(default)]
    pub is_cooldown: bool,
    pub sprint_id: Option<String>,
    #[serde(default)]
    pub tasks: Vec<Task>,
    pub order: u32,
}

impl Week {
    pub fn new(year: i32, week_number: u32, start_date: NaiveDate) -> Self {
        Self {
            id: format_week_id(year, week_number),
            week_number,
            year,
            start_date,
            end_date: start_date + Duration::days(6),
            is_vacation: false,
            is_cooldown: false,
            sprint_id: None,
            tasks: Vec::new(),
            order: week_number,
        }
    }

    /// No sprint, vacation or cooldown claim.
    pub fn is_unassigned(&self) -> bool {
        self.sprint_id.is_none() && !self.is_vacation && !self.is_cooldown
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }
}

pub fn format_week_id(year: i32, week_number: u32) -> String {
    format!("{year}-W{week_number:02}")
}

// ---------------------------------------------------------------------------
// YearData
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YearData {
    pub year: i32,
    pub weeks: Vec<Week>,
    #[serde(default)]
    pub sprints: Vec<Sprint>,
    #[serde(default)]
    pub vacation_week_ids: Vec<String>,
    #[serde(default)]
    pub cooldown_week_ids: Vec<String>,
}

impl YearData {
    pub fn empty(year: i32) -> Self {
        Self {
            year,
            weeks: Vec::new(),
            sprints: Vec::new(),
            vacation_week_ids: Vec::new(),
            cooldown_week_ids: Vec::new(),
        }
    }

    // -----------------------------------------------------------------------
    // Lookups
    // -----------------------------------------------------------------------

    pub fn week(&self, week_id: &str) -> Option<&Week> {
        self.weeks.iter().find(|w| w.id == week_id)
    }

    pub fn week_index(&self, week_id: &str) -> Option<usize> {
        self.weeks.iter().position(|w| w.id == week_id)
    }

    fn week_mut(&mut self, week_id: &str) -> Option<&mut Week> {
        self.weeks.iter_mut().find(|w| w.id == week_id)
    }

    pub fn sprint(&self, sprint_id: &str) -> Option<&Sprint> {
        self.sprints.iter().find(|s| s.id == sprint_id)
    }

    pub fn weeks_by_sprint(&self, sprint_id: &str) -> Vec<&Week> {
        self.weeks
            .iter()
            .filter(|w| w.sprint_id.as_deref() == Some(sprint_id))
            .collect()
    }

    /// Weeks a new sprint could claim: no sprint, vacation or cooldown.
    pub fn available_weeks(&self) -> Vec<&Week> {
        self.weeks.iter().filter(|w| w.is_unassigned()).collect()
    }

    pub fn vacation_count(&self) -> usize {
        self.vacation_week_ids.len()
    }

    pub fn cooldown_count(&self) -> usize {
        self.cooldown_week_ids.len()
    }

    pub fn can_add_vacation(&self) -> bool {
        self.vacation_count() < MAX_VACATION_WEEKS
    }

    pub fn find_task(&self, task_id: &str) -> Option<&Task> {
        self.weeks
            .iter()
            .flat_map(|w| w.tasks.iter())
            .find(|t| t.id == task_id)
    }

    // -----------------------------------------------------------------------
    // Week claims
    // -----------------------------------------------------------------------

    /// Flip the vacation flag. Returns `false` when the change was refused.
    pub fn toggle_vacation(&mut self, week_id: &str) -> bool {
        let can_add = self.can_add_vacation();
        let Some(week) = self.week_mut(week_id) else {
            return false;
        };

        if week.is_vacation {
            week.is_vacation = false;
            self.vacation_week_ids.retain(|id| id != week_id);
            return true;
        }

        if !can_add || week.sprint_id.is_some() || week.is_cooldown {
            return false;
        }
        week.is_vacation = true;
        self.vacation_week_ids.push(week_id.to_string());
        true
    }

    /// Flip the cooldown flag. Cooldowns are unbounded but never overlap a
    /// sprint or vacation claim.
    pub fn toggle_cooldown(&mut self, week_id: &str) -> bool {
        let Some(week) = self.week_mut(week_id) else {
            return false;
        };

        if week.is_cooldown {
            week.is_cooldown = false;
            self.cooldown_week_ids.retain(|id| id != week_id);
            return true;
        }

        if week.sprint_id.is_some() || week.is_vacation {
            return false;
        }
        week.is_cooldown = true;
        self.cooldown_week_ids.push(week_id.to_string());
        true
    }

    /// Unconditional setter for the week's sprint back-reference.
    pub fn assign_week_to_sprint(&mut self, week_id: &str, sprint_id: Option<&str>) -> bool {
        match self.week_mut(week_id) {
            Some(week) => {
                week.sprint_id = sprint_id.map(str::to_string);
                true
            }
            None => false,
        }
    }

    /// Drop every sprint, vacation and cooldown claim. Tasks are kept.
    pub fn clear_claims(&mut self) {
        for week in &mut self.weeks {
            week.sprint_id = None;
            week.is_vacation = false;
            week.is_cooldown = false;
        }
        self.sprints.clear();
        self.vacation_week_ids.clear();
        self.cooldown_week_ids.clear();
    }

    // -----------------------------------------------------------------------
    // Tasks
    // -----------------------------------------------------------------------

    pub fn add_task(&mut self, week_id: &str, title: &str) -> Option<Task> {
        let title = title.trim();
        if title.is_empty() {
            return None;
        }
        let week = self.week_mut(week_id)?;
        let task = Task::new(title, week_id);
        week.tasks.push(task.clone());
        Some(task)
    }

    pub fn update_task(&mut self, week_id: &str, task_id: &str, patch: &TaskPatch) -> bool {
        let Some(week) = self.week_mut(week_id) else {
            return false;
        };
        match task::find_mut(&mut week.tasks, task_id) {
            Some(t) => {
                patch.apply(t);
                true
            }
            None => false,
        }
    }

    pub fn delete_task(&mut self, week_id: &str, task_id: &str) -> Option<Task> {
        let week = self.week_mut(week_id)?;
        task::take(&mut week.tasks, task_id)
    }

    /// Re-parent a task, appending it to the destination week.
    pub fn move_task(&mut self, task_id: &str, from_week_id: &str, to_week_id: &str) -> bool {
        let (Some(from), Some(to)) = (self.week_index(from_week_id), self.week_index(to_week_id))
        else {
            return false;
        };
        let Some(mut moved) = task::take(&mut self.weeks[from].tasks, task_id) else {
            return false;
        };
        moved.week_id = to_week_id.to_string();
        self.weeks[to].tasks.push(moved);
        true
    }

    // -----------------------------------------------------------------------
    // Sprints (structural only; week membership is the allocator's job)
    // -----------------------------------------------------------------------

    pub fn add_sprint(&mut self, sprint: Sprint) {
        self.sprints.push(sprint);
    }

    pub fn update_sprint(&mut self, sprint_id: &str, patch: &SprintPatch) -> bool {
        match self.sprints.iter_mut().find(|s| s.id == sprint_id) {
            Some(s) => {
                patch.apply(s);
                true
            }
            None => false,
        }
    }

    pub fn remove_sprint(&mut self, sprint_id: &str) -> Option<Sprint> {
        let idx = self.sprints.iter().position(|s| s.id == sprint_id)?;
        Some(self.sprints.remove(idx))
    }

    // -----------------------------------------------------------------------
    // Consistency
    // -----------------------------------------------------------------------

    /// Recompute the vacation and cooldown indices from the per-week flags.
    /// Existing index order is kept for ids that are still flagged.
    /// Returns `true` when either index changed.
    pub fn rebuild_indices(&mut self) -> bool {
        let vacation: Vec<&str> = self
            .weeks
            .iter()
            .filter(|w| w.is_vacation)
            .map(|w| w.id.as_str())
            .collect();
        let cooldown: Vec<&str> = self
            .weeks
            .iter()
            .filter(|w| w.is_cooldown)
            .map(|w| w.id.as_str())
            .collect();

        let new_vacation = reconcile(&self.vacation_week_ids, &vacation);
        let new_cooldown = reconcile(&self.cooldown_week_ids, &cooldown);
        let changed =
            new_vacation != self.vacation_week_ids || new_cooldown != self.cooldown_week_ids;
        self.vacation_week_ids = new_vacation;
        self.cooldown_week_ids = new_cooldown;
        changed
    }

    /// Describe every violated invariant. Empty means the aggregate is consistent.
    pub fn check_invariants(&self) -> Vec<String> {
        let mut problems = Vec::new();

        // 1. Contiguous, ordered, unique weeks.
        let mut seen = HashSet::new();
        for (i, week) in self.weeks.iter().enumerate() {
            let expected = i as u32 + 1;
            if week.week_number != expected {
                problems.push(format!(
                    "week at position {} has number {} (expected {expected})",
                    i, week.week_number
                ));
            }
            if !seen.insert(week.id.as_str()) {
                problems.push(format!("duplicate week id {}", week.id));
            }
            if week.end_date != week.start_date + Duration::days(6) {
                problems.push(format!("week {} does not span seven days", week.id));
            }
        }

        // 2. At most one claim per week.
        for week in &self.weeks {
            let claims = [week.sprint_id.is_some(), week.is_vacation, week.is_cooldown]
                .iter()
                .filter(|c| **c)
                .count();
            if claims > 1 {
                problems.push(format!("week {} has {claims} claims", week.id));
            }
        }

        // 3. Indices match flags.
        check_index(
            &mut problems,
            "vacation",
            &self.vacation_week_ids,
            self.weeks.iter().filter(|w| w.is_vacation),
        );
        check_index(
            &mut problems,
            "cooldown",
            &self.cooldown_week_ids,
            self.weeks.iter().filter(|w| w.is_cooldown),
        );

        // 4. Vacation capacity.
        if self.vacation_week_ids.len() > MAX_VACATION_WEEKS {
            problems.push(format!(
                "{} vacation weeks exceeds the limit of {MAX_VACATION_WEEKS}",
                self.vacation_week_ids.len()
            ));
        }

        // 5. Sprint membership is bidirectional.
        for sprint in &self.sprints {
            if sprint.week_ids.len() != WEEKS_PER_SPRINT {
                problems.push(format!(
                    "sprint {} has {} weeks",
                    sprint.id,
                    sprint.week_ids.len()
                ));
            }
            for week_id in &sprint.week_ids {
                match self.week(week_id) {
                    Some(w) if w.sprint_id.as_deref() == Some(sprint.id.as_str()) => {}
                    Some(_) => problems.push(format!(
                        "week {week_id} does not point back to sprint {}",
                        sprint.id
                    )),
                    None => problems.push(format!(
                        "sprint {} references missing week {week_id}",
                        sprint.id
                    )),
                }
            }
        }
        for week in &self.weeks {
            if let Some(sid) = &week.sprint_id {
                let owned = self
                    .sprint(sid)
                    .is_some_and(|s| s.week_ids.iter().any(|id| *id == week.id));
                if !owned {
                    problems.push(format!("week {} points at unknown sprint {sid}", week.id));
                }
            }
        }

        problems
    }
}

fn reconcile(existing: &[String], flagged: &[&str]) -> Vec<String> {
    let flagged_set: HashSet<&str> = flagged.iter().copied().collect();
    let mut out: Vec<String> = Vec::with_capacity(flagged.len());
    for id in existing {
        if flagged_set.contains(id.as_str()) && !out.contains(id) {
            out.push(id.clone());
        }
    }
    for id in flagged {
        if !out.iter().any(|o| o == id) {
            out.push((*id).to_string());
        }
    }
    out
}

fn check_index<'a>(
    problems: &mut Vec<String>,
    label: &str,
    index: &[String],
    flagged: impl Iterator<Item = &'a Week>,
) {
    let from_flags: HashSet<&str> = flagged.map(|w| w.id.as_str()).collect();
    let from_index: HashSet<&str> = index.iter().map(String::as_str).collect();
    if from_index.len() != index.len() {
        problems.push(format!("{label} index contains duplicates"));
    }
    if from_flags != from_index {
        problems.push(format!("{label} index does not match week flags"));
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
