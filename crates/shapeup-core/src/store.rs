//! The live planner state for one year.
//!
//! [`YearStore`] owns the current [`YearData`] and is the only way to mutate
//! it. Every command applies all of its field writes, then saves the whole
//! snapshot through the [`Storage`] gateway, then notifies subscribers once.
//! A subscriber therefore never sees a half-applied command (for example a
//! sprint registered while its weeks are still unassigned).
//!
//! Saving is best-effort: when the backend refuses a write the in-memory
//! change stands, the failure is logged and [`YearStore::last_persist_ok`]
//! reports it.

use crate::calendar;
use crate::error::Result;
use crate::model::{Week, YearData};
use crate::sprint::{Sprint, SprintPatch};
use crate::storage::{KvStore, Storage};
use crate::task::{Task, TaskPatch};
use crate::types::CycleMode;

// ---------------------------------------------------------------------------
// Events and subscriptions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    YearLoaded { year: i32 },
    VacationToggled { week_id: String, on: bool },
    CooldownToggled { week_id: String, on: bool },
    WeekAssigned { week_id: String, sprint_id: Option<String> },
    TaskAdded { week_id: String, task_id: String },
    TaskUpdated { week_id: String, task_id: String },
    TaskDeleted { week_id: String, task_id: String },
    TaskMoved { task_id: String, from: String, to: String },
    SprintAdded { sprint_id: String },
    SprintUpdated { sprint_id: String },
    SprintRemoved { sprint_id: String },
    SprintCreated { sprint_id: String },
    SprintDeleted { sprint_id: String },
    PatternSeeded { mode: CycleMode, sprints: usize },
    CycleModeChanged { mode: CycleMode },
    Undone { year: i32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn FnMut(&StoreEvent, &YearData)>;

// ---------------------------------------------------------------------------
// YearStore
// ---------------------------------------------------------------------------

pub struct YearStore<K: KvStore> {
    storage: Storage<K>,
    data: YearData,
    cycle_mode: CycleMode,
    undo: Vec<YearData>,
    undo_depth: usize,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_subscription: u64,
    last_persist_ok: bool,
}

const DEFAULT_UNDO_DEPTH: usize = 20;

impl<K: KvStore> YearStore<K> {
    /// Open the store on `year`, or on the stored current year, or on this
    /// calendar year. A year with no stored snapshot is generated and saved.
    /// Fails with [`crate::PlannerError::InvalidYear`] for an explicit year outside
    /// the supported range; an unusable stored preference is ignored.
    pub fn open(storage: Storage<K>, year: Option<i32>) -> Result<Self> {
        if let Some(year) = year {
            calendar::check_year(year)?;
        }
        let year = year
            .or_else(|| {
                storage
                    .load_current_year()
                    .filter(|y| calendar::is_supported_year(*y))
            })
            .unwrap_or_else(calendar::current_year);
        let cycle_mode = storage.load_cycle_mode();
        let undo: Vec<YearData> = storage
            .load_undo()
            .into_iter()
            .filter(|snapshot| snapshot.year == year)
            .collect();

        let mut store = Self {
            storage,
            data: YearData::empty(year),
            cycle_mode,
            undo,
            undo_depth: DEFAULT_UNDO_DEPTH,
            listeners: Vec::new(),
            next_subscription: 0,
            last_persist_ok: true,
        };
        store.data = store.load_or_generate(year)?;
        store.storage.save_current_year(year);
        Ok(store)
    }

    pub fn with_undo_depth(mut self, depth: usize) -> Self {
        self.undo_depth = depth;
        self.trim_undo();
        self
    }

    fn load_or_generate(&mut self, year: i32) -> Result<YearData> {
        if let Some(stored) = self.storage.load_year(year) {
            return Ok(stored);
        }
        tracing::debug!(year, "no stored data; generating year");
        let generated = calendar::generate_year(year)?;
        self.last_persist_ok = self.storage.save_year(&generated);
        Ok(generated)
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    pub fn data(&self) -> &YearData {
        &self.data
    }

    pub fn year(&self) -> i32 {
        self.data.year
    }

    pub fn weeks(&self) -> &[Week] {
        &self.data.weeks
    }

    pub fn sprints(&self) -> &[Sprint] {
        &self.data.sprints
    }

    pub fn week(&self, week_id: &str) -> Option<&Week> {
        self.data.week(week_id)
    }

    pub fn weeks_by_sprint(&self, sprint_id: &str) -> Vec<&Week> {
        self.data.weeks_by_sprint(sprint_id)
    }

    pub fn available_weeks(&self) -> Vec<&Week> {
        self.data.available_weeks()
    }

    pub fn vacation_count(&self) -> usize {
        self.data.vacation_count()
    }

    pub fn cooldown_count(&self) -> usize {
        self.data.cooldown_count()
    }

    pub fn can_add_vacation(&self) -> bool {
        self.data.can_add_vacation()
    }

    pub fn cycle_mode(&self) -> CycleMode {
        self.cycle_mode
    }

    pub fn undo_len(&self) -> usize {
        self.undo.len()
    }

    /// Whether the most recent save reached the backend.
    pub fn last_persist_ok(&self) -> bool {
        self.last_persist_ok
    }

    pub fn storage(&self) -> &Storage<K> {
        &self.storage
    }

    pub fn storage_mut(&mut self) -> &mut Storage<K> {
        &mut self.storage
    }

    pub fn into_storage(self) -> Storage<K> {
        self.storage
    }

    // -----------------------------------------------------------------------
    // Subscriptions
    // -----------------------------------------------------------------------

    pub fn subscribe(
        &mut self,
        listener: impl FnMut(&StoreEvent, &YearData) + 'static,
    ) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sid, _)| *sid != id);
        self.listeners.len() < before
    }

    fn notify(&mut self, event: &StoreEvent) {
        for (_, listener) in self.listeners.iter_mut() {
            listener(event, &self.data);
        }
    }

    fn commit(&mut self, event: StoreEvent) {
        self.last_persist_ok = self.storage.save_year(&self.data);
        self.notify(&event);
    }

    /// Apply `f` as a single atomic command: one save, one notification.
    pub fn transact<T>(&mut self, event: StoreEvent, f: impl FnOnce(&mut YearData) -> T) -> T {
        let out = f(&mut self.data);
        self.commit(event);
        out
    }

    // -----------------------------------------------------------------------
    // Year and preferences
    // -----------------------------------------------------------------------

    /// Make `year` the live year. Undo history does not carry across years.
    /// An unsupported year leaves the store untouched.
    pub fn set_year(&mut self, year: i32) -> Result<()> {
        if year == self.data.year {
            return Ok(());
        }
        self.data = self.load_or_generate(year)?;
        self.storage.save_current_year(year);
        self.undo.clear();
        self.storage.save_undo(&self.undo);
        tracing::debug!(year, "switched year");
        self.notify(&StoreEvent::YearLoaded { year });
        Ok(())
    }

    pub fn set_cycle_mode(&mut self, mode: CycleMode) {
        self.cycle_mode = mode;
        self.last_persist_ok = self.storage.save_cycle_mode(mode);
        self.notify(&StoreEvent::CycleModeChanged { mode });
    }

    // -----------------------------------------------------------------------
    // Week claims
    // -----------------------------------------------------------------------

    pub fn toggle_vacation(&mut self, week_id: &str) -> bool {
        if !self.data.toggle_vacation(week_id) {
            tracing::debug!(week_id, "vacation toggle not applied");
            return false;
        }
        let on = self.data.week(week_id).is_some_and(|w| w.is_vacation);
        self.commit(StoreEvent::VacationToggled {
            week_id: week_id.to_string(),
            on,
        });
        true
    }

    pub fn toggle_cooldown(&mut self, week_id: &str) -> bool {
        if !self.data.toggle_cooldown(week_id) {
            tracing::debug!(week_id, "cooldown toggle not applied");
            return false;
        }
        let on = self.data.week(week_id).is_some_and(|w| w.is_cooldown);
        self.commit(StoreEvent::CooldownToggled {
            week_id: week_id.to_string(),
            on,
        });
        true
    }

    /// Set or clear a week's sprint back-reference. Callers keep sprint
    /// membership consistent; this setter does not check claims.
    pub fn assign_week_to_sprint(&mut self, week_id: &str, sprint_id: Option<&str>) {
        if self.data.assign_week_to_sprint(week_id, sprint_id) {
            self.commit(StoreEvent::WeekAssigned {
                week_id: week_id.to_string(),
                sprint_id: sprint_id.map(str::to_string),
            });
        }
    }

    // -----------------------------------------------------------------------
    // Tasks
    // -----------------------------------------------------------------------

    pub fn add_task(&mut self, week_id: &str, title: &str) -> Option<Task> {
        let task = self.data.add_task(week_id, title)?;
        self.commit(StoreEvent::TaskAdded {
            week_id: week_id.to_string(),
            task_id: task.id.clone(),
        });
        Some(task)
    }

    pub fn update_task(&mut self, week_id: &str, task_id: &str, patch: &TaskPatch) -> bool {
        if !self.data.update_task(week_id, task_id, patch) {
            return false;
        }
        self.commit(StoreEvent::TaskUpdated {
            week_id: week_id.to_string(),
            task_id: task_id.to_string(),
        });
        true
    }

    pub fn delete_task(&mut self, week_id: &str, task_id: &str) -> bool {
        let exists = self
            .data
            .week(week_id)
            .is_some_and(|w| w.tasks.iter().any(|t| t.id == task_id));
        if !exists {
            return false;
        }
        self.checkpoint();
        self.data.delete_task(week_id, task_id);
        self.commit(StoreEvent::TaskDeleted {
            week_id: week_id.to_string(),
            task_id: task_id.to_string(),
        });
        true
    }

    pub fn move_task(&mut self, task_id: &str, from_week_id: &str, to_week_id: &str) -> bool {
        if !self.data.move_task(task_id, from_week_id, to_week_id) {
            return false;
        }
        self.commit(StoreEvent::TaskMoved {
            task_id: task_id.to_string(),
            from: from_week_id.to_string(),
            to: to_week_id.to_string(),
        });
        true
    }

    // -----------------------------------------------------------------------
    // Sprints (structural)
    // -----------------------------------------------------------------------

    pub fn add_sprint(&mut self, sprint: Sprint) {
        let sprint_id = sprint.id.clone();
        self.data.add_sprint(sprint);
        self.commit(StoreEvent::SprintAdded { sprint_id });
    }

    pub fn update_sprint_data(&mut self, sprint_id: &str, patch: &SprintPatch) -> bool {
        if !self.data.update_sprint(sprint_id, patch) {
            return false;
        }
        self.commit(StoreEvent::SprintUpdated {
            sprint_id: sprint_id.to_string(),
        });
        true
    }

    /// Drop the sprint record only. Member weeks keep their back-reference.
    pub fn remove_sprint(&mut self, sprint_id: &str) -> Option<Sprint> {
        let removed = self.data.remove_sprint(sprint_id)?;
        self.commit(StoreEvent::SprintRemoved {
            sprint_id: sprint_id.to_string(),
        });
        Some(removed)
    }

    // -----------------------------------------------------------------------
    // Undo
    // -----------------------------------------------------------------------

    /// Record the current state so the next [`YearStore::undo`] can restore it.
    pub fn checkpoint(&mut self) {
        if self.undo_depth == 0 {
            return;
        }
        self.undo.push(self.data.clone());
        self.trim_undo();
        self.storage.save_undo(&self.undo);
    }

    fn trim_undo(&mut self) {
        if self.undo.len() > self.undo_depth {
            let excess = self.undo.len() - self.undo_depth;
            self.undo.drain(..excess);
        }
    }

    /// Restore the most recent checkpoint. Returns `false` when there is none.
    pub fn undo(&mut self) -> bool {
        let Some(snapshot) = self.undo.pop() else {
            return false;
        };
        self.data = snapshot;
        self.storage.save_undo(&self.undo);
        let year = self.data.year;
        self.commit(StoreEvent::Undone { year });
        true
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
