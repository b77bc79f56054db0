use crate::types::SprintColor;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sprint {
    pub id: String,
    pub title: String,
    pub goal_pitch: String,
    pub color_theme: SprintColor,
    /// Exactly six ids, in week order. Fixed at creation.
    pub week_ids: Vec<String>,
    pub year: i32,
    /// Creation sequence within the year.
    pub order: u32,
}

/// Editable sprint fields. Identity, year and week membership are not patchable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SprintPatch {
    pub title: Option<String>,
    pub goal_pitch: Option<String>,
    pub color_theme: Option<SprintColor>,
}

impl SprintPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.goal_pitch.is_none() && self.color_theme.is_none()
    }

    pub fn apply(&self, sprint: &mut Sprint) {
        if let Some(title) = &self.title {
            let trimmed = title.trim();
            if !trimmed.is_empty() {
                sprint.title = trimmed.to_string();
            }
        }
        if let Some(goal) = &self.goal_pitch {
            sprint.goal_pitch = goal.clone();
        }
        if let Some(color) = self.color_theme {
            sprint.color_theme = color;
        }
    }
}

/// First palette color not used by a live sprint. Once all eight are taken,
/// colors repeat by creation count.
pub fn next_color(sprints: &[Sprint]) -> SprintColor {
    let palette = SprintColor::all();
    palette
        .iter()
        .copied()
        .find(|c| sprints.iter().all(|s| s.color_theme != *c))
        .unwrap_or(palette[sprints.len() % palette.len()])
}

pub fn default_title(existing: usize) -> String {
    format!("Sprint {}", existing + 1)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn sprint(id: &str, color: SprintColor) -> Sprint {
        Sprint {
            id: id.to_string(),
            title: id.to_string(),
            goal_pitch: String::new(),
            color_theme: color,
            week_ids: Vec::new(),
            year: 2026,
            order: 0,
        }
    }

    #[test]
    fn next_color_picks_first_unused() {
        assert_eq!(next_color(&[]), SprintColor::Crimson);
        let live = [sprint("a", SprintColor::Crimson), sprint("b", SprintColor::Emerald)];
        assert_eq!(next_color(&live), SprintColor::Amber);
    }

    #[test]
    fn next_color_reuses_freed_color() {
        let live = [sprint("b", SprintColor::Amber)];
        assert_eq!(next_color(&live), SprintColor::Crimson);
    }

    #[test]
    fn next_color_cycles_when_exhausted() {
        let mut live: Vec<Sprint> = SprintColor::all()
            .iter()
            .enumerate()
            .map(|(i, c)| sprint(&i.to_string(), *c))
            .collect();
        assert_eq!(next_color(&live), SprintColor::Crimson);
        live.push(sprint("8", SprintColor::Crimson));
        assert_eq!(next_color(&live), SprintColor::Amber);
    }

    #[test]
    fn patch_keeps_title_non_empty() {
        let mut s = sprint("a", SprintColor::Rose);
        SprintPatch {
            title: Some("  ".into()),
            goal_pitch: Some("Ship onboarding".into()),
            color_theme: Some(SprintColor::Cyan),
        }
        .apply(&mut s);
        assert_eq!(s.title, "a");
        assert_eq!(s.goal_pitch, "Ship onboarding");
        assert_eq!(s.color_theme, SprintColor::Cyan);
    }

    #[test]
    fn default_title_is_one_based() {
        assert_eq!(default_title(0), "Sprint 1");
        assert_eq!(default_title(3), "Sprint 4");
    }
}
