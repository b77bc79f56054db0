use serde::{Deserialize, Serialize};
use std::fmt;

/// Upper bound on vacation weeks within one year.
pub const MAX_VACATION_WEEKS: usize = 5;

/// Every sprint claims exactly this many weeks.
pub const WEEKS_PER_SPRINT: usize = 6;

// ---------------------------------------------------------------------------
// SprintColor
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SprintColor {
    Crimson,
    Amber,
    Emerald,
    Azure,
    Violet,
    Slate,
    Rose,
    Cyan,
}

impl SprintColor {
    /// The fixed palette, in allocation order.
    pub fn all() -> &'static [SprintColor] {
        &[
            SprintColor::Crimson,
            SprintColor::Amber,
            SprintColor::Emerald,
            SprintColor::Azure,
            SprintColor::Violet,
            SprintColor::Slate,
            SprintColor::Rose,
            SprintColor::Cyan,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SprintColor::Crimson => "crimson",
            SprintColor::Amber => "amber",
            SprintColor::Emerald => "emerald",
            SprintColor::Azure => "azure",
            SprintColor::Violet => "violet",
            SprintColor::Slate => "slate",
            SprintColor::Rose => "rose",
            SprintColor::Cyan => "cyan",
        }
    }
}

impl fmt::Display for SprintColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SprintColor {
    type Err = crate::error::PlannerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SprintColor::all()
            .iter()
            .copied()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| crate::error::PlannerError::InvalidColor(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// CycleMode
// ---------------------------------------------------------------------------

/// Year-level planning template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CycleMode {
    /// Six sprints, each followed by a two-week cooldown.
    #[serde(rename = "6-cycles")]
    SixCycles,
    /// Eight back-to-back sprints; breaks are taken as vacation weeks.
    #[default]
    #[serde(rename = "8-cycles")]
    EightCycles,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CycleModeInfo {
    pub label: &'static str,
    pub description: &'static str,
    pub sprints: usize,
    pub cooldown_weeks: usize,
}

impl CycleMode {
    pub fn as_str(self) -> &'static str {
        match self {
            CycleMode::SixCycles => "6-cycles",
            CycleMode::EightCycles => "8-cycles",
        }
    }

    pub fn info(self) -> CycleModeInfo {
        match self {
            CycleMode::SixCycles => CycleModeInfo {
                label: "6 Cycles",
                description: "6 sprints + 2-week cooldowns",
                sprints: 6,
                cooldown_weeks: 2,
            },
            CycleMode::EightCycles => CycleModeInfo {
                label: "8 Cycles",
                description: "8 sprints + vacation weeks",
                sprints: 8,
                cooldown_weeks: 0,
            },
        }
    }

    pub fn toggled(self) -> CycleMode {
        match self {
            CycleMode::SixCycles => CycleMode::EightCycles,
            CycleMode::EightCycles => CycleMode::SixCycles,
        }
    }
}

impl fmt::Display for CycleMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for CycleMode {
    type Err = crate::error::PlannerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "6-cycles" => Ok(CycleMode::SixCycles),
            "8-cycles" => Ok(CycleMode::EightCycles),
            _ => Err(crate::error::PlannerError::InvalidCycleMode(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
