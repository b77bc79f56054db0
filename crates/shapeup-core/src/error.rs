use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlannerError {
    #[error("storage error: {0}")]
    Storage(String),

    #[error("storage quota exceeded")]
    QuotaExceeded,

    #[error("invalid import file: {0}")]
    InvalidImport(String),

    #[error("year not found: {0}")]
    YearNotFound(i32),

    #[error("year {0} is outside the supported range 1000..=9999")]
    InvalidYear(i32),

    #[error("week not found: {0}")]
    WeekNotFound(String),

    #[error("sprint not found: {0}")]
    SprintNotFound(String),

    #[error("task not found: {0}")]
    TaskNotFound(String),

    #[error("invalid week id '{0}': expected YYYY-Wnn")]
    InvalidWeekId(String),

    #[error("invalid cycle mode '{0}': expected '6-cycles' or '8-cycles'")]
    InvalidCycleMode(String),

    #[error("invalid sprint color: {0}")]
    InvalidColor(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, PlannerError>;
