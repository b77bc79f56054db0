use serde::Serialize;
use shapeup_core::model::{Week, YearData};

pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{json}");
    Ok(())
}

/// Print rows as left-aligned columns under a dashed header.
pub fn print_table(headers: &[&str], rows: Vec<Vec<String>>) {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in &rows {
        for (i, cell) in row.iter().enumerate().take(widths.len()) {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }

    let line = |cells: Vec<String>| {
        let padded: Vec<String> = cells
            .into_iter()
            .enumerate()
            .map(|(i, cell)| {
                let w = widths.get(i).copied().unwrap_or(0);
                format!("{cell:w$}")
            })
            .collect();
        println!("{}", padded.join("  ").trim_end());
    };

    line(headers.iter().map(|h| h.to_string()).collect());
    line(widths.iter().map(|&w| "-".repeat(w)).collect());
    for row in rows {
        line(row);
    }
}

/// What occupies a week: the owning sprint's title, a vacation, a cooldown,
/// or nothing.
pub fn week_status(data: &YearData, week: &Week) -> String {
    if let Some(sid) = &week.sprint_id {
        return match data.sprint(sid) {
            Some(s) => format!("sprint: {}", s.title),
            None => format!("sprint: {sid}"),
        };
    }
    if week.is_vacation {
        return "vacation".to_string();
    }
    if week.is_cooldown {
        return "cooldown".to_string();
    }
    "free".to_string()
}

pub fn date_range(week: &Week) -> String {
    format!(
        "{} to {}",
        week.start_date.format("%b %d"),
        week.end_date.format("%b %d")
    )
}
