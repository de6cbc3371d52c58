//! Weekly timetable parsing.
//!
//! Faculty paste their timetable as a tab-separated grid:
//! 1. theory period start times, 2. theory period end times,
//! 3. lab period start times, 4. lab period end times,
//! then two rows per weekday in MON..FRI order (theory classes, lab classes).
//!
//! Every row reserves a column holding the literal `Lunch`; it carries no
//! timing or class value and is dropped positionally from each row so the
//! remaining columns stay aligned. Rows are validated against the period
//! count declared by the timing rows and a mismatch fails the whole parse.

mod error;
mod split;
mod types;

pub use error::TimetableError;
pub use split::{split_all_slots_by_duration, split_slot_by_duration};
pub use types::{FreeSlot, PeriodTiming, Schedule, TimeOfDay, Weekday};

use std::collections::BTreeMap;

// 4 timing rows plus two rows for each weekday.
const MIN_LINES: usize = 12;

// Leading label fields per row kind, e.g. "THEORY\tStart", "End", "MON\tLAB".
const START_ROW_LABELS: usize = 2;
const END_ROW_LABELS: usize = 1;
const CLASS_ROW_LABELS: usize = 2;

const LUNCH_MARKER: &str = "Lunch";

// Periods whose boundaries sit entirely inside this window are the lunch
// break and never become candidates.
const LUNCH_WINDOW_START: TimeOfDay = TimeOfDay::from_minutes(13 * 60 + 25);
const LUNCH_WINDOW_END: TimeOfDay = TimeOfDay::from_minutes(14 * 60);

/// The timing tables declared by the four header rows.
#[derive(Debug, Clone)]
struct GridLayout {
    theory: Vec<PeriodTiming>,
    lab: Vec<PeriodTiming>,
}

impl GridLayout {
    fn period_count(&self) -> usize {
        self.theory.len()
    }

    /// Effective time window of a lab starting at period `i`.
    ///
    /// Lab sessions occupy two consecutive periods, so the window runs to the
    /// end of period `i + 1` when one exists.
    fn lab_window(&self, i: usize) -> (TimeOfDay, TimeOfDay) {
        let end = if i + 1 < self.lab.len() {
            self.lab[i + 1].end
        } else {
            self.lab[i].end
        };
        (self.lab[i].start, end)
    }
}

/// Checks whether a grid cell is occupied by a room-booked session.
///
/// Only values carrying both a `-` and the `-ALL` suffix count; a bare
/// course code is a regular theory class and stays bookable.
pub fn is_occupied_cell(cell: &str) -> bool {
    !cell.is_empty() && cell.contains('-') && cell.contains("-ALL")
}

/// Parses a pasted timetable into per-day free review-slot candidates.
///
/// # Returns
/// * `Ok(Schedule)` - free slots per weekday, sorted by start time
/// * `Err(TimetableError)` - the grid was structurally invalid; nothing
///   partial is ever returned
pub fn parse_timetable(raw: &str) -> Result<Schedule, TimetableError> {
    let lines: Vec<&str> = raw.lines().map(str::trim).filter(|l| !l.is_empty()).collect();

    if lines.len() < MIN_LINES {
        return Err(TimetableError::InsufficientData);
    }

    let layout = parse_layout(&lines[..4])?;

    let mut days = BTreeMap::new();
    let mut line_idx = 4;

    for day in Weekday::ALL {
        if line_idx + 1 >= lines.len() {
            return Err(TimetableError::MissingDay { day });
        }

        let theory_cells = class_cells(
            lines[line_idx],
            layout.period_count(),
            format!("{day} theory row"),
        )?;
        let lab_cells = class_cells(
            lines[line_idx + 1],
            layout.period_count(),
            format!("{day} lab row"),
        )?;

        days.insert(day, free_slots_for_day(day, &layout, &theory_cells, &lab_cells));
        line_idx += 2;
    }

    Ok(Schedule::new(days))
}

/// Splits a row into its period fields: tab-separated, leading labels
/// stripped, the reserved Lunch column dropped.
fn row_fields(line: &str, label_fields: usize) -> Vec<&str> {
    line.split('\t')
        .skip(label_fields)
        .filter(|f| f.trim() != LUNCH_MARKER)
        .map(str::trim)
        .collect()
}

fn parse_timing_row(
    line: &str,
    label_fields: usize,
    row: &str,
) -> Result<Vec<TimeOfDay>, TimetableError> {
    let mut fields = row_fields(line, label_fields);
    // Pasted rows often end with stray tabs; trailing empties are not cells.
    while fields.last() == Some(&"") {
        fields.pop();
    }

    fields
        .into_iter()
        .map(|f| {
            f.parse().map_err(|_| TimetableError::BadTime {
                value: f.to_string(),
                row: row.to_string(),
            })
        })
        .collect()
}

fn parse_layout(header_lines: &[&str]) -> Result<GridLayout, TimetableError> {
    let theory_start = parse_timing_row(header_lines[0], START_ROW_LABELS, "theory start row")?;
    let theory_end = parse_timing_row(header_lines[1], END_ROW_LABELS, "theory end row")?;
    let lab_start = parse_timing_row(header_lines[2], START_ROW_LABELS, "lab start row")?;
    let lab_end = parse_timing_row(header_lines[3], END_ROW_LABELS, "lab end row")?;

    let expected = theory_start.len();
    if expected == 0 {
        return Err(TimetableError::InsufficientData);
    }

    for (row, found) in [
        ("theory end row", theory_end.len()),
        ("lab start row", lab_start.len()),
        ("lab end row", lab_end.len()),
    ] {
        if found != expected {
            return Err(TimetableError::ColumnMismatch {
                row: row.to_string(),
                expected,
                found,
            });
        }
    }

    let theory = theory_start
        .into_iter()
        .zip(theory_end)
        .map(|(start, end)| PeriodTiming { start, end })
        .collect();
    let lab = lab_start
        .into_iter()
        .zip(lab_end)
        .map(|(start, end)| PeriodTiming { start, end })
        .collect();

    Ok(GridLayout { theory, lab })
}

/// Extracts the class cells of a weekday row, validated against the period
/// count. Extra fields are tolerated only when empty (stray trailing tabs).
fn class_cells(
    line: &str,
    period_count: usize,
    row: String,
) -> Result<Vec<String>, TimetableError> {
    let fields = row_fields(line, CLASS_ROW_LABELS);

    if fields.len() < period_count || fields[period_count..].iter().any(|f| !f.is_empty()) {
        return Err(TimetableError::ColumnMismatch {
            row,
            expected: period_count,
            found: fields.len(),
        });
    }

    Ok(fields[..period_count].iter().map(|f| f.to_string()).collect())
}

/// Checks whether a theory period boundary falls inside any occupied lab
/// session for the day.
fn time_in_lab_session(time: TimeOfDay, layout: &GridLayout, lab_cells: &[String]) -> bool {
    lab_cells.iter().enumerate().any(|(i, cell)| {
        if !is_occupied_cell(cell) {
            return false;
        }
        let (lab_start, lab_end) = layout.lab_window(i);
        lab_start <= time && time <= lab_end
    })
}

fn free_slots_for_day(
    day: Weekday,
    layout: &GridLayout,
    theory_cells: &[String],
    lab_cells: &[String],
) -> Vec<FreeSlot> {
    let mut free = Vec::new();

    for (i, timing) in layout.theory.iter().enumerate() {
        if timing.start >= LUNCH_WINDOW_START && timing.end <= LUNCH_WINDOW_END {
            continue;
        }

        if time_in_lab_session(timing.start, layout, lab_cells)
            || time_in_lab_session(timing.end, layout, lab_cells)
        {
            continue;
        }

        let cell = theory_cells[i].as_str();
        if is_occupied_cell(cell) {
            continue;
        }

        let code = match cell {
            "" | "-" => None,
            other => Some(other.to_string()),
        };

        free.push(FreeSlot {
            day,
            start: timing.start,
            end: timing.end,
            code,
        });
    }

    free.sort_by_key(|slot| slot.start);
    free
}
