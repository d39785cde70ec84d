//! Tabular views of a timetable for printing and summaries.

use crate::domain::{Day, LUNCH_ROOM, LUNCH_SUBJECT};
use crate::timetable::Timetable;
use polars::prelude::*;

/// One row per room entry: `day, slot, room, subject, faculty`.
pub fn timetable_frame(timetable: &Timetable) -> PolarsResult<DataFrame> {
    let mut days = Vec::new();
    let mut slots = Vec::new();
    let mut rooms = Vec::new();
    let mut subjects = Vec::new();
    let mut faculty = Vec::new();
    for (day, slot, room, class) in timetable.entries() {
        days.push(day.as_str().to_string());
        slots.push(slot.to_string());
        rooms.push(room.to_string());
        subjects.push(class.subject.clone());
        faculty.push(class.faculty.clone());
    }
    DataFrame::new(vec![
        Series::new(PlSmallStr::from_static("day"), days).into_column(),
        Series::new(PlSmallStr::from_static("slot"), slots).into_column(),
        Series::new(PlSmallStr::from_static("room"), rooms).into_column(),
        Series::new(PlSmallStr::from_static("subject"), subjects).into_column(),
        Series::new(PlSmallStr::from_static("faculty"), faculty).into_column(),
    ])
}

/// Weekly grid with one row per slot (in the given order) and one column per day.
pub fn grid_frame(timetable: &Timetable, slots: &[String]) -> PolarsResult<DataFrame> {
    let mut columns = vec![
        Series::new(PlSmallStr::from_static("slot"), slots.to_vec()).into_column(),
    ];
    for day in Day::ALL {
        let cells: Vec<String> = slots
            .iter()
            .map(|slot| match timetable.cell(day, slot) {
                Some(entry) if entry.is_lunch() => LUNCH_SUBJECT.to_string(),
                Some(entry) => entry
                    .rooms
                    .iter()
                    .map(|(room, class)| format!("{} ({}) @{room}", class.subject, class.faculty))
                    .collect::<Vec<_>>()
                    .join("; "),
                None => String::new(),
            })
            .collect();
        columns.push(Series::new(PlSmallStr::from_static(day.as_str()), cells).into_column());
    }
    DataFrame::new(columns)
}

/// Classes per faculty member, busiest first.
pub fn faculty_load(timetable: &Timetable) -> PolarsResult<DataFrame> {
    timetable_frame(timetable)?
        .lazy()
        .filter(col("room").neq(lit(LUNCH_ROOM)))
        .group_by([col("faculty")])
        .agg([len().alias("classes")])
        .sort_by_exprs(
            [col("classes"), col("faculty")],
            SortMultipleOptions::default().with_order_descending_multi([true, false]),
        )
        .collect()
}

pub fn render_text_table(df: &DataFrame) -> String {
    let columns = df.get_columns();
    let names: Vec<String> = columns.iter().map(|c| c.name().to_string()).collect();
    let rows: Vec<Vec<String>> = (0..df.height())
        .map(|row| {
            columns
                .iter()
                .map(|column| match column.get(row) {
                    Ok(AnyValue::Null) | Err(_) => String::new(),
                    Ok(AnyValue::String(s)) => s.to_string(),
                    Ok(AnyValue::UInt32(v)) => v.to_string(),
                    Ok(AnyValue::UInt64(v)) => v.to_string(),
                    Ok(value) => value.to_string(),
                })
                .collect()
        })
        .collect();

    let mut widths: Vec<usize> = names.iter().map(String::len).collect();
    for row in &rows {
        for (ci, value) in row.iter().enumerate() {
            widths[ci] = widths[ci].max(value.chars().count());
        }
    }

    let mut sep = String::from("+");
    for width in &widths {
        sep.push_str(&"-".repeat(width + 2));
        sep.push('+');
    }

    let line = |values: &[String]| {
        let mut out = String::from("|");
        for (ci, value) in values.iter().enumerate() {
            let pad = widths[ci].saturating_sub(value.chars().count());
            out.push(' ');
            out.push_str(value);
            out.push_str(&" ".repeat(pad));
            out.push_str(" |");
        }
        out
    };

    let mut out = String::new();
    out.push_str(&sep);
    out.push('\n');
    out.push_str(&line(&names));
    out.push('\n');
    out.push_str(&sep);
    out.push('\n');
    for row in &rows {
        out.push_str(&line(row));
        out.push('\n');
    }
    out.push_str(&sep);
    out.push('\n');
    out
}
