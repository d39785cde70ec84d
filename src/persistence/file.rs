use super::{PersistenceError, PersistenceResult};
use crate::domain::{ClassInfo, Day};
use crate::input::TimetableRequest;
use crate::options::TimetableResponse;
use crate::timetable::Timetable;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::Path;

pub fn save_request_to_json<P: AsRef<Path>>(
    request: &TimetableRequest,
    path: P,
) -> PersistenceResult<()> {
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, request)?;
    Ok(())
}

pub fn load_request_from_json<P: AsRef<Path>>(path: P) -> PersistenceResult<TimetableRequest> {
    let file = File::open(path)?;
    Ok(serde_json::from_reader(file)?)
}

pub fn save_options_to_json<P: AsRef<Path>>(
    response: &TimetableResponse,
    path: P,
) -> PersistenceResult<()> {
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, response)?;
    Ok(())
}

pub fn load_options_from_json<P: AsRef<Path>>(path: P) -> PersistenceResult<TimetableResponse> {
    let file = File::open(path)?;
    Ok(serde_json::from_reader(file)?)
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct TimetableCsvRecord {
    day: String,
    slot: String,
    room: String,
    subject: String,
    #[serde(default)]
    faculty: String,
}

/// Writes one row per room entry. Lunch rows carry room `LUNCH`.
pub fn save_timetable_to_csv<P: AsRef<Path>>(timetable: &Timetable, path: P) -> PersistenceResult<()> {
    let file = File::create(path)?;
    let mut writer = csv::Writer::from_writer(file);
    for (day, slot, room, class) in timetable.entries() {
        writer.serialize(TimetableCsvRecord {
            day: day.as_str().to_string(),
            slot: slot.to_string(),
            room: room.to_string(),
            subject: class.subject.clone(),
            faculty: class.faculty.clone(),
        })?;
    }
    writer.flush()?;
    Ok(())
}

pub fn load_timetable_from_csv<P: AsRef<Path>>(path: P) -> PersistenceResult<Timetable> {
    let file = File::open(path)?;
    let mut reader = csv::Reader::from_reader(file);
    let mut timetable = Timetable::default();
    for (line, record) in reader.deserialize::<TimetableCsvRecord>().enumerate() {
        let record = record?;
        let day = record.day.parse::<Day>().map_err(|err| {
            PersistenceError::InvalidData(format!("row {}: {err}", line + 1))
        })?;
        if record.slot.trim().is_empty() || record.room.trim().is_empty() {
            return Err(PersistenceError::InvalidData(format!(
                "row {}: slot and room are required",
                line + 1
            )));
        }
        timetable.insert(
            day,
            record.slot.trim(),
            record.room.trim(),
            ClassInfo::new(record.subject, record.faculty),
        );
    }
    Ok(timetable)
}
