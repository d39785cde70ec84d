use crate::availability::AvailabilityIndex;
use crate::diagnostics::{Diagnostic, FixedEntry};
use crate::domain::LUNCH_ROOM;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::borrow::Cow;
use std::collections::{BTreeMap, HashSet};

/// Slots a lab occupies when its duration cannot be read.
pub const DEFAULT_LAB_DURATION: usize = 2;

/// Request body accepted by the generator. Field names follow the web client.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TimetableRequest {
    #[serde(alias = "classrooms", deserialize_with = "null_as_default")]
    pub rooms: Vec<RoomInput>,
    #[serde(deserialize_with = "null_as_default")]
    pub time_slots: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub labs: Vec<LabInput>,
    #[serde(deserialize_with = "null_as_default")]
    pub subjects: Vec<SubjectInput>,
    #[serde(deserialize_with = "lenient_availability")]
    pub faculty_availability: BTreeMap<String, Vec<FacultyInput>>,
    #[serde(deserialize_with = "null_as_default")]
    pub fixed_classes: Vec<FixedClassInput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lunch_slot: Option<String>,
}

/// Rooms arrive either as bare names or as `{ "name": ... }` objects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RoomInput {
    Name(String),
    Named {
        #[serde(default)]
        name: String,
    },
    /// Any other shape; numbers (bare or as `name`) are read as labels.
    Other(Value),
}

impl RoomInput {
    /// Trimmed room label, or `None` when the entry carries nothing usable.
    pub fn name(&self) -> Option<Cow<'_, str>> {
        match self {
            RoomInput::Name(name) | RoomInput::Named { name } => {
                Some(Cow::Borrowed(name.trim())).filter(|name| !name.is_empty())
            }
            RoomInput::Other(Value::Object(fields)) => {
                fields.get("name").and_then(value_label).map(Cow::Owned)
            }
            RoomInput::Other(value) => value_label(value).map(Cow::Owned),
        }
    }
}

impl From<&str> for RoomInput {
    fn from(name: &str) -> Self {
        RoomInput::Name(name.to_string())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabInput {
    pub name: String,
    /// Number of consecutive slots; numbers, numeric strings, or nothing.
    pub duration: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preferred: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub room: Option<String>,
}

impl LabInput {
    pub fn new(name: impl Into<String>, duration: usize) -> Self {
        Self {
            name: name.into(),
            duration: Value::from(duration),
            preferred: None,
            room: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubjectInput {
    pub name: String,
    pub weekly: Value,
}

impl SubjectInput {
    pub fn new(name: impl Into<String>, weekly: usize) -> Self {
        Self {
            name: name.into(),
            weekly: Value::from(weekly),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "FacultyRecord")]
pub struct FacultyInput {
    pub faculty: String,
    /// Day name → slot labels.
    pub available: BTreeMap<String, Vec<String>>,
}

/// Wire shape of a faculty entry: the name may sit under `faculty`, `name`,
/// or `id`, and the first non-empty one wins.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FacultyRecord {
    faculty: Value,
    name: Value,
    id: Value,
    #[serde(deserialize_with = "null_as_default")]
    available: BTreeMap<String, Option<Vec<String>>>,
}

impl From<FacultyRecord> for FacultyInput {
    fn from(record: FacultyRecord) -> Self {
        let faculty = [&record.faculty, &record.name, &record.id]
            .into_iter()
            .find_map(value_label)
            .unwrap_or_default();
        Self {
            faculty,
            available: record
                .available
                .into_iter()
                .map(|(day, slots)| (day, slots.unwrap_or_default()))
                .collect(),
        }
    }
}

impl FacultyInput {
    pub fn new<I, D, S>(faculty: impl Into<String>, available: I) -> Self
    where
        I: IntoIterator<Item = (D, Vec<S>)>,
        D: Into<String>,
        S: Into<String>,
    {
        Self {
            faculty: faculty.into(),
            available: available
                .into_iter()
                .map(|(day, slots)| (day.into(), slots.into_iter().map(Into::into).collect()))
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FixedClassInput {
    pub day: String,
    #[serde(alias = "time")]
    pub slot: String,
    pub room: String,
    pub subject: String,
    pub faculty: String,
}

impl From<&FixedClassInput> for FixedEntry {
    fn from(input: &FixedClassInput) -> Self {
        FixedEntry {
            day: input.day.trim().to_string(),
            slot: input.slot.trim().to_string(),
            room: input.room.trim().to_string(),
            subject: input.subject.clone(),
            faculty: input.faculty.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lab {
    pub name: String,
    pub duration: usize,
    /// Preferred start slot position.
    pub preferred: Option<usize>,
    /// Mandatory room position.
    pub room: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subject {
    pub name: String,
    pub weekly: usize,
}

/// Normalized, position-indexed view of a request. Construction never fails;
/// every correction is reported as a diagnostic instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Constraints {
    slots: Vec<String>,
    rooms: Vec<String>,
    labs: Vec<Lab>,
    subjects: Vec<Subject>,
    fixed_classes: Vec<FixedEntry>,
    lunch: Option<usize>,
    availability: AvailabilityIndex,
}

impl Constraints {
    pub fn from_request(request: &TimetableRequest) -> (Self, Vec<Diagnostic>) {
        let mut diagnostics = Vec::new();

        let slots = unique_labels(
            request.time_slots.iter().map(String::as_str),
            "timeSlots",
            &mut diagnostics,
        );
        let mut room_labels = Vec::with_capacity(request.rooms.len());
        for room in &request.rooms {
            match room.name() {
                Some(label) => room_labels.push(label),
                None => diagnostics.push(Diagnostic::input_defaulted(
                    "rooms",
                    "room entry without a usable name ignored",
                )),
            }
        }
        let rooms = unique_labels(
            room_labels.iter().map(|label| &**label),
            "rooms",
            &mut diagnostics,
        );
        let rooms = rooms
            .into_iter()
            .filter(|room| {
                let reserved = room == LUNCH_ROOM;
                if reserved {
                    diagnostics.push(Diagnostic::input_defaulted(
                        "rooms",
                        format!("'{LUNCH_ROOM}' is reserved for the lunch break; room ignored"),
                    ));
                }
                !reserved
            })
            .collect::<Vec<_>>();

        let lunch = match request.lunch_slot.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(label) => {
                let position = slots.iter().position(|s| s == label);
                if position.is_none() {
                    diagnostics.push(Diagnostic::input_defaulted(
                        "lunchSlot",
                        format!("'{label}' is not one of the time slots; no lunch break applied"),
                    ));
                }
                position
            }
        };

        let labs = request
            .labs
            .iter()
            .filter_map(|lab| normalize_lab(lab, &slots, &rooms, &mut diagnostics))
            .collect();

        let subjects = request
            .subjects
            .iter()
            .filter_map(|subject| {
                let name = subject.name.trim();
                if name.is_empty() {
                    diagnostics.push(Diagnostic::input_defaulted(
                        "subjects",
                        "subject without a name ignored",
                    ));
                    return None;
                }
                let weekly = match lenient_count(&subject.weekly) {
                    Some(count) => count.max(0) as usize,
                    None => {
                        diagnostics.push(Diagnostic::input_defaulted(
                            format!("subjects.{name}.weekly"),
                            format!("unreadable weekly count {}; using 0", subject.weekly),
                        ));
                        0
                    }
                };
                Some(Subject {
                    name: name.to_string(),
                    weekly,
                })
            })
            .collect();

        let fixed_classes = request.fixed_classes.iter().map(FixedEntry::from).collect();

        let availability = AvailabilityIndex::build(
            &request.faculty_availability,
            slots.len(),
            |label| slots.iter().position(|s| s == label.trim()),
            &mut diagnostics,
        );

        let constraints = Self {
            slots,
            rooms,
            labs,
            subjects,
            fixed_classes,
            lunch,
            availability,
        };
        (constraints, diagnostics)
    }

    pub fn slots(&self) -> &[String] {
        &self.slots
    }

    pub fn rooms(&self) -> &[String] {
        &self.rooms
    }

    pub fn labs(&self) -> &[Lab] {
        &self.labs
    }

    pub fn subjects(&self) -> &[Subject] {
        &self.subjects
    }

    pub fn fixed_classes(&self) -> &[FixedEntry] {
        &self.fixed_classes
    }

    pub fn availability(&self) -> &AvailabilityIndex {
        &self.availability
    }

    pub fn lunch_slot(&self) -> Option<usize> {
        self.lunch
    }

    pub fn is_lunch(&self, slot: usize) -> bool {
        self.lunch == Some(slot)
    }

    pub fn slot_index(&self, label: &str) -> Option<usize> {
        self.slots.iter().position(|s| s == label)
    }

    pub fn room_index(&self, name: &str) -> Option<usize> {
        self.rooms.iter().position(|r| r == name)
    }

    /// Slot positions in natural order with the lunch slot removed.
    pub fn teaching_slots(&self) -> Vec<usize> {
        (0..self.slots.len()).filter(|&slot| !self.is_lunch(slot)).collect()
    }
}

fn unique_labels<'a>(
    labels: impl Iterator<Item = &'a str>,
    field: &str,
    diagnostics: &mut Vec<Diagnostic>,
) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for label in labels {
        let label = label.trim();
        if label.is_empty() {
            diagnostics.push(Diagnostic::input_defaulted(field, "empty entry ignored"));
            continue;
        }
        if !seen.insert(label.to_string()) {
            diagnostics.push(Diagnostic::input_defaulted(
                field,
                format!("duplicate entry '{label}' ignored"),
            ));
            continue;
        }
        out.push(label.to_string());
    }
    out
}

fn normalize_lab(
    lab: &LabInput,
    slots: &[String],
    rooms: &[String],
    diagnostics: &mut Vec<Diagnostic>,
) -> Option<Lab> {
    let name = lab.name.trim();
    if name.is_empty() {
        diagnostics.push(Diagnostic::input_defaulted("labs", "lab without a name ignored"));
        return None;
    }
    let field = format!("labs.{name}");

    let duration = match &lab.duration {
        Value::Number(_) => lenient_count(&lab.duration).map(|n| n.max(1) as usize),
        Value::String(_) => lenient_count(&lab.duration)
            .filter(|n| *n > 0)
            .map(|n| n as usize),
        _ => None,
    };
    let duration = duration.unwrap_or_else(|| {
        diagnostics.push(Diagnostic::input_defaulted(
            format!("{field}.duration"),
            format!(
                "unreadable duration {}; using {DEFAULT_LAB_DURATION} slots",
                lab.duration
            ),
        ));
        DEFAULT_LAB_DURATION
    });

    let preferred = optional_label(lab.preferred.as_deref()).and_then(|label| {
        let position = slots.iter().position(|s| s == label);
        if position.is_none() {
            diagnostics.push(Diagnostic::input_defaulted(
                format!("{field}.preferred"),
                format!("unknown slot '{label}'; no start preference applied"),
            ));
        }
        position
    });

    let room = optional_label(lab.room.as_deref()).and_then(|label| {
        let position = rooms.iter().position(|r| r == label);
        if position.is_none() {
            diagnostics.push(Diagnostic::input_defaulted(
                format!("{field}.room"),
                format!("unknown room '{label}'; any room may be used"),
            ));
        }
        position
    });

    Some(Lab {
        name: name.to_string(),
        duration,
        preferred,
        room,
    })
}

/// Treats an explicit `null` like a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn lenient_availability<'de, D>(
    deserializer: D,
) -> Result<BTreeMap<String, Vec<FacultyInput>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<BTreeMap<String, Option<Vec<FacultyInput>>>> =
        Option::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .map(|(subject, entries)| (subject, entries.unwrap_or_default()))
        .collect())
}

/// A non-empty trimmed string, or a number written out.
fn value_label(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.trim().to_string()).filter(|text| !text.is_empty()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

fn optional_label(label: Option<&str>) -> Option<&str> {
    label.map(str::trim).filter(|label| !label.is_empty())
}

/// Reads a count from a JSON number or from the digits of a string ("2 periods").
fn lenient_count(value: &Value) -> Option<i64> {
    match value {
        Value::Number(number) => number
            .as_f64()
            .filter(|v| v.is_finite())
            .map(|v| v.floor() as i64),
        Value::String(text) => {
            let digits: String = text
                .trim()
                .chars()
                .skip_while(|c| !c.is_ascii_digit())
                .take_while(char::is_ascii_digit)
                .collect();
            digits.parse().ok()
        }
        _ => None,
    }
}
