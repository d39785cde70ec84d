use crate::domain::Day;
use crate::input::Constraints;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Classes of one subject allowed on a single day before relaxation.
pub const DEFAULT_PER_DAY_CAP: usize = 2;

/// Day/slot ordering policy shared by the lab search and the theory spreader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Lab grouping: Monday/Wednesday/Friday first, mid-day slots first.
    LabGrouping,
    /// Natural day and slot order.
    Balanced,
    /// Natural day order, latest slots first.
    AfternoonWeighted,
}

impl Strategy {
    pub const ALL: [Strategy; 3] = [
        Strategy::LabGrouping,
        Strategy::Balanced,
        Strategy::AfternoonWeighted,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Strategy::LabGrouping => "lab_grouping",
            Strategy::Balanced => "balanced",
            Strategy::AfternoonWeighted => "afternoon_weighted",
        }
    }

    /// Option letter shown to users.
    pub fn label(self) -> char {
        match self {
            Strategy::LabGrouping => 'A',
            Strategy::Balanced => 'B',
            Strategy::AfternoonWeighted => 'C',
        }
    }

    pub fn day_order(self) -> [Day; Day::COUNT] {
        match self {
            Strategy::LabGrouping => [
                Day::Monday,
                Day::Wednesday,
                Day::Friday,
                Day::Tuesday,
                Day::Thursday,
            ],
            Strategy::Balanced | Strategy::AfternoonWeighted => Day::ALL,
        }
    }

    /// Slot positions to try, lunch excluded.
    pub fn slot_order(self, constraints: &Constraints) -> Vec<usize> {
        let mut slots = constraints.teaching_slots();
        match self {
            Strategy::LabGrouping => {
                let mid = slots.len() / 2;
                let mut ranked: Vec<(usize, usize)> = slots
                    .iter()
                    .enumerate()
                    .map(|(rank, &slot)| (rank.abs_diff(mid), slot))
                    .collect();
                ranked.sort_by_key(|&(distance, _)| distance);
                slots = ranked.into_iter().map(|(_, slot)| slot).collect();
            }
            Strategy::Balanced => {}
            Strategy::AfternoonWeighted => slots.reverse(),
        }
        slots
    }

    pub fn per_day_cap(self) -> usize {
        DEFAULT_PER_DAY_CAP
    }

    pub fn recommendation(self) -> &'static str {
        match self {
            Strategy::LabGrouping => {
                "Labs are grouped on alternating days to keep practicals together while easing transitions for faculty and students."
            }
            Strategy::Balanced => {
                "Classes are evenly spread across the week for steady, predictable daily workloads."
            }
            Strategy::AfternoonWeighted => {
                "Afternoons carry more classes, leaving lighter mornings for prep and catch-up."
            }
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown strategy '{0}' (expected A, B, C, lab_grouping, balanced or afternoon_weighted)")]
pub struct UnknownStrategy(pub String);

impl FromStr for Strategy {
    type Err = UnknownStrategy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "a" | "lab_grouping" => Ok(Strategy::LabGrouping),
            "b" | "balanced" => Ok(Strategy::Balanced),
            "c" | "afternoon_weighted" => Ok(Strategy::AfternoonWeighted),
            _ => Err(UnknownStrategy(s.to_string())),
        }
    }
}
