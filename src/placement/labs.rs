use crate::availability::AvailabilityIndex;
use crate::domain::{ClassInfo, Day};
use crate::grid::TimeGrid;
use crate::input::{Constraints, Lab};
use crate::strategy::Strategy;
use tracing::{debug, warn};

/// Explored-node limit for the lab search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchBudget {
    limit: u64,
    explored: u64,
}

impl SearchBudget {
    pub fn new(limit: u64) -> Self {
        Self { limit, explored: 0 }
    }

    /// Counts one node; `false` once the limit is reached.
    pub fn tick(&mut self) -> bool {
        if self.explored >= self.limit {
            return false;
        }
        self.explored += 1;
        true
    }

    pub fn is_exhausted(&self) -> bool {
        self.explored >= self.limit
    }

    pub fn explored(&self) -> u64 {
        self.explored
    }
}

/// One feasible placement of a lab: a contiguous run in one room, taught by one faculty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabCandidate {
    pub day: Day,
    pub start: usize,
    pub room: usize,
    pub faculty: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabOutcome {
    /// `(lab index, placement)` for every lab that made it into the grid.
    pub placed: Vec<(usize, LabCandidate)>,
    /// Lab indices left out of the grid.
    pub unplaced: Vec<usize>,
    pub explored: u64,
    pub budget_exhausted: bool,
}

/// All feasible placements for `lab` against the current grid, best first.
pub fn lab_candidates(
    grid: &TimeGrid,
    constraints: &Constraints,
    strategy: Strategy,
    lab: &Lab,
) -> Vec<LabCandidate> {
    let slot_count = constraints.slots().len();
    if lab.duration == 0 || lab.duration > slot_count {
        return Vec::new();
    }
    let last_start = slot_count - lab.duration;

    let mut starts: Vec<usize> = (0..=last_start).collect();
    match lab.preferred {
        Some(preferred) => starts.sort_by_key(|start| start.abs_diff(preferred)),
        None => {
            let order = strategy.slot_order(constraints);
            starts.sort_by_key(|start| {
                order
                    .iter()
                    .position(|slot| slot == start)
                    .unwrap_or(usize::MAX)
            });
        }
    }

    let rooms: Vec<usize> = match lab.room {
        Some(room) => vec![room],
        None => (0..constraints.rooms().len()).collect(),
    };
    let availability = constraints.availability();
    let faculty = availability.faculty_for(&lab.name);

    let mut candidates = Vec::new();
    for day in strategy.day_order() {
        for &start in &starts {
            let window = start..start + lab.duration;
            if window.clone().any(|slot| constraints.is_lunch(slot)) {
                continue;
            }
            for &room in &rooms {
                let room_free = window
                    .clone()
                    .all(|slot| AvailabilityIndex::is_room_free(grid, day, slot, room));
                if !room_free {
                    continue;
                }
                for name in &faculty {
                    let usable = availability.is_available_for_run(&lab.name, name, day, start, lab.duration)
                        && window
                            .clone()
                            .all(|slot| AvailabilityIndex::is_faculty_free(grid, day, slot, name));
                    if usable {
                        candidates.push(LabCandidate {
                            day,
                            start,
                            room,
                            faculty: name.to_string(),
                        });
                    }
                }
            }
        }
    }

    if let Some(preferred) = lab.preferred {
        candidates.sort_by_key(|candidate| candidate.start.abs_diff(preferred));
    }
    candidates
}

fn assign(grid: &mut TimeGrid, lab: &Lab, candidate: &LabCandidate) {
    for slot in candidate.start..candidate.start + lab.duration {
        grid.put(
            candidate.day,
            slot,
            candidate.room,
            ClassInfo::new(lab.name.clone(), candidate.faculty.clone()),
        );
    }
}

fn unassign(grid: &mut TimeGrid, lab: &Lab, candidate: &LabCandidate) {
    for slot in candidate.start..candidate.start + lab.duration {
        grid.remove(candidate.day, slot, candidate.room);
    }
}

struct LabSearch<'a> {
    constraints: &'a Constraints,
    strategy: Strategy,
    order: Vec<usize>,
    budget: SearchBudget,
    current: Vec<LabCandidate>,
    best: Vec<LabCandidate>,
}

impl LabSearch<'_> {
    fn lab(&self, depth: usize) -> &Lab {
        &self.constraints.labs()[self.order[depth]]
    }

    fn search(&mut self, grid: &mut TimeGrid, depth: usize) -> bool {
        if depth == self.order.len() {
            return true;
        }
        if !self.budget.tick() {
            return false;
        }
        let lab = self.lab(depth).clone();
        let candidates = lab_candidates(grid, self.constraints, self.strategy, &lab);
        for candidate in candidates {
            if self.budget.is_exhausted() {
                return false;
            }
            assign(grid, &lab, &candidate);
            self.current.push(candidate.clone());
            if self.current.len() > self.best.len() {
                self.best = self.current.clone();
            }
            if self.search(grid, depth + 1) {
                return true;
            }
            self.current.pop();
            unassign(grid, &lab, &candidate);
        }
        false
    }
}

/// Places every lab in one contiguous run, hardest (longest) first, with
/// backtracking bounded by `budget`.
///
/// When no complete assignment is found, the deepest partial assignment seen is
/// restored and the remaining labs are tried once each without backtracking;
/// labs that still do not fit are reported as unplaced. Labs without any
/// feasible window on the incoming grid are reported up front and never searched.
pub fn place_labs(
    grid: &mut TimeGrid,
    constraints: &Constraints,
    strategy: Strategy,
    budget: u64,
) -> LabOutcome {
    let labs = constraints.labs();
    let mut order: Vec<usize> = (0..labs.len()).collect();
    order.sort_by(|&a, &b| labs[b].duration.cmp(&labs[a].duration));

    // Placing other labs only removes windows, so a lab with none now never gets one.
    let (order, hopeless): (Vec<usize>, Vec<usize>) = order
        .into_iter()
        .partition(|&idx| !lab_candidates(grid, constraints, strategy, &labs[idx]).is_empty());
    for &idx in &hopeless {
        warn!(%strategy, lab = %labs[idx].name, "lab has no feasible window");
    }

    let mut search = LabSearch {
        constraints,
        strategy,
        order,
        budget: SearchBudget::new(budget),
        current: Vec::new(),
        best: Vec::new(),
    };

    let mut outcome = LabOutcome::default();
    if search.search(grid, 0) {
        outcome.placed = search.order.iter().copied().zip(search.current.drain(..)).collect();
    } else {
        outcome.budget_exhausted = search.budget.is_exhausted();
        if outcome.budget_exhausted {
            warn!(%strategy, explored = search.budget.explored(), "lab search budget exhausted");
        }
        let best = std::mem::take(&mut search.best);
        for (depth, candidate) in best.into_iter().enumerate() {
            let lab_idx = search.order[depth];
            assign(grid, &labs[lab_idx], &candidate);
            outcome.placed.push((lab_idx, candidate));
        }
        for &lab_idx in &search.order[outcome.placed.len()..] {
            let lab = &labs[lab_idx];
            match lab_candidates(grid, constraints, strategy, lab).into_iter().next() {
                Some(candidate) => {
                    assign(grid, lab, &candidate);
                    outcome.placed.push((lab_idx, candidate));
                }
                None => {
                    warn!(%strategy, lab = %lab.name, "lab left unplaced");
                    outcome.unplaced.push(lab_idx);
                }
            }
        }
    }
    outcome.unplaced.extend(hopeless);
    outcome.explored = search.budget.explored();
    debug!(%strategy, placed = outcome.placed.len(), explored = outcome.explored, "lab placement finished");
    outcome
}
