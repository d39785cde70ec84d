use super::{Solution, Solver, lunch_diagnostics, place_seeded_labs};
use crate::availability::AvailabilityIndex;
use crate::config::GeneticConfig;
use crate::diagnostics::Diagnostic;
use crate::domain::{ClassInfo, Day};
use crate::grid::TimeGrid;
use crate::input::Constraints;
use crate::lunch::normalize_lunch;
use crate::placement::place_fixed_classes;
use crate::strategy::{DEFAULT_PER_DAY_CAP, Strategy};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, info};

const BASE_SCORE: f64 = 1000.0;
const CLASH_PENALTY: f64 = 50.0;
const UNAVAILABLE_PENALTY: f64 = 30.0;
const CAP_PENALTY: f64 = 10.0;
const LOAD_VARIANCE_WEIGHT: f64 = 10.0;

/// One theory occurrence: subject `subject` taught by its `faculty`-th listed teacher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Gene {
    subject: usize,
    day: Day,
    slot: usize,
    room: usize,
    faculty: usize,
}

#[derive(Debug, Clone)]
struct Individual {
    genes: Vec<Gene>,
    fitness: f64,
}

/// A decoded individual with its fitness.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredGrid {
    pub grid: TimeGrid,
    pub diagnostics: Vec<Diagnostic>,
    pub fitness: f64,
}

/// Population-based search over theory placements.
///
/// Lunch, fixed classes, and labs are seeded deterministically; only theory
/// occurrences evolve. All randomness comes from a `ChaCha8Rng` seeded from
/// the config, so equal seeds give equal results.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneticSolver {
    pub config: GeneticConfig,
    pub search_budget: u64,
}

struct Problem<'a> {
    constraints: &'a Constraints,
    base: TimeGrid,
    base_diagnostics: Vec<Diagnostic>,
    teaching_slots: Vec<usize>,
    faculty: Vec<Vec<&'a str>>,
    /// One entry per required occurrence, naming its subject.
    occurrences: Vec<usize>,
}

impl<'a> Problem<'a> {
    fn new(constraints: &'a Constraints, search_budget: u64) -> Self {
        let mut base = TimeGrid::new(constraints.slots().len(), constraints.rooms().len());
        let mut base_diagnostics = Vec::new();
        normalize_lunch(&mut base, constraints.lunch_slot());
        base_diagnostics.extend(place_fixed_classes(&mut base, constraints));
        place_seeded_labs(
            &mut base,
            constraints,
            Strategy::Balanced,
            search_budget,
            &mut base_diagnostics,
        );

        let faculty: Vec<Vec<&str>> = constraints
            .subjects()
            .iter()
            .map(|subject| constraints.availability().faculty_for(&subject.name))
            .collect();
        let teaching_slots = constraints.teaching_slots();
        // No subject can take more cells than the week has; decode reports the rest.
        let capacity = teaching_slots.len() * constraints.rooms().len() * Day::COUNT;
        let occurrences = constraints
            .subjects()
            .iter()
            .enumerate()
            .filter(|(idx, _)| capacity > 0 && !faculty[*idx].is_empty())
            .flat_map(|(idx, subject)| std::iter::repeat_n(idx, subject.weekly.min(capacity)))
            .collect();

        Self {
            constraints,
            base,
            base_diagnostics,
            teaching_slots,
            faculty,
            occurrences,
        }
    }

    fn random_gene(&self, subject: usize, rng: &mut ChaCha8Rng) -> Gene {
        Gene {
            subject,
            day: Day::ALL[rng.random_range(0..Day::COUNT)],
            slot: self.teaching_slots[rng.random_range(0..self.teaching_slots.len())],
            room: rng.random_range(0..self.constraints.rooms().len()),
            faculty: rng.random_range(0..self.faculty[subject].len()),
        }
    }

    fn random_individual(&self, rng: &mut ChaCha8Rng) -> Individual {
        let genes = self
            .occurrences
            .iter()
            .map(|&subject| self.random_gene(subject, rng))
            .collect();
        self.scored(genes)
    }

    fn scored(&self, genes: Vec<Gene>) -> Individual {
        let fitness = self.fitness(&genes);
        Individual { genes, fitness }
    }

    fn faculty_name(&self, gene: &Gene) -> &'a str {
        self.faculty[gene.subject][gene.faculty]
    }

    fn fitness(&self, genes: &[Gene]) -> f64 {
        let mut score = BASE_SCORE;
        let mut rooms: HashMap<(Day, usize, usize), usize> = HashMap::new();
        let mut teaching: HashMap<(Day, usize, &str), usize> = HashMap::new();
        let mut per_day: HashMap<(usize, Day), usize> = HashMap::new();
        // Ordered so the variance sums the same way on every run.
        let mut loads: BTreeMap<&str, usize> = BTreeMap::new();

        for (day, slot, booking) in self.base.bookings() {
            *rooms.entry((day, slot, booking.room)).or_default() += 1;
            *teaching
                .entry((day, slot, booking.class.faculty.as_str()))
                .or_default() += 1;
        }

        let availability = self.constraints.availability();
        for gene in genes {
            let subject = &self.constraints.subjects()[gene.subject].name;
            let faculty = self.faculty_name(gene);

            let room_uses = rooms.entry((gene.day, gene.slot, gene.room)).or_default();
            if *room_uses > 0 {
                score -= CLASH_PENALTY;
            }
            *room_uses += 1;

            let faculty_uses = teaching.entry((gene.day, gene.slot, faculty)).or_default();
            if *faculty_uses > 0 {
                score -= CLASH_PENALTY;
            }
            *faculty_uses += 1;

            if !availability.is_available(subject, faculty, gene.day, gene.slot) {
                score -= UNAVAILABLE_PENALTY;
            }

            let on_day = per_day.entry((gene.subject, gene.day)).or_default();
            *on_day += 1;
            if *on_day > DEFAULT_PER_DAY_CAP {
                score -= CAP_PENALTY;
            }

            *loads.entry(faculty).or_default() += 1;
        }

        if !loads.is_empty() {
            let count = loads.len() as f64;
            let mean = loads.values().sum::<usize>() as f64 / count;
            let variance = loads
                .values()
                .map(|&load| (load as f64 - mean).powi(2))
                .sum::<f64>()
                / count;
            score -= variance * LOAD_VARIANCE_WEIGHT;
        }
        score
    }

    fn tournament<'p>(
        &self,
        population: &'p [Individual],
        size: usize,
        rng: &mut ChaCha8Rng,
    ) -> &'p Individual {
        let mut best = &population[rng.random_range(0..population.len())];
        for _ in 1..size {
            let challenger = &population[rng.random_range(0..population.len())];
            if challenger.fitness > best.fitness {
                best = challenger;
            }
        }
        best
    }

    fn crossover(&self, left: &Individual, right: &Individual, rng: &mut ChaCha8Rng) -> Vec<Gene> {
        left.genes
            .iter()
            .zip(&right.genes)
            .map(|(a, b)| if rng.random_bool(0.5) { *a } else { *b })
            .collect()
    }

    fn mutate(&self, genes: &mut [Gene], rate: f64, rng: &mut ChaCha8Rng) {
        for gene in genes.iter_mut() {
            if rng.random_bool(rate) {
                *gene = self.random_gene(gene.subject, rng);
            }
        }
    }

    /// Writes genes into a copy of the base grid, skipping any that would
    /// double-book a room or faculty, land on an unavailable faculty slot, or
    /// exceed the per-day cap.
    fn decode(&self, individual: &Individual) -> ScoredGrid {
        let mut grid = self.base.clone();
        let mut diagnostics = self.base_diagnostics.clone();
        let subjects = self.constraints.subjects();
        let availability = self.constraints.availability();
        let mut placed = vec![0usize; subjects.len()];
        let mut per_day = vec![[0usize; Day::COUNT]; subjects.len()];

        for gene in &individual.genes {
            let subject = &subjects[gene.subject].name;
            let faculty = self.faculty_name(gene);
            let fits = AvailabilityIndex::is_room_free(&grid, gene.day, gene.slot, gene.room)
                && AvailabilityIndex::is_faculty_free(&grid, gene.day, gene.slot, faculty)
                && availability.is_available(subject, faculty, gene.day, gene.slot)
                && per_day[gene.subject][gene.day.index()] < DEFAULT_PER_DAY_CAP;
            if fits {
                grid.put(
                    gene.day,
                    gene.slot,
                    gene.room,
                    ClassInfo::new(subject.clone(), faculty),
                );
                placed[gene.subject] += 1;
                per_day[gene.subject][gene.day.index()] += 1;
            }
        }

        for (idx, subject) in subjects.iter().enumerate() {
            if placed[idx] < subject.weekly {
                diagnostics.push(Diagnostic::SubjectUnderScheduled {
                    subject: subject.name.clone(),
                    placed: placed[idx],
                    required: subject.weekly,
                });
            }
        }
        let report = normalize_lunch(&mut grid, self.constraints.lunch_slot());
        diagnostics.extend(lunch_diagnostics(&report, self.constraints));

        ScoredGrid {
            grid,
            diagnostics,
            fitness: individual.fitness,
        }
    }
}

impl GeneticSolver {
    pub fn new(config: GeneticConfig, search_budget: u64) -> Self {
        Self {
            config,
            search_budget,
        }
    }

    /// Evolves a population and returns up to `count` distinct decoded grids, best first.
    pub fn evolve(&self, constraints: &Constraints, count: usize) -> Vec<ScoredGrid> {
        let problem = Problem::new(constraints, self.search_budget);
        let config = &self.config;
        let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
        let rate = config.mutation_rate.clamp(0.0, 1.0);
        let size = config.population_size.max(2);
        let elite = config.elite.min(size);

        let mut population: Vec<Individual> =
            (0..size).map(|_| problem.random_individual(&mut rng)).collect();
        sort_by_fitness(&mut population);

        for generation in 0..config.generations {
            let mut next: Vec<Individual> = population[..elite].to_vec();
            while next.len() < size {
                let left = problem.tournament(&population, config.tournament_size.max(1), &mut rng);
                let right = problem.tournament(&population, config.tournament_size.max(1), &mut rng);
                let mut genes = problem.crossover(left, right, &mut rng);
                problem.mutate(&mut genes, rate, &mut rng);
                next.push(problem.scored(genes));
            }
            population = next;
            sort_by_fitness(&mut population);
            if generation % 25 == 0 {
                debug!(generation, best = population[0].fitness, "genetic generation");
            }
        }

        let mut results: Vec<ScoredGrid> = Vec::with_capacity(count);
        for individual in &population {
            if results.len() == count {
                break;
            }
            let decoded = problem.decode(individual);
            if results.iter().all(|existing| existing.grid != decoded.grid) {
                results.push(decoded);
            }
        }
        info!(
            generations = config.generations,
            best = results.first().map(|r| r.fitness),
            "genetic search finished"
        );
        results
    }
}

impl Solver for GeneticSolver {
    fn name(&self) -> &'static str {
        "genetic"
    }

    fn solve(&self, constraints: &Constraints) -> Solution {
        match self.evolve(constraints, 1).into_iter().next() {
            Some(best) => Solution {
                grid: best.grid,
                diagnostics: best.diagnostics,
            },
            None => {
                let problem = Problem::new(constraints, self.search_budget);
                let decoded = problem.decode(&problem.scored(Vec::new()));
                Solution {
                    grid: decoded.grid,
                    diagnostics: decoded.diagnostics,
                }
            }
        }
    }
}

fn sort_by_fitness(population: &mut [Individual]) {
    population.sort_by(|a, b| b.fitness.total_cmp(&a.fitness));
}

/// Score-banded summary shown with population-based options.
pub fn recommendation_for(fitness: f64) -> &'static str {
    if fitness > 900.0 {
        "Highly optimized with minimal clashes and balanced workload."
    } else if fitness > 800.0 {
        "Good optimization; slight imbalance or minor conflicts."
    } else {
        "Meets basic requirements but may need manual tuning."
    }
}
