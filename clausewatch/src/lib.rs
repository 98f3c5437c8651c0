//! Clause storage and two-watched-literal unit propagation for a CDCL
//! solver core.
//!
//! Clauses live in a [`ClauseStore`] which packs optional fields out of the
//! record when they are not needed and can move clauses into a bulk arena.
//! The [`Solver`] ties the store to the watch lists, the assignment trail and
//! a [`DecisionPolicy`], and provides propagation and the warmup pass that
//! seeds target phases.

macro_rules! profile {
    ($name:expr) => {
        #[cfg(feature = "profiler")]
        let _p = hprof::enter($name);
    };
}

mod arena;
mod bools;
mod clausedb;
mod clauses;
mod order;
mod params;
mod propagate;
mod trail;
mod warmup;
mod watches;

pub use arena::ClauseArena;
pub use bools::*;
pub use clausedb::{filter_tautology, Clause, ClauseHeader, ClauseRef, ClauseStats, ClauseStore, HEADER_BYTES, WORD};
pub use order::{DecisionPolicy, VarOrder};
pub use params::{Options, Statistics, WarmupStatistics};
pub use trail::{Assignment, VariableData};
pub use warmup::Terminal;
pub use watches::{Watch, WatchTable};

use log::{info, trace};
use sattrait::{ProofTracer, RelevanceTracker, SatInstance};
use std::fmt;

pub struct Solver<D = VarOrder> {
    pub opts: Options,
    pub stats: Statistics,
    pub policy: D,

    store: ClauseStore,
    watches: WatchTable,
    trail: Assignment,
    target_phase: Vec<LBool>,

    // literals of the clause being added
    clause: Vec<Lit>,
    assumptions: Vec<Lit>,
    constraint: Vec<Lit>,
    /// Skipped by propagation.
    pub ignore: Option<ClauseRef>,

    unsat: bool,
    clashing: bool,
    unsat_constraint: bool,
}

impl Solver<VarOrder> {
    pub fn new() -> Self {
        Solver::with_policy(VarOrder::new())
    }
}

impl Default for Solver<VarOrder> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D: DecisionPolicy> Solver<D> {
    pub fn with_policy(policy: D) -> Self {
        Solver {
            opts: Default::default(),
            stats: Default::default(),
            policy,
            store: ClauseStore::new(),
            watches: WatchTable::new(),
            trail: Assignment::new(),
            target_phase: Vec::new(),
            clause: Vec::new(),
            assumptions: Vec::new(),
            constraint: Vec::new(),
            ignore: None,
            unsat: false,
            clashing: false,
            unsat_constraint: false,
        }
    }

    pub fn new_var(&mut self) -> Lit {
        let var = Var(self.trail.num_vars() as i32);
        self.trail.new_var(var);
        self.watches.new_var(var);
        self.policy.new_var(var);
        self.target_phase.push(LBOOL_UNDEF);
        Lit::new(var, false)
    }

    pub fn num_vars(&self) -> usize {
        self.trail.num_vars()
    }

    pub fn value(&self, lit: Lit) -> LBool {
        self.trail.value(lit)
    }

    pub fn level(&self) -> u32 {
        self.trail.level()
    }

    pub fn assignment(&self) -> &Assignment {
        &self.trail
    }

    pub fn store(&self) -> &ClauseStore {
        &self.store
    }

    pub fn watches(&self) -> &WatchTable {
        &self.watches
    }

    /// Phase remembered by the last warmup, if any.
    pub fn target_phase(&self, var: Var) -> Option<bool> {
        self.target_phase[var.idx()].as_bool()
    }

    pub fn is_unsat(&self) -> bool {
        self.unsat
    }

    /// Was a unit clause added that contradicts the current assignment?
    pub fn clashing_unit(&self) -> bool {
        self.clashing
    }

    pub fn unsat_constraint(&self) -> bool {
        self.unsat_constraint
    }

    pub fn assume(&mut self, lit: Lit) {
        trace!("assume {}", lit);
        self.assumptions.push(lit);
    }

    pub fn reset_assumptions(&mut self) {
        self.assumptions.clear();
    }

    /// Replace the constraint, a clause that only has to hold under the
    /// current assumptions.
    pub fn constrain(&mut self, lits: impl IntoIterator<Item = Lit>) {
        self.constraint.clear();
        self.constraint.extend(lits);
        self.unsat_constraint = false;
    }

    pub fn constraint(&self) -> &[Lit] {
        &self.constraint
    }

    /// Open a new decision level and assign `lit` on it.
    pub fn assume_decision(&mut self, lit: Lit) {
        self.trail.new_decision_level();
        self.stats.decisions += 1;
        self.trail.assign(lit, self.trail.level(), None);
    }

    pub fn backtrack(&mut self, level: u32) {
        let policy = &mut self.policy;
        self.trail.backtrack(level, |lit| policy.unassigned(lit));
    }

    pub fn set_proof_tracer(&mut self, proof: Box<dyn ProofTracer<Lit>>) {
        self.store.set_proof_tracer(proof);
    }

    pub fn set_relevance_tracker(&mut self, relevance: Box<dyn RelevanceTracker<Lit>>) {
        self.store.set_relevance_tracker(relevance);
    }

    pub fn stats_info(&self) {
        let clauses = &self.store.stats;
        info!("variables:    {}", self.num_vars());
        info!("irredundant:  {}", clauses.irredundant);
        info!("redundant:    {}", clauses.redundant);
        info!("garbage:      {}", clauses.garbage);
        info!("collected:    {} bytes", clauses.collected);
        info!("decisions:    {}", self.stats.decisions);
        info!("propagations: {}", self.stats.propagations);
        info!("conflicts:    {}", self.stats.conflicts);
        info!(
            "warmup:       {} runs, {} assigned, {:.3}s",
            self.stats.warmup.runs,
            self.stats.warmup.assigned,
            self.stats.warmup.time.as_secs_f64()
        );
        #[cfg(feature = "profiler")]
        hprof::profiler().print_timing();
    }
}

impl<D: DecisionPolicy> SatInstance<Lit> for Solver<D> {
    fn new_var(&mut self) -> Lit {
        Solver::new_var(self)
    }

    fn add_clause(&mut self, clause: impl IntoIterator<Item = impl Into<Lit>>) {
        Solver::add_clause(self, clause.into_iter().map(|l| l.into()));
    }
}

#[derive(Debug)]
pub enum LoadError {
    Parse(dimacs::ParseError),
    NotCnf,
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            LoadError::Parse(e) => write!(f, "could not parse DIMACS input: {:?}", e),
            LoadError::NotCnf => write!(f, "DIMACS input is not in CNF"),
        }
    }
}

impl std::error::Error for LoadError {}

impl From<dimacs::ParseError> for LoadError {
    fn from(e: dimacs::ParseError) -> Self {
        LoadError::Parse(e)
    }
}

pub fn solver_from_dimacs(text: &str) -> Result<Solver, LoadError> {
    let mut s = Solver::new();
    match dimacs::parse_dimacs(text)? {
        dimacs::Instance::Cnf { clauses, .. } => {
            for c in clauses.iter() {
                for l in c.lits() {
                    let var = Var(l.var().to_u64() as i32 - 1);
                    while s.num_vars() <= var.idx() {
                        s.new_var();
                    }
                }
                trace!("clause {:?}", c);
                s.add_clause(c.lits().iter().map(|l| {
                    Lit::new(Var(l.var().to_u64() as i32 - 1), l.sign() == dimacs::Sign::Neg)
                }));
            }
            Ok(s)
        }
        _ => Err(LoadError::NotCnf),
    }
}
