use crate::bools::*;
use crate::order::DecisionPolicy;
use crate::Solver;
use cpu_time::ProcessTime;
use log::{debug, info, trace};
use std::fmt;

/// Why the warmup decision step gave up.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Terminal {
    FailedAssumption(Lit),
    UnsatConstraint,
    /// The decision policy has no unassigned variable left to offer.
    NoCandidate,
}

impl fmt::Display for Terminal {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Terminal::FailedAssumption(lit) => write!(f, "assumption {} falsified", lit),
            Terminal::UnsatConstraint => write!(f, "constraint falsified"),
            Terminal::NoCandidate => write!(f, "no decision candidate"),
        }
    }
}

fn checksum(lits: &[Lit]) -> i32 {
    lits.iter().fold(0i32, |s, l| s.wrapping_add(l.0))
}

impl<D: DecisionPolicy> Solver<D> {
    fn warmup_assume_decision(&mut self, lit: Lit) {
        self.trail.new_decision_level();
        trace!("warmup decision {} @{}", lit, self.trail.level());
        self.target_phase[lit.var().idx()] = LBool::from_sign(lit.sign());
        self.trail.assign(lit, self.trail.level(), None);
    }

    fn decide_phase(&self, var: Var) -> Lit {
        let phase = self.target_phase[var.idx()]
            .as_bool()
            .unwrap_or_else(|| self.policy.phase_target(var));
        Lit::new(var, !phase)
    }

    pub(crate) fn warmup_decide(&mut self) -> Result<(), Terminal> {
        profile!("warmup_decide");
        let level = self.trail.level() as usize;
        if level < self.assumptions.len() {
            let lit = self.assumptions[level];
            let value = self.trail.value(lit);
            if value == LBOOL_FALSE {
                debug!("assumption {} falsified", lit);
                return Err(Terminal::FailedAssumption(lit));
            } else if value == LBOOL_TRUE {
                trace!("assumption {} already satisfied, pseudo decision level", lit);
                self.trail.new_decision_level();
            } else {
                self.warmup_assume_decision(lit);
            }
        } else if level == self.assumptions.len() && !self.constraint.is_empty() {
            self.decide_constraint()?;
        } else {
            self.stats.decisions += 1;
            let var = match self.policy.next_unassigned_variable(&self.trail) {
                Some(var) => var,
                None => return Err(Terminal::NoCandidate),
            };
            let lit = self.decide_phase(var);
            self.warmup_assume_decision(lit);
        }
        Ok(())
    }

    // The scan shifts every literal one slot to the right.  A satisfied
    // literal ends the scan and takes the free first slot, otherwise the
    // shift is undone.  Either way the constraint is only permuted.

    fn decide_constraint(&mut self) -> Result<(), Terminal> {
        let sum = if cfg!(debug_assertions) { checksum(&self.constraint) } else { 0 };

        let mut satisfied = None;
        let mut unassigned: Option<Lit> = None;
        let mut previous = LIT_UNDEF;
        for i in 0..self.constraint.len() {
            let lit = self.constraint[i];
            self.constraint[i] = previous;
            previous = lit;

            let value = self.trail.value(lit);
            if value == LBOOL_FALSE {
                trace!("constraint literal {} falsified", lit);
                continue;
            }
            if value == LBOOL_TRUE {
                trace!("constraint literal {} satisfied", lit);
                satisfied = Some(lit);
                break;
            }
            if unassigned.map(|u| self.policy.better_decision(lit, u)).unwrap_or(true) {
                unassigned = Some(lit);
            }
        }

        let res = if let Some(lit) = satisfied {
            self.constraint[0] = lit;
            trace!("literal {} satisfies constraint, pseudo decision level", lit);
            self.trail.new_decision_level();
            Ok(())
        } else {
            let n = self.constraint.len();
            self.constraint.copy_within(1..n, 0);
            self.constraint[n - 1] = previous;
            match unassigned {
                Some(lit) => {
                    trace!("deciding {} to satisfy constraint", lit);
                    self.warmup_assume_decision(lit);
                    Ok(())
                }
                None => {
                    debug!("failing constraint");
                    self.unsat_constraint = true;
                    Err(Terminal::UnsatConstraint)
                }
            }
        };

        debug_assert_eq!(sum, checksum(&self.constraint));

        res
    }

    /// Assign every variable once by decisions and propagation, ignoring
    /// conflicts, and remember the values as target phases.  Ends on level 0
    /// and reports why decisions stopped early, if they did.
    pub fn warmup(&mut self) -> Result<(), Terminal> {
        if !self.opts.warmup || self.unsat || self.trail.level() > 0 {
            return Ok(());
        }
        profile!("warmup");
        let start = ProcessTime::now();

        if self.propagate().is_some() {
            info!("root level conflict before warmup");
            self.unsat = true;
            return Ok(());
        }

        self.stats.warmup.runs += 1;
        let before = self.trail.num_assigned();
        let mut res = Ok(());
        while self.trail.num_assigned() < self.trail.num_vars() {
            res = self.warmup_decide();
            if res.is_err() {
                break;
            }
            self.warmup_propagate();
        }
        let assigned = self.trail.num_assigned() - before;
        self.stats.warmup.assigned += assigned as u64;
        match res {
            Ok(()) => debug!("warmup assigned {} literals", assigned),
            Err(t) => debug!("warmup stopped after {} literals: {}", assigned, t),
        }

        self.backtrack(0);
        self.stats.warmup.time += start.elapsed();
        res
    }
}
