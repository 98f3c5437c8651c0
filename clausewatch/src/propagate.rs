use crate::bools::*;
use crate::clausedb::ClauseRef;
use crate::order::DecisionPolicy;
use crate::Solver;
use log::{debug, trace};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum Mode {
    Search,
    /// Conflicts are skipped, implied literals get the current level and
    /// become target phases.
    Warmup,
}

impl<D: DecisionPolicy> Solver<D> {
    /// Level an implied literal is assigned on.  With chronological
    /// backtracking this is the highest level of the other literals of its
    /// reason, which may lie below the current level.
    fn assignment_level(&self, lit: Lit, reason: ClauseRef) -> u32 {
        if self.opts.chrono == 0 {
            return self.trail.level();
        }
        let mut res = 0;
        for &other in self.store.clause(reason).lits() {
            if other == lit {
                continue;
            }
            debug_assert!(self.trail.value(other) == LBOOL_FALSE);
            res = res.max(self.trail.var_level(other.var()));
        }
        res
    }

    fn implied(&mut self, lit: Lit, reason: ClauseRef, mode: Mode) {
        let level = match mode {
            Mode::Search => self.assignment_level(lit, reason),
            Mode::Warmup => {
                self.target_phase[lit.var().idx()] = LBool::from_sign(lit.sign());
                self.trail.level()
            }
        };
        self.trail.assign(lit, level, Some(reason));
    }

    /// Propagate the trail to a fixed point.  Returns the falsified clause
    /// on conflict.
    pub fn propagate(&mut self) -> Option<ClauseRef> {
        profile!("propagate");
        let before = self.trail.propagated;
        let conflict = self.propagate_in(Mode::Search);
        self.stats.propagations += (self.trail.propagated - before) as u64;
        if let Some(c) = conflict {
            self.stats.conflicts += 1;
            debug!("conflict {:?} at level {}", c, self.trail.level());
        }
        conflict
    }

    /// Same scan as `propagate`, but runs through conflicts.
    pub(crate) fn warmup_propagate(&mut self) {
        profile!("warmup_propagate");
        self.propagate_in(Mode::Warmup);
    }

    pub(crate) fn propagate_in(&mut self, mode: Mode) -> Option<ClauseRef> {
        let mut conflict = None;
        while conflict.is_none() && self.trail.propagated < self.trail.num_assigned() {
            let lit = !self.trail.trail()[self.trail.propagated];
            self.trail.propagated += 1;
            trace!("propagating {}", !lit);

            let mut ws = self.watches.take(lit);
            let (mut i, mut j) = (0, 0);
            while i < ws.len() {
                let w = ws[i];
                ws[j] = w;
                i += 1;
                j += 1;

                let b = self.trail.value(w.blit);
                if b == LBOOL_TRUE {
                    continue;
                }

                if w.binary() {
                    // Garbage binary clauses are not skipped here.  Their
                    // deletion is traced only once they are really freed.
                    if b == LBOOL_FALSE {
                        if mode == Mode::Search {
                            conflict = Some(w.clause);
                            break;
                        }
                    } else {
                        self.implied(w.blit, w.clause, mode);
                    }
                    continue;
                }

                let mut clause = self.store.clause_mut(w.clause);
                if clause.garbage() {
                    j -= 1;
                    continue;
                }
                if Some(w.clause) == self.ignore {
                    continue;
                }

                let (pos, lits) = clause.pos_and_lits_mut();
                debug_assert!(lits[0] == lit || lits[1] == lit);
                let other = Lit(lits[0].0 ^ lits[1].0 ^ lit.0);
                let u = self.trail.value(other);
                if u == LBOOL_TRUE {
                    ws[j - 1].blit = other;
                    continue;
                }

                let size = lits.len();
                let middle = pos.as_ref().map(|p| **p as usize).unwrap_or(2);
                debug_assert!(2 <= middle && middle <= size);
                let mut k = middle;
                let mut v = LBOOL_FALSE;
                let mut r = LIT_UNDEF;
                while k != size {
                    r = lits[k];
                    v = self.trail.value(r);
                    if v != LBOOL_FALSE {
                        break;
                    }
                    k += 1;
                }
                if v == LBOOL_FALSE {
                    k = 2;
                    while k != middle {
                        r = lits[k];
                        v = self.trail.value(r);
                        if v != LBOOL_FALSE {
                            break;
                        }
                        k += 1;
                    }
                }
                if let Some(pos) = pos {
                    *pos = k as u32;
                }

                if v == LBOOL_TRUE {
                    ws[j - 1].blit = r;
                } else if v == LBOOL_UNDEF {
                    trace!("unwatch {} in {:?}", lit, w.clause);
                    lits[0] = other;
                    lits[1] = r;
                    lits[k] = lit;
                    self.watches.watch_literal(r, lit, w.clause, size);
                    j -= 1;
                } else if u == LBOOL_UNDEF {
                    self.implied(other, w.clause, mode);
                    if self.opts.chrono > 1 && self.repair_watch(lit, other, w.clause) {
                        j -= 1;
                    }
                } else if mode == Mode::Search {
                    conflict = Some(w.clause);
                    break;
                }
            }

            while i < ws.len() {
                ws[j] = ws[i];
                i += 1;
                j += 1;
            }
            ws.truncate(j);
            self.watches.restore(lit, ws);
        }
        conflict
    }

    /// After `other` was implied on a level above the level of `lit`, watch
    /// a literal of that level instead of `lit`, so the two watches stay on
    /// the two highest levels of the clause.  Returns whether the watch of
    /// `lit` has to be dropped.
    fn repair_watch(&mut self, lit: Lit, other: Lit, c: ClauseRef) -> bool {
        let other_level = self.trail.var_level(other.var());
        if other_level <= self.trail.var_level(lit.var()) {
            return false;
        }
        let trail = &self.trail;
        let mut clause = self.store.clause_mut(c);
        let lits = clause.lits_mut();
        let mut found = None;
        for p in 2..lits.len() {
            if trail.var_level(lits[p].var()) == other_level {
                found = Some(p);
                break;
            }
        }
        // Warmup puts every implied literal on the current level, which
        // need not occur among the false literals.
        let p = match found {
            Some(p) => p,
            None => return false,
        };
        let s = lits[p];
        trace!("unwatch {} in {:?}, watching {} on level {}", lit, c, s, other_level);
        lits[p] = lit;
        lits[0] = other;
        lits[1] = s;
        let size = lits.len();
        self.watches.watch_literal(s, other, c, size);
        true
    }
}
