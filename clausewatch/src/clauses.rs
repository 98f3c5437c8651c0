use crate::bools::*;
use crate::clausedb::{filter_tautology, ClauseRef};
use crate::order::DecisionPolicy;
use crate::Solver;
use log::{debug, info, trace};

impl<D: DecisionPolicy> Solver<D> {
    /// Add an input clause.  Tautologies are dropped and duplicate literals
    /// removed before the clause is committed.
    pub fn add_clause(&mut self, lits: impl IntoIterator<Item = Lit>) {
        self.clause.clear();
        self.clause.extend(lits);
        for lit in self.clause.iter() {
            debug_assert!(lit.var().idx() < self.num_vars());
        }
        if filter_tautology(&mut self.clause) {
            trace!("ignoring tautological clause");
            return;
        }
        self.commit_original();
    }

    fn commit_original(&mut self) {
        match self.clause.len() {
            0 => {
                if self.unsat {
                    trace!("ignoring another empty clause");
                } else {
                    info!("found empty original clause");
                    self.unsat = true;
                }
            }
            1 => {
                let lit = self.clause[0];
                let value = self.trail.value(lit);
                if value == LBOOL_UNDEF {
                    self.trail.assign(lit, 0, None);
                } else if value == LBOOL_FALSE {
                    if self.clashing {
                        trace!("ignoring another clashing unit {}", lit);
                    } else {
                        info!("found clashing unit {}", lit);
                        self.clashing = true;
                    }
                } else {
                    trace!("unit {} already satisfied", lit);
                }
            }
            _ => {
                let c = self.store.new_clause(&self.clause, false, 0, &self.opts);
                self.watch_new_clause(c);
            }
        }
    }

    /// Add a clause derived by conflict analysis.  It is traced with the
    /// given antecedents and watched right away.
    pub fn add_learned_clause(
        &mut self,
        lits: &[Lit],
        glue: u32,
        antecedents: &[u64],
    ) -> ClauseRef {
        assert!(lits.len() >= 2);
        let c = self.store.new_clause(lits, true, glue, &self.opts);
        self.store.trace_add_clause(c, antecedents);
        self.watch_clause(c);
        c
    }

    /// Add an irredundant clause obtained by resolution.  Only traced, the
    /// caller decides whether to watch it.
    pub fn add_resolved_clause(&mut self, lits: &[Lit], antecedents: &[u64]) -> ClauseRef {
        let c = self.store.new_clause(lits, false, 0, &self.opts);
        self.store.trace_add_clause(c, antecedents);
        c
    }

    pub fn mark_garbage(&mut self, c: ClauseRef) {
        self.store.mark_garbage(c, None);
    }

    /// Like `mark_garbage`, but the relevance tracker does not hear about
    /// `except` being removed.
    pub fn mark_garbage_except(&mut self, c: ClauseRef, except: Lit) {
        self.store.mark_garbage(c, Some(except));
    }

    pub fn protect_reasons(&mut self) {
        for &lit in self.trail.trail() {
            if let Some(c) = self.trail.reason(lit.var()) {
                self.store.clause_mut(c).set_reason(true);
            }
        }
    }

    pub fn unprotect_reasons(&mut self) {
        for &lit in self.trail.trail() {
            if let Some(c) = self.trail.reason(lit.var()) {
                self.store.clause_mut(c).set_reason(false);
            }
        }
    }

    /// Delete every garbage clause that is not a reason, then optionally
    /// move the remaining clauses into a fresh arena.
    pub fn collect(&mut self) {
        profile!("collect");
        self.protect_reasons();
        {
            let store = &self.store;
            self.watches.flush(|w| !store.clause(w.clause).collect());
        }
        let collected = self.store.collect_garbage();
        self.unprotect_reasons();
        if self.opts.arena {
            self.store.arenize();
        }
        debug!(
            "collected {} clauses, {} bytes in total",
            collected, self.store.stats.collected
        );
    }
}
