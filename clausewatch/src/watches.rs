use crate::bools::*;
use crate::clausedb::{ClauseRef, ClauseStore};
use crate::order::DecisionPolicy;
use crate::trail::{map_insert, Assignment};
use crate::Solver;
use log::{debug, trace};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Watch {
    pub clause: ClauseRef,
    /// Satisfies the clause when true.
    pub blit: Lit,
    pub size: u32,
}

impl Watch {
    pub fn binary(&self) -> bool {
        self.size == 2
    }
}

/// Watch lists indexed by the watched literal.
pub struct WatchTable {
    lists: Vec<Vec<Watch>>,
}

impl WatchTable {
    pub fn new() -> Self {
        WatchTable { lists: Vec::new() }
    }

    pub fn new_var(&mut self, var: Var) {
        map_insert(&mut self.lists, Lit::new(var, false).idx(), Vec::new(), Vec::new());
        map_insert(&mut self.lists, Lit::new(var, true).idx(), Vec::new(), Vec::new());
    }

    pub fn watches(&self, lit: Lit) -> &[Watch] {
        &self.lists[lit.idx()]
    }

    pub fn watch_literal(&mut self, lit: Lit, blit: Lit, clause: ClauseRef, size: usize) {
        debug_assert!(lit != blit);
        trace!("watch {} blit {} in {:?}", lit, blit, clause);
        self.lists[lit.idx()].push(Watch {
            clause,
            blit,
            size: size as u32,
        });
    }

    /// Move a list out for an in-place scan.
    pub(crate) fn take(&mut self, lit: Lit) -> Vec<Watch> {
        std::mem::take(&mut self.lists[lit.idx()])
    }

    /// Put a scanned list back, keeping anything watched meanwhile.
    pub(crate) fn restore(&mut self, lit: Lit, list: Vec<Watch>) {
        let pushed = std::mem::replace(&mut self.lists[lit.idx()], list);
        self.lists[lit.idx()].extend(pushed);
    }

    pub fn clear(&mut self) {
        for list in self.lists.iter_mut() {
            list.clear();
        }
    }

    /// Binary watches first, otherwise in the same order.
    pub fn repack(&mut self) {
        for list in self.lists.iter_mut() {
            list.sort_by_key(|w| !w.binary());
        }
    }

    pub fn flush(&mut self, mut keep: impl FnMut(&Watch) -> bool) {
        for list in self.lists.iter_mut() {
            list.retain(|w| keep(w));
        }
    }

    pub fn len(&self) -> usize {
        self.lists.iter().map(|l| l.len()).sum()
    }
}

impl Default for WatchTable {
    fn default() -> Self {
        Self::new()
    }
}

fn attach(watches: &mut WatchTable, store: &ClauseStore, c: ClauseRef) {
    let lits = store.clause(c).lits();
    watches.watch_literal(lits[0], lits[1], c, lits.len());
    watches.watch_literal(lits[1], lits[0], c, lits.len());
}

/// Move the propagation cursor back to a false watched literal of `c`, so
/// the clause is visited by the next propagation.
fn rewind(trail: &mut Assignment, store: &ClauseStore, c: ClauseRef) {
    let lits = store.clause(c).lits();
    if trail.value(lits[0]) == LBOOL_TRUE || trail.value(lits[1]) == LBOOL_TRUE {
        return;
    }
    for &lit in lits[..2].iter() {
        if trail.value(lit) == LBOOL_FALSE {
            let pos = trail.vardata(lit.var()).trail;
            if pos < trail.propagated {
                trace!("literal {} resets propagated to {}", lit, pos);
                trail.propagated = pos;
            }
        }
    }
}

impl<D: DecisionPolicy> Solver<D> {
    pub fn watch_clause(&mut self, c: ClauseRef) {
        attach(&mut self.watches, &self.store, c);
    }

    /// Reconnect the watched literals of a clause that was just added on
    /// top of an existing assignment.
    pub(crate) fn watch_new_clause(&mut self, c: ClauseRef) {
        attach(&mut self.watches, &self.store, c);
        rewind(&mut self.trail, &self.store, c);
    }

    /// Throw away every watch and watch all live clauses again, binary
    /// clauses first.
    pub fn rebuild_watches(&mut self, irredundant_only: bool) {
        profile!("rebuild_watches");
        debug!("watching all {}clauses", if irredundant_only { "irredundant " } else { "" });
        self.watches.clear();
        let Solver { store, watches, trail, .. } = self;

        for &c in store.clauses() {
            let clause = store.clause(c);
            if (irredundant_only && clause.redundant()) || clause.garbage() || clause.size() > 2 {
                continue;
            }
            attach(watches, store, c);
        }

        for &c in store.clauses() {
            let clause = store.clause(c);
            if (irredundant_only && clause.redundant()) || clause.garbage() || clause.size() == 2 {
                continue;
            }
            attach(watches, store, c);
            if trail.level() == 0 {
                rewind(trail, store, c);
            }
        }
    }

    pub fn repack_watches(&mut self) {
        debug!("sorting watches");
        self.watches.repack();
    }
}
