use crate::bools::*;
use crate::clausedb::ClauseRef;
use log::trace;

#[derive(Debug, Default, Copy, Clone)]
pub struct VariableData {
    pub reason: Option<ClauseRef>,
    pub level: u32,
    pub trail: usize,
}

/// Current values, the trail of assigned literals and the level control
/// stack.  A level may be opened without a decision literal (pseudo level).
pub struct Assignment {
    assigns: Vec<LBool>,
    vardata: Vec<VariableData>,
    trail: Vec<Lit>,
    trail_lim: Vec<usize>,
    /// Trail literals before this index have had their watches visited.
    pub propagated: usize,
}

impl Assignment {
    pub fn new() -> Self {
        Assignment {
            assigns: Vec::new(),
            vardata: Vec::new(),
            trail: Vec::new(),
            trail_lim: Vec::new(),
            propagated: 0,
        }
    }

    pub fn new_var(&mut self, var: Var) {
        var_map_insert(&mut self.assigns, var, LBOOL_UNDEF, LBOOL_UNDEF);
        var_map_insert(&mut self.vardata, var, Default::default(), Default::default());
    }

    pub fn num_vars(&self) -> usize {
        self.assigns.len()
    }

    pub fn num_assigned(&self) -> usize {
        self.trail.len()
    }

    pub fn var_value(&self, var: Var) -> LBool {
        self.assigns[var.idx()]
    }

    pub fn value(&self, lit: Lit) -> LBool {
        self.assigns[lit.var().idx()].xor(lit.sign())
    }

    pub fn vardata(&self, var: Var) -> &VariableData {
        &self.vardata[var.idx()]
    }

    pub fn var_level(&self, var: Var) -> u32 {
        self.vardata[var.idx()].level
    }

    pub fn reason(&self, var: Var) -> Option<ClauseRef> {
        self.vardata[var.idx()].reason
    }

    pub fn trail(&self) -> &[Lit] {
        &self.trail
    }

    /// Current decision level.
    pub fn level(&self) -> u32 {
        self.trail_lim.len() as u32
    }

    pub fn new_decision_level(&mut self) {
        self.trail_lim.push(self.trail.len());
    }

    pub fn assign(&mut self, lit: Lit, level: u32, reason: Option<ClauseRef>) {
        debug_assert!(self.value(lit) == LBOOL_UNDEF);
        debug_assert!(level <= self.level());
        trace!("assign {} @{} reason {:?}", lit, level, reason);
        self.assigns[lit.var().idx()] = LBool::from_sign(lit.sign());
        self.vardata[lit.var().idx()] = VariableData {
            reason,
            level,
            trail: self.trail.len(),
        };
        self.trail.push(lit);
    }

    /// Undo every assignment above `level`.  Literals implied out of order
    /// at a lower level stay on the trail and are visited again.
    pub fn backtrack(&mut self, level: u32, mut unassigned: impl FnMut(Lit)) {
        if self.level() <= level {
            return;
        }
        let start = self.trail_lim[level as usize];
        let mut j = start;
        for i in start..self.trail.len() {
            let lit = self.trail[i];
            let var = lit.var();
            if self.vardata[var.idx()].level > level {
                self.assigns[var.idx()] = LBOOL_UNDEF;
                unassigned(lit);
            } else {
                trace!("keeping out-of-order {} @{}", lit, self.vardata[var.idx()].level);
                self.trail[j] = lit;
                self.vardata[var.idx()].trail = j;
                j += 1;
            }
        }
        trace!("trail {} -> {}", self.trail.len(), j);
        self.trail.truncate(j);
        self.trail_lim.truncate(level as usize);
        self.propagated = self.propagated.min(start);
    }
}

impl Default for Assignment {
    fn default() -> Self {
        Self::new()
    }
}

pub fn var_map_insert<T: Clone>(map: &mut Vec<T>, Var(idx): Var, value: T, default: T) {
    map_insert(map, idx as usize, value, default)
}

pub fn map_insert<T: Clone>(map: &mut Vec<T>, idx: usize, value: T, default: T) {
    map.resize((idx + 1).max(map.len()), default);
    map[idx] = value;
}
