use crate::bools::*;
use crate::trail::{var_map_insert, Assignment};
use log::trace;

/// Variable selection and phase heuristics used by the decision step.
pub trait DecisionPolicy {
    fn new_var(&mut self, var: Var);

    /// Called for every literal removed from the trail on backtracking.
    fn unassigned(&mut self, lit: Lit);

    fn next_unassigned_variable(&mut self, assignment: &Assignment) -> Option<Var>;

    /// Preferred value of `var` when deciding it.
    fn phase_target(&self, var: Var) -> bool;

    /// Should `a` be decided before `b`?
    fn better_decision(&self, a: Lit, b: Lit) -> bool;
}

struct OrderHeap {
    heap: Vec<Var>,
    indices: Vec<i32>,
}

impl OrderHeap {
    fn left(i: i32) -> i32 {
        i * 2 + 1
    }
    fn right(i: i32) -> i32 {
        (i + 1) * 2
    }
    fn parent(i: i32) -> i32 {
        (i - 1) >> 1
    }

    fn percolate_up(&mut self, mut i: i32, act: &[f64]) {
        let var = self.heap[i as usize];
        let mut p = Self::parent(i);
        while i != 0 && act[var.idx()] > act[self.heap[p as usize].idx()] {
            self.heap[i as usize] = self.heap[p as usize];
            self.indices[self.heap[p as usize].idx()] = i;
            i = p;
            p = Self::parent(p);
        }
        self.heap[i as usize] = var;
        self.indices[var.idx()] = i;
    }

    fn percolate_down(&mut self, mut i: i32, act: &[f64]) {
        let var = self.heap[i as usize];
        while (Self::left(i) as usize) < self.heap.len() {
            let child = if (Self::right(i) as usize) < self.heap.len()
                && act[self.heap[Self::right(i) as usize].idx()]
                    > act[self.heap[Self::left(i) as usize].idx()]
            {
                Self::right(i)
            } else {
                Self::left(i)
            };

            if !(act[self.heap[child as usize].idx()] > act[var.idx()]) {
                break;
            }

            self.heap[i as usize] = self.heap[child as usize];
            self.indices[self.heap[i as usize].idx()] = i;
            i = child;
        }
        self.heap[i as usize] = var;
        self.indices[var.idx()] = i;
    }

    fn contains(&self, var: Var) -> bool {
        var.idx() < self.indices.len() && self.indices[var.idx()] >= 0
    }

    fn decrease(&mut self, key: Var, act: &[f64]) {
        debug_assert!(self.contains(key));
        self.percolate_up(self.indices[key.idx()], act);
    }

    fn insert(&mut self, key: Var, act: &[f64]) {
        self.indices.resize((key.idx() + 1).max(self.indices.len()), -1);
        debug_assert!(!self.contains(key));
        self.indices[key.idx()] = self.heap.len() as i32;
        self.heap.push(key);
        self.percolate_up(self.indices[key.idx()], act);
    }

    fn remove_min(&mut self, act: &[f64]) -> Option<Var> {
        let var = *self.heap.first()?;
        let last = self.heap[self.heap.len() - 1];
        self.heap[0] = last;
        self.indices[last.idx()] = 0;
        self.indices[var.idx()] = -1;
        self.heap.pop();
        if self.heap.len() > 1 {
            self.percolate_down(0, act);
        }
        Some(var)
    }
}

/// Activity ordered variable selection with phase saving.
pub struct VarOrder {
    heap: OrderHeap,
    activity: Vec<f64>,
    polarity: Vec<bool>,
    var_inc: f64,
    pub var_decay: f64,
    pub initial_phase: bool,
}

impl VarOrder {
    pub fn new() -> Self {
        VarOrder {
            heap: OrderHeap {
                heap: Vec::new(),
                indices: Vec::new(),
            },
            activity: Vec::new(),
            polarity: Vec::new(),
            var_inc: 1.0,
            var_decay: 0.95,
            initial_phase: true,
        }
    }

    pub fn activity(&self, var: Var) -> f64 {
        self.activity[var.idx()]
    }

    pub fn bump(&mut self, var: Var) {
        self.activity[var.idx()] += self.var_inc;
        if self.activity[var.idx()] > 1e100 {
            // rescale
            for act in self.activity.iter_mut() {
                *act *= 1e-100;
            }
            self.var_inc *= 1e-100;
        }
        if self.heap.contains(var) {
            self.heap.decrease(var, &self.activity);
        }
    }

    pub fn decay(&mut self) {
        self.var_inc *= 1.0 / self.var_decay;
    }
}

impl Default for VarOrder {
    fn default() -> Self {
        Self::new()
    }
}

impl DecisionPolicy for VarOrder {
    fn new_var(&mut self, var: Var) {
        var_map_insert(&mut self.activity, var, 0.0, 0.0);
        var_map_insert(&mut self.polarity, var, self.initial_phase, self.initial_phase);
        if !self.heap.contains(var) {
            self.heap.insert(var, &self.activity);
        }
    }

    fn unassigned(&mut self, lit: Lit) {
        self.polarity[lit.var().idx()] = !lit.sign();
        if !self.heap.contains(lit.var()) {
            self.heap.insert(lit.var(), &self.activity);
        }
    }

    fn next_unassigned_variable(&mut self, assignment: &Assignment) -> Option<Var> {
        while let Some(var) = self.heap.remove_min(&self.activity) {
            if assignment.var_value(var) == LBOOL_UNDEF {
                trace!("next decision variable {:?}", var);
                return Some(var);
            }
        }
        None
    }

    fn phase_target(&self, var: Var) -> bool {
        self.polarity[var.idx()]
    }

    fn better_decision(&self, a: Lit, b: Lit) -> bool {
        self.activity[a.var().idx()] > self.activity[b.var().idx()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup(vars: i32) -> (VarOrder, Assignment) {
        let mut order = VarOrder::new();
        let mut assignment = Assignment::new();
        for v in 0..vars {
            assignment.new_var(Var(v));
            order.new_var(Var(v));
        }
        (order, assignment)
    }

    #[test]
    fn bumped_variables_are_decided_first() {
        let (mut order, mut assignment) = setup(4);
        order.bump(Var(2));
        order.decay();
        order.bump(Var(1));
        assert!(order.activity(Var(1)) > order.activity(Var(2)));
        assert!(order.better_decision(Lit::new(Var(1), true), Lit::new(Var(2), false)));
        assert!(order.better_decision(Lit::new(Var(2), false), Lit::new(Var(0), false)));
        assert!(!order.better_decision(Lit::new(Var(0), false), Lit::new(Var(3), false)));

        assignment.assign(Lit::new(Var(1), false), 0, None);
        assert_eq!(order.next_unassigned_variable(&assignment), Some(Var(2)));
        assert_eq!(order.activity(Var(1)), 1.0 / 0.95);
    }

    #[test]
    fn unassigned_variables_return_with_saved_phase() {
        let (mut order, mut assignment) = setup(3);
        order.bump(Var(0));
        assert_eq!(order.next_unassigned_variable(&assignment), Some(Var(0)));
        assert!(order.phase_target(Var(0)));

        assignment.new_decision_level();
        assignment.assign(Lit::new(Var(0), true), 1, None);
        assignment.backtrack(0, |lit| order.unassigned(lit));
        assert!(!order.phase_target(Var(0)));
        assert_eq!(order.next_unassigned_variable(&assignment), Some(Var(0)));
    }

    #[test]
    fn large_activities_are_rescaled() {
        let (mut order, assignment) = setup(3);
        order.var_decay = 1e-60;
        order.bump(Var(1));
        order.decay();
        order.bump(Var(2));
        order.decay();
        order.bump(Var(0));
        assert!(order.activity(Var(0)) <= 1e100);
        assert!(order.activity(Var(0)) > order.activity(Var(2)));
        assert!(order.activity(Var(2)) > order.activity(Var(1)));
        assert_eq!(order.next_unassigned_variable(&assignment), Some(Var(0)));
        assert_eq!(order.next_unassigned_variable(&assignment), Some(Var(2)));
        assert_eq!(order.next_unassigned_variable(&assignment), Some(Var(1)));
        assert_eq!(order.next_unassigned_variable(&assignment), None);
    }
}
