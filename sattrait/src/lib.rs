pub trait Lit : std::ops::Not<Output = Self> + Copy + Clone {}

pub trait SatInstance<L : Lit> {
  fn new_var(&mut self) -> L;
  fn add_clause(&mut self, clause :impl IntoIterator<Item = impl Into<L>>);
}

/// Receives clause additions and deletions for proof output.
///
/// Original clauses and finalization events are never forwarded by the
/// propagation engine, so an implementation must not rely on them.
pub trait ProofTracer<L : Lit> {
  fn add_original_clause(&mut self, _id :u64, _redundant :bool, _lits :&[L]) {}

  fn add_derived_clause(&mut self, id :u64, redundant :bool, lits :&[L], antecedents :&[u64]);

  fn delete_clause(&mut self, id :u64, redundant :bool, lits :&[L]);

  fn finalize_clause(&mut self, _id :u64, _lits :&[L]) {}
}

/// Told about every literal of a clause entering or leaving the set of
/// clauses likely to be kept.
pub trait RelevanceTracker<L : Lit> {
  fn added(&mut self, lit :L);
  fn removed(&mut self, lit :L);
}

impl<L : Lit> RelevanceTracker<L> for () {
  fn added(&mut self, _ :L) {}
  fn removed(&mut self, _ :L) {}
}
