use crate::arena::ClauseArena;
use crate::bools::*;
use crate::params::Options;
use bitfield::bitfield;
use log::{debug, trace};
use sattrait::{ProofTracer, RelevanceTracker};

bitfield! {
    #[derive(Clone, Copy)]
    pub struct ClauseHeader(u32);
    impl Debug;
    pub redundant, set_redundant :0;
    pub garbage, set_garbage :1;
    pub reason, set_reason :2;
    pub moved, set_moved :3;
    pub have_pos, set_have_pos :4;
    pub have_glue, set_have_glue :5;
    pub have_analyzed, set_have_analyzed :6;
}

// Word offsets of the fields of a clause that has every optional field.
// The optional fields come first, ordered so that the absent ones always
// form a prefix ('analyzed' needs 'glue', 'glue' needs 'pos').  A record
// only stores the fields from the first present one onwards and remembers
// how many words it skipped, so all accessors use these fixed offsets.
const ANALYZED: usize = 0; // two words
const GLUE: usize = 2;
const POS: usize = 3;
const ID: usize = 4; // two words
const HEADER: usize = 6;
const SIZE: usize = 7;
const LITS: usize = 8;

pub const WORD: usize = std::mem::size_of::<u32>();

/// Bytes of a binary clause with all optional fields present.
pub const HEADER_BYTES: usize = (LITS + 2) * WORD;

fn absent_words(have_pos: bool, have_glue: bool, have_analyzed: bool) -> usize {
    debug_assert!(!have_glue || have_pos);
    debug_assert!(!have_analyzed || have_glue);
    if !have_pos {
        ID - ANALYZED
    } else if !have_glue {
        POS - ANALYZED
    } else if !have_analyzed {
        GLUE - ANALYZED
    } else {
        0
    }
}

fn as_lits(words: &[u32]) -> &[Lit] {
    // `Lit` is a transparent `i32`, same size and alignment as `u32`.
    unsafe { std::slice::from_raw_parts(words.as_ptr() as *const Lit, words.len()) }
}

fn as_lits_mut(words: &mut [u32]) -> &mut [Lit] {
    unsafe { std::slice::from_raw_parts_mut(words.as_mut_ptr() as *mut Lit, words.len()) }
}

/// Stable handle of a clause record.  Stays valid when the clause is moved
/// into the arena and is recycled only after the clause is deleted.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClauseRef(u32);

impl ClauseRef {
    pub fn idx(&self) -> usize {
        self.0 as usize
    }
}

#[derive(Clone, Copy)]
pub struct Clause<'a> {
    words: &'a [u32],
    shift: usize,
}

impl<'a> Clause<'a> {
    fn at(&self, field: usize) -> u32 {
        self.words[field - self.shift]
    }

    fn at_u64(&self, field: usize) -> u64 {
        self.at(field) as u64 | (self.at(field + 1) as u64) << 32
    }

    pub fn header(&self) -> ClauseHeader {
        ClauseHeader(self.at(HEADER))
    }

    pub fn redundant(&self) -> bool {
        self.header().redundant()
    }

    pub fn garbage(&self) -> bool {
        self.header().garbage()
    }

    pub fn reason(&self) -> bool {
        self.header().reason()
    }

    pub fn moved(&self) -> bool {
        self.header().moved()
    }

    /// Garbage clauses not protected as reasons can be deleted.
    pub fn collect(&self) -> bool {
        let header = self.header();
        !header.reason() && header.garbage()
    }

    pub fn id(&self) -> u64 {
        self.at_u64(ID)
    }

    pub fn size(&self) -> usize {
        self.at(SIZE) as usize
    }

    /// Where the next replacement search starts.  Clauses without a stored
    /// cursor always search from the first unwatched literal.
    pub fn pos(&self) -> usize {
        if self.header().have_pos() {
            self.at(POS) as usize
        } else {
            2
        }
    }

    pub fn glue(&self) -> u32 {
        if self.header().have_glue() {
            self.at(GLUE)
        } else {
            0
        }
    }

    pub fn analyzed(&self) -> Option<u64> {
        if self.header().have_analyzed() {
            Some(self.at_u64(ANALYZED))
        } else {
            None
        }
    }

    pub fn lits(&self) -> &'a [Lit] {
        as_lits(&self.words[LITS - self.shift..])
    }

    /// Bytes skipped in front of the record for absent optional fields.
    pub fn offset(&self) -> usize {
        let header = self.header();
        absent_words(header.have_pos(), header.have_glue(), header.have_analyzed()) * WORD
    }

    pub fn bytes(&self) -> usize {
        HEADER_BYTES + (self.size() - 2) * WORD - self.offset()
    }

    /// Bytes actually backing this record.
    pub fn allocated_bytes(&self) -> usize {
        self.words.len() * WORD
    }

    fn start(&self) -> *const u32 {
        self.words.as_ptr()
    }
}

pub struct ClauseMut<'a> {
    words: &'a mut [u32],
    shift: usize,
}

impl<'a> ClauseMut<'a> {
    pub fn view(&self) -> Clause<'_> {
        Clause {
            words: &*self.words,
            shift: self.shift,
        }
    }

    fn set(&mut self, field: usize, value: u32) {
        self.words[field - self.shift] = value;
    }

    fn set_u64(&mut self, field: usize, value: u64) {
        self.set(field, value as u32);
        self.set(field + 1, (value >> 32) as u32);
    }

    fn update_header(&mut self, f: impl FnOnce(&mut ClauseHeader)) {
        let mut header = self.view().header();
        f(&mut header);
        self.set(HEADER, header.0);
    }

    pub fn garbage(&self) -> bool {
        self.view().garbage()
    }

    pub fn size(&self) -> usize {
        self.view().size()
    }

    pub fn set_garbage(&mut self, garbage: bool) {
        self.update_header(|h| h.set_garbage(garbage));
    }

    pub fn set_reason(&mut self, reason: bool) {
        self.update_header(|h| h.set_reason(reason));
    }

    fn set_moved(&mut self, moved: bool) {
        self.update_header(|h| h.set_moved(moved));
    }

    pub fn set_pos(&mut self, pos: usize) {
        if self.view().header().have_pos() {
            self.set(POS, pos as u32);
        }
    }

    pub fn lits_mut(&mut self) -> &mut [Lit] {
        as_lits_mut(&mut self.words[LITS - self.shift..])
    }

    /// The search cursor, if the clause stores one, together with the
    /// literals.
    pub fn pos_and_lits_mut(&mut self) -> (Option<&mut u32>, &mut [Lit]) {
        let have_pos = self.view().header().have_pos();
        let (head, tail) = self.words.split_at_mut(LITS - self.shift);
        let pos = if have_pos {
            Some(&mut head[POS - self.shift])
        } else {
            None
        };
        (pos, as_lits_mut(tail))
    }
}

enum Record {
    Free,
    Heap { words: Box<[u32]>, shift: u8 },
    Arena { start: u32, len: u32, shift: u8 },
}

fn view<'a>(records: &'a [Record], arena: &'a ClauseArena, c: ClauseRef) -> Clause<'a> {
    match &records[c.idx()] {
        Record::Heap { words, shift } => Clause {
            words,
            shift: *shift as usize,
        },
        Record::Arena { start, len, shift } => Clause {
            words: arena.words(*start, *len),
            shift: *shift as usize,
        },
        Record::Free => panic!("clause {:?} used after deletion", c),
    }
}

fn view_mut<'a>(
    records: &'a mut [Record],
    arena: &'a mut ClauseArena,
    c: ClauseRef,
) -> ClauseMut<'a> {
    match &mut records[c.idx()] {
        Record::Heap { words, shift } => ClauseMut {
            words,
            shift: *shift as usize,
        },
        Record::Arena { start, len, shift } => ClauseMut {
            words: arena.words_mut(*start, *len),
            shift: *shift as usize,
        },
        Record::Free => panic!("clause {:?} used after deletion", c),
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ClauseStats {
    pub redundant: u64,
    pub irredundant: u64,
    pub garbage: u64,
    /// Bytes of deleted clauses.
    pub collected: u64,
    /// Bytes of clauses not yet deleted.
    pub allocated: u64,
    pub analyzed: u64,
    pub ids: u64,
    pub added: u64,
    pub deleted: u64,
}

pub struct ClauseStore {
    records: Vec<Record>,
    free_refs: Vec<ClauseRef>,
    clauses: Vec<ClauseRef>,
    arena: ClauseArena,
    pub stats: ClauseStats,
    proof: Option<Box<dyn ProofTracer<Lit>>>,
    relevance: Box<dyn RelevanceTracker<Lit>>,
}

impl ClauseStore {
    pub fn new() -> Self {
        ClauseStore {
            records: Vec::new(),
            free_refs: Vec::new(),
            clauses: Vec::new(),
            arena: ClauseArena::new(),
            stats: Default::default(),
            proof: None,
            relevance: Box::new(()),
        }
    }

    pub fn set_proof_tracer(&mut self, proof: Box<dyn ProofTracer<Lit>>) {
        self.proof = Some(proof);
    }

    pub fn set_relevance_tracker(&mut self, relevance: Box<dyn RelevanceTracker<Lit>>) {
        self.relevance = relevance;
    }

    /// Every clause not yet deleted, in the order they were added.
    pub fn clauses(&self) -> &[ClauseRef] {
        &self.clauses
    }

    pub fn clause(&self, c: ClauseRef) -> Clause<'_> {
        view(&self.records, &self.arena, c)
    }

    pub fn clause_mut(&mut self, c: ClauseRef) -> ClauseMut<'_> {
        view_mut(&mut self.records, &mut self.arena, c)
    }

    pub fn arena(&self) -> &ClauseArena {
        &self.arena
    }

    pub fn in_arena(&self, c: ClauseRef) -> bool {
        self.arena.contains(self.clause(c).start())
    }

    fn insert(&mut self, record: Record) -> ClauseRef {
        if let Some(c) = self.free_refs.pop() {
            self.records[c.idx()] = record;
            c
        } else {
            self.records.push(record);
            ClauseRef((self.records.len() - 1) as u32)
        }
    }

    // Redundant clauses of large glue and large size carry an 'analyzed'
    // time stamp, other optional fields are dropped whenever the clause
    // kind and size make them useless.  The record is allocated without the
    // absent fields.

    pub fn new_clause(
        &mut self,
        lits: &[Lit],
        redundant: bool,
        glue: u32,
        opts: &Options,
    ) -> ClauseRef {
        assert!(lits.len() <= u32::MAX as usize);
        let size = lits.len();
        assert!(size >= 2);

        let (have_pos, have_glue, have_analyzed) = if size == 2 {
            (false, false, false)
        } else if redundant {
            (true, true, size > opts.keep_size && glue > opts.keep_glue)
        } else {
            (size > 3, false, false)
        };

        let shift = absent_words(have_pos, have_glue, have_analyzed);
        let mut words = vec![0u32; LITS - shift + size].into_boxed_slice();

        let mut header = ClauseHeader(0);
        header.set_redundant(redundant);
        header.set_have_pos(have_pos);
        header.set_have_glue(have_glue);
        header.set_have_analyzed(have_analyzed);

        self.stats.ids += 1;
        let bytes = {
            let mut c = ClauseMut {
                words: &mut words,
                shift,
            };
            c.set(HEADER, header.0);
            c.set(SIZE, size as u32);
            c.set_u64(ID, self.stats.ids);
            if have_analyzed {
                self.stats.analyzed += 1;
                c.set_u64(ANALYZED, self.stats.analyzed);
            }
            if have_glue {
                c.set(GLUE, glue);
            }
            if have_pos {
                c.set(POS, 2);
            }
            c.lits_mut().copy_from_slice(lits);
            debug_assert_eq!(c.view().offset(), shift * WORD);
            debug_assert_eq!(c.view().bytes(), c.view().allocated_bytes());
            c.view().bytes()
        };

        let cref = self.insert(Record::Heap {
            words,
            shift: shift as u8,
        });

        if redundant {
            self.stats.redundant += 1;
        } else {
            self.stats.irredundant += 1;
        }
        self.stats.added += 1;
        self.stats.allocated += bytes as u64;
        self.clauses.push(cref);
        trace!(
            "new {} clause {:?} {:?}",
            if redundant { "redundant" } else { "irredundant" },
            cref,
            lits
        );

        if self.likely_to_be_kept(cref, opts) {
            self.mark_added(cref, opts);
        }
        cref
    }

    pub fn likely_to_be_kept(&self, c: ClauseRef, opts: &Options) -> bool {
        let clause = self.clause(c);
        if !clause.redundant() {
            return true;
        }
        let glue = clause.glue();
        if glue <= opts.tier1_glue {
            return true;
        }
        glue <= opts.kept_glue && clause.size() <= opts.kept_size
    }

    pub fn mark_added(&mut self, c: ClauseRef, opts: &Options) {
        debug_assert!(self.likely_to_be_kept(c, opts));
        trace!("marking added {:?}", c);
        let ClauseStore { records, arena, relevance, .. } = self;
        for &lit in view(records, arena, c).lits() {
            relevance.added(lit);
        }
    }

    pub fn mark_removed(&mut self, c: ClauseRef, except: Option<Lit>) {
        trace!("marking removed {:?}", c);
        let ClauseStore { records, arena, relevance, .. } = self;
        let clause = view(records, arena, c);
        debug_assert!(!clause.redundant());
        for &lit in clause.lits() {
            if Some(lit) != except {
                relevance.removed(lit);
            }
        }
    }

    // Statistics are updated as soon as a clause is marked, even though its
    // memory is only reclaimed by the next collection.

    pub fn mark_garbage(&mut self, c: ClauseRef, except: Option<Lit>) {
        let redundant = {
            let mut clause = self.clause_mut(c);
            debug_assert!(!clause.garbage());
            clause.set_garbage(true);
            clause.view().redundant()
        };
        if redundant {
            debug_assert!(self.stats.redundant > 0);
            self.stats.redundant -= 1;
        } else {
            debug_assert!(self.stats.irredundant > 0);
            self.stats.irredundant -= 1;
        }
        self.stats.garbage += 1;
        if !redundant {
            self.mark_removed(c, except);
        }
    }

    pub fn trace_add_clause(&mut self, c: ClauseRef, antecedents: &[u64]) {
        let ClauseStore { records, arena, proof, .. } = self;
        if let Some(proof) = proof {
            let clause = view(records, arena, c);
            proof.add_derived_clause(clause.id(), clause.redundant(), clause.lits(), antecedents);
        }
    }

    /// Release a clause.  The proof tracer hears about the deletion here,
    /// which for binary clauses is the first point where no watch can still
    /// propagate them.  Does not touch the clause registry.
    pub fn delete_clause(&mut self, c: ClauseRef) {
        {
            let ClauseStore { records, arena, stats, proof, .. } = self;
            let clause = view(records, arena, c);
            trace!("delete {:?}", c);
            let bytes = clause.bytes() as u64;
            stats.collected += bytes;
            stats.allocated -= bytes;
            stats.deleted += 1;
            if clause.garbage() {
                debug_assert!(stats.garbage > 0);
                stats.garbage -= 1;
            }
            if let Some(proof) = proof {
                proof.delete_clause(clause.id(), clause.redundant(), clause.lits());
            }
        }
        self.deallocate_clause(c);
    }

    // Clauses inside the arena are left to the next compaction, everything
    // else is freed right away.

    fn deallocate_clause(&mut self, c: ClauseRef) {
        let (start, words) = {
            let clause = self.clause(c);
            (clause.start(), clause.words.len())
        };
        let record = std::mem::replace(&mut self.records[c.idx()], Record::Free);
        if self.arena.contains(start) {
            self.arena.release(words);
        } else {
            trace!("deallocate {:?}", c);
            drop(record);
        }
        self.free_refs.push(c);
    }

    /// Delete every collectable clause and drop it from the registry.
    pub fn collect_garbage(&mut self) -> usize {
        let mut dead = Vec::new();
        {
            let ClauseStore { records, arena, clauses, .. } = self;
            clauses.retain(|&c| {
                if view(records, arena, c).collect() {
                    dead.push(c);
                    false
                } else {
                    true
                }
            });
        }
        for &c in dead.iter() {
            self.delete_clause(c);
        }
        debug!("collected {} clauses", dead.len());
        dead.len()
    }

    /// Copy every remaining clause into a fresh arena, in registry order.
    /// Handles stay the same; the previous arena is dropped as a whole.
    pub fn arenize(&mut self) {
        let words: usize = self
            .clauses
            .iter()
            .map(|&c| self.clause(c).words.len())
            .sum();
        let mut fresh = ClauseArena::with_capacity(words);
        for &c in self.clauses.iter() {
            let record = &mut self.records[c.idx()];
            let moved = match record {
                Record::Heap { words, shift } => {
                    let len = words.len() as u32;
                    let start = fresh.copy(&words[..]);
                    ClauseMut {
                        words: &mut words[..],
                        shift: *shift as usize,
                    }
                    .set_moved(true);
                    Record::Arena { start, len, shift: *shift }
                }
                Record::Arena { start, len, shift } => {
                    let old = self.arena.words_mut(*start, *len);
                    let start = fresh.copy(old);
                    ClauseMut {
                        words: old,
                        shift: *shift as usize,
                    }
                    .set_moved(true);
                    Record::Arena {
                        start,
                        len: *len,
                        shift: *shift,
                    }
                }
                Record::Free => panic!("deleted clause {:?} in registry", c),
            };
            *record = moved;
        }
        debug!(
            "moved {} clauses ({} words) to arena, {} words wasted before",
            self.clauses.len(),
            words,
            self.arena.wasted()
        );
        self.arena = fresh;
    }
}

impl Default for ClauseStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Sort the literals, drop duplicates and report whether the clause
/// contains a literal together with its negation.
pub fn filter_tautology(clause: &mut Vec<Lit>) -> bool {
    clause.sort();
    let mut prev = LIT_UNDEF;
    let mut j = 0;
    for i in 0..clause.len() {
        let lit = clause[i];
        if lit == !prev {
            return true;
        }
        if lit != prev {
            clause[j] = lit;
            prev = lit;
            j += 1;
        }
    }
    if j != clause.len() {
        trace!("removing {} duplicates", clause.len() - j);
        clause.truncate(j);
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lits(ls: &[i32]) -> Vec<Lit> {
        ls.iter().map(|&l| Lit::from_dimacs(l)).collect()
    }

    #[test]
    fn absent_fields_form_a_prefix() {
        assert_eq!(absent_words(false, false, false), 4);
        assert_eq!(absent_words(true, false, false), 3);
        assert_eq!(absent_words(true, true, false), 2);
        assert_eq!(absent_words(true, true, true), 0);
    }

    #[test]
    fn record_size_matches_present_fields() {
        let opts = Options::default();
        let mut store = ClauseStore::new();
        let cases: Vec<(Vec<i32>, bool, u32, usize)> = vec![
            (vec![1, 2], false, 0, 16),
            (vec![1, 2], true, 0, 16),
            (vec![1, 2, 3], false, 0, 16),
            (vec![1, 2, 3, 4], false, 0, 12),
            (vec![1, 2, 3], true, 5, 8),
            (vec![1, 2, 3, 4], true, 2, 8),
            (vec![1, 2, 3, 4], true, 3, 0),
        ];
        for (ls, red, glue, offset) in cases {
            let c = store.new_clause(&lits(&ls), red, glue, &opts);
            let clause = store.clause(c);
            assert_eq!(clause.offset(), offset, "{:?}", ls);
            assert_eq!(clause.bytes(), HEADER_BYTES + (ls.len() - 2) * WORD - offset);
            assert_eq!(clause.allocated_bytes(), clause.bytes());
            assert_eq!(clause.lits(), &lits(&ls)[..]);
            assert_eq!(clause.redundant(), red);
        }
    }

    #[test]
    fn optional_fields_read_back() {
        let opts = Options::default();
        let mut store = ClauseStore::new();
        let a = store.new_clause(&lits(&[1, -2, 3, 4, 5]), true, 4, &opts);
        let b = store.new_clause(&lits(&[-1, 2, 3, 4, -5]), true, 6, &opts);
        let ca = store.clause(a);
        assert_eq!((ca.pos(), ca.glue(), ca.analyzed()), (2, 4, Some(1)));
        let cb = store.clause(b);
        assert_eq!((cb.pos(), cb.glue(), cb.analyzed()), (2, 6, Some(2)));
        assert_eq!(ca.id() + 1, cb.id());

        store.clause_mut(a).set_pos(4);
        assert_eq!(store.clause(a).pos(), 4);
        assert_eq!(store.clause(a).glue(), 4);
    }

    #[test]
    fn ternary_irredundant_has_no_cursor() {
        let opts = Options::default();
        let mut store = ClauseStore::new();
        let c = store.new_clause(&lits(&[1, 2, 3]), false, 0, &opts);
        store.clause_mut(c).set_pos(3);
        assert_eq!(store.clause(c).pos(), 2);
        let mut clause = store.clause_mut(c);
        let (pos, ls) = clause.pos_and_lits_mut();
        assert!(pos.is_none());
        assert_eq!(ls.len(), 3);
    }

    #[test]
    fn arena_keeps_handles_and_defers_reclamation() {
        let opts = Options::default();
        let mut store = ClauseStore::new();
        let a = store.new_clause(&lits(&[1, 2]), false, 0, &opts);
        let b = store.new_clause(&lits(&[1, 2, 3, 4]), true, 3, &opts);
        store.arenize();
        assert!(store.in_arena(a) && store.in_arena(b));
        assert!(!store.clause(a).moved());
        assert_eq!(store.clause(b).lits(), &lits(&[1, 2, 3, 4])[..]);
        assert_eq!(store.clause(b).glue(), 3);

        let words = store.arena().len();
        store.mark_garbage(b, None);
        assert_eq!(store.collect_garbage(), 1);
        assert_eq!(store.arena().len(), words);
        assert_eq!(store.arena().wasted(), words - 6);

        store.arenize();
        assert_eq!(store.arena().len(), 6);
        assert_eq!(store.arena().wasted(), 0);
    }
}
