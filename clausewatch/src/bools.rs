// ------
// Variables and literals
// ------

use std::fmt;

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Var(pub i32);

impl Var {
    pub fn idx(&self) -> usize {
        self.0 as usize
    }
}

/// A literal coded as `2 * var + sign`, where a set sign bit means negation.
///
/// Sorting by the code keeps both polarities of a variable next to each
/// other, and two literals can be combined with `^` on their codes.
#[repr(transparent)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Lit(pub i32);

impl Lit {
    pub fn new(Var(var): Var, sign: bool) -> Lit {
        Lit(2 * var + sign as i32)
    }

    pub fn sign(&self) -> bool {
        ((self.0) & 1) != 0
    }

    pub fn var(&self) -> Var {
        Var(self.0 >> 1)
    }

    pub fn idx(&self) -> usize {
        self.0 as usize
    }

    pub fn inverse(&self) -> Lit {
        Lit(self.0 ^ 1)
    }

    /// `3` is variable 2 positive, `-3` its negation.
    pub fn from_dimacs(lit: i32) -> Lit {
        debug_assert!(lit != 0);
        Lit::new(Var(lit.abs() - 1), lit < 0)
    }

    pub fn to_dimacs(&self) -> i32 {
        let v = self.var().0 + 1;
        if self.sign() { -v } else { v }
    }
}

impl std::ops::Not for Lit {
    type Output = Lit;
    fn not(self) -> Lit {
        self.inverse()
    }
}

impl fmt::Display for Lit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.to_dimacs())
    }
}

pub const LIT_UNDEF: Lit = Lit(-2);

#[derive(Debug, Copy, Clone)]
pub struct LBool(u8);

impl PartialEq for LBool {
    fn eq(&self, rhs: &LBool) -> bool {
        ((rhs.0 & 2) & (self.0 & 2)) != 0 || (((rhs.0 & 2) == 0) && rhs.0 == self.0)
    }
}

impl Eq for LBool {}

pub const LBOOL_TRUE: LBool = LBool(0);
pub const LBOOL_FALSE: LBool = LBool(1);
pub const LBOOL_UNDEF: LBool = LBool(2);

impl LBool {
    pub fn xor(&self, b: bool) -> LBool {
        LBool(self.0 ^ (b as u8))
    }

    /// The value a variable gets when `lit` with this sign is made true.
    pub fn from_sign(sign: bool) -> LBool {
        LBool(sign as u8)
    }

    pub fn as_bool(&self) -> Option<bool> {
        if *self == LBOOL_TRUE {
            return Some(true);
        }
        if *self == LBOOL_FALSE {
            return Some(false);
        }
        None
    }
}

impl Default for LBool {
    fn default() -> Self {
        LBOOL_UNDEF
    }
}

impl sattrait::Lit for Lit {}
