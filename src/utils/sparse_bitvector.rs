use std::{
    fmt,
    ops::{BitAnd, BitOr, BitXor, Sub},
};

use tinyvec::TinyVec;

const BITS_PER_ELEMENT: u32 = u128::BITS;

#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, Debug)]
struct Element {
    index: u32,
    bits: u128,
}

/// A bit set that only stores the 128-bit chunks that have at least one bit set.
///
/// Chunks are kept sorted by their index, so sets over a sparse, wide range of ids (interference
/// matrix rows, per-block liveness) stay small while still supporting ordered iteration and
/// linear-time set algebra. A chunk is dropped as soon as its last bit is cleared, which keeps the
/// representation canonical: two vectors are `==` exactly when they contain the same bits.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct SparseBitVector {
    elements: TinyVec<[Element; 2]>,
}

impl SparseBitVector {
    pub fn new() -> Self {
        Self {
            elements: TinyVec::new(),
        }
    }

    fn split(bit: usize) -> (u32, u128) {
        assert!(bit <= u32::MAX as usize, "bit index {} out of range", bit);
        let bit = bit as u32;
        (bit / BITS_PER_ELEMENT, 1u128 << (bit % BITS_PER_ELEMENT))
    }

    fn find(&self, index: u32) -> Result<usize, usize> {
        self.elements.binary_search_by_key(&index, |element| element.index)
    }

    pub fn test(&self, bit: usize) -> bool {
        let (index, mask) = Self::split(bit);
        match self.find(index) {
            Ok(pos) => self.elements[pos].bits & mask != 0,
            Err(_) => false,
        }
    }

    /// Sets `bit` and returns whether it was already set.
    pub fn set(&mut self, bit: usize) -> bool {
        let (index, mask) = Self::split(bit);
        match self.find(index) {
            Ok(pos) => {
                let element = &mut self.elements[pos];
                let was_set = element.bits & mask != 0;
                element.bits |= mask;
                was_set
            }
            Err(pos) => {
                self.elements.insert(pos, Element { index, bits: mask });
                false
            }
        }
    }

    /// Clears `bit` and returns whether it was set.
    pub fn reset(&mut self, bit: usize) -> bool {
        let (index, mask) = Self::split(bit);
        let Ok(pos) = self.find(index) else {
            return false;
        };

        let element = &mut self.elements[pos];
        let was_set = element.bits & mask != 0;
        element.bits &= !mask;
        if element.bits == 0 {
            self.elements.remove(pos);
        }
        was_set
    }

    pub fn clear(&mut self) {
        self.elements.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn count(&self) -> usize {
        self.elements
            .iter()
            .map(|element| element.bits.count_ones() as usize)
            .sum()
    }

    pub fn intersects(&self, other: &Self) -> bool {
        let (mut i, mut j) = (0, 0);
        while i < self.elements.len() && j < other.elements.len() {
            let (a, b) = (&self.elements[i], &other.elements[j]);
            match a.index.cmp(&b.index) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    if a.bits & b.bits != 0 {
                        return true;
                    }
                    i += 1;
                    j += 1;
                }
            }
        }
        false
    }

    pub fn union_with(&mut self, other: &Self) -> bool {
        let merged = &*self | other;
        let changed = merged != *self;
        *self = merged;
        changed
    }

    pub fn iter(&self) -> Iter<'_> {
        Iter {
            elements: &self.elements,
            pos: 0,
            word: self.elements.first().map(|element| element.bits).unwrap_or(0),
        }
    }

    /// Walks both chunk lists in index order and keeps the non-zero results of `op`.
    /// A chunk missing from one side is treated as zero.
    fn combine(&self, other: &Self, op: impl Fn(u128, u128) -> u128) -> Self {
        let mut result = Self::new();
        let (mut i, mut j) = (0, 0);

        loop {
            let a = self.elements.get(i);
            let b = other.elements.get(j);

            let (index, bits) = match (a, b) {
                (None, None) => break,
                (Some(a), None) => {
                    i += 1;
                    (a.index, op(a.bits, 0))
                }
                (None, Some(b)) => {
                    j += 1;
                    (b.index, op(0, b.bits))
                }
                (Some(a), Some(b)) if a.index < b.index => {
                    i += 1;
                    (a.index, op(a.bits, 0))
                }
                (Some(a), Some(b)) if a.index > b.index => {
                    j += 1;
                    (b.index, op(0, b.bits))
                }
                (Some(a), Some(b)) => {
                    i += 1;
                    j += 1;
                    (a.index, op(a.bits, b.bits))
                }
            };

            if bits != 0 {
                result.elements.push(Element { index, bits });
            }
        }

        result
    }
}

impl BitOr for &SparseBitVector {
    type Output = SparseBitVector;

    fn bitor(self, rhs: Self) -> SparseBitVector {
        self.combine(rhs, |a, b| a | b)
    }
}

impl BitAnd for &SparseBitVector {
    type Output = SparseBitVector;

    fn bitand(self, rhs: Self) -> SparseBitVector {
        self.combine(rhs, |a, b| a & b)
    }
}

impl BitXor for &SparseBitVector {
    type Output = SparseBitVector;

    fn bitxor(self, rhs: Self) -> SparseBitVector {
        self.combine(rhs, |a, b| a ^ b)
    }
}

impl Sub for &SparseBitVector {
    type Output = SparseBitVector;

    fn sub(self, rhs: Self) -> SparseBitVector {
        self.combine(rhs, |a, b| a & !b)
    }
}

impl FromIterator<usize> for SparseBitVector {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        let mut set = Self::new();
        for bit in iter {
            set.set(bit);
        }
        set
    }
}

impl<'a> IntoIterator for &'a SparseBitVector {
    type Item = usize;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Iter<'a> {
        self.iter()
    }
}

impl fmt::Debug for SparseBitVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

pub struct Iter<'a> {
    elements: &'a [Element],
    pos: usize,
    word: u128,
}

impl<'a> Iterator for Iter<'a> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        loop {
            if self.pos >= self.elements.len() {
                return None;
            }

            if self.word != 0 {
                let offset = self.word.trailing_zeros();
                self.word &= self.word - 1;
                let base = self.elements[self.pos].index as usize * BITS_PER_ELEMENT as usize;
                return Some(base + offset as usize);
            }

            self.pos += 1;
            self.word = self.elements.get(self.pos).map(|element| element.bits).unwrap_or(0);
        }
    }
}
