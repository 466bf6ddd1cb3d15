/// A unified index into a block's dense per-operand storage: arguments,
/// named locals, and temporaries share one flat address space, laid out in
/// that order.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Operand {
    Argument(usize),
    Local(usize),
    Tmp(usize),
}

impl std::fmt::Display for Operand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Operand::Argument(i) => write!(f, "arg{i}"),
            Operand::Local(i) => write!(f, "loc{i}"),
            Operand::Tmp(i) => write!(f, "tmp{i}"),
        }
    }
}

/// Dense storage addressed by [`Operand`].
///
/// This is the hot path of the analysis state: a fixed-size flat array with
/// arithmetic addressing, deliberately separate from the hash-keyed map used
/// for arbitrary extra nodes.
#[derive(Clone, Debug, PartialEq)]
pub struct Operands<T> {
    num_arguments: usize,
    num_locals: usize,
    num_tmps: usize,
    values: Vec<T>,
}

impl<T: Default> Operands<T> {
    /// Default-filled storage for the given section sizes.
    pub fn new(num_arguments: usize, num_locals: usize, num_tmps: usize) -> Self {
        let size = num_arguments + num_locals + num_tmps;
        Self {
            num_arguments,
            num_locals,
            num_tmps,
            values: std::iter::repeat_with(T::default).take(size).collect(),
        }
    }
}

impl<T> Operands<T> {
    pub fn size(&self) -> usize {
        self.values.len()
    }

    pub fn number_of_arguments(&self) -> usize {
        self.num_arguments
    }

    pub fn number_of_locals(&self) -> usize {
        self.num_locals
    }

    pub fn number_of_tmps(&self) -> usize {
        self.num_tmps
    }

    /// Flat index of an operand. Panics when the section-relative index is
    /// out of range.
    pub fn index_of(&self, operand: Operand) -> usize {
        match operand {
            Operand::Argument(i) => {
                assert!(i < self.num_arguments, "argument index {i} out of range");
                i
            }
            Operand::Local(i) => {
                assert!(i < self.num_locals, "local index {i} out of range");
                self.num_arguments + i
            }
            Operand::Tmp(i) => {
                assert!(i < self.num_tmps, "tmp index {i} out of range");
                self.num_arguments + self.num_locals + i
            }
        }
    }

    /// The operand a flat index addresses. Inverse of [`index_of`](Self::index_of).
    pub fn operand_for_index(&self, index: usize) -> Operand {
        assert!(index < self.size(), "operand index {index} out of range");
        if index < self.num_arguments {
            Operand::Argument(index)
        } else if index < self.num_arguments + self.num_locals {
            Operand::Local(index - self.num_arguments)
        } else {
            Operand::Tmp(index - self.num_arguments - self.num_locals)
        }
    }

    pub fn at_index(&self, index: usize) -> &T {
        &self.values[index]
    }

    pub fn at_index_mut(&mut self, index: usize) -> &mut T {
        &mut self.values[index]
    }

    pub fn operand(&self, operand: Operand) -> &T {
        &self.values[self.index_of(operand)]
    }

    pub fn operand_mut(&mut self, operand: Operand) -> &mut T {
        let index = self.index_of(operand);
        &mut self.values[index]
    }

    pub fn argument(&self, index: usize) -> &T {
        self.operand(Operand::Argument(index))
    }

    pub fn argument_mut(&mut self, index: usize) -> &mut T {
        self.operand_mut(Operand::Argument(index))
    }

    pub fn local(&self, index: usize) -> &T {
        self.operand(Operand::Local(index))
    }

    pub fn local_mut(&mut self, index: usize) -> &mut T {
        self.operand_mut(Operand::Local(index))
    }

    pub fn tmp(&self, index: usize) -> &T {
        self.operand(Operand::Tmp(index))
    }

    pub fn tmp_mut(&mut self, index: usize) -> &mut T {
        self.operand_mut(Operand::Tmp(index))
    }

    pub fn iter(&self) -> impl Iterator<Item = (Operand, &T)> {
        self.values
            .iter()
            .enumerate()
            .map(|(index, value)| (self.operand_for_index(index), value))
    }
}
