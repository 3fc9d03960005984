/// Knobs of the incremental interference engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Options {
    /// `0` rebuilds interference from scratch on every iteration; `1` and above maintain it
    /// incrementally.
    pub incremental_level: u32,
}

impl Options {
    pub fn incremental() -> Self {
        Self {
            incremental_level: 1,
        }
    }

    pub fn is_incremental(&self) -> bool {
        self.incremental_level >= 1
    }
}
