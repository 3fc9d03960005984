use bitflags::bitflags;

bitflags! {
    /// Register file a declaration lives in, or the file being allocated by an iteration.
    ///
    /// The empty set is the "undefined" file: no file has been selected yet.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct RegFile: u16 {
        const GRF = 0x1;
        const ADDRESS = 0x2;
        const INPUT = 0x4;
        const FLAG = 0x20;
        const SCALAR = 0x40;
    }
}

impl RegFile {
    pub const UNDEFINED: RegFile = RegFile::empty();

    /// Only general purpose allocation is maintained incrementally. Address, flag and scalar
    /// allocation still mark their candidates on every iteration.
    pub fn supports_incremental(self) -> bool {
        self.contains(RegFile::GRF)
            && !self.intersects(RegFile::ADDRESS | RegFile::FLAG | RegFile::SCALAR)
    }
}

/// Whether a declaration living in `dcl_file` takes part in liveness computed for `selected`.
pub fn liveness_class(dcl_file: RegFile, selected: RegFile) -> bool {
    dcl_file.intersects(selected)
}

impl std::fmt::Display for RegFile {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        if self.is_empty() {
            return write!(f, "undefined");
        }
        bitflags::parser::to_writer(self, f)
    }
}
