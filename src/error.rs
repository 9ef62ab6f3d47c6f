use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("window count {0} outside 2..=32")]
    WindowCount(u8),
}

/// Reasons a raw CPU-state dump is refused. Nothing is overlaid on error.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SnapshotError {
    #[error("state dump is empty")]
    Empty,
    #[error("state dump length {0} is not a whole number of words")]
    Misaligned(usize),
    #[error("state dump of {len} bytes exceeds the {max}-byte record")]
    TooLong { len: usize, max: usize },
    #[error("CWP {cwp} in dumped PSR is not below the window count {nwindows}")]
    BadCwp { cwp: u8, nwindows: u8 },
    #[error("unknown pending trap code {0:#x}")]
    UnknownTrap(u32),
}
