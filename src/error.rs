pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Several jobs of a batch would write to the same files.
    #[error("more than one job is named {name}")]
    DuplicateJob { name: String },

    /// A rule refers to a reason that was never declared.
    #[error("line {lineno}: reason index {index} out of range ({count} reasons declared)")]
    UnresolvedReason {
        lineno: usize,
        index: usize,
        count: usize,
    },
}
