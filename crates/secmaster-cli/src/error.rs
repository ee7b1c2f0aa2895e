use thiserror::Error;

/// CLI-level error categories mapped to exit codes.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Validation(#[from] secmaster_core::ValidationError),

    #[error(transparent)]
    Reconcile(#[from] secmaster_core::ReconcileError),

    #[error(transparent)]
    Snapshot(#[from] secmaster_core::SnapshotError),

    #[error(transparent)]
    Master(#[from] secmaster_core::MasterError),

    #[error(transparent)]
    Source(#[from] secmaster_core::SourceError),

    #[error("command error: {0}")]
    Command(String),

    #[error("strict mode failed: warnings={warning_count}, errors={error_count}")]
    StrictModeViolation {
        warning_count: usize,
        error_count: usize,
    },

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Validation(_) => 2,
            Self::Reconcile(_) => 3,
            Self::StrictModeViolation { .. } => 5,
            Self::Snapshot(_)
            | Self::Master(_)
            | Self::Source(_)
            | Self::Command(_)
            | Self::Serialization(_)
            | Self::Io(_) => 10,
        }
    }
}
