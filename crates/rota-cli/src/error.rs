//! Error display for the CLI.

use rota_core::domain::{ErrorKind, StateError, StoreError};
use rota_core::RotaError;

/// Print an error in a user-friendly format.
pub fn print_error(err: &anyhow::Error) {
    eprintln!("error: {err:#}");

    let Some(rota_err) = err.chain().find_map(|e| e.downcast_ref::<RotaError>()) else {
        return;
    };
    if let Some(hint) = hint(rota_err) {
        eprintln!("\nhint: {hint}");
    }
}

fn hint(err: &RotaError) -> Option<&'static str> {
    match err {
        RotaError::Store(StoreError::Locked(_)) => {
            Some("another rota command is writing to this directory; retry when it finishes")
        }
        RotaError::State(StateError::Diverged { .. } | StateError::LedgerConflict(_)) => {
            Some("run `rota rebuild` to reset the checkpoint from assignments.json")
        }
        RotaError::State(StateError::SemesterComplete { .. }) => {
            Some("every week is scheduled; `rota init --force` starts a new semester")
        }
        _ if err.kind() == ErrorKind::Config => Some("check rota.toml and re-run `rota init`"),
        _ if err.kind() == ErrorKind::Validation => Some("check roster.toml"),
        _ => None,
    }
}
