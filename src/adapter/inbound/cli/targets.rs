//! Batch input loading.
//!
//! The batch file is CSV with an `address` column (legacy files name it
//! `add`) and optional `memo`, `id`, and `remark` columns. An unreadable or
//! empty file is fatal: the process exits before any withdrawal logic runs.

use std::path::Path;

use tracing::info;

use crate::domain::WithdrawalTarget;
use crate::error::{ConfigError, Error, Result};

/// Load every withdrawal target from `path`, in file order.
pub fn load_targets(path: &Path) -> Result<Vec<WithdrawalTarget>> {
    let mut reader = csv::Reader::from_path(path).map_err(|err| {
        if matches!(err.kind(), csv::ErrorKind::Io(_)) {
            Error::Config(ConfigError::InvalidValue {
                field: "targets_file",
                reason: format!("cannot open {}: {err}", path.display()),
            })
        } else {
            Error::BatchInput(err)
        }
    })?;

    let mut targets = Vec::new();
    for row in reader.deserialize::<WithdrawalTarget>() {
        let mut target = row?;
        target.address = target.address.trim().to_string();
        if target.address.is_empty() {
            continue;
        }
        targets.push(target);
    }

    if targets.is_empty() {
        return Err(Error::Config(ConfigError::InvalidValue {
            field: "targets_file",
            reason: format!("{} contains no targets", path.display()),
        }));
    }

    info!(file = %path.display(), targets = targets.len(), "Loaded withdrawal targets");
    Ok(targets)
}
