//! Copying generated headers into the trusted-application source tree

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Distribution errors
#[derive(Debug, Error)]
pub enum DistributionError {
    #[error("DistributionError: destination directory {} does not exist", .0.display())]
    MissingDestination(PathBuf),

    #[error("DistributionError: destination {} is not a directory", .0.display())]
    NotADirectory(PathBuf),

    #[error("DistributionError: artifact path {} has no file name", .0.display())]
    InvalidArtifact(PathBuf),

    #[error("DistributionError: cannot inspect {}: {source}", .path.display())]
    Inspect {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("DistributionError: failed to copy {} to {}: {source}", .from.display(), .to.display())]
    Copy {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Copy `local_artifact_path` into `destination_dir` under the same file name
///
/// The local file stays where it is. An existing file at the destination is
/// overwritten. The destination directory is never created: if the TA tree
/// is missing the key would silently never reach its build.
///
/// When the destination already resolves to the local artifact itself (the
/// output directory is one of the TA directories), nothing is copied.
pub async fn distribute(
    local_artifact_path: &Path,
    destination_dir: &Path,
) -> Result<PathBuf, DistributionError> {
    let file_name = local_artifact_path
        .file_name()
        .ok_or_else(|| DistributionError::InvalidArtifact(local_artifact_path.to_path_buf()))?;

    match tokio::fs::metadata(destination_dir).await {
        Ok(meta) if meta.is_dir() => {}
        Ok(_) => return Err(DistributionError::NotADirectory(destination_dir.to_path_buf())),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(DistributionError::MissingDestination(destination_dir.to_path_buf()))
        }
        Err(source) => {
            return Err(DistributionError::Inspect {
                path: destination_dir.to_path_buf(),
                source,
            })
        }
    }

    let target = destination_dir.join(file_name);
    if is_same_file(local_artifact_path, &target).await {
        debug!(file = %target.display(), "artifact already in destination");
        return Ok(target);
    }

    debug!(from = %local_artifact_path.display(), to = %target.display(), "copying artifact");

    tokio::fs::copy(local_artifact_path, &target)
        .await
        .map_err(|source| DistributionError::Copy {
            from: local_artifact_path.to_path_buf(),
            to: target.clone(),
            source,
        })?;

    Ok(target)
}

/// Copying a file onto itself truncates it before reading
async fn is_same_file(a: &Path, b: &Path) -> bool {
    match (
        tokio::fs::canonicalize(a).await,
        tokio::fs::canonicalize(b).await,
    ) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
