//! File tools: copy_file, move_file, remove_file, rename.
//!
//! copy_file and move_file accept directories as well as files.

use crate::workspace::{Workspace, io_kind, probe};
use agentdir_core::{ToolError, ToolErrorKind, ToolResult};
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

pub(crate) async fn copy_file(
    ws: &Workspace,
    src: &str,
    dest: &str,
) -> Result<ToolResult, ToolError> {
    let src_path = ws.resolve(src);
    let dest_path = ws.resolve(dest);

    let Ok(src_meta) = tokio::fs::metadata(&src_path).await else {
        return Ok(ToolResult::failure(
            ToolErrorKind::NotFound,
            format!("Source '{src}' doesn't exist"),
        ));
    };

    if src_meta.is_dir() {
        if probe(&dest_path).await.is_some() {
            return Ok(ToolResult::failure(
                ToolErrorKind::AlreadyExists,
                format!("Destination '{dest}' already exists"),
            ));
        }
        let copied = tokio::task::spawn_blocking(move || copy_tree(&src_path, &dest_path))
            .await
            .map_err(|e| ToolError::Internal {
                tool_name: "copy_file".into(),
                reason: e.to_string(),
            })?;
        return Ok(match copied {
            Ok(files) => {
                debug!(files, "Copied directory tree");
                ToolResult::success(format!("Directory '{src}' copied to '{dest}'"))
            }
            Err(e) => ToolResult::failure(
                io_kind(&e),
                format!("Failed to copy directory '{src}' to '{dest}': {e}"),
            ),
        });
    }

    let target = into_existing_dir(&src_path, dest_path).await;
    if same_file(&src_path, &target).await {
        return Ok(ToolResult::failure(
            ToolErrorKind::AlreadyExists,
            format!("'{src}' and '{dest}' are the same file"),
        ));
    }
    Ok(match tokio::fs::copy(&src_path, &target).await {
        Ok(_) => ToolResult::success(format!("File '{src}' copied to '{dest}'")),
        Err(e) => ToolResult::failure(
            io_kind(&e),
            format!("Failed to copy '{src}' to '{dest}': {e}"),
        ),
    })
}

/// Whether both paths exist and name the same file.
async fn same_file(a: &Path, b: &Path) -> bool {
    match (tokio::fs::canonicalize(a).await, tokio::fs::canonicalize(b).await) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Recursively copy `src` to a new directory `dest`, returning the number
/// of files copied.
///
/// The source is listed in full before `dest` is created, so a `dest`
/// inside `src` is never walked into.
fn copy_tree(src: &Path, dest: &Path) -> io::Result<u64> {
    let entries = WalkDir::new(src)
        .into_iter()
        .collect::<Result<Vec<_>, _>>()
        .map_err(io::Error::from)?;

    let mut files = 0;
    for entry in entries {
        let rel = entry
            .path()
            .strip_prefix(src)
            .map_err(io::Error::other)?;
        let target = dest.join(rel);
        if entry.file_type().is_dir() {
            std::fs::create_dir_all(&target)?;
        } else {
            std::fs::copy(entry.path(), &target)?;
            files += 1;
        }
    }
    Ok(files)
}

/// If `dest` is an existing directory, the target is `dest/<src name>`.
async fn into_existing_dir(src: &Path, dest: PathBuf) -> PathBuf {
    let dest_is_dir = tokio::fs::metadata(&dest)
        .await
        .map(|m| m.is_dir())
        .unwrap_or(false);
    match src.file_name() {
        Some(name) if dest_is_dir => dest.join(name),
        _ => dest,
    }
}

pub(crate) async fn move_file(
    ws: &Workspace,
    src: &str,
    dest: &str,
) -> Result<ToolResult, ToolError> {
    let src_path = ws.resolve(src);

    let Some(src_meta) = probe(&src_path).await else {
        return Ok(ToolResult::failure(
            ToolErrorKind::NotFound,
            format!("Source '{src}' doesn't exist"),
        ));
    };

    let dest_path = ws.resolve(dest);
    let nested = tokio::fs::metadata(&dest_path)
        .await
        .map(|m| m.is_dir())
        .unwrap_or(false);
    let target = into_existing_dir(&src_path, dest_path).await;

    if let Some(target_meta) = probe(&target).await {
        // Moving into a directory never overwrites; onto a plain path only
        // a file may replace a file.
        if nested || src_meta.is_dir() || target_meta.is_dir() {
            return Ok(ToolResult::failure(
                ToolErrorKind::AlreadyExists,
                format!(
                    "Cannot move '{src}' to '{dest}': '{}' already exists",
                    target.display()
                ),
            ));
        }
    }

    match tokio::fs::rename(&src_path, &target).await {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::CrossesDevices => {
            debug!(src, dest, "Rename crosses devices, copying instead");
            if let Err(e) = copy_then_remove(src_path, target, src_meta.is_dir()).await? {
                return Ok(ToolResult::failure(
                    io_kind(&e),
                    format!("Failed to move '{src}' to '{dest}': {e}"),
                ));
            }
        }
        Err(e) => {
            return Ok(ToolResult::failure(
                io_kind(&e),
                format!("Failed to move '{src}' to '{dest}': {e}"),
            ));
        }
    }

    Ok(ToolResult::success(format!("'{src}' moved to '{dest}'")))
}

async fn copy_then_remove(
    src: PathBuf,
    target: PathBuf,
    is_dir: bool,
) -> Result<io::Result<()>, ToolError> {
    tokio::task::spawn_blocking(move || {
        if is_dir {
            copy_tree(&src, &target)?;
            std::fs::remove_dir_all(&src)
        } else {
            std::fs::copy(&src, &target)?;
            std::fs::remove_file(&src)
        }
    })
    .await
    .map_err(|e| ToolError::Internal {
        tool_name: "move_file".into(),
        reason: e.to_string(),
    })
}

pub(crate) async fn remove_file(ws: &Workspace, path: &str) -> ToolResult {
    let target = ws.resolve(path);

    let Some(meta) = probe(&target).await else {
        return ToolResult::success(format!("File '{path}' doesn't exist"));
    };
    if meta.is_dir() {
        return ToolResult::failure(
            ToolErrorKind::Io,
            format!("'{path}' is a directory; use remove_dir instead"),
        );
    }

    match tokio::fs::remove_file(&target).await {
        Ok(()) => ToolResult::success(format!("File '{path}' removed")),
        Err(e) => ToolResult::failure(io_kind(&e), format!("Failed to remove '{path}': {e}")),
    }
}

pub(crate) async fn rename(ws: &Workspace, old: &str, new: &str) -> ToolResult {
    let old_path = ws.resolve(old);
    let new_path = ws.resolve(new);

    if probe(&old_path).await.is_none() {
        return ToolResult::failure(ToolErrorKind::NotFound, format!("'{old}' doesn't exist"));
    }
    if probe(&new_path).await.is_some() {
        return ToolResult::failure(
            ToolErrorKind::AlreadyExists,
            format!("'{new}' already exists"),
        );
    }

    match tokio::fs::rename(&old_path, &new_path).await {
        Ok(()) => ToolResult::success(format!("'{old}' renamed to '{new}'")),
        Err(e) => ToolResult::failure(
            io_kind(&e),
            format!("Failed to rename '{old}' to '{new}': {e}"),
        ),
    }
}
