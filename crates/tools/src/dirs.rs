//! Directory tools: create_dir, remove_dir, list_dir, get_current_dir.

use crate::workspace::{Workspace, io_kind, probe};
use agentdir_core::{ToolErrorKind, ToolResult};
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::io;
use std::path::Path;

/// One row of a `list_dir` listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirEntryInfo {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: EntryKind,
    /// Size in bytes as reported by the filesystem.
    pub size: u64,
    /// Local modification time, `YYYY-MM-DD HH:MM:SS`.
    pub modified: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntryKind {
    File,
    Directory,
}

pub(crate) async fn create_dir(ws: &Workspace, path: &str) -> ToolResult {
    let target = ws.resolve(path);

    if let Ok(meta) = tokio::fs::metadata(&target).await
        && !meta.is_dir()
    {
        return ToolResult::failure(
            ToolErrorKind::AlreadyExists,
            format!("'{path}' already exists and is not a directory"),
        );
    }

    match tokio::fs::create_dir_all(&target).await {
        Ok(()) => ToolResult::success(format!("Directory '{path}' created")),
        Err(e) => ToolResult::failure(
            io_kind(&e),
            format!("Failed to create directory '{path}': {e}"),
        ),
    }
}

pub(crate) async fn remove_dir(ws: &Workspace, path: &str, recursive: bool) -> ToolResult {
    let target = ws.resolve(path);

    let Some(meta) = probe(&target).await else {
        return ToolResult::success(format!("Directory '{path}' doesn't exist"));
    };
    if !meta.is_dir() {
        return ToolResult::failure(
            ToolErrorKind::Io,
            format!("'{path}' is not a directory; use remove_file for files"),
        );
    }

    let outcome = if recursive {
        tokio::fs::remove_dir_all(&target).await
    } else {
        tokio::fs::remove_dir(&target).await
    };

    match outcome {
        Ok(()) => ToolResult::success(format!("Directory '{path}' removed")),
        Err(e) if e.kind() == io::ErrorKind::DirectoryNotEmpty => ToolResult::failure(
            ToolErrorKind::Io,
            format!("Directory '{path}' is not empty; pass recursive=true to remove its contents"),
        ),
        Err(e) => ToolResult::failure(
            io_kind(&e),
            format!("Failed to remove directory '{path}': {e}"),
        ),
    }
}

pub(crate) async fn list_dir(ws: &Workspace, path: &str) -> ToolResult {
    let target = ws.resolve(path);

    match probe(&target).await {
        None => {
            return ToolResult::failure(
                ToolErrorKind::NotFound,
                format!("Directory '{path}' doesn't exist"),
            );
        }
        Some(meta) if !meta.is_dir() && !target.is_dir() => {
            return ToolResult::failure(ToolErrorKind::Io, format!("'{path}' is not a directory"));
        }
        Some(_) => {}
    }

    let entries = match read_entries(&target).await {
        Ok(entries) => entries,
        Err(e) => {
            return ToolResult::failure(
                io_kind(&e),
                format!("Failed to list directory '{path}': {e}"),
            );
        }
    };

    let data = serde_json::to_value(&entries).unwrap_or_default();
    let output = serde_json::to_string_pretty(&entries).unwrap_or_else(|_| "[]".into());
    ToolResult::success(output).with_data(data)
}

async fn read_entries(dir: &Path) -> io::Result<Vec<DirEntryInfo>> {
    let mut reader = tokio::fs::read_dir(dir).await?;
    let mut entries = Vec::new();

    while let Some(entry) = reader.next_entry().await? {
        let full_path = entry.path();
        // Follow symlinks like a plain stat would; dangling links fall back
        // to the link itself.
        let meta = match tokio::fs::metadata(&full_path).await {
            Ok(m) => m,
            Err(_) => tokio::fs::symlink_metadata(&full_path).await?,
        };
        let modified = meta
            .modified()
            .map(|t| {
                DateTime::<Local>::from(t)
                    .format("%Y-%m-%d %H:%M:%S")
                    .to_string()
            })
            .unwrap_or_default();

        entries.push(DirEntryInfo {
            name: entry.file_name().to_string_lossy().into_owned(),
            kind: if meta.is_dir() {
                EntryKind::Directory
            } else {
                EntryKind::File
            },
            size: meta.len(),
            modified,
        });
    }

    entries.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(entries)
}

pub(crate) async fn get_current_dir(ws: &Workspace) -> ToolResult {
    let root = ws.absolute_root().await;
    ToolResult::success(root.display().to_string())
}
