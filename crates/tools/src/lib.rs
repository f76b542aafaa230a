//! Filesystem tools for agentdir.
//!
//! The eight operations the agent can perform on its working directory,
//! as a closed set of [`FsToolKind`]s. Each kind is bound to a shared
//! [`Workspace`] through [`FsTool`], which implements the uniform
//! [`Tool`] trait so the registry can describe and dispatch it.

mod dirs;
mod files;
pub mod workspace;

pub use dirs::{DirEntryInfo, EntryKind};
pub use workspace::Workspace;

use agentdir_core::error::ToolError;
use agentdir_core::tool::{ParamSpec, ParamType, Tool, ToolRegistry, ToolResult};
use async_trait::async_trait;
use serde_json::{Value, json};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

/// The built-in filesystem operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FsToolKind {
    CreateDir,
    RemoveDir,
    ListDir,
    GetCurrentDir,
    CopyFile,
    MoveFile,
    RemoveFile,
    Rename,
}

impl FsToolKind {
    /// Every kind, in registration order.
    pub const ALL: [FsToolKind; 8] = [
        FsToolKind::CreateDir,
        FsToolKind::RemoveDir,
        FsToolKind::ListDir,
        FsToolKind::GetCurrentDir,
        FsToolKind::CopyFile,
        FsToolKind::MoveFile,
        FsToolKind::RemoveFile,
        FsToolKind::Rename,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            FsToolKind::CreateDir => "create_dir",
            FsToolKind::RemoveDir => "remove_dir",
            FsToolKind::ListDir => "list_dir",
            FsToolKind::GetCurrentDir => "get_current_dir",
            FsToolKind::CopyFile => "copy_file",
            FsToolKind::MoveFile => "move_file",
            FsToolKind::RemoveFile => "remove_file",
            FsToolKind::Rename => "rename",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            FsToolKind::CreateDir => {
                "Create a directory if it doesn't exist. Parent directories are created as needed."
            }
            FsToolKind::RemoveDir => {
                "Remove a directory. With recursive=true the directory and all its contents are \
                 removed; otherwise the directory must be empty."
            }
            FsToolKind::ListDir => {
                "List the contents of a directory. Returns a JSON array of entries with name, \
                 type (File or Directory), size in bytes and modification time."
            }
            FsToolKind::GetCurrentDir => "Get the absolute path of the working directory.",
            FsToolKind::CopyFile => {
                "Copy a file or directory from source to destination. When copying a directory, \
                 dest is the new directory name."
            }
            FsToolKind::MoveFile => {
                "Move a file or directory from source to destination. dest can be a new name or \
                 an existing directory to move into."
            }
            FsToolKind::RemoveFile => "Remove a file from the filesystem.",
            FsToolKind::Rename => "Rename a file or directory.",
        }
    }

    pub fn params(&self) -> Vec<ParamSpec> {
        match self {
            FsToolKind::CreateDir => vec![ParamSpec::required(
                "path",
                ParamType::String,
                "Path of the directory to create, relative or absolute",
            )],
            FsToolKind::RemoveDir => vec![
                ParamSpec::required("path", ParamType::String, "Path of the directory to remove"),
                ParamSpec::optional(
                    "recursive",
                    ParamType::Boolean,
                    json!(false),
                    "Remove the directory and all of its contents",
                ),
            ],
            FsToolKind::ListDir => vec![ParamSpec::optional(
                "path",
                ParamType::String,
                json!("."),
                "Path of the directory to list",
            )],
            FsToolKind::GetCurrentDir => vec![],
            FsToolKind::CopyFile => vec![
                ParamSpec::required("src", ParamType::String, "Source file or directory"),
                ParamSpec::required("dest", ParamType::String, "Destination path"),
            ],
            FsToolKind::MoveFile => vec![
                ParamSpec::required("src", ParamType::String, "Source file or directory"),
                ParamSpec::required(
                    "dest",
                    ParamType::String,
                    "New path, or an existing directory to move into",
                ),
            ],
            FsToolKind::RemoveFile => vec![ParamSpec::required(
                "path",
                ParamType::String,
                "Path of the file to remove",
            )],
            FsToolKind::Rename => vec![
                ParamSpec::required(
                    "old",
                    ParamType::String,
                    "Current path of the file or directory",
                ),
                ParamSpec::required("new", ParamType::String, "New path or name"),
            ],
        }
    }
}

/// A filesystem tool bound to a working root.
pub struct FsTool {
    kind: FsToolKind,
    workspace: Arc<Workspace>,
}

impl FsTool {
    pub fn new(kind: FsToolKind, workspace: Arc<Workspace>) -> Self {
        Self { kind, workspace }
    }
}

/// String argument that the registry has already validated.
fn arg<'a>(arguments: &'a Value, tool: &str, field: &str) -> Result<&'a str, ToolError> {
    arguments[field]
        .as_str()
        .ok_or_else(|| ToolError::InvalidArguments {
            tool_name: tool.to_string(),
            fields: vec![format!("{field} (missing)")],
        })
}

#[async_trait]
impl Tool for FsTool {
    fn name(&self) -> &str {
        self.kind.name()
    }

    fn description(&self) -> &str {
        self.kind.description()
    }

    fn params(&self) -> Vec<ParamSpec> {
        self.kind.params()
    }

    async fn execute(&self, arguments: Value) -> Result<ToolResult, ToolError> {
        let ws = self.workspace.as_ref();
        let name = self.kind.name();
        debug!(tool = name, root = %ws.root().display(), "Executing filesystem tool");

        match self.kind {
            FsToolKind::CreateDir => Ok(dirs::create_dir(ws, arg(&arguments, name, "path")?).await),
            FsToolKind::RemoveDir => {
                let recursive = arguments["recursive"].as_bool().unwrap_or(false);
                Ok(dirs::remove_dir(ws, arg(&arguments, name, "path")?, recursive).await)
            }
            FsToolKind::ListDir => {
                let path = arguments["path"].as_str().unwrap_or(".");
                Ok(dirs::list_dir(ws, path).await)
            }
            FsToolKind::GetCurrentDir => Ok(dirs::get_current_dir(ws).await),
            FsToolKind::CopyFile => {
                files::copy_file(ws, arg(&arguments, name, "src")?, arg(&arguments, name, "dest")?)
                    .await
            }
            FsToolKind::MoveFile => {
                files::move_file(ws, arg(&arguments, name, "src")?, arg(&arguments, name, "dest")?)
                    .await
            }
            FsToolKind::RemoveFile => {
                Ok(files::remove_file(ws, arg(&arguments, name, "path")?).await)
            }
            FsToolKind::Rename => Ok(files::rename(
                ws,
                arg(&arguments, name, "old")?,
                arg(&arguments, name, "new")?,
            )
            .await),
        }
    }
}

/// Build a registry holding all eight filesystem tools bound to `root`.
pub fn default_registry(root: impl Into<PathBuf>) -> Result<ToolRegistry, ToolError> {
    let workspace = Arc::new(Workspace::new(root));
    let mut registry = ToolRegistry::new();
    for kind in FsToolKind::ALL {
        registry.register(Box::new(FsTool::new(kind, Arc::clone(&workspace))))?;
    }
    Ok(registry)
}
