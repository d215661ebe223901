//! Compression through the platform's own archiving tool.

use crate::bundler::error::{Error, Result};
#[cfg(not(windows))]
use path_absolutize::Absolutize;
use std::path::{Path, PathBuf};
use std::process::Stdio;

/// Tool and arguments used to compress `source_dir` into `archive_path`.
struct ToolCommand {
    tool: &'static str,
    program: PathBuf,
    args: Vec<String>,
    cwd: Option<PathBuf>,
}

/// Compresses `source_dir` into `archive_path` with the platform tool.
///
/// Windows uses PowerShell `Compress-Archive`; everything else needs `zip`
/// on `PATH`. A missing tool or non-zero exit is [`Error::ArchiveToolFailed`].
pub async fn compress(source_dir: &Path, archive_path: &Path) -> Result<()> {
    let command = tool_command(source_dir, archive_path)?;
    log::info!("Zipping {} using {}", source_dir.display(), command.tool);

    let mut cmd = tokio::process::Command::new(&command.program);
    cmd.args(&command.args)
        .stdin(Stdio::null())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit());
    if let Some(cwd) = &command.cwd {
        cmd.current_dir(cwd);
    }

    let status = cmd.status().await.map_err(|error| Error::CommandFailed {
        command: command.tool.to_string(),
        error,
    })?;

    if !status.success() {
        return Err(Error::ArchiveToolFailed {
            tool: command.tool.to_string(),
            code: status.code(),
        });
    }

    Ok(())
}

fn locate(tool: &'static str) -> Result<PathBuf> {
    which::which(tool).map_err(|e| {
        log::error!("{} not found in PATH: {}", tool, e);
        Error::ArchiveToolFailed {
            tool: tool.to_string(),
            code: None,
        }
    })
}

#[cfg(windows)]
fn tool_command(source_dir: &Path, archive_path: &Path) -> Result<ToolCommand> {
    let program = locate("powershell")?;
    Ok(ToolCommand {
        tool: "Compress-Archive",
        program,
        args: vec![
            "-NoProfile".to_string(),
            "-Command".to_string(),
            format!(
                "Compress-Archive -Path \"{}\\*\" -DestinationPath \"{}\" -Force",
                source_dir.display(),
                archive_path.display()
            ),
        ],
        cwd: None,
    })
}

#[cfg(not(windows))]
fn tool_command(source_dir: &Path, archive_path: &Path) -> Result<ToolCommand> {
    let program = locate("zip")?;
    // zip resolves the destination against its cwd, which is the install dir
    let archive_path = archive_path.absolutize()?;
    Ok(ToolCommand {
        tool: "zip",
        program,
        args: vec![
            "-r".to_string(),
            "-q".to_string(),
            archive_path.display().to_string(),
            ".".to_string(),
        ],
        cwd: Some(source_dir.to_path_buf()),
    })
}
