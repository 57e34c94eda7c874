//! Mount-prerequisite check, guided driver download, and the unmount
//! busy-retry protocol.

use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;

use tracing::{debug, warn};

use crate::dialog::Prompter;
use crate::errors::{Error, Result};

#[cfg(target_os = "macos")]
const PLUGIN_PROBE_PATHS: [&str; 2] = [
    "/Library/Filesystems/macfuse.fs",
    "/Library/Filesystems/osxfuse.fs",
];
#[cfg(windows)]
const PLUGIN_PROBE_PATHS: [&str; 2] = [
    "C:\\Program Files\\WinFsp",
    "C:\\Program Files (x86)\\WinFsp",
];

#[cfg(target_os = "macos")]
const PLUGIN_INSTALLER_URL: &str =
    "https://github.com/macfuse/macfuse/releases/download/macfuse-4.8.2/macfuse-4.8.2.dmg";
#[cfg(windows)]
const PLUGIN_INSTALLER_URL: &str =
    "https://github.com/winfsp/winfsp/releases/download/v2.0/winfsp-2.0.23075.msi";

/// True when mounting remotes needs a userspace filesystem driver that is
/// not installed. Checked fresh on every call, never cached.
pub fn needs_mount_plugin() -> bool {
    #[cfg(any(target_os = "macos", windows))]
    {
        PLUGIN_PROBE_PATHS
            .iter()
            .all(|p| !std::path::Path::new(p).exists())
    }
    #[cfg(not(any(target_os = "macos", windows)))]
    {
        false
    }
}

/// Guided driver install: confirm with the user, download the platform
/// installer into the downloads directory, and reveal it in the file
/// browser. Returns the written path, or None when the user declined (or
/// the platform has no driver requirement).
///
/// This is a one-shot user action: fetch and write errors propagate as
/// `Error::Download` with no retry and no partial-file cleanup.
pub async fn offer_mount_plugin_download(
    prompter: &dyn Prompter,
    http: &reqwest::Client,
) -> Result<Option<PathBuf>> {
    #[cfg(not(any(target_os = "macos", windows)))]
    {
        let _ = (prompter, http);
        Ok(None)
    }
    #[cfg(any(target_os = "macos", windows))]
    {
        let accepted = prompter
            .confirm(
                "Mount driver required",
                "Mounting remote storage needs a filesystem driver that is not \
                 installed on this system. Download the installer now?",
            )
            .await;
        if !accepted {
            return Ok(None);
        }

        let file_name = PLUGIN_INSTALLER_URL
            .rsplit('/')
            .next()
            .unwrap_or("mount-driver-installer");
        let target_dir = dirs::download_dir()
            .or_else(dirs::home_dir)
            .ok_or_else(|| Error::Download("no downloads directory available".to_string()))?;
        let target = target_dir.join(file_name);

        debug!(url = PLUGIN_INSTALLER_URL, target = %target.display(), "downloading mount driver installer");
        let resp = http
            .get(PLUGIN_INSTALLER_URL)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| Error::Download(e.to_string()))?;
        let bytes = resp
            .bytes()
            .await
            .map_err(|e| Error::Download(e.to_string()))?;
        tokio::fs::write(&target, &bytes)
            .await
            .map_err(|e| Error::Download(e.to_string()))?;

        crate::dialog::reveal_in_file_browser(&target)?;
        Ok(Some(target))
    }
}

/// Captured output of one unmount command invocation.
#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub code: i32,
    pub stdout: String,
    pub stderr: String,
}

/// Seam over OS command execution so the unmount protocol can be driven by
/// scripted exit codes in tests.
pub trait CommandRunner: Send + Sync {
    fn run<'a>(
        &'a self,
        program: &'a str,
        args: &'a [String],
    ) -> Pin<Box<dyn Future<Output = std::io::Result<CommandOutput>> + Send + 'a>>;
}

/// Runs the real platform unmount utility.
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run<'a>(
        &'a self,
        program: &'a str,
        args: &'a [String],
    ) -> Pin<Box<dyn Future<Output = std::io::Result<CommandOutput>> + Send + 'a>> {
        Box::pin(async move {
            let out = tokio::process::Command::new(program)
                .args(args)
                .output()
                .await?;
            Ok(CommandOutput {
                code: out.status.code().unwrap_or(-1),
                stdout: String::from_utf8_lossy(&out.stdout).into_owned(),
                stderr: String::from_utf8_lossy(&out.stderr).into_owned(),
            })
        })
    }
}

fn unmount_command(mount_point: &str, force: bool) -> (&'static str, Vec<String>) {
    #[cfg(unix)]
    {
        let mut args = Vec::new();
        if force {
            args.push("-f".to_string());
        }
        args.push(mount_point.to_string());
        ("umount", args)
    }
    #[cfg(windows)]
    {
        // mountvol has no separate force flag
        let _ = force;
        ("mountvol", vec![mount_point.to_string(), "/p".to_string()])
    }
}

/// Unmount with busy-retry escalation.
///
/// Runs the platform unmount command; a "busy" failure prompts the user for
/// a forced retry. The loop is bounded: once forced, a second busy report is
/// a terminal `UnmountBusy`, not another prompt. A "not currently mounted"
/// failure counts as success so the operation stays idempotent.
pub async fn unmount(
    runner: &dyn CommandRunner,
    prompter: &dyn Prompter,
    mount_point: &str,
    force: bool,
) -> Result<()> {
    let mut forced = force;
    loop {
        debug!(mount_point, forced, "invoking unmount");
        let (program, args) = unmount_command(mount_point, forced);
        let out = runner
            .run(program, &args)
            .await
            .map_err(|e| Error::Unmount(e.to_string()))?;
        if out.code == 0 {
            return Ok(());
        }

        let stderr_lower = out.stderr.to_lowercase();
        if stderr_lower.contains("not currently mounted") {
            debug!(mount_point, "already unmounted");
            return Ok(());
        }
        if stderr_lower.contains("busy") {
            if forced {
                // drivers may keep reporting busy even after a force; that
                // is a legitimate terminal failure
                return Err(Error::UnmountBusy);
            }
            let message = format!("{mount_point} is busy. Force the unmount?");
            if prompter.confirm("Unmount busy", &message).await {
                forced = true;
                continue;
            }
            return Err(Error::UnmountBusy);
        }

        warn!(mount_point, stderr = %out.stderr, "unmount failed");
        return Err(Error::Unmount(out.stderr.trim().to_string()));
    }
}
