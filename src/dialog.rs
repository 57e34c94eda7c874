//! Native dialog seams: folder picker, yes/no confirmation, and
//! reveal-in-file-browser. Production code goes through `rfd`; tests and
//! non-interactive callers substitute their own implementations.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;

use crate::errors::{Error, Result};

/// Native folder picker. Returns the selected path, or None on cancel.
pub trait FolderPicker: Send + Sync {
    fn pick_folder<'a>(
        &'a self,
        start_dir: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Option<String>>> + Send + 'a>>;
}

/// Yes/no confirmation dialog.
pub trait Prompter: Send + Sync {
    fn confirm<'a>(
        &'a self,
        title: &'a str,
        message: &'a str,
    ) -> Pin<Box<dyn Future<Output = bool> + Send + 'a>>;
}

/// Prompter that always gives the same answer. Used by the CLI harness,
/// where there is nobody to ask.
pub struct FixedAnswer(pub bool);

impl Prompter for FixedAnswer {
    fn confirm<'a>(
        &'a self,
        _title: &'a str,
        _message: &'a str,
    ) -> Pin<Box<dyn Future<Output = bool> + Send + 'a>> {
        let answer = self.0;
        Box::pin(async move { answer })
    }
}

/// `rfd`-backed dialogs. The blocking dialog calls run on the blocking pool
/// so they suspend the issuing task without stalling the runtime.
pub struct NativeDialogs;

impl FolderPicker for NativeDialogs {
    fn pick_folder<'a>(
        &'a self,
        start_dir: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Option<String>>> + Send + 'a>> {
        let start = if start_dir.is_empty() {
            dirs::home_dir().unwrap_or_else(|| PathBuf::from("."))
        } else {
            PathBuf::from(start_dir)
        };
        Box::pin(async move {
            let selection = tokio::task::spawn_blocking(move || {
                rfd::FileDialog::new().set_directory(&start).pick_folder()
            })
            .await
            .map_err(|e| Error::Picker(e.to_string()))?;
            Ok(selection.map(|p| p.to_string_lossy().into_owned()))
        })
    }
}

impl Prompter for NativeDialogs {
    fn confirm<'a>(
        &'a self,
        title: &'a str,
        message: &'a str,
    ) -> Pin<Box<dyn Future<Output = bool> + Send + 'a>> {
        let title = title.to_string();
        let message = message.to_string();
        Box::pin(async move {
            tokio::task::spawn_blocking(move || {
                let res = rfd::MessageDialog::new()
                    .set_title(title.as_str())
                    .set_description(message.as_str())
                    .set_level(rfd::MessageLevel::Warning)
                    .set_buttons(rfd::MessageButtons::YesNo)
                    .show();
                matches!(res, rfd::MessageDialogResult::Yes)
            })
            .await
            .unwrap_or(false)
        })
    }
}

/// Show the given file in the platform file browser.
pub fn reveal_in_file_browser(path: &Path) -> Result<()> {
    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open").arg("-R").arg(path).spawn()?;
    }
    #[cfg(windows)]
    {
        std::process::Command::new("explorer")
            .arg(format!("/select,{}", path.display()))
            .spawn()?;
    }
    #[cfg(all(unix, not(target_os = "macos")))]
    {
        let dir = path.parent().unwrap_or_else(|| Path::new("."));
        std::process::Command::new("xdg-open").arg(dir).spawn()?;
    }
    Ok(())
}
