use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;

use pathscout::controller::{FieldController, FieldOptions};
use pathscout::dialog::FolderPicker;
use pathscout::entry::FieldId;
use pathscout::errors::Error;
use pathscout::local::list_local;
use pathscout::remote::{ListOptions, RemoteItem, RemoteLister};
use pathscout::suggest::{FieldEvent, Suggester};

/// Backend fake: sub-paths starting with "slow" take much longer to list
/// than everything else, so tests can force out-of-order completions.
struct ScriptedLister;

impl RemoteLister for ScriptedLister {
    fn list<'a>(
        &'a self,
        _remote: &'a str,
        sub_path: &'a str,
        _opts: ListOptions,
    ) -> Pin<Box<dyn Future<Output = pathscout::errors::Result<Vec<RemoteItem>>> + Send + 'a>>
    {
        let sub = sub_path.to_string();
        Box::pin(async move {
            let delay = if sub.starts_with("slow") { 200 } else { 10 };
            tokio::time::sleep(Duration::from_millis(delay)).await;
            Ok(vec![RemoteItem {
                is_dir: true,
                path: sub,
            }])
        })
    }
}

async fn wait_resolved(
    rx: &mut tokio::sync::mpsc::UnboundedReceiver<FieldEvent>,
    want_field: FieldId,
    want_seq: u64,
) {
    while let Some(event) = rx.recv().await {
        if let FieldEvent::Resolved { field, seq } = event {
            if field == want_field && seq == want_seq {
                return;
            }
        }
    }
    panic!("event channel closed before resolution {want_seq}");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn stale_response_discarded() {
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    let suggester = Arc::new(Suggester::new(Arc::new(ScriptedLister)).with_events(tx));

    // First cycle is slow, second is fast; the fast one must win even
    // though the slow one finishes last.
    suggester.resolve(FieldId::Source, "rem:/slow", &[]);
    let newer = suggester.resolve(FieldId::Source, "rem:/fast", &[]);
    wait_resolved(&mut rx, FieldId::Source, newer).await;

    // Let the slow cycle finish and (correctly) get discarded
    tokio::time::sleep(Duration::from_millis(300)).await;

    let state = suggester.field_state(FieldId::Source);
    assert_eq!(state.suggestions.len(), 1);
    assert_eq!(state.suggestions[0].path, "rem:/fast");
    assert!(!state.is_loading);
    assert!(state.last_error.is_none());
}

#[tokio::test]
async fn fields_resolve_independently() {
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    let suggester = Arc::new(Suggester::new(Arc::new(ScriptedLister)).with_events(tx));

    let src = suggester.resolve(FieldId::Source, "rem:/a", &[]);
    let dst = suggester.resolve(FieldId::Dest, "rem:/b", &[]);
    wait_resolved(&mut rx, FieldId::Source, src).await;
    wait_resolved(&mut rx, FieldId::Dest, dst).await;

    assert_eq!(
        suggester.field_state(FieldId::Source).suggestions[0].path,
        "rem:/a"
    );
    assert_eq!(
        suggester.field_state(FieldId::Dest).suggestions[0].path,
        "rem:/b"
    );
}

#[tokio::test]
async fn empty_input_lists_known_remotes() {
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    let suggester = Arc::new(Suggester::new(Arc::new(ScriptedLister)).with_events(tx));

    let remotes = vec!["gdrive".to_string(), "s3".to_string()];
    let seq = suggester.resolve(FieldId::Source, "", &remotes);
    wait_resolved(&mut rx, FieldId::Source, seq).await;

    let state = suggester.field_state(FieldId::Source);
    let paths: Vec<&str> = state.suggestions.iter().map(|e| e.path.as_str()).collect();
    assert_eq!(paths, vec!["gdrive:/", "s3:/"]);
    assert!(state.suggestions.iter().all(|e| e.is_dir));
    assert!(state.suggestions.iter().all(|e| e.name == e.path));
}

#[tokio::test]
async fn invalid_address_becomes_field_error() {
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    let suggester = Arc::new(Suggester::new(Arc::new(ScriptedLister)).with_events(tx));

    let seq = suggester.resolve(FieldId::Dest, ":/orphan", &[]);
    wait_resolved(&mut rx, FieldId::Dest, seq).await;

    let state = suggester.field_state(FieldId::Dest);
    assert!(state.suggestions.is_empty());
    let err = state.last_error.expect("expected a field error");
    assert!(err.contains("invalid address"), "got: {err}");
    assert!(!state.is_loading);
}

#[tokio::test]
async fn file_path_falls_back_to_parent_once() -> Result<()> {
    let dir = tempfile::tempdir()?;
    std::fs::write(dir.path().join("foo.txt"), b"hello")?;
    std::fs::write(dir.path().join("bar.txt"), b"world")?;
    std::fs::create_dir(dir.path().join("sub"))?;

    let target = dir.path().join("foo.txt");
    let entries = list_local(target.to_str().unwrap()).await?;

    // Entries come from the parent directory and are rooted there
    let parent = dir.path().to_str().unwrap();
    assert_eq!(entries.len(), 3);
    assert!(entries.iter().all(|e| e.path.starts_with(parent)));
    assert!(entries.iter().any(|e| e.name == "foo.txt" && !e.is_dir));
    assert!(entries.iter().any(|e| e.name == "sub" && e.is_dir));
    Ok(())
}

#[tokio::test]
async fn directory_entry_paths_round_trip() -> Result<()> {
    let dir = tempfile::tempdir()?;
    std::fs::create_dir(dir.path().join("inner"))?;
    std::fs::write(dir.path().join("inner").join("leaf.txt"), b"x")?;

    let entries = list_local(dir.path().to_str().unwrap()).await?;
    let inner = entries.iter().find(|e| e.name == "inner").unwrap();
    assert!(inner.is_dir);

    // Feeding a directory entry's path back in lists its children
    let children = list_local(&inner.path).await?;
    assert_eq!(children.len(), 1);
    assert_eq!(children[0].name, "leaf.txt");
    Ok(())
}

#[tokio::test]
async fn missing_path_fails_after_retry() {
    let err = list_local("/definitely/not/a/real/path/anywhere")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Listing(_)));
}

#[tokio::test]
#[cfg(unix)]
async fn symlinks_are_excluded() -> Result<()> {
    let dir = tempfile::tempdir()?;
    std::fs::write(dir.path().join("real.txt"), b"x")?;
    std::os::unix::fs::symlink(dir.path().join("real.txt"), dir.path().join("link.txt"))?;

    let entries = list_local(dir.path().to_str().unwrap()).await?;
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].name, "real.txt");
    Ok(())
}

struct FailingPicker;

impl FolderPicker for FailingPicker {
    fn pick_folder<'a>(
        &'a self,
        _start_dir: &'a str,
    ) -> Pin<Box<dyn Future<Output = pathscout::errors::Result<Option<String>>> + Send + 'a>>
    {
        Box::pin(async { Err(Error::Picker("no display available".to_string())) })
    }
}

struct StaticPicker(Option<String>);

impl FolderPicker for StaticPicker {
    fn pick_folder<'a>(
        &'a self,
        _start_dir: &'a str,
    ) -> Pin<Box<dyn Future<Output = pathscout::errors::Result<Option<String>>> + Send + 'a>>
    {
        let selection = self.0.clone();
        Box::pin(async move { Ok(selection) })
    }
}

fn controller(suggester: &Arc<Suggester>) -> FieldController {
    FieldController::new(
        Arc::clone(suggester),
        FieldOptions { clearable: true },
        FieldOptions { clearable: false },
    )
}

#[tokio::test]
async fn browse_failure_is_field_scoped_and_releases_lock() {
    let suggester = Arc::new(Suggester::new(Arc::new(ScriptedLister)));
    let controller = controller(&suggester);

    controller.browse(FieldId::Source, &FailingPicker).await;
    let err = suggester
        .field_state(FieldId::Source)
        .last_error
        .expect("picker failure should set a field error");
    assert!(err.contains("folder picker failed"), "got: {err}");

    // A second browse must not deadlock on a leaked UI lock
    let second = tokio::time::timeout(
        Duration::from_secs(1),
        controller.browse(FieldId::Source, &StaticPicker(Some("/tmp".to_string()))),
    )
    .await;
    assert!(second.is_ok(), "UI lock was not released");
    assert_eq!(suggester.raw_text(FieldId::Source), "/tmp");
}

#[tokio::test]
async fn browse_cancel_keeps_text() {
    let suggester = Arc::new(Suggester::new(Arc::new(ScriptedLister)));
    let controller = controller(&suggester);

    controller.set_text(FieldId::Source, "/home/someone");
    controller.browse(FieldId::Source, &StaticPicker(None)).await;
    assert_eq!(suggester.raw_text(FieldId::Source), "/home/someone");
}

#[tokio::test]
async fn swap_exchanges_raw_texts() {
    let suggester = Arc::new(Suggester::new(Arc::new(ScriptedLister)));
    let controller = controller(&suggester);

    controller.set_text(FieldId::Source, "gdrive:/Photos");
    controller.set_text(FieldId::Dest, "/backups");
    controller.swap();

    assert_eq!(suggester.raw_text(FieldId::Source), "/backups");
    assert_eq!(suggester.raw_text(FieldId::Dest), "gdrive:/Photos");
}

#[tokio::test]
async fn clear_honors_field_options() {
    let suggester = Arc::new(Suggester::new(Arc::new(ScriptedLister)));
    let controller = controller(&suggester);

    controller.set_text(FieldId::Source, "gdrive:/Photos");
    controller.set_text(FieldId::Dest, "/backups");

    assert!(controller.clear(FieldId::Source));
    assert_eq!(suggester.raw_text(FieldId::Source), "");

    assert!(!controller.clear(FieldId::Dest));
    assert_eq!(suggester.raw_text(FieldId::Dest), "/backups");
}
