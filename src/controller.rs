//! Interaction surface over the two path fields: raw-text edits, swap,
//! clear, and browse-via-native-picker.

use std::sync::Arc;

use tokio::sync::Mutex as AsyncMutex;
use tracing::debug;

use crate::dialog::FolderPicker;
use crate::entry::FieldId;
use crate::suggest::Suggester;

/// Per-field behavior switches.
#[derive(Debug, Clone, Copy, Default)]
pub struct FieldOptions {
    /// Whether `clear` is permitted on this field.
    pub clearable: bool,
}

pub struct FieldController {
    suggester: Arc<Suggester>,
    /// UI-exclusivity lock held while a native picker is up. Exactly one
    /// field's browse interaction may hold it at a time.
    ui_lock: Arc<AsyncMutex<()>>,
    source_opts: FieldOptions,
    dest_opts: FieldOptions,
}

impl FieldController {
    pub fn new(
        suggester: Arc<Suggester>,
        source_opts: FieldOptions,
        dest_opts: FieldOptions,
    ) -> Self {
        Self {
            suggester,
            ui_lock: Arc::new(AsyncMutex::new(())),
            source_opts,
            dest_opts,
        }
    }

    fn opts(&self, field: FieldId) -> FieldOptions {
        match field {
            FieldId::Source => self.source_opts,
            FieldId::Dest => self.dest_opts,
        }
    }

    /// Update a field's raw text. Resolution is not run here; the caller
    /// reacts to the change by calling [`FieldController::refresh`].
    pub fn set_text(&self, field: FieldId, value: impl Into<String>) {
        self.suggester.set_raw_text(field, value.into());
    }

    /// Exchange the two fields' raw texts atomically.
    pub fn swap(&self) {
        self.suggester.swap_raw_text();
    }

    /// Clear a field, if its options permit it. Returns false when the
    /// field is not clearable.
    pub fn clear(&self, field: FieldId) -> bool {
        if !self.opts(field).clearable {
            return false;
        }
        self.set_text(field, "");
        true
    }

    /// Start a resolution cycle for a field's current text.
    pub fn refresh(&self, field: FieldId, known_remotes: &[String]) -> u64 {
        let text = self.suggester.raw_text(field);
        self.suggester.resolve(field, &text, known_remotes)
    }

    /// Open the native folder picker seeded with the field's current value.
    ///
    /// The UI lock is released on every exit path: success, cancellation,
    /// and picker failure. A picker failure becomes a field-scoped error,
    /// never a fatal one.
    pub async fn browse(&self, field: FieldId, picker: &dyn FolderPicker) {
        let _guard = self.ui_lock.lock().await;
        let start = self.suggester.raw_text(field);
        match picker.pick_folder(&start).await {
            Ok(Some(selection)) => {
                debug!(?field, selection = %selection, "picker selection applied");
                self.set_text(field, selection);
            }
            Ok(None) => {}
            Err(e) => self.suggester.set_field_error(field, e.to_string()),
        }
    }
}
