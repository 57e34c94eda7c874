//! Per-field suggestion aggregation.
//!
//! Every text change or focus event kicks off a resolution cycle; cycles for
//! the same field can overlap, so each one is tagged with a monotonically
//! increasing sequence number and only the latest issued cycle is allowed to
//! write its result back. Superseded listings are discarded after the fact
//! rather than cancelled, which is fine because listings are read-only.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::mpsc::UnboundedSender;
use tracing::debug;

use crate::address::{self, Address};
use crate::entry::{Entry, FieldId, FieldState};
use crate::errors::Result;
use crate::local;
use crate::remote::{self, ListOptions, RemoteLister};

/// Messages for async UI communication.
#[derive(Debug, Clone, Copy)]
pub enum FieldEvent {
    /// A resolution cycle started; the field is loading.
    Loading { field: FieldId, seq: u64 },
    /// The winning cycle finished and the field state was replaced.
    Resolved { field: FieldId, seq: u64 },
}

#[derive(Default)]
struct FieldSlot {
    state: Mutex<FieldState>,
    seq: AtomicU64,
}

pub struct Suggester {
    source: Arc<FieldSlot>,
    dest: Arc<FieldSlot>,
    lister: Arc<dyn RemoteLister>,
    events: Option<UnboundedSender<FieldEvent>>,
}

impl Suggester {
    pub fn new(lister: Arc<dyn RemoteLister>) -> Self {
        Self {
            source: Arc::new(FieldSlot::default()),
            dest: Arc::new(FieldSlot::default()),
            lister,
            events: None,
        }
    }

    /// Attach a channel that is notified whenever a field's state changes.
    pub fn with_events(mut self, tx: UnboundedSender<FieldEvent>) -> Self {
        self.events = Some(tx);
        self
    }

    fn slot(&self, field: FieldId) -> &Arc<FieldSlot> {
        match field {
            FieldId::Source => &self.source,
            FieldId::Dest => &self.dest,
        }
    }

    /// Snapshot of a field's current read model.
    pub fn field_state(&self, field: FieldId) -> FieldState {
        self.slot(field).state.lock().clone()
    }

    pub fn raw_text(&self, field: FieldId) -> String {
        self.slot(field).state.lock().raw_text.clone()
    }

    pub(crate) fn set_raw_text(&self, field: FieldId, value: String) {
        self.slot(field).state.lock().raw_text = value;
    }

    /// Exchange the two fields' raw texts as one logical action. Both locks
    /// are taken in a fixed order so observers never see a half-swap.
    pub(crate) fn swap_raw_text(&self) {
        let mut src = self.source.state.lock();
        let mut dst = self.dest.state.lock();
        std::mem::swap(&mut src.raw_text, &mut dst.raw_text);
    }

    pub(crate) fn set_field_error(&self, field: FieldId, message: String) {
        self.slot(field).state.lock().last_error = Some(message);
    }

    /// Kick off a resolution cycle for one field.
    ///
    /// Returns the sequence number assigned to the cycle. The spawned task
    /// applies its result only if no newer cycle has been issued for the
    /// field in the meantime (last-writer-wins keyed by initiation order).
    pub fn resolve(&self, field: FieldId, path: &str, known_remotes: &[String]) -> u64 {
        let slot = Arc::clone(self.slot(field));
        let seq = slot.seq.fetch_add(1, Ordering::SeqCst) + 1;
        {
            let mut st = slot.state.lock();
            st.is_loading = true;
            st.last_error = None;
        }
        if let Some(tx) = &self.events {
            let _ = tx.send(FieldEvent::Loading { field, seq });
        }

        let lister = Arc::clone(&self.lister);
        let path = path.to_string();
        let remotes: Vec<String> = known_remotes.to_vec();
        let events = self.events.clone();
        tokio::spawn(async move {
            let outcome = resolve_once(lister.as_ref(), &path, &remotes).await;
            let mut st = slot.state.lock();
            if slot.seq.load(Ordering::SeqCst) != seq {
                debug!(?field, seq, "discarding stale suggestion result");
                return;
            }
            match outcome {
                Ok(entries) => {
                    st.suggestions = entries;
                    st.last_error = None;
                }
                Err(e) => {
                    st.suggestions.clear();
                    st.last_error = Some(e.to_string());
                }
            }
            st.is_loading = false;
            drop(st);
            if let Some(tx) = events {
                let _ = tx.send(FieldEvent::Resolved { field, seq });
            }
        });
        seq
    }
}

/// One resolution pass: classify, then list from the matching source.
async fn resolve_once(
    lister: &dyn RemoteLister,
    path: &str,
    known_remotes: &[String],
) -> Result<Vec<Entry>> {
    match address::classify(path)? {
        Address::Empty => Ok(known_remotes
            .iter()
            .map(|r| {
                let addr = format!("{r}:/");
                Entry {
                    is_dir: true,
                    name: addr.clone(),
                    path: addr,
                }
            })
            .collect()),
        Address::Local(p) => local::list_local(&p).await,
        Address::Remote { remote, sub_path } => {
            remote::list_remote(lister, &remote, &sub_path, ListOptions::default()).await
        }
    }
}
