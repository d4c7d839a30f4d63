//! Draft controller
//!
//! Owns the draft of one editing session. Each dispatched edit is reduced
//! against the current draft; on success the new draft replaces the old one
//! and a fresh snapshot is returned, on failure the draft is kept as it was.

use std::sync::Arc;

use tracing::{debug, info, warn};

use core_kernel::Clock;

use crate::draft::{DocumentDirection, InvoiceDraft};
use crate::edit::DraftEdit;
use crate::error::DraftError;
use crate::gate::GateStage;
use crate::snapshot::DraftSnapshot;

/// Session-scoped owner of an [`InvoiceDraft`]
pub struct DraftController {
    draft: InvoiceDraft,
    clock: Arc<dyn Clock>,
}

impl DraftController {
    /// Starts a session on an empty draft
    pub fn open(direction: DocumentDirection, clock: Arc<dyn Clock>) -> Self {
        Self::new(InvoiceDraft::new(direction), clock)
    }

    /// Starts a session on an existing draft
    pub fn new(draft: InvoiceDraft, clock: Arc<dyn Clock>) -> Self {
        Self { draft, clock }
    }

    /// Starts a session on a persisted document
    ///
    /// # Errors
    ///
    /// Returns `ValidationRejected` if the snapshot is not a valid draft.
    pub fn hydrate(snapshot: &DraftSnapshot, clock: Arc<dyn Clock>) -> Result<Self, DraftError> {
        let draft = InvoiceDraft::hydrate(snapshot, clock.today())?;
        debug!(draft_id = %draft.id(), lines = draft.lines().len(), "Hydrated persisted draft");
        Ok(Self::new(draft, clock))
    }

    pub fn draft(&self) -> &InvoiceDraft {
        &self.draft
    }

    /// Current gate stage
    pub fn stage(&self) -> GateStage {
        self.draft.stage(self.clock.today())
    }

    /// Applies `edit` and returns the refreshed snapshot
    ///
    /// # Errors
    ///
    /// Returns the rejection; the draft is unchanged.
    pub fn dispatch(&mut self, edit: DraftEdit) -> Result<DraftSnapshot, DraftError> {
        let today = self.clock.today();
        let action = edit.action();

        match self.draft.apply(edit, today) {
            Ok(next) => {
                let snapshot = DraftSnapshot::capture(&next, today)?;
                debug!(
                    draft_id = %next.id(),
                    action,
                    stage = %snapshot.stage,
                    lines = snapshot.lines.len(),
                    "Applied draft edit"
                );
                self.draft = next;
                Ok(snapshot)
            }
            Err(err) => {
                warn!(draft_id = %self.draft.id(), action, error = %err, "Rejected draft edit");
                Err(err)
            }
        }
    }

    /// Snapshot of the current draft
    ///
    /// # Errors
    ///
    /// Fails only if a displayed amount leaves the representable range.
    pub fn snapshot(&self) -> Result<DraftSnapshot, DraftError> {
        DraftSnapshot::capture(&self.draft, self.clock.today())
    }

    /// Submits the draft, returning the snapshot to persist
    ///
    /// # Errors
    ///
    /// See [`InvoiceDraft::submit`].
    pub fn submit(&mut self) -> Result<DraftSnapshot, DraftError> {
        let (submitted, snapshot) = match self.draft.submit(self.clock.today()) {
            Ok(result) => result,
            Err(err) => {
                warn!(draft_id = %self.draft.id(), error = %err, "Rejected draft submission");
                return Err(err);
            }
        };
        info!(
            draft_id = %submitted.id(),
            direction = ?submitted.direction(),
            lines = snapshot.lines.len(),
            grand_total = %snapshot.totals.grand_total,
            "Draft submitted"
        );
        self.draft = submitted;
        Ok(snapshot)
    }
}
