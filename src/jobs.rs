// ============================================================================
// Deferred Work Queue
// ============================================================================
//
// Work that must not run in the frame it was requested in (auto-focus on
// enable) is queued here. `promote` runs at the start of the early update and
// moves everything queued so far into the ready set; the late update drains
// the ready set. A job pushed during frame N therefore runs at the end of
// frame N + 1, after the rest of the hierarchy finished its own activation.

use crate::tree::ControlId;

/// Job types for deferred work
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum JobType {
    /// Give the control input focus if it can still take it
    Focus,
}

/// A deferred job
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Job {
    pub control: ControlId,
    pub job_type: JobType,
}

#[derive(Debug, Default)]
pub struct JobQueue {
    pending: Vec<Job>,
    ready: Vec<Job>,
}

impl JobQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a job for the next frame. Duplicates are ignored.
    pub fn push(&mut self, control: ControlId, job_type: JobType) {
        let job = Job { control, job_type };
        if !self.pending.contains(&job) && !self.ready.contains(&job) {
            self.pending.push(job);
        }
    }

    /// Make everything queued so far eligible for this frame's drain.
    pub fn promote(&mut self) {
        self.ready.append(&mut self.pending);
    }

    pub fn take_ready(&mut self) -> Vec<Job> {
        std::mem::take(&mut self.ready)
    }

    /// Drop every job for a control that is going away.
    pub fn forget(&mut self, control: ControlId) {
        self.pending.retain(|j| j.control != control);
        self.ready.retain(|j| j.control != control);
    }

    pub fn has_pending_jobs(&self) -> bool {
        !self.pending.is_empty() || !self.ready.is_empty()
    }
}
