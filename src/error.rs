use thiserror::Error;

use crate::tree::ControlId;

/// Precondition violations surfaced by tree mutations.
///
/// These indicate a bug in the calling code. Per-frame ticks never return
/// them; they log and move on to the next control instead.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TreeError {
    #[error("control {0:?} is not registered in the tree")]
    StaleControl(ControlId),

    #[error("control {0:?} has no live host object")]
    MissingHost(ControlId),

    #[error("adding {child:?} under {parent:?} would create a cycle")]
    HierarchyCycle { parent: ControlId, child: ControlId },

    #[error("control {id:?} has no behavior of type {expected}")]
    IncompatibleBehavior {
        id: ControlId,
        expected: &'static str,
    },

    #[error("control {0:?} has no widget behavior attached")]
    NoBehavior(ControlId),
}

pub type Result<T, E = TreeError> = std::result::Result<T, E>;
