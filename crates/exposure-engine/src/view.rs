//! Presentation state of a single exposure check.
//!
//! ```text
//! Idle ──begin──▶ Resolving ──complete──▶ Resolved{Safe|Breached} ──toggle──▶ DetailsExpanded
//!                     │                        ▲                                   │
//!                     └──complete(err)──▶ Failed └──────────────toggle─────────────┘
//! ```
//!
//! Only resolution completion and explicit user toggles move the state. A failed resolution is
//! its own state, so it can never be shown as a safe result.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{error::ResolveError, report::ExposureReport};

/// Whether any breach was found.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum Outcome {
    #[allow(missing_docs)]
    Safe,
    #[allow(missing_docs)]
    Breached,
}

/// A transition that is not allowed from the current state.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Cannot {action} while the view is {state}")]
pub struct InvalidTransitionError {
    action: &'static str,
    state: &'static str,
}

#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ReportView {
    #[default]
    Idle,
    Resolving,
    Resolved {
        outcome: Outcome,
        report: ExposureReport,
    },
    DetailsExpanded {
        report: ExposureReport,
    },
    Failed {
        error: ResolveError,
    },
}

impl ReportView {
    /// Start a new check. Allowed from every state except `Resolving`.
    pub fn begin(&mut self) -> Result<(), InvalidTransitionError> {
        if matches!(self, ReportView::Resolving) {
            return Err(self.invalid("begin a check"));
        }
        *self = ReportView::Resolving;
        Ok(())
    }

    /// Record the result of the check started by [`ReportView::begin`].
    pub fn complete(
        &mut self,
        result: Result<ExposureReport, ResolveError>,
    ) -> Result<(), InvalidTransitionError> {
        if !matches!(self, ReportView::Resolving) {
            return Err(self.invalid("complete a check"));
        }

        *self = match result {
            Ok(report) => ReportView::Resolved {
                outcome: if report.is_breached() {
                    Outcome::Breached
                } else {
                    Outcome::Safe
                },
                report,
            },
            Err(error) => ReportView::Failed { error },
        };
        Ok(())
    }

    /// Expand or collapse the breach details. Only breached reports have details.
    pub fn toggle_details(&mut self) -> Result<(), InvalidTransitionError> {
        match std::mem::take(self) {
            ReportView::Resolved {
                outcome: Outcome::Breached,
                report,
            } => {
                *self = ReportView::DetailsExpanded { report };
                Ok(())
            }
            ReportView::DetailsExpanded { report } => {
                *self = ReportView::Resolved {
                    outcome: Outcome::Breached,
                    report,
                };
                Ok(())
            }
            other => {
                *self = other;
                Err(self.invalid("toggle details"))
            }
        }
    }

    /// The resolved report, if any.
    pub fn report(&self) -> Option<&ExposureReport> {
        match self {
            ReportView::Resolved { report, .. } | ReportView::DetailsExpanded { report } => {
                Some(report)
            }
            _ => None,
        }
    }

    #[allow(missing_docs)]
    pub fn details_expanded(&self) -> bool {
        matches!(self, ReportView::DetailsExpanded { .. })
    }

    fn state_name(&self) -> &'static str {
        match self {
            ReportView::Idle => "idle",
            ReportView::Resolving => "resolving",
            ReportView::Resolved {
                outcome: Outcome::Safe,
                ..
            } => "resolved (safe)",
            ReportView::Resolved {
                outcome: Outcome::Breached,
                ..
            } => "resolved (breached)",
            ReportView::DetailsExpanded { .. } => "showing details",
            ReportView::Failed { .. } => "failed",
        }
    }

    fn invalid(&self, action: &'static str) -> InvalidTransitionError {
        InvalidTransitionError {
            action,
            state: self.state_name(),
        }
    }
}
