//! Per-call result envelope for business-rule refusals.
//!
//! A refusal is an expected outcome, not an error: the caller gets the
//! (unchanged or partially updated) entity back together with every reason
//! the requested sub-action did not happen.

use crate::model::descriptor::DescriptorId;
use crate::model::node::NodeId;
use std::fmt::{Display, Formatter};

/// Separator used when several refusal reasons are rendered as one message.
pub const REASON_SEPARATOR: &str = " | ";

/// Business-rule refusal reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Refusal {
    /// First-language initialization ran on a non-empty registry.
    AlreadyInitialized,
    /// The only language in the registry cannot change activity.
    LoneLanguage,
    /// The default language cannot be deactivated.
    DefaultLanguageDeactivation,
    /// The last active language cannot be deactivated.
    LastActiveLanguage,
    /// An inactive language cannot become the default.
    InactiveDefault,
    /// Relocation would make the node its own ancestor.
    RelocationCycle {
        node_id: NodeId,
        destination_id: NodeId,
    },
    /// A descriptor edit referenced an unknown descriptor.
    DescriptorMissing(DescriptorId),
}

impl Display for Refusal {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AlreadyInitialized => {
                write!(f, "language is already present; initialization is not needed")
            }
            Self::LoneLanguage => write!(
                f,
                "cannot change the active status of the lone language in the system"
            ),
            Self::DefaultLanguageDeactivation => {
                write!(f, "cannot deactivate the default language")
            }
            Self::LastActiveLanguage => write!(f, "cannot deactivate the last active language"),
            Self::InactiveDefault => write!(f, "cannot set an inactive language as default"),
            Self::RelocationCycle {
                node_id,
                destination_id,
            } => write!(
                f,
                "relocating node {node_id} under {destination_id} would create a cycle"
            ),
            Self::DescriptorMissing(id) => write!(f, "descriptor not found: {id}"),
        }
    }
}

/// Success or refusal of one use-case call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T> {
    /// Requested change applied; `message` reports what happened.
    Done { value: T, message: String },
    /// Requested change applied except for the refused sub-actions.
    Partial {
        value: T,
        message: String,
        reasons: Vec<Refusal>,
    },
    /// Requested change refused as a whole; nothing was mutated.
    Refused { value: T, reasons: Vec<Refusal> },
}

impl<T> Outcome<T> {
    pub fn done(value: T, message: impl Into<String>) -> Self {
        Self::Done {
            value,
            message: message.into(),
        }
    }

    pub fn refused(value: T, reason: Refusal) -> Self {
        Self::Refused {
            value,
            reasons: vec![reason],
        }
    }

    /// Builds `Done` when `reasons` is empty, `Partial` otherwise.
    pub fn from_reasons(value: T, message: impl Into<String>, reasons: Vec<Refusal>) -> Self {
        let message = message.into();
        if reasons.is_empty() {
            Self::Done { value, message }
        } else {
            Self::Partial {
                value,
                message,
                reasons,
            }
        }
    }

    pub fn is_done(&self) -> bool {
        matches!(self, Self::Done { .. })
    }

    pub fn value(&self) -> &T {
        match self {
            Self::Done { value, .. } | Self::Partial { value, .. } | Self::Refused { value, .. } => {
                value
            }
        }
    }

    pub fn into_value(self) -> T {
        match self {
            Self::Done { value, .. } | Self::Partial { value, .. } | Self::Refused { value, .. } => {
                value
            }
        }
    }

    /// Log status label: `ok`, `partial` or `refused`.
    pub fn status(&self) -> &'static str {
        match self {
            Self::Done { .. } => "ok",
            Self::Partial { .. } => "partial",
            Self::Refused { .. } => "refused",
        }
    }

    /// Refusal reasons; empty for `Done`.
    pub fn reasons(&self) -> &[Refusal] {
        match self {
            Self::Done { .. } => &[],
            Self::Partial { reasons, .. } | Self::Refused { reasons, .. } => reasons,
        }
    }

    /// Human-readable message for end users.
    ///
    /// A partial outcome leads with what was applied, then every reason.
    pub fn message(&self) -> String {
        match self {
            Self::Done { message, .. } => message.clone(),
            Self::Partial {
                message, reasons, ..
            } => std::iter::once(message.clone())
                .chain(reasons.iter().map(ToString::to_string))
                .collect::<Vec<_>>()
                .join(REASON_SEPARATOR),
            Self::Refused { reasons, .. } => reasons
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(REASON_SEPARATOR),
        }
    }
}
