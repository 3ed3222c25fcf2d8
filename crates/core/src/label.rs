//! Classification labels and the correction transition graph.
//!
//! Every sequence carries exactly one of three tokens. `C-LUS` is the
//! neutral token: it connects to both others, while `H-LUS` and `I-LUS`
//! connect only to `C-LUS`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

pub const LABEL_H: &str = "H-LUS";
pub const LABEL_C: &str = "C-LUS";
pub const LABEL_I: &str = "I-LUS";

/// All valid label strings, in the order classes are presented.
pub const VALID_LABELS: &[&str] = &[LABEL_H, LABEL_C, LABEL_I];

// ---------------------------------------------------------------------------
// Label
// ---------------------------------------------------------------------------

/// A sequence classification label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Label {
    #[serde(rename = "H-LUS")]
    HLus,
    #[serde(rename = "C-LUS")]
    CLus,
    #[serde(rename = "I-LUS")]
    ILus,
}

/// Text and color used when rendering a label badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Badge {
    pub text: &'static str,
    /// `#RRGGBB` background color.
    pub color: &'static str,
}

impl Label {
    /// All labels in presentation order.
    pub const ALL: [Label; 3] = [Label::HLus, Label::CLus, Label::ILus];

    /// Return the label token, e.g. `"H-LUS"`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::HLus => LABEL_H,
            Self::CLus => LABEL_C,
            Self::ILus => LABEL_I,
        }
    }

    /// Single-letter class initial used in sequence ids.
    pub fn initial(self) -> char {
        match self {
            Self::HLus => 'H',
            Self::CLus => 'C',
            Self::ILus => 'I',
        }
    }

    /// Inverse of [`Label::initial`].
    pub fn from_initial(initial: char) -> Option<Self> {
        match initial {
            'H' => Some(Self::HLus),
            'C' => Some(Self::CLus),
            'I' => Some(Self::ILus),
            _ => None,
        }
    }

    /// Labels this label may be corrected to.
    pub fn valid_transitions(self) -> &'static [Label] {
        match self {
            Self::HLus => &[Label::CLus],
            Self::CLus => &[Label::HLus, Label::ILus],
            Self::ILus => &[Label::CLus],
        }
    }

    /// Whether a correction from `self` to `target` follows the graph.
    pub fn can_transition_to(self, target: Label) -> bool {
        self.valid_transitions().contains(&target)
    }

    pub fn badge(self) -> Badge {
        let color = match self {
            Self::HLus => "#16A34A",
            Self::CLus => "#F59E0B",
            Self::ILus => "#DC2626",
        };
        Badge {
            text: self.as_str(),
            color,
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Label {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            LABEL_H => Ok(Self::HLus),
            LABEL_C => Ok(Self::CLus),
            LABEL_I => Ok(Self::ILus),
            _ => Err(CoreError::Validation(format!(
                "Invalid label '{s}'. Must be one of: {}",
                VALID_LABELS.join(", ")
            ))),
        }
    }
}

/// Validate a recorded correction: the labels must differ and be adjacent.
pub fn validate_correction(previous: Label, updated: Label) -> Result<(), CoreError> {
    if previous == updated {
        return Err(CoreError::Validation(format!(
            "Correction must change the label, got {previous} -> {updated}"
        )));
    }
    if !previous.can_transition_to(updated) {
        return Err(CoreError::Validation(format!(
            "Label {previous} cannot be corrected to {updated}"
        )));
    }
    Ok(())
}
