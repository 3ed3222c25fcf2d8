//! Sequence identifier encodings.
//!
//! The backend stores the raw form `"<Initial>-<NNN>"` (e.g. `H-001`).
//! The history log shows the display form, prefixed with the numeric part
//! of the patient id: `"<patientNumber>-<Initial>-<NNN>"` (e.g. `1-H-001`).

use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;
use crate::label::Label;

/// A sequence position within a (patient, class) group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SequenceCode {
    pub class: Label,
    /// 1-based sequence number.
    pub number: u32,
}

impl SequenceCode {
    pub fn new(class: Label, number: u32) -> Self {
        Self { class, number }
    }

    /// Raw backend form, e.g. `C-007`.
    pub fn raw(&self) -> String {
        format!("{}-{:03}", self.class.initial(), self.number)
    }

    /// Display form including the patient number, e.g. `3-C-007`.
    pub fn display_id(&self, patient_id: &str) -> String {
        format!("{}-{}", patient_number(patient_id), self.raw())
    }
}

impl fmt::Display for SequenceCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw())
    }
}

impl FromStr for SequenceCode {
    type Err = CoreError;

    /// Parse the raw form. The number must be at least three digits and
    /// non-zero.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || {
            CoreError::Validation(format!(
                "Invalid sequence id '{s}'. Expected '<H|C|I>-<NNN>'"
            ))
        };

        let (initial, digits) = s.split_once('-').ok_or_else(invalid)?;
        let mut chars = initial.chars();
        let class = match (chars.next(), chars.next()) {
            (Some(c), None) => Label::from_initial(c).ok_or_else(invalid)?,
            _ => return Err(invalid()),
        };
        if digits.len() < 3 || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }
        let number: u32 = digits.parse().map_err(|_| invalid())?;
        if number == 0 {
            return Err(invalid());
        }
        Ok(Self { class, number })
    }
}

/// Extract the patient number used in display ids.
///
/// Takes the trailing run of ASCII digits (`Patient_3` -> `3`). Ids without
/// trailing digits are returned unchanged.
pub fn patient_number(patient_id: &str) -> &str {
    let digits_start = patient_id
        .char_indices()
        .rev()
        .take_while(|(_, c)| c.is_ascii_digit())
        .last()
        .map(|(i, _)| i);
    match digits_start {
        Some(start) => &patient_id[start..],
        None => patient_id,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_form_is_zero_padded() {
        assert_eq!(SequenceCode::new(Label::HLus, 1).raw(), "H-001");
        assert_eq!(SequenceCode::new(Label::ILus, 42).raw(), "I-042");
        assert_eq!(SequenceCode::new(Label::CLus, 1234).raw(), "C-1234");
    }

    #[test]
    fn test_display_id_prefixes_patient_number() {
        let code = SequenceCode::new(Label::HLus, 2);
        assert_eq!(code.display_id("Patient_3"), "3-H-002");
        assert_eq!(code.display_id("Patient_12"), "12-H-002");
    }

    #[test]
    fn test_patient_number_fallback() {
        assert_eq!(patient_number("Patient_7"), "7");
        assert_eq!(patient_number("42"), "42");
        assert_eq!(patient_number("anonymous"), "anonymous");
        assert_eq!(patient_number(""), "");
    }

    #[test]
    fn test_parse_raw() {
        let code: SequenceCode = "C-015".parse().unwrap();
        assert_eq!(code, SequenceCode::new(Label::CLus, 15));
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for bad in ["", "H001", "X-001", "H-01", "H-abc", "HH-001", "H-000", "1-H-001"] {
            assert!(bad.parse::<SequenceCode>().is_err(), "{bad} should be rejected");
        }
    }
}
