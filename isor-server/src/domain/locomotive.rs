//! Locomotive number type.

use std::fmt;

use super::error::DomainError;

/// A validated locomotive number as entered by a user.
///
/// The portal accepts three spellings of the same vehicle:
///
/// - 6 digits: the short number (`380004`)
/// - 7 digits: the short number followed by a check digit (`3800042`)
/// - 12 digits: the full UIC number (`915453800042`)
///
/// All spellings must be ASCII digits and must not start with `0`.
/// The spelling is kept verbatim since it is what the portal query form
/// receives.
///
/// # Examples
///
/// ```
/// use isor_server::domain::LocoNumber;
///
/// let loco = LocoNumber::parse("3800042").unwrap();
/// assert_eq!(loco.short(), "380004");
/// assert_eq!(loco.display_id(), "380.004");
///
/// assert!(LocoNumber::parse("0380004").is_err());
/// assert!(LocoNumber::parse("38000").is_err());
/// ```
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct LocoNumber {
    full: String,
    short: String,
}

impl LocoNumber {
    /// Parse a locomotive number in any of the accepted spellings.
    pub fn parse(s: &str) -> Result<Self, DomainError> {
        if s.is_empty() {
            return Err(DomainError::InvalidLocoNumber {
                input: s.to_string(),
                reason: "must not be empty",
            });
        }

        if !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(DomainError::InvalidLocoNumber {
                input: s.to_string(),
                reason: "must contain only digits",
            });
        }

        if s.starts_with('0') {
            return Err(DomainError::InvalidLocoNumber {
                input: s.to_string(),
                reason: "must not start with 0",
            });
        }

        let short = match s.len() {
            6 => s,
            7 => &s[..6],
            12 => &s[5..11],
            _ => {
                return Err(DomainError::InvalidLocoNumber {
                    input: s.to_string(),
                    reason: "must be 6, 7 or 12 digits long",
                });
            }
        };

        Ok(Self {
            full: s.to_string(),
            short: short.to_string(),
        })
    }

    /// The number exactly as it was entered.
    pub fn full(&self) -> &str {
        &self.full
    }

    /// The 6-digit short number (series + serial).
    pub fn short(&self) -> &str {
        &self.short
    }

    /// Short number split into series and serial, e.g. `380.004`.
    pub fn display_id(&self) -> String {
        format!("{}.{}", &self.short[..3], &self.short[3..])
    }
}

impl fmt::Debug for LocoNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LocoNumber({})", self.full)
    }
}

impl fmt::Display for LocoNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full)
    }
}
