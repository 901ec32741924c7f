//! Control number generation: `PREFIX-YY-RANDOM6`.

use jiff::{tz::TimeZone, Timestamp};
use log::debug;
use rand::Rng;

use crate::{
    error::{ApprovalError, Result},
    models::PrefixConfig,
};

/// Attempts made before giving up on a collision-free number.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 10;

const SUFFIX_LEN: usize = 6;
const SUFFIX_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const MAX_PREFIX_LEN: usize = 10;

/// Produces control numbers, retrying on collision up to a bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlNumberGenerator {
    max_attempts: u32,
}

impl ControlNumberGenerator {
    /// Creates a generator that tries at most `max_attempts` candidates.
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
        }
    }

    /// Upper bound on candidates per call.
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Generates a number for an active prefix that `exists` reports as free.
    ///
    /// # Errors
    ///
    /// * `ApprovalError::Validation` - the prefix is inactive
    /// * `ApprovalError::ControlNumberExhausted` - every candidate collided
    /// * whatever `exists` returns
    ///
    /// # Examples
    ///
    /// ```rust
    /// use countersign_core::{control_number::ControlNumberGenerator, models::PrefixConfig};
    ///
    /// let prefix = PrefixConfig { code: "DV".to_string(), description: None, active: true };
    /// let number = ControlNumberGenerator::default()
    ///     .generate(&prefix, 2024, &mut rand::thread_rng(), |_| Ok(false))?;
    /// assert!(number.starts_with("DV-24-"));
    /// assert_eq!(number.len(), "DV-24-".len() + 6);
    /// # Ok::<(), countersign_core::ApprovalError>(())
    /// ```
    pub fn generate<R, F>(&self, prefix: &PrefixConfig, year: i16, rng: &mut R, mut exists: F) -> Result<String>
    where
        R: Rng,
        F: FnMut(&str) -> Result<bool>,
    {
        if !prefix.active {
            return Err(ApprovalError::validation("prefix")
                .with_reason(format!("Prefix '{}' is inactive", prefix.code)));
        }

        for attempt in 1..=self.max_attempts {
            let candidate = format_control_number(&prefix.code, year, &random_suffix(rng));
            if !exists(&candidate)? {
                return Ok(candidate);
            }
            debug!("Control number {candidate} already taken (attempt {attempt})");
        }

        Err(ApprovalError::ControlNumberExhausted {
            prefix: prefix.code.clone(),
            attempts: self.max_attempts,
        })
    }
}

impl Default for ControlNumberGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS)
    }
}

/// Joins the parts of a control number; the year is reduced to two digits.
pub fn format_control_number(prefix: &str, year: i16, suffix: &str) -> String {
    format!("{prefix}-{:02}-{suffix}", year.rem_euclid(100))
}

fn random_suffix<R: Rng>(rng: &mut R) -> String {
    (0..SUFFIX_LEN)
        .map(|_| char::from(SUFFIX_CHARSET[rng.gen_range(0..SUFFIX_CHARSET.len())]))
        .collect()
}

/// Current calendar year in UTC.
pub fn current_year() -> i16 {
    Timestamp::now().to_zoned(TimeZone::UTC).year()
}

/// Checks that a prefix code is 1-10 upper-case ASCII letters or digits.
pub fn validate_prefix_code(code: &str) -> Result<()> {
    let well_formed = !code.is_empty()
        && code.len() <= MAX_PREFIX_LEN
        && code
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit());
    if well_formed {
        Ok(())
    } else {
        Err(ApprovalError::validation("prefix").with_reason(format!(
            "Prefix '{code}' must be 1 to {MAX_PREFIX_LEN} upper-case letters or digits"
        )))
    }
}

/// Turns a storage lookup result into a usable prefix.
///
/// # Errors
///
/// Returns `ApprovalError::Validation` for an unknown or inactive prefix.
pub fn resolve_prefix(code: &str, found: Option<PrefixConfig>) -> Result<PrefixConfig> {
    match found {
        Some(prefix) if prefix.active => Ok(prefix),
        Some(_) => Err(ApprovalError::validation("prefix")
            .with_reason(format!("Prefix '{code}' is inactive"))),
        None => Err(ApprovalError::validation("prefix")
            .with_reason(format!("Prefix '{code}' is not configured"))),
    }
}
