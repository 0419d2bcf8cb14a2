//! Query-name normalization.
//!
//! Reduces a raw DNS question name ("Mumbai.time.") to the argument a
//! service expects ("mumbai"). Every registration carries an explicit
//! [`NormalizePolicy`] so the suffix handling and the allowed character
//! set are decided once, at registration time, not per query.

/// Which characters survive normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Charset {
    /// `[a-z0-9/.\-:,]`, for structured arguments such as CIDR
    /// prefixes, ratios and timestamps.
    Broad,
    /// `[a-z/]`, for plain place-name lookups.
    Narrow,
}

impl Charset {
    fn allows(self, c: char) -> bool {
        match self {
            Charset::Broad => {
                c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '/' | '.' | '-' | ':' | ',')
            }
            Charset::Narrow => c.is_ascii_lowercase() || c == '/',
        }
    }
}

/// What to do with the registered suffix before cleaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strip {
    /// Remove the trailing `.<suffix>.` from the name.
    Suffix,
    /// Pass the full name through; used by country-code registrations
    /// where the suffix labels are part of the argument.
    Nothing,
}

/// A registration's complete normalization policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NormalizePolicy {
    /// Allowed character set.
    pub charset: Charset,
    /// Suffix handling.
    pub strip: Strip,
}

impl NormalizePolicy {
    /// Broad charset, suffix stripped. The default for most services.
    pub const fn broad() -> Self {
        Self {
            charset: Charset::Broad,
            strip: Strip::Suffix,
        }
    }

    /// Narrow charset, suffix stripped.
    pub const fn narrow() -> Self {
        Self {
            charset: Charset::Narrow,
            strip: Strip::Suffix,
        }
    }

    /// Keep the full name as the argument.
    pub const fn keep_name(charset: Charset) -> Self {
        Self {
            charset,
            strip: Strip::Nothing,
        }
    }
}

/// Normalize a dot-terminated question name into a service argument.
///
/// Strips `.<suffix>.` from the end when the policy says so (a bare
/// `<suffix>.` name is left alone, so services can special-case it),
/// lower-cases the remainder and deletes every disallowed character.
pub fn normalize(name: &str, suffix: &str, policy: NormalizePolicy) -> String {
    let trimmed = match policy.strip {
        Strip::Suffix => {
            let tail = format!(".{}.", suffix);
            name.strip_suffix(&tail).unwrap_or(name)
        }
        Strip::Nothing => name,
    };

    trimmed
        .chars()
        .flat_map(char::to_lowercase)
        .filter(|&c| policy.charset.allows(c))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_suffix_and_lowercases() {
        assert_eq!(normalize("Mumbai.time.", "time", NormalizePolicy::narrow()), "mumbai");
    }

    #[test]
    fn suffix_round_trip_broad() {
        // P4: a clean argument survives normalization exactly.
        for arg in ["100usd-inr", "10.100.0.0/24", "2026-01-02t15:04-paris-tokyo"] {
            let name = format!("{}.fx.", arg);
            assert_eq!(normalize(&name, "fx", NormalizePolicy::broad()), arg);
        }
    }

    #[test]
    fn bare_suffix_is_not_stripped() {
        // "coin." has no leading ".coin." to remove; services use the
        // leftover to detect an argument-less query.
        assert_eq!(normalize("coin.", "coin", NormalizePolicy::broad()), "coin.");
    }

    #[test]
    fn narrow_drops_structured_chars() {
        assert_eq!(
            normalize("new-york,10.time.", "time", NormalizePolicy::narrow()),
            "newyork"
        );
        assert_eq!(
            normalize("paris/FR.time.", "time", NormalizePolicy::narrow()),
            "paris/fr"
        );
    }

    #[test]
    fn broad_keeps_structured_chars() {
        assert_eq!(
            normalize("10.100.0.0/24.cidr.", "cidr", NormalizePolicy::broad()),
            "10.100.0.0/24"
        );
    }

    #[test]
    fn keep_name_passes_everything() {
        let policy = NormalizePolicy::keep_name(Charset::Broad);
        assert_eq!(normalize("goa.holiday.in.", "holiday.in", policy), "goa.holiday.in.");
    }

    #[test]
    fn disallowed_chars_are_deleted_not_rejected() {
        // Normalization transforms; it never fails.
        assert_eq!(
            normalize("m_u!m bai.time.", "time", NormalizePolicy::narrow()),
            "mumbai"
        );
    }
}
