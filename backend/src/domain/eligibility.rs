//! Claim eligibility rules.
//!
//! Every predicate is pure over `(domain, member, now)` so adapters can run the
//! same checks against state they have locked inside a transaction.
//! [`evaluate_claim`] applies them in a fixed order and reports the first
//! failure:
//!
//! 1. expiry
//! 2. premium gate
//! 3. duplicate claim
//! 4. capacity
//! 5. member quota
//!
//! A member's existing holding of the domain already occupies one of its
//! slots and one of their quota, so the duplicate check precedes both.
//!
//! Domain existence is checked by the caller before a snapshot can be built.

use chrono::{DateTime, TimeDelta, Utc};

use super::{CustomDomain, Entitlements, Error};

/// Domains a standard member may hold at once.
pub const STANDARD_QUOTA: u32 = 1;
/// Domains a premium member may hold at once.
pub const PREMIUM_QUOTA: u32 = 2;
/// Days before expiry at which a held domain is flagged as expiring.
pub const EXPIRING_WINDOW_DAYS: i64 = 14;

/// Maximum number of simultaneous holdings for a member.
///
/// # Examples
/// ```
/// use domain_allocation::domain::{Entitlements, eligibility::quota_for};
///
/// assert_eq!(quota_for(Entitlements::STANDARD), 1);
/// assert_eq!(quota_for(Entitlements::PREMIUM), 2);
/// ```
pub fn quota_for(member: Entitlements) -> u32 {
    if member.has_premium {
        PREMIUM_QUOTA
    } else {
        STANDARD_QUOTA
    }
}

/// The domain no longer accepts claims once `now` reaches `expires_at`.
pub fn is_expired(domain: &CustomDomain, now: DateTime<Utc>) -> bool {
    now >= domain.expires_at
}

/// A premium-only domain is closed to members without premium.
pub fn requires_premium_denied(domain: &CustomDomain, member: Entitlements) -> bool {
    domain.only_premium && !member.has_premium
}

/// Bounded domains are full when every slot is taken.
pub fn is_at_capacity(domain: &CustomDomain) -> bool {
    !domain.is_unlimited() && domain.current_usage >= domain.max_usage
}

/// The member cannot take on another holding.
pub fn quota_exceeded(member: Entitlements, held: u32) -> bool {
    held >= quota_for(member)
}

/// A live domain within [`EXPIRING_WINDOW_DAYS`] of its expiry instant.
pub fn is_expiring(domain: &CustomDomain, now: DateTime<Utc>) -> bool {
    !is_expired(domain, now) && domain.expires_at - now <= TimeDelta::days(EXPIRING_WINDOW_DAYS)
}

/// Whether the member could claim the domain right now, ignoring quota.
///
/// This drives the "available" listing and reserves nothing.
pub fn is_offered_to(domain: &CustomDomain, member: Entitlements, now: DateTime<Utc>) -> bool {
    !is_expired(domain, now) && !requires_premium_denied(domain, member) && !is_at_capacity(domain)
}

/// Reason a claim was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimDenial {
    Expired,
    PremiumRequired,
    AtCapacity,
    QuotaExceeded,
    AlreadyAssigned,
}

impl From<ClaimDenial> for Error {
    fn from(value: ClaimDenial) -> Self {
        match value {
            ClaimDenial::Expired => Error::expired("Domain has expired"),
            ClaimDenial::PremiumRequired => Error::premium_required("Premium subscription required"),
            ClaimDenial::AtCapacity => Error::at_capacity("At capacity"),
            ClaimDenial::QuotaExceeded => Error::quota_exceeded("Limit reached"),
            ClaimDenial::AlreadyAssigned => Error::already_assigned("Domain already assigned"),
        }
    }
}

/// Consistent view of the state a claim is judged against.
#[derive(Debug, Clone, Copy)]
pub struct ClaimSnapshot<'a> {
    pub domain: &'a CustomDomain,
    pub member: Entitlements,
    /// Number of domains the member currently holds.
    pub held: u32,
    /// Whether one of those holdings is this domain.
    pub holds_domain: bool,
    pub now: DateTime<Utc>,
}

/// Apply the eligibility rules in order and return the first denial.
pub fn evaluate_claim(snapshot: &ClaimSnapshot<'_>) -> Result<(), ClaimDenial> {
    let ClaimSnapshot {
        domain,
        member,
        held,
        holds_domain,
        now,
    } = *snapshot;

    if is_expired(domain, now) {
        return Err(ClaimDenial::Expired);
    }
    if requires_premium_denied(domain, member) {
        return Err(ClaimDenial::PremiumRequired);
    }
    if holds_domain {
        return Err(ClaimDenial::AlreadyAssigned);
    }
    if is_at_capacity(domain) {
        return Err(ClaimDenial::AtCapacity);
    }
    if quota_exceeded(member, held) {
        return Err(ClaimDenial::QuotaExceeded);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CustomDomainId, DomainName, ErrorCode};
    use chrono::TimeZone;
    use rstest::{fixture, rstest};

    #[fixture]
    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 5, 1, 12, 0, 0)
            .single()
            .expect("valid time")
    }

    fn domain(now: DateTime<Utc>, only_premium: bool, max_usage: u32, current: u32) -> CustomDomain {
        CustomDomain {
            id: CustomDomainId::random(),
            name: DomainName::new("pages.example").expect("valid name"),
            only_premium,
            max_usage,
            current_usage: current,
            expires_at: now + TimeDelta::days(30),
            created_at: now,
            updated_at: now,
        }
    }

    #[rstest]
    fn expiry_is_inclusive_of_the_instant(now: DateTime<Utc>) {
        let mut entry = domain(now, false, 0, 0);
        entry.expires_at = now;
        assert!(is_expired(&entry, now));
        assert!(!is_expired(&entry, now - TimeDelta::seconds(1)));
    }

    #[rstest]
    #[case(0, 1_000, false)]
    #[case(5, 4, false)]
    #[case(5, 5, true)]
    #[case(1, 1, true)]
    fn capacity_respects_unlimited_sentinel(
        now: DateTime<Utc>,
        #[case] max_usage: u32,
        #[case] current: u32,
        #[case] expected: bool,
    ) {
        assert_eq!(is_at_capacity(&domain(now, false, max_usage, current)), expected);
    }

    #[rstest]
    #[case(Entitlements::STANDARD, 0, false)]
    #[case(Entitlements::STANDARD, 1, true)]
    #[case(Entitlements::PREMIUM, 1, false)]
    #[case(Entitlements::PREMIUM, 2, true)]
    fn quota_depends_on_tier(
        #[case] member: Entitlements,
        #[case] held: u32,
        #[case] expected: bool,
    ) {
        assert_eq!(quota_exceeded(member, held), expected);
    }

    #[rstest]
    #[case(TimeDelta::days(15), false)]
    #[case(TimeDelta::days(14), true)]
    #[case(TimeDelta::days(10), true)]
    #[case(TimeDelta::seconds(1), true)]
    #[case(TimeDelta::zero(), false)]
    #[case(TimeDelta::days(-1), false)]
    fn expiring_window_excludes_expired(
        now: DateTime<Utc>,
        #[case] remaining: TimeDelta,
        #[case] expected: bool,
    ) {
        let mut entry = domain(now, false, 0, 0);
        entry.expires_at = now + remaining;
        assert_eq!(is_expiring(&entry, now), expected);
    }

    #[rstest]
    fn expired_premium_full_domain_reports_expired_first(now: DateTime<Utc>) {
        let mut entry = domain(now, true, 1, 1);
        entry.expires_at = now - TimeDelta::days(1);
        let snapshot = ClaimSnapshot {
            domain: &entry,
            member: Entitlements::STANDARD,
            held: 1,
            holds_domain: true,
            now,
        };
        assert_eq!(evaluate_claim(&snapshot), Err(ClaimDenial::Expired));
    }

    #[rstest]
    fn premium_gate_precedes_capacity(now: DateTime<Utc>) {
        let entry = domain(now, true, 1, 1);
        let snapshot = ClaimSnapshot {
            domain: &entry,
            member: Entitlements::STANDARD,
            held: 0,
            holds_domain: false,
            now,
        };
        assert_eq!(evaluate_claim(&snapshot), Err(ClaimDenial::PremiumRequired));
    }

    #[rstest]
    fn capacity_precedes_quota(now: DateTime<Utc>) {
        let entry = domain(now, false, 2, 2);
        let snapshot = ClaimSnapshot {
            domain: &entry,
            member: Entitlements::STANDARD,
            held: 1,
            holds_domain: false,
            now,
        };
        assert_eq!(evaluate_claim(&snapshot), Err(ClaimDenial::AtCapacity));
    }

    #[rstest]
    fn standard_member_reclaiming_own_domain_sees_duplicate(now: DateTime<Utc>) {
        let entry = domain(now, false, 0, 1);
        let snapshot = ClaimSnapshot {
            domain: &entry,
            member: Entitlements::STANDARD,
            held: 1,
            holds_domain: true,
            now,
        };
        assert_eq!(evaluate_claim(&snapshot), Err(ClaimDenial::AlreadyAssigned));
    }

    #[rstest]
    fn holder_of_full_single_slot_domain_sees_duplicate(now: DateTime<Utc>) {
        let entry = domain(now, false, 1, 1);
        let snapshot = ClaimSnapshot {
            domain: &entry,
            member: Entitlements::STANDARD,
            held: 1,
            holds_domain: true,
            now,
        };
        assert_eq!(evaluate_claim(&snapshot), Err(ClaimDenial::AlreadyAssigned));
    }

    #[rstest]
    fn quota_applies_to_other_domains(now: DateTime<Utc>) {
        let entry = domain(now, false, 0, 1);
        let snapshot = ClaimSnapshot {
            domain: &entry,
            member: Entitlements::STANDARD,
            held: 1,
            holds_domain: false,
            now,
        };
        assert_eq!(evaluate_claim(&snapshot), Err(ClaimDenial::QuotaExceeded));
    }

    #[rstest]
    fn premium_member_with_spare_quota_sees_duplicate(now: DateTime<Utc>) {
        let entry = domain(now, false, 0, 1);
        let snapshot = ClaimSnapshot {
            domain: &entry,
            member: Entitlements::PREMIUM,
            held: 1,
            holds_domain: true,
            now,
        };
        assert_eq!(evaluate_claim(&snapshot), Err(ClaimDenial::AlreadyAssigned));
    }

    #[rstest]
    fn eligible_claim_is_admitted(now: DateTime<Utc>) {
        let entry = domain(now, true, 3, 2);
        let snapshot = ClaimSnapshot {
            domain: &entry,
            member: Entitlements::PREMIUM,
            held: 1,
            holds_domain: false,
            now,
        };
        assert_eq!(evaluate_claim(&snapshot), Ok(()));
    }

    #[rstest]
    #[case(ClaimDenial::PremiumRequired, ErrorCode::PremiumRequired, "Premium subscription required")]
    #[case(ClaimDenial::AtCapacity, ErrorCode::AtCapacity, "At capacity")]
    #[case(ClaimDenial::QuotaExceeded, ErrorCode::QuotaExceeded, "Limit reached")]
    fn denials_map_to_client_messages(
        #[case] denial: ClaimDenial,
        #[case] code: ErrorCode,
        #[case] message: &str,
    ) {
        let error = Error::from(denial);
        assert_eq!(error.code(), code);
        assert_eq!(error.message(), message);
    }
}
