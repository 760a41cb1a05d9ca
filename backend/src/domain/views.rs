//! Read models derived from one consistent catalogue and ledger snapshot.

use chrono::{DateTime, Utc};

use super::eligibility::{is_expiring, is_offered_to};
use super::{CustomDomain, DomainAssignment, Entitlements, Holding};

/// A member's holding annotated for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignedDomainView {
    pub assignment: DomainAssignment,
    pub domain: CustomDomain,
    /// Live and within the expiring window.
    pub is_expiring: bool,
}

/// Domains the member could claim at `now`, ordered by name.
pub fn project_available(
    catalogue: Vec<CustomDomain>,
    member: Entitlements,
    now: DateTime<Utc>,
) -> Vec<CustomDomain> {
    let mut offered: Vec<CustomDomain> = catalogue
        .into_iter()
        .filter(|domain| is_offered_to(domain, member, now))
        .collect();
    offered.sort_by(|a, b| a.name.as_ref().cmp(b.name.as_ref()));
    offered
}

/// The member's holdings with expiry flags, oldest claim first.
pub fn project_assigned(holdings: Vec<Holding>, now: DateTime<Utc>) -> Vec<AssignedDomainView> {
    let mut views: Vec<AssignedDomainView> = holdings
        .into_iter()
        .map(|Holding { assignment, domain }| AssignedDomainView {
            is_expiring: is_expiring(&domain, now),
            assignment,
            domain,
        })
        .collect();
    views.sort_by_key(|view| view.assignment.assigned_at);
    views
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CustomDomainId, DomainName, UserId};
    use chrono::{TimeDelta, TimeZone};
    use rstest::{fixture, rstest};

    #[fixture]
    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 6, 1, 8, 30, 0)
            .single()
            .expect("valid time")
    }

    fn entry(name: &str, now: DateTime<Utc>, expires_in: TimeDelta) -> CustomDomain {
        CustomDomain {
            id: CustomDomainId::random(),
            name: DomainName::new(name).expect("valid name"),
            only_premium: false,
            max_usage: 0,
            current_usage: 0,
            expires_at: now + expires_in,
            created_at: now,
            updated_at: now,
        }
    }

    #[rstest]
    fn available_filters_and_sorts(now: DateTime<Utc>) {
        let open = entry("zeta.example", now, TimeDelta::days(60));
        let expired = entry("old.example", now, TimeDelta::days(-1));
        let mut premium = entry("gold.example", now, TimeDelta::days(60));
        premium.only_premium = true;
        let mut full = entry("full.example", now, TimeDelta::days(60));
        full.max_usage = 1;
        full.current_usage = 1;
        let also_open = entry("alpha.example", now, TimeDelta::days(3));

        let catalogue = vec![open, expired, premium, full, also_open];

        let standard: Vec<String> =
            project_available(catalogue.clone(), Entitlements::STANDARD, now)
                .into_iter()
                .map(|domain| domain.name.to_string())
                .collect();
        assert_eq!(standard, vec!["alpha.example", "zeta.example"]);

        let premium_view: Vec<String> = project_available(catalogue, Entitlements::PREMIUM, now)
            .into_iter()
            .map(|domain| domain.name.to_string())
            .collect();
        assert_eq!(
            premium_view,
            vec!["alpha.example", "gold.example", "zeta.example"]
        );
    }

    #[rstest]
    fn assigned_flags_expiring_holdings(now: DateTime<Utc>) {
        let user = UserId::random();
        let soon = entry("soon.example", now, TimeDelta::days(10));
        let later = entry("later.example", now, TimeDelta::days(40));
        let gone = entry("gone.example", now, TimeDelta::days(-2));

        let holdings = [soon, later, gone]
            .into_iter()
            .enumerate()
            .map(|(offset, domain)| Holding {
                assignment: DomainAssignment::new(
                    user,
                    domain.id,
                    now - TimeDelta::hours(i64::try_from(offset).expect("small offset")),
                ),
                domain,
            })
            .collect();

        let views = project_assigned(holdings, now);
        let flags: Vec<(String, bool)> = views
            .iter()
            .map(|view| (view.domain.name.to_string(), view.is_expiring))
            .collect();

        assert_eq!(
            flags,
            vec![
                ("gone.example".to_owned(), false),
                ("later.example".to_owned(), false),
                ("soon.example".to_owned(), true),
            ]
        );
    }
}
