// Joins guests, plans and reservations into one composite view per guest.

use crate::model::{Guest, GuestDetail, Plan, Reservation};
use std::collections::{HashMap, HashSet};

/// Builds one [`GuestDetail`] per guest, in guest order.
///
/// Each view holds the reservations whose guest id equals the guest's id, in
/// reservation input order, and the plans those reservations reference,
/// deduplicated and ordered by first reference. Plan ids that match no plan are
/// skipped. Runs in O(guests + plans + reservations).
pub fn aggregate_guest_details(
    guests: Vec<Guest>,
    plans: &[Plan],
    reservations: &[Reservation],
) -> Vec<GuestDetail> {
    let mut reservations_by_guest: HashMap<&str, Vec<&Reservation>> = HashMap::new();
    for reservation in reservations {
        reservations_by_guest
            .entry(reservation.guest_id.as_str())
            .or_default()
            .push(reservation);
    }

    // First plan wins if the same id appears twice
    let mut plans_by_id: HashMap<&str, &Plan> = HashMap::with_capacity(plans.len());
    for plan in plans {
        plans_by_id.entry(plan.id.as_str()).or_insert(plan);
    }

    guests
        .into_iter()
        .map(|guest| {
            let matched = reservations_by_guest
                .get(guest.id.as_str())
                .map(Vec::as_slice)
                .unwrap_or_default();

            let mut seen = HashSet::new();
            let guest_plans = matched
                .iter()
                .map(|r| r.plan_id.as_str())
                .filter(|plan_id| seen.insert(*plan_id))
                .filter_map(|plan_id| plans_by_id.get(plan_id).map(|p| (*p).clone()))
                .collect();

            let guest_reservations = matched.iter().map(|r| (*r).clone()).collect();

            GuestDetail::new(guest, guest_plans, guest_reservations)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ReservationStatus;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    fn guest(id: &str) -> Guest {
        Guest::new(format!("guest {}", id), "", "").with_id(id)
    }

    fn plan(id: &str, price: i64) -> Plan {
        Plan::new(format!("plan {}", id), Decimal::new(price, 0)).with_id(id)
    }

    fn reservation(id: &str, guest_id: &str, plan_id: &str) -> Reservation {
        let created_at = NaiveDate::from_ymd_opt(2025, 6, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        Reservation::provisional(
            id,
            guest_id,
            plan_id,
            NaiveDate::from_ymd_opt(2025, 6, 2).unwrap(),
            2,
            Decimal::new(10000, 0),
            created_at,
        )
    }

    fn ids<T>(items: &[T], id: impl Fn(&T) -> &str) -> Vec<String> {
        items.iter().map(|item| id(item).to_string()).collect()
    }

    #[test]
    fn test_matches_reservations_and_plans_by_guest() {
        let details = aggregate_guest_details(
            vec![guest("g1")],
            &[plan("p1", 10000), plan("p2", 15000)],
            &[reservation("r1", "g1", "p1"), reservation("r2", "gX", "p2")],
        );

        assert_eq!(details.len(), 1);
        assert_eq!(ids(&details[0].reservations, |r| r.id.as_str()), vec!["r1"]);
        assert_eq!(ids(&details[0].plans, |p| p.id.as_str()), vec!["p1"]);
    }

    #[test]
    fn test_guest_without_reservations_gets_empty_lists() {
        let details = aggregate_guest_details(
            vec![guest("g1"), guest("g2")],
            &[plan("p1", 10000)],
            &[reservation("r1", "g1", "p1")],
        );

        assert_eq!(details.len(), 2);
        assert_eq!(details[1].guest.id, "g2");
        assert!(details[1].reservations.is_empty());
        assert!(details[1].plans.is_empty());
    }

    #[test]
    fn test_empty_inputs() {
        assert!(aggregate_guest_details(vec![], &[plan("p1", 1)], &[]).is_empty());

        let details = aggregate_guest_details(vec![guest("g1")], &[], &[]);
        assert_eq!(details.len(), 1);
        assert!(details[0].reservations.is_empty());
    }

    #[test]
    fn test_orders_follow_reservation_input_and_first_plan_reference() {
        let details = aggregate_guest_details(
            vec![guest("g2"), guest("g1")],
            &[plan("p1", 1), plan("p2", 2), plan("p3", 3)],
            &[
                reservation("r1", "g1", "p3"),
                reservation("r2", "g2", "p2"),
                reservation("r3", "g1", "p1"),
                reservation("r4", "g1", "p3"),
                reservation("r5", "g1", "p2"),
            ],
        );

        assert_eq!(details[0].guest.id, "g2");
        assert_eq!(ids(&details[0].reservations, |r| r.id.as_str()), vec!["r2"]);

        let g1 = &details[1];
        assert_eq!(ids(&g1.reservations, |r| r.id.as_str()), vec!["r1", "r3", "r4", "r5"]);
        assert_eq!(ids(&g1.plans, |p| p.id.as_str()), vec!["p3", "p1", "p2"]);
    }

    #[test]
    fn test_unknown_plan_reference_is_skipped() {
        let details = aggregate_guest_details(
            vec![guest("g1")],
            &[plan("p1", 1)],
            &[reservation("r1", "g1", "gone"), reservation("r2", "g1", "p1")],
        );
        assert_eq!(details[0].reservations.len(), 2);
        assert_eq!(ids(&details[0].plans, |p| p.id.as_str()), vec!["p1"]);
    }

    #[test]
    fn test_reservations_are_copied_unchanged() {
        let stored = reservation("r1", "g1", "p1")
            .with_status(ReservationStatus::CheckedIn)
            .with_memo("late arrival");
        let details =
            aggregate_guest_details(vec![guest("g1")], &[plan("p1", 1)], &[stored.clone()]);
        assert_eq!(details[0].reservations, vec![stored]);
    }
}
