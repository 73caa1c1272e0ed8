// Domain records shared by the storage port, the aggregator and the workflows.
// Field names serialize in camelCase so the JSON shape matches the front end.

use chrono::{Days, NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// A person who can hold reservations. Guests are never hard-deleted.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Guest {
    pub id: String,
    pub name: String,
    pub kana_name: String,
    pub gender: String,
    pub age: Option<u32>,
    pub region: String,
    pub email: String,
    pub phone: String,
    pub deleted: bool,
}

impl Guest {
    pub fn new(
        name: impl Into<String>,
        kana_name: impl Into<String>,
        phone: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            kana_name: kana_name.into(),
            phone: phone.into(),
            ..Default::default()
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_gender(mut self, gender: impl Into<String>) -> Self {
        self.gender = gender.into();
        self
    }

    pub fn with_age(mut self, age: u32) -> Self {
        self.age = Some(age);
        self
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = region.into();
        self
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = email.into();
        self
    }

    pub fn with_deleted(mut self, deleted: bool) -> Self {
        self.deleted = deleted;
        self
    }

    /// An empty or blank id means the guest has not been registered yet.
    pub fn has_identity(&self) -> bool {
        !self.id.trim().is_empty()
    }
}

// A bookable stay offering ("booking" on the wire).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Plan {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: Decimal,
    #[serde(default = "available_by_default")]
    pub is_available: bool,
}

fn available_by_default() -> bool {
    true
}

impl Plan {
    pub fn new(name: impl Into<String>, price: Decimal) -> Self {
        Self {
            id: String::new(),
            name: name.into(),
            description: String::new(),
            price,
            is_available: true,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_availability(mut self, is_available: bool) -> Self {
        self.is_available = is_available;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReservationStatus {
    Temporary,
    NotCheckedIn,
    CheckedIn,
    CheckedOut,
    Cancelled,
}

impl ReservationStatus {
    pub const ALL: [ReservationStatus; 5] = [
        ReservationStatus::Temporary,
        ReservationStatus::NotCheckedIn,
        ReservationStatus::CheckedIn,
        ReservationStatus::CheckedOut,
        ReservationStatus::Cancelled,
    ];

    // Cancellation is absorbing and only reachable before check-out.
    pub fn can_cancel(self) -> bool {
        matches!(
            self,
            ReservationStatus::Temporary
                | ReservationStatus::NotCheckedIn
                | ReservationStatus::CheckedIn
        )
    }

    /// Status changes allowed through a plain reservation edit. Check-in and
    /// check-out are excluded; they belong to the lifecycle guard.
    pub fn can_edit_to(self, target: ReservationStatus) -> bool {
        if self == target {
            return true;
        }
        match target {
            ReservationStatus::NotCheckedIn => self == ReservationStatus::Temporary,
            ReservationStatus::Cancelled => self.can_cancel(),
            _ => false,
        }
    }
}

impl std::fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let code = match self {
            ReservationStatus::Temporary => "TEMPORARY",
            ReservationStatus::NotCheckedIn => "NOT_CHECKED_IN",
            ReservationStatus::CheckedIn => "CHECKED_IN",
            ReservationStatus::CheckedOut => "CHECKED_OUT",
            ReservationStatus::Cancelled => "CANCELLED",
        };
        f.write_str(code)
    }
}

// Display labels shown on the front desk screens.
pub fn status_label(status: ReservationStatus) -> &'static str {
    match status {
        ReservationStatus::Temporary => "仮予約",
        ReservationStatus::NotCheckedIn => "未チェックイン",
        ReservationStatus::CheckedIn => "チェックイン",
        ReservationStatus::CheckedOut => "チェックアウト",
        ReservationStatus::Cancelled => "キャンセル",
    }
}

// One guest bound to one plan for a stay. `total_price` is a snapshot of the
// plan price taken when the reservation was created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reservation {
    pub id: String,
    pub guest_id: String,
    #[serde(rename = "bookingId")]
    pub plan_id: String,
    pub check_in_date: NaiveDate,
    pub stay_days: u32,
    pub total_price: Decimal,
    pub status: ReservationStatus,
    #[serde(default)]
    pub memo: String,
    pub created_at: NaiveDateTime,
}

impl Reservation {
    /// A freshly requested reservation: provisional status, empty memo.
    pub fn provisional(
        id: impl Into<String>,
        guest_id: impl Into<String>,
        plan_id: impl Into<String>,
        check_in_date: NaiveDate,
        stay_days: u32,
        total_price: Decimal,
        created_at: NaiveDateTime,
    ) -> Self {
        Self {
            id: id.into(),
            guest_id: guest_id.into(),
            plan_id: plan_id.into(),
            check_in_date,
            stay_days,
            total_price,
            status: ReservationStatus::Temporary,
            memo: String::new(),
            created_at,
        }
    }

    pub fn with_status(mut self, status: ReservationStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_memo(mut self, memo: impl Into<String>) -> Self {
        self.memo = memo.into();
        self
    }

    // Day the stay ends. None only when the date overflows.
    pub fn check_out_date(&self) -> Option<NaiveDate> {
        self.check_in_date
            .checked_add_days(Days::new(u64::from(self.stay_days)))
    }
}

// Composite guest view: the guest, the plans its reservations reference and the
// reservations themselves.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GuestDetail {
    pub guest: Guest,
    #[serde(rename = "bookings")]
    pub plans: Vec<Plan>,
    pub reservations: Vec<Reservation>,
}

impl GuestDetail {
    pub fn new(guest: Guest, plans: Vec<Plan>, reservations: Vec<Reservation>) -> Self {
        Self {
            guest,
            plans,
            reservations,
        }
    }

    // A view with no reservations, used to echo an unmatched query back.
    pub fn guest_only(guest: Guest) -> Self {
        Self {
            guest,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(ReservationStatus::Temporary, ReservationStatus::NotCheckedIn, true)]
    #[test_case(ReservationStatus::Temporary, ReservationStatus::Cancelled, true)]
    #[test_case(ReservationStatus::NotCheckedIn, ReservationStatus::Cancelled, true)]
    #[test_case(ReservationStatus::CheckedIn, ReservationStatus::Cancelled, true)]
    #[test_case(ReservationStatus::CheckedOut, ReservationStatus::Cancelled, false)]
    #[test_case(ReservationStatus::Cancelled, ReservationStatus::Cancelled, true)]
    #[test_case(ReservationStatus::NotCheckedIn, ReservationStatus::CheckedIn, false)]
    #[test_case(ReservationStatus::CheckedIn, ReservationStatus::CheckedOut, false)]
    #[test_case(ReservationStatus::Cancelled, ReservationStatus::Temporary, false)]
    fn test_edit_transitions(from: ReservationStatus, to: ReservationStatus, allowed: bool) {
        assert_eq!(from.can_edit_to(to), allowed);
    }

    #[test]
    fn test_every_status_has_a_label() {
        for status in ReservationStatus::ALL {
            assert!(!status_label(status).is_empty());
        }
        assert_eq!(status_label(ReservationStatus::Temporary), "仮予約");
        assert_eq!(status_label(ReservationStatus::CheckedIn), "チェックイン");
    }

    #[test]
    fn test_check_out_date_adds_stay_days() {
        let created_at = NaiveDate::from_ymd_opt(2025, 6, 1)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        let reservation = Reservation::provisional(
            "r1",
            "g1",
            "p1",
            NaiveDate::from_ymd_opt(2025, 6, 30).unwrap(),
            3,
            Decimal::new(10000, 0),
            created_at,
        );
        assert_eq!(
            reservation.check_out_date(),
            NaiveDate::from_ymd_opt(2025, 7, 3)
        );
    }

    #[test]
    fn test_status_wire_format() {
        let json = serde_json::to_string(&ReservationStatus::NotCheckedIn).unwrap();
        assert_eq!(json, "\"NOT_CHECKED_IN\"");
        assert_eq!(ReservationStatus::NotCheckedIn.to_string(), "NOT_CHECKED_IN");

        let parsed: ReservationStatus = serde_json::from_str("\"CHECKED_OUT\"").unwrap();
        assert_eq!(parsed, ReservationStatus::CheckedOut);
    }

    #[test]
    fn test_guest_identity_and_defaults() {
        let guest: Guest =
            serde_json::from_str(r#"{"name":"Hanako Sato","kanaName":"SATO HANAKO"}"#).unwrap();
        assert!(!guest.has_identity());
        assert!(!guest.deleted);
        assert_eq!(guest.kana_name, "SATO HANAKO");

        assert!(!Guest::new("a", "b", "c").with_id("   ").has_identity());
        assert!(Guest::new("a", "b", "c").with_id("g1").has_identity());
    }

    #[test]
    fn test_reservation_uses_booking_id_on_the_wire() {
        let created_at = NaiveDate::from_ymd_opt(2025, 6, 1)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        let reservation = Reservation::provisional(
            "r1",
            "g1",
            "p1",
            NaiveDate::from_ymd_opt(2025, 6, 2).unwrap(),
            0,
            Decimal::new(10000, 0),
            created_at,
        );

        let value = serde_json::to_value(&reservation).unwrap();
        assert_eq!(value["bookingId"], "p1");
        assert_eq!(value["guestId"], "g1");
        assert_eq!(value["status"], "TEMPORARY");
        assert_eq!(value["memo"], "");
    }

    #[test]
    fn test_plan_is_available_unless_stated() {
        let plan: Plan = serde_json::from_str(r#"{"name":"Standard","price":"12000"}"#).unwrap();
        assert!(plan.is_available);
        assert_eq!(plan.price, Decimal::new(12000, 0));
    }
}
