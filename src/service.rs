// Hotel front-desk workflows: composite guest views, guest registration and the
// check-in/check-out lifecycle guard.

use crate::aggregator::aggregate_guest_details;
use crate::config::HotelConfig;
use crate::error::{HotelError, HotelResult};
use crate::model::{Guest, GuestDetail, Plan, Reservation, ReservationStatus};
use crate::repository::{GuestMatch, GuestSearch, HotelRepository};
use chrono::{Days, Local, NaiveDate, NaiveDateTime};
use dashmap::DashMap;
use futures::future::try_join_all;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use uuid::Uuid;

// A plan picked by the guest. Only the id is trusted; any price sent along with
// it is ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanSelection {
    pub id: String,
}

impl PlanSelection {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuestRegistration {
    pub guest: Guest,
    #[serde(rename = "bookings")]
    pub plans: Vec<PlanSelection>,
}

impl GuestRegistration {
    pub fn new(guest: Guest, plans: Vec<PlanSelection>) -> Self {
        Self { guest, plans }
    }
}

// Editable part of a reservation. Owner, plan, price and creation time stay as stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationEdit {
    pub id: String,
    pub check_in_date: NaiveDate,
    pub stay_days: u32,
    #[serde(default)]
    pub memo: String,
    pub status: ReservationStatus,
}

impl From<&Reservation> for ReservationEdit {
    fn from(reservation: &Reservation) -> Self {
        Self {
            id: reservation.id.clone(),
            check_in_date: reservation.check_in_date,
            stay_days: reservation.stay_days,
            memo: reservation.memo.clone(),
            status: reservation.status,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LifecycleStep {
    CheckIn,
    CheckOut,
}

impl LifecycleStep {
    fn required(self) -> ReservationStatus {
        match self {
            LifecycleStep::CheckIn => ReservationStatus::NotCheckedIn,
            LifecycleStep::CheckOut => ReservationStatus::CheckedIn,
        }
    }
}

pub struct HotelService<R: HotelRepository> {
    repository: Arc<R>,
    config: HotelConfig,
    reservation_locks: DashMap<String, Arc<Mutex<()>>>,
}

impl<R: HotelRepository> HotelService<R> {
    pub fn new(repository: Arc<R>, config: HotelConfig) -> Self {
        Self {
            repository,
            config,
            reservation_locks: DashMap::new(),
        }
    }

    pub fn repository(&self) -> &Arc<R> {
        &self.repository
    }

    pub fn config(&self) -> &HotelConfig {
        &self.config
    }

    pub async fn list_guests(&self) -> HotelResult<Vec<GuestDetail>> {
        let (guests, plans, reservations) = tokio::try_join!(
            self.repository.find_all_guests(),
            self.repository.find_all_plans(),
            self.repository.find_all_reservations(),
        )?;
        debug!(guests = guests.len(), "listing guests");
        Ok(aggregate_guest_details(guests, &plans, &reservations))
    }

    pub async fn search_guests(&self, filter: &GuestSearch) -> HotelResult<Vec<GuestDetail>> {
        let (guests, plans, reservations) = tokio::try_join!(
            self.repository.search_guests(filter),
            self.repository.find_all_plans(),
            self.repository.find_all_reservations(),
        )?;
        Ok(aggregate_guest_details(guests, &plans, &reservations))
    }

    /// Looks a returning guest up by exact name, phonetic name and phone.
    /// When nobody matches, the query itself comes back as an unregistered
    /// guest with no reservations so the caller can go on to register it.
    pub async fn match_guest(&self, query: &GuestMatch) -> HotelResult<GuestDetail> {
        let matched = self.repository.match_guests(query).await?;
        let Some(guest) = matched.into_iter().next() else {
            debug!(name = %query.name, "no exact match, echoing query");
            return Ok(GuestDetail::guest_only(query.to_guest()));
        };

        let (plans, reservations) = tokio::try_join!(
            self.repository.find_all_plans(),
            self.repository.find_all_reservations(),
        )?;
        Ok(aggregate_guest_details(vec![guest], &plans, &reservations)
            .into_iter()
            .next()
            .unwrap_or_default())
    }

    pub async fn register_guest(&self, registration: GuestRegistration) -> HotelResult<()> {
        self.register_guest_at(registration, Local::now().naive_local())
            .await
    }

    /// Registers the guest unless it already carries an identity, then creates
    /// one provisional reservation per selected plan in a single batch.
    ///
    /// Prices come from storage, never from the request. The guest insert and
    /// the reservation batch are two separate writes: if the batch fails the
    /// guest stays registered and the error is returned as is.
    pub async fn register_guest_at(
        &self,
        registration: GuestRegistration,
        now: NaiveDateTime,
    ) -> HotelResult<()> {
        let GuestRegistration { mut guest, plans } = registration;

        let check_in_date = now
            .date()
            .checked_add_days(Days::new(u64::from(self.config.check_in_lead_days)))
            .ok_or_else(|| HotelError::Validation("check-in date out of range".to_string()))?;

        // Resolve every price before the first write so an unknown plan leaves no trace
        let prices = try_join_all(plans.iter().map(|plan| self.current_price(&plan.id))).await?;

        if guest.has_identity() {
            debug!(guest_id = %guest.id, "guest already registered, adding reservations only");
        } else {
            guest.id = Uuid::new_v4().to_string();
            self.repository.insert_guest(guest.clone()).await?;
            info!(guest_id = %guest.id, "guest registered");
        }

        if plans.is_empty() {
            return Ok(());
        }

        let reservations: Vec<Reservation> = plans
            .iter()
            .zip(prices)
            .map(|(plan, price)| {
                Reservation::provisional(
                    Uuid::new_v4().to_string(),
                    guest.id.clone(),
                    plan.id.clone(),
                    check_in_date,
                    self.config.initial_stay_days,
                    price,
                    now,
                )
            })
            .collect();

        let count = reservations.len();
        self.repository
            .insert_reservations(reservations)
            .await
            .inspect_err(|e| warn!(guest_id = %guest.id, error = %e, "reservation batch failed"))?;
        info!(guest_id = %guest.id, count, "provisional reservations created");
        Ok(())
    }

    async fn current_price(&self, plan_id: &str) -> HotelResult<Decimal> {
        if !self.config.validate_plan_availability {
            return Ok(self.repository.find_plan_price(plan_id).await?);
        }

        let plan = self.repository.find_plan(plan_id).await?;
        if !plan.is_available {
            return Err(HotelError::Validation(format!(
                "plan {} is not available",
                plan_id
            )));
        }
        Ok(plan.price)
    }

    // Plans always get a fresh identity, whatever the request carried.
    pub async fn register_plan(&self, plan: Plan) -> HotelResult<()> {
        if plan.name.trim().is_empty() {
            return Err(HotelError::Validation("plan name is required".to_string()));
        }
        if plan.price.is_sign_negative() {
            return Err(HotelError::Validation(format!(
                "plan price must not be negative: {}",
                plan.price
            )));
        }

        let plan = plan.with_id(Uuid::new_v4().to_string());
        info!(plan_id = %plan.id, name = %plan.name, "registering plan");
        self.repository.insert_plan(plan).await?;
        Ok(())
    }

    pub async fn edit_guest(&self, guest: Guest) -> HotelResult<()> {
        if !guest.has_identity() {
            return Err(HotelError::Validation(
                "guest id is required for an edit".to_string(),
            ));
        }
        self.repository.update_guest(guest).await?;
        Ok(())
    }

    pub async fn edit_reservation(&self, edit: ReservationEdit) -> HotelResult<()> {
        let reservation_id = edit.id.clone();
        self.with_reservation_lock(&reservation_id, || self.apply_edit(edit))
            .await
    }

    async fn apply_edit(&self, edit: ReservationEdit) -> HotelResult<()> {
        let stored = self.repository.find_reservation(&edit.id).await?;
        if !stored.status.can_edit_to(edit.status) {
            warn!(reservation_id = %edit.id, from = %stored.status, to = %edit.status, "edit rejected");
            return Err(HotelError::IllegalEdit {
                reservation_id: edit.id,
                from: stored.status,
                to: edit.status,
            });
        }

        let updated = Reservation {
            check_in_date: edit.check_in_date,
            stay_days: edit.stay_days,
            memo: edit.memo,
            status: edit.status,
            ..stored
        };
        self.repository.update_reservation(updated).await?;
        Ok(())
    }

    /// Edits a guest together with its reservations.
    ///
    /// Every reservation is loaded first and must exist, be owned by the guest
    /// in storage and allow the requested status. Nothing is written unless all
    /// of them pass.
    pub async fn edit_guest_detail(&self, detail: GuestDetail) -> HotelResult<()> {
        let GuestDetail {
            guest,
            reservations,
            ..
        } = detail;

        if !guest.has_identity() {
            return Err(HotelError::Validation(
                "guest id is required for an edit".to_string(),
            ));
        }

        let stored =
            try_join_all(reservations.iter().map(|r| self.repository.find_reservation(&r.id)))
                .await?;
        for (requested, stored) in reservations.iter().zip(&stored) {
            if stored.guest_id != guest.id {
                warn!(
                    reservation_id = %stored.id,
                    owner = %stored.guest_id,
                    guest_id = %guest.id,
                    "foreign reservation in guest edit"
                );
                return Err(HotelError::Validation(format!(
                    "reservation {} does not belong to guest {}",
                    stored.id, guest.id
                )));
            }
            if !stored.status.can_edit_to(requested.status) {
                return Err(HotelError::IllegalEdit {
                    reservation_id: stored.id.clone(),
                    from: stored.status,
                    to: requested.status,
                });
            }
        }

        self.edit_guest(guest).await?;
        for reservation in &reservations {
            self.edit_reservation(ReservationEdit::from(reservation))
                .await?;
        }
        Ok(())
    }

    pub async fn list_plans(&self) -> HotelResult<Vec<Plan>> {
        Ok(self.repository.find_all_plans().await?)
    }

    /// Guests due to arrive on `today`: their NOT_CHECKED_IN reservations
    /// starting that day.
    pub async fn arrivals_on(&self, today: NaiveDate) -> HotelResult<Vec<GuestDetail>> {
        self.guests_with_reservations(|r| {
            r.status == ReservationStatus::NotCheckedIn && r.check_in_date == today
        })
        .await
    }

    /// Guests due to leave on `today`: their CHECKED_IN reservations whose
    /// stay ends that day.
    pub async fn departures_on(&self, today: NaiveDate) -> HotelResult<Vec<GuestDetail>> {
        self.guests_with_reservations(|r| {
            r.status == ReservationStatus::CheckedIn && r.check_out_date() == Some(today)
        })
        .await
    }

    pub async fn staying_guests(&self) -> HotelResult<Vec<GuestDetail>> {
        self.guests_with_reservations(|r| r.status == ReservationStatus::CheckedIn)
            .await
    }

    // Composite views limited to the matching reservations. Guests without
    // any match are left out.
    async fn guests_with_reservations<P>(&self, keep: P) -> HotelResult<Vec<GuestDetail>>
    where
        P: Fn(&Reservation) -> bool,
    {
        let (guests, plans, reservations) = tokio::try_join!(
            self.repository.find_all_guests(),
            self.repository.find_all_plans(),
            self.repository.find_all_reservations(),
        )?;
        let reservations: Vec<Reservation> = reservations.into_iter().filter(|r| keep(r)).collect();

        let details: Vec<GuestDetail> = aggregate_guest_details(guests, &plans, &reservations)
            .into_iter()
            .filter(|detail| !detail.reservations.is_empty())
            .collect();
        debug!(guests = details.len(), "filtered guest views");
        Ok(details)
    }

    pub async fn check_in(&self, reservation_id: &str) -> HotelResult<()> {
        self.with_reservation_lock(reservation_id, || {
            self.advance(reservation_id, LifecycleStep::CheckIn)
        })
        .await
    }

    pub async fn check_out(&self, reservation_id: &str) -> HotelResult<()> {
        self.with_reservation_lock(reservation_id, || {
            self.advance(reservation_id, LifecycleStep::CheckOut)
        })
        .await
    }

    // Reads the current status and writes only when it is the required one.
    async fn advance(&self, reservation_id: &str, step: LifecycleStep) -> HotelResult<()> {
        let actual = self
            .repository
            .find_reservation_status(reservation_id)
            .await?;
        let required = step.required();
        if actual != required {
            warn!(reservation_id, ?step, %actual, "lifecycle transition rejected");
            return Err(HotelError::IllegalState {
                reservation_id: reservation_id.to_string(),
                actual,
                expected: required,
            });
        }

        match step {
            LifecycleStep::CheckIn => self.repository.set_checked_in(reservation_id).await?,
            LifecycleStep::CheckOut => self.repository.set_checked_out(reservation_id).await?,
        }
        info!(reservation_id, ?step, "lifecycle transition completed");
        Ok(())
    }

    // Serializes status-changing operations per reservation. The lock entry is
    // dropped again once no other caller holds it.
    async fn with_reservation_lock<T, F, Fut>(&self, reservation_id: &str, op: F) -> HotelResult<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = HotelResult<T>>,
    {
        let lock = self
            .reservation_locks
            .entry(reservation_id.to_string())
            .or_default()
            .clone();

        let result = {
            let _guard = lock.lock().await;
            op().await
        };

        drop(lock);
        self.reservation_locks
            .remove_if(reservation_id, |_, lock| Arc::strong_count(lock) == 1);
        result
    }
}
