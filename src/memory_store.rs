// In-memory storage adapter for the hotel core.
// Tables keep insertion order, which is the order the read-all queries return.

use crate::model::{Guest, Plan, Reservation, ReservationStatus};
use crate::repository::{
    GuestMatch, GuestSearch, HotelRepository, RepositoryError, RepositoryResult,
};
use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{debug, info};

// Write counters, updated on every successful write
#[derive(Debug, Default)]
pub struct StoreStats {
    pub guest_inserts: AtomicUsize,
    pub plan_inserts: AtomicUsize,
    pub reservation_batches: AtomicUsize,
    pub reservations_inserted: AtomicUsize,
    pub guest_updates: AtomicUsize,
    pub reservation_updates: AtomicUsize,
    pub status_writes: AtomicUsize,
    pub rejected_writes: AtomicUsize,
}

// Point-in-time copy of StoreStats
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct StoreStatsReport {
    pub guest_inserts: usize,
    pub plan_inserts: usize,
    pub reservation_batches: usize,
    pub reservations_inserted: usize,
    pub guest_updates: usize,
    pub reservation_updates: usize,
    pub status_writes: usize,
    pub rejected_writes: usize,
}

// Write kinds that can be made to fail on purpose
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WriteOp {
    GuestInsert,
    PlanInsert,
    ReservationInsert,
    GuestUpdate,
    ReservationUpdate,
    StatusWrite,
}

#[derive(Debug, Default)]
struct Tables {
    guests: Vec<Guest>,
    plans: Vec<Plan>,
    reservations: Vec<Reservation>,
}

impl Tables {
    fn guest_exists(&self, id: &str) -> bool {
        self.guests.iter().any(|g| g.id == id)
    }

    fn plan(&self, id: &str) -> Option<&Plan> {
        self.plans.iter().find(|p| p.id == id)
    }

    fn reservation_mut(&mut self, id: &str) -> RepositoryResult<&mut Reservation> {
        self.reservations
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| not_found("reservation", id))
    }

    fn check_references(&self, reservation: &Reservation) -> RepositoryResult<()> {
        if !self.guest_exists(&reservation.guest_id) {
            return Err(RepositoryError::ForeignKey {
                reservation_id: reservation.id.clone(),
                entity: "guest",
                id: reservation.guest_id.clone(),
            });
        }
        if self.plan(&reservation.plan_id).is_none() {
            return Err(RepositoryError::ForeignKey {
                reservation_id: reservation.id.clone(),
                entity: "plan",
                id: reservation.plan_id.clone(),
            });
        }
        Ok(())
    }
}

fn not_found(entity: &'static str, id: &str) -> RepositoryError {
    RepositoryError::NotFound {
        entity,
        id: id.to_string(),
    }
}

pub struct InMemoryHotelRepository {
    tables: RwLock<Tables>,
    stats: StoreStats,
    injected_failures: Mutex<HashMap<WriteOp, usize>>,
}

impl Default for InMemoryHotelRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryHotelRepository {
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(Tables::default()),
            stats: StoreStats::default(),
            injected_failures: Mutex::new(HashMap::new()),
        }
    }

    // Fixture loading. Seeded rows bypass validation and are not counted as writes.
    pub fn with_seed(guests: Vec<Guest>, plans: Vec<Plan>, reservations: Vec<Reservation>) -> Self {
        let store = Self::new();
        {
            let mut tables = store.tables.write();
            tables.guests = guests;
            tables.plans = plans;
            tables.reservations = reservations;
        }
        store
    }

    /// Makes the next `count` writes of kind `op` fail with `Unavailable`.
    pub fn fail_next(&self, op: WriteOp, count: usize) {
        self.injected_failures.lock().insert(op, count);
    }

    pub fn stats(&self) -> StoreStatsReport {
        StoreStatsReport {
            guest_inserts: self.stats.guest_inserts.load(Ordering::SeqCst),
            plan_inserts: self.stats.plan_inserts.load(Ordering::SeqCst),
            reservation_batches: self.stats.reservation_batches.load(Ordering::SeqCst),
            reservations_inserted: self.stats.reservations_inserted.load(Ordering::SeqCst),
            guest_updates: self.stats.guest_updates.load(Ordering::SeqCst),
            reservation_updates: self.stats.reservation_updates.load(Ordering::SeqCst),
            status_writes: self.stats.status_writes.load(Ordering::SeqCst),
            rejected_writes: self.stats.rejected_writes.load(Ordering::SeqCst),
        }
    }

    // Raw snapshots, including soft-deleted guests
    pub fn guests_snapshot(&self) -> Vec<Guest> {
        self.tables.read().guests.clone()
    }

    pub fn reservations_snapshot(&self) -> Vec<Reservation> {
        self.tables.read().reservations.clone()
    }

    fn injected_failure(&self, op: WriteOp) -> RepositoryResult<()> {
        let mut failures = self.injected_failures.lock();
        match failures.get_mut(&op) {
            Some(remaining) if *remaining > 0 => {
                *remaining -= 1;
                self.stats.rejected_writes.fetch_add(1, Ordering::SeqCst);
                Err(RepositoryError::Unavailable(format!(
                    "injected failure on {:?}",
                    op
                )))
            }
            _ => Ok(()),
        }
    }

    fn rejected(&self, err: RepositoryError) -> RepositoryError {
        self.stats.rejected_writes.fetch_add(1, Ordering::SeqCst);
        err
    }

    fn write_status(&self, reservation_id: &str, status: ReservationStatus) -> RepositoryResult<()> {
        self.injected_failure(WriteOp::StatusWrite)?;

        let mut tables = self.tables.write();
        let reservation = tables
            .reservation_mut(reservation_id)
            .map_err(|e| self.rejected(e))?;
        reservation.status = status;
        self.stats.status_writes.fetch_add(1, Ordering::SeqCst);
        info!(reservation_id, %status, "reservation status written");
        Ok(())
    }
}

#[async_trait]
impl HotelRepository for InMemoryHotelRepository {
    async fn find_all_guests(&self) -> RepositoryResult<Vec<Guest>> {
        let tables = self.tables.read();
        Ok(tables.guests.iter().filter(|g| !g.deleted).cloned().collect())
    }

    async fn find_all_plans(&self) -> RepositoryResult<Vec<Plan>> {
        Ok(self.tables.read().plans.clone())
    }

    async fn find_all_reservations(&self) -> RepositoryResult<Vec<Reservation>> {
        Ok(self.tables.read().reservations.clone())
    }

    async fn search_guests(&self, filter: &GuestSearch) -> RepositoryResult<Vec<Guest>> {
        let tables = self.tables.read();
        let found: Vec<Guest> = tables
            .guests
            .iter()
            .filter(|g| !g.deleted && filter.matches_guest(g))
            .filter(|g| {
                filter.status.map_or(true, |status| {
                    tables
                        .reservations
                        .iter()
                        .any(|r| r.guest_id == g.id && r.status == status)
                })
            })
            .cloned()
            .collect();
        debug!(?filter, found = found.len(), "guest search");
        Ok(found)
    }

    async fn match_guests(&self, query: &GuestMatch) -> RepositoryResult<Vec<Guest>> {
        let tables = self.tables.read();
        Ok(tables
            .guests
            .iter()
            .filter(|g| !g.deleted && query.matches(g))
            .cloned()
            .collect())
    }

    async fn find_plan(&self, plan_id: &str) -> RepositoryResult<Plan> {
        self.tables
            .read()
            .plan(plan_id)
            .cloned()
            .ok_or_else(|| not_found("plan", plan_id))
    }

    async fn find_plan_price(&self, plan_id: &str) -> RepositoryResult<Decimal> {
        self.tables
            .read()
            .plan(plan_id)
            .map(|p| p.price)
            .ok_or_else(|| not_found("plan", plan_id))
    }

    async fn find_reservation(&self, reservation_id: &str) -> RepositoryResult<Reservation> {
        self.tables
            .read()
            .reservations
            .iter()
            .find(|r| r.id == reservation_id)
            .cloned()
            .ok_or_else(|| not_found("reservation", reservation_id))
    }

    async fn find_reservation_status(
        &self,
        reservation_id: &str,
    ) -> RepositoryResult<ReservationStatus> {
        self.find_reservation(reservation_id).await.map(|r| r.status)
    }

    async fn insert_guest(&self, guest: Guest) -> RepositoryResult<()> {
        self.injected_failure(WriteOp::GuestInsert)?;

        let mut tables = self.tables.write();
        if tables.guest_exists(&guest.id) {
            return Err(self.rejected(RepositoryError::Duplicate {
                entity: "guest",
                id: guest.id,
            }));
        }
        info!(guest_id = %guest.id, "guest inserted");
        tables.guests.push(guest);
        self.stats.guest_inserts.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn insert_plan(&self, plan: Plan) -> RepositoryResult<()> {
        self.injected_failure(WriteOp::PlanInsert)?;

        let mut tables = self.tables.write();
        if tables.plan(&plan.id).is_some() {
            return Err(self.rejected(RepositoryError::Duplicate {
                entity: "plan",
                id: plan.id,
            }));
        }
        info!(plan_id = %plan.id, price = %plan.price, "plan inserted");
        tables.plans.push(plan);
        self.stats.plan_inserts.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn insert_reservations(&self, reservations: Vec<Reservation>) -> RepositoryResult<()> {
        self.injected_failure(WriteOp::ReservationInsert)?;

        let mut tables = self.tables.write();
        // Validate the whole batch before touching the table
        for (i, reservation) in reservations.iter().enumerate() {
            let duplicate = tables.reservations.iter().any(|r| r.id == reservation.id)
                || reservations[..i].iter().any(|r| r.id == reservation.id);
            if duplicate {
                return Err(self.rejected(RepositoryError::Duplicate {
                    entity: "reservation",
                    id: reservation.id.clone(),
                }));
            }
            tables
                .check_references(reservation)
                .map_err(|e| self.rejected(e))?;
        }

        let count = reservations.len();
        tables.reservations.extend(reservations);
        self.stats.reservation_batches.fetch_add(1, Ordering::SeqCst);
        self.stats
            .reservations_inserted
            .fetch_add(count, Ordering::SeqCst);
        info!(count, "reservations inserted");
        Ok(())
    }

    async fn update_guest(&self, guest: Guest) -> RepositoryResult<()> {
        self.injected_failure(WriteOp::GuestUpdate)?;

        let mut tables = self.tables.write();
        let Some(stored) = tables.guests.iter_mut().find(|g| g.id == guest.id) else {
            return Err(self.rejected(not_found("guest", &guest.id)));
        };
        *stored = guest;
        self.stats.guest_updates.fetch_add(1, Ordering::SeqCst);
        info!(guest_id = %stored.id, deleted = stored.deleted, "guest updated");
        Ok(())
    }

    async fn update_reservation(&self, reservation: Reservation) -> RepositoryResult<()> {
        self.injected_failure(WriteOp::ReservationUpdate)?;

        let mut tables = self.tables.write();
        tables
            .check_references(&reservation)
            .map_err(|e| self.rejected(e))?;
        let stored = tables
            .reservation_mut(&reservation.id)
            .map_err(|e| self.rejected(e))?;
        *stored = reservation;
        self.stats
            .reservation_updates
            .fetch_add(1, Ordering::SeqCst);
        info!(reservation_id = %stored.id, status = %stored.status, "reservation updated");
        Ok(())
    }

    async fn set_checked_in(&self, reservation_id: &str) -> RepositoryResult<()> {
        self.write_status(reservation_id, ReservationStatus::CheckedIn)
    }

    async fn set_checked_out(&self, reservation_id: &str) -> RepositoryResult<()> {
        self.write_status(reservation_id, ReservationStatus::CheckedOut)
    }
}
