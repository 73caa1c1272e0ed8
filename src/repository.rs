// Storage port consumed by the hotel core.
// Adapters implement HotelRepository; the workflows depend on nothing else.

use crate::model::{Guest, Plan, Reservation, ReservationStatus};
use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("{entity} already exists: {id}")]
    Duplicate { entity: &'static str, id: String },

    #[error("reservation {reservation_id} references unknown {entity} {id}")]
    ForeignKey {
        reservation_id: String,
        entity: &'static str,
        id: String,
    },

    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

// Partial search criteria. Blank fields do not narrow the result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GuestSearch {
    pub id: Option<String>,
    pub name: Option<String>,
    pub kana_name: Option<String>,
    pub phone: Option<String>,
    pub status: Option<ReservationStatus>,
}

impl GuestSearch {
    pub fn by_name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    pub fn with_status(mut self, status: ReservationStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Matches the guest's own fields. The status criterion needs reservation
    /// data and is evaluated by the adapter.
    pub fn matches_guest(&self, guest: &Guest) -> bool {
        fn present(value: &Option<String>) -> Option<&str> {
            value.as_deref().map(str::trim).filter(|v| !v.is_empty())
        }

        present(&self.id).map_or(true, |id| guest.id == id)
            && present(&self.name).map_or(true, |name| guest.name.contains(name))
            && present(&self.kana_name).map_or(true, |kana| guest.kana_name.contains(kana))
            && present(&self.phone).map_or(true, |phone| guest.phone.contains(phone))
    }
}

// Exact-match lookup used by the front desk to find a returning guest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GuestMatch {
    pub name: String,
    pub kana_name: String,
    pub phone: String,
}

impl GuestMatch {
    pub fn new(
        name: impl Into<String>,
        kana_name: impl Into<String>,
        phone: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            kana_name: kana_name.into(),
            phone: phone.into(),
        }
    }

    pub fn matches(&self, guest: &Guest) -> bool {
        guest.name == self.name && guest.kana_name == self.kana_name && guest.phone == self.phone
    }

    // The query itself, shaped as an unregistered guest.
    pub fn to_guest(&self) -> Guest {
        Guest::new(
            self.name.clone(),
            self.kana_name.clone(),
            self.phone.clone(),
        )
    }
}

#[async_trait]
pub trait HotelRepository: Send + Sync + 'static {
    // Read-all queries. Soft-deleted guests are not returned.
    async fn find_all_guests(&self) -> RepositoryResult<Vec<Guest>>;
    async fn find_all_plans(&self) -> RepositoryResult<Vec<Plan>>;
    async fn find_all_reservations(&self) -> RepositoryResult<Vec<Reservation>>;

    async fn search_guests(&self, filter: &GuestSearch) -> RepositoryResult<Vec<Guest>>;
    async fn match_guests(&self, query: &GuestMatch) -> RepositoryResult<Vec<Guest>>;

    // Point lookups
    async fn find_plan(&self, plan_id: &str) -> RepositoryResult<Plan>;
    async fn find_plan_price(&self, plan_id: &str) -> RepositoryResult<Decimal>;
    async fn find_reservation(&self, reservation_id: &str) -> RepositoryResult<Reservation>;
    async fn find_reservation_status(
        &self,
        reservation_id: &str,
    ) -> RepositoryResult<ReservationStatus>;

    // Writes
    async fn insert_guest(&self, guest: Guest) -> RepositoryResult<()>;
    async fn insert_plan(&self, plan: Plan) -> RepositoryResult<()>;
    async fn insert_reservations(&self, reservations: Vec<Reservation>) -> RepositoryResult<()>;
    async fn update_guest(&self, guest: Guest) -> RepositoryResult<()>;
    async fn update_reservation(&self, reservation: Reservation) -> RepositoryResult<()>;
    async fn set_checked_in(&self, reservation_id: &str) -> RepositoryResult<()>;
    async fn set_checked_out(&self, reservation_id: &str) -> RepositoryResult<()>;
}
