// Presentation-facing operations: every call returns either data, an
// acknowledgement message, or an ApiError carrying the status code to answer with.

use crate::error::HotelError;
use crate::model::{Guest, GuestDetail, Plan};
use crate::repository::{GuestMatch, GuestSearch, HotelRepository, RepositoryError};
use crate::service::{GuestRegistration, HotelService, ReservationEdit};
use chrono::Local;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::error;

#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error("API error: {status_code} - {message}")]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    pub status_code: u16,
    pub message: String,
}

impl ApiError {
    pub fn new(status_code: u16, message: impl Into<String>) -> Self {
        Self {
            status_code,
            message: message.into(),
        }
    }
}

impl From<HotelError> for ApiError {
    fn from(err: HotelError) -> Self {
        let status_code = match &err {
            HotelError::IllegalState { .. } | HotelError::IllegalEdit { .. } => 409,
            HotelError::Validation(_) => 400,
            HotelError::Repository(RepositoryError::NotFound { .. }) => 404,
            HotelError::Repository(RepositoryError::ForeignKey { .. })
            | HotelError::Repository(RepositoryError::Duplicate { .. }) => 422,
            HotelError::Repository(RepositoryError::Unavailable(_)) => {
                error!(error = %err, "storage failure");
                500
            }
        };
        ApiError::new(status_code, err.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Acknowledgement {
    pub message: String,
}

impl Acknowledgement {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

pub struct HotelApi<R: HotelRepository> {
    service: HotelService<R>,
}

impl<R: HotelRepository> HotelApi<R> {
    pub fn new(service: HotelService<R>) -> Self {
        Self { service }
    }

    pub fn service(&self) -> &HotelService<R> {
        &self.service
    }

    pub async fn guest_list(&self) -> ApiResult<Vec<GuestDetail>> {
        Ok(self.service.list_guests().await?)
    }

    pub async fn search_guests(&self, filter: GuestSearch) -> ApiResult<Vec<GuestDetail>> {
        Ok(self.service.search_guests(&filter).await?)
    }

    pub async fn match_guest(&self, query: GuestMatch) -> ApiResult<GuestDetail> {
        Ok(self.service.match_guest(&query).await?)
    }

    pub async fn plan_list(&self) -> ApiResult<Vec<Plan>> {
        Ok(self.service.list_plans().await?)
    }

    // Front desk queues, evaluated against the local calendar day
    pub async fn check_in_today(&self) -> ApiResult<Vec<GuestDetail>> {
        Ok(self.service.arrivals_on(Local::now().date_naive()).await?)
    }

    pub async fn check_out_today(&self) -> ApiResult<Vec<GuestDetail>> {
        Ok(self.service.departures_on(Local::now().date_naive()).await?)
    }

    pub async fn staying_guests(&self) -> ApiResult<Vec<GuestDetail>> {
        Ok(self.service.staying_guests().await?)
    }

    pub async fn register_guest(&self, registration: GuestRegistration) -> ApiResult<Acknowledgement> {
        self.service.register_guest(registration).await?;
        Ok(Acknowledgement::new("Guest registration completed."))
    }

    pub async fn register_plan(&self, plan: Plan) -> ApiResult<Acknowledgement> {
        self.service.register_plan(plan).await?;
        Ok(Acknowledgement::new("Plan registration completed."))
    }

    pub async fn edit_guest(&self, guest: Guest) -> ApiResult<Acknowledgement> {
        self.service.edit_guest(guest).await?;
        Ok(Acknowledgement::new("Guest update completed."))
    }

    pub async fn edit_guest_detail(&self, detail: GuestDetail) -> ApiResult<Acknowledgement> {
        self.service.edit_guest_detail(detail).await?;
        Ok(Acknowledgement::new("Guest and reservation update completed."))
    }

    pub async fn edit_reservation(&self, edit: ReservationEdit) -> ApiResult<Acknowledgement> {
        self.service.edit_reservation(edit).await?;
        Ok(Acknowledgement::new("Reservation update completed."))
    }

    // The display name only feeds the acknowledgement text.
    pub async fn check_in(
        &self,
        reservation_id: &str,
        guest_name: Option<&str>,
    ) -> ApiResult<Acknowledgement> {
        self.service.check_in(reservation_id).await?;
        Ok(Acknowledgement::new(match guest_name {
            Some(name) => format!("Check-in completed for {}.", name),
            None => "Check-in completed.".to_string(),
        }))
    }

    pub async fn check_out(
        &self,
        reservation_id: &str,
        guest_name: Option<&str>,
    ) -> ApiResult<Acknowledgement> {
        self.service.check_out(reservation_id).await?;
        Ok(Acknowledgement::new(match guest_name {
            Some(name) => format!("Check-out completed for {}.", name),
            None => "Check-out completed.".to_string(),
        }))
    }
}
