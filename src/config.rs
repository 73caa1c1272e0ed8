// Workflow configuration

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HotelConfig {
    // Days between registration and the default check-in date
    pub check_in_lead_days: u32,
    // Stay length placeholder until the front desk edits the reservation
    pub initial_stay_days: u32,
    // Reject registrations against plans flagged unavailable
    pub validate_plan_availability: bool,
}

impl Default for HotelConfig {
    fn default() -> Self {
        Self {
            check_in_lead_days: 1,
            initial_stay_days: 0,
            validate_plan_availability: false,
        }
    }
}

impl HotelConfig {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
