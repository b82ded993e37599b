use chrono::{NaiveDate, NaiveTime};
use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use tracing::{debug, error};

use shared_config::AppConfig;

use crate::error::BookingFormError;
use crate::models::{DoctorId, DoctorRecord, SpecialtyId};

/// HTTP client for the external doctor-directory service.
pub struct DoctorDirectoryService {
    client: Client,
    base_url: String,
}

impl DoctorDirectoryService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.doctor_directory_url.clone(),
        }
    }

    /// Doctors offering the given specialty, in the order the directory
    /// returns them. An empty list is a valid response.
    pub async fn doctors_for_specialty(
        &self,
        specialty: &SpecialtyId,
    ) -> Result<Vec<DoctorRecord>, BookingFormError> {
        let url = format!("{}/get-doctors/", self.base_url);
        debug!("Fetching doctors for specialty {} from {}", specialty, url);

        let request = self
            .client
            .get(&url)
            .query(&[("specialty_id", specialty.as_str())]);
        let body = self.fetch(request).await?;

        let doctors: Vec<DoctorRecord> = serde_json::from_str(&body)?;
        debug!(
            "Directory returned {} doctors for specialty {}",
            doctors.len(),
            specialty
        );

        Ok(doctors)
    }

    /// Free appointment times of a doctor on a date, in the order the
    /// directory returns them.
    pub async fn available_times(
        &self,
        doctor: &DoctorId,
        date: NaiveDate,
    ) -> Result<Vec<NaiveTime>, BookingFormError> {
        let url = format!(
            "{}/get-available-times/{}/{}/",
            self.base_url,
            doctor,
            date.format("%Y-%m-%d")
        );
        debug!("Fetching available times from {}", url);

        let body = self.fetch(self.client.get(&url)).await?;

        #[derive(Deserialize)]
        struct TimesResponse {
            times: Vec<String>,
        }

        let response: TimesResponse = serde_json::from_str(&body)?;
        response
            .times
            .into_iter()
            .map(|value| {
                NaiveTime::parse_from_str(&value, "%H:%M")
                    .map_err(|_| BookingFormError::InvalidTime { value })
            })
            .collect()
    }

    async fn fetch(&self, request: RequestBuilder) -> Result<String, BookingFormError> {
        let response = request.send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await?;
            error!("Directory error ({}): {}", status, body);
            return Err(BookingFormError::UnexpectedStatus { status, body });
        }

        Ok(response.text().await?)
    }
}
