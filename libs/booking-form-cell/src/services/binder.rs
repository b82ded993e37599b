use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime};
use tokio::sync::mpsc;
use tracing::{debug, error};

use crate::error::BookingFormError;
use crate::models::{
    DoctorId, DoctorRecord, Placeholder, SelectControl, SelectOption, SpecialtyId,
};
use crate::services::directory::DoctorDirectoryService;
use crate::services::form::EngineMsg;

/// Drives the doctor-selection control from the specialty selection.
///
/// Every change bumps a sequence number; a lookup completion is applied only
/// if its number is still current, so the control always reflects the most
/// recently issued lookup no matter the order responses arrive in.
pub(crate) struct SpecialtyDoctorBinder {
    directory: Arc<DoctorDirectoryService>,
    control: SelectControl,
    seq: u64,
}

impl SpecialtyDoctorBinder {
    pub(crate) fn new(directory: Arc<DoctorDirectoryService>) -> Self {
        Self {
            directory,
            control: SelectControl::new(Placeholder::ChooseSpecialty),
            seq: 0,
        }
    }

    pub(crate) fn control(&self) -> &SelectControl {
        &self.control
    }

    /// Reacts to a specialty change. Returns whether the control was rebuilt
    /// right away; with a selection present the rebuild happens later, when
    /// the lookup completes.
    pub(crate) fn specialty_changed(
        &mut self,
        specialty: Option<&SpecialtyId>,
        tx: &mpsc::Sender<EngineMsg>,
    ) -> bool {
        self.seq += 1;

        // An empty id is the control's placeholder entry, not a selection.
        let Some(specialty) = specialty.filter(|id| !id.as_str().is_empty()) else {
            debug!("Specialty cleared, resetting doctor control");
            self.control.show_placeholder(Placeholder::ChooseSpecialty);
            return true;
        };

        debug!(
            "Specialty {} selected, starting doctor lookup #{}",
            specialty, self.seq
        );

        let directory = Arc::clone(&self.directory);
        let specialty = specialty.clone();
        let seq = self.seq;
        let tx = tx.clone();
        tokio::spawn(async move {
            let outcome = directory.doctors_for_specialty(&specialty).await;
            // Send fails only when the engine has stopped; the result is moot then.
            let _ = tx.send(EngineMsg::DoctorsFetched { seq, outcome }).await;
        });

        false
    }

    /// Applies a finished doctor lookup. Returns whether the control was
    /// rebuilt; stale completions change nothing.
    pub(crate) fn doctors_loaded(
        &mut self,
        seq: u64,
        outcome: Result<Vec<DoctorRecord>, BookingFormError>,
    ) -> bool {
        if seq != self.seq {
            debug!(
                "Discarding stale doctor lookup #{} (current is #{})",
                seq, self.seq
            );
            return false;
        }

        match outcome {
            Ok(doctors) if doctors.is_empty() => {
                debug!("Doctor lookup #{} matched no doctors", seq);
                self.control.show_placeholder(Placeholder::NoDoctors);
            }
            Ok(doctors) => {
                debug!("Doctor lookup #{} matched {} doctors", seq, doctors.len());
                let options = doctors
                    .into_iter()
                    .map(|doctor| SelectOption::item(doctor.id.as_str(), doctor.name))
                    .collect();
                self.control.show_items(options);
            }
            Err(err) => {
                error!("Doctor lookup #{} failed: {}", seq, err);
                self.control
                    .show_placeholder(Placeholder::DoctorsUnavailable);
            }
        }

        true
    }
}

/// Drives the time-selection control from the doctor and date selections.
///
/// A lookup needs both; with either missing the control falls back to its
/// placeholder. Sequencing works like [`SpecialtyDoctorBinder`].
pub(crate) struct TimeSlotBinder {
    directory: Arc<DoctorDirectoryService>,
    control: SelectControl,
    seq: u64,
    doctor: Option<DoctorId>,
    date: Option<NaiveDate>,
}

impl TimeSlotBinder {
    pub(crate) fn new(directory: Arc<DoctorDirectoryService>) -> Self {
        Self {
            directory,
            control: SelectControl::new(Placeholder::ChooseDoctorAndDate),
            seq: 0,
            doctor: None,
            date: None,
        }
    }

    pub(crate) fn control(&self) -> &SelectControl {
        &self.control
    }

    pub(crate) fn doctor_selected(
        &mut self,
        doctor: Option<DoctorId>,
        tx: &mpsc::Sender<EngineMsg>,
    ) {
        self.doctor = doctor;
        self.refresh(tx);
    }

    pub(crate) fn date_selected(&mut self, date: Option<NaiveDate>, tx: &mpsc::Sender<EngineMsg>) {
        self.date = date;
        self.refresh(tx);
    }

    /// Cascade reset for when the doctor option set was rebuilt: the previous
    /// doctor choice no longer refers to an offered option.
    pub(crate) fn doctor_list_rebuilt(&mut self, tx: &mpsc::Sender<EngineMsg>) {
        if self.doctor.take().is_some() {
            debug!("Doctor list rebuilt, clearing the doctor choice");
        }
        self.refresh(tx);
    }

    fn refresh(&mut self, tx: &mpsc::Sender<EngineMsg>) {
        self.seq += 1;

        let (Some(doctor), Some(date)) = (self.doctor.clone(), self.date) else {
            self.control
                .show_placeholder(Placeholder::ChooseDoctorAndDate);
            return;
        };

        debug!(
            "Starting time lookup #{} for doctor {} on {}",
            self.seq, doctor, date
        );

        let directory = Arc::clone(&self.directory);
        let seq = self.seq;
        let tx = tx.clone();
        tokio::spawn(async move {
            let outcome = directory.available_times(&doctor, date).await;
            let _ = tx.send(EngineMsg::TimesFetched { seq, outcome }).await;
        });
    }

    pub(crate) fn times_loaded(
        &mut self,
        seq: u64,
        outcome: Result<Vec<NaiveTime>, BookingFormError>,
    ) {
        if seq != self.seq {
            debug!(
                "Discarding stale time lookup #{} (current is #{})",
                seq, self.seq
            );
            return;
        }

        match outcome {
            Ok(times) if times.is_empty() => {
                debug!("Time lookup #{} found no free slots", seq);
                self.control.show_placeholder(Placeholder::NoTimes);
            }
            Ok(times) => {
                debug!("Time lookup #{} found {} free slots", seq, times.len());
                let options = times
                    .into_iter()
                    .map(|time| {
                        let slot = time.format("%H:%M").to_string();
                        SelectOption::item(slot.clone(), slot)
                    })
                    .collect();
                self.control.show_items(options);
            }
            Err(err) => {
                error!("Time lookup #{} failed: {}", seq, err);
                self.control
                    .show_placeholder(Placeholder::TimesUnavailable);
            }
        }
    }
}
