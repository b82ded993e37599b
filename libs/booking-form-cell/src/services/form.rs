use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use shared_config::AppConfig;

use crate::error::BookingFormError;
use crate::models::{DoctorId, DoctorRecord, FormEvent, FormSnapshot, SpecialtyId};
use crate::services::binder::{SpecialtyDoctorBinder, TimeSlotBinder};
use crate::services::directory::DoctorDirectoryService;

/// Messages processed by the engine task. User events and lookup completions
/// arrive on the same queue, so the selection controls have exactly one
/// writer and never need locking.
pub(crate) enum EngineMsg {
    Event(FormEvent),
    DoctorsFetched {
        seq: u64,
        outcome: Result<Vec<DoctorRecord>, BookingFormError>,
    },
    TimesFetched {
        seq: u64,
        outcome: Result<Vec<NaiveTime>, BookingFormError>,
    },
    Shutdown,
}

/// Handle to a running booking form engine.
///
/// [`BookingFormService::start`] spawns the engine task, which owns the
/// doctor and time selection controls. Selections go in as events; the
/// resulting control states come out as [`FormSnapshot`]s.
pub struct BookingFormService {
    tx: mpsc::Sender<EngineMsg>,
    snapshot_rx: watch::Receiver<FormSnapshot>,
    task: JoinHandle<()>,
}

impl BookingFormService {
    /// Starts the engine task. Must be called from within a tokio runtime.
    pub fn start(config: &AppConfig) -> Self {
        let directory = Arc::new(DoctorDirectoryService::new(config));
        let (tx, rx) = mpsc::channel(32);
        let engine = FormEngine::new(directory, tx.clone());
        let (snapshot_tx, snapshot_rx) = watch::channel(engine.snapshot());
        let task = tokio::spawn(engine.run(rx, snapshot_tx));

        Self {
            tx,
            snapshot_rx,
            task,
        }
    }

    /// Reports a specialty selection; `None` clears it.
    pub async fn select_specialty(
        &self,
        specialty: Option<SpecialtyId>,
    ) -> Result<(), BookingFormError> {
        self.send(FormEvent::SpecialtySelected(specialty)).await
    }

    /// Reports a doctor selection; `None` clears it. Selections that are not
    /// currently offered by the doctor control are ignored by the engine.
    pub async fn select_doctor(&self, doctor: Option<DoctorId>) -> Result<(), BookingFormError> {
        self.send(FormEvent::DoctorSelected(doctor)).await
    }

    /// Reports an appointment-date selection; `None` clears it.
    pub async fn select_date(&self, date: Option<NaiveDate>) -> Result<(), BookingFormError> {
        self.send(FormEvent::DateSelected(date)).await
    }

    /// Watches the control states. The snapshot revision increments once per
    /// processed engine message, including messages that change nothing, so
    /// tests and observers can wait for the engine to settle.
    pub fn snapshots(&self) -> watch::Receiver<FormSnapshot> {
        self.snapshot_rx.clone()
    }

    /// Stops the engine task. Lookups still in flight resolve into a closed
    /// channel and are dropped.
    pub async fn shutdown(self) {
        let _ = self.tx.send(EngineMsg::Shutdown).await;
        let _ = self.task.await;
    }

    async fn send(&self, event: FormEvent) -> Result<(), BookingFormError> {
        self.tx
            .send(EngineMsg::Event(event))
            .await
            .map_err(|_| BookingFormError::EngineStopped)
    }
}

/// The engine state: both binders plus the snapshot revision counter. Only
/// the engine task touches it.
struct FormEngine {
    tx: mpsc::Sender<EngineMsg>,
    doctors: SpecialtyDoctorBinder,
    times: TimeSlotBinder,
    revision: u64,
}

impl FormEngine {
    fn new(directory: Arc<DoctorDirectoryService>, tx: mpsc::Sender<EngineMsg>) -> Self {
        Self {
            tx,
            doctors: SpecialtyDoctorBinder::new(Arc::clone(&directory)),
            times: TimeSlotBinder::new(directory),
            revision: 0,
        }
    }

    fn snapshot(&self) -> FormSnapshot {
        FormSnapshot {
            doctors: self.doctors.control().state().clone(),
            times: self.times.control().state().clone(),
            revision: self.revision,
        }
    }

    async fn run(
        mut self,
        mut rx: mpsc::Receiver<EngineMsg>,
        snapshot_tx: watch::Sender<FormSnapshot>,
    ) {
        debug!("Booking form engine started");

        while let Some(msg) = rx.recv().await {
            if matches!(msg, EngineMsg::Shutdown) {
                break;
            }

            self.apply(msg);
            self.revision += 1;
            let _ = snapshot_tx.send(self.snapshot());
        }

        debug!("Booking form engine stopped");
    }

    fn apply(&mut self, msg: EngineMsg) {
        match msg {
            EngineMsg::Event(FormEvent::SpecialtySelected(specialty)) => {
                if self.doctors.specialty_changed(specialty.as_ref(), &self.tx) {
                    self.times.doctor_list_rebuilt(&self.tx);
                }
            }
            EngineMsg::Event(FormEvent::DoctorSelected(doctor)) => {
                if let Some(doctor) = &doctor {
                    if !self.doctors.control().is_selectable(doctor.as_str()) {
                        warn!("Ignoring doctor selection {} that is not offered", doctor);
                        return;
                    }
                }
                self.times.doctor_selected(doctor, &self.tx);
            }
            EngineMsg::Event(FormEvent::DateSelected(date)) => {
                self.times.date_selected(date, &self.tx);
            }
            EngineMsg::DoctorsFetched { seq, outcome } => {
                // A rebuilt doctor list invalidates the doctor choice below it.
                if self.doctors.doctors_loaded(seq, outcome) {
                    self.times.doctor_list_rebuilt(&self.tx);
                }
            }
            EngineMsg::TimesFetched { seq, outcome } => {
                self.times.times_loaded(seq, outcome);
            }
            // Handled in run() before dispatch.
            EngineMsg::Shutdown => {}
        }
    }
}
