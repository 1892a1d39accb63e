use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use scheduling_cell::{Slot, SlotEngine, SlotKey, TakenSlotReconciler, TakenSlotSet};
use shared_api_client::ClinicApi;
use shared_models::{filter_by_specialty, ApiError, Appointment, BookingChannel, Doctor, Session};
use shared_utils::Clock;

use crate::error::BookingError;
use crate::models::{BookingSelection, BookingState, FetchTicket, GridState};
use crate::services::submitter::BookingSubmitter;

/// State behind one booking form: the chosen doctor and date, the slot
/// grid built for them, and the submit flow.
///
/// Any doctor or date change rebuilds the grid from scratch and bumps
/// `generation`. Taken-slot reads carry a [`FetchTicket`] so a response
/// for a superseded selection is dropped instead of marking the new grid.
pub struct BookingView {
    engine: SlotEngine,
    api: Arc<dyn ClinicApi>,
    clock: Arc<dyn Clock>,
    submitter: BookingSubmitter,
    selection: BookingSelection,
    doctors: Vec<Doctor>,
    doctor_load_error: Option<ApiError>,
    doctor: Option<Doctor>,
    slots: Vec<Slot>,
    taken: TakenSlotSet,
    generation: u64,
    message: Option<String>,
}

impl BookingView {
    pub fn new(
        engine: SlotEngine,
        api: Arc<dyn ClinicApi>,
        clock: Arc<dyn Clock>,
        channel: BookingChannel,
        session: Option<&Session>,
    ) -> Self {
        let today = clock.today();
        let patient_id = session.and_then(Session::patient_id);

        Self {
            engine,
            submitter: BookingSubmitter::new(Arc::clone(&api), channel),
            api,
            clock,
            selection: BookingSelection::for_patient(patient_id, today),
            doctors: Vec::new(),
            doctor_load_error: None,
            doctor: None,
            slots: Vec::new(),
            taken: TakenSlotSet::empty(today),
            generation: 0,
            message: None,
        }
    }

    /// Loads the doctor list. A failed read leaves the list empty and is
    /// kept in [`doctor_load_error`](Self::doctor_load_error).
    pub async fn load_doctors(&mut self) -> &[Doctor] {
        match self.api.fetch_doctors().await {
            Ok(doctors) => {
                debug!("Loaded {} doctors", doctors.len());
                self.doctors = doctors;
                self.doctor_load_error = None;
            }
            Err(e) => {
                warn!("Failed to load doctors: {}", e);
                self.doctors.clear();
                self.doctor_load_error = Some(e);
            }
        }
        &self.doctors
    }

    pub fn doctor_load_error(&self) -> Option<&ApiError> {
        self.doctor_load_error.as_ref()
    }

    pub fn set_doctors(&mut self, doctors: Vec<Doctor>) {
        self.doctors = doctors;
    }

    pub fn doctors(&self) -> &[Doctor] {
        &self.doctors
    }

    pub fn filter_doctors_by_specialty(&self, specialty: &str) -> Vec<Doctor> {
        filter_by_specialty(&self.doctors, specialty)
    }

    pub fn select_doctor(&mut self, doctor: Doctor) {
        self.selection.doctor_id = Some(doctor.id);
        self.selection.doctor_name = Some(doctor.display_name().to_string());
        self.doctor = Some(doctor);
        self.rebuild();
    }

    /// Picks a doctor from the loaded list; false when the id is unknown.
    pub fn select_doctor_by_id(&mut self, doctor_id: i64) -> bool {
        match self.doctors.iter().find(|doctor| doctor.id == doctor_id).cloned() {
            Some(doctor) => {
                self.select_doctor(doctor);
                true
            }
            None => false,
        }
    }

    pub fn change_date(&mut self, date: NaiveDate) {
        self.selection.date = date;
        self.rebuild();
    }

    pub fn set_patient_id(&mut self, patient_id: Option<i64>) {
        self.selection.patient_id = patient_id;
    }

    /// Selects a slot of the current grid; disabled or unknown slots are refused.
    pub fn select_slot(&mut self, key: &SlotKey) -> bool {
        let selectable = self
            .slots
            .iter()
            .any(|slot| &slot.key == key && slot.is_selectable());

        if selectable {
            self.selection.slot_key = Some(key.clone());
        }
        selectable
    }

    pub fn clear_slot(&mut self) {
        self.selection.slot_key = None;
    }

    fn rebuild(&mut self) {
        self.generation += 1;
        let date = self.selection.date;
        let now = self.clock.now();

        self.slots = match &self.doctor {
            Some(doctor) => self.engine.build_slots(doctor.availability(), date, now),
            None => Vec::new(),
        };
        self.taken = TakenSlotSet::empty(date);
        self.selection.slot_key = None;

        debug!("Rebuilt grid generation {} for {}: {} slots", self.generation, date, self.slots.len());
    }

    fn current_ticket(&self) -> Option<FetchTicket> {
        self.doctor.as_ref().map(|doctor| FetchTicket {
            generation: self.generation,
            doctor_id: doctor.id,
            date: self.selection.date,
        })
    }

    /// Ticket for a taken-slot read of the current selection.
    pub fn begin_taken_fetch(&self) -> Option<FetchTicket> {
        self.current_ticket()
    }

    /// Applies a taken-slot read. Returns whether the grid was updated.
    pub fn complete_taken_fetch(
        &mut self,
        ticket: FetchTicket,
        result: Result<Vec<Appointment>, ApiError>,
    ) -> bool {
        if self.current_ticket() != Some(ticket) {
            warn!(
                "Discarding taken-slot response for doctor {} on {} (generation {} is stale)",
                ticket.doctor_id, ticket.date, ticket.generation
            );
            return false;
        }

        let appointments = match result {
            Ok(appointments) => appointments,
            Err(e) => {
                warn!("Taken-slot refresh failed for doctor {}: {}", ticket.doctor_id, e);
                return false;
            }
        };

        self.taken = self.engine.reconcile(&mut self.slots, ticket.date, &appointments);
        if let Some(key) = &self.selection.slot_key {
            if self.taken.contains(key) {
                self.selection.slot_key = None;
            }
        }
        true
    }

    pub async fn refresh_taken_slots(&mut self) -> bool {
        let Some(ticket) = self.begin_taken_fetch() else {
            return false;
        };

        let result = self.api.fetch_appointments_for_doctor(ticket.doctor_id).await;
        self.complete_taken_fetch(ticket, result)
    }

    pub async fn submit(&mut self) -> Result<Appointment, BookingError> {
        let result = self.submitter.submit(&self.selection).await;

        match &result {
            Ok(appointment) => {
                info!("Booking view confirmed appointment {}", appointment.id);
                self.message = self.submitter.state().message();
                self.reset_form();
            }
            Err(error) => {
                if let Some(key) = error.conflicting_key() {
                    self.mark_taken(key.clone());
                }
                self.message = Some(error.user_message());
            }
        }
        result
    }

    fn mark_taken(&mut self, key: SlotKey) {
        if self.taken.insert(key) {
            TakenSlotReconciler::apply(&mut self.slots, &self.taken);
        }
        self.selection.slot_key = None;
    }

    /// Default form: today, no doctor or time. The patient survives only
    /// on the patient channel.
    fn reset_form(&mut self) {
        let keep_patient = self.submitter.channel().keeps_patient_after_reset();
        self.selection.reset(self.clock.today(), keep_patient);
        self.doctor = None;
        self.rebuild();
    }

    pub fn grid_state(&self) -> GridState {
        if self.doctor.is_none() {
            return GridState::NoDoctorSelected;
        }
        if self.slots.is_empty() {
            return GridState::NoAvailability;
        }

        GridState::Ready {
            total: self.slots.len(),
            selectable: self.slots.iter().filter(|slot| slot.is_selectable()).count(),
        }
    }

    pub fn can_submit(&self) -> bool {
        self.submitter.can_submit(&self.selection)
    }

    pub fn acknowledge(&mut self) {
        self.submitter.acknowledge();
        self.message = None;
    }

    pub fn selection(&self) -> &BookingSelection {
        &self.selection
    }

    pub fn doctor(&self) -> Option<&Doctor> {
        self.doctor.as_ref()
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    pub fn taken(&self) -> &TakenSlotSet {
        &self.taken
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn state(&self) -> &BookingState {
        self.submitter.state()
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }
}
