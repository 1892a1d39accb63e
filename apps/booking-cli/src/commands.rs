use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use chrono::{NaiveDate, NaiveTime};
use clap::{ArgGroup, Parser, Subcommand};
use tracing::debug;

use booking_cell::{BookingView, GridState, RescheduleService};
use scheduling_cell::{AvailabilityEditor, Slot, SlotEngine, SlotKey};
use shared_api_client::{ClinicApi, ClinicApiClient};
use shared_config::AppConfig;
use shared_models::{BookingChannel, Doctor, Session};
use shared_utils::SystemClock;

#[derive(Parser, Debug)]
#[command(name = "clinic-booking", author, version, about = "Book clinic appointments from the terminal")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List doctors
    Doctors {
        #[arg(long)]
        specialty: Option<String>,
    },
    /// Show a doctor's slot grid for one date
    Slots {
        #[arg(long)]
        doctor: i64,
        #[arg(long)]
        date: NaiveDate,
    },
    /// Book a slot
    Book {
        #[arg(long)]
        patient: i64,
        #[arg(long)]
        doctor: i64,
        #[arg(long)]
        date: NaiveDate,
        #[arg(long, value_parser = parse_time)]
        time: NaiveTime,
        /// Book through the receptionist endpoint
        #[arg(long)]
        receptionist: bool,
    },
    /// List appointments of a patient, of a doctor, or all of them
    #[command(group(ArgGroup::new("scope").required(true).args(["patient", "doctor", "all"])))]
    Appointments {
        #[arg(long)]
        patient: Option<i64>,
        #[arg(long)]
        doctor: Option<i64>,
        /// Every appointment in the clinic (receptionist view)
        #[arg(long)]
        all: bool,
    },
    /// Move an appointment to a new start time
    Reschedule {
        #[arg(long)]
        appointment: i64,
        #[arg(long)]
        date: NaiveDate,
        #[arg(long, value_parser = parse_time)]
        time: NaiveTime,
    },
    /// Replace a doctor's published availability
    PublishAvailability {
        #[arg(long)]
        doctor: i64,
        /// "YYYY-MM-DD HH:MM-HH:MM", repeatable
        #[arg(long = "slot", required = true)]
        slots: Vec<String>,
    },
}

fn parse_time(raw: &str) -> Result<NaiveTime, String> {
    NaiveTime::parse_from_str(raw.trim(), "%H:%M").map_err(|e| format!("expected HH:MM: {}", e))
}

pub async fn run(command: Command, config: &AppConfig) -> Result<()> {
    let api: Arc<dyn ClinicApi> = Arc::new(ClinicApiClient::new(config)?);
    let engine = SlotEngine::from_config(config);

    match command {
        Command::Doctors { specialty } => list_doctors(api, engine, specialty.as_deref()).await,
        Command::Slots { doctor, date } => show_slots(api, engine, doctor, date).await,
        Command::Book { patient, doctor, date, time, receptionist } => {
            let channel = if receptionist {
                BookingChannel::Receptionist
            } else {
                BookingChannel::Patient
            };
            book(api, engine, channel, patient, doctor, date, time).await
        }
        Command::Appointments { patient, doctor, all } => {
            let scope = match (patient, doctor) {
                (Some(patient_id), _) => AppointmentScope::Patient(patient_id),
                (None, Some(doctor_id)) => AppointmentScope::Doctor(doctor_id),
                (None, None) if all => AppointmentScope::All,
                (None, None) => bail!("Pass --patient, --doctor or --all"),
            };
            list_appointments(api, scope).await
        }
        Command::Reschedule { appointment, date, time } => {
            let appointment = RescheduleService::new(api)
                .reschedule(appointment, date.and_time(time))
                .await
                .map_err(|e| anyhow!(e.user_message()))?;
            println!(
                "Appointment {} moved to {}",
                appointment.id,
                appointment.timestamp().unwrap_or("-")
            );
            Ok(())
        }
        Command::PublishAvailability { doctor, slots } => publish_availability(api, doctor, &slots).await,
    }
}

fn new_view(api: Arc<dyn ClinicApi>, engine: SlotEngine, channel: BookingChannel, session: Option<&Session>) -> BookingView {
    BookingView::new(engine, api, Arc::new(SystemClock), channel, session)
}

async fn list_doctors(api: Arc<dyn ClinicApi>, engine: SlotEngine, specialty: Option<&str>) -> Result<()> {
    let mut view = new_view(api, engine, BookingChannel::Patient, None);
    view.load_doctors().await;
    if let Some(error) = view.doctor_load_error() {
        bail!("Could not load doctors: {}", error);
    }

    let doctors: Vec<Doctor> = match specialty {
        Some(specialty) => view.filter_doctors_by_specialty(specialty),
        None => view.doctors().to_vec(),
    };

    if doctors.is_empty() {
        println!("No doctors found");
    }
    for doctor in &doctors {
        println!(
            "{:>5}  {:<24} {}",
            doctor.id,
            doctor.display_name(),
            doctor.specialty.as_deref().unwrap_or("-")
        );
    }
    Ok(())
}

async fn prepare_view(
    api: Arc<dyn ClinicApi>,
    engine: SlotEngine,
    channel: BookingChannel,
    session: Option<&Session>,
    doctor_id: i64,
    date: NaiveDate,
) -> Result<BookingView> {
    let mut view = new_view(api, engine, channel, session);
    view.load_doctors().await;

    if let Some(error) = view.doctor_load_error() {
        bail!("Could not load doctors: {}", error);
    }
    if !view.select_doctor_by_id(doctor_id) {
        bail!("Doctor {} not found", doctor_id);
    }
    view.change_date(date);
    view.refresh_taken_slots().await;

    Ok(view)
}

fn slot_marker(slot: &Slot) -> &'static str {
    if slot.taken {
        "taken"
    } else if slot.disabled {
        "past"
    } else {
        "free"
    }
}

async fn show_slots(api: Arc<dyn ClinicApi>, engine: SlotEngine, doctor_id: i64, date: NaiveDate) -> Result<()> {
    let view = prepare_view(api, engine, BookingChannel::Patient, None, doctor_id, date).await?;

    match view.grid_state() {
        GridState::NoDoctorSelected => println!("No doctor selected"),
        GridState::NoAvailability => println!("No availability on {}", date),
        GridState::Ready { total, selectable } => {
            println!("{} slots on {}, {} bookable", total, date, selectable);
            for slot in view.slots() {
                println!("  {}  {}", slot.label, slot_marker(slot));
            }
        }
    }
    Ok(())
}

async fn book(
    api: Arc<dyn ClinicApi>,
    engine: SlotEngine,
    channel: BookingChannel,
    patient_id: i64,
    doctor_id: i64,
    date: NaiveDate,
    time: NaiveTime,
) -> Result<()> {
    let session = match channel {
        BookingChannel::Patient => Some(Session::patient(patient_id)),
        BookingChannel::Receptionist => None,
    };
    let mut view = prepare_view(api, engine, channel, session.as_ref(), doctor_id, date).await?;
    view.set_patient_id(Some(patient_id));

    let key = SlotKey::from_start(date.and_time(time));
    if !view.select_slot(&key) {
        bail!("Slot {} is not available", key);
    }
    debug!("Selected slot {}", key);

    let outcome = view.submit().await;
    if let Some(message) = view.message() {
        println!("{}", message);
    }

    let appointment = outcome.context("Booking was not saved")?;
    println!("Appointment id: {}", appointment.id);
    Ok(())
}

#[derive(Debug, Clone, Copy)]
enum AppointmentScope {
    Patient(i64),
    Doctor(i64),
    All,
}

async fn list_appointments(api: Arc<dyn ClinicApi>, scope: AppointmentScope) -> Result<()> {
    debug!("Listing appointments for {:?}", scope);
    let appointments = match scope {
        AppointmentScope::Patient(patient_id) => api.fetch_appointments_for_patient(patient_id).await?,
        AppointmentScope::Doctor(doctor_id) => api.fetch_appointments_for_doctor(doctor_id).await?,
        AppointmentScope::All => api.fetch_all_appointments().await?,
    };

    if appointments.is_empty() {
        println!("No appointments");
    }
    for appointment in &appointments {
        println!(
            "{:>5}  {:<20} {}",
            appointment.id,
            appointment.timestamp().unwrap_or("-"),
            appointment.status.as_deref().unwrap_or("-")
        );
    }
    Ok(())
}

async fn publish_availability(api: Arc<dyn ClinicApi>, doctor_id: i64, rows: &[String]) -> Result<()> {
    let mut editor = AvailabilityEditor::new();
    for row in rows {
        editor
            .add_text_row(row)
            .with_context(|| format!("Invalid availability row '{}'", row))?;
    }

    let text = editor.render()?;
    api.update_doctor_availability(doctor_id, &text).await?;
    println!("Published availability for doctor {}: {}", doctor_id, text);
    Ok(())
}
