// In-memory storage backend
//
// One store implements both repositories so that the doctor/appointment
// foreign key is enforced the same way the MySQL schema enforces it: every
// check and the write it guards run under a single write lock.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::core::{AppError, Result};
use crate::modules::appointments::models::{Appointment, NewAppointment};
use crate::modules::appointments::repositories::AppointmentRepository;
use crate::modules::doctors::models::Doctor;
use crate::modules::doctors::repositories::DoctorRepository;

#[derive(Debug, Default)]
struct State {
    appointments: BTreeMap<i64, Appointment>,
    doctors: BTreeMap<String, Doctor>,
    next_appointment_id: i64,
    next_doctor_id: i64,
}

impl State {
    fn ensure_bookable(
        &self,
        appointment: &NewAppointment,
        exclude_id: Option<i64>,
    ) -> Result<()> {
        if !self.doctors.contains_key(&appointment.doctor) {
            return Err(AppError::doctor_not_found(&appointment.doctor));
        }

        let conflict = self
            .appointments
            .values()
            .filter(|existing| Some(existing.id) != exclude_id)
            .filter(|existing| existing.doctor == appointment.doctor)
            .find(|existing| existing.overlaps(appointment.start_date, appointment.end_date));

        match conflict {
            Some(existing) => Err(AppError::DoctorConflict(format!(
                "the requested slot overlaps appointment {}",
                existing.id
            ))),
            None => Ok(()),
        }
    }

    fn sorted(mut appointments: Vec<Appointment>) -> Vec<Appointment> {
        appointments.sort_by(|a, b| a.start_date.cmp(&b.start_date).then(a.id.cmp(&b.id)));
        appointments
    }
}

/// Process-local storage, lost on restart
#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: RwLock<State>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AppointmentRepository for InMemoryStore {
    async fn find_all(&self) -> Result<Vec<Appointment>> {
        let state = self.state.read().await;
        Ok(State::sorted(state.appointments.values().cloned().collect()))
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Appointment>> {
        Ok(self.state.read().await.appointments.get(&id).cloned())
    }

    async fn find_by_doctor(&self, doctor: &str) -> Result<Vec<Appointment>> {
        let state = self.state.read().await;
        Ok(State::sorted(
            state
                .appointments
                .values()
                .filter(|appointment| appointment.doctor == doctor)
                .cloned()
                .collect(),
        ))
    }

    async fn find_starting_after(&self, instant: DateTime<Utc>) -> Result<Vec<Appointment>> {
        let state = self.state.read().await;
        Ok(State::sorted(
            state
                .appointments
                .values()
                .filter(|appointment| appointment.start_date > instant)
                .cloned()
                .collect(),
        ))
    }

    async fn insert_exclusive(&self, appointment: &NewAppointment) -> Result<Appointment> {
        let mut state = self.state.write().await;
        state.ensure_bookable(appointment, None)?;

        state.next_appointment_id += 1;
        let stored = Appointment::from_new(state.next_appointment_id, appointment);
        state.appointments.insert(stored.id, stored.clone());

        Ok(stored)
    }

    async fn replace_exclusive(
        &self,
        id: i64,
        appointment: &NewAppointment,
    ) -> Result<Appointment> {
        let mut state = self.state.write().await;
        if !state.appointments.contains_key(&id) {
            return Err(AppError::appointment_not_found(id));
        }
        state.ensure_bookable(appointment, Some(id))?;

        let stored = Appointment::from_new(id, appointment);
        state.appointments.insert(id, stored.clone());

        Ok(stored)
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        Ok(self.state.write().await.appointments.remove(&id).is_some())
    }

    async fn delete_all(&self) -> Result<u64> {
        let mut state = self.state.write().await;
        let removed = state.appointments.len() as u64;
        state.appointments.clear();
        Ok(removed)
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}

#[async_trait]
impl DoctorRepository for InMemoryStore {
    async fn find_all(&self) -> Result<Vec<Doctor>> {
        Ok(self.state.read().await.doctors.values().cloned().collect())
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Doctor>> {
        Ok(self.state.read().await.doctors.get(name).cloned())
    }

    async fn insert(&self, name: &str) -> Result<Doctor> {
        let mut state = self.state.write().await;
        if state.doctors.contains_key(name) {
            return Err(AppError::DoctorAlreadyExists(name.to_string()));
        }

        state.next_doctor_id += 1;
        let doctor = Doctor {
            id: state.next_doctor_id,
            name: name.to_string(),
        };
        state.doctors.insert(doctor.name.clone(), doctor.clone());

        Ok(doctor)
    }

    async fn delete(&self, name: &str) -> Result<bool> {
        let mut state = self.state.write().await;
        if state
            .appointments
            .values()
            .any(|appointment| appointment.doctor == name)
        {
            return Err(AppError::DoctorHasAppointments(name.to_string()));
        }

        Ok(state.doctors.remove(name).is_some())
    }
}
