//! Appointment types
//!
//! An appointment (*cita*) carries five business fields plus a store-assigned id:
//! - `client_name`: who the appointment is for
//! - `service`: `Manicura`, `Pedicura`, or any free-text service
//! - `date`: calendar date, persisted as `dd/mm/yyyy`
//! - `time`: one of [`TIME_SLOTS`] or free text
//! - `status`: `Confirmada`, `Pendiente`, `Cancelada`, or free text
//!
//! Form values always travel as [`AppointmentFields`], keyed by name.

use crate::{Error, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Persisted date format (day/month/year)
pub const DATE_FORMAT: &str = "%d/%m/%Y";

/// Time-of-day slots offered by the booking form
pub const TIME_SLOTS: &[&str] = &[
    "9:00 am", "10:00 am", "11:00 am", "2:00 pm", "3:00 pm", "4:00 pm", "5:00 pm", "6:00 pm",
    "7:00 pm",
];

const KNOWN_SERVICES: &[Service] = &[Service::Manicura, Service::Pedicura];
const KNOWN_STATUSES: &[Status] = &[Status::Confirmada, Status::Pendiente, Status::Cancelada];

/// Service offered at the appointment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Service {
    Manicura,
    Pedicura,
    /// Any service not in the fixed list
    Other(String),
}

impl Service {
    pub fn as_str(&self) -> &str {
        match self {
            Service::Manicura => "Manicura",
            Service::Pedicura => "Pedicura",
            Service::Other(s) => s,
        }
    }

    /// Services offered by the picker
    pub fn known() -> &'static [Service] {
        KNOWN_SERVICES
    }

    /// Form input: trimmed, known values matched without case
    pub fn parse(input: &str) -> Self {
        let s = input.trim();
        match s.to_lowercase().as_str() {
            "manicura" => Service::Manicura,
            "pedicura" => Service::Pedicura,
            _ => Service::Other(s.to_string()),
        }
    }
}

/// Stored text, taken as-is
impl From<String> for Service {
    fn from(s: String) -> Self {
        match s.as_str() {
            "Manicura" => Service::Manicura,
            "Pedicura" => Service::Pedicura,
            _ => Service::Other(s),
        }
    }
}

impl From<&str> for Service {
    fn from(s: &str) -> Self {
        Service::from(s.to_string())
    }
}

impl From<Service> for String {
    fn from(s: Service) -> Self {
        s.as_str().to_string()
    }
}

impl std::fmt::Display for Service {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Booking status.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Status {
    Confirmada,
    Pendiente,
    Cancelada,
    Other(String),
}

impl Status {
    pub fn as_str(&self) -> &str {
        match self {
            Status::Confirmada => "Confirmada",
            Status::Pendiente => "Pendiente",
            Status::Cancelada => "Cancelada",
            Status::Other(s) => s,
        }
    }

    pub fn known() -> &'static [Status] {
        KNOWN_STATUSES
    }

    /// Form input: trimmed, known values matched without case
    pub fn parse(input: &str) -> Self {
        let s = input.trim();
        match s.to_lowercase().as_str() {
            "confirmada" => Status::Confirmada,
            "pendiente" => Status::Pendiente,
            "cancelada" => Status::Cancelada,
            _ => Status::Other(s.to_string()),
        }
    }
}

/// Stored text, taken as-is
impl From<String> for Status {
    fn from(s: String) -> Self {
        match s.as_str() {
            "Confirmada" => Status::Confirmada,
            "Pendiente" => Status::Pendiente,
            "Cancelada" => Status::Cancelada,
            _ => Status::Other(s),
        }
    }
}

impl From<&str> for Status {
    fn from(s: &str) -> Self {
        Status::from(s.to_string())
    }
}

impl From<Status> for String {
    fn from(s: Status) -> Self {
        s.as_str().to_string()
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Parse a `dd/mm/yyyy` date
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
        .map_err(|e| Error::InvalidField(format!("date '{}' is not dd/mm/yyyy: {}", s, e)))
}

/// Format a date the way it is persisted
pub fn format_date(date: &NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

mod date_serde {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(date: &NaiveDate, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&super::format_date(date))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(d)?;
        super::parse_date(&raw).map_err(serde::de::Error::custom)
    }
}

/// The five business fields of an appointment, keyed by name.
///
/// This is the unit the shell submits for both insert and update; the store
/// binds each field to its column by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppointmentFields {
    pub client_name: String,
    pub service: Service,
    #[serde(with = "date_serde")]
    pub date: NaiveDate,
    pub time: String,
    pub status: Status,
}

impl AppointmentFields {
    pub fn new(
        client_name: impl Into<String>,
        service: impl Into<Service>,
        date: NaiveDate,
        time: impl Into<String>,
        status: impl Into<Status>,
    ) -> Self {
        Self {
            client_name: client_name.into(),
            service: service.into(),
            date,
            time: time.into(),
            status: status.into(),
        }
    }

    /// Build fields from raw form text, parsing the date
    pub fn parse(
        client_name: &str,
        service: &str,
        date: &str,
        time: &str,
        status: &str,
    ) -> Result<Self> {
        let fields = Self {
            client_name: client_name.trim().to_string(),
            service: Service::parse(service),
            date: parse_date(date)?,
            time: time.trim().to_string(),
            status: Status::parse(status),
        };
        fields.validate()?;
        Ok(fields)
    }

    /// Every field must be non-empty
    pub fn validate(&self) -> Result<()> {
        let checks = [
            ("client_name", self.client_name.as_str()),
            ("service", self.service.as_str()),
            ("time", self.time.as_str()),
            ("status", self.status.as_str()),
        ];
        for (name, value) in checks {
            if value.trim().is_empty() {
                return Err(Error::InvalidField(format!("{} must not be empty", name)));
            }
        }
        Ok(())
    }

    pub fn date_string(&self) -> String {
        format_date(&self.date)
    }

    /// Overlay form overrides; fields without an override keep their value untouched
    pub fn apply(mut self, changes: &FieldChanges) -> Result<Self> {
        if let Some(client_name) = &changes.client_name {
            self.client_name = client_name.trim().to_string();
        }
        if let Some(service) = &changes.service {
            self.service = Service::parse(service);
        }
        if let Some(date) = &changes.date {
            self.date = parse_date(date)?;
        }
        if let Some(time) = &changes.time {
            self.time = time.trim().to_string();
        }
        if let Some(status) = &changes.status {
            self.status = Status::parse(status);
        }
        self.validate()?;
        Ok(self)
    }
}

/// Raw form overrides for an update
#[derive(Debug, Clone, Default)]
pub struct FieldChanges {
    pub client_name: Option<String>,
    pub service: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub status: Option<String>,
}

/// A persisted appointment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Appointment {
    /// Assigned by the store on insert, immutable afterwards
    pub id: i64,
    #[serde(flatten)]
    pub fields: AppointmentFields,
}
