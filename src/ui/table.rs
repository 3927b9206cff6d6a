use crate::appointment::{Appointment, Service, Status, TIME_SLOTS};
use crate::storage::{Row, StoreStats};
use tabled::{builder::Builder, settings::Style, Table, Tabled};

#[derive(Tabled)]
pub struct TableRow {
    #[tabled(rename = "Metric")]
    pub metric: String,
    #[tabled(rename = "Value")]
    pub value: String,
}

pub struct TableBuilder {
    rows: Vec<TableRow>,
}

impl TableBuilder {
    pub fn new() -> Self {
        Self { rows: Vec::new() }
    }

    pub fn add_row(&mut self, label: &str, value: &str) {
        self.rows.push(TableRow {
            metric: label.to_string(),
            value: value.to_string(),
        });
    }

    pub fn build(&self) -> String {
        if self.rows.is_empty() {
            return String::new();
        }

        Table::new(&self.rows).with(Style::rounded()).to_string()
    }
}

impl Default for TableBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Tabled)]
struct AppointmentRow {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "Nombre del Cliente")]
    client_name: String,
    #[tabled(rename = "Servicio")]
    service: String,
    #[tabled(rename = "Fecha")]
    date: String,
    #[tabled(rename = "Hora")]
    time: String,
    #[tabled(rename = "Estado")]
    status: String,
}

impl From<&Appointment> for AppointmentRow {
    fn from(a: &Appointment) -> Self {
        Self {
            id: a.id,
            client_name: a.fields.client_name.clone(),
            service: a.fields.service.to_string(),
            date: a.fields.date_string(),
            time: a.fields.time.clone(),
            status: a.fields.status.to_string(),
        }
    }
}

/// The appointments grid, one line per appointment
pub fn appointments_table(appointments: &[Appointment]) -> String {
    if appointments.is_empty() {
        return String::new();
    }
    let rows: Vec<AppointmentRow> = appointments.iter().map(AppointmentRow::from).collect();
    Table::new(rows).with(Style::rounded()).to_string()
}

/// Raw result rows, no header
pub fn rows_table(rows: &[Row]) -> String {
    if rows.is_empty() {
        return String::new();
    }
    let mut builder = Builder::default();
    for row in rows {
        builder.push_record(row.iter().map(|v| v.to_string()));
    }
    builder.build().with(Style::rounded()).to_string()
}

pub fn stats_table(stats: &StoreStats) -> String {
    let mut builder = TableBuilder::new();
    builder.add_row("Total", &stats.total.to_string());
    for (status, count) in &stats.by_status {
        let label = if status.is_empty() { "(none)" } else { status };
        builder.add_row(label, &count.to_string());
    }
    builder.build()
}

/// Picker choices offered by the booking form
pub fn options_table() -> String {
    let join = |items: Vec<&str>| items.join(", ");
    let mut builder = TableBuilder::new();
    builder.add_row("Servicio", &join(Service::known().iter().map(Service::as_str).collect()));
    builder.add_row("Hora", &join(TIME_SLOTS.to_vec()));
    builder.add_row("Estado", &join(Status::known().iter().map(Status::as_str).collect()));
    builder.build()
}
