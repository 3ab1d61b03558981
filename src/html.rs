//! Markup fragments swapped into the RSVP pages by htmx.
//!
//! The fragments are askama templates compiled into the binary, so rendering
//! is a pure function of the records given and all text is escaped by the
//! template engine.

use askama::Template;
use rocket::serde::json::json;

use crate::models::{Attendance, Family, Guest, GuestWithFamily, RsvpSummary};

impl Attendance {
    /// Value of the `data-asiste` attribute on buttons and rows.
    pub fn state_name(self) -> &'static str {
        match self {
            Attendance::Undecided => "pendiente",
            Attendance::Accepted => "si",
            Attendance::Declined => "no",
        }
    }

    pub fn accept_class(self) -> &'static str {
        match self {
            Attendance::Undecided => "btn btn-outline-success",
            Attendance::Accepted => "btn btn-success",
            Attendance::Declined => "btn btn-outline-secondary",
        }
    }

    pub fn decline_class(self) -> &'static str {
        match self {
            Attendance::Undecided => "btn btn-outline-danger",
            Attendance::Accepted => "btn btn-outline-secondary",
            Attendance::Declined => "btn btn-danger",
        }
    }
}

impl Guest {
    /// JSON body posted by the accept/decline buttons.
    pub fn hx_vals(&self) -> String {
        json!({ "id": &self.id_text }).to_string()
    }
}

impl GuestWithFamily {
    pub fn familia_label(&self) -> &str {
        self.familia.as_deref().unwrap_or("Sin familia")
    }
}

/// Accept/decline pair for one guest. The highlighted button reflects the
/// current answer; an undecided guest gets two outlined buttons.
#[derive(Template)]
#[template(path = "asistencia.html")]
struct AttendanceButtons<'a> {
    guest: &'a Guest,
}

#[derive(Template)]
#[template(path = "resumen.html")]
struct SummaryTable<'a> {
    summary: &'a RsvpSummary,
}

#[derive(Template)]
#[template(path = "fila.html")]
struct GuestRowTemplate<'a> {
    row: &'a GuestWithFamily,
}

/// Summary counters followed by one row per guest.
#[derive(Template)]
#[template(path = "tabla_rsvp.html")]
struct RsvpTable<'a> {
    summary: &'a RsvpSummary,
    rows: &'a [GuestWithFamily],
}

#[derive(Template)]
#[template(path = "familia.html")]
struct FamilyCard<'a> {
    family: &'a Family,
    guests: &'a [Guest],
}

pub fn attendance_buttons(guest: &Guest) -> askama::Result<String> {
    AttendanceButtons { guest }.render()
}

pub fn rsvp_summary(summary: &RsvpSummary) -> askama::Result<String> {
    SummaryTable { summary }.render()
}

pub fn guest_row(row: &GuestWithFamily) -> askama::Result<String> {
    GuestRowTemplate { row }.render()
}

pub fn rsvp_table(summary: &RsvpSummary, rows: &[GuestWithFamily]) -> askama::Result<String> {
    RsvpTable { summary, rows }.render()
}

pub fn family_guests(family: &Family, guests: &[Guest]) -> askama::Result<String> {
    FamilyCard { family, guests }.render()
}
