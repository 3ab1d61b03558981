use super::schema::{canciones, familias, invitados, mensajes};
use chrono::NaiveDateTime;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

/// Whether a guest is coming. Stored as a nullable boolean and sent over the
/// wire the same way (`null`, `true`, `false`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Option<bool>", into = "Option<bool>")]
pub enum Attendance {
    #[default]
    Undecided,
    Accepted,
    Declined,
}

impl Attendance {
    pub fn as_flag(self) -> Option<bool> {
        match self {
            Attendance::Undecided => None,
            Attendance::Accepted => Some(true),
            Attendance::Declined => Some(false),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Attendance::Undecided => "Sin responder",
            Attendance::Accepted => "Asiste",
            Attendance::Declined => "No asiste",
        }
    }
}

impl From<Option<bool>> for Attendance {
    fn from(flag: Option<bool>) -> Self {
        match flag {
            None => Attendance::Undecided,
            Some(true) => Attendance::Accepted,
            Some(false) => Attendance::Declined,
        }
    }
}

impl From<Attendance> for Option<bool> {
    fn from(attendance: Attendance) -> Self {
        attendance.as_flag()
    }
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = invitados)]
#[diesel(check_for_backend(diesel::mysql::Mysql))]
pub struct GuestRow {
    pub id: i64,
    pub id_text: String,
    pub nombre: String,
    pub nombre_invitacion: String,
    pub asiste: Option<bool>,
    pub id_familia: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Guest {
    pub id: i64,
    pub id_text: String,
    pub nombre: String,
    pub nombre_invitacion: String,
    pub asiste: Attendance,
    pub id_familia: Option<i64>,
}

impl From<GuestRow> for Guest {
    fn from(row: GuestRow) -> Self {
        Guest {
            id: row.id,
            id_text: row.id_text,
            nombre: row.nombre,
            nombre_invitacion: row.nombre_invitacion,
            asiste: row.asiste.into(),
            id_familia: row.id_familia,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Queryable, Selectable, Serialize)]
#[diesel(table_name = familias)]
#[diesel(check_for_backend(diesel::mysql::Mysql))]
pub struct Family {
    pub id: i64,
    pub id_text: String,
    pub nombre: String,
    pub nombre_invitacion: String,
    pub id_miembro_principal: Option<i64>,
}

/// A guest alongside the invitation name of their family, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuestWithFamily {
    pub guest: Guest,
    pub familia: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Insertable, Serialize)]
#[diesel(table_name = canciones)]
pub struct SongRequest {
    pub id_invitado: String,
    pub fecha: NaiveDateTime,
    pub cancion: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Insertable, Serialize)]
#[diesel(table_name = mensajes)]
pub struct Message {
    pub id_invitado: String,
    pub fecha: NaiveDateTime,
    pub mensaje: String,
}

#[derive(Debug, Deserialize)]
pub struct GuestKey {
    pub id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AttendanceUpdate {
    pub id: String,
    pub asiste: bool,
}

#[derive(Debug, Deserialize)]
pub struct SongSubmission {
    pub id: String,
    pub cancion: String,
}

#[derive(Debug, Deserialize)]
pub struct MessageSubmission {
    pub id: String,
    pub mensaje: String,
}

/// Keys of a bulk update split by the attendance they get. A key is in at
/// most one of the two lists.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct AttendancePlan {
    pub accepted: Vec<String>,
    pub declined: Vec<String>,
}

impl AttendancePlan {
    /// When a key is repeated, its last entry wins.
    pub fn from_updates(updates: &[AttendanceUpdate]) -> Self {
        let mut answers: Vec<(&str, bool)> = Vec::with_capacity(updates.len());
        for update in updates {
            match answers.iter_mut().find(|(key, _)| *key == update.id) {
                Some(answer) => answer.1 = update.asiste,
                None => answers.push((&update.id, update.asiste)),
            }
        }

        let mut plan = AttendancePlan::default();
        for (key, asiste) in answers {
            if asiste {
                plan.accepted.push(key.to_string());
            } else {
                plan.declined.push(key.to_string());
            }
        }
        plan
    }

    pub fn is_empty(&self) -> bool {
        self.accepted.is_empty() && self.declined.is_empty()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RsvpSummary {
    pub total: usize,
    pub sin_responder: usize,
    pub no_asisten: usize,
    pub asisten: usize,
}

impl RsvpSummary {
    pub fn tally(attendance: impl IntoIterator<Item = Attendance>) -> Self {
        let mut summary = RsvpSummary::default();
        for state in attendance {
            summary.total += 1;
            match state {
                Attendance::Undecided => summary.sin_responder += 1,
                Attendance::Declined => summary.no_asisten += 1,
                Attendance::Accepted => summary.asisten += 1,
            }
        }
        summary
    }
}
