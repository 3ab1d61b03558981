//! In-memory `RsvpStore` used by the route and store tests.

use std::sync::Mutex;

use crate::error::{Error, Result};
use crate::models::{
    Attendance, AttendancePlan, Family, Guest, GuestWithFamily, Message, SongRequest,
};
use crate::store::RsvpStore;

#[derive(Default)]
struct Tables {
    guests: Vec<Guest>,
    families: Vec<Family>,
    songs: Vec<SongRequest>,
    messages: Vec<Message>,
}

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    failing_writes: bool,
}

fn guest(
    id: i64,
    id_text: &str,
    nombre: &str,
    asiste: Attendance,
    id_familia: Option<i64>,
) -> Guest {
    Guest {
        id,
        id_text: id_text.to_string(),
        nombre: nombre.to_string(),
        nombre_invitacion: nombre.to_string(),
        asiste,
        id_familia,
    }
}

impl MemoryStore {
    /// One family of two plus two guests on their own.
    pub fn seeded() -> Self {
        let families = vec![Family {
            id: 1,
            id_text: "fam-garcia".to_string(),
            nombre: "García".to_string(),
            nombre_invitacion: "Familia García".to_string(),
            id_miembro_principal: Some(1),
        }];
        let guests = vec![
            guest(1, "ana-garcia", "Ana García", Attendance::Undecided, Some(1)),
            guest(2, "luis-garcia", "Luis García", Attendance::Accepted, Some(1)),
            guest(3, "marta-lopez", "Marta López", Attendance::Declined, None),
            guest(4, "pedro-ruiz", "Pedro Ruiz", Attendance::Undecided, None),
        ];

        MemoryStore {
            tables: Mutex::new(Tables {
                guests,
                families,
                ..Tables::default()
            }),
            failing_writes: false,
        }
    }

    pub fn with_failing_writes(mut self) -> Self {
        self.failing_writes = true;
        self
    }

    pub fn songs(&self) -> Vec<SongRequest> {
        self.tables.lock().unwrap().songs.clone()
    }

    pub fn messages(&self) -> Vec<Message> {
        self.tables.lock().unwrap().messages.clone()
    }

    fn check_write(&self) -> Result<()> {
        if self.failing_writes {
            return Err(Error::Write(diesel::result::Error::BrokenTransactionManager));
        }
        Ok(())
    }
}

#[rocket::async_trait]
impl RsvpStore for MemoryStore {
    async fn guests(&self) -> Result<Vec<Guest>> {
        Ok(self.tables.lock().unwrap().guests.clone())
    }

    async fn guest(&self, key: &str) -> Result<Guest> {
        self.tables
            .lock()
            .unwrap()
            .guests
            .iter()
            .find(|g| g.id_text == key)
            .cloned()
            .ok_or_else(|| Error::GuestNotFound(key.to_string()))
    }

    async fn families(&self) -> Result<Vec<Family>> {
        Ok(self.tables.lock().unwrap().families.clone())
    }

    async fn family(&self, key: &str) -> Result<Family> {
        self.tables
            .lock()
            .unwrap()
            .families
            .iter()
            .find(|f| f.id_text == key)
            .cloned()
            .ok_or_else(|| Error::FamilyNotFound(key.to_string()))
    }

    async fn guests_by_family(&self, key: &str) -> Result<Vec<Guest>> {
        let family = self.family(key).await?;
        Ok(self
            .tables
            .lock()
            .unwrap()
            .guests
            .iter()
            .filter(|g| g.id_familia == Some(family.id))
            .cloned()
            .collect())
    }

    async fn guests_with_family(&self) -> Result<Vec<GuestWithFamily>> {
        let tables = self.tables.lock().unwrap();
        let mut rows: Vec<GuestWithFamily> = tables
            .guests
            .iter()
            .map(|g| GuestWithFamily {
                guest: g.clone(),
                familia: tables
                    .families
                    .iter()
                    .find(|f| Some(f.id) == g.id_familia)
                    .map(|f| f.nombre_invitacion.clone()),
            })
            .collect();
        rows.sort_by(|a, b| a.guest.nombre.cmp(&b.guest.nombre));
        Ok(rows)
    }

    async fn update_attendance(&self, plan: &AttendancePlan) -> Result<usize> {
        self.check_write()?;
        let mut tables = self.tables.lock().unwrap();
        let mut updated = 0;
        for guest in tables.guests.iter_mut() {
            if plan.accepted.contains(&guest.id_text) {
                guest.asiste = Attendance::Accepted;
                updated += 1;
            } else if plan.declined.contains(&guest.id_text) {
                guest.asiste = Attendance::Declined;
                updated += 1;
            }
        }
        Ok(updated)
    }

    async fn set_attendance(&self, key: &str, attendance: Attendance) -> Result<Guest> {
        self.check_write()?;
        let mut tables = self.tables.lock().unwrap();
        let guest = tables
            .guests
            .iter_mut()
            .find(|g| g.id_text == key)
            .ok_or_else(|| Error::GuestNotFound(key.to_string()))?;
        guest.asiste = attendance;
        Ok(guest.clone())
    }

    async fn add_song(&self, song: &SongRequest) -> Result<()> {
        self.check_write()?;
        self.tables.lock().unwrap().songs.push(song.clone());
        Ok(())
    }

    async fn add_message(&self, message: &Message) -> Result<()> {
        self.check_write()?;
        self.tables.lock().unwrap().messages.push(message.clone());
        Ok(())
    }
}
