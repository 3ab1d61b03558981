//! Data access for guests, families and the song/message logs.
//!
//! Handlers only see the [`RsvpStore`] trait; the MySQL implementation is
//! built at ignition from the pooled `rsvp` database and placed in Rocket's
//! managed state.

use std::sync::Arc;

use diesel::mysql::Mysql;
use diesel::query_builder::{QueryFragment, QueryId};
use rocket_db_pools::diesel::prelude::*;
use rocket_db_pools::diesel::{MysqlPool, RunQueryDsl};
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::{
    Attendance, AttendancePlan, Family, Guest, GuestRow, GuestWithFamily, Message, SongRequest,
};
use crate::schema::{canciones, familias, invitados, mensajes};

#[rocket::async_trait]
pub trait RsvpStore: Send + Sync {
    async fn guests(&self) -> Result<Vec<Guest>>;

    /// Fails with [`Error::GuestNotFound`] when no guest has this `id_text`.
    async fn guest(&self, key: &str) -> Result<Guest>;

    async fn families(&self) -> Result<Vec<Family>>;

    /// Fails with [`Error::FamilyNotFound`] when no family has this `id_text`.
    async fn family(&self, key: &str) -> Result<Family>;

    async fn guests_by_family(&self, key: &str) -> Result<Vec<Guest>>;

    async fn guests_with_family(&self) -> Result<Vec<GuestWithFamily>>;

    /// Applies one statement per non-empty key list and returns the number of
    /// rows touched. The two statements are not run in a transaction.
    async fn update_attendance(&self, plan: &AttendancePlan) -> Result<usize>;

    async fn set_attendance(&self, key: &str, attendance: Attendance) -> Result<Guest>;

    async fn add_song(&self, song: &SongRequest) -> Result<()>;

    async fn add_message(&self, message: &Message) -> Result<()>;
}

pub type SharedStore = Arc<dyn RsvpStore>;

/// Resolves a submission key to a guest first and to a family second.
pub async fn resolve_sender(store: &dyn RsvpStore, key: &str) -> Result<String> {
    match store.guest(key).await {
        Ok(guest) => return Ok(guest.id_text),
        Err(Error::GuestNotFound(_)) => {}
        Err(e) => return Err(e),
    }

    match store.family(key).await {
        Ok(family) => Ok(family.id_text),
        Err(Error::FamilyNotFound(_)) => Err(Error::Unresolved(key.to_string())),
        Err(e) => Err(e),
    }
}

/// `UPDATE Invitados SET asiste = ? WHERE id_text IN (?, ..)` for one group
/// of a bulk update, or `None` when the group has no keys.
pub(crate) fn attendance_for_keys<'a>(
    keys: &'a [String],
    attendance: Attendance,
) -> Option<impl QueryFragment<Mysql> + QueryId + Send + 'a> {
    if keys.is_empty() {
        return None;
    }

    Some(
        diesel::update(invitados::table.filter(invitados::id_text.eq_any(keys)))
            .set(invitados::asiste.eq(attendance.as_flag())),
    )
}

pub(crate) fn attendance_for_guest(
    id: i64,
    attendance: Attendance,
) -> impl QueryFragment<Mysql> + QueryId + Send {
    diesel::update(invitados::table.find(id)).set(invitados::asiste.eq(attendance.as_flag()))
}

pub(crate) fn insert_song(song: &SongRequest) -> impl QueryFragment<Mysql> + QueryId + Send + '_ {
    diesel::insert_into(canciones::table).values(song)
}

pub(crate) fn insert_message(
    message: &Message,
) -> impl QueryFragment<Mysql> + QueryId + Send + '_ {
    diesel::insert_into(mensajes::table).values(message)
}

pub struct MysqlStore {
    pool: MysqlPool,
}

impl MysqlStore {
    pub fn new(pool: MysqlPool) -> Self {
        MysqlStore { pool }
    }

    pub async fn ping(&self) -> Result<()> {
        let mut conn = self.pool.get().await.map_err(Error::unavailable)?;
        diesel::sql_query("SELECT 1").execute(&mut conn).await?;
        Ok(())
    }
}

#[rocket::async_trait]
impl RsvpStore for MysqlStore {
    async fn guests(&self) -> Result<Vec<Guest>> {
        let mut conn = self.pool.get().await.map_err(Error::unavailable)?;
        let rows: Vec<GuestRow> = invitados::table
            .select(GuestRow::as_select())
            .order(invitados::id)
            .load(&mut conn)
            .await?;

        Ok(rows.into_iter().map(Guest::from).collect())
    }

    async fn guest(&self, key: &str) -> Result<Guest> {
        let mut conn = self.pool.get().await.map_err(Error::unavailable)?;
        let row: Option<GuestRow> = invitados::table
            .filter(invitados::id_text.eq(key))
            .select(GuestRow::as_select())
            .first(&mut conn)
            .await
            .optional()?;

        row.map(Guest::from)
            .ok_or_else(|| Error::GuestNotFound(key.to_string()))
    }

    async fn families(&self) -> Result<Vec<Family>> {
        let mut conn = self.pool.get().await.map_err(Error::unavailable)?;
        let families = familias::table
            .select(Family::as_select())
            .order(familias::id)
            .load(&mut conn)
            .await?;

        Ok(families)
    }

    async fn family(&self, key: &str) -> Result<Family> {
        let mut conn = self.pool.get().await.map_err(Error::unavailable)?;
        familias::table
            .filter(familias::id_text.eq(key))
            .select(Family::as_select())
            .first(&mut conn)
            .await
            .optional()?
            .ok_or_else(|| Error::FamilyNotFound(key.to_string()))
    }

    async fn guests_by_family(&self, key: &str) -> Result<Vec<Guest>> {
        let family = self.family(key).await?;

        let mut conn = self.pool.get().await.map_err(Error::unavailable)?;
        let rows: Vec<GuestRow> = invitados::table
            .filter(invitados::id_familia.eq(family.id))
            .select(GuestRow::as_select())
            .order(invitados::id)
            .load(&mut conn)
            .await?;

        Ok(rows.into_iter().map(Guest::from).collect())
    }

    async fn guests_with_family(&self) -> Result<Vec<GuestWithFamily>> {
        let mut conn = self.pool.get().await.map_err(Error::unavailable)?;
        let rows: Vec<(GuestRow, Option<String>)> = invitados::table
            .left_join(familias::table)
            .select((
                GuestRow::as_select(),
                familias::nombre_invitacion.nullable(),
            ))
            .order(invitados::nombre)
            .load(&mut conn)
            .await?;

        Ok(rows
            .into_iter()
            .map(|(row, familia)| GuestWithFamily {
                guest: row.into(),
                familia,
            })
            .collect())
    }

    async fn update_attendance(&self, plan: &AttendancePlan) -> Result<usize> {
        let mut conn = self.pool.get().await.map_err(Error::unavailable)?;
        let mut updated = 0;

        if let Some(statement) = attendance_for_keys(&plan.accepted, Attendance::Accepted) {
            updated += statement.execute(&mut conn).await.map_err(Error::Write)?;
        }

        if let Some(statement) = attendance_for_keys(&plan.declined, Attendance::Declined) {
            updated += statement.execute(&mut conn).await.map_err(Error::Write)?;
        }

        debug!(
            accepted = plan.accepted.len(),
            declined = plan.declined.len(),
            updated,
            "bulk attendance update"
        );
        Ok(updated)
    }

    async fn set_attendance(&self, key: &str, attendance: Attendance) -> Result<Guest> {
        let mut guest = self.guest(key).await?;

        let mut conn = self.pool.get().await.map_err(Error::unavailable)?;
        attendance_for_guest(guest.id, attendance)
            .execute(&mut conn)
            .await
            .map_err(Error::Write)?;

        guest.asiste = attendance;
        Ok(guest)
    }

    async fn add_song(&self, song: &SongRequest) -> Result<()> {
        let mut conn = self.pool.get().await.map_err(Error::unavailable)?;
        insert_song(song)
            .execute(&mut conn)
            .await
            .map_err(Error::Write)?;
        Ok(())
    }

    async fn add_message(&self, message: &Message) -> Result<()> {
        let mut conn = self.pool.get().await.map_err(Error::unavailable)?;
        insert_message(message)
            .execute(&mut conn)
            .await
            .map_err(Error::Write)?;
        Ok(())
    }
}
