#[macro_use] extern crate rocket;
extern crate diesel;
use chrono::Utc;
use std::sync::Arc;
use rocket::fairing::{self, AdHoc};
use rocket::http::Status;
use rocket::response::content::RawHtml;
use rocket::response::status::Created;
use rocket::serde::json::{self, json, Json, Value};
use rocket::{Build, Catcher, Request, Rocket, Route, State};
use rocket_db_pools::Database;
use rocket_db_pools::diesel::MysqlPool;
use tracing_subscriber::EnvFilter;

pub mod config;
pub mod error;
pub mod html;
pub mod models;
pub mod schema;
pub mod store;

#[cfg(test)]
mod memory;

use error::{Error, Result};
use models::{
    Attendance, AttendancePlan, AttendanceUpdate, Family, Guest, GuestKey, Message,
    MessageSubmission, RsvpSummary, SongRequest, SongSubmission,
};
use store::{resolve_sender, MysqlStore, RsvpStore, SharedStore};

#[derive(Database)]
#[database("rsvp")]
struct Db(MysqlPool);

type JsonBody<'r, T> = std::result::Result<Json<T>, json::Error<'r>>;

fn decode<T>(body: JsonBody<'_, T>) -> Result<T> {
    match body {
        Ok(Json(value)) => Ok(value),
        Err(json::Error::Io(e)) => Err(Error::Decode(e.to_string())),
        Err(json::Error::Parse(_, e)) => Err(Error::Decode(e.to_string())),
    }
}

fn required_text(field: &str, value: String) -> Result<String> {
    let value = value.trim().to_string();
    if value.is_empty() {
        return Err(Error::Decode(format!("el campo {field} no puede estar vacío")));
    }
    Ok(value)
}

#[get("/invitados")]
async fn list_guests(store: &State<SharedStore>) -> Result<Json<Vec<Guest>>> {
    Ok(Json(store.guests().await?))
}

#[get("/invitados/<id>")]
async fn get_guest(id: &str, store: &State<SharedStore>) -> Result<Json<Guest>> {
    Ok(Json(store.guest(id).await?))
}

#[get("/invitados/byfamilia/<id>")]
async fn guests_by_family(
    id: &str,
    store: &State<SharedStore>,
) -> Result<Json<Vec<Guest>>> {
    Ok(Json(store.guests_by_family(id).await?))
}

#[get("/invitados/tabla-rsvp")]
async fn rsvp_table(store: &State<SharedStore>) -> Result<RawHtml<String>> {
    let rows = store.guests_with_family().await?;
    let summary = RsvpSummary::tally(rows.iter().map(|row| row.guest.asiste));
    Ok(RawHtml(html::rsvp_table(&summary, &rows)?))
}

#[get("/invitados/resumen")]
async fn rsvp_summary(store: &State<SharedStore>) -> Result<Json<RsvpSummary>> {
    let guests = store.guests().await?;
    Ok(Json(RsvpSummary::tally(guests.iter().map(|g| g.asiste))))
}

#[get("/familias")]
async fn list_families(store: &State<SharedStore>) -> Result<Json<Vec<Family>>> {
    Ok(Json(store.families().await?))
}

#[get("/familias/<id>")]
async fn get_family(id: &str, store: &State<SharedStore>) -> Result<Json<Family>> {
    Ok(Json(store.family(id).await?))
}

#[get("/familias/<id>/invitados")]
async fn family_card(id: &str, store: &State<SharedStore>) -> Result<RawHtml<String>> {
    let family = store.family(id).await?;
    let guests = store.guests_by_family(id).await?;
    Ok(RawHtml(html::family_guests(&family, &guests)?))
}

#[get("/asistencia/<id>")]
async fn attendance_buttons(
    id: &str,
    store: &State<SharedStore>,
) -> Result<RawHtml<String>> {
    let guest = store.guest(id).await?;
    Ok(RawHtml(html::attendance_buttons(&guest)?))
}

#[post("/asistencia", data = "<body>")]
async fn bulk_attendance(
    body: JsonBody<'_, Vec<AttendanceUpdate>>,
    store: &State<SharedStore>,
) -> Result<Status> {
    let updates = decode(body)?;
    let plan = AttendancePlan::from_updates(&updates);
    if plan.is_empty() {
        return Ok(Status::NoContent);
    }
    let updated = store.update_attendance(&plan).await?;

    tracing::info!(
        accepted = plan.accepted.len(),
        declined = plan.declined.len(),
        updated,
        "Attendance updated"
    );
    Ok(Status::NoContent)
}

async fn answer(
    body: JsonBody<'_, GuestKey>,
    store: &State<SharedStore>,
    attendance: Attendance,
) -> Result<RawHtml<String>> {
    let key = decode(body)?;
    let guest = store.set_attendance(&key.id, attendance).await?;

    tracing::info!(
        guest = %guest.id_text,
        asiste = ?attendance.as_flag(),
        "Invitation answered"
    );
    Ok(RawHtml(html::attendance_buttons(&guest)?))
}

#[post("/asistencia/aceptar", data = "<body>")]
async fn accept(
    body: JsonBody<'_, GuestKey>,
    store: &State<SharedStore>,
) -> Result<RawHtml<String>> {
    answer(body, store, Attendance::Accepted).await
}

#[post("/asistencia/rechazar", data = "<body>")]
async fn reject(
    body: JsonBody<'_, GuestKey>,
    store: &State<SharedStore>,
) -> Result<RawHtml<String>> {
    answer(body, store, Attendance::Declined).await
}

#[post("/cancion", data = "<body>")]
async fn submit_song(
    body: JsonBody<'_, SongSubmission>,
    store: &State<SharedStore>,
) -> Result<Created<Json<SongRequest>>> {
    let submission = decode(body)?;
    let cancion = required_text("cancion", submission.cancion)?;
    let id_invitado = resolve_sender(store.inner().as_ref(), &submission.id).await?;

    let song = SongRequest {
        id_invitado,
        fecha: Utc::now().naive_utc(),
        cancion,
    };
    store.add_song(&song).await?;

    tracing::info!(sender = %song.id_invitado, "Song request saved");
    Ok(Created::new("/cancion").body(Json(song)))
}

#[post("/mensaje", data = "<body>")]
async fn submit_message(
    body: JsonBody<'_, MessageSubmission>,
    store: &State<SharedStore>,
) -> Result<Created<Json<Message>>> {
    let submission = decode(body)?;
    let mensaje = required_text("mensaje", submission.mensaje)?;
    let id_invitado = resolve_sender(store.inner().as_ref(), &submission.id).await?;

    let message = Message {
        id_invitado,
        fecha: Utc::now().naive_utc(),
        mensaje,
    };
    store.add_message(&message).await?;

    tracing::info!(sender = %message.id_invitado, "Message saved");
    Ok(Created::new("/mensaje").body(Json(message)))
}

#[catch(404)]
fn not_found(req: &Request<'_>) -> Json<Value> {
    Json(json!({ "message": format!("No existe la ruta {}", req.uri()) }))
}

#[catch(422)]
fn unprocessable() -> Json<Value> {
    Json(json!({ "message": "No se pudo procesar la petición" }))
}

#[catch(500)]
fn internal_error() -> Json<Value> {
    Json(json!({ "message": "Error interno del servidor" }))
}

fn routes() -> Vec<Route> {
    routes![
        list_guests, get_guest, guests_by_family, rsvp_table, rsvp_summary,
        list_families, get_family, family_card,
        attendance_buttons, bulk_attendance, accept, reject,
        submit_song, submit_message,
    ]
}

fn catchers() -> Vec<Catcher> {
    catchers![not_found, unprocessable, internal_error]
}

async fn connect_store(rocket: Rocket<Build>) -> fairing::Result {
    let Some(db) = Db::fetch(&rocket) else {
        tracing::error!("rsvp database pool was not initialized");
        return Err(rocket);
    };

    let store = MysqlStore::new(db.0.clone());
    match store.ping().await {
        Ok(()) => {
            tracing::info!("Connected to the rsvp database");
            Ok(rocket.manage(Arc::new(store) as SharedStore))
        }
        Err(e) => {
            tracing::error!(error = %e, "Database unavailable at startup");
            Err(rocket)
        }
    }
}

#[launch]
fn rocket() -> _ {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,wedding_rsvp=debug")),
        )
        .try_init();

    rocket::custom(config::figment())
        .attach(Db::init())
        .attach(AdHoc::try_on_ignite("RSVP store", connect_store))
        .mount("/", routes())
        .register("/", catchers())
}
