//! HTTP API over the adapter bindings and services.
//!
//! # Endpoints
//!
//! - `GET  /health`                                  : liveness probe
//! - `GET  /capabilities`                            : bound adapter per capability
//! - `POST /auth/signup`, `POST /auth/signin`        : accounts
//! - `GET|POST /users/:user_id/paths`                : list or create learning paths
//! - `GET  /users/:user_id/paths/:path_id`           : one learning path
//! - `POST /users/:user_id/paths/:path_id/progress`  : mark a day
//! - `GET  /users/:user_id/paths/:path_id/export`    : document or JSON download
//! - `POST|DELETE /users/:user_id/paths/:path_id/reminders` : set or cancel reminders
//! - `POST /users/:user_id/paths/:path_id/notify`    : send a notification now
//! - `POST /users/:user_id/paths/:path_id/duplicate` : copy a learning path
//! - `GET  /users/:user_id/paths/:path_id/days/:day/audio` : narrated day
//! - `POST /users/:user_id/paths/:path_id/days/:day/enhance` : rework a day from feedback
//! - `GET  /users/:user_id/paths/:path_id/playlist`  : first-week video playlist
//! - `POST /notifications/test`                      : check a phone number and channel
//! - `GET  /users/:user_id/notifications`            : notification history
//! - `GET  /estimate`                                : suggested plan length
//! - `GET  /videos`, `GET /videos/:video_id`, `GET /channels`
//! - `POST /tts`, `GET /tts/voices`, `GET /documents`

pub mod routes;

pub use routes::{app_router, AppState};
