//! Handler for `GET /statuses`: the board columns, in order. Needs no auth.

use axum::Json;
use jobtrail_core::application::Status;

pub async fn list() -> Json<[Status; 5]> { Json(Status::ALL) }
