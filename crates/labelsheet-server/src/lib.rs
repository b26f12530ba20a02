// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// labelsheet-server — HTTP surface for the sheet generator.
//
// A minimal HTTP/1.1 server over Tokio TCP exposing `POST /generate`,
// `GET /health` and CORS preflight.

pub mod http;
pub mod routes;
pub mod server;

pub use http::{HttpRequest, HttpResponse};
pub use routes::{GenerateRequest, attachment_filename, handle};
pub use server::{ServerStatus, SheetServer};
