/// HTTP endpoint for querying sensor state
///
/// Read-only JSON view of the monitoring board, for dashboards and for
/// smart-home hosts that poll a REST sensor.
///
/// Endpoints:
/// - GET /health - Service health check
/// - GET /sensors - All sensors
/// - GET /sensor/{unique_id} - One sensor (unique id is percent-decoded)

use crate::monitor::{self, SharedBoard};
use serde_json::json;
use tracing::{info, warn};

type JsonResponse = tiny_http::Response<std::io::Cursor<Vec<u8>>>;

// ---------------------------------------------------------------------------
// Routing
// ---------------------------------------------------------------------------

/// Resolves a request path to a status code and JSON body.
pub fn route(method: &tiny_http::Method, url: &str, board: &SharedBoard) -> (u16, serde_json::Value) {
    if *method != tiny_http::Method::Get {
        return (405, json!({ "error": "Method not allowed" }));
    }

    let path = url.split('?').next().unwrap_or(url);

    if path == "/health" {
        let board = monitor::read_board(board);
        return (
            200,
            json!({
                "status": "ok",
                "service": "lakelevel_service",
                "version": env!("CARGO_PKG_VERSION"),
                "sensors": board.len(),
                "unhealthy": board.unhealthy().len(),
            }),
        );
    }

    if path == "/sensors" {
        let board = monitor::read_board(board);
        return (200, json!({ "sensors": board.all() }));
    }

    if let Some(raw_id) = path.strip_prefix("/sensor/") {
        let unique_id = match urlencoding::decode(raw_id) {
            Ok(id) => id.into_owned(),
            Err(_) => {
                return (400, json!({ "error": "Sensor id is not valid UTF-8" }));
            }
        };

        let board = monitor::read_board(board);
        return match board.get(&unique_id) {
            Some(snapshot) => (200, json!(snapshot)),
            None => (
                404,
                json!({
                    "error": "Sensor not found",
                    "unique_id": unique_id
                }),
            ),
        };
    }

    (
        404,
        json!({
            "error": "Not found",
            "available_endpoints": ["/health", "/sensors", "/sensor/{unique_id}"]
        }),
    )
}

// ---------------------------------------------------------------------------
// HTTP Server
// ---------------------------------------------------------------------------

/// Start HTTP endpoint server on the specified port
pub fn start_endpoint_server(
    port: u16,
    board: SharedBoard,
) -> Result<(), Box<dyn std::error::Error + Send + Sync + 'static>> {
    let server = tiny_http::Server::http(format!("0.0.0.0:{}", port))?;
    info!(port, "HTTP endpoint listening");
    serve(server, board);
    Ok(())
}

/// Answers requests on an already bound server until it is shut down.
pub fn serve(server: tiny_http::Server, board: SharedBoard) {
    for request in server.incoming_requests() {
        let (status, body) = route(request.method(), request.url(), &board);

        if let Err(e) = request.respond(create_response(status, &body)) {
            warn!(error = %e, "failed to send response");
        }
    }
}

/// Create HTTP response with JSON body
fn create_response(status_code: u16, json: &serde_json::Value) -> JsonResponse {
    let body = serde_json::to_string_pretty(json).unwrap_or_else(|_| "{}".to_string());

    let response = tiny_http::Response::from_data(body.into_bytes())
        .with_status_code(tiny_http::StatusCode::from(status_code));

    match tiny_http::Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..]) {
        Ok(header) => response.with_header(header),
        Err(_) => response,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
