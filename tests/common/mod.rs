/// Local stand-in for the vizugy.hu upstreams.
///
/// Binds to an ephemeral loopback port, answers every request with the same
/// canned body and the current status, and records the request URLs so tests
/// can check what was sent and how often.

use std::sync::atomic::{AtomicU16, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;

pub struct MockUpstream {
    server: Arc<tiny_http::Server>,
    requests: Arc<Mutex<Vec<String>>>,
    status: Arc<AtomicU16>,
    base_url: String,
}

impl MockUpstream {
    pub fn start(status: u16, body: &str) -> Self {
        let server = Arc::new(tiny_http::Server::http("127.0.0.1:0").expect("bind mock upstream"));
        let port = server
            .server_addr()
            .to_ip()
            .expect("mock upstream listens on TCP")
            .port();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let status = Arc::new(AtomicU16::new(status));

        let worker_server = Arc::clone(&server);
        let worker_requests = Arc::clone(&requests);
        let worker_status = Arc::clone(&status);
        let body = body.to_string();

        thread::spawn(move || {
            for request in worker_server.incoming_requests() {
                worker_requests.lock().unwrap().push(request.url().to_string());
                let response = tiny_http::Response::from_string(body.clone())
                    .with_status_code(tiny_http::StatusCode::from(worker_status.load(Ordering::SeqCst)));
                let _ = request.respond(response);
            }
        });

        Self {
            server,
            requests,
            status,
            base_url: format!("http://127.0.0.1:{}", port),
        }
    }

    /// Absolute URL for `path` on the mock.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Status returned from the next request on.
    #[allow(dead_code)]
    pub fn set_status(&self, status: u16) {
        self.status.store(status, Ordering::SeqCst);
    }

    #[allow(dead_code)]
    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    #[allow(dead_code)]
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

impl Drop for MockUpstream {
    fn drop(&mut self) {
        self.server.unblock();
    }
}

#[allow(dead_code)]
pub const STATION_PAGE: &str = r#"<html><body>
<script type="text/javascript">
    var Vizallas = new Array(91, 90, 89, 88, 87);
</script>
</body></html>"#;

#[allow(dead_code)]
pub const BALATON_SINGLE_JSON: &str = r#"{"features":[{"attributes":{"vFeAllomas_webmerc.Nev":"Balaton átlag","vh.dbo.AllomasAdatVOP_FE.Vizallas":87}}]}"#;

#[allow(dead_code)]
pub const OWNER_STATIONS_JSON: &str = r#"{"features":[
  {"attributes":{"vFeAllomas_webmerc.Nev":"Siófok","vh.dbo.AllomasAdatVOP_FE.Vizallas":85}},
  {"attributes":{"vFeAllomas_webmerc.Nev":"Keszthely","vh.dbo.AllomasAdatVOP_FE.Vizallas":92}},
  {"attributes":{"vFeAllomas_webmerc.Nev":"Siófok","vh.dbo.AllomasAdatVOP_FE.Vizallas":11}}
]}"#;
