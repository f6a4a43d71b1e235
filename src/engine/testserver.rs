//! In-process maven2 repository for transport and deployment tests: GET
//! serves what was inserted or uploaded, PUT stores the body. The server
//! task ends with the test runtime.

use std::collections::HashMap;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use hyper::service::{make_service_fn, service_fn};
use hyper::{Body, Method, Request, Response, Server, StatusCode};

pub struct TestRepositoryServer {
    url: String,
    files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
}

impl TestRepositoryServer {
    pub async fn start() -> TestRepositoryServer {
        let files: Arc<Mutex<HashMap<String, Vec<u8>>>> = Arc::default();

        let shared = files.clone();
        let make_service = make_service_fn(move |_| {
            let files = shared.clone();
            async move {
                Ok::<_, Infallible>(service_fn(move |request| handle(request, files.clone())))
            }
        });

        let server = Server::bind(&SocketAddr::from(([127, 0, 0, 1], 0))).serve(make_service);
        let url = format!("http://{}/maven2", server.local_addr());
        tokio::spawn(server);

        TestRepositoryServer { url, files }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Pre-populates a layout path, as a deployed build would have.
    pub fn insert(&self, path: &str, bytes: &[u8]) {
        self.files
            .lock()
            .unwrap()
            .insert(format!("/maven2/{}", path), bytes.to_vec());
    }

    pub fn get(&self, path: &str) -> Option<Vec<u8>> {
        self.files
            .lock()
            .unwrap()
            .get(&format!("/maven2/{}", path))
            .cloned()
    }
}

async fn handle(
    request: Request<Body>,
    files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
) -> Result<Response<Body>, Infallible> {
    let path = request.uri().path().to_string();

    let response = if request.method() == Method::GET {
        match files.lock().unwrap().get(&path).cloned() {
            Some(bytes) => Response::new(Body::from(bytes)),
            None => Response::builder()
                .status(StatusCode::NOT_FOUND)
                .body(Body::empty())
                .unwrap(),
        }
    } else if request.method() == Method::PUT {
        let body = match hyper::body::to_bytes(request.into_body()).await {
            Ok(body) => body,
            Err(_) => {
                return Ok(Response::builder()
                    .status(StatusCode::BAD_REQUEST)
                    .body(Body::empty())
                    .unwrap())
            }
        };
        files.lock().unwrap().insert(path, body.to_vec());
        Response::builder()
            .status(StatusCode::CREATED)
            .body(Body::empty())
            .unwrap()
    } else {
        Response::builder()
            .status(StatusCode::METHOD_NOT_ALLOWED)
            .body(Body::empty())
            .unwrap()
    };
    Ok(response)
}
