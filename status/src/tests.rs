use super::*;
use hyper::service::{make_service_fn, service_fn};
use std::{
    convert::Infallible,
    net::{Ipv4Addr, SocketAddr},
    sync::atomic::{AtomicUsize, Ordering},
};
use tokio::sync::mpsc;
use tokio::time::timeout;

const TIMEOUT: Duration = Duration::from_secs(5);

fn fast_config() -> ProbeConfig {
    ProbeConfig {
        request_timeout: Duration::from_millis(500),
        initial_backoff: Duration::from_millis(10),
        max_backoff: Duration::from_millis(50),
        max_attempts: 3,
    }
}

/// Serves 200 for the given status paths (any other path gets 404), counting
/// requests. Requests must carry the probe domain as Host.
fn stub_gateway(ok_hashes: Vec<String>) -> (u16, Arc<AtomicUsize>) {
    let requests = Arc::new(AtomicUsize::new(0));
    let counter = requests.clone();

    let make = make_service_fn(move |_conn| {
        let ok_hashes = ok_hashes.clone();
        let counter = counter.clone();
        async move {
            Ok::<_, Infallible>(service_fn(move |req: hyper::Request<hyper::Body>| {
                let ok_hashes = ok_hashes.clone();
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    let host_ok = req
                        .headers()
                        .get(hyper::header::HOST)
                        .map(|h| h == PROBE_DOMAIN)
                        .unwrap_or(false);
                    let path_ok = ok_hashes
                        .iter()
                        .any(|hash| req.uri().path() == format!("{STATUS_PATH}/{hash}"));
                    let status = if host_ok && path_ok {
                        hyper::StatusCode::OK
                    } else {
                        hyper::StatusCode::NOT_FOUND
                    };
                    Ok::<_, Infallible>(
                        hyper::Response::builder()
                            .status(status)
                            .body(hyper::Body::empty())
                            .unwrap(),
                    )
                }
            }))
        }
    });

    let addr: SocketAddr = (Ipv4Addr::LOCALHOST, 0).into();
    let server = hyper::server::Server::bind(&addr).serve(make);
    let port = server.local_addr().port();
    tokio::spawn(server);
    (port, requests)
}

fn key() -> IngressKey {
    IngressKey::new("default", "demo")
}

#[tokio::test]
async fn reports_ready_once_every_pod_answers() {
    let (port, _) = stub_gateway(vec!["abc123".to_string()]);
    let (tx, mut rx) = mpsc::unbounded_channel();
    let prober = StatusProber::with_config(port, tx, fast_config());
    let pods = [Ipv4Addr::LOCALHOST];

    assert!(!prober.is_ready(&key(), "abc123", &pods));

    let ready = timeout(TIMEOUT, rx.recv()).await.unwrap().unwrap();
    assert_eq!(ready, key());
    assert!(prober.is_ready(&key(), "abc123", &pods));
}

#[tokio::test]
async fn spec_change_restarts_probing() {
    let (port, _) = stub_gateway(vec!["v1".to_string(), "v2".to_string()]);
    let (tx, mut rx) = mpsc::unbounded_channel();
    let prober = StatusProber::with_config(port, tx, fast_config());
    let pods = [Ipv4Addr::LOCALHOST];

    assert!(!prober.is_ready(&key(), "v1", &pods));
    timeout(TIMEOUT, rx.recv()).await.unwrap().unwrap();
    assert!(prober.is_ready(&key(), "v1", &pods));

    // The new hash invalidates the old verdict and starts a fresh context.
    assert!(!prober.is_ready(&key(), "v2", &pods));
    timeout(TIMEOUT, rx.recv()).await.unwrap().unwrap();
    assert!(prober.is_ready(&key(), "v2", &pods));
    assert!(!prober.is_ready(&key(), "v1", &pods));
}

#[tokio::test]
async fn failures_beyond_the_cap_are_not_permanent() {
    let (port, requests) = stub_gateway(vec![]);
    let (tx, _rx) = mpsc::unbounded_channel();
    let prober = StatusProber::with_config(port, tx, fast_config());
    let pods = [Ipv4Addr::LOCALHOST];

    assert!(!prober.is_ready(&key(), "nope", &pods));

    // Wait for the context to exhaust its attempts and clean itself up.
    timeout(TIMEOUT, async {
        loop {
            {
                let states = prober.0.states.lock();
                if !states.contains_key(&key()) {
                    break;
                }
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    })
    .await
    .unwrap();

    // A later reconciliation restarts probing from scratch.
    let before = requests.load(Ordering::SeqCst);
    assert!(!prober.is_ready(&key(), "nope", &pods));
    timeout(TIMEOUT, async {
        while requests.load(Ordering::SeqCst) == before {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .unwrap();
}

#[tokio::test]
async fn cancel_stops_probing() {
    let (port, requests) = stub_gateway(vec![]);
    let (tx, _rx) = mpsc::unbounded_channel();
    let prober = StatusProber::with_config(
        port,
        tx,
        ProbeConfig {
            max_attempts: u32::MAX,
            ..fast_config()
        },
    );
    let pods = [Ipv4Addr::LOCALHOST];

    assert!(!prober.is_ready(&key(), "nope", &pods));
    timeout(TIMEOUT, async {
        while requests.load(Ordering::SeqCst) == 0 {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .unwrap();

    prober.cancel_ingress(&key());

    // Give any in-flight request a moment to finish, then verify no further
    // probes are issued.
    tokio::time::sleep(Duration::from_millis(100)).await;
    let settled = requests.load(Ordering::SeqCst);
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(requests.load(Ordering::SeqCst), settled);
}

#[tokio::test]
async fn no_pods_means_not_ready() {
    let (tx, _rx) = mpsc::unbounded_channel();
    let prober = StatusProber::with_config(9999, tx, fast_config());
    assert!(!prober.is_ready(&key(), "abc", &[]));
}
