use serde_json::Value;
use std::thread;
use tempfile::TempDir;
use ytdiag_engine::server::{DebugServer, ServerConfig};

#[test]
fn serves_requests_over_http() {
    let tmp = TempDir::new().unwrap();
    std::fs::create_dir_all(tmp.path().join("demo")).unwrap();

    let server = DebugServer::bind(ServerConfig {
        bind: "127.0.0.1:0".to_string(),
        projects_dir: tmp.path().to_path_buf(),
    })
    .unwrap();
    let addr = server.local_addr().unwrap();
    let handle = thread::spawn(move || server.serve(Some(4)));

    let base = format!("http://{addr}");
    let client = reqwest::blocking::Client::new();

    let health = client.get(format!("{base}/health")).send().unwrap();
    assert_eq!(health.status().as_u16(), 200);
    assert!(
        health.headers()["content-type"]
            .to_str()
            .unwrap()
            .starts_with("application/json")
    );
    assert_eq!(health.json::<Value>().unwrap()["status"], "ok");

    let projects: Value = client
        .get(format!("{base}/api/projects"))
        .send()
        .unwrap()
        .json()
        .unwrap();
    assert_eq!(projects["projects"][0]["name"], "demo");

    let generated = client
        .post(format!("{base}/api/generate"))
        .header("Content-Type", "application/x-www-form-urlencoded")
        .body("project=x&markdown=short")
        .send()
        .unwrap();
    assert_eq!(generated.status().as_u16(), 400);

    let missing = client.get(format!("{base}/missing")).send().unwrap();
    assert_eq!(missing.status().as_u16(), 404);
    assert_eq!(missing.json::<Value>().unwrap()["error"], "Not found");

    handle.join().unwrap().unwrap();
}
