use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use chrono::Utc;
use fixtures::cdn::{self, CdnConfig, CdnState};
use ring::hmac;
use serde_json::Value;
use tower::ServiceExt as _;

const PRIVATE_KEY: &str = "private_test_key";
const PUBLIC_KEY: &str = "public_test_key";

fn cdn() -> (Router, CdnState) {
    let state = CdnState::new(CdnConfig {
        public_key: PUBLIC_KEY.to_string(),
        private_key: PRIVATE_KEY.to_string(),
        url_endpoint: "https://cdn.test/reelup/".to_string(),
    });
    (cdn::router(state.clone()), state)
}

fn sign(token: &str, expire: i64) -> String {
    let key = hmac::Key::new(hmac::HMAC_SHA1_FOR_LEGACY_USE_ONLY, PRIVATE_KEY.as_bytes());
    hex::encode(hmac::sign(&key, format!("{token}{expire}").as_bytes()).as_ref())
}

const BOUNDARY: &str = "reelup-test-boundary";

/// Encode fields the way a browser `FormData` does; `file` goes as a file part
fn multipart_body(fields: &[(&str, &str)]) -> String {
    let mut body = String::new();
    for (name, value) in fields {
        body.push_str(&format!("--{BOUNDARY}\r\n"));
        if *name == "file" {
            body.push_str(
                "Content-Disposition: form-data; name=\"file\"; filename=\"blob\"\r\n\
                 Content-Type: application/octet-stream\r\n\r\n",
            );
        } else {
            body.push_str(&format!(
                "Content-Disposition: form-data; name=\"{name}\"\r\n\r\n"
            ));
        }
        body.push_str(value);
        body.push_str("\r\n");
    }
    body.push_str(&format!("--{BOUNDARY}--\r\n"));
    body
}

async fn upload(router: &Router, fields: &[(&str, &str)]) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/files/upload")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(multipart_body(fields)))
        .unwrap();

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn accepts_a_correctly_signed_upload() {
    let (router, state) = cdn();
    let expire = (Utc::now().timestamp() + 1800).to_string();
    let signature = sign("token-1", expire.parse().unwrap());

    let (status, body) = upload(
        &router,
        &[
            ("file", "aGVsbG8="),
            ("fileName", "clip.mp4"),
            ("folder", "/videos/"),
            ("publicKey", PUBLIC_KEY),
            ("token", "token-1"),
            ("expire", &expire),
            ("signature", &signature),
        ],
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["filePath"], "/videos/clip.mp4");
    assert_eq!(body["url"], "https://cdn.test/reelup/videos/clip.mp4");
    assert_eq!(body["size"], 8);
    assert_eq!(state.files().len(), 1);
}

#[tokio::test]
async fn rejects_bad_signatures_and_wrong_keys() {
    let (router, state) = cdn();
    let expire = (Utc::now().timestamp() + 600).to_string();
    let signature = sign("token-2", expire.parse().unwrap());

    let (status, body) = upload(
        &router,
        &[
            ("file", "x"),
            ("fileName", "a.mp4"),
            ("publicKey", PUBLIC_KEY),
            ("token", "token-2"),
            ("expire", &expire),
            ("signature", "deadbeef"),
        ],
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Your request contains invalid signature");

    let (status, _) = upload(
        &router,
        &[
            ("file", "x"),
            ("fileName", "a.mp4"),
            ("publicKey", "someone_else"),
            ("token", "token-2"),
            ("expire", &expire),
            ("signature", &signature),
        ],
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(state.files().is_empty());
}

#[tokio::test]
async fn rejects_expired_and_far_future_params() {
    let (router, _state) = cdn();
    let now = Utc::now().timestamp();

    for expire in [now - 10, now + 2 * 3600] {
        let expire_str = expire.to_string();
        let signature = sign("token-3", expire);
        let (status, _) = upload(
            &router,
            &[
                ("file", "x"),
                ("fileName", "a.mp4"),
                ("publicKey", PUBLIC_KEY),
                ("token", "token-3"),
                ("expire", &expire_str),
                ("signature", &signature),
            ],
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN, "expire {expire}");
    }
}

#[tokio::test]
async fn tokens_are_single_use() {
    let (router, state) = cdn();
    let expire = (Utc::now().timestamp() + 600).to_string();
    let signature = sign("token-4", expire.parse().unwrap());
    let fields = [
        ("file", "x"),
        ("fileName", "a.mp4"),
        ("publicKey", PUBLIC_KEY),
        ("token", "token-4"),
        ("expire", expire.as_str()),
        ("signature", signature.as_str()),
    ];

    let (first, _) = upload(&router, &fields).await;
    let (second, body) = upload(&router, &fields).await;

    assert_eq!(first, StatusCode::OK);
    assert_eq!(second, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "The token has already been used");
    assert_eq!(state.files().len(), 1);
}

#[tokio::test]
async fn allows_cross_origin_uploads() {
    let (router, _state) = cdn();

    let preflight = Request::builder()
        .method("OPTIONS")
        .uri("/api/v1/files/upload")
        .header(header::ORIGIN, "http://localhost:3000")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .body(Body::empty())
        .unwrap();
    let response = router.oneshot(preflight).await.unwrap();

    assert!(response.status().is_success());
    assert!(response
        .headers()
        .contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));
}
