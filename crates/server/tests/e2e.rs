use std::collections::BTreeSet;
use std::net::SocketAddr;

use axum::Router;
use configs::DatabaseConfig;
use reqwest::StatusCode as HttpStatusCode;
use serde_json::{json, Value};
use tempfile::TempDir;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;

use server::routes::{self, ServerState};

fn cors() -> CorsLayer { CorsLayer::very_permissive() }

struct TestApp {
    base_url: String,
    // holds the SQLite file of file-backed apps until the test ends
    _dir: Option<TempDir>,
}

impl TestApp {
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// Every test gets its own in-memory store and listener.
async fn start_server() -> anyhow::Result<TestApp> {
    serve(&DatabaseConfig::in_memory(), None).await
}

/// Same app on a SQLite file with the default pool, as deployed.
async fn start_server_on_file() -> anyhow::Result<TestApp> {
    let dir = TempDir::new()?;
    let cfg = DatabaseConfig {
        url: format!("sqlite://{}?mode=rwc", dir.path().join("cars.db").display()),
        ..DatabaseConfig::default()
    };
    serve(&cfg, Some(dir)).await
}

async fn serve(cfg: &DatabaseConfig, dir: Option<TempDir>) -> anyhow::Result<TestApp> {
    let db = models::db::connect_with_config(cfg).await?;
    models::db::ensure_schema(&db).await?;

    let app: Router = routes::build_router(ServerState { db }, cors());
    let listener = TcpListener::bind((std::net::Ipv4Addr::LOCALHOST, 0)).await?;
    let addr: SocketAddr = listener.local_addr()?;
    let base_url = format!("http://{}:{}", addr.ip(), addr.port());

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await { eprintln!("server error: {}", e); }
    });

    Ok(TestApp { base_url, _dir: dir })
}

fn client() -> reqwest::Client {
    reqwest::Client::new()
}

async fn create_car(c: &reqwest::Client, app: &TestApp, name: &str) -> anyhow::Result<i64> {
    let res = c.post(app.url("/api/cars"))
        .json(&json!({"name": name, "image": format!("/img/{name}.png"), "description": format!("{name} desc")}))
        .send().await?;
    assert_eq!(res.status(), HttpStatusCode::CREATED);
    let body = res.json::<Value>().await?;
    Ok(body["car"]["id"].as_i64().unwrap())
}

async fn create_article(c: &reqwest::Client, app: &TestApp, title: &str, car_id: i64) -> anyhow::Result<()> {
    let res = c.post(app.url("/api/articles"))
        .json(&json!({"title": title, "content": format!("{title} body"), "car_id": car_id}))
        .send().await?;
    assert_eq!(res.status(), HttpStatusCode::CREATED);
    Ok(())
}

async fn create_comment(c: &reqwest::Client, app: &TestApp, content: &str, parent_id: Option<i64>) -> anyhow::Result<i64> {
    let res = c.post(app.url("/api/comments"))
        .json(&json!({"content": content, "author": "tester", "parent_id": parent_id}))
        .send().await?;
    assert_eq!(res.status(), HttpStatusCode::CREATED);
    let body = res.json::<Value>().await?;
    Ok(body["id"].as_i64().unwrap())
}

async fn list_comments(c: &reqwest::Client, app: &TestApp, sort: Option<&str>) -> anyhow::Result<Vec<Value>> {
    let mut req = c.get(app.url("/api/comments"));
    if let Some(s) = sort { req = req.query(&[("sort", s)]); }
    let res = req.send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let body = res.json::<Value>().await?;
    Ok(body["comments"].as_array().cloned().unwrap_or_default())
}

fn ids(items: &[Value]) -> Vec<i64> {
    items.iter().map(|v| v["id"].as_i64().unwrap()).collect()
}

#[tokio::test]
async fn e2e_public_health() -> anyhow::Result<()> {
    let app = start_server().await?;
    let res = client().get(app.url("/health")).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let body = res.json::<Value>().await?;
    assert_eq!(body["status"], "ok");
    Ok(())
}

#[tokio::test]
async fn e2e_openapi_document_served() -> anyhow::Result<()> {
    let app = start_server().await?;
    let res = client().get(app.url("/api-docs/openapi.json")).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let body = res.json::<Value>().await?;
    assert!(body["paths"]["/api/geely-cars"].is_object());
    Ok(())
}

#[tokio::test]
async fn e2e_car_without_article_lists_null() -> anyhow::Result<()> {
    let app = start_server().await?;
    let c = client();
    let id = create_car(&c, &app, "Coolray").await?;

    let body = c.get(app.url("/api/geely-cars")).send().await?.json::<Value>().await?;
    let cars = body["cars"].as_array().unwrap();
    assert_eq!(cars.len(), 1);
    assert_eq!(cars[0]["id"].as_i64(), Some(id));
    assert_eq!(cars[0]["name"], "Coolray");
    assert!(cars[0]["article"].is_null());
    Ok(())
}

#[tokio::test]
async fn e2e_car_lists_its_first_article() -> anyhow::Result<()> {
    let app = start_server().await?;
    let c = client();
    let id = create_car(&c, &app, "Monjaro").await?;
    create_article(&c, &app, "first", id).await?;
    create_article(&c, &app, "second", id).await?;

    let body = c.get(app.url("/api/geely-cars")).send().await?.json::<Value>().await?;
    let article = &body["cars"][0]["article"];
    assert_eq!(article["title"], "first");
    assert_eq!(article["content"], "first body");
    assert!(article["id"].is_i64());
    Ok(())
}

#[tokio::test]
async fn e2e_create_car_requires_every_field() -> anyhow::Result<()> {
    let app = start_server().await?;
    let c = client();
    let res = c.post(app.url("/api/cars"))
        .json(&json!({"name": "Emgrand", "image": "/img/e.png"}))
        .send().await?;
    assert_eq!(res.status(), HttpStatusCode::BAD_REQUEST);
    let body = res.json::<Value>().await?;
    assert_eq!(body["error"], "Bad Request");

    let res = c.post(app.url("/api/cars"))
        .json(&json!({"name": "  ", "image": "/img/e.png", "description": "d"}))
        .send().await?;
    assert_eq!(res.status(), HttpStatusCode::BAD_REQUEST);

    let body = c.get(app.url("/api/geely-cars")).send().await?.json::<Value>().await?;
    assert!(body["cars"].as_array().unwrap().is_empty());
    Ok(())
}

#[tokio::test]
async fn e2e_update_car_replaces_fields() -> anyhow::Result<()> {
    let app = start_server().await?;
    let c = client();
    let id = create_car(&c, &app, "Atlas").await?;

    let res = c.put(app.url(&format!("/api/cars/{id}")))
        .json(&json!({"name": "Atlas Pro", "image": "/img/ap.png", "description": "new"}))
        .send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let body = res.json::<Value>().await?;
    assert_eq!(body["car"]["name"], "Atlas Pro");

    let body = c.get(app.url("/api/geely-cars")).send().await?.json::<Value>().await?;
    assert_eq!(body["cars"][0]["description"], "new");
    Ok(())
}

#[tokio::test]
async fn e2e_missing_car_is_404_and_store_untouched() -> anyhow::Result<()> {
    let app = start_server().await?;
    let c = client();
    let id = create_car(&c, &app, "Tugella").await?;
    let missing = id + 100;

    let res = c.put(app.url(&format!("/api/cars/{missing}")))
        .json(&json!({"name": "x", "image": "y", "description": "z"}))
        .send().await?;
    assert_eq!(res.status(), HttpStatusCode::NOT_FOUND);
    assert_eq!(res.json::<Value>().await?["error"], "Not Found");

    let res = c.delete(app.url(&format!("/api/cars/{missing}"))).send().await?;
    assert_eq!(res.status(), HttpStatusCode::NOT_FOUND);

    let body = c.get(app.url("/api/geely-cars")).send().await?.json::<Value>().await?;
    let cars = body["cars"].as_array().unwrap();
    assert_eq!(cars.len(), 1);
    assert_eq!(cars[0]["name"], "Tugella");
    Ok(())
}

#[tokio::test]
async fn e2e_delete_car_removes_its_articles() -> anyhow::Result<()> {
    let app = start_server().await?;
    let c = client();
    let doomed = create_car(&c, &app, "Preface").await?;
    let kept = create_car(&c, &app, "Okavango").await?;
    create_article(&c, &app, "doomed", doomed).await?;
    create_article(&c, &app, "kept", kept).await?;

    let res = c.delete(app.url(&format!("/api/cars/{doomed}"))).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    assert_eq!(res.json::<Value>().await?["message"], "车辆及其文章已删除");

    let body = c.get(app.url("/api/articles")).send().await?.json::<Value>().await?;
    let articles = body["articles"].as_array().unwrap();
    assert_eq!(articles.len(), 1);
    assert_eq!(articles[0]["title"], "kept");
    assert_eq!(articles[0]["car_name"], "Okavango");
    Ok(())
}

#[tokio::test]
async fn e2e_article_for_unknown_car_is_rejected() -> anyhow::Result<()> {
    let app = start_server().await?;
    let c = client();
    let res = c.post(app.url("/api/articles"))
        .json(&json!({"title": "t", "content": "c", "car_id": 42}))
        .send().await?;
    assert_eq!(res.status(), HttpStatusCode::BAD_REQUEST);

    let res = c.post(app.url("/api/articles"))
        .json(&json!({"title": "t", "content": "c"}))
        .send().await?;
    assert_eq!(res.status(), HttpStatusCode::BAD_REQUEST);

    let body = c.get(app.url("/api/articles")).send().await?.json::<Value>().await?;
    assert!(body["articles"].as_array().unwrap().is_empty());
    Ok(())
}

#[tokio::test]
async fn e2e_article_read_update_delete() -> anyhow::Result<()> {
    let app = start_server().await?;
    let c = client();
    let car_id = create_car(&c, &app, "Boyue").await?;
    create_article(&c, &app, "review", car_id).await?;
    let body = c.get(app.url("/api/articles")).send().await?.json::<Value>().await?;
    let id = body["articles"][0]["id"].as_i64().unwrap();

    let res = c.get(app.url(&format!("/api/articles/{id}"))).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let article = res.json::<Value>().await?;
    assert_eq!(article["title"], "review");
    assert_eq!(article["car_id"].as_i64(), Some(car_id));
    assert_eq!(article["car_name"], "Boyue");
    let created_at = article["created_at"].as_str().unwrap();
    assert!(chrono::DateTime::parse_from_rfc3339(created_at).is_ok(), "bad timestamp {created_at}");

    let res = c.put(app.url(&format!("/api/articles/{id}")))
        .json(&json!({"title": "review v2", "content": "longer", "car_id": car_id}))
        .send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let article = c.get(app.url(&format!("/api/articles/{id}"))).send().await?.json::<Value>().await?;
    assert_eq!(article["title"], "review v2");
    assert_eq!(article["created_at"].as_str(), Some(created_at));

    let res = c.put(app.url(&format!("/api/articles/{}", id + 1)))
        .json(&json!({"title": "x", "content": "y", "car_id": car_id}))
        .send().await?;
    assert_eq!(res.status(), HttpStatusCode::NOT_FOUND);

    let res = c.delete(app.url(&format!("/api/articles/{id}"))).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let res = c.get(app.url(&format!("/api/articles/{id}"))).send().await?;
    assert_eq!(res.status(), HttpStatusCode::NOT_FOUND);
    let res = c.delete(app.url(&format!("/api/articles/{id}"))).send().await?;
    assert_eq!(res.status(), HttpStatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn e2e_reply_nested_under_parent() -> anyhow::Result<()> {
    let app = start_server().await?;
    let c = client();
    let root = create_comment(&c, &app, "root", None).await?;
    let reply = create_comment(&c, &app, "reply", Some(root)).await?;
    let nested = create_comment(&c, &app, "reply to reply", Some(reply)).await?;

    let comments = list_comments(&c, &app, None).await?;
    assert_eq!(ids(&comments), vec![root]);
    let replies = comments[0]["replies"].as_array().unwrap();
    let mut reply_ids = ids(replies);
    reply_ids.sort();
    assert_eq!(reply_ids, vec![reply, nested]);
    assert_eq!(comments[0]["likes"], 0);
    assert_eq!(comments[0]["author"], "tester");
    Ok(())
}

#[tokio::test]
async fn e2e_comment_validation() -> anyhow::Result<()> {
    let app = start_server().await?;
    let c = client();
    let res = c.post(app.url("/api/comments"))
        .json(&json!({"content": "orphan", "author": "a", "parent_id": 999}))
        .send().await?;
    assert_eq!(res.status(), HttpStatusCode::BAD_REQUEST);

    let res = c.post(app.url("/api/comments"))
        .json(&json!({"content": "no author"}))
        .send().await?;
    assert_eq!(res.status(), HttpStatusCode::BAD_REQUEST);

    let res = c.post(app.url("/api/comments"))
        .header("content-type", "application/json")
        .body("{not json")
        .send().await?;
    assert_eq!(res.status(), HttpStatusCode::BAD_REQUEST);

    assert!(list_comments(&c, &app, None).await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn e2e_concurrent_likes_are_not_lost() -> anyhow::Result<()> {
    let app = start_server().await?;
    let c = client();
    let id = create_comment(&c, &app, "popular", None).await?;

    let mut handles = Vec::new();
    for _ in 0..20 {
        let c = c.clone();
        let url = app.url(&format!("/api/comments/{id}/like"));
        handles.push(tokio::spawn(async move {
            let res = c.post(url).send().await?;
            assert_eq!(res.status(), HttpStatusCode::OK);
            let body = res.json::<Value>().await?;
            anyhow::Ok(body["likes"].as_i64().unwrap())
        }));
    }
    let mut seen = BTreeSet::new();
    for h in handles {
        seen.insert(h.await??);
    }
    assert_eq!(seen, (1..=20).collect::<BTreeSet<i64>>());

    let comments = list_comments(&c, &app, None).await?;
    assert_eq!(comments[0]["likes"], 20);
    Ok(())
}

#[tokio::test]
async fn e2e_like_missing_comment_is_404() -> anyhow::Result<()> {
    let app = start_server().await?;
    let res = client().post(app.url("/api/comments/7/like")).send().await?;
    assert_eq!(res.status(), HttpStatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn e2e_delete_comment_removes_replies() -> anyhow::Result<()> {
    let app = start_server().await?;
    let c = client();
    let root = create_comment(&c, &app, "root", None).await?;
    let reply = create_comment(&c, &app, "reply", Some(root)).await?;
    let other = create_comment(&c, &app, "other", None).await?;

    let res = c.delete(app.url(&format!("/api/comments/{root}"))).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    assert_eq!(res.json::<Value>().await?["message"], "评论删除成功");

    let comments = list_comments(&c, &app, None).await?;
    assert_eq!(ids(&comments), vec![other]);
    let res = c.post(app.url(&format!("/api/comments/{reply}/like"))).send().await?;
    assert_eq!(res.status(), HttpStatusCode::NOT_FOUND);
    let res = c.delete(app.url(&format!("/api/comments/{root}"))).send().await?;
    assert_eq!(res.status(), HttpStatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn e2e_sort_by_likes_then_insertion() -> anyhow::Result<()> {
    let app = start_server().await?;
    let c = client();
    let a = create_comment(&c, &app, "a", None).await?;
    let b = create_comment(&c, &app, "b", None).await?;
    let d = create_comment(&c, &app, "d", None).await?;
    for _ in 0..2 {
        c.post(app.url(&format!("/api/comments/{d}/like"))).send().await?;
    }

    let comments = list_comments(&c, &app, Some("likes")).await?;
    assert_eq!(ids(&comments), vec![d, a, b]);
    Ok(())
}

#[tokio::test]
async fn e2e_sort_by_time_newest_first() -> anyhow::Result<()> {
    let app = start_server().await?;
    let c = client();
    let mut created = Vec::new();
    for name in ["old", "mid", "new"] {
        created.push(create_comment(&c, &app, name, None).await?);
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
    }
    c.post(app.url(&format!("/api/comments/{}/like", created[0]))).send().await?;
    created.reverse();

    assert_eq!(ids(&list_comments(&c, &app, None).await?), created);
    assert_eq!(ids(&list_comments(&c, &app, Some("time")).await?), created);
    assert_eq!(ids(&list_comments(&c, &app, Some("bogus")).await?), created);
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn e2e_concurrent_writes_on_file_store() -> anyhow::Result<()> {
    let app = start_server_on_file().await?;
    let c = client();
    let car_id = create_car(&c, &app, "Galaxy E8").await?;
    let root = create_comment(&c, &app, "root", None).await?;

    let mut handles = Vec::new();
    for i in 0..15 {
        let reqs = [
            c.post(app.url("/api/comments")).json(&json!({"content": format!("r{i}"), "author": "crowd", "parent_id": root})),
            c.put(app.url(&format!("/api/cars/{car_id}")))
                .json(&json!({"name": format!("E8 v{i}"), "image": "/e8.png", "description": "sedan"})),
            c.post(app.url("/api/articles")).json(&json!({"title": format!("t{i}"), "content": "c", "car_id": car_id})),
            c.post(app.url(&format!("/api/comments/{root}/like"))),
        ];
        for req in reqs {
            handles.push(tokio::spawn(async move { anyhow::Ok(req.send().await?.status()) }));
        }
    }
    for h in handles {
        let status = h.await??;
        assert!(status.is_success(), "request failed with {status}");
    }

    let comments = list_comments(&c, &app, None).await?;
    assert_eq!(comments[0]["likes"], 15);
    assert_eq!(comments[0]["replies"].as_array().map(Vec::len), Some(15));
    let body = c.get(app.url("/api/articles")).send().await?.json::<Value>().await?;
    assert_eq!(body["articles"].as_array().map(Vec::len), Some(15));
    Ok(())
}
