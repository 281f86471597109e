pub mod error;
pub mod handlers;
pub mod models;
pub mod routes;

#[cfg(test)]
mod tests {
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
        Router,
    };
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tempfile::TempDir;
    use tower::ServiceExt;

    use super::handlers::AppState;
    use super::routes::create_router;
    use crate::cache::MemoryStore;
    use crate::config::AppConfig;
    use crate::domain::users::Registrar;
    use crate::services::remote::test_support::temp_store;
    use crate::services::remote::{ChangeFeed, RemoteStore};
    use crate::state::Action;

    fn app_with(remote: RemoteStore) -> Router {
        let mut state = AppState::new(AppConfig::new(), remote, Arc::new(MemoryStore::new())).unwrap();
        state.registrar = Registrar::with_cost(4);
        create_router(Arc::new(state))
    }

    fn app() -> (Router, TempDir) {
        let (remote, dir) = temp_store();
        (app_with(remote), dir)
    }

    async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(body.map(|b| Body::from(b.to_string())).unwrap_or_else(Body::empty))
            .unwrap();

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    fn registration(first: &str) -> Value {
        json!({"firstName": first, "lastName": "Silva", "password": "pw", "passwordConfirmation": "pw"})
    }

    async fn log_in(app: &Router, username: &str) -> StatusCode {
        let (status, _) = send(app, "POST", "/api/users/login", Some(json!({"username": username, "password": "pw"}))).await;
        status
    }

    fn player(id: &str, name: &str, position: &str, birth_date: &str) -> Value {
        json!({
            "id": id,
            "name": name,
            "club": "Santos",
            "competition": "Série A",
            "positions": [position],
            "foot": "right",
            "birthDate": birth_date,
            "recommendation": "monitoring",
            "scoutYear": 2024
        })
    }

    #[tokio::test]
    async fn test_players_filtered_by_query() {
        let (app, _dir) = app();
        send(&app, "POST", "/api/players", Some(player("p1", "Ana", "ATA", "2008-01-01"))).await;
        send(&app, "POST", "/api/players", Some(player("p2", "Bia", "GOL", "2008-01-01"))).await;

        let (status, body) = send(&app, "GET", "/api/players?positions=ATA", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total"], 1);
        assert_eq!(body["items"][0]["name"], "Ana");
        assert!(body["items"][0]["age"].is_number());

        let (_, competitions) = send(&app, "GET", "/api/competitions", None).await;
        assert_eq!(competitions, json!(["Série A"]));
    }

    #[tokio::test]
    async fn test_invalid_player_rejected() {
        let (app, _dir) = app();
        let mut invalid = player("p1", "Ana", "ATA", "2008-01-01");
        invalid["club"] = json!("");

        let (status, body) = send(&app, "POST", "/api/players", Some(invalid)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("club"));
    }

    #[tokio::test]
    async fn test_squad_add_promote_and_capacity() {
        let (app, _dir) = app();
        send(&app, "POST", "/api/users/register", Some(registration("Ana"))).await;
        log_in(&app, "ana.silva").await;
        send(&app, "POST", "/api/players", Some(player("p1", "Ana", "GOL", "2008-01-01"))).await;
        send(&app, "POST", "/api/players", Some(player("p2", "Bia", "GOL", "2008-01-01"))).await;

        for id in ["p1", "p2"] {
            let (status, _) = send(&app, "POST", "/api/squad/gol/candidates", Some(json!({"playerId": id}))).await;
            assert_eq!(status, StatusCode::OK);
        }
        send(&app, "POST", "/api/squad/gol/promote", Some(json!({"index": 1}))).await;

        let (_, squad) = send(&app, "GET", "/api/squad", None).await;
        assert_eq!(squad["slots"]["gol"][0]["id"], "p2");
        assert_eq!(squad["slots"]["gol"][1]["id"], "p1");

        for id in ["p3", "p4"] {
            send(&app, "POST", "/api/squad/gol/candidates", Some(json!({"playerId": id}))).await;
        }
        let (status, _) = send(&app, "POST", "/api/squad/gol/candidates", Some(json!({"playerId": "p5"}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_first_user_is_admin_second_pending() {
        let (app, _dir) = app();

        let (status, first) = send(&app, "POST", "/api/users/register", Some(registration("Ana"))).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(first["role"], "admin");
        assert_eq!(first["status"], "approved");
        assert!(first.get("passwordHash").is_none());

        let (_, second) = send(&app, "POST", "/api/users/register", Some(registration("Bia"))).await;
        assert_eq!(second["role"], "scout");
        assert_eq!(second["status"], "pending");

        assert_eq!(log_in(&app, "bia.silva").await, StatusCode::FORBIDDEN);

        let uri = format!("/api/users/{}/approve", second["id"].as_str().unwrap());
        let (status, _) = send(&app, "POST", &uri, None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        log_in(&app, "ana.silva").await;
        let (status, _) = send(&app, "POST", &uri, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(log_in(&app, "bia.silva").await, StatusCode::OK);

        let (_, dashboard) = send(&app, "GET", "/api/dashboard", None).await;
        assert_eq!(dashboard["session"]["username"], "bia.silva");
    }

    #[tokio::test]
    async fn test_simultaneous_first_registrations_make_one_admin() {
        let (app, _dir) = app();

        let ((_, ana), (_, bia)) = tokio::join!(
            send(&app, "POST", "/api/users/register", Some(registration("Ana"))),
            send(&app, "POST", "/api/users/register", Some(registration("Bia"))),
        );

        let admins = [ana, bia].iter().filter(|user| user["role"] == "admin").count();
        assert_eq!(admins, 1);
    }

    #[tokio::test]
    async fn test_squad_requires_sign_in() {
        let (app, _dir) = app();

        let (status, _) = send(&app, "POST", "/api/squad/gol/candidates", Some(json!({"playerId": "p1"}))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = send(&app, "GET", "/api/squad", None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_each_viewer_edits_only_their_own_squad() {
        let (app, _dir) = app();
        send(&app, "POST", "/api/players", Some(player("p1", "Ana", "GOL", "2008-01-01"))).await;
        send(&app, "POST", "/api/users/register", Some(registration("Ana"))).await;
        let (_, bia) = send(&app, "POST", "/api/users/register", Some(registration("Bia"))).await;
        log_in(&app, "ana.silva").await;
        let uri = format!("/api/users/{}/approve", bia["id"].as_str().unwrap());
        send(&app, "POST", &uri, None).await;

        send(&app, "POST", "/api/squad/gol/candidates", Some(json!({"playerId": "p1"}))).await;
        let (_, ana_squad) = send(&app, "GET", "/api/squad", None).await;
        assert_eq!(ana_squad["slots"]["gol"][0]["id"], "p1");

        assert_eq!(log_in(&app, "bia.silva").await, StatusCode::OK);
        let (_, bia_squad) = send(&app, "GET", "/api/squad", None).await;
        assert_eq!(bia_squad["viewerId"], bia["id"]);
        assert_eq!(bia_squad["slots"], json!({}));

        send(&app, "POST", "/api/users/logout", None).await;
        let (status, _) = send(&app, "DELETE", "/api/squad/gol/candidates/p1", None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_modal_closes_refresh_guard() {
        let (app, _dir) = app();

        let (_, opened) = send(&app, "POST", "/api/dashboard/modal", Some(json!({"modal": "player_editor"}))).await;
        assert_eq!(opened["refreshAllowed"], false);

        let (_, closed) = send(&app, "POST", "/api/dashboard/modal", Some(json!({"modal": null}))).await;
        assert_eq!(closed["refreshAllowed"], true);

        let (_, moved) = send(&app, "POST", "/api/dashboard/view", Some(json!({"view": "schedule"}))).await;
        assert_eq!(moved["refreshAllowed"], false);
    }

    #[tokio::test]
    async fn test_unconfigured_store_degrades() {
        let mut state = AppState::new(
            AppConfig::new(),
            RemoteStore::unconfigured(ChangeFeed::new()),
            Arc::new(MemoryStore::new()),
        )
        .unwrap();
        state.registrar = Registrar::with_cost(4);
        let viewer = state
            .registrar
            .register(&serde_json::from_value(registration("Ana")).unwrap(), &[], chrono::Utc::now())
            .unwrap();
        state.dashboard.dispatch(Action::SignedIn(viewer));
        let app = create_router(Arc::new(state));

        let (status, body) = send(&app, "GET", "/api/players", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total"], 0);

        let (status, _) = send(&app, "POST", "/api/players", Some(player("p1", "Ana", "ATA", "2008-01-01"))).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

        // squads fall back to local storage
        let (status, _) = send(&app, "POST", "/api/squad/ata/candidates", Some(json!({"playerId": "p1"}))).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_report_without_key_names_remediation() {
        let (app, _dir) = app();
        send(&app, "POST", "/api/players", Some(player("p1", "Ana", "ATA", "2008-01-01"))).await;

        let (status, body) = send(&app, "POST", "/api/players/p1/report", None).await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert!(body["remediation"].as_str().unwrap().contains("API key"));
    }

    #[tokio::test]
    async fn test_games_view_carries_status() {
        let (app, _dir) = app();
        let kickoff = (chrono::Local::now() - chrono::Duration::hours(1)).naive_local();
        let game = json!({
            "id": "g1",
            "title": "Santos x Bahia",
            "kickoff": kickoff,
            "analystId": "u1"
        });
        send(&app, "POST", "/api/games", Some(game)).await;

        let (_, games) = send(&app, "GET", "/api/games?owner=u1", None).await;
        assert_eq!(games[0]["statusLabel"], "Em Andamento");

        let (_, others) = send(&app, "GET", "/api/games?owner=u2", None).await;
        assert_eq!(others, json!([]));
    }
}
