// src/web/routes.rs
use crate::{
    state::AppState,
    web::{
        admin_content_handlers, admin_handlers, alumni_handlers, auth_handlers, directory_handlers, mw_admin,
        mw_auth, mw_profile, public_handlers,
    },
};
use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::services::ServeDir;

/// Room for multipart boundaries and headers around the image itself.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

pub fn create_router(app_state: AppState) -> Router {
    // axum caps bodies at 2 MB unless told otherwise; the avatar limit is configurable.
    let upload_limit = app_state.avatar_store.max_bytes() + MULTIPART_OVERHEAD;

    // --- Public routes ---
    let public_routes = Router::new()
        .route("/", get(public_handlers::index))
        .route("/login", get(auth_handlers::show_login_form).post(auth_handlers::handle_login))
        .route("/admin/login", get(auth_handlers::show_admin_login_form).post(auth_handlers::handle_admin_login))
        .route("/register", get(auth_handlers::show_register_form).post(auth_handlers::handle_register))
        .route("/verification", get(auth_handlers::show_verification))
        .route("/logout", get(auth_handlers::handle_logout))
        .route("/events", get(public_handlers::events))
        .route("/news", get(public_handlers::news));

    // --- Signed in, profile may be incomplete ---
    let profile_routes = Router::new()
        .route("/alumni/profile", get(alumni_handlers::show_profile).post(alumni_handlers::handle_profile_update))
        .route(
            "/alumni/profile/image",
            post(alumni_handlers::handle_profile_image).layer(DefaultBodyLimit::max(upload_limit)),
        );

    // --- Signed in with a complete profile (admins pass regardless) ---
    let complete_profile_routes = Router::new()
        .route("/alumni/dashboard", get(alumni_handlers::dashboard))
        .route("/alumni/directory", get(directory_handlers::directory))
        .route("/alumni/directory/departments", get(directory_handlers::departments))
        .route("/alumni/payments", get(alumni_handlers::show_payments).post(alumni_handlers::handle_payment))
        .route("/alumni/gallery", get(alumni_handlers::gallery))
        .route_layer(middleware::from_fn(mw_profile::require_complete_profile));

    // --- Admin only ---
    let admin_routes = Router::new()
        .route("/dashboard", get(admin_handlers::dashboard))
        .route("/panel", get(admin_handlers::panel))
        .route("/panel/alumni", get(admin_handlers::list_alumni).post(admin_handlers::create_alumni))
        .route("/panel/alumni/{id}", get(admin_handlers::edit_alumni).post(admin_handlers::update_alumni))
        .route(
            "/panel/alumni/{id}/delete",
            get(admin_handlers::confirm_delete_alumni).post(admin_handlers::delete_alumni),
        )
        .route(
            "/panel/events",
            get(admin_content_handlers::list_events).post(admin_content_handlers::create_event),
        )
        .route(
            "/panel/events/{id}",
            get(admin_content_handlers::edit_event).post(admin_content_handlers::update_event),
        )
        .route(
            "/panel/events/{id}/delete",
            get(admin_content_handlers::confirm_delete_event).post(admin_content_handlers::delete_event),
        )
        .route("/panel/news", get(admin_content_handlers::list_news).post(admin_content_handlers::create_news))
        .route(
            "/panel/news/{id}",
            get(admin_content_handlers::edit_news).post(admin_content_handlers::update_news),
        )
        .route(
            "/panel/news/{id}/delete",
            get(admin_content_handlers::confirm_delete_news).post(admin_content_handlers::delete_news),
        )
        .route_layer(middleware::from_fn(mw_admin::require_admin));

    // require_auth runs first and provides the CurrentUser the inner layers read.
    let authenticated_routes = Router::new()
        .merge(profile_routes)
        .merge(complete_profile_routes)
        .nest("/admin", admin_routes)
        .route_layer(middleware::from_fn_with_state(app_state.clone(), mw_auth::require_auth));

    Router::new()
        .merge(public_routes)
        .merge(authenticated_routes)
        .nest_service("/uploads", ServeDir::new(app_state.avatar_store.dir()))
        .fallback(public_handlers::not_found)
        .with_state(app_state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::AdminSeed,
        db::test_pool,
        models::profile::{ProfileUpdate, Registration},
        services::{auth_service, profile_service, storage_service::AvatarStore},
        state::AuthEvents,
    };
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
        response::Response,
    };
    use tower::{ServiceBuilder, ServiceExt};
    use tower_cookies::{CookieManagerLayer, Key};
    use tower_sessions::SessionManagerLayer;
    use tower_sessions_sqlx_store::SqliteStore;
    use uuid::Uuid;

    const PASSWORD: &str = "secret1";
    const MB: usize = 1024 * 1024;

    /// The router with the same cookie and session layers `main` puts around it.
    async fn test_app(max_avatar_bytes: usize) -> (Router, AppState) {
        let pool = test_pool().await;
        let session_store = SqliteStore::new(pool.clone());
        session_store.migrate().await.unwrap();

        let upload_dir = std::env::temp_dir().join(format!("alumni-portal-routes-{}", Uuid::new_v4().simple()));
        let state = AppState {
            db_pool: pool,
            avatar_store: AvatarStore::new(upload_dir, max_avatar_bytes),
            cookie_key: Key::from(&[42u8; 64][..]),
            auth_events: AuthEvents::default(),
        };
        let router = create_router(state.clone()).layer(
            ServiceBuilder::new()
                .layer(CookieManagerLayer::new())
                .layer(SessionManagerLayer::new(session_store).with_secure(false)),
        );
        (router, state)
    }

    async fn register(state: &AppState, email: &str) -> String {
        let registration = Registration {
            email: email.into(),
            password: PASSWORD.into(),
            first_name: "Amina".into(),
            last_name: "Ibrahim".into(),
            alumni_id: "FUD/16/001".into(),
            graduation_year: 2020,
        };
        auth_service::register(&state.db_pool, &registration).await.unwrap()
    }

    async fn complete_profile(state: &AppState, user_id: &str) {
        let update = ProfileUpdate {
            first_name: "Amina".into(),
            last_name: "Ibrahim".into(),
            phone: "08030000000".into(),
            address: None,
            city: None,
            state: None,
            alumni_id: "FUD/16/001".into(),
            graduation_year: 2020,
            faculty: "Faculty of Computing".into(),
            department: "Computer Science".into(),
        };
        profile_service::update_profile(&state.db_pool, user_id, &update).await.unwrap();
        profile_service::set_profile_image(&state.db_pool, user_id, "/uploads/amina.png").await.unwrap();
    }

    /// Signs in through `POST /login` and returns the session cookie pair.
    async fn sign_in(router: &Router, email: &str) -> String {
        let request = Request::post("/login")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(format!("email={}&password={PASSWORD}", urlencoding::encode(email))))
            .unwrap();
        let response = router.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "login for {email} did not redirect");
        response
            .headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .find(|v| v.starts_with("id="))
            .and_then(|v| v.split(';').next())
            .map(str::to_owned)
            .unwrap()
    }

    async fn get(router: &Router, path: &str, cookie: Option<&str>) -> Response {
        let mut request = Request::get(path);
        if let Some(cookie) = cookie {
            request = request.header(header::COOKIE, cookie);
        }
        router.clone().oneshot(request.body(Body::empty()).unwrap()).await.unwrap()
    }

    fn location(response: &Response) -> &str {
        response.headers().get(header::LOCATION).and_then(|v| v.to_str().ok()).unwrap_or("")
    }

    async fn assert_redirects(router: &Router, cookie: Option<&str>, paths: &[&str], target: &str) {
        for path in paths {
            let response = get(router, path, cookie).await;
            assert_eq!(response.status(), StatusCode::SEE_OTHER, "{path}");
            assert_eq!(location(&response), target, "{path}");
        }
    }

    async fn assert_renders(router: &Router, cookie: Option<&str>, paths: &[&str]) {
        for path in paths {
            assert_eq!(get(router, path, cookie).await.status(), StatusCode::OK, "{path}");
        }
    }

    #[tokio::test]
    async fn anonymous_visitors_only_reach_public_pages() {
        let (router, _) = test_app(500 * 1024).await;

        assert_renders(&router, None, &["/", "/login", "/admin/login", "/register", "/events", "/news"]).await;
        assert_redirects(
            &router,
            None,
            &[
                "/alumni/profile",
                "/alumni/dashboard",
                "/alumni/directory",
                "/alumni/directory/departments",
                "/alumni/payments",
                "/alumni/gallery",
                "/admin/dashboard",
                "/admin/panel",
                "/admin/panel/alumni",
                "/admin/panel/events",
                "/admin/panel/news",
            ],
            "/login",
        )
        .await;
        assert_eq!(get(&router, "/no/such/page", None).await.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn incomplete_alumni_are_held_on_the_profile_page() {
        let (router, state) = test_app(500 * 1024).await;
        register(&state, "new@example.com").await;
        let cookie = sign_in(&router, "new@example.com").await;

        assert_renders(&router, Some(&cookie), &["/alumni/profile"]).await;
        assert_redirects(
            &router,
            Some(&cookie),
            &["/alumni/dashboard", "/alumni/directory", "/alumni/payments", "/alumni/gallery"],
            "/alumni/profile",
        )
        .await;
    }

    #[tokio::test]
    async fn complete_alumni_reach_alumni_pages_but_not_admin_ones() {
        let (router, state) = test_app(500 * 1024).await;
        let id = register(&state, "done@example.com").await;
        complete_profile(&state, &id).await;
        let cookie = sign_in(&router, "done@example.com").await;

        assert_renders(
            &router,
            Some(&cookie),
            &["/alumni/profile", "/alumni/dashboard", "/alumni/directory", "/alumni/payments", "/alumni/gallery"],
        )
        .await;
        assert_redirects(
            &router,
            Some(&cookie),
            &["/admin/dashboard", "/admin/panel", "/admin/panel/alumni", "/admin/panel/events", "/admin/panel/news"],
            "/alumni/dashboard",
        )
        .await;
    }

    #[tokio::test]
    async fn admins_skip_the_profile_gate() {
        let (router, state) = test_app(500 * 1024).await;
        let seed = AdminSeed { email: "admin@example.com".into(), password: PASSWORD.into() };
        auth_service::seed_admin(&state.db_pool, &seed).await.unwrap();
        let cookie = sign_in(&router, "admin@example.com").await;

        assert_renders(
            &router,
            Some(&cookie),
            &[
                "/alumni/directory",
                "/alumni/dashboard",
                "/admin/dashboard",
                "/admin/panel",
                "/admin/panel/alumni",
                "/admin/panel/events",
                "/admin/panel/news",
            ],
        )
        .await;
    }

    fn avatar_upload(cookie: &str, image_len: usize) -> Request<Body> {
        let boundary = "alumni-portal-boundary";
        let mut body = format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"avatar\"; filename=\"me.png\"\r\n\
             Content-Type: image/png\r\n\r\n"
        )
        .into_bytes();
        let mut image = b"\x89PNG\r\n\x1a\n".to_vec();
        image.resize(image_len, 0);
        body.extend_from_slice(&image);
        body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

        Request::post("/alumni/profile/image")
            .header(header::COOKIE, cookie)
            .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={boundary}"))
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn avatar_limit_follows_the_configured_size() {
        let (router, state) = test_app(5 * MB).await;
        let id = register(&state, "big@example.com").await;
        let cookie = sign_in(&router, "big@example.com").await;

        // Above axum's 2 MB default, below the configured limit.
        let response = router.clone().oneshot(avatar_upload(&cookie, 3 * MB)).await.unwrap();
        assert_eq!(location(&response), "/alumni/profile");
        let stored = profile_service::find_profile(&state.db_pool, &id).await.unwrap().unwrap();
        let url = stored.profile_image_url.unwrap();
        assert!(url.starts_with("/uploads/"));

        // Over the configured limit: nothing replaces the stored image.
        let response = router.clone().oneshot(avatar_upload(&cookie, 6 * MB)).await.unwrap();
        assert_eq!(location(&response), "/alumni/profile");
        let after = profile_service::find_profile(&state.db_pool, &id).await.unwrap().unwrap();
        assert_eq!(after.profile_image_url.as_deref(), Some(url.as_str()));

        let _ = std::fs::remove_dir_all(state.avatar_store.dir());
    }
}
