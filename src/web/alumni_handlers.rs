// src/web/alumni_handlers.rs
use crate::{
    error::{AppError, AppResult},
    models::{
        gallery::GalleryQuery,
        non_empty,
        payment::{PaymentForm, MIN_AMOUNT, PAYMENT_TYPES},
        profile::{ProfileForm, ProfileState},
    },
    services::{access_service, event_service, gallery_service, news_service, payment_service, profile_service},
    state::{AppState, AuthEvent},
    templates::{self, AlumniDashboardPage, FacultyGroup, GalleryPage, PaymentsPage, ProfilePage, SelectOption},
    web::{
        flash::{self, Flash},
        mw_auth::CurrentUser,
        page::NavContext,
    },
};
use axum::{
    extract::{Extension, Form, Multipart, Query, State},
    response::{Html, Redirect},
};
use chrono::Local;
use tower_cookies::Cookies;

const PAYMENTS_PATH: &str = "/alumni/payments";
const AVATAR_FIELD: &str = "avatar";
const DASHBOARD_ITEMS: usize = 3;

/// Where to go after a profile save. Finishing the profile moves the user on to payments.
fn after_profile_save(before: &ProfileState, after: &ProfileState) -> &'static str {
    if !before.is_complete && after.is_complete {
        PAYMENTS_PATH
    } else {
        access_service::PROFILE_PATH
    }
}

/// Re-reads the profile after a write so the redirect reflects what was stored.
async fn state_after_save(state: &AppState, user_id: &str) -> AppResult<ProfileState> {
    let profile = profile_service::find_profile(&state.db_pool, user_id).await?;
    Ok(ProfileState::resolve(profile.as_ref()))
}

// GET /alumni/dashboard
pub async fn dashboard(
    nav: NavContext,
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> AppResult<Html<String>> {
    let events = event_service::list_events(&state.db_pool).await?;
    let (mut upcoming, _) = event_service::split_upcoming(events, Local::now().date_naive());
    upcoming.truncate(DASHBOARD_ITEMS);
    let mut news = news_service::list_news(&state.db_pool).await?;
    news.truncate(DASHBOARD_ITEMS);

    templates::render(&AlumniDashboardPage { nav, profile: user.profile, state: user.state, upcoming, news })
}

// GET /alumni/profile
pub async fn show_profile(
    nav: NavContext,
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> AppResult<Html<String>> {
    let faculty = user.profile.faculty.as_deref();
    let page = ProfilePage {
        faculties: SelectOption::faculties(faculty),
        department_groups: FacultyGroup::all(user.profile.department.as_deref(), faculty),
        max_avatar_kb: state.avatar_store.max_bytes() / 1024,
        nav,
        state: user.state,
        profile: user.profile,
    };
    templates::render(&page)
}

// POST /alumni/profile
pub async fn handle_profile_update(
    State(state): State<AppState>,
    cookies: Cookies,
    Extension(user): Extension<CurrentUser>,
    Form(form): Form<ProfileForm>,
) -> AppResult<Redirect> {
    let key = &state.cookie_key;
    let update = match form.validate() {
        Ok(update) => update,
        Err(msg) => {
            tracing::warn!("Profile update for {} rejected: {}", user.id(), msg);
            return Ok(flash::redirect(&cookies, key, Flash::error(msg), access_service::PROFILE_PATH));
        }
    };

    if let Err(e) = profile_service::update_profile(&state.db_pool, user.id(), &update).await {
        tracing::error!("Profile update for {} failed: {:?}", user.id(), e);
        return Ok(flash::redirect(
            &cookies,
            key,
            Flash::error("Failed to update profile."),
            access_service::PROFILE_PATH,
        ));
    }
    state.auth_events.publish(AuthEvent::ProfileUpdated { user_id: user.id().to_string() });

    let after = state_after_save(&state, user.id()).await?;
    let target = after_profile_save(&user.state, &after);
    let message = if target == PAYMENTS_PATH {
        "Profile completed! You can now pay your membership dues."
    } else {
        "Profile updated successfully."
    };
    Ok(flash::redirect(&cookies, key, Flash::success(message), target))
}

// POST /alumni/profile/image
pub async fn handle_profile_image(
    State(state): State<AppState>,
    cookies: Cookies,
    Extension(user): Extension<CurrentUser>,
    mut multipart: Multipart,
) -> AppResult<Redirect> {
    let key = &state.cookie_key;
    match store_uploaded_image(&state, user.id(), &mut multipart).await {
        Ok(()) => {
            state.auth_events.publish(AuthEvent::ProfileUpdated { user_id: user.id().to_string() });
            let after = state_after_save(&state, user.id()).await?;
            let target = after_profile_save(&user.state, &after);
            Ok(flash::redirect(&cookies, key, Flash::success("Profile image updated."), target))
        }
        Err(AppError::Validation(msg)) => {
            tracing::warn!("Image upload for {} rejected: {}", user.id(), msg);
            Ok(flash::redirect(&cookies, key, Flash::error(msg), access_service::PROFILE_PATH))
        }
        Err(e) => {
            tracing::error!("Image upload for {} failed: {:?}", user.id(), e);
            Ok(flash::redirect(
                &cookies,
                key,
                Flash::error("Failed to upload profile image."),
                access_service::PROFILE_PATH,
            ))
        }
    }
}

async fn store_uploaded_image(state: &AppState, user_id: &str, multipart: &mut Multipart) -> AppResult<()> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Could not read the upload: {e}")))?
    {
        if field.name() != Some(AVATAR_FIELD) {
            continue;
        }
        let content_type = field.content_type().map(str::to_owned);
        // Reject by type before buffering the body.
        state.avatar_store.validate(content_type.as_deref(), 1)?;
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Could not read the upload: {e}")))?;

        return attach_avatar(state, user_id, content_type.as_deref(), &bytes).await;
    }
    Err(AppError::Validation("Please choose an image to upload.".into()))
}

/// Writes the file, then points the profile at it. The replaced image is removed afterwards.
async fn attach_avatar(state: &AppState, user_id: &str, content_type: Option<&str>, bytes: &[u8]) -> AppResult<()> {
    let store = &state.avatar_store;
    let url = store.store_avatar(user_id, content_type, bytes).await?;

    let previous = match profile_service::set_profile_image(&state.db_pool, user_id, &url).await {
        Ok(previous) => previous,
        Err(e) => {
            // Nothing references the new file yet, so it goes too.
            if let Err(cleanup) = store.remove(&url).await {
                tracing::warn!("Orphaned upload {} for {} was not removed: {:?}", url, user_id, cleanup);
            }
            return Err(e);
        }
    };

    if let Some(old) = previous.filter(|old| *old != url) {
        if let Err(e) = store.remove(&old).await {
            tracing::warn!("Old profile image {} for {} was not removed: {:?}", old, user_id, e);
        }
    }
    Ok(())
}

// GET /alumni/payments
pub async fn show_payments(
    nav: NavContext,
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> AppResult<Html<String>> {
    let payments = payment_service::list_for_user(&state.db_pool, user.id()).await?;
    templates::render(&PaymentsPage {
        nav,
        payments,
        payment_types: SelectOption::list(PAYMENT_TYPES.iter().copied(), None),
        min_amount: MIN_AMOUNT,
    })
}

// POST /alumni/payments
pub async fn handle_payment(
    State(state): State<AppState>,
    cookies: Cookies,
    Extension(user): Extension<CurrentUser>,
    Form(form): Form<PaymentForm>,
) -> AppResult<Redirect> {
    let key = &state.cookie_key;
    let request = match form.validate() {
        Ok(request) => request,
        Err(msg) => return Ok(flash::redirect(&cookies, key, Flash::error(msg), PAYMENTS_PATH)),
    };

    let flash = match payment_service::initiate(&state.db_pool, user.id(), &request).await {
        Ok(payment) => Flash::success(format!(
            "Payment of {} for {} recorded as pending (ref {}).",
            payment.amount_text(),
            payment.payment_type,
            payment.reference
        )),
        Err(e) => {
            tracing::error!("Payment for {} failed: {:?}", user.id(), e);
            Flash::error("Failed to record payment.")
        }
    };
    Ok(flash::redirect(&cookies, key, flash, PAYMENTS_PATH))
}

// GET /alumni/gallery
pub async fn gallery(
    nav: NavContext,
    State(state): State<AppState>,
    Query(query): Query<GalleryQuery>,
) -> AppResult<Html<String>> {
    let images = gallery_service::list_images(&state.db_pool).await?;
    let category = non_empty(&query.category);
    let categories = gallery_service::categories(&images);
    let matching = gallery_service::search(&images, &query.q, category.as_deref())
        .into_iter()
        .cloned()
        .collect();

    templates::render(&GalleryPage {
        nav,
        images: matching,
        categories: SelectOption::list(categories.iter().map(String::as_str), category.as_deref()),
        q: query.q,
    })
}
