use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::{Multipart, cookie::CookieJar};
use uuid::Uuid;

use crate::{
    application::{admin::gallery::DeleteOutcome, auth::CurrentUser},
    domain::drafts::RealtyDraft,
    domain::media::Attachment,
    domain::types::{ListingKind, PricePeriod, RealtyCategory},
    infra::media::public_url,
    presentation::{
        admin::views::{
            AdminConfirmDeleteTemplate, AdminRealtyFormTemplate, BedroomRowView,
            ExistingImageView, RealtyFormView, SelectOptionView,
        },
        views::render_template_response,
    },
};

use super::super::{AppState, flash};
use super::admin_chrome;
use super::multipart::{apply_to_realty, read_post_form};

fn form_view(
    draft: &RealtyDraft,
    action: String,
    heading: String,
    submit_label: &'static str,
    media_base: &str,
    error: Option<String>,
) -> RealtyFormView {
    let kinds = ListingKind::all()
        .iter()
        .map(|kind| SelectOptionView {
            value: kind.as_str(),
            label: kind.display_name(),
            selected: *kind == draft.kind,
        })
        .collect();
    let categories = RealtyCategory::all()
        .iter()
        .map(|category| SelectOptionView {
            value: category.as_str(),
            label: category.display_name(),
            selected: *category == draft.category,
        })
        .collect();
    let price_periods = [PricePeriod::Total, PricePeriod::PerMonth]
        .iter()
        .map(|period| SelectOptionView {
            value: period.as_str(),
            label: period.display_name(),
            selected: *period == draft.price_period,
        })
        .collect();

    RealtyFormView {
        heading,
        action,
        submit_label,
        title: draft.title.clone(),
        description: draft.description.clone(),
        price: draft.price.clone(),
        price_periods,
        location: draft.location.clone(),
        kinds,
        categories,
        living_room_sqm: draft.living_room_sqm.clone(),
        kitchen_sqm: draft.kitchen_sqm.clone(),
        bedrooms: draft
            .bedrooms()
            .iter()
            .map(|row| BedroomRowView {
                name: row.name.clone(),
                sqm: row.sqm.clone(),
            })
            .collect(),
        existing_images: draft
            .attachments
            .iter()
            .filter_map(|attachment| match attachment {
                Attachment::Stored(stored) => Some(ExistingImageView {
                    url: stored.url.clone(),
                    display_url: public_url(media_base, &stored.url),
                }),
                Attachment::Pending(_) => None,
            })
            .collect(),
        error,
    }
}

fn render_form(
    state: &AppState,
    user: &CurrentUser,
    draft: &RealtyDraft,
    action: String,
    heading: String,
    submit_label: &'static str,
    error: Option<String>,
    status: StatusCode,
) -> Response {
    let form = form_view(
        draft,
        action,
        heading,
        submit_label,
        &state.options.media_public_base,
        error,
    );
    render_template_response(
        AdminRealtyFormTemplate {
            chrome: admin_chrome(user, "Realty listing", None),
            form,
        },
        status,
    )
}

pub async fn new_form(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Response {
    let draft = RealtyDraft::load(None);
    render_form(
        &state,
        &user,
        &draft,
        "/admin/realty/create".to_string(),
        "Create realty listing".to_string(),
        "Publish listing",
        None,
        StatusCode::OK,
    )
}

pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    jar: CookieJar,
    multipart: Multipart,
) -> Response {
    let action = "/admin/realty/create".to_string();
    let heading = "Create realty listing".to_string();

    let data = match read_post_form(multipart).await {
        Ok(data) => data,
        Err(err) => {
            let draft = RealtyDraft::load(None);
            return render_form(
                &state,
                &user,
                &draft,
                action,
                heading,
                "Publish listing",
                Some(err.to_string()),
                StatusCode::BAD_REQUEST,
            );
        }
    };

    let mut draft = RealtyDraft::load(None);
    if let Err(message) = apply_to_realty(&mut draft, data) {
        return render_form(
            &state,
            &user,
            &draft,
            action,
            heading,
            "Publish listing",
            Some(message),
            StatusCode::UNPROCESSABLE_ENTITY,
        );
    }

    let submission = match draft.begin_submit() {
        Ok(submission) => submission,
        Err(err) => {
            return render_form(
                &state,
                &user,
                &draft,
                action,
                heading,
                "Publish listing",
                Some(err.to_string()),
                StatusCode::UNPROCESSABLE_ENTITY,
            );
        }
    };

    match state.realty.create(&user, submission).await {
        Ok(post) => {
            draft.complete();
            let jar = flash::flash_success(
                jar,
                format!(
                    "Listing \"{}\" created with {} image(s)",
                    post.title,
                    post.images.len()
                ),
            );
            (jar, Redirect::to("/admin")).into_response()
        }
        Err(err) => {
            let message = err.user_message();
            draft.fail(message.clone());
            render_form(
                &state,
                &user,
                &draft,
                action,
                heading,
                "Publish listing",
                Some(message),
                StatusCode::UNPROCESSABLE_ENTITY,
            )
        }
    }
}

pub async fn edit_form(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    jar: CookieJar,
    Path(id): Path<Uuid>,
) -> Response {
    match state.realty.load(id).await {
        Ok(Some(post)) => {
            let draft = RealtyDraft::load(Some(&post));
            render_form(
                &state,
                &user,
                &draft,
                format!("/admin/realty/{id}/edit"),
                format!("Edit \"{}\"", post.title),
                "Save changes",
                None,
                StatusCode::OK,
            )
        }
        Ok(None) => {
            let jar = flash::flash_warning(jar, "That listing no longer exists");
            (jar, Redirect::to("/admin")).into_response()
        }
        Err(err) => {
            let jar = flash::flash_error(jar, err.user_message());
            (jar, Redirect::to("/admin")).into_response()
        }
    }
}

pub async fn update(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    jar: CookieJar,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> Response {
    let post = match state.realty.load(id).await {
        Ok(Some(post)) => post,
        Ok(None) => {
            let jar = flash::flash_warning(jar, "That listing no longer exists");
            return (jar, Redirect::to("/admin")).into_response();
        }
        Err(err) => {
            let jar = flash::flash_error(jar, err.user_message());
            return (jar, Redirect::to("/admin")).into_response();
        }
    };

    let action = format!("/admin/realty/{id}/edit");
    let heading = format!("Edit \"{}\"", post.title);

    let data = match read_post_form(multipart).await {
        Ok(data) => data,
        Err(err) => {
            let draft = RealtyDraft::load(Some(&post));
            return render_form(
                &state,
                &user,
                &draft,
                action,
                heading,
                "Save changes",
                Some(err.to_string()),
                StatusCode::BAD_REQUEST,
            );
        }
    };

    let mut draft = RealtyDraft::load(Some(&post));
    if let Err(message) = apply_to_realty(&mut draft, data) {
        return render_form(
            &state,
            &user,
            &draft,
            action,
            heading,
            "Save changes",
            Some(message),
            StatusCode::UNPROCESSABLE_ENTITY,
        );
    }

    let submission = match draft.begin_submit() {
        Ok(submission) => submission,
        Err(err) => {
            return render_form(
                &state,
                &user,
                &draft,
                action,
                heading,
                "Save changes",
                Some(err.to_string()),
                StatusCode::UNPROCESSABLE_ENTITY,
            );
        }
    };
    let retained_images = submission.images.clone();

    match state.realty.update(&user, id, submission).await {
        Ok(post) => {
            draft.complete();
            let jar = flash::flash_success(jar, format!("Listing \"{}\" updated", post.title));
            (jar, Redirect::to("/admin")).into_response()
        }
        Err(err) => {
            let message = err.user_message();
            draft.fail(message.clone());
            draft.restore_images(retained_images);
            render_form(
                &state,
                &user,
                &draft,
                action,
                heading,
                "Save changes",
                Some(message),
                StatusCode::UNPROCESSABLE_ENTITY,
            )
        }
    }
}

pub async fn confirm_delete(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    jar: CookieJar,
    Path(id): Path<Uuid>,
) -> Response {
    match state.realty.load(id).await {
        Ok(Some(post)) => render_template_response(
            AdminConfirmDeleteTemplate {
                chrome: admin_chrome(&user, "Confirm deletion", None),
                heading: format!("Delete \"{}\"?", post.title),
                detail:
                    "The listing, its bedrooms and all of its images will be removed permanently."
                        .to_string(),
                action: format!("/admin/realty/{id}/delete"),
                cancel_href: "/admin".to_string(),
            },
            StatusCode::OK,
        ),
        Ok(None) => {
            let jar = flash::flash_warning(jar, "That listing no longer exists");
            (jar, Redirect::to("/admin")).into_response()
        }
        Err(err) => {
            let jar = flash::flash_error(jar, err.user_message());
            (jar, Redirect::to("/admin")).into_response()
        }
    }
}

pub async fn delete(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    jar: CookieJar,
    Path(id): Path<Uuid>,
) -> Response {
    let jar = match state.realty.delete(&user, id).await {
        Ok(DeleteOutcome::Deleted) => flash::flash_success(jar, "Listing deleted"),
        Ok(DeleteOutcome::AlreadyGone) => {
            flash::flash_warning(jar, "That listing was already removed")
        }
        Err(err) => flash::flash_error(jar, err.user_message()),
    };
    (jar, Redirect::to("/admin")).into_response()
}
