use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::{Multipart, cookie::CookieJar};
use uuid::Uuid;

use crate::{
    application::{admin::gallery::DeleteOutcome, auth::CurrentUser},
    domain::drafts::GalleryDraft,
    domain::media::Attachment,
    domain::types::GalleryCategory,
    infra::media::public_url,
    presentation::{
        admin::views::{
            AdminConfirmDeleteTemplate, AdminGalleryFormTemplate, ExistingImageView,
            GalleryFormView, SelectOptionView,
        },
        views::render_template_response,
    },
};

use super::super::{AppState, flash};
use super::admin_chrome;
use super::multipart::{apply_to_gallery, read_post_form};

fn category_options(selected: GalleryCategory) -> Vec<SelectOptionView> {
    GalleryCategory::all()
        .iter()
        .map(|category| SelectOptionView {
            value: category.as_str(),
            label: category.display_name(),
            selected: *category == selected,
        })
        .collect()
}

fn existing_images(draft: &GalleryDraft, media_base: &str) -> Vec<ExistingImageView> {
    draft
        .attachments
        .iter()
        .filter_map(|attachment| match attachment {
            Attachment::Stored(stored) => Some(ExistingImageView {
                url: stored.url.clone(),
                display_url: public_url(media_base, &stored.url),
            }),
            Attachment::Pending(_) => None,
        })
        .collect()
}

fn form_view(
    draft: &GalleryDraft,
    action: String,
    heading: String,
    submit_label: &'static str,
    media_base: &str,
    error: Option<String>,
) -> GalleryFormView {
    GalleryFormView {
        heading,
        action,
        submit_label,
        title: draft.title.clone(),
        description: draft.description.clone(),
        categories: category_options(draft.category),
        existing_images: existing_images(draft, media_base),
        error,
    }
}

fn render_form(
    state: &AppState,
    user: &CurrentUser,
    draft: &GalleryDraft,
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
        AdminGalleryFormTemplate {
            chrome: admin_chrome(user, "Gallery post", None),
            form,
        },
        status,
    )
}

pub async fn new_form(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Response {
    let draft = GalleryDraft::load(None);
    render_form(
        &state,
        &user,
        &draft,
        "/admin/gallery/create".to_string(),
        "Create gallery post".to_string(),
        "Publish post",
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
    let action = "/admin/gallery/create".to_string();
    let heading = "Create gallery post".to_string();

    let data = match read_post_form(multipart).await {
        Ok(data) => data,
        Err(err) => {
            let draft = GalleryDraft::load(None);
            return render_form(
                &state,
                &user,
                &draft,
                action,
                heading,
                "Publish post",
                Some(err.to_string()),
                StatusCode::BAD_REQUEST,
            );
        }
    };

    let mut draft = GalleryDraft::load(None);
    if let Err(message) = apply_to_gallery(&mut draft, data) {
        return render_form(
            &state,
            &user,
            &draft,
            action,
            heading,
            "Publish post",
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
                "Publish post",
                Some(err.to_string()),
                StatusCode::UNPROCESSABLE_ENTITY,
            );
        }
    };

    match state.gallery.create(&user, submission).await {
        Ok(post) => {
            draft.complete();
            let jar = flash::flash_success(
                jar,
                format!(
                    "Gallery post \"{}\" created with {} image(s)",
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
                "Publish post",
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
    match state.gallery.load(id).await {
        Ok(Some(post)) => {
            let draft = GalleryDraft::load(Some(&post));
            render_form(
                &state,
                &user,
                &draft,
                format!("/admin/gallery/{id}/edit"),
                format!("Edit \"{}\"", post.title),
                "Save changes",
                None,
                StatusCode::OK,
            )
        }
        Ok(None) => {
            let jar = flash::flash_warning(jar, "That gallery post no longer exists");
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
    let post = match state.gallery.load(id).await {
        Ok(Some(post)) => post,
        Ok(None) => {
            let jar = flash::flash_warning(jar, "That gallery post no longer exists");
            return (jar, Redirect::to("/admin")).into_response();
        }
        Err(err) => {
            let jar = flash::flash_error(jar, err.user_message());
            return (jar, Redirect::to("/admin")).into_response();
        }
    };

    let action = format!("/admin/gallery/{id}/edit");
    let heading = format!("Edit \"{}\"", post.title);

    let data = match read_post_form(multipart).await {
        Ok(data) => data,
        Err(err) => {
            let draft = GalleryDraft::load(Some(&post));
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

    let mut draft = GalleryDraft::load(Some(&post));
    if let Err(message) = apply_to_gallery(&mut draft, data) {
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

    match state.gallery.update(&user, id, submission).await {
        Ok(post) => {
            draft.complete();
            let jar = flash::flash_success(jar, format!("Gallery post \"{}\" updated", post.title));
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
    match state.gallery.load(id).await {
        Ok(Some(post)) => render_template_response(
            AdminConfirmDeleteTemplate {
                chrome: admin_chrome(&user, "Confirm deletion", None),
                heading: format!("Delete \"{}\"?", post.title),
                detail: "The post and all of its images will be removed permanently.".to_string(),
                action: format!("/admin/gallery/{id}/delete"),
                cancel_href: "/admin".to_string(),
            },
            StatusCode::OK,
        ),
        Ok(None) => {
            let jar = flash::flash_warning(jar, "That gallery post no longer exists");
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
    let jar = match state.gallery.delete(&user, id).await {
        Ok(DeleteOutcome::Deleted) => flash::flash_success(jar, "Gallery post deleted"),
        Ok(DeleteOutcome::AlreadyGone) => {
            flash::flash_warning(jar, "That gallery post was already removed")
        }
        Err(err) => flash::flash_error(jar, err.user_message()),
    };
    (jar, Redirect::to("/admin")).into_response()
}
