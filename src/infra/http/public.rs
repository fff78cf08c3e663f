//! Public site handlers: marketing pages, listing pages, contact form, and
//! stored media serving.

use axum::{
    body::Body,
    extract::{Form, Path, Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    application::{
        error::ErrorReport,
        listing::{self, GalleryFilter, Lightbox, RealtyFilter},
        pagination::{PageParam, Paginated, paginate},
        repos::CreateContactMessageParams,
    },
    domain::entities::{GalleryPostRecord, PostImageRecord, RealtyPostRecord},
    domain::types::{GalleryCategory, ListingKind, format_price},
    infra::media::public_url,
    presentation::views::{
        AboutTemplate, BedroomView, ContactFormView, ContactTemplate, FilterOptionView,
        GalleryCardView, GalleryPageView, GalleryTemplate, HomeTemplate, LightboxView, PageChrome,
        PagerView, RealtyCardView, RealtyPageView, RealtyTemplate, ServicesTemplate,
        ThumbnailView, render_not_found_response, render_template_response,
    },
};

use super::{AppState, flash, query_string};

pub async fn home(jar: CookieJar) -> impl IntoResponse {
    let (jar, flash) = flash::take_flash(jar);
    let chrome = PageChrome::new("Home").with_flash(flash);
    (
        jar,
        render_template_response(HomeTemplate { chrome }, StatusCode::OK),
    )
}

pub async fn services(jar: CookieJar) -> impl IntoResponse {
    let (jar, flash) = flash::take_flash(jar);
    let chrome = PageChrome::new("Services").with_flash(flash);
    (
        jar,
        render_template_response(ServicesTemplate { chrome }, StatusCode::OK),
    )
}

pub async fn about(jar: CookieJar) -> impl IntoResponse {
    let (jar, flash) = flash::take_flash(jar);
    let chrome = PageChrome::new("About").with_flash(flash);
    (
        jar,
        render_template_response(AboutTemplate { chrome }, StatusCode::OK),
    )
}

pub async fn fallback() -> Response {
    render_not_found_response()
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct ContactForm {
    name: String,
    email: String,
    phone: String,
    subject: String,
    message: String,
}

pub async fn contact(jar: CookieJar) -> impl IntoResponse {
    let (jar, flash) = flash::take_flash(jar);
    let chrome = PageChrome::new("Contact").with_flash(flash);
    (
        jar,
        render_template_response(
            ContactTemplate {
                chrome,
                form: ContactFormView::default(),
            },
            StatusCode::OK,
        ),
    )
}

pub async fn contact_submit(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<ContactForm>,
) -> Response {
    let invalid = |message: &str, form: &ContactForm| {
        let view = ContactFormView {
            name: form.name.clone(),
            email: form.email.clone(),
            phone: form.phone.clone(),
            subject: form.subject.clone(),
            message: form.message.clone(),
            error: Some(message.to_string()),
        };
        render_template_response(
            ContactTemplate {
                chrome: PageChrome::new("Contact"),
                form: view,
            },
            StatusCode::OK,
        )
    };

    if form.name.trim().is_empty()
        || form.subject.trim().is_empty()
        || form.message.trim().is_empty()
    {
        return invalid("Name, subject and message are all required", &form);
    }
    if !form.email.contains('@') {
        return invalid("Enter a valid email address", &form);
    }

    let phone = form.phone.trim();
    let params = CreateContactMessageParams {
        name: form.name.trim().to_string(),
        email: form.email.trim().to_string(),
        phone: (!phone.is_empty()).then(|| phone.to_string()),
        subject: form.subject.trim().to_string(),
        message: form.message.trim().to_string(),
    };

    match state.contact.insert_message(params).await {
        Ok(_) => {
            metrics::counter!("mortar_contact_messages_total").increment(1);
            let jar = flash::flash_success(
                jar,
                "Thanks for reaching out. We will get back to you soon.",
            );
            (jar, Redirect::to("/contact")).into_response()
        }
        Err(err) => {
            tracing::warn!(target = "mortar::http::contact", error = %err, "failed to store contact message");
            invalid("We could not record your message right now. Please try again.", &form)
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct ListingQuery {
    category: Option<String>,
    kind: Option<String>,
    page: PageParam,
    lightbox: Option<Uuid>,
    image: Option<usize>,
}

fn gallery_href(filter: GalleryFilter, page: usize, lightbox: Option<(Uuid, usize)>) -> String {
    let mut pairs = vec![
        ("category", filter.key().to_string()),
        ("page", page.to_string()),
    ];
    if let Some((id, index)) = lightbox {
        pairs.push(("lightbox", id.to_string()));
        pairs.push(("image", index.to_string()));
    }
    format!("/gallery?{}", query_string(&pairs))
}

fn realty_href(filter: RealtyFilter, page: usize, lightbox: Option<(Uuid, usize)>) -> String {
    let mut pairs = vec![
        ("kind", filter.key().to_string()),
        ("page", page.to_string()),
    ];
    if let Some((id, index)) = lightbox {
        pairs.push(("lightbox", id.to_string()));
        pairs.push(("image", index.to_string()));
    }
    format!("/realty?{}", query_string(&pairs))
}

fn pager_view(
    page: &Paginated<impl Clone>,
    href: impl Fn(usize) -> String,
) -> PagerView {
    PagerView {
        previous_href: page.previous_page().map(&href),
        next_href: page.next_page().map(&href),
        label: format!("Page {} of {}", page.page, page.page_count),
    }
}

struct OpenLightbox {
    post_id: Uuid,
    lightbox: Lightbox,
}

/// Resolve the lightbox query parameters against the filtered list. Posts
/// outside the current filter or indexes past the image count leave the
/// lightbox closed.
fn resolve_lightbox<'a, T, F>(
    query: &ListingQuery,
    posts: &[&'a T],
    images_of: F,
) -> Option<(&'a T, OpenLightbox)>
where
    F: Fn(&T) -> &[PostImageRecord],
    T: HasId,
{
    let target = query.lightbox?;
    let post = *posts.iter().find(|post| post.id() == target)?;
    let lightbox = Lightbox::open(images_of(post).len(), query.image.unwrap_or(0))?;
    Some((
        post,
        OpenLightbox {
            post_id: target,
            lightbox,
        },
    ))
}

trait HasId {
    fn id(&self) -> Uuid;
}

impl HasId for GalleryPostRecord {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl HasId for RealtyPostRecord {
    fn id(&self) -> Uuid {
        self.id
    }
}

fn thumbnails(
    images: &[PostImageRecord],
    media_base: &str,
    open: Option<&OpenLightbox>,
    post_id: Uuid,
    href: impl Fn(Uuid, usize) -> String,
) -> Vec<ThumbnailView> {
    images
        .iter()
        .enumerate()
        .map(|(index, image)| ThumbnailView {
            url: public_url(media_base, &image.url),
            lightbox_href: href(post_id, index),
            selected: open
                .map(|open| open.post_id == post_id && open.lightbox.index() == index)
                .unwrap_or(false),
        })
        .collect()
}

/// The card leads with its first image unless the open lightbox points into
/// this card, in which case the card tracks the viewed image.
fn primary_image(
    images: &[PostImageRecord],
    media_base: &str,
    open: Option<&OpenLightbox>,
    post_id: Uuid,
) -> Option<String> {
    let index = open
        .filter(|open| open.post_id == post_id)
        .map(|open| open.lightbox.index())
        .unwrap_or(0);
    images.get(index).map(|image| public_url(media_base, &image.url))
}

fn lightbox_view(
    title: &str,
    images: &[PostImageRecord],
    media_base: &str,
    open: &OpenLightbox,
    href: impl Fn(Uuid, usize) -> String,
    close_href: String,
) -> Option<LightboxView> {
    let image = images.get(open.lightbox.index())?;
    let navigation = open.lightbox.has_navigation();
    Some(LightboxView {
        title: title.to_string(),
        image_url: public_url(media_base, &image.url),
        position_label: open.lightbox.position_label(),
        previous_href: navigation
            .then(|| href(open.post_id, open.lightbox.previous().index())),
        next_href: navigation.then(|| href(open.post_id, open.lightbox.next().index())),
        close_href,
    })
}

pub async fn gallery(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(query): Query<ListingQuery>,
) -> Response {
    let (jar, flash) = flash::take_flash(jar);

    let (posts, warning) = match state.gallery_reader.list_posts().await {
        Ok(posts) => (posts, None),
        Err(err) => {
            tracing::warn!(target = "mortar::http::gallery", error = %err, "gallery listing unavailable");
            (
                Vec::new(),
                Some("Projects are temporarily unavailable. Please try again shortly.".to_string()),
            )
        }
    };

    let filter = GalleryFilter::from_param(query.category.as_deref());
    let filtered = listing::filter_gallery(&posts, filter);
    let page = paginate(&filtered, query.page.number(), state.options.public_page_size);

    let open = resolve_lightbox(&query, &filtered, |post: &GalleryPostRecord| &post.images);
    let media_base = state.options.media_public_base.as_str();
    let current_page = page.page;

    let filters = [
        (GalleryFilter::All, "All Projects"),
        (
            GalleryFilter::Category(GalleryCategory::Residential),
            "Residential",
        ),
        (
            GalleryFilter::Category(GalleryCategory::Commercial),
            "Commercial",
        ),
        (
            GalleryFilter::Category(GalleryCategory::Renovation),
            "Renovations",
        ),
    ]
    .into_iter()
    .map(|(option, label)| FilterOptionView {
        key: option.key(),
        label: label.to_string(),
        // Switching filters always restarts from the first page.
        href: gallery_href(option, 1, None),
        active: option == filter,
    })
    .collect();

    let lightbox_href =
        |id: Uuid, index: usize| gallery_href(filter, current_page, Some((id, index)));

    let cards = page
        .items
        .iter()
        .map(|post| GalleryCardView {
            title: post.title.clone(),
            description: post.description.clone(),
            category_label: post.category.display_name(),
            primary_image: primary_image(
                &post.images,
                media_base,
                open.as_ref().map(|(_, open)| open),
                post.id,
            ),
            thumbnails: thumbnails(
                &post.images,
                media_base,
                open.as_ref().map(|(_, open)| open),
                post.id,
                lightbox_href,
            ),
        })
        .collect();

    let lightbox = open.as_ref().and_then(|(post, open)| {
        lightbox_view(
            &post.title,
            &post.images,
            media_base,
            open,
            lightbox_href,
            gallery_href(filter, current_page, None),
        )
    });

    let view = GalleryPageView {
        filters,
        cards,
        pager: pager_view(&page, |target| gallery_href(filter, target, None)),
        lightbox,
        warning,
    };

    let chrome = PageChrome::new("Gallery").with_flash(flash);
    (
        jar,
        render_template_response(GalleryTemplate { chrome, page: view }, StatusCode::OK),
    )
        .into_response()
}

pub async fn realty(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(query): Query<ListingQuery>,
) -> Response {
    let (jar, flash) = flash::take_flash(jar);

    let (posts, warning) = match state.realty_reader.list_posts().await {
        Ok(posts) => (posts, None),
        Err(err) => {
            tracing::warn!(target = "mortar::http::realty", error = %err, "realty listing unavailable");
            (
                Vec::new(),
                Some("Listings are temporarily unavailable. Please try again shortly.".to_string()),
            )
        }
    };

    let filter = RealtyFilter::from_param(query.kind.as_deref());
    let filtered = listing::filter_realty(&posts, filter);
    let page = paginate(&filtered, query.page.number(), state.options.public_page_size);

    let open = resolve_lightbox(&query, &filtered, |post: &RealtyPostRecord| &post.images);
    let media_base = state.options.media_public_base.as_str();
    let current_page = page.page;

    let filters = [
        (RealtyFilter::All, "All Properties"),
        (RealtyFilter::Kind(ListingKind::Sale), "For Sale"),
        (RealtyFilter::Kind(ListingKind::Lease), "For Lease"),
    ]
    .into_iter()
    .map(|(option, label)| FilterOptionView {
        key: option.key(),
        label: label.to_string(),
        href: realty_href(option, 1, None),
        active: option == filter,
    })
    .collect();

    let lightbox_href =
        |id: Uuid, index: usize| realty_href(filter, current_page, Some((id, index)));

    let cards = page
        .items
        .iter()
        .map(|post| {
            let mut area_labels = Vec::new();
            if let Some(sqm) = post.living_room_sqm {
                area_labels.push(format!("Living room {sqm} m²"));
            }
            if let Some(sqm) = post.kitchen_sqm {
                area_labels.push(format!("Kitchen {sqm} m²"));
            }

            RealtyCardView {
                title: post.title.clone(),
                description: post.description.clone().unwrap_or_default(),
                price_label: format_price(post.price_cents, post.price_period),
                location: post.location.clone(),
                kind_label: post.kind.display_name(),
                category_label: post.category.display_name(),
                area_labels,
                bedrooms: post
                    .bedrooms
                    .iter()
                    .map(|bedroom| BedroomView {
                        name: bedroom.name.clone(),
                        sqm_label: format!("{} m²", bedroom.sqm),
                    })
                    .collect(),
                primary_image: primary_image(
                    &post.images,
                    media_base,
                    open.as_ref().map(|(_, open)| open),
                    post.id,
                ),
                thumbnails: thumbnails(
                    &post.images,
                    media_base,
                    open.as_ref().map(|(_, open)| open),
                    post.id,
                    lightbox_href,
                ),
            }
        })
        .collect();

    let lightbox = open.as_ref().and_then(|(post, open)| {
        lightbox_view(
            &post.title,
            &post.images,
            media_base,
            open,
            lightbox_href,
            realty_href(filter, current_page, None),
        )
    });

    let view = RealtyPageView {
        filters,
        cards,
        pager: pager_view(&page, |target| realty_href(filter, target, None)),
        lightbox,
        warning,
    };

    let chrome = PageChrome::new("Realty").with_flash(flash);
    (
        jar,
        render_template_response(RealtyTemplate { chrome, page: view }, StatusCode::OK),
    )
        .into_response()
}

pub async fn serve_media(State(state): State<AppState>, Path(path): Path<String>) -> Response {
    match state.media.read(&path).await {
        Ok(data) => {
            let mime = mime_guess::from_path(&path).first_or_octet_stream();
            Response::builder()
                .status(StatusCode::OK)
                .header(header::CONTENT_TYPE, mime.as_ref())
                .header(header::CACHE_CONTROL, "public, max-age=86400")
                .body(Body::from(data))
                .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response())
        }
        Err(err) => {
            let mut response = StatusCode::NOT_FOUND.into_response();
            ErrorReport::from_message(
                "infra::http::serve_media",
                StatusCode::NOT_FOUND,
                err.to_string(),
            )
            .attach(&mut response);
            response
        }
    }
}
