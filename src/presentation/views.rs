//! Public-site view models and template rendering helpers.

use askama::{Error as AskamaError, Template};
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use thiserror::Error;

use crate::application::error::HttpError;

#[derive(Debug, Error)]
#[error("{public_message}")]
pub struct TemplateRenderError {
    pub(crate) source: &'static str,
    pub(crate) public_message: &'static str,
    #[source]
    pub(crate) error: AskamaError,
}

impl TemplateRenderError {
    pub fn new(source: &'static str, public_message: &'static str, error: AskamaError) -> Self {
        Self {
            source,
            public_message,
            error,
        }
    }
}

impl From<TemplateRenderError> for HttpError {
    fn from(err: TemplateRenderError) -> Self {
        let TemplateRenderError {
            source,
            public_message,
            error,
        } = err;

        HttpError::from_error(
            source,
            StatusCode::INTERNAL_SERVER_ERROR,
            public_message,
            &error,
        )
    }
}

pub fn render_template<T: Template>(template: T) -> Result<Html<String>, HttpError> {
    template.render().map(Html).map_err(|err| {
        TemplateRenderError::new(
            "presentation::views::render_template",
            "Template rendering failed",
            err,
        )
        .into()
    })
}

pub fn render_template_response<T: Template>(template: T, status: StatusCode) -> Response {
    match render_template(template) {
        Ok(html) => (status, html).into_response(),
        Err(err) => err.into_response(),
    }
}

/// A transient notification rendered into the page chrome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlashView {
    pub kind: String,
    pub text: String,
}

/// Chrome shared by every public page.
#[derive(Debug, Clone)]
pub struct PageChrome {
    pub title: String,
    pub flash: Option<FlashView>,
}

impl PageChrome {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            flash: None,
        }
    }

    pub fn with_flash(mut self, flash: Option<FlashView>) -> Self {
        self.flash = flash;
        self
    }
}

#[derive(Debug, Clone)]
pub struct FilterOptionView {
    pub key: &'static str,
    pub label: String,
    pub href: String,
    pub active: bool,
}

#[derive(Debug, Clone)]
pub struct PagerView {
    pub previous_href: Option<String>,
    pub next_href: Option<String>,
    pub label: String,
}

#[derive(Debug, Clone)]
pub struct ThumbnailView {
    pub url: String,
    pub lightbox_href: String,
    pub selected: bool,
}

#[derive(Debug, Clone)]
pub struct GalleryCardView {
    pub title: String,
    pub description: String,
    pub category_label: &'static str,
    pub primary_image: Option<String>,
    pub thumbnails: Vec<ThumbnailView>,
}

#[derive(Debug, Clone)]
pub struct LightboxView {
    pub title: String,
    pub image_url: String,
    pub position_label: String,
    pub previous_href: Option<String>,
    pub next_href: Option<String>,
    pub close_href: String,
}

#[derive(Debug, Clone)]
pub struct GalleryPageView {
    pub filters: Vec<FilterOptionView>,
    pub cards: Vec<GalleryCardView>,
    pub pager: PagerView,
    pub lightbox: Option<LightboxView>,
    pub warning: Option<String>,
}

#[derive(Debug, Clone)]
pub struct BedroomView {
    pub name: String,
    pub sqm_label: String,
}

#[derive(Debug, Clone)]
pub struct RealtyCardView {
    pub title: String,
    pub description: String,
    pub price_label: String,
    pub location: String,
    pub kind_label: &'static str,
    pub category_label: &'static str,
    pub area_labels: Vec<String>,
    pub bedrooms: Vec<BedroomView>,
    pub primary_image: Option<String>,
    pub thumbnails: Vec<ThumbnailView>,
}

#[derive(Debug, Clone)]
pub struct RealtyPageView {
    pub filters: Vec<FilterOptionView>,
    pub cards: Vec<RealtyCardView>,
    pub pager: PagerView,
    pub lightbox: Option<LightboxView>,
    pub warning: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ContactFormView {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub subject: String,
    pub message: String,
    pub error: Option<String>,
}

#[derive(Template)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub chrome: PageChrome,
}

#[derive(Template)]
#[template(path = "services.html")]
pub struct ServicesTemplate {
    pub chrome: PageChrome,
}

#[derive(Template)]
#[template(path = "about.html")]
pub struct AboutTemplate {
    pub chrome: PageChrome,
}

#[derive(Template)]
#[template(path = "contact.html")]
pub struct ContactTemplate {
    pub chrome: PageChrome,
    pub form: ContactFormView,
}

#[derive(Template)]
#[template(path = "gallery.html")]
pub struct GalleryTemplate {
    pub chrome: PageChrome,
    pub page: GalleryPageView,
}

#[derive(Template)]
#[template(path = "realty.html")]
pub struct RealtyTemplate {
    pub chrome: PageChrome,
    pub page: RealtyPageView,
}

#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorTemplate {
    pub chrome: PageChrome,
    pub heading: String,
    pub detail: String,
}

pub fn render_not_found_response() -> Response {
    let template = ErrorTemplate {
        chrome: PageChrome::new("Not Found"),
        heading: "Page not found".to_string(),
        detail: "The page you are looking for does not exist or has moved.".to_string(),
    };
    render_template_response(template, StatusCode::NOT_FOUND)
}
