//! Admin workspace view models and templates.

use askama::Template;

use crate::presentation::views::{FlashView, PagerView};

/// Chrome shared by every admin screen: who is signed in, under which role.
#[derive(Debug, Clone)]
pub struct AdminChrome {
    pub title: String,
    pub user_name: String,
    pub user_email: String,
    pub role_label: &'static str,
    pub flash: Option<FlashView>,
}

#[derive(Debug, Clone)]
pub struct AdminPostRowView {
    pub id: String,
    pub title: String,
    pub meta: String,
    pub created_label: String,
    pub edit_href: String,
    /// Absent for moderators: the control is not rendered at all.
    pub delete_href: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AdminPostListView {
    pub heading: &'static str,
    pub kind_key: &'static str,
    pub search: String,
    pub search_param: &'static str,
    pub rows: Vec<AdminPostRowView>,
    pub pager: PagerView,
    pub new_href: String,
    pub total: usize,
}

#[derive(Debug, Clone)]
pub struct AccountRowView {
    pub email: String,
    pub name: String,
    pub role_label: &'static str,
    /// Absent for the signed-in admin's own row.
    pub delete_href: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AccountsPanelView {
    pub accounts: Vec<AccountRowView>,
}

#[derive(Debug, Clone)]
pub struct ContactRowView {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub received_label: String,
}

#[derive(Debug, Clone)]
pub struct AuditRowView {
    pub actor: String,
    pub action: String,
    pub entity: String,
    pub when_label: String,
}

#[derive(Template)]
#[template(path = "admin/dashboard.html")]
pub struct AdminDashboardTemplate {
    pub chrome: AdminChrome,
    pub gallery: AdminPostListView,
    pub realty: AdminPostListView,
    pub accounts: Option<AccountsPanelView>,
    pub messages: Vec<ContactRowView>,
    pub audit: Vec<AuditRowView>,
    pub bulk_delete_enabled: bool,
}

#[derive(Debug, Clone)]
pub struct SelectOptionView {
    pub value: &'static str,
    pub label: &'static str,
    pub selected: bool,
}

#[derive(Debug, Clone)]
pub struct ExistingImageView {
    pub url: String,
    pub display_url: String,
}

#[derive(Debug, Clone)]
pub struct GalleryFormView {
    pub heading: String,
    pub action: String,
    pub submit_label: &'static str,
    pub title: String,
    pub description: String,
    pub categories: Vec<SelectOptionView>,
    pub existing_images: Vec<ExistingImageView>,
    pub error: Option<String>,
}

#[derive(Template)]
#[template(path = "admin/gallery_form.html")]
pub struct AdminGalleryFormTemplate {
    pub chrome: AdminChrome,
    pub form: GalleryFormView,
}

#[derive(Debug, Clone)]
pub struct BedroomRowView {
    pub name: String,
    pub sqm: String,
}

#[derive(Debug, Clone)]
pub struct RealtyFormView {
    pub heading: String,
    pub action: String,
    pub submit_label: &'static str,
    pub title: String,
    pub description: String,
    pub price: String,
    pub price_periods: Vec<SelectOptionView>,
    pub location: String,
    pub kinds: Vec<SelectOptionView>,
    pub categories: Vec<SelectOptionView>,
    pub living_room_sqm: String,
    pub kitchen_sqm: String,
    pub bedrooms: Vec<BedroomRowView>,
    pub existing_images: Vec<ExistingImageView>,
    pub error: Option<String>,
}

#[derive(Template)]
#[template(path = "admin/realty_form.html")]
pub struct AdminRealtyFormTemplate {
    pub chrome: AdminChrome,
    pub form: RealtyFormView,
}

#[derive(Template)]
#[template(path = "admin/confirm_delete.html")]
pub struct AdminConfirmDeleteTemplate {
    pub chrome: AdminChrome,
    pub heading: String,
    pub detail: String,
    pub action: String,
    pub cancel_href: String,
}

#[derive(Template)]
#[template(path = "admin/login.html")]
pub struct AdminLoginTemplate {
    pub email: String,
    pub error: Option<String>,
}
