pub mod accounts;
pub mod bulk;
pub mod forms;
pub mod gallery;
pub mod login;
mod multipart;
pub mod realty;

use axum::{
    extract::{Extension, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use time::{OffsetDateTime, macros::format_description};
use tracing::warn;

use crate::{
    application::{
        auth::CurrentUser,
        listing,
        pagination::{PageParam, paginate},
    },
    domain::entities::{GalleryPostRecord, RealtyPostRecord},
    domain::types::format_price,
    presentation::{
        admin::views::{
            AccountRowView, AccountsPanelView, AdminChrome, AdminDashboardTemplate,
            AdminPostListView, AdminPostRowView, AuditRowView, ContactRowView,
        },
        views::{FlashView, PagerView, render_template_response},
    },
};

use super::{AppState, flash, query_string};

pub(crate) fn admin_chrome(
    user: &CurrentUser,
    title: &str,
    flash: Option<FlashView>,
) -> AdminChrome {
    AdminChrome {
        title: title.to_string(),
        user_name: user.account.name.clone(),
        user_email: user.account.email.clone(),
        role_label: user.account.role.display_name(),
        flash,
    }
}

pub(crate) fn format_date(at: OffsetDateTime) -> String {
    at.format(format_description!("[year]-[month]-[day]"))
        .unwrap_or_default()
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct DashboardQuery {
    gq: Option<String>,
    gpage: PageParam,
    rq: Option<String>,
    rpage: PageParam,
}

fn dashboard_href(gq: &str, gpage: usize, rq: &str, rpage: usize) -> String {
    let pairs = [
        ("gq", gq.to_string()),
        ("gpage", gpage.to_string()),
        ("rq", rq.to_string()),
        ("rpage", rpage.to_string()),
    ];
    format!("/admin?{}", query_string(&pairs))
}

fn gallery_rows(posts: &[&GalleryPostRecord], can_delete: bool) -> Vec<AdminPostRowView> {
    posts
        .iter()
        .map(|post| AdminPostRowView {
            id: post.id.to_string(),
            title: post.title.clone(),
            meta: format!(
                "{} · {} image(s)",
                post.category.display_name(),
                post.images.len()
            ),
            created_label: format_date(post.created_at),
            edit_href: format!("/admin/gallery/{}/edit", post.id),
            delete_href: can_delete.then(|| format!("/admin/gallery/{}/delete", post.id)),
        })
        .collect()
}

fn realty_rows(posts: &[&RealtyPostRecord], can_delete: bool) -> Vec<AdminPostRowView> {
    posts
        .iter()
        .map(|post| AdminPostRowView {
            id: post.id.to_string(),
            title: post.title.clone(),
            meta: format!(
                "{} · {}",
                format_price(post.price_cents, post.price_period),
                post.location
            ),
            created_label: format_date(post.created_at),
            edit_href: format!("/admin/realty/{}/edit", post.id),
            delete_href: can_delete.then(|| format!("/admin/realty/{}/delete", post.id)),
        })
        .collect()
}

pub async fn dashboard(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    jar: CookieJar,
    Query(query): Query<DashboardQuery>,
) -> Response {
    let (jar, mut flash_message) = flash::take_flash(jar);
    let can_delete = user.session.can_delete();

    let gq = query.gq.clone().unwrap_or_default();
    let rq = query.rq.clone().unwrap_or_default();
    let gpage = query.gpage.number();
    let rpage = query.rpage.number();
    let page_size = state.options.admin_page_size;

    let gallery_posts = match state.gallery.list().await {
        Ok(posts) => posts,
        Err(err) => {
            warn!(target = "mortar::http::admin", error = %err, "gallery list unavailable");
            flash_message.get_or_insert(FlashView {
                kind: "warning".to_string(),
                text: "Some content lists are temporarily unavailable.".to_string(),
            });
            Vec::new()
        }
    };
    let realty_posts = match state.realty.list().await {
        Ok(posts) => posts,
        Err(err) => {
            warn!(target = "mortar::http::admin", error = %err, "realty list unavailable");
            flash_message.get_or_insert(FlashView {
                kind: "warning".to_string(),
                text: "Some content lists are temporarily unavailable.".to_string(),
            });
            Vec::new()
        }
    };

    let gallery_matches = listing::search_gallery(&gallery_posts, &gq);
    let gallery_page = paginate(&gallery_matches, gpage, page_size);
    let gallery_view = AdminPostListView {
        heading: "Gallery posts",
        kind_key: "gallery",
        search: gq.clone(),
        search_param: "gq",
        rows: gallery_rows(&gallery_page.items, can_delete),
        pager: PagerView {
            previous_href: gallery_page
                .previous_page()
                .map(|page| dashboard_href(&gq, page, &rq, rpage)),
            next_href: gallery_page
                .next_page()
                .map(|page| dashboard_href(&gq, page, &rq, rpage)),
            label: format!("Page {} of {}", gallery_page.page, gallery_page.page_count),
        },
        new_href: "/admin/gallery/new".to_string(),
        total: gallery_page.total,
    };

    let realty_matches = listing::search_realty(&realty_posts, &rq);
    let realty_page = paginate(&realty_matches, rpage, page_size);
    let realty_view = AdminPostListView {
        heading: "Realty posts",
        kind_key: "realty",
        search: rq.clone(),
        search_param: "rq",
        rows: realty_rows(&realty_page.items, can_delete),
        pager: PagerView {
            previous_href: realty_page
                .previous_page()
                .map(|page| dashboard_href(&gq, gpage, &rq, page)),
            next_href: realty_page
                .next_page()
                .map(|page| dashboard_href(&gq, gpage, &rq, page)),
            label: format!("Page {} of {}", realty_page.page, realty_page.page_count),
        },
        new_href: "/admin/realty/new".to_string(),
        total: realty_page.total,
    };

    let accounts = if user.session.can_provision_accounts() {
        match state.accounts.list(&user).await {
            Ok(records) => Some(AccountsPanelView {
                accounts: records
                    .iter()
                    .map(|account| AccountRowView {
                        email: account.email.clone(),
                        name: account.name.clone(),
                        role_label: account.role.display_name(),
                        delete_href: (account.id != user.account.id)
                            .then(|| format!("/admin/accounts/{}/delete", account.id)),
                    })
                    .collect(),
            }),
            Err(err) => {
                warn!(target = "mortar::http::admin", error = %err, "accounts list unavailable");
                None
            }
        }
    } else {
        None
    };

    let messages = if user.session.is_admin() {
        match state.contact.recent_messages(5).await {
            Ok(messages) => messages
                .iter()
                .map(|message| ContactRowView {
                    name: message.name.clone(),
                    email: message.email.clone(),
                    subject: message.subject.clone(),
                    received_label: format_date(message.created_at),
                })
                .collect(),
            Err(err) => {
                warn!(target = "mortar::http::admin", error = %err, "contact messages unavailable");
                Vec::new()
            }
        }
    } else {
        Vec::new()
    };

    let audit = if user.session.is_admin() {
        match state.audit.recent(8).await {
            Ok(entries) => entries
                .iter()
                .map(|entry| AuditRowView {
                    actor: entry.actor.clone(),
                    action: entry.action.clone(),
                    entity: match entry.entity_id.as_deref() {
                        Some(id) => format!("{} {id}", entry.entity_type),
                        None => entry.entity_type.clone(),
                    },
                    when_label: format_date(entry.created_at),
                })
                .collect(),
            Err(err) => {
                warn!(target = "mortar::http::admin", error = %err, "audit trail unavailable");
                Vec::new()
            }
        }
    } else {
        Vec::new()
    };

    let template = AdminDashboardTemplate {
        chrome: admin_chrome(&user, "Dashboard", flash_message),
        gallery: gallery_view,
        realty: realty_view,
        accounts,
        messages,
        audit,
        bulk_delete_enabled: can_delete,
    };

    (jar, render_template_response(template, StatusCode::OK)).into_response()
}
