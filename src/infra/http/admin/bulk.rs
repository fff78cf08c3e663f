use axum::{
    extract::{Extension, State},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::{Form, cookie::CookieJar};

use crate::application::{admin::bulk::BulkSelection, auth::CurrentUser};

use super::super::{AppState, flash};
use super::forms::BulkDeleteForm;

pub async fn delete_selected(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    jar: CookieJar,
    Form(form): Form<BulkDeleteForm>,
) -> Response {
    let selection = BulkSelection {
        gallery: form.gallery_ids,
        realty: form.realty_ids,
    };

    let jar = match state.bulk.delete_selected(&user, selection).await {
        Ok(outcome) if outcome.all_succeeded() => {
            flash::flash_success(jar, format!("Deleted {} post(s)", outcome.deleted))
        }
        Ok(outcome) => {
            // Honest partial-failure report: name what did not go through.
            let failed: Vec<String> = outcome
                .failures
                .iter()
                .map(|failure| {
                    format!(
                        "{} {} ({})",
                        failure.kind.display_name(),
                        failure.id,
                        failure.message
                    )
                })
                .collect();
            flash::flash_error(
                jar,
                format!(
                    "Deleted {} post(s); {} failed: {}",
                    outcome.deleted,
                    outcome.failures.len(),
                    failed.join("; ")
                ),
            )
        }
        Err(err) => flash::flash_error(jar, err.user_message()),
    };

    (jar, Redirect::to("/admin")).into_response()
}
