use axum::{
    extract::{Extension, Form, Path, State},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use uuid::Uuid;

use crate::application::auth::CurrentUser;

use super::super::{AppState, flash};
use super::forms::AccountCreateForm;

pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    jar: CookieJar,
    Form(form): Form<AccountCreateForm>,
) -> Response {
    let jar = match state
        .accounts
        .create_moderator(&user, &form.name, &form.email, &form.password)
        .await
    {
        Ok(account) => flash::flash_success(
            jar,
            format!("Moderator account created for {}", account.email),
        ),
        Err(err) => flash::flash_error(jar, err.user_message()),
    };
    (jar, Redirect::to("/admin")).into_response()
}

pub async fn delete(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    jar: CookieJar,
    Path(id): Path<Uuid>,
) -> Response {
    let jar = match state.accounts.delete(&user, id).await {
        Ok(()) => flash::flash_success(jar, "Account deleted"),
        Err(err) => flash::flash_error(jar, err.user_message()),
    };
    (jar, Redirect::to("/admin")).into_response()
}
