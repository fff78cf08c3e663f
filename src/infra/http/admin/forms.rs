use serde::Deserialize;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub(crate) struct LoginForm {
    pub(crate) email: String,
    pub(crate) password: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AccountCreateForm {
    pub(crate) name: String,
    pub(crate) email: String,
    pub(crate) password: String,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub(crate) struct BulkDeleteForm {
    pub(crate) gallery_ids: Vec<Uuid>,
    pub(crate) realty_ids: Vec<Uuid>,
}
