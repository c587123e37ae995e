use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::core::time::{format_primitive, primitive_now_utc};
use crate::db::models::{Invite, InviteStatus};
use crate::db::types::UserRole;

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct InviteCreate {
    #[validate(email(message = "email must be a valid address"))]
    pub(crate) email: String,
    #[serde(alias = "fullName")]
    #[validate(length(min = 1, message = "full_name must not be empty"))]
    pub(crate) full_name: String,
    pub(crate) role: UserRole,
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct InviteAccept {
    #[validate(length(min = 1, message = "token must not be empty"))]
    pub(crate) token: String,
    pub(crate) password: String,
}

/// Admin view of an invite. The token itself only travels by mail.
#[derive(Debug, Serialize)]
pub(crate) struct InviteResponse {
    pub(crate) id: String,
    pub(crate) email: String,
    pub(crate) full_name: String,
    pub(crate) role: UserRole,
    pub(crate) status: InviteStatus,
    pub(crate) is_sent: bool,
    pub(crate) expires_at: String,
    pub(crate) used_at: Option<String>,
    pub(crate) created_at: String,
}

impl InviteResponse {
    pub(crate) fn from_db(invite: Invite) -> Self {
        Self {
            status: invite.status(primitive_now_utc()),
            id: invite.id,
            email: invite.email,
            full_name: invite.full_name,
            role: invite.role,
            is_sent: invite.is_sent,
            expires_at: format_primitive(invite.expires_at),
            used_at: invite.used_at.map(format_primitive),
            created_at: format_primitive(invite.created_at),
        }
    }
}

/// What the acceptance page shows before the password is chosen.
#[derive(Debug, Serialize)]
pub(crate) struct InviteInfoResponse {
    pub(crate) email: String,
    pub(crate) full_name: String,
    pub(crate) role: UserRole,
    pub(crate) expires_at: String,
}

impl InviteInfoResponse {
    pub(crate) fn from_db(invite: Invite) -> Self {
        Self {
            email: invite.email,
            full_name: invite.full_name,
            role: invite.role,
            expires_at: format_primitive(invite.expires_at),
        }
    }
}
