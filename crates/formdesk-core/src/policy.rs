//! Row-level access policies
//!
//! The storage-backed query layer evaluates these for every row it returns
//! or writes. [`check_client_visibility`] repeats the form read rule on the
//! client side so a private or draft form gets a readable error instead of
//! an empty result.

use crate::error::{FormError, FormResult};
use crate::types::{FormRecord, UserId};

/// Identity a query runs as
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Caller {
    Anonymous,
    User(UserId),
}

impl Caller {
    pub fn user_id(&self) -> Option<UserId> {
        match self {
            Caller::Anonymous => None,
            Caller::User(id) => Some(*id),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, Caller::User(_))
    }

    pub fn owns(&self, form: &FormRecord) -> bool {
        self.user_id() == Some(form.owner_id)
    }
}

impl From<Option<UserId>> for Caller {
    fn from(user: Option<UserId>) -> Self {
        user.map_or(Caller::Anonymous, Caller::User)
    }
}

/// forms: owner, or anyone when live and public
pub fn can_read_form(caller: Caller, form: &FormRecord) -> bool {
    caller.owns(form) || form.is_publicly_accessible()
}

/// forms: authenticated caller inserting a row it owns
pub fn can_insert_form(caller: Caller, form: &FormRecord) -> bool {
    caller.is_authenticated() && caller.owns(form)
}

/// forms: update and delete are owner only
pub fn can_write_form(caller: Caller, form: &FormRecord) -> bool {
    caller.owns(form)
}

/// fields follow their parent form
pub fn can_read_fields(caller: Caller, form: &FormRecord) -> bool {
    can_read_form(caller, form)
}

pub fn can_write_fields(caller: Caller, form: &FormRecord) -> bool {
    can_write_form(caller, form)
}

/// responses: anyone may insert against a live, public form
pub fn can_insert_response(_caller: Caller, form: &FormRecord) -> bool {
    form.is_publicly_accessible()
}

/// responses: only the form owner reads them
pub fn can_read_responses(caller: Caller, form: &FormRecord) -> bool {
    caller.owns(form)
}

/// profiles: own row only, for both read and update
pub fn can_access_profile(caller: Caller, profile_id: UserId) -> bool {
    caller.user_id() == Some(profile_id)
}

/// Client-side mirror of the form read rule
pub fn check_client_visibility(caller: Caller, form: &FormRecord) -> FormResult<()> {
    if can_read_form(caller, form) {
        Ok(())
    } else {
        Err(FormError::FormUnavailable)
    }
}
