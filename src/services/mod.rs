pub(crate) mod academic_calendar;
pub(crate) mod classes;
pub(crate) mod enrollment;
pub(crate) mod errors;
pub(crate) mod mailer;
pub(crate) mod provisioning;
pub(crate) mod usernames;
