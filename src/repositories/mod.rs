pub(crate) mod academic_periods;
pub(crate) mod academic_weeks;
pub(crate) mod academic_years;
pub(crate) mod accounts;
pub(crate) mod class_transfers;
pub(crate) mod classes;
pub(crate) mod enrollments;
pub(crate) mod health;
pub(crate) mod invites;
pub(crate) mod profiles;
