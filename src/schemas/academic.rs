use serde::{Deserialize, Serialize};
use time::Date;
use validator::Validate;

use crate::core::time::{format_date, format_primitive};
use crate::db::models::{AcademicPeriod, AcademicWeek, AcademicYear};
use crate::schemas::deserialize_date;
use crate::services::academic_calendar::YearWithPeriods;

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct AcademicYearCreate {
    #[validate(length(min = 1, max = 64, message = "name must be 1-64 characters"))]
    pub(crate) name: String,
    #[serde(alias = "startDate", deserialize_with = "deserialize_date")]
    pub(crate) start_date: Date,
    #[serde(alias = "endDate", deserialize_with = "deserialize_date")]
    pub(crate) end_date: Date,
    #[serde(default, alias = "isCurrent")]
    pub(crate) is_current: bool,
}

#[derive(Debug, Serialize)]
pub(crate) struct AcademicYearResponse {
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) start_date: String,
    pub(crate) end_date: String,
    pub(crate) is_current: bool,
    pub(crate) created_at: String,
}

impl AcademicYearResponse {
    pub(crate) fn from_db(year: AcademicYear) -> Self {
        Self {
            id: year.id,
            name: year.name,
            start_date: format_date(year.start_date),
            end_date: format_date(year.end_date),
            is_current: year.is_current,
            created_at: format_primitive(year.created_at),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct AcademicYearDetailResponse {
    #[serde(flatten)]
    pub(crate) year: AcademicYearResponse,
    pub(crate) periods: Vec<AcademicPeriodResponse>,
}

impl AcademicYearDetailResponse {
    pub(crate) fn from_service(entry: YearWithPeriods) -> Self {
        Self {
            year: AcademicYearResponse::from_db(entry.year),
            periods: entry.periods.into_iter().map(AcademicPeriodResponse::from_db).collect(),
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct AcademicPeriodCreate {
    #[validate(length(min = 1, max = 64, message = "name must be 1-64 characters"))]
    pub(crate) name: String,
    #[serde(alias = "orderNum")]
    #[validate(range(min = 1, message = "order_num must be positive"))]
    pub(crate) order_num: i32,
    #[serde(alias = "startDate", deserialize_with = "deserialize_date")]
    pub(crate) start_date: Date,
    #[serde(alias = "endDate", deserialize_with = "deserialize_date")]
    pub(crate) end_date: Date,
    #[serde(default, alias = "isCurrent")]
    pub(crate) is_current: bool,
}

#[derive(Debug, Serialize)]
pub(crate) struct AcademicPeriodResponse {
    pub(crate) id: String,
    pub(crate) year_id: String,
    pub(crate) name: String,
    pub(crate) order_num: i32,
    pub(crate) start_date: String,
    pub(crate) end_date: String,
    pub(crate) is_current: bool,
}

impl AcademicPeriodResponse {
    pub(crate) fn from_db(period: AcademicPeriod) -> Self {
        Self {
            id: period.id,
            year_id: period.year_id,
            name: period.name,
            order_num: period.order_num,
            start_date: format_date(period.start_date),
            end_date: format_date(period.end_date),
            is_current: period.is_current,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct AcademicWeekCreate {
    #[serde(alias = "weekNum")]
    #[validate(range(min = 1, message = "week_num must be positive"))]
    pub(crate) week_num: i32,
    #[validate(length(min = 1, max = 64, message = "name must be 1-64 characters"))]
    pub(crate) name: String,
    #[serde(alias = "startDate", deserialize_with = "deserialize_date")]
    pub(crate) start_date: Date,
    #[serde(alias = "endDate", deserialize_with = "deserialize_date")]
    pub(crate) end_date: Date,
    #[serde(default, alias = "isHoliday")]
    pub(crate) is_holiday: bool,
    #[serde(default, alias = "isCurrent")]
    pub(crate) is_current: bool,
}

#[derive(Debug, Serialize)]
pub(crate) struct AcademicWeekResponse {
    pub(crate) id: String,
    pub(crate) period_id: String,
    pub(crate) week_num: i32,
    pub(crate) name: String,
    pub(crate) start_date: String,
    pub(crate) end_date: String,
    pub(crate) is_holiday: bool,
    pub(crate) is_current: bool,
}

impl AcademicWeekResponse {
    pub(crate) fn from_db(week: AcademicWeek) -> Self {
        Self {
            id: week.id,
            period_id: week.period_id,
            week_num: week.week_num,
            name: week.name,
            start_date: format_date(week.start_date),
            end_date: format_date(week.end_date),
            is_holiday: week.is_holiday,
            is_current: week.is_current,
        }
    }
}
