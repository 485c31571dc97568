use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use sqlx::mysql::MySqlRow;
use sqlx::types::Json;
use sqlx::{FromRow, Row};
use validator::{Validate, ValidationError, ValidationErrors};

use super::Record;
use super::patch::{FieldRegistry, Patchable};
use super::rules::{Violations, fits_digits, not_blank, rule};
use crate::repository::SqlRecord;
use crate::utils::db_utils::SqlValue;

static DEPARTMENT_CODE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^DEPT-[A-Z0-9]{4}$").expect("static regex should not panic"));

const MAX_BUDGET: Decimal = Decimal::from_parts(1_000_000, 0, 0, false, 0);

#[derive(Debug, Clone, Default, PartialEq, Validate)]
pub struct Department {
    pub id: Option<u64>,

    #[validate(
        custom = "not_blank",
        length(min = 3, max = 100, message = "Title must be between 3 and 100 characters")
    )]
    pub title: String,

    #[validate(length(min = 10, max = 500, message = "Description must be between 10 and 500 characters"))]
    pub description: Option<String>,

    #[validate(regex(path = "DEPARTMENT_CODE", message = "Department code must be in format DEPT-XXXX"))]
    pub department_code: Option<String>,

    #[validate(email(message = "Contact email must be a valid email address"))]
    pub contact_email: Option<String>,

    #[validate(url(message = "Website must be a valid URL"))]
    pub website: Option<String>,

    pub is_active: bool,
    pub is_verified: Option<bool>,
    pub is_archived: Option<bool>,

    #[validate(range(min = 1, max = 1000, message = "Employee count must be between 1 and 1000"))]
    pub employee_count: Option<i32>,

    pub budget: Option<Decimal>,
    pub quarterly_loss: Option<Decimal>,
    pub balance_adjustment: Option<Decimal>,
    pub revenue: Option<Decimal>,

    #[validate(range(min = 1, max = 10, message = "Priority must be between 1 and 10"))]
    pub priority: Option<i32>,

    pub established_date: Option<NaiveDate>,
    pub last_updated: Option<NaiveDateTime>,
    pub planned_closure_date: Option<NaiveDate>,
    pub next_review_date: Option<NaiveDate>,

    #[validate(length(min = 1, message = "Manager names list cannot be empty"))]
    pub manager_names: Option<Vec<String>>,

    #[validate(custom = "deletion_reason_absent")]
    pub deletion_reason: Option<String>,

    #[validate(credit_card(message = "Payment card number must be a valid credit card number"))]
    pub payment_card_number: Option<String>,

    pub created_at: Option<DateTime<Utc>>,
}

fn deletion_reason_absent(_: &str) -> Result<(), ValidationError> {
    Err(rule("null", "Deletion reason must be null for active departments"))
}

impl Record for Department {
    const ENTITY: &'static str = "Department";

    fn id(&self) -> Option<u64> {
        self.id
    }

    fn set_id(&mut self, id: Option<u64>) {
        self.id = id;
    }

    fn on_create(&mut self, now: DateTime<Utc>) {
        self.created_at.get_or_insert(now);
    }

    fn keep_immutable(&mut self, stored: &Self) {
        self.created_at = stored.created_at;
    }

    fn check_constraints(&self) -> Result<(), ValidationErrors> {
        let now = Utc::now();
        let today = now.date_naive();
        let mut v = Violations::from_derived(self.validate());

        v.check(
            "is_verified",
            self.is_verified != Some(false),
            "assert_true",
            "Department must be verified before activation",
        );
        v.check(
            "is_archived",
            self.is_archived != Some(true),
            "assert_false",
            "Department cannot be archived if active",
        );
        v.check(
            "budget",
            self.budget.is_none_or(|x| (Decimal::ZERO..=MAX_BUDGET).contains(&x)),
            "range",
            "Budget must be between 0.0 and 1,000,000.0",
        );
        v.check(
            "quarterly_loss",
            self.quarterly_loss.is_none_or(|x| x < Decimal::ZERO),
            "negative",
            "Loss amount must be negative",
        );
        v.check(
            "balance_adjustment",
            self.balance_adjustment.is_none_or(|x| x <= Decimal::ZERO),
            "negative_or_zero",
            "Balance adjustment must be negative or zero",
        );
        v.check(
            "revenue",
            self.revenue.is_none_or(|x| fits_digits(x, 6, 2)),
            "digits",
            "Revenue must have at most 6 integer digits and 2 decimal places",
        );
        v.check(
            "established_date",
            self.established_date.is_none_or(|d| d < today),
            "past",
            "Established date must be in the past",
        );
        v.check(
            "last_updated",
            self.last_updated.is_none_or(|t| t <= now.naive_utc()),
            "past_or_present",
            "Last updated date must be in the past or present",
        );
        v.check(
            "planned_closure_date",
            self.planned_closure_date.is_none_or(|d| d > today),
            "future",
            "Planned closure date must be in the future",
        );
        v.check(
            "next_review_date",
            self.next_review_date.is_none_or(|d| d >= today),
            "future_or_present",
            "Next review date must be in the future or present",
        );

        v.finish()
    }
}

static DEPARTMENT_FIELDS: Lazy<FieldRegistry<Department>> = Lazy::new(|| {
    crate::field_registry!("Department", Department,
        read_only: ["id", "createdAt"],
        fields: {
            "title" => title,
            "description" => description,
            "departmentCode" => department_code,
            "contactEmail" => contact_email,
            "website" => website,
            "isActive" => is_active,
            "isVerified" => is_verified,
            "isArchived" => is_archived,
            "employeeCount" => employee_count,
            "budget" => budget,
            "quarterlyLoss" => quarterly_loss,
            "balanceAdjustment" => balance_adjustment,
            "revenue" => revenue,
            "priority" => priority,
            "establishedDate" => established_date,
            "lastUpdated" => last_updated,
            "plannedClosureDate" => planned_closure_date,
            "nextReviewDate" => next_review_date,
            "managerNames" => manager_names,
            "deletionReason" => deletion_reason,
            "paymentCardNumber" => payment_card_number,
        }
    )
});

impl Patchable for Department {
    fn field_registry() -> &'static FieldRegistry<Self> {
        &DEPARTMENT_FIELDS
    }
}

impl SqlRecord for Department {
    const TABLE: &'static str = "departments";

    fn columns(&self) -> Vec<(&'static str, SqlValue)> {
        vec![
            ("title", self.title.clone().into()),
            ("description", self.description.clone().into()),
            ("department_code", self.department_code.clone().into()),
            ("contact_email", self.contact_email.clone().into()),
            ("website", self.website.clone().into()),
            ("is_active", self.is_active.into()),
            ("is_verified", self.is_verified.into()),
            ("is_archived", self.is_archived.into()),
            ("employee_count", self.employee_count.into()),
            ("budget", self.budget.into()),
            ("quarterly_loss", self.quarterly_loss.into()),
            ("balance_adjustment", self.balance_adjustment.into()),
            ("revenue", self.revenue.into()),
            ("priority", self.priority.into()),
            ("established_date", self.established_date.into()),
            ("last_updated", self.last_updated.into()),
            ("planned_closure_date", self.planned_closure_date.into()),
            ("next_review_date", self.next_review_date.into()),
            ("manager_names", self.manager_names.clone().into()),
            ("deletion_reason", self.deletion_reason.clone().into()),
            ("payment_card_number", self.payment_card_number.clone().into()),
            ("created_at", self.created_at.into()),
        ]
    }
}

impl<'r> FromRow<'r, MySqlRow> for Department {
    fn from_row(row: &'r MySqlRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: Some(row.try_get("id")?),
            title: row.try_get("title")?,
            description: row.try_get("description")?,
            department_code: row.try_get("department_code")?,
            contact_email: row.try_get("contact_email")?,
            website: row.try_get("website")?,
            is_active: row.try_get("is_active")?,
            is_verified: row.try_get("is_verified")?,
            is_archived: row.try_get("is_archived")?,
            employee_count: row.try_get("employee_count")?,
            budget: row.try_get("budget")?,
            quarterly_loss: row.try_get("quarterly_loss")?,
            balance_adjustment: row.try_get("balance_adjustment")?,
            revenue: row.try_get("revenue")?,
            priority: row.try_get("priority")?,
            established_date: row.try_get("established_date")?,
            last_updated: row.try_get("last_updated")?,
            planned_closure_date: row.try_get("planned_closure_date")?,
            next_review_date: row.try_get("next_review_date")?,
            manager_names: row
                .try_get::<Option<Json<Vec<String>>>, _>("manager_names")?
                .map(|Json(names)| names),
            deletion_reason: row.try_get("deletion_reason")?,
            payment_card_number: row.try_get("payment_card_number")?,
            created_at: row.try_get("created_at")?,
        })
    }
}
