use chrono::{NaiveDate, NaiveDateTime, Utc};
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

static EMPLOYEE_CODE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^EMP-[0-9]{6}$").expect("static regex should not panic"));

static PHONE_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+?[1-9][0-9]{1,14}$").expect("static regex should not panic"));

const MAX_SALARY: Decimal = Decimal::from_parts(1_000_000, 0, 0, false, 0);

#[derive(Debug, Clone, Default, PartialEq, Validate)]
pub struct Employee {
    pub id: Option<u64>,

    #[validate(
        custom = "not_blank",
        length(min = 2, max = 50, message = "Name must be between 2 and 50 characters")
    )]
    pub name: String,

    #[validate(length(min = 10, max = 500, message = "Bio must be between 10 and 500 characters"))]
    pub bio: Option<String>,

    /// Business code such as `EMP-000123`, distinct from the row id.
    #[validate(regex(path = "EMPLOYEE_CODE", message = "Employee ID must be in format EMP-XXXXXX"))]
    pub employee_id: Option<String>,

    #[validate(email(message = "Email must be a valid email address"))]
    pub email: Option<String>,

    #[validate(url(message = "LinkedIn profile must be a valid URL"))]
    pub linked_in_profile: Option<String>,

    #[validate(range(min = 18, max = 100, message = "Age must be between 18 and 100"))]
    pub age: Option<i32>,

    pub salary: Option<Decimal>,
    pub monthly_deduction: Option<Decimal>,
    pub account_balance: Option<Decimal>,
    pub bonus: Option<Decimal>,

    #[validate(range(min = 1, max = 5, message = "Performance rating must be between 1 and 5"))]
    pub performance_rating: Option<i32>,

    pub dob: Option<NaiveDate>,
    pub date_of_hire: Option<NaiveDate>,
    pub last_login: Option<NaiveDateTime>,
    pub contract_end_date: Option<NaiveDate>,
    pub next_review_date: Option<NaiveDate>,

    #[validate(length(min = 1, message = "Skills list cannot be empty"))]
    pub skills: Option<Vec<String>>,

    #[validate(custom = "termination_reason_absent")]
    pub termination_reason: Option<String>,

    #[validate(credit_card(message = "Credit card number must be a valid credit card number"))]
    pub credit_card_number: Option<String>,

    pub is_permanent: bool,
    pub is_verified: Option<bool>,
    pub is_on_leave: Option<bool>,

    #[validate(regex(path = "PHONE_NUMBER", message = "Phone number must be a valid international format"))]
    pub phone_number: Option<String>,

    pub address_list: Option<Vec<String>>,
}

fn termination_reason_absent(_: &str) -> Result<(), ValidationError> {
    Err(rule("null", "Termination reason must be null for active employees"))
}

impl Record for Employee {
    const ENTITY: &'static str = "Employee";

    fn id(&self) -> Option<u64> {
        self.id
    }

    fn set_id(&mut self, id: Option<u64>) {
        self.id = id;
    }

    fn check_constraints(&self) -> Result<(), ValidationErrors> {
        let now = Utc::now();
        let today = now.date_naive();
        let mut v = Violations::from_derived(self.validate());

        v.check(
            "salary",
            self.salary.is_none_or(|x| (Decimal::ZERO..=MAX_SALARY).contains(&x)),
            "range",
            "Salary must be between 0.0 and 1,000,000.0",
        );
        v.check(
            "monthly_deduction",
            self.monthly_deduction.is_none_or(|x| x < Decimal::ZERO),
            "negative",
            "Deduction amount must be negative",
        );
        v.check(
            "account_balance",
            self.account_balance.is_none_or(|x| x <= Decimal::ZERO),
            "negative_or_zero",
            "Balance must be negative or zero",
        );
        v.check(
            "bonus",
            self.bonus.is_none_or(|x| fits_digits(x, 8, 2)),
            "digits",
            "Bonus must have at most 8 integer digits and 2 decimal places",
        );
        v.check(
            "dob",
            self.dob.is_none_or(|d| d < today),
            "past",
            "Date of birth must be in the past",
        );
        v.check(
            "date_of_hire",
            self.date_of_hire.is_none_or(|d| d <= today),
            "past_or_present",
            "Date of hire must be in the past or present",
        );
        v.check(
            "last_login",
            self.last_login.is_none_or(|t| t <= now.naive_utc()),
            "past_or_present",
            "Last login must be in the past or present",
        );
        v.check(
            "contract_end_date",
            self.contract_end_date.is_none_or(|d| d > today),
            "future",
            "Contract end date must be in the future",
        );
        v.check(
            "next_review_date",
            self.next_review_date.is_none_or(|d| d >= today),
            "future_or_present",
            "Next review date must be in the future or present",
        );
        v.check(
            "is_verified",
            self.is_verified != Some(false),
            "assert_true",
            "Employee must be verified before activation",
        );
        v.check(
            "is_on_leave",
            self.is_on_leave != Some(true),
            "assert_false",
            "Employee cannot be on leave if active",
        );

        v.finish()
    }
}

static EMPLOYEE_FIELDS: Lazy<FieldRegistry<Employee>> = Lazy::new(|| {
    crate::field_registry!("Employee", Employee,
        read_only: ["id"],
        fields: {
            "name" => name,
            "bio" => bio,
            "employeeId" => employee_id,
            "email" => email,
            "linkedInProfile" => linked_in_profile,
            "age" => age,
            "salary" => salary,
            "monthlyDeduction" => monthly_deduction,
            "accountBalance" => account_balance,
            "bonus" => bonus,
            "performanceRating" => performance_rating,
            "dob" => dob,
            "dateOfHire" => date_of_hire,
            "lastLogin" => last_login,
            "contractEndDate" => contract_end_date,
            "nextReviewDate" => next_review_date,
            "skills" => skills,
            "terminationReason" => termination_reason,
            "creditCardNumber" => credit_card_number,
            "isPermanent" => is_permanent,
            "isVerified" => is_verified,
            "isOnLeave" => is_on_leave,
            "phoneNumber" => phone_number,
            "addressList" => address_list,
        }
    )
});

impl Patchable for Employee {
    fn field_registry() -> &'static FieldRegistry<Self> {
        &EMPLOYEE_FIELDS
    }
}

impl SqlRecord for Employee {
    const TABLE: &'static str = "employees";

    fn columns(&self) -> Vec<(&'static str, SqlValue)> {
        vec![
            ("name", self.name.clone().into()),
            ("bio", self.bio.clone().into()),
            ("employee_id", self.employee_id.clone().into()),
            ("email", self.email.clone().into()),
            ("linked_in_profile", self.linked_in_profile.clone().into()),
            ("age", self.age.into()),
            ("salary", self.salary.into()),
            ("monthly_deduction", self.monthly_deduction.into()),
            ("account_balance", self.account_balance.into()),
            ("bonus", self.bonus.into()),
            ("performance_rating", self.performance_rating.into()),
            ("dob", self.dob.into()),
            ("date_of_hire", self.date_of_hire.into()),
            ("last_login", self.last_login.into()),
            ("contract_end_date", self.contract_end_date.into()),
            ("next_review_date", self.next_review_date.into()),
            ("skills", self.skills.clone().into()),
            ("termination_reason", self.termination_reason.clone().into()),
            ("credit_card_number", self.credit_card_number.clone().into()),
            ("is_permanent", self.is_permanent.into()),
            ("is_verified", self.is_verified.into()),
            ("is_on_leave", self.is_on_leave.into()),
            ("phone_number", self.phone_number.clone().into()),
            ("address_list", self.address_list.clone().into()),
        ]
    }
}

impl<'r> FromRow<'r, MySqlRow> for Employee {
    fn from_row(row: &'r MySqlRow) -> Result<Self, sqlx::Error> {
        let list = |column: &str| -> Result<Option<Vec<String>>, sqlx::Error> {
            Ok(row
                .try_get::<Option<Json<Vec<String>>>, _>(column)?
                .map(|Json(items)| items))
        };

        Ok(Self {
            id: Some(row.try_get("id")?),
            name: row.try_get("name")?,
            bio: row.try_get("bio")?,
            employee_id: row.try_get("employee_id")?,
            email: row.try_get("email")?,
            linked_in_profile: row.try_get("linked_in_profile")?,
            age: row.try_get("age")?,
            salary: row.try_get("salary")?,
            monthly_deduction: row.try_get("monthly_deduction")?,
            account_balance: row.try_get("account_balance")?,
            bonus: row.try_get("bonus")?,
            performance_rating: row.try_get("performance_rating")?,
            dob: row.try_get("dob")?,
            date_of_hire: row.try_get("date_of_hire")?,
            last_login: row.try_get("last_login")?,
            contract_end_date: row.try_get("contract_end_date")?,
            next_review_date: row.try_get("next_review_date")?,
            skills: list("skills")?,
            termination_reason: row.try_get("termination_reason")?,
            credit_card_number: row.try_get("credit_card_number")?,
            is_permanent: row.try_get("is_permanent")?,
            is_verified: row.try_get("is_verified")?,
            is_on_leave: row.try_get("is_on_leave")?,
            phone_number: row.try_get("phone_number")?,
            address_list: list("address_list")?,
        })
    }
}
