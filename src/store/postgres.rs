//! Postgres store.
//!
//! Runtime-checked `query_as` against row structs, converted into domain
//! models. Enum columns are stored as their snake_case names; contract line
//! items live in a JSONB `selections` column.

use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Datelike, NaiveDate, Utc, Weekday};
use rust_decimal::Decimal;
use sqlx::postgres::PgPoolOptions;
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::{
    AdditionalOption, AuditEntry, AvailabilityRow, Catalog, Contract, DiscountRule,
    EngagementSession, EventStaffBooking, Location, Package, Payment, PaymentSchedule, Product,
    SchedulePayment, StaffMember, StaffSlots,
};

use super::{Store, UnitOfWork};

/// Parse an enum column, treating unknown values as a data-integrity problem
fn parse_column<T: FromStr>(value: &str, column: &'static str) -> Result<T> {
    T::from_str(value).map_err(|_| {
        AppError::Configuration(format!("unexpected value '{}' in column {}", value, column))
    })
}

fn weekday_from_index(index: i16) -> Result<Weekday> {
    match index {
        0 => Ok(Weekday::Mon),
        1 => Ok(Weekday::Tue),
        2 => Ok(Weekday::Wed),
        3 => Ok(Weekday::Thu),
        4 => Ok(Weekday::Fri),
        5 => Ok(Weekday::Sat),
        6 => Ok(Weekday::Sun),
        other => Err(AppError::Configuration(format!(
            "unexpected weekday index {} in staff_members.off_days",
            other
        ))),
    }
}

#[derive(Debug, FromRow)]
struct PackageRow {
    id: Uuid,
    name: String,
    service_type: String,
    price: Decimal,
    deposit: Decimal,
}

#[derive(Debug, FromRow)]
struct EngagementRow {
    id: Uuid,
    name: String,
    price: Decimal,
    deposit: Decimal,
}

#[derive(Debug, FromRow)]
struct ProductRow {
    id: Uuid,
    name: String,
    unit_price: Decimal,
    taxable: bool,
    deposit: Option<Decimal>,
}

#[derive(Debug, FromRow)]
struct LocationRow {
    id: Uuid,
    name: String,
    tax_rate: Option<Decimal>,
}

#[derive(Debug, FromRow)]
struct DiscountRuleRow {
    id: Uuid,
    kind: String,
    version: i32,
    base_amount: Decimal,
    is_active: bool,
}

#[derive(Debug, FromRow)]
struct StaffMemberRow {
    id: Uuid,
    name: String,
    off_days: Vec<i16>,
}

impl TryFrom<StaffMemberRow> for StaffMember {
    type Error = AppError;

    fn try_from(row: StaffMemberRow) -> Result<Self> {
        Ok(StaffMember {
            id: row.id,
            name: row.name,
            off_days: row
                .off_days
                .into_iter()
                .map(weekday_from_index)
                .collect::<Result<Vec<_>>>()?,
        })
    }
}

#[derive(Debug, FromRow)]
struct ContractRow {
    id: Uuid,
    code: String,
    client_name: String,
    status: String,
    event_date: NaiveDate,
    contract_date: NaiveDate,
    location_id: Option<Uuid>,
    tax_rate: Option<Decimal>,
    selections: serde_json::Value,
    package_discount_version: i32,
    sunday_discount_version: i32,
    total_cost: Decimal,
    schedule_type: String,
    photographer1: Option<Uuid>,
    photographer2: Option<Uuid>,
    videographer1: Option<Uuid>,
    videographer2: Option<Uuid>,
    dj1: Option<Uuid>,
    dj2: Option<Uuid>,
    photobooth_operator1: Option<Uuid>,
    photobooth_operator2: Option<Uuid>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ContractRow> for Contract {
    type Error = AppError;

    fn try_from(row: ContractRow) -> Result<Self> {
        let selections = serde_json::from_value(row.selections).map_err(|e| {
            AppError::Configuration(format!("contract {} has malformed selections: {}", row.id, e))
        })?;

        Ok(Contract {
            id: row.id,
            code: row.code,
            client_name: row.client_name,
            status: parse_column(&row.status, "contracts.status")?,
            event_date: row.event_date,
            contract_date: row.contract_date,
            location_id: row.location_id,
            tax_rate: row.tax_rate,
            selections,
            package_discount_version: row.package_discount_version,
            sunday_discount_version: row.sunday_discount_version,
            total_cost: row.total_cost,
            schedule_type: parse_column(&row.schedule_type, "contracts.schedule_type")?,
            staffing: StaffSlots {
                photographer1: row.photographer1,
                photographer2: row.photographer2,
                videographer1: row.videographer1,
                videographer2: row.videographer2,
                dj1: row.dj1,
                dj2: row.dj2,
                photobooth_operator1: row.photobooth_operator1,
                photobooth_operator2: row.photobooth_operator2,
            },
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct PaymentRow {
    id: Uuid,
    contract_id: Uuid,
    amount: Decimal,
    method: String,
    purpose: Option<String>,
    memo: Option<String>,
    paid_at: DateTime<Utc>,
}

impl TryFrom<PaymentRow> for Payment {
    type Error = AppError;

    fn try_from(row: PaymentRow) -> Result<Self> {
        Ok(Payment {
            id: row.id,
            contract_id: row.contract_id,
            amount: row.amount,
            method: parse_column(&row.method, "payments.method")?,
            purpose: row
                .purpose
                .as_deref()
                .map(|p| parse_column(p, "payments.purpose"))
                .transpose()?,
            memo: row.memo,
            paid_at: row.paid_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct ScheduleRow {
    contract_id: Uuid,
    schedule_type: String,
    manually_edited: bool,
    generated_at: DateTime<Utc>,
}

#[derive(Debug, FromRow)]
struct InstallmentRow {
    id: Uuid,
    purpose: String,
    due_date: NaiveDate,
    amount: Decimal,
    paid: bool,
    amount_applied: Decimal,
}

#[derive(Debug, FromRow)]
struct BookingRow {
    id: Uuid,
    contract_id: Uuid,
    role: String,
    staff_id: Uuid,
    status: String,
    confirmed: bool,
    hours_booked: Decimal,
}

impl TryFrom<BookingRow> for EventStaffBooking {
    type Error = AppError;

    fn try_from(row: BookingRow) -> Result<Self> {
        Ok(EventStaffBooking {
            id: row.id,
            contract_id: row.contract_id,
            role: parse_column(&row.role, "event_staff_bookings.role")?,
            staff_id: row.staff_id,
            status: parse_column(&row.status, "event_staff_bookings.status")?,
            confirmed: row.confirmed,
            hours_booked: row.hours_booked,
        })
    }
}

#[derive(Debug, FromRow)]
struct AvailabilityDbRow {
    staff_id: Uuid,
    date: NaiveDate,
    marked_unavailable: bool,
    available: bool,
}

#[derive(Debug, FromRow)]
struct AuditRow {
    id: Uuid,
    contract_id: Uuid,
    action: String,
    actor: Option<String>,
    detail: serde_json::Value,
    recorded_at: DateTime<Utc>,
}

const CONTRACT_COLUMNS: &str = r#"
    id, code, client_name, status, event_date, contract_date,
    location_id, tax_rate, selections,
    package_discount_version, sunday_discount_version,
    total_cost, schedule_type,
    photographer1, photographer2, videographer1, videographer2,
    dj1, dj2, photobooth_operator1, photobooth_operator2,
    updated_at
"#;

/// Store backed by a Postgres connection pool
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a connection pool from a database URL.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        Ok(Self { pool })
    }

    pub async fn health_check(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| AppError::Configuration(format!("migration failed: {}", e)))
    }

    async fn upsert_contract(tx: &mut Transaction<'_, Postgres>, contract: &Contract) -> Result<()> {
        let selections = serde_json::to_value(&contract.selections)
            .map_err(|e| AppError::Internal(format!("serialize selections: {}", e)))?;
        let slots = &contract.staffing;

        sqlx::query(
            r#"
            INSERT INTO contracts (
                id, code, client_name, status, event_date, contract_date,
                location_id, tax_rate, selections,
                package_discount_version, sunday_discount_version,
                total_cost, schedule_type,
                photographer1, photographer2, videographer1, videographer2,
                dj1, dj2, photobooth_operator1, photobooth_operator2,
                updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11,
                    $12, $13, $14, $15, $16, $17, $18, $19, $20, $21, $22)
            ON CONFLICT (id) DO UPDATE SET
                client_name = EXCLUDED.client_name,
                status = EXCLUDED.status,
                event_date = EXCLUDED.event_date,
                location_id = EXCLUDED.location_id,
                tax_rate = EXCLUDED.tax_rate,
                selections = EXCLUDED.selections,
                package_discount_version = EXCLUDED.package_discount_version,
                sunday_discount_version = EXCLUDED.sunday_discount_version,
                total_cost = EXCLUDED.total_cost,
                schedule_type = EXCLUDED.schedule_type,
                photographer1 = EXCLUDED.photographer1,
                photographer2 = EXCLUDED.photographer2,
                videographer1 = EXCLUDED.videographer1,
                videographer2 = EXCLUDED.videographer2,
                dj1 = EXCLUDED.dj1,
                dj2 = EXCLUDED.dj2,
                photobooth_operator1 = EXCLUDED.photobooth_operator1,
                photobooth_operator2 = EXCLUDED.photobooth_operator2,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(contract.id)
        .bind(&contract.code)
        .bind(&contract.client_name)
        .bind(contract.status.as_ref())
        .bind(contract.event_date)
        .bind(contract.contract_date)
        .bind(contract.location_id)
        .bind(contract.tax_rate)
        .bind(selections)
        .bind(contract.package_discount_version)
        .bind(contract.sunday_discount_version)
        .bind(contract.total_cost)
        .bind(contract.schedule_type.as_ref())
        .bind(slots.photographer1)
        .bind(slots.photographer2)
        .bind(slots.videographer1)
        .bind(slots.videographer2)
        .bind(slots.dj1)
        .bind(slots.dj2)
        .bind(slots.photobooth_operator1)
        .bind(slots.photobooth_operator2)
        .bind(contract.updated_at)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }

    async fn replace_schedule(
        tx: &mut Transaction<'_, Postgres>,
        schedule: &PaymentSchedule,
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO payment_schedules (contract_id, schedule_type, manually_edited, generated_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (contract_id) DO UPDATE SET
                schedule_type = EXCLUDED.schedule_type,
                manually_edited = EXCLUDED.manually_edited,
                generated_at = EXCLUDED.generated_at
            "#,
        )
        .bind(schedule.contract_id)
        .bind(schedule.schedule_type.as_ref())
        .bind(schedule.manually_edited)
        .bind(schedule.generated_at)
        .execute(&mut **tx)
        .await?;

        sqlx::query("DELETE FROM schedule_payments WHERE contract_id = $1")
            .bind(schedule.contract_id)
            .execute(&mut **tx)
            .await?;

        for (position, installment) in schedule.installments.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO schedule_payments (
                    id, contract_id, position, purpose, due_date, amount, paid, amount_applied
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                "#,
            )
            .bind(installment.id)
            .bind(schedule.contract_id)
            .bind(position as i32)
            .bind(installment.purpose.as_ref())
            .bind(installment.due_date)
            .bind(installment.amount)
            .bind(installment.paid)
            .bind(installment.amount_applied)
            .execute(&mut **tx)
            .await?;
        }

        Ok(())
    }
}

#[async_trait]
impl Store for PgStore {
    async fn load_catalog(&self) -> Result<Catalog> {
        let mut catalog = Catalog::default();

        let packages = sqlx::query_as::<_, PackageRow>(
            "SELECT id, name, service_type, price, deposit FROM packages",
        )
        .fetch_all(&self.pool)
        .await?;
        for row in packages {
            catalog.add_package(Package {
                id: row.id,
                name: row.name,
                service_type: parse_column(&row.service_type, "packages.service_type")?,
                price: row.price,
                deposit: row.deposit,
            });
        }

        let options = sqlx::query_as::<_, PackageRow>(
            "SELECT id, name, service_type, price, deposit FROM additional_options",
        )
        .fetch_all(&self.pool)
        .await?;
        for row in options {
            catalog.add_option(AdditionalOption {
                id: row.id,
                name: row.name,
                service_type: parse_column(&row.service_type, "additional_options.service_type")?,
                price: row.price,
                deposit: row.deposit,
            });
        }

        let sessions = sqlx::query_as::<_, EngagementRow>(
            "SELECT id, name, price, deposit FROM engagement_sessions",
        )
        .fetch_all(&self.pool)
        .await?;
        for row in sessions {
            catalog.add_engagement_session(EngagementSession {
                id: row.id,
                name: row.name,
                price: row.price,
                deposit: row.deposit,
            });
        }

        let products = sqlx::query_as::<_, ProductRow>(
            "SELECT id, name, unit_price, taxable, deposit FROM products",
        )
        .fetch_all(&self.pool)
        .await?;
        for row in products {
            catalog.add_product(Product {
                id: row.id,
                name: row.name,
                unit_price: row.unit_price,
                taxable: row.taxable,
                deposit: row.deposit,
            });
        }

        let locations =
            sqlx::query_as::<_, LocationRow>("SELECT id, name, tax_rate FROM locations")
                .fetch_all(&self.pool)
                .await?;
        for row in locations {
            catalog.add_location(Location {
                id: row.id,
                name: row.name,
                tax_rate: row.tax_rate,
            });
        }

        let rules = sqlx::query_as::<_, DiscountRuleRow>(
            r#"
            SELECT id, kind, version, base_amount, is_active
            FROM discount_rules
            ORDER BY kind, version
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        for row in rules {
            catalog.add_discount_rule(DiscountRule {
                id: row.id,
                kind: parse_column(&row.kind, "discount_rules.kind")?,
                version: row.version,
                base_amount: row.base_amount,
                is_active: row.is_active,
            });
        }

        Ok(catalog)
    }

    async fn staff_member(&self, id: Uuid) -> Result<Option<StaffMember>> {
        sqlx::query_as::<_, StaffMemberRow>(
            "SELECT id, name, off_days FROM staff_members WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .map(StaffMember::try_from)
        .transpose()
    }

    async fn contract(&self, id: Uuid) -> Result<Option<Contract>> {
        let sql = format!("SELECT {} FROM contracts WHERE id = $1", CONTRACT_COLUMNS);
        sqlx::query_as::<_, ContractRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(Contract::try_from)
            .transpose()
    }

    async fn count_contracts_created_in(&self, year: i32, month: u32) -> Result<u32> {
        let start = NaiveDate::from_ymd_opt(year, month, 1)
            .ok_or_else(|| AppError::validation("contract_date", "invalid month"))?;
        let end = if start.month() == 12 {
            NaiveDate::from_ymd_opt(year + 1, 1, 1)
        } else {
            NaiveDate::from_ymd_opt(year, month + 1, 1)
        }
        .ok_or_else(|| AppError::validation("contract_date", "invalid month"))?;

        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM contracts
            WHERE contract_date >= $1 AND contract_date < $2
            "#,
        )
        .bind(start)
        .bind(end)
        .fetch_one(&self.pool)
        .await?;

        Ok(count as u32)
    }

    async fn booked_contracts_before(&self, date: NaiveDate) -> Result<Vec<Contract>> {
        let sql = format!(
            "SELECT {} FROM contracts WHERE status = 'booked' AND event_date < $1 ORDER BY event_date, code",
            CONTRACT_COLUMNS
        );
        sqlx::query_as::<_, ContractRow>(&sql)
            .bind(date)
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(Contract::try_from)
            .collect()
    }

    async fn payments_for(&self, contract_id: Uuid) -> Result<Vec<Payment>> {
        sqlx::query_as::<_, PaymentRow>(
            r#"
            SELECT id, contract_id, amount, method, purpose, memo, paid_at
            FROM payments
            WHERE contract_id = $1
            ORDER BY paid_at, id
            "#,
        )
        .bind(contract_id)
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(Payment::try_from)
        .collect()
    }

    async fn payment(&self, id: Uuid) -> Result<Option<Payment>> {
        sqlx::query_as::<_, PaymentRow>(
            r#"
            SELECT id, contract_id, amount, method, purpose, memo, paid_at
            FROM payments
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .map(Payment::try_from)
        .transpose()
    }

    async fn schedule_for(&self, contract_id: Uuid) -> Result<Option<PaymentSchedule>> {
        let Some(row) = sqlx::query_as::<_, ScheduleRow>(
            r#"
            SELECT contract_id, schedule_type, manually_edited, generated_at
            FROM payment_schedules
            WHERE contract_id = $1
            "#,
        )
        .bind(contract_id)
        .fetch_optional(&self.pool)
        .await?
        else {
            return Ok(None);
        };

        let installments = sqlx::query_as::<_, InstallmentRow>(
            r#"
            SELECT id, purpose, due_date, amount, paid, amount_applied
            FROM schedule_payments
            WHERE contract_id = $1
            ORDER BY position
            "#,
        )
        .bind(contract_id)
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(|i| -> Result<SchedulePayment> {
            Ok(SchedulePayment {
                id: i.id,
                purpose: parse_column(&i.purpose, "schedule_payments.purpose")?,
                due_date: i.due_date,
                amount: i.amount,
                paid: i.paid,
                amount_applied: i.amount_applied,
            })
        })
        .collect::<Result<Vec<_>>>()?;

        Ok(Some(PaymentSchedule {
            contract_id: row.contract_id,
            schedule_type: parse_column(&row.schedule_type, "payment_schedules.schedule_type")?,
            installments,
            manually_edited: row.manually_edited,
            generated_at: row.generated_at,
        }))
    }

    async fn bookings_for(&self, contract_id: Uuid) -> Result<Vec<EventStaffBooking>> {
        sqlx::query_as::<_, BookingRow>(
            r#"
            SELECT id, contract_id, role, staff_id, status, confirmed, hours_booked
            FROM event_staff_bookings
            WHERE contract_id = $1
            ORDER BY role
            "#,
        )
        .bind(contract_id)
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(EventStaffBooking::try_from)
        .collect()
    }

    async fn bookings_for_staff_on(
        &self,
        staff_id: Uuid,
        date: NaiveDate,
    ) -> Result<Vec<EventStaffBooking>> {
        sqlx::query_as::<_, BookingRow>(
            r#"
            SELECT b.id, b.contract_id, b.role, b.staff_id, b.status, b.confirmed, b.hours_booked
            FROM event_staff_bookings b
            JOIN contracts c ON c.id = b.contract_id
            WHERE b.staff_id = $1
              AND c.event_date = $2
            "#,
        )
        .bind(staff_id)
        .bind(date)
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(EventStaffBooking::try_from)
        .collect()
    }

    async fn availability(
        &self,
        staff_id: Uuid,
        date: NaiveDate,
    ) -> Result<Option<AvailabilityRow>> {
        let row = sqlx::query_as::<_, AvailabilityDbRow>(
            r#"
            SELECT staff_id, date, marked_unavailable, available
            FROM availability
            WHERE staff_id = $1 AND date = $2
            "#,
        )
        .bind(staff_id)
        .bind(date)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| AvailabilityRow {
            staff_id: r.staff_id,
            date: r.date,
            marked_unavailable: r.marked_unavailable,
            available: r.available,
        }))
    }

    async fn audit_entries(&self, contract_id: Uuid) -> Result<Vec<AuditEntry>> {
        sqlx::query_as::<_, AuditRow>(
            r#"
            SELECT id, contract_id, action, actor, detail, recorded_at
            FROM audit_log
            WHERE contract_id = $1
            ORDER BY recorded_at, id
            "#,
        )
        .bind(contract_id)
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(|row| -> Result<AuditEntry> {
            Ok(AuditEntry {
                id: row.id,
                contract_id: row.contract_id,
                action: parse_column(&row.action, "audit_log.action")?,
                actor: row.actor,
                detail: row.detail,
                recorded_at: row.recorded_at,
            })
        })
        .collect()
    }

    async fn apply(&self, work: UnitOfWork) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        for contract in &work.contracts {
            Self::upsert_contract(&mut tx, contract).await?;
        }

        for id in &work.bookings_deleted {
            sqlx::query("DELETE FROM event_staff_bookings WHERE id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await?;
        }

        for booking in &work.bookings_upserted {
            sqlx::query(
                r#"
                INSERT INTO event_staff_bookings (
                    id, contract_id, role, staff_id, status, confirmed, hours_booked
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                ON CONFLICT (id) DO UPDATE SET
                    staff_id = EXCLUDED.staff_id,
                    status = EXCLUDED.status,
                    confirmed = EXCLUDED.confirmed,
                    hours_booked = EXCLUDED.hours_booked
                "#,
            )
            .bind(booking.id)
            .bind(booking.contract_id)
            .bind(booking.role.as_ref())
            .bind(booking.staff_id)
            .bind(booking.status.as_ref())
            .bind(booking.confirmed)
            .bind(booking.hours_booked)
            .execute(&mut *tx)
            .await?;
        }

        for id in &work.payments_deleted {
            sqlx::query("DELETE FROM payments WHERE id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await?;
        }

        for payment in &work.payments_upserted {
            sqlx::query(
                r#"
                INSERT INTO payments (id, contract_id, amount, method, purpose, memo, paid_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                ON CONFLICT (id) DO UPDATE SET
                    amount = EXCLUDED.amount,
                    method = EXCLUDED.method,
                    purpose = EXCLUDED.purpose,
                    memo = EXCLUDED.memo
                "#,
            )
            .bind(payment.id)
            .bind(payment.contract_id)
            .bind(payment.amount)
            .bind(payment.method.as_ref())
            .bind(payment.purpose.map(|p| p.as_ref().to_string()))
            .bind(&payment.memo)
            .bind(payment.paid_at)
            .execute(&mut *tx)
            .await?;
        }

        for schedule in &work.schedules {
            Self::replace_schedule(&mut tx, schedule).await?;
        }

        for row in &work.availability {
            sqlx::query(
                r#"
                INSERT INTO availability (staff_id, date, marked_unavailable, available)
                VALUES ($1, $2, $3, $4)
                ON CONFLICT (staff_id, date) DO UPDATE SET
                    marked_unavailable = EXCLUDED.marked_unavailable,
                    available = EXCLUDED.available
                "#,
            )
            .bind(row.staff_id)
            .bind(row.date)
            .bind(row.marked_unavailable)
            .bind(row.available)
            .execute(&mut *tx)
            .await?;
        }

        for entry in &work.audit {
            sqlx::query(
                r#"
                INSERT INTO audit_log (id, contract_id, action, actor, detail, recorded_at)
                VALUES ($1, $2, $3, $4, $5, $6)
                "#,
            )
            .bind(entry.id)
            .bind(entry.contract_id)
            .bind(entry.action.as_ref())
            .bind(&entry.actor)
            .bind(&entry.detail)
            .bind(entry.recorded_at)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }
}
