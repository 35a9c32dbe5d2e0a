//! Reservation engine.
//!
//! A reservation request is checked for every problem at once. If it passes,
//! the member's priority score and the book's queue state are computed and a
//! reservation is recorded. Queue position and the estimated availability
//! date are snapshots taken at creation; later loans, returns and
//! reservations do not move them.

use crate::{
    error::Result, store::Entity, BookId, Error, Library, MemberId, ReservationId, Timestamp,
};
use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Fixed until returns are tracked against due dates.
pub const RETURN_PUNCTUALITY: f64 = 0.9;

/// Ceiling on the loyalty score.
pub const MAX_LOYALTY_SCORE: f64 = 10.0;

/// Months over which the borrowing frequency is averaged.
const FREQUENCY_WINDOW: f64 = 12.0;

const MEMBERSHIP_TIER: &str = "gold";
const RESOLUTION_METHOD: &str = "priority_score";
const UPGRADE_OPTIONS: [&str; 2] = ["premium_reservation", "group_reservation"];
const MAX_ALTERNATIVE_BOOKS: usize = 3;

/// Longest wait a member may ask for.
pub const MAX_WAIT_DAYS_LIMIT: u32 = 365;

/// State of a reservation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReservationStatus {
    /// The book was on the shelf when reserved
    Confirmed,
    /// The member is waiting in the book's queue
    Queued,
    Expired,
}

/// Kind of reservation. Premium reservations earn a priority bonus.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReservationType {
    #[default]
    Standard,
    Premium,
}

impl ReservationType {
    fn parse(raw: &str) -> Option<Self> {
        match raw {
            "standard" => Some(ReservationType::Standard),
            "premium" => Some(ReservationType::Premium),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReservationDetails {
    pub created_at: Timestamp,
    pub expires_at: Timestamp,
    pub pickup_window_start: Timestamp,
    pub pickup_window_end: Timestamp,
    pub reservation_type: ReservationType,
    pub fee_paid: f64,
}

/// Queue statistics. Everything except `total_in_queue` is a fixed
/// placeholder; no queue history is recorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueAnalytics {
    pub total_in_queue: usize,
    pub avg_wait_time_days: f64,
    pub queue_movement_rate: String,
    pub cancellation_rate: f64,
}

impl QueueAnalytics {
    fn placeholder(total_in_queue: usize) -> Self {
        Self {
            total_in_queue,
            avg_wait_time_days: 5.2,
            queue_movement_rate: "moderate".to_string(),
            cancellation_rate: 0.15,
        }
    }
}

/// Inputs to the priority score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberPriorityFactors {
    pub borrowing_frequency: f64,
    /// Placeholder, see [`RETURN_PUNCTUALITY`]
    pub return_punctuality: f64,
    /// Placeholder, every member is gold
    pub membership_tier: String,
    pub special_circumstances: Vec<String>,
    pub loyalty_score: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledNotification {
    #[serde(rename = "type")]
    pub kind: String,
    pub scheduled_for: Timestamp,
}

/// How simultaneous requests would be settled. Nothing competes yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConflictResolution {
    pub simultaneous_requests: u32,
    pub resolution_method: String,
    pub competing_members: Vec<MemberId>,
}

/// A recorded reservation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reservation {
    pub reservation_id: ReservationId,
    pub member_id: MemberId,
    pub book_id: BookId,
    /// Title at the time of reserving
    pub book_title: String,
    pub reservation_status: ReservationStatus,
    /// 0 when confirmed, otherwise the 1-based place in the queue
    pub queue_position: usize,
    pub estimated_availability_date: Timestamp,
    pub priority_score: f64,
    pub reservation_details: ReservationDetails,
    pub queue_analytics: QueueAnalytics,
    pub member_priority_factors: MemberPriorityFactors,
    pub notifications_scheduled: Vec<ScheduledNotification>,
    pub conflict_resolution: ConflictResolution,
}

impl Reservation {
    pub fn is_confirmed(&self) -> bool {
        self.reservation_status == ReservationStatus::Confirmed
    }

    pub fn is_expired(&self) -> bool {
        self.reservation_status == ReservationStatus::Expired
    }
}

impl Entity for Reservation {
    type Key = ReservationId;

    fn key(&self) -> ReservationId {
        self.reservation_id.clone()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PaymentInfo {
    pub premium_fee: Option<f64>,
}

/// Request body for a reservation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReservationRequest {
    pub member_id: Option<MemberId>,
    pub book_id: Option<BookId>,
    pub reservation_type: Option<String>,
    /// RFC 3339 timestamp or `YYYY-MM-DD`
    pub preferred_pickup_date: Option<String>,
    pub max_wait_days: Option<u32>,
    #[serde(default)]
    pub special_requests: Map<String, Value>,
    #[serde(default)]
    pub payment_info: PaymentInfo,
    /// Accepted for compatibility; no notification channels exist yet.
    #[serde(default)]
    pub notification_preferences: Map<String, Value>,
    /// Accepted for compatibility; group reservations are not offered yet.
    #[serde(default)]
    pub group_reservation: Map<String, Value>,
}

impl ReservationRequest {
    pub fn new(member_id: MemberId, book_id: BookId) -> Self {
        Self {
            member_id: Some(member_id),
            book_id: Some(book_id),
            ..Self::default()
        }
    }
}

/// One reason a reservation was refused.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub field: String,
    pub error: String,
    pub details: String,
}

impl ValidationIssue {
    fn new(field: &str, error: &str, details: String) -> Self {
        Self {
            field: field.to_string(),
            error: error.to_string(),
            details,
        }
    }
}

/// Advisory alternatives offered with a refusal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestedAlternatives {
    pub alternative_books: Vec<BookId>,
    pub alternative_dates: Vec<Timestamp>,
    pub upgrade_options: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueImpact {
    pub current_queue_depth: usize,
    pub queue_position_if_accepted: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservationConflictDetails {
    pub validation_errors: Vec<ValidationIssue>,
    pub suggested_alternatives: SuggestedAlternatives,
    pub queue_impact: QueueImpact,
}

/// Everything wrong with a refused reservation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservationRejection {
    pub message: String,
    pub details: ReservationConflictDetails,
}

impl ReservationRejection {
    /// Check whether a given error code was reported.
    pub fn has_error(&self, code: &str) -> bool {
        self.details
            .validation_errors
            .iter()
            .any(|issue| issue.error == code)
    }
}

/// Loose truthiness, used for the free-form special requests map.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn parse_pickup_date(raw: &str) -> Option<Timestamp> {
    if let Ok(at) = DateTime::parse_from_rfc3339(raw) {
        return Some(at.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}

/// Pickup runs from the preferred date (or tomorrow) until two days after the
/// preferred date (or today).
fn pickup_window(preferred: Option<Timestamp>, now: Timestamp) -> Option<(Timestamp, Timestamp)> {
    let one_day = Duration::days(1);
    let start = match preferred {
        Some(at) => at,
        None => now.checked_add_signed(one_day)?,
    };
    let end = preferred.unwrap_or(now).checked_add_signed(one_day * 2)?;
    Some((start, end))
}

/// Format a reservation id from the creation day and a sequence number.
pub fn reservation_id(now: Timestamp, seq: u64) -> ReservationId {
    format!("RES-{}-{:03}", now.format("%Y%m%d"), seq)
}

/// Validated inputs to a reservation.
struct Eligible {
    member_id: MemberId,
    book_id: BookId,
    reservation_type: ReservationType,
    expires_at: Timestamp,
    pickup_window: (Timestamp, Timestamp),
}

impl Library {
    /// Reserve a book for a member.
    pub fn create_reservation(
        &mut self,
        request: ReservationRequest,
        now: Timestamp,
    ) -> Result<Reservation> {
        let eligible = self.check_eligibility(&request, now)?;
        let Eligible {
            member_id,
            book_id,
            reservation_type,
            expires_at,
            pickup_window: (pickup_window_start, pickup_window_end),
        } = eligible;

        let book = self
            .store
            .books
            .get(&book_id)
            .ok_or_else(|| Error::Inconsistent(format!("book {book_id} vanished")))?;
        let book_title = book.title.clone();
        let is_available = book.is_available;

        // Priority
        let borrowing_frequency =
            self.store.member_transactions(member_id).count() as f64 / FREQUENCY_WINDOW;
        let loyalty_score =
            (borrowing_frequency * 2.0 + RETURN_PUNCTUALITY * 8.0).min(MAX_LOYALTY_SCORE);
        let priority_score = match reservation_type {
            ReservationType::Premium => loyalty_score + self.policy.premium_bonus,
            ReservationType::Standard => loyalty_score,
        };

        // Queue
        let queue_depth = self.store.queue_depth(book_id);
        let (reservation_status, queue_position) = if is_available {
            (ReservationStatus::Confirmed, 0)
        } else {
            (ReservationStatus::Queued, queue_depth + 1)
        };
        let estimated_availability_date =
            now + Duration::days(self.policy.queue_slot_days * queue_depth as i64);

        let one_day = Duration::days(1);
        let reservation = Reservation {
            reservation_id: reservation_id(now, self.store.next_reservation_seq()),
            member_id,
            book_id,
            book_title,
            reservation_status,
            queue_position,
            estimated_availability_date,
            priority_score,
            reservation_details: ReservationDetails {
                created_at: now,
                expires_at,
                pickup_window_start,
                pickup_window_end,
                reservation_type,
                fee_paid: request.payment_info.premium_fee.unwrap_or(0.0),
            },
            queue_analytics: QueueAnalytics::placeholder(queue_depth + 1),
            member_priority_factors: MemberPriorityFactors {
                borrowing_frequency,
                return_punctuality: RETURN_PUNCTUALITY,
                membership_tier: MEMBERSHIP_TIER.to_string(),
                special_circumstances: request
                    .special_requests
                    .iter()
                    .filter(|(_, v)| is_truthy(v))
                    .map(|(k, _)| k.clone())
                    .collect(),
                loyalty_score,
            },
            notifications_scheduled: vec![
                ScheduledNotification {
                    kind: "queue_position_update".to_string(),
                    scheduled_for: now + one_day,
                },
                ScheduledNotification {
                    kind: "availability_alert".to_string(),
                    scheduled_for: estimated_availability_date,
                },
            ],
            conflict_resolution: ConflictResolution {
                simultaneous_requests: 0,
                resolution_method: RESOLUTION_METHOD.to_string(),
                competing_members: Vec::new(),
            },
        };

        self.store.reservations.insert(reservation.clone());
        Ok(reservation)
    }

    /// Collect every reason the request cannot be honored.
    fn check_eligibility(&self, request: &ReservationRequest, now: Timestamp) -> Result<Eligible> {
        let mut issues = Vec::new();
        let describe = |id: Option<i64>| id.map_or_else(|| "missing".to_string(), |id| id.to_string());

        let member = request.member_id.and_then(|id| self.store.members.get(&id));
        if member.is_none() {
            issues.push(ValidationIssue::new(
                "member_id",
                "member_not_found",
                format!("Member with id {} was not found", describe(request.member_id)),
            ));
        }

        let book = request.book_id.and_then(|id| self.store.books.get(&id));
        if book.is_none() {
            issues.push(ValidationIssue::new(
                "book_id",
                "book_not_found",
                format!("Book with id {} was not found", describe(request.book_id)),
            ));
        }

        if let Some(member_id) = request.member_id {
            let confirmed = self.store.confirmed_reservations(member_id);
            if confirmed >= self.policy.reservation_limit {
                issues.push(ValidationIssue::new(
                    "member_id",
                    "member_has_active_reservation",
                    format!(
                        "Member already has {confirmed} active reservations (limit: {})",
                        self.policy.reservation_limit
                    ),
                ));
            }
        }

        // A member cannot queue behind their own loan; the book has to come
        // back through the return workflow first.
        if let (Some(member), Some(book)) = (member, book) {
            let held_by_requester = self
                .store
                .active_transaction(member.member_id, book.book_id)
                .is_some();
            if !book.is_available && held_by_requester {
                issues.push(ValidationIssue::new(
                    "book_id",
                    "book_not_available_for_reservation",
                    format!(
                        "Book with id {} is on loan to this member and must be returned first",
                        book.book_id
                    ),
                ));
            }
        }

        let reservation_type = match request.reservation_type.as_deref() {
            None => Some(ReservationType::Standard),
            Some(raw) => {
                let parsed = ReservationType::parse(raw);
                if parsed.is_none() {
                    issues.push(ValidationIssue::new(
                        "reservation_type",
                        "invalid_reservation_type",
                        format!("Unknown reservation type '{raw}' (expected standard or premium)"),
                    ));
                }
                parsed
            }
        };

        let preferred_pickup = match request.preferred_pickup_date.as_deref() {
            None => None,
            Some(raw) => {
                let parsed = parse_pickup_date(raw);
                if parsed.is_none() {
                    issues.push(ValidationIssue::new(
                        "preferred_pickup_date",
                        "invalid_pickup_date",
                        format!("'{raw}' is not an RFC 3339 timestamp or YYYY-MM-DD date"),
                    ));
                }
                parsed
            }
        };

        let max_wait_days = request.max_wait_days.unwrap_or(self.policy.max_wait_days);
        let expires_at = if (1..=MAX_WAIT_DAYS_LIMIT).contains(&max_wait_days) {
            now.checked_add_signed(Duration::days(i64::from(max_wait_days)))
        } else {
            None
        };
        if expires_at.is_none() {
            issues.push(ValidationIssue::new(
                "max_wait_days",
                "invalid_max_wait_days",
                format!("max_wait_days must be between 1 and {MAX_WAIT_DAYS_LIMIT}, got {max_wait_days}"),
            ));
        }

        let pickup_window = pickup_window(preferred_pickup, now);
        if pickup_window.is_none() {
            issues.push(ValidationIssue::new(
                "preferred_pickup_date",
                "invalid_pickup_date",
                "Pickup window falls outside the supported date range".to_string(),
            ));
        }

        match (member, book, reservation_type, expires_at, pickup_window) {
            (Some(member), Some(book), Some(reservation_type), Some(expires_at), Some(pickup_window))
                if issues.is_empty() =>
            {
                Ok(Eligible {
                    member_id: member.member_id,
                    book_id: book.book_id,
                    reservation_type,
                    expires_at,
                    pickup_window,
                })
            }
            _ => Err(self.reject(request, issues, now)),
        }
    }

    fn reject(&self, request: &ReservationRequest, issues: Vec<ValidationIssue>, now: Timestamp) -> Error {
        let alternative_books = self
            .store
            .books
            .values()
            .filter(|b| b.is_available && Some(b.book_id) != request.book_id)
            .take(MAX_ALTERNATIVE_BOOKS)
            .map(|b| b.book_id)
            .collect();
        let current_queue_depth = request
            .book_id
            .map_or(0, |id| self.store.queue_depth(id));

        Error::ReservationConflict(Box::new(ReservationRejection {
            message: format!(
                "Reservation request failed {} validation check(s)",
                issues.len()
            ),
            details: ReservationConflictDetails {
                validation_errors: issues,
                suggested_alternatives: SuggestedAlternatives {
                    alternative_books,
                    alternative_dates: vec![now + Duration::days(1), now + Duration::days(2)],
                    upgrade_options: UPGRADE_OPTIONS.iter().map(|s| s.to_string()).collect(),
                },
                queue_impact: QueueImpact {
                    current_queue_depth,
                    queue_position_if_accepted: current_queue_depth + 1,
                },
            },
        }))
    }
}
