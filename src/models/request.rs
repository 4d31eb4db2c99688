//! Loan request model and the request lifecycle state machine

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Decode, Encode, FromRow, Postgres};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::tool::ToolSummary;
use super::user::UserSummary;

/// Request lifecycle status.
///
/// Wire and database values keep the original Spanish strings. The
/// transition table below is the only way a persisted status ever changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum RequestStatus {
    #[serde(rename = "pendiente")]
    Pending,
    #[serde(rename = "aprobada")]
    Approved,
    #[serde(rename = "rechazada")]
    Rejected,
    #[serde(rename = "devuelta")]
    Returned,
}

/// Which request timestamp a transition stamps
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StampColumn {
    /// `approved_or_rejected_at`, set exactly once on approval or rejection
    Decision,
    /// `returned_at`, set exactly once on return
    Return,
}

impl StampColumn {
    pub fn column_name(&self) -> &'static str {
        match self {
            StampColumn::Decision => "approved_or_rejected_at",
            StampColumn::Return => "returned_at",
        }
    }
}

/// One permitted edge of the lifecycle state machine
#[derive(Debug, Clone, Copy)]
pub struct Transition {
    pub from: RequestStatus,
    pub to: RequestStatus,
    /// Adjustment applied to the tool's on-loan counter (+1, 0 or -1)
    pub stock_delta: i32,
    pub stamp: StampColumn,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "pendiente",
            RequestStatus::Approved => "aprobada",
            RequestStatus::Rejected => "rechazada",
            RequestStatus::Returned => "devuelta",
        }
    }

    /// Look up the transition from `self` to `target`.
    ///
    /// Returns `None` for every pair outside the table:
    /// pendiente -> aprobada (+1), pendiente -> rechazada (0),
    /// aprobada -> devuelta (-1).
    pub fn transition_to(self, target: RequestStatus) -> Option<Transition> {
        let (stock_delta, stamp) = match (self, target) {
            (RequestStatus::Pending, RequestStatus::Approved) => (1, StampColumn::Decision),
            (RequestStatus::Pending, RequestStatus::Rejected) => (0, StampColumn::Decision),
            (RequestStatus::Approved, RequestStatus::Returned) => (-1, StampColumn::Return),
            _ => return None,
        };
        Some(Transition {
            from: self,
            to: target,
            stock_delta,
            stamp,
        })
    }
}

impl std::fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for RequestStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pendiente" => Ok(RequestStatus::Pending),
            "aprobada" => Ok(RequestStatus::Approved),
            "rechazada" => Ok(RequestStatus::Rejected),
            "devuelta" => Ok(RequestStatus::Returned),
            _ => Err(format!("Invalid request status: {}", s)),
        }
    }
}

// SQLx conversion: stored as TEXT
impl sqlx::Type<Postgres> for RequestStatus {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<Postgres>>::type_info()
    }
}

impl<'r> Decode<'r, Postgres> for RequestStatus {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s: String = Decode::<Postgres>::decode(value)?;
        s.parse().map_err(|e: String| e.into())
    }
}

impl Encode<'_, Postgres> for RequestStatus {
    fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
        let s: String = self.as_str().to_string();
        <String as Encode<Postgres>>::encode(s, buf)
    }
}

/// Loan request record from the database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct LoanRequest {
    pub id: i32,
    /// Opaque identity-provider user id of the requester
    pub user_id: String,
    pub tool_id: i32,
    pub justification: String,
    pub status: RequestStatus,
    pub created_at: DateTime<Utc>,
    pub approved_or_rejected_at: Option<DateTime<Utc>>,
    pub returned_at: Option<DateTime<Utc>>,
}

/// Loan request with the referenced tool (and, in admin listings, the
/// requester's directory info) embedded for display
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RequestDetails {
    pub id: i32,
    pub justification: String,
    pub status: RequestStatus,
    pub created_at: DateTime<Utc>,
    pub approved_or_rejected_at: Option<DateTime<Utc>>,
    pub returned_at: Option<DateTime<Utc>>,
    /// None when the referenced tool was deleted
    pub tool: Option<ToolSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserSummary>,
    #[serde(skip)]
    pub user_id: String,
}

/// Create request payload
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateRequest {
    /// Tool being asked for
    pub tool_id: i32,
    /// Why the tool is needed
    #[validate(length(min = 1, message = "La justificación es obligatoria."))]
    pub justification: String,
}

/// Admin listing filter
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct RequestQuery {
    /// Restrict to one lifecycle status
    pub status: Option<RequestStatus>,
    /// Case-insensitive search over justification and tool name
    pub search: Option<String>,
    /// Page number (default: 1)
    pub page: Option<i64>,
    /// Requests per page (default: 10)
    pub limit: Option<i64>,
}

/// Request counts grouped by status (count-by-group aggregation)
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct RequestStatusCounts {
    pub total: i64,
    pub pendiente: i64,
    pub aprobada: i64,
    pub rechazada: i64,
    pub devuelta: i64,
}

impl RequestStatusCounts {
    /// Fold one (status, count) group row into the summary
    pub fn record(&mut self, status: RequestStatus, count: i64) {
        self.total += count;
        match status {
            RequestStatus::Pending => self.pendiente += count,
            RequestStatus::Approved => self.aprobada += count,
            RequestStatus::Rejected => self.rechazada += count,
            RequestStatus::Returned => self.devuelta += count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use RequestStatus::*;

    #[test]
    fn approval_increments_and_stamps_the_decision() {
        let t = Pending.transition_to(Approved).unwrap();
        assert_eq!(t.stock_delta, 1);
        assert_eq!(t.stamp, StampColumn::Decision);
        assert_eq!(t.stamp.column_name(), "approved_or_rejected_at");
    }

    #[test]
    fn rejection_leaves_stock_untouched() {
        let t = Pending.transition_to(Rejected).unwrap();
        assert_eq!(t.stock_delta, 0);
        assert_eq!(t.stamp, StampColumn::Decision);
    }

    #[test]
    fn return_decrements_and_stamps_the_return() {
        let t = Approved.transition_to(Returned).unwrap();
        assert_eq!(t.stock_delta, -1);
        assert_eq!(t.stamp.column_name(), "returned_at");
    }

    #[test]
    fn every_other_pair_is_rejected() {
        let all = [Pending, Approved, Rejected, Returned];
        let allowed = [(Pending, Approved), (Pending, Rejected), (Approved, Returned)];
        for from in all {
            for to in all {
                let expected = allowed.contains(&(from, to));
                assert_eq!(
                    from.transition_to(to).is_some(),
                    expected,
                    "{} -> {}",
                    from,
                    to
                );
            }
        }
    }

    #[test]
    fn terminal_states_have_no_outgoing_edges() {
        let all = [Pending, Approved, Rejected, Returned];
        for to in all {
            assert!(Rejected.transition_to(to).is_none());
            assert!(Returned.transition_to(to).is_none());
        }
    }

    #[test]
    fn status_round_trips_through_the_spanish_wire_strings() {
        for status in [Pending, Approved, Rejected, Returned] {
            let parsed: RequestStatus = status.as_str().parse().unwrap();
            assert_eq!(parsed, status);
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{}\"", status.as_str()));
        }
        assert!("prestada".parse::<RequestStatus>().is_err());
    }

    #[test]
    fn status_counts_fold_group_rows() {
        let mut counts = RequestStatusCounts::default();
        counts.record(Pending, 5);
        counts.record(Approved, 3);
        counts.record(Returned, 2);
        assert_eq!(counts.total, 10);
        assert_eq!(counts.pendiente, 5);
        assert_eq!(counts.aprobada, 3);
        assert_eq!(counts.rechazada, 0);
        assert_eq!(counts.devuelta, 2);
    }
}
