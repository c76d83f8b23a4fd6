//! Credit-card billing-cycle advisor.
//!
//! Classifies "today" against a card's cutoff and payment days into one
//! timing state. Days are nominal day-of-month integers; distances that
//! cross a month boundary use the month length from [`CyclePolicy`]
//! (30 days unless configured otherwise).

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::RecordError;

/// Nominal day of any month, 1..=31. Not checked against real month lengths.
pub type DayOfMonth = i32;

/// Month length used for cross-month distances unless a policy says otherwise.
pub const NOMINAL_MONTH_DAYS: u32 = 30;

/// Days after cutoff (inclusive) that count as the optimal purchase window.
pub const OPTIMAL_WINDOW_DAYS: u32 = 7;

/// A payment due within this many days is flagged as imminent.
pub const PAYMENT_WARNING_DAYS: u32 = 5;

/// Cutoff/payment pair of a credit-card debt.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreditCardCycle {
    pub cutoff_day: DayOfMonth,
    pub payment_day: DayOfMonth,
}

impl CreditCardCycle {
    /// Build a cycle, rejecting days outside 1..=31.
    pub fn new(cutoff_day: DayOfMonth, payment_day: DayOfMonth) -> Result<Self, RecordError> {
        for (field, day) in [("cutoff_day", cutoff_day), ("payment_day", payment_day)] {
            if !(1..=31).contains(&day) {
                return Err(RecordError::DayOutOfRange { field, day });
            }
        }
        Ok(Self {
            cutoff_day,
            payment_day,
        })
    }

    /// Classify `today` with the default policy.
    pub fn status_on(&self, today: DayOfMonth) -> CycleStatus {
        classify_cycle(today, self.cutoff_day, self.payment_day)
    }
}

/// How long a month is when a distance wraps past the month boundary.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MonthLength {
    Fixed(u32),
}

impl MonthLength {
    pub fn days(&self) -> i64 {
        match self {
            MonthLength::Fixed(n) => i64::from(*n),
        }
    }
}

impl Default for MonthLength {
    fn default() -> Self {
        MonthLength::Fixed(NOMINAL_MONTH_DAYS)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct CyclePolicy {
    pub month_length: MonthLength,
    pub optimal_window_days: u32,
    pub payment_warning_days: u32,
}

impl Default for CyclePolicy {
    fn default() -> Self {
        Self {
            month_length: MonthLength::default(),
            optimal_window_days: OPTIMAL_WINDOW_DAYS,
            payment_warning_days: PAYMENT_WARNING_DAYS,
        }
    }
}

impl CyclePolicy {
    /// Default windows, with the real length of the month containing `date`.
    pub fn for_month_of(date: NaiveDate) -> Self {
        Self {
            month_length: MonthLength::Fixed(days_in_month(date)),
            ..Self::default()
        }
    }
}

fn days_in_month(date: NaiveDate) -> u32 {
    let (y, m) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    NaiveDate::from_ymd_opt(y, m, 1)
        .and_then(|next| next.pred_opt())
        .map(|last| last.day())
        .unwrap_or(NOMINAL_MONTH_DAYS)
}

/// Severity tag a renderer attaches to a status.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Positive,
    Warning,
}

/// Timing state of a card on a given day. Exactly one holds.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CycleStatus {
    /// Statement closes today; a purchase now lands on the closing bill.
    CutoffToday,
    /// 1..=7 days after cutoff: longest financing float.
    OptimalWindow { days_since_cutoff: i32 },
    /// Payment due within the warning window (0 means today).
    PaymentImminent { days_remaining: i32 },
    /// Nothing urgent; days until the next cutoff.
    AwaitingCutoff { days_remaining: i32 },
}

impl CycleStatus {
    pub fn severity(&self) -> Severity {
        match self {
            CycleStatus::CutoffToday | CycleStatus::PaymentImminent { .. } => Severity::Warning,
            CycleStatus::OptimalWindow { .. } => Severity::Positive,
            CycleStatus::AwaitingCutoff { .. } => Severity::Info,
        }
    }

    /// Short recommendation for `cycle`, assuming the default 30-day month.
    pub fn message(&self, cycle: &CreditCardCycle) -> String {
        self.message_with(cycle, &CyclePolicy::default())
    }

    pub fn message_with(&self, cycle: &CreditCardCycle, policy: &CyclePolicy) -> String {
        match *self {
            CycleStatus::CutoffToday => "Cutoff day today. Wait until tomorrow to buy.".to_string(),
            CycleStatus::OptimalWindow { days_since_cutoff } => {
                let float = financing_days(days_since_cutoff, cycle, policy);
                format!("Best time to buy: ~{float} days to pay.")
            }
            CycleStatus::PaymentImminent { days_remaining } => {
                format!("Payment due soon! {days_remaining} days left.")
            }
            CycleStatus::AwaitingCutoff { days_remaining } => format!(
                "Cutoff on day {}. {days_remaining} days left.",
                cycle.cutoff_day
            ),
        }
    }
}

/// Days between a purchase made `days_since_cutoff` after cutoff and the
/// payment date of the statement it lands on.
fn financing_days(days_since_cutoff: i32, cycle: &CreditCardCycle, policy: &CyclePolicy) -> i64 {
    let month = policy.month_length.days();
    let until_next_cutoff = month - i64::from(days_since_cutoff);
    let cutoff_to_payment = forward_distance(
        i64::from(cycle.cutoff_day),
        i64::from(cycle.payment_day),
        month,
    );
    until_next_cutoff + cutoff_to_payment
}

/// Days from `from` forward to `to`, wrapping once by `month`.
fn forward_distance(from: i64, to: i64, month: i64) -> i64 {
    if to >= from { to - from } else { (to + month) - from }
}

/// Days elapsed since the most recent cutoff, wrapping by `month` when the
/// cutoff falls later in the month than `today`. Zero only when they match.
pub fn days_since_cutoff(today: DayOfMonth, cutoff_day: DayOfMonth, month: MonthLength) -> i64 {
    let (today, cutoff) = (i64::from(today), i64::from(cutoff_day));
    if today >= cutoff {
        today - cutoff
    } else {
        (today + month.days()) - cutoff
    }
}

/// Narrow to a payload, saturating instead of wrapping.
fn saturate(days: i64) -> i32 {
    days.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

/// Stateless classifier over a cyclic day-of-month domain.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleAdvisor {
    policy: CyclePolicy,
}

impl CycleAdvisor {
    pub fn new(policy: CyclePolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &CyclePolicy {
        &self.policy
    }

    /// Priority chain, first match wins: cutoff today, optimal window,
    /// imminent payment, then days to the next cutoff. Total over all
    /// integers; inputs are neither validated nor clamped, and payloads
    /// saturate at the `i32` bounds.
    pub fn classify(
        &self,
        today: DayOfMonth,
        cutoff_day: DayOfMonth,
        payment_day: DayOfMonth,
    ) -> CycleStatus {
        if today == cutoff_day {
            return CycleStatus::CutoffToday;
        }

        let since = days_since_cutoff(today, cutoff_day, self.policy.month_length);
        if since > 0 && since <= i64::from(self.policy.optimal_window_days) {
            return CycleStatus::OptimalWindow {
                days_since_cutoff: saturate(since),
            };
        }

        let month = self.policy.month_length.days();
        let today = i64::from(today);
        let days_to_pay = forward_distance(today, i64::from(payment_day), month);
        if (0..=i64::from(self.policy.payment_warning_days)).contains(&days_to_pay) {
            return CycleStatus::PaymentImminent {
                days_remaining: saturate(days_to_pay),
            };
        }

        CycleStatus::AwaitingCutoff {
            days_remaining: saturate(forward_distance(today, i64::from(cutoff_day), month)),
        }
    }

    /// Classify the day-of-month of `date`.
    pub fn classify_on(&self, date: NaiveDate, cycle: &CreditCardCycle) -> CycleStatus {
        self.classify(date.day() as DayOfMonth, cycle.cutoff_day, cycle.payment_day)
    }
}

/// Classify with the default 30-day policy.
pub fn classify_cycle(
    today: DayOfMonth,
    cutoff_day: DayOfMonth,
    payment_day: DayOfMonth,
) -> CycleStatus {
    CycleAdvisor::default().classify(today, cutoff_day, payment_day)
}
