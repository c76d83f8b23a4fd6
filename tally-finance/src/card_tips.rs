//! Per-card timing tips for a debt list.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use tally_core::{CreditCardCycle, CycleAdvisor, CycleStatus, DayOfMonth, Debt, Severity};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CardTip {
    pub debt_id: String,
    pub title: String,
    pub cycle: CreditCardCycle,
    pub status: CycleStatus,
    pub severity: Severity,
    pub message: String,
}

/// Classify every credit-card debt for `today`. Debts without a complete
/// cycle are plain debts and get no tip.
pub fn card_tips(debts: &[Debt], today: NaiveDate, advisor: &CycleAdvisor) -> Vec<CardTip> {
    let day = today.day() as DayOfMonth;
    debts
        .iter()
        .filter_map(|d| d.card_cycle().map(|cycle| (d, *cycle)))
        .map(|(debt, cycle)| {
            let status = advisor.classify(day, cycle.cutoff_day, cycle.payment_day);
            CardTip {
                debt_id: debt.id.clone(),
                title: debt.title.clone(),
                cycle,
                status,
                severity: status.severity(),
                message: status.message_with(&cycle, advisor.policy()),
            }
        })
        .collect()
}

/// Tip for a single debt, if it is a card.
pub fn card_tip(debt: &Debt, today: NaiveDate, advisor: &CycleAdvisor) -> Option<CardTip> {
    card_tips(std::slice::from_ref(debt), today, advisor).pop()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tally_core::DebtKind;

    fn card(id: &str, cutoff: i32, payment: i32) -> Debt {
        Debt::new(id, DebtKind::Payable, format!("Card {id}"), 500.0)
            .unwrap()
            .with_card(CreditCardCycle::new(cutoff, payment).unwrap())
            .unwrap()
    }

    #[test]
    fn test_only_cards_get_tips() {
        let debts = vec![
            card("visa", 5, 20),
            Debt::new("loan", DebtKind::Payable, "Loan", 100.0).unwrap(),
            card("amex", 15, 1),
        ];
        let today = NaiveDate::from_ymd_opt(2026, 3, 8).unwrap();
        let tips = card_tips(&debts, today, &CycleAdvisor::default());

        assert_eq!(tips.len(), 2);
        assert_eq!(tips[0].debt_id, "visa");
        assert_eq!(tips[0].status, CycleStatus::OptimalWindow { days_since_cutoff: 3 });
        assert_eq!(tips[0].severity, Severity::Positive);
        assert_eq!(tips[1].status, CycleStatus::AwaitingCutoff { days_remaining: 7 });
        assert_eq!(tips[1].message, "Cutoff on day 15. 7 days left.");
    }

    #[test]
    fn test_single_tip() {
        let today = NaiveDate::from_ymd_opt(2026, 3, 17).unwrap();
        let tip = card_tip(&card("visa", 5, 20), today, &CycleAdvisor::default()).unwrap();
        assert_eq!(tip.message, "Payment due soon! 3 days left.");

        let loan = Debt::new("loan", DebtKind::Payable, "Loan", 100.0).unwrap();
        assert!(card_tip(&loan, today, &CycleAdvisor::default()).is_none());
    }
}
