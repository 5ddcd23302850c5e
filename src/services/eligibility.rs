//! Borrower eligibility rules
//!
//! A pure rule set over a snapshot of borrower facts. The lifecycle engine
//! evaluates it inside the borrow transaction, so the facts cannot move while
//! the decision is made; the standalone probe endpoint evaluates it against a
//! fresh read and is advisory only.

use crate::error::DenialReason;
use crate::models::user::{BorrowerSnapshot, Role};

/// Outcome of an eligibility check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BorrowDecision {
    Allowed,
    Denied(DenialReason),
}

impl BorrowDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, BorrowDecision::Allowed)
    }

    pub fn denial(&self) -> Option<DenialReason> {
        match self {
            BorrowDecision::Allowed => None,
            BorrowDecision::Denied(reason) => Some(*reason),
        }
    }
}

/// Evaluates the borrowing rules in a fixed order: account state, role,
/// overdue holdings, loan limit. The first rule that fails names the denial.
#[derive(Debug, Clone, Copy)]
pub struct EligibilityChecker {
    max_active_loans: i64,
}

impl EligibilityChecker {
    pub fn new(max_active_loans: i64) -> Self {
        Self { max_active_loans }
    }

    pub fn can_borrow(&self, borrower: &BorrowerSnapshot) -> BorrowDecision {
        if !borrower.is_active {
            return BorrowDecision::Denied(DenialReason::Inactive);
        }
        if borrower.role != Role::Reader {
            return BorrowDecision::Denied(DenialReason::NotReader);
        }
        if borrower.has_overdue_loans {
            return BorrowDecision::Denied(DenialReason::HasOverdueLoans);
        }
        if borrower.active_loan_count >= self.max_active_loans {
            return BorrowDecision::Denied(DenialReason::LoanLimitReached);
        }
        BorrowDecision::Allowed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reader() -> BorrowerSnapshot {
        BorrowerSnapshot {
            role: Role::Reader,
            is_active: true,
            active_loan_count: 0,
            has_overdue_loans: false,
        }
    }

    fn checker() -> EligibilityChecker {
        EligibilityChecker::new(5)
    }

    #[test]
    fn a_reader_in_good_standing_may_borrow() {
        assert_eq!(checker().can_borrow(&reader()), BorrowDecision::Allowed);
    }

    #[test]
    fn inactive_accounts_are_turned_away_first() {
        // Inactive outranks every other failure
        let borrower = BorrowerSnapshot {
            is_active: false,
            role: Role::Admin,
            active_loan_count: 99,
            has_overdue_loans: true,
        };
        assert_eq!(
            checker().can_borrow(&borrower),
            BorrowDecision::Denied(DenialReason::Inactive)
        );
    }

    #[test]
    fn only_readers_may_borrow() {
        for role in [Role::Supplier, Role::Assistant, Role::Admin] {
            let borrower = BorrowerSnapshot { role, ..reader() };
            assert_eq!(
                checker().can_borrow(&borrower),
                BorrowDecision::Denied(DenialReason::NotReader)
            );
        }
    }

    #[test]
    fn overdue_holdings_block_borrowing() {
        let borrower = BorrowerSnapshot {
            has_overdue_loans: true,
            ..reader()
        };
        assert_eq!(
            checker().can_borrow(&borrower),
            BorrowDecision::Denied(DenialReason::HasOverdueLoans)
        );
    }

    #[test]
    fn overdue_wins_over_the_loan_limit() {
        let borrower = BorrowerSnapshot {
            has_overdue_loans: true,
            active_loan_count: 5,
            ..reader()
        };
        assert_eq!(
            checker().can_borrow(&borrower),
            BorrowDecision::Denied(DenialReason::HasOverdueLoans)
        );
    }

    #[test]
    fn the_limit_is_inclusive() {
        let at_limit = BorrowerSnapshot {
            active_loan_count: 5,
            ..reader()
        };
        let below_limit = BorrowerSnapshot {
            active_loan_count: 4,
            ..reader()
        };
        assert_eq!(
            checker().can_borrow(&at_limit),
            BorrowDecision::Denied(DenialReason::LoanLimitReached)
        );
        assert_eq!(checker().can_borrow(&below_limit), BorrowDecision::Allowed);
    }

    #[test]
    fn a_zero_limit_blocks_everyone() {
        assert_eq!(
            EligibilityChecker::new(0).can_borrow(&reader()),
            BorrowDecision::Denied(DenialReason::LoanLimitReached)
        );
    }
}
