//! Lending service: applies the lending policy to the stores.
//!
//! Each borrow and return reads fresh state and writes its changes inside a
//! single [`LendingStore::transact`] call, so a rejected request leaves no
//! partial writes behind. The service implements both driving ports.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockable::Clock;
use tracing::{error, info, warn};

use crate::domain::ports::{
    BookAvailability, BorrowReceipt, LendingCommand, LendingMetrics, LendingOperation,
    LendingRequest, LendingStore, LendingUnitOfWork, LibraryQuery, MemberStanding,
    NoOpLendingMetrics, ReturnReceipt, UnitOfWorkFuture,
};
use crate::domain::{
    Book, BookCode, BorrowLimit, LendingError, LendingPolicy, Loan, LoanId, MemberCode,
};

/// Implements [`LendingCommand`] and [`LibraryQuery`] over a [`LendingStore`].
pub struct LendingService<S> {
    store: Arc<S>,
    policy: LendingPolicy,
    clock: Arc<dyn Clock>,
    metrics: Arc<dyn LendingMetrics>,
}

impl<S> Clone for LendingService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            policy: self.policy,
            clock: Arc::clone(&self.clock),
            metrics: Arc::clone(&self.metrics),
        }
    }
}

impl<S> LendingService<S> {
    /// Service over `store` applying `policy`, with outcomes discarded until
    /// [`LendingService::with_metrics`] is called.
    #[must_use]
    pub fn new(store: Arc<S>, policy: LendingPolicy, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            policy,
            clock,
            metrics: Arc::new(NoOpLendingMetrics),
        }
    }

    /// Report outcomes to `metrics` instead of discarding them.
    #[must_use]
    pub fn with_metrics(mut self, metrics: Arc<dyn LendingMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    /// Rules this service applies.
    #[must_use]
    pub const fn policy(&self) -> LendingPolicy {
        self.policy
    }

    async fn observe(
        &self,
        operation: LendingOperation,
        request: &LendingRequest,
        failure: Option<&LendingError>,
    ) {
        let outcome = match failure {
            None => {
                info!(
                    operation = operation.as_label(),
                    member_code = %request.member_code,
                    book_code = %request.book_code,
                    outcome = "success",
                    "lending operation completed"
                );
                "success"
            }
            Some(LendingError::Store(err)) => {
                error!(
                    operation = operation.as_label(),
                    member_code = %request.member_code,
                    book_code = %request.book_code,
                    error = %err,
                    "lending store failure"
                );
                "store_error"
            }
            Some(rejection) => {
                info!(
                    operation = operation.as_label(),
                    member_code = %request.member_code,
                    book_code = %request.book_code,
                    outcome = rejection.reason(),
                    "lending request rejected"
                );
                rejection.reason()
            }
        };
        if let Err(err) = self.metrics.record_outcome(operation, outcome).await {
            warn!(error = %err, "failed to record lending outcome");
        }
    }
}

#[async_trait]
impl<S> LendingCommand for LendingService<S>
where
    S: LendingStore + 'static,
{
    async fn borrow_book(&self, request: LendingRequest) -> Result<BorrowReceipt, LendingError> {
        let plan = Plan {
            member_code: request.member_code.clone(),
            book_code: request.book_code.clone(),
            policy: self.policy,
            now: self.clock.utc(),
        };
        let result = self.store.transact(move |uow| borrow_within(uow, plan)).await;
        self.observe(LendingOperation::Borrow, &request, result.as_ref().err())
            .await;
        result
    }

    async fn return_book(&self, request: LendingRequest) -> Result<ReturnReceipt, LendingError> {
        let plan = Plan {
            member_code: request.member_code.clone(),
            book_code: request.book_code.clone(),
            policy: self.policy,
            now: self.clock.utc(),
        };
        let result = self.store.transact(move |uow| return_within(uow, plan)).await;
        self.observe(LendingOperation::Return, &request, result.as_ref().err())
            .await;
        result
    }
}

#[async_trait]
impl<S> LibraryQuery for LendingService<S>
where
    S: LendingStore + 'static,
{
    async fn list_books(&self) -> Result<Vec<BookAvailability>, LendingError> {
        let books = self
            .store
            .transact(list_books_within)
            .await
            .inspect_err(|err| error!(error = %err, "failed to list books"))?;
        Ok(books
            .into_iter()
            .map(|book| BookAvailability {
                available_stock: book.stock(),
                title: book.title().to_owned(),
                code: book.code().clone(),
            })
            .collect())
    }

    async fn list_members(&self) -> Result<Vec<MemberStanding>, LendingError> {
        self.store
            .transact(list_members_within)
            .await
            .inspect_err(|err| error!(error = %err, "failed to list members"))
    }
}

/// Inputs captured before entering the unit of work.
struct Plan {
    member_code: MemberCode,
    book_code: BookCode,
    policy: LendingPolicy,
    now: DateTime<Utc>,
}

fn borrow_within(
    uow: &mut dyn LendingUnitOfWork,
    plan: Plan,
) -> UnitOfWorkFuture<'_, BorrowReceipt> {
    Box::pin(async move {
        let Plan {
            member_code,
            book_code,
            policy,
            now,
        } = plan;

        let Some(member) = uow.find_member(&member_code).await? else {
            return Err(LendingError::MemberNotFound { member_code });
        };
        let penalty = member.penalty();
        if penalty.blocks_borrowing_at(now) {
            return Err(LendingError::MemberPenalized {
                member_code,
                penalty_until: penalty.until(),
            });
        }

        let active_loans = uow.count_active_loans(&member_code).await?;
        if !policy.has_capacity(active_loans) {
            return Err(LendingError::BorrowLimitExceeded {
                member_code,
                limit: BorrowLimit::ActiveLoans {
                    limit: policy.borrow_limit(),
                },
            });
        }

        let book = uow.find_book(&book_code).await?;
        if !book.as_ref().is_some_and(Book::is_available) {
            return Err(LendingError::BookUnavailable { book_code });
        }

        if uow
            .find_active_loan(&member_code, &book_code)
            .await?
            .is_some()
        {
            return Err(LendingError::BorrowLimitExceeded {
                member_code,
                limit: BorrowLimit::SameTitle { book_code },
            });
        }

        let loan = Loan::open(LoanId::random(), member_code, book_code, now);
        uow.open_loan(&loan).await?;
        let remaining_stock = uow.decrement_stock(loan.book_code()).await?;

        Ok(BorrowReceipt {
            loan_id: loan.id(),
            borrowed_at: loan.borrowed_at(),
            member_code: loan.member_code().clone(),
            book_code: loan.book_code().clone(),
            remaining_stock,
        })
    })
}

fn return_within(
    uow: &mut dyn LendingUnitOfWork,
    plan: Plan,
) -> UnitOfWorkFuture<'_, ReturnReceipt> {
    Box::pin(async move {
        let Plan {
            member_code,
            book_code,
            policy,
            now,
        } = plan;

        if uow.find_member(&member_code).await?.is_none() {
            return Err(LendingError::MemberNotFound { member_code });
        }
        if uow.find_book(&book_code).await?.is_none() {
            return Err(LendingError::BookNotFound { book_code });
        }
        let Some(loan) = uow.find_active_loan(&member_code, &book_code).await? else {
            return Err(LendingError::LoanNotFound {
                member_code,
                book_code,
            });
        };

        let assessment = policy.assess_return(&loan, now);
        if let Some(penalty) = assessment.penalty {
            uow.update_penalty(&member_code, penalty).await?;
        }
        uow.close_loan(loan.id(), now).await?;
        let stock = uow.increment_stock(&book_code).await?;

        Ok(ReturnReceipt {
            loan_id: loan.id(),
            borrowed_at: loan.borrowed_at(),
            returned_at: now,
            days_elapsed: assessment.days_elapsed,
            penalty: assessment.penalty,
            member_code,
            book_code,
            stock,
        })
    })
}

fn list_books_within(uow: &mut dyn LendingUnitOfWork) -> UnitOfWorkFuture<'_, Vec<Book>> {
    Box::pin(async move { Ok(uow.list_books().await?) })
}

fn list_members_within(
    uow: &mut dyn LendingUnitOfWork,
) -> UnitOfWorkFuture<'_, Vec<MemberStanding>> {
    Box::pin(async move {
        let members = uow.list_members().await?;
        let mut counts: HashMap<MemberCode, u32> = uow.active_loan_counts().await?;
        Ok(members
            .into_iter()
            .map(|member| MemberStanding {
                active_loan_count: counts.remove(member.code()).unwrap_or(0),
                penalty: member.penalty(),
                code: member.code().clone(),
            })
            .collect())
    })
}

#[cfg(test)]
#[path = "lending_service_tests.rs"]
mod tests;
