//! Arisan service: participants, draws and contribution payments.

use super::ids::unique_short_id;
use super::lottery::{plan_draw, reset_round, round_state};
use super::report_filter::DateFilter;
use super::session::SessionContext;
use super::validation::{normalize_date, require_amount, require_text};
use crate::errors::{DomainError, DomainResult};
use crate::storage::{RecordStore, TableRepository};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use shared::{
    CreateParticipantRequest, CreatePaymentRequest, LotteryParticipant, LotteryPayment, RoundState,
};
use std::sync::{Arc, Mutex};
use tracing::info;

/// Winner of a persisted draw
#[derive(Debug, Clone, PartialEq)]
pub struct DrawOutcome {
    pub winner: LotteryParticipant,
    pub round_reset: bool,
}

#[derive(Clone)]
pub struct LotteryService {
    participants: TableRepository<LotteryParticipant>,
    payments: TableRepository<LotteryPayment>,
    rng: Arc<Mutex<ChaCha8Rng>>,
}

impl LotteryService {
    /// A fixed `seed` makes the sequence of draws reproducible for audits
    pub fn new(store: Arc<dyn RecordStore>, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_rng(&mut rand::rng()),
        };
        Self::with_rng(store, rng)
    }

    pub fn with_rng(store: Arc<dyn RecordStore>, rng: ChaCha8Rng) -> Self {
        Self {
            participants: TableRepository::new(Arc::clone(&store)),
            payments: TableRepository::new(store),
            rng: Arc::new(Mutex::new(rng)),
        }
    }

    pub async fn list_participants(&self) -> DomainResult<(Vec<LotteryParticipant>, RoundState)> {
        let participants = self.participants.list().await?;
        let state = round_state(&participants);
        Ok((participants, state))
    }

    pub async fn add_participant(
        &self,
        ctx: &SessionContext,
        request: CreateParticipantRequest,
    ) -> DomainResult<LotteryParticipant> {
        ctx.require_admin("add lottery participants")?;
        let resident_name = require_text("resident_name", &request.resident_name)?;
        let existing = self.participants.list().await?;
        let participant = LotteryParticipant {
            id: unique_short_id(existing.iter().map(|p| p.id.as_str())),
            resident_name,
            has_won: false,
        };
        self.participants.append(&participant).await?;
        info!(id = %participant.id, resident = %participant.resident_name, "added lottery participant");
        Ok(participant)
    }

    /// Draw a winner and persist the updated pool.
    ///
    /// The write is conditional on the version read, so two concurrent draws
    /// cannot both mark a winner on the same round state.
    pub async fn draw(&self, ctx: &SessionContext) -> DomainResult<DrawOutcome> {
        ctx.require_admin("run the lottery draw")?;
        let base = self.participants.edit_snapshot().await?;
        if base.records.is_empty() {
            return Err(DomainError::NoParticipants);
        }

        let plan = {
            let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            plan_draw(base.records.clone(), &mut *rng)?
        };

        self.participants.save_edits(&base, &plan.participants).await?;
        info!(
            winner = %plan.winner.resident_name,
            round_reset = plan.round_reset,
            by = %ctx.username,
            "lottery draw persisted"
        );
        Ok(DrawOutcome {
            winner: plan.winner,
            round_reset: plan.round_reset,
        })
    }

    /// Explicit override: every participant becomes eligible again
    pub async fn reset_round(&self, ctx: &SessionContext) -> DomainResult<usize> {
        ctx.require_admin("reset the lottery round")?;
        let base = self.participants.edit_snapshot().await?;
        let mut records = base.records.clone();
        let reset = reset_round(&mut records);
        self.participants.save_edits(&base, &records).await?;
        info!(participants = reset, by = %ctx.username, "lottery round reset");
        Ok(reset)
    }

    /// Payments filtered by paid date, with their summed amount
    pub async fn list_payments(&self, filter: &DateFilter) -> DomainResult<(Vec<LotteryPayment>, f64)> {
        let payments = filter.apply(self.payments.list().await?, |p: &LotteryPayment| {
            p.paid_date.as_str()
        });
        let total = payments.iter().map(|p| p.amount).sum();
        Ok((payments, total))
    }

    pub async fn record_payment(
        &self,
        ctx: &SessionContext,
        request: CreatePaymentRequest,
    ) -> DomainResult<LotteryPayment> {
        ctx.require_admin("record lottery payments")?;
        let resident_name = require_text("resident_name", &request.resident_name)?;
        let period = require_text("period", &request.period)?;
        let amount = require_amount("amount", request.amount)?;
        let paid_date = normalize_date("paid_date", request.paid_date.as_deref())?;

        let existing = self.payments.list().await?;
        let payment = LotteryPayment {
            id: unique_short_id(existing.iter().map(|p| p.id.as_str())),
            resident_name,
            period,
            amount,
            paid_date,
        };
        self.payments.append(&payment).await?;
        info!(id = %payment.id, resident = %payment.resident_name, amount = payment.amount, "recorded lottery payment");
        Ok(payment)
    }

    pub async fn delete_payment(&self, ctx: &SessionContext, id: &str) -> DomainResult<usize> {
        ctx.require_admin("delete lottery payments")?;
        let removed = self.payments.delete_by_key(id).await?;
        if removed == 0 {
            return Err(DomainError::NotFound {
                entity: "lottery payment",
                id: id.to_string(),
            });
        }
        info!(id, by = %ctx.username, "deleted lottery payment");
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::session::test_sessions::{admin, resident};
    use crate::storage::{MemoryRecordStore, Row, Table};
    use chrono::NaiveDate;
    use std::collections::HashSet;

    fn setup_test() -> (Arc<MemoryRecordStore>, LotteryService) {
        let store = Arc::new(MemoryRecordStore::new());
        let service = LotteryService::new(store.clone(), Some(2026));
        (store, service)
    }

    async fn add(service: &LotteryService, name: &str) {
        service
            .add_participant(
                &admin(),
                CreateParticipantRequest {
                    resident_name: name.to_string(),
                },
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_draw_on_empty_pool_persists_nothing() {
        let (store, service) = setup_test();
        let result = service.draw(&admin()).await;
        assert!(matches!(result, Err(DomainError::NoParticipants)));

        let snapshot = store.read_all(Table::LotteryParticipants).await.unwrap();
        assert!(snapshot.rows.is_empty());
        assert_eq!(snapshot.version.0, 0);
    }

    #[tokio::test]
    async fn test_full_round_then_reset() {
        let (_store, service) = setup_test();
        for name in ["A", "B", "C"] {
            add(&service, name).await;
        }

        let mut winners = HashSet::new();
        for _ in 0..3 {
            let outcome = service.draw(&admin()).await.unwrap();
            assert!(!outcome.round_reset);
            assert!(winners.insert(outcome.winner.resident_name));
        }
        let (_, state) = service.list_participants().await.unwrap();
        assert_eq!(state, RoundState::RoundExhausted);

        let fourth = service.draw(&admin()).await.unwrap();
        assert!(fourth.round_reset);
        assert!(winners.contains(&fourth.winner.resident_name));

        let (participants, state) = service.list_participants().await.unwrap();
        assert_eq!(state, RoundState::InRound);
        assert_eq!(participants.iter().filter(|p| p.has_won).count(), 1);
    }

    #[tokio::test]
    async fn test_same_seed_same_winners() {
        let names = ["Ani", "Budi", "Citra", "Dewi"];
        let mut runs = Vec::new();
        for _ in 0..2 {
            let (_store, service) = setup_test();
            for name in names {
                add(&service, name).await;
            }
            let mut order = Vec::new();
            for _ in 0..names.len() {
                order.push(service.draw(&admin()).await.unwrap().winner.resident_name);
            }
            runs.push(order);
        }
        assert_eq!(runs[0], runs[1]);
    }

    #[tokio::test]
    async fn test_draw_rewrites_only_the_winner_row() {
        let (store, service) = setup_test();
        let rows = [
            Row::new()
                .with("id", "p1")
                .with("residentName", "Bu Sari")
                .with("hasWon", "Sudah")
                .with("rt", "03"),
            Row::new()
                .with("id", "p2")
                .with("residentName", "Pak Joko")
                .with("hasWon", "Belum")
                .with("rt", "03"),
            Row::new()
                .with("id", "p3")
                .with("residentName", "Bu Ani")
                .with("hasWon", "Belum")
                .with("rt", "04"),
        ];
        for row in &rows {
            store
                .append_one(Table::LotteryParticipants, row.clone())
                .await
                .unwrap();
        }

        let outcome = service.draw(&admin()).await.unwrap();
        assert!(!outcome.round_reset);
        assert_ne!(outcome.winner.id, "p1");

        let stored = store.read_all(Table::LotteryParticipants).await.unwrap().rows;
        for (before, after) in rows.iter().zip(&stored) {
            assert_eq!(before.text("rt"), after.text("rt"));
            if before.text("id") == outcome.winner.id {
                assert_ne!(after.text("hasWon"), "Belum");
            } else {
                assert_eq!(before, after);
            }
        }
    }

    #[tokio::test]
    async fn test_explicit_reset_and_permissions() {
        let (_store, service) = setup_test();
        add(&service, "A").await;
        add(&service, "B").await;
        service.draw(&admin()).await.unwrap();

        assert!(matches!(
            service.draw(&resident()).await,
            Err(DomainError::Forbidden { .. })
        ));
        assert!(matches!(
            service.reset_round(&resident()).await,
            Err(DomainError::Forbidden { .. })
        ));

        assert_eq!(service.reset_round(&admin()).await.unwrap(), 2);
        let (participants, _) = service.list_participants().await.unwrap();
        assert!(participants.iter().all(|p| !p.has_won));
    }

    #[tokio::test]
    async fn test_payments_filter_by_month() {
        let (_store, service) = setup_test();
        let ctx = admin();
        for (name, date) in [("Ani", "2026-01-10"), ("Budi", "2026-01-28"), ("Citra", "2026-02-03")] {
            service
                .record_payment(
                    &ctx,
                    CreatePaymentRequest {
                        resident_name: name.to_string(),
                        period: "Arisan Januari".to_string(),
                        amount: 50000.0,
                        paid_date: Some(date.to_string()),
                    },
                )
                .await
                .unwrap();
        }

        let january = DateFilter {
            month_year: Some((1, 2026)),
            ..DateFilter::default()
        };
        let (payments, total) = service.list_payments(&january).await.unwrap();
        assert_eq!(payments.len(), 2);
        assert_eq!(total, 100000.0);

        let from_feb = DateFilter {
            start: NaiveDate::from_ymd_opt(2026, 2, 1),
            ..DateFilter::default()
        };
        let (payments, _) = service.list_payments(&from_feb).await.unwrap();
        assert_eq!(payments[0].resident_name, "Citra");

        assert_eq!(service.delete_payment(&ctx, &payments[0].id).await.unwrap(), 1);
        assert!(matches!(
            service.delete_payment(&ctx, &payments[0].id).await,
            Err(DomainError::NotFound { .. })
        ));
    }
}
