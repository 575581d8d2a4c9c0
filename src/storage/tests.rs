//! Tests for bet repositories

#[cfg(test)]
mod tests {
    use super::super::*;
    use crate::error::{LedgerError, ValidationError};
    use crate::types::{BetResult, NewBet, Selection};
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, d).unwrap()
    }

    async fn check_insert_and_settle(repo: &dyn BetRepository) {
        let later = repo
            .insert(NewBet::single(day(10), dec!(50), dec!(2.5)).with_unit_value(dec!(10)))
            .await
            .unwrap();
        let earlier = repo
            .insert(
                NewBet::single(day(2), dec!(20), dec!(1.8))
                    .with_result(Some(BetResult::Red))
                    .with_unit_value(dec!(10)),
            )
            .await
            .unwrap();

        assert!(later.is_pending());
        assert_eq!(later.profit_currency, dec!(0));
        assert_eq!(earlier.profit_currency, dec!(-20));
        assert_eq!(earlier.profit_units, dec!(-2));

        let listed = repo.list().await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, earlier.id);
        assert_eq!(listed[1].id, later.id);

        let settled = repo.set_result(later.id, Some(BetResult::Green)).await.unwrap();
        assert_eq!(settled.profit_currency, dec!(75));
        assert_eq!(settled.profit_units, dec!(7.5));

        let stored = repo.get(later.id).await.unwrap();
        assert_eq!(stored.result, Some(BetResult::Green));
        assert_eq!(stored.profit_currency, dec!(75));
        assert_eq!(stored.profit_units, dec!(7.5));

        let reopened = repo.set_result(later.id, None).await.unwrap();
        assert_eq!(reopened.profit_currency, dec!(0));
    }

    async fn check_missing_and_delete(repo: &dyn BetRepository) {
        let bet = repo
            .insert(NewBet::single(day(1), dec!(10), dec!(2.0)))
            .await
            .unwrap();

        repo.delete(bet.id).await.unwrap();
        assert!(matches!(repo.get(bet.id).await, Err(LedgerError::NotFound { .. })));
        assert!(matches!(repo.delete(bet.id).await, Err(LedgerError::NotFound { .. })));
        assert!(matches!(
            repo.set_result(bet.id, Some(BetResult::Green)).await,
            Err(LedgerError::NotFound { .. })
        ));
    }

    async fn check_rejects_invalid(repo: &dyn BetRepository) {
        let err = repo
            .insert(NewBet::single(day(1), dec!(0), dec!(2.0)))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            LedgerError::Validation(ValidationError::InvalidStake { .. })
        ));

        let err = repo
            .insert(NewBet::single(day(1), dec!(10), dec!(0.8)))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            LedgerError::Validation(ValidationError::InvalidOdds { .. })
        ));
        assert!(repo.list().await.unwrap().is_empty());
    }

    async fn check_import_recomputes(repo: &dyn BetRepository) {
        let mut bet = NewBet::single(day(5), dec!(40), dec!(2.0))
            .with_unit_value(dec!(20))
            .into_bet()
            .unwrap();
        bet.result = Some(BetResult::Green);
        // Stale figure from elsewhere
        bet.profit_currency = dec!(999);

        assert_eq!(repo.import(vec![bet.clone()]).await.unwrap(), 1);
        let stored = repo.get(bet.id).await.unwrap();
        assert_eq!(stored.profit_currency, dec!(40));
        assert_eq!(stored.profit_units, dec!(2));

        bet.result = Some(BetResult::Refund);
        repo.import(vec![bet.clone()]).await.unwrap();
        assert_eq!(repo.list().await.unwrap().len(), 1);
        assert_eq!(repo.get(bet.id).await.unwrap().profit_currency, dec!(0));
    }

    async fn check_import_combined_odds(repo: &dyn BetRepository) {
        let mut bet = NewBet::combined(
            day(8),
            dec!(10),
            vec![Selection::new("Home", dec!(2.0)), Selection::new("Away", dec!(1.5))],
        )
        .into_bet()
        .unwrap();
        bet.result = Some(BetResult::Green);
        // Odds that disagree with the selections
        bet.odds = dec!(1.5);

        repo.import(vec![bet.clone()]).await.unwrap();
        let stored = repo.get(bet.id).await.unwrap();
        assert_eq!(stored.odds, dec!(3.0));
        assert_eq!(stored.profit_currency, dec!(20));

        let mut bad_leg = bet.clone();
        bad_leg.id = uuid::Uuid::new_v4();
        bad_leg.selections[1].odds = dec!(0.5);
        let err = repo.import(vec![bad_leg]).await.unwrap_err();
        assert!(matches!(
            err,
            LedgerError::Validation(ValidationError::InvalidOdds { odds }) if odds == dec!(0.5)
        ));

        let mut oversized = bet.clone();
        oversized.id = uuid::Uuid::new_v4();
        oversized.stake = dec!(50000000000000000000000000000);
        let err = repo.import(vec![oversized]).await.unwrap_err();
        assert!(matches!(
            err,
            LedgerError::Validation(ValidationError::StakeTooLarge { .. })
        ));

        assert_eq!(repo.list().await.unwrap().len(), 1);
    }

    async fn check_replace_keeps_position(repo: &dyn BetRepository) {
        let first = repo
            .insert(NewBet::single(day(3), dec!(10), dec!(2.0)))
            .await
            .unwrap();
        let second = repo
            .insert(NewBet::single(day(3), dec!(10), dec!(3.0)))
            .await
            .unwrap();

        let mut replaced = first.clone();
        replaced.result = Some(BetResult::Red);
        repo.import(vec![replaced]).await.unwrap();

        let ids: Vec<_> = repo.list().await.unwrap().iter().map(|b| b.id).collect();
        assert_eq!(ids, vec![first.id, second.id]);
        assert_eq!(repo.get(first.id).await.unwrap().profit_currency, dec!(-10));
    }

    #[tokio::test]
    async fn test_memory_store() {
        check_insert_and_settle(&MemoryBetStore::new()).await;
        check_missing_and_delete(&MemoryBetStore::new()).await;
        check_rejects_invalid(&MemoryBetStore::new()).await;
        check_import_recomputes(&MemoryBetStore::new()).await;
        check_import_combined_odds(&MemoryBetStore::new()).await;
        check_replace_keeps_position(&MemoryBetStore::new()).await;
    }

    #[tokio::test]
    async fn test_sqlite_store() {
        check_insert_and_settle(&SqliteBetStore::in_memory().await.unwrap()).await;
        check_missing_and_delete(&SqliteBetStore::in_memory().await.unwrap()).await;
        check_rejects_invalid(&SqliteBetStore::in_memory().await.unwrap()).await;
        check_import_recomputes(&SqliteBetStore::in_memory().await.unwrap()).await;
        check_import_combined_odds(&SqliteBetStore::in_memory().await.unwrap()).await;
        check_replace_keeps_position(&SqliteBetStore::in_memory().await.unwrap()).await;
    }

    #[tokio::test]
    async fn test_sqlite_settle_after_delete_elsewhere() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bets.db");
        let path = path.to_str().unwrap();

        let writer = SqliteBetStore::connect(path).await.unwrap();
        let other = SqliteBetStore::connect(path).await.unwrap();
        let bet = writer
            .insert(NewBet::single(day(4), dec!(10), dec!(2.0)))
            .await
            .unwrap();

        other.delete(bet.id).await.unwrap();
        assert!(matches!(
            writer.set_result(bet.id, Some(BetResult::Green)).await,
            Err(LedgerError::NotFound { .. })
        ));
        assert!(writer.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_sqlite_persists_combined_bet() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger").join("bets.db");
        let path = path.to_str().unwrap();

        let selections = vec![
            Selection::new("Arsenal win", dec!(1.50)),
            Selection::new("Over 2.5", dec!(1.90)),
        ];
        let id = {
            let store = SqliteBetStore::connect(path).await.unwrap();
            let bet = store
                .insert(
                    NewBet::combined(day(7), dec!(10), selections.clone())
                        .with_result(Some(BetResult::Green))
                        .with_description("Saturday double"),
                )
                .await
                .unwrap();
            assert_eq!(bet.odds, dec!(2.85));
            bet.id
        };

        let store = SqliteBetStore::connect(path).await.unwrap();
        let bet = store.get(id).await.unwrap();
        assert!(bet.is_combined());
        assert_eq!(bet.selections, selections);
        assert_eq!(bet.odds, dec!(2.85));
        assert_eq!(bet.profit_currency, dec!(18.5));
        assert_eq!(bet.description.as_deref(), Some("Saturday double"));
        assert_eq!(bet.unit_value, None);
    }

    #[tokio::test]
    async fn test_memory_store_with_bets_validates() {
        let mut bet = NewBet::single(day(1), dec!(10), dec!(2.0)).into_bet().unwrap();
        bet.stake = dec!(-1);
        assert!(MemoryBetStore::with_bets(vec![bet]).is_err());
    }
}
