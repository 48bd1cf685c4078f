/*!
 * Tests for the wallet service: costs, debits, refunds
 */

use lessonforge::errors::PaymentError;
use lessonforge::payment::wallet::WalletService;
use lessonforge::storage::Repository;

#[test]
fn test_costOf_withLessonCounts_shouldMultiplyPerLessonPrice() {
    assert_eq!(WalletService::cost_of(1, 150), 150);
    assert_eq!(WalletService::cost_of(4, 150), 600);
    // Zero lessons still charges for one
    assert_eq!(WalletService::cost_of(0, 150), 150);
}

#[tokio::test]
async fn test_debitForGeneration_withCoveredCost_shouldReturnAmount() {
    let repo = Repository::new_in_memory().unwrap();
    let profile = repo.ensure_profile("ama").await.unwrap();
    repo.credit_wallet(&profile.id, 1000).await.unwrap();

    let wallet = WalletService::new(repo.clone());
    let debited = wallet.debit_for_generation(&profile.id, 2, 150).await.unwrap();

    assert_eq!(debited, 300);
    assert_eq!(wallet.balance(&profile.id).await.unwrap(), 700);
}

/// Overdraft surfaces as a typed insufficient-balance error and leaves
/// the balance untouched
#[tokio::test]
async fn test_debitForGeneration_withInsufficientBalance_shouldFailTyped() {
    let repo = Repository::new_in_memory().unwrap();
    let profile = repo.ensure_profile("ama").await.unwrap();
    repo.credit_wallet(&profile.id, 100).await.unwrap();

    let wallet = WalletService::new(repo.clone());
    let error = wallet
        .debit_for_generation(&profile.id, 2, 150)
        .await
        .unwrap_err();

    match error.downcast_ref::<PaymentError>() {
        Some(PaymentError::InsufficientBalance { balance, required }) => {
            assert_eq!(*balance, 100);
            assert_eq!(*required, 300);
        }
        other => panic!("expected InsufficientBalance, got {:?}", other),
    }

    assert_eq!(wallet.balance(&profile.id).await.unwrap(), 100);
}

#[tokio::test]
async fn test_debitForGeneration_withZeroPrice_shouldBeFree() {
    let repo = Repository::new_in_memory().unwrap();
    let profile = repo.ensure_profile("ama").await.unwrap();

    let wallet = WalletService::new(repo);
    let debited = wallet.debit_for_generation(&profile.id, 3, 0).await.unwrap();
    assert_eq!(debited, 0);
}

#[tokio::test]
async fn test_refund_afterDebit_shouldRestoreBalance() {
    let repo = Repository::new_in_memory().unwrap();
    let profile = repo.ensure_profile("ama").await.unwrap();
    repo.credit_wallet(&profile.id, 500).await.unwrap();

    let wallet = WalletService::new(repo);
    let debited = wallet.debit_for_generation(&profile.id, 1, 150).await.unwrap();
    assert_eq!(wallet.balance(&profile.id).await.unwrap(), 350);

    wallet.refund(&profile.id, debited).await.unwrap();
    assert_eq!(wallet.balance(&profile.id).await.unwrap(), 500);
}
