/*!
 * Tests for the SQLite repository on an in-memory database
 */

use chrono::Utc;
use uuid::Uuid;

use lessonforge::storage::models::{
    LessonNoteRecord, PaymentStatus, PaymentTransactionRecord, TemplateRecord,
};
use lessonforge::storage::repository::content_hash;
use lessonforge::storage::Repository;

fn sample_note(profile_id: &str, content: &str) -> LessonNoteRecord {
    LessonNoteRecord {
        id: Uuid::new_v4().to_string(),
        profile_id: profile_id.to_string(),
        subject: "Science".to_string(),
        level: "Basic 4".to_string(),
        strand: "Diversity of Matter".to_string(),
        sub_strand: "Materials".to_string(),
        content_standard: "B4.1.1.1".to_string(),
        template_name: "GES Standard".to_string(),
        lesson_count: 1,
        content: content.to_string(),
        content_hash: content_hash(content),
        provider: "ollama".to_string(),
        model: "llama3.2:3b".to_string(),
        created_at: Utc::now().to_rfc3339(),
    }
}

#[tokio::test]
async fn test_ensureProfile_withNewName_shouldCreateProfileAndWallet() {
    let repo = Repository::new_in_memory().unwrap();

    let profile = repo.ensure_profile("ama").await.unwrap();
    assert_eq!(profile.name, "ama");

    // Wallet starts at zero
    let balance = repo.wallet_balance(&profile.id).await.unwrap();
    assert_eq!(balance, 0);
}

#[tokio::test]
async fn test_ensureProfile_withExistingName_shouldReturnSameProfile() {
    let repo = Repository::new_in_memory().unwrap();

    let first = repo.ensure_profile("ama").await.unwrap();
    let second = repo.ensure_profile("ama").await.unwrap();
    assert_eq!(first.id, second.id);
}

#[tokio::test]
async fn test_creditWallet_thenBalance_shouldReflectCredit() {
    let repo = Repository::new_in_memory().unwrap();
    let profile = repo.ensure_profile("ama").await.unwrap();

    repo.credit_wallet(&profile.id, 500).await.unwrap();
    assert_eq!(repo.wallet_balance(&profile.id).await.unwrap(), 500);
}

#[tokio::test]
async fn test_tryDebitWallet_withSufficientBalance_shouldDebit() {
    let repo = Repository::new_in_memory().unwrap();
    let profile = repo.ensure_profile("ama").await.unwrap();
    repo.credit_wallet(&profile.id, 500).await.unwrap();

    let debited = repo.try_debit_wallet(&profile.id, 300).await.unwrap();
    assert!(debited);
    assert_eq!(repo.wallet_balance(&profile.id).await.unwrap(), 200);
}

/// The conditional UPDATE refuses an overdraft and leaves the balance
/// untouched
#[tokio::test]
async fn test_tryDebitWallet_withInsufficientBalance_shouldRefuse() {
    let repo = Repository::new_in_memory().unwrap();
    let profile = repo.ensure_profile("ama").await.unwrap();
    repo.credit_wallet(&profile.id, 100).await.unwrap();

    let debited = repo.try_debit_wallet(&profile.id, 300).await.unwrap();
    assert!(!debited);
    assert_eq!(repo.wallet_balance(&profile.id).await.unwrap(), 100);
}

#[tokio::test]
async fn test_insertLessonNote_thenGet_shouldRoundTrip() {
    let repo = Repository::new_in_memory().unwrap();
    let profile = repo.ensure_profile("ama").await.unwrap();

    let note = sample_note(&profile.id, "1. A 2. B");
    repo.insert_lesson_note(&note).await.unwrap();

    let loaded = repo.get_lesson_note(&note.id).await.unwrap().unwrap();
    assert_eq!(loaded.content, "1. A 2. B");
    assert_eq!(loaded.subject, "Science");
    assert_eq!(loaded.content_hash, note.content_hash);
}

#[tokio::test]
async fn test_findNoteByHash_withDuplicateContent_shouldFindExisting() {
    let repo = Repository::new_in_memory().unwrap();
    let profile = repo.ensure_profile("ama").await.unwrap();

    let note = sample_note(&profile.id, "identical content");
    repo.insert_lesson_note(&note).await.unwrap();

    let found = repo
        .find_note_by_hash(&profile.id, &content_hash("identical content"))
        .await
        .unwrap();
    assert!(found.is_some());

    let missing = repo
        .find_note_by_hash(&profile.id, &content_hash("different content"))
        .await
        .unwrap();
    assert!(missing.is_none());
}

#[tokio::test]
async fn test_listLessonNotes_withSeveralInserts_shouldReturnAll() {
    let repo = Repository::new_in_memory().unwrap();
    let profile = repo.ensure_profile("ama").await.unwrap();

    for i in 0..3 {
        repo.insert_lesson_note(&sample_note(&profile.id, &format!("note {}", i)))
            .await
            .unwrap();
    }

    let notes = repo.list_lesson_notes(&profile.id).await.unwrap();
    assert_eq!(notes.len(), 3);
}

#[tokio::test]
async fn test_transactionStatus_updateFlow_shouldPersist() {
    let repo = Repository::new_in_memory().unwrap();
    let profile = repo.ensure_profile("ama").await.unwrap();

    let now = Utc::now().to_rfc3339();
    let tx = PaymentTransactionRecord {
        reference: "LF-TEST12345678".to_string(),
        profile_id: profile.id.clone(),
        amount_pesewas: 500,
        currency: "GHS".to_string(),
        phone: "0244000000".to_string(),
        momo_provider: "mtn".to_string(),
        status: PaymentStatus::Pending,
        created_at: now.clone(),
        updated_at: now,
    };
    repo.insert_transaction(&tx).await.unwrap();

    let loaded = repo.get_transaction("LF-TEST12345678").await.unwrap().unwrap();
    assert_eq!(loaded.status, PaymentStatus::Pending);

    repo.update_transaction_status("LF-TEST12345678", PaymentStatus::Success)
        .await
        .unwrap();

    let loaded = repo.get_transaction("LF-TEST12345678").await.unwrap().unwrap();
    assert_eq!(loaded.status, PaymentStatus::Success);
    assert_eq!(loaded.amount_pesewas, 500);
}

#[tokio::test]
async fn test_upsertTemplate_thenGetByName_shouldRoundTripAndReplace() {
    let repo = Repository::new_in_memory().unwrap();

    let template = TemplateRecord {
        id: Uuid::new_v4().to_string(),
        name: "GES Standard".to_string(),
        description: Some("Standard weekly layout".to_string()),
        body: "Phase 1\nPhase 2\nPhase 3".to_string(),
        created_at: Utc::now().to_rfc3339(),
    };
    repo.upsert_template(&template).await.unwrap();

    let loaded = repo.get_template_by_name("GES Standard").await.unwrap().unwrap();
    assert_eq!(loaded.body, "Phase 1\nPhase 2\nPhase 3");

    // Upserting the same name replaces the body
    let updated = TemplateRecord {
        id: Uuid::new_v4().to_string(),
        body: "Phase 1 only".to_string(),
        ..template
    };
    repo.upsert_template(&updated).await.unwrap();

    let loaded = repo.get_template_by_name("GES Standard").await.unwrap().unwrap();
    assert_eq!(loaded.body, "Phase 1 only");

    let missing = repo.get_template_by_name("Unknown").await.unwrap();
    assert!(missing.is_none());
}

#[test]
fn test_contentHash_withSameInput_shouldBeStable() {
    assert_eq!(content_hash("abc"), content_hash("abc"));
    assert_ne!(content_hash("abc"), content_hash("abd"));
    // SHA-256 hex digest length
    assert_eq!(content_hash("abc").len(), 64);
}
