/*!
 * End-to-end flow against the mock provider: complete, normalize,
 * assemble, serialize, persist, debit.
 */

use chrono::Utc;
use uuid::Uuid;

use lessonforge::file_utils::FileManager;
use lessonforge::payment::wallet::WalletService;
use lessonforge::providers::mock::{MockProvider, MockRequest};
use lessonforge::providers::Provider;
use lessonforge::render::docx::{assemble, DocxBlock};
use lessonforge::render::normalize::split_logical_lines;
use lessonforge::storage::models::LessonNoteRecord;
use lessonforge::storage::repository::content_hash;
use lessonforge::storage::Repository;

use crate::common;

fn mock_request() -> MockRequest {
    MockRequest {
        system: "You are a teacher".to_string(),
        prompt: "Write the note".to_string(),
        max_tokens: 3000,
    }
}

#[tokio::test]
async fn test_generationFlow_withWorkingProvider_shouldProduceDocxExport() {
    let provider = MockProvider::working();
    let response = provider.complete(mock_request()).await.unwrap();
    let text = MockProvider::extract_text(&response);
    assert!(!text.is_empty());

    // Render the completion into a document
    let document = assemble(&common::sample_metadata(), &text);
    assert!(document.blocks.iter().any(|b| matches!(b, DocxBlock::Table { .. })));

    let blob = document.to_bytes().unwrap();
    assert_eq!(&blob[..2], b"PK");

    // Write it like the controller would
    let dir = common::create_temp_dir().unwrap();
    let path = FileManager::generate_output_path(dir.path(), "Science", "Basic 4", "docx");
    FileManager::write_bytes(&path, &blob).unwrap();
    assert!(FileManager::file_exists(&path));
}

/// The messy completion exercises every normalizer heuristic at once
#[tokio::test]
async fn test_generationFlow_withMessyCompletion_shouldNormalizeLists() {
    let provider = MockProvider::messy();
    let response = provider.complete(mock_request()).await.unwrap();
    let lines = split_logical_lines(&response.text);

    // Numbered, lettered and tier markers all force breaks
    assert!(lines.iter().any(|l| l.starts_with("1. ")));
    assert!(lines.iter().any(|l| l.starts_with("2. ")));
    assert!(lines.iter().any(|l| l.starts_with("a) ")));
    assert!(lines.iter().any(|l| l.starts_with("Tier 1")));
}

#[tokio::test]
async fn test_generationFlow_withWallet_shouldDebitPersistAndList() {
    let repo = Repository::new_in_memory().unwrap();
    let profile = repo.ensure_profile("ama").await.unwrap();
    repo.credit_wallet(&profile.id, 1000).await.unwrap();

    let wallet = WalletService::new(repo.clone());
    let cost = wallet.debit_for_generation(&profile.id, 1, 150).await.unwrap();
    assert_eq!(cost, 150);

    let provider = MockProvider::working();
    let response = provider.complete(mock_request()).await.unwrap();

    let note = LessonNoteRecord {
        id: Uuid::new_v4().to_string(),
        profile_id: profile.id.clone(),
        subject: "Science".to_string(),
        level: "Basic 4".to_string(),
        strand: "Diversity of Matter".to_string(),
        sub_strand: "Materials".to_string(),
        content_standard: "B4.1.1.1".to_string(),
        template_name: "GES Standard".to_string(),
        lesson_count: 1,
        content: response.text.clone(),
        content_hash: content_hash(&response.text),
        provider: "mock".to_string(),
        model: "mock".to_string(),
        created_at: Utc::now().to_rfc3339(),
    };
    repo.insert_lesson_note(&note).await.unwrap();

    let notes = repo.list_lesson_notes(&profile.id).await.unwrap();
    assert_eq!(notes.len(), 1);
    assert_eq!(repo.wallet_balance(&profile.id).await.unwrap(), 850);
}

/// A failing provider leaves nothing persisted and the refund restores
/// the balance, mirroring the controller's compensation path
#[test]
fn test_generationFlow_withFailingProvider_shouldRefund() {
    tokio_test::block_on(async {
        let repo = Repository::new_in_memory().unwrap();
        let profile = repo.ensure_profile("ama").await.unwrap();
        repo.credit_wallet(&profile.id, 500).await.unwrap();

        let wallet = WalletService::new(repo.clone());
        let debited = wallet
            .debit_for_generation(&profile.id, 1, 150)
            .await
            .unwrap();

        let provider = MockProvider::failing();
        let result = provider.complete(mock_request()).await;
        assert!(result.is_err());

        wallet.refund(&profile.id, debited).await.unwrap();
        assert_eq!(repo.wallet_balance(&profile.id).await.unwrap(), 500);
    });
}
