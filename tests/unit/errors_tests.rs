/*!
 * Tests for error types and conversions
 */

use lessonforge::errors::{AppError, PaymentError, ProviderError, RenderError, StorageError};

#[test]
fn test_providerError_display_shouldIncludeStatusAndMessage() {
    let error = ProviderError::ApiError {
        status_code: 429,
        message: "slow down".to_string(),
    };
    let text = error.to_string();
    assert!(text.contains("429"));
    assert!(text.contains("slow down"));
}

#[test]
fn test_paymentError_insufficientBalance_shouldReportAmounts() {
    let error = PaymentError::InsufficientBalance {
        balance: 100,
        required: 300,
    };
    let text = error.to_string();
    assert!(text.contains("100"));
    assert!(text.contains("300"));
}

#[test]
fn test_renderError_serialization_shouldUseGenericPrefix() {
    let error = RenderError::Serialization("zip failure".to_string());
    assert!(error.to_string().starts_with("Failed to generate document"));
}

#[test]
fn test_appError_fromProviderError_shouldWrap() {
    let app_error: AppError = ProviderError::EmptyCompletion.into();
    assert!(matches!(app_error, AppError::Provider(_)));
}

#[test]
fn test_appError_fromIoError_shouldBecomeFileError() {
    let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
    let app_error: AppError = io_error.into();
    assert!(matches!(app_error, AppError::File(_)));
}

#[test]
fn test_storageError_fromNoRows_shouldBecomeNotFound() {
    let storage_error: StorageError = rusqlite::Error::QueryReturnedNoRows.into();
    assert!(matches!(storage_error, StorageError::NotFound(_)));
}

#[test]
fn test_appError_fromAnyhow_shouldBecomeUnknown() {
    let app_error: AppError = anyhow::anyhow!("mystery").into();
    assert!(matches!(app_error, AppError::Unknown(_)));
    assert!(app_error.to_string().contains("mystery"));
}
