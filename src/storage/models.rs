/*!
 * Database entity models and DTOs.
 *
 * These structures map directly to database tables and provide
 * type-safe access to persisted data.
 */

use serde::{Deserialize, Serialize};
use std::fmt;

/// Payment transaction status enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// Charge initiated, awaiting confirmation
    Pending,
    /// Gateway confirmed the charge; wallet credited
    Success,
    /// Gateway reported the charge failed
    Failed,
    /// Charge abandoned by the payer
    Abandoned,
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentStatus::Pending => write!(f, "pending"),
            PaymentStatus::Success => write!(f, "success"),
            PaymentStatus::Failed => write!(f, "failed"),
            PaymentStatus::Abandoned => write!(f, "abandoned"),
        }
    }
}

impl std::str::FromStr for PaymentStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(PaymentStatus::Pending),
            "success" => Ok(PaymentStatus::Success),
            "failed" => Ok(PaymentStatus::Failed),
            "abandoned" => Ok(PaymentStatus::Abandoned),
            _ => Err(anyhow::anyhow!("Invalid payment status: {}", s)),
        }
    }
}

impl PaymentStatus {
    /// Whether the status is terminal
    pub fn is_terminal(&self) -> bool {
        !matches!(self, PaymentStatus::Pending)
    }
}

/// A teacher profile row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileRecord {
    /// UUID primary key
    pub id: String,
    /// Unique profile name
    pub name: String,
    /// School name, if given
    pub school: Option<String>,
    /// Mobile-money phone number, if given
    pub phone: Option<String>,
    /// ISO-8601 creation timestamp
    pub created_at: String,
    /// ISO-8601 update timestamp
    pub updated_at: String,
}

/// A generated lesson note row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LessonNoteRecord {
    /// UUID primary key
    pub id: String,
    /// Owning profile id
    pub profile_id: String,
    /// Subject name
    pub subject: String,
    /// Level / class
    pub level: String,
    /// Curriculum strand
    pub strand: String,
    /// Curriculum sub-strand
    pub sub_strand: String,
    /// Content standard identifier
    pub content_standard: String,
    /// Template used for generation
    pub template_name: String,
    /// Number of lessons in the note
    pub lesson_count: u32,
    /// Raw generated content
    pub content: String,
    /// SHA-256 hex digest of the content
    pub content_hash: String,
    /// Provider that produced the note
    pub provider: String,
    /// Model that produced the note
    pub model: String,
    /// ISO-8601 creation timestamp
    pub created_at: String,
}

/// A note template row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateRecord {
    /// UUID primary key
    pub id: String,
    /// Unique template name
    pub name: String,
    /// Short description
    pub description: Option<String>,
    /// Template body
    pub body: String,
    /// ISO-8601 creation timestamp
    pub created_at: String,
}

/// A wallet account row; balances are integer pesewas
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletAccountRecord {
    /// Owning profile id
    pub profile_id: String,
    /// Current balance in pesewas
    pub balance_pesewas: i64,
    /// ISO-8601 update timestamp
    pub updated_at: String,
}

/// A mobile-money transaction row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentTransactionRecord {
    /// Gateway transaction reference (primary key)
    pub reference: String,
    /// Owning profile id
    pub profile_id: String,
    /// Charge amount in pesewas
    pub amount_pesewas: i64,
    /// ISO currency code
    pub currency: String,
    /// Payer phone number
    pub phone: String,
    /// Mobile-money provider code (mtn / vodafone / airteltigo)
    pub momo_provider: String,
    /// Current status
    pub status: PaymentStatus,
    /// ISO-8601 creation timestamp
    pub created_at: String,
    /// ISO-8601 update timestamp
    pub updated_at: String,
}
