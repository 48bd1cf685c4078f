/*!
 * Main application controller.
 *
 * Orchestrates a generation run end to end: resolve the teacher profile,
 * reserve the wallet cost, call the generation provider, persist the
 * note, and export the requested documents. A failed generation refunds
 * the reservation.
 */

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Utc;
use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use log::{info, warn};
use uuid::Uuid;

use crate::app_config::Config;
use crate::file_utils::FileManager;
use crate::generation::{GenerationService, LessonRequest, TokenUsageStats};
use crate::payment::gateway::{ChargeOutcome, ChargeState, MomoGateway, MomoProvider};
use crate::payment::wallet::WalletService;
use crate::render::docx::{self, NoteMetadata};
use crate::render::html::{self, LessonPage};
use crate::storage::models::{LessonNoteRecord, TemplateRecord};
use crate::storage::repository::content_hash;
use crate::storage::Repository;

/// How many generation requests run concurrently in a batch
const BATCH_CONCURRENCY: usize = 2;

/// Export settings for a generation run
#[derive(Debug, Clone)]
pub struct ExportOptions {
    /// Directory the documents land in
    pub output_dir: PathBuf,
    /// Write a .docx export
    pub docx: bool,
    /// Write a print-ready .html export
    pub html: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            docx: true,
            html: false,
        }
    }
}

/// Result of one generation run
pub struct GeneratedNote {
    /// Stored note id
    pub note_id: String,
    /// Raw generated content
    pub content: String,
    /// Token usage of the run
    pub usage: TokenUsageStats,
    /// Path of the .docx export, when written
    pub docx_path: Option<PathBuf>,
    /// Path of the .html export, when written
    pub html_path: Option<PathBuf>,
}

/// Main application controller
pub struct Controller {
    config: Config,
    repo: Repository,
    wallet: WalletService,
    generation: GenerationService,
}

impl Controller {
    /// Create a controller with the default database location
    pub fn with_config(config: Config) -> Result<Self> {
        let repo = Repository::new_default()?;
        Self::with_repository(config, repo)
    }

    /// Create a controller over an explicit repository (used by tests)
    pub fn with_repository(config: Config, repo: Repository) -> Result<Self> {
        let generation = GenerationService::new(config.generation.clone())?;
        let wallet = WalletService::new(repo.clone());

        Ok(Self {
            config,
            repo,
            wallet,
            generation,
        })
    }

    /// The underlying repository
    pub fn repository(&self) -> &Repository {
        &self.repo
    }

    /// The wallet service
    pub fn wallet(&self) -> &WalletService {
        &self.wallet
    }

    /// Build a gateway client from the payment config
    pub fn gateway(&self) -> MomoGateway {
        MomoGateway::new(
            self.config.payment.resolve_secret_key(),
            self.config.payment.endpoint.clone(),
            self.config.payment.timeout_secs,
        )
    }

    /// Probe the configured generation provider
    pub async fn test_provider(&self) -> Result<()> {
        self.generation
            .test_connection()
            .await
            .context("Provider connection test failed")
    }

    /// Generate one lesson note and export documents.
    pub async fn run(&self, request: LessonRequest, options: &ExportOptions) -> Result<GeneratedNote> {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        spinner.set_message(format!(
            "Generating {} / {} ...",
            request.subject, request.content_standard
        ));
        spinner.enable_steady_tick(std::time::Duration::from_millis(120));

        let result = self.generate_one(request, options).await;
        spinner.finish_and_clear();

        result
    }

    /// Generate several notes with bounded concurrency, preserving order.
    pub async fn run_many(
        &self,
        requests: Vec<LessonRequest>,
        options: &ExportOptions,
    ) -> Result<Vec<GeneratedNote>> {
        let total = requests.len() as u64;
        let progress = ProgressBar::new(total);
        progress.set_style(
            ProgressStyle::with_template("{bar:30} {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );

        let pacing_ms = self.config.generation.common.rate_limit_delay_ms;
        let results: Vec<Result<GeneratedNote>> = stream::iter(requests.into_iter().enumerate())
            .map(|(index, request)| {
                let progress = progress.clone();
                async move {
                    if index > 0 && pacing_ms > 0 {
                        // Space out request starts so a batch does not slam the provider
                        tokio::time::sleep(std::time::Duration::from_millis(pacing_ms)).await;
                    }
                    let result = self.generate_one(request, options).await;
                    progress.inc(1);
                    result
                }
            })
            .buffered(BATCH_CONCURRENCY)
            .collect()
            .await;

        progress.finish_and_clear();

        let mut notes = Vec::with_capacity(results.len());
        for result in results {
            notes.push(result?);
        }
        Ok(notes)
    }

    /// The full single-note flow: wallet, provider, storage, export.
    async fn generate_one(
        &self,
        mut request: LessonRequest,
        options: &ExportOptions,
    ) -> Result<GeneratedNote> {
        let profile = self.repo.ensure_profile(&self.config.profile_name).await?;

        // A stored template of the same name contributes its structure
        if let Some(template) = self.repo.get_template_by_name(&request.template_name).await? {
            let guidance = format!("Follow this template structure:\n{}", template.body);
            request.extra_instructions = Some(match request.extra_instructions.take() {
                Some(existing) => format!("{}\n{}", existing, guidance),
                None => guidance,
            });
        }

        let lesson_count = request.effective_lesson_count();
        let debited = self
            .wallet
            .debit_for_generation(
                &profile.id,
                lesson_count,
                self.config.pricing.cost_per_lesson_pesewas,
            )
            .await?;

        let outcome = match self.generation.generate(&request).await {
            Ok(outcome) => outcome,
            Err(e) => {
                // The provider never produced a note; give the pesewas back
                warn!("Generation failed, refunding {} pesewas", debited);
                self.wallet.refund(&profile.id, debited).await?;
                return Err(e.into());
            }
        };

        info!("{}", outcome.usage.summary());

        let note = LessonNoteRecord {
            id: Uuid::new_v4().to_string(),
            profile_id: profile.id.clone(),
            subject: request.subject.clone(),
            level: request.level.clone(),
            strand: request.strand.clone(),
            sub_strand: request.sub_strand.clone(),
            content_standard: request.content_standard.clone(),
            template_name: request.template_name.clone(),
            lesson_count,
            content: outcome.text.clone(),
            content_hash: content_hash(&outcome.text),
            provider: outcome.usage.provider.clone(),
            model: outcome.usage.model.clone(),
            created_at: Utc::now().to_rfc3339(),
        };
        self.repo.insert_lesson_note(&note).await?;

        let (docx_path, html_path) = self.export_documents(&note, options)?;

        Ok(GeneratedNote {
            note_id: note.id,
            content: outcome.text,
            usage: outcome.usage,
            docx_path,
            html_path,
        })
    }

    /// Re-export a stored note.
    pub async fn export_note(
        &self,
        note_id: &str,
        options: &ExportOptions,
    ) -> Result<(Option<PathBuf>, Option<PathBuf>)> {
        let note = self
            .repo
            .get_lesson_note(note_id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("No stored note with id {}", note_id))?;

        self.export_documents(&note, options)
    }

    /// Render and write the requested document formats.
    fn export_documents(
        &self,
        note: &LessonNoteRecord,
        options: &ExportOptions,
    ) -> Result<(Option<PathBuf>, Option<PathBuf>)> {
        let metadata = NoteMetadata {
            subject: note.subject.clone(),
            level: note.level.clone(),
            strand: note.strand.clone(),
            sub_strand: note.sub_strand.clone(),
            content_standard: note.content_standard.clone(),
            template_name: note.template_name.clone(),
        };

        let mut docx_path = None;
        if options.docx {
            let document = docx::assemble(&metadata, &note.content);
            let blob = document.to_bytes()?;
            let path = FileManager::generate_output_path(
                &options.output_dir,
                &note.subject,
                &note.level,
                "docx",
            );
            FileManager::write_bytes(&path, &blob)?;
            info!("Wrote {}", path.display());
            docx_path = Some(path);
        }

        let mut html_path = None;
        if options.html {
            let page = LessonPage::from_freeform(&metadata, &note.content);
            let printable = html::render_printable(std::slice::from_ref(&page));
            let path = FileManager::generate_output_path(
                &options.output_dir,
                &note.subject,
                &note.level,
                "html",
            );
            FileManager::write_to_file(&path, &printable)?;
            info!("Wrote {} (print it to PDF from your browser)", path.display());
            html_path = Some(path);
        }

        Ok((docx_path, html_path))
    }

    /// Start a wallet top-up for the configured profile.
    pub async fn topup(
        &self,
        phone: &str,
        provider: MomoProvider,
        amount_pesewas: i64,
        reference: &str,
    ) -> Result<ChargeOutcome> {
        let profile = self.repo.ensure_profile(&self.config.profile_name).await?;
        self.repo.set_profile_phone(&profile.id, phone).await?;

        self.wallet
            .begin_topup(
                &self.gateway(),
                &profile.id,
                phone,
                provider,
                amount_pesewas,
                &self.config.payment.currency,
                reference,
            )
            .await
    }

    /// Verify a top-up and credit the wallet on success.
    pub async fn verify_topup(&self, reference: &str) -> Result<ChargeState> {
        self.wallet.settle_topup(&self.gateway(), reference).await
    }

    /// Wallet balance of the configured profile, in pesewas.
    pub async fn balance(&self) -> Result<i64> {
        let profile = self.repo.ensure_profile(&self.config.profile_name).await?;
        self.wallet.balance(&profile.id).await
    }

    /// Register or update a note template.
    pub async fn add_template(
        &self,
        name: &str,
        description: Option<String>,
        body: String,
    ) -> Result<()> {
        let template = TemplateRecord {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            description,
            body,
            created_at: Utc::now().to_rfc3339(),
        };
        self.repo.upsert_template(&template).await
    }

    /// Look up a stored template by name.
    pub async fn get_template(&self, name: &str) -> Result<Option<TemplateRecord>> {
        self.repo.get_template_by_name(name).await
    }
}
