//! Chat session: processed documents plus message history
//!
//! A session starts empty. Processing uploaded PDFs builds a fresh knowledge
//! base (vector index and chat model) that replaces any previous one; until
//! then questions are recorded but not answered.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::config::RagConfig;
use crate::error::{Error, Result};
use crate::generation::PromptBuilder;
use crate::ingestion::{ExtractedPdf, IngestPipeline};
use crate::providers::{ChatModel, Providers};
use crate::retrieval::{Retriever, VectorIndex};
use crate::types::{timestamp_now, ChatMessage, Document};

/// A PDF as received from the user
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    pub fn new(filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            bytes,
        }
    }
}

/// Outcome of processing a batch of uploads
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessSummary {
    /// Documents that made it into the index
    pub documents: Vec<Document>,
    /// Uploads skipped because their text matched an earlier upload
    pub skipped_duplicates: Vec<String>,
    /// Total chunks indexed
    pub chunks: usize,
}

struct KnowledgeBase {
    retriever: Retriever,
    chat: Arc<dyn ChatModel>,
}

/// Single-user chat session over processed documents
pub struct ChatSession {
    config: RagConfig,
    pipeline: IngestPipeline,
    /// Providers supplied up front; otherwise created from config on demand
    providers: Option<Providers>,
    messages: RwLock<Vec<ChatMessage>>,
    knowledge: RwLock<Option<Arc<KnowledgeBase>>>,
}

impl ChatSession {
    /// Create a session using the hosted providers from `config`
    pub fn new(config: RagConfig) -> Result<Self> {
        let pipeline = IngestPipeline::new(&config.chunking)?;
        Ok(Self {
            config,
            pipeline,
            providers: None,
            messages: RwLock::new(Vec::new()),
            knowledge: RwLock::new(None),
        })
    }

    /// Create a session with explicit providers
    pub fn with_providers(config: RagConfig, providers: Providers) -> Result<Self> {
        let mut session = Self::new(config)?;
        session.providers = Some(providers);
        Ok(session)
    }

    fn providers(&self) -> Result<Providers> {
        match &self.providers {
            Some(providers) => Ok(providers.clone()),
            None => Providers::from_config(&self.config.api),
        }
    }

    /// Extract, chunk and index the given PDFs, replacing the current knowledge base
    pub async fn process_documents(&self, files: Vec<UploadedFile>) -> Result<ProcessSummary> {
        if files.is_empty() {
            return Err(Error::NoDocuments);
        }

        tracing::info!("Processing {} uploaded file(s)", files.len());

        let extracted = tokio::task::spawn_blocking(move || extract_all(files))
            .await
            .map_err(|e| Error::internal(format!("Task join error: {}", e)))??;

        let mut seen: Vec<String> = Vec::new();
        let mut skipped_duplicates = Vec::new();
        let mut documents = Vec::new();
        let mut chunks = Vec::new();

        for (pdf, file_size) in extracted {
            // Text-less PDFs all hash alike, so only compare real content
            if !pdf.text.trim().is_empty() {
                if seen.contains(&pdf.content_hash) {
                    tracing::warn!("Skipping {}: same content as an earlier upload", pdf.filename);
                    skipped_duplicates.push(pdf.filename);
                    continue;
                }
                seen.push(pdf.content_hash.clone());
            }

            let ingested = self.pipeline.chunk(&pdf, file_size);
            documents.push(ingested.document);
            chunks.extend(ingested.chunks);
        }

        let providers = self.providers()?;
        let chunk_count = chunks.len();
        let index =
            VectorIndex::build(chunks, providers.embedder.as_ref(), self.config.retrieval.metric)
                .await?;

        self.install(index, providers);

        tracing::info!(
            "Processed {} document(s) into {} chunks",
            documents.len(),
            chunk_count
        );

        Ok(ProcessSummary {
            documents,
            skipped_duplicates,
            chunks: chunk_count,
        })
    }

    /// Use a previously saved index instead of processing uploads
    pub fn load_index(&self, index: VectorIndex) -> Result<()> {
        if index.is_empty() {
            return Err(Error::EmptyIndex);
        }
        let providers = self.providers()?;
        self.install(index, providers);
        Ok(())
    }

    fn install(&self, index: VectorIndex, providers: Providers) {
        let retriever = Retriever::new(
            Arc::new(index),
            providers.embedder,
            self.config.retrieval.top_k,
        );
        *self.knowledge.write() = Some(Arc::new(KnowledgeBase {
            retriever,
            chat: providers.chat,
        }));
    }

    /// Answer a question from the processed documents.
    ///
    /// The question is recorded even when no documents are processed yet, in
    /// which case `Error::NotReady` is returned and no answer is recorded.
    pub async fn ask(&self, question: &str) -> Result<ChatMessage> {
        let question = question.trim();
        if question.is_empty() {
            return Err(Error::InvalidQuery("Question must not be empty".to_string()));
        }

        let timestamp = timestamp_now();
        self.messages
            .write()
            .push(ChatMessage::user(question, timestamp.clone()));

        let knowledge = self.knowledge.read().clone().ok_or(Error::NotReady)?;

        let results = knowledge.retriever.retrieve(question).await?;
        let context = PromptBuilder::build_context(&results);
        let prompt = PromptBuilder::build_prompt(question, &context);

        tracing::debug!(
            "Asking {} with {} context chunks from {}",
            knowledge.chat.model(),
            results.len(),
            results
                .iter()
                .map(|r| r.chunk.source.format_citation())
                .collect::<Vec<_>>()
                .join("; ")
        );
        let answer = knowledge.chat.complete(&prompt).await?;

        let message = ChatMessage::assistant(answer, timestamp);
        self.messages.write().push(message.clone());
        Ok(message)
    }

    /// True once documents are processed or an index is loaded
    pub fn is_ready(&self) -> bool {
        self.knowledge.read().is_some()
    }

    pub fn messages(&self) -> Vec<ChatMessage> {
        self.messages.read().clone()
    }

    pub fn clear_messages(&self) {
        self.messages.write().clear();
    }

    /// Filenames in the current knowledge base
    pub fn documents(&self) -> Vec<String> {
        self.knowledge
            .read()
            .as_ref()
            .map(|kb| kb.retriever.index().documents())
            .unwrap_or_default()
    }

    /// Number of indexed chunks
    pub fn chunk_count(&self) -> usize {
        self.knowledge
            .read()
            .as_ref()
            .map(|kb| kb.retriever.index().len())
            .unwrap_or(0)
    }
}

fn extract_all(files: Vec<UploadedFile>) -> Result<Vec<(ExtractedPdf, u64)>> {
    files
        .into_iter()
        .map(|file| {
            let pdf = crate::ingestion::PdfExtractor::extract(&file.filename, &file.bytes)?;
            Ok((pdf, file.bytes.len() as u64))
        })
        .collect()
}
