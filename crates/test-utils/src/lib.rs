use async_trait::async_trait;
use sparky::errors::SparkyError;
use sparky::providers::ai::{AiProvider, CompletionOptions, EmbeddingProvider};
use sparky::providers::index::VectorIndex;
use sparky::types::{IndexStats, Message, RetrievalFilter, ScoredChunk, VectorRecord};
use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::{Arc, Mutex};

// --- Mock AI Provider ---

/// A completion provider that answers from pre-programmed responses.
///
/// Responses are keyed by a substring of the first message (usually the
/// system prompt). Every call is recorded for assertion.
#[derive(Clone, Debug)]
pub struct MockAiProvider {
    responses: Arc<Mutex<HashMap<String, String>>>,
    default_response: Arc<Mutex<Option<String>>>,
    failure: Arc<Mutex<Option<String>>>,
    calls: Arc<Mutex<Vec<(Vec<Message>, CompletionOptions)>>>,
}

impl MockAiProvider {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(HashMap::new())),
            default_response: Arc::new(Mutex::new(None)),
            failure: Arc::new(Mutex::new(None)),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// A provider that returns `response` for every call.
    pub fn with_reply(response: &str) -> Self {
        let provider = Self::new();
        *provider.default_response.lock().unwrap() = Some(response.to_string());
        provider
    }

    /// A provider whose every call fails with an API error.
    pub fn failing(message: &str) -> Self {
        let provider = Self::new();
        *provider.failure.lock().unwrap() = Some(message.to_string());
        provider
    }

    /// Pre-programs a response for a specific prompt.
    /// The key should be a unique substring of the first message.
    pub fn add_response(&self, key: &str, response: &str) {
        let mut responses = self.responses.lock().unwrap();
        responses.insert(key.to_string(), response.to_string());
    }

    /// Retrieves the recorded message lists for assertion.
    pub fn get_calls(&self) -> Vec<Vec<Message>> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(messages, _)| messages.clone())
            .collect()
    }

    /// Retrieves the sampling options of each recorded call.
    pub fn get_options(&self) -> Vec<CompletionOptions> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(_, options)| *options)
            .collect()
    }
}

impl Default for MockAiProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AiProvider for MockAiProvider {
    async fn chat(
        &self,
        messages: &[Message],
        options: CompletionOptions,
    ) -> Result<String, SparkyError> {
        self.calls
            .lock()
            .unwrap()
            .push((messages.to_vec(), options));

        if let Some(message) = self.failure.lock().unwrap().clone() {
            return Err(SparkyError::AiApi(message));
        }

        let first = messages.first().map(|m| m.content.as_str()).unwrap_or("");
        let responses = self.responses.lock().unwrap();
        for (key, response) in responses.iter() {
            if first.contains(key) {
                return Ok(response.clone());
            }
        }

        if let Some(response) = self.default_response.lock().unwrap().clone() {
            return Ok(response);
        }

        Err(SparkyError::AiApi(format!(
            "MockAiProvider: No response programmed for first message. Got: '{first}'"
        )))
    }
}

// --- Stub Embedding Provider ---

/// Returns the same vector for every input and records the inputs.
#[derive(Clone, Debug)]
pub struct StubEmbeddingProvider {
    vector: Vec<f32>,
    fail: bool,
    inputs: Arc<Mutex<Vec<String>>>,
}

impl StubEmbeddingProvider {
    pub fn new(vector: Vec<f32>) -> Self {
        Self {
            vector,
            fail: false,
            inputs: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new(Vec::new())
        }
    }

    pub fn get_inputs(&self) -> Vec<String> {
        self.inputs.lock().unwrap().clone()
    }
}

impl Default for StubEmbeddingProvider {
    fn default() -> Self {
        Self::new(vec![0.1, 0.2, 0.3])
    }
}

#[async_trait]
impl EmbeddingProvider for StubEmbeddingProvider {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, SparkyError> {
        self.inputs.lock().unwrap().push(text.to_string());
        if self.fail {
            return Err(SparkyError::EmbeddingApi(
                "StubEmbeddingProvider: embedding service unavailable".to_string(),
            ));
        }
        Ok(self.vector.clone())
    }
}

// --- Stub Vector Index ---

/// A recorded `VectorIndex::query` call.
#[derive(Clone, Debug, PartialEq)]
pub struct RecordedQuery {
    pub vector: Vec<f32>,
    pub top_k: usize,
    pub filter: RetrievalFilter,
}

/// Answers every query with a fixed list of matches and records all traffic.
#[derive(Clone, Debug, Default)]
pub struct StubVectorIndex {
    matches: Vec<ScoredChunk>,
    fail: bool,
    queries: Arc<Mutex<Vec<RecordedQuery>>>,
    upserts: Arc<Mutex<Vec<Vec<VectorRecord>>>>,
    deletes: Arc<Mutex<usize>>,
}

impl StubVectorIndex {
    pub fn new(matches: Vec<ScoredChunk>) -> Self {
        Self {
            matches,
            ..Default::default()
        }
    }

    /// An index whose every call fails, as if the collection were missing.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn get_queries(&self) -> Vec<RecordedQuery> {
        self.queries.lock().unwrap().clone()
    }

    /// Upserted batches, in call order.
    pub fn get_upserts(&self) -> Vec<Vec<VectorRecord>> {
        self.upserts.lock().unwrap().clone()
    }

    pub fn delete_count(&self) -> usize {
        *self.deletes.lock().unwrap()
    }

    fn check(&self) -> Result<(), SparkyError> {
        if self.fail {
            return Err(SparkyError::VectorIndexApi(
                "StubVectorIndex: index not found".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl VectorIndex for StubVectorIndex {
    fn name(&self) -> &str {
        "StubIndex"
    }

    async fn query(
        &self,
        vector: &[f32],
        top_k: usize,
        filter: &RetrievalFilter,
    ) -> Result<Vec<ScoredChunk>, SparkyError> {
        self.queries.lock().unwrap().push(RecordedQuery {
            vector: vector.to_vec(),
            top_k,
            filter: filter.clone(),
        });
        self.check()?;
        Ok(self.matches.iter().take(top_k).cloned().collect())
    }

    async fn upsert(&self, records: &[VectorRecord]) -> Result<usize, SparkyError> {
        self.check()?;
        self.upserts.lock().unwrap().push(records.to_vec());
        Ok(records.len())
    }

    async fn delete_all(&self) -> Result<(), SparkyError> {
        self.check()?;
        *self.deletes.lock().unwrap() += 1;
        Ok(())
    }

    async fn describe_stats(&self) -> Result<IndexStats, SparkyError> {
        self.check()?;
        let total = self.upserts.lock().unwrap().iter().map(Vec::len).sum::<usize>();
        Ok(IndexStats {
            dimension: None,
            total_vector_count: total as u64,
        })
    }
}

// --- Test-Specific Helpers ---
#[cfg(feature = "pdf")]
pub mod helpers {
    use anyhow::Result;
    use printpdf::{
        BuiltinFont, Layer, Mm, Op, ParsedFont, PdfDocument, PdfPage, PdfSaveOptions, Pt, TextItem,
        TextMatrix, TextRenderingMode,
    };

    /// Generates a single-page book PDF with an embedded subset font, one text
    /// line per entry of `lines`. Text is glyph-encoded, as in most published books.
    pub fn generate_test_pdf(lines: &[&str]) -> Result<Vec<u8>> {
        let mut doc = PdfDocument::new("Test Book");
        let mut page = PdfPage::new(Mm(210.0), Mm(297.0), vec![]);
        let layer_id = doc.add_layer(&Layer::new("Page text"));

        let font_bytes = BuiltinFont::Helvetica.get_subset_font().bytes;
        let font = ParsedFont::from_bytes(&font_bytes, 0, &mut Vec::new())
            .ok_or_else(|| anyhow::anyhow!("Failed to parse built-in font"))?;
        let font_id = doc.add_font(&font);

        let mut ops = vec![
            Op::BeginLayer {
                layer_id: layer_id.clone(),
            },
            Op::SetFontSize {
                size: Pt(12.0),
                font: font_id.clone(),
            },
        ];
        for (i, line) in lines.iter().enumerate() {
            let y = 280.0 - 8.0 * i as f32;
            ops.extend([
                Op::StartTextSection,
                Op::SetTextMatrix {
                    matrix: TextMatrix::Translate(Mm(10.0).into(), Mm(y).into()),
                },
                Op::SetTextRenderingMode {
                    mode: TextRenderingMode::Fill,
                },
                Op::WriteText {
                    items: vec![TextItem::Text(line.to_string())],
                    font: font_id.clone(),
                },
                Op::EndTextSection,
            ]);
        }
        ops.push(Op::EndLayer { layer_id });

        page.ops = ops;
        doc.pages.push(page);

        let mut warnings = Vec::new();
        let bytes = doc.save(&PdfSaveOptions::default(), &mut warnings);
        if !warnings.is_empty() {
            eprintln!("PDF generation warnings: {warnings:?}");
        }

        Ok(bytes)
    }

    /// Generates a PDF that draws its text as literal strings in the standard
    /// Helvetica font, so extraction returns it verbatim. Each entry of `pages`
    /// is one page; its lines become separate text objects.
    pub fn generate_text_pdf(pages: &[&str]) -> Vec<u8> {
        let page_count = pages.len();
        // Objects: 1 catalog, 2 page tree, 3 font, then a (page, content) pair per page.
        let page_ids: Vec<usize> = (0..page_count).map(|i| 4 + 2 * i).collect();
        let kids = page_ids
            .iter()
            .map(|id| format!("{id} 0 R"))
            .collect::<Vec<_>>()
            .join(" ");

        let mut objects = vec![
            "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
            format!("<< /Type /Pages /Kids [{kids}] /Count {page_count} >>"),
            "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica >>".to_string(),
        ];
        for (page_id, text) in page_ids.iter().zip(pages) {
            let mut content = String::new();
            for (i, line) in text.lines().enumerate() {
                let escaped = line
                    .replace('\\', "\\\\")
                    .replace('(', "\\(")
                    .replace(')', "\\)");
                let y = 770 - 16 * i as i32;
                content.push_str(&format!("BT /F1 12 Tf 72 {y} Td ({escaped}) Tj ET\n"));
            }
            objects.push(format!(
                "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 595 842] /Resources << /Font << /F1 3 0 R >> >> /Contents {} 0 R >>",
                page_id + 1
            ));
            objects.push(format!(
                "<< /Length {} >>\nstream\n{content}endstream",
                content.len()
            ));
        }

        let mut pdf = String::from("%PDF-1.4\n");
        let mut offsets = Vec::with_capacity(objects.len());
        for (i, object) in objects.iter().enumerate() {
            offsets.push(pdf.len());
            pdf.push_str(&format!("{} 0 obj\n{object}\nendobj\n", i + 1));
        }
        let xref_offset = pdf.len();
        pdf.push_str(&format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1));
        for offset in offsets {
            pdf.push_str(&format!("{offset:010} 00000 n \n"));
        }
        pdf.push_str(&format!(
            "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{xref_offset}\n%%EOF\n",
            objects.len() + 1
        ));
        pdf.into_bytes()
    }
}
