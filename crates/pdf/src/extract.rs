//! # PDF Text Extraction

use crate::errors::IngestError;
use pdf::file::FileOptions;
use tracing::debug;

/// Extracts the text of each page, in page order.
///
/// Parsing is CPU-bound, so it runs on the blocking thread pool.
pub async fn extract_pages_from_pdf(pdf_data: &[u8]) -> Result<Vec<String>, IngestError> {
    let data = pdf_data.to_vec();
    let pages = tokio::task::spawn_blocking(move || extract_pages(&data)).await??;
    debug!(pages = pages.len(), "Extracted PDF text");
    Ok(pages)
}

/// Extracts the whole text of a PDF, pages separated by blank lines.
pub async fn extract_text_from_pdf(pdf_data: &[u8]) -> Result<String, IngestError> {
    Ok(extract_pages_from_pdf(pdf_data).await?.join("\n\n"))
}

fn extract_pages(data: &[u8]) -> Result<Vec<String>, IngestError> {
    let file = FileOptions::cached()
        .load(data)
        .map_err(|e| IngestError::PdfParse(e.to_string()))?;
    let resolver = file.resolver();
    let mut pages = Vec::new();

    for page_num in 0..file.num_pages() {
        let page = file
            .get_page(page_num)
            .map_err(|e| IngestError::PdfParse(e.to_string()))?;
        let mut text = String::new();
        if let Some(content) = &page.contents {
            let operations = content
                .operations(&resolver)
                .map_err(|e| IngestError::PdfParse(e.to_string()))?;
            for op in operations.iter() {
                match op {
                    pdf::content::Op::TextDraw { text: drawn } => {
                        text.push_str(&drawn.to_string_lossy());
                    }
                    pdf::content::Op::TextDrawAdjusted { array } => {
                        for item in array.iter() {
                            if let pdf::content::TextDrawAdjusted::Text(drawn) = item {
                                text.push_str(&drawn.to_string_lossy());
                            }
                        }
                    }
                    // Each text object is a line of book text.
                    pdf::content::Op::EndText if !text.ends_with('\n') && !text.is_empty() => {
                        text.push('\n');
                    }
                    _ => {}
                }
            }
        }
        pages.push(text);
    }
    Ok(pages)
}
