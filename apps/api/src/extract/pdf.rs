use super::ExtractError;

/// Extracts the concatenated text layer of a PDF document.
pub fn extract(bytes: &[u8]) -> Result<String, ExtractError> {
    pdf_extract::extract_text_from_mem(bytes).map_err(|e| ExtractError::Malformed {
        kind: "PDF",
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Builds a one-page PDF with a single Helvetica text object. Object
    /// offsets in the xref table are computed while assembling, so the file
    /// is internally consistent.
    fn pdf_bytes(text: &str) -> Vec<u8> {
        let content = format!("BT /F1 12 Tf 72 720 Td ({text}) Tj ET");
        let objects = [
            "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
            "<< /Type /Pages /Kids [3 0 R] /Count 1 >>".to_string(),
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] /Contents 4 0 R \
             /Resources << /Font << /F1 5 0 R >> >> >>"
                .to_string(),
            format!(
                "<< /Length {} >>\nstream\n{content}\nendstream",
                content.len()
            ),
            "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica >>".to_string(),
        ];

        let mut pdf = String::from("%PDF-1.4\n");
        let mut offsets = Vec::new();
        for (i, body) in objects.iter().enumerate() {
            offsets.push(pdf.len());
            pdf.push_str(&format!("{} 0 obj\n{body}\nendobj\n", i + 1));
        }

        let xref_offset = pdf.len();
        pdf.push_str(&format!("xref\n0 {}\n", objects.len() + 1));
        pdf.push_str("0000000000 65535 f \n");
        for offset in &offsets {
            pdf.push_str(&format!("{offset:010} 00000 n \n"));
        }
        pdf.push_str(&format!(
            "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{xref_offset}\n%%EOF",
            objects.len() + 1
        ));
        pdf.into_bytes()
    }

    #[test]
    fn extracts_text_from_one_page_pdf() {
        let text = extract(&pdf_bytes("JavaScript, React")).unwrap();
        assert!(!text.trim().is_empty());
        assert!(text.contains("JavaScript"));
        assert!(text.contains("React"));
    }

    #[test]
    fn page_without_text_yields_no_content() {
        let text = extract(&pdf_bytes("")).unwrap();
        assert!(text.trim().is_empty());
    }
}
