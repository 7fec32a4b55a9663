// src/services/document_service.rs

use genpdf::{elements, style, Element};

use crate::common::error::AppError;

const FONT_FAMILY: &str = "Roboto";
const PAGE_MARGIN_MM: i32 = 15;
const BODY_FONT_SIZE: u8 = 10;

#[derive(Clone)]
pub struct DocumentService {
    fonts_dir: String,
}

impl DocumentService {
    pub fn new(fonts_dir: String) -> Self {
        Self { fonts_dir }
    }

    /// Gera o PDF do contrato a partir do Markdown devolvido pela IA.
    pub fn render_contract_pdf(&self, title: &str, markdown: &str) -> Result<Vec<u8>, AppError> {
        // 1. Texto limpo, linha a linha
        let clean_text = strip_markdown(markdown);

        // 2. Configura o PDF
        // Carrega a fonte da pasta configurada (FONTS_DIR)
        let font_family = genpdf::fonts::from_files(&self.fonts_dir, FONT_FAMILY, None)
            .map_err(|_| AppError::FontNotFound(format!("Fonte {} não encontrada em {}", FONT_FAMILY, self.fonts_dir)))?;

        let mut doc = genpdf::Document::new(font_family);
        doc.set_title(title);
        doc.set_font_size(BODY_FONT_SIZE);
        let mut decorator = genpdf::SimplePageDecorator::new();
        decorator.set_margins(PAGE_MARGIN_MM);
        doc.set_page_decorator(decorator);

        doc.push(elements::Paragraph::new(title).styled(style::Style::new().bold().with_font_size(14)));
        doc.push(elements::Break::new(1.5));

        // 3. Corpo
        for line in clean_text.lines() {
            if line.trim().is_empty() {
                doc.push(elements::Break::new(1));
            } else {
                doc.push(elements::Paragraph::new(line));
            }
        }

        // 4. Renderiza para um buffer em memória
        let mut buffer = Vec::new();
        doc.render(&mut buffer)
            .map_err(|e| anyhow::anyhow!("Falha ao renderizar o PDF: {}", e))?;

        Ok(buffer)
    }
}

/// Remove a marcação Markdown que não faz sentido no PDF:
/// cabeçalhos (`#` .. `######` + espaço), ênfase (`*`, `**`), réguas (`---`)
/// e linhas em branco triplas.
pub fn strip_markdown(markdown: &str) -> String {
    let without_headers = strip_header_marks(markdown);
    without_headers
        .replace('*', "")
        .replace("---", "")
        .replace("\n\n\n", "\n\n")
}

fn strip_header_marks(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut i = 0;

    while i < chars.len() {
        if chars[i] != '#' {
            out.push(chars[i]);
            i += 1;
            continue;
        }

        let run_start = i;
        while i < chars.len() && chars[i] == '#' {
            i += 1;
        }
        let run = i - run_start;

        if i < chars.len() && chars[i].is_whitespace() {
            // Até 6 '#' colados ao espaço saem junto com ele
            let kept = run.saturating_sub(6);
            out.extend(std::iter::repeat_n('#', kept));
            i += 1;
        } else {
            out.extend(std::iter::repeat_n('#', run));
        }
    }

    out
}

/// `"{título}_sozlesme.pdf"`, só com caracteres seguros para o cabeçalho HTTP.
pub fn contract_filename(project_title: &str) -> String {
    let safe: String = project_title
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    format!("{}_sozlesme.pdf", safe)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_headers_emphasis_and_rules() {
        let markdown = "# TAŞERON SÖZLEŞMESİ\n\n## 1. TARAFLAR\n**İşveren:** Mehmet\n*not*\n---\nSon";
        assert_eq!(
            strip_markdown(markdown),
            "TAŞERON SÖZLEŞMESİ\n\n1. TARAFLAR\nİşveren: Mehmet\nnot\n\nSon"
        );
    }

    #[test]
    fn collapses_triple_newlines_once() {
        assert_eq!(strip_markdown("a\n\n\nb"), "a\n\nb");
        assert_eq!(strip_markdown("a\n---\n\nb"), "a\n\nb");
    }

    #[test]
    fn hash_without_space_is_kept() {
        assert_eq!(strip_markdown("Madde #3"), "Madde #3");
        assert_eq!(strip_markdown("####### yedi"), "#yedi");
    }

    #[test]
    fn filename_is_ascii_safe() {
        assert_eq!(contract_filename("Villa-2025"), "Villa-2025_sozlesme.pdf");
        assert_eq!(contract_filename("Çatı İşi"), "_at___i_sozlesme.pdf");
    }

    #[test]
    fn missing_font_is_reported() {
        let service = DocumentService::new("/nonexistent/fonts".to_string());
        assert!(matches!(
            service.render_contract_pdf("Villa", "# Sözleşme"),
            Err(AppError::FontNotFound(_))
        ));
    }
}
