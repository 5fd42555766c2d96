//! Hand-built single-page PDF used when the browser path fails.
//!
//! The document is PDF 1.4 with the standard Helvetica fonts, a bold title
//! line and the page text wrapped below it. Styling is lost.

use lazy_static::lazy_static;
use regex::Regex;

/// Body text is truncated to this many characters.
pub const MAX_BODY_CHARS: usize = 2500;

const PAGE_WIDTH: u32 = 595;
const PAGE_HEIGHT: u32 = 842;
const MARGIN: u32 = 56;
const LINE_CHARS: usize = 90;
const LEADING: u32 = 14;
const FONT_SIZE: u32 = 10;
const BODY_TOP: u32 = PAGE_HEIGHT - MARGIN - 36;
const BODY_HEIGHT: u32 = BODY_TOP - MARGIN;
/// Lines that fit at the regular leading.
const MAX_LINES: usize = (BODY_HEIGHT / LEADING) as usize;

lazy_static! {
    static ref TITLE_RE: Regex = Regex::new(r"(?is)<title[^>]*>(.*?)</title>").expect("valid regex");
    static ref HIDDEN_RE: Regex =
        Regex::new(r"(?is)<(head|style|script)[^>]*>.*?</(head|style|script)>").expect("valid regex");
    static ref BREAK_RE: Regex =
        Regex::new(r"(?i)<br\s*/?>|</(p|div|h[1-6]|li|tr|section|header|footer|table|ul|ol)>")
            .expect("valid regex");
    static ref CELL_RE: Regex = Regex::new(r"(?i)</t[dh]>").expect("valid regex");
    static ref TAG_RE: Regex = Regex::new(r"(?s)<[^>]*>").expect("valid regex");
    static ref SPACE_RE: Regex = Regex::new(r"[ \t\r\f]+").expect("valid regex");
}

fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&middot;", "-")
        .replace("&#9744;", "[ ]")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

/// Contents of the `<title>` element, if any.
pub fn html_title(html: &str) -> Option<String> {
    TITLE_RE
        .captures(html)
        .and_then(|caps| caps.get(1))
        .map(|m| decode_entities(m.as_str().trim()))
        .filter(|title| !title.is_empty())
}

/// Visible text of an HTML document, one block element per line.
pub fn html_to_text(html: &str) -> String {
    let visible = HIDDEN_RE.replace_all(html, "");
    let broken = BREAK_RE.replace_all(&visible, "\n");
    let celled = CELL_RE.replace_all(&broken, "  ");
    let stripped = TAG_RE.replace_all(&celled, "");
    let decoded = decode_entities(&stripped);

    decoded
        .lines()
        .map(|line| SPACE_RE.replace_all(line, " ").trim().to_string())
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Escape a string for a PDF literal. Non-ASCII characters become `?`
/// since the standard fonts only cover the WinAnsi range.
pub fn escape_pdf_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '(' => out.push_str("\\("),
            ')' => out.push_str("\\)"),
            c if c.is_ascii() && !c.is_ascii_control() => out.push(c),
            _ => out.push('?'),
        }
    }
    out
}

fn wrap_line(line: &str, width: usize, out: &mut Vec<String>) {
    let mut current = String::new();
    for word in line.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();
        while word.len() > width {
            if !current.is_empty() {
                out.push(std::mem::take(&mut current));
            }
            out.push(word.drain(..width).collect());
        }
        let word: String = word.into_iter().collect();
        if word.is_empty() {
            continue;
        }
        let needed = if current.is_empty() {
            word.chars().count()
        } else {
            current.chars().count() + 1 + word.chars().count()
        };
        if needed > width && !current.is_empty() {
            out.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(&word);
    }
    if !current.is_empty() {
        out.push(current);
    }
}

fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Wrapped body lines. A body with too many short lines for the page is
/// reflowed as one paragraph so no text is dropped.
fn body_lines(body: &str) -> Vec<String> {
    let text = truncate_chars(body, MAX_BODY_CHARS);
    let mut lines = Vec::new();
    for line in text.lines() {
        wrap_line(line, LINE_CHARS, &mut lines);
    }
    if lines.len() > MAX_LINES {
        lines.clear();
        wrap_line(&text.split_whitespace().collect::<Vec<_>>().join(" "), LINE_CHARS, &mut lines);
    }
    lines
}

fn content_stream(title: &str, body: &str) -> String {
    let lines = body_lines(body);

    let mut stream = format!(
        "BT\n/F2 18 Tf\n{MARGIN} {} Td\n({}) Tj\nET\n",
        PAGE_HEIGHT - MARGIN - 6,
        escape_pdf_text(title)
    );
    if !lines.is_empty() {
        // Tighten the leading when a reflowed body still overruns the page.
        let leading = LEADING.min(BODY_HEIGHT / lines.len() as u32).max(1);
        let font_size = (FONT_SIZE * leading / LEADING).max(5);
        stream.push_str(&format!(
            "BT\n/F1 {font_size} Tf\n{leading} TL\n{MARGIN} {BODY_TOP} Td\n"
        ));
        for (i, line) in lines.iter().enumerate() {
            if i > 0 {
                stream.push_str("T*\n");
            }
            stream.push_str(&format!("({}) Tj\n", escape_pdf_text(line)));
        }
        stream.push_str("ET\n");
    }
    stream
}

/// Build a valid single-page PDF with `title` and the first
/// [`MAX_BODY_CHARS`] characters of `body`.
pub fn minimal_pdf(title: &str, body: &str) -> Vec<u8> {
    let stream = content_stream(title, body);

    let objects = [
        "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
        "<< /Type /Pages /Kids [3 0 R] /Count 1 >>".to_string(),
        format!(
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {PAGE_WIDTH} {PAGE_HEIGHT}] \
             /Resources << /Font << /F1 5 0 R /F2 6 0 R >> >> /Contents 4 0 R >>"
        ),
        format!(
            "<< /Length {} >>\nstream\n{}endstream",
            stream.len(),
            stream
        ),
        "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>"
            .to_string(),
        "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica-Bold /Encoding /WinAnsiEncoding >>"
            .to_string(),
    ];

    let mut pdf = String::from("%PDF-1.4\n");
    let mut offsets = Vec::with_capacity(objects.len());
    for (i, body) in objects.iter().enumerate() {
        offsets.push(pdf.len());
        pdf.push_str(&format!("{} 0 obj\n{}\nendobj\n", i + 1, body));
    }

    let xref_offset = pdf.len();
    pdf.push_str(&format!("xref\n0 {}\n", objects.len() + 1));
    pdf.push_str("0000000000 65535 f \n");
    for offset in &offsets {
        pdf.push_str(&format!("{offset:010} 00000 n \n"));
    }
    pdf.push_str(&format!(
        "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
        objects.len() + 1,
        xref_offset
    ));

    pdf.into_bytes()
}
