use std::path::Path;

pub const PREVIEW_CHAR_LIMIT: usize = 500;
pub const FALLBACK_DOWNLOAD_STEM: &str = "extracted_text";

const SIZE_UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];

/// Groups digits in threes: `1234567` becomes `1,234,567`.
pub fn format_count(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Human-readable size in base-1024 units, at most two decimals.
pub fn format_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut unit = 0;
    while unit < SIZE_UNITS.len() - 1 && bytes >= 1024u64.pow(unit as u32 + 1) {
        unit += 1;
    }

    let value = bytes as f64 / 1024f64.powi(unit as i32);
    let rounded = (value * 100.0).round() / 100.0;
    format!("{} {}", rounded, SIZE_UNITS[unit])
}

pub fn format_pages(pages: u32) -> String {
    if pages == 1 {
        "1 page".to_string()
    } else {
        format!("{} pages", format_count(pages as u64))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Preview<'a> {
    pub text: &'a str,
    pub truncated: bool,
}

impl Preview<'_> {
    pub fn display(&self) -> String {
        if self.truncated {
            format!("{}...", self.text)
        } else {
            self.text.to_string()
        }
    }
}

/// First `PREVIEW_CHAR_LIMIT` characters of `full_text`.
pub fn preview_text(full_text: &str) -> Preview<'_> {
    match full_text.char_indices().nth(PREVIEW_CHAR_LIMIT) {
        Some((cut, _)) => Preview {
            text: &full_text[..cut],
            truncated: true,
        },
        None => Preview {
            text: full_text,
            truncated: false,
        },
    }
}

/// `report.v2.pdf` becomes `report.v2_extracted_text.txt`. Directory parts of
/// the name are dropped.
pub fn download_file_name(filename: &str) -> String {
    let base = Path::new(filename)
        .file_name()
        .and_then(|n| n.to_str())
        .filter(|n| !n.is_empty())
        .unwrap_or(FALLBACK_DOWNLOAD_STEM);

    let stem = match base.rfind('.') {
        Some(dot) if dot + 1 < base.len() => &base[..dot],
        _ => base,
    };
    format!("{}_extracted_text.txt", stem)
}
