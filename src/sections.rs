//! First parsing pass: split a document into level-2 sections.
//!
//! A heading is a line starting with 1–6 `#` followed by whitespace.
//! Headings of level 1 or 2 end the current section; a level-2 heading also
//! opens a new one. Deeper headings are ordinary body lines.

/// A `## Title` section and the lines under it, up to the next
/// level-1/level-2 heading or the end of the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section<'a> {
    pub title: &'a str,
    /// 1-based line number of the heading
    pub heading_line: usize,
    /// Body lines with their 1-based line numbers
    pub lines: Vec<(usize, &'a str)>,
}

impl Section<'_> {
    /// Whether the heading starts with any of the keywords (case-insensitive).
    pub fn matches(&self, keywords: &[String]) -> bool {
        let title = self.title.to_lowercase();
        keywords
            .iter()
            .any(|k| title.starts_with(k.trim().to_lowercase().as_str()))
    }
}

/// Heading level and title of a line, if it is an ATX heading.
fn heading(line: &str) -> Option<(usize, &str)> {
    let trimmed = line.trim_start();
    let level = trimmed.chars().take_while(|&c| c == '#').count();
    if level == 0 || level > 6 {
        return None;
    }
    let rest = &trimmed[level..];
    if !rest.is_empty() && !rest.starts_with(char::is_whitespace) {
        return None;
    }
    Some((level, rest.trim().trim_end_matches('#').trim_end()))
}

/// Split `text` into its level-2 sections, in document order.
pub fn split_sections(text: &str) -> Vec<Section<'_>> {
    let mut sections = Vec::new();
    let mut current: Option<Section> = None;

    for (idx, line) in text.lines().enumerate() {
        let line_no = idx + 1;
        match heading(line) {
            Some((level, title)) if level <= 2 => {
                if let Some(done) = current.take() {
                    sections.push(done);
                }
                if level == 2 {
                    current = Some(Section {
                        title,
                        heading_line: line_no,
                        lines: Vec::new(),
                    });
                }
            }
            _ => {
                if let Some(sec) = current.as_mut() {
                    sec.lines.push((line_no, line));
                }
            }
        }
    }
    if let Some(done) = current {
        sections.push(done);
    }
    sections
}

/// First section whose heading matches one of the keywords.
pub fn find_section<'s, 'a>(
    sections: &'s [Section<'a>],
    keywords: &[String],
) -> Option<&'s Section<'a>> {
    sections.iter().find(|s| s.matches(keywords))
}
