use lazy_static::lazy_static;
use ratatui::{
    style::{Modifier, Style},
    text::{Line, Span},
};
use regex::Regex;

lazy_static! {
    static ref NUMBERED_ITEM: Option<Regex> = Regex::new(r"^(\d+)\.\s+(.*)$").ok();
    static ref INLINE: Option<Regex> = Regex::new(r"\*\*(.+?)\*\*|\*(.+?)\*|`([^`]+)`").ok();
}

const HEADING_PREFIXES: [&str; 3] = ["### ", "## ", "# "];

/// Render tutor output as styled lines.
/// Handles headings, `-`/`*`/numbered lists, pipe tables and inline
/// **bold**, *italic* and `code`.
pub fn render_markdown(content: &str) -> Vec<Line<'static>> {
    let lines: Vec<&str> = content.lines().collect();
    let mut result: Vec<Line<'static>> = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i];

        if is_table_row(line) && i + 1 < lines.len() && is_table_separator(lines[i + 1]) {
            let mut rows = vec![parse_table_row(line)];
            i += 2;
            while i < lines.len() && is_table_row(lines[i]) && !is_table_separator(lines[i]) {
                rows.push(parse_table_row(lines[i]));
                i += 1;
            }
            render_table(&rows, &mut result);
            continue;
        }

        i += 1;
        let trimmed = line.trim();

        if let Some(heading) = HEADING_PREFIXES
            .iter()
            .find_map(|prefix| trimmed.strip_prefix(*prefix))
        {
            result.push(Line::from(Span::styled(
                heading.to_string(),
                Style::default().add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
            )));
            continue;
        }

        if let Some(item) = trimmed
            .strip_prefix("- ")
            .or_else(|| trimmed.strip_prefix("* "))
        {
            let mut spans = vec![Span::from("  • ")];
            spans.extend(parse_inline(item));
            result.push(Line::from(spans));
            continue;
        }

        if let Some(re) = NUMBERED_ITEM.as_ref()
            && let Some(caps) = re.captures(trimmed)
            && let (Some(num), Some(item)) = (caps.get(1), caps.get(2))
        {
            let mut spans = vec![Span::from(format!("  {}. ", num.as_str()))];
            spans.extend(parse_inline(item.as_str()));
            result.push(Line::from(spans));
            continue;
        }

        if trimmed.is_empty() {
            result.push(Line::from(""));
        } else {
            result.push(Line::from(parse_inline(line)));
        }
    }

    result
}

fn parse_inline(text: &str) -> Vec<Span<'static>> {
    let Some(re) = INLINE.as_ref() else {
        return vec![Span::from(text.to_string())];
    };

    let mut spans = Vec::new();
    let mut last = 0;
    for caps in re.captures_iter(text) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        if whole.start() > last {
            spans.push(Span::from(text[last..whole.start()].to_string()));
        }
        let styled = if let Some(bold) = caps.get(1) {
            Span::styled(
                bold.as_str().to_string(),
                Style::default().add_modifier(Modifier::BOLD),
            )
        } else if let Some(italic) = caps.get(2) {
            Span::styled(
                italic.as_str().to_string(),
                Style::default().add_modifier(Modifier::ITALIC),
            )
        } else if let Some(code) = caps.get(3) {
            Span::styled(
                code.as_str().to_string(),
                Style::default().add_modifier(Modifier::DIM),
            )
        } else {
            Span::from(whole.as_str().to_string())
        };
        spans.push(styled);
        last = whole.end();
    }
    if last < text.len() || spans.is_empty() {
        spans.push(Span::from(text[last..].to_string()));
    }
    spans
}

fn is_table_row(line: &str) -> bool {
    line.trim().contains('|')
}

fn is_table_separator(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.contains('|')
        && trimmed
            .chars()
            .all(|c| matches!(c, '|' | '-' | ':' | ' '))
}

fn parse_table_row(line: &str) -> Vec<String> {
    line.trim()
        .trim_matches('|')
        .split('|')
        .map(|cell| cell.trim().to_string())
        .collect()
}

/// Tables become "Header: value" blocks so they wrap in narrow panes.
fn render_table(rows: &[Vec<String>], output: &mut Vec<Line<'static>>) {
    let Some((headers, data)) = rows.split_first() else {
        return;
    };

    if data.is_empty() {
        output.push(Line::from(Span::styled(
            headers.join(" │ "),
            Style::default().add_modifier(Modifier::BOLD),
        )));
        return;
    }

    for (row_idx, row) in data.iter().enumerate() {
        if row_idx > 0 {
            output.push(Line::from(""));
        }
        for (j, cell) in row.iter().enumerate() {
            let header = headers.get(j).map(String::as_str).unwrap_or("?");
            let mut spans = vec![Span::styled(
                format!("{}: ", header),
                Style::default().add_modifier(Modifier::BOLD),
            )];
            spans.extend(parse_inline(cell));
            output.push(Line::from(spans));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn joined(lines: &[Line<'static>]) -> String {
        lines
            .iter()
            .map(|l| l.to_string())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_plain_text() {
        let result = render_markdown("Photosynthesis converts light into energy.");
        assert_eq!(result.len(), 1);
        assert_eq!(
            result[0].to_string(),
            "Photosynthesis converts light into energy."
        );
    }

    #[test]
    fn test_table_detection() {
        assert!(is_table_row("| A | B |"));
        assert!(!is_table_row("no pipes here"));
        assert!(is_table_separator("| --- | :---: |"));
        assert!(!is_table_separator("| A | B |"));
        assert_eq!(parse_table_row("| Term | Meaning |"), vec!["Term", "Meaning"]);
    }

    #[test]
    fn test_table_becomes_labelled_rows() {
        let input = "Key terms:\n\n| Term | Meaning |\n|---|---|\n| ATP | energy carrier |\n\nDone";
        let text = joined(&render_markdown(input));
        assert!(text.contains("Key terms:"));
        assert!(text.contains("Term: ATP"));
        assert!(text.contains("Meaning: energy carrier"));
        assert!(text.contains("Done"));
    }

    #[test]
    fn test_bold_is_styled() {
        let result = render_markdown("**Chlorophyll**");
        assert_eq!(result[0].spans.len(), 1);
        assert!(
            result[0].spans[0]
                .style
                .add_modifier
                .intersects(Modifier::BOLD)
        );
    }

    #[test]
    fn test_mixed_inline() {
        let result = render_markdown("The **Calvin** cycle uses `CO2` and *light*.");
        let spans = &result[0].spans;
        assert_eq!(spans[0].content, "The ");
        assert_eq!(spans[1].content, "Calvin");
        assert!(spans[1].style.add_modifier.intersects(Modifier::BOLD));
        assert_eq!(spans[3].content, "CO2");
        assert!(spans[5].style.add_modifier.intersects(Modifier::ITALIC));
        assert_eq!(spans.last().map(|s| s.content.as_ref()), Some("."));
    }

    #[test]
    fn test_lists() {
        let result = render_markdown("- Light reactions\n* Dark reactions\n1. First\n2. Second");
        assert_eq!(result.len(), 4);
        assert!(result[0].to_string().contains("• Light reactions"));
        assert!(result[1].to_string().contains("• Dark reactions"));
        assert!(result[2].to_string().contains("1. First"));
    }

    #[test]
    fn test_headings_of_each_level() {
        for input in ["# Summary", "## Summary", "### Summary"] {
            let result = render_markdown(input);
            assert_eq!(result[0].spans[0].content, "Summary");
            assert!(
                result[0].spans[0]
                    .style
                    .add_modifier
                    .intersects(Modifier::UNDERLINED)
            );
        }
    }

    #[test]
    fn test_empty_lines_are_kept() {
        let result = render_markdown("Line 1\n\nLine 2");
        assert_eq!(result.len(), 3);
        assert_eq!(result[1].to_string(), "");
    }
}
