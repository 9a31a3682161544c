//! Markdown-ish to HTML conversion for summary emails

/// Escape text for inclusion in HTML, including quotes.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Render a summary narrative as a small HTML body.
///
/// Handles `#`..`###` headings and `-`/`*` bullet lists; every other
/// non-blank line becomes text followed by `<br>`.
pub fn render_html(body: &str) -> String {
    let mut html = String::new();
    let mut in_list = false;

    for line in body.lines() {
        let line = escape_html(line.trim_end());

        if let Some(item) = line
            .strip_prefix("- ")
            .or_else(|| line.strip_prefix("* "))
        {
            if !in_list {
                html.push_str("<ul>");
                in_list = true;
            }
            html.push_str("<li>");
            html.push_str(item.trim());
            html.push_str("</li>");
            continue;
        }

        if in_list {
            html.push_str("</ul>");
            in_list = false;
        }

        if let Some((level, text)) = heading(&line) {
            html.push_str(&format!("<h{level}>{text}</h{level}>"));
        } else if !line.trim().is_empty() {
            html.push_str(&line);
            html.push_str("<br>");
        }
    }

    if in_list {
        html.push_str("</ul>");
    }

    html
}

/// `# Title` renders as `<h2>` so the email subject stays the top heading.
fn heading(line: &str) -> Option<(usize, &str)> {
    let hashes = line.chars().take_while(|c| *c == '#').count();
    if !(1..=3).contains(&hashes) {
        return None;
    }
    let text = line[hashes..].strip_prefix(' ')?;
    Some((hashes + 1, text.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_markup_and_quotes() {
        assert_eq!(
            escape_html(r#"<b>"Tom" & 'Jerry'</b>"#),
            "&lt;b&gt;&quot;Tom&quot; &amp; &#x27;Jerry&#x27;&lt;/b&gt;"
        );
    }

    #[test]
    fn renders_headings_lists_and_text() {
        let body = "# Weekly sync\nBudget review.\n\n## Action items\n- Ann: book room\n- Bob: send notes\nThanks";
        assert_eq!(
            render_html(body),
            "<h2>Weekly sync</h2>Budget review.<br><h3>Action items</h3>\
<ul><li>Ann: book room</li><li>Bob: send notes</li></ul>Thanks<br>"
        );
    }

    #[test]
    fn list_at_end_is_closed() {
        assert_eq!(render_html("* one\n* two"), "<ul><li>one</li><li>two</li></ul>");
    }

    #[test]
    fn hashes_without_space_are_text() {
        assert_eq!(render_html("#hashtag"), "#hashtag<br>");
        assert_eq!(render_html("#### deep"), "#### deep<br>");
    }

    #[test]
    fn user_markup_is_not_injected() {
        assert_eq!(
            render_html("- <script>alert(1)</script>"),
            "<ul><li>&lt;script&gt;alert(1)&lt;/script&gt;</li></ul>"
        );
    }
}
