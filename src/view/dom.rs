//! Queries over rendered markup

/// Escape text for inclusion in markup
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

/// Text content of a markup fragment: tags removed, basic entities decoded
pub fn text_content(markup: &str) -> String {
    let mut text = String::with_capacity(markup.len());
    let mut in_tag = false;
    for c in markup.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            c if !in_tag => text.push(c),
            _ => {}
        }
    }

    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

/// Value of `attribute` on the element whose `id` is `element_id`
pub fn element_attribute(markup: &str, element_id: &str, attribute: &str) -> Option<String> {
    let needle = format!(" id=\"{}\"", element_id);
    let at = markup.find(&needle)?;
    let tag_start = markup[..at].rfind('<')?;
    let tag_end = at + markup[at..].find('>')?;
    attribute_value(&markup[tag_start..tag_end], attribute)
}

fn attribute_value(tag: &str, attribute: &str) -> Option<String> {
    let needle = format!(" {}=\"", attribute);
    let start = tag.find(&needle)? + needle.len();
    let len = tag[start..].find('"')?;
    Some(tag[start..start + len].to_string())
}
