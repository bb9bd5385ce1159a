use nc_core::{NewsSnippet, PageMetadata};

const INSTRUCTIONS: &str = "You are an advanced fact-checking AI. Your job is to assess whether a news article or claim is likely misinformation, using the latest available evidence and reputable sources.

Instructions:
- Search for and cite credible sources (news, scientific, government, fact-checkers) that support or refute the claim/article.
- If a URL is provided, analyze the content and cross-check with external sources.
- If only text is provided, treat it as the main claim or article.
- Consider context, date, and possible bias.
- If the claim is unverified or ambiguous, say so and explain why.

You are provided with recent news snippets for context. Use them as evidence if relevant:";

const RESPONSE_FORMAT: &str = "Return a concise JSON with these keys:
  verdict: (Likely True | Uncertain | Likely False)
  confidence: (0..1)
  rationale: (short, clear explanation with evidence and citations)
  signals: (array of short bullet points, each with a source or reasoning)

Do NOT include markdown fences or extra commentary. Only output the JSON object.

Prioritize accuracy, evidence, and transparency.";

const NO_NEWS: &str = "  (No recent news found)";

/// Builds the fact-checking prompt sent to the model for one analysis request.
pub fn build_prompt(
    url: Option<&str>,
    text: Option<&str>,
    snippets: &[NewsSnippet],
    page: Option<&PageMetadata>,
) -> String {
    let mut prompt = format!("{}\n{}\n\n{}", INSTRUCTIONS, format_snippets(snippets), RESPONSE_FORMAT);

    let source = source_block(url, text, page);
    prompt.push_str("\n\n");
    prompt.push_str(&source);
    prompt
}

fn format_snippets(snippets: &[NewsSnippet]) -> String {
    if snippets.is_empty() {
        return NO_NEWS.to_string();
    }
    snippets
        .iter()
        .enumerate()
        .map(|(i, n)| format!("  [{}] {} ({}): {} [{}]", i + 1, n.name, n.provider, n.description, n.url))
        .collect::<Vec<_>>()
        .join("\n")
}

fn source_block(url: Option<&str>, text: Option<&str>, page: Option<&PageMetadata>) -> String {
    let mut parts = Vec::new();
    if let Some(url) = url.filter(|u| !u.is_empty()) {
        parts.push(format!("URL: {}", url));
    }
    if let Some(text) = text.filter(|t| !t.is_empty()) {
        parts.push(format!("TEXT: {}", text));
    }
    if let Some(page) = page.filter(|p| !p.is_empty()) {
        let mut lines = Vec::new();
        if let Some(title) = &page.title {
            lines.push(format!("PAGE TITLE: {}", title));
        }
        if let Some(description) = &page.description {
            lines.push(format!("PAGE DESCRIPTION: {}", description));
        }
        parts.push(lines.join("\n"));
    }
    parts.join("\n\n")
}
