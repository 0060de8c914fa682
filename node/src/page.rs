//! HTML rendering of the ledger page.
//!
//! The page is the ledger as two-space-indented JSON inside a `<pre>`,
//! followed by the encounter form that posts back to `/`.

use medledger_protocol::config::RECORD_FIELDS;
use medledger_protocol::storage::Block;

const PAGE_TITLE: &str = "MedLedger";

/// Render the full ledger page.
pub fn render_ledger_page(blocks: &[Block]) -> Result<String, serde_json::Error> {
    let json = serde_json::to_string_pretty(blocks)?;

    let mut html = String::with_capacity(json.len() + 1024);
    html.push_str("<!DOCTYPE HTML><html><head><title>");
    html.push_str(PAGE_TITLE);
    html.push_str("</title></head><body><pre>");
    html.push_str(&escape_html(&json));
    html.push_str("</pre>");
    html.push_str(&render_form());
    html.push_str("</body></html>");
    Ok(html)
}

fn render_form() -> String {
    let mut form = String::from("<form action=\"/\" method=\"post\">\n");
    for field in RECORD_FIELDS {
        form.push_str(&format!(
            "  {field}:<br><input type=\"text\" name=\"{field}\"><br>\n"
        ));
    }
    form.push_str("  <input type=\"submit\" value=\"Submit Data\" />\n</form>");
    form
}

/// Escape text for inclusion in HTML element content.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}
