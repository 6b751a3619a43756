//! HTML rendering of an audit result.

use std::fmt::Write;

use crate::audit::types::AuditResult;

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

const STYLE: &str = "body{font-family:Helvetica,Arial,sans-serif;margin:40px;color:#222}\
h1{font-size:24px;margin-bottom:4px}\
.meta{color:#666;font-size:12px}\
.score{font-size:48px;font-weight:bold;margin:24px 0 0}\
.grade{font-size:18px;color:#444}\
table{border-collapse:collapse;margin:16px 0;width:100%}\
td,th{border:1px solid #ddd;padding:6px 10px;text-align:left}\
h2{font-size:16px;margin-top:28px}";

/// Render `result` as a standalone HTML page; `None` renders an empty report.
pub fn render_html(result: Option<&AuditResult>) -> String {
    let mut page = String::new();
    let _ = write!(
        page,
        "<!DOCTYPE html><html><head><meta charset=\"utf-8\"><title>Site Audit Report</title><style>{}</style></head><body>",
        STYLE
    );

    match result {
        None => {
            page.push_str("<h1>Site Audit Report</h1><p>No audit results are cached for this URL.</p>");
        }
        Some(result) => write_result(&mut page, result),
    }

    page.push_str("</body></html>");
    page
}

fn write_result(page: &mut String, result: &AuditResult) {
    let _ = write!(
        page,
        "<h1>Site Audit Report</h1><div class=\"meta\">{} &middot; {}</div>\
         <div class=\"score\">{}</div><div class=\"grade\">Grade {} &middot; {} &middot; penalties {}</div>",
        escape(result.url.as_str()),
        result.timestamp.to_rfc3339(),
        result.smart_score,
        escape(result.grade.as_str()),
        escape(&result.label),
        result.penalties,
    );

    page.push_str("<h2>Scores</h2><table><tr><th>Metric</th><th>Score</th></tr>");
    for point in &result.radar {
        let _ = write!(page, "<tr><td>{}</td><td>{}</td></tr>", escape(&point.metric), point.value);
    }
    page.push_str("</table>");

    page.push_str("<h2>Security headers</h2>");
    write_list(page, &result.header_checks, "All required security headers are present.");

    let _ = write!(page, "<h2>Accessibility violations: {}</h2>", escape(&result.axe.violations));
    let violations: Vec<String> = result
        .axe
        .details
        .iter()
        .map(|violation| {
            let id = violation.get("id").and_then(|v| v.as_str()).unwrap_or("unknown");
            match violation.get("help").and_then(|v| v.as_str()) {
                Some(help) => format!("{}: {}", id, help),
                None => id.to_string(),
            }
        })
        .collect();
    write_list(page, &violations, "No violations found.");

    page.push_str("<h2>Suggestions</h2>");
    write_list(page, &result.suggestions, "Nothing to improve.");
}

fn write_list(page: &mut String, items: &[String], empty: &str) {
    if items.is_empty() {
        let _ = write!(page, "<p>{}</p>", escape(empty));
        return;
    }
    page.push_str("<ul>");
    for item in items {
        let _ = write!(page, "<li>{}</li>", escape(item));
    }
    page.push_str("</ul>");
}
