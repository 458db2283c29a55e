//! Self-contained HTML building blocks shared by reports and dashboard pages.

/// Escape text for HTML content and attribute values.
#[must_use]
pub fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Wrap `body` in a complete document with the inline stylesheet.
#[must_use]
pub fn document(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <style>{css}</style>
</head>
<body>
{body}
</body>
</html>
"#,
        title = escape(title),
        css = inline_css(),
    )
}

/// Metric cards: `(label, value)` pairs.
#[must_use]
pub fn metric_cards(metrics: &[(&str, String)]) -> String {
    let cards: String = metrics
        .iter()
        .map(|(label, value)| {
            format!(
                r#"<div class="card"><div class="value">{}</div><div class="label">{}</div></div>"#,
                escape(value),
                escape(label)
            )
        })
        .collect();
    format!(r#"<div class="cards">{cards}</div>"#)
}

/// Table with escaped headers and cells.
#[must_use]
pub fn table<R, C>(headers: &[&str], rows: R) -> String
where
    R: IntoIterator<Item = C>,
    C: IntoIterator<Item = String>,
{
    let head: String = headers
        .iter()
        .map(|h| format!("<th>{}</th>", escape(h)))
        .collect();
    let body: String = rows
        .into_iter()
        .map(|row| {
            let cells: String = row
                .into_iter()
                .map(|c| format!("<td>{}</td>", escape(&c)))
                .collect();
            format!("<tr>{cells}</tr>")
        })
        .collect();
    format!("<table><thead><tr>{head}</tr></thead><tbody>{body}</tbody></table>")
}

/// A titled figure embedding an SVG document.
#[must_use]
pub fn figure(id: &str, svg: &str) -> String {
    format!(r#"<figure id="{}">{svg}</figure>"#, escape(id))
}

fn inline_css() -> &'static str {
    r"
* { box-sizing: border-box; }
body {
    font-family: system-ui, -apple-system, 'Segoe UI', sans-serif;
    margin: 0;
    color: #111827;
    background: #ffffff;
}
main { max-width: 1400px; margin: 0 auto; padding: 2rem; }
header { margin-bottom: 1.5rem; border-bottom: 2px solid #e5e7eb; }
h1 { font-size: 1.8rem; margin: 0 0 0.5rem; }
h2 { font-size: 1.3rem; margin: 2rem 0 0.75rem; }
.meta { color: #6b7280; font-size: 0.875rem; }
.cards { display: flex; flex-wrap: wrap; gap: 1rem; margin: 1rem 0; }
.card { border: 1px solid #e5e7eb; border-radius: 8px; padding: 1rem 1.5rem; min-width: 160px; }
.card .value { font-size: 1.6rem; font-weight: 700; }
.card .label { color: #6b7280; font-size: 0.85rem; }
table { border-collapse: collapse; width: 100%; margin-bottom: 1.5rem; font-size: 0.9rem; }
th, td { border-bottom: 1px solid #e5e7eb; padding: 0.4rem 0.6rem; text-align: left; }
th { background: #f9fafb; }
figure { margin: 1.5rem 0; }
.warning { background: #fef3c7; border: 1px solid #f59e0b; padding: 0.75rem 1rem; border-radius: 6px; }
.error { background: #fee2e2; border: 1px solid #ef4444; padding: 0.75rem 1rem; border-radius: 6px; }
.layout { display: flex; gap: 2rem; }
.sidebar { width: 280px; flex-shrink: 0; }
.sidebar label { display: block; font-weight: 600; margin-top: 1rem; }
.sidebar select { width: 100%; }
.content { flex-grow: 1; min-width: 0; }
nav a { margin-right: 1rem; }
"
}
