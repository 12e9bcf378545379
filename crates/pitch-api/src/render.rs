//! Isolated mockup documents.
//!
//! Stored mockup HTML is untrusted and is served as-is. Containment comes from
//! the wrapper document, which disables form submission in script, and from
//! the response headers, which forbid form targets, cross-origin framing and
//! caching.

use axum::http::{HeaderName, HeaderValue, header};
use axum::response::{IntoResponse, Response};

use pitch_types::models::{Mockup, Proposal};

pub const NOTICE: &str =
    "This is a mockup - form submissions are disabled for demonstration purposes.";

pub const CONTENT_SECURITY_POLICY: &str =
    "default-src 'self' 'unsafe-inline' 'unsafe-eval'; frame-ancestors 'self'; form-action 'none';";

/// Strips form targets and cancels every way a form could submit. Runs at
/// parse time, on DOMContentLoaded, and once more shortly after for content
/// that builds its forms late.
const FORM_GUARD_SCRIPT: &str = r#"
    function preventFormSubmissions() {
      function block(e) {
        e.preventDefault();
        e.stopPropagation();
        alert(MOCKUP_NOTICE);
        return false;
      }
      document.querySelectorAll('form').forEach(function(form) {
        form.removeAttribute('action');
        form.removeAttribute('method');
        form.addEventListener('submit', block);
        form.onsubmit = block;
      });
      document
        .querySelectorAll('button[type="submit"], input[type="submit"]')
        .forEach(function(button) {
          button.addEventListener('click', block);
        });
    }

    preventFormSubmissions();
    document.addEventListener('DOMContentLoaded', preventFormSubmissions);
    setTimeout(preventFormSubmissions, 100);
"#;

/// Pick a mockup by caller-supplied index. Negative and past-the-end indices
/// are simply absent.
pub fn select_mockup(mockups: &[Mockup], index: i64) -> Option<&Mockup> {
    usize::try_from(index).ok().and_then(|i| mockups.get(i))
}

/// Wrap a mockup fragment in a complete standalone document.
pub fn mockup_document(proposal_title: &str, mockup: &Mockup) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8">
  <meta name="viewport" content="width=device-width, initial-scale=1.0">
  <title>{mockup_title} - {proposal_title}</title>
  <script>
    var MOCKUP_NOTICE = "{notice}";
{script}  </script>
</head>
<body>
{body}
</body>
</html>"#,
        mockup_title = escape_html(&mockup.title),
        proposal_title = escape_html(proposal_title),
        notice = NOTICE,
        script = FORM_GUARD_SCRIPT,
        body = mockup.html,
    )
}

pub fn security_headers() -> [(HeaderName, HeaderValue); 10] {
    [
        (
            header::CONTENT_TYPE,
            HeaderValue::from_static("text/html; charset=utf-8"),
        ),
        (
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-cache, no-store, must-revalidate"),
        ),
        (header::PRAGMA, HeaderValue::from_static("no-cache")),
        (header::EXPIRES, HeaderValue::from_static("0")),
        (header::X_FRAME_OPTIONS, HeaderValue::from_static("SAMEORIGIN")),
        (
            header::CONTENT_SECURITY_POLICY,
            HeaderValue::from_static(CONTENT_SECURITY_POLICY),
        ),
        (
            HeaderName::from_static("cross-origin-embedder-policy"),
            HeaderValue::from_static("unsafe-none"),
        ),
        (
            HeaderName::from_static("cross-origin-opener-policy"),
            HeaderValue::from_static("unsafe-none"),
        ),
        (
            header::REFERRER_POLICY,
            HeaderValue::from_static("strict-origin-when-cross-origin"),
        ),
        (header::X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff")),
    ]
}

/// Render mockup `index` of an already-authorized proposal. `None` means the
/// index is out of range.
pub fn render(proposal: &Proposal, index: i64) -> Option<Response> {
    let mockup = select_mockup(&proposal.mockups, index)?;
    let document = mockup_document(&proposal.title, mockup);
    Some((security_headers(), document).into_response())
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
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

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    fn proposal(mockups: Vec<Mockup>) -> Proposal {
        Proposal {
            id: "abcd1234".into(),
            title: "Redesign".into(),
            markdown: "# Hi".into(),
            mockups,
            created_at: Default::default(),
        }
    }

    #[test]
    fn index_bounds() {
        let mockups = vec![Mockup::new("A", "<a/>"), Mockup::new("B", "<b/>")];
        assert_eq!(select_mockup(&mockups, 0).unwrap().title, "A");
        assert_eq!(select_mockup(&mockups, 1).unwrap().title, "B");
        assert!(select_mockup(&mockups, 2).is_none());
        assert!(select_mockup(&mockups, -1).is_none());
        assert!(select_mockup(&mockups, i64::MIN).is_none());
        assert!(select_mockup(&[], 0).is_none());
    }

    #[test]
    fn document_embeds_fragment_verbatim() {
        let doc = mockup_document("Redesign", &Mockup::new("V1", "<h1>Hi</h1><script>x()</script>"));
        assert!(doc.starts_with("<!DOCTYPE html>"));
        assert!(doc.contains("<body>\n<h1>Hi</h1><script>x()</script>\n</body>"));
        assert!(doc.contains("<title>V1 - Redesign</title>"));
        assert!(doc.contains("preventFormSubmissions();"));
        assert!(doc.contains("form.removeAttribute('action')"));
        assert!(doc.contains(NOTICE));
    }

    #[test]
    fn titles_are_escaped() {
        let doc = mockup_document("A & B", &Mockup::new("</title><script>", "<p/>"));
        assert!(doc.contains("<title>&lt;/title&gt;&lt;script&gt; - A &amp; B</title>"));
    }

    #[test]
    fn render_sets_isolation_headers() {
        let p = proposal(vec![Mockup::new("V1", "<h1>Hi</h1>")]);
        let resp = render(&p, 0).unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let h = resp.headers();
        assert_eq!(h["content-type"], "text/html; charset=utf-8");
        assert_eq!(h["cache-control"], "no-cache, no-store, must-revalidate");
        assert_eq!(h["x-frame-options"], "SAMEORIGIN");
        assert_eq!(h["referrer-policy"], "strict-origin-when-cross-origin");
        let csp = h["content-security-policy"].to_str().unwrap();
        assert!(csp.contains("form-action 'none'"));
        assert!(csp.contains("'unsafe-inline' 'unsafe-eval'"));
        assert!(csp.contains("frame-ancestors 'self'"));
    }

    #[test]
    fn render_out_of_range_is_none() {
        let p = proposal(vec![Mockup::new("V1", "<h1>Hi</h1>")]);
        assert!(render(&p, 1).is_none());
        assert!(render(&p, -1).is_none());
    }
}
