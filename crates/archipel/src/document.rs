//! Wrapping rendered fragments into complete HTML documents.

use crate::ssr::RenderResult;
use crate::toolchain::HtmlFormatter;

const BEFORE_HEAD: &str = "<!DOCTYPE html>\n\
<html lang=\"en\">\n\
\t<head>\n\
\t\t<meta charset=\"UTF-8\" />\n\
\t\t<meta http-equiv=\"X-UA-Compatible\" content=\"IE=edge\" />\n\
\t\t<meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\" />\n\
\t\t";

const BEFORE_BODY: &str = "\n\t</head>\n\t<body>\n\t\t";

const AFTER_BODY: &str = "\n\t</body>\n</html>\n";

/// The unformatted document for `head` and `html`.
pub fn template(head: &str, html: &str) -> String {
    let mut page = String::with_capacity(
        BEFORE_HEAD.len() + head.len() + BEFORE_BODY.len() + html.len() + AFTER_BODY.len(),
    );
    page.push_str(BEFORE_HEAD);
    page.push_str(head);
    page.push_str(BEFORE_BODY);
    page.push_str(html);
    page.push_str(AFTER_BODY);
    page
}

/// Build the final document, formatted when the formatter succeeds.
///
/// Formatting is cosmetic: on failure the raw template is returned.
pub async fn assemble(formatter: &dyn HtmlFormatter, result: &RenderResult) -> String {
    let page = template(&result.head, &result.html);
    match formatter.format(&page).await {
        Ok(formatted) => formatted,
        Err(e) => {
            tracing::warn!(error = %e, "Could not format the html");
            page
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::FailingFormatter;
    use crate::toolchain::PassthroughFormatter;

    fn fragment(html: &str, head: &str) -> RenderResult {
        RenderResult {
            html: html.to_string(),
            head: head.to_string(),
            css: String::new(),
        }
    }

    fn assert_boilerplate(page: &str) {
        assert!(page.starts_with("<!DOCTYPE html>\n"));
        assert!(page.contains(r#"<html lang="en">"#));
        assert!(page.contains(r#"<meta charset="UTF-8" />"#));
        assert!(page.contains(r#"<meta http-equiv="X-UA-Compatible" content="IE=edge" />"#));
        assert!(page.contains(
            r#"<meta name="viewport" content="width=device-width, initial-scale=1.0" />"#
        ));
        assert!(page.trim_end().ends_with("</html>"));
    }

    #[test]
    fn test_template_layout() {
        let page = template("<title>T</title>", "<p>x</p>");
        assert_boilerplate(&page);
        let head = page.find("<title>T</title>").unwrap();
        let head_close = page.find("</head>").unwrap();
        let body = page.find("<body>").unwrap();
        let html = page.find("<p>x</p>").unwrap();
        assert!(head < head_close && head_close < body && body < html);
    }

    #[tokio::test]
    async fn test_assemble_formats() {
        let page = assemble(&PassthroughFormatter, &fragment("<p>x</p>", "")).await;
        assert_eq!(page.matches("<p>x</p>").count(), 1);
        assert_boilerplate(&page);
    }

    #[tokio::test]
    async fn test_assemble_falls_back_when_formatter_fails() {
        let result = fragment("<p>x</p>", "");
        let page = assemble(&FailingFormatter, &result).await;
        assert_eq!(page, template("", "<p>x</p>"));
        assert_eq!(page.matches("<p>x</p>").count(), 1);
        assert_boilerplate(&page);
    }
}
