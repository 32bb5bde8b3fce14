//! Notification templates and HTML helpers for outbound mail.

/// Values substituted into notification templates.
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateVars<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub phone: &'a str,
    pub message: &'a str,
}

/// Used when no `email.notificationTemplate` setting exists.
pub const DEFAULT_CONTACT_TEMPLATE: &str = "New contact form submission\n\n\
Name: {{name}}\n\
Email: {{email}}\n\
Phone: {{phone}}\n\n\
Message:\n{{message}}\n";

/// Replaces `{{name}}`, `{{email}}`, `{{phone}}` and `{{message}}`.
///
/// Placeholders may contain inner spaces (`{{ name }}`). Unknown
/// placeholders are left as they are.
pub fn render_template(template: &str, vars: &TemplateVars<'_>) -> String {
    let mut out = String::with_capacity(template.len() + vars.message.len());
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find("}}") {
            Some(end) => {
                let name = after[..end].trim();
                let value = match name {
                    "name" => Some(vars.name),
                    "email" => Some(vars.email),
                    "phone" => Some(vars.phone),
                    "message" => Some(vars.message),
                    _ => None,
                };
                match value {
                    Some(v) => out.push_str(v),
                    None => out.push_str(&rest[start..start + 2 + end + 2]),
                }
                rest = &after[end + 2..];
            }
            None => {
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

/// Escapes the five HTML-significant characters.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

/// Escaped text with line breaks rendered as `<br>`.
pub fn reply_html(reply: &str) -> String {
    escape_html(reply)
        .replace("\r\n", "\n")
        .replace('\r', "\n")
        .replace('\n', "<br>")
}

/// Parses a receivers setting: a JSON array of addresses or a list separated
/// by commas, semicolons or newlines. Blank entries and repeats are dropped.
pub fn parse_receivers(raw: &str) -> Vec<String> {
    let candidates: Vec<String> = match serde_json::from_str::<Vec<String>>(raw) {
        Ok(list) => list,
        Err(_) => raw
            .split(|c| c == ',' || c == ';' || c == '\n')
            .map(str::to_string)
            .collect(),
    };

    let mut receivers: Vec<String> = Vec::new();
    for candidate in candidates {
        let trimmed = candidate.trim();
        if trimmed.is_empty() || receivers.iter().any(|r| r.eq_ignore_ascii_case(trimmed)) {
            continue;
        }
        receivers.push(trimmed.to_string());
    }
    receivers
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars() -> TemplateVars<'static> {
        TemplateVars {
            name: "Lin",
            email: "lin@example.com",
            phone: "0912345678",
            message: "Hello",
        }
    }

    #[test]
    fn test_render_all_placeholders() {
        let out = render_template("{{name}} <{{email}}> {{ phone }}: {{message}}", &vars());
        assert_eq!(out, "Lin <lin@example.com> 0912345678: Hello");
    }

    #[test]
    fn test_render_repeated_and_unknown() {
        let out = render_template("{{name}}/{{name}} {{company}} {{", &vars());
        assert_eq!(out, "Lin/Lin {{company}} {{");
    }

    #[test]
    fn test_values_are_not_reexpanded() {
        let v = TemplateVars {
            message: "{{name}}",
            ..vars()
        };
        assert_eq!(render_template("{{message}}", &v), "{{name}}");
    }

    #[test]
    fn test_default_template_mentions_every_field() {
        let out = render_template(DEFAULT_CONTACT_TEMPLATE, &vars());
        assert!(out.contains("Lin") && out.contains("0912345678") && out.contains("Hello"));
        assert!(!out.contains("{{"));
    }

    #[test]
    fn test_reply_html_escapes_and_breaks_lines() {
        assert_eq!(
            reply_html("Dear <b>Lin</b>,\nSee you & bye\r\nThanks"),
            "Dear &lt;b&gt;Lin&lt;/b&gt;,<br>See you &amp; bye<br>Thanks"
        );
    }

    #[test]
    fn test_parse_receivers() {
        assert_eq!(
            parse_receivers(r#"["a@x.com"," b@x.com ","A@x.com"]"#),
            vec!["a@x.com", "b@x.com"]
        );
        assert_eq!(parse_receivers("a@x.com; b@x.com,\nc@x.com"), vec!["a@x.com", "b@x.com", "c@x.com"]);
        assert!(parse_receivers("  ").is_empty());
    }
}
