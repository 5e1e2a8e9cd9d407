/// Subject and HTML body of an account decision email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecisionEmail {
    pub subject: String,
    pub html: String,
}

const SIGNATURE: &str = "Saludos La Comanda";

impl DecisionEmail {
    pub fn render(recipient_name: &str, accepted: bool) -> Self {
        let name = escape_html(recipient_name);
        let (subject, heading, text) = if accepted {
            (
                "Felicitaciones su cuenta fue aceptada",
                format!("Felicitaciones {name}"),
                "Su cuenta fue aceptada",
            )
        } else {
            (
                "Disculpe pero hemos bloqueado su cuenta",
                format!("Disculpe {name}"),
                "Su cuenta fue rechazada",
            )
        };

        Self {
            subject: subject.to_string(),
            html: format!("<h1>{heading}</h1><p>{text}</p><p>{SIGNATURE}</p>"),
        }
    }
}

fn escape_html(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}
