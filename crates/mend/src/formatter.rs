//! Turns free-text model output into presentable replies.
//!
//! Three stages, each tolerant of missing structure: labeled-field
//! extraction, optional template rendering, and lightweight-markup to
//! HTML conversion. Rendering feeds into the markup stage; none of the
//! stages fail past this boundary, and a reply the renderer cannot
//! improve reaches the markup stage unchanged.

use regex::Regex;

/// Fields recognized in labeled `"<Label>: <value>"` lines. A label seen
/// more than once keeps the last occurrence's value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResponseFields {
    pub issue_type: Option<String>,
    pub visible_damage: Option<String>,
    pub symptoms_reported: Option<String>,
    pub step_one: Option<String>,
    pub step_two: Option<String>,
    pub step_three: Option<String>,
    pub tools_required: Option<String>,
    pub image_findings: Option<String>,
}

impl ResponseFields {
    pub fn get(&self, name: &str) -> Option<&str> {
        let field = match name {
            "issue_type" => &self.issue_type,
            "visible_damage" => &self.visible_damage,
            "symptoms_reported" => &self.symptoms_reported,
            "step_one" => &self.step_one,
            "step_two" => &self.step_two,
            "step_three" => &self.step_three,
            "tools_required" => &self.tools_required,
            "image_findings" => &self.image_findings,
            _ => return None,
        };
        field.as_deref()
    }
}

/// Parse labeled lines out of a model reply. Unrecognized lines are
/// ignored, never fatal.
pub fn extract_fields(text: &str) -> ResponseFields {
    let mut fields = ResponseFields::default();

    for line in text.lines() {
        let Some((label, value)) = line.split_once(':') else {
            continue;
        };
        let value = value.trim().to_string();

        match label.trim() {
            "Issue Type" => fields.issue_type = Some(value),
            "Visible Damage" => fields.visible_damage = Some(value),
            "Symptoms Reported" => fields.symptoms_reported = Some(value),
            "Step 1" => fields.step_one = Some(value),
            "Step 2" => fields.step_two = Some(value),
            "Step 3" => fields.step_three = Some(value),
            "Tools Required" => fields.tools_required = Some(value),
            "Image Findings" => fields.image_findings = Some(value),
            _ => {}
        }
    }

    fields
}

/// Render a reply through the configured `{field}` template when every
/// referenced field was extracted; otherwise fall back to the raw text.
/// Substitution failure never raises. The result is plain text; callers
/// pass it through `to_presentation_markup` afterwards.
pub fn render(text: &str, template: Option<&str>) -> String {
    let Some(template) = template else {
        return text.to_string();
    };

    let fields = extract_fields(text);
    let placeholder = Regex::new(r"\{(\w+)\}").unwrap();

    let mut missing = Vec::new();
    let rendered = placeholder.replace_all(template, |caps: &regex::Captures| {
        let name = caps.get(1).unwrap().as_str();
        match fields.get(name) {
            Some(value) => value.to_string(),
            None => {
                missing.push(name.to_string());
                String::new()
            }
        }
    });

    if missing.is_empty() {
        rendered.into_owned()
    } else {
        tracing::warn!(missing = ?missing, "missing data for response formatting");
        text.to_string()
    }
}

/// Convert a lightweight-markup reply into presentation HTML: inline
/// emphasis becomes tags, existing list markup and bare ordinal lines are
/// preserved, other non-empty lines are wrapped as paragraphs, and blank
/// lines become explicit break markers.
pub fn to_presentation_markup(text: &str) -> String {
    let bold = Regex::new(r"\*\*(.+?)\*\*").unwrap();
    let italic = Regex::new(r"\*([^*]+)\*").unwrap();

    let text = bold.replace_all(text, "<strong>$1</strong>");
    let text = italic.replace_all(&text, "<em>$1</em>");

    let mut formatted = Vec::new();
    for line in text.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            formatted.push("<br>".to_string());
        } else if trimmed.starts_with("<ul>")
            || trimmed.starts_with("<li>")
            || trimmed.starts_with("</ul>")
            || is_ordinal_line(trimmed)
        {
            formatted.push(trimmed.to_string());
        } else {
            formatted.push(format!("<p>{}</p>", trimmed));
        }
    }

    formatted.join("")
}

/// Lines like "1." or "2) Remove the cover" read as list items already.
fn is_ordinal_line(line: &str) -> bool {
    let mut chars = line.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    first.is_ascii_digit() && matches!(chars.next(), Some('.') | Some(')') | None)
}
