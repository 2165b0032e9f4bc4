use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// One submitted response to a survey.
///
/// Answers arrive as flat keys such as `[question(2)]`,
/// `[question(3), option(10001)]` or `[url("source")]`; they are kept in
/// [`fields`](Self::fields) and interpreted on demand.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SurveyResponse {
    #[serde(deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(deserialize_with = "lenient_string")]
    pub contact_id: String,
    pub status: String,
    #[serde(deserialize_with = "lenient_string")]
    pub is_test_data: String,
    pub datesubmitted: String,
    #[serde(rename = "sResponseComment")]
    pub response_comment: Option<String>,
    #[serde(flatten)]
    pub fields: BTreeMap<String, Value>,
}

/// An answer to one question, or to one option of it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Answer {
    pub question_id: i64,
    /// The option the value belongs to, for multi-option questions.
    pub option: Option<String>,
    /// Whether the value is a free-text comment rather than a selection.
    pub is_comment: bool,
    pub value: String,
}

impl SurveyResponse {
    /// Every non-blank answer, ordered by field key.
    pub fn answers(&self) -> Vec<Answer> {
        self.fields
            .iter()
            .filter_map(|(key, value)| {
                let value = text_of(value)?;
                let parts = parse_key(key)?;
                let (kind, id) = parts.first()?;
                if *kind != "question" {
                    return None;
                }
                Some(Answer {
                    question_id: id.as_deref()?.parse().ok()?,
                    option: parts
                        .iter()
                        .find(|(kind, _)| *kind == "option")
                        .and_then(|(_, arg)| arg.clone()),
                    is_comment: parts.iter().any(|(kind, _)| *kind == "comment"),
                    value,
                })
            })
            .collect()
    }

    /// Selected values per question; several selections are joined with `,`.
    pub fn all_questions(&self) -> BTreeMap<i64, String> {
        let mut questions: BTreeMap<i64, String> = BTreeMap::new();
        for answer in self.answers().into_iter().filter(|a| !a.is_comment) {
            questions
                .entry(answer.question_id)
                .and_modify(|joined| {
                    joined.push(',');
                    joined.push_str(&answer.value);
                })
                .or_insert_with(|| answer.value.clone());
        }
        questions
    }

    /// The value of the URL variable `name` captured with the response.
    pub fn url_variable(&self, name: &str) -> Option<String> {
        self.single("url", name)
    }

    /// The value of the hidden/system variable `name` (e.g. `STANDARD_IP`).
    pub fn variable(&self, name: &str) -> Option<String> {
        self.single("variable", name)
    }

    fn single(&self, kind: &str, name: &str) -> Option<String> {
        self.fields.iter().find_map(|(key, value)| {
            let parts = parse_key(key)?;
            match parts.as_slice() {
                [(k, Some(arg))] if *k == kind && arg == name => text_of(value),
                _ => None,
            }
        })
    }
}

/// Splits `[question(3), option("10003-other")]` into
/// `[("question", Some("3")), ("option", Some("10003-other"))]`.
fn parse_key(key: &str) -> Option<Vec<(&str, Option<String>)>> {
    let inner = key.strip_prefix('[')?.strip_suffix(']')?;
    Some(
        inner
            .split(", ")
            .map(|part| match part.trim().split_once('(') {
                Some((kind, rest)) => {
                    let arg = rest.strip_suffix(')').unwrap_or(rest).trim_matches('"');
                    (kind.trim(), Some(arg.to_string()))
                }
                None => (part.trim(), None),
            })
            .collect(),
    )
}

fn text_of(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => String::new(),
        Value::String(s) => s,
        other => other.to_string(),
    })
}
