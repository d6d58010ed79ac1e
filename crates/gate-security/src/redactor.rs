use std::borrow::Cow;
use std::panic::{self, AssertUnwindSafe};

use lazy_static::lazy_static;
use regex::Regex;
use tracing::{debug, warn};

use crate::error::{RedactError, Result};
use crate::patterns::{self, SensitivePattern, ValueExtent};

/// Message prefix whose remainder is a comma-separated `key=value` list.
pub const MIXED_DATA_PREFIX: &str = "Test exception with mixed data:";

/// Upper bound on re-running the category pass until the text settles.
const MAX_SETTLE_PASSES: usize = 4;

/// Category rules and catch-all sharing one value extent.
struct Rules {
    categories: Vec<SensitivePattern>,
    catch_all: SensitivePattern,
}

impl Rules {
    fn compile(extent: ValueExtent) -> std::result::Result<Self, regex::Error> {
        Ok(Self {
            categories: patterns::categories(extent)?,
            catch_all: patterns::catch_all(extent)?,
        })
    }

    fn contains_sensitive(&self, text: &str) -> bool {
        self.categories.iter().any(|rule| rule.is_match(text))
    }

    fn first_match(&self, text: &str) -> Option<&SensitivePattern> {
        self.categories.iter().find(|rule| rule.is_match(text))
    }

    fn apply_categories(&self, text: &str) -> String {
        let mut result = text.to_string();
        for rule in &self.categories {
            result = rule.replace_all(&result);
        }
        result
    }
}

struct RuleSet {
    /// Free text: values run to the next whitespace.
    text: Rules,
    /// Structured `key=value` lists: values also stop at commas.
    list: Rules,
    comma_spacing: Regex,
}

impl RuleSet {
    fn compile() -> std::result::Result<Self, regex::Error> {
        Ok(Self {
            text: Rules::compile(ValueExtent::Text)?,
            list: Rules::compile(ValueExtent::List)?,
            comma_spacing: Regex::new(r",\s+")?,
        })
    }
}

lazy_static! {
    static ref RULES: std::result::Result<RuleSet, regex::Error> = RuleSet::compile();
    static ref DEFAULT_REDACTOR: Redactor = Redactor::new();
}

fn rules() -> Result<&'static RuleSet> {
    RULES
        .as_ref()
        .map_err(|e| RedactError::Pattern(e.clone()))
}

/// Masks secrets in free-form text (error messages, traces, URLs).
///
/// The rule table is compiled once per process and shared; a `Redactor`
/// itself only carries the message prefixes that select the structured
/// `key=value` list handling.
#[derive(Debug, Clone)]
pub struct Redactor {
    structured_prefixes: Vec<String>,
}

impl Redactor {
    pub fn new() -> Self {
        Self::with_structured_prefixes([MIXED_DATA_PREFIX])
    }

    pub fn with_structured_prefixes<I, S>(prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            structured_prefixes: prefixes.into_iter().map(Into::into).collect(),
        }
    }

    pub fn structured_prefixes(&self) -> &[String] {
        &self.structured_prefixes
    }

    /// Redact sensitive values from `text`.
    ///
    /// Never fails: if the rules are unavailable or matching panics, the
    /// input is returned unmodified. Text without sensitive values is
    /// returned borrowed.
    pub fn redact<'a>(&self, text: &'a str) -> Cow<'a, str> {
        fail_open(text, || Ok(self.redact_with(rules()?, text)))
    }

    /// Whether `text` holds anything a category rule would redact.
    pub fn contains_sensitive(&self, text: &str) -> bool {
        rules().is_ok_and(|rules| {
            let structured = self.split_structured(text).is_some();
            table(rules, structured).contains_sensitive(text)
        })
    }

    fn redact_with<'a>(&self, rules: &RuleSet, text: &'a str) -> Cow<'a, str> {
        let structured = self.split_structured(text);
        let table = table(rules, structured.is_some());
        if !table.contains_sensitive(text) {
            return Cow::Borrowed(text);
        }

        let mut result = match structured {
            Some((head, items)) => format!("{}:{}", head, redact_items(table, items)),
            None => table.apply_categories(text),
        };

        result = table.catch_all.replace_all(&result);
        result = rules.comma_spacing.replace_all(&result, ",").into_owned();

        for _ in 0..MAX_SETTLE_PASSES {
            let next = table.apply_categories(&result);
            if next == result {
                break;
            }
            result = next;
        }

        debug!(
            input_len = text.len(),
            output_len = result.len(),
            structured = structured.is_some(),
            "Redacted sensitive values"
        );
        Cow::Owned(result)
    }

    /// Split `<head>:<items>` when the text starts with a structured prefix.
    fn split_structured<'a>(&self, text: &'a str) -> Option<(&'a str, &'a str)> {
        if !self
            .structured_prefixes
            .iter()
            .any(|prefix| text.starts_with(prefix.as_str()))
        {
            return None;
        }
        text.split_once(':')
    }
}

impl Default for Redactor {
    fn default() -> Self {
        Self::new()
    }
}

/// Structured lists are matched with comma-stopping values so a pass never
/// swallows the neighbouring items.
fn table(rules: &RuleSet, structured: bool) -> &Rules {
    if structured {
        &rules.list
    } else {
        &rules.text
    }
}

/// Run `redaction`, handing back `text` untouched if it fails or panics.
fn fail_open<'a, F>(text: &'a str, redaction: F) -> Cow<'a, str>
where
    F: FnOnce() -> Result<Cow<'a, str>>,
{
    let outcome = panic::catch_unwind(AssertUnwindSafe(redaction))
        .unwrap_or_else(|_| Err(RedactError::Panicked));
    match outcome {
        Ok(redacted) => redacted,
        Err(e) => {
            warn!(error = %e, "Redaction failed, passing text through unmodified");
            Cow::Borrowed(text)
        }
    }
}

/// Redact each comma-separated `key=value` item on its own.
fn redact_items(rules: &Rules, items: &str) -> String {
    items
        .split(',')
        .map(|item| redact_item(rules, item.trim()))
        .collect::<Vec<_>>()
        .join(",")
}

fn redact_item<'a>(rules: &Rules, item: &'a str) -> Cow<'a, str> {
    let Some((key, _)) = item.split_once('=') else {
        return Cow::Borrowed(item);
    };
    let Some(rule) = rules.first_match(item) else {
        return Cow::Borrowed(item);
    };
    let key = key.trim();
    match rule.placeholder(key) {
        Some(placeholder) => Cow::Owned(format!("{}={}", key, placeholder)),
        None => Cow::Borrowed(item),
    }
}

/// Redact `text` with the process-wide default [`Redactor`].
pub fn redact(text: &str) -> Cow<'_, str> {
    DEFAULT_REDACTOR.redact(text)
}
