use serde_json::{Map, Value};
use time::format_description::{self, OwnedFormatItem};
use time::{Date, PrimitiveDateTime};

/// A remote record before decoding: field name to JSON value.
pub type RawRecord = Map<String, Value>;

/// Remote timestamp layout of `time_close`, e.g. `2020-01-25T23:59:59Z`.
pub const REMOTE_TIMESTAMP_LAYOUT: &str = "[year]-[month]-[day]T[hour]:[minute]:[second]Z";

/// Storage date layout.
pub const ISO_DATE_LAYOUT: &str = "[year]-[month]-[day]";

/// One field derivation applied to every raw record.
///
/// A rule whose input is missing or unusable leaves the record untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransformRule {
    /// Parse `source` with the `input` layout and store the `output` rendering under `target`.
    FormatDate {
        source: String,
        target: String,
        input: String,
        output: String,
    },
    /// Move the value of `source` to `target`.
    Rename { source: String, target: String },
}

impl TransformRule {
    pub fn format_date(
        source: impl Into<String>,
        target: impl Into<String>,
        input: impl Into<String>,
        output: impl Into<String>,
    ) -> Self {
        Self::FormatDate {
            source: source.into(),
            target: target.into(),
            input: input.into(),
            output: output.into(),
        }
    }

    pub fn rename(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self::Rename {
            source: source.into(),
            target: target.into(),
        }
    }

    /// Apply the rule to one record.
    pub fn apply(&self, record: &mut RawRecord) {
        match self {
            Self::FormatDate {
                source,
                target,
                input,
                output,
            } => {
                if let Some(value) = reformat_date(record.get(source), input, output) {
                    record.insert(target.clone(), Value::String(value));
                }
            }
            Self::Rename { source, target } => {
                if let Some(value) = take_present(record, source) {
                    record.insert(target.clone(), value);
                }
            }
        }
    }
}

/// Rules turning a historical OHLC payload into storable rows.
pub fn historical_rules() -> Vec<TransformRule> {
    vec![TransformRule::format_date(
        "time_close",
        "date",
        REMOTE_TIMESTAMP_LAYOUT,
        ISO_DATE_LAYOUT,
    )]
}

/// Rules turning a currency lookup payload into a local currency name.
pub fn currency_rules() -> Vec<TransformRule> {
    vec![TransformRule::rename("id", "currency_name")]
}

/// Apply `rules` to each record, in rule order.
pub fn apply_rules(records: &mut [RawRecord], rules: &[TransformRule]) {
    for record in records.iter_mut() {
        for rule in rules {
            rule.apply(record);
        }
    }
}

fn reformat_date(value: Option<&Value>, input: &str, output: &str) -> Option<String> {
    let text = value?.as_str()?;
    let input = parse_layout(input)?;
    let output = parse_layout(output)?;

    if let Ok(moment) = PrimitiveDateTime::parse(text, &input) {
        return moment.format(&output).ok();
    }
    Date::parse(text, &input).ok()?.format(&output).ok()
}

fn parse_layout(layout: &str) -> Option<OwnedFormatItem> {
    format_description::parse_owned::<2>(layout).ok()
}

fn take_present(record: &mut RawRecord, key: &str) -> Option<Value> {
    if record.get(key).is_none_or(Value::is_null) {
        return None;
    }
    record.remove(key)
}
