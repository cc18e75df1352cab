use std::path::PathBuf;

use tracing::debug;

use crate::config::ColumnFormat;
use crate::constants::arff::{
    ATTRIBUTE, COMMENT_PREFIX, DATA, ITEM_ATTRIBUTES, MISSING, RATING_ATTRIBUTES, RELATION,
    TIME_ATTRIBUTES, USER_ATTRIBUTES,
};
use crate::data::{RatingDataset, RatingRecord};
use crate::errors::SplitterError;
use crate::source::RatingSource;
use crate::transport::fs::read_source_text;
use crate::types::SourceId;
use crate::utils::{binarize, parse_rating, parse_timestamp, unquote};

/// Configuration for an ARFF rating file.
#[derive(Clone, Debug)]
pub struct ArffSourceConfig {
    /// Stable source identifier used in errors and logs.
    pub source_id: SourceId,
    /// Path of the `.arff` file.
    pub path: PathBuf,
    /// Optional threshold turning ratings into `1.0` (above) or `0.0`.
    pub binarize_threshold: Option<f64>,
}

impl ArffSourceConfig {
    /// Create a config for an ARFF source with explicit id and path.
    pub fn new(source_id: impl Into<SourceId>, path: impl Into<PathBuf>) -> Self {
        Self {
            source_id: source_id.into(),
            path: path.into(),
            binarize_threshold: None,
        }
    }

    /// Binarize ratings against `threshold`.
    pub fn with_binarize_threshold(mut self, threshold: f64) -> Self {
        self.binarize_threshold = Some(threshold);
        self
    }
}

#[derive(Clone, Debug, PartialEq)]
enum AttributeKind {
    Numeric,
    String,
    Date,
    Nominal,
}

#[derive(Clone, Debug)]
struct Attribute {
    name: String,
    kind: AttributeKind,
}

/// Which attribute holds each rating field.
#[derive(Clone, Copy, Debug)]
struct ColumnMap {
    user: usize,
    item: usize,
    rating: usize,
    timestamp: Option<usize>,
}

impl ColumnMap {
    /// Match attributes by name, falling back to `user, item, rating[, time]` positions.
    fn resolve(attributes: &[Attribute]) -> Result<Self, String> {
        if attributes.len() < 3 {
            return Err(format!(
                "expected at least user, item and rating attributes, found {}",
                attributes.len()
            ));
        }
        let find = |names: &[&str]| {
            attributes
                .iter()
                .position(|attr| names.contains(&attr.name.to_ascii_lowercase().as_str()))
        };
        let user = find(USER_ATTRIBUTES).unwrap_or(0);
        let item = find(ITEM_ATTRIBUTES).unwrap_or(1);
        let rating = find(RATING_ATTRIBUTES).unwrap_or(2);
        let timestamp = find(TIME_ATTRIBUTES).or_else(|| {
            attributes
                .get(3)
                .filter(|attr| attr.kind != AttributeKind::String)
                .map(|_| 3)
        });
        if user == item || user == rating || item == rating {
            return Err("user, item and rating must be distinct attributes".to_string());
        }
        if attributes[rating].kind != AttributeKind::Numeric {
            return Err(format!(
                "rating attribute '{}' must be numeric",
                attributes[rating].name
            ));
        }
        Ok(Self {
            user,
            item,
            rating,
            timestamp: timestamp.filter(|idx| ![user, item, rating].contains(idx)),
        })
    }

    fn column_format(&self) -> ColumnFormat {
        if self.timestamp.is_some() {
            ColumnFormat::Uirt
        } else {
            ColumnFormat::Uir
        }
    }
}

/// Rating source over Weka ARFF files (dense or sparse `@data` rows).
pub struct ArffRatingSource {
    config: ArffSourceConfig,
}

impl ArffRatingSource {
    /// Create an ARFF source from configuration.
    pub fn new(config: ArffSourceConfig) -> Self {
        Self { config }
    }

    /// Source configuration.
    pub fn config(&self) -> &ArffSourceConfig {
        &self.config
    }

    /// Parse already-loaded file contents.
    pub fn parse_str(&self, text: &str) -> Result<RatingDataset, SplitterError> {
        let mut relation = None;
        let mut attributes = Vec::new();
        let mut columns: Option<ColumnMap> = None;
        let mut records = Vec::new();

        for (idx, line) in text.lines().enumerate() {
            let line_no = idx + 1;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with(COMMENT_PREFIX) {
                continue;
            }
            let fail = |reason: String| SplitterError::Ingestion {
                source_id: self.config.source_id.clone(),
                line: line_no,
                reason,
            };
            match columns {
                Some(map) => {
                    let values = if trimmed.starts_with('{') {
                        parse_sparse_row(trimmed, attributes.len())
                    } else {
                        parse_dense_row(trimmed, attributes.len())
                    }
                    .map_err(fail)?;
                    records.push(self.build_record(&values, map).map_err(fail)?);
                }
                None => {
                    let (keyword, rest) = split_keyword(trimmed);
                    if keyword.eq_ignore_ascii_case(RELATION) {
                        relation = Some(unquote(rest).to_string());
                    } else if keyword.eq_ignore_ascii_case(ATTRIBUTE) {
                        attributes.push(parse_attribute(rest).map_err(fail)?);
                    } else if keyword.eq_ignore_ascii_case(DATA) {
                        columns = Some(ColumnMap::resolve(&attributes).map_err(fail)?);
                    } else {
                        return Err(fail(format!("unexpected header line '{trimmed}'")));
                    }
                }
            }
        }

        let Some(map) = columns else {
            return Err(SplitterError::Ingestion {
                source_id: self.config.source_id.clone(),
                line: text.lines().count(),
                reason: format!("no {DATA} section found"),
            });
        };
        debug!(
            source_id = %self.config.source_id,
            relation = relation.as_deref().unwrap_or(""),
            attributes = attributes.len(),
            records = records.len(),
            format = %map.column_format(),
            "parsed arff ratings"
        );
        Ok(RatingDataset::new(records, map.column_format()))
    }

    fn build_record(&self, values: &[String], map: ColumnMap) -> Result<RatingRecord, String> {
        let user = present(values, map.user, "user")?;
        let item = present(values, map.item, "item")?;
        let raw_rating = present(values, map.rating, "rating")?;
        let value = parse_rating(raw_rating)
            .ok_or_else(|| format!("invalid rating '{raw_rating}'"))?;
        let value = binarize(value, self.config.binarize_threshold);
        match map.timestamp {
            Some(idx) => {
                let raw = present(values, idx, "timestamp")?;
                let timestamp =
                    parse_timestamp(raw).ok_or_else(|| format!("invalid timestamp '{raw}'"))?;
                Ok(RatingRecord::with_timestamp(user, item, value, timestamp))
            }
            None => Ok(RatingRecord::new(user, item, value)),
        }
    }
}

impl RatingSource for ArffRatingSource {
    fn id(&self) -> &str {
        &self.config.source_id
    }

    fn load(&self) -> Result<RatingDataset, SplitterError> {
        let text = read_source_text(&self.config.source_id, &self.config.path)?;
        self.parse_str(&text)
    }
}

/// Value at `idx`, rejecting the ARFF missing marker.
fn present<'a>(values: &'a [String], idx: usize, label: &str) -> Result<&'a str, String> {
    let value = values[idx].as_str();
    if value == MISSING {
        return Err(format!("missing {label} value"));
    }
    Ok(value)
}

/// Split `@keyword rest` on the first whitespace.
fn split_keyword(line: &str) -> (&str, &str) {
    match line.find(char::is_whitespace) {
        Some(pos) => (&line[..pos], line[pos..].trim()),
        None => (line, ""),
    }
}

fn parse_attribute(rest: &str) -> Result<Attribute, String> {
    let rest = rest.trim();
    let (name, kind) = match rest.chars().next() {
        Some(quote @ ('\'' | '"')) => {
            let end = rest[1..]
                .find(quote)
                .ok_or_else(|| format!("unterminated attribute name in '{rest}'"))?;
            (&rest[1..=end], rest[end + 2..].trim())
        }
        Some(_) => split_keyword(rest),
        None => return Err("attribute declaration without a name".to_string()),
    };
    let kind = if kind.starts_with('{') {
        AttributeKind::Nominal
    } else {
        let word = kind.split_whitespace().next().unwrap_or_default();
        match word.to_ascii_lowercase().as_str() {
            "numeric" | "real" | "integer" => AttributeKind::Numeric,
            "string" => AttributeKind::String,
            "date" => AttributeKind::Date,
            other => return Err(format!("unsupported attribute type '{other}' for '{name}'")),
        }
    };
    Ok(Attribute {
        name: name.to_string(),
        kind,
    })
}

/// Split on commas outside single or double quotes; fields keep their quotes.
fn split_quoted(line: &str) -> Result<Vec<&str>, String> {
    let mut fields = Vec::new();
    let mut start = 0;
    let mut quote: Option<char> = None;
    for (pos, ch) in line.char_indices() {
        match (quote, ch) {
            (Some(open), ch) if ch == open => quote = None,
            (Some(_), _) => {}
            (None, '\'' | '"') => quote = Some(ch),
            (None, ',') => {
                fields.push(line[start..pos].trim());
                start = pos + 1;
            }
            (None, _) => {}
        }
    }
    if quote.is_some() {
        return Err(format!("unterminated quote in '{line}'"));
    }
    fields.push(line[start..].trim());
    Ok(fields)
}

fn parse_dense_row(line: &str, width: usize) -> Result<Vec<String>, String> {
    let values: Vec<String> = split_quoted(line)?
        .into_iter()
        .map(|field| unquote(field).to_string())
        .collect();
    if values.len() != width {
        return Err(format!(
            "expected {width} values, found {} in '{line}'",
            values.len()
        ));
    }
    Ok(values)
}

/// Expand a sparse `{index value, ...}` row; omitted attributes read as `0`.
fn parse_sparse_row(line: &str, width: usize) -> Result<Vec<String>, String> {
    let body = line
        .strip_prefix('{')
        .and_then(|rest| rest.strip_suffix('}'))
        .ok_or_else(|| format!("malformed sparse row '{line}'"))?;
    let mut values = vec!["0".to_string(); width];
    for pair in split_quoted(body)?.into_iter().filter(|pair| !pair.is_empty()) {
        let (index, value) = split_keyword(pair);
        let index: usize = index
            .parse()
            .map_err(|_| format!("invalid sparse index '{index}'"))?;
        if index >= width {
            return Err(format!("sparse index {index} exceeds {width} attributes"));
        }
        values[index] = unquote(value).to_string();
    }
    Ok(values)
}
