use std::collections::{BTreeSet, HashMap};

use serde_json::Value;

use super::{ParsedBatch, RawRecord, StructuralError, UploadFormat, require_columns};

/// Parse CSV text with a header row.
///
/// Header names are matched case-insensitively. Rows whose cells are all blank
/// are skipped, which tolerates the trailing `,,,` lines spreadsheets emit.
pub fn parse_csv(text: &str) -> Result<ParsedBatch, StructuralError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| StructuralError::MalformedCsv(e.to_string()))?
        .iter()
        .map(|h| h.trim().to_lowercase())
        .collect();
    let found: Vec<String> = headers.iter().filter(|h| !h.is_empty()).cloned().collect();
    require_columns(&found)?;

    let mut records = Vec::new();
    let mut lines = LineCounter::new(text);
    for result in reader.records() {
        let record = result.map_err(|e| StructuralError::MalformedCsv(e.to_string()))?;
        if record.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }
        let mut fields = HashMap::with_capacity(headers.len());
        for (header, cell) in headers.iter().zip(record.iter()) {
            if header.is_empty() {
                continue;
            }
            fields
                .entry(header.clone())
                .or_insert_with(|| cell.to_string());
        }
        let line = match record.position() {
            Some(pos) => lines.line_at(pos.byte() as usize),
            None => records.len() + 2,
        };
        records.push(RawRecord::new(line, fields));
    }

    if records.is_empty() {
        return Err(StructuralError::Empty);
    }
    Ok(ParsedBatch {
        format: UploadFormat::Csv,
        records,
    })
}

/// Maps reader byte offsets to 1-based source lines. Offsets only grow, so
/// each byte is scanned once.
struct LineCounter<'a> {
    bytes: &'a [u8],
    scanned: usize,
    line: usize,
}

impl<'a> LineCounter<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            bytes: text.as_bytes(),
            scanned: 0,
            line: 1,
        }
    }

    /// A record's offset can point at the blank lines before it.
    fn line_at(&mut self, offset: usize) -> usize {
        let mut start = offset.clamp(self.scanned, self.bytes.len());
        while let Some(b'\r' | b'\n') = self.bytes.get(start) {
            start += 1;
        }
        self.line += self.bytes[self.scanned..start]
            .iter()
            .filter(|&&b| b == b'\n')
            .count();
        self.scanned = start;
        self.line
    }
}

/// Parse a JSON upload: `{"products": [...]}` or a bare array of objects.
///
/// Scalars are taken as text so that `"9.99"` and `9.99` validate the same way.
/// A required field counts as a present column if any record carries the key,
/// even with a null value; rows lacking a value are then reported individually.
pub fn parse_json(value: Value) -> Result<ParsedBatch, StructuralError> {
    let items = match value {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("products") {
            Some(Value::Array(items)) => items,
            Some(_) => {
                return Err(StructuralError::MalformedJson(
                    "`products` must be an array".into(),
                ));
            }
            None => {
                return Err(StructuralError::MalformedJson(
                    "expected a `products` array".into(),
                ));
            }
        },
        _ => {
            return Err(StructuralError::MalformedJson(
                "expected an object with a `products` array".into(),
            ));
        }
    };

    let mut found = BTreeSet::new();
    let mut records = Vec::with_capacity(items.len());
    for (index, item) in items.into_iter().enumerate() {
        let Value::Object(map) = item else {
            return Err(StructuralError::MalformedJson(format!(
                "product {} is not an object",
                index + 1
            )));
        };
        let mut fields = HashMap::with_capacity(map.len());
        for (key, value) in map {
            let key = key.trim().to_lowercase();
            found.insert(key.clone());
            let text = match value {
                Value::Null => continue,
                Value::String(s) => s,
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                other => other.to_string(),
            };
            fields.entry(key).or_insert(text);
        }
        records.push(RawRecord::new(index + 1, fields));
    }

    if records.is_empty() {
        return Err(StructuralError::Empty);
    }
    let found: Vec<String> = found.into_iter().collect();
    require_columns(&found)?;

    Ok(ParsedBatch {
        format: UploadFormat::Json,
        records,
    })
}
