//! Maps an arbitrary [`RawTable`] onto the canonical corpus shape.
//!
//! Column precedence is fixed: persisted index entries are keyed by the
//! record ids this module assigns, so changing the order in which columns are
//! picked would silently re-key an existing index.

use std::collections::HashMap;

use crate::error::AnalyticsError;
use crate::table::{Column, ColumnKind, RawTable};
use crate::types::{CategorySource, ColumnSelection, Corpus, LanguageSource, NormalizedRecord};

/// Text column names, highest priority first.
const TEXT_COLUMNS: &[&str] = &[
    "text",
    "texto",
    "content",
    "conteudo",
    "message",
    "mensagem",
    "sentence",
    "frase",
    "review",
    "review_text",
    "comment",
    "comentario",
    "tweet",
    "body",
];

const CATEGORY_COLUMNS: &[&str] = &["categoria", "category", "label", "class", "topic", "tema"];

const LANGUAGE_COLUMNS: &[&str] = &["idioma", "language", "lang", "lingua"];

/// Boolean column marking customer-to-company messages.
const INBOUND_COLUMN: &str = "inbound";

pub const DEFAULT_CATEGORY: &str = "general";
pub const DEFAULT_LANGUAGE: &str = "pt";
pub const INBOUND_CATEGORY: &str = "inbound";
pub const OUTBOUND_CATEGORY: &str = "outbound";

enum CategoryRule<'a> {
    Column(&'a Column),
    Inbound(&'a Column),
    Default,
}

/// Normalizes `table` into a corpus of at most `max_rows` records.
///
/// 1. Picks the text column: first name from the priority list, otherwise the
///    first free-form string column.
/// 2. Derives categories from an explicit column, else from a boolean
///    `inbound` column, else the default category.
/// 3. Derives languages from an explicit column (missing values get the
///    default), else the default language.
/// 4. Drops rows whose text is empty or whitespace-only.
/// 5. Keeps the first `max_rows` rows and reindexes them from zero.
///
/// # Errors
///
/// Returns [`AnalyticsError::Schema`] if no usable text column exists.
pub fn normalize(table: &RawTable, max_rows: usize) -> Result<Corpus, AnalyticsError> {
    let lookup = column_lookup(table);
    let find = |names: &[&str]| find_column(table, &lookup, names);

    let text_column = find(TEXT_COLUMNS)
        .or_else(|| {
            table
                .columns()
                .iter()
                .find(|c| c.kind() == ColumnKind::Text)
        })
        .ok_or_else(|| {
            AnalyticsError::Schema(format!(
                "no text column found among {:?}",
                table.columns().iter().map(|c| &c.name).collect::<Vec<_>>()
            ))
        })?;

    let category_rule = if let Some(column) = find(CATEGORY_COLUMNS) {
        CategoryRule::Column(column)
    } else if let Some(column) =
        find(&[INBOUND_COLUMN]).filter(|c| c.kind() == ColumnKind::Boolean)
    {
        CategoryRule::Inbound(column)
    } else {
        CategoryRule::Default
    };
    let language_column = find(LANGUAGE_COLUMNS);

    let selection = ColumnSelection {
        text: text_column.name.clone(),
        category: match category_rule {
            CategoryRule::Column(c) => CategorySource::Column(c.name.clone()),
            CategoryRule::Inbound(c) => CategorySource::Inbound(c.name.clone()),
            CategoryRule::Default => CategorySource::Default,
        },
        language: language_column.map_or(LanguageSource::Default, |c| {
            LanguageSource::Column(c.name.clone())
        }),
    };
    tracing::info!(
        text = %selection.text,
        category = ?selection.category,
        language = ?selection.language,
        "dataset columns selected"
    );

    let mut records: Vec<NormalizedRecord> = Vec::new();
    for row in 0..table.rows() {
        let Some(text) = text_column.cells[row]
            .render()
            .filter(|t| !t.trim().is_empty())
        else {
            continue;
        };
        records.push(NormalizedRecord {
            id: 0,
            text,
            category: category_for(&category_rule, row),
            language: language_column
                .and_then(|c| c.cells[row].render())
                .filter(|l| !l.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string()),
        });
    }

    if records.len() > max_rows {
        tracing::info!(
            rows = records.len(),
            max_rows,
            "dataset truncated to its first max_rows rows"
        );
        records.truncate(max_rows);
    }

    for (id, record) in records.iter_mut().enumerate() {
        record.id = id;
    }

    Ok(Corpus::new(records, selection, table.rows()))
}

/// Lowercased, trimmed column name to column index; first occurrence wins.
fn column_lookup(table: &RawTable) -> HashMap<String, usize> {
    let mut lookup = HashMap::new();
    for (idx, column) in table.columns().iter().enumerate() {
        lookup
            .entry(column.name.trim().to_lowercase())
            .or_insert(idx);
    }
    lookup
}

fn find_column<'t>(
    table: &'t RawTable,
    lookup: &HashMap<String, usize>,
    names: &[&str],
) -> Option<&'t Column> {
    names
        .iter()
        .find_map(|name| lookup.get(*name))
        .and_then(|idx| table.column(*idx))
}

fn category_for(rule: &CategoryRule<'_>, row: usize) -> String {
    match rule {
        CategoryRule::Column(column) => column.cells[row]
            .render()
            .filter(|c| !c.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
        CategoryRule::Inbound(column) => match column.cells[row].as_bool() {
            Some(true) => INBOUND_CATEGORY.to_string(),
            Some(false) => OUTBOUND_CATEGORY.to_string(),
            None => DEFAULT_CATEGORY.to_string(),
        },
        CategoryRule::Default => DEFAULT_CATEGORY.to_string(),
    }
}
