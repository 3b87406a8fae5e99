use serde::Serialize;
use serde_json::Value;

use crate::cli::OutputFormat;

pub mod table;

/// Render a serializable response in the requested format.
pub fn render<T: Serialize>(value: &T, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(value)?),
        OutputFormat::Table => render_table(value, table::terminal_width()),
    }
}

/// Print a serializable response in the requested format.
pub fn output<T: Serialize>(value: &T, format: OutputFormat) -> anyhow::Result<()> {
    let rendered = render(value, format)?;
    println!("{rendered}");
    Ok(())
}

fn render_table<T: Serialize>(value: &T, max_width: Option<usize>) -> anyhow::Result<String> {
    let value = serde_json::to_value(value)?;
    let rendered = match value {
        Value::Array(items) => render_rows(&items, max_width),
        Value::Object(map) => {
            let rows = map
                .into_iter()
                .map(|(key, value)| vec![key, value_to_cell(&value)])
                .collect::<Vec<_>>();
            table::render(&["key", "value"], &rows, max_width)
        }
        scalar => table::render(&["value"], &[vec![value_to_cell(&scalar)]], max_width),
    };
    Ok(rendered)
}

/// One row per array item, one column per object key (first-seen order).
fn render_rows(items: &[Value], max_width: Option<usize>) -> String {
    if items.is_empty() {
        return String::from("(no rows)");
    }

    let mut headers = Vec::<String>::new();
    for map in items.iter().filter_map(Value::as_object) {
        for key in map.keys() {
            if !headers.contains(key) {
                headers.push(key.clone());
            }
        }
    }
    if headers.is_empty() {
        let rows = items.iter().map(|item| vec![value_to_cell(item)]).collect::<Vec<_>>();
        return table::render(&["value"], &rows, max_width);
    }

    let rows = items
        .iter()
        .map(|item| {
            headers
                .iter()
                .map(|header| {
                    item.get(header)
                        .map_or_else(|| String::from("-"), value_to_cell)
                })
                .collect::<Vec<_>>()
        })
        .collect::<Vec<_>>();
    let header_refs = headers.iter().map(String::as_str).collect::<Vec<_>>();
    table::render(&header_refs, &rows, max_width)
}

fn value_to_cell(value: &Value) -> String {
    match value {
        Value::Null => String::from("-"),
        Value::String(v) => v.replace('\n', " "),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde::Serialize;

    use super::{render, render_table};
    use crate::cli::OutputFormat;

    #[derive(Serialize)]
    struct Usage {
        workspace_id: i64,
        usage: u64,
    }

    #[test]
    fn json_render_is_valid_json() {
        let out = render(&Usage { workspace_id: 1, usage: 10 }, OutputFormat::Json).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(parsed["usage"], 10);
    }

    #[test]
    fn object_renders_as_key_value_table() {
        let out = render_table(&Usage { workspace_id: 1, usage: 10 }, None).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert!(lines[0].starts_with("key"));
        assert!(lines[1].chars().all(|c| c == '-'));
        assert!(out.contains("usage"));
    }

    #[test]
    fn array_renders_one_row_per_item() {
        let items = vec![
            Usage { workspace_id: 1, usage: 3 },
            Usage { workspace_id: 2, usage: 40 },
        ];
        let out = render_table(&items, None).unwrap();
        assert_eq!(out.lines().count(), 4);
        assert!(out.lines().next().unwrap().contains("workspace_id"));
    }

    #[test]
    fn empty_array_has_placeholder() {
        let items: Vec<Usage> = Vec::new();
        assert_eq!(render_table(&items, None).unwrap(), "(no rows)");
    }
}
