//! Tab separated value parsing.

use indexmap::IndexMap;

/// Columns of a TSV file keyed by header, in header order.
pub type Columns = IndexMap<String, Vec<String>>;

/// Parse TSV text into columns.
///
/// The first non-empty line is the header. Empty lines are skipped, short rows
/// are padded with empty cells and extra cells are dropped.
pub fn parse_tsv(contents: &str) -> Columns {
    let mut rows = contents.lines().filter(|line| !line.is_empty());

    let Some(header) = rows.next() else {
        return Columns::new();
    };
    let headers: Vec<&str> = header.split('\t').collect();
    let mut columns: Columns = headers.iter().map(|h| (h.to_string(), Vec::new())).collect();

    for row in rows {
        let mut cells = row.split('\t');
        for header in &headers {
            let cell = cells.next().unwrap_or("");
            if let Some(column) = columns.get_mut(*header) {
                column.push(cell.to_string());
            }
        }
    }
    columns
}

/// Parse a column as numbers; cells that are not numeric become `None`.
pub fn numeric_column(columns: &Columns, name: &str) -> Vec<Option<f64>> {
    columns
        .get(name)
        .map(|values| values.iter().map(|v| v.trim().parse::<f64>().ok()).collect())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_columns() {
        let columns = parse_tsv("onset\tduration\ttrial_type\n0.0\t1.5\tgo\n2.0\t1.5\tstop\n");
        assert_eq!(columns.len(), 3);
        assert_eq!(columns["onset"], vec!["0.0", "2.0"]);
        assert_eq!(columns["trial_type"], vec!["go", "stop"]);
    }

    #[test]
    fn test_crlf_and_blank_lines() {
        let columns = parse_tsv("onset\tduration\r\n1\t2\r\n\r\n3\t4\r\n");
        assert_eq!(columns["onset"], vec!["1", "3"]);
        assert_eq!(columns["duration"], vec!["2", "4"]);
    }

    #[test]
    fn test_short_rows_are_padded() {
        let columns = parse_tsv("a\tb\n1\n");
        assert_eq!(columns["a"], vec!["1"]);
        assert_eq!(columns["b"], vec![""]);
    }

    #[test]
    fn test_empty_input() {
        assert!(parse_tsv("").is_empty());
        let columns = parse_tsv("onset\n");
        assert!(columns["onset"].is_empty());
    }

    #[test]
    fn test_numeric_column() {
        let columns = parse_tsv("onset\n1.5\nn/a\n 3 \n");
        assert_eq!(numeric_column(&columns, "onset"), vec![Some(1.5), None, Some(3.0)]);
        assert!(numeric_column(&columns, "missing").is_empty());
    }
}
