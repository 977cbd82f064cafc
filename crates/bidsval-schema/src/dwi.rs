//! Diffusion gradient tables (`.bval` / `.bvec`).

fn parse_row(line: &str) -> Result<Vec<f64>, String> {
    line.split_whitespace()
        .map(|value| {
            value
                .parse::<f64>()
                .map_err(|_| format!("non-numeric value `{value}`"))
        })
        .collect()
}

/// Parse b-values: one row of whitespace separated numbers.
pub fn parse_bval(contents: &str) -> Result<Vec<f64>, String> {
    let mut rows = contents.lines().filter(|line| !line.trim().is_empty());
    let values = match rows.next() {
        Some(line) => parse_row(line)?,
        None => Vec::new(),
    };
    if rows.next().is_some() {
        return Err("expected a single row of b-values".to_string());
    }
    Ok(values)
}

/// Parse b-vectors: three rows (x, y, z) of equal length.
pub fn parse_bvec(contents: &str) -> Result<Vec<Vec<f64>>, String> {
    let rows = contents
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(parse_row)
        .collect::<Result<Vec<_>, _>>()?;

    if rows.len() != 3 {
        return Err(format!("expected 3 rows, found {}", rows.len()));
    }
    if rows.iter().any(|row| row.len() != rows[0].len()) {
        return Err("rows have different lengths".to_string());
    }
    Ok(rows)
}
