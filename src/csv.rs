use crate::models::RawRecord;

/// Parse raw CSV text from the published sheet into one record per data row.
///
/// Tolerates what spreadsheet exports actually produce: an optional BOM,
/// LF or CRLF line endings, RFC4180 quoting (embedded commas and newlines
/// inside quoted fields, `""` for a literal quote), blank lines, and rows
/// with fewer or more cells than the header row. Every cell is trimmed
/// after unescaping. The first row is the header row; with no data rows
/// the result is empty.
pub fn parse(text: &str) -> Vec<RawRecord> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut rows = split_rows(text);
    if rows.len() < 2 {
        return Vec::new();
    }
    let headers = rows.remove(0);
    rows.into_iter()
        .map(|cells| align(&headers, cells))
        .collect()
}

/// Pad or truncate a row to the header width so records never misalign,
/// even when a sheet editor leaves trailing cells out or a line ends with
/// a stray comma.
fn align(headers: &[String], mut cells: Vec<String>) -> RawRecord {
    cells.resize(headers.len(), String::new());
    RawRecord::new(headers.iter().cloned().zip(cells).collect())
}

/// Split the whole text into rows of unescaped, trimmed cells.
///
/// A single pass over the characters; quotes toggle a state rather than
/// delimit a scan, so a missing closing quote consumes the rest of the
/// input instead of looping. Blank and whitespace-only lines yield one
/// empty cell and are dropped here.
fn split_rows(text: &str) -> Vec<Vec<String>> {
    let mut rows: Vec<Vec<String>> = Vec::new();
    let mut row: Vec<String> = Vec::new();
    let mut cell = String::new();
    let mut chars = text.chars().peekable();

    let mut in_quotes = false;
    while let Some(ch) = chars.next() {
        match ch {
            '"' => {
                if in_quotes {
                    if chars.peek() == Some(&'"') {
                        chars.next();
                        cell.push('"');
                    } else {
                        in_quotes = false;
                    }
                } else {
                    in_quotes = true;
                }
            }
            ',' if !in_quotes => row.push(finish(&mut cell)),
            '\r' | '\n' if !in_quotes => {
                if ch == '\r' && chars.peek() == Some(&'\n') {
                    chars.next();
                }
                row.push(finish(&mut cell));
                if !is_blank(&row) {
                    rows.push(std::mem::take(&mut row));
                } else {
                    row.clear();
                }
            }
            _ => cell.push(ch),
        }
    }

    // Flush the last line when the text has no trailing newline.
    if !row.is_empty() || !cell.trim().is_empty() {
        row.push(finish(&mut cell));
        if !is_blank(&row) {
            rows.push(row);
        }
    }

    rows
}

fn finish(cell: &mut String) -> String {
    let value = cell.trim().to_string();
    cell.clear();
    value
}

fn is_blank(row: &[String]) -> bool {
    row.is_empty() || (row.len() == 1 && row[0].is_empty())
}
