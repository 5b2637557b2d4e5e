use anyhow::{anyhow, bail, Context, Result};
use serde_json::{Map, Value};
use std::io::Read;
use std::path::Path;

/// One table cell as read from its source
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Number(f64),
    Text(String),
}

impl Cell {
    fn from_text(text: &str) -> Self {
        if text.is_empty() {
            Cell::Empty
        } else {
            Cell::Text(text.to_string())
        }
    }

    fn from_json(field: &str, value: Option<&Value>) -> Result<Self> {
        match value {
            None | Some(Value::Null) => Ok(Cell::Empty),
            Some(Value::Number(n)) => n
                .as_f64()
                .map(Cell::Number)
                .ok_or_else(|| anyhow!("Number {} in field '{}' is out of range", n, field)),
            Some(Value::String(s)) => Ok(Cell::from_text(s.trim())),
            Some(other) => bail!("Unsupported value {} for field '{}'", other, field),
        }
    }
}

/// Column-oriented table that series values are read from
#[derive(Debug, Clone, Default)]
pub struct DataTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl DataTable {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<Cell>>) -> Self {
        Self { headers, rows }
    }

    /// Read a CSV table with a header row
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = reader
            .headers()
            .context("Failed to read CSV header")?
            .iter()
            .map(str::to_string)
            .collect();

        let mut rows = Vec::new();
        for (idx, record) in reader.records().enumerate() {
            let record = record.with_context(|| format!("Failed to read CSV row {}", idx + 1))?;
            rows.push(record.iter().map(Cell::from_text).collect());
        }

        Ok(Self { headers, rows })
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path)
            .with_context(|| format!("Failed to open data file '{}'", path.display()))?;
        Self::from_csv_reader(file)
            .with_context(|| format!("Failed to read data file '{}'", path.display()))
    }

    /// Create a table from a JSON array of objects. The first object names
    /// the columns; missing fields and nulls are empty cells.
    pub fn from_json(value: &Value) -> Result<Self> {
        let objects: Vec<Map<String, Value>> = serde_json::from_value(value.clone())
            .context("Input data must be a JSON array of objects")?;
        let headers: Vec<String> = match objects.first() {
            Some(first) => first.keys().cloned().collect(),
            None => bail!("Input data array is empty"),
        };

        let rows = objects
            .iter()
            .map(|obj| {
                headers
                    .iter()
                    .map(|header| Cell::from_json(header, obj.get(header)))
                    .collect::<Result<Vec<Cell>>>()
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { headers, rows })
    }

    /// Numeric values of a column. Empty cells become NaN, which breaks a
    /// plotted line at that row.
    pub fn column(&self, name: &str) -> Result<Vec<f64>> {
        let idx = self
            .headers
            .iter()
            .position(|h| h.eq_ignore_ascii_case(name))
            .ok_or_else(|| anyhow!("Column '{}' not found", name))?;

        self.rows
            .iter()
            .enumerate()
            .map(|(row_idx, row)| match row.get(idx) {
                None | Some(Cell::Empty) => Ok(f64::NAN),
                Some(Cell::Number(v)) => Ok(*v),
                Some(Cell::Text(text)) => text.parse::<f64>().with_context(|| {
                    format!(
                        "Failed to parse '{}' as number in column '{}' at row {}",
                        text,
                        name,
                        row_idx + 1
                    )
                }),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const CSV: &str = "t, v1 ,v2\n0,1.5,2\n1,2.5,\n2,3.5,4\n";

    #[test]
    fn test_csv_columns() {
        let table = DataTable::from_csv_reader(CSV.as_bytes()).unwrap();
        assert_eq!(table.headers, vec!["t", "v1", "v2"]);
        assert_eq!(table.column("V1").unwrap(), vec![1.5, 2.5, 3.5]);

        let v2 = table.column("v2").unwrap();
        assert_eq!(v2[0], 2.0);
        assert!(v2[1].is_nan());
    }

    #[test]
    fn test_missing_column() {
        let table = DataTable::from_csv_reader(CSV.as_bytes()).unwrap();
        let err = table.column("current").unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_non_numeric_cell() {
        let table = DataTable::from_csv_reader("x\n1\nabc\n".as_bytes()).unwrap();
        let err = table.column("x").unwrap_err();
        assert!(err.to_string().contains("Failed to parse 'abc'"));
        assert!(err.to_string().contains("at row 2"));
    }

    #[test]
    fn test_from_json_rows() {
        let value = json!([{"t": 0, "v": "1.5"}, {"t": 1, "v": null}]);
        let table = DataTable::from_json(&value).unwrap();
        assert_eq!(table.column("t").unwrap(), vec![0.0, 1.0]);
        assert!(table.column("v").unwrap()[1].is_nan());
    }

    #[test]
    fn test_from_json_keeps_numbers() {
        let value = json!([{"t": 0.1, "v": 2}, {"t": 1e-7}]);
        let table = DataTable::from_json(&value).unwrap();
        assert_eq!(table.rows[0][0], Cell::Number(0.1));
        assert_eq!(table.rows[1][1], Cell::Empty);
        assert_eq!(table.column("t").unwrap(), vec![0.1, 1e-7]);
    }

    #[test]
    fn test_from_json_rejects_non_array() {
        assert!(DataTable::from_json(&json!({"t": 1})).is_err());
        assert!(DataTable::from_json(&json!([])).is_err());
        assert!(DataTable::from_json(&json!([1, 2])).is_err());
        let err = DataTable::from_json(&json!([{"t": true}])).unwrap_err();
        assert!(err.to_string().contains("field 't'"));
    }
}
