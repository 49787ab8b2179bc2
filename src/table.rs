use super::error::DashboardError;
use super::REQUIRED_COLUMNS;
use csv::{ReaderBuilder, StringRecord, Trim};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// The uploaded file as read, before any typing:
/// the header row and every record as strings.
#[derive(Debug, Clone)]
pub struct RawTable {
    pub headers: StringRecord,
    pub records: Vec<StringRecord>,
}

impl RawTable {
    /// Read a csv file, refusing anything without a .csv extension.
    pub fn from_csv<P>(fin: P) -> Result<RawTable, DashboardError>
    where
        P: AsRef<Path>,
    {
        let path = fin.as_ref();
        if !has_csv_extension(path) {
            return Err(DashboardError::Extension(path.to_path_buf()));
        }
        let file = File::open(path)?;
        RawTable::from_reader(file)
    }

    /// Read a csv payload with a header row.
    /// Fields and headers are trimmed and ragged lines are tolerated.
    pub fn from_reader<R: Read>(rdr: R) -> Result<RawTable, DashboardError> {
        let mut csv_reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(Trim::All)
            .from_reader(rdr);
        let headers = csv_reader.headers()?.clone();
        let records = csv_reader
            .records()
            .collect::<Result<Vec<StringRecord>, csv::Error>>()?;
        tracing::debug!(
            columns = headers.len(),
            rows = records.len(),
            "read raw csv table"
        );
        Ok(RawTable { headers, records })
    }

    /// Check that the header row contains all the required columns.
    pub fn validate_schema(&self) -> Result<(), DashboardError> {
        validate_schema(&self.headers)
    }

    /// The first `n` records, untouched.
    pub fn preview(&self, n: usize) -> &[StringRecord] {
        &self.records[..n.min(self.records.len())]
    }
}

/// Fail unless the headers are a superset of the required columns.
pub fn validate_schema(headers: &StringRecord) -> Result<(), DashboardError> {
    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|c| !headers.iter().any(|h| h == **c))
        .map(|c| c.to_string())
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(DashboardError::Schema {
            required: REQUIRED_COLUMNS.iter().map(|c| c.to_string()).collect(),
            missing,
        })
    }
}

fn has_csv_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("csv"))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_accepts_superset() {
        let t = RawTable::from_reader(
            "Extra,Data/Hora,Consumo em kWh,Custo Total\nx,2024-01-01 10:00,1.0,0.5\n".as_bytes(),
        )
        .unwrap();
        assert!(t.validate_schema().is_ok());
        assert_eq!(t.records.len(), 1);
    }

    #[test]
    fn schema_reports_missing_cost() {
        let t = RawTable::from_reader("Data/Hora,Consumo em kWh\n2024-01-01 10:00,1.0\n".as_bytes())
            .unwrap();
        match t.validate_schema() {
            Err(DashboardError::Schema { required, missing }) => {
                assert_eq!(required.len(), 3);
                assert_eq!(missing, vec!["Custo Total".to_string()]);
            }
            other => panic!("expected schema error, got {:?}", other),
        }
    }

    #[test]
    fn each_required_column_is_mandatory() {
        for dropped in REQUIRED_COLUMNS.iter() {
            let kept: Vec<&str> = REQUIRED_COLUMNS
                .iter()
                .filter(|c| *c != dropped)
                .copied()
                .chain(std::iter::once("Medidor"))
                .collect();
            let headers = StringRecord::from(kept);
            match validate_schema(&headers) {
                Err(DashboardError::Schema { missing, .. }) => {
                    assert_eq!(missing, vec![dropped.to_string()])
                }
                other => panic!("expected schema error without {}, got {:?}", dropped, other),
            }
        }
    }

    #[test]
    fn schema_message_names_required_columns() {
        let headers = StringRecord::from(vec!["Data/Hora"]);
        let msg = validate_schema(&headers).unwrap_err().to_string();
        assert!(msg.contains("Data/Hora, Consumo em kWh, Custo Total"));
        assert!(msg.contains("missing: Consumo em kWh, Custo Total"));
    }

    #[test]
    fn headers_are_trimmed() {
        let t = RawTable::from_reader(
            " Data/Hora , Consumo em kWh ,Custo Total\n2024-01-01 10:00,1.0,0.5\n".as_bytes(),
        )
        .unwrap();
        assert!(t.validate_schema().is_ok());
    }

    #[test]
    fn preview_is_capped() {
        let t = RawTable::from_csv("./test/readings.csv").unwrap();
        assert_eq!(t.preview(5).len(), 5);
        assert_eq!(t.preview(1000).len(), t.records.len());
    }

    #[test]
    fn non_csv_extension_is_rejected() {
        match RawTable::from_csv("./test/readings.txt") {
            Err(DashboardError::Extension(p)) => assert!(p.ends_with("readings.txt")),
            other => panic!("expected extension error, got {:?}", other),
        }
    }
}
