//! Results files: commented metadata header plus CSV data section.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Local;
use serde::{Deserialize, Serialize};

use crate::error::{AppResult, ResultsError};
use crate::naming::resolve_placeholders;
use crate::parameter::ParameterValue;
use crate::registry::ParameterRegistry;

// ============================================================================
// Header
// ============================================================================

/// Metadata written above the CSV section, one `# `-prefixed line per JSON
/// line.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResultsHeader {
    /// Name of the procedure that produced the file.
    pub procedure: String,
    /// Version of the software that wrote the file.
    pub software_version: String,
    /// RFC 3339 creation timestamp.
    pub created: String,
    /// Declared parameters in declaration order, values rendered with their
    /// default representation.
    pub parameters: Vec<HeaderParameter>,
}

/// One parameter entry of a results header.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HeaderParameter {
    /// Display name.
    pub name: String,
    /// Rendered value (booleans read `True`/`False`).
    pub value: String,
    /// Unit of measurement, omitted when the parameter has none.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub units: Option<String>,
}

impl ResultsHeader {
    /// Snapshot a registry into a header.
    ///
    /// Every declared parameter must hold a value; an unset one is a
    /// [`ResultsError::ParameterNotSet`] error, since a results file whose
    /// header understates the procedure would be worse than no file.
    pub fn from_registry(registry: &ParameterRegistry, procedure: &str) -> AppResult<Self> {
        let mut parameters = Vec::with_capacity(registry.len());
        for parameter in registry.iter() {
            parameters.push(HeaderParameter {
                name: parameter.display_name().to_string(),
                value: parameter.value()?.to_string(),
                units: parameter.units().map(str::to_string),
            });
        }

        Ok(Self {
            procedure: procedure.to_string(),
            software_version: env!("CARGO_PKG_VERSION").to_string(),
            created: Local::now().to_rfc3339(),
            parameters,
        })
    }
}

// ============================================================================
// Writer
// ============================================================================

/// Synchronous writer for one results file.
///
/// Column labels may contain placeholders; they are resolved against the
/// registry when the file is created, so a label like
/// `"Signal ({Wavelength} nm)"` ends up with the actual wavelength in the
/// CSV header.
#[derive(Debug)]
pub struct ResultsWriter {
    path: PathBuf,
    columns: Vec<String>,
    writer: csv::Writer<File>,
}

impl ResultsWriter {
    /// Create the results file: header lines, then the CSV column record.
    pub fn create(
        path: impl AsRef<Path>,
        registry: &ParameterRegistry,
        procedure: &str,
        columns: &[&str],
    ) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        let mut resolved_columns = Vec::with_capacity(columns.len());
        for label in columns {
            resolved_columns.push(resolve_placeholders(label, registry)?);
        }

        let header = ResultsHeader::from_registry(registry, procedure)?;

        let mut file = File::create(&path)
            .with_context(|| format!("Failed to create results file at {:?}", path))?;

        let json_string = serde_json::to_string_pretty(&header)
            .context("Failed to serialize results header to JSON")?;

        for line in json_string.lines() {
            file.write_all(b"# ")
                .and_then(|_| file.write_all(line.as_bytes()))
                .and_then(|_| file.write_all(b"\n"))
                .context("Failed to write results header")?;
        }

        let mut writer = csv::Writer::from_writer(file);
        writer
            .write_record(&resolved_columns)
            .context("Failed to write CSV column header")?;

        log::info!("Results file created at '{}'.", path.display());
        Ok(Self {
            path,
            columns: resolved_columns,
            writer,
        })
    }

    /// Append one data row, rendered with the default per-kind rules.
    pub fn write_row(&mut self, values: &[ParameterValue]) -> Result<()> {
        if values.len() != self.columns.len() {
            return Err(ResultsError::ColumnCountMismatch {
                expected: self.columns.len(),
                actual: values.len(),
            }
            .into());
        }

        self.writer
            .write_record(values.iter().map(ToString::to_string))
            .context("Failed to write data row")?;
        Ok(())
    }

    /// Flush buffered rows to disk.
    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush().context("Failed to flush results file")?;
        Ok(())
    }

    /// Flush and close the file.
    pub fn finish(mut self) -> Result<()> {
        self.writer.flush().context("Failed to flush results file")?;
        log::info!("Results file '{}' closed.", self.path.display());
        Ok(())
    }

    /// Path of the file being written.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Resolved column labels, in CSV order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parameter::Parameter;

    fn sample_registry() -> ParameterRegistry {
        let mut registry = ParameterRegistry::new();
        registry
            .register(Parameter::text("sample", "Sample Name").with_default("GaAs-12"))
            .unwrap();
        registry
            .register(
                Parameter::float("wavelength", "Wavelength")
                    .with_units("nm")
                    .with_default(800.0),
            )
            .unwrap();
        registry
            .register(Parameter::boolean("chopped", "Chopper Enabled").with_default(true))
            .unwrap();
        registry
    }

    #[test]
    fn test_create_writes_header_and_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.csv");

        let registry = sample_registry();
        let mut writer =
            ResultsWriter::create(&path, &registry, "PumpProbeScan", &["Delay (ps)", "Signal"])
                .unwrap();
        writer
            .write_row(&[ParameterValue::Float(0.5), ParameterValue::Float(1e-3)])
            .unwrap();
        writer
            .write_row(&[ParameterValue::Float(1.0), ParameterValue::Float(2e-3)])
            .unwrap();
        writer.finish().unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let (header_lines, data_lines): (Vec<&str>, Vec<&str>) =
            contents.lines().partition(|l| l.starts_with("# "));

        let json: String = header_lines
            .iter()
            .map(|l| &l[2..])
            .collect::<Vec<_>>()
            .join("\n");
        let header: ResultsHeader = serde_json::from_str(&json).unwrap();
        assert_eq!(header.procedure, "PumpProbeScan");
        assert_eq!(header.software_version, env!("CARGO_PKG_VERSION"));
        let names: Vec<&str> = header.parameters.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["Sample Name", "Wavelength", "Chopper Enabled"]);
        assert_eq!(header.parameters[2].value, "True");

        assert_eq!(data_lines[0], "Delay (ps),Signal");
        assert_eq!(data_lines[1], "0.5,0.001");
        assert_eq!(data_lines.len(), 3);
    }

    #[test]
    fn test_column_labels_resolve_placeholders() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("labels.csv");

        let registry = sample_registry();
        let writer = ResultsWriter::create(
            &path,
            &registry,
            "Scan",
            &["Time (s)", "Signal ({Wavelength} nm)"],
        )
        .unwrap();
        assert_eq!(writer.columns()[1], "Signal (800 nm)");
    }

    #[test]
    fn test_unknown_column_placeholder_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.csv");

        let registry = sample_registry();
        let err = ResultsWriter::create(&path, &registry, "Scan", &["{Missing} (a.u.)"])
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ResultsError>(),
            Some(ResultsError::UnresolvedPlaceholder(_))
        ));
    }

    #[test]
    fn test_write_row_arity_checked() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("arity.csv");

        let registry = sample_registry();
        let mut writer = ResultsWriter::create(&path, &registry, "Scan", &["A", "B"]).unwrap();
        let err = writer
            .write_row(&[ParameterValue::Float(1.0)])
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ResultsError>(),
            Some(ResultsError::ColumnCountMismatch {
                expected: 2,
                actual: 1
            })
        ));
    }

    #[test]
    fn test_unset_parameter_blocks_creation() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("unset.csv");

        let mut registry = sample_registry();
        registry
            .register(Parameter::float("power", "Pump Power"))
            .unwrap();
        let err = ResultsWriter::create(&path, &registry, "Scan", &["A"]).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ResultsError>(),
            Some(ResultsError::ParameterNotSet(_))
        ));
    }
}
