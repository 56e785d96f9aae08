//! CSV export of the working set and downloadable templates

use anyhow::{anyhow, Result};
use csv::WriterBuilder;

use crate::types::{ImportRow, ImportSchema};

fn write_rows<S: ImportSchema>(
    raws: impl IntoIterator<Item = Vec<String>>,
    delimiter: u8,
) -> Result<String> {
    let mut writer = WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(Vec::new());

    writer.write_record(S::headers())?;
    for cells in raws {
        writer.write_record(&cells)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| anyhow!("error al finalizar el CSV: {}", e))?;
    Ok(String::from_utf8(bytes)?)
}

/// Serialize rows back to the tabular format, raw fields as read.
pub fn export_csv<'a, S: ImportSchema>(
    rows: impl IntoIterator<Item = &'a ImportRow<S>>,
    delimiter: u8,
) -> Result<String> {
    write_rows::<S>(
        rows.into_iter().map(|row| S::export_fields(&row.raw)),
        delimiter,
    )
}

/// Downloadable template with the canonical headers and example rows.
pub fn template_csv<S: ImportSchema>(delimiter: u8) -> Result<String> {
    write_rows::<S>(
        S::template_rows().iter().map(S::export_fields),
        delimiter,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::report::ReportImport;
    use crate::types::state::{StateImport, StateRawRow};

    #[test]
    fn test_template_has_headers_and_examples() {
        let csv = template_csv::<StateImport>(b',').unwrap();
        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some("nombre,descripcion,color,icono"));
        assert!(lines.next().unwrap().starts_with("Nuevo,"));
        assert!(lines.next().is_some());
    }

    #[test]
    fn test_report_template_headers_match_schema() {
        let csv = template_csv::<ReportImport>(b',').unwrap();
        assert!(csv.starts_with(
            "nombre,descripcion,categoria,estado,latitud,longitud,direccion,referencia_direccion,priority"
        ));
    }

    #[test]
    fn test_export_preserves_raw_values_and_blanks() {
        let rows = vec![
            ImportRow::<StateImport>::parsed(
                1,
                StateRawRow {
                    nombre: Some("Nuevo".into()),
                    descripcion: None,
                    color: Some("notacolor".into()),
                    icono: None,
                },
            ),
        ];
        let csv = export_csv::<StateImport>(&rows, b',').unwrap();
        let data_line = csv.lines().nth(1).unwrap();
        assert_eq!(data_line, "Nuevo,,notacolor,");
    }

    #[test]
    fn test_export_respects_given_subset() {
        let rows = vec![
            ImportRow::<StateImport>::parsed(1, StateRawRow::default()),
            ImportRow::<StateImport>::parsed(2, StateRawRow::default()),
        ];
        let filtered: Vec<_> = rows.iter().filter(|r| r.index == 2).collect();
        let csv = export_csv::<StateImport>(filtered.into_iter(), b',').unwrap();
        assert_eq!(csv.lines().count(), 2); // header + one row
    }
}
