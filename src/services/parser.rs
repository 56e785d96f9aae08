//! CSV parsing into the working set

use csv::ReaderBuilder;
use tracing::debug;

use crate::error::ParseError;
use crate::types::{ImportRow, ImportSchema};

/// Parse a delimited file into an ordered sequence of rows.
///
/// The header row defines field names; each data line becomes one row with
/// `index` set to its 1-based position among data rows. Any record that
/// cannot be tokenized fails the whole parse — no rows are produced.
pub fn parse<S: ImportSchema>(content: &str, delimiter: u8) -> Result<Vec<ImportRow<S>>, ParseError> {
    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .from_reader(content.as_bytes());

    let mut rows = Vec::new();
    for result in reader.deserialize() {
        let raw: S::Raw = result?;
        rows.push(ImportRow::parsed(rows.len() as u32 + 1, raw));
    }

    debug!("Parsed {} {} rows", rows.len(), S::kind());
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::report::ReportImport;
    use crate::types::state::StateImport;
    use crate::types::RowStatus;

    #[test]
    fn test_parse_assigns_sequential_one_based_indices() {
        let content = "nombre,descripcion,color,icono\n\
                       Nuevo,Recibido,#3B82F6,inbox\n\
                       En proceso,Trabajando,#F59E0B,wrench\n\
                       Resuelto,Cerrado,#22C55E,check-circle\n";
        let rows = parse::<StateImport>(content, b',').unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(
            rows.iter().map(|r| r.index).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
        assert_eq!(rows[1].raw.nombre.as_deref(), Some("En proceso"));
        assert!(rows.iter().all(|r| r.status == RowStatus::Pending));
    }

    #[test]
    fn test_parse_header_only_file_yields_no_rows() {
        let rows = parse::<StateImport>("nombre,descripcion,color,icono\n", b',').unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn test_parse_accepts_english_header_aliases() {
        let content = "name,description,color,icon\nNuevo,Recibido,,inbox\n";
        let rows = parse::<StateImport>(content, b',').unwrap();
        assert_eq!(rows[0].raw.nombre.as_deref(), Some("Nuevo"));
        assert_eq!(rows[0].raw.icono.as_deref(), Some("inbox"));
    }

    #[test]
    fn test_parse_ragged_row_fails_wholesale() {
        let content = "nombre,descripcion,color,icono\n\
                       Nuevo,Recibido,#3B82F6,inbox\n\
                       Roto,solo,dos\n";
        assert!(parse::<StateImport>(content, b',').is_err());
    }

    #[test]
    fn test_parse_semicolon_delimiter() {
        let content = "nombre;descripcion;color;icono\nNuevo;Recibido;#3B82F6;inbox\n";
        let rows = parse::<StateImport>(content, b';').unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].raw.color.as_deref(), Some("#3B82F6"));
    }

    #[test]
    fn test_parse_report_headers() {
        let content = "nombre,descripcion,categoria,estado,latitud,longitud,direccion,referencia_direccion,priority\n\
                       Bache,Profundo,Baches,Nuevo,19.43,-99.13,Av. Juárez,Frente al mercado,alta\n";
        let rows = parse::<ReportImport>(content, b',').unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].raw.latitud.as_deref(), Some("19.43"));
        assert_eq!(rows[0].raw.priority.as_deref(), Some("alta"));
    }
}
