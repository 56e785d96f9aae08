//! Report entity schema for CSV import
//!
//! Latitude/longitude are mandatory and bounds-checked (hard errors);
//! category, state and priority resolve against the catalog with fallback
//! defaults; blank free-text fields are defaulted with a warning.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::defaults;
use crate::types::catalog::Catalog;
use crate::types::row::{RowIssue, RowOutcome};
use crate::types::schema::ImportSchema;

/// Report priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "baja",
            Priority::Medium => "media",
            Priority::High => "alta",
        }
    }
}

fn parse_priority(s: &str) -> Option<Priority> {
    match s.trim().to_lowercase().as_str() {
        "alta" | "high" | "urgente" | "crítica" | "critica" => Some(Priority::High),
        "media" | "medium" | "normal" => Some(Priority::Medium),
        "baja" | "low" => Some(Priority::Low),
        _ => None,
    }
}

/// Raw report row as read from the file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportRawRow {
    #[serde(alias = "name")]
    pub nombre: Option<String>,
    #[serde(alias = "description")]
    pub descripcion: Option<String>,
    #[serde(alias = "category")]
    pub categoria: Option<String>,
    #[serde(alias = "state")]
    pub estado: Option<String>,
    #[serde(alias = "latitude", alias = "lat")]
    pub latitud: Option<String>,
    #[serde(alias = "longitude", alias = "lng", alias = "lon")]
    pub longitud: Option<String>,
    #[serde(alias = "address")]
    pub direccion: Option<String>,
    #[serde(alias = "address_reference")]
    pub referencia_direccion: Option<String>,
    #[serde(alias = "prioridad")]
    pub priority: Option<String>,
}

/// Fully resolved report candidate
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRecord {
    pub name: String,
    pub description: String,
    pub category_id: Uuid,
    pub state_id: Uuid,
    pub latitude: f64,
    pub longitude: f64,
    pub address: String,
    pub address_reference: String,
    pub priority: Priority,
}

fn trimmed(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn text_or_default(
    value: &Option<String>,
    field: &'static str,
    default: &str,
    warnings: &mut Vec<RowIssue>,
) -> String {
    match trimmed(value) {
        Some(s) => s.to_string(),
        None => {
            let message = if default.is_empty() {
                "Campo vacío, se importará vacío".to_string()
            } else {
                format!("Campo vacío, se usará \"{}\"", default)
            };
            warnings.push(RowIssue::new(field, message, None));
            default.to_string()
        }
    }
}

/// Parse a coordinate, accepting `.` or `,` as decimal separator.
/// Missing, non-numeric, non-finite or out-of-range values are hard errors.
fn coordinate(
    value: &Option<String>,
    field: &'static str,
    label: &str,
    min: f64,
    max: f64,
) -> Result<f64, RowIssue> {
    let s = trimmed(value)
        .ok_or_else(|| RowIssue::new(field, format!("Falta la {}", label.to_lowercase()), None))?;
    let parsed = s
        .parse::<f64>()
        .or_else(|_| s.replace(',', ".").parse::<f64>());
    let v = match parsed {
        Ok(v) if v.is_finite() => v,
        _ => {
            return Err(RowIssue::new(
                field,
                format!("{} no numérica: \"{}\"", label, s),
                Some(s.to_string()),
            ));
        }
    };
    if !(min..=max).contains(&v) {
        return Err(RowIssue::new(
            field,
            format!("{} fuera de rango [{}, {}]: {}", label, min, max, s),
            Some(s.to_string()),
        ));
    }
    Ok(v)
}

fn lookup_or_fallback(
    value: &Option<String>,
    field: &'static str,
    label_unknown: &str,
    label_blank: &str,
    table: &crate::types::catalog::LookupTable,
    warnings: &mut Vec<RowIssue>,
) -> Uuid {
    match trimmed(value) {
        Some(name) => match table.resolve(name) {
            Some(id) => id,
            None => {
                warnings.push(RowIssue::new(
                    field,
                    format!(
                        "{} \"{}\", se usará \"{}\"",
                        label_unknown,
                        name,
                        table.fallback_name()
                    ),
                    Some(name.to_string()),
                ));
                table.fallback_id()
            }
        },
        None => {
            warnings.push(RowIssue::new(
                field,
                format!("{}, se usará \"{}\"", label_blank, table.fallback_name()),
                None,
            ));
            table.fallback_id()
        }
    }
}

/// Report import schema
#[derive(Debug, Clone, Copy)]
pub struct ReportImport;

impl ImportSchema for ReportImport {
    type Raw = ReportRawRow;
    type Record = ReportRecord;
    type Context = Catalog;

    fn kind() -> &'static str {
        "report"
    }

    fn headers() -> &'static [&'static str] {
        &[
            "nombre",
            "descripcion",
            "categoria",
            "estado",
            "latitud",
            "longitud",
            "direccion",
            "referencia_direccion",
            "priority",
        ]
    }

    fn template_rows() -> Vec<ReportRawRow> {
        vec![
            ReportRawRow {
                nombre: Some("Bache en la calzada".into()),
                descripcion: Some("Bache profundo frente al mercado municipal".into()),
                categoria: Some("Baches".into()),
                estado: Some("Nuevo".into()),
                latitud: Some("19.432608".into()),
                longitud: Some("-99.133209".into()),
                direccion: Some("Av. Juárez 120, Centro".into()),
                referencia_direccion: Some("Frente al mercado".into()),
                priority: Some("alta".into()),
            },
            ReportRawRow {
                nombre: Some("Luminaria apagada".into()),
                descripcion: Some("Poste sin luz desde hace una semana".into()),
                categoria: Some("Alumbrado".into()),
                estado: Some("Nuevo".into()),
                latitud: Some("19.427025".into()),
                longitud: Some("-99.167665".into()),
                direccion: Some("Calle Morelos 45".into()),
                referencia_direccion: None,
                priority: Some("media".into()),
            },
        ]
    }

    fn validate(raw: &ReportRawRow, ctx: &Catalog) -> RowOutcome<ReportRecord> {
        let mut warnings = Vec::new();

        let name = text_or_default(
            &raw.nombre,
            "nombre",
            defaults::DEFAULT_REPORT_NAME,
            &mut warnings,
        );
        let description = text_or_default(
            &raw.descripcion,
            "descripcion",
            defaults::DEFAULT_REPORT_DESCRIPTION,
            &mut warnings,
        );
        let category_id = lookup_or_fallback(
            &raw.categoria,
            "categoria",
            "Categoría desconocida",
            "Categoría vacía",
            &ctx.categories,
            &mut warnings,
        );
        let state_id = lookup_or_fallback(
            &raw.estado,
            "estado",
            "Estado desconocido",
            "Estado vacío",
            &ctx.states,
            &mut warnings,
        );

        let latitude = match coordinate(&raw.latitud, "latitud", "Latitud", -90.0, 90.0) {
            Ok(v) => v,
            Err(error) => return RowOutcome::Invalid { error, warnings },
        };
        let longitude = match coordinate(&raw.longitud, "longitud", "Longitud", -180.0, 180.0) {
            Ok(v) => v,
            Err(error) => return RowOutcome::Invalid { error, warnings },
        };

        let address = text_or_default(
            &raw.direccion,
            "direccion",
            defaults::DEFAULT_REPORT_ADDRESS,
            &mut warnings,
        );
        let address_reference = text_or_default(
            &raw.referencia_direccion,
            "referencia_direccion",
            defaults::DEFAULT_REPORT_ADDRESS_REFERENCE,
            &mut warnings,
        );

        let priority = match trimmed(&raw.priority) {
            Some(s) => match parse_priority(s) {
                Some(p) => p,
                None => {
                    warnings.push(RowIssue::new(
                        "priority",
                        format!("Prioridad no reconocida \"{}\", se usará \"media\"", s),
                        Some(s.to_string()),
                    ));
                    Priority::Medium
                }
            },
            None => {
                warnings.push(RowIssue::new(
                    "priority",
                    "Prioridad vacía, se usará \"media\"",
                    None,
                ));
                Priority::Medium
            }
        };

        RowOutcome::Valid {
            record: ReportRecord {
                name,
                description,
                category_id,
                state_id,
                latitude,
                longitude,
                address,
                address_reference,
                priority,
            },
            warnings,
        }
    }

    fn search_text(raw: &ReportRawRow) -> Vec<&str> {
        [
            &raw.nombre,
            &raw.descripcion,
            &raw.categoria,
            &raw.estado,
            &raw.latitud,
            &raw.longitud,
            &raw.direccion,
            &raw.referencia_direccion,
            &raw.priority,
        ]
        .into_iter()
        .filter_map(|f| f.as_deref())
        .collect()
    }

    fn export_fields(raw: &ReportRawRow) -> Vec<String> {
        [
            &raw.nombre,
            &raw.descripcion,
            &raw.categoria,
            &raw.estado,
            &raw.latitud,
            &raw.longitud,
            &raw.direccion,
            &raw.referencia_direccion,
            &raw.priority,
        ]
        .into_iter()
        .map(|f| f.clone().unwrap_or_default())
        .collect()
    }
}
