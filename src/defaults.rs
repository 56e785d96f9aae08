//! Documented default values substituted by the validator

pub const DEFAULT_STATE_COLOR: &str = "#3B82F6";
pub const DEFAULT_STATE_ICON: &str = "map-pin";
pub const DEFAULT_STATE_NAME: &str = "Nuevo estado";
pub const DEFAULT_STATE_DESCRIPTION: &str = "";

pub const DEFAULT_REPORT_NAME: &str = "Reporte sin título";
pub const DEFAULT_REPORT_DESCRIPTION: &str = "";
pub const DEFAULT_REPORT_ADDRESS: &str = "";
pub const DEFAULT_REPORT_ADDRESS_REFERENCE: &str = "";
