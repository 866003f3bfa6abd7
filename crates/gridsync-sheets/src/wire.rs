//! Subset of the Sheets v4 JSON surface the transport reads and writes.

use gridsync_common::{NumberFormatType, RawCell, RawGrid, Scalar};
use gridsync_core::{SheetInfo, WriteGrid};
use serde::{Deserialize, Serialize};

/// `fields` mask for grid reads.
pub const GRID_FIELDS: &str = "sheets(properties(title,hidden),data(rowData(values(effectiveValue,formattedValue,effectiveFormat.numberFormat.type))))";
/// `fields` mask for the sheet list.
pub const SHEET_LIST_FIELDS: &str = "sheets.properties(title,hidden)";

#[derive(Debug, Default, Deserialize)]
pub struct Spreadsheet {
    #[serde(default)]
    pub sheets: Vec<Sheet>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Sheet {
    #[serde(default)]
    pub properties: SheetProperties,
    #[serde(default)]
    pub data: Vec<GridData>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SheetProperties {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub hidden: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridData {
    #[serde(default)]
    pub row_data: Vec<RowData>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RowData {
    #[serde(default)]
    pub values: Vec<CellData>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CellData {
    pub effective_value: Option<ExtendedValue>,
    pub formatted_value: Option<String>,
    pub effective_format: Option<CellFormat>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtendedValue {
    pub string_value: Option<String>,
    pub number_value: Option<f64>,
    pub bool_value: Option<bool>,
    pub error_value: Option<ErrorValue>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ErrorValue {
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CellFormat {
    pub number_format: Option<NumberFormat>,
}

#[derive(Debug, Default, Deserialize)]
pub struct NumberFormat {
    #[serde(rename = "type", default)]
    pub kind: String,
}

impl ExtendedValue {
    fn into_scalar(self) -> Option<Scalar> {
        if let Some(n) = self.number_value {
            return Some(Scalar::Number(n));
        }
        if let Some(b) = self.bool_value {
            return Some(Scalar::Boolean(b));
        }
        if let Some(s) = self.string_value {
            return Some(Scalar::Text(s));
        }
        self.error_value.map(|e| Scalar::Text(e.message))
    }
}

impl CellData {
    pub fn into_raw(self) -> RawCell {
        let number_format = self
            .effective_format
            .and_then(|f| f.number_format)
            .map_or(NumberFormatType::None, |n| NumberFormatType::from_api_name(&n.kind));
        RawCell {
            effective: self.effective_value.and_then(ExtendedValue::into_scalar),
            formatted: self.formatted_value.unwrap_or_default(),
            number_format,
        }
    }
}

impl Spreadsheet {
    /// Grid of the first sheet's first data block.
    pub fn into_grid(self) -> RawGrid {
        self.sheets
            .into_iter()
            .next()
            .and_then(|sheet| sheet.data.into_iter().next())
            .map(|data| {
                data.row_data
                    .into_iter()
                    .map(|row| row.values.into_iter().map(CellData::into_raw).collect())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn sheet_list(self) -> Vec<SheetInfo> {
        self.sheets
            .into_iter()
            .map(|s| SheetInfo {
                title: s.properties.title,
                hidden: s.properties.hidden,
            })
            .collect()
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueRange<'a> {
    pub range: &'a str,
    pub major_dimension: &'static str,
    pub values: &'a WriteGrid,
}

/// `UpdateValuesResponse` with `includeValuesInResponse=true`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateValuesResponse {
    #[serde(default)]
    pub updated_data: Option<EchoedRange>,
}

#[derive(Debug, Default, Deserialize)]
pub struct EchoedRange {
    #[serde(default)]
    pub values: Vec<Vec<serde_json::Value>>,
}

impl UpdateValuesResponse {
    pub fn into_grid(self) -> RawGrid {
        let rows = self.updated_data.map(|d| d.values).unwrap_or_default();
        rows.into_iter()
            .map(|row| row.into_iter().map(echoed_cell).collect())
            .collect()
    }
}

fn echoed_cell(value: serde_json::Value) -> RawCell {
    match value {
        serde_json::Value::Bool(b) => RawCell::from(b),
        serde_json::Value::Number(n) => n.as_f64().map_or_else(RawCell::empty, RawCell::from),
        serde_json::Value::String(s) => RawCell::from(s.as_str()),
        _ => RawCell::empty(),
    }
}

#[derive(Debug, Serialize)]
pub struct BatchUpdate<'a> {
    pub requests: Vec<BatchRequest<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchRequest<'a> {
    pub add_sheet: AddSheet<'a>,
}

#[derive(Debug, Serialize)]
pub struct AddSheet<'a> {
    pub properties: NewSheetProperties<'a>,
}

#[derive(Debug, Serialize)]
pub struct NewSheetProperties<'a> {
    pub title: &'a str,
}

impl<'a> BatchUpdate<'a> {
    pub fn add_sheet(title: &'a str) -> Self {
        Self {
            requests: vec![BatchRequest {
                add_sheet: AddSheet {
                    properties: NewSheetProperties { title },
                },
            }],
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub error: ErrorDetail,
}

#[derive(Debug, Default, Deserialize)]
pub struct ErrorDetail {
    #[serde(default)]
    pub message: String,
}
