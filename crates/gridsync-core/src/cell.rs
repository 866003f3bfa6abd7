use gridsync_common::{RawCell, Scalar, Value};

/// Decode one raw cell into a typed value.
///
/// One rule per declared number format: date kinds turn a numeric serial
/// into a date, time, or date-time; everything else is the stored scalar.
pub fn decode_cell(cell: &RawCell, render_formatted: bool) -> Value {
    let Some(effective) = &cell.effective else {
        return Value::Empty;
    };
    if render_formatted {
        return Value::Text(cell.formatted.clone());
    }
    match effective {
        Scalar::Number(serial) if cell.number_format.is_temporal() => {
            Value::from_serial(*serial, cell.number_format).unwrap_or(Value::Number(*serial))
        }
        scalar => Value::from(scalar.clone()),
    }
}
