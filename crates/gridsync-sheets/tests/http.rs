use gridsync_core::{
    Collection, Orientation, ReadOutcome, Record, RemoteErrorKind, SheetTarget, SheetTransport,
    SyncError, SyncOptions, SyncSession, Value, WriteCell, WriteRequest, WriteWarning,
};
use gridsync_sheets::{SheetsClient, SheetsClientConfig};
use httpmock::prelude::*;
use serde_json::json;

const ID: &str = "sheet123";

fn client(server: &MockServer, token: Option<&str>) -> SheetsClient {
    let mut config = SheetsClientConfig::default()
        .with_api_key("key")
        .with_base_url(format!("{}/v4/spreadsheets/", server.base_url()));
    if let Some(token) = token {
        config = config.with_access_token(token);
    }
    SheetsClient::new(config).unwrap()
}

fn people_body() -> serde_json::Value {
    json!({
        "sheets": [{
            "properties": {"title": "Data"},
            "data": [{"rowData": [
                {"values": [
                    {"effectiveValue": {"stringValue": "name"}, "formattedValue": "name"},
                    {"effectiveValue": {"stringValue": "born"}, "formattedValue": "born"}
                ]},
                {"values": [
                    {"effectiveValue": {"stringValue": "Al"}, "formattedValue": "Al"},
                    {
                        "effectiveValue": {"numberValue": 44000},
                        "formattedValue": "6/18/2020",
                        "effectiveFormat": {"numberFormat": {"type": "DATE"}}
                    }
                ]}
            ]}]
        }]
    })
}

#[test]
fn read_resolves_first_visible_sheet_and_decodes_dates() {
    let server = MockServer::start();
    let list = server.mock(|when, then| {
        when.method(GET)
            .path("/v4/spreadsheets/sheet123")
            .query_param("fields", "sheets.properties(title,hidden)")
            .query_param("key", "key");
        then.status(200).json_body(json!({
            "sheets": [
                {"properties": {"title": "Hidden", "hidden": true}},
                {"properties": {"title": "Data"}}
            ]
        }));
    });
    let grid = server.mock(|when, then| {
        when.method(GET)
            .path("/v4/spreadsheets/sheet123")
            .query_param("ranges", "'Data'")
            .query_param("includeGridData", "true");
        then.status(200).json_body(people_body());
    });

    let mut session = SyncSession::new(
        client(&server, None),
        SheetTarget::new(ID),
        SyncOptions::default(),
    );
    let ReadOutcome::Loaded(decoded) = session.read().unwrap() else {
        panic!("expected data");
    };
    list.assert();
    grid.assert();

    let record = &decoded.collection.as_records().unwrap()[0];
    assert_eq!(
        record.get("born"),
        Some(&Value::Date(chrono::NaiveDate::from_ymd_opt(2020, 6, 18).unwrap()))
    );
}

#[test]
fn forbidden_read_is_retried_with_token() {
    let server = MockServer::start();
    let anonymous = server.mock(|when, then| {
        when.method(GET)
            .path("/v4/spreadsheets/sheet123")
            .header_missing("authorization");
        then.status(403)
            .json_body(json!({"error": {"code": 403, "message": "The caller does not have permission"}}));
    });
    let authorized = server.mock(|when, then| {
        when.method(GET)
            .path("/v4/spreadsheets/sheet123")
            .header("authorization", "Bearer tok");
        then.status(200).json_body(people_body());
    });

    let mut transport = client(&server, Some("tok"));
    let target = SheetTarget::new(ID).with_sheet("Data").resolve(None);
    let grid = transport.fetch_grid(&target).unwrap();
    anonymous.assert();
    authorized.assert();
    assert_eq!(grid.len(), 2);
}

#[test]
fn error_message_is_taken_from_the_body() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/v4/spreadsheets/sheet123");
        then.status(404)
            .json_body(json!({"error": {"code": 404, "message": "Requested entity was not found."}}));
    });

    let mut session = SyncSession::new(
        client(&server, None),
        SheetTarget::new(ID).with_sheet("Data"),
        SyncOptions::default(),
    );
    match session.read() {
        Err(SyncError::Remote(err)) => {
            assert_eq!(err.kind, RemoteErrorKind::NotFound);
            assert_eq!(err.status, 404);
            assert_eq!(err.message, "Requested entity was not found.");
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn write_puts_values_with_user_entered_input() {
    let server = MockServer::start();
    let put = server.mock(|when, then| {
        when.method(PUT)
            .path("/v4/spreadsheets/sheet123/values/'Data'")
            .query_param("valueInputOption", "USER_ENTERED")
            .query_param("includeValuesInResponse", "true")
            .query_param("responseValueRenderOption", "UNFORMATTED_VALUE")
            .header("authorization", "Bearer tok")
            .json_body(json!({
                "range": "'Data'",
                "majorDimension": "ROWS",
                "values": [[null, "a"], ["", 1.0]]
            }));
        then.status(200).json_body(json!({
            "updatedRange": "'Data'!A1:B2",
            "updatedData": {"range": "'Data'!A1:B2", "values": [["x", "a"], ["", 1]]}
        }));
    });

    let mut transport = client(&server, Some("tok"));
    let target = SheetTarget::new(ID).with_sheet("Data").resolve(None);
    let values = vec![
        vec![WriteCell::Keep, WriteCell::from("a")],
        vec![WriteCell::blank(), WriteCell::from(1.0)],
    ];
    let echo = transport
        .write_grid(&WriteRequest {
            target: &target,
            grid: &values,
            orientation: Orientation::Rows,
            render_formatted: false,
        })
        .unwrap();
    put.assert();
    assert_eq!(echo[0][0].heading_text(), "x");
    assert!(echo[1][0].is_empty());
}

#[test]
fn missing_sheet_is_created_and_write_retried() {
    let server = MockServer::start();
    let read = server.mock(|when, then| {
        when.method(GET)
            .path("/v4/spreadsheets/sheet123")
            .query_param("includeGridData", "true");
        then.status(200)
            .json_body(json!({"sheets": [{"properties": {"title": "Out"}, "data": [{}]}]}));
    });
    let list = server.mock(|when, then| {
        when.method(GET)
            .path("/v4/spreadsheets/sheet123")
            .query_param("fields", "sheets.properties(title,hidden)");
        then.status(200)
            .json_body(json!({"sheets": [{"properties": {"title": "Data"}}]}));
    });
    let put = server.mock(|when, then| {
        when.method(PUT).path("/v4/spreadsheets/sheet123/values/'Out'");
        then.status(400)
            .json_body(json!({"error": {"code": 400, "message": "Unable to parse range: 'Out'"}}));
    });
    let add = server.mock(|when, then| {
        when.method(POST)
            .path("/v4/spreadsheets/sheet123:batchUpdate")
            .json_body(json!({"requests": [{"addSheet": {"properties": {"title": "Out"}}}]}));
        then.status(200).json_body(json!({"replies": [{}]}));
    });

    let mut session = SyncSession::new(
        client(&server, Some("tok")),
        SheetTarget::new(ID).with_sheet("Out"),
        SyncOptions::default(),
    );
    assert_eq!(session.read().unwrap(), ReadOutcome::Empty);
    read.assert();

    let records = Collection::Records(vec![Record::from([("name", "Al"), ("age", "30")])]);
    let result = session.write(&records).unwrap();

    // The mock keeps answering 400, so the single retry fails too.
    assert_eq!(put.hits(), 2);
    list.assert();
    add.assert();
    assert!(!result.accepted);
    assert_eq!(
        result.warnings,
        vec![WriteWarning::SheetCreated {
            title: "Out".into()
        }]
    );
    assert_eq!(result.failure.unwrap().kind, RemoteErrorKind::InvalidRange);
}
