use crate::api_client;
use common::ExportRequest;
use js_sys::{Array, Uint8Array};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Blob, BlobPropertyBag, HtmlAnchorElement, Url};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportKind {
    Csv,
    Excel,
}

impl ExportKind {
    fn endpoint(self) -> &'static str {
        match self {
            ExportKind::Csv => "/export/csv",
            ExportKind::Excel => "/export/excel",
        }
    }

    fn file_name(self) -> &'static str {
        match self {
            ExportKind::Csv => "export.csv",
            ExportKind::Excel => "export.xlsx",
        }
    }

    fn mime_type(self) -> &'static str {
        match self {
            ExportKind::Csv => "text/csv",
            ExportKind::Excel => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ExportKind::Csv => "CSV",
            ExportKind::Excel => "Excel",
        }
    }
}

fn js_error(value: JsValue) -> String {
    value.as_string().unwrap_or_else(|| format!("{:?}", value))
}

/// Runs `sql` through the export route and hands the file to the browser.
pub async fn download_export(kind: ExportKind, sql: &str) -> Result<(), String> {
    log::debug!("Exporting {:?} for query: {}", kind, sql);
    let request = ExportRequest { sql: sql.to_string() };
    let response = api_client::post_raw(kind.endpoint(), &request).await?;
    let bytes = response
        .binary()
        .await
        .map_err(|e| format!("Failed to read export: {}", e))?;

    let parts = Array::new();
    parts.push(&Uint8Array::from(bytes.as_slice()));
    let options = BlobPropertyBag::new();
    options.set_type(kind.mime_type());
    let blob = Blob::new_with_u8_array_sequence_and_options(&parts, &options).map_err(js_error)?;
    let url = Url::create_object_url_with_blob(&blob).map_err(js_error)?;

    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| "No document available".to_string())?;
    let anchor: HtmlAnchorElement = document
        .create_element("a")
        .map_err(js_error)?
        .unchecked_into();
    anchor.set_href(&url);
    anchor.set_download(kind.file_name());
    anchor.click();
    Url::revoke_object_url(&url).map_err(js_error)?;

    log::info!("Exported {} bytes as {}", bytes.len(), kind.file_name());
    Ok(())
}
