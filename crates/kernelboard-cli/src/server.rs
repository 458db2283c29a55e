//! HTTP front end: one request at a time over `tiny_http`.

use crate::config::ServeConfig;
use crate::error::CliError;
use crate::page;
use crate::state::AppState;
use kernelboard_charts::{render_dashboard, ChartKind};
use kernelboard_core::filter::parse_query;
use kernelboard_core::{apply, FilterSelection};
use kernelboard_report::{download_name, write_coverage_report, write_csv, ReportExporter, COVERAGE_TITLE};
use std::collections::BTreeSet;
use tiny_http::{Header, Method, Response, Server};

/// A response before it is handed to `tiny_http`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Reply {
    pub(crate) status: u16,
    pub(crate) content_type: &'static str,
    pub(crate) body: Vec<u8>,
    pub(crate) headers: Vec<(&'static str, String)>,
}

impl Reply {
    fn ok(content_type: &'static str, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status: 200,
            content_type,
            body: body.into(),
            headers: Vec::new(),
        }
    }

    fn html(body: String) -> Self {
        Self::ok("text/html; charset=utf-8", body)
    }

    fn text(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            ..Self::ok("text/plain; charset=utf-8", message.into())
        }
    }

    fn attachment(mut self, filename: &str) -> Self {
        self.headers.push((
            "Content-Disposition",
            format!("attachment; filename=\"{filename}\""),
        ));
        self
    }

    fn redirect(location: String) -> Self {
        Self {
            status: 303,
            headers: vec![("Location", location)],
            ..Self::ok("text/plain; charset=utf-8", Vec::new())
        }
    }

    fn into_response(self) -> Response<std::io::Cursor<Vec<u8>>> {
        let mut response = Response::from_data(self.body).with_status_code(self.status);
        let headers = std::iter::once(("Content-Type", self.content_type.to_string()))
            .chain(self.headers);
        for (name, value) in headers {
            match Header::from_bytes(name.as_bytes(), value.as_bytes()) {
                Ok(header) => response.add_header(header),
                Err(()) => log::warn!("dropping invalid header {name}"),
            }
        }
        response
    }
}

/// Bind and serve until the process is stopped.
pub(crate) fn serve(config: &ServeConfig, mut state: AppState) -> Result<(), CliError> {
    let addr = config.addr();
    let server = Server::http(&addr).map_err(|e| CliError::Server {
        addr: addr.clone(),
        message: e.to_string(),
    })?;
    log::info!("serving {} on http://{addr}", state.default_file());
    println!("Kernelboard running at http://{addr}");
    println!("Press Ctrl+C to stop");

    for request in server.incoming_requests() {
        let reply = if *request.method() == Method::Get {
            route(&mut state, request.url())
        } else {
            Reply::text(405, "405 Method Not Allowed")
        };
        log::debug!("{} {} -> {}", request.method(), request.url(), reply.status);
        if let Err(e) = request.respond(reply.into_response()) {
            log::warn!("failed to send response: {e}");
        }
    }
    Ok(())
}

/// Dispatch a GET request for `url` (path plus optional query).
///
/// The plan file comes from the request's `file` parameter, so sessions
/// never change each other's view.
pub(crate) fn route(state: &mut AppState, url: &str) -> Reply {
    let (path, query) = url.split_once('?').unwrap_or((url, ""));
    let params = parse_query(query);
    let file = state.resolve(param(&params, "file"));
    let selection = FilterSelection::from_query(query);

    match path {
        "/" | "/index.html" => {
            let loaded = state.table(&file);
            Reply::html(page::dashboard(
                state.title(),
                state.catalog().files(),
                &file,
                &selection,
                &loaded,
            ))
        }
        "/export.csv" => match state.table(&file) {
            Ok(table) => {
                let filtered = apply(&table, &selection);
                let mut body = Vec::new();
                match write_csv(&filtered, &mut body) {
                    Ok(()) => Reply::ok("text/csv; charset=utf-8", body)
                        .attachment(&download_name("filtered_data", &selection, "csv")),
                    Err(e) => Reply::text(500, format!("CSV export failed: {e}")),
                }
            }
            Err(message) => Reply::text(500, message),
        },
        "/report.html" => match state.table(&file) {
            Ok(table) => {
                let filtered = apply(&table, &selection);
                let charts = render_dashboard(&filtered);
                let mut body = Vec::new();
                let exporter = ReportExporter::new(state.title())
                    .with_selection(selection.clone())
                    .with_domain(&table);
                match exporter.export(&filtered, &charts, &mut body) {
                    Ok(()) => Reply::ok("text/html; charset=utf-8", body)
                        .attachment(&download_name("report", &selection, "html")),
                    Err(e) => {
                        log::error!("report export failed: {e}");
                        Reply::text(500, format!("Report export failed: {e}"))
                    }
                }
            }
            Err(message) => Reply::text(500, message),
        },
        "/coverage" | "/coverage/report.html" => {
            let devices = values(&params, "device");
            let tests = values(&params, "test");
            let search = param(&params, "q").unwrap_or("");
            let coverage = state.coverage();
            if path == "/coverage" {
                return Reply::html(page::coverage(
                    state.title(),
                    &file,
                    &coverage,
                    &devices,
                    &tests,
                    search,
                ));
            }
            let shown = coverage.restrict(&devices, &tests).search(search);
            let mut body = Vec::new();
            match write_coverage_report(&shown, COVERAGE_TITLE, &mut body) {
                Ok(()) => Reply::ok("text/html; charset=utf-8", body)
                    .attachment("device_test_analysis.html"),
                Err(e) => Reply::text(500, format!("Coverage export failed: {e}")),
            }
        }
        "/files" => {
            let search = param(&params, "q").unwrap_or("");
            let summaries = state.summaries();
            Reply::html(page::files(state.title(), &file, &summaries, search))
        }
        "/reload" => {
            if let Err(message) = state.reload(&file) {
                log::warn!("reload failed: {message}");
            }
            Reply::redirect(format!("/?{}", page::query(&file, &selection)))
        }
        _ => chart(state, path, &file, &selection),
    }
}

/// `/charts/<id>.svg`, or 404.
fn chart(state: &mut AppState, path: &str, file: &str, selection: &FilterSelection) -> Reply {
    let Some(kind) = path
        .strip_prefix("/charts/")
        .and_then(|rest| rest.strip_suffix(".svg"))
        .and_then(|id| id.parse::<ChartKind>().ok())
    else {
        return Reply::text(404, "404 Not Found");
    };
    match state.table(file) {
        Ok(table) => {
            let image = kind.render(&apply(&table, selection));
            Reply::ok("image/svg+xml", image.svg)
        }
        Err(message) => Reply::text(500, message),
    }
}

fn param<'a>(params: &'a [(String, String)], key: &str) -> Option<&'a str> {
    params
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
}

fn values(params: &[(String, String)], key: &str) -> BTreeSet<String> {
    params
        .iter()
        .filter(|(k, v)| k == key && !v.is_empty())
        .map(|(_, v)| v.clone())
        .collect()
}
