//! Print the OpenAPI document as JSON.

use std::io::{self, Write};

use library_backend::ApiDoc;
use utoipa::OpenApi;

fn main() -> io::Result<()> {
    let json = ApiDoc::openapi()
        .to_pretty_json()
        .map_err(|error| io::Error::other(format!("serialise OpenAPI document: {error}")))?;
    writeln!(io::stdout().lock(), "{json}")
}
