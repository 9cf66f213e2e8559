//! Print the OpenAPI document as JSON.

use utoipa::OpenApi;
use vote_backend::doc::ApiDoc;

#[allow(clippy::print_stdout, reason = "the document is the program's output")]
fn main() -> Result<(), serde_json::Error> {
    println!("{}", ApiDoc::openapi().to_pretty_json()?);
    Ok(())
}
