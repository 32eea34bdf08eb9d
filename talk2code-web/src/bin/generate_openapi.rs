//! Generate the OpenAPI document
//!
//! Writes `openapi.json` and a compact variant into `talk2code-web/docs`, or the
//! directory given as the first argument.

use std::fs;
use std::path::PathBuf;
use talk2code_web::openapi::{openapi_json, ApiDoc};
use utoipa::OpenApi;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let docs_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("talk2code-web/docs"));
    fs::create_dir_all(&docs_dir)?;

    let json_path = docs_dir.join("openapi.json");
    fs::write(&json_path, openapi_json()?)?;
    println!("Generated: {}", json_path.display());

    let compact_path = docs_dir.join("openapi.compact.json");
    fs::write(&compact_path, serde_json::to_string(&ApiDoc::openapi())?)?;
    println!("Generated: {}", compact_path.display());

    Ok(())
}
