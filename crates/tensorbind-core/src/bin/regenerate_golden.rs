use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use tensorbind_core::{DynamicRecord, ModelInferResponse, decode};

fn main() -> ExitCode {
    if let Err(err) = run() {
        eprintln!("error: {}", err);
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn run() -> Result<(), String> {
    let root = PathBuf::from("tests").join("golden");
    let entries =
        fs::read_dir(&root).map_err(|err| format!("failed to read {}: {}", root.display(), err))?;

    for entry in entries {
        let entry = entry.map_err(|err| format!("failed to read entry: {}", err))?;
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        if !path.join("response.json").exists() {
            continue;
        }
        regenerate_one(&path)?;
    }

    Ok(())
}

fn regenerate_one(dir: &Path) -> Result<(), String> {
    let response_path = dir.join("response.json");
    let response_json = fs::read_to_string(&response_path)
        .map_err(|err| format!("failed to read {}: {}", response_path.display(), err))?;
    let response = ModelInferResponse::from_json(&response_json)
        .map_err(|err| format!("invalid response {}: {}", response_path.display(), err))?;

    let fields_path = dir.join("fields.json");
    let fields_json = fs::read_to_string(&fields_path)
        .map_err(|err| format!("failed to read {}: {}", fields_path.display(), err))?;
    let fields: Vec<String> = serde_json::from_str(&fields_json)
        .map_err(|err| format!("invalid fields {}: {}", fields_path.display(), err))?;

    let mut record = DynamicRecord::from_specs(&fields)
        .map_err(|err| format!("invalid fields {}: {}", fields_path.display(), err))?;
    decode(&response, &mut record)
        .map_err(|err| format!("decode failed for {}: {}", dir.display(), err))?;

    let json = serde_json::to_string(&record)
        .map_err(|err| format!("JSON serialization failed: {}", err))?;
    let output = dir.join("expected.json");
    fs::write(&output, json)
        .map_err(|err| format!("failed to write {}: {}", output.display(), err))?;
    Ok(())
}
