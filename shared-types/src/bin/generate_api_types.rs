use shared_types::*;
use std::fs;
use std::path::Path;
use ts_rs::TS;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Generate TypeScript definitions for API types
    let mut types = Vec::new();

    // Form types
    types.push(clean_type(ContactRecord::export_to_string()?));
    types.push(clean_type(FormField::export_to_string()?));
    types.push(clean_type(FormState::export_to_string()?));
    types.push(clean_type(FormSnapshot::export_to_string()?));
    types.push(clean_type(UpdateFieldRequest::export_to_string()?));
    types.push(clean_type(UpdatePhotoRequest::export_to_string()?));

    // Lookup types
    types.push(clean_type(AddressResult::export_to_string()?));

    // Action types
    types.push(clean_type(NoticeLevel::export_to_string()?));
    types.push(clean_type(Notice::export_to_string()?));
    types.push(clean_type(ExportReceipt::export_to_string()?));
    types.push(clean_type(ActionResponse::export_to_string()?));

    // Network types
    types.push(clean_type(NetworkStatus::export_to_string()?));
    types.push(clean_type(FeatureAvailability::export_to_string()?));

    let output_dir = Path::new("../gui/src/api-types");
    fs::create_dir_all(output_dir)?;

    let output_path = output_dir.join("types.ts");
    let output = types.join("\n\n");

    fs::write(&output_path, output)?;
    println!("Generated TypeScript types in {}", output_path.display());

    Ok(())
}

fn clean_type(mut type_def: String) -> String {
    type_def.retain(|c| c != '\r');

    // Every type lands in the same file, so cross-type imports are dropped
    let filtered: Vec<&str> = type_def
        .lines()
        .filter(|line| {
            let trimmed = line.trim();
            !trimmed.starts_with("import type")
                && !trimmed.starts_with("// This file was generated")
                && !trimmed.starts_with("/* This file was generated")
        })
        .collect();

    let result = filtered.join("\n").trim().to_string();
    if result.is_empty() {
        result
    } else {
        format!("{}\n", result)
    }
}
