//! Completeness command implementation.

use merklelog_verify::verify_list;
use serde_json::json;

use super::read_input;
use crate::config::StorageArgs;

pub fn run(
    storage: &StorageArgs,
    events: Option<String>,
    strict: bool,
    json_output: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let bytes = read_input(events)?;
    let reader = storage.reader()?;
    let omitted = verify_list(&*reader, &bytes, &storage.options()?)?;

    if json_output {
        let indices: Vec<String> = omitted.iter().map(u64::to_string).collect();
        println!("{}", serde_json::to_string(&json!({ "omitted": indices }))?);
    } else if omitted.is_empty() {
        println!("complete: every event verified, no log entries omitted");
    } else {
        println!("OMITTED_MMR_INDEX");
        println!("{}", "-".repeat(20));
        for index in &omitted {
            println!("{}", index);
        }
    }

    if strict && !omitted.is_empty() {
        return Err(format!("event list omits {} log entries", omitted.len()).into());
    }
    Ok(())
}
