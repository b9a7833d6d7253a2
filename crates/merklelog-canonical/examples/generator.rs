use merklelog_canonical::{hash_event, Canonicalizer};
use serde_json::json;

fn main() {
    let canonicalizer = Canonicalizer::v3();
    let event = json!({
        "identity": "publicassets/3ea5aca3-da02-4bae-b6d0-85a5ab586ed6/events/71d7ab65-359b-40d9-9bbd-102ec2092601",
        "asset_identity": "publicassets/3ea5aca3-da02-4bae-b6d0-85a5ab586ed6",
        "event_attributes": {"arc_display_type": "Model Approval", "approvers": "Product Team"},
        "operation": "Record",
        "behaviour": "RecordEvidence",
        "timestamp_declared": "2024-05-07T20:32:00Z",
        "timestamp_accepted": "2024-05-07T20:32:00Z",
        "timestamp_committed": "2024-05-07T20:32:27.235Z",
        "tenant_identity": "tenant/f023005c-000f-4a57-b2fe-eef425f243ad",
        "merklelog_entry": {"commit": {"index": "499", "idtimestamp": "018f54c1f0640dca00"}}
    });

    match canonicalizer.canonicalize(&event) {
        Ok(result) => {
            println!("{}", String::from_utf8_lossy(&result.bytes));
        }
        Err(err) => {
            eprintln!("canonicalization failed: {}", err);
            std::process::exit(1);
        }
    }

    match hash_event(&event, &canonicalizer) {
        Ok(leaf) => println!("{}", hex::encode(leaf)),
        Err(err) => {
            eprintln!("leaf hash failed: {}", err);
            std::process::exit(1);
        }
    }
}
