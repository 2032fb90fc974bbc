//! Builders for input records used across integration tests.

use crate::types::InputRecord;

/// A single well-formed record.
pub fn sample_record() -> InputRecord {
    InputRecord {
        group_name: "A".to_owned(),
        group_description: "d1".to_owned(),
        location_name: "L1".to_owned(),
        location_address: "123 St".to_owned(),
        city: "X".to_owned(),
        country: "Y".to_owned(),
        user_name: "Bob".to_owned(),
        email: "b@x.com".to_owned(),
        phone_number: "555".to_owned(),
    }
}

/// A record with the given natural keys and defaults everywhere else.
pub fn record_with(group_name: &str, location_name: &str, email: &str) -> InputRecord {
    InputRecord {
        group_name: group_name.to_owned(),
        group_description: format!("{group_name} description"),
        location_name: location_name.to_owned(),
        location_address: "1 Main St".to_owned(),
        city: "Springfield".to_owned(),
        country: "US".to_owned(),
        user_name: email.split('@').next().unwrap_or(email).to_owned(),
        email: email.to_owned(),
        phone_number: "555-0100".to_owned(),
    }
}
