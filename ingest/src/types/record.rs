/// One flattened spreadsheet row.
///
/// Produced once per data row by the source and consumed exactly once by the
/// row synchronizer. The fields mirror the source columns; the three natural
/// keys are `group_name`, `(location_name, group)` and `email`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputRecord {
    pub group_name: String,
    pub group_description: String,
    pub location_name: String,
    pub location_address: String,
    pub city: String,
    pub country: String,
    pub user_name: String,
    pub email: String,
    pub phone_number: String,
}
