//! State and county name cleanup for queue records.

/// Postal abbreviations of the states and DC
const STATE_NAMES: [(&str, &str); 51] = [
    ("AK", "Alaska"),
    ("AL", "Alabama"),
    ("AR", "Arkansas"),
    ("AZ", "Arizona"),
    ("CA", "California"),
    ("CO", "Colorado"),
    ("CT", "Connecticut"),
    ("DC", "District of Columbia"),
    ("DE", "Delaware"),
    ("FL", "Florida"),
    ("GA", "Georgia"),
    ("HI", "Hawaii"),
    ("IA", "Iowa"),
    ("ID", "Idaho"),
    ("IL", "Illinois"),
    ("IN", "Indiana"),
    ("KS", "Kansas"),
    ("KY", "Kentucky"),
    ("LA", "Louisiana"),
    ("MA", "Massachusetts"),
    ("MD", "Maryland"),
    ("ME", "Maine"),
    ("MI", "Michigan"),
    ("MN", "Minnesota"),
    ("MO", "Missouri"),
    ("MS", "Mississippi"),
    ("MT", "Montana"),
    ("NC", "North Carolina"),
    ("ND", "North Dakota"),
    ("NE", "Nebraska"),
    ("NH", "New Hampshire"),
    ("NJ", "New Jersey"),
    ("NM", "New Mexico"),
    ("NV", "Nevada"),
    ("NY", "New York"),
    ("OH", "Ohio"),
    ("OK", "Oklahoma"),
    ("OR", "Oregon"),
    ("PA", "Pennsylvania"),
    ("RI", "Rhode Island"),
    ("SC", "South Carolina"),
    ("SD", "South Dakota"),
    ("TN", "Tennessee"),
    ("TX", "Texas"),
    ("UT", "Utah"),
    ("VA", "Virginia"),
    ("VT", "Vermont"),
    ("WA", "Washington"),
    ("WI", "Wisconsin"),
    ("WV", "West Virginia"),
    ("WY", "Wyoming"),
];

/// Multi-word names as they appear once spaces were squeezed out
const JOINED_NAMES: [(&str, &str); 13] = [
    ("DistrictOfColumbia", "District of Columbia"),
    ("NorthCarolina", "North Carolina"),
    ("NorthDakota", "North Dakota"),
    ("NewHampshire", "New Hampshire"),
    ("NewJersey", "New Jersey"),
    ("NewMexico", "New Mexico"),
    ("NewYork", "New York"),
    ("PuertoRico", "Puerto Rico"),
    ("RhodeIsland", "Rhode Island"),
    ("SouthCarolina", "South Carolina"),
    ("SouthDakota", "South Dakota"),
    ("VirginIslands", "Virgin Islands"),
    ("WestVirginia", "West Virginia"),
];

/// Full state name for an abbreviation (`MA`) or a joined name (`NewYork`).
/// Anything else is returned trimmed but otherwise unchanged.
pub fn expand_state_name(state: &str) -> &str {
    let state = state.trim();
    STATE_NAMES
        .iter()
        .chain(JOINED_NAMES.iter())
        .find(|(short, _)| *short == state)
        .map(|(_, full)| *full)
        .unwrap_or(state)
}

/// Drops punctuation and the word "County" from a county name
pub fn clean_county(county: &str) -> String {
    let stripped: String = county
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace() || *c == '_')
        .collect();
    stripped.replace(" County", "").trim().to_string()
}
