fn main() {
    // Validate embedded TOML files at compile time.
    validate_toml(
        "src/default_settings.toml",
        include_str!("src/default_settings.toml"),
    );
}

fn validate_toml(path: &str, content: &str) {
    let value = match content.parse::<toml::Value>() {
        Ok(v) => v,
        Err(_) => panic!("{path} contains invalid TOML"),
    };
    for section in ["composition", "marking", "candidates", "user_override", "session"] {
        if value.get(section).is_none() {
            panic!("{path} is missing the [{section}] table");
        }
    }
}
