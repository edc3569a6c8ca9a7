//! The `eduquest init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    let path = std::path::Path::new("eduquest.toml");
    if path.exists() {
        println!("eduquest.toml already exists, skipping.");
    } else {
        std::fs::write(path, SAMPLE_CONFIG)?;
        println!("Created eduquest.toml");
    }

    println!("\nNext steps:");
    println!("  1. Point [api] base_url at your EduQuest server");
    println!("  2. Run: eduquest admin --file course.txt");
    println!("  3. Run: eduquest student");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# eduquest configuration

# "development" falls back to http://localhost:5000/api when base_url is unset;
# "production" requires base_url.
environment = "development"

session_path = ".eduquest-session.json"
progress_step_ms = 1000
notes_tick_ms = 500

[api]
# base_url = "${EDUQUEST_API_URL}"
timeout_secs = 120
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_config_parses() {
        let config = eduquest_client::config::parse_config(SAMPLE_CONFIG).unwrap();
        assert_eq!(
            config.base_url().unwrap(),
            eduquest_client::config::DEVELOPMENT_BASE_URL
        );
        assert_eq!(config.api.timeout_secs, 120);
    }
}
