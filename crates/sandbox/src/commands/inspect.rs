//! List the contents of a content directory.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use serde_json::json;

use super::{OutputFormat, load_content};

/// List tags, attributes, profiles, effects and abilities
#[derive(Parser)]
pub struct Inspect {
    /// Content directory (defaults to the bundled sample content)
    #[arg(short, long, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "summary")]
    format: OutputFormat,
}

impl Inspect {
    pub fn execute(self) -> Result<()> {
        let db = load_content(self.data_dir)?;
        let registry = db.registry();

        let tags: Vec<&str> = registry
            .entries()
            .iter()
            .filter(|entry| entry.explicit)
            .map(|entry| entry.path.as_str())
            .collect();
        let attributes: Vec<&str> = db.attributes().map(|def| def.id()).collect();
        let profiles: Vec<&str> = db.profile_names().collect();
        let effects: Vec<&str> = db.effect_names().collect();
        let abilities: Vec<&str> = db.ability_names().collect();

        match self.format {
            OutputFormat::Json => {
                let value = json!({
                    "tags": tags,
                    "attributes": attributes,
                    "profiles": profiles,
                    "effects": effects,
                    "abilities": abilities,
                });
                println!("{}", serde_json::to_string_pretty(&value)?);
            }
            OutputFormat::Summary => {
                println!("Tags ({}):", tags.len());
                for path in &tags {
                    println!("  {path}");
                }
                println!("Attributes: {}", attributes.join(", "));
                println!("Profiles:   {}", profiles.join(", "));
                println!("Effects:    {}", effects.join(", "));
                println!("Abilities:  {}", abilities.join(", "));
                for (ability, behavior) in db.custom_behaviors() {
                    println!("  {ability} uses custom behavior '{behavior}'");
                }
            }
        }

        Ok(())
    }
}
