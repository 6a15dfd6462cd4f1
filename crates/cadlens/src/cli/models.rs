//! The `cadlens models` command for browsing the model catalogue.

use cadlens_core::{Capability, Config, ModelDescriptor};
use clap::{Args, Subcommand};

/// Arguments for the `models` command.
#[derive(Args, Debug)]
pub struct ModelsArgs {
    #[command(subcommand)]
    pub command: ModelsCommand,
}

/// Subcommands for the model catalogue.
#[derive(Subcommand, Debug)]
pub enum ModelsCommand {
    /// List every catalogued model (built-in plus config `[[models]]`)
    List {
        /// Print the catalogue as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show one model's details
    Show {
        /// Model id, e.g. "gemini-2.5-flash"
        id: String,
    },
}

/// Execute the models command.
pub fn execute(args: ModelsArgs, config: &Config) -> anyhow::Result<()> {
    let registry = config.registry();

    match args.command {
        ModelsCommand::List { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(registry.models())?);
                return Ok(());
            }
            println!(
                "  {:<38} {:<26} {:<11} {:<5} CAPABILITIES",
                "ID", "NAME", "PROVIDER", "FREE"
            );
            for model in registry.models() {
                let marker = if model.id == config.analysis.default_model {
                    '*'
                } else {
                    ' '
                };
                println!("{marker} {}", list_row(model));
            }
            println!("\n* default model");
        }

        ModelsCommand::Show { id } => {
            let Some(model) = registry.describe(&id) else {
                anyhow::bail!(
                    "Unknown model '{id}'. Run `cadlens models list` to see available models."
                );
            };
            print!("{}", details(model));
        }
    }

    Ok(())
}

fn capability_list(model: &ModelDescriptor) -> String {
    model
        .capabilities
        .iter()
        .map(|c| match c {
            Capability::Vision => "vision",
            Capability::Fast => "fast",
            Capability::Reasoning => "reasoning",
            Capability::Advanced => "advanced",
            Capability::Technical => "technical",
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn list_row(model: &ModelDescriptor) -> String {
    format!(
        "{:<38} {:<26} {:<11} {:<5} {}",
        model.id,
        model.name,
        model.provider,
        if model.free { "yes" } else { "no" },
        capability_list(model)
    )
}

fn details(model: &ModelDescriptor) -> String {
    let mut out = format!(
        "ID:           {}\nName:         {}\nProvider:     {}\nCapabilities: {}\nFree tier:    {}\nContext:      {}\n",
        model.id,
        model.name,
        model.provider,
        capability_list(model),
        if model.free { "yes" } else { "no" },
        model.context,
    );
    if let Some(notes) = &model.notes {
        out.push_str(&format!("Notes:        {notes}\n"));
    }
    if !model.has_capability(Capability::Vision) {
        out.push_str("\nNo vision capability: passes run on text prompts only.\n");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use cadlens_core::ModelRegistry;

    #[test]
    fn test_capability_list_in_declared_order() {
        let registry = ModelRegistry::builtin();
        let model = registry.describe("gemini-2.5-pro").unwrap();
        assert_eq!(capability_list(model), "vision, reasoning, advanced");
    }

    #[test]
    fn test_list_row_contains_fields() {
        let registry = ModelRegistry::builtin();
        let row = list_row(registry.describe("xiaomi/mimo-v2-flash:free").unwrap());
        assert!(row.starts_with("xiaomi/mimo-v2-flash:free"));
        assert!(row.contains("openrouter"));
        assert!(row.contains("yes"));
    }

    #[test]
    fn test_details_flags_text_only_models() {
        let registry = ModelRegistry::builtin();
        let text_only = details(registry.describe("deepseek/deepseek-r1").unwrap());
        assert!(text_only.contains("Notes:        Excellent reasoning"));
        assert!(text_only.contains("No vision capability"));

        let vision = details(registry.describe("gemini-2.5-flash").unwrap());
        assert!(!vision.contains("No vision capability"));
        assert!(!vision.contains("Notes:"));
    }
}
