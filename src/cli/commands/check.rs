//! External tool and service availability check command.

use console::style;

use crate::config::Config;
use crate::extract::TextExtractor;
use crate::llm::LlmClient;

/// Check extraction tool and LLM service availability.
pub async fn cmd_check(config: &Config) -> anyhow::Result<()> {
    println!("\n{}", style("Extraction Tools").bold());
    println!("{}", "-".repeat(50));

    for (tool, available) in TextExtractor::check_tools() {
        let status = if available {
            style("✓ found").green()
        } else {
            style("✗ not found").red()
        };
        println!("  {:<15} {}", tool, status);
    }

    println!("\n{}", style("LLM Service").bold());
    println!("{}", "-".repeat(50));

    if !config.llm.enabled {
        println!("  {}", style("disabled in configuration").dim());
        return Ok(());
    }

    let client = LlmClient::new(config.llm.clone());
    if client.is_available().await {
        println!(
            "  {:<15} {} ({})",
            "endpoint",
            style("✓ reachable").green(),
            config.llm.endpoint
        );
        match client.list_models().await {
            Ok(models) => {
                let configured = models.iter().any(|m| m == &config.llm.model);
                let marker = if configured {
                    style("✓").green()
                } else {
                    style("✗ not pulled").red()
                };
                println!("  {:<15} {} ({})", "model", marker, config.llm.model);
                if !models.is_empty() {
                    println!("  {:<15} {}", "available", models.join(", "));
                }
            }
            Err(e) => println!("  {:<15} {}", "models", style(format!("✗ {}", e)).red()),
        }
    } else {
        println!(
            "  {:<15} {} ({})",
            "endpoint",
            style("✗ unreachable").red(),
            config.llm.endpoint
        );
        println!("  {}", style(config.llm.availability_hint()).dim());
    }

    Ok(())
}
