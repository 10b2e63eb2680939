use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use company_employees::config::Config;
use company_employees::logger::Logger;
use company_employees::query::EmployeeParameters;
use company_employees::storage::{seed, Storage};
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "company-employees", version, about = "Manage companies and their employees")]
struct Cli {
    /// Configuration file (defaults to ./company_employees.toml, then the user config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Use a throwaway in-memory database seeded with sample data
    #[arg(long, global = true)]
    memory: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create the schema, optionally with sample data
    Init {
        #[arg(long)]
        seed: bool,
    },
    /// List all companies
    Companies,
    /// List one page of a company's employees
    Employees {
        company_id: Uuid,
        #[arg(long)]
        min_age: Option<u32>,
        #[arg(long)]
        max_age: Option<u32>,
        #[arg(long)]
        search: Option<String>,
        /// Comma separated fields, each optionally followed by `desc`
        #[arg(long)]
        order_by: Option<String>,
        #[arg(long, default_value_t = 1)]
        page: u64,
        #[arg(long)]
        page_size: Option<u64>,
    },
    /// Delete a company and its employees
    DeleteCompany { company_id: Uuid },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_from_file(path)?,
        None => Config::load()?,
    };
    Logger::from_config(&config.logging)?.install()?;

    let storage = if cli.memory {
        let storage = Storage::in_memory().await?;
        seed::seed_sample_data(&storage.unit_of_work()).await?;
        storage
    } else {
        Storage::connect(&config.database).await?
    };

    match cli.command {
        Command::Init { seed: with_sample_data } => {
            if with_sample_data && !storage.has_data().await? {
                let written = seed::seed_sample_data(&storage.unit_of_work()).await?;
                println!("Seeded {} row(s)", written);
            }
            println!("Database ready");
        }
        Command::Companies => {
            let manager = storage.unit_of_work();
            let companies = manager.company().get_all(false).await?;
            println!("{}", serde_json::to_string_pretty(&companies)?);
        }
        Command::Employees {
            company_id,
            min_age,
            max_age,
            search,
            order_by,
            page,
            page_size,
        } => {
            let defaults = EmployeeParameters::default();
            let parameters = EmployeeParameters {
                page_number: page,
                page_size: page_size.unwrap_or(defaults.page_size),
                min_age: min_age.unwrap_or(defaults.min_age),
                max_age: max_age.unwrap_or(defaults.max_age),
                search_term: search,
                order_by: order_by.or(defaults.order_by),
            };

            let manager = storage.unit_of_work();
            if manager.company().get_by_id(company_id, false).await?.is_none() {
                anyhow::bail!("Company {} not found", company_id);
            }
            let employees = manager.employee().get_employees(company_id, &parameters, false).await?;
            println!("X-Pagination: {}", employees.meta_data.to_header_value()?);
            println!("{}", serde_json::to_string_pretty(&employees.items)?);
        }
        Command::DeleteCompany { company_id } => {
            let manager = storage.unit_of_work();
            let company = manager
                .company()
                .get_by_id(company_id, false)
                .await?
                .with_context(|| format!("Company {} not found", company_id))?;
            manager.company().remove(&company);
            manager.save().await?;
            println!("Deleted company {}", company.name);
        }
    }

    Ok(())
}
