//! Main entry point for the nupeek CLI application.
//!
//! Prints a package's metadata, special files and file tree, or extracts
//! a single entry.

use anyhow::{Context, Result};
use clap::Parser;
use tokio::io::AsyncWriteExt;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use nupeek::{
    Cli, Dependency, FileEntry, PackageContent, get_file_content_cancellable,
    parse_package_cancellable,
};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cli.log_level()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    // Ctrl-C abandons the pending read; the archive is closed on the way out
    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_interrupt.cancel();
        }
    });

    match &cli.entry {
        Some(entry) => extract_entry(&cli, entry, &cancel).await,
        None => show_package(&cli, &cancel).await,
    }
}

/// Write one entry's bytes to stdout or the `-o` file.
async fn extract_entry(cli: &Cli, entry: &str, cancel: &CancellationToken) -> Result<()> {
    let file = get_file_content_cancellable(&cli.package, entry, cli.options(), cancel)
        .await
        .with_context(|| format!("Failed to extract {}", entry))?;
    tracing::info!(path = %file.path, mime_type = %file.mime_type, bytes = file.content.len(), "Extracted");

    match &cli.output {
        Some(output) => tokio::fs::write(output, &file.content)
            .await
            .with_context(|| format!("Failed to write {}", output))?,
        None => {
            let mut stdout = tokio::io::stdout();
            stdout.write_all(&file.content).await?;
            stdout.flush().await?;
        }
    }

    Ok(())
}

async fn show_package(cli: &Cli, cancel: &CancellationToken) -> Result<()> {
    let package = parse_package_cancellable(&cli.package, cli.options(), cancel)
        .await
        .with_context(|| format!("Failed to read package {}", cli.package))?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&package)?);
        return Ok(());
    }

    print_summary(&package);

    if cli.tree {
        println!();
        println!("Files ({}):", package.file_count());
        print_tree(&package.files, 1);
    }

    Ok(())
}

fn print_summary(package: &PackageContent) {
    let metadata = &package.metadata;

    println!("{} {}", metadata.id, metadata.version);
    if let Some(title) = &metadata.title {
        println!("  Title:        {}", title);
    }
    if !metadata.authors.is_empty() {
        println!("  Authors:      {}", metadata.authors.join(", "));
    }
    if let Some(license) = &metadata.license {
        match &metadata.license_type {
            Some(kind) => println!("  License:      {} ({})", license, kind.as_str()),
            None => println!("  License:      {}", license),
        }
    } else if let Some(url) = &metadata.license_url {
        println!("  License URL:  {}", url);
    }
    if let Some(url) = &metadata.project_url {
        println!("  Project:      {}", url);
    }
    if let Some(url) = &metadata.repository_url {
        println!("  Repository:   {}", url);
    }
    if !metadata.tags.is_empty() {
        println!("  Tags:         {}", metadata.tags.join(", "));
    }
    if !metadata.package_types.is_empty() {
        let types: Vec<_> = metadata
            .package_types
            .iter()
            .map(|package_type| match &package_type.version {
                Some(version) => format!("{} {}", package_type.name, version),
                None => package_type.name.clone(),
            })
            .collect();
        println!("  Types:        {}", types.join(", "));
    }
    if let Some(description) = &metadata.description {
        println!();
        println!("{}", description);
    }

    if !metadata.dependencies.is_empty() {
        println!();
        println!("Dependencies:");
        print_dependencies(&metadata.dependencies);
    }

    let specials = [
        ("Readme", package.readme_path.as_deref()),
        ("License", package.license_path.as_deref()),
        ("MCP server", package.mcp_server_path.as_deref()),
    ];
    if package.icon_data.is_some() || specials.iter().any(|(_, path)| path.is_some()) {
        println!();
        if let Some(icon) = &package.icon_data {
            println!("  Icon:         {}", format_size(icon.len() as u64));
        }
        for (label, path) in specials {
            if let Some(path) = path {
                println!("  {:<13} {}", format!("{}:", label), path);
            }
        }
    }
}

/// Dependencies grouped by target framework, in manifest order.
fn print_dependencies(dependencies: &[Dependency]) {
    let mut current: Option<Option<&str>> = None;
    for dependency in dependencies {
        let framework = dependency.target_framework.as_deref();
        if current != Some(framework) {
            if let Some(framework) = framework {
                println!("  {}", framework);
            }
            current = Some(framework);
        }

        let indent = if framework.is_some() { "    " } else { "  " };
        match &dependency.version {
            Some(version) => println!("{}{} {}", indent, dependency.id, version),
            None => println!("{}{}", indent, dependency.id),
        }
    }
}

fn print_tree(entries: &[FileEntry], depth: usize) {
    for entry in entries {
        let indent = "  ".repeat(depth);
        if entry.is_directory {
            println!("{}{}/", indent, entry.name);
            print_tree(entry.children(), depth + 1);
        } else {
            println!("{}{}  ({})", indent, entry.name, format_size(entry.size));
        }
    }
}

/// Entry sizes as shown in the summary and tree: bytes below 1 KiB,
/// otherwise the largest binary unit with two decimals.
fn format_size(size: u64) -> String {
    const UNITS: [&str; 3] = ["KB", "MB", "GB"];

    if size < 1024 {
        return format!("{size} bytes");
    }
    let mut value = size as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit + 1 < UNITS.len() {
        value /= 1024.0;
        unit += 1;
    }
    format!("{value:.2} {}", UNITS[unit])
}
