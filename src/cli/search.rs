use anyhow::Result;
use clap::Args;

use crate::api::ApiClient;

use super::output::Output;

#[derive(Debug, Args)]
pub struct SearchArgs {
    /// Text to look for
    pub query: String,
}

pub async fn execute(args: &SearchArgs, client: &ApiClient, output: &Output) -> Result<()> {
    let result = client.global_search(&args.query).await?;
    if output.is_json() {
        return output.json(&result);
    }
    if result.total() == 0 {
        println!("Nothing found");
        return Ok(());
    }

    print_section(
        "Documents",
        result.documents.iter().map(|doc| (doc.id, doc.title.as_str())),
    );
    print_section(
        "Saved views",
        result.saved_views.iter().map(|view| (view.id, view.name.as_str())),
    );
    print_section(
        "Correspondents",
        result.correspondents.iter().map(|c| (c.id, c.name.as_str())),
    );
    print_section(
        "Document types",
        result.document_types.iter().map(|t| (t.id, t.name.as_str())),
    );
    print_section(
        "Storage paths",
        result.storage_paths.iter().map(|p| (p.id, p.name.as_str())),
    );
    print_section("Tags", result.tags.iter().map(|t| (t.id, t.name.as_str())));
    Ok(())
}

fn print_section<'a>(title: &str, entries: impl ExactSizeIterator<Item = (i64, &'a str)>) {
    if entries.len() == 0 {
        return;
    }
    println!("{title} ({}):", entries.len());
    for (id, name) in entries {
        println!("  {id:>6}  {name}");
    }
}
