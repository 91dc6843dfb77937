use anyhow::Result;

use crate::api::ApiClient;

use super::output::Output;

pub async fn execute(client: &ApiClient, output: &Output) -> Result<()> {
    let stats = client.statistics().await?;
    if output.is_json() {
        return output.json(&stats);
    }
    let fields: Vec<(&str, String)> = stats
        .counters()
        .into_iter()
        .map(|(label, value)| (label, value.to_string()))
        .collect();
    output.fields(&fields);
    Ok(())
}
