use anyhow::Result;

use rollarchive_core::{AppConfig, FragmentFetcher, HttpFragmentClient};

use super::search_query;

const TEXT_WIDTH: usize = 80;

pub async fn run(config: &AppConfig, page: u32, search: Option<&str>, raw: bool) -> Result<()> {
    let client = HttpFragmentClient::new(&config.navigation)?;
    let query = search_query(search);
    let fragment = client.fetch_bootstrap(&query, page).await?;

    if let Some(state) = &fragment.state {
        let label = state
            .date_label(state.current_page())
            .map(|label| format!(" ({})", label))
            .unwrap_or_default();
        println!(
            "{}{}\n",
            config
                .strings
                .page_counter(state.current_page(), state.page_count()),
            label
        );
    }

    if raw {
        println!("{}", fragment.html);
    } else {
        let text = html2text::from_read(fragment.html.as_bytes(), TEXT_WIDTH)?;
        println!("{}", text.trim_end());
    }
    Ok(())
}
