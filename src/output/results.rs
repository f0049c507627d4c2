//! Plain-text rendering of search results

use crate::search::SearchResult;

/// Formats the headline of one result
pub fn format_result(result: &SearchResult) -> String {
    format!(
        "URL ({}): {}, total score: {:.3} (page_rank={:.3}, distance={:.3})",
        result.url_id,
        result.url,
        result.total_score,
        result.authority_score,
        result.distance_score
    )
}

/// Prints results with a preview of each page's leading words
pub fn print_search_results(results: &[(SearchResult, Vec<String>)], preview_words: usize) {
    if results.is_empty() {
        println!("No pages found");
        return;
    }

    for (result, words) in results {
        println!("{}", format_result(result));
        if preview_words > 0 && !words.is_empty() {
            let preview: Vec<&str> = words.iter().take(preview_words).map(String::as_str).collect();
            let ellipsis = if words.len() > preview_words { " ..." } else { "" };
            println!("    {}{}", preview.join(" "), ellipsis);
        }
    }
}
